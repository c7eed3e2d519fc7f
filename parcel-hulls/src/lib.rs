//! # parcel-hulls
//!
//! Remplace les MultiPolygons fragmentés d'une collection GeoJSON par des
//! concave hulls à polygone unique.
//!
//! ## Features
//!
//! - Whitelist par nom de parc (propriété `eapply` par défaut)
//! - Recherche adaptative du seuil, par feature
//! - Suppression des micro-fragments (< 500 m² par défaut)
//! - Deux sorties alignées : hulls seuls et géométries annotées
//! - Fichiers d'issue pour les features restées multi-parties
//!
//! ## Usage CLI
//!
//! ```bash
//! parcel-hulls
//! parcel-hulls --input ./parks.geojson --only "Prospect Park" --report report.json
//! ```

pub mod config;
pub mod filter;
pub mod io;
pub mod pipeline;
pub mod report;

pub use config::HullConfig;
pub use pipeline::{process_features, PipelineOutput, ProcessingOutcome};
pub use report::{RunReport, RunStatus, UnresolvedReason};
