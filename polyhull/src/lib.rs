//! # polyhull
//!
//! Concave hull adaptatif pour des MultiPolygons bruités (parcelles, parcs).
//!
//! ## Features
//!
//! - Noyau de concave hull par longueur d'arête (triangulation `spade`)
//! - Recherche du seuil : escalade additive jusqu'à un polygone unique
//! - Suppression des micro-fragments sur les résultats à deux parties
//! - Types `geo` pour l'interopérabilité avec l'écosystème Rust géospatial
//!
//! ## Usage
//!
//! ```rust,ignore
//! use polyhull::{concave_hull, SearchParams};
//!
//! let result = concave_hull(&multi_polygon, &SearchParams::default());
//! println!("{:?} en {} tentatives", result.state, result.attempts);
//! ```

pub mod error;
pub mod fragment;
pub mod kernel;
pub mod scale;
pub mod search;
pub mod types;

pub use error::KernelError;
pub use fragment::{resolve_tiny_fragment, FragmentDecision};
pub use kernel::{DelaunayHullKernel, HullKernel, KernelParams};
pub use scale::MetricScale;
pub use search::{search, SearchParams, SearchResult, SearchState};

use geo::MultiPolygon;

/// Concave hull adaptatif avec le noyau par défaut.
///
/// # Arguments
///
/// * `polygons` - Les parties à envelopper
/// * `params` - Seuil de départ, incrément et budget de tentatives
///
/// # Returns
///
/// Un `SearchResult` : état final, hull retenu, nombre de tentatives et
/// dernier seuil utilisé. L'épuisement du budget n'est pas une erreur.
pub fn concave_hull(polygons: &MultiPolygon, params: &SearchParams) -> SearchResult {
    search(&DelaunayHullKernel, polygons, params)
}
