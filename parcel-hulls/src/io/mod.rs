//! Entrées / sorties

pub mod geojson;
