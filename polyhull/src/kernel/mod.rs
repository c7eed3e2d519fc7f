//! Noyau de concave hull
//!
//! Le moteur de recherche ne connaît le noyau qu'à travers [`HullKernel`] :
//! un appel avec des paramètres d'essai, un résultat ou une erreur typée.

pub mod delaunay;
pub mod topology;

use geo::{Geometry, MultiPolygon};

use crate::KernelError;

pub use delaunay::DelaunayHullKernel;

/// Paramètres d'un appel au noyau
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelParams {
    /// Longueur d'arête maximale du hull, en unités de coordonnées
    pub max_edge_length: f64,

    /// Garder le contour collé aux polygones d'entrée
    pub tight: bool,

    /// Autoriser les trous dans le résultat
    pub holes_allowed: bool,
}

/// Calcul d'un concave hull à partir d'un ensemble de polygones
pub trait HullKernel {
    /// Retourne un Polygon ou un MultiPolygon, ou l'échec de ce seuil
    fn hull(&self, polygons: &MultiPolygon, params: &KernelParams)
        -> Result<Geometry, KernelError>;
}

impl<F> HullKernel for F
where
    F: Fn(&MultiPolygon, &KernelParams) -> Result<Geometry, KernelError>,
{
    fn hull(
        &self,
        polygons: &MultiPolygon,
        params: &KernelParams,
    ) -> Result<Geometry, KernelError> {
        self(polygons, params)
    }
}
