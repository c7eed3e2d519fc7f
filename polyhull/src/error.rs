//! Types d'erreurs pour le crate polyhull

use thiserror::Error;

/// Échecs d'un appel au noyau de concave hull.
///
/// Ces erreurs sont attendues sur des données bruitées : le moteur de
/// recherche les absorbe et relance avec un seuil plus grossier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    /// Seuil de longueur d'arête nul, négatif ou non fini
    #[error("Invalid edge length threshold: {0}")]
    InvalidThreshold(f64),

    /// Aucun polygone en entrée
    #[error("Empty input geometry")]
    EmptyInput,

    /// La triangulation de Delaunay a refusé un sommet
    #[error("Triangulation failed: {0}")]
    Triangulation(String),

    /// L'union n'a produit aucun polygone
    #[error("Hull computation produced an empty geometry")]
    EmptyResult,

    /// Échec spécifique à un noyau externe
    #[error("Kernel failure: {0}")]
    Other(String),
}

impl KernelError {
    /// Crée une erreur de noyau générique
    pub fn other(reason: impl Into<String>) -> Self {
        Self::Other(reason.into())
    }
}
