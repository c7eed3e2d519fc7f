//! Suppression des micro-fragments
//!
//! Un hull en deux parties dont l'une est minuscule vient en général d'un
//! artefact de numérisation (presqu'île fine jamais fusionnée). On garde la
//! grande partie plutôt que d'augmenter encore le seuil.

use geo::{Area, MultiPolygon, Polygon};

/// Surface par défaut sous laquelle une partie est un fragment (m²)
pub const DEFAULT_TINY_AREA_SQ_M: f64 = 500.0;

/// Décision du résolveur pour un MultiPolygon
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentDecision {
    /// La petite partie a été supprimée
    Pruned {
        kept: Polygon,
        kept_area: f64,
        removed_area: f64,
    },
    /// Les deux parties sont sous le seuil
    BothTiny { areas: [f64; 2] },
    /// Les deux parties atteignent le seuil
    BothLarge { areas: [f64; 2] },
    /// Seul le cas à deux parties est traité
    NotTwoParts(usize),
}

impl FragmentDecision {
    pub fn is_pruned(&self) -> bool {
        matches!(self, Self::Pruned { .. })
    }
}

/// Tente de supprimer un fragment minuscule d'un MultiPolygon à deux parties.
///
/// `area_threshold` est exprimé dans les mêmes unités (au carré) que les
/// coordonnées.
pub fn resolve_tiny_fragment(polygons: &MultiPolygon, area_threshold: f64) -> FragmentDecision {
    let [first, second] = polygons.0.as_slice() else {
        return FragmentDecision::NotTwoParts(polygons.0.len());
    };

    let areas = [first.unsigned_area(), second.unsigned_area()];
    let tiny = [areas[0] < area_threshold, areas[1] < area_threshold];

    match tiny {
        [true, false] => FragmentDecision::Pruned {
            kept: second.clone(),
            kept_area: areas[1],
            removed_area: areas[0],
        },
        [false, true] => FragmentDecision::Pruned {
            kept: first.clone(),
            kept_area: areas[0],
            removed_area: areas[1],
        },
        [true, true] => FragmentDecision::BothTiny { areas },
        [false, false] => FragmentDecision::BothLarge { areas },
    }
}
