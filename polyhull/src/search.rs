//! Recherche du seuil : relance le noyau avec un seuil croissant jusqu'à
//! obtenir un polygone unique ou épuiser le budget de tentatives.
//!
//! Le seuil de la tentative `k` (à partir de 0) vaut `initial + increment * k`.
//! Un échec du noyau n'est jamais fatal : on passe au seuil suivant.

use geo::{Geometry, MultiPolygon};
use tracing::debug;

use crate::kernel::{HullKernel, KernelParams};
use crate::scale::MetricScale;
use crate::types::polygon_parts;

/// Seuil de départ par défaut (mètres)
pub const DEFAULT_START_THRESHOLD_M: f64 = 50.0;
/// Incrément de seuil par défaut (mètres)
pub const DEFAULT_INCREMENT_M: f64 = 20.0;
/// Nombre maximal de tentatives par défaut
pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

/// Paramètres de la recherche, en unités de coordonnées
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    pub initial_threshold: f64,
    pub increment: f64,
    pub max_attempts: usize,
    pub tight: bool,
    pub holes_allowed: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::from_meters(
            DEFAULT_START_THRESHOLD_M,
            DEFAULT_INCREMENT_M,
            DEFAULT_MAX_ATTEMPTS,
            &MetricScale::default(),
        )
    }
}

impl SearchParams {
    /// Construit les paramètres depuis des distances en mètres
    pub fn from_meters(
        start_m: f64,
        increment_m: f64,
        max_attempts: usize,
        scale: &MetricScale,
    ) -> Self {
        Self {
            initial_threshold: scale.to_units(start_m),
            increment: scale.to_units(increment_m),
            max_attempts,
            tight: true,
            holes_allowed: false,
        }
    }

    /// Seuil utilisé pour la tentative `attempt` (0-based)
    pub fn threshold_at(&self, attempt: usize) -> f64 {
        self.initial_threshold + self.increment * attempt as f64
    }

    fn kernel_params(&self, threshold: f64) -> KernelParams {
        KernelParams {
            max_edge_length: threshold,
            tight: self.tight,
            holes_allowed: self.holes_allowed,
        }
    }
}

/// État de la recherche
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Searching,
    /// Un polygone unique a été obtenu
    Resolved,
    /// Budget de tentatives épuisé sans polygone unique
    Exhausted,
}

/// Résultat d'une recherche
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub state: SearchState,

    /// Hull accepté, ou dernier résultat réussi du noyau si épuisé.
    /// `None` si le noyau a échoué à chaque tentative.
    pub hull: Option<Geometry>,

    /// Nombre d'appels au noyau (1..=max_attempts)
    pub attempts: usize,

    /// Seuil de la dernière tentative, en unités de coordonnées
    pub threshold: f64,

    /// Nombre d'appels au noyau en échec
    pub kernel_failures: usize,
}

impl SearchResult {
    pub fn is_resolved(&self) -> bool {
        self.state == SearchState::Resolved
    }

    /// Vrai si le noyau n'a jamais produit de géométrie
    pub fn kernel_never_succeeded(&self) -> bool {
        self.hull.is_none()
    }

    /// Nombre de parties du hull retenu
    pub fn parts(&self) -> Option<usize> {
        self.hull.as_ref().and_then(polygon_parts)
    }
}

/// Lance la recherche du seuil sur un MultiPolygon
pub fn search<K>(kernel: &K, polygons: &MultiPolygon, params: &SearchParams) -> SearchResult
where
    K: HullKernel + ?Sized,
{
    let mut result = SearchResult {
        state: SearchState::Searching,
        hull: None,
        attempts: 0,
        threshold: params.initial_threshold,
        kernel_failures: 0,
    };

    while result.state == SearchState::Searching {
        if result.attempts >= params.max_attempts {
            result.state = SearchState::Exhausted;
            break;
        }

        let threshold = params.threshold_at(result.attempts);
        result.threshold = threshold;
        result.attempts += 1;

        match kernel.hull(polygons, &params.kernel_params(threshold)) {
            Ok(geometry) => match polygon_parts(&geometry) {
                Some(1) => {
                    result.hull = Some(geometry);
                    result.state = SearchState::Resolved;
                }
                Some(0) | None => {
                    debug!(
                        attempt = result.attempts,
                        threshold,
                        "Hull is empty or not polygonal, increasing threshold"
                    );
                    result.kernel_failures += 1;
                }
                Some(parts) => {
                    debug!(
                        attempt = result.attempts,
                        threshold,
                        parts,
                        "Hull still split, increasing threshold"
                    );
                    result.hull = Some(geometry);
                }
            },
            Err(e) => {
                debug!(
                    attempt = result.attempts,
                    threshold,
                    error = %e,
                    "Concave hull failed, increasing threshold"
                );
                result.kernel_failures += 1;
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KernelError;
    use geo::{polygon, Polygon};
    use std::cell::RefCell;

    type KernelResult = Result<Geometry, KernelError>;

    fn square(x: f64) -> Polygon {
        polygon![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0)]
    }

    fn input() -> MultiPolygon {
        MultiPolygon::new(vec![square(0.0), square(10.0), square(20.0)])
    }

    fn params(max_attempts: usize) -> SearchParams {
        SearchParams {
            initial_threshold: 1.0,
            increment: 2.0,
            max_attempts,
            tight: true,
            holes_allowed: false,
        }
    }

    #[test]
    fn test_resolved_on_first_attempt() {
        let kernel = |_: &MultiPolygon, _: &KernelParams| -> KernelResult {
            Ok(Geometry::Polygon(square(0.0)))
        };

        let result = search(&kernel, &input(), &params(10));
        assert!(result.is_resolved());
        assert_eq!(result.attempts, 1);
        assert_eq!(result.threshold, 1.0);
    }

    #[test]
    fn test_stops_at_first_single_part() {
        let calls = RefCell::new(Vec::new());
        let kernel = |mp: &MultiPolygon, p: &KernelParams| -> KernelResult {
            calls.borrow_mut().push(p.max_edge_length);
            if p.max_edge_length >= 7.0 {
                Ok(Geometry::Polygon(square(0.0)))
            } else {
                Ok(Geometry::MultiPolygon(mp.clone()))
            }
        };

        let result = search(&kernel, &input(), &params(10));
        assert!(result.is_resolved());
        assert_eq!(result.attempts, 4);
        assert_eq!(result.threshold, 7.0);
        assert_eq!(*calls.borrow(), vec![1.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn test_single_part_multipolygon_is_accepted() {
        let kernel = |_: &MultiPolygon, _: &KernelParams| -> KernelResult {
            Ok(Geometry::MultiPolygon(MultiPolygon::new(vec![square(0.0)])))
        };

        let result = search(&kernel, &input(), &params(10));
        assert!(result.is_resolved());
        assert_eq!(result.parts(), Some(1));
    }

    #[test]
    fn test_failures_are_retried() {
        let kernel = |mp: &MultiPolygon, p: &KernelParams| -> KernelResult {
            if p.max_edge_length < 5.0 {
                Err(KernelError::other("degenerate"))
            } else {
                Ok(Geometry::Polygon(mp.0[0].clone()))
            }
        };

        let result = search(&kernel, &input(), &params(10));
        assert!(result.is_resolved());
        assert_eq!(result.attempts, 3);
        assert_eq!(result.kernel_failures, 2);
    }

    #[test]
    fn test_exhausted_keeps_last_result() {
        let kernel = |mp: &MultiPolygon, _: &KernelParams| -> KernelResult {
            Ok(Geometry::MultiPolygon(mp.clone()))
        };

        let result = search(&kernel, &input(), &params(5));
        assert_eq!(result.state, SearchState::Exhausted);
        assert_eq!(result.attempts, 5);
        assert_eq!(result.parts(), Some(3));
        assert_eq!(result.threshold, params(5).threshold_at(4));
    }

    #[test]
    fn test_exhausted_with_only_failures() {
        let kernel = |_: &MultiPolygon, _: &KernelParams| -> KernelResult {
            Err(KernelError::EmptyResult)
        };

        let result = search(&kernel, &input(), &params(7));
        assert_eq!(result.state, SearchState::Exhausted);
        assert_eq!(result.attempts, 7);
        assert_eq!(result.kernel_failures, 7);
        assert!(result.kernel_never_succeeded());
    }

    #[test]
    fn test_last_success_survives_later_failure() {
        let kernel = |mp: &MultiPolygon, p: &KernelParams| -> KernelResult {
            if p.max_edge_length > 3.0 {
                Err(KernelError::EmptyResult)
            } else {
                Ok(Geometry::MultiPolygon(mp.clone()))
            }
        };

        let result = search(&kernel, &input(), &params(4));
        assert_eq!(result.state, SearchState::Exhausted);
        assert_eq!(result.parts(), Some(3));
        assert_eq!(result.kernel_failures, 2);
    }

    #[test]
    fn test_final_threshold_matches_attempts() {
        for target in 1..=6 {
            let kernel = move |mp: &MultiPolygon, p: &KernelParams| -> KernelResult {
                if p.max_edge_length >= 1.0 + 2.0 * (target - 1) as f64 {
                    Ok(Geometry::Polygon(mp.0[0].clone()))
                } else {
                    Ok(Geometry::MultiPolygon(mp.clone()))
                }
            };
            let p = params(100);
            let result = search(&kernel, &input(), &p);
            assert_eq!(result.attempts, target);
            assert_eq!(
                result.threshold,
                p.initial_threshold + p.increment * (result.attempts - 1) as f64
            );
        }
    }

    #[test]
    fn test_default_params_in_degrees() {
        let p = SearchParams::default();
        assert!((p.initial_threshold * 111_319.9 - 50.0).abs() < 1e-9);
        assert!((p.increment * 111_319.9 - 20.0).abs() < 1e-9);
        assert_eq!(p.max_attempts, 100);
        assert!(p.tight);
        assert!(!p.holes_allowed);
    }
}
