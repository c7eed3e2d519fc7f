//! Classification des features et construction des deux sorties
//!
//! Premier passage : whitelist, puis recherche du seuil pour chaque
//! MultiPolygon. Second passage : suppression des micro-fragments sur les
//! hulls restés en deux parties, et liste des features non résolues.
//!
//! L'ordre de sortie est toujours l'ordre d'entrée, et les deux collections
//! restent alignées feature par feature.

use std::time::Instant;

use anyhow::Result;
use geo::Geometry;
use geojson::Feature;
use polyhull::types::{polygon_parts, to_multi_polygon};
use polyhull::{resolve_tiny_fragment, search, FragmentDecision, HullKernel};
use tracing::{debug, info, warn};

use crate::config::HullConfig;
use crate::filter::{display_name, Whitelist};
use crate::io::geojson::{geometry_to_string, multi_polygon_of, to_geojson_geometry};
use crate::report::{RunReport, UnresolvedFeature, UnresolvedReason};

/// Devenir d'une feature
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingOutcome {
    /// Écartée par la whitelist, recopiée telle quelle
    Skipped,
    /// Géométrie autre que MultiPolygon, recopiée telle quelle
    NonMultiPolygon,
    /// Hull à polygone unique
    Resolved {
        hull: Geometry,
        attempts: usize,
        /// Surface du fragment supprimé (unités au carré)
        removed_fragment_area: Option<f64>,
    },
    /// Hull resté multi-parties
    StillMultiPart {
        hull: Geometry,
        name: String,
        attempts: usize,
        reason: UnresolvedReason,
    },
}

/// Résultat du traitement d'une collection
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Géométries remplacées par les hulls
    pub hulls: Vec<Feature>,
    /// Géométries d'origine + hull sérialisé en propriété
    pub annotated: Vec<Feature>,
    /// Devenir de chaque feature, dans l'ordre d'entrée
    pub outcomes: Vec<ProcessingOutcome>,
    pub report: RunReport,
}

impl PipelineOutput {
    /// Une feature par hull non résolu : id et propriétés de la sortie des
    /// hulls, géométrie retenue par le rapport
    pub fn issue_features(&self) -> Vec<Feature> {
        self.report
            .unresolved
            .iter()
            .map(|u| with_geometry(&self.hulls[u.index], to_geojson_geometry(&u.geometry)))
            .collect()
    }
}

/// Traite toutes les features avec le noyau donné
pub fn process_features<K>(
    features: &[Feature],
    config: &HullConfig,
    kernel: &K,
) -> Result<PipelineOutput>
where
    K: HullKernel + ?Sized,
{
    let start = Instant::now();
    let whitelist = Whitelist::from_config(config);
    let params = config.search_params();
    let scale = config.scale();

    let mut report = RunReport::new(features.len());
    let mut hulls = Vec::with_capacity(features.len());
    let mut annotated = Vec::with_capacity(features.len());
    let mut outcomes = Vec::with_capacity(features.len());

    info!(
        features = features.len(),
        whitelist = config.whitelist.len(),
        "Processing features"
    );

    for (index, feature) in features.iter().enumerate() {
        if !whitelist.allows(feature) {
            hulls.push(feature.clone());
            annotated.push(feature.clone());
            outcomes.push(ProcessingOutcome::Skipped);
            report.record_skipped();
            continue;
        }

        let name = display_name(feature, &config.name_property);

        let polygons = match multi_polygon_of(feature) {
            Some(Ok(polygons)) => polygons,
            Some(Err(e)) => {
                warn!(name = %name, error = %e, "MultiPolygon could not be read, keeping it as-is");
                report.record_warning(index, &name, format!("{:#}", e));
                hulls.push(feature.clone());
                annotated.push(feature.clone());
                outcomes.push(ProcessingOutcome::NonMultiPolygon);
                report.record_non_multipolygon();
                continue;
            }
            None => {
                hulls.push(feature.clone());
                annotated.push(feature.clone());
                outcomes.push(ProcessingOutcome::NonMultiPolygon);
                report.record_non_multipolygon();
                continue;
            }
        };

        debug!(name = %name, parts = polygons.0.len(), "Computing concave hull");
        let result = search(kernel, &polygons, &params);

        if result.attempts > 1 {
            info!(
                name = %name,
                attempts = result.attempts,
                threshold_m = scale.to_meters(result.threshold).round(),
                "Several attempts required"
            );
        }

        let (hull_feature, hull) = match &result.hull {
            Some(hull) => (with_geometry(feature, to_geojson_geometry(hull)), hull.clone()),
            None => {
                // Le noyau n'a jamais abouti : on garde la géométrie d'origine
                (feature.clone(), Geometry::MultiPolygon(polygons.clone()))
            }
        };
        hulls.push(hull_feature);
        annotated.push(annotate(feature, &config.hull_property, &hull)?);
        report.record_hull(result.attempts);

        let outcome = if result.is_resolved() {
            ProcessingOutcome::Resolved {
                hull,
                attempts: result.attempts,
                removed_fragment_area: None,
            }
        } else {
            let reason = match polygon_parts(&hull) {
                _ if result.kernel_never_succeeded() => UnresolvedReason::KernelFailed,
                Some(parts) if parts > 2 => UnresolvedReason::ManyParts(parts),
                _ => UnresolvedReason::TwoPartsNotPrunable,
            };
            ProcessingOutcome::StillMultiPart {
                hull,
                name,
                attempts: result.attempts,
                reason,
            }
        };
        outcomes.push(outcome);

        if report.hulls_computed % 100 == 0 {
            info!(processed = report.hulls_computed, "Processed features...");
        }
    }

    // Second passage : micro-fragments et features non résolues
    let tiny_area = config.tiny_area_threshold();
    for (index, outcome) in outcomes.iter_mut().enumerate() {
        let ProcessingOutcome::StillMultiPart {
            hull,
            name,
            attempts,
            reason,
        } = outcome
        else {
            continue;
        };

        if *reason == UnresolvedReason::TwoPartsNotPrunable {
            let decision = to_multi_polygon(hull)
                .map(|mp| resolve_tiny_fragment(&mp, tiny_area))
                .unwrap_or(FragmentDecision::NotTwoParts(0));

            if let FragmentDecision::Pruned {
                kept, removed_area, ..
            } = decision
            {
                info!(
                    name = %name,
                    removed_sq_m = scale.area_to_square_meters(removed_area).round(),
                    "Removed tiny polygon"
                );
                let kept = Geometry::Polygon(kept);
                hulls[index] = with_geometry(&features[index], to_geojson_geometry(&kept));
                report.record_fragment_removed();

                let attempts = *attempts;
                *outcome = ProcessingOutcome::Resolved {
                    hull: kept,
                    attempts,
                    removed_fragment_area: Some(removed_area),
                };
                continue;
            }
        }

        report.record_unresolved(UnresolvedFeature {
            index,
            name: name.clone(),
            reason: *reason,
            parts: polygon_parts(hull).unwrap_or(0),
            attempts: *attempts,
            geometry: hull.clone(),
        });
    }

    report.set_duration(start.elapsed());
    report.finalize();

    Ok(PipelineOutput {
        hulls,
        annotated,
        outcomes,
        report,
    })
}

/// Nouvelle feature : même id et propriétés, géométrie remplacée
fn with_geometry(feature: &Feature, geometry: geojson::Geometry) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        ..feature.clone()
    }
}

/// Nouvelle feature : géométrie d'origine, hull sérialisé en propriété
fn annotate(feature: &Feature, property: &str, hull: &Geometry) -> Result<Feature> {
    let mut annotated = feature.clone();
    annotated.set_property(property, geometry_to_string(hull)?);
    Ok(annotated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon, Polygon};
    use geojson::feature::Id;
    use polyhull::{KernelError, KernelParams};

    type KernelResult = Result<Geometry, KernelError>;

    fn square(x: f64, size: f64) -> Polygon {
        polygon![
            (x: x, y: 0.0),
            (x: x + size, y: 0.0),
            (x: x + size, y: size),
            (x: x, y: size),
        ]
    }

    fn feature(name: &str, geometry: Geometry) -> Feature {
        let mut feature = Feature {
            geometry: Some(to_geojson_geometry(&geometry)),
            id: Some(Id::String(format!("id-{}", name))),
            ..Default::default()
        };
        feature.set_property("eapply", name);
        feature
    }

    /// Unités = mètres pour des tests lisibles
    fn config() -> HullConfig {
        HullConfig {
            meters_per_degree: 1.0,
            start_threshold_m: 1.0,
            threshold_increment_m: 1.0,
            max_attempts: 5,
            tiny_area_sq_m: 500.0,
            ..Default::default()
        }
    }

    fn identity_kernel(mp: &MultiPolygon, _: &KernelParams) -> KernelResult {
        Ok(Geometry::MultiPolygon(mp.clone()))
    }

    #[test]
    fn test_non_multipolygon_passes_through() {
        let input = vec![feature("Plaza", Geometry::Polygon(square(0.0, 1.0)))];

        let output = process_features(&input, &config(), &identity_kernel).unwrap();
        assert_eq!(output.hulls, input);
        assert_eq!(output.annotated, input);
        assert_eq!(output.outcomes, vec![ProcessingOutcome::NonMultiPolygon]);
        assert_eq!(output.report.non_multipolygon, 1);
    }

    #[test]
    fn test_resolved_feature_outputs() {
        let mp = MultiPolygon::new(vec![square(0.0, 1.0), square(5.0, 1.0)]);
        let input = vec![feature("Park", Geometry::MultiPolygon(mp))];
        let kernel = |_: &MultiPolygon, p: &KernelParams| -> KernelResult {
            if p.max_edge_length >= 3.0 {
                Ok(Geometry::Polygon(square(0.0, 6.0)))
            } else {
                Err(KernelError::other("too fine"))
            }
        };

        let output = process_features(&input, &config(), &kernel).unwrap();

        match &output.outcomes[0] {
            ProcessingOutcome::Resolved { attempts, .. } => assert_eq!(*attempts, 3),
            other => panic!("unexpected outcome: {:?}", other),
        }
        let expected = to_geojson_geometry(&Geometry::Polygon(square(0.0, 6.0)));
        assert_eq!(output.hulls[0].geometry, Some(expected));
        assert_eq!(output.hulls[0].id, input[0].id);
        assert_eq!(output.annotated[0].geometry, input[0].geometry);
        assert!(output.annotated[0]
            .property("concave_hull_polygon")
            .and_then(|v| v.as_str())
            .is_some_and(|s| s.contains("Polygon")));
        assert_eq!(output.report.multi_attempt, 1);
        assert!(output.report.unresolved.is_empty());
    }

    #[test]
    fn test_two_parts_with_tiny_fragment_is_pruned() {
        let mp = MultiPolygon::new(vec![square(0.0, 2.0), square(100.0, 50.0)]);
        let input = vec![feature("Sliver", Geometry::MultiPolygon(mp))];

        let output = process_features(&input, &config(), &identity_kernel).unwrap();

        let expected = to_geojson_geometry(&Geometry::Polygon(square(100.0, 50.0)));
        assert_eq!(output.hulls[0].geometry, Some(expected));
        assert_eq!(output.report.tiny_fragments_removed, 1);
        assert!(output.report.unresolved.is_empty());
        assert!(matches!(
            output.outcomes[0],
            ProcessingOutcome::Resolved {
                removed_fragment_area: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_unresolved_reasons() {
        let two_large = MultiPolygon::new(vec![square(0.0, 30.0), square(100.0, 30.0)]);
        let three = MultiPolygon::new(vec![
            square(0.0, 1.0),
            square(10.0, 30.0),
            square(100.0, 30.0),
        ]);
        let input = vec![
            feature("Two", Geometry::MultiPolygon(two_large)),
            feature("Three", Geometry::MultiPolygon(three)),
        ];

        let output = process_features(&input, &config(), &identity_kernel).unwrap();

        let reasons: Vec<_> = output.report.unresolved.iter().map(|u| u.reason).collect();
        assert_eq!(
            reasons,
            vec![
                UnresolvedReason::TwoPartsNotPrunable,
                UnresolvedReason::ManyParts(3)
            ]
        );
        assert_eq!(output.report.unresolved_names(), vec!["Two", "Three"]);
        let issues = output.issue_features();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[1].id, input[1].id);
        assert_eq!(issues[1].property("eapply"), input[1].property("eapply"));
        assert_eq!(
            issues[1].geometry,
            Some(to_geojson_geometry(&output.report.unresolved[1].geometry))
        );
    }

    #[test]
    fn test_skipped_features_bypass_search() {
        let mp = MultiPolygon::new(vec![square(0.0, 30.0), square(100.0, 30.0)]);
        let input = vec![
            feature("Prospect Park", Geometry::MultiPolygon(mp.clone())),
            feature("Other Park", Geometry::MultiPolygon(mp)),
        ];
        let config = HullConfig {
            whitelist: vec!["Prospect Park".to_string()],
            ..config()
        };

        let output = process_features(&input, &config, &identity_kernel).unwrap();

        assert_eq!(output.outcomes[1], ProcessingOutcome::Skipped);
        assert_eq!(output.hulls[1], input[1]);
        assert_eq!(output.annotated[1], input[1]);
        assert_eq!(output.report.skipped, 1);
        assert_eq!(output.report.unresolved_names(), vec!["Prospect Park"]);
    }
}
