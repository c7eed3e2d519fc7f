//! Configuration du traitement

use serde::{Deserialize, Serialize};
use std::path::Path;

use anyhow::{Context, Result};
use polyhull::fragment::DEFAULT_TINY_AREA_SQ_M;
use polyhull::scale::DEFAULT_METERS_PER_DEGREE;
use polyhull::search::{DEFAULT_INCREMENT_M, DEFAULT_MAX_ATTEMPTS, DEFAULT_START_THRESHOLD_M};
use polyhull::{MetricScale, SearchParams};

/// Propriété portant le nom du parc par défaut
pub const DEFAULT_NAME_PROPERTY: &str = "eapply";

/// Propriété recevant le hull sérialisé dans la sortie annotée
pub const DEFAULT_HULL_PROPERTY: &str = "concave_hull_polygon";

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HullConfig {
    /// Noms à traiter (vide = tout traiter)
    pub whitelist: Vec<String>,

    /// Propriété identifiant une feature (whitelist et diagnostics)
    pub name_property: String,

    /// Propriété ajoutée dans la sortie annotée
    pub hull_property: String,

    /// Seuil de départ du concave hull (mètres)
    pub start_threshold_m: f64,

    /// Incrément du seuil à chaque tentative (mètres)
    pub threshold_increment_m: f64,

    /// Nombre maximal de tentatives par feature
    pub max_attempts: usize,

    /// Surface sous laquelle une partie est un fragment (m²)
    pub tiny_area_sq_m: f64,

    /// Facteur mètres par degré
    pub meters_per_degree: f64,
}

impl Default for HullConfig {
    fn default() -> Self {
        Self {
            whitelist: Vec::new(),
            name_property: DEFAULT_NAME_PROPERTY.to_string(),
            hull_property: DEFAULT_HULL_PROPERTY.to_string(),
            start_threshold_m: DEFAULT_START_THRESHOLD_M,
            threshold_increment_m: DEFAULT_INCREMENT_M,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            tiny_area_sq_m: DEFAULT_TINY_AREA_SQ_M,
            meters_per_degree: DEFAULT_METERS_PER_DEGREE,
        }
    }
}

impl HullConfig {
    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Vérifie la cohérence des valeurs
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("start_threshold_m", self.start_threshold_m),
            ("threshold_increment_m", self.threshold_increment_m),
            ("tiny_area_sq_m", self.tiny_area_sq_m),
            ("meters_per_degree", self.meters_per_degree),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                anyhow::bail!("{} must be a positive number, got {}", name, value);
            }
        }

        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be at least 1");
        }
        if self.name_property.is_empty() {
            anyhow::bail!("name_property must not be empty");
        }
        if self.hull_property.is_empty() {
            anyhow::bail!("hull_property must not be empty");
        }

        Ok(())
    }

    pub fn scale(&self) -> MetricScale {
        MetricScale::new(self.meters_per_degree)
    }

    /// Paramètres de recherche en unités de coordonnées
    pub fn search_params(&self) -> SearchParams {
        SearchParams::from_meters(
            self.start_threshold_m,
            self.threshold_increment_m,
            self.max_attempts,
            &self.scale(),
        )
    }

    /// Seuil de micro-fragment en unités de coordonnées au carré
    pub fn tiny_area_threshold(&self) -> f64 {
        self.scale().area_to_units(self.tiny_area_sq_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HullConfig::default();
        assert!(config.whitelist.is_empty());
        assert_eq!(config.name_property, "eapply");
        assert_eq!(config.hull_property, "concave_hull_polygon");
        assert_eq!(config.max_attempts, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: HullConfig =
            serde_json::from_str(r#"{"whitelist": ["Prospect Park"], "max_attempts": 5}"#).unwrap();
        assert_eq!(config.whitelist, vec!["Prospect Park".to_string()]);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.start_threshold_m, 50.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = HullConfig::default();
        config.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = HullConfig::default();
        config.start_threshold_m = -1.0;
        assert!(config.validate().is_err());

        let mut config = HullConfig::default();
        config.meters_per_degree = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unit_conversions() {
        let config = HullConfig {
            meters_per_degree: 10.0,
            start_threshold_m: 50.0,
            threshold_increment_m: 20.0,
            tiny_area_sq_m: 500.0,
            ..Default::default()
        };

        let params = config.search_params();
        assert_eq!(params.initial_threshold, 5.0);
        assert_eq!(params.increment, 2.0);
        assert_eq!(config.tiny_area_threshold(), 5.0);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("parcel_hulls_config_test.json");
        std::fs::write(&path, r#"{"tiny_area_sq_m": 100.0}"#).unwrap();

        let config = HullConfig::load(&path).unwrap();
        assert_eq!(config.tiny_area_sq_m, 100.0);

        std::fs::remove_file(path).ok();
    }
}
