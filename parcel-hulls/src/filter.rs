//! Sélection des features par nom (whitelist)

use std::collections::HashSet;

use geojson::Feature;

use crate::config::HullConfig;

/// Nom affiché quand la propriété de nom est absente ou non textuelle
pub const UNNAMED: &str = "(unnamed)";

/// Liste blanche des noms à traiter. Vide : tout est traité.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    names: HashSet<String>,
    property: String,
}

impl Whitelist {
    pub fn new<I, S>(names: I, property: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            property: property.to_string(),
        }
    }

    pub fn from_config(config: &HullConfig) -> Self {
        Self::new(config.whitelist.iter().cloned(), &config.name_property)
    }

    /// Vrai si la feature doit passer par le calcul de hull
    pub fn allows(&self, feature: &Feature) -> bool {
        if self.names.is_empty() {
            return true;
        }
        feature_name(feature, &self.property).is_some_and(|name| self.names.contains(name))
    }
}

/// Valeur textuelle de la propriété de nom
pub fn feature_name<'a>(feature: &'a Feature, property: &str) -> Option<&'a str> {
    feature.property(property).and_then(|v| v.as_str())
}

/// Nom pour les diagnostics, avec repli
pub fn display_name(feature: &Feature, property: &str) -> String {
    feature_name(feature, property).unwrap_or(UNNAMED).to_string()
}
