//! Conversion mètres ↔ unités de coordonnées (degrés)
//!
//! Approximation planaire locale : un facteur fixe de mètres par degré,
//! valable seulement autour de la latitude des données. Pas de correction
//! géodésique.

/// Mètres par degré à l'équateur (approximation utilisée par défaut)
pub const DEFAULT_METERS_PER_DEGREE: f64 = 111_319.9;

/// Facteur de conversion entre mètres et unités de coordonnées
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricScale {
    /// Nombre de mètres pour une unité de coordonnée
    pub meters_per_degree: f64,
}

impl Default for MetricScale {
    fn default() -> Self {
        Self {
            meters_per_degree: DEFAULT_METERS_PER_DEGREE,
        }
    }
}

impl MetricScale {
    pub fn new(meters_per_degree: f64) -> Self {
        Self { meters_per_degree }
    }

    /// Distance en mètres → unités de coordonnées
    pub fn to_units(&self, meters: f64) -> f64 {
        meters / self.meters_per_degree
    }

    /// Unités de coordonnées → mètres
    pub fn to_meters(&self, units: f64) -> f64 {
        units * self.meters_per_degree
    }

    /// Surface en m² → unités de coordonnées au carré
    pub fn area_to_units(&self, square_meters: f64) -> f64 {
        square_meters / self.square_factor()
    }

    /// Unités de coordonnées au carré → m²
    pub fn area_to_square_meters(&self, square_units: f64) -> f64 {
        square_units * self.square_factor()
    }

    fn square_factor(&self) -> f64 {
        self.meters_per_degree * self.meters_per_degree
    }
}
