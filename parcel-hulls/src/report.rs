//! Rapport de traitement avec graceful degradation
//!
//! Ce module collecte les compteurs et les features non résolues d'un
//! passage, et les affiche ou les sauvegarde en JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

/// Statut global du traitement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Toutes les features traitées ont un polygone unique
    Success,
    /// Des features restent multi-parties ou des warnings ont été émis
    PartialSuccess,
}

/// Raison pour laquelle une feature reste multi-parties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "parts")]
pub enum UnresolvedReason {
    /// Le noyau a échoué à chaque seuil
    KernelFailed,
    /// Deux parties, aucune n'est un fragment isolé
    TwoPartsNotPrunable,
    /// Plus de deux parties : pas de suppression de fragment
    ManyParts(usize),
}

impl std::fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KernelFailed => write!(f, "concave hull failed at every threshold"),
            Self::TwoPartsNotPrunable => write!(f, "2 parts, no tiny fragment"),
            Self::ManyParts(n) => write!(f, "{} parts, needs review", n),
        }
    }
}

/// Feature restée multi-parties
#[derive(Debug, Clone, Serialize)]
pub struct UnresolvedFeature {
    /// Position dans la collection d'entrée
    pub index: usize,
    /// Nom de la feature (propriété de nom)
    pub name: String,
    pub reason: UnresolvedReason,
    /// Nombre de parties du hull retenu
    pub parts: usize,
    /// Nombre de tentatives consommées
    pub attempts: usize,
    /// Géométrie retenue, pour le fichier d'issue
    #[serde(skip)]
    pub geometry: geo::Geometry,
}

/// Warning non bloquant
#[derive(Debug, Clone, Serialize)]
pub struct RunWarning {
    pub index: usize,
    pub name: String,
    pub message: String,
}

/// Rapport complet d'un passage
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Durée du traitement
    pub duration_secs: f64,
    /// Statut global
    pub status: Option<RunStatus>,

    // Compteurs globaux
    /// Nombre de features en entrée
    pub total: usize,
    /// Features retenues par la whitelist
    pub processed: usize,
    /// Features écartées par la whitelist
    pub skipped: usize,
    /// Features non MultiPolygon (recopiées telles quelles)
    pub non_multipolygon: usize,
    /// Hulls calculés
    pub hulls_computed: usize,
    /// Hulls ayant nécessité plus d'une tentative
    pub multi_attempt: usize,
    /// Micro-fragments supprimés
    pub tiny_fragments_removed: usize,

    /// Features restées multi-parties, dans l'ordre d'entrée
    pub unresolved: Vec<UnresolvedFeature>,
    /// Liste des warnings
    pub warnings: Vec<RunWarning>,
}

impl RunReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Enregistre une feature écartée par la whitelist
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Enregistre une feature recopiée sans calcul
    pub fn record_non_multipolygon(&mut self) {
        self.processed += 1;
        self.non_multipolygon += 1;
    }

    /// Enregistre un hull calculé
    pub fn record_hull(&mut self, attempts: usize) {
        self.processed += 1;
        self.hulls_computed += 1;
        if attempts > 1 {
            self.multi_attempt += 1;
        }
    }

    /// Enregistre un micro-fragment supprimé
    pub fn record_fragment_removed(&mut self) {
        self.tiny_fragments_removed += 1;
    }

    /// Enregistre une feature non résolue
    pub fn record_unresolved(&mut self, unresolved: UnresolvedFeature) {
        self.unresolved.push(unresolved);
    }

    /// Enregistre un warning
    pub fn record_warning(&mut self, index: usize, name: &str, message: impl Into<String>) {
        self.warnings.push(RunWarning {
            index,
            name: name.to_string(),
            message: message.into(),
        });
    }

    /// Définit la durée du traitement
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.unresolved.is_empty() && self.warnings.is_empty() {
            Some(RunStatus::Success)
        } else {
            Some(RunStatus::PartialSuccess)
        };
    }

    /// Noms des features non résolues
    pub fn unresolved_names(&self) -> Vec<&str> {
        self.unresolved.iter().map(|u| u.name.as_str()).collect()
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("CONCAVE HULL REPORT");
        println!("{}", "=".repeat(60));

        if let Some(status) = self.status {
            println!("\nStatus: {:?}", status);
        }
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Features: {} total, {} processed, {} skipped (not in whitelist)",
            self.total, self.processed, self.skipped
        );
        println!(
            "Hulls: {} computed, {} needed several attempts, {} passed through",
            self.hulls_computed, self.multi_attempt, self.non_multipolygon
        );

        if self.tiny_fragments_removed > 0 {
            println!(
                "\n✓ Removed {} tiny polygon(s) from MultiPolygons.",
                self.tiny_fragments_removed
            );
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                println!("  [{}] {}: {}", w.index, w.name, w.message);
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        if !self.unresolved.is_empty() {
            println!(
                "\n⚠️  WARNING: {} feature(s) still have MultiPolygons with multiple polygons:",
                self.unresolved.len()
            );
            for u in &self.unresolved {
                println!("  - {} ({})", u.name, u.reason);
            }
            println!("\nConsider increasing the starting threshold to merge these polygons.");
        } else if self.hulls_computed > 0 {
            println!("\n✓ All processed features have single-polygon geometries.");
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{} features: {} hulls, {} skipped, {} fragments removed, {} unresolved",
            self.total,
            self.hulls_computed,
            self.skipped,
            self.tiny_fragments_removed,
            self.unresolved.len()
        )
    }
}
