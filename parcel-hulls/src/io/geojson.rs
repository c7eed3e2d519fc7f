//! Lecture et écriture des collections GeoJSON

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;
use tracing::{info, warn};

/// Lit un fichier GeoJSON (FeatureCollection ou Feature isolée)
pub fn read_collection(path: &Path) -> Result<FeatureCollection> {
    let content = std::fs::read_to_string(path)
        .context(format!("Could not open file: {}", path.display()))?;

    let geojson: GeoJson = content
        .parse()
        .context(format!("Invalid GeoJSON in {}", path.display()))?;

    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(feature) => Ok(collection_of(vec![feature])),
        GeoJson::Geometry(_) => anyhow::bail!(
            "Expected a FeatureCollection in {}, found a bare geometry",
            path.display()
        ),
    }
}

/// Écrit une collection de features
pub fn write_collection(features: &[Feature], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Could not write to file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    let collection = collection_of(features.to_vec());
    serde_json::to_writer(&mut writer, &collection)
        .context(format!("Failed to serialize {}", output_path.display()))?;
    writer.flush()?;

    Ok(())
}

/// Écrit chaque feature problématique dans son propre fichier
/// `issue_<n>.geojson` (n à partir de 1).
///
/// Ces fichiers ne servent qu'au diagnostic : un dossier impossible à créer
/// ou un fichier impossible à écrire donne un warning, pas une erreur.
pub fn write_issue_files(issue_dir: &Path, features: &[Feature]) -> Vec<PathBuf> {
    if features.is_empty() {
        return Vec::new();
    }

    if let Err(e) = std::fs::create_dir_all(issue_dir) {
        warn!(dir = %issue_dir.display(), error = %e, "Failed to create issue directory");
        return Vec::new();
    }

    let mut written = Vec::with_capacity(features.len());
    for (i, feature) in features.iter().enumerate() {
        let path = issue_dir.join(format!("issue_{}.geojson", i + 1));
        match write_collection(std::slice::from_ref(feature), &path) {
            Ok(()) => {
                info!(path = %path.display(), "Issue written");
                written.push(path);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to write issue file"),
        }
    }

    written
}

/// Sérialise une géométrie en document GeoJSON (chaîne) via geozero
pub fn geometry_to_string(geometry: &geo::Geometry) -> Result<String> {
    let mut buf = Vec::new();
    let mut writer = GeoJsonWriter::new(&mut buf);
    geometry.process_geom(&mut writer)?;

    String::from_utf8(buf).context("GeoJSON writer produced invalid UTF-8")
}

/// Convertit une géométrie `geo` en géométrie GeoJSON
pub fn to_geojson_geometry(geometry: &geo::Geometry) -> geojson::Geometry {
    geojson::Geometry::new(geojson::Value::from(geometry))
}

/// MultiPolygon de la feature, si sa géométrie en est un.
///
/// `Some(Err(..))` si les coordonnées ne forment pas un MultiPolygon valide.
pub fn multi_polygon_of(feature: &Feature) -> Option<Result<geo::MultiPolygon>> {
    let geometry = feature.geometry.as_ref()?;
    match &geometry.value {
        geojson::Value::MultiPolygon(_) => Some(
            geo::MultiPolygon::<f64>::try_from(geometry.value.clone())
                .context("Invalid MultiPolygon coordinates"),
        ),
        _ => None,
    }
}

fn collection_of(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
