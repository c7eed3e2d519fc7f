//! Opérations de topologie sur le résultat du noyau (union, trous)

use geo::{BooleanOps, Contains, MultiPolygon, Point, Polygon};

/// Union d'une liste de MultiPolygons par réduction deux à deux
pub fn union_all(mut parts: Vec<MultiPolygon>) -> MultiPolygon {
    while parts.len() > 1 {
        let mut merged = Vec::with_capacity(parts.len().div_ceil(2));
        let mut iter = parts.into_iter();
        while let Some(a) = iter.next() {
            match iter.next() {
                Some(b) => merged.push(a.union(&b)),
                None => merged.push(a),
            }
        }
        parts = merged;
    }

    parts.pop().unwrap_or_else(|| MultiPolygon::new(Vec::new()))
}

/// Supprime les trous et les parties imbriquées dans une autre partie
pub fn remove_holes(polygons: MultiPolygon) -> MultiPolygon {
    let shells: Vec<Polygon> = polygons
        .into_iter()
        .map(|p| Polygon::new(p.exterior().clone(), vec![]))
        .collect();

    // Une partie dont le premier sommet est dans un autre contour était
    // dans un trou : elle disparaît avec lui
    let nested: Vec<bool> = shells
        .iter()
        .enumerate()
        .map(|(i, shell)| {
            let Some(first) = shell.exterior().0.first() else {
                return true;
            };
            let point = Point::from(*first);
            shells
                .iter()
                .enumerate()
                .any(|(j, other)| i != j && other.contains(&point))
        })
        .collect();

    shells
        .into_iter()
        .zip(nested)
        .filter(|(_, nested)| !nested)
        .map(|(shell, _)| shell)
        .collect()
}
