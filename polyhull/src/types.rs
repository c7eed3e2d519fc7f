//! Helpers sur les géométries polygonales

use geo::{Geometry, MultiPolygon};

/// Nombre de parties polygonales d'une géométrie.
///
/// `None` si la géométrie n'est ni un Polygon ni un MultiPolygon.
pub fn polygon_parts(geometry: &Geometry) -> Option<usize> {
    match geometry {
        Geometry::Polygon(_) => Some(1),
        Geometry::MultiPolygon(mp) => Some(mp.0.len()),
        _ => None,
    }
}

/// Vue MultiPolygon d'une géométrie polygonale (clone)
pub fn to_multi_polygon(geometry: &Geometry) -> Option<MultiPolygon> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Some(mp.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Point};

    #[test]
    fn test_polygon_parts() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        let single = MultiPolygon::new(vec![square.clone()]);
        let double = MultiPolygon::new(vec![square.clone(), square.clone()]);

        assert_eq!(polygon_parts(&Geometry::Polygon(square)), Some(1));
        assert_eq!(polygon_parts(&Geometry::MultiPolygon(single)), Some(1));
        assert_eq!(polygon_parts(&Geometry::MultiPolygon(double)), Some(2));
        assert_eq!(polygon_parts(&Geometry::Point(Point::new(0.0, 0.0))), None);
    }
}
