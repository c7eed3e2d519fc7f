//! Noyau par défaut : concave hull de polygones par longueur d'arête
//!
//! Les sommets des contours extérieurs sont triangulés avec les arêtes des
//! contours comme contraintes (`spade`). La triangulation couvre l'enveloppe
//! convexe ; on l'érode depuis le bord en retirant les triangles dont
//! l'arête extérieure dépasse le seuil. Une arête de contour n'est jamais
//! mesurée ni traversée : seul l'espace entre les parties compte.
//!
//! En mode `tight`, un triangle de bord dont les trois sommets viennent de
//! la même partie est toujours retiré : les concavités propres à une partie
//! restent intactes.

use std::collections::VecDeque;

use geo::{Contains, Coord, Geometry, MultiPolygon, Point, Polygon, Triangle};
use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, Point2, Triangulation};
use tracing::trace;

use super::topology::{remove_holes, union_all};
use super::{HullKernel, KernelParams};
use crate::KernelError;

type Cdt = ConstrainedDelaunayTriangulation<Point2<f64>>;

/// Concave hull de polygones basé sur une triangulation de Delaunay contrainte
#[derive(Debug, Clone, Copy, Default)]
pub struct DelaunayHullKernel;

impl HullKernel for DelaunayHullKernel {
    fn hull(
        &self,
        polygons: &MultiPolygon,
        params: &KernelParams,
    ) -> Result<Geometry, KernelError> {
        let max_edge = params.max_edge_length;
        if !max_edge.is_finite() || max_edge <= 0.0 {
            return Err(KernelError::InvalidThreshold(max_edge));
        }
        if polygons.0.is_empty() {
            return Err(KernelError::EmptyInput);
        }

        let mesh = PartMesh::build(polygons)?;
        let removed = mesh.erode(max_edge, params.tight);
        let fill = mesh.fill_triangles(&removed, polygons);

        trace!(
            parts = polygons.0.len(),
            vertices = mesh.cdt.num_vertices(),
            fill = fill.len(),
            "Triangulation eroded"
        );

        let pieces: Vec<MultiPolygon> = polygons
            .iter()
            .cloned()
            .chain(fill)
            .map(|p| MultiPolygon::new(vec![p]))
            .collect();

        let mut merged = union_all(pieces);
        if !params.holes_allowed {
            merged = remove_holes(merged);
        }

        match merged.0.len() {
            0 => Err(KernelError::EmptyResult),
            1 => Ok(Geometry::Polygon(merged.0.remove(0))),
            _ => Ok(Geometry::MultiPolygon(merged)),
        }
    }
}

/// Triangulation contrainte et partie d'origine de chaque sommet
struct PartMesh {
    cdt: Cdt,
    /// Indexé par sommet de la triangulation
    parts: Vec<usize>,
}

impl PartMesh {
    /// Insère tous les sommets, puis les arêtes des contours comme contraintes
    fn build(polygons: &MultiPolygon) -> Result<Self, KernelError> {
        let mut cdt = Cdt::new();
        let mut parts = Vec::new();
        let mut rings = Vec::with_capacity(polygons.0.len());

        for (part, polygon) in polygons.iter().enumerate() {
            let mut ring = Vec::with_capacity(polygon.exterior().0.len());
            for coord in polygon.exterior().coords() {
                let handle = cdt
                    .insert(Point2::new(coord.x, coord.y))
                    .map_err(|e| KernelError::Triangulation(e.to_string()))?;
                // Un sommet déjà présent garde sa première partie
                if handle.index() == parts.len() {
                    parts.push(part);
                }
                ring.push(handle);
            }
            rings.push(ring);
        }

        let mut crossing = 0;
        for ring in &rings {
            for pair in ring.windows(2) {
                let (from, to) = (pair[0], pair[1]);
                if from == to {
                    continue;
                }
                if cdt.can_add_constraint(from, to) {
                    cdt.add_constraint(from, to);
                } else {
                    crossing += 1;
                }
            }
        }
        if crossing > 0 {
            trace!(crossing, "Crossing ring edges skipped as constraints");
        }

        Ok(Self { cdt, parts })
    }

    fn part_of(&self, index: usize) -> usize {
        self.parts[index]
    }

    /// Érosion depuis l'enveloppe convexe. Retourne les faces retirées,
    /// indexées par face.
    fn erode(&self, max_edge: f64, tight: bool) -> Vec<bool> {
        let mut removed = vec![false; self.cdt.num_all_faces()];
        let mut queue: VecDeque<FixedFaceHandle<InnerTag>> = self
            .cdt
            .inner_faces()
            .filter(|face| {
                face.adjacent_edges()
                    .iter()
                    .any(|edge| edge.rev().face().is_outer())
            })
            .map(|face| face.fix())
            .collect();

        while let Some(fixed) = queue.pop_front() {
            if removed[fixed.index()] || !self.is_removable(fixed, &removed, max_edge, tight) {
                continue;
            }
            removed[fixed.index()] = true;

            for edge in self.cdt.face(fixed).adjacent_edges() {
                if self.cdt.is_constraint_edge(edge.as_undirected().fix()) {
                    continue;
                }
                if let Some(next) = edge.rev().face().as_inner() {
                    if !removed[next.fix().index()] {
                        queue.push_back(next.fix());
                    }
                }
            }
        }

        removed
    }

    /// Un triangle est retirable s'il a une arête extérieure hors contour
    /// (face externe ou face déjà retirée de l'autre côté) et que cette
    /// arête dépasse le seuil.
    fn is_removable(
        &self,
        fixed: FixedFaceHandle<InnerTag>,
        removed: &[bool],
        max_edge: f64,
        tight: bool,
    ) -> bool {
        let face = self.cdt.face(fixed);
        let outside: Vec<f64> = face
            .adjacent_edges()
            .iter()
            .filter(|edge| !self.cdt.is_constraint_edge(edge.as_undirected().fix()))
            .filter(|edge| match edge.rev().face().as_inner() {
                Some(neighbor) => removed[neighbor.fix().index()],
                None => true,
            })
            .map(|edge| edge_length(edge.from().position(), edge.to().position()))
            .collect();

        if outside.is_empty() {
            return false;
        }

        let [a, b, c] = face.vertices().map(|v| self.part_of(v.fix().index()));
        if tight && a == b && b == c {
            return true;
        }

        outside.iter().any(|&length| length > max_edge)
    }

    /// Triangles restants hors des polygones d'entrée
    fn fill_triangles(&self, removed: &[bool], polygons: &MultiPolygon) -> Vec<Polygon> {
        let shells: Vec<Polygon> = polygons
            .iter()
            .map(|p| Polygon::new(p.exterior().clone(), vec![]))
            .collect();

        self.cdt
            .inner_faces()
            .filter(|face| !removed[face.fix().index()])
            .filter_map(|face| {
                let [a, b, c] = face.vertices().map(|v| (v.position(), v.fix().index()));
                let triangle = Triangle::new(to_coord(a.0), to_coord(b.0), to_coord(c.0));

                let part = self.part_of(a.1);
                if part == self.part_of(b.1) && part == self.part_of(c.1) {
                    let centroid = Point::new(
                        (a.0.x + b.0.x + c.0.x) / 3.0,
                        (a.0.y + b.0.y + c.0.y) / 3.0,
                    );
                    if shells[part].contains(&centroid) {
                        return None;
                    }
                }

                Some(triangle.to_polygon())
            })
            .collect()
    }
}

fn edge_length(a: Point2<f64>, b: Point2<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

fn to_coord(p: Point2<f64>) -> Coord {
    Coord { x: p.x, y: p.y }
}
