use ::genmesh::{
    generators::{IndexedPolygon, SharedVertex},
    Polygon, Triangle, Vertex,
};
use nalgebra as na;

use crate::ConvexHull;

/// Walks a hull as flat-shaded triangles; polygonal faces are fanned from
/// their first vertex.
pub struct ConvexHullMeshGenerator {
    vertices: Vec<na::Point3<f64>>,
    triangles: Vec<([usize; 3], na::Vector3<f64>)>,
    triangle: usize,
}

impl ConvexHullMeshGenerator {
    pub fn new(parent: &ConvexHull) -> Self {
        let triangles = parent
            .faces()
            .into_iter()
            .zip(parent.face_normals())
            .flat_map(|(face, normal)| {
                (1..face.len().saturating_sub(1))
                    .map(move |k| ([face[0], face[k], face[k + 1]], normal))
                    .collect::<Vec<_>>()
            })
            .collect();

        Self {
            vertices: parent.vertices(),
            triangles,
            triangle: 0,
        }
    }

    fn vertex(&self, index: usize, normal: &na::Vector3<f64>) -> Vertex {
        let p = self.vertices[index];
        Vertex {
            pos: [p.x as f32, p.y as f32, p.z as f32].into(),
            normal: [normal.x as f32, normal.y as f32, normal.z as f32].into(),
        }
    }
}

impl Iterator for ConvexHullMeshGenerator {
    type Item = Polygon<Vertex>;

    fn next(&mut self) -> Option<Self::Item> {
        let (indices, normal) = *self.triangles.get(self.triangle)?;
        self.triangle += 1;
        let [a, b, c] = indices.map(|i| self.vertex(i, &normal));
        Some(Polygon::PolyTri(Triangle::new(a, b, c)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.triangles.len() - self.triangle;
        (remaining, Some(remaining))
    }
}

impl SharedVertex<Vertex> for ConvexHullMeshGenerator {
    fn shared_vertex(&self, idx: usize) -> Vertex {
        let (indices, normal) = self.triangles[idx / 3];
        self.vertex(indices[idx % 3], &normal)
    }

    fn shared_vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }
}

impl IndexedPolygon<Triangle<usize>> for ConvexHullMeshGenerator {
    fn indexed_polygon(&self, idx: usize) -> Triangle<usize> {
        let idx = idx * 3;
        Triangle::new(idx, idx + 1, idx + 2)
    }

    fn indexed_polygon_count(&self) -> usize {
        self.triangles.len()
    }
}
