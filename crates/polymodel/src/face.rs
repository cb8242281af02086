//! Faces of a polygon model.

use nalgebra::Vector3;

use crate::errors::StructuralError;
use crate::fix::FixVec;
use crate::plane::{Classification, Plane, PlaneSide};

/// A corner of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vertex {
    pub position: FixVec,
    /// Texture coordinates (u, v, light). Only meaningful on textured faces.
    pub uv: Option<FixVec>,
}

impl Vertex {
    #[inline]
    pub fn new(position: FixVec) -> Self {
        Self { position, uv: None }
    }

    #[inline]
    pub fn with_uv(position: FixVec, uv: FixVec) -> Self {
        Self {
            position,
            uv: Some(uv),
        }
    }
}

/// How a face is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Solid palette color
    Flat(u16),
    /// Index into the model's texture list
    Textured(u16),
}

/// A convex, planar polygon.
///
/// Vertices are in counter-clockwise winding order when viewed from the front
/// (the direction the normal points). `point` is a representative point on the
/// face, the first vertex unless supplied otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub vertices: Vec<Vertex>,
    pub point: FixVec,
    pub normal: FixVec,
    pub surface: Surface,
}

impl Face {
    /// Creates a face and derives its unit normal from the vertex winding.
    ///
    /// A face with fewer than three vertices, or with collinear vertices, gets
    /// a zero normal; [`Face::validate`] rejects it.
    pub fn new(vertices: Vec<Vertex>, surface: Surface) -> Self {
        let normal = newell_normal(&vertices)
            .map(|n| FixVec::from_vector(&n))
            .unwrap_or(FixVec::ZERO);
        Self::with_normal(vertices, normal, surface)
    }

    /// Creates a face with a caller-supplied normal.
    pub fn with_normal(vertices: Vec<Vertex>, normal: FixVec, surface: Surface) -> Self {
        let point = vertices.first().map_or(FixVec::ZERO, |v| v.position);
        Self {
            vertices,
            point,
            normal,
            surface,
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn is_textured(&self) -> bool {
        matches!(self.surface, Surface::Textured(_))
    }

    /// The plane this face lies on.
    #[inline]
    pub fn plane(&self) -> Plane {
        Plane::new(self.point, self.normal)
    }

    /// Checks that the face can take part in partitioning. `index` is only
    /// used to label the error.
    pub fn validate(&self, index: usize) -> Result<(), StructuralError> {
        if self.vertices.len() < 3 {
            return Err(StructuralError::TooFewVertices {
                face: index,
                count: self.vertices.len(),
            });
        }
        if self.normal.is_zero() {
            return Err(StructuralError::DegenerateFace { face: index });
        }
        let textured = self.is_textured();
        if self.vertices.iter().any(|v| v.uv.is_some() != textured) {
            return Err(if textured {
                StructuralError::MissingUv { face: index }
            } else {
                StructuralError::StrayUv { face: index }
            });
        }
        Ok(())
    }

    /// Classifies this face relative to a plane.
    ///
    /// Returns:
    /// - `Front`/`Back` if no vertex is strictly on the other side
    /// - `Spanning` if at least one vertex is strictly in front and one behind
    /// - for a coplanar face, `Front` when it faces along the plane normal
    ///   (including the perpendicular tie), `Back` otherwise
    pub fn classify(&self, plane: &Plane) -> Classification {
        let mut front = 0;
        let mut back = 0;

        for vertex in &self.vertices {
            match plane.classify_point(vertex.position) {
                PlaneSide::Front => front += 1,
                PlaneSide::Back => back += 1,
                PlaneSide::OnPlane => {}
            }
        }

        match (front, back) {
            (0, 0) => {
                if self.normal.to_vector().dot(&plane.normal_vector()) >= 0.0 {
                    Classification::Front
                } else {
                    Classification::Back
                }
            }
            (_, 0) => Classification::Front,
            (0, _) => Classification::Back,
            _ => Classification::Spanning,
        }
    }
}

/// Computes the unit normal of a polygon with Newell's method, which tolerates
/// slightly non-planar input better than a single cross product.
fn newell_normal(vertices: &[Vertex]) -> Option<Vector3<f64>> {
    if vertices.len() < 3 {
        return None;
    }

    let mut normal = Vector3::<f64>::zeros();
    for (i, current) in vertices.iter().enumerate() {
        let a = current.position.to_vector();
        let b = vertices[(i + 1) % vertices.len()].position.to_vector();
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }

    let len = normal.norm();
    if len > f64::EPSILON {
        Some(normal / len)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_triangle(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Face {
        Face::new(
            vec![
                Vertex::new(FixVec::from_f64(a[0], a[1], a[2])),
                Vertex::new(FixVec::from_f64(b[0], b[1], b[2])),
                Vertex::new(FixVec::from_f64(c[0], c[1], c[2])),
            ],
            Surface::Flat(7),
        )
    }

    #[test]
    fn normal_follows_winding() {
        let face = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert_eq!(face.normal, FixVec::from_f64(0.0, 0.0, 1.0));
        assert_eq!(face.point, FixVec::ZERO);

        let flipped = make_triangle([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]);
        assert_eq!(flipped.normal, FixVec::from_f64(0.0, 0.0, -1.0));
    }

    #[test]
    fn collinear_face_is_rejected() {
        let face = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        assert_eq!(
            face.validate(4),
            Err(StructuralError::DegenerateFace { face: 4 })
        );

        let mut short = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        short.vertices.pop();
        assert_eq!(
            short.validate(0),
            Err(StructuralError::TooFewVertices { face: 0, count: 2 })
        );
    }

    #[test]
    fn uvs_must_match_the_surface() {
        let mut face = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert_eq!(face.validate(0), Ok(()));

        face.vertices[1].uv = Some(FixVec::ZERO);
        assert_eq!(face.validate(2), Err(StructuralError::StrayUv { face: 2 }));

        face.surface = Surface::Textured(1);
        assert_eq!(face.validate(2), Err(StructuralError::MissingUv { face: 2 }));

        for vertex in &mut face.vertices {
            vertex.uv = Some(FixVec::ZERO);
        }
        assert_eq!(face.validate(2), Ok(()));
    }

    #[test]
    fn classify_sides() {
        let plane = Plane::new(FixVec::ZERO, FixVec::from_f64(0.0, 0.0, 1.0));
        let above = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 2.0]);
        let below = make_triangle([0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, -2.0]);
        let spanning = make_triangle([0.0, 0.0, -1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);

        assert_eq!(above.classify(&plane), Classification::Front);
        assert_eq!(below.classify(&plane), Classification::Back);
        assert_eq!(spanning.classify(&plane), Classification::Spanning);
    }

    #[test]
    fn lone_on_plane_vertex_does_not_span() {
        let plane = Plane::new(FixVec::ZERO, FixVec::from_f64(0.0, 0.0, 1.0));
        let touching = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        assert_eq!(touching.classify(&plane), Classification::Front);
    }

    #[test]
    fn coplanar_resolves_by_facing() {
        let plane = Plane::new(FixVec::ZERO, FixVec::from_f64(0.0, 0.0, 1.0));
        let same = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let opposite = make_triangle([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]);

        assert_eq!(same.classify(&plane), Classification::Front);
        assert_eq!(opposite.classify(&plane), Classification::Back);
    }
}
