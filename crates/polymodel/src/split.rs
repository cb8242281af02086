//! Cutting faces along a plane.

use nalgebra::Vector3;

use crate::errors::StructuralError;
use crate::face::{Face, Vertex};
use crate::fix::FixVec;
use crate::plane::{Classification, Plane, PlaneSide};

impl Face {
    /// Cuts the face by a plane.
    ///
    /// Returns `(front, back)`:
    /// - **Front** (including coplanar, facing along the normal): `(Some(self), None)`
    /// - **Back**: `(None, Some(self))`
    /// - **Spanning**: `(Some(front_part), Some(back_part))`
    pub fn cut(&self, plane: &Plane) -> Result<(Option<Face>, Option<Face>), StructuralError> {
        Ok(match self.classify(plane) {
            Classification::Front => (Some(self.clone()), None),
            Classification::Back => (None, Some(self.clone())),
            Classification::Spanning => {
                let (front, back) = split_face(self, plane)?;
                (Some(front), Some(back))
            }
        })
    }
}

/// Splits a spanning face into front and back parts.
///
/// Walks the vertex ring Sutherland-Hodgman style. On-plane vertices go to
/// both parts, and every edge running strictly from one side to the other
/// contributes one synthesized vertex (with interpolated texture coordinates)
/// to both parts. Both parts keep the source normal and surface.
pub fn split_face(face: &Face, plane: &Plane) -> Result<(Face, Face), StructuralError> {
    let vertices = &face.vertices;
    let n = vertices.len();

    let mut front_verts = Vec::with_capacity(n + 1);
    let mut back_verts = Vec::with_capacity(n + 1);

    let sides: Vec<PlaneSide> = vertices
        .iter()
        .map(|v| plane.classify_point(v.position))
        .collect();

    for i in 0..n {
        let current = vertices[i];
        let current_side = sides[i];
        let next = vertices[(i + 1) % n];
        let next_side = sides[(i + 1) % n];

        match current_side {
            PlaneSide::Front => front_verts.push(current),
            PlaneSide::Back => back_verts.push(current),
            PlaneSide::OnPlane => {
                front_verts.push(current);
                back_verts.push(current);
            }
        }

        let crosses = matches!(
            (current_side, next_side),
            (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
        );

        if crosses {
            let start = current.position.to_vector();
            let end = next.position.to_vector();
            if let Some(t) = plane.intersect_segment(&start, &end) {
                let synthesized = Vertex {
                    position: FixVec::from_vector(&(start + (end - start) * t)),
                    uv: lerp_uv(current.uv, next.uv, t),
                };
                front_verts.push(synthesized);
                back_verts.push(synthesized);
            }
        }
    }

    if front_verts.len() < 3 || back_verts.len() < 3 {
        return Err(StructuralError::DegenerateSplit {
            count: front_verts.len().min(back_verts.len()),
        });
    }

    Ok((
        Face::with_normal(front_verts, face.normal, face.surface),
        Face::with_normal(back_verts, face.normal, face.surface),
    ))
}

fn lerp_uv(a: Option<FixVec>, b: Option<FixVec>, t: f64) -> Option<FixVec> {
    let (a, b): (Vector3<f64>, Vector3<f64>) = (a?.to_vector(), b?.to_vector());
    Some(FixVec::from_vector(&(a + (b - a) * t)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::Surface;

    fn v(x: f64, y: f64, z: f64) -> FixVec {
        FixVec::from_f64(x, y, z)
    }

    fn x_plane() -> Plane {
        Plane::new(FixVec::ZERO, v(1.0, 0.0, 0.0))
    }

    #[test]
    fn non_spanning_faces_are_kept_whole() {
        let face = Face::new(
            vec![
                Vertex::new(v(1.0, 0.0, 0.0)),
                Vertex::new(v(2.0, 0.0, 0.0)),
                Vertex::new(v(1.0, 1.0, 0.0)),
            ],
            Surface::Flat(1),
        );
        let (front, back) = face.cut(&x_plane()).unwrap();
        assert_eq!(front, Some(face));
        assert!(back.is_none());
    }

    #[test]
    fn split_square_in_half() {
        let face = Face::new(
            vec![
                Vertex::new(v(-1.0, -1.0, 0.0)),
                Vertex::new(v(1.0, -1.0, 0.0)),
                Vertex::new(v(1.0, 1.0, 0.0)),
                Vertex::new(v(-1.0, 1.0, 0.0)),
            ],
            Surface::Flat(3),
        );
        let (front, back) = split_face(&face, &x_plane()).unwrap();

        assert_eq!(front.len(), 4);
        assert_eq!(back.len(), 4);
        assert_eq!(front.normal, face.normal);
        assert_eq!(back.surface, Surface::Flat(3));
        assert_eq!(front.point, front.vertices[0].position);
        assert_eq!(back.point, v(-1.0, -1.0, 0.0));

        for part in [&front, &back] {
            assert!(part.vertices.iter().any(|p| p.position == v(0.0, -1.0, 0.0)));
            assert!(part.vertices.iter().any(|p| p.position == v(0.0, 1.0, 0.0)));
        }
        assert_eq!(front.classify(&x_plane()), Classification::Front);
        assert_eq!(back.classify(&x_plane()), Classification::Back);
    }

    #[test]
    fn split_through_existing_vertex() {
        let face = Face::new(
            vec![
                Vertex::new(v(-1.0, 0.0, 0.0)),
                Vertex::new(v(1.0, 0.0, 0.0)),
                Vertex::new(v(0.0, 1.0, 0.0)),
            ],
            Surface::Flat(0),
        );
        let (front, back) = split_face(&face, &x_plane()).unwrap();

        assert_eq!(front.len(), 3);
        assert_eq!(back.len(), 3);

        let apex = v(0.0, 1.0, 0.0);
        assert_eq!(front.vertices.iter().filter(|p| p.position == apex).count(), 1);
        assert_eq!(back.vertices.iter().filter(|p| p.position == apex).count(), 1);
        // one synthesized vertex, at the origin
        assert!(front.vertices.iter().any(|p| p.position == FixVec::ZERO));
        assert!(back.vertices.iter().any(|p| p.position == FixVec::ZERO));
    }

    #[test]
    fn uv_is_interpolated() {
        let face = Face::new(
            vec![
                Vertex::with_uv(v(-1.0, 0.0, 0.0), v(0.0, 0.0, 1.0)),
                Vertex::with_uv(v(3.0, 0.0, 0.0), v(1.0, 0.0, 1.0)),
                Vertex::with_uv(v(3.0, 1.0, 0.0), v(1.0, 1.0, 1.0)),
            ],
            Surface::Textured(2),
        );
        let (front, back) = split_face(&face, &x_plane()).unwrap();

        let cut = back
            .vertices
            .iter()
            .find(|p| p.position == v(0.0, 0.0, 0.0))
            .expect("synthesized vertex on the bottom edge");
        assert_eq!(cut.uv, Some(v(0.25, 0.0, 1.0)));
        assert!(front.vertices.iter().all(|p| p.uv.is_some()));
        assert_eq!(front.surface, Surface::Textured(2));
    }
}
