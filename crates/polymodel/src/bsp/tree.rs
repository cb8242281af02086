//! BSP tree container and construction.

use log::trace;

use crate::errors::StructuralError;
use crate::face::Face;

use super::node::BspNode;
use super::selector::{LeastCost, SplitterSelector};
use super::visitor::{BspVisitor, CollectingVisitor};

/// A Binary Space Partitioning tree over the faces of one submodel.
///
/// # Construction
///
/// Trees are built from an unordered set of faces using a
/// [`SplitterSelector`] to choose splitting faces:
///
/// ```ignore
/// use polymodel::{BspTree, LeastCost};
///
/// let faces: Vec<Face> = /* ... */;
/// let tree = BspTree::build(faces, &LeastCost::default())?;
/// ```
///
/// The splitter itself always goes to the front subtree. Faces spanning the
/// splitter's plane are cut into one front and one back fragment, so the
/// leaves together hold exactly the input faces and the fragments that
/// replaced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BspTree {
    root: Option<BspNode>,
}

impl BspTree {
    /// Creates an empty BSP tree.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Wraps an already built node.
    pub fn from_root(root: BspNode) -> Self {
        Self { root: Some(root) }
    }

    /// Builds a BSP tree from a collection of faces.
    ///
    /// Returns an empty tree if the input is empty, and an error if any face
    /// is degenerate.
    pub fn build<S: SplitterSelector>(
        faces: Vec<Face>,
        selector: &S,
    ) -> Result<Self, StructuralError> {
        if faces.is_empty() {
            return Ok(Self::new());
        }
        for (i, face) in faces.iter().enumerate() {
            face.validate(i)?;
        }
        Ok(Self {
            root: Some(build_node(faces, selector)?),
        })
    }

    /// Builds a BSP tree using the default selector ([`LeastCost`]).
    pub fn from_faces(faces: Vec<Face>) -> Result<Self, StructuralError> {
        Self::build(faces, &LeastCost::default())
    }

    /// Returns `true` if the tree contains no faces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns a reference to the root node, if any.
    #[inline]
    pub fn root(&self) -> Option<&BspNode> {
        self.root.as_ref()
    }

    /// Returns the total number of faces in the tree.
    pub fn face_count(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.face_count())
    }

    /// Returns the maximum depth of the tree (0 for empty tree).
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.depth())
    }

    /// Walks the leaves depth first, front subtree before back subtree.
    ///
    /// This is the order in which the emitter meets faces, so a visitor
    /// sees vertices in the order they are numbered.
    pub fn walk<V: BspVisitor>(&self, visitor: &mut V) {
        if let Some(ref root) = self.root {
            walk_node(root, visitor);
        }
    }

    /// Collects all faces in the tree into a vector, in walk order.
    pub fn collect_faces(&self) -> Vec<Face> {
        let mut visitor = CollectingVisitor::new();
        self.walk(&mut visitor);
        visitor.into_faces()
    }
}

/// Recursively builds a BSP node from a list of faces.
fn build_node<S: SplitterSelector>(
    faces: Vec<Face>,
    selector: &S,
) -> Result<BspNode, StructuralError> {
    let Some(splitter_idx) = selector.select(&faces) else {
        trace!("leaf with {} faces", faces.len());
        return Ok(BspNode::Leaf(faces));
    };

    let plane = faces[splitter_idx].plane();
    let mut front_list = Vec::new();
    let mut back_list = Vec::new();

    for (i, face) in faces.into_iter().enumerate() {
        // never classify the splitter against its own plane
        if i == splitter_idx {
            front_list.push(face);
            continue;
        }
        let (front_part, back_part) = face.cut(&plane)?;
        front_list.extend(front_part);
        back_list.extend(back_part);
    }

    trace!(
        "split on face {}: {} front, {} back",
        splitter_idx,
        front_list.len(),
        back_list.len()
    );

    if back_list.is_empty() {
        return Err(StructuralError::OneSidedNode { present: "front" });
    }

    Ok(BspNode::internal(
        plane,
        build_node(front_list, selector)?,
        build_node(back_list, selector)?,
    ))
}

fn walk_node<V: BspVisitor>(node: &BspNode, visitor: &mut V) {
    match node {
        BspNode::Leaf(faces) => visitor.visit(faces),
        BspNode::Internal { front, back, .. } => {
            walk_node(front, visitor);
            walk_node(back, visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::{Surface, Vertex};
    use crate::fix::FixVec;
    use crate::plane::Classification;

    fn make_triangle(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Face {
        Face::new(
            vec![
                Vertex::new(FixVec::from_f64(a[0], a[1], a[2])),
                Vertex::new(FixVec::from_f64(b[0], b[1], b[2])),
                Vertex::new(FixVec::from_f64(c[0], c[1], c[2])),
            ],
            Surface::Flat(0),
        )
    }

    fn at_z(z: f64) -> Face {
        make_triangle([0.0, 0.0, z], [1.0, 0.0, z], [0.0, 1.0, z])
    }

    #[test]
    fn empty_tree() {
        let tree = BspTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.face_count(), 0);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn build_empty() {
        let tree = BspTree::from_faces(vec![]).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn build_single_face() {
        let tree = BspTree::from_faces(vec![at_z(0.0)]).unwrap();

        assert!(!tree.is_empty());
        assert!(tree.root().unwrap().is_leaf());
        assert_eq!(tree.face_count(), 1);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn build_rejects_degenerate_faces() {
        let line = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        let result = BspTree::from_faces(vec![at_z(0.0), line]);
        assert_eq!(result, Err(StructuralError::DegenerateFace { face: 1 }));
    }

    #[test]
    fn coplanar_faces_form_a_leaf() {
        let poly1 = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let poly2 = make_triangle([1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [1.0, 1.0, 0.0]);

        let tree = BspTree::from_faces(vec![poly1, poly2]).unwrap();

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.root().unwrap().faces().unwrap().len(), 2);
    }

    #[test]
    fn stacked_faces_split_around_middle() {
        let tree = BspTree::from_faces(vec![at_z(0.0), at_z(1.0), at_z(2.0)]).unwrap();

        let root = tree.root().unwrap();
        let plane = root.plane().unwrap();
        assert_eq!(plane.point, FixVec::from_f64(0.0, 0.0, 1.0));
        assert_eq!(tree.face_count(), 3);

        let BspNode::Internal { front, back, .. } = root else {
            panic!("expected a split");
        };
        // splitter plus the face above it
        assert_eq!(front.face_count(), 2);
        assert_eq!(back.face_count(), 1);
    }

    #[test]
    fn spanning_face_gets_split() {
        // floor at y=0 and a wall crossing it, plus a face below the floor
        // so the floor is a useful splitter
        let floor = make_triangle([-1.0, 0.0, -1.0], [0.0, 0.0, 1.0], [1.0, 0.0, -1.0]);
        let wall = make_triangle([0.0, -1.0, 5.0], [1.0, -1.0, 5.0], [0.0, 1.0, 5.0]);
        let below = make_triangle([-1.0, -3.0, -1.0], [0.0, -3.0, 1.0], [1.0, -3.0, -1.0]);

        let tree = BspTree::from_faces(vec![floor, wall, below]).unwrap();

        // the wall was cut once, never duplicated or dropped
        assert_eq!(tree.face_count(), 4);

        let faces = tree.collect_faces();
        let plane = faces
            .iter()
            .find(|f| f.normal == FixVec::from_f64(0.0, 1.0, 0.0) && f.point.y.0 == 0)
            .unwrap()
            .plane();
        for face in &faces {
            assert_ne!(face.classify(&plane), Classification::Spanning);
        }
    }

    #[test]
    fn walk_visits_front_before_back() {
        let tree = BspTree::from_faces(vec![at_z(0.0), at_z(1.0), at_z(2.0)]).unwrap();
        let order: Vec<_> = tree.collect_faces().iter().map(|f| f.point.z).collect();

        assert_eq!(order.len(), 3);
        // back leaf (z=0) comes last
        assert_eq!(*order.last().unwrap(), crate::Fix::ZERO);
    }
}
