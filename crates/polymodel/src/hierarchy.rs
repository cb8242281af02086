//! Submodel hierarchy: linking, validation and nesting order.
//!
//! When a parent's instructions call its children, the calls are wrapped in
//! sort nodes nearest child first, so a composite object paints in the
//! right order whatever its submodel indices are.

use nalgebra::Vector3;

use crate::errors::StructuralError;
use crate::fix::{Fix, FixVec};
use crate::model::{PolyModel, Submodel};
use crate::plane::Plane;

impl PolyModel {
    /// Appends a submodel and links it under `parent`. Returns its index.
    ///
    /// Nothing is added if `parent` does not exist.
    pub fn add_submodel(
        &mut self,
        parent: Option<usize>,
        mut submodel: Submodel,
    ) -> Result<usize, StructuralError> {
        let index = self.submodels.len();
        if parent.is_some_and(|p| p >= index) {
            return Err(StructuralError::Orphan { child: index });
        }
        submodel.parent = None;
        self.submodels.push(submodel);
        if let Some(parent) = parent {
            self.attach(parent, index)?;
        }
        Ok(index)
    }

    /// Makes `child` a child of `parent`, updating both sides of the link.
    pub fn attach(&mut self, parent: usize, child: usize) -> Result<(), StructuralError> {
        let count = self.submodels.len();
        if parent >= count || child >= count {
            return Err(StructuralError::BrokenLink { parent, child });
        }
        if parent == child {
            return Err(StructuralError::Cycle(child));
        }

        if let Some(old) = self.submodels[child].parent.take() {
            if let Some(old) = self.submodels.get_mut(old) {
                old.children.retain(|&c| c != child);
            }
        }
        self.submodels[child].parent = Some(parent);
        if !self.submodels[parent].children.contains(&child) {
            self.submodels[parent].children.push(child);
        }
        Ok(())
    }

    /// The root submodel, always index 0.
    pub fn root(&self) -> Option<usize> {
        (!self.submodels.is_empty()).then_some(0)
    }

    /// Checks that submodel 0 is the only root, that parent and child links
    /// agree, and that every submodel is reachable exactly once.
    pub fn validate_hierarchy(&self) -> Result<(), StructuralError> {
        let count = self.submodels.len();
        if count == 0 {
            return Err(StructuralError::EmptyHierarchy);
        }
        if self.submodels[0].parent.is_some() {
            return Err(StructuralError::RootHasParent(0));
        }

        for (index, submodel) in self.submodels.iter().enumerate().skip(1) {
            match submodel.parent {
                Some(parent) if parent < count => {
                    if !self.submodels[parent].children.contains(&index) {
                        return Err(StructuralError::BrokenLink { parent, child: index });
                    }
                }
                _ => return Err(StructuralError::Orphan { child: index }),
            }
        }

        let mut seen = vec![false; count];
        let mut stack = vec![0];
        while let Some(index) = stack.pop() {
            if seen[index] {
                return Err(StructuralError::Cycle(index));
            }
            seen[index] = true;
            for &child in &self.submodels[index].children {
                if child >= count || self.submodels[child].parent != Some(index) {
                    return Err(StructuralError::BrokenLink { parent: index, child });
                }
                stack.push(child);
            }
        }

        match seen.iter().position(|&s| !s) {
            Some(child) => Err(StructuralError::Orphan { child }),
            None => Ok(()),
        }
    }

    /// Center of a submodel's bounding box in its own frame.
    pub fn center(&self, id: usize) -> FixVec {
        let (min, max, _) = self.bounds(id);
        FixVec::from_vector(&((min.to_vector() + max.to_vector()) / 2.0))
    }

    /// Where a submodel sits, as seen from its parent's frame.
    pub fn representative_point(&self, id: usize) -> FixVec {
        self.submodels[id].offset + self.center(id)
    }

    /// Order in which `id`'s children are nested into its instructions.
    ///
    /// Repeatedly takes the remaining child nearest to the parent's center;
    /// equal distances go to the child listed first.
    pub fn nesting_order(&self, id: usize) -> Vec<usize> {
        let origin = self.center(id);
        let mut remaining = self.submodels[id].children.clone();
        let mut order = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let nearest = remaining
                .iter()
                .enumerate()
                .map(|(i, &child)| (i, origin.distance(self.representative_point(child))))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| i)
                .unwrap_or(0);
            order.push(remaining.remove(nearest));
        }
        order
    }

    /// Plane separating `child` from the rest of `parent`, passing halfway
    /// between them with the normal pointing toward the child.
    pub fn separating_plane(&self, parent: usize, child: usize) -> Plane {
        let from = self.center(parent).to_vector();
        let to = self.representative_point(child).to_vector();
        let midpoint = FixVec::from_vector(&((from + to) / 2.0));

        let direction = to - from;
        let normal = direction
            .try_normalize(f64::EPSILON)
            .map(|n| FixVec::from_vector(&n))
            .filter(|n| !n.is_zero())
            .unwrap_or(FixVec::new(Fix::ZERO, Fix::ZERO, Fix::ONE));

        Plane::new(midpoint, normal)
    }

    /// Bounding box and radius of a submodel's faces in its own frame. The
    /// radius is measured from the frame's origin.
    pub fn bounds(&self, id: usize) -> (FixVec, FixVec, Fix) {
        let mut positions = self.submodels[id]
            .faces
            .iter()
            .flat_map(|f| f.vertices.iter().map(|v| v.position.to_vector()));

        let Some(first) = positions.next() else {
            return (FixVec::ZERO, FixVec::ZERO, Fix::ZERO);
        };
        let (mut min, mut max, mut radius): (Vector3<f64>, Vector3<f64>, f64) =
            (first, first, first.norm());
        for p in positions {
            min = min.inf(&p);
            max = max.sup(&p);
            radius = radius.max(p.norm());
        }
        (
            FixVec::from_vector(&min),
            FixVec::from_vector(&max),
            Fix::from_f64(radius),
        )
    }

    /// Recomputes `min`, `max` and `radius` of every submodel.
    pub fn update_bounds(&mut self) {
        for id in 0..self.submodels.len() {
            let (min, max, radius) = self.bounds(id);
            let submodel = &mut self.submodels[id];
            submodel.min = min;
            submodel.max = max;
            submodel.radius = radius;
        }
    }
}
