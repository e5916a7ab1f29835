//! K-d node: a tagged variant rather than a base class with virtual
//! dispatch (§9 — "Dynamic dispatch on k-d nodes").

use crate::geometry::Aabb;
use crate::kdtree::plane::KdPlane;

#[derive(Debug)]
pub enum KdNode {
    Leaf {
        region: Aabb,
        /// Indices into the owning `KdTree`'s entry arena. An entry may
        /// be listed in more than one leaf if it straddles a split.
        entries: Vec<usize>,
    },
    Middle {
        region: Aabb,
        plane: KdPlane,
        left: Option<Box<KdNode>>,
        right: Option<Box<KdNode>>,
    },
}

impl KdNode {
    pub fn region(&self) -> &Aabb {
        match self {
            KdNode::Leaf { region, .. } => region,
            KdNode::Middle { region, .. } => region,
        }
    }
}
