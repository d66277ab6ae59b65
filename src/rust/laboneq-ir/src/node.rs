// Copyright 2026 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use laboneq_common::tinysample::TinySample;

use crate::IrKind;

/// A node of the scheduled IR tree.
///
/// Start times of children are stored as offsets relative to their parent, the
/// absolute start of a node is the sum of the offsets along its path from the root.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct IrNode {
    pub kind: IrKind,
    /// Length of the node, `None` until it is resolved by a parameter.
    pub length: Option<TinySample>,
    pub children: Vec<NodeChild>,
}

impl IrNode {
    pub fn new(kind: IrKind, length: TinySample) -> Self {
        Self {
            kind,
            length: Some(length),
            children: Vec::new(),
        }
    }

    /// Create a node whose length is set later, e.g. by a sweep parameter.
    pub fn with_deferred_length(kind: IrKind) -> Self {
        Self {
            kind,
            length: None,
            children: Vec::new(),
        }
    }

    pub fn set_length(&mut self, length: TinySample) {
        self.length = Some(length);
    }

    pub fn add_child(&mut self, offset: TinySample, child: IrNode) {
        self.children.push(NodeChild {
            offset,
            node: child,
        });
    }

    /// Builder style variant of [`IrNode::add_child`].
    pub fn with_child(mut self, offset: TinySample, child: IrNode) -> Self {
        self.add_child(offset, child);
        self
    }

    pub fn iter_children(&self) -> impl DoubleEndedIterator<Item = &NodeChild> {
        self.children.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeChild {
    pub offset: TinySample,
    pub node: IrNode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deferred_length() {
        let mut node = IrNode::with_deferred_length(IrKind::Root);
        assert_eq!(node.length, None);
        node.set_length(32);
        assert_eq!(node.length, Some(32));
    }

    #[test]
    fn test_children_keep_offsets() {
        let root = IrNode::new(IrKind::Root, 100)
            .with_child(0, IrNode::new(IrKind::Root, 10))
            .with_child(
                10,
                IrNode::new(IrKind::Root, 10).with_child(0, IrNode::new(IrKind::Root, 5)),
            );
        assert_eq!(root.iter_children().map(|c| c.offset).collect::<Vec<_>>(), [0, 10]);
        let nested = &root.children[1].node;
        assert_eq!(nested.children[0].offset, 0);
        assert_eq!(nested.children[0].node.length, Some(5));
    }
}
