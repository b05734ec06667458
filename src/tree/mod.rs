//! The path-segment tree.
//!
//! Nodes live in an arena owned by [`Tree`]. Children are referenced by
//! [`NodeId`]; every node also remembers its parent's id, which is only ever
//! walked upwards, to rebuild a node's path or collect its middleware.
//!
//! ```text
//! (root)
//!  ├── users            static
//!  │    ├── admin       static    GET
//!  │    ├── {id}        param     GET, DELETE
//!  │    └── *rest       wildcard  GET
//!  └── files
//!       └── *path       wildcard  GET
//! ```
//!
//! The tree is generic over the handler `H` and middleware `M` it stores, so
//! it can be driven without any HTTP types at all. [`Router`](crate::Router)
//! instantiates it with boxed async handlers.

mod find;
mod insert;
pub(crate) mod segment;

use std::collections::HashMap;

use crate::method::Method;

/// Index of a node inside its [`Tree`].
///
/// Ids are only meaningful for the tree that handed them out. Every method
/// taking a `NodeId` panics if the id is out of range for `self`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeId(usize);

/// What a node's segment matches.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Kind {
    /// The root. Empty segment text.
    Root,
    /// Exact text.
    Static,
    /// One path component, captured under the name.
    Param(String),
    /// Everything left in the path, slashes included.
    Wildcard(String),
}

impl Kind {
    /// The capture name of a parameter or wildcard node.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Param(name) | Self::Wildcard(name) => Some(name),
            Self::Root | Self::Static => None,
        }
    }
}

/// A single position in the tree.
pub struct Node<H, M> {
    kind: Kind,
    segment: String,
    handlers: HashMap<Method, H>,
    middleware: Vec<M>,
    parent: Option<NodeId>,
    statics: Vec<NodeId>,
    param: Option<NodeId>,
    wildcard: Option<NodeId>,
}

impl<H, M> Node<H, M> {
    fn new(kind: Kind, segment: &str, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            segment: segment.to_owned(),
            handlers: HashMap::new(),
            middleware: Vec::new(),
            parent,
            statics: Vec::new(),
            param: None,
            wildcard: None,
        }
    }

    pub fn kind(&self) -> &Kind { &self.kind }
    pub fn segment(&self) -> &str { &self.segment }
    pub fn parent(&self) -> Option<NodeId> { self.parent }
    pub fn middleware(&self) -> &[M] { &self.middleware }

    /// Verbs with a handler bound at this node, sorted.
    pub fn methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.handlers.keys().copied().collect();
        methods.sort();
        methods
    }
}

/// An arena-backed routing tree.
///
/// Registration takes `&mut self` and lookups take `&self`, so a tree shared
/// behind an `Arc` is frozen for as long as it is shared.
pub struct Tree<H, M> {
    nodes: Vec<Node<H, M>>,
}

impl<H, M> Tree<H, M> {
    pub fn new() -> Self {
        Self { nodes: vec![Node::new(Kind::Root, "", None)] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes below the root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// `true` while the tree holds nothing but its root.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// # Panics
    ///
    /// If `id` came from a tree with fewer nodes.
    pub fn node(&self, id: NodeId) -> &Node<H, M> {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<H, M> {
        &mut self.nodes[id.0]
    }

    /// `id` followed by each of its ancestors up to the root.
    fn lineage(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), |n| self.node(*n).parent)
    }

    /// Rebuilds the registered path of a node, e.g. `/users/{id}`.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut segments: Vec<&str> = self
            .lineage(id)
            .filter(|n| self.node(*n).kind != Kind::Root)
            .map(|n| self.node(n).segment.as_str())
            .collect();
        if segments.is_empty() {
            return "/".to_owned();
        }
        segments.reverse();
        segments.iter().fold(String::new(), |mut path, segment| {
            path.push('/');
            path.push_str(segment);
            path
        })
    }

    /// Middleware from the root down to `id`, root first.
    pub fn middleware_of(&self, id: NodeId) -> Vec<M>
    where
        M: Clone,
    {
        let mut lineage: Vec<NodeId> = self.lineage(id).collect();
        lineage.reverse();
        lineage
            .into_iter()
            .flat_map(|n| self.node(n).middleware.iter().cloned())
            .collect()
    }
}

impl<H, M> Default for Tree<H, M> {
    fn default() -> Self { Self::new() }
}
