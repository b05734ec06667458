//! Registration: growing the tree.

use tracing::{debug, warn};

use super::segment::{self, Segment};
use super::{Kind, Node, NodeId, Tree};
use crate::error::RouteError;
use crate::method::Method;

impl<H, M> Tree<H, M> {
    /// Binds `handler` for `method` at `path`, relative to the root.
    ///
    /// See [`insert_at`](Tree::insert_at).
    pub fn insert<I>(
        &mut self,
        method: Method,
        path: &str,
        handler: H,
        middleware: I,
    ) -> Result<NodeId, RouteError>
    where
        I: IntoIterator<Item = M>,
    {
        self.insert_at(self.root(), method, path, handler, middleware)
    }

    /// Binds `handler` for `method` at `path`, relative to `at`.
    ///
    /// `middleware` is appended to the destination node's own list. A second
    /// handler for the same verb at the same node fails with
    /// [`RouteError::AlreadyExists`] and leaves the first one bound.
    ///
    /// Panics if `at` does not belong to this tree (see [`NodeId`]).
    ///
    /// A parameter position keeps the name it was first registered with:
    /// `/users/{id}` followed by `/users/{uid}/posts` shares one node named
    /// `id`, and the second path's handler will see `id`, not `uid`.
    pub fn insert_at<I>(
        &mut self,
        at: NodeId,
        method: Method,
        path: &str,
        handler: H,
        middleware: I,
    ) -> Result<NodeId, RouteError>
    where
        I: IntoIterator<Item = M>,
    {
        let target = self.walk(at, path)?;

        if self.node(target).handlers.contains_key(&method) {
            return Err(RouteError::AlreadyExists { method, path: self.path_of(target) });
        }

        debug!(%method, path = %self.path_of(target), "route registered");
        let node = self.node_mut(target);
        node.middleware.extend(middleware);
        node.handlers.insert(method, handler);
        Ok(target)
    }

    /// Creates (or finds) the node for a path prefix without binding a
    /// handler, appending `middleware` to it. Mounting the same prefix twice
    /// returns the same node.
    pub fn mount<I>(&mut self, at: NodeId, prefix: &str, middleware: I) -> Result<NodeId, RouteError>
    where
        I: IntoIterator<Item = M>,
    {
        let target = self.walk(at, prefix)?;
        self.layer(target, middleware);
        Ok(target)
    }

    /// Appends middleware to a node's local list.
    pub fn layer<I>(&mut self, at: NodeId, middleware: I)
    where
        I: IntoIterator<Item = M>,
    {
        self.node_mut(at).middleware.extend(middleware);
    }

    /// Classifies `path`, then follows it down from `at`, creating missing
    /// nodes. Returns the node the path ends on.
    fn walk(&mut self, at: NodeId, path: &str) -> Result<NodeId, RouteError> {
        let segments = segment::parse(path)?;

        if matches!(self.node(at).kind, Kind::Wildcard(_)) && !segments.is_empty() {
            return Err(RouteError::MalformedPath {
                path: format!("{}{path}", self.path_of(at)),
                reason: "wildcard must be the final segment".to_owned(),
            });
        }

        Ok(segments.into_iter().fold(at, |node, segment| self.child(node, segment)))
    }

    /// The child of `parent` matching `segment`, created on first use.
    fn child(&mut self, parent: NodeId, segment: Segment<'_>) -> NodeId {
        let (param, wildcard) = (self.node(parent).param, self.node(parent).wildcard);
        match segment {
            Segment::Param(name) => match param {
                Some(existing) => {
                    self.warn_on_rename(existing, name);
                    existing
                }
                None => {
                    let id = self.push(parent, Kind::Param(name.to_owned()), &format!("{{{name}}}"));
                    self.node_mut(parent).param = Some(id);
                    id
                }
            },
            Segment::Wildcard(name) => match wildcard {
                Some(existing) => {
                    self.warn_on_rename(existing, name);
                    existing
                }
                None => {
                    let id = self.push(parent, Kind::Wildcard(name.to_owned()), &format!("*{name}"));
                    self.node_mut(parent).wildcard = Some(id);
                    id
                }
            },
            Segment::Static(text) => {
                let found = self
                    .node(parent)
                    .statics
                    .iter()
                    .copied()
                    .find(|c| self.node(*c).segment == text);
                match found {
                    Some(existing) => existing,
                    None => {
                        let id = self.push(parent, Kind::Static, text);
                        self.node_mut(parent).statics.push(id);
                        id
                    }
                }
            }
        }
    }

    fn push(&mut self, parent: NodeId, kind: Kind, segment: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind, segment, Some(parent)));
        id
    }

    fn warn_on_rename(&self, existing: NodeId, name: &str) {
        match self.node(existing).kind.name() {
            Some(bound) if bound != name => warn!(
                position = %self.path_of(existing),
                bound,
                requested = name,
                "capture name differs from the first registration, keeping the first"
            ),
            _ => {}
        }
    }
}
