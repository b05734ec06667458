//! Resolution: walking the tree for one request.
//!
//! Children are tried static first, then the parameter child, then the
//! wildcard child. A static text match commits: whatever the static child
//! answers is the answer. A parameter branch that fails hands back control
//! with the capture list truncated to where it was before the branch
//! started, so the wildcard never sees values bound by the abandoned one.

use std::collections::{BTreeSet, HashMap};

use tracing::trace;

use super::segment::{is_consumed, split_segment};
use super::{NodeId, Tree};
use crate::error::RouteError;
use crate::method::Method;
use crate::route::Route;

/// Per-lookup state.
struct Search<'t, 'p> {
    method: Method,
    /// `(name, value)` in binding order. Later bindings of a repeated name win.
    captures: Vec<(&'t str, &'p str)>,
    /// Verbs bound at every terminal node reached, none of them `method`.
    allowed: BTreeSet<Method>,
}

impl<H, M> Tree<H, M> {
    /// Resolves `method` + `path` to a [`Route`].
    ///
    /// The path must not carry a query string. Handler and middleware are
    /// cloned out of the tree; with `Arc`-backed values that is a refcount
    /// bump each.
    pub fn find(&self, method: Method, path: &str) -> Result<Route<H, M>, RouteError>
    where
        H: Clone,
        M: Clone,
    {
        let mut search = Search { method, captures: Vec::new(), allowed: BTreeSet::new() };

        let found = self
            .resolve(self.root(), path, &mut search)
            .and_then(|id| Some((id, self.node(id).handlers.get(&method)?.clone())));

        let Some((id, handler)) = found else {
            let allowed: Vec<Method> = search.allowed.into_iter().collect();
            trace!(%method, path, ?allowed, "no route");
            return Err(RouteError::NotFound { method, path: path.to_owned(), allowed });
        };

        let params: HashMap<String, String> = search
            .captures
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();

        Ok(Route::new(method, path.to_owned(), handler, self.middleware_of(id), params))
    }

    fn resolve<'t, 'p>(
        &'t self,
        id: NodeId,
        path: &'p str,
        search: &mut Search<'t, 'p>,
    ) -> Option<NodeId> {
        if is_consumed(path) {
            return self.bound(id, search);
        }

        let node = self.node(id);
        let path = path.strip_prefix('/').unwrap_or(path);
        let (segment, rest) = split_segment(path);
        let mark = search.captures.len();

        let exact = node.statics.iter().copied().find(|c| self.node(*c).segment == segment);
        if let Some(child) = exact {
            return self.resolve(child, rest, search);
        }

        if let Some(child) = node.param {
            search.captures.push((self.capture_name(child), segment));
            if let Some(found) = self.resolve(child, rest, search) {
                return Some(found);
            }
            search.captures.truncate(mark);
        }

        if let Some(child) = node.wildcard {
            // The wildcard takes this segment and everything after it, minus
            // one trailing slash.
            let value = path.strip_suffix('/').unwrap_or(path);
            search.captures.push((self.capture_name(child), value));
            if let Some(found) = self.bound(child, search) {
                return Some(found);
            }
            search.captures.truncate(mark);
        }

        None
    }

    /// Terminal check: does `id` have a handler for the searched verb?
    fn bound(&self, id: NodeId, search: &mut Search<'_, '_>) -> Option<NodeId> {
        let node = self.node(id);
        if node.handlers.contains_key(&search.method) {
            return Some(id);
        }
        search.allowed.extend(node.handlers.keys().copied());
        None
    }

    fn capture_name(&self, id: NodeId) -> &str {
        self.node(id).kind.name().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Tree<&'static str, &'static str> {
        let mut t = Tree::new();
        t.insert(Method::Get, "/users/admin", "admin", []).unwrap();
        t.insert(Method::Get, "/users/{id}", "user", []).unwrap();
        t.insert(Method::Get, "/users/*rest", "rest", []).unwrap();
        t
    }

    #[test]
    fn test_static_beats_param_beats_wildcard() {
        let t = tree();

        let admin = t.find(Method::Get, "/users/admin").unwrap();
        assert_eq!(*admin.handler(), "admin");
        assert!(admin.params().is_empty());

        let user = t.find(Method::Get, "/users/42").unwrap();
        assert_eq!(*user.handler(), "user");
        assert_eq!(user.param("id"), Some("42"));
        assert_eq!(user.params().len(), 1);

        let rest = t.find(Method::Get, "/users/a/b/c").unwrap();
        assert_eq!(*rest.handler(), "rest");
        assert_eq!(rest.param("rest"), Some("a/b/c"));
    }

    #[test]
    fn test_failed_param_branch_leaks_nothing_into_wildcard() {
        let mut t: Tree<&str, &str> = Tree::new();
        t.insert(Method::Get, "/x/{id}/edit", "edit", []).unwrap();
        t.insert(Method::Get, "/x/*rest", "rest", []).unwrap();

        // `{id}` binds "1", then fails on "view"; the wildcard must start clean.
        let route = t.find(Method::Get, "/x/1/view").unwrap();
        assert_eq!(*route.handler(), "rest");
        assert_eq!(route.param("id"), None);
        assert_eq!(route.param("rest"), Some("1/view"));
        assert_eq!(route.params().len(), 1);
    }

    #[test]
    fn test_nested_failures_are_fully_unwound() {
        let mut t: Tree<&str, &str> = Tree::new();
        t.insert(Method::Get, "/{a}/{b}/deep", "deep", []).unwrap();
        t.insert(Method::Get, "/{a}/*tail", "tail", []).unwrap();

        let route = t.find(Method::Get, "/1/2/shallow").unwrap();
        assert_eq!(*route.handler(), "tail");
        assert_eq!(route.param("a"), Some("1"));
        assert_eq!(route.param("b"), None);
        assert_eq!(route.param("tail"), Some("2/shallow"));
    }

    #[test]
    fn test_static_match_commits() {
        let mut t: Tree<&str, &str> = Tree::new();
        t.insert(Method::Get, "/users/admin", "admin", []).unwrap();
        t.insert(Method::Get, "/users/{id}/posts", "posts", []).unwrap();

        let err = t.find(Method::Get, "/users/admin/posts").unwrap_err();
        assert!(!err.is_method_mismatch());
        assert_eq!(*t.find(Method::Get, "/users/7/posts").unwrap().handler(), "posts");
    }

    #[test]
    fn test_allowed_is_union_over_backtracked_branches() {
        let mut t: Tree<&str, &str> = Tree::new();
        t.insert(Method::Get, "/x/{id}", "get", []).unwrap();
        t.insert(Method::Post, "/x/*rest", "post", []).unwrap();

        assert_eq!(*t.find(Method::Post, "/x/1").unwrap().handler(), "post");
        match t.find(Method::Delete, "/x/1").unwrap_err() {
            RouteError::NotFound { allowed, .. } => {
                assert_eq!(allowed, vec![Method::Get, Method::Post]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_wildcard_keeps_inner_slashes() {
        let mut t: Tree<&str, &str> = Tree::new();
        t.insert(Method::Get, "/files/*path", "files", []).unwrap();

        let route = t.find(Method::Get, "/files/a/b/c.txt").unwrap();
        assert_eq!(route.param("path"), Some("a/b/c.txt"));

        let route = t.find(Method::Get, "/files/dir/").unwrap();
        assert_eq!(route.param("path"), Some("dir"));

        let route = t.find(Method::Get, "/files/a/b/").unwrap();
        assert_eq!(route.param("path"), Some("a/b"));

        assert!(t.find(Method::Get, "/files").is_err());
    }

    #[test]
    fn test_multiple_params() {
        let mut t: Tree<&str, &str> = Tree::new();
        t.insert(Method::Get, "/users/{id}/posts/{postId}", "post", []).unwrap();

        let route = t.find(Method::Get, "/users/456/posts/789").unwrap();
        assert_eq!(route.param("id"), Some("456"));
        assert_eq!(route.param("postId"), Some("789"));
    }

    #[test]
    fn test_unbound_verb_is_not_found_with_allowed_list() {
        let t = tree();
        let err = t.find(Method::Post, "/users/admin").unwrap_err();
        assert!(err.is_method_mismatch());
        match err {
            RouteError::NotFound { method, path, allowed } => {
                assert_eq!(method, Method::Post);
                assert_eq!(path, "/users/admin");
                assert_eq!(allowed, vec![Method::Get]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_no_structural_match() {
        let t = tree();
        let err = t.find(Method::Get, "/posts").unwrap_err();
        assert!(!err.is_method_mismatch());
        // `/users` itself is an intermediate node with no handlers.
        let err = t.find(Method::Get, "/users").unwrap_err();
        assert!(!err.is_method_mismatch());
    }

    #[test]
    fn test_leading_and_trailing_slash() {
        let t = tree();
        assert_eq!(*t.find(Method::Get, "users/admin").unwrap().handler(), "admin");
        assert_eq!(*t.find(Method::Get, "/users/admin/").unwrap().handler(), "admin");
    }

    #[test]
    fn test_route_keeps_original_path() {
        let t = tree();
        let route = t.find(Method::Get, "users/42").unwrap();
        assert_eq!(route.path(), "users/42");
        assert_eq!(route.method(), Method::Get);
    }

    #[test]
    fn test_middleware_follows_match_not_siblings() {
        let mut t: Tree<&str, &str> = Tree::new();
        t.layer(t.root(), ["root"]);
        t.insert(Method::Get, "/a/sibling", "s", ["sibling"]).unwrap();
        let a = t.mount(t.root(), "/a", ["a"]).unwrap();
        t.insert_at(a, Method::Get, "/{id}", "h", ["leaf"]).unwrap();

        let route = t.find(Method::Get, "/a/7").unwrap();
        assert_eq!(route.middleware(), ["root", "a", "leaf"]);
    }
}
