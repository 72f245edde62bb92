//! Path-segment trie mapping `(method, path)` to handlers.

use crate::{http::types::Method, server::server_impl::HandlerFunc};
use std::collections::HashMap;

// One segment of registered path space. A node whose segment starts
// with `:` is dynamic: it matches any single path segment and binds it
// to the parameter name.
struct Node {
    path_segment: String,
    is_dynamic: bool,
    handlers: HashMap<Method, HandlerFunc>,
    children: HashMap<String, Node>,
    // Key of the at-most-one dynamic child.
    dynamic_child: Option<String>,
}

impl Node {
    fn new(segment: &str) -> Self {
        Node {
            path_segment: segment.to_owned(),
            is_dynamic: segment.starts_with(':'),
            handlers: HashMap::new(),
            children: HashMap::new(),
            dynamic_child: None,
        }
    }

    // The child for `segment`, created on demand. A dynamic segment
    // with a new parameter name takes over the existing dynamic child,
    // keeping its subtree.
    fn child_mut(&mut self, segment: &str) -> &mut Node {
        if segment.starts_with(':') {
            if let Some(existing) = self.dynamic_child.clone() {
                if existing != segment {
                    if let Some(mut node) = self.children.remove(&existing) {
                        node.path_segment = segment.to_owned();
                        self.children.insert(segment.to_owned(), node);
                    }
                }
            }
            self.dynamic_child = Some(segment.to_owned());
        }

        self.children
            .entry(segment.to_owned())
            .or_insert_with(|| Node::new(segment))
    }

    fn dynamic(&self) -> Option<&Node> {
        self.children.get(self.dynamic_child.as_deref()?)
    }
}

/// The route table. Built once at startup through `&mut self`, then
/// only read — shared lookups need no locking because the type system
/// rules out concurrent registration.
pub(crate) struct RouteTrie {
    root: Node,
}

impl RouteTrie {
    pub(crate) fn new() -> Self {
        RouteTrie {
            root: Node::new(""),
        }
    }

    /// Registers `handler` for every method in `methods` at `pattern`.
    /// Patterns start with `/`; a segment like `:id` is dynamic. A
    /// second registration for the same terminal node and method
    /// replaces the previous handler.
    pub(crate) fn add_route(&mut self, pattern: &str, methods: &[Method], handler: HandlerFunc) {
        let mut node = &mut self.root;
        for segment in pattern.split('/').skip(1) {
            node = node.child_mut(segment);
        }

        for &method in methods {
            node.handlers.insert(method, handler.clone());
        }
    }

    /// Walks `path` segment by segment. At each step a literal child
    /// wins over the dynamic one; descending through a dynamic child
    /// records the segment under the parameter name. Returns the
    /// handler and collected parameters, or `None` when the walk dies
    /// or the terminal node has nothing for `method`.
    pub(crate) fn lookup(
        &self,
        path: &str,
        method: Method,
    ) -> Option<(HandlerFunc, HashMap<String, String>)> {
        let mut node = &self.root;
        let mut params = HashMap::new();

        for segment in path.split('/').skip(1) {
            let literal = node.children.get(segment).filter(|child| !child.is_dynamic);
            node = match literal {
                Some(child) => child,
                None => {
                    let child = node.dynamic()?;
                    params.insert(child.path_segment[1..].to_owned(), segment.to_owned());
                    child
                }
            };
        }

        let handler = node.handlers.get(&method)?.clone();
        Some((handler, params))
    }
}
