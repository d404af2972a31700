use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::scene::NodeId;

/// Click handler attached to a mesh. Receives the clicked node.
pub type ClickHandler = Rc<dyn Fn(NodeId)>;

/// Side registry of per-mesh click handlers.
///
/// Handlers are keyed by node id rather than stored on the nodes, so the
/// scene graph stays plain data and unmounting a model releases its
/// handlers with [`release`](Self::release).
#[derive(Default)]
pub struct ClickHandlers {
    handlers: FxHashMap<NodeId, ClickHandler>,
}

impl std::fmt::Debug for ClickHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickHandlers")
            .field("len", &self.handlers.len())
            .finish()
    }
}

impl ClickHandlers {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach (or replace) the handler for `node`.
    pub fn attach(&mut self, node: NodeId, handler: ClickHandler) {
        let _ = self.handlers.insert(node, handler);
    }

    /// Remove the handlers of every node in `nodes`.
    pub fn release(&mut self, nodes: &[NodeId]) {
        for node in nodes {
            let _ = self.handlers.remove(node);
        }
    }

    /// Handler for `node`, if one is attached.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&ClickHandler> {
        self.handlers.get(&node)
    }

    /// Number of nodes with a handler.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
