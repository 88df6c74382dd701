//! Arena-allocated semantic nodes.
//!
//! Every resolved program entity (package, class, function, local, import)
//! is one `Node` in a `NodeArena`, addressed by a copyable `NodeId`. Parent
//! links allow upward walks; `children` preserves declaration order.

use veld_common::{Atom, Span};

use crate::types::TypeId;

/// Index of a node in a `NodeArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel for "no node" (e.g., the parent of a root package).
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// Node flags packed into a `u32`.
pub mod node_flags {
    /// Declared with `var` rather than `val`.
    pub const MUTABLE: u32 = 1 << 0;
    /// Compiler-generated; carries no source location.
    pub const SYNTHETIC: u32 = 1 << 1;
}

/// The closed set of semantic node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Package,
    Class,
    Function,
    Param,
    Block,
    Local,
    Field,
    Method,
    ImportExplicit,
    ImportStar,
    TypeParam,
}

impl NodeKind {
    /// Function-like nodes delimit position-based resolution.
    pub fn is_function_like(self) -> bool {
        matches!(self, NodeKind::Function | NodeKind::Method)
    }

    /// Nodes that introduce a name into an enclosing scope.
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::Class
                | NodeKind::Function
                | NodeKind::Param
                | NodeKind::Local
                | NodeKind::Field
                | NodeKind::Method
                | NodeKind::Package
        )
    }
}

/// One semantic node.
///
/// `target` is a kind-dependent link: superclass for `Class`, imported
/// declaration for `ImportExplicit`, imported package for `ImportStar`.
/// `span` is `None` for synthetic nodes.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub name: Option<Atom>,
    pub parent: NodeId,
    pub span: Option<Span>,
    pub flags: u32,
    pub target: NodeId,
    pub ty: Option<TypeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn is_mutable(&self) -> bool {
        (self.flags & node_flags::MUTABLE) != 0
    }

    pub fn is_synthetic(&self) -> bool {
        (self.flags & node_flags::SYNTHETIC) != 0
    }
}

/// Owning arena of semantic nodes.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes with their ids, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }
}
