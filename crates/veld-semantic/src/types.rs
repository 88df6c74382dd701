//! The resolved type table.
//!
//! Types are interned: one `TypeId` per class node, per primitive name, and
//! a single error type. `TypeId` equality is therefore identity within one
//! table. No inference happens here.

use rustc_hash::FxHashMap;
use veld_common::Atom;

use crate::node::NodeId;

/// Index of a type in a `TypeTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

/// The closed set of resolved type shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// Instance type of a class declaration.
    Class(NodeId),
    /// A built-in type with no members.
    Primitive(Atom),
    /// Resolution failed; has no members.
    Error,
}

/// Interning store of resolved types.
#[derive(Debug, Default)]
pub struct TypeTable {
    types: Vec<TypeData>,
    class_types: FxHashMap<NodeId, TypeId>,
    primitives: FxHashMap<Atom, TypeId>,
    error: Option<TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, data: TypeData) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(data);
        id
    }

    /// The instance type of `class`, interned per class node.
    pub fn class_type(&mut self, class: NodeId) -> TypeId {
        if let Some(&id) = self.class_types.get(&class) {
            return id;
        }
        let id = self.alloc(TypeData::Class(class));
        self.class_types.insert(class, id);
        id
    }

    pub fn primitive(&mut self, name: Atom) -> TypeId {
        if let Some(&id) = self.primitives.get(&name) {
            return id;
        }
        let id = self.alloc(TypeData::Primitive(name));
        self.primitives.insert(name, id);
        id
    }

    pub fn error_type(&mut self) -> TypeId {
        if let Some(id) = self.error {
            return id;
        }
        let id = self.alloc(TypeData::Error);
        self.error = Some(id);
        id
    }

    pub fn get(&self, id: TypeId) -> Option<TypeData> {
        self.types.get(id.0 as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_types_are_interned_per_node() {
        let mut table = TypeTable::new();
        let a = table.class_type(NodeId(3));
        let b = table.class_type(NodeId(3));
        let c = table.class_type(NodeId(4));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.get(a), Some(TypeData::Class(NodeId(3))));
    }

    #[test]
    fn error_type_is_a_singleton() {
        let mut table = TypeTable::new();
        assert_eq!(table.error_type(), table.error_type());
    }
}
