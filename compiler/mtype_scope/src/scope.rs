//! A generic scope tree, shared by [`crate::value_scope`] and
//! [`crate::type_scope`] (spec §3.3, §4.D: "same shape, different lookup
//! order").

use std::hash::Hash;
use std::marker::PhantomData;

use mtype_ir::Token;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::handle::ScopeHandle;

/// A reference to another scope whose exports become visible here.
///
/// `is_exported` controls whether *this* import is itself visible to
/// whatever imports the scope that holds it — re-exports only propagate
/// through hops that were themselves marked exported (spec §3.3/§3.5).
#[derive(Debug, Clone)]
pub struct Import<Id> {
    pub source: Id,
    pub is_exported: bool,
    pub token: Token,
}

pub struct ScopeNode<Id, K, V> {
    pub parent: Option<Id>,
    pub children: Vec<Id>,
    pub local: FxHashMap<K, (V, Token)>,
    pub exports: FxHashSet<K>,
    pub imports: Vec<Import<Id>>,
}

impl<Id, K, V> Default for ScopeNode<Id, K, V> {
    fn default() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            local: FxHashMap::default(),
            exports: FxHashSet::default(),
            imports: Vec::new(),
        }
    }
}

/// Owns every scope node created during a compilation, indexed by handle.
pub struct ScopeArena<Id, K, V> {
    nodes: Vec<ScopeNode<Id, K, V>>,
    _marker: PhantomData<Id>,
}

impl<Id, K, V> Default for ScopeArena<Id, K, V> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            _marker: PhantomData,
        }
    }
}

impl<Id, K, V> ScopeArena<Id, K, V>
where
    Id: ScopeHandle,
    K: Copy + Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_scope(&mut self, parent: Option<Id>) -> Id {
        let id = Id::from_raw(self.nodes.len() as u32);
        self.nodes.push(ScopeNode {
            parent,
            ..ScopeNode::default()
        });
        if let Some(p) = parent {
            self.node_mut(p).children.push(id);
        }
        id
    }

    pub fn node(&self, id: Id) -> &ScopeNode<Id, K, V> {
        &self.nodes[id.raw() as usize]
    }

    pub fn node_mut(&mut self, id: Id) -> &mut ScopeNode<Id, K, V> {
        &mut self.nodes[id.raw() as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Define `key` locally. Returns the previous binding's token, if any —
    /// the caller decides whether redefinition is an error (duplicate
    /// detection within one scope is a definition-time concern, not a
    /// lookup-time one).
    pub fn define_local(&mut self, id: Id, key: K, value: V, token: Token) -> Option<Token> {
        self.node_mut(id)
            .local
            .insert(key, (value, token))
            .map(|(_, t)| t)
    }

    pub fn export(&mut self, id: Id, key: K) {
        debug_assert!(
            self.node(id).local.contains_key(&key),
            "exported identifier must already be defined locally"
        );
        self.node_mut(id).exports.insert(key);
    }

    pub fn add_import(&mut self, id: Id, source: Id, is_exported: bool, token: Token) {
        self.node_mut(id).imports.push(Import { source, is_exported, token });
    }

    pub fn lookup_local(&self, id: Id, key: &K) -> Option<&(V, Token)> {
        self.node(id).local.get(key)
    }
}
