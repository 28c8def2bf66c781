//! Bridges the opaque handle newtypes `mtype_ir` defines
//! ([`mtype_ir::ValueScopeId`], [`mtype_ir::TypeScopeId`]) to the generic
//! arena code in this crate.

use mtype_ir::{TypeScopeId, ValueScopeId};

pub trait ScopeHandle: Copy + Eq + std::hash::Hash {
    fn from_raw(raw: u32) -> Self;
    fn raw(self) -> u32;
}

macro_rules! impl_scope_handle {
    ($t:ty) => {
        impl ScopeHandle for $t {
            fn from_raw(raw: u32) -> Self {
                <$t>::from_raw(raw)
            }
            fn raw(self) -> u32 {
                <$t>::raw(self)
            }
        }
    };
}

impl_scope_handle!(ValueScopeId);
impl_scope_handle!(TypeScopeId);
