//! Value and type scope trees, and type-import resolution (spec §3.3, §4.D).

pub mod error;
pub mod handle;
pub mod scope;
pub mod type_scope;
pub mod value_scope;

pub use error::ScopeError;
pub use handle::ScopeHandle;
pub use scope::{Import, ScopeArena, ScopeNode};
pub use type_scope::{lookup_type, resolve_imports, TypeScopeArena};
pub use value_scope::{lookup_value, ValueScopeArena};
