//! Which side of an assignment the generator is currently visiting — steers
//! whether a bare identifier reference introduces a new binding (lvalue) or
//! must already resolve to one (rvalue), per spec §4.E's "value-category
//! stack".

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueCategory {
    Rvalue,
    Lvalue,
}
