//! The closed type-term variant set (spec §3.1).
//!
//! Every term is arena-allocated in a [`crate::pool::Pool`] and referenced by
//! a [`TypeId`]. Two terms are equal iff they are the *same* arena slot —
//! there is deliberately no structural deduplication here (unlike an
//! interned-index pool): the spec requires two independently-constructed
//! occurrences of, say, `double` to remain distinct terms that unification
//! then equates, because cyclic class types and repeated scheme
//! instantiation both rely on being able to tell "this exact occurrence"
//! apart from "a structurally identical one elsewhere".

use mtype_ir::{StringId, TypeIdentifier};

/// A stable arena handle. Valid for the lifetime of the compilation; never
/// recycled, never relocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Which length-mismatch rule applies when unifying a [`Term::DestructuredTuple`]
/// (spec §4.C.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DtKind {
    DefinitionInputs,
    DefinitionOutputs,
    Rvalue,
    Lvalue,
}

/// Discriminates an [`Term::Abstraction`]'s calling convention. Two
/// abstractions of different kinds never unify (spec §4.C.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbstractionKind {
    Function,
    Anonymous,
    BinaryOperator,
    UnaryOperator,
    Subscript,
    Concatenation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Number(f64),
    Char(char),
    Str(String),
}

impl Eq for ConstantValue {}

#[derive(Debug, Clone, Default)]
pub struct RecordField {
    pub name: TypeIdentifier,
    pub value: TypeId,
}

/// The 14-variant closed set from spec §3.1.
#[derive(Debug, Clone)]
pub enum Term {
    /// A unification variable, possibly bound via the substitution. `name`
    /// is an optional display hint (the source identifier this variable was
    /// created for), never consulted by the unifier itself.
    Variable { name: Option<StringId> },

    /// A named nominal type, e.g. `double`, or `list<T>` when `args` is
    /// non-empty.
    Scalar { name: StringId, args: Vec<TypeId> },

    /// A fixed-arity ordered product.
    Tuple { elements: Vec<TypeId> },

    /// A positional argument/return pack; `kind` steers length-mismatch
    /// handling during unification (spec §4.C.3).
    DestructuredTuple { kind: DtKind, members: Vec<TypeId> },

    /// A variadic repeating pack (`varargin`/`varargout`, concatenation).
    List { elements: Vec<TypeId> },

    /// A set of alternatives; unification may refine it down to the
    /// members that remain unifiable.
    Union { members: Vec<TypeId> },

    /// Named fields. Field names are type identifiers; order does not
    /// matter for unification but is preserved for display.
    Record { fields: Vec<RecordField> },

    /// A nominal class type with an underlying source type (normally a
    /// `Record`).
    Class { name: StringId, source: TypeId },

    /// A function/method type. `inputs`/`outputs` are always
    /// `DestructuredTuple`s (possibly empty).
    Abstraction {
        inputs: TypeId,
        outputs: TypeId,
        kind: AbstractionKind,
    },

    /// Universally quantified over the variables in `params` (each a
    /// `Variable` term). Instantiation substitutes fresh variables for
    /// them.
    Scheme { params: Vec<TypeId>, body: TypeId },

    /// An unresolved call site: `target` may be a `Scheme` to instantiate or
    /// an `Abstraction` to unify with directly.
    Application {
        target: TypeId,
        inputs: TypeId,
        outputs: TypeId,
    },

    /// A transparent synonym; unification unfolds it before dispatching.
    Alias { name: StringId, target: TypeId },

    /// An indirect handle to a scheme's parameter pack.
    Parameters { scheme: TypeId },

    /// A literal-type bridge used for end-of-indexing overloads and
    /// checking literals against nominal scalars.
    ConstantValue { value: ConstantValue },
}

impl Term {
    pub fn variant_name(&self) -> &'static str {
        match self {
            Term::Variable { .. } => "Variable",
            Term::Scalar { .. } => "Scalar",
            Term::Tuple { .. } => "Tuple",
            Term::DestructuredTuple { .. } => "DestructuredTuple",
            Term::List { .. } => "List",
            Term::Union { .. } => "Union",
            Term::Record { .. } => "Record",
            Term::Class { .. } => "Class",
            Term::Abstraction { .. } => "Abstraction",
            Term::Scheme { .. } => "Scheme",
            Term::Application { .. } => "Application",
            Term::Alias { .. } => "Alias",
            Term::Parameters { .. } => "Parameters",
            Term::ConstantValue { .. } => "ConstantValue",
        }
    }
}
