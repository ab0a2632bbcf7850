//! Non-function global objects and shared global-object metadata.
//!
//! Global variables and aliases, plus the attribute, comdat, and metadata
//! machinery shared by every global object. Each global object carries a
//! general-purpose metadata map and a dedicated, out-of-band [`Ticket`] slot
//! recording its structural digest; stripping the metadata map never touches
//! the ticket.
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumDiscriminants, EnumIs, EnumIter};
use uuid::Uuid;

use crate::{
    consts::AnyConst,
    modules::{Linkage, Visibility, operand::GlobalRef},
    ticket::Ticket,
    types::Typeref,
};

/// Well-known attribute kinds.
///
/// Enum attributes are pure markers; some kinds additionally accept an
/// integer argument (see [`FnAttr::Int`]).
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FnAttrKind {
    AlwaysInline,
    Cold,
    Hot,
    InlineHint,
    MinSize,
    NoInline,
    NoReturn,
    NoUnwind,
    OptSize,
    ReadNone,
    ReadOnly,
    Speculatable,
    WillReturn,
    Alignment,
    AllocSize,
}

/// One attribute of a function or call site.
///
/// String attributes are free-form key/value pairs; enum and integer
/// attributes draw from the closed [`FnAttrKind`] set.
#[derive(Debug, Clone, Hash, PartialEq, Eq, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FnAttr {
    /// Marker attribute.
    Enum(FnAttrKind),

    /// Attribute with an integer argument (e.g. an alignment).
    Int(FnAttrKind, u64),

    /// Free-form target-dependent attribute.
    Str(String, String),
}

/// Selection behavior when the linker encounters several definitions from
/// the same comdat group.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ComdatKind {
    /// Any of the duplicate definitions may be chosen.
    Any,
    /// All duplicates must be identical; mismatch is a link error.
    ExactMatch,
    /// The largest definition wins.
    Largest,
    /// Duplicates are kept, not merged.
    NoDeduplicate,
    /// All duplicates must have the same size.
    SameSize,
}

/// Linker-level grouping allowing duplicate definitions across translation
/// units to be merged.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Comdat {
    pub name: String,
    pub kind: ComdatKind,
}

/// A generic metadata attachment on a global object.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MdValue {
    Str(String),
    Int(u64),
}

/// Map of named metadata attachments.
pub type MdMap = BTreeMap<String, MdValue>;

/// A global variable definition or declaration.
///
/// A variable with no initializer is a declaration: its definition lives in
/// another translation unit (or in the external content-addressed store,
/// once pruned).
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlobalVariable {
    pub uuid: Uuid,
    pub name: String,
    pub ty: Typeref,

    /// `None` makes this global a declaration.
    pub initializer: Option<AnyConst>,

    /// Constant globals are never written after initialization.
    pub is_constant: bool,
    pub alignment: Option<u32>,
    pub linkage: Linkage,
    pub visibility: Visibility,
    pub comdat: Option<Comdat>,
    pub metadata: MdMap,

    /// Structural digest of this definition, attached out-of-band.
    pub ticket: Option<Ticket>,
}

impl GlobalVariable {
    /// A variable without an initializer is a declaration.
    pub fn is_declaration(&self) -> bool {
        self.initializer.is_none()
    }

    /// Reference this variable from an instruction operand.
    pub fn as_ref(&self) -> GlobalRef {
        GlobalRef(self.uuid)
    }
}

/// The aliasee of a [`GlobalAlias`].
#[derive(Debug, Clone, Hash, PartialEq, Eq, EnumDiscriminants, EnumIs)]
#[strum_discriminants(name(AliaseeKind))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Aliasee {
    /// The alias names another global object of the module directly.
    Global(GlobalRef),

    /// The alias resolves through a constant expression (e.g. a pointer into
    /// the middle of a global).
    Expr(AnyConst),
}

/// An alternative name for another global object or for the value of a
/// constant expression.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlobalAlias {
    pub uuid: Uuid,
    pub name: String,
    pub aliasee: Aliasee,
    pub linkage: Linkage,
    pub visibility: Visibility,
    pub metadata: MdMap,

    /// Structural digest of this definition, attached out-of-band.
    pub ticket: Option<Ticket>,
}

impl GlobalAlias {
    /// Reference this alias from an instruction operand.
    pub fn as_ref(&self) -> GlobalRef {
        GlobalRef(self.uuid)
    }
}
