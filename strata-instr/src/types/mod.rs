//! Types module
//!
//! Canonical representation of types used by the `strata-instr` crate. The
//! type system is built on three layers:
//!
//! - Primary types: primitive and vector types (see `primary.rs`).
//! - Aggregate types: arrays and structures (see `aggregate.rs`).
//! - A registry-backed [`AnyType`] wrapper and [`TypeRegistry`] which
//!   deduplicates types and provides stable [`Typeref`] identifiers
//!   (UUID-based).
//!
//! Aggregate types refer to their element types by [`Typeref`], so a type may
//! reference itself directly or transitively. Such recursive types are built
//! with [`TypeRegistry::reserve`] followed by [`TypeRegistry::define`].
use std::{
    collections::{BTreeMap, BTreeSet},
    hash::{DefaultHasher, Hash, Hasher},
};

use log::{debug, info};
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use uuid::{Timestamp, Uuid};

use crate::{
    types::{
        aggregate::{ArrayType, StructType},
        primary::PrimaryType,
    },
    utils::Error,
};
pub mod aggregate;
pub mod primary;

/// A stable reference to a type stored inside a `TypeRegistry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Typeref(Uuid);

/// A sum-type representing any type that can be stored in the registry.
///
/// This includes primary (primitive/vector) types and aggregate types like
/// arrays and structures. [`AnyType`] implements `Hash`/`Eq` so it can be
/// deduplicated by the [`TypeRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnyType {
    /// Primary types: integers, floats, pointers, vectors, void, label,
    /// metadata.
    Primary(PrimaryType),

    /// An array type: element typeref + element count.
    Array(ArrayType),

    /// A structure type: an ordered list of field typerefs.
    Struct(StructType),
}

impl<S: Into<PrimaryType>> From<S> for AnyType {
    fn from(value: S) -> Self {
        AnyType::Primary(value.into())
    }
}

impl From<ArrayType> for AnyType {
    fn from(value: ArrayType) -> Self {
        AnyType::Array(value)
    }
}

impl From<StructType> for AnyType {
    fn from(value: StructType) -> Self {
        AnyType::Struct(value)
    }
}

/// A central registry that stores and deduplicates `AnyType` values.
///
/// The registry provides fast lookup by `Typeref` and ensures identical type
/// descriptions map to the same stable identifier. Recursive types are the
/// exception: a type created through [`TypeRegistry::reserve`] +
/// [`TypeRegistry::define`] keeps its reserved identity and is never merged
/// with a structurally identical later insertion.
///
/// Example:
///
/// ```rust
/// # use strata_instr::types::{TypeRegistry, primary::IType};
/// let reg = TypeRegistry::new([0u8; 6]);
/// let typeref = reg.search_or_insert(IType::I8.into());
/// assert_eq!(reg.search_or_insert(IType::I8.into()), typeref);
/// assert_eq!(reg.get(typeref).as_deref(), Some(&IType::I8.into()));
/// ```
pub struct TypeRegistry {
    array: RwLock<BTreeMap<Uuid, AnyType>>,
    inverse_lookup: RwLock<BTreeMap<u64, SmallVec<[Uuid; 1]>>>,
    reserved: RwLock<BTreeSet<Uuid>>,
    context: uuid::timestamp::context::Context,
    node_id: [u8; 6],
}

impl TypeRegistry {
    fn hash_ty(ty: &AnyType) -> u64 {
        let mut hasher = DefaultHasher::new();
        ty.hash(&mut hasher);
        hasher.finish()
    }

    fn next_uuid(&self) -> Uuid {
        let ts = Timestamp::now(&self.context);
        Uuid::new_v6(ts, &self.node_id)
    }

    /// Create a new [`TypeRegistry`] instance.
    ///
    /// `node_id` is used when allocating UUIDs for newly inserted types.
    pub fn new(node_id: [u8; 6]) -> Self {
        Self {
            array: Default::default(),
            inverse_lookup: Default::default(), // INFO: Always lock array before inverse_lookup to avoid deadlock
            reserved: Default::default(),
            context: uuid::timestamp::context::Context::new(0),
            node_id,
        }
    }

    /// Retrieve a borrowed [`AnyType`] for the given `typeref`. Returns
    /// [`None`] if the given `typeref` is not present in the registry (never
    /// inserted, or reserved but not yet defined).
    ///
    /// # A note on concurrency
    /// This method internally acquires a read lock on the type storage. As a
    /// result,
    ///  1) Multiple concurrent readers are allowed.
    ///  2) You mustn't hold a read-guard while calling
    ///     [`Self::search_or_insert`] as it may attempt to upgrade to a write
    ///     lock, leading to a deadlock.
    ///  3) The returned guard keeps the read lock held for the lifetime of
    ///     the guard.
    pub fn get(&self, typeref: Typeref) -> Option<MappedRwLockReadGuard<'_, AnyType>> {
        let array_lock = self.array.read_recursive();
        RwLockReadGuard::try_map(array_lock, |map| map.get(&typeref.0)).ok()
    }

    /// Clone the [`AnyType`] behind `typeref` out of the registry.
    ///
    /// Convenience for recursive consumers that cannot hold a read guard
    /// across nested lookups.
    pub fn resolve(&self, typeref: Typeref) -> Option<AnyType> {
        self.get(typeref).map(|guard| guard.clone())
    }

    /// Insert `ty` into the registry if an equivalent type doesn't already
    /// exist and return the [`Typeref`] for it.
    ///
    /// If an identical type is already present, its existing [`Typeref`] is
    /// returned, otherwise a new UUID is allocated and the type is inserted.
    ///
    /// # A note on concurrency
    /// This method acquires read locks on the type storage and upgrades them
    /// to write locks if a new type must be inserted. As a result,
    ///  1) You **MUST NOT** hold a read-guard returned by [`Self::get`] while
    ///     calling this method, as it may attempt to upgrade to a write lock,
    ///     leading to a deadlock.
    ///  2) Multiple concurrent readers are allowed, but writers are exclusive.
    ///  3) The "upgradable read lock" pattern minimizes write lock contention;
    ///     writes are assumed rare compared to reads.
    pub fn search_or_insert(&self, ty: AnyType) -> Typeref {
        let h = Self::hash_ty(&ty);

        // Lock ordering is critical, always lock the array first
        let mut array_lock = self.array.upgradable_read();
        let mut inverse_lookup_lock = self.inverse_lookup.upgradable_read();

        // Check if it exists in the inverse_lookup
        if let Some(typerefs) = inverse_lookup_lock.get(&h) {
            for typeref in typerefs {
                let elem = &array_lock[typeref];
                if elem == &ty {
                    return Typeref(*typeref);
                }
            }
        }

        // Otherwise insert a new entry
        // NOTE: Ordering of upgrade is paramount to avoid deadlock
        array_lock.with_upgraded(|array_lock| {
            inverse_lookup_lock.with_upgraded(|inverse_lookup_lock| {
                let new_typeref = self.next_uuid();

                if let Some(list) = inverse_lookup_lock.get_mut(&h) {
                    // Important: log collisions at info level with full context.
                    info!(
                        "Detected a hash collision on hash 0x{:016x} while inserting {:?} (existing entries: {:?})",
                        h, ty, list
                    );
                    list.push(new_typeref);
                } else {
                    debug!("New type encountered {:?}. Registered with UUID {}.", ty, new_typeref);
                    inverse_lookup_lock.insert(h, smallvec![new_typeref]);
                }

                array_lock.insert(new_typeref, ty);
                Typeref(new_typeref)
            })
        })
    }

    /// Reserve a [`Typeref`] without defining its content yet.
    ///
    /// This is the first half of the two-step protocol for building recursive
    /// aggregate types: reserve an identity, mention it inside the aggregate's
    /// fields, then [`Self::define`] the aggregate under the reserved
    /// identity. Until defined, [`Self::get`] returns `None` for the reserved
    /// typeref.
    pub fn reserve(&self) -> Typeref {
        let typeref = self.next_uuid();
        self.reserved.write().insert(typeref);
        debug!("Reserved typeref {} for a forward type definition.", typeref);
        Typeref(typeref)
    }

    /// Define the content of a previously [`Self::reserve`]d typeref.
    ///
    /// Recursive types defined this way keep their reserved identity and do
    /// not participate in structural deduplication: two separately reserved
    /// but structurally identical recursive types remain distinct.
    pub fn define(&self, typeref: Typeref, ty: AnyType) -> Result<(), Error> {
        if !self.reserved.write().remove(&typeref.0) {
            return Err(Error::UnreservedTyperef { typeref: typeref.0 });
        }

        let h = Self::hash_ty(&ty);
        let mut array_lock = self.array.write();
        let mut inverse_lookup_lock = self.inverse_lookup.write();
        if array_lock.contains_key(&typeref.0) {
            return Err(Error::TypeAlreadyDefined { typeref: typeref.0 });
        }

        inverse_lookup_lock
            .entry(h)
            .or_insert_with(SmallVec::new)
            .push(typeref.0);
        array_lock.insert(typeref.0, ty);
        Ok(())
    }

    /// Format a given `Typeref` using this registry.
    ///
    /// Recursive types render a `...` placeholder where they re-enter
    /// themselves.
    pub fn fmt(&self, typeref: Typeref) -> impl std::fmt::Display {
        struct Fmt<'a> {
            registry: &'a TypeRegistry,
            typeref: Typeref,
        }

        impl Fmt<'_> {
            fn write(
                &self,
                f: &mut std::fmt::Formatter<'_>,
                typeref: Typeref,
                path: &mut Vec<Typeref>,
            ) -> std::fmt::Result {
                if path.contains(&typeref) {
                    return write!(f, "...");
                }

                let Some(ty) = self.registry.resolve(typeref) else {
                    return write!(f, "<unknown type {}>", typeref.0);
                };

                match ty {
                    AnyType::Primary(primary) => write!(f, "{}", primary),
                    AnyType::Array(array) => {
                        path.push(typeref);
                        write!(f, "[ {} x ", array.num_elements)?;
                        self.write(f, array.elem, path)?;
                        path.pop();
                        write!(f, " ]")
                    }
                    AnyType::Struct(structure) => {
                        path.push(typeref);
                        write!(f, "{}{{ ", if structure.packed { "<" } else { "" })?;
                        for (i, field) in structure.fields.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            self.write(f, *field, path)?;
                        }
                        path.pop();
                        write!(f, " }}{}", if structure.packed { ">" } else { "" })
                    }
                }
            }
        }

        impl std::fmt::Display for Fmt<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.write(f, self.typeref, &mut Vec::new())
            }
        }

        Fmt {
            registry: self,
            typeref,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::primary::IType;

    #[test]
    fn search_or_insert_deduplicates() {
        let reg = TypeRegistry::new([0; 6]);
        let a = reg.search_or_insert(IType::I32.into());
        let b = reg.search_or_insert(IType::I32.into());
        let c = reg.search_or_insert(IType::I64.into());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn reserve_then_define_builds_recursive_struct() {
        let reg = TypeRegistry::new([0; 6]);
        let i32_ty = reg.search_or_insert(IType::I32.into());

        let node = reg.reserve();
        assert!(reg.get(node).is_none(), "reserved typeref has no content yet");

        reg.define(
            node,
            StructType {
                fields: vec![i32_ty, node],
                packed: false,
            }
            .into(),
        )
        .expect("defining a reserved typeref succeeds");

        let ty = reg.resolve(node).expect("defined typeref resolves");
        assert_eq!(
            ty,
            AnyType::Struct(StructType {
                fields: vec![i32_ty, node],
                packed: false,
            })
        );

        // Rendering a self-referential type terminates.
        let rendered = format!("{}", reg.fmt(node));
        assert!(rendered.contains("..."));
    }

    #[test]
    fn define_rejects_unreserved_and_double_definitions() {
        let reg = TypeRegistry::new([0; 6]);
        let plain = reg.search_or_insert(IType::I8.into());
        assert!(reg.define(plain, IType::I8.into()).is_err());

        let slot = reg.reserve();
        reg.define(slot, IType::I16.into()).expect("first definition");
        assert!(reg.define(slot, IType::I16.into()).is_err());
    }
}
