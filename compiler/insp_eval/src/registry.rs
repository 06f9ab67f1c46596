//! Registry for named types and constraints.
//!
//! The host language has no type definitions of its own. Embedders (and
//! tests) describe their types here before checking a module: plain
//! aggregates, single-inheritance classes, closed sums, tuple-like records,
//! optionals and an `any`-like box. Constraints are named sets of types, the way
//! `Integral: let n` names a family of alternatives.
//!
//! # Design
//!
//! - Dual indexing: `BTreeMap` by name for deterministic iteration, and the
//!   pool's `TypeKind::User` index into `users` for O(1) lookup by type.
//! - The registry owns the [`TypePool`], so structural types interned while
//!   checking share one id space with the registered names.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use insp_ir::{AccessStyle, ConstraintId, TyId};
use insp_sema::SizeProbe;

use crate::types::{TypeKind, TypePool, UserId};

/// A data member.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDef {
    pub name: String,
    pub ty: TyId,
    /// Width in bits for a bit-field member.
    pub bits: Option<u8>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TyId) -> Self {
        FieldDef {
            name: name.into(),
            ty,
            bits: None,
        }
    }

    /// An integral bit-field of `width` bits.
    pub fn bit_field(name: impl Into<String>, ty: TyId, width: u8) -> Self {
        FieldDef {
            name: name.into(),
            ty,
            bits: Some(width),
        }
    }
}

/// A closed sum: exactly one alternative is active at a time.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariantDef {
    pub alternatives: Vec<TyId>,
    pub size: SizeProbe,
    pub index: Option<AccessStyle>,
    pub get: Option<AccessStyle>,
}

impl VariantDef {
    /// A well-formed closed sum with member `index()` and `get<I>()`.
    pub fn new(alternatives: Vec<TyId>) -> Self {
        let size = SizeProbe::Size(alternatives.len() as u64);
        VariantDef {
            alternatives,
            size,
            index: Some(AccessStyle::Member),
            get: Some(AccessStyle::Member),
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: SizeProbe) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_index(mut self, index: Option<AccessStyle>) -> Self {
        self.index = index;
        self
    }

    #[must_use]
    pub fn with_get(mut self, get: Option<AccessStyle>) -> Self {
        self.get = get;
        self
    }
}

/// A tuple-like product reached through a size trait and `get<I>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleDef {
    pub elements: Vec<TyId>,
    pub size: SizeProbe,
    pub get: Option<AccessStyle>,
}

impl TupleDef {
    pub fn new(elements: Vec<TyId>) -> Self {
        let size = SizeProbe::Size(elements.len() as u64);
        TupleDef {
            elements,
            size,
            get: Some(AccessStyle::Free),
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: SizeProbe) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_get(mut self, get: Option<AccessStyle>) -> Self {
        self.get = get;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UserKind {
    /// Plain aggregate; decomposes by data members.
    Aggregate(Vec<FieldDef>),
    /// Polymorphic class. `fields` are its own members; the base's come first.
    Class {
        base: Option<TyId>,
        fields: Vec<FieldDef>,
    },
    Variant(VariantDef),
    Tuple(TupleDef),
    /// Type-erased box with a `try_cast<T>` overload for every `T`.
    Any,
    /// Maybe-empty `T`: tests as `bool` and dereferences with `*`.
    Optional(TyId),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserType {
    pub name: String,
    pub ty: TyId,
    pub kind: UserKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ConstraintDef {
    name: String,
    satisfied: Vec<TyId>,
}

/// Named types and constraints, plus the pool they are interned in.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    pool: TypePool,
    /// Every nameable type, builtins included.
    types_by_name: BTreeMap<String, TyId>,
    users: Vec<UserType>,
    constraints: Vec<ConstraintDef>,
    constraints_by_name: FxHashMap<String, ConstraintId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            pool: TypePool::new(),
            types_by_name: BTreeMap::new(),
            users: Vec::new(),
            constraints: Vec::new(),
            constraints_by_name: FxHashMap::default(),
        };
        for (name, ty) in [
            ("int", TypePool::INT),
            ("long", TypePool::LONG),
            ("char", TypePool::CHAR),
            ("bool", TypePool::BOOL),
            ("double", TypePool::DOUBLE),
            ("void", TypePool::VOID),
        ] {
            registry.types_by_name.insert(name.to_string(), ty);
        }
        let integral = vec![TypePool::INT, TypePool::LONG, TypePool::CHAR, TypePool::BOOL];
        let mut arithmetic = integral.clone();
        arithmetic.push(TypePool::DOUBLE);
        registry.define_constraint("Integral", integral);
        registry.define_constraint("Floating", vec![TypePool::DOUBLE]);
        registry.define_constraint("Arithmetic", arithmetic);
        registry
    }

    #[inline]
    pub fn pool(&self) -> &TypePool {
        &self.pool
    }

    #[inline]
    pub fn pool_mut(&mut self) -> &mut TypePool {
        &mut self.pool
    }

    pub fn lookup(&self, name: &str) -> Option<TyId> {
        self.types_by_name.get(name).copied()
    }

    pub fn lookup_constraint(&self, name: &str) -> Option<ConstraintId> {
        self.constraints_by_name.get(name).copied()
    }

    pub fn define_aggregate(&mut self, name: &str, fields: Vec<FieldDef>) -> TyId {
        self.define(name, UserKind::Aggregate(fields))
    }

    pub fn define_class(&mut self, name: &str, base: Option<TyId>, fields: Vec<FieldDef>) -> TyId {
        self.define(name, UserKind::Class { base, fields })
    }

    pub fn define_variant(&mut self, name: &str, def: VariantDef) -> TyId {
        self.define(name, UserKind::Variant(def))
    }

    pub fn define_tuple(&mut self, name: &str, def: TupleDef) -> TyId {
        self.define(name, UserKind::Tuple(def))
    }

    pub fn define_any(&mut self, name: &str) -> TyId {
        self.define(name, UserKind::Any)
    }

    pub fn define_optional(&mut self, name: &str, payload: TyId) -> TyId {
        self.define(name, UserKind::Optional(payload))
    }

    /// What `*` yields for an optional.
    pub fn optional_payload(&self, ty: TyId) -> Option<TyId> {
        match self.user(ty)?.kind {
            UserKind::Optional(payload) => Some(payload),
            _ => None,
        }
    }

    /// Register a constraint satisfied by exactly the types in `satisfied`.
    pub fn define_constraint(&mut self, name: &str, satisfied: Vec<TyId>) -> ConstraintId {
        let id = ConstraintId::from_len(self.constraints.len());
        self.constraints.push(ConstraintDef {
            name: name.to_string(),
            satisfied,
        });
        self.constraints_by_name.insert(name.to_string(), id);
        id
    }

    fn define(&mut self, name: &str, kind: UserKind) -> TyId {
        let id = UserId(u32::try_from(self.users.len()).unwrap_or(u32::MAX));
        let ty = self.pool.intern(TypeKind::User(id));
        if self.types_by_name.insert(name.to_string(), ty).is_some() {
            tracing::warn!(name, "type redefined; the earlier definition is shadowed");
        }
        tracing::debug!(name, ?ty, "registered user type");
        self.users.push(UserType {
            name: name.to_string(),
            ty,
            kind,
        });
        ty
    }

    /// The user definition behind `ty`, ignoring top-level `const`.
    pub fn user(&self, ty: TyId) -> Option<&UserType> {
        self.pool.user(ty).and_then(|id| self.users.get(id.index()))
    }

    /// Data members in layout order; a class lists its bases' members first.
    pub fn fields(&self, ty: TyId) -> Option<Vec<&FieldDef>> {
        match &self.user(ty)?.kind {
            UserKind::Aggregate(fields) => Some(fields.iter().collect()),
            UserKind::Class { base, fields } => {
                let mut all = match base {
                    Some(base) => self.fields(*base)?,
                    None => Vec::new(),
                };
                all.extend(fields);
                Some(all)
            }
            UserKind::Variant(_) | UserKind::Tuple(_) | UserKind::Any | UserKind::Optional(_) => {
                None
            }
        }
    }

    /// Position and definition of the member called `name`.
    pub fn field(&self, ty: TyId, name: &str) -> Option<(u32, &FieldDef)> {
        let fields = self.fields(ty)?;
        let index = fields.iter().position(|field| field.name == name)?;
        Some((u32::try_from(index).ok()?, fields[index]))
    }

    pub fn is_class(&self, ty: TyId) -> bool {
        matches!(
            self.user(ty).map(|user| &user.kind),
            Some(UserKind::Class { .. })
        )
    }

    /// Is `derived` the class `base` or one of its descendants?
    pub fn derives_from(&self, derived: TyId, base: TyId) -> bool {
        let base = self.pool.strip_const(base);
        let mut current = Some(self.pool.strip_const(derived));
        while let Some(ty) = current {
            if ty == base {
                return true;
            }
            current = match self.user(ty).map(|user| &user.kind) {
                Some(UserKind::Class { base, .. }) => *base,
                _ => None,
            };
        }
        false
    }

    pub fn satisfies(&self, constraint: ConstraintId, ty: TyId) -> bool {
        let ty = self.pool.strip_const(ty);
        self.constraints
            .get(constraint.index())
            .is_some_and(|def| def.satisfied.contains(&ty))
    }

    pub fn constraint_name(&self, constraint: ConstraintId) -> &str {
        self.constraints
            .get(constraint.index())
            .map_or("<unknown constraint>", |def| def.name.as_str())
    }

    /// Source-like rendering: `const int`, `Shape*`, `int[3]`.
    pub fn display(&self, ty: TyId) -> String {
        match self.pool.kind(ty) {
            TypeKind::Int => "int".to_string(),
            TypeKind::Long => "long".to_string(),
            TypeKind::Char => "char".to_string(),
            TypeKind::Bool => "bool".to_string(),
            TypeKind::Double => "double".to_string(),
            TypeKind::Void => "void".to_string(),
            TypeKind::NullPtr => "nullptr_t".to_string(),
            TypeKind::Dependent => "auto".to_string(),
            TypeKind::Pointer(pointee) => format!("{}*", self.display(pointee)),
            TypeKind::Const(inner) if self.pool.pointee(inner).is_some() => {
                format!("{} const", self.display(inner))
            }
            TypeKind::Const(inner) => format!("const {}", self.display(inner)),
            TypeKind::Array(elem, extent) => format!("{}[{extent}]", self.display(elem)),
            TypeKind::User(id) => self
                .users
                .get(id.index())
                .map_or_else(|| "<unknown type>".to_string(), |user| user.name.clone()),
        }
    }

    /// Registered user types in name order.
    pub fn user_types(&self) -> impl Iterator<Item = &UserType> {
        self.types_by_name
            .values()
            .filter_map(|&ty| self.pool.user(ty))
            .filter_map(|id| self.users.get(id.index()))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
