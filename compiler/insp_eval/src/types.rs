//! Interned types of the reference host.
//!
//! Every distinct type is stored once in a [`TypePool`] and named by a
//! [`TyId`]. Builtins occupy fixed ids so they can be used as constants;
//! structural types (pointers, `const`, arrays) are interned on demand and
//! user types are appended by the [`TypeRegistry`](crate::TypeRegistry).

mod flags;

use rustc_hash::FxHashMap;

use insp_ir::TyId;

pub use flags::TypeFlags;

/// Index of a user type in the registry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct UserId(pub(crate) u32);

impl UserId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Int,
    Long,
    Char,
    Bool,
    Double,
    Void,
    NullPtr,
    /// The type of an `auto` parameter: not known until instantiation.
    Dependent,
    Pointer(TyId),
    Const(TyId),
    Array(TyId, u64),
    User(UserId),
}

#[derive(Copy, Clone, Debug)]
struct TypeData {
    kind: TypeKind,
    flags: TypeFlags,
}

/// Hash-consed type storage.
#[derive(Clone, Debug)]
pub struct TypePool {
    types: Vec<TypeData>,
    map: FxHashMap<TypeKind, TyId>,
}

impl TypePool {
    pub const INT: TyId = TyId::new(0);
    pub const LONG: TyId = TyId::new(1);
    pub const CHAR: TyId = TyId::new(2);
    pub const BOOL: TyId = TyId::new(3);
    pub const DOUBLE: TyId = TyId::new(4);
    pub const VOID: TyId = TyId::new(5);
    pub const NULLPTR: TyId = TyId::new(6);
    pub const DEPENDENT: TyId = TyId::new(7);

    pub fn new() -> Self {
        let mut pool = TypePool {
            types: Vec::new(),
            map: FxHashMap::default(),
        };
        for kind in [
            TypeKind::Int,
            TypeKind::Long,
            TypeKind::Char,
            TypeKind::Bool,
            TypeKind::Double,
            TypeKind::Void,
            TypeKind::NullPtr,
            TypeKind::Dependent,
        ] {
            pool.intern(kind);
        }
        debug_assert_eq!(pool.map.get(&TypeKind::Dependent), Some(&Self::DEPENDENT));
        pool
    }

    /// Intern `kind`, returning the existing id when it was seen before.
    pub fn intern(&mut self, kind: TypeKind) -> TyId {
        if let Some(&id) = self.map.get(&kind) {
            return id;
        }
        let flags = self.compute_flags(kind);
        let id = TyId::from_len(self.types.len());
        self.types.push(TypeData { kind, flags });
        self.map.insert(kind, id);
        id
    }

    fn compute_flags(&self, kind: TypeKind) -> TypeFlags {
        let integral = TypeFlags::IS_ARITHMETIC | TypeFlags::IS_INTEGRAL;
        match kind {
            TypeKind::Int | TypeKind::Long | TypeKind::Char | TypeKind::Bool => integral,
            TypeKind::Double => TypeFlags::IS_ARITHMETIC,
            TypeKind::Void => TypeFlags::IS_VOID,
            TypeKind::NullPtr => TypeFlags::IS_NULLPTR,
            TypeKind::Dependent => TypeFlags::HAS_DEPENDENT,
            TypeKind::Pointer(pointee) => {
                TypeFlags::IS_POINTER | (self.flags(pointee) & TypeFlags::PROPAGATE_MASK)
            }
            TypeKind::Array(elem, _) => {
                TypeFlags::IS_ARRAY | (self.flags(elem) & TypeFlags::PROPAGATE_MASK)
            }
            TypeKind::Const(inner) => {
                TypeFlags::IS_CONST | (self.flags(inner) & TypeFlags::QUALIFIER_TRANSPARENT)
            }
            TypeKind::User(_) => TypeFlags::IS_USER,
        }
    }

    #[inline]
    pub fn kind(&self, ty: TyId) -> TypeKind {
        self.types[ty.index()].kind
    }

    #[inline]
    pub fn flags(&self, ty: TyId) -> TypeFlags {
        self.types[ty.index()].flags
    }

    pub fn pointer(&mut self, pointee: TyId) -> TyId {
        self.intern(TypeKind::Pointer(pointee))
    }

    /// `const ty`; already-const types are returned unchanged.
    pub fn const_of(&mut self, ty: TyId) -> TyId {
        if self.flags(ty).contains(TypeFlags::IS_CONST) {
            return ty;
        }
        self.intern(TypeKind::Const(ty))
    }

    pub fn array(&mut self, elem: TyId, extent: u64) -> TyId {
        self.intern(TypeKind::Array(elem, extent))
    }

    /// `ty` without its top-level `const`.
    pub fn strip_const(&self, ty: TyId) -> TyId {
        match self.kind(ty) {
            TypeKind::Const(inner) => inner,
            _ => ty,
        }
    }

    /// The pointee of a (possibly const) pointer type.
    pub fn pointee(&self, ty: TyId) -> Option<TyId> {
        match self.kind(self.strip_const(ty)) {
            TypeKind::Pointer(pointee) => Some(pointee),
            _ => None,
        }
    }

    /// Element type and extent of a (possibly const) array type.
    pub fn array_parts(&self, ty: TyId) -> Option<(TyId, u64)> {
        match self.kind(self.strip_const(ty)) {
            TypeKind::Array(elem, extent) => Some((elem, extent)),
            _ => None,
        }
    }

    /// The user type behind `ty`, ignoring top-level `const`.
    pub fn user(&self, ty: TyId) -> Option<UserId> {
        match self.kind(self.strip_const(ty)) {
            TypeKind::User(id) => Some(id),
            _ => None,
        }
    }

    /// Usual arithmetic conversion of two operand types.
    pub fn common_arithmetic(&self, a: TyId, b: TyId) -> TyId {
        let (a, b) = (self.strip_const(a), self.strip_const(b));
        if a == Self::DOUBLE || b == Self::DOUBLE {
            Self::DOUBLE
        } else if a == Self::LONG || b == Self::LONG {
            Self::LONG
        } else {
            Self::INT
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}
