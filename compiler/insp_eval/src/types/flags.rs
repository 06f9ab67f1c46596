//! Pre-computed type metadata flags.
//!
//! `TypeFlags` are computed once when a type is interned, so category
//! questions ("is this arithmetic?", "does this mention `auto`?") never walk
//! the type.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TypeFlags: u16 {
        // === Presence Flags ===

        /// Mentions a parameter whose type is not known yet.
        const HAS_DEPENDENT = 1 << 0;

        // === Category Flags ===

        /// `int`, `long`, `char`, `bool` or `double`.
        const IS_ARITHMETIC = 1 << 4;
        /// Arithmetic and not `double`.
        const IS_INTEGRAL = 1 << 5;
        const IS_POINTER = 1 << 6;
        const IS_NULLPTR = 1 << 7;
        const IS_ARRAY = 1 << 8;
        /// Registered by the embedder (records, variants, tuples, `any`).
        const IS_USER = 1 << 9;
        const IS_VOID = 1 << 10;
        /// Top-level `const`.
        const IS_CONST = 1 << 11;
    }
}

impl TypeFlags {
    /// Flags inherited by every type built from a child type.
    pub const PROPAGATE_MASK: Self = Self::HAS_DEPENDENT;

    /// Flags a `const T` shares with `T`.
    pub const QUALIFIER_TRANSPARENT: Self = Self::from_bits_truncate(
        Self::HAS_DEPENDENT.bits()
            | Self::IS_ARITHMETIC.bits()
            | Self::IS_INTEGRAL.bits()
            | Self::IS_POINTER.bits()
            | Self::IS_NULLPTR.bits()
            | Self::IS_ARRAY.bits()
            | Self::IS_USER.bits()
            | Self::IS_VOID.bits(),
    );

    #[inline]
    pub const fn is_dependent(self) -> bool {
        self.contains(Self::HAS_DEPENDENT)
    }

    #[inline]
    pub const fn is_arithmetic(self) -> bool {
        self.contains(Self::IS_ARITHMETIC)
    }

    #[inline]
    pub const fn is_pointer_like(self) -> bool {
        self.intersects(Self::IS_POINTER.union(Self::IS_NULLPTR))
    }

    /// Can the type be tested for truth?
    #[inline]
    pub const fn is_scalar(self) -> bool {
        self.intersects(
            Self::IS_ARITHMETIC
                .union(Self::IS_POINTER)
                .union(Self::IS_NULLPTR),
        )
    }
}
