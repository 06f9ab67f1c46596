//! Host collaborator interface.
//!
//! The match checker never looks inside host expressions or types. It holds
//! opaque handles ([`ExprId`], [`TyId`], [`DeclId`], [`ConstraintId`]) and
//! asks the host two kinds of questions:
//!
//! - [`Probe`]: read-only queries. Everything needed to decide *which*
//!   destructuring protocol applies lives here, so a rejected candidate
//!   leaves no trace in host state.
//! - [`Host`]: checking and construction. Declarations, synthesized
//!   expressions and scopes are created only through this trait, and only
//!   after a protocol has been committed.

use insp_diagnostic::ErrorCode;
use insp_ir::{
    AccessStyle, ConstraintId, DeclId, ExprId, JumpKind, Name, ParsedType, Span, TyId,
};

/// Value category of a checked expression.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ValueCategory {
    /// Addressable, named storage.
    LValue,
    /// An lvalue designating a bit-field member. Not addressable.
    BitField,
    /// Expiring value: addressable, about to be moved from.
    XValue,
    /// Pure value with no storage of its own.
    PRValue,
}

impl ValueCategory {
    /// Can a reference bind directly to an expression of this category?
    pub fn is_addressable(self) -> bool {
        matches!(self, ValueCategory::LValue | ValueCategory::XValue)
    }
}

/// Type and value category of a checked expression.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExprInfo {
    pub ty: TyId,
    pub category: ValueCategory,
}

impl ExprInfo {
    pub fn new(ty: TyId, category: ValueCategory) -> Self {
        ExprInfo { ty, category }
    }
}

/// A resolved alternative discriminant: `Circle: ...` or `Integral: ...`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Discriminant {
    Type(TyId),
    Constraint(ConstraintId),
}

/// Answer to "does this type declare a compile-time size?".
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SizeProbe {
    /// The type does not take part in the protocol.
    Absent,
    Size(u64),
    /// The size is declared but is not a constant expression.
    NotConstant,
}

/// Failure reported by the host while checking or building an expression.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HostError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

impl HostError {
    #[cold]
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        HostError {
            code,
            message: message.into(),
            span,
        }
    }
}

/// Read-only type queries and protocol lookups.
pub trait Probe {
    /// Type and category of an expression the host has already checked or built.
    fn expr_info(&self, expr: ExprId) -> ExprInfo;

    /// Source-like rendering of a type, for diagnostics.
    fn type_name(&self, ty: TyId) -> String;

    /// Source-like rendering of a constraint, for diagnostics.
    fn constraint_name(&self, constraint: ConstraintId) -> String;

    fn void_type(&self) -> TyId;

    fn bool_type(&self) -> TyId;

    /// Does the type depend on a parameter that is not known yet?
    fn is_dependent(&self, ty: TyId) -> bool;

    fn same_type(&self, a: TyId, b: TyId) -> bool;

    /// Is there an implicit conversion from `from` to `to`?
    fn is_convertible(&self, from: TyId, to: TyId) -> bool;

    /// The type a deduced variable initialized from `ty` would get.
    fn decay(&self, ty: TyId) -> TyId;

    fn is_const(&self, ty: TyId) -> bool;

    /// Closed-sum alternative count.
    fn variant_size(&self, ty: TyId) -> SizeProbe;

    /// Type of closed-sum alternative `index`.
    fn variant_alternative(&self, ty: TyId, index: u64) -> Option<TyId>;

    /// How the runtime discriminant `index` is reached, if at all.
    fn index_accessor(&self, ty: TyId) -> Option<AccessStyle>;

    /// How the indexed element accessor `get<I>` is reached, if at all.
    fn get_accessor(&self, ty: TyId) -> Option<AccessStyle>;

    /// Extent of a fixed-size array type.
    fn array_extent(&self, ty: TyId) -> Option<u64>;

    /// Tuple-like size trait.
    fn tuple_size(&self, ty: TyId) -> SizeProbe;

    /// Tuple-like element type trait.
    fn tuple_element(&self, ty: TyId, index: u64) -> Option<TyId>;

    /// Number of data members, when `ty` is a plain aggregate.
    fn aggregate_arity(&self, ty: TyId) -> Option<u64>;

    fn satisfies(&self, constraint: ConstraintId, ty: TyId) -> bool;

    /// Is there a user `try_cast<target>(subject)` overload?
    fn has_try_cast(&self, target: TyId, subject: TyId) -> bool;

    /// Fold a boolean expression to a constant, if it is one.
    fn constant_bool(&self, expr: ExprId) -> Option<bool>;
}

/// Expression checking and construction.
///
/// Every `build_*` method returns a new, already-checked expression whose
/// [`ExprInfo`] is available through [`Probe::expr_info`].
pub trait Host: Probe {
    fn resolve_type(&mut self, ty: &ParsedType, span: Span) -> Result<TyId, HostError>;

    fn resolve_discriminant(
        &mut self,
        ty: &ParsedType,
        span: Span,
    ) -> Result<Discriminant, HostError>;

    /// Check a parsed expression in the current scope.
    fn check_expr(&mut self, expr: ExprId) -> Result<ExprInfo, HostError>;

    /// `auto&& <fresh> = init;`: a nameless declaration that keeps the value
    /// of `init` for later references. Non-addressable initializers are
    /// materialized into storage owned by the declaration.
    fn declare_holding(&mut self, init: ExprId, span: Span) -> Result<DeclId, HostError>;

    /// Declare a pattern binding. With `by_ref` the name aliases `init`;
    /// otherwise it is a deduced-type copy.
    fn declare_binding(
        &mut self,
        name: Name,
        init: ExprId,
        by_ref: bool,
        span: Span,
    ) -> Result<DeclId, HostError>;

    /// `T name = init;` (`ty` is `None` for `auto`).
    fn declare_var(
        &mut self,
        name: Name,
        ty: Option<TyId>,
        init: ExprId,
        span: Span,
    ) -> Result<DeclId, HostError>;

    /// An lvalue naming `decl`.
    fn decl_ref(&mut self, decl: DeclId, span: Span) -> ExprId;

    fn build_equality(
        &mut self,
        subject: ExprId,
        value: ExprId,
        span: Span,
    ) -> Result<ExprId, HostError>;

    /// Contextual conversion to `bool`.
    fn build_condition(&mut self, expr: ExprId) -> Result<ExprId, HostError>;

    fn build_deref(&mut self, pointer: ExprId, span: Span) -> Result<ExprId, HostError>;

    fn build_address_of(&mut self, operand: ExprId, span: Span) -> Result<ExprId, HostError>;

    fn build_int_constant(&mut self, value: u64, span: Span) -> ExprId;

    /// Runtime discriminant of a closed sum.
    fn build_index_call(
        &mut self,
        subject: ExprId,
        style: AccessStyle,
        span: Span,
    ) -> Result<ExprId, HostError>;

    /// `get<index>` on a closed sum or tuple-like subject.
    fn build_get_call(
        &mut self,
        subject: ExprId,
        index: u32,
        style: AccessStyle,
        span: Span,
    ) -> Result<ExprId, HostError>;

    /// `base[index]` on an array.
    fn build_subscript(&mut self, base: ExprId, index: u32, span: Span)
        -> Result<ExprId, HostError>;

    /// The `index`-th data member of an aggregate.
    fn build_field(&mut self, base: ExprId, index: u32, span: Span) -> Result<ExprId, HostError>;

    fn pointer_to(&mut self, pointee: TyId, is_const: bool) -> TyId;

    /// Checked downcast of `operand` (a pointer) to the pointer type `target`.
    fn build_downcast(
        &mut self,
        operand: ExprId,
        target: TyId,
        span: Span,
    ) -> Result<ExprId, HostError>;

    /// `try_cast<target>(operand)`.
    fn build_try_cast(
        &mut self,
        operand: ExprId,
        target: TyId,
        span: Span,
    ) -> Result<ExprId, HostError>;

    fn build_conversion(&mut self, value: ExprId, to: TyId, span: Span)
        -> Result<ExprId, HostError>;

    fn push_scope(&mut self);

    fn pop_scope(&mut self);

    /// Validate a jump used as an arm action.
    fn check_jump(
        &mut self,
        kind: JumpKind,
        value: Option<ExprId>,
        span: Span,
    ) -> Result<(), HostError>;
}
