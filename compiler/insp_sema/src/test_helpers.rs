//! Scripted host for checker tests.
//!
//! `MockHost` understands just enough of a C-like type system to check
//! patterns: integers, `bool`, pointers, arrays, closed sums, tuple-like
//! types, aggregates with bit-fields, classes and an `any`-like type with a
//! `try_cast` overload. Every mutating call is logged to `events` and every
//! protocol probe to `probes`, so tests can assert on commit order.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use insp_diagnostic::ErrorCode;
use insp_ir::{
    AccessStyle, BinaryOp, ConstraintId, DeclId, ExprArena, ExprId, ExprKind, JumpKind, MatchId,
    Name, ParsedType, PatternArena, Span, StringInterner, TyId, UnaryOp,
};

use crate::{
    check_match, CheckedMatch, Discriminant, ExprInfo, Host, HostError, MatchError, MatchOptions,
    MatchPosition, Probe, SizeProbe, ValueCategory,
};

pub(crate) const INT: TyId = TyId::new(0);
pub(crate) const LONG: TyId = TyId::new(1);
pub(crate) const BOOL: TyId = TyId::new(2);
pub(crate) const VOID: TyId = TyId::new(3);

#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) enum MockTy {
    Int,
    Long,
    Bool,
    Void,
    Pointer(TyId),
    Const(TyId),
    Array(TyId, u64),
    Variant {
        alternatives: Vec<TyId>,
        size: SizeProbe,
        index: Option<AccessStyle>,
        get: Option<AccessStyle>,
    },
    Tuple {
        elements: Vec<TyId>,
        size: SizeProbe,
        get: Option<AccessStyle>,
    },
    /// Data members as `(type, is_bit_field)`.
    Aggregate(Vec<(TyId, bool)>),
    Class,
    /// Has a `try_cast<T>` overload for every `T`.
    Any,
    Dependent,
}

struct MockDecl {
    ty: TyId,
    init: ExprId,
}

pub(crate) struct MockHost<'a> {
    interner: &'a StringInterner,
    pub exprs: ExprArena,
    types: Vec<(String, MockTy)>,
    type_names: FxHashMap<Name, TyId>,
    constraints: Vec<(Name, Vec<TyId>)>,
    scopes: Vec<FxHashMap<Name, DeclId>>,
    decls: Vec<MockDecl>,
    infos: FxHashMap<ExprId, ExprInfo>,
    pub events: Vec<String>,
    pub probes: RefCell<Vec<String>>,
    pub jumps_allowed: bool,
}

impl<'a> MockHost<'a> {
    pub fn new(interner: &'a StringInterner, exprs: ExprArena) -> Self {
        let mut host = MockHost {
            interner,
            exprs,
            types: Vec::new(),
            type_names: FxHashMap::default(),
            constraints: Vec::new(),
            scopes: vec![FxHashMap::default()],
            decls: Vec::new(),
            infos: FxHashMap::default(),
            events: Vec::new(),
            probes: RefCell::new(Vec::new()),
            jumps_allowed: true,
        };
        host.define("int", MockTy::Int);
        host.define("long", MockTy::Long);
        host.define("bool", MockTy::Bool);
        host.define("void", MockTy::Void);
        host
    }

    /// Register a named type.
    pub fn define(&mut self, name: &str, ty: MockTy) -> TyId {
        let id = TyId::from_len(self.types.len());
        self.types.push((name.to_string(), ty));
        self.type_names.insert(self.interner.intern(name), id);
        id
    }

    /// Register a constraint satisfied by exactly `satisfied`.
    pub fn constraint(&mut self, name: &str, satisfied: Vec<TyId>) {
        self.constraints.push((self.interner.intern(name), satisfied));
    }

    /// Declare a variable `name` of type `ty` in the outermost scope.
    pub fn var(&mut self, name: &str, ty: TyId) -> DeclId {
        let init = self.exprs.alloc(ExprKind::Error, Span::DUMMY);
        let decl = DeclId::from_len(self.decls.len());
        self.decls.push(MockDecl { ty, init });
        self.scopes[0].insert(self.interner.intern(name), decl);
        decl
    }

    /// Intern a structural type.
    pub fn intern(&mut self, ty: MockTy) -> TyId {
        if let Some(index) = self.types.iter().position(|(_, existing)| *existing == ty) {
            return TyId::from_len(index);
        }
        let name = match &ty {
            MockTy::Pointer(pointee) => format!("{}*", self.type_name(*pointee)),
            MockTy::Const(inner) => format!("const {}", self.type_name(*inner)),
            MockTy::Array(elem, n) => format!("{}[{n}]", self.type_name(*elem)),
            other => format!("{other:?}"),
        };
        let id = TyId::from_len(self.types.len());
        self.types.push((name, ty));
        id
    }

    pub fn ty(&self, ty: TyId) -> &MockTy {
        &self.types[ty.index()].1
    }

    /// `ty` without a top-level `const`.
    fn strip(&self, ty: TyId) -> TyId {
        match self.ty(ty) {
            MockTy::Const(inner) => *inner,
            _ => ty,
        }
    }

    fn is_scalar(&self, ty: TyId) -> bool {
        matches!(
            self.ty(self.strip(ty)),
            MockTy::Int | MockTy::Long | MockTy::Bool
        )
    }

    fn alloc(&mut self, kind: ExprKind, span: Span, info: ExprInfo) -> ExprId {
        let id = self.exprs.alloc(kind, span);
        self.infos.insert(id, info);
        id
    }

    fn declare(&mut self, name: Option<Name>, ty: TyId, init: ExprId) -> DeclId {
        let decl = DeclId::from_len(self.decls.len());
        self.decls.push(MockDecl { ty, init });
        if let Some(name) = name {
            if let Some(scope) = self.scopes.last_mut() {
                scope.insert(name, decl);
            }
        }
        decl
    }

    fn lookup(&self, name: Name) -> Option<DeclId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
    }

    fn probe(&self, what: &str, ty: TyId) {
        self.probes
            .borrow_mut()
            .push(format!("{what} {}", self.type_name(ty)));
    }

    fn constant_int(&self, expr: ExprId) -> Option<i64> {
        match self.exprs.kind(expr) {
            ExprKind::Int(n) => Some(*n),
            ExprKind::Paren(inner) => self.constant_int(*inner),
            ExprKind::DeclRef(decl) => self.constant_int(self.decls[decl.index()].init),
            _ => None,
        }
    }
}

fn unsupported(what: &str, span: Span) -> HostError {
    HostError::new(ErrorCode::E2008, format!("mock host does not support {what}"), span)
}

impl Probe for MockHost<'_> {
    fn expr_info(&self, expr: ExprId) -> ExprInfo {
        self.infos
            .get(&expr)
            .copied()
            .unwrap_or_else(|| panic!("{expr:?} was never checked"))
    }

    fn type_name(&self, ty: TyId) -> String {
        self.types[ty.index()].0.clone()
    }

    fn constraint_name(&self, constraint: ConstraintId) -> String {
        self.interner
            .lookup(self.constraints[constraint.index()].0)
            .to_string()
    }

    fn void_type(&self) -> TyId {
        VOID
    }

    fn bool_type(&self) -> TyId {
        BOOL
    }

    fn is_dependent(&self, ty: TyId) -> bool {
        matches!(self.ty(ty), MockTy::Dependent)
    }

    fn same_type(&self, a: TyId, b: TyId) -> bool {
        a == b
    }

    fn is_convertible(&self, from: TyId, to: TyId) -> bool {
        if from == to || (self.is_scalar(from) && self.is_scalar(to)) {
            return true;
        }
        to == BOOL && matches!(self.ty(self.strip(from)), MockTy::Pointer(_))
    }

    fn decay(&self, ty: TyId) -> TyId {
        self.strip(ty)
    }

    fn is_const(&self, ty: TyId) -> bool {
        matches!(self.ty(ty), MockTy::Const(_))
    }

    fn variant_size(&self, ty: TyId) -> SizeProbe {
        self.probe("variant_size", ty);
        match self.ty(self.strip(ty)) {
            MockTy::Variant { size, .. } => *size,
            _ => SizeProbe::Absent,
        }
    }

    fn variant_alternative(&self, ty: TyId, index: u64) -> Option<TyId> {
        self.probe(&format!("variant_alternative {index}"), ty);
        match self.ty(self.strip(ty)) {
            MockTy::Variant { alternatives, .. } => {
                alternatives.get(usize::try_from(index).ok()?).copied()
            }
            _ => None,
        }
    }

    fn index_accessor(&self, ty: TyId) -> Option<AccessStyle> {
        self.probe("index_accessor", ty);
        match self.ty(self.strip(ty)) {
            MockTy::Variant { index, .. } => *index,
            _ => None,
        }
    }

    fn get_accessor(&self, ty: TyId) -> Option<AccessStyle> {
        self.probe("get_accessor", ty);
        match self.ty(self.strip(ty)) {
            MockTy::Variant { get, .. } | MockTy::Tuple { get, .. } => *get,
            _ => None,
        }
    }

    fn array_extent(&self, ty: TyId) -> Option<u64> {
        self.probe("array_extent", ty);
        match self.ty(self.strip(ty)) {
            MockTy::Array(_, n) => Some(*n),
            _ => None,
        }
    }

    fn tuple_size(&self, ty: TyId) -> SizeProbe {
        self.probe("tuple_size", ty);
        match self.ty(self.strip(ty)) {
            MockTy::Tuple { size, .. } => *size,
            _ => SizeProbe::Absent,
        }
    }

    fn tuple_element(&self, ty: TyId, index: u64) -> Option<TyId> {
        match self.ty(self.strip(ty)) {
            MockTy::Tuple { elements, .. } => elements.get(usize::try_from(index).ok()?).copied(),
            _ => None,
        }
    }

    fn aggregate_arity(&self, ty: TyId) -> Option<u64> {
        self.probe("aggregate_arity", ty);
        match self.ty(self.strip(ty)) {
            MockTy::Aggregate(fields) => Some(fields.len() as u64),
            _ => None,
        }
    }

    fn satisfies(&self, constraint: ConstraintId, ty: TyId) -> bool {
        self.constraints[constraint.index()].1.contains(&ty)
    }

    fn has_try_cast(&self, _target: TyId, subject: TyId) -> bool {
        self.probe("has_try_cast", subject);
        matches!(self.ty(self.strip(subject)), MockTy::Any)
    }

    fn constant_bool(&self, expr: ExprId) -> Option<bool> {
        match self.exprs.kind(expr) {
            ExprKind::Bool(b) => Some(*b),
            ExprKind::Truth(inner) | ExprKind::Paren(inner) => self.constant_bool(*inner),
            ExprKind::Binary {
                op: BinaryOp::Eq,
                left,
                right,
            } => Some(self.constant_int(*left)? == self.constant_int(*right)?),
            _ => None,
        }
    }
}

impl Host for MockHost<'_> {
    fn resolve_type(&mut self, ty: &ParsedType, span: Span) -> Result<TyId, HostError> {
        match ty {
            ParsedType::Named(name) => self.type_names.get(name).copied().ok_or_else(|| {
                HostError::new(
                    ErrorCode::E2003,
                    format!("unknown type `{}`", self.interner.lookup(*name)),
                    span,
                )
            }),
            ParsedType::Pointer(inner) => {
                let pointee = self.resolve_type(inner, span)?;
                Ok(self.intern(MockTy::Pointer(pointee)))
            }
            ParsedType::Const(inner) => {
                let inner = self.resolve_type(inner, span)?;
                Ok(self.intern(MockTy::Const(inner)))
            }
            ParsedType::Array(elem, n) => {
                let elem = self.resolve_type(elem, span)?;
                Ok(self.intern(MockTy::Array(elem, *n)))
            }
            ParsedType::Auto => Err(unsupported("`auto` here", span)),
        }
    }

    fn resolve_discriminant(
        &mut self,
        ty: &ParsedType,
        span: Span,
    ) -> Result<Discriminant, HostError> {
        if let ParsedType::Named(name) = ty {
            if let Some(index) = self.constraints.iter().position(|(n, _)| n == name) {
                return Ok(Discriminant::Constraint(ConstraintId::from_len(index)));
            }
        }
        self.resolve_type(ty, span).map(Discriminant::Type)
    }

    fn check_expr(&mut self, expr: ExprId) -> Result<ExprInfo, HostError> {
        let span = self.exprs.span(expr);
        let info = match self.exprs.kind(expr).clone() {
            ExprKind::Int(_) => ExprInfo::new(INT, ValueCategory::PRValue),
            ExprKind::Bool(_) => ExprInfo::new(BOOL, ValueCategory::PRValue),
            ExprKind::Ident(name) => {
                let decl = self.lookup(name).ok_or_else(|| {
                    HostError::new(
                        ErrorCode::E2002,
                        format!("unknown identifier `{}`", self.interner.lookup(name)),
                        span,
                    )
                })?;
                ExprInfo::new(self.decls[decl.index()].ty, ValueCategory::LValue)
            }
            ExprKind::Paren(inner) => self.check_expr(inner)?,
            ExprKind::Unary { op, operand } => {
                let operand = self.check_expr(operand)?;
                match op {
                    UnaryOp::Not => ExprInfo::new(BOOL, ValueCategory::PRValue),
                    UnaryOp::Neg => ExprInfo::new(operand.ty, ValueCategory::PRValue),
                    UnaryOp::Deref | UnaryOp::AddrOf => return Err(unsupported("pointer syntax", span)),
                }
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.check_expr(left)?;
                let right = self.check_expr(right)?;
                if self.is_dependent(left.ty) || self.is_dependent(right.ty) {
                    ExprInfo::new(left.ty, ValueCategory::PRValue)
                } else if op.is_comparison() || op.is_logical() {
                    ExprInfo::new(BOOL, ValueCategory::PRValue)
                } else {
                    ExprInfo::new(left.ty, ValueCategory::PRValue)
                }
            }
            other => return Err(unsupported(other.describe(), span)),
        };
        self.infos.insert(expr, info);
        Ok(info)
    }

    fn declare_holding(&mut self, init: ExprId, _span: Span) -> Result<DeclId, HostError> {
        let ty = self.expr_info(init).ty;
        self.events.push(format!("holding {}", self.type_name(ty)));
        Ok(self.declare(None, ty, init))
    }

    fn declare_binding(
        &mut self,
        name: Name,
        init: ExprId,
        by_ref: bool,
        _span: Span,
    ) -> Result<DeclId, HostError> {
        let ty = self.expr_info(init).ty;
        let marker = if by_ref { " &" } else { "" };
        self.events
            .push(format!("bind {}{marker}", self.interner.lookup(name)));
        Ok(self.declare(Some(name), ty, init))
    }

    fn declare_var(
        &mut self,
        name: Name,
        ty: Option<TyId>,
        init: ExprId,
        span: Span,
    ) -> Result<DeclId, HostError> {
        let init_ty = self.expr_info(init).ty;
        let ty = ty.unwrap_or(init_ty);
        if !self.is_convertible(init_ty, ty) {
            return Err(HostError::new(
                ErrorCode::E2001,
                format!(
                    "cannot initialize `{}` from `{}`",
                    self.type_name(ty),
                    self.type_name(init_ty)
                ),
                span,
            ));
        }
        self.events
            .push(format!("var {}", self.interner.lookup(name)));
        Ok(self.declare(Some(name), ty, init))
    }

    fn decl_ref(&mut self, decl: DeclId, span: Span) -> ExprId {
        let ty = self.decls[decl.index()].ty;
        self.alloc(
            ExprKind::DeclRef(decl),
            span,
            ExprInfo::new(ty, ValueCategory::LValue),
        )
    }

    fn build_equality(
        &mut self,
        subject: ExprId,
        value: ExprId,
        span: Span,
    ) -> Result<ExprId, HostError> {
        let (left, right) = (self.expr_info(subject).ty, self.expr_info(value).ty);
        if !(self.is_scalar(left) && self.is_scalar(right)) && left != right {
            return Err(HostError::new(
                ErrorCode::E2004,
                format!(
                    "cannot compare `{}` with `{}`",
                    self.type_name(left),
                    self.type_name(right)
                ),
                span,
            ));
        }
        Ok(self.alloc(
            ExprKind::Binary {
                op: BinaryOp::Eq,
                left: subject,
                right: value,
            },
            span,
            ExprInfo::new(BOOL, ValueCategory::PRValue),
        ))
    }

    fn build_condition(&mut self, expr: ExprId) -> Result<ExprId, HostError> {
        let ty = self.expr_info(expr).ty;
        if !self.is_convertible(ty, BOOL) && !self.is_dependent(ty) {
            return Err(HostError::new(
                ErrorCode::E2001,
                format!("`{}` is not convertible to `bool`", self.type_name(ty)),
                self.exprs.span(expr),
            ));
        }
        let span = self.exprs.span(expr);
        Ok(self.alloc(
            ExprKind::Truth(expr),
            span,
            ExprInfo::new(BOOL, ValueCategory::PRValue),
        ))
    }

    fn build_deref(&mut self, pointer: ExprId, span: Span) -> Result<ExprId, HostError> {
        let ty = self.expr_info(pointer).ty;
        let MockTy::Pointer(pointee) = *self.ty(self.strip(ty)) else {
            return Err(HostError::new(
                ErrorCode::E2004,
                format!("cannot dereference `{}`", self.type_name(ty)),
                span,
            ));
        };
        Ok(self.alloc(
            ExprKind::Unary {
                op: UnaryOp::Deref,
                operand: pointer,
            },
            span,
            ExprInfo::new(pointee, ValueCategory::LValue),
        ))
    }

    fn build_address_of(&mut self, operand: ExprId, span: Span) -> Result<ExprId, HostError> {
        let info = self.expr_info(operand);
        if !info.category.is_addressable() {
            return Err(unsupported("taking the address of a non-lvalue", span));
        }
        let pointer = self.intern(MockTy::Pointer(info.ty));
        Ok(self.alloc(
            ExprKind::Unary {
                op: UnaryOp::AddrOf,
                operand,
            },
            span,
            ExprInfo::new(pointer, ValueCategory::PRValue),
        ))
    }

    fn build_int_constant(&mut self, value: u64, span: Span) -> ExprId {
        let value = i64::try_from(value).unwrap_or(i64::MAX);
        self.alloc(
            ExprKind::Int(value),
            span,
            ExprInfo::new(INT, ValueCategory::PRValue),
        )
    }

    fn build_index_call(
        &mut self,
        subject: ExprId,
        style: AccessStyle,
        span: Span,
    ) -> Result<ExprId, HostError> {
        self.events.push(format!("index {style:?}"));
        Ok(self.alloc(
            ExprKind::Discriminant { subject, style },
            span,
            ExprInfo::new(INT, ValueCategory::PRValue),
        ))
    }

    fn build_get_call(
        &mut self,
        subject: ExprId,
        index: u32,
        style: AccessStyle,
        span: Span,
    ) -> Result<ExprId, HostError> {
        self.events.push(format!("get {index} {style:?}"));
        let ty = self.expr_info(subject).ty;
        let element = match self.ty(self.strip(ty)) {
            MockTy::Variant { alternatives, .. } => alternatives.get(index as usize).copied(),
            MockTy::Tuple { elements, .. } => elements.get(index as usize).copied(),
            _ => None,
        }
        .ok_or_else(|| unsupported("`get` on this type", span))?;
        Ok(self.alloc(
            ExprKind::Element {
                subject,
                index,
                style,
            },
            span,
            ExprInfo::new(element, ValueCategory::LValue),
        ))
    }

    fn build_subscript(
        &mut self,
        base: ExprId,
        index: u32,
        span: Span,
    ) -> Result<ExprId, HostError> {
        self.events.push(format!("subscript {index}"));
        let ty = self.expr_info(base).ty;
        let MockTy::Array(elem, _) = *self.ty(self.strip(ty)) else {
            return Err(unsupported("subscript of a non-array", span));
        };
        let position = self.build_int_constant(u64::from(index), span);
        Ok(self.alloc(
            ExprKind::Index {
                base,
                index: position,
            },
            span,
            ExprInfo::new(elem, ValueCategory::LValue),
        ))
    }

    fn build_field(&mut self, base: ExprId, index: u32, span: Span) -> Result<ExprId, HostError> {
        self.events.push(format!("field {index}"));
        let ty = self.expr_info(base).ty;
        let MockTy::Aggregate(fields) = self.ty(self.strip(ty)) else {
            return Err(unsupported("member access on a non-aggregate", span));
        };
        let (field_ty, bit_field) = fields[index as usize];
        let category = if bit_field {
            ValueCategory::BitField
        } else {
            ValueCategory::LValue
        };
        Ok(self.alloc(
            ExprKind::FieldAt { base, index },
            span,
            ExprInfo::new(field_ty, category),
        ))
    }

    fn pointer_to(&mut self, pointee: TyId, is_const: bool) -> TyId {
        let pointee = if is_const {
            self.intern(MockTy::Const(pointee))
        } else {
            pointee
        };
        self.intern(MockTy::Pointer(pointee))
    }

    fn build_downcast(
        &mut self,
        operand: ExprId,
        target: TyId,
        span: Span,
    ) -> Result<ExprId, HostError> {
        self.events
            .push(format!("downcast {}", self.type_name(target)));
        Ok(self.alloc(
            ExprKind::Downcast { operand, target },
            span,
            ExprInfo::new(target, ValueCategory::PRValue),
        ))
    }

    fn build_try_cast(
        &mut self,
        operand: ExprId,
        target: TyId,
        span: Span,
    ) -> Result<ExprId, HostError> {
        self.events
            .push(format!("try_cast {}", self.type_name(target)));
        let pointer = self.intern(MockTy::Pointer(target));
        Ok(self.alloc(
            ExprKind::TryCast { operand, target },
            span,
            ExprInfo::new(pointer, ValueCategory::PRValue),
        ))
    }

    fn build_conversion(
        &mut self,
        value: ExprId,
        to: TyId,
        span: Span,
    ) -> Result<ExprId, HostError> {
        self.events.push(format!("convert {}", self.type_name(to)));
        Ok(self.alloc(
            ExprKind::Convert { value, to },
            span,
            ExprInfo::new(to, ValueCategory::PRValue),
        ))
    }

    fn push_scope(&mut self) {
        self.events.push("push".to_string());
        self.scopes.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.events.push("pop".to_string());
        self.scopes.pop();
    }

    fn check_jump(
        &mut self,
        kind: JumpKind,
        _value: Option<ExprId>,
        span: Span,
    ) -> Result<(), HostError> {
        self.events.push(format!("jump {}", kind.keyword()));
        if self.jumps_allowed {
            Ok(())
        } else {
            Err(HostError::new(
                ErrorCode::E2007,
                format!("`{}` is not valid here", kind.keyword()),
                span,
            ))
        }
    }
}

/// Parse `source` as a single match construct and hand its expressions to
/// a fresh `MockHost`.
pub(crate) fn parse_match<'a>(
    interner: &'a StringInterner,
    source: &str,
) -> (MockHost<'a>, PatternArena, MatchId) {
    let (mut module, root) = insp_parse::parse_expression(source, interner)
        .unwrap_or_else(|e| panic!("failed to parse `{source}`: {e}"));
    let &ExprKind::Match(id) = module.exprs.kind(root) else {
        panic!("`{source}` is not a match construct");
    };
    let exprs = std::mem::take(&mut module.exprs);
    (MockHost::new(interner, exprs), module.patterns, id)
}

pub(crate) fn check(
    host: &mut MockHost<'_>,
    patterns: &PatternArena,
    id: MatchId,
) -> Result<CheckedMatch, MatchError> {
    check_match(
        host,
        patterns,
        id,
        MatchPosition::Nested,
        &MatchOptions::default(),
    )
}
