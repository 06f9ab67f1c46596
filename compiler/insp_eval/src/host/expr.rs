//! Surface expression checking.

use insp_diagnostic::ErrorCode;
use insp_ir::{BinaryOp, ExprId, ExprKind, ExprRange, Name, Span, TyId, UnaryOp};
use insp_sema::{ExprInfo, HostError, MatchPosition, Probe, ValueCategory};
use insp_stack::ensure_sufficient_stack;

use super::{unsupported, Callee, ReferenceHost, Resolved};
use crate::registry::UserKind;
use crate::types::{TypeFlags, TypePool};

fn prvalue(ty: TyId) -> ExprInfo {
    ExprInfo::new(ty, ValueCategory::PRValue)
}

fn lvalue(ty: TyId) -> ExprInfo {
    ExprInfo::new(ty, ValueCategory::LValue)
}

impl ReferenceHost<'_> {
    /// Check a parsed expression and record its type and category.
    pub(super) fn check_surface(&mut self, expr: ExprId) -> Result<ExprInfo, HostError> {
        ensure_sufficient_stack(|| self.check_surface_inner(expr))
    }

    fn check_surface_inner(&mut self, expr: ExprId) -> Result<ExprInfo, HostError> {
        let span = self.exprs.span(expr);
        let info = match self.exprs.kind(expr).clone() {
            ExprKind::Int(_) => prvalue(TypePool::INT),
            ExprKind::Float(_) => prvalue(TypePool::DOUBLE),
            ExprKind::Bool(_) => prvalue(TypePool::BOOL),
            ExprKind::Char(_) => prvalue(TypePool::CHAR),
            ExprKind::NullPtr => prvalue(TypePool::NULLPTR),
            ExprKind::Ident(name) => {
                let decl = self.lookup(name).ok_or_else(|| {
                    HostError::new(
                        ErrorCode::E2002,
                        format!("unknown identifier `{}`", self.name(name)),
                        span,
                    )
                })?;
                self.resolved.insert(expr, Resolved::Decl(decl));
                lvalue(self.decls[decl.index()].ty)
            }
            ExprKind::Unary { op, operand } => self.check_unary(op, operand, span)?,
            ExprKind::Binary { op, left, right } => self.check_binary(op, left, right, span)?,
            ExprKind::Assign { target, value } => self.check_assign(target, value, span)?,
            ExprKind::Call { callee, args } => self.check_call(expr, callee, args, span)?,
            ExprKind::Field { base, field, arrow } => {
                self.check_member(expr, base, field, arrow, span)?
            }
            ExprKind::Index { base, index } => self.check_index(base, index, span)?,
            ExprKind::MemberPtr { .. } => return Err(unsupported("member pointer access", span)),
            ExprKind::ArrayLit(elements) => self.check_array_literal(elements, span)?,
            ExprKind::Paren(inner) => self.check_surface(inner)?,
            ExprKind::Match(id) => self.check_match_at(id, MatchPosition::Nested)?,
            other => {
                return self.infos.get(&expr).copied().ok_or_else(|| {
                    HostError::new(
                        ErrorCode::E2008,
                        format!("cannot check a bare {}", other.describe()),
                        span,
                    )
                })
            }
        };
        self.infos.insert(expr, info);
        Ok(info)
    }

    fn check_unary(
        &mut self,
        op: UnaryOp,
        operand: ExprId,
        span: Span,
    ) -> Result<ExprInfo, HostError> {
        let info = self.check_surface(operand)?;
        let flags = self.pool().flags(info.ty);
        if flags.is_dependent() {
            let category = if op == UnaryOp::Deref {
                ValueCategory::LValue
            } else {
                ValueCategory::PRValue
            };
            return Ok(ExprInfo::new(TypePool::DEPENDENT, category));
        }
        match op {
            UnaryOp::Neg if flags.is_arithmetic() => {
                Ok(prvalue(self.pool().common_arithmetic(info.ty, TypePool::INT)))
            }
            UnaryOp::Not if self.is_convertible(info.ty, TypePool::BOOL) => {
                Ok(prvalue(TypePool::BOOL))
            }
            UnaryOp::Deref => match self.deref_target(info) {
                Some(target) => Ok(target),
                None => Err(self.invalid_operand(op.as_symbol(), info.ty, span)),
            },
            UnaryOp::AddrOf if info.category.is_addressable() => {
                Ok(prvalue(self.types.pool_mut().pointer(info.ty)))
            }
            UnaryOp::AddrOf if info.category == ValueCategory::BitField => Err(HostError::new(
                ErrorCode::E2004,
                "cannot take the address of a bit-field",
                span,
            )),
            UnaryOp::AddrOf => Err(HostError::new(
                ErrorCode::E2004,
                "cannot take the address of a temporary",
                span,
            )),
            UnaryOp::Neg | UnaryOp::Not => Err(self.invalid_operand(op.as_symbol(), info.ty, span)),
        }
    }

    fn check_binary(
        &mut self,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        span: Span,
    ) -> Result<ExprInfo, HostError> {
        let (l, r) = (self.check_surface(left)?.ty, self.check_surface(right)?.ty);
        let (lf, rf) = (self.pool().flags(l), self.pool().flags(r));
        if lf.is_dependent() || rf.is_dependent() {
            let ty = if op.is_comparison() || op.is_logical() {
                TypePool::BOOL
            } else {
                TypePool::DEPENDENT
            };
            return Ok(prvalue(ty));
        }

        let valid = if op.is_logical() {
            self.is_convertible(l, TypePool::BOOL) && self.is_convertible(r, TypePool::BOOL)
        } else if op.is_comparison() {
            (lf.is_arithmetic() && rf.is_arithmetic())
                || (matches!(op, BinaryOp::Eq | BinaryOp::NotEq)
                    && self.are_comparable_pointers(l, r))
        } else if op == BinaryOp::Mod {
            lf.contains(TypeFlags::IS_INTEGRAL) && rf.contains(TypeFlags::IS_INTEGRAL)
        } else {
            lf.is_arithmetic() && rf.is_arithmetic()
        };
        if !valid {
            return Err(HostError::new(
                ErrorCode::E2004,
                format!(
                    "invalid operands to `{}`: `{}` and `{}`",
                    op.as_symbol(),
                    self.type_name(l),
                    self.type_name(r)
                ),
                span,
            ));
        }

        if op.is_comparison() || op.is_logical() {
            Ok(prvalue(TypePool::BOOL))
        } else {
            Ok(prvalue(self.pool().common_arithmetic(l, r)))
        }
    }

    pub(super) fn are_comparable_pointers(&self, l: TyId, r: TyId) -> bool {
        let (lf, rf) = (self.pool().flags(l), self.pool().flags(r));
        lf.is_pointer_like()
            && rf.is_pointer_like()
            && (self.is_convertible(l, r) || self.is_convertible(r, l))
    }

    fn check_assign(
        &mut self,
        target: ExprId,
        value: ExprId,
        span: Span,
    ) -> Result<ExprInfo, HostError> {
        let target_info = self.check_surface(target)?;
        let value_info = self.check_surface(value)?;
        if target_info.category == ValueCategory::PRValue {
            return Err(HostError::new(
                ErrorCode::E2006,
                "cannot assign to a temporary",
                span,
            ));
        }
        if self.is_const(target_info.ty) {
            return Err(HostError::new(
                ErrorCode::E2006,
                format!("cannot assign to `{}`", self.type_name(target_info.ty)),
                span,
            ));
        }
        self.expect_convertible(value_info.ty, target_info.ty, span)?;
        Ok(target_info)
    }

    fn check_call(
        &mut self,
        expr: ExprId,
        callee: ExprId,
        args: ExprRange,
        span: Span,
    ) -> Result<ExprInfo, HostError> {
        let ExprKind::Ident(name) = *self.exprs.kind(callee) else {
            return Err(unsupported("calling a computed callee", span));
        };
        let args = self.exprs.list(args).to_vec();
        let mut arg_tys = Vec::with_capacity(args.len());
        for &arg in &args {
            arg_tys.push(self.check_surface(arg)?.ty);
        }

        if self.lookup(name).is_some() {
            return Err(HostError::new(
                ErrorCode::E2004,
                format!("`{}` is a variable, not a function", self.name(name)),
                span,
            ));
        }
        let (callee, ty) = if let Some(&index) = self.functions_by_name.get(&name) {
            let sig = &self.signatures[index];
            let (params, ret) = (sig.params.clone(), sig.ret);
            self.check_arguments(name, &params, &args, &arg_tys, span)?;
            (Callee::Function(index), ret)
        } else if let Some(ty) = self.types.lookup(self.name(name)) {
            (self.check_construct(ty, &args, &arg_tys, span)?, ty)
        } else if self.name(name) == "print" {
            (Callee::Print, TypePool::VOID)
        } else {
            return Err(HostError::new(
                ErrorCode::E2002,
                format!("unknown function `{}`", self.name(name)),
                span,
            ));
        };
        self.resolved.insert(expr, Resolved::Call(callee));
        Ok(prvalue(ty))
    }

    fn check_arguments(
        &self,
        name: Name,
        params: &[TyId],
        args: &[ExprId],
        arg_tys: &[TyId],
        span: Span,
    ) -> Result<(), HostError> {
        if params.len() != args.len() {
            return Err(HostError::new(
                ErrorCode::E2005,
                format!(
                    "`{}` takes {} argument(s) but {} were given",
                    self.name(name),
                    params.len(),
                    args.len()
                ),
                span,
            ));
        }
        for ((&arg, &from), &to) in args.iter().zip(arg_tys).zip(params) {
            self.expect_convertible(from, to, self.exprs.span(arg))?;
        }
        Ok(())
    }

    /// `Type(args...)` for a registered user type.
    fn check_construct(
        &self,
        ty: TyId,
        args: &[ExprId],
        arg_tys: &[TyId],
        span: Span,
    ) -> Result<Callee, HostError> {
        let type_name = self.type_name(ty);
        let Some(user) = self.types.user(ty) else {
            return Err(unsupported(&format!("functional cast to `{type_name}`"), span));
        };
        let expected: Vec<TyId> = match &user.kind {
            UserKind::Aggregate(_) | UserKind::Class { .. } => self
                .types
                .fields(ty)
                .map(|fields| fields.iter().map(|field| field.ty).collect())
                .unwrap_or_default(),
            UserKind::Tuple(def) => def.elements.clone(),
            // `Maybe()` is empty.
            UserKind::Optional(_) if args.is_empty() => Vec::new(),
            UserKind::Optional(payload) => vec![*payload],
            UserKind::Variant(def) => {
                let [arg_ty] = arg_tys else {
                    return Err(HostError::new(
                        ErrorCode::E2005,
                        format!("`{type_name}` is constructed from exactly one alternative"),
                        span,
                    ));
                };
                let arg_ty = self.decay(*arg_ty);
                let alternative = def
                    .alternatives
                    .iter()
                    .position(|&alt| alt == arg_ty)
                    .or_else(|| {
                        def.alternatives
                            .iter()
                            .position(|&alt| self.is_convertible(arg_ty, alt))
                    })
                    .ok_or_else(|| {
                        HostError::new(
                            ErrorCode::E2001,
                            format!(
                                "no alternative of `{type_name}` accepts `{}`",
                                self.type_name(arg_ty)
                            ),
                            span,
                        )
                    })?;
                return Ok(Callee::Construct {
                    ty,
                    alternative: u32::try_from(alternative).ok(),
                });
            }
            UserKind::Any => {
                if arg_tys.len() > 1 {
                    return Err(HostError::new(
                        ErrorCode::E2005,
                        format!("`{type_name}` holds at most one value"),
                        span,
                    ));
                }
                if let Some(&payload) = arg_tys.first() {
                    let flags = self.pool().flags(payload);
                    if flags.is_dependent() || flags.contains(TypeFlags::IS_VOID) {
                        return Err(HostError::new(
                            ErrorCode::E2001,
                            format!("cannot box `{}`", self.type_name(payload)),
                            span,
                        ));
                    }
                }
                return Ok(Callee::Construct {
                    ty,
                    alternative: None,
                });
            }
        };
        if expected.len() != args.len() {
            return Err(HostError::new(
                ErrorCode::E2005,
                format!(
                    "`{type_name}` has {} member(s) but {} initializer(s) were given",
                    expected.len(),
                    args.len()
                ),
                span,
            ));
        }
        for ((&arg, &from), &to) in args.iter().zip(arg_tys).zip(&expected) {
            self.expect_convertible(from, to, self.exprs.span(arg))?;
        }
        Ok(Callee::Construct {
            ty,
            alternative: None,
        })
    }

    fn check_member(
        &mut self,
        expr: ExprId,
        base: ExprId,
        field: Name,
        arrow: bool,
        span: Span,
    ) -> Result<ExprInfo, HostError> {
        let base_info = self.check_surface(base)?;
        let (record, category) = if arrow {
            let Some(pointee) = self.pool().pointee(base_info.ty) else {
                return Err(self.invalid_operand("->", base_info.ty, span));
            };
            (pointee, ValueCategory::LValue)
        } else {
            (base_info.ty, base_info.category)
        };
        if self.is_dependent(record) {
            return Ok(ExprInfo::new(TypePool::DEPENDENT, category));
        }

        let Some((index, def)) = self.types.field(record, self.name(field)) else {
            return Err(HostError::new(
                ErrorCode::E2004,
                format!(
                    "`{}` has no member named `{}`",
                    self.type_name(record),
                    self.name(field)
                ),
                span,
            ));
        };
        let (field_ty, bit_field) = (def.ty, def.bits.is_some());
        let ty = if self.is_const(record) {
            self.types.pool_mut().const_of(field_ty)
        } else {
            field_ty
        };
        let category = match category {
            ValueCategory::PRValue => ValueCategory::PRValue,
            _ if bit_field => ValueCategory::BitField,
            other => other,
        };
        self.resolved.insert(expr, Resolved::Field(index));
        Ok(ExprInfo::new(ty, category))
    }

    fn check_index(
        &mut self,
        base: ExprId,
        index: ExprId,
        span: Span,
    ) -> Result<ExprInfo, HostError> {
        let base_info = self.check_surface(base)?;
        let index_ty = self.check_surface(index)?.ty;
        let index_flags = self.pool().flags(index_ty);
        if !index_flags.contains(TypeFlags::IS_INTEGRAL) && !index_flags.is_dependent() {
            return Err(self.invalid_operand("[]", index_ty, span));
        }
        if self.is_dependent(base_info.ty) {
            return Ok(lvalue(TypePool::DEPENDENT));
        }
        let Some((elem, _)) = self.pool().array_parts(base_info.ty) else {
            return Err(self.invalid_operand("[]", base_info.ty, span));
        };
        let elem = if self.is_const(base_info.ty) {
            self.types.pool_mut().const_of(elem)
        } else {
            elem
        };
        Ok(ExprInfo::new(elem, base_info.category))
    }

    fn check_array_literal(
        &mut self,
        elements: ExprRange,
        span: Span,
    ) -> Result<ExprInfo, HostError> {
        let elements = self.exprs.list(elements).to_vec();
        let Some((&first, rest)) = elements.split_first() else {
            return Err(unsupported("an empty array literal", span));
        };
        let elem = self.check_surface(first)?.ty;
        let elem = self.decay(elem);
        for &element in rest {
            let ty = self.check_surface(element)?.ty;
            self.expect_convertible(ty, elem, self.exprs.span(element))?;
        }
        let ty = self.types.pool_mut().array(elem, elements.len() as u64);
        Ok(prvalue(ty))
    }

    fn invalid_operand(&self, op: &str, ty: TyId, span: Span) -> HostError {
        HostError::new(
            ErrorCode::E2004,
            format!("invalid operand to `{op}`: `{}`", self.type_name(ty)),
            span,
        )
    }
}
