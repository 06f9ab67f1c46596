//! Declarations and synthesized expressions requested by the match checker.

use insp_diagnostic::ErrorCode;
use insp_ir::{
    AccessStyle, BinaryOp, DeclId, ExprId, ExprKind, JumpKind, Name, ParsedType, Span, TyId,
    UnaryOp,
};
use insp_sema::{Discriminant, ExprInfo, Host, HostError, Probe, ValueCategory};

use super::{unsupported, DeclInfo, ReferenceHost, Storage};
use crate::registry::UserKind;
use crate::types::TypePool;

impl ReferenceHost<'_> {
    fn named_type(&self, name: Name, span: Span) -> Result<TyId, HostError> {
        self.types.lookup(self.name(name)).ok_or_else(|| {
            HostError::new(
                ErrorCode::E2003,
                format!("unknown type `{}`", self.name(name)),
                span,
            )
        })
    }

    fn redeclaration(&self, name: Name, span: Span) -> Result<(), HostError> {
        if self.is_declared_in_current_scope(name) {
            Err(HostError::new(
                ErrorCode::E2001,
                format!("`{}` is already declared in this scope", self.name(name)),
                span,
            ))
        } else {
            Ok(())
        }
    }

    /// Element reached from `subject`: an lvalue when the subject has
    /// storage, otherwise a value.
    fn element_category(&self, subject: ExprId) -> ValueCategory {
        match self.expr_info(subject).category {
            ValueCategory::PRValue => ValueCategory::PRValue,
            _ => ValueCategory::LValue,
        }
    }

    /// `ty` with the constness of `of`.
    fn propagate_const(&mut self, ty: TyId, of: TyId) -> TyId {
        if self.is_const(of) {
            self.types.pool_mut().const_of(ty)
        } else {
            ty
        }
    }
}

impl Host for ReferenceHost<'_> {
    fn resolve_type(&mut self, ty: &ParsedType, span: Span) -> Result<TyId, HostError> {
        match ty {
            ParsedType::Named(name) => self.named_type(*name, span),
            ParsedType::Pointer(inner) => {
                let pointee = self.resolve_type(inner, span)?;
                Ok(self.types.pool_mut().pointer(pointee))
            }
            ParsedType::Const(inner) => {
                let inner = self.resolve_type(inner, span)?;
                Ok(self.types.pool_mut().const_of(inner))
            }
            ParsedType::Array(elem, extent) => {
                let elem = self.resolve_type(elem, span)?;
                Ok(self.types.pool_mut().array(elem, *extent))
            }
            ParsedType::Auto => Err(unsupported("`auto` in this position", span)),
        }
    }

    fn resolve_discriminant(
        &mut self,
        ty: &ParsedType,
        span: Span,
    ) -> Result<Discriminant, HostError> {
        if let Some(name) = ty.as_name() {
            if let Some(constraint) = self.types.lookup_constraint(self.name(name)) {
                return Ok(Discriminant::Constraint(constraint));
            }
        }
        self.resolve_type(ty, span).map(Discriminant::Type)
    }

    fn check_expr(&mut self, expr: ExprId) -> Result<ExprInfo, HostError> {
        self.check_surface(expr)
    }

    fn declare_holding(&mut self, init: ExprId, span: Span) -> Result<DeclId, HostError> {
        let info = self.expr_info(init);
        if self.same_type(info.ty, TypePool::VOID) {
            return Err(HostError::new(
                ErrorCode::E2001,
                "cannot match on a `void` expression",
                span,
            ));
        }
        let storage = if info.category.is_addressable() {
            Storage::Alias
        } else {
            Storage::Owned
        };
        tracing::trace!(ty = %self.type_name(info.ty), ?storage, "holding entity");
        Ok(self.declare(DeclInfo {
            name: None,
            ty: info.ty,
            init: Some(init),
            storage,
            foldable: true,
            span,
        }))
    }

    fn declare_binding(
        &mut self,
        name: Name,
        init: ExprId,
        by_ref: bool,
        span: Span,
    ) -> Result<DeclId, HostError> {
        self.redeclaration(name, span)?;
        let init_ty = self.expr_info(init).ty;
        let (ty, storage) = if by_ref {
            (init_ty, Storage::Alias)
        } else {
            (self.decay(init_ty), Storage::Owned)
        };
        Ok(self.declare(DeclInfo {
            name: Some(name),
            ty,
            init: Some(init),
            storage,
            foldable: true,
            span,
        }))
    }

    fn declare_var(
        &mut self,
        name: Name,
        ty: Option<TyId>,
        init: ExprId,
        span: Span,
    ) -> Result<DeclId, HostError> {
        self.redeclaration(name, span)?;
        let init_ty = self.expr_info(init).ty;
        let ty = match ty {
            Some(ty) => {
                self.expect_convertible(init_ty, ty, span)?;
                ty
            }
            None => self.decay(init_ty),
        };
        Ok(self.declare(DeclInfo {
            name: Some(name),
            ty,
            init: Some(init),
            storage: Storage::Owned,
            foldable: true,
            span,
        }))
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
        let (lf, rf) = (self.pool().flags(left), self.pool().flags(right));
        let comparable = lf.is_dependent()
            || rf.is_dependent()
            || (lf.is_arithmetic() && rf.is_arithmetic())
            || self.are_comparable_pointers(left, right);
        if !comparable {
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
            ExprInfo::new(TypePool::BOOL, ValueCategory::PRValue),
        ))
    }

    fn build_condition(&mut self, expr: ExprId) -> Result<ExprId, HostError> {
        let ty = self.expr_info(expr).ty;
        let span = self.exprs.span(expr);
        if !self.is_convertible(ty, TypePool::BOOL) {
            return Err(HostError::new(
                ErrorCode::E2001,
                format!("`{}` is not convertible to `bool`", self.type_name(ty)),
                span,
            ));
        }
        Ok(self.alloc(
            ExprKind::Truth(expr),
            span,
            ExprInfo::new(TypePool::BOOL, ValueCategory::PRValue),
        ))
    }

    fn build_deref(&mut self, pointer: ExprId, span: Span) -> Result<ExprId, HostError> {
        let info = self.expr_info(pointer);
        let Some(target) = self.deref_target(info) else {
            return Err(HostError::new(
                ErrorCode::E2004,
                format!("cannot dereference `{}`", self.type_name(info.ty)),
                span,
            ));
        };
        Ok(self.alloc(
            ExprKind::Unary {
                op: UnaryOp::Deref,
                operand: pointer,
            },
            span,
            target,
        ))
    }

    fn build_address_of(&mut self, operand: ExprId, span: Span) -> Result<ExprId, HostError> {
        let info = self.expr_info(operand);
        if !info.category.is_addressable() {
            return Err(HostError::new(
                ErrorCode::E2004,
                "cannot take the address of an expression without storage",
                span,
            ));
        }
        let pointer = self.types.pool_mut().pointer(info.ty);
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
            ExprInfo::new(TypePool::INT, ValueCategory::PRValue),
        )
    }

    fn build_index_call(
        &mut self,
        subject: ExprId,
        style: AccessStyle,
        span: Span,
    ) -> Result<ExprId, HostError> {
        let ty = self.expr_info(subject).ty;
        if self.index_accessor(ty).is_none() {
            return Err(HostError::new(
                ErrorCode::E2004,
                format!("`{}` has no `index()`", self.type_name(ty)),
                span,
            ));
        }
        Ok(self.alloc(
            ExprKind::Discriminant { subject, style },
            span,
            ExprInfo::new(TypePool::INT, ValueCategory::PRValue),
        ))
    }

    fn build_get_call(
        &mut self,
        subject: ExprId,
        index: u32,
        style: AccessStyle,
        span: Span,
    ) -> Result<ExprId, HostError> {
        let ty = self.expr_info(subject).ty;
        let element = match self.types.user(ty).map(|user| &user.kind) {
            Some(UserKind::Variant(def)) => def.alternatives.get(index as usize).copied(),
            Some(UserKind::Tuple(def)) => def.elements.get(index as usize).copied(),
            _ => None,
        };
        let Some(element) = element else {
            return Err(HostError::new(
                ErrorCode::E2004,
                format!("`{}` has no element {index}", self.type_name(ty)),
                span,
            ));
        };
        let element = self.propagate_const(element, ty);
        let category = self.element_category(subject);
        Ok(self.alloc(
            ExprKind::Element {
                subject,
                index,
                style,
            },
            span,
            ExprInfo::new(element, category),
        ))
    }

    fn build_subscript(
        &mut self,
        base: ExprId,
        index: u32,
        span: Span,
    ) -> Result<ExprId, HostError> {
        let ty = self.expr_info(base).ty;
        let Some((elem, _)) = self.pool().array_parts(ty) else {
            return Err(HostError::new(
                ErrorCode::E2004,
                format!("cannot subscript `{}`", self.type_name(ty)),
                span,
            ));
        };
        let elem = self.propagate_const(elem, ty);
        let category = self.element_category(base);
        let position = self.build_int_constant(u64::from(index), span);
        Ok(self.alloc(
            ExprKind::Index {
                base,
                index: position,
            },
            span,
            ExprInfo::new(elem, category),
        ))
    }

    fn build_field(&mut self, base: ExprId, index: u32, span: Span) -> Result<ExprId, HostError> {
        let ty = self.expr_info(base).ty;
        let field = self
            .types
            .fields(ty)
            .and_then(|fields| fields.get(index as usize).map(|field| (field.ty, field.bits)));
        let Some((field_ty, bits)) = field else {
            return Err(HostError::new(
                ErrorCode::E2004,
                format!("`{}` has no member {index}", self.type_name(ty)),
                span,
            ));
        };
        let field_ty = self.propagate_const(field_ty, ty);
        let category = match self.element_category(base) {
            ValueCategory::LValue if bits.is_some() => ValueCategory::BitField,
            other => other,
        };
        Ok(self.alloc(
            ExprKind::FieldAt { base, index },
            span,
            ExprInfo::new(field_ty, category),
        ))
    }

    fn pointer_to(&mut self, pointee: TyId, is_const: bool) -> TyId {
        let pool = self.types.pool_mut();
        let pointee = if is_const {
            pool.const_of(pointee)
        } else {
            pointee
        };
        pool.pointer(pointee)
    }

    fn build_downcast(
        &mut self,
        operand: ExprId,
        target: TyId,
        span: Span,
    ) -> Result<ExprId, HostError> {
        let from = self.expr_info(operand).ty;
        let (Some(from_pointee), Some(to_pointee)) =
            (self.pool().pointee(from), self.pool().pointee(target))
        else {
            return Err(unsupported("downcast between non-pointer types", span));
        };
        let related = self.types.is_class(from_pointee)
            && self.types.derives_from(to_pointee, from_pointee);
        if !related {
            return Err(HostError::new(
                ErrorCode::E2004,
                format!(
                    "`{}` is not a class derived from `{}`",
                    self.type_name(to_pointee),
                    self.type_name(from_pointee)
                ),
                span,
            ));
        }
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
        let pointer = self.types.pool_mut().pointer(target);
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
        let from = self.expr_info(value).ty;
        self.expect_convertible(from, to, span)?;
        Ok(self.alloc(
            ExprKind::Convert { value, to },
            span,
            ExprInfo::new(to, ValueCategory::PRValue),
        ))
    }

    fn push_scope(&mut self) {
        self.push_scope_inner();
    }

    fn pop_scope(&mut self) {
        self.pop_scope_inner();
    }

    fn check_jump(
        &mut self,
        kind: JumpKind,
        value: Option<ExprId>,
        span: Span,
    ) -> Result<(), HostError> {
        match kind {
            JumpKind::Return => {
                let Some(ret) = self.current_return else {
                    return Err(HostError::new(
                        ErrorCode::E2007,
                        "`return` outside of a function",
                        span,
                    ));
                };
                match value {
                    Some(value) => {
                        let ty = self.expr_info(value).ty;
                        if self.same_type(ret, TypePool::VOID) {
                            return Err(HostError::new(
                                ErrorCode::E2001,
                                "a `void` function cannot return a value",
                                span,
                            ));
                        }
                        self.expect_convertible(ty, ret, span)
                    }
                    None if self.same_type(ret, TypePool::VOID) => Ok(()),
                    None => Err(HostError::new(
                        ErrorCode::E2001,
                        format!("missing return value of type `{}`", self.type_name(ret)),
                        span,
                    )),
                }
            }
            JumpKind::Break | JumpKind::Continue if self.loop_depth > 0 => Ok(()),
            JumpKind::Break | JumpKind::Continue => Err(HostError::new(
                ErrorCode::E2007,
                format!("`{}` outside of a loop", kind.keyword()),
                span,
            )),
        }
    }
}
