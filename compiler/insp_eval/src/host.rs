//! Reference implementation of the host collaborator traits.
//!
//! [`ReferenceHost`] owns everything the pattern compiler treats as opaque:
//! the expression arena (parsed and synthesized nodes alike), the type
//! registry, declarations and lexical scopes. It checks the surface
//! language, answers the checker's [`Probe`] queries, and builds the
//! expressions the checker asks for through [`Host`](insp_sema::Host).
//!
//! Match constructs met while checking expressions are checked in place and
//! lowered right away; the lowered blocks are what the interpreter runs.

mod build;
mod expr;

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use insp_diagnostic::{Diagnostic, ErrorCode};
use insp_ir::{
    AccessStyle, BinaryOp, ConstraintId, DeclId, ExprArena, ExprId, ExprKind, MatchId, Name,
    PatternArena, Span, StringInterner, TyId, UnaryOp,
};
use insp_lower::{lower_match, LoweredMatch};
use insp_sema::{
    check_match, ExprInfo, HostError, MatchError, MatchOptions, MatchPosition, Probe, SizeProbe,
    ValueCategory,
};

use crate::registry::{TypeRegistry, UserKind};
use crate::types::{TypeFlags, TypePool};

/// Where a declaration keeps its value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Storage {
    /// The declaration owns a fresh object initialized from `init`.
    Owned,
    /// The declaration names the object `init` designates.
    Alias,
}

#[derive(Clone, Debug)]
pub struct DeclInfo {
    /// `None` for holding entities and element references.
    pub name: Option<Name>,
    pub ty: TyId,
    pub init: Option<ExprId>,
    pub storage: Storage,
    /// May constant folding look through to `init`?
    pub foldable: bool,
    pub span: Span,
}

/// What a call expression invokes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Callee {
    /// Index into the module's function list.
    Function(usize),
    /// `Type(args...)`. For a closed sum, `alternative` is the alternative
    /// the single argument initializes.
    Construct { ty: TyId, alternative: Option<u32> },
    /// The builtin `print(...)`.
    Print,
}

/// Name resolution recorded for the interpreter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Resolved {
    Decl(DeclId),
    /// Position of a named member in layout order.
    Field(u32),
    Call(Callee),
}

#[derive(Clone, Debug)]
struct FnSig {
    params: Vec<TyId>,
    ret: TyId,
}

/// Everything checking produced, handed to the interpreter.
pub(crate) struct HostOutput {
    pub types: TypeRegistry,
    pub exprs: ExprArena,
    pub infos: FxHashMap<ExprId, ExprInfo>,
    pub resolved: FxHashMap<ExprId, Resolved>,
    pub decls: Vec<DeclInfo>,
    pub matches: FxHashMap<MatchId, LoweredMatch>,
    pub deferred: FxHashSet<MatchId>,
}

pub struct ReferenceHost<'a> {
    interner: &'a StringInterner,
    types: TypeRegistry,
    exprs: ExprArena,
    patterns: Rc<PatternArena>,
    options: MatchOptions,
    infos: FxHashMap<ExprId, ExprInfo>,
    resolved: FxHashMap<ExprId, Resolved>,
    decls: Vec<DeclInfo>,
    scopes: Vec<FxHashMap<Name, DeclId>>,
    signatures: Vec<FnSig>,
    functions_by_name: FxHashMap<Name, usize>,
    /// Declared return type of the function being checked.
    current_return: Option<TyId>,
    loop_depth: u32,
    matches: FxHashMap<MatchId, LoweredMatch>,
    deferred: FxHashSet<MatchId>,
    /// Full diagnostic for the innermost match construct that failed.
    match_error: Option<Diagnostic>,
    /// The match-test whose bindings the statement being checked guards.
    guarding: Option<MatchId>,
    dump_lowered: bool,
}

impl<'a> ReferenceHost<'a> {
    pub fn new(
        interner: &'a StringInterner,
        types: TypeRegistry,
        exprs: ExprArena,
        patterns: Rc<PatternArena>,
        options: MatchOptions,
    ) -> Self {
        ReferenceHost {
            interner,
            types,
            exprs,
            patterns,
            options,
            infos: FxHashMap::default(),
            resolved: FxHashMap::default(),
            decls: Vec::new(),
            scopes: vec![FxHashMap::default()],
            signatures: Vec::new(),
            functions_by_name: FxHashMap::default(),
            current_return: None,
            loop_depth: 0,
            matches: FxHashMap::default(),
            deferred: FxHashSet::default(),
            match_error: None,
            guarding: None,
            dump_lowered: std::env::var_os("INSP_DUMP_LOWERED").is_some_and(|v| !v.is_empty()),
        }
    }

    #[inline]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    #[inline]
    fn pool(&self) -> &TypePool {
        self.types.pool()
    }

    #[inline]
    pub fn exprs(&self) -> &ExprArena {
        &self.exprs
    }

    pub fn decl(&self, decl: DeclId) -> &DeclInfo {
        &self.decls[decl.index()]
    }

    pub fn lowered(&self, id: MatchId) -> Option<&LoweredMatch> {
        self.matches.get(&id)
    }

    pub fn is_deferred(&self, id: MatchId) -> bool {
        self.deferred.contains(&id)
    }

    /// The diagnostic of the last failed match construct, if it has not
    /// been taken yet.
    pub fn take_match_error(&mut self) -> Option<Diagnostic> {
        self.match_error.take()
    }

    pub(crate) fn into_output(self) -> HostOutput {
        HostOutput {
            types: self.types,
            exprs: self.exprs,
            infos: self.infos,
            resolved: self.resolved,
            decls: self.decls,
            matches: self.matches,
            deferred: self.deferred,
        }
    }

    // === Module-level entry points ===

    /// Make `name` callable. Returns the function's index.
    pub fn register_function(
        &mut self,
        name: Name,
        params: Vec<TyId>,
        ret: TyId,
        span: Span,
    ) -> Result<usize, HostError> {
        if self.functions_by_name.contains_key(&name) {
            return Err(HostError::new(
                ErrorCode::E2001,
                format!("function `{}` is defined more than once", self.name(name)),
                span,
            ));
        }
        let index = self.signatures.len();
        self.signatures.push(FnSig { params, ret });
        self.functions_by_name.insert(name, index);
        Ok(index)
    }

    pub fn enter_function(&mut self, ret: TyId) {
        self.current_return = Some(ret);
        self.loop_depth = 0;
        self.push_scope_inner();
    }

    pub fn exit_function(&mut self) {
        self.pop_scope_inner();
        self.current_return = None;
    }

    pub fn enter_loop(&mut self) {
        self.loop_depth += 1;
    }

    pub fn exit_loop(&mut self) {
        self.loop_depth = self.loop_depth.saturating_sub(1);
    }

    pub fn declare_param(&mut self, name: Name, ty: TyId, span: Span) -> DeclId {
        self.declare(DeclInfo {
            name: Some(name),
            ty,
            init: None,
            storage: Storage::Owned,
            foldable: false,
            span,
        })
    }

    /// `T name = init;` or `T name;` as a statement.
    pub fn declare_local(
        &mut self,
        name: Name,
        ty: Option<TyId>,
        init: Option<ExprId>,
        span: Span,
    ) -> Result<DeclId, HostError> {
        let ty = match (ty, init) {
            (Some(ty), Some(init)) => {
                let from = self.expr_info(init).ty;
                self.expect_convertible(from, ty, span)?;
                ty
            }
            (Some(ty), None) => ty,
            (None, Some(init)) => self.decay(self.expr_info(init).ty),
            (None, None) => {
                return Err(HostError::new(
                    ErrorCode::E2001,
                    format!("`auto {}` needs an initializer", self.name(name)),
                    span,
                ))
            }
        };
        if self.pool().flags(ty).contains(TypeFlags::IS_VOID) {
            return Err(HostError::new(
                ErrorCode::E2001,
                format!("variable `{}` cannot have type `void`", self.name(name)),
                span,
            ));
        }
        let foldable = self.pool().flags(ty).contains(TypeFlags::IS_CONST);
        Ok(self.declare(DeclInfo {
            name: Some(name),
            ty,
            init,
            storage: Storage::Owned,
            foldable,
            span,
        }))
    }

    /// Check the condition of an `if` or `while`.
    ///
    /// When the condition is a match construct, parenthesized or not, its
    /// bindings are declared in the current scope: the caller checks the
    /// guarded branch in that scope and pops it before anything else.
    pub fn check_condition(&mut self, cond: ExprId) -> Result<(), HostError> {
        self.guarding = self.guarded_match(cond);
        let info = match insp_sema::condition_match(&self.exprs, cond) {
            Some(id) => self.check_match_at(id, MatchPosition::Condition).map(|info| {
                self.infos.insert(cond, info);
                info
            }),
            None => self.check_surface(cond),
        };
        self.guarding = None;
        let info = info?;
        if self.is_convertible(info.ty, TypePool::BOOL) {
            Ok(())
        } else {
            Err(HostError::new(
                ErrorCode::E2001,
                format!("condition of type `{}` is not convertible to `bool`", self.type_name(info.ty)),
                self.exprs.span(cond),
            ))
        }
    }

    /// What `*operand` designates: the pointee of a pointer, or the payload
    /// stored inside an optional.
    fn deref_target(&self, operand: ExprInfo) -> Option<ExprInfo> {
        if let Some(pointee) = self.pool().pointee(operand.ty) {
            return Some(ExprInfo::new(pointee, ValueCategory::LValue));
        }
        let payload = self.types.optional_payload(operand.ty)?;
        let category = match operand.category {
            ValueCategory::PRValue => ValueCategory::XValue,
            category => category,
        };
        Some(ExprInfo::new(payload, category))
    }

    fn guarded_match(&self, cond: ExprId) -> Option<MatchId> {
        match self.exprs.kind(cond) {
            ExprKind::Match(id) => Some(*id),
            ExprKind::Paren(inner) => self.guarded_match(*inner),
            _ => None,
        }
    }

    // === Shared helpers ===

    fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    fn declare(&mut self, info: DeclInfo) -> DeclId {
        let decl = DeclId::from_len(self.decls.len());
        if let (Some(name), Some(scope)) = (info.name, self.scopes.last_mut()) {
            scope.insert(name, decl);
        }
        self.decls.push(info);
        decl
    }

    fn is_declared_in_current_scope(&self, name: Name) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.contains_key(&name))
    }

    fn lookup(&self, name: Name) -> Option<DeclId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
    }

    fn push_scope_inner(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn pop_scope_inner(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        } else {
            tracing::error!("unbalanced scope pop");
        }
    }

    fn alloc(&mut self, kind: ExprKind, span: Span, info: ExprInfo) -> ExprId {
        let id = self.exprs.alloc(kind, span);
        self.infos.insert(id, info);
        id
    }

    fn expect_convertible(&self, from: TyId, to: TyId, span: Span) -> Result<(), HostError> {
        if self.is_convertible(from, to) {
            Ok(())
        } else {
            Err(HostError::new(
                ErrorCode::E2001,
                format!(
                    "cannot convert `{}` to `{}`",
                    self.type_name(from),
                    self.type_name(to)
                ),
                span,
            ))
        }
    }

    /// Check and lower the match construct `id`.
    fn check_match_at(
        &mut self,
        id: MatchId,
        position: MatchPosition,
    ) -> Result<ExprInfo, HostError> {
        let patterns = Rc::clone(&self.patterns);
        let options = self.options;
        // Bindings of any other construct are visible to its own guard only.
        let exported = self.guarding == Some(id);
        if !exported {
            self.push_scope_inner();
        }
        let checked = check_match(self, &patterns, id, position, &options);
        if !exported {
            self.pop_scope_inner();
        }
        let checked = match checked {
            Ok(checked) => checked,
            Err(err) => return Err(self.record_match_error(err)),
        };

        if checked.deferred {
            tracing::debug!(?id, "match construct deferred until instantiation");
            self.deferred.insert(id);
        } else {
            let lowered = match lower_match(&checked, &options) {
                Ok(lowered) => lowered,
                Err(err) => {
                    let host_error = HostError::new(err.code(), err.to_string(), err.span());
                    if self.match_error.is_none() {
                        self.match_error = Some(err.into_diagnostic());
                    }
                    return Err(host_error);
                }
            };
            if self.dump_lowered {
                tracing::info!(target: "insp_eval::lowered", "\n{lowered}");
            }
            self.matches.insert(id, lowered);
        }
        Ok(ExprInfo::new(checked.result_ty, ValueCategory::PRValue))
    }

    /// Keep the rich diagnostic and hand the caller a host error with the
    /// same code, so enclosing constructs fail with it too.
    fn record_match_error(&mut self, err: MatchError) -> HostError {
        let host_error = HostError::new(err.code(), err.to_string(), err.span());
        if self.match_error.is_none() {
            self.match_error = Some(err.into_diagnostic());
        }
        host_error
    }

    fn constant_int(&self, expr: ExprId) -> Option<i64> {
        match self.exprs.kind(expr) {
            ExprKind::Int(n) => Some(*n),
            ExprKind::Char(c) => Some(i64::from(u32::from(*c))),
            ExprKind::Bool(b) => Some(i64::from(*b)),
            ExprKind::Paren(inner) | ExprKind::Convert { value: inner, .. } => {
                self.constant_int(*inner)
            }
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand,
            } => self.constant_int(*operand)?.checked_neg(),
            ExprKind::Unary {
                op: UnaryOp::Not, ..
            }
            | ExprKind::Truth(_) => self.constant_bool(expr).map(i64::from),
            ExprKind::Binary { op, left, right } => {
                if op.is_comparison() || op.is_logical() {
                    return self.constant_bool(expr).map(i64::from);
                }
                let (l, r) = (self.constant_int(*left)?, self.constant_int(*right)?);
                match op {
                    BinaryOp::Add => l.checked_add(r),
                    BinaryOp::Sub => l.checked_sub(r),
                    BinaryOp::Mul => l.checked_mul(r),
                    BinaryOp::Div => l.checked_div(r),
                    BinaryOp::Mod => l.checked_rem(r),
                    _ => None,
                }
            }
            ExprKind::DeclRef(decl) => self.fold_decl(*decl),
            ExprKind::Ident(_) => match self.resolved.get(&expr) {
                Some(Resolved::Decl(decl)) => self.fold_decl(*decl),
                _ => None,
            },
            _ => None,
        }
    }

    fn fold_decl(&self, decl: DeclId) -> Option<i64> {
        let info = self.decls.get(decl.index())?;
        if !info.foldable {
            return None;
        }
        self.constant_int(info.init?)
    }
}

fn unsupported(what: &str, span: Span) -> HostError {
    HostError::new(ErrorCode::E2008, format!("{what} is not supported"), span)
}

impl Probe for ReferenceHost<'_> {
    fn expr_info(&self, expr: ExprId) -> ExprInfo {
        self.infos.get(&expr).copied().unwrap_or_else(|| {
            tracing::error!(?expr, "expression queried before it was checked");
            ExprInfo::new(TypePool::VOID, ValueCategory::PRValue)
        })
    }

    fn type_name(&self, ty: TyId) -> String {
        self.types.display(ty)
    }

    fn constraint_name(&self, constraint: ConstraintId) -> String {
        self.types.constraint_name(constraint).to_string()
    }

    fn void_type(&self) -> TyId {
        TypePool::VOID
    }

    fn bool_type(&self) -> TyId {
        TypePool::BOOL
    }

    fn is_dependent(&self, ty: TyId) -> bool {
        self.pool().flags(ty).is_dependent()
    }

    fn same_type(&self, a: TyId, b: TyId) -> bool {
        a == b
    }

    fn is_convertible(&self, from: TyId, to: TyId) -> bool {
        let pool = self.pool();
        let (from, to) = (pool.strip_const(from), pool.strip_const(to));
        let (from_flags, to_flags) = (pool.flags(from), pool.flags(to));
        if from == to || from_flags.is_dependent() || to_flags.is_dependent() {
            return true;
        }
        if from_flags.is_arithmetic() && to_flags.is_arithmetic() {
            return true;
        }
        if to == TypePool::BOOL
            && (from_flags.is_scalar() || self.types.optional_payload(from).is_some())
        {
            return true;
        }
        if from_flags.contains(TypeFlags::IS_NULLPTR) && to_flags.contains(TypeFlags::IS_POINTER) {
            return true;
        }
        let (Some(from_pointee), Some(to_pointee)) = (pool.pointee(from), pool.pointee(to)) else {
            return false;
        };
        let drops_const = pool.flags(from_pointee).contains(TypeFlags::IS_CONST)
            && !pool.flags(to_pointee).contains(TypeFlags::IS_CONST);
        if drops_const {
            return false;
        }
        let (from_core, to_core) = (pool.strip_const(from_pointee), pool.strip_const(to_pointee));
        from_core == to_core || self.types.derives_from(from_core, to_core)
    }

    fn decay(&self, ty: TyId) -> TyId {
        self.pool().strip_const(ty)
    }

    fn is_const(&self, ty: TyId) -> bool {
        self.pool().flags(ty).contains(TypeFlags::IS_CONST)
    }

    fn variant_size(&self, ty: TyId) -> SizeProbe {
        match self.types.user(ty).map(|user| &user.kind) {
            Some(UserKind::Variant(def)) => def.size,
            _ => SizeProbe::Absent,
        }
    }

    fn variant_alternative(&self, ty: TyId, index: u64) -> Option<TyId> {
        match &self.types.user(ty)?.kind {
            UserKind::Variant(def) => def.alternatives.get(usize::try_from(index).ok()?).copied(),
            _ => None,
        }
    }

    fn index_accessor(&self, ty: TyId) -> Option<AccessStyle> {
        match &self.types.user(ty)?.kind {
            UserKind::Variant(def) => def.index,
            _ => None,
        }
    }

    fn get_accessor(&self, ty: TyId) -> Option<AccessStyle> {
        match &self.types.user(ty)?.kind {
            UserKind::Variant(def) => def.get,
            UserKind::Tuple(def) => def.get,
            _ => None,
        }
    }

    fn array_extent(&self, ty: TyId) -> Option<u64> {
        self.pool().array_parts(ty).map(|(_, extent)| extent)
    }

    fn tuple_size(&self, ty: TyId) -> SizeProbe {
        match self.types.user(ty).map(|user| &user.kind) {
            Some(UserKind::Tuple(def)) => def.size,
            _ => SizeProbe::Absent,
        }
    }

    fn tuple_element(&self, ty: TyId, index: u64) -> Option<TyId> {
        match &self.types.user(ty)?.kind {
            UserKind::Tuple(def) => def.elements.get(usize::try_from(index).ok()?).copied(),
            _ => None,
        }
    }

    fn aggregate_arity(&self, ty: TyId) -> Option<u64> {
        match &self.types.user(ty)?.kind {
            UserKind::Aggregate(fields) => Some(fields.len() as u64),
            _ => None,
        }
    }

    fn satisfies(&self, constraint: ConstraintId, ty: TyId) -> bool {
        self.types.satisfies(constraint, ty)
    }

    fn has_try_cast(&self, _target: TyId, subject: TyId) -> bool {
        matches!(
            self.types.user(subject).map(|user| &user.kind),
            Some(UserKind::Any)
        )
    }

    fn constant_bool(&self, expr: ExprId) -> Option<bool> {
        match self.exprs.kind(expr) {
            ExprKind::Bool(b) => Some(*b),
            ExprKind::Paren(inner) => self.constant_bool(*inner),
            ExprKind::Truth(inner) => self
                .constant_bool(*inner)
                .or_else(|| self.constant_int(*inner).map(|n| n != 0)),
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => self.constant_bool(*operand).map(|b| !b),
            ExprKind::Binary { op, left, right } if op.is_logical() => {
                let (l, r) = (self.constant_bool(*left)?, self.constant_bool(*right)?);
                Some(if *op == BinaryOp::And { l && r } else { l || r })
            }
            ExprKind::Binary { op, left, right } if op.is_comparison() => {
                let (l, r) = (self.constant_int(*left)?, self.constant_int(*right)?);
                Some(match op {
                    BinaryOp::Eq => l == r,
                    BinaryOp::NotEq => l != r,
                    BinaryOp::Lt => l < r,
                    BinaryOp::LtEq => l <= r,
                    BinaryOp::Gt => l > r,
                    _ => l >= r,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
