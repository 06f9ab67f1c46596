//! Module checker.
//!
//! Walks every function of a parsed module through a [`ReferenceHost`]:
//! signatures first (so calls may refer to later functions), then bodies.
//! Errors are collected per statement; a failing statement is reported once
//! and checking resumes with the next one.

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use insp_diagnostic::{Diagnostic, DiagnosticQueue};
use insp_ir::{
    DeclId, ExprArena, ExprId, Function, JumpKind, MatchId, Name, ParsedModule, ParsedType, Span,
    StmtArena, StmtId, StmtKind, StringInterner, TyId,
};
use insp_lower::LoweredMatch;
use insp_sema::{ExprInfo, Host, HostError, MatchOptions};
use insp_stack::ensure_sufficient_stack;

use crate::host::{Callee, DeclInfo, ReferenceHost, Resolved};
use crate::registry::TypeRegistry;
use crate::types::TypePool;

/// A function ready to run.
#[derive(Clone, Debug)]
pub struct CheckedFunction {
    pub name: Name,
    pub params: Vec<DeclId>,
    pub param_tys: Vec<TyId>,
    pub ret: TyId,
    pub body: StmtId,
    pub span: Span,
}

/// A fully checked module: arenas, resolutions and lowered matches.
pub struct CheckedModule {
    pub(crate) types: TypeRegistry,
    pub(crate) exprs: ExprArena,
    pub(crate) stmts: StmtArena,
    pub(crate) infos: FxHashMap<ExprId, ExprInfo>,
    pub(crate) resolved: FxHashMap<ExprId, Resolved>,
    pub(crate) decls: Vec<DeclInfo>,
    pub(crate) locals: FxHashMap<StmtId, DeclId>,
    pub(crate) functions: Vec<CheckedFunction>,
    functions_by_name: FxHashMap<Name, usize>,
    pub(crate) matches: FxHashMap<MatchId, LoweredMatch>,
    pub(crate) deferred: FxHashSet<MatchId>,
}

impl CheckedModule {
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn function(&self, name: Name) -> Option<&CheckedFunction> {
        self.functions_by_name
            .get(&name)
            .map(|&index| &self.functions[index])
    }

    pub(crate) fn function_index(&self, name: Name) -> Option<usize> {
        self.functions_by_name.get(&name).copied()
    }

    /// Lowered form of match construct `id`; `None` for deferred constructs.
    pub fn lowered(&self, id: MatchId) -> Option<&LoweredMatch> {
        self.matches.get(&id)
    }

    /// Lowered constructs in source order.
    pub fn lowered_matches(&self) -> Vec<&LoweredMatch> {
        let mut lowered: Vec<&LoweredMatch> = self.matches.values().collect();
        lowered.sort_by_key(|lowered| lowered.id);
        lowered
    }

    pub fn is_deferred(&self, id: MatchId) -> bool {
        self.deferred.contains(&id)
    }

    pub(crate) fn callee(&self, call: ExprId) -> Option<Callee> {
        match self.resolved.get(&call) {
            Some(Resolved::Call(callee)) => Some(*callee),
            _ => None,
        }
    }
}

pub struct ModuleChecker<'a> {
    host: ReferenceHost<'a>,
    stmts: StmtArena,
    functions: Vec<Function>,
    locals: FxHashMap<StmtId, DeclId>,
    diagnostics: DiagnosticQueue,
}

impl<'a> ModuleChecker<'a> {
    pub fn new(
        module: ParsedModule,
        interner: &'a StringInterner,
        types: TypeRegistry,
        options: MatchOptions,
    ) -> Self {
        let ParsedModule {
            exprs,
            patterns,
            stmts,
            functions,
        } = module;
        ModuleChecker {
            host: ReferenceHost::new(interner, types, exprs, Rc::new(patterns), options),
            stmts,
            functions,
            locals: FxHashMap::default(),
            diagnostics: DiagnosticQueue::new(),
        }
    }

    /// Check every function. The module is returned even when errors were
    /// reported; callers decide whether it is runnable.
    pub fn check(mut self) -> (CheckedModule, DiagnosticQueue) {
        let _span = tracing::debug_span!("check_module", functions = self.functions.len()).entered();
        let functions = std::mem::take(&mut self.functions);

        let mut signatures = Vec::with_capacity(functions.len());
        for function in &functions {
            signatures.push(self.check_signature(function));
        }

        let mut checked = Vec::with_capacity(functions.len());
        let mut functions_by_name = FxHashMap::default();
        for (function, signature) in functions.iter().zip(signatures) {
            let Some((param_tys, ret)) = signature else {
                continue;
            };
            let checked_fn = self.check_body(function, param_tys, ret);
            functions_by_name.insert(function.name, checked.len());
            checked.push(checked_fn);
        }

        tracing::debug!(
            errors = self.diagnostics.error_count(),
            "checked module"
        );
        let output = self.host.into_output();
        let module = CheckedModule {
            types: output.types,
            exprs: output.exprs,
            stmts: self.stmts,
            infos: output.infos,
            resolved: output.resolved,
            decls: output.decls,
            locals: self.locals,
            functions: checked,
            functions_by_name,
            matches: output.matches,
            deferred: output.deferred,
        };
        (module, self.diagnostics)
    }

    fn check_signature(&mut self, function: &Function) -> Option<(Vec<TyId>, TyId)> {
        let result = (|| {
            let mut params = Vec::with_capacity(function.params.len());
            for param in &function.params {
                let ty = match &param.ty {
                    ParsedType::Auto => TypePool::DEPENDENT,
                    ty => self.host.resolve_type(ty, param.span)?,
                };
                params.push(ty);
            }
            let ret = self.host.resolve_type(&function.ret, function.span)?;
            self.host
                .register_function(function.name, params.clone(), ret, function.span)?;
            Ok::<_, HostError>((params, ret))
        })();
        match result {
            Ok(signature) => Some(signature),
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    fn check_body(&mut self, function: &Function, param_tys: Vec<TyId>, ret: TyId) -> CheckedFunction {
        let _span = tracing::debug_span!("check_function", name = ?function.name).entered();
        self.host.enter_function(ret);
        let params = function
            .params
            .iter()
            .zip(&param_tys)
            .map(|(param, &ty)| self.host.declare_param(param.name, ty, param.span))
            .collect();
        self.check_stmt(function.body);
        self.host.exit_function();
        CheckedFunction {
            name: function.name,
            params,
            param_tys,
            ret,
            body: function.body,
            span: function.span,
        }
    }

    fn check_stmt(&mut self, stmt: StmtId) {
        ensure_sufficient_stack(|| {
            if let Err(err) = self.check_stmt_inner(stmt) {
                self.report(err);
            }
        });
    }

    fn check_stmt_inner(&mut self, stmt: StmtId) -> Result<(), HostError> {
        let span = self.stmts.get(stmt).span;
        match self.stmts.get(stmt).kind.clone() {
            StmtKind::Local { ty, name, init } => {
                let ty = match ty {
                    ParsedType::Auto => None,
                    ty => Some(self.host.resolve_type(&ty, span)?),
                };
                if let Some(init) = init {
                    self.host.check_expr(init)?;
                }
                let decl = self.host.declare_local(name, ty, init, span)?;
                self.locals.insert(stmt, decl);
            }
            StmtKind::Expr(expr) => {
                self.host.check_expr(expr)?;
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                // Condition bindings are visible in the then-branch only.
                self.host.push_scope();
                let result = self.host.check_condition(cond);
                if result.is_ok() {
                    self.check_scoped(then_branch);
                }
                self.host.pop_scope();
                if let (Ok(()), Some(else_branch)) = (&result, else_branch) {
                    self.check_scoped(else_branch);
                }
                result?;
            }
            StmtKind::While { cond, body } => {
                self.host.push_scope();
                let result = self.host.check_condition(cond);
                if result.is_ok() {
                    self.host.enter_loop();
                    self.check_scoped(body);
                    self.host.exit_loop();
                }
                self.host.pop_scope();
                result?;
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.host.check_expr(value)?;
                }
                self.host.check_jump(JumpKind::Return, value, span)?;
            }
            StmtKind::Break => self.host.check_jump(JumpKind::Break, None, span)?,
            StmtKind::Continue => self.host.check_jump(JumpKind::Continue, None, span)?,
            StmtKind::Block(list) => {
                let stmts = self.stmts.list(list).to_vec();
                self.host.push_scope();
                for stmt in stmts {
                    self.check_stmt(stmt);
                }
                self.host.pop_scope();
            }
        }
        Ok(())
    }

    /// A branch or loop body gets its own scope even when it is a single
    /// statement.
    fn check_scoped(&mut self, stmt: StmtId) {
        self.host.push_scope();
        self.check_stmt(stmt);
        self.host.pop_scope();
    }

    /// Prefer the match checker's own diagnostic over the flattened host
    /// error it was converted into.
    fn report(&mut self, err: HostError) {
        let diagnostic = match self.host.take_match_error() {
            Some(diagnostic) if diagnostic.code == err.code => diagnostic,
            _ => Diagnostic::error(err.code)
                .with_message(err.message)
                .with_label(err.span, "here"),
        };
        tracing::debug!(code = %diagnostic.code, "reported diagnostic");
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
