//! Tree-walking interpreter over a checked module.
//!
//! Surface statements and expressions are walked directly. Match constructs
//! are not: the interpreter runs their lowered blocks, so what executes is
//! exactly the short-circuit chain lowering produced.
//!
//! Object lifetimes follow the source language. Locals die with their
//! block, temporaries at the end of the full expression, and the holding
//! entity of a match construct either with the full expression or with the
//! enclosing `if`/`while`, as its lifetime plan says.

mod memory;
mod value;

use rustc_hash::FxHashMap;

use insp_ir::{
    BinaryOp, DeclId, ExprId, ExprKind, JumpKind, MatchId, Span, StmtId, StmtKind, StringInterner,
    TyId, UnaryOp,
};
use insp_lower::{Instr, Terminator};
use insp_sema::LifetimeScope;
use insp_stack::ensure_sufficient_stack;

use crate::checker::CheckedModule;
use crate::error::EvalError;
use crate::host::{Callee, Resolved, Storage};
use crate::registry::UserKind;
use crate::types::{TypeKind, TypePool};

pub use memory::Place;
use memory::{CellId, Memory};
pub use value::Value;

/// Per-call state.
#[derive(Default)]
struct Frame {
    decls: FxHashMap<DeclId, Place>,
    /// Cells owned by each open block, innermost last.
    scopes: Vec<Vec<CellId>>,
    /// Temporaries of the full expressions being evaluated.
    temps: Vec<CellId>,
}

enum LoopStep {
    Next,
    Exit,
}

pub struct Interpreter<'m> {
    module: &'m CheckedModule,
    interner: &'m StringInterner,
    memory: Memory,
    frame: Frame,
    output: Vec<String>,
}

impl<'m> Interpreter<'m> {
    pub fn new(module: &'m CheckedModule, interner: &'m StringInterner) -> Self {
        Interpreter {
            module,
            interner,
            memory: Memory::new(),
            frame: Frame::default(),
            output: Vec::new(),
        }
    }

    /// Call the function `name` with `args`.
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        let index = self
            .interner
            .get(name)
            .and_then(|name| self.module.function_index(name))
            .ok_or_else(|| EvalError::UnknownFunction {
                name: name.to_string(),
            })?;
        let span = self.module.functions[index].span;
        self.call_function(index, args, span)
    }

    /// Lines written by `print`.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    // === Frames and lifetimes ===

    fn call_function(
        &mut self,
        index: usize,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, EvalError> {
        let module = self.module;
        let function = &module.functions[index];
        if args.len() != function.params.len() {
            return Err(EvalError::Internal {
                message: format!(
                    "expected {} argument(s), got {}",
                    function.params.len(),
                    args.len()
                ),
                span,
            });
        }
        tracing::trace!(function = self.interner.lookup(function.name), "call");

        let caller = std::mem::take(&mut self.frame);
        let result = self.in_scope(|this| {
            for ((&decl, &ty), arg) in function.params.iter().zip(&function.param_tys).zip(args) {
                let value = this.convert(arg, ty);
                let cell = this.alloc_scoped(value);
                this.frame.decls.insert(decl, Place::root(cell));
            }
            this.exec(function.body)
        });
        let callee = std::mem::replace(&mut self.frame, caller);
        self.release(callee);

        match result {
            Ok(()) => Ok(Value::Void),
            Err(EvalError::Return(value)) => Ok(self.convert(value, function.ret)),
            Err(EvalError::Break | EvalError::Continue) => Err(EvalError::Internal {
                message: "loop control escaped a function".to_string(),
                span,
            }),
            Err(err) => Err(err),
        }
    }

    fn release(&mut self, frame: Frame) {
        for cell in frame.scopes.into_iter().flatten().chain(frame.temps) {
            self.memory.kill(cell);
        }
    }

    fn in_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        self.frame.scopes.push(Vec::new());
        let result = f(self);
        if let Some(cells) = self.frame.scopes.pop() {
            for cell in cells {
                self.memory.kill(cell);
            }
        }
        result
    }

    /// Evaluate one full expression; its temporaries die afterwards.
    fn full_expr<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        let mark = self.frame.temps.len();
        let result = f(self);
        for cell in self.frame.temps.split_off(mark) {
            self.memory.kill(cell);
        }
        result
    }

    fn alloc_scoped(&mut self, value: Value) -> CellId {
        let cell = self.memory.alloc(value);
        match self.frame.scopes.last_mut() {
            Some(scope) => scope.push(cell),
            None => self.frame.temps.push(cell),
        }
        cell
    }

    fn alloc_temp(&mut self, value: Value) -> CellId {
        let cell = self.memory.alloc(value);
        self.frame.temps.push(cell);
        cell
    }

    fn decl_place(&self, decl: DeclId, span: Span) -> Result<Place, EvalError> {
        self.frame.decls.get(&decl).cloned().ok_or_else(|| {
            let name = self
                .module
                .decls
                .get(decl.index())
                .and_then(|info| info.name)
                .map_or("<match entity>", |name| self.interner.lookup(name));
            EvalError::Uninitialized {
                name: name.to_string(),
                span,
            }
        })
    }

    fn read(&self, place: &Place, span: Span) -> Result<Value, EvalError> {
        self.memory.read(place, span).cloned()
    }

    // === Statements ===

    fn exec(&mut self, stmt: StmtId) -> Result<(), EvalError> {
        ensure_sufficient_stack(|| self.exec_inner(stmt))
    }

    fn exec_inner(&mut self, stmt: StmtId) -> Result<(), EvalError> {
        let module = self.module;
        let parsed = module.stmts.get(stmt);
        let span = parsed.span;
        match &parsed.kind {
            StmtKind::Local { init, .. } => {
                let Some(&decl) = module.locals.get(&stmt) else {
                    return Err(EvalError::Internal {
                        message: "local was never declared".to_string(),
                        span,
                    });
                };
                let ty = module.decls[decl.index()].ty;
                let value = match init {
                    Some(init) => self.full_expr(|this| this.eval(*init))?,
                    None => self.default_value(ty),
                };
                let value = self.convert(value, ty);
                let cell = self.alloc_scoped(value);
                self.frame.decls.insert(decl, Place::root(cell));
                Ok(())
            }
            StmtKind::Expr(expr) => {
                self.full_expr(|this| this.eval(*expr))?;
                Ok(())
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.in_scope(|this| {
                let taken = this.full_expr(|this| this.eval(*cond))?.truth();
                if taken {
                    this.in_scope(|this| this.exec(*then_branch))
                } else if let Some(else_branch) = else_branch {
                    this.in_scope(|this| this.exec(*else_branch))
                } else {
                    Ok(())
                }
            }),
            StmtKind::While { cond, body } => loop {
                let step = self.in_scope(|this| {
                    let result = this
                        .full_expr(|this| this.eval(*cond))
                        .and_then(|value| {
                            if value.truth() {
                                this.in_scope(|this| this.exec(*body)).map(|()| true)
                            } else {
                                Ok(false)
                            }
                        });
                    match result {
                        Ok(true) | Err(EvalError::Continue) => Ok(LoopStep::Next),
                        Ok(false) | Err(EvalError::Break) => Ok(LoopStep::Exit),
                        Err(err) => Err(err),
                    }
                })?;
                if let LoopStep::Exit = step {
                    break Ok(());
                }
            },
            StmtKind::Return(value) => {
                let value = match value {
                    Some(value) => self.full_expr(|this| this.eval(*value))?,
                    None => Value::Void,
                };
                Err(EvalError::Return(value))
            }
            StmtKind::Break => Err(EvalError::Break),
            StmtKind::Continue => Err(EvalError::Continue),
            StmtKind::Block(list) => self.in_scope(|this| {
                for &stmt in module.stmts.list(*list) {
                    this.exec(stmt)?;
                }
                Ok(())
            }),
        }
    }

    // === Expressions ===

    fn eval(&mut self, expr: ExprId) -> Result<Value, EvalError> {
        ensure_sufficient_stack(|| self.eval_inner(expr))
    }

    fn eval_inner(&mut self, expr: ExprId) -> Result<Value, EvalError> {
        let module = self.module;
        let span = module.exprs.span(expr);
        match module.exprs.kind(expr) {
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(bits) => Ok(Value::Double(f64::from_bits(*bits))),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Char(c) => Ok(Value::Char(*c)),
            ExprKind::NullPtr => Ok(Value::Pointer(None)),
            ExprKind::Paren(inner) => self.eval(*inner),
            ExprKind::Ident(_)
            | ExprKind::DeclRef(_)
            | ExprKind::Field { .. }
            | ExprKind::Index { .. }
            | ExprKind::FieldAt { .. }
            | ExprKind::Element { .. }
            | ExprKind::Assign { .. }
            | ExprKind::Unary {
                op: UnaryOp::Deref,
                ..
            } => {
                let place = self.place(expr)?;
                self.read(&place, span)
            }
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Neg => match self.eval(*operand)? {
                    Value::Double(d) => Ok(Value::Double(-d)),
                    value => {
                        let n = self.integral(&value, span)?;
                        Ok(Value::Int(n.wrapping_neg()))
                    }
                },
                UnaryOp::Not => Ok(Value::Bool(!self.eval(*operand)?.truth())),
                UnaryOp::AddrOf => Ok(Value::Pointer(Some(self.place(*operand)?))),
                UnaryOp::Deref => Err(EvalError::Internal {
                    message: "dereference evaluated as a value".to_string(),
                    span,
                }),
            },
            ExprKind::Binary { op, left, right } => self.eval_binary(*op, *left, *right, span),
            ExprKind::Call { args, .. } => {
                let mut values = Vec::new();
                for &arg in module.exprs.list(*args) {
                    values.push(self.eval(arg)?);
                }
                self.eval_call(expr, module.exprs.list(*args), values, span)
            }
            ExprKind::ArrayLit(elements) => {
                let elem = module
                    .infos
                    .get(&expr)
                    .and_then(|info| module.types.pool().array_parts(info.ty))
                    .map_or(TypePool::DEPENDENT, |(elem, _)| elem);
                let mut values = Vec::new();
                for &element in module.exprs.list(*elements) {
                    let value = self.eval(element)?;
                    values.push(self.convert(value, elem));
                }
                Ok(Value::Array(values))
            }
            ExprKind::Match(id) => self.run_match(*id, span),
            ExprKind::Truth(inner) => Ok(Value::Bool(self.eval(*inner)?.truth())),
            ExprKind::Discriminant { subject, .. } => {
                let place = self.place(*subject)?;
                match self.memory.read(&place, span)? {
                    Value::Variant { index, .. } => Ok(Value::Int(i64::from(*index))),
                    _ => Err(EvalError::Internal {
                        message: "discriminant of a value that is not a closed sum".to_string(),
                        span,
                    }),
                }
            }
            ExprKind::Downcast { operand, target } => self.eval_downcast(*operand, *target, span),
            ExprKind::TryCast { operand, target } => {
                let place = self.place(*operand)?;
                let target = module.types.pool().strip_const(*target);
                let hit = matches!(
                    self.memory.read(&place, span)?,
                    Value::Any(Some((ty, _))) if *ty == target
                );
                Ok(Value::Pointer(hit.then(|| place.project(0))))
            }
            ExprKind::Convert { value, to } => {
                let value = self.eval(*value)?;
                Ok(self.convert(value, *to))
            }
            ExprKind::MemberPtr { .. } | ExprKind::Error => Err(EvalError::Internal {
                message: format!("cannot evaluate a {}", module.exprs.kind(expr).describe()),
                span,
            }),
        }
    }

    /// The object an expression designates. Expressions without storage
    /// are materialized into a temporary.
    fn place(&mut self, expr: ExprId) -> Result<Place, EvalError> {
        ensure_sufficient_stack(|| self.place_inner(expr))
    }

    fn place_inner(&mut self, expr: ExprId) -> Result<Place, EvalError> {
        let module = self.module;
        let span = module.exprs.span(expr);
        match module.exprs.kind(expr) {
            ExprKind::Ident(_) => match module.resolved.get(&expr) {
                Some(Resolved::Decl(decl)) => self.decl_place(*decl, span),
                _ => Err(EvalError::Internal {
                    message: "unresolved identifier".to_string(),
                    span,
                }),
            },
            ExprKind::DeclRef(decl) => self.decl_place(*decl, span),
            ExprKind::Paren(inner) => self.place(*inner),
            ExprKind::Unary {
                op: UnaryOp::Deref,
                operand,
            } => self.deref(*operand, span),
            ExprKind::Field { base, arrow, .. } => {
                let Some(Resolved::Field(index)) = module.resolved.get(&expr) else {
                    return Err(EvalError::Internal {
                        message: "unresolved member".to_string(),
                        span,
                    });
                };
                let base = if *arrow {
                    self.deref(*base, span)?
                } else {
                    self.place(*base)?
                };
                Ok(base.project(*index))
            }
            ExprKind::FieldAt { base, index } => Ok(self.place(*base)?.project(*index)),
            ExprKind::Element { subject, index, .. } => {
                Ok(self.place(*subject)?.project(*index))
            }
            ExprKind::Index { base, index } => {
                let base = self.place(*base)?;
                let value = self.eval(*index)?;
                let index = self.integral(&value, span)?;
                let position = u32::try_from(index).map_err(|_| EvalError::IndexOutOfBounds {
                    index,
                    len: 0,
                    span,
                })?;
                Ok(base.project(position))
            }
            ExprKind::Assign { target, value } => {
                let place = self.place(*target)?;
                let value = self.eval(*value)?;
                let ty = module
                    .infos
                    .get(target)
                    .map_or(TypePool::DEPENDENT, |info| info.ty);
                let mut value = self.convert(value, ty);
                if let Some(width) = self.bit_width(*target) {
                    value = truncate_bits(value, width);
                }
                self.memory.write(&place, value, span)?;
                Ok(place)
            }
            _ => {
                let value = self.eval(expr)?;
                Ok(Place::root(self.alloc_temp(value)))
            }
        }
    }

    fn deref(&mut self, pointer: ExprId, span: Span) -> Result<Place, EvalError> {
        let module = self.module;
        let is_optional = module
            .infos
            .get(&pointer)
            .is_some_and(|info| module.types.optional_payload(info.ty).is_some());
        if is_optional {
            // The payload lives inside the optional; reading an empty one fails.
            return Ok(self.place(pointer)?.project(0));
        }
        match self.eval(pointer)? {
            Value::Pointer(Some(place)) => Ok(place),
            Value::Pointer(None) => Err(EvalError::NullDereference { span }),
            _ => Err(EvalError::Internal {
                message: "dereference of a non-pointer".to_string(),
                span,
            }),
        }
    }

    fn integral(&self, value: &Value, span: Span) -> Result<i64, EvalError> {
        value.as_i64().ok_or_else(|| EvalError::Internal {
            message: format!("expected an integer, found `{value}`"),
            span,
        })
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        span: Span,
    ) -> Result<Value, EvalError> {
        match op {
            BinaryOp::And => {
                let value = self.eval(left)?.truth() && self.eval(right)?.truth();
                return Ok(Value::Bool(value));
            }
            BinaryOp::Or => {
                let value = self.eval(left)?.truth() || self.eval(right)?.truth();
                return Ok(Value::Bool(value));
            }
            _ => {}
        }
        let l = self.eval(left)?;
        let r = self.eval(right)?;

        if op.is_comparison() {
            let ordering = match (&l, &r) {
                (Value::Pointer(a), Value::Pointer(b)) => {
                    let equal = a == b;
                    return match op {
                        BinaryOp::Eq => Ok(Value::Bool(equal)),
                        BinaryOp::NotEq => Ok(Value::Bool(!equal)),
                        _ => Err(EvalError::Internal {
                            message: "ordered comparison of pointers".to_string(),
                            span,
                        }),
                    };
                }
                (Value::Double(_), _) | (_, Value::Double(_)) => {
                    let (a, b) = (self.float(&l, span)?, self.float(&r, span)?);
                    a.partial_cmp(&b)
                }
                _ => Some(self.integral(&l, span)?.cmp(&self.integral(&r, span)?)),
            };
            let Some(ordering) = ordering else {
                return Ok(Value::Bool(op == BinaryOp::NotEq));
            };
            let result = match op {
                BinaryOp::Eq => ordering.is_eq(),
                BinaryOp::NotEq => ordering.is_ne(),
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::LtEq => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            };
            return Ok(Value::Bool(result));
        }

        if matches!(l, Value::Double(_)) || matches!(r, Value::Double(_)) {
            let (a, b) = (self.float(&l, span)?, self.float(&r, span)?);
            let value = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a % b,
            };
            return Ok(Value::Double(value));
        }

        let (a, b) = (self.integral(&l, span)?, self.integral(&r, span)?);
        let value = match op {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div | BinaryOp::Mod if b == 0 => {
                return Err(EvalError::DivisionByZero { span })
            }
            BinaryOp::Div => a.wrapping_div(b),
            _ => a.wrapping_rem(b),
        };
        Ok(Value::Int(value))
    }

    fn float(&self, value: &Value, span: Span) -> Result<f64, EvalError> {
        value.as_f64().ok_or_else(|| EvalError::Internal {
            message: format!("expected a number, found `{value}`"),
            span,
        })
    }

    fn eval_call(
        &mut self,
        call: ExprId,
        args: &[ExprId],
        values: Vec<Value>,
        span: Span,
    ) -> Result<Value, EvalError> {
        let module = self.module;
        match module.callee(call) {
            Some(Callee::Function(index)) => self.call_function(index, values, span),
            Some(Callee::Construct { ty, alternative }) => {
                self.construct(ty, alternative, args, values, span)
            }
            Some(Callee::Print) => {
                let line = values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                tracing::debug!(%line, "print");
                self.output.push(line);
                Ok(Value::Void)
            }
            None => Err(EvalError::Internal {
                message: "unresolved call".to_string(),
                span,
            }),
        }
    }

    fn construct(
        &mut self,
        ty: TyId,
        alternative: Option<u32>,
        args: &[ExprId],
        values: Vec<Value>,
        span: Span,
    ) -> Result<Value, EvalError> {
        let module = self.module;
        let types = &module.types;
        let Some(user) = types.user(ty) else {
            return Err(EvalError::Internal {
                message: "construction of a builtin type".to_string(),
                span,
            });
        };
        match &user.kind {
            UserKind::Aggregate(_) | UserKind::Class { .. } => {
                let fields = types.fields(ty).unwrap_or_default();
                let fields = fields
                    .iter()
                    .zip(values)
                    .map(|(field, value)| {
                        let value = self.convert(value, field.ty);
                        match field.bits {
                            Some(width) => truncate_bits(value, width),
                            None => value,
                        }
                    })
                    .collect();
                Ok(Value::Record { ty, fields })
            }
            UserKind::Tuple(def) => {
                let fields = def
                    .elements
                    .iter()
                    .zip(values)
                    .map(|(&elem, value)| self.convert(value, elem))
                    .collect();
                Ok(Value::Record { ty, fields })
            }
            UserKind::Variant(def) => {
                let index = alternative.unwrap_or(0);
                let alt_ty = def
                    .alternatives
                    .get(index as usize)
                    .copied()
                    .unwrap_or(TypePool::DEPENDENT);
                let payload = values.into_iter().next().unwrap_or(Value::Void);
                Ok(Value::Variant {
                    index,
                    payload: Box::new(self.convert(payload, alt_ty)),
                })
            }
            UserKind::Any => {
                let payload_ty = args
                    .first()
                    .and_then(|arg| module.infos.get(arg))
                    .map(|info| types.pool().strip_const(info.ty));
                let boxed = payload_ty
                    .zip(values.into_iter().next())
                    .map(|(ty, value)| (ty, Box::new(value)));
                Ok(Value::Any(boxed))
            }
            UserKind::Optional(payload) => Ok(Value::Any(
                values
                    .into_iter()
                    .next()
                    .map(|value| (*payload, Box::new(self.convert(value, *payload)))),
            )),
        }
    }

    fn eval_downcast(
        &mut self,
        operand: ExprId,
        target: TyId,
        span: Span,
    ) -> Result<Value, EvalError> {
        let module = self.module;
        let types = &module.types;
        let Value::Pointer(pointer) = self.eval(operand)? else {
            return Err(EvalError::Internal {
                message: "downcast of a non-pointer".to_string(),
                span,
            });
        };
        let Some(place) = pointer else {
            return Ok(Value::Pointer(None));
        };
        let Some(target) = types.pool().pointee(target) else {
            return Ok(Value::Pointer(None));
        };
        let hit = match self.memory.read(&place, span)? {
            Value::Record { ty, .. } => types.derives_from(*ty, target),
            _ => false,
        };
        Ok(Value::Pointer(hit.then_some(place)))
    }

    // === Match constructs ===

    /// Run the lowered blocks of match construct `id`.
    fn run_match(&mut self, id: MatchId, span: Span) -> Result<Value, EvalError> {
        let module = self.module;
        if module.is_deferred(id) {
            return Err(EvalError::Deferred { span });
        }
        let Some(lowered) = module.lowered(id) else {
            return Err(EvalError::Internal {
                message: format!("{id:?} was never lowered"),
                span,
            });
        };
        let scope = lowered.lifetime.scope;
        let mut result = Value::Void;
        let mut current = lowered.entry;
        loop {
            let block = lowered.block(current);
            for instr in &block.body {
                match *instr {
                    Instr::Init(decl) => self.init_decl(decl, scope)?,
                    Instr::Flag(flag) => result = Value::Bool(flag),
                    Instr::Store(value) => result = self.eval(value)?,
                    Instr::Eval(value) => {
                        self.eval(value)?;
                    }
                }
            }
            match &block.terminator {
                Terminator::Jump(target) => current = *target,
                Terminator::Branch {
                    cond,
                    then_block,
                    else_block,
                } => {
                    current = if self.eval(*cond)?.truth() {
                        *then_block
                    } else {
                        *else_block
                    };
                }
                Terminator::Finish => return Ok(result),
                Terminator::Escape { kind, value } => {
                    return Err(match kind {
                        JumpKind::Return => {
                            let value = match value {
                                Some(value) => self.eval(*value)?,
                                None => Value::Void,
                            };
                            EvalError::Return(value)
                        }
                        JumpKind::Break => EvalError::Break,
                        JumpKind::Continue => EvalError::Continue,
                    })
                }
                Terminator::NoMatch => return Err(EvalError::NoArmMatched { span }),
                Terminator::Unreachable => return Err(EvalError::Unreachable { span }),
            }
        }
    }

    /// Create a match declaration. Owned storage lives as long as the
    /// construct's lifetime plan allows.
    fn init_decl(&mut self, decl: DeclId, scope: LifetimeScope) -> Result<(), EvalError> {
        let module = self.module;
        let info = &module.decls[decl.index()];
        let Some(init) = info.init else {
            return Err(EvalError::Internal {
                message: "match declaration without an initializer".to_string(),
                span: info.span,
            });
        };
        let place = match info.storage {
            Storage::Alias => self.place(init)?,
            Storage::Owned => {
                let value = self.eval(init)?;
                let value = self.convert(value, info.ty);
                let cell = match scope {
                    LifetimeScope::Branch => self.alloc_scoped(value),
                    LifetimeScope::FullExpression => self.alloc_temp(value),
                };
                Place::root(cell)
            }
        };
        self.frame.decls.insert(decl, place);
        Ok(())
    }

    // === Values and types ===

    /// Implicit conversion of `value` to `to`.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "double to integer conversion truncates like the source language"
    )]
    fn convert(&self, value: Value, to: TyId) -> Value {
        let types = &self.module.types;
        let pool = types.pool();
        let to = pool.strip_const(to);
        match (pool.kind(to), value) {
            (TypeKind::Int | TypeKind::Long, Value::Double(d)) => Value::Int(d as i64),
            (TypeKind::Int | TypeKind::Long, value) => value.as_i64().map_or(value, Value::Int),
            (TypeKind::Char, value) => match value.as_i64() {
                Some(n) => Value::Char(
                    u32::try_from(n)
                        .ok()
                        .and_then(char::from_u32)
                        .unwrap_or('\0'),
                ),
                None => value,
            },
            (TypeKind::Bool, value) => Value::Bool(value.truth()),
            (TypeKind::Double, value) => value.as_f64().map_or(value, Value::Double),
            (TypeKind::User(_), Value::Record { ty, mut fields })
                if ty != to && types.is_class(to) && types.derives_from(ty, to) =>
            {
                let len = types.fields(to).map_or(0, |fields| fields.len());
                fields.truncate(len);
                Value::Record { ty: to, fields }
            }
            (_, value) => value,
        }
    }

    fn default_value(&self, ty: TyId) -> Value {
        let types = &self.module.types;
        let pool = types.pool();
        match pool.kind(pool.strip_const(ty)) {
            TypeKind::Int | TypeKind::Long => Value::Int(0),
            TypeKind::Char => Value::Char('\0'),
            TypeKind::Bool => Value::Bool(false),
            TypeKind::Double => Value::Double(0.0),
            TypeKind::NullPtr | TypeKind::Pointer(_) => Value::Pointer(None),
            TypeKind::Array(elem, extent) => {
                let elem = self.default_value(elem);
                Value::Array(vec![elem; usize::try_from(extent).unwrap_or(0)])
            }
            TypeKind::User(_) => match types.user(ty).map(|user| &user.kind) {
                Some(UserKind::Aggregate(_) | UserKind::Class { .. }) => Value::Record {
                    ty: pool.strip_const(ty),
                    fields: types
                        .fields(ty)
                        .unwrap_or_default()
                        .iter()
                        .map(|field| self.default_value(field.ty))
                        .collect(),
                },
                Some(UserKind::Tuple(def)) => Value::Record {
                    ty: pool.strip_const(ty),
                    fields: def
                        .elements
                        .iter()
                        .map(|&elem| self.default_value(elem))
                        .collect(),
                },
                Some(UserKind::Variant(def)) => Value::Variant {
                    index: 0,
                    payload: Box::new(
                        def.alternatives
                            .first()
                            .map_or(Value::Void, |&alt| self.default_value(alt)),
                    ),
                },
                Some(UserKind::Any | UserKind::Optional(_)) | None => Value::Any(None),
            },
            TypeKind::Void | TypeKind::Dependent | TypeKind::Const(_) => Value::Void,
        }
    }

    /// Width of the bit-field `expr` designates, if it is one.
    fn bit_width(&self, expr: ExprId) -> Option<u8> {
        let module = self.module;
        let pool = module.types.pool();
        let (record, index) = match module.exprs.kind(expr) {
            ExprKind::Paren(inner) => return self.bit_width(*inner),
            ExprKind::FieldAt { base, index } => (module.infos.get(base)?.ty, *index),
            ExprKind::Field { base, arrow, .. } => {
                let Some(Resolved::Field(index)) = module.resolved.get(&expr) else {
                    return None;
                };
                let base_ty = module.infos.get(base)?.ty;
                let record = if *arrow { pool.pointee(base_ty)? } else { base_ty };
                (record, *index)
            }
            _ => return None,
        };
        module.types.fields(record)?.get(index as usize)?.bits
    }
}

/// Keep the low `width` bits of an integer, as storing into an unsigned
/// bit-field does.
fn truncate_bits(value: Value, width: u8) -> Value {
    match value {
        Value::Int(n) if width < 64 => Value::Int(n & ((1_i64 << width) - 1)),
        other => other,
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
