//! Match-test and match-select checking.

use insp_ir::{
    Action, Guard, MatchArm, MatchForm, MatchId, MatchSelect, PatternArena, PatternId, Span,
    TyId,
};

use crate::binder::bind_subject;
use crate::check::check_pattern;
use crate::checked::{CheckedAction, CheckedArm, CheckedForm, CheckedGuard, CheckedMatch, Step};
use crate::context::CheckCx;
use crate::{
    Host, LifetimePlan, MatchError, MatchOptions, MatchPosition, Probe, ResultTypeDeducer,
    Subject,
};

/// Check the match construct `id`.
///
/// Pattern bindings of a match-test are declared in the host's current
/// scope, so they are visible to whatever the caller guards with the test.
/// Each select arm gets its own host scope.
pub fn check_match<H: Host>(
    host: &mut H,
    patterns: &PatternArena,
    id: MatchId,
    position: MatchPosition,
    options: &MatchOptions,
) -> Result<CheckedMatch, MatchError> {
    let construct = patterns.match_expr(id);
    let _span = tracing::debug_span!("check_match", ?id, ?position).entered();

    let mut cx = CheckCx::new(patterns, options);
    let subject = bind_subject(host, &mut cx, construct.subject, construct.span)?;

    let (form, result_ty) = match &construct.form {
        MatchForm::Test { pattern, guard } => {
            let form = check_test(host, &mut cx, &subject, *pattern, guard.as_ref())?;
            (form, host.bool_type())
        }
        MatchForm::Select(select) => check_select(host, &mut cx, &subject, select, construct.span)?,
    };

    let deferred = cx.is_deferred();
    let lifetime = LifetimePlan::new(position, cx.into_declared());
    tracing::debug!(
        ?id,
        deferred,
        decls = lifetime.decls.len(),
        scope = ?lifetime.scope,
        "checked match construct"
    );
    Ok(CheckedMatch {
        id,
        subject,
        form,
        result_ty,
        lifetime,
        deferred,
        span: construct.span,
    })
}

fn check_test<H: Host>(
    host: &mut H,
    cx: &mut CheckCx<'_>,
    subject: &Subject,
    pattern: PatternId,
    guard: Option<&Guard>,
) -> Result<CheckedForm, MatchError> {
    let pattern = check_pattern(host, cx, subject.reference, pattern)?;
    let guard = guard.map(|guard| check_guard(host, cx, guard)).transpose()?;
    Ok(CheckedForm::Test { pattern, guard })
}

fn check_select<H: Host>(
    host: &mut H,
    cx: &mut CheckCx<'_>,
    subject: &Subject,
    select: &MatchSelect,
    span: Span,
) -> Result<(CheckedForm, TyId), MatchError> {
    let explicit = select
        .result
        .as_ref()
        .map(|ty| host.resolve_type(ty, span))
        .transpose()?;
    let mut deducer = ResultTypeDeducer::new(explicit);

    let mut arms = Vec::with_capacity(select.arms.len());
    for arm in &select.arms {
        host.push_scope();
        let checked = check_arm(host, cx, subject, arm, &mut deducer);
        host.pop_scope();
        arms.push(checked?);
    }

    let result_ty = deducer.finish(&*host);
    for arm in &mut arms {
        arm.action = finalize_action(host, arm.action, result_ty, arm.span)?;
    }

    let static_arm = if select.is_constexpr && !cx.is_deferred() {
        static_arm(&*host, &arms)?
    } else {
        None
    };

    Ok((
        CheckedForm::Select {
            arms,
            is_constexpr: select.is_constexpr,
            static_arm,
        },
        result_ty,
    ))
}

fn check_arm<H: Host>(
    host: &mut H,
    cx: &mut CheckCx<'_>,
    subject: &Subject,
    arm: &MatchArm,
    deducer: &mut ResultTypeDeducer,
) -> Result<CheckedArm, MatchError> {
    let pattern = check_pattern(host, cx, subject.reference, arm.pattern)?;
    let guard = arm
        .guard
        .as_ref()
        .map(|guard| check_guard(host, cx, guard))
        .transpose()?;

    let action = match &arm.action {
        Action::Value(value) => {
            let info = host.check_expr(*value)?;
            deducer.observe(&*host, info.ty, arm.span)?;
            CheckedAction::Yield(*value)
        }
        Action::Jump { kind, value, span } => {
            if let Some(value) = value {
                host.check_expr(*value)?;
            }
            host.check_jump(*kind, *value, *span)
                .map_err(MatchError::Jump)?;
            CheckedAction::Escape {
                kind: *kind,
                value: *value,
            }
        }
    };

    Ok(CheckedArm {
        pattern,
        guard,
        action,
        span: arm.span,
    })
}

/// `if expr` or `if (T name = init)`.
fn check_guard<H: Host>(
    host: &mut H,
    cx: &mut CheckCx<'_>,
    guard: &Guard,
) -> Result<CheckedGuard, MatchError> {
    match guard {
        Guard::Expr(expr) => {
            host.check_expr(*expr)?;
            let cond = host
                .build_condition(*expr)
                .map_err(MatchError::GuardType)?;
            Ok(CheckedGuard { decl: None, cond })
        }
        Guard::Decl {
            ty,
            name,
            init,
            span,
        } => {
            let ty = if ty.is_auto() {
                None
            } else {
                Some(host.resolve_type(ty, *span)?)
            };
            host.check_expr(*init)?;
            let decl = host
                .declare_var(*name, ty, *init, *span)
                .map_err(MatchError::Binding)?;
            cx.record(decl);
            let reference = host.decl_ref(decl, *span);
            let cond = host
                .build_condition(reference)
                .map_err(MatchError::GuardType)?;
            Ok(CheckedGuard {
                decl: Some(decl),
                cond,
            })
        }
    }
}

/// Convert a value action to the unified result type, or demote it to a
/// side-effect evaluation when the construct is `void`.
fn finalize_action<H: Host>(
    host: &mut H,
    action: CheckedAction,
    result_ty: TyId,
    span: Span,
) -> Result<CheckedAction, MatchError> {
    let CheckedAction::Yield(value) = action else {
        return Ok(action);
    };
    if host.same_type(result_ty, host.void_type()) {
        return Ok(CheckedAction::Evaluate(value));
    }
    let ty = host.expr_info(value).ty;
    if host.same_type(ty, result_ty) || host.is_dependent(ty) {
        return Ok(action);
    }
    let converted = host.build_conversion(value, result_ty, span)?;
    Ok(CheckedAction::Yield(converted))
}

/// Fold the tests of every arm; the first arm whose tests are all `true`
/// is the one a `match constexpr` keeps.
///
/// An arm's tests are folded in order up to the first `false`. Later tests
/// of that arm may depend on the failed one (a dereference past a null
/// `?`) and are never evaluated.
fn static_arm<P: Probe + ?Sized>(
    probe: &P,
    arms: &[CheckedArm],
) -> Result<Option<usize>, MatchError> {
    let mut selected = None;
    for (index, arm) in arms.iter().enumerate() {
        let mut matches = true;
        for step in arm.steps() {
            let Step::Test(cond) = step else { continue };
            match probe.constant_bool(cond) {
                Some(true) => {}
                Some(false) => {
                    matches = false;
                    break;
                }
                None => return Err(MatchError::NonConstant { span: arm.span }),
            }
        }
        if matches && selected.is_none() {
            selected = Some(index);
        }
    }
    tracing::debug!(?selected, "resolved match constexpr");
    Ok(selected)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
