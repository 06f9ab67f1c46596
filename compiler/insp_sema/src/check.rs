//! Pattern checker.
//!
//! [`check_pattern`] walks one pattern against a subject expression. Each
//! node produces its condition and declarations; alternatives and
//! decompositions hand off to the protocol resolver. Conditions are never
//! combined into one expression here: the node tree keeps them apart so that
//! lowering can branch after every test.

use smallvec::SmallVec;

use insp_ir::{DeclId, ExprId, Name, PatternId, PatternKind, Span};
use insp_stack::ensure_sufficient_stack;

use crate::checked::{CheckedNode, CheckedPattern};
use crate::context::CheckCx;
use crate::protocol::{check_alternative, check_decomposition};
use crate::{Host, MatchError};

/// Check `pattern` against `subject`.
pub(crate) fn check_pattern<H: Host>(
    host: &mut H,
    cx: &mut CheckCx<'_>,
    subject: ExprId,
    pattern: PatternId,
) -> Result<CheckedPattern, MatchError> {
    ensure_sufficient_stack(|| check_pattern_inner(host, cx, subject, pattern))
}

fn check_pattern_inner<H: Host>(
    host: &mut H,
    cx: &mut CheckCx<'_>,
    subject: ExprId,
    pattern: PatternId,
) -> Result<CheckedPattern, MatchError> {
    let patterns = cx.patterns;
    let parsed = patterns.get(pattern);
    let span = parsed.span;

    if cx.is_deferred() {
        let mut bindings = Vec::new();
        declare_deferred(host, cx, subject, pattern, &mut bindings)?;
        return Ok(CheckedPattern {
            pattern,
            node: CheckedNode::Deferred { bindings },
            span,
        });
    }

    let node = match &parsed.kind {
        PatternKind::Wildcard => CheckedNode::Wildcard,
        PatternKind::Expression(value) => check_expression(host, subject, *value, span)?,
        PatternKind::Binding { name, .. } => check_binding(host, cx, subject, *name, span)?,
        PatternKind::Paren(sub) => {
            CheckedNode::Paren(Box::new(check_pattern(host, cx, subject, *sub)?))
        }
        PatternKind::Optional { sub, depth } => {
            check_optional(host, cx, subject, *sub, *depth, span)?
        }
        PatternKind::Alternative { discriminant, sub } => {
            check_alternative(host, cx, subject, discriminant, *sub, span)?
        }
        PatternKind::Decomposition {
            elements,
            binding_only,
        } => check_decomposition(host, cx, subject, *elements, *binding_only, span)?,
    };

    tracing::trace!(?pattern, kind = parsed.kind.describe(), "checked pattern");
    Ok(CheckedPattern {
        pattern,
        node,
        span,
    })
}

fn check_expression<H: Host>(
    host: &mut H,
    subject: ExprId,
    value: ExprId,
    span: Span,
) -> Result<CheckedNode, MatchError> {
    host.check_expr(value)?;
    let equality = host.build_equality(subject, value, span)?;
    let cond = host.build_condition(equality)?;
    Ok(CheckedNode::Expression { cond })
}

/// Bind by reference unless the subject has no address (bit-field member or
/// prvalue), in which case the binding is a copy.
fn check_binding<H: Host>(
    host: &mut H,
    cx: &mut CheckCx<'_>,
    subject: ExprId,
    name: Name,
    span: Span,
) -> Result<CheckedNode, MatchError> {
    let by_ref = host.expr_info(subject).category.is_addressable();
    let decl = host
        .declare_binding(name, subject, by_ref, span)
        .map_err(MatchError::Binding)?;
    cx.record(decl);
    Ok(CheckedNode::Binding { decl, by_ref })
}

fn check_optional<H: Host>(
    host: &mut H,
    cx: &mut CheckCx<'_>,
    subject: ExprId,
    sub: PatternId,
    depth: u32,
    span: Span,
) -> Result<CheckedNode, MatchError> {
    let limit = cx.options.max_optional_depth;
    if depth > limit {
        return Err(MatchError::OptionalTooDeep { depth, limit, span });
    }

    let mut levels = SmallVec::new();
    let mut current = subject;
    for _ in 0..depth {
        levels.push(host.build_condition(current)?);
        current = host.build_deref(current, span)?;
    }
    let sub = check_pattern(host, cx, current, sub)?;
    Ok(CheckedNode::Optional {
        levels,
        sub: Box::new(sub),
    })
}

/// Dependent subject: declare every binding with the subject's type and
/// synthesize nothing else.
fn declare_deferred<H: Host>(
    host: &mut H,
    cx: &mut CheckCx<'_>,
    subject: ExprId,
    pattern: PatternId,
    out: &mut Vec<DeclId>,
) -> Result<(), MatchError> {
    let patterns = cx.patterns;
    let parsed = patterns.get(pattern);
    match &parsed.kind {
        PatternKind::Wildcard | PatternKind::Expression(_) => Ok(()),
        PatternKind::Binding { name, .. } => {
            let decl = host
                .declare_binding(*name, subject, true, parsed.span)
                .map_err(MatchError::Binding)?;
            cx.record(decl);
            out.push(decl);
            Ok(())
        }
        PatternKind::Paren(sub)
        | PatternKind::Optional { sub, .. }
        | PatternKind::Alternative { sub, .. } => {
            ensure_sufficient_stack(|| declare_deferred(host, cx, subject, *sub, out))
        }
        PatternKind::Decomposition { elements, .. } => {
            for &element in patterns.list(*elements) {
                ensure_sufficient_stack(|| declare_deferred(host, cx, subject, element, out))?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
