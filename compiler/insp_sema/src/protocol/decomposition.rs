//! `[p0, p1, ...]` and `let [a, b, ...]`
//!
//! The element-access protocol is chosen by priority: fixed-size array,
//! tuple-like (`tuple_size` / `tuple_element` / `get<I>`), then plain
//! aggregate by data member. The pattern's element count must equal the
//! protocol's arity.

use insp_ir::{ExprId, PatternKind, PatternRange, Span, TyId};

use crate::check::check_pattern;
use crate::checked::{CheckedElement, CheckedNode, DecompositionProtocol};
use crate::context::CheckCx;
use crate::{Host, MatchError, Probe, SizeProbe};

pub(crate) fn check_decomposition<H: Host>(
    host: &mut H,
    cx: &mut CheckCx<'_>,
    subject: ExprId,
    elements: PatternRange,
    binding_only: bool,
    span: Span,
) -> Result<CheckedNode, MatchError> {
    let patterns = cx.patterns;
    let element_ids = patterns.list(elements);
    let subject_ty = host.expr_info(subject).ty;
    let protocol = probe_decomposition(&*host, subject_ty, element_ids.len(), span)?;
    tracing::debug!(?protocol, arity = element_ids.len(), "committed decomposition protocol");

    let mut checked = Vec::with_capacity(element_ids.len());
    for (index, &element) in (0u32..).zip(element_ids) {
        let access = access_element(host, subject, protocol, index, span)?;
        let parsed = patterns.get(element);
        let (holding, element_subject) = match parsed.kind {
            PatternKind::Binding {
                decomposed: true, ..
            }
            | PatternKind::Wildcard => (None, access),
            _ => {
                let holding = host
                    .declare_holding(access, parsed.span)
                    .map_err(MatchError::Binding)?;
                cx.record(holding);
                (Some(holding), host.decl_ref(holding, parsed.span))
            }
        };
        let pattern = check_pattern(host, cx, element_subject, element)?;
        checked.push(CheckedElement { holding, pattern });
    }

    Ok(CheckedNode::Decomposition {
        protocol,
        elements: checked,
        binding_only,
    })
}

fn probe_decomposition<P: Probe + ?Sized>(
    probe: &P,
    ty: TyId,
    arity: usize,
    span: Span,
) -> Result<DecompositionProtocol, MatchError> {
    let wanted = arity as u64;
    let mismatch = |detail: String| MatchError::NotDestructurable {
        subject: probe.type_name(ty),
        arity,
        detail,
        span,
    };

    if let Some(extent) = probe.array_extent(ty) {
        return if extent == wanted {
            Ok(DecompositionProtocol::Array)
        } else {
            Err(mismatch(format!("the array has {extent} elements")))
        };
    }

    match probe.tuple_size(ty) {
        SizeProbe::Size(size) => {
            if size != wanted {
                return Err(mismatch(format!("its tuple size is {size}")));
            }
            let Some(style) = probe.get_accessor(ty) else {
                return Err(MatchError::ProtocolConfig {
                    ty: probe.type_name(ty),
                    detail: "it declares a tuple size but has no `get` accessor".to_string(),
                    span,
                });
            };
            if let Some(missing) = (0..size).find(|&i| probe.tuple_element(ty, i).is_none()) {
                return Err(MatchError::ProtocolConfig {
                    ty: probe.type_name(ty),
                    detail: format!("tuple element {missing} has no type"),
                    span,
                });
            }
            return Ok(DecompositionProtocol::TupleLike(style));
        }
        SizeProbe::NotConstant => {
            return Err(MatchError::ProtocolConfig {
                ty: probe.type_name(ty),
                detail: "its tuple size is not a constant expression".to_string(),
                span,
            });
        }
        SizeProbe::Absent => {}
    }

    match probe.aggregate_arity(ty) {
        Some(members) if members == wanted => Ok(DecompositionProtocol::Aggregate),
        Some(members) => Err(mismatch(format!("it has {members} data members"))),
        None => Err(mismatch(
            "it is not an array, a tuple-like type or an aggregate".to_string(),
        )),
    }
}

fn access_element<H: Host>(
    host: &mut H,
    subject: ExprId,
    protocol: DecompositionProtocol,
    index: u32,
    span: Span,
) -> Result<ExprId, MatchError> {
    let access = match protocol {
        DecompositionProtocol::Array => host.build_subscript(subject, index, span),
        DecompositionProtocol::TupleLike(style) => host.build_get_call(subject, index, style, span),
        DecompositionProtocol::Aggregate => host.build_field(subject, index, span),
    };
    Ok(access?)
}
