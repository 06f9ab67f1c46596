//! `Discriminant: pattern`
//!
//! Priority:
//! 1. Closed sum: the subject declares an alternative count. Alternatives are
//!    scanned in index order and the first one whose type equals (or
//!    satisfies) the discriminant is committed.
//! 2. Open polymorphic: otherwise the subject's address is downcast to a
//!    pointer to the discriminant type, through a user `try_cast` when one
//!    exists.

use insp_ir::{AccessStyle, ExprId, ParsedType, PatternId, Span, TyId};

use crate::check::check_pattern;
use crate::checked::{CheckedNode, DowncastVia, Resolution};
use crate::context::CheckCx;
use crate::{Discriminant, Host, MatchError, Probe, SizeProbe};

/// A probed, not yet committed, alternative protocol.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Candidate {
    ClosedSum {
        index: u32,
        index_style: AccessStyle,
        get_style: AccessStyle,
    },
    Downcast {
        target: TyId,
        is_const: bool,
    },
    TryCast {
        target: TyId,
    },
}

pub(crate) fn check_alternative<H: Host>(
    host: &mut H,
    cx: &mut CheckCx<'_>,
    subject: ExprId,
    discriminant: &ParsedType,
    sub: PatternId,
    span: Span,
) -> Result<CheckedNode, MatchError> {
    let discriminant = host.resolve_discriminant(discriminant, span)?;
    let subject_ty = host.expr_info(subject).ty;
    let candidate = probe_alternative(&*host, subject_ty, discriminant, span)?;
    tracing::debug!(?candidate, ty = %host.type_name(subject_ty), "committed alternative protocol");

    let (resolution, element) = commit(host, cx, subject, candidate, span)?;
    let sub = check_pattern(host, cx, element, sub)?;
    Ok(CheckedNode::Alternative {
        resolution,
        sub: Box::new(sub),
    })
}

fn probe_alternative<P: Probe + ?Sized>(
    probe: &P,
    ty: TyId,
    discriminant: Discriminant,
    span: Span,
) -> Result<Candidate, MatchError> {
    match probe.variant_size(ty) {
        SizeProbe::Size(count) => probe_closed_sum(probe, ty, count, discriminant, span),
        SizeProbe::NotConstant => Err(configuration(
            probe,
            ty,
            "its alternative count is not a constant expression",
            span,
        )),
        SizeProbe::Absent => probe_polymorphic(probe, ty, discriminant, span),
    }
}

fn probe_closed_sum<P: Probe + ?Sized>(
    probe: &P,
    ty: TyId,
    count: u64,
    discriminant: Discriminant,
    span: Span,
) -> Result<Candidate, MatchError> {
    let Some(index_style) = probe.index_accessor(ty) else {
        return Err(configuration(probe, ty, "it has no `index` accessor", span));
    };
    let Some(get_style) = probe.get_accessor(ty) else {
        return Err(configuration(probe, ty, "it has no `get` accessor", span));
    };

    for i in 0..count {
        let Some(alternative) = probe.variant_alternative(ty, i) else {
            return Err(configuration(
                probe,
                ty,
                &format!("alternative {i} has no type"),
                span,
            ));
        };
        let viable = match discriminant {
            Discriminant::Type(target) => probe.same_type(alternative, target),
            Discriminant::Constraint(constraint) => probe.satisfies(constraint, alternative),
        };
        if viable {
            let index = u32::try_from(i).map_err(|_| {
                configuration(probe, ty, "its alternative count does not fit in 32 bits", span)
            })?;
            return Ok(Candidate::ClosedSum {
                index,
                index_style,
                get_style,
            });
        }
    }

    Err(MatchError::NoViableAlternative {
        subject: probe.type_name(ty),
        discriminant: discriminant_name(probe, discriminant),
        span,
    })
}

fn probe_polymorphic<P: Probe + ?Sized>(
    probe: &P,
    ty: TyId,
    discriminant: Discriminant,
    span: Span,
) -> Result<Candidate, MatchError> {
    let Discriminant::Type(target) = discriminant else {
        return Err(MatchError::PredicateWithoutType {
            subject: probe.type_name(ty),
            discriminant: discriminant_name(probe, discriminant),
            span,
        });
    };
    if probe.has_try_cast(target, ty) {
        Ok(Candidate::TryCast { target })
    } else {
        Ok(Candidate::Downcast {
            target,
            is_const: probe.is_const(ty),
        })
    }
}

/// Build the winning candidate. Returns the resolution and the sub-pattern's
/// subject.
fn commit<H: Host>(
    host: &mut H,
    cx: &mut CheckCx<'_>,
    subject: ExprId,
    candidate: Candidate,
    span: Span,
) -> Result<(Resolution, ExprId), MatchError> {
    match candidate {
        Candidate::ClosedSum {
            index,
            index_style,
            get_style,
        } => {
            let runtime = host.build_index_call(subject, index_style, span)?;
            let constant = host.build_int_constant(u64::from(index), span);
            let equality = host.build_equality(runtime, constant, span)?;
            let cond = host.build_condition(equality)?;

            let access = host.build_get_call(subject, index, get_style, span)?;
            let element = host
                .declare_holding(access, span)
                .map_err(MatchError::Binding)?;
            cx.record(element);
            let element_ref = host.decl_ref(element, span);
            Ok((
                Resolution::ClosedSum {
                    index,
                    cond,
                    element,
                },
                element_ref,
            ))
        }
        Candidate::Downcast { target, is_const } => {
            let pointer = host.pointer_to(target, is_const);
            let address = host.build_address_of(subject, span)?;
            let cast = host.build_downcast(address, pointer, span)?;
            commit_pointer(host, cx, cast, DowncastVia::BuiltIn, span)
        }
        Candidate::TryCast { target } => {
            let cast = host.build_try_cast(subject, target, span)?;
            commit_pointer(host, cx, cast, DowncastVia::TryCast, span)
        }
    }
}

/// Hold a pointer-like cast result, test it, and dereference it for the
/// sub-pattern.
fn commit_pointer<H: Host>(
    host: &mut H,
    cx: &mut CheckCx<'_>,
    cast: ExprId,
    via: DowncastVia,
    span: Span,
) -> Result<(Resolution, ExprId), MatchError> {
    let holding = host
        .declare_holding(cast, span)
        .map_err(MatchError::Binding)?;
    cx.record(holding);
    let tested = host.decl_ref(holding, span);
    let cond = host.build_condition(tested)?;
    let pointer = host.decl_ref(holding, span);
    let element = host.build_deref(pointer, span)?;
    Ok((Resolution::Polymorphic { via, holding, cond }, element))
}

fn configuration<P: Probe + ?Sized>(probe: &P, ty: TyId, detail: &str, span: Span) -> MatchError {
    MatchError::ProtocolConfig {
        ty: probe.type_name(ty),
        detail: detail.to_string(),
        span,
    }
}

fn discriminant_name<P: Probe + ?Sized>(probe: &P, discriminant: Discriminant) -> String {
    match discriminant {
        Discriminant::Type(ty) => probe.type_name(ty),
        Discriminant::Constraint(constraint) => probe.constraint_name(constraint),
    }
}
