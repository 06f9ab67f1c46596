//! Subject binder.
//!
//! The subject is evaluated exactly once, into a holding entity declared as
//! `auto&& <holding> = subject;`. Every pattern level refers to the subject
//! through references to that declaration.

use insp_ir::{DeclId, ExprId, Span, TyId};

use crate::context::CheckCx;
use crate::{Host, MatchError};

/// The bound subject of a match construct.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Subject {
    pub holding: DeclId,
    /// Reference to the holding entity, used as the root pattern's subject.
    pub reference: ExprId,
    pub ty: TyId,
}

pub(crate) fn bind_subject<H: Host>(
    host: &mut H,
    cx: &mut CheckCx<'_>,
    subject: ExprId,
    span: Span,
) -> Result<Subject, MatchError> {
    let info = host.check_expr(subject)?;
    if host.is_dependent(info.ty) {
        tracing::debug!(ty = %host.type_name(info.ty), "dependent subject; deferring checks");
        cx.defer();
    }

    let holding = host
        .declare_holding(subject, span)
        .map_err(MatchError::Binding)?;
    cx.record(holding);
    let reference = host.decl_ref(holding, span);
    Ok(Subject {
        holding,
        reference,
        ty: host.expr_info(reference).ty,
    })
}
