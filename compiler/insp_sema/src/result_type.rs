//! Result type of a match-select.
//!
//! Deduction follows deduced-return-type rules: the first value arm fixes a
//! baseline (its decayed type), and every later value arm must have the same
//! type or convert to it. With an explicit `-> T`, every value arm must
//! convert to `T`. Jump actions do not take part.

use insp_ir::{Span, TyId};

use crate::{MatchError, Probe};

#[derive(Clone, Debug)]
pub struct ResultTypeDeducer {
    explicit: Option<TyId>,
    baseline: Option<(TyId, Span)>,
}

impl ResultTypeDeducer {
    pub fn new(explicit: Option<TyId>) -> Self {
        ResultTypeDeducer {
            explicit,
            baseline: None,
        }
    }

    /// Account for one value arm of type `ty`.
    pub fn observe<P: Probe + ?Sized>(
        &mut self,
        probe: &P,
        ty: TyId,
        span: Span,
    ) -> Result<(), MatchError> {
        if probe.is_dependent(ty) {
            return Ok(());
        }
        if let Some(target) = self.explicit {
            if probe.same_type(ty, target) || probe.is_convertible(ty, target) {
                return Ok(());
            }
            return Err(MatchError::ResultConflict {
                expected: probe.type_name(target),
                found: probe.type_name(ty),
                span,
                baseline: None,
            });
        }
        match self.baseline {
            None => {
                self.baseline = Some((probe.decay(ty), span));
                Ok(())
            }
            Some((base, base_span)) => {
                if probe.same_type(probe.decay(ty), base) || probe.is_convertible(ty, base) {
                    Ok(())
                } else {
                    Err(MatchError::ResultConflict {
                        expected: probe.type_name(base),
                        found: probe.type_name(ty),
                        span,
                        baseline: Some(base_span),
                    })
                }
            }
        }
    }

    /// The unified type: the explicit one, else the baseline, else `void`.
    pub fn finish<P: Probe + ?Sized>(&self, probe: &P) -> TyId {
        self.explicit
            .or(self.baseline.map(|(ty, _)| ty))
            .unwrap_or_else(|| probe.void_type())
    }
}
