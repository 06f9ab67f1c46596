//! Checked construct → blocks.

use insp_sema::{
    CheckedAction, CheckedArm, CheckedForm, CheckedMatch, FallthroughPolicy, MatchOptions, Step,
};

use crate::builder::LowerBuilder;
use crate::ir::{BlockId, LoweredMatch};
use crate::LowerError;

/// Lower a checked match-test or match-select.
///
/// The holding entity is initialized first, in the entry block, and exactly
/// once; every later step refers to it.
pub fn lower_match(
    checked: &CheckedMatch,
    options: &MatchOptions,
) -> Result<LoweredMatch, LowerError> {
    if checked.deferred {
        return Err(LowerError::Deferred { span: checked.span });
    }
    let _span = tracing::debug_span!("lower_match", id = ?checked.id).entered();

    let mut builder = LowerBuilder::new();
    builder.emit_init(checked.subject.holding);
    let exit = builder.new_block();

    match &checked.form {
        CheckedForm::Test { .. } => {
            lower_test(&mut builder, &checked.form.test_steps(), exit);
        }
        CheckedForm::Select {
            arms,
            is_constexpr: true,
            static_arm,
        } => lower_constexpr(&mut builder, arms, *static_arm, exit, options),
        CheckedForm::Select { arms, .. } => lower_select(&mut builder, arms, exit, options),
    }

    debug_assert!(builder.is_terminated());
    builder.position_at(exit);
    builder.terminate_finish();

    let entry = builder.entry_block();
    let lowered = LoweredMatch {
        id: checked.id,
        result_ty: checked.result_ty,
        blocks: builder.finish(),
        entry,
        lifetime: checked.lifetime.clone(),
        span: checked.span,
    };
    tracing::debug!(
        blocks = lowered.blocks.len(),
        tests = lowered.test_count(),
        "lowered match"
    );
    Ok(lowered)
}

/// Emit `steps` starting at the current block. Each test branches to a
/// fresh block on success and to `on_fail` otherwise.
fn lower_steps(builder: &mut LowerBuilder, steps: &[Step], on_fail: BlockId) {
    for step in steps {
        match *step {
            Step::Declare(decl) => builder.emit_init(decl),
            Step::Test(cond) => {
                let next = builder.new_block();
                builder.terminate_branch(cond, next, on_fail);
                builder.position_at(next);
            }
        }
    }
}

fn lower_test(builder: &mut LowerBuilder, steps: &[Step], exit: BlockId) {
    let fail = builder.new_block();
    lower_steps(builder, steps, fail);
    builder.emit_flag(true);
    builder.terminate_jump(exit);

    builder.position_at(fail);
    builder.emit_flag(false);
    builder.terminate_jump(exit);
}

fn lower_select(
    builder: &mut LowerBuilder,
    arms: &[CheckedArm],
    exit: BlockId,
    options: &MatchOptions,
) {
    for (index, arm) in arms.iter().enumerate() {
        let next_arm = builder.new_block();
        tracing::debug!(arm = index, start = %builder.current_block(), "lowering arm");
        lower_steps(builder, &arm.steps(), next_arm);
        lower_action(builder, arm.action, exit);
        debug_assert!(builder.is_terminated(), "arm {index} left its block open");
        builder.position_at(next_arm);
    }
    lower_fallthrough(builder, options.fallthrough);
}

/// Only the statically selected arm survives, and its tests are known to
/// hold.
fn lower_constexpr(
    builder: &mut LowerBuilder,
    arms: &[CheckedArm],
    static_arm: Option<usize>,
    exit: BlockId,
    options: &MatchOptions,
) {
    let Some(arm) = static_arm.and_then(|index| arms.get(index)) else {
        tracing::debug!("no arm of the match constexpr applies");
        lower_fallthrough(builder, options.fallthrough);
        return;
    };
    for step in arm.steps() {
        if let Step::Declare(decl) = step {
            builder.emit_init(decl);
        }
    }
    lower_action(builder, arm.action, exit);
}

fn lower_action(builder: &mut LowerBuilder, action: CheckedAction, exit: BlockId) {
    match action {
        CheckedAction::Yield(value) => {
            builder.emit_store(value);
            builder.terminate_jump(exit);
        }
        CheckedAction::Evaluate(value) => {
            builder.emit_eval(value);
            builder.terminate_jump(exit);
        }
        CheckedAction::Escape { kind, value } => builder.terminate_escape(kind, value),
    }
}

fn lower_fallthrough(builder: &mut LowerBuilder, policy: FallthroughPolicy) {
    match policy {
        FallthroughPolicy::Trap => builder.terminate_no_match(),
        FallthroughPolicy::Unreachable => builder.terminate_unreachable(),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
