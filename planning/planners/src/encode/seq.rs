//! Sequential and forall-step encodings.
//!
//! Both variants share the per-(step, action) selection grid, the action
//! semantics and the explanatory frame axioms. `seq` additionally bounds
//! each step to at most one action; `forall` instead forbids interfering
//! pairs from sharing a step.

use super::{EncodeOptions, EncoderKind, EncodingCore, PlanEncoding};
use crate::smt::pb_le;
use crate::Result;
use diverse_planning::task::GroundedTask;
use std::sync::Arc;
use z3::ast::Bool;
use z3::Context;

pub(crate) fn build<'ctx>(
    ctx: &'ctx Context,
    task: Arc<GroundedTask>,
    options: EncodeOptions,
    forall: bool,
) -> Result<PlanEncoding<'ctx>> {
    let mut core = EncodingCore::new(ctx, task, options)?;
    core.declare_action_grid();
    core.assert_action_semantics();
    core.assert_frame_axioms();

    if forall {
        assert_interference_mutexes(&mut core);
    } else if !core.options.skip_actions {
        // add the execution semantics
        for t in 0..core.options.horizon {
            let step = pb_le(ctx, &core.actions[t], 1);
            core.assertions.push(step);
        }
    }

    core.build_goal_chains();
    core.finish_common();
    let kind = if forall {
        EncoderKind::Forall
    } else {
        EncoderKind::Seq
    };
    Ok(PlanEncoding::new(core, kind, forall))
}

/// Interfering actions may not share a step. The mutex structure is derived
/// from the grounded task's add/delete/numeric footprints.
fn assert_interference_mutexes(core: &mut EncodingCore<'_>) {
    let task = core.task.clone();
    let n = task.actions.len();
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for i in 0..n {
        for j in i + 1..n {
            if task.interferes(i.into(), j.into()) {
                pairs.push((i, j));
            }
        }
    }
    for t in 0..core.options.horizon {
        for &(i, j) in &pairs {
            let both = Bool::and(core.ctx, &[&core.actions[t][i], &core.actions[t][j]]);
            core.assertions.push(both.not());
        }
    }
}
