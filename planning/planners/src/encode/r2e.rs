//! Relaxed-to-exists encoding.
//!
//! Several actions may share a step; within a step they are applied along
//! per-fluent chains in a fixed order. Each action's preconditions are
//! evaluated on the chain values produced by its intra-step predecessors,
//! and the successor state equals the final chain values, which subsumes the
//! frame axioms. Oversubscription tasks are rejected.

use super::{EncodeOptions, EncoderKind, EncodingCore, PlanEncoding};
use crate::smt::{and_all, int};
use crate::{Error, Result};
use diverse_planning::task::{GroundedTask, NumOp};
use std::sync::Arc;
use z3::ast::{Ast, Bool, Int};
use z3::Context;

pub(crate) fn build<'ctx>(
    ctx: &'ctx Context,
    task: Arc<GroundedTask>,
    options: EncodeOptions,
) -> Result<PlanEncoding<'ctx>> {
    if task.is_oversubscription() {
        return Err(Error::UnsupportedEncoding(
            "the relaxed-to-exists encoder does not support oversubscription planning".to_string(),
        ));
    }
    let mut core = EncodingCore::new(ctx, task, options)?;
    core.declare_action_grid();

    let task = core.task.clone();
    let h = core.options.horizon;
    for t in 0..h {
        // chain values, starting from the state at t
        let mut cur: Vec<Bool> = core.fluents.iter().map(|row| row[t].clone()).collect();
        let mut cur_num: Vec<Int> = core.num_fluents.iter().map(|row| row[t].clone()).collect();

        for (rank, action) in task.actions.iter().enumerate() {
            let sel = core.actions[t][rank].clone();

            let mut pre: Vec<Bool> = action
                .precond
                .iter()
                .map(|l| {
                    let v = &cur[usize::from(l.fluent)];
                    if l.value {
                        v.clone()
                    } else {
                        v.not()
                    }
                })
                .collect();
            for c in &action.num_precond {
                let v = &cur_num[usize::from(c.fluent)];
                let value = int(ctx, c.value);
                use diverse_planning::task::NumRel::*;
                pre.push(match c.rel {
                    Le => v.le(&value),
                    Lt => v.lt(&value),
                    Ge => v.ge(&value),
                    Gt => v.gt(&value),
                    Eq => v._eq(&value),
                });
            }
            core.assertions.push(sel.implies(&and_all(ctx, &pre)));

            for &f in &action.del {
                let fi = usize::from(f);
                let name = format!("{}_{}_c{}", task.fluents[fi].name, t, rank);
                let link = Bool::new_const(ctx, name);
                let false_ = Bool::from_bool(ctx, false);
                core.assertions.push(link._eq(&sel.ite(&false_, &cur[fi])));
                cur[fi] = link;
            }
            for &f in &action.add {
                let fi = usize::from(f);
                let name = format!("{}_{}_c{}", task.fluents[fi].name, t, rank);
                let link = Bool::new_const(ctx, name);
                let true_ = Bool::from_bool(ctx, true);
                core.assertions.push(link._eq(&sel.ite(&true_, &cur[fi])));
                cur[fi] = link;
            }
            for e in &action.num_effects {
                let fi = usize::from(e.fluent);
                let name = format!("{}_{}_c{}", task.num_fluents[fi].name, t, rank);
                let link = Int::new_const(ctx, name);
                let target = match e.op {
                    NumOp::Assign => int(ctx, e.amount),
                    NumOp::Increase => Int::add(ctx, &[&cur_num[fi], &int(ctx, e.amount)]),
                    NumOp::Decrease => Int::sub(ctx, &[&cur_num[fi], &int(ctx, e.amount)]),
                };
                core.assertions.push(link._eq(&sel.ite(&target, &cur_num[fi])));
                cur_num[fi] = link;
            }
        }

        // the successor state is the end of each chain; untouched chains
        // collapse into the frame
        for (fi, value) in cur.into_iter().enumerate() {
            let next = core.fluents[fi][t + 1].clone();
            core.assertions.push(next._eq(&value));
        }
        for (fi, value) in cur_num.into_iter().enumerate() {
            let next = core.num_fluents[fi][t + 1].clone();
            core.assertions.push(next._eq(&value));
        }
    }

    // no at-most-one clause: a step holds any chain-compatible action set
    core.build_goal_chains();
    core.finish_common();
    Ok(PlanEncoding::new(core, EncoderKind::R2e, true))
}
