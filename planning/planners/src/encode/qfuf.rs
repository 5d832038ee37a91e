//! Quantifier-free encoding with uninterpreted functions.
//!
//! Action selection is a single function `ActVar : Int -> Action` over an
//! enumerated sort of action schemas extended with a distinguished `nop`;
//! parameter choice goes through per-index functions `Param_i : Int -> Obj`.
//! Each grounded action keeps a per-step selection predicate defined from
//! the function equalities, so the shared semantics and frame machinery
//! apply unchanged. Gap-freeness degenerates to `nop` chaining.

use super::{EncodeOptions, EncoderKind, EncodingCore, PlanEncoding};
use crate::smt::{and_all, or_all};
use crate::{Error, Result};
use diverse_planning::task::GroundedTask;
use std::sync::Arc;
use z3::ast::{Ast, Bool, Dynamic, Int};
use z3::{Context, FuncDecl, Sort, Symbol};

pub(crate) fn build<'ctx>(
    ctx: &'ctx Context,
    task: Arc<GroundedTask>,
    options: EncodeOptions,
) -> Result<PlanEncoding<'ctx>> {
    if task.objects.is_empty() {
        return Err(Error::UnsupportedEncoding(
            "the qfuf encoder needs at least one object to build its parameter sort".to_string(),
        ));
    }
    let mut core = EncodingCore::new(ctx, task, options)?;
    let task = core.task.clone();
    let h = core.options.horizon;

    // group grounded actions by schema, preserving first-appearance order
    let mut schemas: Vec<(String, usize, Vec<usize>)> = Vec::new();
    for (i, action) in task.actions.iter().enumerate() {
        match schemas.iter_mut().find(|(name, _, _)| *name == action.name) {
            Some((_, arity, members)) => {
                debug_assert_eq!(*arity, action.params.len());
                members.push(i);
            }
            None => schemas.push((action.name.clone(), action.params.len(), vec![i])),
        }
    }
    let max_arity = schemas.iter().map(|(_, a, _)| *a).max().unwrap_or(0);

    let mut action_symbols: Vec<Symbol> = schemas
        .iter()
        .map(|(name, _, _)| Symbol::String(name.clone()))
        .collect();
    action_symbols.push(Symbol::String("nop".to_string()));
    let (action_sort, action_consts, _) =
        Sort::enumeration(ctx, Symbol::String("Action".to_string()), &action_symbols);
    let schema_consts: Vec<Dynamic> = action_consts.iter().map(|c| c.apply(&[])).collect();
    let nop = schema_consts
        .last()
        .expect("the action sort always holds nop")
        .clone();

    let object_symbols: Vec<Symbol> = task
        .objects
        .iter()
        .map(|o| Symbol::String(o.name.clone()))
        .collect();
    let (obj_sort, obj_consts_decls, _) =
        Sort::enumeration(ctx, Symbol::String("Obj".to_string()), &object_symbols);
    let obj_consts: Vec<Dynamic> = obj_consts_decls.iter().map(|c| c.apply(&[])).collect();

    let int_sort = Sort::int(ctx);
    let act_fn = FuncDecl::new(ctx, "ActVar", &[&int_sort], &action_sort);
    let param_fns: Vec<FuncDecl> = (0..max_arity)
        .map(|i| FuncDecl::new(ctx, format!("Param_{i}"), &[&int_sort], &obj_sort))
        .collect();

    for t in 0..=h {
        let step = Int::from_i64(ctx, t as i64);
        let act_t = act_fn.apply(&[&step]);
        let params_t: Vec<Dynamic> = param_fns.iter().map(|f| f.apply(&[&step])).collect();

        let mut row: Vec<Bool> = Vec::with_capacity(task.actions.len());
        for (i, action) in task.actions.iter().enumerate() {
            let schema_idx = schemas
                .iter()
                .position(|(name, _, _)| *name == action.name)
                .expect("schema registered above");
            let mut defn = vec![act_t._eq(&schema_consts[schema_idx])];
            for (p, &obj) in action.params.iter().enumerate() {
                defn.push(params_t[p]._eq(&obj_consts[usize::from(obj)]));
            }
            let sel = Bool::new_const(ctx, format!("sel_{}_{}", action.full_name(&task), t));
            core.assertions.push(sel._eq(&and_all(ctx, &defn)));
            row.push(sel);
        }

        // a schema value must denote one of its groundings, and unused
        // parameter slots are pinned to the first object
        for (s, (_, arity, members)) in schemas.iter().enumerate() {
            let instances: Vec<Bool> = members.iter().map(|&i| row[i].clone()).collect();
            let is_schema = act_t._eq(&schema_consts[s]);
            core.assertions
                .push(is_schema.implies(&or_all(ctx, &instances)));
            let pinned: Vec<Bool> = (*arity..max_arity)
                .map(|p| params_t[p]._eq(&obj_consts[0]))
                .collect();
            if !pinned.is_empty() {
                core.assertions.push(is_schema.implies(&and_all(ctx, &pinned)));
            }
        }
        let is_nop = act_t._eq(&nop);
        let all_pinned: Vec<Bool> = (0..max_arity)
            .map(|p| params_t[p]._eq(&obj_consts[0]))
            .collect();
        if !all_pinned.is_empty() {
            core.assertions.push(is_nop.implies(&and_all(ctx, &all_pinned)));
        }

        core.fire.push(vec![is_nop.not()]);
        core.silence.push(vec![is_nop]);
        core.actions.push(row);
    }

    core.assert_action_semantics();
    core.assert_frame_axioms();
    core.build_goal_chains();
    core.finish_common();
    Ok(PlanEncoding::new(core, EncoderKind::Qfuf, false))
}
