//! Encoding of a grounded planning task into a bounded SMT formula.
//!
//! `encode(H)` produces a formula whose models are plans of effective length
//! `horizon_var <= H`. Four variants share the common obligations (initial
//! state, goal chain, horizon pinpointing, gap-freeness, post-goal and
//! last-step silence) implemented once in [`EncodingCore`]:
//!
//! - `seq`: at most one action per step;
//! - `forall`: concurrent non-interfering actions per step;
//! - `r2e`: relaxed-to-exists, actions of a step applied along intra-step
//!   chains in a fixed order;
//! - `qfuf`: action selection through a single uninterpreted function over
//!   an enumerated action sort, with a distinguished `nop`.
//!
//! Features and the behaviour space consume encoders through the
//! [`StepEncoding`] capability trait only.

pub mod qfuf;
pub mod r2e;
pub mod seq;

use crate::smt::{and_all, int, or_all, pb_eq, pb_ge};
use crate::{Error, Result};
use diverse_planning::plan::SequentialPlan;
use diverse_planning::task::{Condition, GroundedTask, Literal, NumFluentId, NumOp};
use diverse_planning::ActionInstance;
use std::str::FromStr;
use std::sync::Arc;
use z3::ast::{Ast, Bool, Int};
use z3::{Context, Model};

/// The encoder variants.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EncoderKind {
    Seq,
    Forall,
    R2e,
    Qfuf,
}

impl FromStr for EncoderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "seq" => Ok(EncoderKind::Seq),
            "forall" => Ok(EncoderKind::Forall),
            "r2e" => Ok(EncoderKind::R2e),
            "qfuf" => Ok(EncoderKind::Qfuf),
            _ => Err(format!(
                "Unknown encoder: '{s}'. Valid options are: 'seq', 'forall', 'r2e', 'qfuf'"
            )),
        }
    }
}

impl std::fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EncoderKind::Seq => "seq",
            EncoderKind::Forall => "forall",
            EncoderKind::R2e => "r2e",
            EncoderKind::Qfuf => "qfuf",
        };
        write!(f, "{s}")
    }
}

/// Options of a single encoding run.
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    /// Number of usable action slots.
    pub horizon: usize,
    /// If true, actions may follow the first goal-satisfying state (used
    /// when appending external plans to the behaviour space).
    pub disable_after_goal_state_actions: bool,
    /// If true, pin `horizon_var = H` and drop the goal-achievement
    /// constraint.
    pub horizon_planning: bool,
    /// If true, omit the at-most-one-action-per-step clause.
    pub skip_actions: bool,
}

impl EncodeOptions {
    pub fn new(horizon: usize) -> EncodeOptions {
        EncodeOptions {
            horizon,
            disable_after_goal_state_actions: false,
            horizon_planning: false,
            skip_actions: false,
        }
    }
}

/// Step-indexed truth variables of one tracked (goal or landmark) predicate.
pub struct GoalChain<'ctx> {
    pub name: String,
    /// Truth of the predicate at states `1..=H`.
    pub steps: Vec<Bool<'ctx>>,
}

/// A plan read back from a model, together with the solver literals that
/// select exactly this plan.
pub struct ExtractedPlan<'ctx> {
    pub plan: SequentialPlan,
    pub selection: Vec<Bool<'ctx>>,
}

/// Capability surface of an encoder, consumed by the feature library and the
/// behaviour space.
pub trait StepEncoding<'ctx> {
    fn ctx(&self) -> &'ctx Context;
    fn task(&self) -> &Arc<GroundedTask>;
    /// Number of usable action slots.
    fn horizon(&self) -> usize;
    fn horizon_var(&self) -> Int<'ctx>;
    fn assertions(&self) -> &[Bool<'ctx>];
    fn is_oversubscription(&self) -> bool;
    /// Step-indexed truth chains of the tracked goal predicates.
    fn goal_chains(&self) -> &[GoalChain<'ctx>];
    /// Truth of a condition at state `t`.
    fn condition_at(&self, cond: &Condition, t: usize) -> Bool<'ctx>;
    /// Variable of an integer fluent at state `t`.
    fn num_fluent_at(&self, fluent: NumFluentId, t: usize) -> Int<'ctx>;
    /// Predicates witnessing that a real action fires at step `t`.
    fn actions_fire_vars(&self, t: usize) -> Vec<Bool<'ctx>>;
    /// Assertions forcing step `t` to be silent.
    fn disable_actions_at(&self, t: usize) -> Vec<Bool<'ctx>>;
    /// Predicates, one per (action, step), true iff an action referencing
    /// the named object fires at that step.
    fn actions_using_object(&self, name: &str) -> Vec<Bool<'ctx>>;
    /// Selection literals reproducing an externally supplied plan, with all
    /// remaining steps silenced.
    fn convert(&self, plan: &SequentialPlan) -> Result<Vec<Bool<'ctx>>>;
    /// Reads back the plan selected by the model, up to step `horizon`.
    fn extract_plan(&self, model: &Model<'ctx>, horizon: i64) -> ExtractedPlan<'ctx>;
}

/// How many of a step's selection predicates may hold simultaneously.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ExtractMode {
    FirstPerStep,
    AllPerStep,
}

/// State shared by all encoder variants.
///
/// Layout: states `t in 0..=H`; action slots `t in 0..=H`, where slot `t < H`
/// maps state `t` to `t+1` and slot `H` is always silent, leaving `H` usable
/// slots.
pub(crate) struct EncodingCore<'ctx> {
    pub ctx: &'ctx Context,
    pub task: Arc<GroundedTask>,
    pub options: EncodeOptions,
    pub oversubscription: bool,
    /// `[fluent][t]` truth of each boolean fluent at each state.
    pub fluents: Vec<Vec<Bool<'ctx>>>,
    /// `[fluent][t]` value of each integer fluent at each state.
    pub num_fluents: Vec<Vec<Int<'ctx>>>,
    /// `[t][action]` selection predicates.
    pub actions: Vec<Vec<Bool<'ctx>>>,
    /// `[t]` witnesses that some real action fires at the step.
    pub fire: Vec<Vec<Bool<'ctx>>>,
    /// `[t]` assertions forcing the step silent.
    pub silence: Vec<Vec<Bool<'ctx>>>,
    pub horizon_var: Int<'ctx>,
    pub goal_chains: Vec<GoalChain<'ctx>>,
    pub assertions: Vec<Bool<'ctx>>,
}

impl<'ctx> EncodingCore<'ctx> {
    pub fn new(
        ctx: &'ctx Context,
        task: Arc<GroundedTask>,
        options: EncodeOptions,
    ) -> Result<EncodingCore<'ctx>> {
        if options.horizon == 0 {
            return Err(Error::Config("the horizon must be at least 1".to_string()));
        }
        let h = options.horizon;
        let oversubscription = task.is_oversubscription();

        let fluents: Vec<Vec<Bool>> = task
            .fluents
            .iter()
            .map(|f| {
                (0..=h)
                    .map(|t| Bool::new_const(ctx, format!("{}_{}", f.name, t)))
                    .collect()
            })
            .collect();
        let num_fluents: Vec<Vec<Int>> = task
            .num_fluents
            .iter()
            .map(|f| {
                (0..=h)
                    .map(|t| Int::new_const(ctx, format!("{}_{}", f.name, t)))
                    .collect()
            })
            .collect();
        let horizon_var = Int::new_const(ctx, "horizon");

        let mut core = EncodingCore {
            ctx,
            task,
            options,
            oversubscription,
            fluents,
            num_fluents,
            actions: Vec::new(),
            fire: Vec::new(),
            silence: Vec::new(),
            horizon_var,
            goal_chains: Vec::new(),
            assertions: Vec::new(),
        };
        core.assert_initial_state();
        Ok(core)
    }

    fn assert_initial_state(&mut self) {
        let task = self.task.clone();
        for (i, row) in self.fluents.iter().enumerate() {
            let set = task.init.is_set(i.into());
            let var = &row[0];
            self.assertions
                .push(if set { var.clone() } else { var.not() });
        }
        for (i, row) in self.num_fluents.iter().enumerate() {
            let value = task.init.value(i.into());
            self.assertions.push(row[0]._eq(&int(self.ctx, value)));
        }
    }

    /// Declares one selection variable per (step, action) and wires the
    /// default fire/silence witnesses from them.
    pub fn declare_action_grid(&mut self) {
        let task = self.task.clone();
        for t in 0..=self.options.horizon {
            let row: Vec<Bool> = task
                .actions
                .iter()
                .map(|a| Bool::new_const(self.ctx, format!("{}_{}", a.full_name(&task), t)))
                .collect();
            self.fire.push(row.clone());
            self.silence.push(vec![or_all(self.ctx, &row).not()]);
            self.actions.push(row);
        }
    }

    pub fn lit_at(&self, lit: Literal, t: usize) -> Bool<'ctx> {
        let var = &self.fluents[usize::from(lit.fluent)][t];
        if lit.value {
            var.clone()
        } else {
            var.not()
        }
    }

    pub fn condition_at(&self, cond: &Condition, t: usize) -> Bool<'ctx> {
        match cond {
            Condition::Lit(l) => self.lit_at(*l, t),
            Condition::Num(c) => {
                let var = &self.num_fluents[usize::from(c.fluent)][t];
                let value = int(self.ctx, c.value);
                use diverse_planning::task::NumRel::*;
                match c.rel {
                    Le => var.le(&value),
                    Lt => var.lt(&value),
                    Ge => var.ge(&value),
                    Gt => var.gt(&value),
                    Eq => var._eq(&value),
                }
            }
        }
    }

    /// The goal conditions tracked by the encoding: the task goals, or the
    /// oversubscription goals when the task has no hard goals.
    pub fn tracked_goals(&self) -> Vec<Condition> {
        if !self.task.goals.is_empty() {
            self.task.goals.clone()
        } else if let Some(goals) = self.task.oversubscription_goals() {
            goals.iter().map(|(c, _)| *c).collect()
        } else {
            Vec::new()
        }
    }

    /// Builds the per-goal truth chains handed to the ordering features.
    pub fn build_goal_chains(&mut self) {
        let task = self.task.clone();
        let h = self.options.horizon;
        self.goal_chains = self
            .tracked_goals()
            .iter()
            .map(|cond| GoalChain {
                name: cond.format(&task),
                steps: (1..=h).map(|t| self.condition_at(cond, t)).collect(),
            })
            .collect();
    }

    /// Per-slot conjunction of an action's preconditions and effects, shared
    /// by the grid-based variants (`seq`, `forall`, `qfuf`).
    pub fn assert_action_semantics(&mut self) {
        let task = self.task.clone();
        let ctx = self.ctx;
        for t in 0..self.options.horizon {
            for (i, action) in task.actions.iter().enumerate() {
                let sel = self.actions[t][i].clone();

                let mut pre: Vec<Bool> =
                    action.precond.iter().map(|&l| self.lit_at(l, t)).collect();
                pre.extend(
                    action
                        .num_precond
                        .iter()
                        .map(|&c| self.condition_at(&Condition::Num(c), t)),
                );
                self.assertions.push(sel.implies(&and_all(ctx, &pre)));

                let mut eff: Vec<Bool> = Vec::new();
                eff.extend(action.add.iter().map(|&f| self.lit_at(Literal::pos(f), t + 1)));
                eff.extend(action.del.iter().map(|&f| self.lit_at(Literal::neg(f), t + 1)));
                for e in &action.num_effects {
                    let cur = &self.num_fluents[usize::from(e.fluent)][t];
                    let next = &self.num_fluents[usize::from(e.fluent)][t + 1];
                    let target = match e.op {
                        NumOp::Assign => int(ctx, e.amount),
                        NumOp::Increase => Int::add(ctx, &[cur, &int(ctx, e.amount)]),
                        NumOp::Decrease => Int::sub(ctx, &[cur, &int(ctx, e.amount)]),
                    };
                    eff.push(next._eq(&target));
                }
                self.assertions.push(sel.implies(&and_all(ctx, &eff)));
            }
        }
    }

    /// Explanatory frame axioms: a fluent may only change value at a step if
    /// a cause fires, shared by the grid-based variants.
    pub fn assert_frame_axioms(&mut self) {
        let task = self.task.clone();
        let ctx = self.ctx;
        for (f, row) in self.fluents.iter().enumerate() {
            let fluent = f.into();
            let adders: Vec<usize> = task
                .actions
                .iter()
                .enumerate()
                .filter(|(_, a)| a.add.contains(&fluent))
                .map(|(i, _)| i)
                .collect();
            let deleters: Vec<usize> = task
                .actions
                .iter()
                .enumerate()
                .filter(|(_, a)| a.del.contains(&fluent))
                .map(|(i, _)| i)
                .collect();
            for t in 0..self.options.horizon {
                let rise = Bool::and(ctx, &[&row[t + 1], &row[t].not()]);
                let fall = Bool::and(ctx, &[&row[t], &row[t + 1].not()]);
                let add_cause: Vec<Bool> =
                    adders.iter().map(|&i| self.actions[t][i].clone()).collect();
                let del_cause: Vec<Bool> =
                    deleters.iter().map(|&i| self.actions[t][i].clone()).collect();
                self.assertions.push(rise.implies(&or_all(ctx, &add_cause)));
                self.assertions.push(fall.implies(&or_all(ctx, &del_cause)));
            }
        }
        for (f, row) in self.num_fluents.iter().enumerate() {
            let fluent: NumFluentId = f.into();
            let writers: Vec<usize> = task
                .actions
                .iter()
                .enumerate()
                .filter(|(_, a)| a.writes_num(fluent))
                .map(|(i, _)| i)
                .collect();
            for t in 0..self.options.horizon {
                let write_cause: Vec<Bool> =
                    writers.iter().map(|&i| self.actions[t][i].clone()).collect();
                self.assertions.push(
                    or_all(ctx, &write_cause)
                        .not()
                        .implies(&row[t + 1]._eq(&row[t])),
                );
            }
        }
    }

    /// The obligations shared by all variants: last-step silence,
    /// gap-freeness, goal chain, horizon pinpointing and post-goal silence.
    /// Must run after the variant filled `fire` and `silence`.
    pub fn finish_common(&mut self) {
        let ctx = self.ctx;
        let h = self.options.horizon;
        debug_assert_eq!(self.fire.len(), h + 1);
        debug_assert_eq!(self.silence.len(), h + 1);

        // disable the actions in the last step of the formula
        let last = self.silence[h].clone();
        self.assertions.extend(last);

        // deny any empty steps
        for t in 1..h {
            let any_now = or_all(ctx, &self.fire[t]);
            let one_before = pb_eq(ctx, &self.fire[t - 1], 1);
            self.assertions.push(any_now.implies(&one_before));
        }

        if self.options.horizon_planning {
            self.assertions
                .push(self.horizon_var._eq(&int(ctx, h as i64)));
            return;
        }

        let goals = self.tracked_goals();
        let (goal_states, offset): (Vec<Bool>, i64) = if self.oversubscription {
            // any single oversubscription goal suffices; evaluated at state t
            let states: Vec<Bool> = (0..=h)
                .map(|t| {
                    let conds: Vec<Bool> =
                        goals.iter().map(|g| self.condition_at(g, t)).collect();
                    or_all(ctx, &conds)
                })
                .collect();
            self.assertions.push(pb_ge(ctx, &states, 1));
            (states, 0)
        } else {
            // the full goal conjunction must hold somewhere; evaluated at
            // state t + 1
            let states: Vec<Bool> = (0..h)
                .map(|t| {
                    let conds: Vec<Bool> =
                        goals.iter().map(|g| self.condition_at(g, t + 1)).collect();
                    and_all(ctx, &conds)
                })
                .collect();
            self.assertions.push(or_all(ctx, &states));
            (states, 1)
        };

        // locate the first goal state step
        for (idx, goal_state) in goal_states.iter().enumerate() {
            let mut first_here = vec![goal_state.clone()];
            first_here.extend(goal_states[..idx].iter().map(|g| g.not()));
            let pin = self.horizon_var._eq(&int(ctx, idx as i64 + offset));
            self.assertions.push(and_all(ctx, &first_here)._eq(&pin));
        }
        self.assertions
            .push(self.horizon_var.ge(&int(ctx, offset)));
        self.assertions
            .push(self.horizon_var.le(&int(ctx, h as i64)));

        // force no actions to be taken after the first goal state; when
        // appending plans we could otherwise get plans that undo goal states
        // to fit more actions
        if !self.options.disable_after_goal_state_actions {
            for (idx, goal_state) in goal_states.iter().enumerate() {
                let from = if self.oversubscription { idx } else { idx + 1 };
                let after: Vec<Bool> = (from..=h)
                    .flat_map(|t| self.fire[t].iter().cloned())
                    .collect();
                self.assertions
                    .push(goal_state._eq(&or_all(ctx, &after).not()));
            }
        }
    }

    pub fn convert(&self, plan: &SequentialPlan) -> Result<Vec<Bool<'ctx>>> {
        let h = self.options.horizon;
        if plan.len() > h {
            return Err(Error::InvalidPlan(format!(
                "plan has {} actions but the horizon is {h}",
                plan.len()
            )));
        }
        let mut step_lits = Vec::with_capacity(plan.len());
        for (t, instance) in plan.actions.iter().enumerate() {
            let name = instance.full_name();
            let id = self
                .task
                .action_id(&name)
                .ok_or_else(|| Error::InvalidPlan(format!("unknown action {name}")))?;
            step_lits.push(self.actions[t][usize::from(id)].clone());
        }
        let mut literals = vec![and_all(self.ctx, &step_lits)];
        for t in plan.len()..=h {
            literals.extend(self.silence[t].iter().cloned());
        }
        Ok(literals)
    }

    fn extract(&self, model: &Model<'ctx>, horizon: i64, mode: ExtractMode) -> ExtractedPlan<'ctx> {
        let task = &self.task;
        let last = (horizon.max(0) as usize).min(self.options.horizon);
        let mut actions = Vec::new();
        let mut selection = Vec::new();
        for t in 0..=last {
            for (i, action) in task.actions.iter().enumerate() {
                if crate::smt::eval_bool(model, &self.actions[t][i]) {
                    actions.push(ActionInstance {
                        name: action.name.clone(),
                        params: action
                            .params
                            .iter()
                            .map(|&o| task.objects[usize::from(o)].name.clone())
                            .collect(),
                    });
                    selection.push(self.actions[t][i].clone());
                    if mode == ExtractMode::FirstPerStep {
                        break;
                    }
                }
            }
        }
        ExtractedPlan {
            plan: SequentialPlan::new(actions),
            selection,
        }
    }
}

/// A fully constructed encoding of one task at one horizon.
pub struct PlanEncoding<'ctx> {
    core: EncodingCore<'ctx>,
    kind: EncoderKind,
    extract_mode: ExtractMode,
}

impl<'ctx> PlanEncoding<'ctx> {
    pub(crate) fn new(
        core: EncodingCore<'ctx>,
        kind: EncoderKind,
        multi_per_step: bool,
    ) -> PlanEncoding<'ctx> {
        PlanEncoding {
            core,
            kind,
            extract_mode: if multi_per_step {
                ExtractMode::AllPerStep
            } else {
                ExtractMode::FirstPerStep
            },
        }
    }

    pub fn kind(&self) -> EncoderKind {
        self.kind
    }
}

impl<'ctx> StepEncoding<'ctx> for PlanEncoding<'ctx> {
    fn ctx(&self) -> &'ctx Context {
        self.core.ctx
    }
    fn task(&self) -> &Arc<GroundedTask> {
        &self.core.task
    }
    fn horizon(&self) -> usize {
        self.core.options.horizon
    }
    fn horizon_var(&self) -> Int<'ctx> {
        self.core.horizon_var.clone()
    }
    fn assertions(&self) -> &[Bool<'ctx>] {
        &self.core.assertions
    }
    fn is_oversubscription(&self) -> bool {
        self.core.oversubscription
    }
    fn goal_chains(&self) -> &[GoalChain<'ctx>] {
        &self.core.goal_chains
    }
    fn condition_at(&self, cond: &Condition, t: usize) -> Bool<'ctx> {
        self.core.condition_at(cond, t)
    }
    fn num_fluent_at(&self, fluent: NumFluentId, t: usize) -> Int<'ctx> {
        self.core.num_fluents[usize::from(fluent)][t].clone()
    }
    fn actions_fire_vars(&self, t: usize) -> Vec<Bool<'ctx>> {
        self.core.fire[t].clone()
    }
    fn disable_actions_at(&self, t: usize) -> Vec<Bool<'ctx>> {
        self.core.silence[t].clone()
    }
    fn actions_using_object(&self, name: &str) -> Vec<Bool<'ctx>> {
        let ids = self.core.task.actions_using_object(name);
        let mut vars = Vec::new();
        for id in ids {
            for t in 0..self.core.options.horizon {
                vars.push(self.core.actions[t][usize::from(id)].clone());
            }
        }
        vars
    }
    fn convert(&self, plan: &SequentialPlan) -> Result<Vec<Bool<'ctx>>> {
        self.core.convert(plan)
    }
    fn extract_plan(&self, model: &Model<'ctx>, horizon: i64) -> ExtractedPlan<'ctx> {
        self.core.extract(model, horizon, self.extract_mode)
    }
}

/// Builds the encoder selected by `kind`.
pub fn build<'ctx>(
    kind: EncoderKind,
    ctx: &'ctx Context,
    task: &Arc<GroundedTask>,
    options: EncodeOptions,
) -> Result<PlanEncoding<'ctx>> {
    match kind {
        EncoderKind::Seq => seq::build(ctx, task.clone(), options, false),
        EncoderKind::Forall => seq::build(ctx, task.clone(), options, true),
        EncoderKind::R2e => r2e::build(ctx, task.clone(), options),
        EncoderKind::Qfuf => qfuf::build(ctx, task.clone(), options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smt::{self, eval_i64, SmtSolver, SolveOutcome};
    use diverse_planning::demo;
    use diverse_planning::plan::ActionInstance;

    #[test]
    fn zero_horizon_is_a_configuration_error() {
        let ctx = smt::context();
        let task = Arc::new(demo::blocksworld(2));
        match build(EncoderKind::Seq, &ctx, &task, EncodeOptions::new(0)) {
            Err(Error::Config(_)) => {}
            _ => panic!("expected a configuration error"),
        }
    }

    #[test]
    fn horizon_planning_pins_the_horizon_variable() {
        let ctx = smt::context();
        let task = Arc::new(demo::blocksworld(2));
        let mut options = EncodeOptions::new(3);
        options.horizon_planning = true;
        let enc = build(EncoderKind::Seq, &ctx, &task, options).unwrap();
        let mut solver = SmtSolver::new(&ctx);
        solver.assert_all(enc.assertions());
        assert_eq!(solver.check(&[]), SolveOutcome::Sat);
        let model = solver.model().unwrap();
        assert_eq!(eval_i64(&model, &enc.horizon_var()), 3);
    }

    #[test]
    fn convert_then_extract_reproduces_the_plan() {
        let ctx = smt::context();
        let task = Arc::new(demo::blocksworld(2));
        let enc = build(EncoderKind::Seq, &ctx, &task, EncodeOptions::new(2)).unwrap();
        let plan = SequentialPlan::new(vec![
            ActionInstance::new("pickup", &["a"]),
            ActionInstance::new("stack", &["a", "b"]),
        ]);
        let assumptions = enc.convert(&plan).unwrap();
        let mut solver = SmtSolver::new(&ctx);
        solver.assert_all(enc.assertions());
        assert_eq!(solver.check(&assumptions), SolveOutcome::Sat);
        let model = solver.model().unwrap();
        let horizon = eval_i64(&model, &enc.horizon_var());
        assert_eq!(horizon, 2);
        let extracted = enc.extract_plan(&model, horizon);
        assert_eq!(extracted.plan.signature(), plan.signature());
        assert_eq!(extracted.selection.len(), 2);
    }

    #[test]
    fn plans_longer_than_the_horizon_are_rejected() {
        let ctx = smt::context();
        let task = Arc::new(demo::blocksworld(2));
        let enc = build(EncoderKind::Seq, &ctx, &task, EncodeOptions::new(1)).unwrap();
        let plan = SequentialPlan::new(vec![
            ActionInstance::new("pickup", &["a"]),
            ActionInstance::new("stack", &["a", "b"]),
        ]);
        match enc.convert(&plan) {
            Err(Error::InvalidPlan(_)) => {}
            _ => panic!("expected InvalidPlan"),
        }
    }
}
