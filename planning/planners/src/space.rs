//! The behaviour space: a plan encoding, its attached features and one
//! incremental solver.
//!
//! All solver access is serialised through this type. `check` runs the
//! solver under caller-provided assumptions and, on sat, lifts the model to
//! a plan annotated with its behaviour expression and canonical behaviour
//! string. Solver exhaustion and backend failures degrade to "no plan" with
//! a log entry.

use crate::encode::{self, EncodeOptions, EncoderKind, StepEncoding};
use crate::env::EnvParam;
use crate::features::{build_features, Feature, FeatureContext, FeatureSpec};
use crate::smt::{and_all, eval_i64, SmtSolver, SolveOutcome};
use crate::Result;
use diverse_planning::plan::SequentialPlan;
use diverse_planning::simulate;
use diverse_planning::task::GroundedTask;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use z3::ast::Bool;
use z3::Context;

/// If set to true, logs the size of the formula after construction.
static PRINT_FORMULA_STATS: EnvParam<bool> = EnvParam::new("DIVERSE_PRINT_FORMULA_STATS", "false");

/// Construction parameters of a behaviour space.
#[derive(Clone, Debug)]
pub struct SpaceConfig {
    pub encoder: EncoderKind,
    /// Number of usable action slots of the encoding.
    pub horizon: usize,
    pub disable_after_goal_state_actions: bool,
    pub horizon_planning: bool,
    /// Simulate each extracted plan and drop it if it is not executable.
    pub run_plan_validation: bool,
    pub solver_timeout_ms: u32,
    pub solver_memory_limit_mb: u32,
}

/// A plan extracted from the space, annotated with its behaviour.
pub struct SmtPlan<'ctx> {
    pub id: usize,
    pub plan: SequentialPlan,
    /// Conjunction of `feature output = model value` equalities; `None` when
    /// the space has no features.
    pub behaviour: Option<Bool<'ctx>>,
    /// Canonical rendering of the behaviour vector.
    pub behaviour_str: String,
    /// Solver literals selecting exactly this plan.
    pub selection: Vec<Bool<'ctx>>,
}

pub struct BehaviourSpace<'ctx> {
    task: Arc<GroundedTask>,
    encoder: Box<dyn StepEncoding<'ctx> + 'ctx>,
    features: Vec<Feature<'ctx>>,
    solver: SmtSolver<'ctx>,
    run_plan_validation: bool,
    behaviour_frequency: HashMap<String, usize>,
    extracted: usize,
}

impl<'ctx> BehaviourSpace<'ctx> {
    pub fn new(
        ctx: &'ctx Context,
        task: Arc<GroundedTask>,
        cfg: &SpaceConfig,
        specs: &[FeatureSpec],
        info: &FeatureContext,
    ) -> Result<BehaviourSpace<'ctx>> {
        let span = tracing::span!(tracing::Level::DEBUG, "ENCODING");
        let _enter = span.enter();

        let mut options = EncodeOptions::new(cfg.horizon);
        options.disable_after_goal_state_actions = cfg.disable_after_goal_state_actions;
        options.horizon_planning = cfg.horizon_planning;
        let encoder = encode::build(cfg.encoder, ctx, &task, options)?;
        let features = build_features(specs, &encoder, info)?;

        let mut solver = SmtSolver::new(ctx);
        solver.assert_all(encoder.assertions());
        for feature in &features {
            solver.assert_all(feature.assertions());
        }
        solver.set_limits(cfg.solver_timeout_ms, cfg.solver_memory_limit_mb);

        if PRINT_FORMULA_STATS.get() {
            let total: usize = encoder.assertions().len()
                + features.iter().map(|f| f.assertions().len()).sum::<usize>();
            debug!(horizon = cfg.horizon, assertions = total, "formula built");
        }

        Ok(BehaviourSpace {
            task,
            encoder: Box::new(encoder),
            features,
            solver,
            run_plan_validation: cfg.run_plan_validation,
            behaviour_frequency: HashMap::new(),
            extracted: 0,
        })
    }

    pub fn task(&self) -> &Arc<GroundedTask> {
        &self.task
    }

    pub fn encoder(&self) -> &dyn StepEncoding<'ctx> {
        self.encoder.as_ref()
    }

    pub fn has_features(&self) -> bool {
        !self.features.is_empty()
    }

    /// Number of distinct behaviour vectors observed so far.
    pub fn behaviour_count(&self) -> usize {
        self.behaviour_frequency.len()
    }

    /// Observed domain size per feature.
    pub fn dimension_counts(&self) -> Vec<(String, usize)> {
        self.features
            .iter()
            .map(|f| (f.name().to_string(), f.domain_len()))
            .collect()
    }

    /// Incremental check under the given assumptions; on sat, extracts the
    /// model as an annotated plan. Assumptions never persist across calls.
    pub fn check(&mut self, assumptions: &[Bool<'ctx>]) -> Option<SmtPlan<'ctx>> {
        match self.solver.check(assumptions) {
            SolveOutcome::Sat => {}
            SolveOutcome::Unsat => return None,
            SolveOutcome::Exhausted => {
                warn!("check treated as unsat: solver exhausted");
                return None;
            }
            SolveOutcome::Failed(reason) => {
                warn!("check treated as unsat: {reason}");
                return None;
            }
        }
        let model = self.solver.model()?;

        // oversubscription plans run until their cost bound, not until the
        // first goal state
        let horizon = if self.encoder.is_oversubscription() {
            self.encoder.horizon() as i64
        } else {
            eval_i64(&model, &self.encoder.horizon_var())
        };
        let extracted = self.encoder.extract_plan(&model, horizon);

        let ctx = self.encoder.ctx();
        let behaviour = if self.features.is_empty() {
            None
        } else {
            let parts: Vec<Bool> = self
                .features
                .iter_mut()
                .map(|f| f.behaviour_expr(&model))
                .collect();
            Some(and_all(ctx, &parts))
        };
        let behaviour_str = self
            .features
            .iter()
            .map(|f| f.reading(&model))
            .collect::<Vec<_>>()
            .join(" ^ ");

        if self.run_plan_validation {
            if let Err(e) = simulate::simulate(&self.task, &extracted.plan) {
                warn!("dropping invalid extracted plan: {e}");
                return None;
            }
        }

        self.extracted += 1;
        *self.behaviour_frequency.entry(behaviour_str.clone()).or_insert(0) += 1;
        Some(SmtPlan {
            id: self.extracted,
            plan: extracted.plan,
            behaviour,
            behaviour_str,
            selection: extracted.selection,
        })
    }

    /// Evaluates an externally supplied plan: checks it against the formula
    /// and returns it annotated with its behaviour, without materialising
    /// any new actions.
    pub fn test_plan(&mut self, plan: &SequentialPlan) -> Result<Option<SmtPlan<'ctx>>> {
        let assumptions = self.encoder.convert(plan)?;
        Ok(self.check(&assumptions))
    }

    /// Reinstantiates the solver from the permanent formula.
    pub fn reset(&mut self) {
        let mut assertions: Vec<Bool> = self.encoder.assertions().to_vec();
        for feature in &self.features {
            assertions.extend_from_slice(feature.assertions());
        }
        self.solver.reset(&assertions);
        debug!("the solver has been reset");
    }
}
