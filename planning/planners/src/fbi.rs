//! The forbidden-behaviour iterative planner.
//!
//! Phase 1 keeps asking the behaviour space for a plan whose behaviour
//! vector differs from everything seen so far. If fewer than `k` plans come
//! out, phase 2 re-allows the seen behaviours and forbids the seen action
//! selections instead, exhausting distinct plans within known behaviours.
//! The assumption list is re-derived on every call; nothing is ever pushed
//! onto the solver.

use crate::encode::EncoderKind;
use crate::features::{FeatureContext, FeatureSpec};
use crate::smt::{and_all, or_all};
use crate::space::{BehaviourSpace, SmtPlan, SpaceConfig};
use crate::{Error, Result};
use diverse_planning::plan::SequentialPlan;
use diverse_planning::search::optimal_plan_search;
use diverse_planning::task::GroundedTask;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use z3::ast::Bool;
use z3::Context;

/// Planner configuration; defaults mirror the documented option list.
#[derive(Clone, Debug)]
pub struct Config {
    pub encoder: EncoderKind,
    /// Horizon ceiling used directly for oversubscription tasks.
    pub upper_bound: usize,
    /// Multiplier on the optimal plan length.
    pub quality_bound_factor: f64,
    pub solver_timeout_ms: u32,
    pub solver_memory_limit_mb: u32,
    pub disable_after_goal_state_actions: bool,
    pub horizon_planning: bool,
    /// Skip phase 2.
    pub behaviours_only: bool,
    /// Do not keep the seed plan in the result set.
    pub ignore_seed_plan: bool,
    /// Simulate each extracted plan before accepting it.
    pub run_plan_validation: bool,
    pub features: Vec<FeatureSpec>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            encoder: EncoderKind::Seq,
            upper_bound: 50,
            quality_bound_factor: 1.0,
            solver_timeout_ms: 300_000,
            solver_memory_limit_mb: 16_000,
            disable_after_goal_state_actions: false,
            horizon_planning: false,
            behaviours_only: false,
            ignore_seed_plan: false,
            run_plan_validation: false,
            features: Vec::new(),
        }
    }
}

/// The external optimal planner used to pin the horizon of classical tasks.
pub trait SeedPlanner {
    fn solve(&self, task: &GroundedTask) -> Option<SequentialPlan>;
}

/// Default seed planner: the built-in uniform-cost search.
pub struct UniformCostSeed;

impl SeedPlanner for UniformCostSeed {
    fn solve(&self, task: &GroundedTask) -> Option<SequentialPlan> {
        optimal_plan_search(task)
    }
}

pub struct ForbidBehaviourIterative<'ctx> {
    space: BehaviourSpace<'ctx>,
    behaviours_only: bool,
    plans: Vec<SmtPlan<'ctx>>,
    seen_sequences: HashSet<String>,
}

impl<'ctx> ForbidBehaviourIterative<'ctx> {
    /// Builds the behaviour space for the task and folds the seed plan in.
    ///
    /// Classical tasks require a seed plan from the external planner to pin
    /// the horizon to `floor(optimal * q)`; failing that is [`Error::NoSeedPlan`].
    /// Oversubscription tasks take the horizon directly from `upper_bound`.
    pub fn new(
        ctx: &'ctx Context,
        task: Arc<GroundedTask>,
        mut cfg: Config,
        seed_planner: &dyn SeedPlanner,
    ) -> Result<ForbidBehaviourIterative<'ctx>> {
        let oversubscription = task.is_oversubscription();

        let (horizon, seed) = if oversubscription {
            (cfg.upper_bound.max(1), None)
        } else {
            let seed = seed_planner.solve(&task).ok_or(Error::NoSeedPlan)?;
            let horizon = ((seed.len() as f64 * cfg.quality_bound_factor).floor() as usize).max(1);
            (horizon, Some(seed))
        };
        debug!(horizon, oversubscription, "behaviour space horizon fixed");

        // a tight quality bound leaves the cost feature a single value
        if !oversubscription && (cfg.quality_bound_factor - 1.0).abs() < f64::EPSILON {
            cfg.features.retain(|f| !f.is_makespan());
        }

        let info = FeatureContext {
            optimal_plan_length: seed.as_ref().map(|s| s.len()).unwrap_or(0),
            quality_bound_factor: cfg.quality_bound_factor,
        };
        let space_cfg = SpaceConfig {
            encoder: cfg.encoder,
            horizon,
            // oversubscription plans keep acting after the first satisfied
            // goal, up to their cost bound
            disable_after_goal_state_actions: cfg.disable_after_goal_state_actions
                || oversubscription,
            horizon_planning: cfg.horizon_planning,
            run_plan_validation: cfg.run_plan_validation,
            solver_timeout_ms: cfg.solver_timeout_ms,
            solver_memory_limit_mb: cfg.solver_memory_limit_mb,
        };
        let space = BehaviourSpace::new(ctx, task, &space_cfg, &cfg.features, &info)?;

        let mut planner = ForbidBehaviourIterative {
            space,
            behaviours_only: cfg.behaviours_only,
            plans: Vec::new(),
            seen_sequences: HashSet::new(),
        };

        if let Some(seed) = seed {
            if seed.len() > horizon {
                // q < 1: the seed plan no longer fits the formula
                debug!("seed plan does not fit the quality-bounded horizon");
            } else {
                match planner.space.test_plan(&seed) {
                    Ok(Some(plan)) => {
                        if !cfg.ignore_seed_plan {
                            planner.record(plan);
                        }
                    }
                    Ok(None) => warn!("seed plan invalidated the behaviour space"),
                    Err(e) => warn!("seed plan could not be tested: {e}"),
                }
            }
        }
        Ok(planner)
    }

    fn record(&mut self, plan: SmtPlan<'ctx>) -> bool {
        let signature = plan.plan.signature();
        if !self.seen_sequences.insert(signature) {
            warn!("repeated plan generated");
            return false;
        }
        self.plans.push(plan);
        true
    }

    fn behaviour_exprs(&self) -> Vec<Bool<'ctx>> {
        self.plans
            .iter()
            .filter_map(|p| p.behaviour.clone())
            .collect()
    }

    fn selection_exprs(&self) -> Vec<Bool<'ctx>> {
        let ctx = self.space.encoder().ctx();
        self.plans
            .iter()
            .map(|p| and_all(ctx, &p.selection))
            .collect()
    }

    /// Runs the two iteration phases until `k` plans are found or the space
    /// is exhausted. `k = 0` does no solver work.
    pub fn plan(&mut self, k: usize) -> &[SmtPlan<'ctx>] {
        if k == 0 {
            return &self.plans[..0];
        }

        let ctx = self.space.encoder().ctx();

        // phase 1: forbid all seen behaviour vectors. A plan that repeats an
        // action sequence is not kept, but its behaviour is still forbidden
        // so the iteration makes progress.
        if self.space.has_features() {
            let mut forbidden = self.behaviour_exprs();
            while self.plans.len() < k {
                let assumptions = if forbidden.is_empty() {
                    vec![]
                } else {
                    vec![or_all(ctx, &forbidden).not()]
                };
                let Some(plan) = self.space.check(&assumptions) else {
                    debug!("phase 1 exhausted after {} plan(s)", self.plans.len());
                    break;
                };
                let Some(behaviour) = plan.behaviour.clone() else {
                    warn!("phase 1 produced a plan without a behaviour vector");
                    break;
                };
                forbidden.push(behaviour);
                if self.record(plan) {
                    info!("found {} behaviour(s) till now", self.plans.len());
                }
            }
        }

        // phase 2: allow the behaviours seen so far, forbid every seen
        // action selection.
        if self.plans.len() < k && !self.behaviours_only {
            let allowed = self.behaviour_exprs();
            let mut forbidden_selections = self.selection_exprs();
            while self.plans.len() < k {
                let mut assumptions = Vec::new();
                if !allowed.is_empty() {
                    assumptions.push(or_all(ctx, &allowed));
                }
                assumptions.extend(forbidden_selections.iter().map(|s| s.not()));
                let Some(plan) = self.space.check(&assumptions) else {
                    debug!("phase 2 exhausted after {} plan(s)", self.plans.len());
                    break;
                };
                forbidden_selections.push(and_all(ctx, &plan.selection));
                if self.record(plan) {
                    info!("found {} plan(s) till now", self.plans.len());
                }
            }
        }

        &self.plans
    }

    pub fn plans(&self) -> &[SmtPlan<'ctx>] {
        &self.plans
    }

    pub fn behaviour_count(&self) -> usize {
        self.space.behaviour_count()
    }

    pub fn dimension_counts(&self) -> Vec<(String, usize)> {
        self.space.dimension_counts()
    }
}
