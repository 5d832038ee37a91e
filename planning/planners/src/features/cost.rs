//! Makespan / cost bound.
//!
//! Each step contributes a 0/1 step cost, true iff something real fires at
//! the step; the sum is the plan cost. Classical tasks are bounded between
//! the optimal plan length and the horizon. Oversubscription tasks are
//! bounded by `floor(q * H)` instead, with every later step disabled.

use crate::encode::StepEncoding;
use crate::smt::{eval_i64, indicator, int, or_all, sum};
use std::collections::HashSet;
use z3::ast::{Ast, Bool, Int};
use z3::{Context, Model};

pub struct CostBoundFeature<'ctx> {
    ctx: &'ctx Context,
    encodings: Vec<Bool<'ctx>>,
    cost: Int<'ctx>,
    domain: HashSet<i64>,
}

impl<'ctx> CostBoundFeature<'ctx> {
    pub fn new(
        encoder: &dyn StepEncoding<'ctx>,
        optimal_plan_length: usize,
        quality_bound_factor: f64,
    ) -> CostBoundFeature<'ctx> {
        let ctx = encoder.ctx();
        let h = encoder.horizon();
        let mut encodings = Vec::new();

        let step_costs: Vec<Int> = (0..=h)
            .map(|t| {
                let var = Int::new_const(ctx, format!("step_{t}_cost"));
                let fired = or_all(ctx, &encoder.actions_fire_vars(t));
                encodings.push(var._eq(&indicator(ctx, &fired)));
                var
            })
            .collect();
        let cost = Int::new_const(ctx, "cost");
        encodings.push(cost._eq(&sum(ctx, &step_costs)));
        encodings.push(cost.le(&int(ctx, h as i64)));

        if !encoder.is_oversubscription() {
            encodings.push(cost.ge(&int(ctx, optimal_plan_length as i64)));
        } else {
            let bound = (quality_bound_factor * h as f64).floor() as i64;
            encodings.push(cost.le(&int(ctx, bound)));
            encodings.push(encoder.horizon_var().le(&int(ctx, bound)));
            // nothing may fire once the budget is spent
            for t in bound.max(0) as usize..=h {
                encodings.extend(encoder.disable_actions_at(t));
            }
        }

        CostBoundFeature {
            ctx,
            encodings,
            cost,
            domain: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        "cost"
    }

    pub fn assertions(&self) -> &[Bool<'ctx>] {
        &self.encodings
    }

    pub fn behaviour_expr(&mut self, model: &Model<'ctx>) -> Bool<'ctx> {
        let value = eval_i64(model, &self.cost);
        self.domain.insert(value);
        self.cost._eq(&int(self.ctx, value))
    }

    pub fn reading(&self, model: &Model<'ctx>) -> String {
        format!("cost:{}", eval_i64(model, &self.cost))
    }

    pub fn domain_len(&self) -> usize {
        self.domain.len()
    }
}
