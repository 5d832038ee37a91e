//! Utility value and utility set, for oversubscription tasks.
//!
//! Both features observe the truth of each oversubscription goal in the last
//! state. Utility-value sums the utilities of the satisfied goals into one
//! integer output and requires it positive; utility-set exposes the
//! satisfaction vector itself and requires at least one satisfied goal.

use crate::encode::StepEncoding;
use crate::smt::{and_all, eval_bool, eval_i64, int, pb_ge};
use crate::{Error, Result};
use std::collections::HashSet;
use z3::ast::{Ast, Bool, Int};
use z3::{Context, Model};

fn last_state_goals<'ctx>(
    encoder: &dyn StepEncoding<'ctx>,
) -> Result<Vec<(String, Bool<'ctx>, i64)>> {
    let task = encoder.task().clone();
    let goals = task.oversubscription_goals().ok_or_else(|| {
        Error::Config("utility features require an oversubscription metric".to_string())
    })?;
    let h = encoder.horizon();
    Ok(goals
        .iter()
        .map(|(cond, utility)| (cond.format(&task), encoder.condition_at(cond, h), *utility))
        .collect())
}

pub struct UtilityValueFeature<'ctx> {
    ctx: &'ctx Context,
    encodings: Vec<Bool<'ctx>>,
    utility: Int<'ctx>,
    domain: HashSet<i64>,
}

impl<'ctx> UtilityValueFeature<'ctx> {
    pub fn new(encoder: &dyn StepEncoding<'ctx>) -> Result<UtilityValueFeature<'ctx>> {
        let ctx = encoder.ctx();
        let mut encodings = Vec::new();
        let mut parts = Vec::new();
        for (name, last, utility) in last_state_goals(encoder)? {
            let var = Int::new_const(ctx, format!("utility_{name}"));
            encodings.push(var._eq(&last.ite(&int(ctx, utility), &int(ctx, 0))));
            parts.push(var);
        }
        let utility = Int::new_const(ctx, "utility");
        encodings.push(utility._eq(&crate::smt::sum(ctx, &parts)));
        encodings.push(utility.gt(&int(ctx, 0)));
        Ok(UtilityValueFeature {
            ctx,
            encodings,
            utility,
            domain: HashSet::new(),
        })
    }

    pub fn name(&self) -> &str {
        "utility-value"
    }

    pub fn assertions(&self) -> &[Bool<'ctx>] {
        &self.encodings
    }

    pub fn behaviour_expr(&mut self, model: &Model<'ctx>) -> Bool<'ctx> {
        let value = eval_i64(model, &self.utility);
        self.domain.insert(value);
        self.utility._eq(&int(self.ctx, value))
    }

    pub fn reading(&self, model: &Model<'ctx>) -> String {
        format!("uv:{}", eval_i64(model, &self.utility))
    }

    pub fn domain_len(&self) -> usize {
        self.domain.len()
    }
}

pub struct UtilitySetFeature<'ctx> {
    ctx: &'ctx Context,
    encodings: Vec<Bool<'ctx>>,
    members: Vec<Bool<'ctx>>,
    domain: HashSet<String>,
}

impl<'ctx> UtilitySetFeature<'ctx> {
    pub fn new(encoder: &dyn StepEncoding<'ctx>) -> Result<UtilitySetFeature<'ctx>> {
        let ctx = encoder.ctx();
        let mut encodings = Vec::new();
        let mut members = Vec::new();
        for (name, last, _) in last_state_goals(encoder)? {
            let var = Bool::new_const(ctx, format!("utility_set_{name}"));
            encodings.push(var._eq(&last));
            members.push(var);
        }
        encodings.push(pb_ge(ctx, &members, 1));
        Ok(UtilitySetFeature {
            ctx,
            encodings,
            members,
            domain: HashSet::new(),
        })
    }

    pub fn name(&self) -> &str {
        "utility-set"
    }

    pub fn assertions(&self) -> &[Bool<'ctx>] {
        &self.encodings
    }

    fn bits(&self, model: &Model<'ctx>) -> String {
        self.members
            .iter()
            .map(|v| if eval_bool(model, v) { '1' } else { '0' })
            .collect()
    }

    pub fn behaviour_expr(&mut self, model: &Model<'ctx>) -> Bool<'ctx> {
        self.domain.insert(self.bits(model));
        let equalities: Vec<Bool> = self
            .members
            .iter()
            .map(|v| v._eq(&Bool::from_bool(self.ctx, eval_bool(model, v))))
            .collect();
        and_all(self.ctx, &equalities)
    }

    pub fn reading(&self, model: &Model<'ctx>) -> String {
        format!("us:{}", self.bits(model))
    }

    pub fn domain_len(&self) -> usize {
        self.domain.len()
    }
}
