//! Goal-predicate and landmark-predicate ordering.
//!
//! For each tracked predicate an integer `sg` captures the first step at
//! which it becomes true (`-100` if it never does). Every unordered pair of
//! predicates yields a boolean output equal to `sg_i >= sg_j`, routed
//! through one shared uninterpreted function so the solver can reuse
//! congruence reasoning across pairs.

use crate::encode::GoalChain;
use crate::smt::{and_all, eval_bool, int};
use itertools::Itertools;
use std::collections::HashSet;
use z3::ast::{Ast, Bool, Int};
use z3::{Context, FuncDecl, Model, Sort};

pub struct OrderingFeature<'ctx> {
    ctx: &'ctx Context,
    name: String,
    encodings: Vec<Bool<'ctx>>,
    /// One `(label, var)` output per unordered predicate pair.
    order_vars: Vec<(String, Bool<'ctx>)>,
    domain: HashSet<String>,
}

impl<'ctx> OrderingFeature<'ctx> {
    pub fn new(ctx: &'ctx Context, name: &str, chains: &[GoalChain<'ctx>]) -> OrderingFeature<'ctx> {
        let mut encodings = Vec::new();
        let never = int(ctx, -100);

        let first_steps: Vec<(String, Int<'ctx>)> = chains
            .iter()
            .map(|chain| {
                let sg = Int::new_const(ctx, format!("sg_{}_{}", name, chain.name));
                for (idx, step) in chain.steps.iter().enumerate() {
                    let mut first_here = vec![step.clone()];
                    first_here.extend(chain.steps[..idx].iter().map(|s| s.not()));
                    let pin = sg._eq(&int(ctx, idx as i64 + 1));
                    encodings.push(and_all(ctx, &first_here)._eq(&pin));
                }
                let nowhere: Vec<Bool> = chain.steps.iter().map(|s| s.not()).collect();
                encodings.push(and_all(ctx, &nowhere)._eq(&sg._eq(&never)));
                (chain.name.clone(), sg)
            })
            .collect();

        let int_sort = Sort::int(ctx);
        let bool_sort = Sort::bool(ctx);
        let uf = FuncDecl::new(
            ctx,
            format!("{name}_ordering_fn"),
            &[&int_sort, &int_sort],
            &bool_sort,
        );

        let mut order_vars = Vec::new();
        for ((name_i, sg_i), (name_j, sg_j)) in first_steps.iter().tuple_combinations() {
            let app = uf
                .apply(&[sg_i, sg_j])
                .as_bool()
                .expect("ordering function ranges over booleans");
            encodings.push(app._eq(&sg_i.ge(sg_j)));
            let var = Bool::new_const(ctx, format!("ord_{name}_{name_i}__{name_j}"));
            encodings.push(var._eq(&app));
            order_vars.push((format!("{name_i}>={name_j}"), var));
        }

        OrderingFeature {
            ctx,
            name: name.to_string(),
            encodings,
            order_vars,
            domain: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn assertions(&self) -> &[Bool<'ctx>] {
        &self.encodings
    }

    fn bits(&self, model: &Model<'ctx>) -> String {
        self.order_vars
            .iter()
            .map(|(_, v)| if eval_bool(model, v) { '1' } else { '0' })
            .collect()
    }

    pub fn behaviour_expr(&mut self, model: &Model<'ctx>) -> Bool<'ctx> {
        self.domain.insert(self.bits(model));
        let equalities: Vec<Bool> = self
            .order_vars
            .iter()
            .map(|(_, v)| v._eq(&Bool::from_bool(self.ctx, eval_bool(model, v))))
            .collect();
        and_all(self.ctx, &equalities)
    }

    pub fn reading(&self, model: &Model<'ctx>) -> String {
        format!("{}:{}", self.name, self.bits(model))
    }

    pub fn domain_len(&self) -> usize {
        self.domain.len()
    }
}
