//! Thin wrapper around the SMT backend.
//!
//! Everything the planner needs from z3 goes through this module: context
//! construction, n-ary term helpers, pseudo-boolean constraints, an
//! incremental solver handle with per-call resource limits, and model
//! readback. No other module configures the solver directly.

use tracing::warn;
use z3::ast::{Ast, Bool, Int};
use z3::{Config, Context, Model, Params, SatResult, Solver};

/// A fresh context with model generation enabled.
pub fn context() -> Context {
    let mut cfg = Config::new();
    cfg.set_model_generation(true);
    Context::new(&cfg)
}

/// Conjunction of the given terms; the empty conjunction is `true`.
pub fn and_all<'ctx>(ctx: &'ctx Context, items: &[Bool<'ctx>]) -> Bool<'ctx> {
    match items {
        [] => Bool::from_bool(ctx, true),
        [single] => single.clone(),
        _ => Bool::and(ctx, &items.iter().collect::<Vec<_>>()),
    }
}

/// Disjunction of the given terms; the empty disjunction is `false`.
pub fn or_all<'ctx>(ctx: &'ctx Context, items: &[Bool<'ctx>]) -> Bool<'ctx> {
    match items {
        [] => Bool::from_bool(ctx, false),
        [single] => single.clone(),
        _ => Bool::or(ctx, &items.iter().collect::<Vec<_>>()),
    }
}

/// Sum of the given integer terms; the empty sum is `0`.
pub fn sum<'ctx>(ctx: &'ctx Context, items: &[Int<'ctx>]) -> Int<'ctx> {
    match items {
        [] => Int::from_i64(ctx, 0),
        [single] => single.clone(),
        _ => Int::add(ctx, &items.iter().collect::<Vec<_>>()),
    }
}

pub fn int<'ctx>(ctx: &'ctx Context, value: i64) -> Int<'ctx> {
    Int::from_i64(ctx, value)
}

/// `if cond then 1 else 0`.
pub fn indicator<'ctx>(ctx: &'ctx Context, cond: &Bool<'ctx>) -> Int<'ctx> {
    cond.ite(&int(ctx, 1), &int(ctx, 0))
}

pub fn pb_le<'ctx>(ctx: &'ctx Context, items: &[Bool<'ctx>], k: i32) -> Bool<'ctx> {
    let weighted: Vec<(&Bool<'ctx>, i32)> = items.iter().map(|b| (b, 1)).collect();
    Bool::pb_le(ctx, &weighted, k)
}

pub fn pb_ge<'ctx>(ctx: &'ctx Context, items: &[Bool<'ctx>], k: i32) -> Bool<'ctx> {
    let weighted: Vec<(&Bool<'ctx>, i32)> = items.iter().map(|b| (b, 1)).collect();
    Bool::pb_ge(ctx, &weighted, k)
}

pub fn pb_eq<'ctx>(ctx: &'ctx Context, items: &[Bool<'ctx>], k: i32) -> Bool<'ctx> {
    let weighted: Vec<(&Bool<'ctx>, i32)> = items.iter().map(|b| (b, 1)).collect();
    Bool::pb_eq(ctx, &weighted, k)
}

/// Outcome of an incremental check. `Exhausted` covers timeout and memory
/// limits; `Failed` covers any other reason the backend gave up. Callers
/// treat both as unsat.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SolveOutcome {
    Sat,
    Unsat,
    Exhausted,
    Failed(String),
}

/// Single-owner handle on an incremental solver. All access to the solver of
/// a behaviour space is serialised through one of these.
pub struct SmtSolver<'ctx> {
    ctx: &'ctx Context,
    inner: Solver<'ctx>,
}

impl<'ctx> SmtSolver<'ctx> {
    pub fn new(ctx: &'ctx Context) -> SmtSolver<'ctx> {
        SmtSolver {
            ctx,
            inner: Solver::new(ctx),
        }
    }

    pub fn assert_all(&mut self, assertions: &[Bool<'ctx>]) {
        for a in assertions {
            self.inner.assert(a);
        }
    }

    /// Applies per-call resource limits. The timeout is in milliseconds, the
    /// memory limit in megabytes.
    pub fn set_limits(&mut self, timeout_ms: u32, memory_mb: u32) {
        let mut params = Params::new(self.ctx);
        params.set_u32("timeout", timeout_ms);
        params.set_u32("max_memory", memory_mb);
        self.inner.set_params(&params);
    }

    /// Incremental check under the given assumptions. Assumptions are scoped
    /// to this single call and never persist.
    pub fn check(&mut self, assumptions: &[Bool<'ctx>]) -> SolveOutcome {
        match self.inner.check_assumptions(assumptions) {
            SatResult::Sat => SolveOutcome::Sat,
            SatResult::Unsat => SolveOutcome::Unsat,
            SatResult::Unknown => {
                let reason = self.inner.get_reason_unknown().unwrap_or_default();
                if reason.contains("timeout")
                    || reason.contains("canceled")
                    || reason.contains("max. memory")
                    || reason.contains("memory")
                {
                    warn!("solver exhausted its resource budget: {reason}");
                    SolveOutcome::Exhausted
                } else {
                    warn!("solver gave up: {reason}");
                    SolveOutcome::Failed(reason)
                }
            }
        }
    }

    pub fn model(&self) -> Option<Model<'ctx>> {
        self.inner.get_model()
    }

    pub fn push(&mut self) {
        self.inner.push();
    }

    pub fn pop(&mut self) {
        self.inner.pop(1);
    }

    /// Discards the solver state and reloads the given permanent context.
    pub fn reset(&mut self, assertions: &[Bool<'ctx>]) {
        self.inner = Solver::new(self.ctx);
        self.assert_all(assertions);
    }
}

/// Boolean model value, with model completion.
pub fn eval_bool<'ctx>(model: &Model<'ctx>, expr: &Bool<'ctx>) -> bool {
    model
        .eval(expr, true)
        .and_then(|v| v.as_bool())
        .expect("boolean model value not available")
}

/// Integer model value, with model completion.
pub fn eval_i64<'ctx>(model: &Model<'ctx>, expr: &Int<'ctx>) -> i64 {
    model
        .eval(expr, true)
        .and_then(|v| v.as_i64())
        .expect("integer model value not available")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_connectives() {
        let ctx = context();
        let mut solver = SmtSolver::new(&ctx);
        solver.assert_all(&[and_all(&ctx, &[]), or_all(&ctx, &[]).not()]);
        assert_eq!(solver.check(&[]), SolveOutcome::Sat);
    }

    #[test]
    fn pseudo_boolean_cardinality() {
        let ctx = context();
        let a = Bool::new_const(&ctx, "a");
        let b = Bool::new_const(&ctx, "b");
        let mut solver = SmtSolver::new(&ctx);
        solver.assert_all(&[pb_eq(&ctx, &[a.clone(), b.clone()], 1)]);
        assert_eq!(solver.check(&[]), SolveOutcome::Sat);
        let model = solver.model().unwrap();
        assert_ne!(eval_bool(&model, &a), eval_bool(&model, &b));
        assert_eq!(solver.check(&[a.clone(), b.clone()]), SolveOutcome::Unsat);
    }

    #[test]
    fn assumptions_do_not_persist() {
        let ctx = context();
        let a = Bool::new_const(&ctx, "a");
        let mut solver = SmtSolver::new(&ctx);
        assert_eq!(solver.check(&[a.not()]), SolveOutcome::Sat);
        assert_eq!(solver.check(&[a.clone()]), SolveOutcome::Sat);
    }
}
