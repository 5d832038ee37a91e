//! Concrete states: an assignment to all fluents of a grounded task.

use crate::task::{Condition, FluentId, GroundedAction, Literal, NumFluentId, NumOp, NumRel};
use fixedbitset::FixedBitSet;

/// Association of each fluent to its value.
///
/// The i-th bit of the bitset holds the value of the i-th boolean fluent; the
/// i-th entry of `nums` holds the value of the i-th integer fluent.
#[derive(Clone, Debug, Ord, PartialOrd, PartialEq, Eq, Hash)]
pub struct State {
    bools: FixedBitSet,
    nums: Vec<i64>,
}

impl State {
    pub fn new(num_bools: usize, num_nums: usize) -> State {
        State {
            bools: FixedBitSet::with_capacity(num_bools),
            nums: vec![0; num_nums],
        }
    }

    pub fn is_set(&self, fluent: FluentId) -> bool {
        self.bools.contains(fluent.into())
    }

    pub fn set(&mut self, fluent: FluentId, value: bool) {
        self.bools.set(fluent.into(), value);
    }

    pub fn value(&self, fluent: NumFluentId) -> i64 {
        self.nums[usize::from(fluent)]
    }

    pub fn set_num(&mut self, fluent: NumFluentId, value: i64) {
        self.nums[usize::from(fluent)] = value;
    }

    pub fn holds(&self, lit: Literal) -> bool {
        self.is_set(lit.fluent) == lit.value
    }

    pub fn satisfies(&self, cond: &Condition) -> bool {
        match cond {
            Condition::Lit(l) => self.holds(*l),
            Condition::Num(c) => {
                let v = self.value(c.fluent);
                match c.rel {
                    NumRel::Le => v <= c.value,
                    NumRel::Lt => v < c.value,
                    NumRel::Ge => v >= c.value,
                    NumRel::Gt => v > c.value,
                    NumRel::Eq => v == c.value,
                }
            }
        }
    }

    pub fn entails_all(&self, conds: &[Condition]) -> bool {
        conds.iter().all(|c| self.satisfies(c))
    }

    /// Whether the action's preconditions hold in this state.
    pub fn applicable(&self, action: &GroundedAction) -> bool {
        action.precond.iter().all(|&l| self.holds(l))
            && action.num_precond.iter().all(|&c| self.satisfies(&Condition::Num(c)))
    }

    /// Applies the action's effects in place. Delete effects are applied
    /// before add effects.
    pub fn apply(&mut self, action: &GroundedAction) {
        for &f in &action.del {
            self.set(f, false);
        }
        for &f in &action.add {
            self.set(f, true);
        }
        for e in &action.num_effects {
            let cur = self.value(e.fluent);
            let next = match e.op {
                NumOp::Assign => e.amount,
                NumOp::Increase => cur + e.amount,
                NumOp::Decrease => cur - e.amount,
            };
            self.set_num(e.fluent, next);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::task::{Condition, GroundedAction, Literal, NumCond, NumEffect, NumOp, NumRel};
    use crate::TaskBuilder;

    #[test]
    fn apply_deletes_before_adding() {
        let mut b = TaskBuilder::new();
        let p = b.fluent("p");
        b.init(p);
        let toggle = GroundedAction {
            name: "toggle".to_string(),
            params: vec![],
            precond: vec![Literal::pos(p)],
            num_precond: vec![],
            add: vec![p],
            del: vec![p],
            num_effects: vec![],
        };
        b.action(toggle);
        let task = b.build().unwrap();

        let mut s = task.init.clone();
        assert!(s.applicable(&task.actions[0]));
        s.apply(&task.actions[0]);
        assert!(s.is_set(p));
    }

    #[test]
    fn numeric_conditions_and_effects() {
        let mut b = TaskBuilder::new();
        let energy = b.num_fluent("energy", 50);
        let burn = GroundedAction {
            name: "burn".to_string(),
            params: vec![],
            precond: vec![],
            num_precond: vec![NumCond {
                fluent: energy,
                rel: NumRel::Ge,
                value: 25,
            }],
            add: vec![],
            del: vec![],
            num_effects: vec![NumEffect {
                fluent: energy,
                op: NumOp::Decrease,
                amount: 25,
            }],
        };
        b.action(burn);
        let task = b.build().unwrap();

        let mut s = task.init.clone();
        s.apply(&task.actions[0]);
        assert_eq!(s.value(energy), 25);
        s.apply(&task.actions[0]);
        assert_eq!(s.value(energy), 0);
        assert!(!s.applicable(&task.actions[0]));
        assert!(s.satisfies(&Condition::Num(NumCond {
            fluent: energy,
            rel: NumRel::Eq,
            value: 0,
        })));
    }
}
