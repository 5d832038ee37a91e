//! Built-in demo problems.
//!
//! Small grounded tasks used by the integration tests and the command-line
//! binary. They stand in for the upstream grounding pipeline, which is not
//! part of this repository.

use crate::task::{
    Condition, GroundedAction, GroundedTask, Literal, NumCond, NumEffect, NumOp, NumRel,
    QualityMetric, TaskBuilder,
};

fn block_names(n: usize) -> Vec<String> {
    assert!((2..=26).contains(&n), "supported block counts are 2..=26");
    (0..n).map(|i| ((b'a' + i as u8) as char).to_string()).collect()
}

fn blocksworld_task(n: usize, sussman_start: bool) -> GroundedTask {
    let names = block_names(n);
    let mut b = TaskBuilder::new();
    let blocks: Vec<_> = names.iter().map(|x| b.object(x, "block")).collect();

    let handempty = b.fluent("handempty");
    let ontable: Vec<_> = names.iter().map(|x| b.fluent(&format!("ontable_{x}"))).collect();
    let clear: Vec<_> = names.iter().map(|x| b.fluent(&format!("clear_{x}"))).collect();
    let holding: Vec<_> = names.iter().map(|x| b.fluent(&format!("holding_{x}"))).collect();
    let mut on = vec![vec![None; n]; n];
    for x in 0..n {
        for y in 0..n {
            if x != y {
                on[x][y] = Some(b.fluent(&format!("on_{}_{}", names[x], names[y])));
            }
        }
    }

    b.init(handempty);
    if sussman_start {
        // c sits on a; a and b are on the table
        b.init(ontable[0]);
        b.init(ontable[1]);
        b.init(clear[1]);
        b.init(clear[2]);
        b.init(on[2][0].unwrap());
    } else {
        for x in 0..n {
            b.init(ontable[x]);
            b.init(clear[x]);
        }
    }

    for x in 0..n {
        b.action(GroundedAction {
            name: "pickup".to_string(),
            params: vec![blocks[x]],
            precond: vec![
                Literal::pos(clear[x]),
                Literal::pos(ontable[x]),
                Literal::pos(handempty),
            ],
            num_precond: vec![],
            add: vec![holding[x]],
            del: vec![ontable[x], clear[x], handempty],
            num_effects: vec![],
        });
        b.action(GroundedAction {
            name: "putdown".to_string(),
            params: vec![blocks[x]],
            precond: vec![Literal::pos(holding[x])],
            num_precond: vec![],
            add: vec![ontable[x], clear[x], handempty],
            del: vec![holding[x]],
            num_effects: vec![],
        });
        for y in 0..n {
            if x == y {
                continue;
            }
            let on_x_y = on[x][y].unwrap();
            b.action(GroundedAction {
                name: "stack".to_string(),
                params: vec![blocks[x], blocks[y]],
                precond: vec![Literal::pos(holding[x]), Literal::pos(clear[y])],
                num_precond: vec![],
                add: vec![on_x_y, clear[x], handempty],
                del: vec![holding[x], clear[y]],
                num_effects: vec![],
            });
            b.action(GroundedAction {
                name: "unstack".to_string(),
                params: vec![blocks[x], blocks[y]],
                precond: vec![
                    Literal::pos(on_x_y),
                    Literal::pos(clear[x]),
                    Literal::pos(handempty),
                ],
                num_precond: vec![],
                add: vec![holding[x], clear[y]],
                del: vec![on_x_y, clear[x], handempty],
                num_effects: vec![],
            });
        }
    }

    if sussman_start {
        b.goal(Condition::Lit(Literal::pos(on[0][1].unwrap())));
        b.goal(Condition::Lit(Literal::pos(on[1][2].unwrap())));
    } else {
        for pair in (0..n / 2).map(|i| (2 * i, 2 * i + 1)) {
            b.goal(Condition::Lit(Literal::pos(on[pair.0][pair.1].unwrap())));
        }
    }
    b.metric(QualityMetric::PlanLength);
    b.build().expect("demo task construction")
}

/// Blocksworld with `n` blocks, all initially on the table. The goals are
/// `on(a, b)`, `on(c, d)`, ... over consecutive pairs, so that goal orders
/// can be permuted freely within optimal plans.
pub fn blocksworld(n: usize) -> GroundedTask {
    blocksworld_task(n, false)
}

/// The Sussman anomaly: three blocks, `c` initially on `a`, goals
/// `on(a, b)` and `on(b, c)`. The optimal plan has six steps and a unique
/// goal-achievement order.
pub fn sussman() -> GroundedTask {
    blocksworld_task(3, true)
}

/// Two rovers and two samples; either rover can collect either sample, so
/// plans differ in how many rovers they use.
pub fn rovers() -> GroundedTask {
    let mut b = TaskBuilder::new();
    let rovers: Vec<_> = (0..2).map(|i| b.object(&format!("rover{i}"), "rover")).collect();
    let samples: Vec<_> = (0..2)
        .map(|i| b.object(&format!("sample{i}"), "sample"))
        .collect();
    let available: Vec<_> = (0..2)
        .map(|i| b.fluent(&format!("available_sample{i}")))
        .collect();
    let have: Vec<_> = (0..2).map(|i| b.fluent(&format!("have_sample{i}"))).collect();
    for s in 0..2 {
        b.init(available[s]);
    }
    for r in 0..2 {
        for s in 0..2 {
            b.action(GroundedAction {
                name: "collect".to_string(),
                params: vec![rovers[r], samples[s]],
                precond: vec![Literal::pos(available[s])],
                num_precond: vec![],
                add: vec![have[s]],
                del: vec![available[s]],
                num_effects: vec![],
            });
        }
    }
    for s in 0..2 {
        b.goal(Condition::Lit(Literal::pos(have[s])));
    }
    b.metric(QualityMetric::PlanLength);
    b.build().expect("demo task construction")
}

/// Oversubscription delivery task: three packages with utilities 2, 4 and 6;
/// no hard goals.
pub fn oversub_logistics() -> GroundedTask {
    let mut b = TaskBuilder::new();
    let utilities = [2i64, 4, 6];
    let mut goals = Vec::new();
    for (i, u) in utilities.iter().enumerate() {
        let pkg = b.object(&format!("pkg{}", i + 1), "package");
        let at_depot = b.fluent(&format!("at_depot_pkg{}", i + 1));
        let delivered = b.fluent(&format!("delivered_pkg{}", i + 1));
        b.init(at_depot);
        b.action(GroundedAction {
            name: "deliver".to_string(),
            params: vec![pkg],
            precond: vec![Literal::pos(at_depot)],
            num_precond: vec![],
            add: vec![delivered],
            del: vec![at_depot],
            num_effects: vec![],
        });
        goals.push((Condition::Lit(Literal::pos(delivered)), *u));
    }
    b.metric(QualityMetric::Oversubscription(goals));
    b.build().expect("demo task construction")
}

/// A rover on four waypoints with an energy budget. The waypoint graph has
/// shortcuts, so routes of different lengths reach the goal with different
/// residual energy.
pub fn numeric_rover() -> GroundedTask {
    let mut b = TaskBuilder::new();
    let n = 4;
    let wps: Vec<_> = (0..n).map(|i| b.object(&format!("w{i}"), "waypoint")).collect();
    let at: Vec<_> = (0..n).map(|i| b.fluent(&format!("at_w{i}"))).collect();
    let energy = b.num_fluent("energy", 100);
    b.init(at[0]);
    let edges = [(0, 1), (1, 2), (2, 3), (0, 2), (0, 3)];
    for &(x, y) in &edges {
        for (from, to) in [(x, y), (y, x)] {
            b.action(GroundedAction {
                name: "move".to_string(),
                params: vec![wps[from], wps[to]],
                precond: vec![Literal::pos(at[from])],
                num_precond: vec![NumCond {
                    fluent: energy,
                    rel: NumRel::Ge,
                    value: 25,
                }],
                add: vec![at[to]],
                del: vec![at[from]],
                num_effects: vec![NumEffect {
                    fluent: energy,
                    op: NumOp::Decrease,
                    amount: 25,
                }],
            });
        }
    }
    b.goal(Condition::Lit(Literal::pos(at[3])));
    b.metric(QualityMetric::PlanLength);
    b.build().expect("demo task construction")
}

/// A task whose single goal already holds in the initial state. The only
/// action destroys the goal, so the empty plan is the only solution.
pub fn trivial() -> GroundedTask {
    let mut b = TaskBuilder::new();
    b.object("unit", "token");
    let done = b.fluent("done");
    b.init(done);
    b.action(GroundedAction {
        name: "undo".to_string(),
        params: vec![],
        precond: vec![Literal::pos(done)],
        num_precond: vec![],
        add: vec![],
        del: vec![done],
        num_effects: vec![],
    });
    b.goal(Condition::Lit(Literal::pos(done)));
    b.metric(QualityMetric::PlanLength);
    b.build().expect("demo task construction")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_tasks_are_well_formed() {
        assert_eq!(blocksworld(4).goals.len(), 2);
        assert_eq!(sussman().goals.len(), 2);
        assert!(oversub_logistics().is_oversubscription());
        assert_eq!(numeric_rover().num_fluents.len(), 1);
        assert!(trivial().init.entails_all(&trivial().goals));
    }

    #[test]
    fn resource_lookup_matches_rover_actions() {
        let task = rovers();
        assert_eq!(task.actions_using_object("rover0").len(), 2);
        assert_eq!(task.actions_using_object("nonexistent").len(), 0);
    }
}
