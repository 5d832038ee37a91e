//! Uniform-cost forward search used to obtain an optimal seed plan.
//!
//! The behaviour space needs the optimal plan length of the task to fix its
//! horizon. On unit-cost grounded tasks a breadth-first exploration of the
//! state space is sufficient and keeps this crate free of any heuristic
//! machinery; an external optimal planner can be substituted at the
//! `SeedPlanner` seam of the planners crate.

use crate::plan::{ActionInstance, SequentialPlan};
use crate::state::State;
use crate::task::{ActionId, GroundedTask};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

/// A node in the search space.
struct Node {
    state: State,
    parent: Option<Rc<Node>>,
    /// Action applied to reach this node from its parent.
    step: Option<ActionId>,
}

impl Node {
    fn extract_plan(&self, task: &GroundedTask) -> SequentialPlan {
        let mut ids = Vec::new();
        let mut curr = self;
        while let Some(parent) = &curr.parent {
            ids.push(curr.step.expect("non-root node without a step"));
            curr = parent;
        }
        ids.reverse();
        let actions = ids
            .into_iter()
            .map(|id| {
                let a = task.action(id);
                ActionInstance {
                    name: a.name.clone(),
                    params: a
                        .params
                        .iter()
                        .map(|&o| task.objects[usize::from(o)].name.clone())
                        .collect(),
                }
            })
            .collect();
        SequentialPlan::new(actions)
    }
}

/// Breadth-first search for a shortest plan. Returns `None` if the search
/// space is exhausted without reaching a goal state.
pub fn optimal_plan_search(task: &GroundedTask) -> Option<SequentialPlan> {
    let init = Rc::new(Node {
        state: task.init.clone(),
        parent: None,
        step: None,
    });
    if init.state.entails_all(&task.goals) {
        return Some(SequentialPlan::default());
    }

    let mut queue: VecDeque<Rc<Node>> = VecDeque::new();
    let mut closed: HashSet<State> = HashSet::new();
    closed.insert(init.state.clone());
    queue.push_back(init);

    while let Some(node) = queue.pop_front() {
        for (i, action) in task.actions.iter().enumerate() {
            if !node.state.applicable(action) {
                continue;
            }
            let mut state = node.state.clone();
            state.apply(action);
            if closed.contains(&state) {
                continue;
            }
            closed.insert(state.clone());
            let succ = Rc::new(Node {
                state,
                parent: Some(node.clone()),
                step: Some(ActionId::from(i)),
            });
            if succ.state.entails_all(&task.goals) {
                return Some(succ.extract_plan(task));
            }
            queue.push_back(succ);
        }
    }

    // search space exhausted without reaching a goal state
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use crate::simulate::achieves_goals;

    #[test]
    fn finds_shortest_blocksworld_plan() {
        let task = demo::blocksworld(4);
        let plan = optimal_plan_search(&task).unwrap();
        assert_eq!(plan.len(), 4);
        assert!(achieves_goals(&task, &plan));
    }

    #[test]
    fn trivial_task_yields_empty_plan() {
        let task = demo::trivial();
        let plan = optimal_plan_search(&task).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn sussman_anomaly_needs_six_steps() {
        let task = demo::sussman();
        let plan = optimal_plan_search(&task).unwrap();
        assert_eq!(plan.len(), 6);
        assert!(achieves_goals(&task, &plan));
    }
}
