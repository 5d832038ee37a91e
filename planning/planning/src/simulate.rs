//! Forward simulation of sequential plans against a grounded task.

use crate::plan::SequentialPlan;
use crate::state::State;
use crate::task::GroundedTask;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("step {step}: unknown action {name}")]
    UnknownAction { step: usize, name: String },
    #[error("step {step}: action {name} is not applicable")]
    Inapplicable { step: usize, name: String },
}

/// Executes the plan from the initial state and returns the visited states,
/// `states[0]` being the initial state and `states[i + 1]` the state after
/// the i-th action.
pub fn simulate(task: &GroundedTask, plan: &SequentialPlan) -> Result<Vec<State>, SimError> {
    let mut states = Vec::with_capacity(plan.len() + 1);
    let mut current = task.init.clone();
    states.push(current.clone());
    for (step, instance) in plan.actions.iter().enumerate() {
        let name = instance.full_name();
        let id = task
            .action_id(&name)
            .ok_or_else(|| SimError::UnknownAction {
                step,
                name: name.clone(),
            })?;
        let action = task.action(id);
        if !current.applicable(action) {
            return Err(SimError::Inapplicable { step, name });
        }
        current.apply(action);
        states.push(current.clone());
    }
    Ok(states)
}

/// Whether the plan is executable and ends in a state satisfying all goals.
pub fn achieves_goals(task: &GroundedTask, plan: &SequentialPlan) -> bool {
    match simulate(task, plan) {
        Ok(states) => states
            .last()
            .map(|s| s.entails_all(&task.goals))
            .unwrap_or(false),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo;
    use crate::plan::ActionInstance;

    #[test]
    fn blocksworld_plan_executes() {
        let task = demo::blocksworld(4);
        let plan = SequentialPlan::new(vec![
            ActionInstance::new("pickup", &["a"]),
            ActionInstance::new("stack", &["a", "b"]),
            ActionInstance::new("pickup", &["c"]),
            ActionInstance::new("stack", &["c", "d"]),
        ]);
        let states = simulate(&task, &plan).unwrap();
        assert_eq!(states.len(), 5);
        assert!(achieves_goals(&task, &plan));
    }

    #[test]
    fn inapplicable_action_is_reported() {
        let task = demo::blocksworld(4);
        let plan = SequentialPlan::new(vec![ActionInstance::new("stack", &["a", "b"])]);
        match simulate(&task, &plan) {
            Err(SimError::Inapplicable { step: 0, .. }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
