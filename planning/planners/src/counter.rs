//! Model-free behaviour counting over externally produced plans.
//!
//! Each plan is simulated forward through the task's transition function and
//! every feature's simulator twin turns the state sequence into a string
//! fingerprint, using the same discretisation as the symbolic features.
//! Plans are then grouped by fingerprint, which supports counting distinct
//! behaviours and selecting a diverse subset of `k` plans.

use crate::features::{spec_file, FeatureSpec};
use crate::Result;
use diverse_planning::plan::SequentialPlan;
use diverse_planning::simulate::simulate;
use diverse_planning::state::State;
use diverse_planning::task::GroundedTask;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::warn;

/// Simulator twin of a behaviour feature.
enum SimFeature {
    GoalOrdering,
    Cost,
    ResourceCount { resources: Vec<String> },
    UtilityValue,
    FunctionBox { specs: Vec<spec_file::SpecLine> },
}

impl SimFeature {
    /// Builds the twin of a symbolic feature, if one exists. Landmark
    /// ordering and utility-set have no simulator counterpart.
    fn from_spec(spec: &FeatureSpec) -> Result<Option<SimFeature>> {
        Ok(match spec {
            FeatureSpec::GoalOrdering => Some(SimFeature::GoalOrdering),
            FeatureSpec::MakespanBound => Some(SimFeature::Cost),
            FeatureSpec::ResourceCount { spec } => {
                let resources = spec_file::parse_path(spec, "resource")?
                    .into_iter()
                    .map(|l| l.name)
                    .collect();
                Some(SimFeature::ResourceCount { resources })
            }
            FeatureSpec::UtilityValue => Some(SimFeature::UtilityValue),
            FeatureSpec::FunctionBox { spec } => Some(SimFeature::FunctionBox {
                specs: spec_file::parse_path(spec, "function")?,
            }),
            FeatureSpec::LandmarkOrdering { .. } | FeatureSpec::UtilitySet => None,
        })
    }

    fn fingerprint(&self, task: &GroundedTask, plan: &SequentialPlan, states: &[State]) -> String {
        match self {
            SimFeature::GoalOrdering => {
                // goals sorted by the step of their first achievement
                let mut achieved: Vec<(usize, String)> = task
                    .goals
                    .iter()
                    .map(|g| {
                        let first = states
                            .iter()
                            .position(|s| s.satisfies(g))
                            .unwrap_or(usize::MAX);
                        (first, g.format(task))
                    })
                    .collect();
                achieved.sort();
                let order: Vec<String> = achieved.into_iter().map(|(_, name)| name).collect();
                format!("gpo:{}", order.join("->"))
            }
            SimFeature::Cost => format!("cb:{}", plan.len()),
            SimFeature::ResourceCount { resources } => {
                let used = resources
                    .iter()
                    .filter(|r| {
                        plan.actions
                            .iter()
                            .any(|a| a.params.iter().any(|p| p == *r))
                    })
                    .count();
                format!("rc:{used}")
            }
            SimFeature::UtilityValue => {
                let last = states.last().expect("simulation keeps the initial state");
                let total: i64 = task
                    .oversubscription_goals()
                    .unwrap_or(&[])
                    .iter()
                    .filter(|(g, _)| last.satisfies(g))
                    .map(|(_, u)| *u)
                    .sum();
                format!("uv:{total}")
            }
            SimFeature::FunctionBox { specs } => {
                let last = states.last().expect("simulation keeps the initial state");
                let parts: Vec<String> = specs
                    .iter()
                    .filter_map(|line| {
                        let id = task.num_fluent_id(&line.name)?;
                        let value = last.value(id);
                        let span = line.max - line.min;
                        let boxes = (span / line.delta).max(1);
                        let idx = ((value - line.min) / line.delta).clamp(0, boxes - 1);
                        Some(format!("{}={idx}", line.name))
                    })
                    .collect();
                format!("fn:{}", parts.join(","))
            }
        }
    }
}

/// Behaviour counter over a fixed plan list.
pub struct BehaviourCount {
    /// Fingerprint buckets in insertion order; within a bucket, plans keep
    /// their insertion order too.
    buckets: Vec<(String, VecDeque<SequentialPlan>)>,
    behaviours: HashSet<String>,
}

impl BehaviourCount {
    pub fn new(
        task: &Arc<GroundedTask>,
        plans: &[SequentialPlan],
        specs: &[FeatureSpec],
    ) -> Result<BehaviourCount> {
        let mut features = Vec::new();
        for spec in specs {
            if let Some(f) = SimFeature::from_spec(spec)? {
                features.push(f);
            }
        }

        let mut counter = BehaviourCount {
            buckets: Vec::new(),
            behaviours: HashSet::new(),
        };
        for plan in plans {
            let states = match simulate(task, plan) {
                Ok(states) => states,
                Err(e) => {
                    warn!("dropping unexecutable plan: {e}");
                    continue;
                }
            };
            let fingerprint = features
                .iter()
                .map(|f| f.fingerprint(task, plan, &states))
                .collect::<Vec<_>>()
                .join(" $$ ");
            counter.behaviours.insert(fingerprint.clone());
            match counter
                .buckets
                .iter_mut()
                .find(|(key, _)| *key == fingerprint)
            {
                Some((_, bucket)) => bucket.push_back(plan.clone()),
                None => counter
                    .buckets
                    .push((fingerprint, VecDeque::from(vec![plan.clone()]))),
            }
        }
        Ok(counter)
    }

    /// Number of distinct behaviours among the supplied plans.
    pub fn count(&self) -> usize {
        self.behaviours.len()
    }

    /// Selects up to `k` plans, round-robin over the behaviour buckets in
    /// insertion order, taking each bucket's plans in insertion order.
    pub fn select_k(&mut self, k: usize) -> Vec<SequentialPlan> {
        let mut selected = Vec::new();
        while selected.len() < k && self.buckets.iter().any(|(_, b)| !b.is_empty()) {
            for (_, bucket) in self.buckets.iter_mut() {
                if selected.len() >= k {
                    break;
                }
                if let Some(plan) = bucket.pop_front() {
                    selected.push(plan);
                }
            }
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diverse_planning::demo;
    use diverse_planning::plan::ActionInstance;
    use std::path::PathBuf;

    fn rovers_resources() -> PathBuf {
        PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/data/rovers.resources"
        ))
    }

    fn collect(rover: &str, sample: &str) -> ActionInstance {
        ActionInstance::new("collect", &[rover, sample])
    }

    #[test]
    fn counts_resource_behaviours_and_selects_across_buckets() {
        let task = Arc::new(demo::rovers());
        let plans = vec![
            SequentialPlan::new(vec![
                collect("rover0", "sample0"),
                collect("rover0", "sample1"),
            ]),
            SequentialPlan::new(vec![
                collect("rover0", "sample0"),
                collect("rover1", "sample1"),
            ]),
            SequentialPlan::new(vec![
                collect("rover1", "sample0"),
                collect("rover0", "sample1"),
            ]),
        ];
        let specs = vec![FeatureSpec::ResourceCount {
            spec: rovers_resources(),
        }];
        let mut counter = BehaviourCount::new(&task, &plans, &specs).unwrap();
        assert_eq!(counter.count(), 2);
        let picked = counter.select_k(3);
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn selection_within_a_bucket_follows_insertion_order() {
        let task = Arc::new(demo::rovers());
        // all three plans share the rc:1 fingerprint
        let first = SequentialPlan::new(vec![
            collect("rover0", "sample0"),
            collect("rover0", "sample1"),
        ]);
        let second = SequentialPlan::new(vec![
            collect("rover0", "sample1"),
            collect("rover0", "sample0"),
        ]);
        let third = SequentialPlan::new(vec![
            collect("rover1", "sample0"),
            collect("rover1", "sample1"),
        ]);
        let plans = vec![first.clone(), second.clone(), third];
        let specs = vec![FeatureSpec::ResourceCount {
            spec: rovers_resources(),
        }];
        let mut counter = BehaviourCount::new(&task, &plans, &specs).unwrap();
        assert_eq!(counter.count(), 1);
        assert_eq!(counter.select_k(1), vec![first]);
        assert_eq!(counter.select_k(1), vec![second]);
    }

    #[test]
    fn unexecutable_plans_are_dropped() {
        let task = Arc::new(demo::rovers());
        // the second collect targets an already taken sample
        let plans = vec![SequentialPlan::new(vec![
            collect("rover0", "sample0"),
            collect("rover1", "sample0"),
        ])];
        let specs = vec![FeatureSpec::ResourceCount {
            spec: rovers_resources(),
        }];
        let counter = BehaviourCount::new(&task, &plans, &specs).unwrap();
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn goal_ordering_fingerprints_follow_achievement_order() {
        let task = Arc::new(demo::rovers());
        let p1 = SequentialPlan::new(vec![
            collect("rover0", "sample0"),
            collect("rover0", "sample1"),
        ]);
        let p2 = SequentialPlan::new(vec![
            collect("rover0", "sample1"),
            collect("rover0", "sample0"),
        ]);
        let counter =
            BehaviourCount::new(&task, &[p1, p2], &[FeatureSpec::GoalOrdering]).unwrap();
        assert_eq!(counter.count(), 2);
    }
}
