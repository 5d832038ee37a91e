//! End-to-end scenarios for the forbidden-behaviour planner.

use diverse_planners::encode::EncoderKind;
use diverse_planners::features::FeatureSpec;
use diverse_planners::{smt, Config, Error, ForbidBehaviourIterative, UniformCostSeed};
use diverse_planning::demo;
use diverse_planning::plan::{ActionInstance, SequentialPlan};
use diverse_planning::search::optimal_plan_search;
use diverse_planning::simulate::{achieves_goals, simulate};
use diverse_planning::task::{Condition, GroundedTask, Literal};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

fn data(file: &str) -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data")).join(file)
}

fn assert_pairwise_distinct_sequences(plans: &[diverse_planners::SmtPlan<'_>]) {
    let signatures: HashSet<String> = plans.iter().map(|p| p.plan.signature()).collect();
    assert_eq!(signatures.len(), plans.len(), "plans repeat an action sequence");
}

fn run_planner(
    task: GroundedTask,
    cfg: Config,
    k: usize,
) -> (Vec<SequentialPlan>, Vec<String>, Arc<GroundedTask>) {
    let task = Arc::new(task);
    let ctx = smt::context();
    let mut planner =
        ForbidBehaviourIterative::new(&ctx, task.clone(), cfg, &UniformCostSeed).unwrap();
    planner.plan(k);
    assert_pairwise_distinct_sequences(planner.plans());
    let plans = planner.plans().iter().map(|p| p.plan.clone()).collect();
    let behaviours = planner
        .plans()
        .iter()
        .map(|p| p.behaviour_str.clone())
        .collect();
    (plans, behaviours, task)
}

#[test]
fn blocksworld_goal_ordering_yields_two_behaviours() {
    let cfg = Config {
        features: vec![FeatureSpec::GoalOrdering],
        ..Default::default()
    };
    let (plans, behaviours, task) = run_planner(demo::blocksworld(4), cfg, 2);
    assert_eq!(plans.len(), 2);
    assert_ne!(behaviours[0], behaviours[1]);
    for plan in &plans {
        assert_eq!(plan.len(), 4);
        assert!(achieves_goals(&task, plan));
    }
}

#[test]
fn all_encoders_agree_on_blocksworld() {
    for kind in [EncoderKind::Seq, EncoderKind::Forall, EncoderKind::Qfuf] {
        let cfg = Config {
            encoder: kind,
            features: vec![FeatureSpec::GoalOrdering],
            ..Default::default()
        };
        let (plans, behaviours, task) = run_planner(demo::blocksworld(4), cfg, 2);
        assert_eq!(plans.len(), 2, "encoder {kind} found too few plans");
        assert_ne!(behaviours[0], behaviours[1]);
        for plan in &plans {
            assert!(
                achieves_goals(&task, plan),
                "encoder {kind} produced an invalid plan: {plan}"
            );
        }
    }
}

#[test]
fn r2e_produces_valid_plans() {
    // several actions may share a step under r2e, so distinct behaviours do
    // not always linearise into distinct action sequences; the plan count
    // may legitimately fall short of k
    let cfg = Config {
        encoder: EncoderKind::R2e,
        features: vec![FeatureSpec::GoalOrdering],
        ..Default::default()
    };
    let (plans, _, task) = run_planner(demo::blocksworld(4), cfg, 2);
    assert!(!plans.is_empty());
    assert!(plans.len() <= 2);
    for plan in &plans {
        assert!(achieves_goals(&task, plan), "invalid r2e plan: {plan}");
    }
}

#[test]
fn k_one_with_tight_quality_returns_the_seed_plan() {
    let task = demo::blocksworld(4);
    let seed = optimal_plan_search(&task).unwrap();
    let cfg = Config {
        features: vec![FeatureSpec::GoalOrdering],
        ..Default::default()
    };
    let (plans, _, _) = run_planner(task, cfg, 1);
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].signature(), seed.signature());
}

#[test]
fn k_zero_returns_no_plans() {
    let cfg = Config {
        features: vec![FeatureSpec::GoalOrdering],
        ..Default::default()
    };
    let task = Arc::new(demo::blocksworld(4));
    let ctx = smt::context();
    let mut planner = ForbidBehaviourIterative::new(&ctx, task, cfg, &UniformCostSeed).unwrap();
    assert!(planner.plan(0).is_empty());
}

#[test]
fn quality_below_one_is_unsat_but_not_an_error() {
    let cfg = Config {
        quality_bound_factor: 0.5,
        features: vec![FeatureSpec::GoalOrdering],
        ..Default::default()
    };
    let (plans, _, _) = run_planner(demo::blocksworld(4), cfg, 3);
    assert!(plans.is_empty());
}

#[test]
fn rovers_resource_count_covers_two_values() {
    let cfg = Config {
        quality_bound_factor: 1.2,
        features: vec![FeatureSpec::ResourceCount {
            spec: data("rovers.resources"),
        }],
        ..Default::default()
    };
    let (plans, behaviours, task) = run_planner(demo::rovers(), cfg, 3);
    assert_eq!(plans.len(), 3);
    for plan in &plans {
        assert!(achieves_goals(&task, plan));
    }
    let distinct: HashSet<&String> = behaviours.iter().collect();
    assert!(distinct.len() >= 2);
    assert!(behaviours.iter().any(|b| b == "ru:1"));
    assert!(behaviours.iter().any(|b| b == "ru:2"));
}

#[test]
fn oversubscription_partitions_by_cost_and_utility() {
    let cfg = Config {
        upper_bound: 4,
        quality_bound_factor: 0.5,
        // validation applies to oversubscription plans like any other
        run_plan_validation: true,
        features: vec![FeatureSpec::MakespanBound, FeatureSpec::UtilityValue],
        ..Default::default()
    };
    let (plans, behaviours, task) = run_planner(demo::oversub_logistics(), cfg, 4);
    assert_eq!(plans.len(), 4);
    let distinct: HashSet<&String> = behaviours.iter().collect();
    assert_eq!(distinct.len(), 4, "behaviour pairs must be unique");
    for plan in &plans {
        // cost bounded by floor(q * H) = 2
        assert!(plan.len() <= 2, "plan exceeds the cost bound: {plan}");
        let states = simulate(&task, plan).unwrap();
        let last = states.last().unwrap();
        let utility: i64 = task
            .oversubscription_goals()
            .unwrap()
            .iter()
            .filter(|(g, _)| last.satisfies(g))
            .map(|(_, u)| *u)
            .sum();
        assert!(utility > 0);
    }
}

#[test]
fn numeric_rover_separates_energy_boxes() {
    let cfg = Config {
        quality_bound_factor: 3.0,
        features: vec![FeatureSpec::FunctionBox {
            spec: data("numeric.functions"),
        }],
        ..Default::default()
    };
    let (plans, behaviours, task) = run_planner(demo::numeric_rover(), cfg, 3);
    assert_eq!(plans.len(), 3);
    let distinct: HashSet<&String> = behaviours.iter().collect();
    assert_eq!(distinct.len(), 3);
    for (plan, behaviour) in plans.iter().zip(&behaviours) {
        assert!(achieves_goals(&task, plan));
        let states = simulate(&task, plan).unwrap();
        let energy = states.last().unwrap().value(task.num_fluent_id("energy").unwrap());
        let expected_box = (energy / 25).clamp(0, 3);
        assert_eq!(behaviour, &format!("fn:energy={expected_box}"));
    }
}

#[test]
fn single_behaviour_task_falls_back_to_phase_two() {
    // one goal means nothing to order: every plan shares the one behaviour
    let cfg = Config {
        quality_bound_factor: 2.0,
        features: vec![FeatureSpec::GoalOrdering],
        ..Default::default()
    };
    let (plans, behaviours, task) = run_planner(demo::blocksworld(2), cfg, 5);
    // one 2-step plan and two 4-step plans exist within the horizon
    assert_eq!(plans.len(), 3);
    let distinct: HashSet<&String> = behaviours.iter().collect();
    assert_eq!(distinct.len(), 1);
    for plan in &plans {
        assert!(achieves_goals(&task, plan));
    }
}

#[test]
fn landmark_ordering_diversifies_block_handling() {
    let task = demo::blocksworld(4);
    let holding_a = Condition::Lit(Literal::pos(task.fluent_id("holding_a").unwrap()));
    let holding_c = Condition::Lit(Literal::pos(task.fluent_id("holding_c").unwrap()));
    let cfg = Config {
        features: vec![FeatureSpec::LandmarkOrdering {
            landmarks: vec![holding_a, holding_c],
        }],
        ..Default::default()
    };
    let (plans, behaviours, task) = run_planner(task, cfg, 2);
    assert_eq!(plans.len(), 2);
    assert_ne!(behaviours[0], behaviours[1]);
    for plan in &plans {
        assert!(achieves_goals(&task, plan));
    }
}

#[test]
fn unique_optimal_plan_exhausts_both_phases() {
    // the Sussman anomaly admits exactly one optimal plan and one goal order
    let cfg = Config {
        features: vec![FeatureSpec::GoalOrdering],
        ..Default::default()
    };
    let (plans, _, task) = run_planner(demo::sussman(), cfg, 3);
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].len(), 6);
    assert!(achieves_goals(&task, &plans[0]));
}

#[test]
fn trivial_task_yields_exactly_the_empty_plan() {
    let cfg = Config {
        features: vec![FeatureSpec::GoalOrdering],
        ..Default::default()
    };
    let (plans, _, _) = run_planner(demo::trivial(), cfg, 3);
    assert_eq!(plans.len(), 1);
    assert!(plans[0].is_empty());
}

#[test]
fn behaviours_only_skips_phase_two() {
    let cfg = Config {
        quality_bound_factor: 2.0,
        behaviours_only: true,
        features: vec![FeatureSpec::GoalOrdering],
        ..Default::default()
    };
    let (plans, _, _) = run_planner(demo::blocksworld(2), cfg, 5);
    assert_eq!(plans.len(), 1);
}

#[test]
fn r2e_rejects_oversubscription() {
    let cfg = Config {
        encoder: EncoderKind::R2e,
        upper_bound: 4,
        features: vec![FeatureSpec::UtilityValue],
        ..Default::default()
    };
    let task = Arc::new(demo::oversub_logistics());
    let ctx = smt::context();
    match ForbidBehaviourIterative::new(&ctx, task, cfg, &UniformCostSeed) {
        Err(Error::UnsupportedEncoding(_)) => {}
        other => panic!("expected UnsupportedEncoding, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn seedless_task_reports_no_seed_plan() {
    // an unsolvable classical task: the goal fluent can never become true
    struct NoPlan;
    impl diverse_planners::SeedPlanner for NoPlan {
        fn solve(&self, _: &GroundedTask) -> Option<SequentialPlan> {
            None
        }
    }
    let cfg = Config {
        features: vec![FeatureSpec::GoalOrdering],
        ..Default::default()
    };
    let task = Arc::new(demo::blocksworld(4));
    let ctx = smt::context();
    match ForbidBehaviourIterative::new(&ctx, task, cfg, &NoPlan) {
        Err(Error::NoSeedPlan) => {}
        other => panic!("expected NoSeedPlan, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_plan_round_trip_is_stable() {
    use diverse_planners::features::FeatureContext;
    use diverse_planners::space::{BehaviourSpace, SpaceConfig};

    let task = Arc::new(demo::rovers());
    let ctx = smt::context();
    let space_cfg = SpaceConfig {
        encoder: EncoderKind::Seq,
        horizon: 2,
        disable_after_goal_state_actions: false,
        horizon_planning: false,
        run_plan_validation: false,
        solver_timeout_ms: 300_000,
        solver_memory_limit_mb: 16_000,
    };
    let info = FeatureContext {
        optimal_plan_length: 2,
        quality_bound_factor: 1.0,
    };
    let specs = vec![FeatureSpec::ResourceCount {
        spec: data("rovers.resources"),
    }];
    let mut space = BehaviourSpace::new(&ctx, task, &space_cfg, &specs, &info).unwrap();

    let plan = SequentialPlan::new(vec![
        ActionInstance::new("collect", &["rover0", "sample0"]),
        ActionInstance::new("collect", &["rover0", "sample1"]),
    ]);
    let first = space.test_plan(&plan).unwrap().unwrap();
    assert_eq!(first.plan.signature(), plan.signature());
    assert_eq!(first.behaviour_str, "ru:1");

    // re-reading the same plan produces a byte-identical behaviour string
    let second = space.test_plan(&plan).unwrap().unwrap();
    assert_eq!(second.behaviour_str, first.behaviour_str);
    assert_eq!(space.behaviour_count(), 1);
}
