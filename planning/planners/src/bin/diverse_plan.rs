//! Command-line front-end over the forbidden-behaviour planner.
//!
//! Runs one of the built-in demo problems and prints each diverse plan with
//! its behaviour string. Exit codes: 0 when at least one plan was found,
//! 1 when none was, 2 on configuration or unsupported-task errors.

use diverse_planners::counter::BehaviourCount;
use diverse_planners::encode::EncoderKind;
use diverse_planners::features::FeatureSpec;
use diverse_planners::{smt, Config, ForbidBehaviourIterative, UniformCostSeed};
use diverse_planning::demo;
use diverse_planning::task::GroundedTask;
use std::sync::Arc;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "diverse-plan", rename_all = "kebab-case")]
struct Opt {
    /// Built-in problem: blocksworld, sussman, rovers, oversub, numeric-rover
    /// or trivial.
    problem: String,

    /// Number of diverse plans to ask for.
    #[structopt(short, default_value = "3")]
    k: usize,

    /// Plan encoder: seq, forall, r2e or qfuf.
    #[structopt(long, default_value = "seq")]
    encoder: EncoderKind,

    /// Multiplier on the optimal plan length.
    #[structopt(long, short = "q", default_value = "1.0")]
    quality_bound_factor: f64,

    /// Horizon ceiling, used directly for oversubscription problems.
    #[structopt(long, default_value = "50")]
    upper_bound: usize,

    /// Stop after phase 1 (distinct behaviours only).
    #[structopt(long)]
    behaviours_only: bool,

    /// Do not keep the seed plan in the result set.
    #[structopt(long)]
    ignore_seed_plan: bool,

    /// Simulate each extracted plan before accepting it.
    #[structopt(long)]
    validate_plans: bool,

    /// Behaviour feature, repeatable: goal-ordering, makespan,
    /// resource-count=FILE, utility-value, utility-set, function-box=FILE.
    #[structopt(long = "feature")]
    features: Vec<String>,

    #[structopt(long, default_value = "300000")]
    solver_timeout_ms: u32,

    #[structopt(long, default_value = "16000")]
    solver_memory_limit_mb: u32,

    /// Cross-check the result with the simulator-based behaviour counter.
    #[structopt(long)]
    count: bool,
}

fn demo_task(name: &str) -> Option<GroundedTask> {
    match name {
        "blocksworld" => Some(demo::blocksworld(4)),
        "sussman" => Some(demo::sussman()),
        "rovers" => Some(demo::rovers()),
        "oversub" => Some(demo::oversub_logistics()),
        "numeric-rover" => Some(demo::numeric_rover()),
        "trivial" => Some(demo::trivial()),
        _ => None,
    }
}

fn run(opt: Opt) -> i32 {
    let Some(task) = demo_task(&opt.problem) else {
        eprintln!(
            "unknown problem '{}'; valid options are: blocksworld, sussman, rovers, oversub, \
             numeric-rover, trivial",
            opt.problem
        );
        return 2;
    };
    let task = Arc::new(task);

    let mut features = Vec::new();
    for raw in &opt.features {
        match FeatureSpec::parse_cli(raw) {
            Ok(spec) => features.push(spec),
            Err(e) => {
                eprintln!("{e}");
                return 2;
            }
        }
    }

    let cfg = Config {
        encoder: opt.encoder,
        upper_bound: opt.upper_bound,
        quality_bound_factor: opt.quality_bound_factor,
        solver_timeout_ms: opt.solver_timeout_ms,
        solver_memory_limit_mb: opt.solver_memory_limit_mb,
        behaviours_only: opt.behaviours_only,
        ignore_seed_plan: opt.ignore_seed_plan,
        run_plan_validation: opt.validate_plans,
        features,
        ..Default::default()
    };

    let ctx = smt::context();
    let mut planner = match ForbidBehaviourIterative::new(&ctx, task.clone(), cfg, &UniformCostSeed)
    {
        Ok(planner) => planner,
        Err(e) => {
            eprintln!("{e}");
            return 2;
        }
    };

    planner.plan(opt.k);
    let plans = planner.plans();
    for plan in plans {
        if plan.behaviour_str.is_empty() {
            println!("Plan {}:", plan.id);
        } else {
            println!("Plan {} [{}]:", plan.id, plan.behaviour_str);
        }
        for action in &plan.plan.actions {
            println!("  {action}");
        }
    }
    println!(
        "{} plan(s), {} distinct behaviour(s)",
        plans.len(),
        planner.behaviour_count()
    );

    if opt.count {
        let sequences: Vec<_> = plans.iter().map(|p| p.plan.clone()).collect();
        match BehaviourCount::new(&task, &sequences, &planner_features(&opt)) {
            Ok(counter) => println!("simulator counts {} behaviour(s)", counter.count()),
            Err(e) => eprintln!("simulator count failed: {e}"),
        }
    }

    if planner.plans().is_empty() {
        1
    } else {
        0
    }
}

fn planner_features(opt: &Opt) -> Vec<FeatureSpec> {
    opt.features
        .iter()
        .filter_map(|raw| FeatureSpec::parse_cli(raw).ok())
        .collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();
    let opt = Opt::from_args();
    std::process::exit(run(opt));
}
