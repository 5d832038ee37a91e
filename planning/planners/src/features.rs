//! The behaviour feature library.
//!
//! A feature contributes assertions to the plan encoding, a set of output
//! variables whose model values discretise the plan's behaviour, and a
//! growing domain of observed values. Features are a closed sum type; the
//! configuration selects which variants are active through [`FeatureSpec`].

pub mod cost;
pub mod functions;
pub mod ordering;
pub mod resources;
pub mod spec_file;
pub mod utility;

use crate::encode::StepEncoding;
use crate::{Error, Result};
use cost::CostBoundFeature;
use diverse_planning::task::Condition;
use functions::FunctionBoxFeature;
use ordering::OrderingFeature;
use resources::ResourceCountFeature;
use std::path::PathBuf;
use utility::{UtilitySetFeature, UtilityValueFeature};
use z3::ast::Bool;
use z3::Model;

/// Configuration-level selection of a feature.
#[derive(Clone, Debug)]
pub enum FeatureSpec {
    GoalOrdering,
    LandmarkOrdering { landmarks: Vec<Condition> },
    MakespanBound,
    ResourceCount { spec: PathBuf },
    UtilityValue,
    UtilitySet,
    FunctionBox { spec: PathBuf },
}

impl FeatureSpec {
    /// Parses the command-line rendering of a feature, e.g. `goal-ordering`
    /// or `resource-count=rovers.spec`.
    pub fn parse_cli(s: &str) -> Result<FeatureSpec> {
        let (kind, arg) = match s.split_once('=') {
            Some((k, v)) => (k, Some(v)),
            None => (s, None),
        };
        let need_arg = || {
            arg.map(PathBuf::from)
                .ok_or_else(|| Error::Config(format!("feature '{kind}' needs a '=FILE' argument")))
        };
        match kind {
            "goal-ordering" => Ok(FeatureSpec::GoalOrdering),
            "makespan" => Ok(FeatureSpec::MakespanBound),
            "resource-count" => Ok(FeatureSpec::ResourceCount { spec: need_arg()? }),
            "utility-value" => Ok(FeatureSpec::UtilityValue),
            "utility-set" => Ok(FeatureSpec::UtilitySet),
            "function-box" => Ok(FeatureSpec::FunctionBox { spec: need_arg()? }),
            _ => Err(Error::Config(format!(
                "unknown feature '{kind}'. Valid options are: 'goal-ordering', 'makespan', \
                 'resource-count=FILE', 'utility-value', 'utility-set', 'function-box=FILE'"
            ))),
        }
    }

    pub fn is_makespan(&self) -> bool {
        matches!(self, FeatureSpec::MakespanBound)
    }
}

/// Planner-derived inputs needed by some features.
pub struct FeatureContext {
    pub optimal_plan_length: usize,
    pub quality_bound_factor: f64,
}

/// An attached behaviour feature.
pub enum Feature<'ctx> {
    Ordering(OrderingFeature<'ctx>),
    Cost(CostBoundFeature<'ctx>),
    Resources(ResourceCountFeature<'ctx>),
    UtilityValue(UtilityValueFeature<'ctx>),
    UtilitySet(UtilitySetFeature<'ctx>),
    FunctionBox(FunctionBoxFeature<'ctx>),
}

impl<'ctx> Feature<'ctx> {
    pub fn name(&self) -> &str {
        match self {
            Feature::Ordering(f) => f.name(),
            Feature::Cost(f) => f.name(),
            Feature::Resources(f) => f.name(),
            Feature::UtilityValue(f) => f.name(),
            Feature::UtilitySet(f) => f.name(),
            Feature::FunctionBox(f) => f.name(),
        }
    }

    /// Assertions this feature appends to the plan formula.
    pub fn assertions(&self) -> &[Bool<'ctx>] {
        match self {
            Feature::Ordering(f) => f.assertions(),
            Feature::Cost(f) => f.assertions(),
            Feature::Resources(f) => f.assertions(),
            Feature::UtilityValue(f) => f.assertions(),
            Feature::UtilitySet(f) => f.assertions(),
            Feature::FunctionBox(f) => f.assertions(),
        }
    }

    /// Conjunction of equalities pinning the feature's outputs to their
    /// values in the model. Also records the discretised value in the
    /// feature's domain.
    pub fn behaviour_expr(&mut self, model: &Model<'ctx>) -> Bool<'ctx> {
        match self {
            Feature::Ordering(f) => f.behaviour_expr(model),
            Feature::Cost(f) => f.behaviour_expr(model),
            Feature::Resources(f) => f.behaviour_expr(model),
            Feature::UtilityValue(f) => f.behaviour_expr(model),
            Feature::UtilitySet(f) => f.behaviour_expr(model),
            Feature::FunctionBox(f) => f.behaviour_expr(model),
        }
    }

    /// Canonical rendering of the feature's value in the model, independent
    /// of the solver's pretty-printer.
    pub fn reading(&self, model: &Model<'ctx>) -> String {
        match self {
            Feature::Ordering(f) => f.reading(model),
            Feature::Cost(f) => f.reading(model),
            Feature::Resources(f) => f.reading(model),
            Feature::UtilityValue(f) => f.reading(model),
            Feature::UtilitySet(f) => f.reading(model),
            Feature::FunctionBox(f) => f.reading(model),
        }
    }

    /// Number of distinct discretised values observed so far.
    pub fn domain_len(&self) -> usize {
        match self {
            Feature::Ordering(f) => f.domain_len(),
            Feature::Cost(f) => f.domain_len(),
            Feature::Resources(f) => f.domain_len(),
            Feature::UtilityValue(f) => f.domain_len(),
            Feature::UtilitySet(f) => f.domain_len(),
            Feature::FunctionBox(f) => f.domain_len(),
        }
    }
}

/// Builds the selected features against an encoder. The result is sorted by
/// feature name so that behaviour renderings are canonical.
pub fn build_features<'ctx>(
    specs: &[FeatureSpec],
    encoder: &dyn StepEncoding<'ctx>,
    info: &FeatureContext,
) -> Result<Vec<Feature<'ctx>>> {
    let ctx = encoder.ctx();
    let mut features = Vec::with_capacity(specs.len());
    for spec in specs {
        let feature = match spec {
            FeatureSpec::GoalOrdering => Feature::Ordering(OrderingFeature::new(
                ctx,
                "subgoal",
                encoder.goal_chains(),
            )),
            FeatureSpec::LandmarkOrdering { landmarks } => {
                let task = encoder.task().clone();
                let h = encoder.horizon();
                let chains: Vec<_> = landmarks
                    .iter()
                    .map(|cond| crate::encode::GoalChain {
                        name: cond.format(&task),
                        steps: (1..=h).map(|t| encoder.condition_at(cond, t)).collect(),
                    })
                    .collect();
                Feature::Ordering(OrderingFeature::new(ctx, "landmark", &chains))
            }
            FeatureSpec::MakespanBound => Feature::Cost(CostBoundFeature::new(
                encoder,
                info.optimal_plan_length,
                info.quality_bound_factor,
            )),
            FeatureSpec::ResourceCount { spec } => {
                Feature::Resources(ResourceCountFeature::new(encoder, spec)?)
            }
            FeatureSpec::UtilityValue => Feature::UtilityValue(UtilityValueFeature::new(encoder)?),
            FeatureSpec::UtilitySet => Feature::UtilitySet(UtilitySetFeature::new(encoder)?),
            FeatureSpec::FunctionBox { spec } => {
                Feature::FunctionBox(FunctionBoxFeature::new(encoder, spec)?)
            }
        };
        features.push(feature);
    }
    features.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(features)
}
