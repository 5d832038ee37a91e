//! Immutable representation of a grounded planning task.
//!
//! A task is a set of typed objects, a set of grounded actions (boolean
//! preconditions and add/delete effects, plus optional numeric conditions and
//! effects), an initial state, a conjunction of goal conditions and a list of
//! quality metrics. Parsing and grounding are performed upstream; this module
//! only receives the result, through [`TaskBuilder`].

use crate::state::State;
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::fmt::{Display, Error, Formatter};

/// Numeric identifier of an object of the task.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
pub struct ObjId(u32);

/// Numeric identifier of a boolean fluent.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
pub struct FluentId(u32);

/// Numeric identifier of an integer-valued fluent.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
pub struct NumFluentId(u32);

/// Numeric identifier of a grounded action.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
pub struct ActionId(u32);

macro_rules! impl_id_conversions {
    ($id:ty) => {
        impl From<$id> for usize {
            fn from(id: $id) -> Self {
                id.0 as usize
            }
        }
        impl From<usize> for $id {
            fn from(i: usize) -> Self {
                Self(i as u32)
            }
        }
    };
}
impl_id_conversions!(ObjId);
impl_id_conversions!(FluentId);
impl_id_conversions!(NumFluentId);
impl_id_conversions!(ActionId);

/// An object of the task, with the name of its (already resolved) type.
#[derive(Clone, Debug)]
pub struct Object {
    pub name: String,
    pub type_name: String,
}

/// A grounded boolean fluent, e.g. `on_a_b`.
#[derive(Clone, Debug)]
pub struct Fluent {
    pub name: String,
}

/// A grounded integer-valued fluent, e.g. `energy`.
#[derive(Clone, Debug)]
pub struct NumFluent {
    pub name: String,
}

/// Association of a boolean fluent to a truth value.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Literal {
    pub fluent: FluentId,
    pub value: bool,
}

impl Literal {
    pub fn pos(fluent: FluentId) -> Literal {
        Literal { fluent, value: true }
    }
    pub fn neg(fluent: FluentId) -> Literal {
        Literal { fluent, value: false }
    }
}

impl std::ops::Not for Literal {
    type Output = Literal;
    fn not(self) -> Self::Output {
        Literal {
            fluent: self.fluent,
            value: !self.value,
        }
    }
}

/// Comparison operator of a numeric condition.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum NumRel {
    Le,
    Lt,
    Ge,
    Gt,
    Eq,
}

impl Display for NumRel {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let s = match self {
            NumRel::Le => "<=",
            NumRel::Lt => "<",
            NumRel::Ge => ">=",
            NumRel::Gt => ">",
            NumRel::Eq => "=",
        };
        write!(f, "{s}")
    }
}

/// Comparison of an integer fluent against a constant.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct NumCond {
    pub fluent: NumFluentId,
    pub rel: NumRel,
    pub value: i64,
}

/// A condition over a state: either a boolean literal or a numeric comparison.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Condition {
    Lit(Literal),
    Num(NumCond),
}

impl Condition {
    /// Canonical rendering, resolving fluent names through the task.
    pub fn format(&self, task: &GroundedTask) -> String {
        match self {
            Condition::Lit(l) => {
                let name = &task.fluents[usize::from(l.fluent)].name;
                if l.value {
                    name.clone()
                } else {
                    format!("not {name}")
                }
            }
            Condition::Num(c) => {
                let name = &task.num_fluents[usize::from(c.fluent)].name;
                format!("{} {} {}", name, c.rel, c.value)
            }
        }
    }
}

/// Update operator of a numeric effect.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum NumOp {
    Assign,
    Increase,
    Decrease,
}

/// Effect on an integer fluent.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct NumEffect {
    pub fluent: NumFluentId,
    pub op: NumOp,
    pub amount: i64,
}

/// A grounded action: a schema name, the objects it was grounded with and its
/// conditions and effects.
#[derive(Clone, Debug)]
pub struct GroundedAction {
    /// Name of the action schema, e.g. `stack`.
    pub name: String,
    /// Objects filling the schema parameters, in order.
    pub params: Vec<ObjId>,
    pub precond: Vec<Literal>,
    pub num_precond: Vec<NumCond>,
    pub add: Vec<FluentId>,
    pub del: Vec<FluentId>,
    pub num_effects: Vec<NumEffect>,
}

impl GroundedAction {
    /// Full grounded name, e.g. `stack(a, b)`. Parameter-less actions render
    /// as the bare schema name.
    pub fn full_name(&self, task: &GroundedTask) -> String {
        if self.params.is_empty() {
            self.name.clone()
        } else {
            let params = self
                .params
                .iter()
                .map(|&o| task.objects[usize::from(o)].name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}({})", self.name, params)
        }
    }

    /// Whether this action writes the given numeric fluent.
    pub fn writes_num(&self, fluent: NumFluentId) -> bool {
        self.num_effects.iter().any(|e| e.fluent == fluent)
    }
}

/// Quality metrics attached to the task. The core honours at most one of
/// these; any other metric produced upstream is ignored.
#[derive(Clone, Debug)]
pub enum QualityMetric {
    /// Not all goals must be achieved; each satisfied goal accumulates its
    /// utility.
    Oversubscription(Vec<(Condition, i64)>),
    MakespanOptimal,
    PlanLength,
}

/// A grounded planning task. Immutable once built.
pub struct GroundedTask {
    pub objects: Vec<Object>,
    pub fluents: Vec<Fluent>,
    pub num_fluents: Vec<NumFluent>,
    pub actions: Vec<GroundedAction>,
    pub init: State,
    pub goals: Vec<Condition>,
    pub metrics: Vec<QualityMetric>,
    fluent_ids: HashMap<String, FluentId>,
    num_fluent_ids: HashMap<String, NumFluentId>,
    object_ids: HashMap<String, ObjId>,
    action_ids: HashMap<String, ActionId>,
}

impl GroundedTask {
    pub fn fluent_id(&self, name: &str) -> Option<FluentId> {
        self.fluent_ids.get(name).copied()
    }

    pub fn num_fluent_id(&self, name: &str) -> Option<NumFluentId> {
        self.num_fluent_ids.get(name).copied()
    }

    pub fn object_id(&self, name: &str) -> Option<ObjId> {
        self.object_ids.get(name).copied()
    }

    /// Looks up a grounded action by its full name, e.g. `stack(a, b)`.
    pub fn action_id(&self, full_name: &str) -> Option<ActionId> {
        self.action_ids.get(full_name).copied()
    }

    pub fn action(&self, id: ActionId) -> &GroundedAction {
        &self.actions[usize::from(id)]
    }

    pub fn is_oversubscription(&self) -> bool {
        self.metrics
            .iter()
            .any(|m| matches!(m, QualityMetric::Oversubscription(_)))
    }

    /// The oversubscription goals with their utilities, if the task carries
    /// an oversubscription metric.
    pub fn oversubscription_goals(&self) -> Option<&[(Condition, i64)]> {
        self.metrics.iter().find_map(|m| match m {
            QualityMetric::Oversubscription(goals) => Some(goals.as_slice()),
            _ => None,
        })
    }

    /// All actions that reference the named object as a parameter.
    pub fn actions_using_object(&self, name: &str) -> Vec<ActionId> {
        let Some(obj) = self.object_id(name) else {
            return Vec::new();
        };
        self.actions
            .iter()
            .enumerate()
            .filter(|(_, a)| a.params.contains(&obj))
            .map(|(i, _)| ActionId::from(i))
            .collect()
    }

    /// Whether two actions interfere: one deletes a positive precondition or
    /// an add effect of the other, one adds a negated precondition or a
    /// delete effect of the other, or both touch a common numeric fluent with
    /// at least one writing it.
    pub fn interferes(&self, a: ActionId, b: ActionId) -> bool {
        let (a, b) = (self.action(a), self.action(b));
        let clash = |x: &GroundedAction, y: &GroundedAction| {
            x.del.iter().any(|f| {
                y.add.contains(f) || y.precond.iter().any(|l| l.value && l.fluent == *f)
            }) || x.add.iter().any(|f| {
                y.del.contains(f) || y.precond.iter().any(|l| !l.value && l.fluent == *f)
            }) || x.num_effects.iter().any(|e| {
                y.writes_num(e.fluent) || y.num_precond.iter().any(|c| c.fluent == e.fluent)
            })
        };
        clash(a, b) || clash(b, a)
    }
}

/// Construction surface for [`GroundedTask`]. Grounding front-ends fill the
/// builder and call [`TaskBuilder::build`], which validates cross-references.
#[derive(Default)]
pub struct TaskBuilder {
    objects: Vec<Object>,
    fluents: Vec<Fluent>,
    num_fluents: Vec<NumFluent>,
    actions: Vec<GroundedAction>,
    init_bools: Vec<FluentId>,
    init_nums: Vec<(NumFluentId, i64)>,
    goals: Vec<Condition>,
    metrics: Vec<QualityMetric>,
}

impl TaskBuilder {
    pub fn new() -> TaskBuilder {
        Default::default()
    }

    pub fn object(&mut self, name: &str, type_name: &str) -> ObjId {
        self.objects.push(Object {
            name: name.to_string(),
            type_name: type_name.to_string(),
        });
        ObjId::from(self.objects.len() - 1)
    }

    pub fn fluent(&mut self, name: &str) -> FluentId {
        self.fluents.push(Fluent { name: name.to_string() });
        FluentId::from(self.fluents.len() - 1)
    }

    pub fn num_fluent(&mut self, name: &str, initial: i64) -> NumFluentId {
        self.num_fluents.push(NumFluent { name: name.to_string() });
        let id = NumFluentId::from(self.num_fluents.len() - 1);
        self.init_nums.push((id, initial));
        id
    }

    /// Marks a boolean fluent as true in the initial state. All other
    /// boolean fluents are false.
    pub fn init(&mut self, fluent: FluentId) {
        self.init_bools.push(fluent);
    }

    pub fn action(&mut self, action: GroundedAction) -> ActionId {
        self.actions.push(action);
        ActionId::from(self.actions.len() - 1)
    }

    pub fn goal(&mut self, goal: Condition) {
        self.goals.push(goal);
    }

    pub fn metric(&mut self, metric: QualityMetric) {
        self.metrics.push(metric);
    }

    pub fn build(self) -> Result<GroundedTask> {
        let mut init = State::new(self.fluents.len(), self.num_fluents.len());
        for f in &self.init_bools {
            init.set(*f, true);
        }
        for (f, v) in &self.init_nums {
            init.set_num(*f, *v);
        }

        let check_lit = |l: &Literal| usize::from(l.fluent) < self.fluents.len();
        let check_cond = |c: &Condition| match c {
            Condition::Lit(l) => check_lit(l),
            Condition::Num(n) => usize::from(n.fluent) < self.num_fluents.len(),
        };
        for a in &self.actions {
            let refs_ok = a.precond.iter().all(check_lit)
                && a.add.iter().all(|f| usize::from(*f) < self.fluents.len())
                && a.del.iter().all(|f| usize::from(*f) < self.fluents.len())
                && a.params.iter().all(|o| usize::from(*o) < self.objects.len())
                && a.num_precond
                    .iter()
                    .all(|c| usize::from(c.fluent) < self.num_fluents.len())
                && a.num_effects
                    .iter()
                    .all(|e| usize::from(e.fluent) < self.num_fluents.len());
            if !refs_ok {
                bail!("action {} references an undeclared fluent or object", a.name);
            }
        }
        if !self.goals.iter().all(check_cond) {
            bail!("a goal condition references an undeclared fluent");
        }

        let mut task = GroundedTask {
            objects: self.objects,
            fluents: self.fluents,
            num_fluents: self.num_fluents,
            actions: self.actions,
            init,
            goals: self.goals,
            metrics: self.metrics,
            fluent_ids: HashMap::new(),
            num_fluent_ids: HashMap::new(),
            object_ids: HashMap::new(),
            action_ids: HashMap::new(),
        };
        for (i, f) in task.fluents.iter().enumerate() {
            task.fluent_ids.insert(f.name.clone(), FluentId::from(i));
        }
        for (i, f) in task.num_fluents.iter().enumerate() {
            task.num_fluent_ids.insert(f.name.clone(), NumFluentId::from(i));
        }
        for (i, o) in task.objects.iter().enumerate() {
            task.object_ids.insert(o.name.clone(), ObjId::from(i));
        }
        let names: Vec<String> = task.actions.iter().map(|a| a.full_name(&task)).collect();
        for (i, name) in names.into_iter().enumerate() {
            if task.action_ids.insert(name.clone(), ActionId::from(i)).is_some() {
                bail!("duplicate grounded action: {name}");
            }
        }
        Ok(task)
    }
}
