//! Sequential plans over lifted action instances.

use std::fmt::{Display, Error, Formatter};

/// A single action occurrence in a plan, identified by its schema name and
/// the names of the objects filling its parameters.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ActionInstance {
    pub name: String,
    pub params: Vec<String>,
}

impl ActionInstance {
    pub fn new(name: impl Into<String>, params: &[&str]) -> ActionInstance {
        ActionInstance {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Rendering matching `GroundedAction::full_name`, used to map instances
    /// back to grounded actions.
    pub fn full_name(&self) -> String {
        if self.params.is_empty() {
            self.name.clone()
        } else {
            format!("{}({})", self.name, self.params.join(", "))
        }
    }
}

impl Display for ActionInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.full_name())
    }
}

/// An ordered sequence of action instances. Equality is on the sequence of
/// full action names.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct SequentialPlan {
    pub actions: Vec<ActionInstance>,
}

impl SequentialPlan {
    pub fn new(actions: Vec<ActionInstance>) -> SequentialPlan {
        SequentialPlan { actions }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Stable single-line fingerprint of the action sequence.
    pub fn signature(&self) -> String {
        self.actions
            .iter()
            .map(|a| a.full_name())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl Display for SequentialPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        for a in &self.actions {
            writeln!(f, "{a}")?;
        }
        Ok(())
    }
}
