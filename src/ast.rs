use serde::Serialize;
use std::fmt::{self, Display};

/// The keyword a step was written with.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum StepType {
    Given,
    When,
    Then,
    And,
    But,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Given => "Given",
            StepType::When => "When",
            StepType::Then => "Then",
            StepType::And => "And",
            StepType::But => "But",
        }
    }
}

impl Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representing the Feature
///
/// ```text
/// @tags
/// Feature: Title
///   Description
///
///   Background: ...
///
///   Scenario:  ...
/// ```
#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct Feature {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub background: Option<Background>,
    pub scenarios: Vec<ScenarioNode>,
}

impl Feature {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    pub fn scenarios(&self) -> &[ScenarioNode] {
        &self.scenarios
    }
}

/// Steps implicitly prefixed to every scenario of the feature.
#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct Background {
    pub title: String,
    pub tags: Vec<String>,
    pub steps: Vec<Step>,
}

impl Background {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct Scenario {
    pub title: String,
    pub tags: Vec<String>,
    pub steps: Vec<Step>,
}

#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct Outline {
    pub title: String,
    pub tags: Vec<String>,
    pub steps: Vec<Step>,
    pub examples: Option<OutlineExamples>,
}

impl Outline {
    pub fn examples(&self) -> Option<&OutlineExamples> {
        self.examples.as_ref()
    }
}

#[derive(Debug, PartialEq, Clone, Default, Serialize)]
pub struct OutlineExamples {
    pub table: Table,
}

impl OutlineExamples {
    pub fn table(&self) -> &Table {
        &self.table
    }
}

/// A scenario-like child of a [`Feature`], kept in source order.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ScenarioNode {
    Scenario(Scenario),
    Outline(Outline),
}

impl ScenarioNode {
    pub fn title(&self) -> &str {
        match self {
            ScenarioNode::Scenario(s) => &s.title,
            ScenarioNode::Outline(o) => &o.title,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            ScenarioNode::Scenario(s) => &s.tags,
            ScenarioNode::Outline(o) => &o.tags,
        }
    }

    pub fn steps(&self) -> &[Step] {
        match self {
            ScenarioNode::Scenario(s) => &s.steps,
            ScenarioNode::Outline(o) => &o.steps,
        }
    }

    pub(crate) fn steps_mut(&mut self) -> &mut Vec<Step> {
        match self {
            ScenarioNode::Scenario(s) => &mut s.steps,
            ScenarioNode::Outline(o) => &mut o.steps,
        }
    }

    pub fn node_type(&self) -> crate::events::NodeType {
        match self {
            ScenarioNode::Scenario(_) => crate::events::NodeType::Scenario,
            ScenarioNode::Outline(_) => crate::events::NodeType::Outline,
        }
    }

    pub fn as_outline(&self) -> Option<&Outline> {
        match self {
            ScenarioNode::Outline(o) => Some(o),
            ScenarioNode::Scenario(_) => None,
        }
    }
}

/// Representing Steps
///
/// ```text
///   StepType   Text
///    |          |
///  .-+-. .------+--------------------------.
///  Given a file with the following contents:
///  """                                      <
///  All your base are belong to us           <- Argument
///  """                                      <
/// ```
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Step {
    pub step_type: StepType,
    pub text: String,
    pub argument: Option<StepArgument>,
}

impl Step {
    pub fn step_type(&self) -> StepType {
        self.step_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn py_string(&self) -> Option<&PyString> {
        match &self.argument {
            Some(StepArgument::PyString(p)) => Some(p),
            _ => None,
        }
    }

    pub fn table(&self) -> Option<&Table> {
        match &self.argument {
            Some(StepArgument::Table(t)) => Some(t),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(untagged)]
pub enum StepArgument {
    PyString(PyString),
    Table(Table),
}

#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize)]
pub struct PyString {
    pub lines: Vec<String>,
}

impl PyString {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Display for PyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            f.write_str(line)?;
        }
        Ok(())
    }
}

/// A rectangular grid of cells; row 0 is the header.
#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }
}
