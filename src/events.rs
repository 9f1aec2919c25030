use crate::ast::StepType;
use std::fmt::{self, Display};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum NodeType {
    Feature,
    Background,
    Scenario,
    Step,
    Outline,
    OutlineExamples,
    PyString,
    Table,
}

impl Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Feature => "Feature",
            NodeType::Background => "Background",
            NodeType::Scenario => "Scenario",
            NodeType::Step => "Step",
            NodeType::Outline => "Outline",
            NodeType::OutlineExamples => "OutlineExamples",
            NodeType::PyString => "PyString",
            NodeType::Table => "Table",
        };
        f.write_str(name)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Phase {
    Begin,
    End,
}

/// Data carried by a `Begin` event, one variant per node kind.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum NodePayload {
    Feature {
        title: String,
        description: String,
        tags: Vec<String>,
    },
    Background {
        title: String,
        tags: Vec<String>,
    },
    Scenario {
        title: String,
        tags: Vec<String>,
    },
    Outline {
        title: String,
        tags: Vec<String>,
    },
    Step {
        step_type: StepType,
        text: String,
    },
    OutlineExamples,
    PyString {
        lines: Vec<String>,
    },
    Table {
        rows: Vec<Vec<String>>,
    },
}

impl NodePayload {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodePayload::Feature { .. } => NodeType::Feature,
            NodePayload::Background { .. } => NodeType::Background,
            NodePayload::Scenario { .. } => NodeType::Scenario,
            NodePayload::Outline { .. } => NodeType::Outline,
            NodePayload::Step { .. } => NodeType::Step,
            NodePayload::OutlineExamples => NodeType::OutlineExamples,
            NodePayload::PyString { .. } => NodeType::PyString,
            NodePayload::Table { .. } => NodeType::Table,
        }
    }
}

/// One node lifecycle event.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum NodeEvent {
    Begin { line: usize, payload: NodePayload },
    End(NodeType),
}

impl NodeEvent {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeEvent::Begin { payload, .. } => payload.node_type(),
            NodeEvent::End(node_type) => *node_type,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            NodeEvent::Begin { .. } => Phase::Begin,
            NodeEvent::End(_) => Phase::End,
        }
    }
}

impl Display for NodeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase() {
            Phase::Begin => write!(f, "BeginNode({})", self.node_type()),
            Phase::End => write!(f, "EndNode({})", self.node_type()),
        }
    }
}

/// Receives node events in emission order during `execute`.
pub trait NodeEventProcessor {
    fn process_node_event(&mut self, event: &NodeEvent);
}

impl<T: NodeEventProcessor + ?Sized> NodeEventProcessor for &mut T {
    fn process_node_event(&mut self, event: &NodeEvent) {
        (**self).process_node_event(event);
    }
}

impl<T: NodeEventProcessor + ?Sized> NodeEventProcessor for Box<T> {
    fn process_node_event(&mut self, event: &NodeEvent) {
        (**self).process_node_event(event);
    }
}

/// Adapts a closure into a [`NodeEventProcessor`].
pub struct ProcessNodeEvent<F>(pub F);

impl<F: FnMut(&NodeEvent)> NodeEventProcessor for ProcessNodeEvent<F> {
    fn process_node_event(&mut self, event: &NodeEvent) {
        (self.0)(event);
    }
}

/// The ordered, immutable result of a successful parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<NodeEvent>,
}

impl EventLog {
    pub(crate) fn new(events: Vec<NodeEvent>) -> Self {
        Self { events }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Feeds every event, in order, to a single listener.
    pub fn replay(&self, listener: &mut dyn NodeEventProcessor) {
        for event in &self.events {
            listener.process_node_event(event);
        }
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a NodeEvent;
    type IntoIter = std::slice::Iter<'a, NodeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Holds listeners in registration order and replays an [`EventLog`] to them.
///
/// The trace listener, when set, sees each event before the structural
/// listeners do.
#[derive(Default)]
pub struct Dispatcher<'l> {
    listeners: Vec<Box<dyn NodeEventProcessor + 'l>>,
    trace: Option<Box<dyn NodeEventProcessor + 'l>>,
}

impl<'l> Dispatcher<'l> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: impl NodeEventProcessor + 'l) {
        self.listeners.push(Box::new(listener));
    }

    pub fn set_trace(&mut self, trace: impl NodeEventProcessor + 'l) {
        self.trace = Some(Box::new(trace));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn dispatch(&mut self, log: &EventLog) {
        log::debug!(
            "replaying {} events to {} listeners",
            log.len(),
            self.listeners.len()
        );
        for event in log {
            if let Some(trace) = self.trace.as_mut() {
                trace.process_node_event(event);
            }
            for listener in &mut self.listeners {
                listener.process_node_event(event);
            }
        }
    }
}
