use crate::events::{NodeEvent, NodeEventProcessor, NodePayload};
use std::fmt;

/// Renders every event as one human-readable line and hands it to a callback.
///
/// Begin lines start with `Begin` and End lines with `End`, so a handler can
/// track nesting depth from the line prefix alone.
pub struct TraceListener<F> {
    handler: F,
}

impl<F: FnMut(fmt::Arguments<'_>)> TraceListener<F> {
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F: FnMut(fmt::Arguments<'_>)> NodeEventProcessor for TraceListener<F> {
    fn process_node_event(&mut self, event: &NodeEvent) {
        let handler = &mut self.handler;
        match event {
            NodeEvent::Begin { payload, .. } => match payload {
                NodePayload::Feature {
                    title,
                    description,
                    tags,
                } => handler(format_args!(
                    "BeginFeature: {:?}: {:?} tags:[{}]",
                    title,
                    description,
                    tags.join(" ")
                )),
                NodePayload::Background { title, tags } => handler(format_args!(
                    "BeginBackground: {:?} tags:[{}]",
                    title,
                    tags.join(" ")
                )),
                NodePayload::Scenario { title, tags } => handler(format_args!(
                    "BeginScenario: {:?} tags:[{}]",
                    title,
                    tags.join(" ")
                )),
                NodePayload::Outline { title, tags } => handler(format_args!(
                    "BeginOutline: {:?} tags:[{}]",
                    title,
                    tags.join(" ")
                )),
                NodePayload::Step { step_type, text } => {
                    handler(format_args!("BeginStep: {:?}: {:?}", step_type.as_str(), text));
                }
                NodePayload::OutlineExamples => handler(format_args!("BeginOutlineExamples")),
                NodePayload::PyString { lines } => {
                    handler(format_args!("BeginPyString: {:?}", lines.concat()));
                }
                NodePayload::Table { rows } => {
                    handler(format_args!("BeginTable: rows:{}", rows.len()));
                }
            },
            NodeEvent::End(node_type) => handler(format_args!("End{node_type}")),
        }
    }
}
