use crate::ast::{
    Background, Feature, Outline, OutlineExamples, PyString, Scenario, ScenarioNode, Step,
    StepArgument, Table,
};
use crate::events::{NodeEvent, NodeEventProcessor, NodePayload, NodeType};

/// A node that is still receiving children.
#[derive(Debug)]
enum Frame {
    Feature(Feature),
    Background(Background),
    Scenario(ScenarioNode),
    Step(Step),
    Examples(OutlineExamples),
}

/// Reduces a node event stream into an owned [`Feature`] tree.
///
/// Begin events push a frame; End events pop it and link it into the frame
/// below. PyString and Table payloads never get a frame of their own, they are
/// attached to the Step or Examples frame on top of the stack.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    stack: Vec<Frame>,
    root: Feature,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The completed document, or an empty [`Feature`] if nothing was replayed yet.
    pub fn feature(&self) -> &Feature {
        &self.root
    }

    pub fn into_feature(self) -> Feature {
        self.root
    }

    fn begin(&mut self, payload: &NodePayload) {
        let frame = match payload {
            NodePayload::Feature {
                title,
                description,
                tags,
            } => {
                // A new document starts: drop whatever an earlier replay built.
                self.stack.clear();
                self.root = Feature::default();
                Frame::Feature(Feature {
                    title: title.clone(),
                    description: description.clone(),
                    tags: tags.clone(),
                    ..Feature::default()
                })
            }
            NodePayload::Background { title, tags } => Frame::Background(Background {
                title: title.clone(),
                tags: tags.clone(),
                steps: Vec::new(),
            }),
            NodePayload::Scenario { title, tags } => {
                Frame::Scenario(ScenarioNode::Scenario(Scenario {
                    title: title.clone(),
                    tags: tags.clone(),
                    steps: Vec::new(),
                }))
            }
            NodePayload::Outline { title, tags } => {
                Frame::Scenario(ScenarioNode::Outline(Outline {
                    title: title.clone(),
                    tags: tags.clone(),
                    steps: Vec::new(),
                    examples: None,
                }))
            }
            NodePayload::Step { step_type, text } => Frame::Step(Step {
                step_type: *step_type,
                text: text.clone(),
                argument: None,
            }),
            NodePayload::OutlineExamples => Frame::Examples(OutlineExamples::default()),
            NodePayload::PyString { lines } => {
                self.attach_argument(StepArgument::PyString(PyString {
                    lines: lines.clone(),
                }));
                return;
            }
            NodePayload::Table { rows } => {
                self.attach_argument(StepArgument::Table(Table { rows: rows.clone() }));
                return;
            }
        };
        self.stack.push(frame);
    }

    fn attach_argument(&mut self, argument: StepArgument) {
        match (self.stack.last_mut(), argument) {
            (Some(Frame::Step(step)), argument) => step.argument = Some(argument),
            (Some(Frame::Examples(examples)), StepArgument::Table(table)) => {
                examples.table = table;
            }
            (top, _) => log::warn!("dropping step argument, no step or examples open: {top:?}"),
        }
    }

    fn end(&mut self, node_type: NodeType) {
        if matches!(node_type, NodeType::PyString | NodeType::Table) {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            log::warn!("unbalanced End({node_type}) ignored");
            return;
        };
        match (frame, self.stack.last_mut()) {
            (Frame::Feature(feature), None) => self.root = feature,
            (Frame::Background(background), Some(Frame::Feature(feature))) => {
                feature.background = Some(background);
            }
            (Frame::Scenario(scenario), Some(Frame::Feature(feature))) => {
                feature.scenarios.push(scenario);
            }
            (Frame::Step(step), Some(Frame::Background(background))) => {
                background.steps.push(step);
            }
            (Frame::Step(step), Some(Frame::Scenario(scenario))) => {
                scenario.steps_mut().push(step);
            }
            (Frame::Examples(examples), Some(Frame::Scenario(ScenarioNode::Outline(outline)))) => {
                outline.examples = Some(examples);
            }
            (frame, parent) => {
                log::warn!("cannot link {frame:?} into {parent:?}");
            }
        }
    }
}

impl NodeEventProcessor for DocumentBuilder {
    fn process_node_event(&mut self, event: &NodeEvent) {
        match event {
            NodeEvent::Begin { payload, .. } => self.begin(payload),
            NodeEvent::End(node_type) => self.end(*node_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::StepType;
    use crate::parser::Parser;

    fn build(source: &str) -> Feature {
        let log = Parser::new(source).parse_events().unwrap();
        let mut builder = DocumentBuilder::new();
        log.replay(&mut builder);
        builder.into_feature()
    }

    #[test]
    fn test_empty_before_replay() {
        let builder = DocumentBuilder::new();
        assert_eq!(builder.feature(), &Feature::default());
        assert!(builder.feature().scenarios().is_empty());
    }

    #[test]
    fn test_builds_tree_in_source_order() {
        let feature = build(
            "Feature: F\nBackground:\nGiven base\nScenario: One\nWhen a\nScenario Outline: Two\nThen <b>\nExamples:\n| b |\n| 1 |\nScenario: Three",
        );
        assert_eq!(feature.title(), "F");
        assert_eq!(feature.background().map(|b| b.steps().len()), Some(1));
        let titles: Vec<&str> = feature.scenarios().iter().map(ScenarioNode::title).collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
        assert_eq!(feature.scenarios()[0].steps()[0].step_type(), StepType::When);
        let outline = feature.scenarios()[1].as_outline().unwrap();
        assert_eq!(
            outline.examples().unwrap().table().rows(),
            &[vec!["b".to_string()], vec!["1".to_string()]]
        );
        assert!(feature.scenarios()[2].steps().is_empty());
    }

    #[test]
    fn test_step_arguments_attach_to_their_step() {
        let feature = build(
            "Feature: F\nScenario: S\nGiven doc\n\"\"\"\nhi\n\"\"\"\nAnd grid\n| a | b |\nThen none",
        );
        let steps = feature.scenarios()[0].steps();
        assert_eq!(
            steps[0].py_string().map(ToString::to_string),
            Some("hi\n".to_string())
        );
        assert!(steps[0].table().is_none());
        assert_eq!(
            steps[1].table().and_then(Table::header),
            Some(&["a".to_string(), "b".to_string()][..])
        );
        assert!(steps[2].argument.is_none());
    }

    #[test]
    fn test_background_keeps_its_own_tags() {
        let feature = build("Feature: F\n@setup @db\nBackground:\nGiven x\nScenario: S\nGiven y");
        let background = feature.background().unwrap();
        assert_eq!(background.tags(), ["setup", "db"]);
        assert_eq!(background.steps().len(), 1);
        assert!(feature.tags().is_empty());
        assert!(feature.scenarios()[0].tags().is_empty());
    }

    #[test]
    fn test_replay_twice_builds_same_document() {
        let log = Parser::new("@t Feature: F\n@s Scenario: S\nGiven x")
            .parse_events()
            .unwrap();
        let mut builder = DocumentBuilder::new();
        log.replay(&mut builder);
        let first = builder.feature().clone();
        log.replay(&mut builder);
        assert_eq!(builder.feature(), &first);
        assert_eq!(first.scenarios().len(), 1);
    }
}
