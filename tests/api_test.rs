use gherkin_core::builder::DocumentBuilder;
use gherkin_core::events::{NodeEvent, Phase, ProcessNodeEvent};
use gherkin_core::{parse_feature, GherkinDomParser, GherkinParser};
use std::cell::RefCell;

const HELLO_WORLD: &str = r#"
@wip
Feature: Hello World
  The world is a beautiful place
  So let people be nice to each other

  @nice @people
  Scenario: Nice people
    Given a nice person called "Bob"
      And a nice person called "Lisa"
     When "Bob" says to "Lisa": "Hello!"
     Then "Lisa" should reply to "Bob": "Hello!"
"#;

#[test]
fn test_node_event_processor_sees_nested_events() {
    let mut seen = Vec::new();
    {
        let mut parser = GherkinParser::new(HELLO_WORLD);
        parser.with_listener(ProcessNodeEvent(|e: &NodeEvent| seen.push(e.to_string())));
        parser.init();
        parser.parse().unwrap();
        parser.execute();
    }
    assert_eq!(
        seen,
        vec![
            "BeginNode(Feature)",
            "BeginNode(Scenario)",
            "BeginNode(Step)",
            "EndNode(Step)",
            "BeginNode(Step)",
            "EndNode(Step)",
            "BeginNode(Step)",
            "EndNode(Step)",
            "BeginNode(Step)",
            "EndNode(Step)",
            "EndNode(Scenario)",
            "EndNode(Feature)",
        ]
    );
}

#[test]
fn test_trace_handler_lines() {
    let mut lines = Vec::new();
    {
        let mut parser = GherkinParser::new(HELLO_WORLD);
        parser.with_trace_handler(|args| lines.push(args.to_string()));
        parser.init();
        parser.parse().unwrap();
        parser.execute();
    }
    assert_eq!(
        lines,
        vec![
            r#"BeginFeature: "Hello World": "The world is a beautiful place\nSo let people be nice to each other" tags:[wip]"#,
            r#"BeginScenario: "Nice people" tags:[nice people]"#,
            r#"BeginStep: "Given": "a nice person called \"Bob\"""#,
            "EndStep",
            r#"BeginStep: "And": "a nice person called \"Lisa\"""#,
            "EndStep",
            r#"BeginStep: "When": "\"Bob\" says to \"Lisa\": \"Hello!\"""#,
            "EndStep",
            r#"BeginStep: "Then": "\"Lisa\" should reply to \"Bob\": \"Hello!\"""#,
            "EndStep",
            "EndScenario",
            "EndFeature",
        ]
    );
}

#[test]
fn test_trace_depth_from_line_prefix() {
    let depth = RefCell::new(0usize);
    let max_depth = RefCell::new(0usize);
    {
        let mut parser = GherkinParser::new(HELLO_WORLD);
        parser.with_trace_handler(|args| {
            let line = args.to_string();
            let mut depth = depth.borrow_mut();
            if line.starts_with("End") {
                *depth -= 1;
            } else if line.starts_with("Begin") {
                *depth += 1;
                let mut max = max_depth.borrow_mut();
                *max = (*max).max(*depth);
            }
        });
        parser.parse().unwrap();
        parser.execute();
    }
    assert_eq!(*depth.borrow(), 0);
    assert_eq!(*max_depth.borrow(), 3);
}

#[test]
fn test_execute_is_repeatable() {
    let trace = RefCell::new(Vec::new());
    {
        let mut parser = GherkinParser::new(HELLO_WORLD);
        parser.with_listener(ProcessNodeEvent(|e: &NodeEvent| {
            trace.borrow_mut().push(e.clone());
        }));
        parser.parse().unwrap();
        parser.execute();
        parser.execute();
    }
    let trace = trace.into_inner();
    let (first, second) = trace.split_at(trace.len() / 2);
    assert_eq!(first, second);
    assert_eq!(first.first().map(NodeEvent::phase), Some(Phase::Begin));
}

#[test]
fn test_listeners_run_in_registration_order() {
    let order = RefCell::new(Vec::new());
    {
        let mut parser = GherkinParser::new("Feature: F");
        parser
            .with_listener(ProcessNodeEvent(|e: &NodeEvent| {
                order.borrow_mut().push(format!("first {e}"));
            }))
            .with_listener(ProcessNodeEvent(|e: &NodeEvent| {
                order.borrow_mut().push(format!("second {e}"));
            }));
        parser.parse().unwrap();
        parser.execute();
    }
    assert_eq!(
        order.into_inner(),
        vec![
            "first BeginNode(Feature)",
            "second BeginNode(Feature)",
            "first EndNode(Feature)",
            "second EndNode(Feature)",
        ]
    );
}

#[test]
fn test_borrowed_document_builder() {
    let mut builder = DocumentBuilder::new();
    {
        let mut parser = GherkinParser::new(HELLO_WORLD);
        parser.with_listener(&mut builder);
        parser.parse().unwrap();
        parser.execute();
    }
    let feature = builder.feature();
    assert_eq!(feature.title(), "Hello World");
    assert_eq!(feature.scenarios()[0].steps().len(), 4);
}

#[test]
fn test_dom_parser() {
    let mut parser = GherkinDomParser::new(HELLO_WORLD);
    parser.init();
    parser.parse().unwrap();
    parser.execute();
    let feature = parser.feature();
    assert_eq!(feature.title(), "Hello World");
    assert_eq!(feature.tags(), ["wip"]);
    assert_eq!(feature.scenarios().len(), 1);
    assert_eq!(feature.scenarios()[0].title(), "Nice people");
    assert_eq!(feature.scenarios()[0].tags(), ["nice", "people"]);

    parser.execute();
    assert_eq!(parser.feature(), &parse_feature(HELLO_WORLD).unwrap());
}

#[test]
fn test_dom_parser_failure_leaves_empty_document() {
    let mut parser = GherkinDomParser::new("Feature: F\n  Scenario:\n    Hurtz\n");
    parser.init();
    let err = parser.parse().unwrap_err();
    assert_eq!(err.line(), 3);
    parser.execute();
    assert_eq!(parser.feature().title(), "");
    assert!(parser.feature().scenarios().is_empty());
}
