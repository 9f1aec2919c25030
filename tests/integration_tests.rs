// Integration tests for gherkin-core using test fixtures
use gherkin_core::ast::{Feature, StepType};
use gherkin_core::events::NodeType;
use gherkin_core::parse_feature_with_name;
use std::fs;
use std::path::PathBuf;

fn get_test_file_path(subdir: &str, filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join(subdir)
        .join(filename)
}

fn read_test_file(subdir: &str, filename: &str) -> String {
    let path = get_test_file_path(subdir, filename);
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read test file: {:?}", path))
}

fn parse_fixture(filename: &str) -> Feature {
    let source = read_test_file("ok", filename);
    match parse_feature_with_name(&source, filename) {
        Ok(feature) => feature,
        Err(err) => panic!("{:?}", miette::Report::new(err)),
    }
}

fn verify_dead_simple_calculator(feature: &Feature) {
    assert_eq!(feature.title(), "Dead Simple Calculator");
    assert_eq!(feature.description(), "Bla Bla\nBla");
    assert_eq!(feature.tags(), ["dead", "simple"]);
    assert_eq!(feature.scenarios().len(), 3, "Number of scenarios");

    let background = feature.background().expect("background");
    assert_eq!(background.title(), "");
    assert_eq!(background.steps().len(), 1, "Number of background steps");
    assert_eq!(background.steps()[0].step_type(), StepType::Given);
    assert_eq!(background.steps()[0].text(), "a Simple Calculator");

    let scenario1 = &feature.scenarios()[0];
    assert_eq!(scenario1.node_type(), NodeType::Scenario);
    assert_eq!(scenario1.title(), "Adding 2 numbers");
    assert_eq!(scenario1.tags(), ["wip"], "Tags on Scenario 1");
    assert_eq!(scenario1.steps().len(), 5, "Number of steps in Scenario 1");
    assert_eq!(scenario1.steps()[0].step_type(), StepType::When);
    assert_eq!(scenario1.steps()[0].text(), "I press the key \"2\"");
    assert_eq!(scenario1.steps()[1].step_type(), StepType::And);
    assert_eq!(scenario1.steps()[4].step_type(), StepType::Then);
    assert_eq!(scenario1.steps()[4].text(), "the result should be 4");

    let scenario2 = &feature.scenarios()[1];
    assert_eq!(scenario2.node_type(), NodeType::Outline);
    assert_eq!(scenario2.tags(), ["wip", "expensive"], "Tags on Scenario 2");
    assert_eq!(scenario2.steps().len(), 5, "Number of steps in Scenario 2");
    assert_eq!(scenario2.steps()[0].text(), "I press the key \"<left>\"");
    let outline = scenario2.as_outline().expect("outline");
    assert_eq!(
        outline.examples().expect("examples").table().rows(),
        vec![
            vec!["left", "operator", "right", "result"],
            vec!["2", "+", "2", "4"],
            vec!["3", "+", "4", "7"],
        ]
    );

    let scenario3 = &feature.scenarios()[2];
    assert_eq!(scenario3.node_type(), NodeType::Scenario);
    assert!(scenario3.tags().is_empty(), "Tags on Scenario 3");
    assert_eq!(scenario3.steps().len(), 2, "Number of steps in Scenario 3");
    assert_eq!(scenario3.steps()[0].text(), "I press the following keys:");
    let py_string = scenario3.steps()[0].py_string().expect("py string");
    assert_eq!(py_string.to_string(), "  2\n+ 2\n+ 5\n  =\n");
    assert_eq!(py_string.lines().len(), 4);
    assert!(scenario3.steps()[0].table().is_none());
    assert_eq!(scenario3.steps()[1].text(), "the result should be 9");
}

mod ok_tests {
    use super::*;

    #[test]
    fn test_parsing_regular() {
        verify_dead_simple_calculator(&parse_fixture("calculator_regular.feature"));
    }

    #[test]
    fn test_parsing_tab_aligned() {
        verify_dead_simple_calculator(&parse_fixture("calculator_tab_aligned.feature"));
    }

    #[test]
    fn test_parsing_condensed_and_trailing_whitespace() {
        verify_dead_simple_calculator(&parse_fixture("calculator_condensed.feature"));
    }

    #[test]
    fn test_layouts_build_identical_documents() {
        let regular = parse_fixture("calculator_regular.feature");
        let tab_aligned = parse_fixture("calculator_tab_aligned.feature");
        let condensed = parse_fixture("calculator_condensed.feature");
        assert_eq!(regular, tab_aligned);
        assert_eq!(regular, condensed);
    }

    #[test]
    fn test_hello_world() {
        let feature = parse_fixture("hello_world.feature");
        assert_eq!(feature.title(), "Hello World");
        assert_eq!(feature.tags(), ["wip"]);
        assert_eq!(
            feature.description(),
            "The world is a beautiful place\nSo let people be nice to each other"
        );
        assert!(feature.background().is_none());

        let scenario = &feature.scenarios()[0];
        assert_eq!(scenario.tags(), ["nice", "people"]);
        let steps: Vec<(StepType, &str)> = scenario
            .steps()
            .iter()
            .map(|s| (s.step_type(), s.text()))
            .collect();
        assert_eq!(
            steps,
            vec![
                (StepType::Given, r#"a nice person called "Bob""#),
                (StepType::And, r#"a nice person called "Lisa""#),
                (StepType::When, r#""Bob" says to "Lisa": "Hello!""#),
                (StepType::Then, r#""Lisa" should reply to "Bob": "Hello!""#),
            ]
        );
    }

    #[test]
    fn test_step_tables_and_backtick_docstrings() {
        let feature = parse_fixture("step_tables.feature");
        let steps = feature.scenarios()[0].steps();
        let table = steps[0].table().expect("table");
        assert_eq!(table.header().map(<[String]>::len), Some(2));
        assert_eq!(table.rows()[2], ["bob", "bob@example.com"]);
        assert!(steps[1].table().is_none() && steps[1].py_string().is_none());
        assert_eq!(
            steps[2].py_string().map(ToString::to_string).as_deref(),
            Some("alice\nbob\n")
        );
    }
}

mod inline_tests {
    use gherkin_core::ast::ScenarioNode;
    use gherkin_core::parse_feature;

    #[test]
    fn test_parsing_minimal_no_scenarios() {
        let feature = parse_feature("Feature: Hello World").unwrap();
        assert_eq!(feature.title(), "Hello World");
        assert!(feature.background().is_none());
        assert!(feature.scenarios().is_empty());
    }

    #[test]
    fn test_parsing_minimal_no_steps() {
        let feature = parse_feature("Feature: Hello World\nScenario: Nice people").unwrap();
        assert_eq!(feature.scenarios().len(), 1);
        assert!(matches!(feature.scenarios()[0], ScenarioNode::Scenario(_)));
        assert!(feature.scenarios()[0].steps().is_empty());
    }

    #[test]
    fn test_tags_scope_to_the_next_header_only() {
        let feature = parse_feature(
            "Feature: Tags\n@first\nScenario: One\nGiven a\n@second @third\nScenario: Two\nGiven b\nScenario: Three",
        )
        .unwrap();
        assert!(feature.tags().is_empty());
        let tags: Vec<&[String]> = feature.scenarios().iter().map(ScenarioNode::tags).collect();
        assert_eq!(tags[0], ["first"]);
        assert_eq!(tags[1], ["second", "third"]);
        assert!(tags[2].is_empty());
    }

    #[test]
    fn test_background_tags_do_not_leak_to_scenarios() {
        let feature =
            parse_feature("Feature: F\n@setup\nBackground:\nGiven x\nScenario: S\nGiven y")
                .unwrap();
        assert_eq!(feature.background().map(|b| b.tags()), Some(&["setup".to_string()][..]));
        assert!(feature.tags().is_empty());
        assert!(feature.scenarios()[0].tags().is_empty());
        assert_eq!(feature.scenarios()[0].steps()[0].text(), "y");
    }

    #[test]
    fn test_comment_inside_description() {
        let feature = parse_feature("Feature: F\n  first\n  # note\n  second\n").unwrap();
        assert_eq!(feature.description(), "first\nsecond");
    }

    #[test]
    fn test_tags_over_several_lines() {
        let feature = parse_feature("@a\n@b @c\nFeature: F").unwrap();
        assert_eq!(feature.tags(), ["a", "b", "c"]);
    }

    #[test]
    fn test_outline_without_examples() {
        let feature = parse_feature("Feature: F\nScenario Outline: O\nGiven <x>").unwrap();
        let outline = feature.scenarios()[0].as_outline().unwrap();
        assert!(outline.examples().is_none());
        assert_eq!(outline.steps.len(), 1);
    }

    #[test]
    fn test_single_line_document() {
        let feature = parse_feature(
            "@t Feature: One line Background: Scenario: First Scenario Outline: Second",
        )
        .unwrap();
        assert_eq!(feature.title(), "One line");
        assert_eq!(feature.tags(), ["t"]);
        assert!(feature.background().is_some());
        let titles: Vec<&str> = feature.scenarios().iter().map(ScenarioNode::title).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }
}
