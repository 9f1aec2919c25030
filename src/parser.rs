use crate::ast::StepType;
use crate::error::{GherkinError, ParserError};
use crate::events::{EventLog, NodeEvent, NodePayload, NodeType};
use crate::lexer::{Lexer, Token, TokenType};
use crate::utils::{join_description, split_row_cells, strip_indent};
use miette::NamedSource;
use std::sync::Arc;

const AFTER_TAGS: &str = "a Feature, Background, Scenario or Scenario Outline after tags";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    FeatureHeader,
    FeatureBody,
    Background,
    Scenario,
    Outline,
    Step { has_argument: bool },
    PyString,
    Table(TableOwner),
    Examples,
    ExamplesDone,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableOwner {
    Step,
    Examples,
}

#[derive(Debug)]
struct PendingFeature {
    title: String,
    tags: Vec<String>,
    description: Vec<String>,
    line: usize,
    last_line: usize,
    gap: bool,
}

#[derive(Debug)]
struct PendingPyString {
    indent: usize,
    lines: Vec<String>,
    line: usize,
    pos_start: usize,
    pos_end: usize,
}

#[derive(Debug)]
struct PendingTable {
    rows: Vec<Vec<String>>,
    line: usize,
}

/// The Gherkin grammar engine: a token-driven state machine that validates the
/// document and records node lifecycle events.
///
/// Constructs close implicitly: a token that does not fit the open construct
/// first ends it (and its parents, as far as needed) before opening its own.
#[derive(Debug)]
pub struct Parser<'a> {
    source: Arc<NamedSource<String>>,
    source_text: &'a str,
    state: State,
    open: Vec<NodeType>,
    events: Vec<NodeEvent>,
    pending_tags: Vec<String>,
    feature: Option<PendingFeature>,
    pystring: Option<PendingPyString>,
    table: Option<PendingTable>,
    scenario_kind: Option<NodeType>,
    has_background: bool,
    examples_seen: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source_text: &'a str) -> Self {
        Self::new_with_name(source_text, "source.feature".to_string())
    }

    pub fn new_with_name(source_text: &'a str, name: String) -> Self {
        let source = Arc::new(NamedSource::new(name, source_text.to_string()));
        Self {
            source,
            source_text,
            state: State::Start,
            open: Vec::new(),
            events: Vec::new(),
            pending_tags: Vec::new(),
            feature: None,
            pystring: None,
            table: None,
            scenario_kind: None,
            has_background: false,
            examples_seen: false,
        }
    }

    /// Runs the scanner and the grammar to completion.
    ///
    /// On success the full event log is returned; on the first violation the
    /// error is returned and every event recorded so far is discarded.
    pub fn parse_events(mut self) -> Result<EventLog, GherkinError> {
        for token in Lexer::new(self.source_text) {
            if token.ttype == TokenType::Comment {
                self.skip_comment(&token);
                continue;
            }
            log::trace!("{:?} <- {:?} {:?}", self.state, token.ttype, token.text);
            self.accept(token)?;
        }
        debug_assert_eq!(self.state, State::Done);
        debug_assert!(self.open.is_empty());
        log::debug!("parsed {} events", self.events.len());
        Ok(EventLog::new(self.events))
    }

    // === Grammar ===

    fn accept(&mut self, token: Token) -> Result<(), GherkinError> {
        if self.state == State::PyString {
            return self.accept_in_pystring(token);
        }

        if self.state == State::Start
            && !matches!(token.ttype, TokenType::TagLine | TokenType::FeatureKeyword)
        {
            return self.err_missing_feature(&token);
        }

        if token.ttype == TokenType::TableRow {
            return self.accept_row(&token);
        }

        if let State::Table(owner) = self.state {
            self.flush_table(owner);
        }

        if self.state == State::FeatureHeader {
            if token.ttype == TokenType::FreeText {
                self.push_description(&token);
                return Ok(());
            }
            self.flush_feature();
        }

        if !self.pending_tags.is_empty()
            && !matches!(
                token.ttype,
                TokenType::TagLine
                    | TokenType::FeatureKeyword
                    | TokenType::BackgroundKeyword
                    | TokenType::ScenarioKeyword
                    | TokenType::OutlineKeyword
            )
        {
            return self.err_unexpected(&token, AFTER_TAGS);
        }

        match token.ttype {
            TokenType::TagLine => {
                self.pending_tags.extend(
                    token
                        .text
                        .split_whitespace()
                        .filter_map(|tag| tag.strip_prefix('@'))
                        .filter(|tag| !tag.is_empty())
                        .map(str::to_string),
                );
                Ok(())
            }
            TokenType::FeatureKeyword => self.begin_feature(token),
            TokenType::BackgroundKeyword => self.begin_background(token),
            TokenType::ScenarioKeyword | TokenType::OutlineKeyword => self.begin_scenario(token),
            TokenType::StepKeyword(step_type) => self.begin_step(step_type, token),
            TokenType::PyStringDelimiter => self.begin_pystring(&token),
            TokenType::ExamplesKeyword => self.begin_examples(&token),
            TokenType::Eof => self.finish(&token),
            TokenType::FreeText
            | TokenType::PyStringLine
            | TokenType::TableRow
            | TokenType::Comment => {
                let expected = self.expected_here();
                self.err_unexpected(&token, expected)
            }
        }
    }

    fn begin_feature(&mut self, token: Token) -> Result<(), GherkinError> {
        if self.state != State::Start {
            return self.err_unexpected(&token, "a single Feature per document");
        }
        self.feature = Some(PendingFeature {
            title: token.text,
            tags: std::mem::take(&mut self.pending_tags),
            description: Vec::new(),
            line: token.line,
            last_line: token.line,
            gap: false,
        });
        self.state = State::FeatureHeader;
        Ok(())
    }

    fn push_description(&mut self, token: &Token) {
        if let Some(feature) = self.feature.as_mut() {
            let gap = feature.gap || token.line > feature.last_line + 1;
            if gap && !feature.description.is_empty() {
                feature.description.push(String::new());
            }
            feature.description.push(token.text.clone());
            feature.last_line = token.line;
            feature.gap = false;
        }
    }

    /// Comments inside a Feature description occupy a line without being a
    /// paragraph break.
    fn skip_comment(&mut self, token: &Token) {
        if self.state != State::FeatureHeader {
            return;
        }
        if let Some(feature) = self.feature.as_mut() {
            if token.line > feature.last_line + 1 {
                feature.gap = true;
            }
            feature.last_line = token.line;
        }
    }

    fn flush_feature(&mut self) {
        if let Some(feature) = self.feature.take() {
            let payload = NodePayload::Feature {
                title: feature.title,
                description: join_description(&feature.description),
                tags: feature.tags,
            };
            self.begin_node(feature.line, payload);
            self.state = State::FeatureBody;
        }
    }

    fn begin_background(&mut self, token: Token) -> Result<(), GherkinError> {
        if self.state != State::FeatureBody {
            let expected = if self.has_background {
                "a single Background per Feature"
            } else {
                "the Background before the first Scenario"
            };
            return self.err_unexpected(&token, expected);
        }
        let payload = NodePayload::Background {
            title: token.text,
            tags: std::mem::take(&mut self.pending_tags),
        };
        self.begin_node(token.line, payload);
        self.scenario_kind = Some(NodeType::Background);
        self.has_background = true;
        self.state = State::Background;
        Ok(())
    }

    fn begin_scenario(&mut self, token: Token) -> Result<(), GherkinError> {
        if self.state == State::Examples {
            return self.err_unexpected(&token, "a table after Examples");
        }
        self.close_to(NodeType::Feature);

        let tags = std::mem::take(&mut self.pending_tags);
        let (payload, node_type, state) = if token.ttype == TokenType::OutlineKeyword {
            let payload = NodePayload::Outline {
                title: token.text,
                tags,
            };
            (payload, NodeType::Outline, State::Outline)
        } else {
            let payload = NodePayload::Scenario {
                title: token.text,
                tags,
            };
            (payload, NodeType::Scenario, State::Scenario)
        };
        self.begin_node(token.line, payload);
        self.scenario_kind = Some(node_type);
        self.examples_seen = false;
        self.state = state;
        Ok(())
    }

    fn begin_step(&mut self, step_type: StepType, token: Token) -> Result<(), GherkinError> {
        match self.state {
            State::Background | State::Scenario | State::Outline => {}
            State::Step { .. } => self.end_node(NodeType::Step),
            State::ExamplesDone => {
                return self.err_unexpected(
                    &token,
                    "a Scenario header, steps may not follow Examples",
                );
            }
            _ => return self.err_unexpected(&token, "a Background or Scenario header before steps"),
        }
        self.begin_node(
            token.line,
            NodePayload::Step {
                step_type,
                text: token.text,
            },
        );
        self.state = State::Step {
            has_argument: false,
        };
        Ok(())
    }

    fn begin_pystring(&mut self, token: &Token) -> Result<(), GherkinError> {
        match self.state {
            State::Step {
                has_argument: false,
            } => {
                self.pystring = Some(PendingPyString {
                    indent: token.column,
                    lines: Vec::new(),
                    line: token.line,
                    pos_start: token.pos_start,
                    pos_end: token.pos_end,
                });
                self.state = State::PyString;
                Ok(())
            }
            State::Step { has_argument: true } => {
                self.err_unexpected(token, "a new step, this step already has an argument")
            }
            _ => self.err_unexpected(token, "a step before a PyString"),
        }
    }

    fn accept_in_pystring(&mut self, token: Token) -> Result<(), GherkinError> {
        match token.ttype {
            TokenType::PyStringLine => {
                if let Some(pystring) = self.pystring.as_mut() {
                    let line = strip_indent(&token.text, pystring.indent);
                    pystring.lines.push(line);
                }
                Ok(())
            }
            TokenType::PyStringDelimiter => {
                if let Some(pystring) = self.pystring.take() {
                    self.leaf(
                        pystring.line,
                        NodePayload::PyString {
                            lines: pystring.lines,
                        },
                    );
                }
                self.state = State::Step { has_argument: true };
                Ok(())
            }
            TokenType::Eof => {
                let (line, start, end) = self
                    .pystring
                    .as_ref()
                    .map_or((token.line, token.pos_start, token.pos_end), |p| {
                        (p.line, p.pos_start, p.pos_end)
                    });
                Err(ParserError::UnterminatedPyString {
                    src: (*self.source).clone(),
                    span: (start, end - start).into(),
                    line,
                }
                .into())
            }
            _ => self.err_unexpected(&token, "a PyString line or closing delimiter"),
        }
    }

    fn accept_row(&mut self, token: &Token) -> Result<(), GherkinError> {
        if !self.pending_tags.is_empty() {
            return self.err_unexpected(token, AFTER_TAGS);
        }
        let cells = split_row_cells(&token.text);
        match self.state {
            State::Table(_) => {
                if let Some(table) = self.table.as_mut() {
                    let expected = table.rows.first().map_or(cells.len(), Vec::len);
                    if cells.len() != expected {
                        return Err(ParserError::RaggedTable {
                            src: (*self.source).clone(),
                            span: (token.pos_start, token.pos_end - token.pos_start).into(),
                            line: token.line,
                            expected,
                            found: cells.len(),
                        }
                        .into());
                    }
                    table.rows.push(cells);
                }
                Ok(())
            }
            State::Step {
                has_argument: false,
            } => {
                self.start_table(token, cells, TableOwner::Step);
                Ok(())
            }
            State::Examples => {
                self.start_table(token, cells, TableOwner::Examples);
                Ok(())
            }
            State::Step { has_argument: true } => {
                self.err_unexpected(token, "a new step, this step already has an argument")
            }
            _ => Err(ParserError::MisplacedTable {
                src: (*self.source).clone(),
                span: (token.pos_start, token.pos_end - token.pos_start).into(),
                line: token.line,
            }
            .into()),
        }
    }

    fn start_table(&mut self, token: &Token, header: Vec<String>, owner: TableOwner) {
        self.table = Some(PendingTable {
            rows: vec![header],
            line: token.line,
        });
        self.state = State::Table(owner);
    }

    fn flush_table(&mut self, owner: TableOwner) {
        if let Some(table) = self.table.take() {
            self.leaf(table.line, NodePayload::Table { rows: table.rows });
        }
        self.state = match owner {
            TableOwner::Step => State::Step { has_argument: true },
            TableOwner::Examples => State::ExamplesDone,
        };
    }

    fn begin_examples(&mut self, token: &Token) -> Result<(), GherkinError> {
        if self.scenario_kind != Some(NodeType::Outline) {
            return self.err_unexpected(token, "Examples only inside a Scenario Outline");
        }
        if self.examples_seen || !matches!(self.state, State::Outline | State::Step { .. }) {
            return self.err_unexpected(token, "a single Examples block per Scenario Outline");
        }
        self.close_to(NodeType::Outline);
        self.begin_node(token.line, NodePayload::OutlineExamples);
        self.examples_seen = true;
        self.state = State::Examples;
        Ok(())
    }

    fn finish(&mut self, token: &Token) -> Result<(), GherkinError> {
        if self.state == State::Examples {
            return self.err_unexpected(token, "a table after Examples");
        }
        while let Some(node_type) = self.open.pop() {
            self.events.push(NodeEvent::End(node_type));
        }
        self.state = State::Done;
        Ok(())
    }

    fn expected_here(&self) -> &'static str {
        match self.state {
            State::Background | State::Scenario | State::Outline => "a step keyword",
            State::Step { has_argument: false } => "a step keyword, a table or a PyString",
            State::Step { has_argument: true } => "a step keyword",
            State::Examples => "a table after Examples",
            State::ExamplesDone => "a Scenario or Scenario Outline header",
            _ => "a Background, Scenario or Scenario Outline header",
        }
    }

    // === Event Helpers ===

    fn begin_node(&mut self, line: usize, payload: NodePayload) {
        self.open.push(payload.node_type());
        self.events.push(NodeEvent::Begin { line, payload });
    }

    fn end_node(&mut self, node_type: NodeType) {
        if self.open.last() == Some(&node_type) {
            self.open.pop();
            self.events.push(NodeEvent::End(node_type));
        }
    }

    /// Emits a Begin/End pair for a node without children.
    fn leaf(&mut self, line: usize, payload: NodePayload) {
        let node_type = payload.node_type();
        self.events.push(NodeEvent::Begin { line, payload });
        self.events.push(NodeEvent::End(node_type));
    }

    /// Ends open nodes until `target` is on top of the stack.
    fn close_to(&mut self, target: NodeType) {
        while let Some(&top) = self.open.last() {
            if top == target {
                break;
            }
            self.end_node(top);
        }
    }

    // === Errors ===

    fn err_missing_feature<T>(&self, token: &Token) -> Result<T, GherkinError> {
        Err(ParserError::MissingFeature {
            src: (*self.source).clone(),
            span: (token.pos_start, token.pos_end - token.pos_start).into(),
            line: token.line,
        }
        .into())
    }

    fn err_unexpected<T>(&self, token: &Token, expected: &str) -> Result<T, GherkinError> {
        let span = (token.pos_start, token.pos_end - token.pos_start).into();
        let err = if token.ttype == TokenType::Eof {
            ParserError::UnexpectedEof {
                src: (*self.source).clone(),
                span,
                line: token.line,
                expected: expected.to_string(),
            }
        } else {
            ParserError::UnexpectedToken {
                src: (*self.source).clone(),
                span,
                line: token.line,
                expected: expected.to_string(),
                found: token.ttype.describe().to_string(),
            }
        };
        Err(err.into())
    }
}
