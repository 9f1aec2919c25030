use crate::ast::Feature;
use crate::builder::DocumentBuilder;
use crate::error::GherkinError;
use crate::events::{Dispatcher, EventLog, NodeEventProcessor};
use crate::parser::Parser;
use crate::trace::TraceListener;
use std::fmt;

/// Two-phase Gherkin parser.
///
/// `parse` validates the whole input and records an [`EventLog`]; `execute`
/// replays that log to the registered listeners. The log can be replayed any
/// number of times without parsing again.
///
/// Listeners may borrow from the caller for `'l`, so a borrowed
/// [`DocumentBuilder`] can be read back once the parser is dropped.
pub struct GherkinParser<'l> {
    source: String,
    name: String,
    events: Option<EventLog>,
    dispatcher: Dispatcher<'l>,
}

impl<'l> GherkinParser<'l> {
    pub fn new(source: impl Into<String>) -> Self {
        Self::new_with_name(source, "source.feature")
    }

    pub fn new_with_name(source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
            events: None,
            dispatcher: Dispatcher::new(),
        }
    }

    /// Resets the parse state. Registered listeners are kept.
    pub fn init(&mut self) -> &mut Self {
        self.events = None;
        self
    }

    /// Scans and validates the input, replacing any earlier event log.
    ///
    /// # Errors
    /// Returns the earliest grammar violation; no event log is kept in that case.
    pub fn parse(&mut self) -> Result<(), GherkinError> {
        self.events = None;
        let events = Parser::new_with_name(&self.source, self.name.clone()).parse_events()?;
        self.events = Some(events);
        Ok(())
    }

    pub fn with_listener(&mut self, listener: impl NodeEventProcessor + 'l) -> &mut Self {
        self.dispatcher.add_listener(listener);
        self
    }

    /// Registers a callback receiving one formatted line per event.
    pub fn with_trace_handler(
        &mut self,
        handler: impl FnMut(fmt::Arguments<'_>) + 'l,
    ) -> &mut Self {
        self.dispatcher.set_trace(TraceListener::new(handler));
        self
    }

    /// Replays the event log to every registered listener.
    ///
    /// Does nothing when there is no successfully parsed log.
    pub fn execute(&mut self) {
        match &self.events {
            Some(events) => self.dispatcher.dispatch(events),
            None => log::warn!("execute called on {} without a successful parse", self.name),
        }
    }

    pub fn events(&self) -> Option<&EventLog> {
        self.events.as_ref()
    }
}

/// A [`GherkinParser`] that always builds the document tree on `execute`.
pub struct GherkinDomParser<'l> {
    parser: GherkinParser<'l>,
    builder: DocumentBuilder,
}

impl<'l> GherkinDomParser<'l> {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            parser: GherkinParser::new(source),
            builder: DocumentBuilder::new(),
        }
    }

    pub fn new_with_name(source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            parser: GherkinParser::new_with_name(source, name),
            builder: DocumentBuilder::new(),
        }
    }

    pub fn init(&mut self) -> &mut Self {
        self.parser.init();
        self.builder = DocumentBuilder::new();
        self
    }

    /// # Errors
    /// Returns the earliest grammar violation.
    pub fn parse(&mut self) -> Result<(), GherkinError> {
        self.parser.parse()
    }

    pub fn with_listener(&mut self, listener: impl NodeEventProcessor + 'l) -> &mut Self {
        self.parser.with_listener(listener);
        self
    }

    pub fn with_trace_handler(
        &mut self,
        handler: impl FnMut(fmt::Arguments<'_>) + 'l,
    ) -> &mut Self {
        self.parser.with_trace_handler(handler);
        self
    }

    /// Builds the document, then notifies the other registered listeners.
    pub fn execute(&mut self) {
        if let Some(events) = self.parser.events() {
            events.replay(&mut self.builder);
        }
        self.parser.execute();
    }

    /// The built document; empty until a successful `parse` + `execute`.
    pub fn feature(&self) -> &Feature {
        self.builder.feature()
    }

    pub fn events(&self) -> Option<&EventLog> {
        self.parser.events()
    }
}

/// Parses a Gherkin document and returns its [`Feature`].
///
/// This is the primary entry point when only the document tree is needed.
///
/// # Errors
///
/// Returns a `GherkinError` carrying the line of the earliest grammar violation.
pub fn parse_feature(source: &str) -> Result<Feature, GherkinError> {
    parse_feature_with_name(source, "source.feature")
}

/// Like [`parse_feature`], naming the source in diagnostics.
///
/// # Errors
///
/// Returns a `GherkinError` carrying the line of the earliest grammar violation.
pub fn parse_feature_with_name(source: &str, file_name: &str) -> Result<Feature, GherkinError> {
    let events = Parser::new_with_name(source, file_name.to_string()).parse_events()?;
    let mut builder = DocumentBuilder::new();
    events.replay(&mut builder);
    Ok(builder.into_feature())
}
