use crate::ast::StepType;

/// Represents the different kinds of tokens that the lexer can produce.
/// Each token is one logical statement of a Gherkin document, independent of
/// how the statements are spread over physical lines.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenType {
    // == Special Tokens ==
    /// Represents the end of the input.
    Eof,
    /// A `#` line. The text holds the comment without the leading `#`.
    Comment,

    // == Headers ==
    /// A run of `@tag` words. The text holds the raw run, e.g. `@wip @slow`.
    TagLine,
    /// `Feature:`, the text holds the title.
    FeatureKeyword,
    /// `Background:`, the text holds the (usually empty) title.
    BackgroundKeyword,
    /// `Scenario:`, the text holds the title.
    ScenarioKeyword,
    /// `Scenario Outline:`, the text holds the title.
    OutlineKeyword,
    /// `Examples:`, the text holds the (usually empty) title.
    ExamplesKeyword,

    // == Body ==
    /// A step keyword at a statement boundary. The text holds the step text.
    StepKeyword(StepType),
    /// An opening or closing `"""` / ```` ``` ```` fence. For an opening fence
    /// the text holds the content type written after it, if any.
    PyStringDelimiter,
    /// One raw body line of an open PyString, line terminator included.
    PyStringLine,
    /// A `|`-led row, trimmed.
    TableRow,
    /// Anything else, trimmed.
    FreeText,
}

impl TokenType {
    /// Short description used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenType::Eof => "end of input",
            TokenType::Comment => "comment",
            TokenType::TagLine => "tags",
            TokenType::FeatureKeyword => "Feature header",
            TokenType::BackgroundKeyword => "Background header",
            TokenType::ScenarioKeyword => "Scenario header",
            TokenType::OutlineKeyword => "Scenario Outline header",
            TokenType::ExamplesKeyword => "Examples header",
            TokenType::StepKeyword(_) => "step",
            TokenType::PyStringDelimiter => "PyString delimiter",
            TokenType::PyStringLine => "PyString line",
            TokenType::TableRow => "table row",
            TokenType::FreeText => "free text",
        }
    }
}

/// A token with its type, text and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub ttype: TokenType,
    pub text: String,
    /// 1-based line of the token start.
    pub line: usize,
    /// 0-based char column of the token start within its line.
    pub column: usize,
    pub pos_start: usize,
    pub pos_end: usize,
}

impl Token {
    pub fn new(
        ttype: TokenType,
        text: String,
        line: usize,
        column: usize,
        pos_start: usize,
        pos_end: usize,
    ) -> Token {
        Token {
            ttype,
            text,
            line,
            column,
            pos_start,
            pos_end,
        }
    }
}

// Longest keyword first: "Scenario Outline:" must win over "Scenario:".
const SECTION_KEYWORDS: [(&str, TokenType); 5] = [
    ("Feature:", TokenType::FeatureKeyword),
    ("Background:", TokenType::BackgroundKeyword),
    ("Scenario Outline:", TokenType::OutlineKeyword),
    ("Scenario:", TokenType::ScenarioKeyword),
    ("Examples:", TokenType::ExamplesKeyword),
];

const STEP_KEYWORDS: [(&str, StepType); 5] = [
    ("Given", StepType::Given),
    ("When", StepType::When),
    ("Then", StepType::Then),
    ("And", StepType::And),
    ("But", StepType::But),
];

const FENCES: [&str; 2] = ["\"\"\"", "```"];

/// Keyword-anchored scanner over a single linear character stream.
///
/// Every call to [`Lexer::next_token`] starts at a statement boundary: the
/// start of a line, the end of a tag run, a section keyword found inside the
/// previous statement, or the end of a closing PyString fence.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    line_start: usize,
    fence: Option<&'static str>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            line: 1,
            line_start: 0,
            fence: None,
            finished: false,
        }
    }

    pub fn lex(&mut self) -> Vec<Token> {
        self.by_ref().collect()
    }

    pub fn next_token(&mut self) -> Token {
        if let Some(fence) = self.fence {
            return self.read_pystring_line(fence);
        }

        self.skip_blank();
        let start = self.position;
        let line = self.line;
        let column = self.column_of(start);
        let rest = self.rest();

        if rest.is_empty() {
            return Token::new(TokenType::Eof, String::new(), line, column, start, start);
        }

        let at_line_start = self.input[self.line_start..start].trim().is_empty();

        let (ttype, text) = if at_line_start && rest.starts_with('#') {
            self.position += 1;
            (TokenType::Comment, self.read_to_eol().trim().to_string())
        } else if rest.starts_with('@') {
            (TokenType::TagLine, self.read_tags().to_string())
        } else if let Some(fence) = FENCES.iter().copied().find(|f| rest.starts_with(f)) {
            self.position += fence.len();
            let content_type = self.read_to_eol().trim().to_string();
            self.consume_newline();
            self.fence = Some(fence);
            (TokenType::PyStringDelimiter, content_type)
        } else if rest.starts_with('|') {
            (TokenType::TableRow, self.read_to_eol().trim().to_string())
        } else if let Some((keyword, ttype)) = SECTION_KEYWORDS
            .iter()
            .find(|(keyword, _)| rest.starts_with(keyword))
        {
            self.position += keyword.len();
            (*ttype, self.read_segment())
        } else if let Some((keyword, step_type)) = match_step_keyword(rest) {
            self.position += keyword.len();
            (TokenType::StepKeyword(step_type), self.read_segment())
        } else {
            (TokenType::FreeText, self.read_segment())
        };

        Token::new(ttype, text, line, column, start, self.position)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn column_of(&self, position: usize) -> usize {
        self.input[self.line_start..position].chars().count()
    }

    fn skip_blank(&mut self) {
        while let Some(c) = self.rest().chars().next() {
            if !c.is_whitespace() {
                break;
            }
            self.position += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.line_start = self.position;
            }
        }
    }

    fn consume_newline(&mut self) {
        if self.rest().starts_with('\n') {
            self.position += 1;
            self.line += 1;
            self.line_start = self.position;
        }
    }

    /// Consumes up to, but not including, the next line feed.
    fn read_to_eol(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest.find('\n').unwrap_or(rest.len());
        self.position += end;
        &rest[..end]
    }

    fn read_tags(&mut self) -> &'a str {
        let start = self.position;
        let mut end = start;
        loop {
            let rest = self.rest();
            let word = rest.find(char::is_whitespace).unwrap_or(rest.len());
            self.position += word;
            end = self.position;

            let rest = self.rest();
            let gap = rest.len() - rest.trim_start_matches([' ', '\t', '\r']).len();
            self.position += gap;
            if !self.rest().starts_with('@') {
                break;
            }
        }
        &self.input[start..end]
    }

    /// Reads a title, step text or free text: the rest of the physical line,
    /// cut short at a section keyword written further along the same line.
    fn read_segment(&mut self) -> String {
        let rest = self.rest();
        let line = &rest[..rest.find('\n').unwrap_or(rest.len())];
        let cut = find_embedded_keyword(line).unwrap_or(line.len());
        self.position += cut;
        line[..cut].trim().to_string()
    }

    fn read_pystring_line(&mut self, fence: &'static str) -> Token {
        let start = self.position;
        let line = self.line;
        let rest = self.rest();

        if rest.is_empty() {
            let column = self.column_of(start);
            return Token::new(TokenType::Eof, String::new(), line, column, start, start);
        }

        let line_len = rest.find('\n').map_or(rest.len(), |i| i + 1);
        let raw = &rest[..line_len];
        let trimmed = raw.trim_start_matches([' ', '\t']);

        if trimmed.starts_with(fence) {
            let lead = raw.len() - trimmed.len();
            let column = raw[..lead].chars().count();
            self.position += lead + fence.len();
            self.fence = None;
            return Token::new(
                TokenType::PyStringDelimiter,
                String::new(),
                line,
                column,
                start + lead,
                self.position,
            );
        }

        self.position += line_len;
        if raw.ends_with('\n') {
            self.line += 1;
            self.line_start = self.position;
        }
        Token::new(
            TokenType::PyStringLine,
            raw.to_string(),
            line,
            0,
            start,
            self.position,
        )
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.ttype == TokenType::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

fn match_step_keyword(rest: &str) -> Option<(&'static str, StepType)> {
    STEP_KEYWORDS.iter().copied().find(|(keyword, _)| {
        rest.strip_prefix(keyword)
            .is_some_and(|after| after.chars().next().map_or(true, char::is_whitespace))
    })
}

/// Byte offset of the first section keyword inside `line` that is preceded by
/// whitespace.
fn find_embedded_keyword(line: &str) -> Option<usize> {
    SECTION_KEYWORDS
        .iter()
        .flat_map(|(keyword, _)| line.match_indices(*keyword))
        .map(|(idx, _)| idx)
        .filter(|&idx| idx > 0 && line[..idx].ends_with(char::is_whitespace))
        .min()
}
