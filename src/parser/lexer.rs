//! Scanner for Braai documents
//!
//! The scanner is a pull-based state machine. Every call to
//! [`Scanner::next_token`] runs state transitions until one of them emits a
//! token. Text outside of `{{ }}` markers passes through untouched; inside a
//! marker the scanner recognizes identifiers, dot commands, arguments and
//! modifiers, and silently drops whitespace, commas and newlines.

use std::collections::HashSet;
use std::fmt;

use tracing::trace;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

const LEFT_META: &str = "{{";

/// The kinds of lexemes produced by the [`Scanner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Opaque text outside of any tag
    Text,
    /// `{{`
    TagOpen,
    /// `}}`
    TagClose,
    /// An identifier declared as a block tag
    BlockIdentifier,
    /// `{{/`
    CloseMarker,
    /// `(1234)`, delimiters stripped
    ParenthesizedArgument,
    /// `'foo'` or `"foo"`, quotes stripped. Boolean modifier values are
    /// reported with this kind as well.
    QuotedArgument,
    /// `['foo']`, brackets and quotes stripped
    BracketedArgument,
    /// `.name`, dot stripped
    DotCommand,
    /// `=`
    Assign,
    Identifier,
    EndOfInput,
    /// A lexical error; the token text holds the message
    Error,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Text => "text",
            TokenKind::TagOpen => "'{{'",
            TokenKind::TagClose => "'}}'",
            TokenKind::BlockIdentifier => "block identifier",
            TokenKind::CloseMarker => "'{{/'",
            TokenKind::ParenthesizedArgument => "parenthesized argument",
            TokenKind::QuotedArgument => "quoted argument",
            TokenKind::BracketedArgument => "bracketed argument",
            TokenKind::DotCommand => "dot command",
            TokenKind::Assign => "'='",
            TokenKind::Identifier => "identifier",
            TokenKind::EndOfInput => "end of input",
            TokenKind::Error => "lexical error",
        };
        f.write_str(name)
    }
}

/// A scanned lexeme and the byte offset where it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, position: usize, text: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            text: text.into(),
        }
    }

    /// True for the tokens after which the scanner produces nothing new
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, TokenKind::EndOfInput | TokenKind::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    LeftMeta,
    InsideAction,
    Space,
    Identifier,
    DotCommand,
    ParenthesizedArgument,
    QuotedArgument(char),
    BracketedArgument,
    ModifierValue,
    RightMeta,
    EndOfInput,
    Done,
}

/// Converts a document into [`Token`]s on demand
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    block_tags: HashSet<String>,
    state: State,
    /// start of the lexeme being scanned
    start: usize,
    pos: usize,
    /// width in bytes of the last char read
    width: usize,
    exhausted: bool,
}

impl<'a> Scanner<'a> {
    /// Create a scanner for `input`. Identifiers listed in `block_tags` are
    /// reported as [`TokenKind::BlockIdentifier`].
    pub fn new(input: &'a str, block_tags: &[&str]) -> Self {
        Self {
            input,
            block_tags: block_tags.iter().map(|s| s.to_string()).collect(),
            state: State::Text,
            start: 0,
            pos: 0,
            width: 0,
            exhausted: false,
        }
    }

    /// Produce the next token. Once the input is exhausted, or a lexical
    /// error was reported, every further call yields `EndOfInput`.
    pub fn next_token(&mut self) -> Token {
        loop {
            if let Some(token) = self.step() {
                trace!(kind = ?token.kind, position = token.position, text = %token.text, "token");
                return token;
            }
        }
    }

    fn step(&mut self) -> Option<Token> {
        match self.state {
            State::Text => self.lex_text(),
            State::LeftMeta => Some(self.lex_left_meta()),
            State::InsideAction => self.lex_inside_action(),
            State::Space => {
                self.accept_while(is_space);
                self.ignore();
                self.state = State::InsideAction;
                None
            }
            State::Identifier => Some(self.lex_identifier()),
            State::DotCommand => {
                self.accept_while(is_dot_command_char);
                self.state = State::InsideAction;
                Some(self.emit(TokenKind::DotCommand))
            }
            State::ParenthesizedArgument => Some(self.lex_parenthesized_argument()),
            State::QuotedArgument(opener) => Some(self.lex_quoted_argument(opener)),
            State::BracketedArgument => Some(self.lex_bracketed_argument()),
            State::ModifierValue => self.lex_modifier_value(),
            State::RightMeta => Some(self.lex_right_meta()),
            State::EndOfInput | State::Done => {
                self.state = State::Done;
                Some(Token::new(TokenKind::EndOfInput, self.input.len(), ""))
            }
        }
    }

    fn lex_text(&mut self) -> Option<Token> {
        match self.input[self.pos..].find(LEFT_META) {
            Some(offset) => {
                self.pos += offset;
                self.state = State::LeftMeta;
            }
            None => {
                self.pos = self.input.len();
                self.state = State::EndOfInput;
            }
        }
        (self.pos > self.start).then(|| self.emit(TokenKind::Text))
    }

    fn lex_left_meta(&mut self) -> Token {
        self.pos += LEFT_META.len();
        self.state = State::InsideAction;
        if self.peek() == Some('/') {
            self.pos += 1;
            self.emit(TokenKind::CloseMarker)
        } else {
            self.emit(TokenKind::TagOpen)
        }
    }

    fn lex_inside_action(&mut self) -> Option<Token> {
        let Some(c) = self.next_char() else {
            return Some(self.error("Unexpected end of action"));
        };
        match c {
            c if c.is_alphabetic() => self.state = State::Identifier,
            ' ' | '\t' => self.state = State::Space,
            '}' => self.state = State::RightMeta,
            '.' => {
                self.ignore();
                self.state = State::DotCommand;
            }
            '(' => {
                self.ignore();
                self.state = State::ParenthesizedArgument;
            }
            '\'' | '"' => {
                self.ignore();
                self.state = State::QuotedArgument(c);
            }
            '[' => {
                self.ignore();
                self.state = State::BracketedArgument;
            }
            '=' => {
                self.state = State::ModifierValue;
                return Some(self.emit(TokenKind::Assign));
            }
            // separators inside a tag carry no meaning
            ',' | '\n' | '\r' => self.ignore(),
            other => {
                return Some(self.error(format!("Unexpected character {}", describe_char(other))))
            }
        }
        None
    }

    fn lex_identifier(&mut self) -> Token {
        self.accept_while(is_identifier_char);
        self.state = State::InsideAction;
        if self.block_tags.contains(&self.input[self.start..self.pos]) {
            self.emit(TokenKind::BlockIdentifier)
        } else {
            self.emit(TokenKind::Identifier)
        }
    }

    fn lex_parenthesized_argument(&mut self) -> Token {
        self.accept_while(|c| c.is_ascii_alphanumeric() || c == ' ');
        if self.peek() != Some(')') {
            return self.error("Missing closing parenthesis on argument");
        }
        let token = self.emit(TokenKind::ParenthesizedArgument);
        self.pos += 1;
        self.ignore();
        self.state = State::InsideAction;
        token
    }

    fn lex_quoted_argument(&mut self, opener: char) -> Token {
        loop {
            match self.next_char() {
                Some(c) if c == opener => {
                    self.backup();
                    let token = self.emit(TokenKind::QuotedArgument);
                    self.pos += opener.len_utf8();
                    self.ignore();
                    self.state = State::InsideAction;
                    return token;
                }
                Some(_) => {}
                None => return self.error("Unterminated quoted argument"),
            }
        }
    }

    /// `['A Tag']` or `["A Tag"]`, with balanced quotes
    fn lex_bracketed_argument(&mut self) -> Token {
        let opener = match self.next_char() {
            Some(c @ ('\'' | '"')) => c,
            _ => return self.error("Malformed bracketed argument, expected quote"),
        };
        self.ignore();
        loop {
            match self.next_char() {
                Some(c) if c == opener => {
                    if self.peek() != Some(']') {
                        return self.error("Malformed bracketed argument, expected ]");
                    }
                    self.backup();
                    let token = self.emit(TokenKind::BracketedArgument);
                    self.pos += opener.len_utf8() + 1;
                    self.ignore();
                    self.state = State::InsideAction;
                    return token;
                }
                Some(_) => {}
                None => return self.error("Unterminated bracketed argument"),
            }
        }
    }

    fn lex_modifier_value(&mut self) -> Option<Token> {
        match self.peek() {
            Some(c @ ('\'' | '"')) => {
                self.pos += 1;
                self.ignore();
                self.state = State::QuotedArgument(c);
                None
            }
            Some(c) if c.is_alphabetic() => {
                self.accept_while(is_identifier_char);
                match &self.input[self.start..self.pos] {
                    "true" | "false" => {
                        self.state = State::InsideAction;
                        Some(self.emit(TokenKind::QuotedArgument))
                    }
                    _ => Some(self.error("Malformed modifier")),
                }
            }
            _ => Some(self.error("Malformed modifier")),
        }
    }

    fn lex_right_meta(&mut self) -> Token {
        if self.next_char() == Some('}') {
            self.state = State::Text;
            self.emit(TokenKind::TagClose)
        } else {
            self.error("Malformed end of Braai tag, should be }}")
        }
    }

    fn next_char(&mut self) -> Option<char> {
        match self.input[self.pos..].chars().next() {
            Some(c) => {
                self.width = c.len_utf8();
                self.pos += self.width;
                Some(c)
            }
            None => {
                self.width = 0;
                None
            }
        }
    }

    /// Step back over the last char read. Only valid once per `next_char`.
    fn backup(&mut self) {
        self.pos -= self.width;
        self.width = 0;
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn accept_while(&mut self, accept: impl Fn(char) -> bool) {
        while let Some(c) = self.peek().filter(|&c| accept(c)) {
            self.pos += c.len_utf8();
        }
    }

    fn ignore(&mut self) {
        self.start = self.pos;
    }

    fn emit(&mut self, kind: TokenKind) -> Token {
        let token = Token::new(kind, self.start, &self.input[self.start..self.pos]);
        self.start = self.pos;
        token
    }

    fn error(&mut self, message: impl Into<String>) -> Token {
        self.state = State::Done;
        Token::new(TokenKind::Error, self.start, message)
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    /// Yields tokens up to and including the first `EndOfInput` or `Error`
    fn next(&mut self) -> Option<Token> {
        if self.exhausted {
            return None;
        }
        let token = self.next_token();
        self.exhausted = token.is_terminal();
        Some(token)
    }
}

impl std::iter::FusedIterator for Scanner<'_> {}

fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == ':'
}

fn is_dot_command_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn describe_char(c: char) -> String {
    format!("U+{:04X} '{}'", c as u32, c)
}

/// Scan `input` completely, stopping after the first terminal token
pub fn lex(input: &str, block_tags: &[&str]) -> Vec<Token> {
    Scanner::new(input, block_tags).collect()
}
