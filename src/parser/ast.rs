//! Abstract Syntax Tree types for Braai documents
//!
//! Every node exclusively owns its children. The tree is built once by the
//! parser and never mutated afterwards; execution and visiting only borrow it.

use std::collections::BTreeMap;
use std::fmt;

pub use super::lexer::Span;

/// Source position captured at parse time, displayed as `source:line:column`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub source_name: String,
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in chars from the start of the line
    pub column: usize,
    /// Byte offset into the source
    pub offset: usize,
}

impl Location {
    /// Compute the line and column of a byte offset within `input`
    pub fn locate(source_name: &str, input: &str, offset: usize) -> Self {
        Locator::new(source_name, input).locate(offset)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source_name, self.line, self.column)
    }
}

/// Computes [`Location`]s for a sequence of offsets into one input.
///
/// Each call resumes from the previous offset, so locating offsets in
/// increasing order costs one pass over the input in total. Locating an
/// earlier offset restarts from the beginning.
#[derive(Debug, Clone)]
pub struct Locator<'a> {
    source_name: &'a str,
    input: &'a str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> Locator<'a> {
    pub fn new(source_name: &'a str, input: &'a str) -> Self {
        Self {
            source_name,
            input,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn locate(&mut self, offset: usize) -> Location {
        let offset = floor_char_boundary(self.input, offset);
        if offset < self.offset {
            self.offset = 0;
            self.line = 1;
            self.column = 1;
        }
        let skipped = &self.input[self.offset..offset];
        match skipped.rfind('\n') {
            Some(last) => {
                self.line += skipped.bytes().filter(|&b| b == b'\n').count();
                self.column = skipped[last + 1..].chars().count() + 1;
            }
            None => self.column += skipped.chars().count(),
        }
        self.offset = offset;
        Location {
            source_name: self.source_name.to_string(),
            line: self.line,
            column: self.column,
            offset,
        }
    }
}

/// Largest char boundary of `input` at or below `offset`
pub(crate) fn floor_char_boundary(input: &str, offset: usize) -> usize {
    let mut offset = offset.min(input.len());
    while !input.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Root AST node - a complete document, or the body of a block tag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

// Nested bodies are torn down from an explicit stack so that deeply nested
// blocks cannot exhaust the call stack.
impl Drop for Document {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.nodes);
        while let Some(node) = pending.pop() {
            if let Node::Block(mut block) = node {
                pending.append(&mut block.body.nodes);
            }
        }
    }
}

/// A child of a [`Document`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Text outside of any tag: `Dear `
    Text(Text),
    /// A regular tag: `{{product.name['9000'] size="big"}}`
    Tag(Tag),
    /// A block tag: `{{callout}}...{{/callout}}`
    Block(BlockTag),
}

/// Text devoid of tags, rendered verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub text: String,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A non-block tag with its dot commands, arguments and attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub dot_commands: Vec<DotCommand>,
    /// The argument directly following the name, if any, then the bare
    /// quoted arguments in source order
    pub arguments: Vec<String>,
    /// `key="value"` pairs; a repeated key keeps its last value
    pub attributes: BTreeMap<String, String>,
    pub location: Location,
}

impl Tag {
    /// Look up an attribute value
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// The first dot command, the only one used by bound method tables
    pub fn first_dot_command(&self) -> Option<&DotCommand> {
        self.dot_commands.first()
    }
}

/// A `.name` suffix of a tag, with at most one argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotCommand {
    pub name: String,
    pub argument: Option<SingleArgument>,
}

impl DotCommand {
    pub fn new(name: impl Into<String>, argument: Option<SingleArgument>) -> Self {
        Self {
            name: name.into(),
            argument,
        }
    }
}

/// The value of a `(...)` or `[...]` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleArgument {
    pub text: String,
}

impl SingleArgument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// A block tag such as `foo` in `{{foo}}Content {{bar(1234)}}{{/foo}}`.
/// Everything between the opener and the closer is the `body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTag {
    pub name: String,
    pub body: Document,
    pub location: Location,
}
