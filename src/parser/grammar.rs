//! Recursive-descent parser for Braai documents
//!
//! ```text
//! Document   := (Text | Tag)*
//! Tag        := '{{' ( BlockTag | RegularTag )
//! BlockTag   := BlockIdentifier '}}' Document CloseMarker Name '}}'
//! RegularTag := Identifier Argument? DotCommand* QuotedArgument* Attribute* '}}'
//! DotCommand := '.' Identifier Argument?
//! Argument   := ParenthesizedArgument | BracketedArgument
//! Attribute  := Identifier '=' QuotedArgument
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::ParseError;
use crate::parser::ast::*;
use crate::parser::lexer::{Scanner, Token, TokenKind};

/// Parse a document into an AST.
///
/// `source_name` only appears in diagnostics. Identifiers listed in
/// `block_tags` are parsed as block tags and must be closed with
/// `{{/name}}`.
pub fn parse(source_name: &str, input: &str, block_tags: &[&str]) -> Result<Document, ParseError> {
    let result = Parser::new(source_name, input, block_tags).parse();
    match &result {
        Ok(doc) => debug!(source = source_name, nodes = doc.len(), "parsed document"),
        Err(err) => debug!(source = source_name, error = %err, "parse failed"),
    }
    result
}

struct Parser<'a> {
    scanner: Scanner<'a>,
    locator: Locator<'a>,
    /// one token of lookahead
    pending: Option<Token>,
}

/// A block whose closer has not been seen yet
struct OpenBlock {
    name: String,
    location: Location,
    /// nodes of the enclosing document parsed before the opener
    enclosing: Vec<Node>,
}

impl<'a> Parser<'a> {
    fn new(source_name: &'a str, input: &'a str, block_tags: &[&str]) -> Self {
        Self {
            scanner: Scanner::new(input, block_tags),
            locator: Locator::new(source_name, input),
            pending: None,
        }
    }

    /// Parse text and tags until end of input. Open blocks are kept on an
    /// explicit stack; `nodes` always collects the innermost open document.
    fn parse(mut self) -> Result<Document, ParseError> {
        let mut open: Vec<OpenBlock> = Vec::new();
        let mut nodes = Vec::new();
        loop {
            let token = self.next();
            match token.kind {
                TokenKind::Text => nodes.push(Node::Text(Text::new(token.text))),
                TokenKind::TagOpen => {
                    let ident = self.next();
                    match ident.kind {
                        TokenKind::BlockIdentifier => {
                            let location = self.locate(ident.position);
                            self.expect(TokenKind::TagClose, "'}}'")?;
                            open.push(OpenBlock {
                                name: ident.text,
                                location,
                                enclosing: std::mem::take(&mut nodes),
                            });
                        }
                        TokenKind::Identifier => {
                            self.backup(ident);
                            nodes.push(Node::Tag(self.regular_tag()?));
                        }
                        _ => return Err(self.unexpected(&ident, "tag name")),
                    }
                }
                TokenKind::CloseMarker => {
                    let Some(block) = open.pop() else {
                        return Err(self.syntax(token.position, "Unexpected closing tag"));
                    };
                    self.block_closer(&block.name)?;
                    let body = std::mem::replace(&mut nodes, block.enclosing);
                    nodes.push(Node::Block(BlockTag {
                        name: block.name,
                        body: Document::new(body),
                        location: block.location,
                    }));
                }
                TokenKind::EndOfInput => {
                    return match open.last() {
                        Some(block) => {
                            let message = format!("Unclosed block tag: {}", block.name);
                            Err(self.syntax(token.position, message))
                        }
                        None => Ok(Document::new(nodes)),
                    }
                }
                _ => return Err(self.unexpected(&token, "text or '{{'")),
            }
        }
    }

    /// The name and `}}` following `{{/`, which must match the opener
    fn block_closer(&mut self, opener: &str) -> Result<(), ParseError> {
        // An undeclared closer name still scans, as a plain identifier
        let closer = self.next();
        if !matches!(
            closer.kind,
            TokenKind::BlockIdentifier | TokenKind::Identifier
        ) {
            return Err(self.unexpected(&closer, "closing tag name"));
        }
        if closer.text != opener {
            return Err(self.syntax(
                closer.position,
                format!(
                    "Mismatched block tag, opener: {}, closer: {}",
                    opener, closer.text
                ),
            ));
        }
        self.expect(TokenKind::TagClose, "'}}'")?;
        Ok(())
    }

    fn regular_tag(&mut self) -> Result<Tag, ParseError> {
        let ident = self.expect(TokenKind::Identifier, "tag name")?;
        let location = self.locate(ident.position);

        let mut arguments = Vec::new();
        if let Some(argument) = self.single_argument() {
            arguments.push(argument.text);
        }
        let dot_commands = self.dot_commands();
        arguments.extend(self.argument_list());
        let attributes = self.attributes()?;
        self.expect(TokenKind::TagClose, "'}}'")?;

        Ok(Tag {
            name: ident.text,
            dot_commands,
            arguments,
            attributes,
            location,
        })
    }

    fn single_argument(&mut self) -> Option<SingleArgument> {
        let token = self.next();
        match token.kind {
            TokenKind::ParenthesizedArgument | TokenKind::BracketedArgument => {
                Some(SingleArgument::new(token.text))
            }
            _ => {
                self.backup(token);
                None
            }
        }
    }

    fn dot_commands(&mut self) -> Vec<DotCommand> {
        let mut commands = Vec::new();
        loop {
            let token = self.next();
            if token.kind != TokenKind::DotCommand {
                self.backup(token);
                return commands;
            }
            let argument = self.single_argument();
            commands.push(DotCommand::new(token.text, argument));
        }
    }

    fn argument_list(&mut self) -> Vec<String> {
        let mut arguments = Vec::new();
        loop {
            let token = self.next();
            if token.kind != TokenKind::QuotedArgument {
                self.backup(token);
                return arguments;
            }
            arguments.push(token.text);
        }
    }

    fn attributes(&mut self) -> Result<BTreeMap<String, String>, ParseError> {
        let mut attributes = BTreeMap::new();
        loop {
            let token = self.next();
            match token.kind {
                TokenKind::TagClose => {
                    self.backup(token);
                    return Ok(attributes);
                }
                TokenKind::Identifier | TokenKind::BlockIdentifier => {
                    self.expect(TokenKind::Assign, "'=' after attribute name")?;
                    let value = self.expect(TokenKind::QuotedArgument, "attribute value")?;
                    attributes.insert(token.text, value.text);
                }
                _ => return Err(self.unexpected(&token, "attribute or '}}'")),
            }
        }
    }

    fn next(&mut self) -> Token {
        match self.pending.take() {
            Some(token) => token,
            None => self.scanner.next_token(),
        }
    }

    fn backup(&mut self, token: Token) {
        debug_assert!(self.pending.is_none(), "parser lookahead overflow");
        self.pending = Some(token);
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        let token = self.next();
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.unexpected(&token, expected))
        }
    }

    fn locate(&mut self, offset: usize) -> Location {
        self.locator.locate(offset)
    }

    fn syntax(&mut self, offset: usize, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            location: self.locate(offset),
            message: message.into(),
        }
    }

    /// Lexical errors take precedence over the grammar's expectations
    fn unexpected(&mut self, token: &Token, expected: &str) -> ParseError {
        if token.kind == TokenKind::Error {
            return ParseError::Lexical {
                location: self.locate(token.position),
                message: token.text.clone(),
            };
        }
        let found = match token.kind {
            TokenKind::TagOpen
            | TokenKind::TagClose
            | TokenKind::CloseMarker
            | TokenKind::Assign
            | TokenKind::EndOfInput => token.kind.to_string(),
            _ => format!("{} '{}'", token.kind, token.text),
        };
        self.syntax(
            token.position,
            format!("Unexpected {}, expected {}", found, expected),
        )
    }
}
