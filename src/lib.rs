//! Braai - a small tag-replacement templating engine
//!
//! Documents are plain text interleaved with tags delimited by `{{` and
//! `}}`. A tag names a handler and may carry dot commands, positional
//! arguments and attributes; block tags enclose a body and are closed with
//! `{{/name}}`.
//!
//! # Example
//!
//! ```rust
//! use braai::{render, HandlerMux};
//!
//! let mut mux = HandlerMux::new();
//! mux.register_tag("greeting", |_| Ok("Hello".to_string()));
//! mux.register_block_tag("callout", |block, mux| {
//!     Ok(format!("<c>{}</c>", block.body.execute(mux)?))
//! });
//!
//! let out = render("page", "{{callout}}{{greeting}}!{{/callout}}", &mux).unwrap();
//! assert_eq!(out, "<c>Hello!</c>");
//! ```

pub mod config;
pub mod error;
mod exec;
pub mod handler;
pub mod parser;
pub mod visitor;

pub use config::{ConfigError, EngineConfig};
pub use error::{ExecError, ParseError};
pub use handler::{method_name, BlockHandlerFn, DotDispatch, HandlerFn, HandlerMux, MethodTable};
pub use parser::{
    parse, BlockTag, Document, DotCommand, Location, Node, Scanner, SingleArgument, Tag, Text,
    Token, TokenKind,
};
pub use visitor::{AttributeCollector, CompositeVisitor, TagCollector, Visitor};

use thiserror::Error;
use tracing::debug;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Error during parsing
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error during execution
    #[error("exec error: {0}")]
    Exec(#[from] ExecError),
}

/// Parse and execute `input` in one step. Every block handler registered on
/// `mux` is treated as a block tag while parsing.
pub fn render(source_name: &str, input: &str, mux: &HandlerMux) -> Result<String, RenderError> {
    let doc = parse(source_name, input, &mux.block_handlers())?;
    debug!(source = source_name, nodes = doc.len(), "executing document");
    Ok(doc.execute(mux)?)
}

/// Like [`render`], with the source name taken from `config` and the
/// config's block tags added to those registered on `mux`
pub fn render_with_config(
    input: &str,
    config: &EngineConfig,
    mux: &HandlerMux,
) -> Result<String, RenderError> {
    let config = config.clone().with_block_tags(mux.block_handlers());
    let doc = config.parse(input)?;
    debug!(source = %config.source_name, nodes = doc.len(), "executing document");
    Ok(doc.execute(mux)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mux() -> HandlerMux {
        let mut mux = HandlerMux::new();
        mux.register_tag("greeting", |_| Ok("Hello".to_string()))
            .register_block_tag("callout", |block, mux| {
                Ok(format!("<c>{}</c>", block.body.execute(mux)?))
            });
        mux
    }

    #[test]
    fn test_render_text_only() {
        assert_eq!(render("test", "plain text", &mux()).unwrap(), "plain text");
    }

    #[test]
    fn test_render_tag() {
        assert_eq!(
            render("test", "The {{greeting}}!", &mux()).unwrap(),
            "The Hello!"
        );
    }

    #[test]
    fn test_render_block_from_registered_handlers() {
        assert_eq!(
            render("test", "{{callout}}X{{/callout}}", &mux()).unwrap(),
            "<c>X</c>"
        );
    }

    #[test]
    fn test_render_parse_error() {
        let err = render("test", "Text {{", &mux()).unwrap_err();
        assert!(matches!(err, RenderError::Parse(ParseError::Lexical { .. })));
        assert_eq!(
            err.to_string(),
            "parse error: test:1:8: Lexical Error - Unexpected end of action"
        );
    }

    #[test]
    fn test_render_exec_error() {
        let err = render("test", "{{mystery}}", &mux()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Exec(ExecError::HandlerNotDefined { .. })
        ));
    }

    #[test]
    fn test_render_with_config_merges_block_tags() {
        let mut mux = mux();
        mux.register_default(|tag| Ok(format!("[{}]", tag.name)));
        let config = EngineConfig::new()
            .with_source_name("article")
            .with_block_tag("aside");

        // `aside` is a block tag with no handler, so parsing succeeds but
        // execution fails; `callout` still comes from the registry.
        assert_eq!(
            render_with_config("{{callout}}{{x}}{{/callout}}", &config, &mux).unwrap(),
            "<c>[x]</c>"
        );
        let err = render_with_config("{{aside}}a{{/aside}}", &config, &mux).unwrap_err();
        assert_eq!(
            err.to_string(),
            "exec error: Block Handler not defined for tag: aside"
        );
    }

    #[test]
    fn test_render_with_config_uses_source_name() {
        let config = EngineConfig::new().with_source_name("article");
        let err = render_with_config("{{/callout}}", &config, &mux()).unwrap_err();
        assert!(err.to_string().starts_with("parse error: article:1:1:"));
    }
}
