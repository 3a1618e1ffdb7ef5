//! Execution of a parsed document against a [`HandlerMux`]

use tracing::trace;

use crate::error::ExecError;
use crate::handler::HandlerMux;
use crate::parser::ast::{BlockTag, Document, Node, Tag, Text};

impl Document {
    /// Execute every node in order and concatenate the results. The first
    /// failing node aborts execution; no partial output is returned.
    pub fn execute(&self, mux: &HandlerMux) -> Result<String, ExecError> {
        let mut output = String::new();
        for node in &self.nodes {
            output.push_str(&node.execute(mux)?);
        }
        Ok(output)
    }
}

impl Node {
    pub fn execute(&self, mux: &HandlerMux) -> Result<String, ExecError> {
        match self {
            Node::Text(text) => text.execute(mux),
            Node::Tag(tag) => tag.execute(mux),
            Node::Block(block) => block.execute(mux),
        }
    }
}

impl Text {
    /// Text renders as itself and never fails
    pub fn execute(&self, _mux: &HandlerMux) -> Result<String, ExecError> {
        Ok(self.text.clone())
    }
}

impl Tag {
    /// Invoke the tag's handler, falling back to the default handler
    pub fn execute(&self, mux: &HandlerMux) -> Result<String, ExecError> {
        if let Some(handler) = mux.get(&self.name) {
            trace!(tag = %self.name, "executing tag");
            return handler(self);
        }
        if let Some(handler) = mux.get_default() {
            trace!(tag = %self.name, "executing tag with default handler");
            return handler(self);
        }
        Err(ExecError::HandlerNotDefined {
            tag: self.name.clone(),
            location: self.location.clone(),
        })
    }
}

impl BlockTag {
    /// Invoke the block handler. Rendering the body is the handler's job.
    pub fn execute(&self, mux: &HandlerMux) -> Result<String, ExecError> {
        let handler = mux
            .get_block(&self.name)
            .ok_or_else(|| ExecError::BlockHandlerNotDefined {
                tag: self.name.clone(),
            })?;
        trace!(block = %self.name, "executing block tag");
        handler(self, mux)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn wrap_bold(mux: &mut HandlerMux) {
        mux.register_block_tag("bold", |block, mux| {
            Ok(format!("<bold>{}</bold>", block.body.execute(mux)?))
        });
    }

    #[test]
    fn test_text_only() {
        let doc = parse("test", "Just text", &[]).unwrap();
        assert_eq!(doc.execute(&HandlerMux::new()).unwrap(), "Just text");
    }

    #[test]
    fn test_tags_are_replaced() {
        let mut mux = HandlerMux::new();
        mux.register_tag("greeting", |_| Ok("Hello there".to_string()))
            .register_tag("name", |_| Ok("tim".to_string()));
        let doc = parse("exectest", "A greeting: {{greeting}}, {{name}}!", &[]).unwrap();
        assert_eq!(doc.execute(&mux).unwrap(), "A greeting: Hello there, tim!");
    }

    #[test]
    fn test_missing_handler() {
        let mut mux = HandlerMux::new();
        mux.register_tag("name", |_| Ok("tim".to_string()));
        let doc = parse("exectest", "A greeting: {{greeting}}, {{name}}!", &[]).unwrap();
        let err = doc.execute(&mux).unwrap_err();
        assert_eq!(
            err.to_string(),
            "exectest:1:15: Exec error - Handler not defined for tag: greeting"
        );
    }

    #[test]
    fn test_default_handler() {
        let mut mux = HandlerMux::new();
        mux.register_tag("foo", |_| Ok("FOO".to_string()))
            .register_default(|tag| Ok(format!("[{}]", tag.name)));
        let doc = parse("test", "{{foo}} {{bar}}", &[]).unwrap();
        assert_eq!(doc.execute(&mux).unwrap(), "FOO [bar]");
    }

    #[test]
    fn test_block_handler_renders_body() {
        let mut mux = HandlerMux::new();
        wrap_bold(&mut mux);
        let doc = parse("test", "Some {{bold}}emphasis{{/bold}}", &mux.block_handlers()).unwrap();
        assert_eq!(doc.execute(&mux).unwrap(), "Some <bold>emphasis</bold>");
    }

    #[test]
    fn test_block_handler_may_skip_body() {
        let mut mux = HandlerMux::new();
        mux.register_block_tag("hidden", |_, _| Ok(String::new()));
        let doc = parse("test", "a{{hidden}}{{undefined}}{{/hidden}}b", &["hidden"]).unwrap();
        // the body's tag has no handler, but it is never executed
        assert_eq!(doc.execute(&mux).unwrap(), "ab");
    }

    #[test]
    fn test_missing_block_handler() {
        let doc = parse("test", "{{bold}}x{{/bold}}", &["bold"]).unwrap();
        let err = doc.execute(&HandlerMux::new()).unwrap_err();
        assert_eq!(err.to_string(), "Block Handler not defined for tag: bold");
    }

    #[test]
    fn test_first_error_aborts() {
        let mut mux = HandlerMux::new();
        mux.register_tag("ok", |_| Ok("ok".to_string()))
            .register_tag("bad", |_| Err(ExecError::handler("boom")));
        let doc = parse("test", "{{ok}}{{bad}}{{ok}}", &[]).unwrap();
        assert_eq!(doc.execute(&mux).unwrap_err(), ExecError::handler("boom"));
    }

    #[test]
    fn test_errors_propagate_out_of_blocks() {
        let mut mux = HandlerMux::new();
        wrap_bold(&mut mux);
        let doc = parse("test", "{{bold}}{{missing}}{{/bold}}", &["bold"]).unwrap();
        assert!(matches!(
            doc.execute(&mux),
            Err(ExecError::HandlerNotDefined { ref tag, .. }) if tag == "missing"
        ));
    }
}
