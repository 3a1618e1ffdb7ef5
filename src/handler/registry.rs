//! Handler registry mapping tag names to rendering logic

use std::collections::HashMap;
use std::fmt;

use crate::error::ExecError;
use crate::handler::methods::{dispatch_first, DotDispatch};
use crate::parser::ast::{BlockTag, Tag};

/// Renders a plain tag
pub type HandlerFn = Box<dyn Fn(&Tag) -> Result<String, ExecError> + Send + Sync>;

/// Renders a block tag. The handler receives the registry so it can execute
/// the block's body; whether and how it does so is up to the handler.
pub type BlockHandlerFn =
    Box<dyn Fn(&BlockTag, &HandlerMux) -> Result<String, ExecError> + Send + Sync>;

/// The user-specified functions used for turning tags into strings.
///
/// Populate the registry before rendering; afterwards it is only read and
/// may be shared between threads.
#[derive(Default)]
pub struct HandlerMux {
    funcs: HashMap<String, HandlerFn>,
    block_funcs: HashMap<String, BlockHandlerFn>,
    default: Option<HandlerFn>,
}

impl HandlerMux {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for a plain tag, replacing any previous one
    pub fn register_tag<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&Tag) -> Result<String, ExecError> + Send + Sync + 'static,
    {
        self.funcs.insert(name.into(), Box::new(handler));
        self
    }

    /// Register the handler for a block tag
    pub fn register_block_tag<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&BlockTag, &HandlerMux) -> Result<String, ExecError> + Send + Sync + 'static,
    {
        self.block_funcs.insert(name.into(), Box::new(handler));
        self
    }

    /// Register the fallback for plain tags without a handler of their own
    pub fn register_default<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&Tag) -> Result<String, ExecError> + Send + Sync + 'static,
    {
        self.default = Some(Box::new(handler));
        self
    }

    /// Bind a tag name to an object whose methods are selected by the tag's
    /// first dot command: `{{product.name}}` calls `Name` on `target`.
    pub fn bind<D>(&mut self, name: impl Into<String>, target: D) -> &mut Self
    where
        D: DotDispatch + 'static,
    {
        let name = name.into();
        let tag_name = name.clone();
        self.register_tag(name, move |tag: &Tag| dispatch_first(&tag_name, &target, tag))
    }

    /// Get the handler registered for a plain tag
    pub fn get(&self, name: &str) -> Option<&HandlerFn> {
        self.funcs.get(name)
    }

    /// Get the handler registered for a block tag
    pub fn get_block(&self, name: &str) -> Option<&BlockHandlerFn> {
        self.block_funcs.get(name)
    }

    pub fn get_default(&self) -> Option<&HandlerFn> {
        self.default.as_ref()
    }

    /// Names of all tags with a block handler, sorted. Pass these to
    /// [`parse`](crate::parse) so the same identifiers are parsed as blocks.
    pub fn block_handlers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.block_funcs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for HandlerMux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("HandlerMux")
            .field("tags", &tags)
            .field("blocks", &self.block_handlers())
            .field("default", &self.default.is_some())
            .finish()
    }
}
