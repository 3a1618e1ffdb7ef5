//! Dot-command dispatch for bound objects
//!
//! A tag bound with [`HandlerMux::bind`](crate::HandlerMux::bind) routes its
//! first dot command to a named method: `{{product.name['9000']}}` calls the
//! method `Name` with the argument `9000`, `{{product.adjective}}` calls
//! `Adjective` with no argument. Methods are registered explicitly in a
//! [`MethodTable`], or by implementing [`DotDispatch`] directly.

use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::error::ExecError;
use crate::parser::ast::Tag;

/// An object that can answer dot commands by method name
pub trait DotDispatch: Send + Sync {
    /// Invoke `method` with the dot command's argument, if it had one.
    /// Returns `None` when there is no method by that name.
    fn dispatch(&self, method: &str, argument: Option<&str>) -> Option<Result<String, ExecError>>;
}

impl<F> DotDispatch for F
where
    F: Fn(&str, Option<&str>) -> Option<Result<String, ExecError>> + Send + Sync,
{
    fn dispatch(&self, method: &str, argument: Option<&str>) -> Option<Result<String, ExecError>> {
        self(method, argument)
    }
}

type Nullary<T> = Box<dyn Fn(&T) -> Result<String, ExecError> + Send + Sync>;
type Unary<T> = Box<dyn Fn(&T, &str) -> Result<String, ExecError> + Send + Sync>;

enum Method<T> {
    Nullary(Nullary<T>),
    Unary(Unary<T>),
}

impl<T> Method<T> {
    fn arity(&self) -> usize {
        match self {
            Method::Nullary(_) => 0,
            Method::Unary(_) => 1,
        }
    }
}

/// A target value plus an explicit table of its callable methods
pub struct MethodTable<T> {
    target: T,
    methods: HashMap<String, Method<T>>,
}

impl<T> MethodTable<T>
where
    T: Send + Sync,
{
    pub fn new(target: T) -> Self {
        Self {
            target,
            methods: HashMap::new(),
        }
    }

    /// Add a method called without an argument, as in `{{product.adjective}}`
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&T) -> Result<String, ExecError> + Send + Sync + 'static,
    {
        self.methods
            .insert(name.into(), Method::Nullary(Box::new(method)));
        self
    }

    /// Add a method called with the dot command's argument, as in
    /// `{{product.name['9000']}}`
    pub fn method_with_arg<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&T, &str) -> Result<String, ExecError> + Send + Sync + 'static,
    {
        self.methods
            .insert(name.into(), Method::Unary(Box::new(method)));
        self
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }
}

impl<T> DotDispatch for MethodTable<T>
where
    T: Send + Sync,
{
    fn dispatch(&self, method: &str, argument: Option<&str>) -> Option<Result<String, ExecError>> {
        let found = self.methods.get(method)?;
        let result = match (found, argument) {
            (Method::Nullary(f), None) => f(&self.target),
            (Method::Unary(f), Some(arg)) => f(&self.target, arg),
            (found, argument) => Err(ExecError::MethodArity {
                method: method.to_string(),
                expected: found.arity(),
                given: usize::from(argument.is_some()),
            }),
        };
        Some(result)
    }
}

impl<T: fmt::Debug> fmt::Debug for MethodTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("MethodTable")
            .field("target", &self.target)
            .field("methods", &names)
            .finish()
    }
}

/// The method name a dot command maps to: its first char uppercased
pub fn method_name(dot_command: &str) -> String {
    let mut chars = dot_command.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Run the tag's first dot command against `target`. Any further dot
/// commands in the chain are ignored; a tag without dot commands renders as
/// an empty string.
pub(crate) fn dispatch_first(
    tag_name: &str,
    target: &dyn DotDispatch,
    tag: &Tag,
) -> Result<String, ExecError> {
    let Some(command) = tag.first_dot_command() else {
        return Ok(String::new());
    };
    let method = method_name(&command.name);
    let argument = command.argument.as_ref().map(|a| a.as_str());
    trace!(tag = tag_name, method = %method, ?argument, "dispatching dot command");

    target
        .dispatch(&method, argument)
        .unwrap_or_else(|| {
            Err(ExecError::UndefinedMethod {
                method,
                tag: tag_name.to_string(),
            })
        })
}
