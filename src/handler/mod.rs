//! Handler registration and dispatch
//!
//! Callers map tag names to rendering logic before executing a document:
//!
//! ```text
//! {{greeting}}                  -> register_tag("greeting", ...)
//! {{callout}}...{{/callout}}    -> register_block_tag("callout", ...)
//! {{anything_else}}             -> register_default(...)
//! {{product.name['9000']}}      -> bind("product", MethodTable::new(..).method_with_arg("Name", ..))
//! ```

mod methods;
mod registry;

pub use methods::{method_name, DotDispatch, MethodTable};
pub use registry::{BlockHandlerFn, HandlerFn, HandlerMux};
