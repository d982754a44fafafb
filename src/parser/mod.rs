// View DSL Parser Module

pub mod ast;
pub mod axes;
pub mod family;
pub mod filter;
pub mod interaction;
pub mod lexer;
pub mod pipeline;
pub mod toggles;

// Public API re-exports
pub use ast::{ViewRequest, ViewScript};
pub use pipeline::{parse_script, parse_view};
