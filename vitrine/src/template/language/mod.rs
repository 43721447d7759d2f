//! Implementation of the template language.
//!
//! Includes the parser, the runtime, and the storefront tag and filter
//! extensions layered on top of the base grammar.
pub mod expression;
pub mod filter;
pub mod op;
pub mod program;
pub mod statement;
pub mod tag;
pub mod term;

pub use expression::Expression;
pub use filter::{Filter, FilterCall};
pub use op::Op;
pub use program::Program;
pub use statement::Statement;
pub use tag::{Tag, TagStatement};
pub use term::Term;
