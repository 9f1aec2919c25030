pub mod api;
pub mod ast;
pub mod builder;
pub mod error;
pub mod events;
pub mod lexer;
pub mod parser;
pub mod trace;
mod serialization;
mod utils;

pub use api::{parse_feature, parse_feature_with_name, GherkinDomParser, GherkinParser};
pub use error::{GherkinError, ParserError};
