pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod syntax;
#[cfg(test)]
mod tests;

pub use self::parser::{Parser, ParserOptions, parse};
use std::{fmt::Display, result::Result as STDResult};
use thiserror::Error;

pub type Result<T> = STDResult<T, SyntaxError>;

/// Malformed source text. Parsing stops at the first one.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{line}:{column}: {message}")]
pub struct SyntaxError {
	pub message: String,
	pub line: usize,
	pub column: usize
}

impl SyntaxError {
	pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
		Self {message: message.into(), line, column}
	}

	/// Whether the source simply ended too early, which an interactive prompt
	/// can fix by reading another line.
	pub fn is_incomplete(&self) -> bool {
		self.message.ends_with("'<eof>'")
			|| self.message.starts_with("unfinished")
	}
}

/// Message templates for syntax errors. Arguments are referred to as `{0}`,
/// `{1}` and so on, see [`render`](message::render).
pub mod message {
	use super::Display;

	pub const UNEXPECTED_SYMBOL: &str = "unexpected symbol near '{0}'";
	pub const EXPECTED_SYMBOL: &str = "'{0}' expected near '{1}'";
	pub const MALFORMED_NUMBER: &str = "malformed number near '{0}'";
	pub const AMBIGUOUS_SYNTAX_FUNCTION_CALL: &str =
		"ambiguous syntax (function call x new statement) near '{0}'";
	pub const TOO_MANY_LEVELS: &str = "chunk has too many syntax levels";
	pub const UNFINISHED_STRING: &str = "unfinished string near '{0}'";
	pub const UNFINISHED_LONG: &str = "unfinished long string or comment";
	pub const INVALID_LONG_DELIMITER: &str = "invalid long string delimiter";
	pub const INVALID_ESCAPE: &str = "invalid escape sequence '\\{0}'";
	pub const ESCAPE_TOO_LARGE: &str = "escape sequence too large near '\\{0}'";

	/// Substitutes `{n}` in `template` with the nth argument. Placeholders
	/// without a matching argument are left as they are.
	pub fn render(template: &str, arguments: &[&dyn Display]) -> String {
		let mut result = String::with_capacity(template.len());
		let mut rest = template;

		while let Some(start) = rest.find('{') {
			result.push_str(&rest[..start]);
			let after = &rest[start + 1..];

			match after.find('}').and_then(|end| Some((end,
					arguments.get(after[..end].parse::<usize>().ok()?)?))) {
				Some((end, argument)) => {
					result.push_str(&argument.to_string());
					rest = &after[end + 1..];
				},
				None => {
					result.push('{');
					rest = after;
				}
			}
		}

		result.push_str(rest);
		result
	}
}
