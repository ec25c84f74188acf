#![forbid(
	// Rationale: A Lua front end must be reliable, and should not be vulnerable
	// to sandbox escape vulnerabilities.
	unsafe_code
)]
#![warn(
	// Rationale: Panics should be avoided in favor of returning a Result, and
	// situations where panics are intentional should be well documented
	// (requiring an allow attribute to signal complete documentation).
	clippy::unwrap_used,
	clippy::panic,

	// Rationale: These should not be in production code.
	clippy::todo,
	clippy::unimplemented
)]
#![allow(
	// Rationale: Tabs are superior, don't at me.
	clippy::tabs_in_doc_comments
)]
//! Selenite is a Lua 5.1 front end and value runtime, written entirely in safe
//! Rust. Selenite is a crystal named after the moon, which is what lua means.
//!
//! The crate is made of two halves.
//! - [ast] - The lexer and parser, responsible for turning Lua source text into
//!   a syntax tree that prints back as equivalent source
//! - [vm] - The runtime, responsible for Lua values, tables, metatables and the
//!   semantics of every operator, metamethods included
//! A base library for the runtime is provided within [lua_lib].
//!
//! Selenite does not evaluate syntax trees itself; walking the tree and
//! applying [vm::ops] for each node is left to the embedder.
//!
//! Examples
//! --------
//! Parsing gives a [Block](ast::syntax::Block), which prints back as source.
//! ```rust
//! use selenite::ast;
//!
//! let block = ast::parse("local x = 1 + 2 * 3").unwrap();
//! assert_eq!(block.to_string().trim(), "local x = 1 + 2 * 3");
//! ```
//! Operators run against a [Context](vm::Context), which holds the globals and
//! everything else metamethod dispatch needs.
//! ```rust
//! use selenite::{varargs, vm::{ops, Context, Value}};
//!
//! let context = Context::with_standard_library();
//! let sum = ops::arithmetic(&context, ops::Arithmetic::Add,
//! 	&Value::new_string("10"), &Value::Number(5.0)).unwrap();
//! assert_eq!(sum, Value::Number(15.0));
//!
//! let kind = context.call(&context.global("type"), varargs![sum]).unwrap();
//! assert_eq!(kind.first(), Value::new_string("number"));
//! ```

pub mod ast;
pub mod lua_lib;
pub mod vm;
