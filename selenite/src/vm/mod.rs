//! The runtime half of the interpreter: values, tables, operator semantics and
//! the context they run in.
//!
//! There is no evaluator here. Whatever walks or compiles the syntax tree
//! drives these pieces, pushing [Lua frames](error::StackFrame::lua) on the
//! [`Context`] and applying [`ops`] for every operator it meets.

pub mod cache;
pub mod context;
pub mod error;
pub mod ops;
pub mod table;
pub mod value;
pub mod varargs;

pub use self::{
	context::{Context, ContextOptions},
	error::{FrameKind, RuntimeError, StackFrame},
	table::{Table, TableError},
	value::{Function, Value},
	varargs::{Spread, Varargs}
};
