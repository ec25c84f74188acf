use self::super::{context::Context, value::Value};
use std::fmt::{Display, Formatter, Result as FMTResult};
use thiserror::Error;

/// What kind of code a stack frame is running.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FrameKind {
	/// A function written in Lua.
	Lua,
	/// The top level code of a chunk.
	Chunk,
	/// A function implemented in Rust.
	Native
}

/// One entry of the call stack.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StackFrame {
	pub kind: FrameKind,
	pub name: Box<str>,
	pub source: Box<str>,
	pub line: usize
}

impl StackFrame {
	pub fn lua(name: &str, source: &str, line: usize) -> Self {
		Self {kind: FrameKind::Lua, name: name.into(), source: source.into(), line}
	}

	pub fn chunk(source: &str, line: usize) -> Self {
		Self {kind: FrameKind::Chunk, name: "main chunk".into(), source: source.into(), line}
	}

	pub fn native(name: &str) -> Self {
		Self {kind: FrameKind::Native, name: name.into(), source: "[native]".into(), line: 0}
	}

	/// The `source:line:` prefix errors raised in this frame carry, if it has a
	/// position at all.
	pub fn position(&self) -> Option<String> {
		match self.kind {
			FrameKind::Native => None,
			_ => Some(format!("{}:{}:", self.source, self.line))
		}
	}
}

impl Display for StackFrame {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		match self.kind {
			FrameKind::Lua =>
				write!(f, "{}:{}: in function '{}'", self.source, self.line, self.name),
			FrameKind::Chunk => write!(f, "{}:{}: in main chunk", self.source, self.line),
			FrameKind::Native => write!(f, "[native]: in function '{}'", self.name)
		}
	}
}

/// An error raised while running Lua code, either by the runtime itself or by
/// a call to `error`.
///
/// The [value](Self::value) is what `pcall` hands back; the
/// [message](Self::message) is that value rendered for humans, with position
/// information when there is any.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct RuntimeError {
	pub message: String,
	pub value: Value,
	/// The call stack when the error was raised, most recent frame first.
	pub stack: Vec<StackFrame>,
	pub level: usize
}

impl RuntimeError {
	/// Creates an error raised by the runtime, such as a failed operator, at the
	/// current position.
	pub fn new(context: &Context, message: impl Display) -> Self {
		let stack = context.stack();
		let message = match stack.first().and_then(StackFrame::position) {
			Some(position) => format!("{} {}", position, message),
			None => message.to_string()
		};

		Self {value: Value::new_string(&message), message, stack, level: 1}
	}

	/// Creates an error from any value, as `error(value, level)` does.
	///
	/// The stack is unwound by `level` frames first, counting the frame of
	/// `error` itself, so level one blames the caller of `error`. String values
	/// raised at a non zero level get the position of the blamed frame
	/// prepended; other values are kept exactly as they are.
	pub fn raise(context: &Context, value: Value, level: usize) -> Self {
		let mut error = Self {
			message: String::new(),
			value: Value::Nil,
			stack: context.stack(),
			level
		};
		error.unwind_stack(level);

		let position = match &value {
			Value::String(_) if level > 0 => error.stack.first().and_then(StackFrame::position),
			_ => None
		};

		error.message = match value {
			Value::String(_) | Value::Number(_) => value.to_string(),
			ref other => format!("(error object is a {} value)", other.type_name())
		};
		error.value = match position {
			Some(position) => {
				error.message = format!("{} {}", position, error.message);
				Value::new_string(&error.message)
			},
			None => value
		};

		error
	}

	/// Drops up to `depth` of the most recent frames from the recorded stack.
	pub fn unwind_stack(&mut self, depth: usize) {
		self.stack.drain(..depth.min(self.stack.len()));
	}

	/// Renders the recorded stack, one frame per line.
	pub fn traceback(&self) -> String {
		self.stack.iter()
			.fold("stack traceback:".to_owned(), |traceback, frame|
				format!("{}\n\t{}", traceback, frame))
	}
}
