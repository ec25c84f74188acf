//! Operator semantics, including metamethod dispatch.
//!
//! Every operator tries its native behaviour first, and only falls back to
//! metamethods when the operands don't support it. Metamethods are called
//! through the context's [call cache](super::cache::CallCache).
use self::super::{
	context::Context,
	error::{RuntimeError, StackFrame},
	table::Table,
	value::Value,
	varargs::Varargs
};
use crate::{ast::syntax::{BinaryOp, UnaryOp}, varargs};
use log::debug;
use std::sync::Arc;

/// How many `__index`, `__newindex` or `__call` handlers are followed before
/// giving up.
const MAX_TAG_LOOP: usize = 100;

/// The arithmetic operators, all of which share their dispatch rules.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arithmetic {
	Add,
	Subtract,
	Multiply,
	Divide,
	Modulo,
	Power
}

impl Arithmetic {
	pub fn metamethod(self) -> &'static str {
		match self {
			Self::Add => "__add",
			Self::Subtract => "__sub",
			Self::Multiply => "__mul",
			Self::Divide => "__div",
			Self::Modulo => "__mod",
			Self::Power => "__pow"
		}
	}

	pub fn apply(self, left: f64, right: f64) -> f64 {
		match self {
			Self::Add => left + right,
			Self::Subtract => left - right,
			Self::Multiply => left * right,
			Self::Divide => left / right,
			Self::Modulo => left - (left / right).floor() * right,
			Self::Power => left.powf(right)
		}
	}
}

fn type_error(context: &Context, verb: &str, value: &Value) -> RuntimeError {
	RuntimeError::new(context, format!("attempt to {} a {} value", verb, value.type_name()))
}

fn compare_error(context: &Context, left: &Value, right: &Value) -> RuntimeError {
	let (left, right) = (left.type_name(), right.type_name());
	match left == right {
		true => RuntimeError::new(context, format!("attempt to compare two {} values", left)),
		false => RuntimeError::new(context, format!("attempt to compare {} with {}", left, right))
	}
}

/// Calls a binary metamethod, keeping only its first result.
fn call_handler(context: &Context, handler: &Value, left: &Value, right: &Value)
		-> Result<Value, RuntimeError> {
	debug!("dispatching metamethod {:?}", handler);
	let arguments = varargs![left.clone(), right.clone()];
	Ok(context.cache().call2()(context, handler, arguments)?.first())
}

/// The metatable of a value; its own for tables, the one shared by its type
/// otherwise.
pub fn get_metatable(context: &Context, value: &Value) -> Option<Arc<Table>> {
	match value {
		Value::Table(table) => table.metatable(),
		Value::Nil => None,
		other => context.type_metatable(other.type_name())
	}
}

/// The metamethod `name` of a value, if it has a non nil one.
pub fn get_metamethod(context: &Context, value: &Value, name: &str) -> Option<Value> {
	get_metatable(context, value)
		.map(|metatable| metatable.get(&Value::new_string(name)))
		.filter(Value::is_non_nil)
}

/// The metamethod `name`, but only when both operands have the very same one.
fn symmetric_metamethod(context: &Context, left: &Value, right: &Value, name: &str)
		-> Option<Value> {
	let left_handler = get_metamethod(context, left, name)?;
	let right_handler = get_metamethod(context, right, name)?;
	(left_handler == right_handler).then(|| left_handler)
}

/// `base[key]`.
pub fn index(context: &Context, base: &Value, key: &Value)
		-> Result<Value, RuntimeError> {
	let mut base = base.clone();

	for _ in 0..MAX_TAG_LOOP {
		let handler = match &base {
			Value::Table(table) => {
				let value = table.get(key);
				if value.is_non_nil() {return Ok(value)}

				match get_metamethod(context, &base, "__index") {
					Some(handler) => handler,
					None => return Ok(Value::Nil)
				}
			},
			other => match get_metamethod(context, other, "__index") {
				Some(handler) => handler,
				None => return Err(type_error(context, "index", other))
			}
		};

		match handler {
			Value::Function(_) => return call_handler(context, &handler, &base, key),
			handler => base = handler
		}
	}

	Err(RuntimeError::new(context, "loop in gettable"))
}

/// `base[key] = value`.
pub fn new_index(context: &Context, base: &Value, key: Value, value: Value)
		-> Result<(), RuntimeError> {
	let mut base = base.clone();

	for _ in 0..MAX_TAG_LOOP {
		let handler = match &base {
			Value::Table(table) => {
				let handler = match table.contains(&key) {
					true => None,
					false => get_metamethod(context, &base, "__newindex")
				};

				match handler {
					Some(handler) => handler,
					None => return table.set(key, value)
						.map_err(|error| RuntimeError::new(context, error))
				}
			},
			other => match get_metamethod(context, other, "__newindex") {
				Some(handler) => handler,
				None => return Err(type_error(context, "index", other))
			}
		};

		match handler {
			Value::Function(_) => {
				debug!("dispatching metamethod {:?}", handler);
				let arguments = varargs![base, key, value];
				return context.cache().call3()(context, &handler, arguments).map(drop)
			},
			handler => base = handler
		}
	}

	Err(RuntimeError::new(context, "loop in settable"))
}

/// Calls `callee` with `arguments`, going through `__call` for anything that
/// isn't a function. Functions get a native frame on the call stack while
/// they run, and the stack is restored to its prior depth once they return.
pub fn call(context: &Context, callee: &Value, arguments: Varargs)
		-> Result<Varargs, RuntimeError> {
	let mut callee = callee.clone();
	let mut arguments = arguments;

	for _ in 0..MAX_TAG_LOOP {
		match callee {
			Value::Function(function) => {
				let depth = context.depth();
				context.enter(StackFrame::native(&function.name))?;
				let result = function.invoke(context, arguments);
				context.truncate_stack(depth);
				return result
			},
			other => match get_metamethod(context, &other, "__call") {
				Some(handler) => {
					debug!("dispatching metamethod {:?}", handler);
					arguments = arguments.prepend(other);
					callee = handler;
				},
				None => return Err(type_error(context, "call", &other))
			}
		}
	}

	Err(RuntimeError::new(context, "'__call' chain too long"))
}

/// Any of the arithmetic operators. Strings that look like numbers are
/// converted.
pub fn arithmetic(context: &Context, operation: Arithmetic, left: &Value,
		right: &Value) -> Result<Value, RuntimeError> {
	let (left_number, right_number) = (left.coerce_to_number(), right.coerce_to_number());
	if let (Some(left), Some(right)) = (left_number, right_number) {
		return Ok(Value::Number(operation.apply(left, right)))
	}

	let name = operation.metamethod();
	let handler = get_metamethod(context, left, name)
		.or_else(|| get_metamethod(context, right, name));
	match handler {
		Some(handler) => call_handler(context, &handler, left, right),
		None => {
			let culprit = if left_number.is_none() {left} else {right};
			Err(type_error(context, "perform arithmetic on", culprit))
		}
	}
}

/// Unary `-`.
pub fn negate(context: &Context, value: &Value) -> Result<Value, RuntimeError> {
	if let Some(number) = value.coerce_to_number() {
		return Ok(Value::Number(-number))
	}

	match get_metamethod(context, value, "__unm") {
		Some(handler) => call_handler(context, &handler, value, value),
		None => Err(type_error(context, "perform arithmetic on", value))
	}
}

/// Unary `not`, which never consults metamethods.
pub fn not(value: &Value) -> Value {
	Value::Boolean(!value.coerce_to_bool())
}

/// Unary `#`.
pub fn length(context: &Context, value: &Value) -> Result<Value, RuntimeError> {
	match value {
		Value::String(string) => Ok(Value::from(string.chars().count())),
		Value::Table(table) => Ok(Value::from(table.len())),
		other => match get_metamethod(context, other, "__len") {
			Some(handler) => call_handler(context, &handler, other, &Value::Nil),
			None => Err(type_error(context, "get length of", other))
		}
	}
}

/// `left .. right`. Numbers are converted to strings.
pub fn concat(context: &Context, left: &Value, right: &Value)
		-> Result<Value, RuntimeError> {
	let (left_string, right_string) = (left.coerce_to_string(), right.coerce_to_string());
	if let (Some(left), Some(right)) = (&left_string, &right_string) {
		return Ok(Value::String(format!("{}{}", left, right).into_boxed_str()))
	}

	let handler = get_metamethod(context, left, "__concat")
		.or_else(|| get_metamethod(context, right, "__concat"));
	match handler {
		Some(handler) => call_handler(context, &handler, left, right),
		None => {
			let culprit = if left_string.is_none() {left} else {right};
			Err(type_error(context, "concatenate", culprit))
		}
	}
}

/// Compares two values of the same type with a metamethod both of them share.
/// `None` means there is no such metamethod.
fn compare_with(context: &Context, left: &Value, right: &Value, name: &str)
		-> Result<Option<bool>, RuntimeError> {
	if left.type_name() != right.type_name() {return Ok(None)}

	match symmetric_metamethod(context, left, right, name) {
		Some(handler) => Ok(Some(call_handler(context, &handler, left, right)?.coerce_to_bool())),
		None => Ok(None)
	}
}

/// `left < right`.
pub fn less_than(context: &Context, left: &Value, right: &Value)
		-> Result<bool, RuntimeError> {
	match (left, right) {
		(Value::Number(left), Value::Number(right)) => Ok(left < right),
		(Value::String(left), Value::String(right)) => Ok(left < right),
		_ => compare_with(context, left, right, "__lt")?
			.ok_or_else(|| compare_error(context, left, right))
	}
}

/// `left <= right`. Without a `__le` metamethod, this is `not (right < left)`.
pub fn less_equal(context: &Context, left: &Value, right: &Value)
		-> Result<bool, RuntimeError> {
	match (left, right) {
		(Value::Number(left), Value::Number(right)) => return Ok(left <= right),
		(Value::String(left), Value::String(right)) => return Ok(left <= right),
		_ => ()
	}

	if let Some(result) = compare_with(context, left, right, "__le")? {
		return Ok(result)
	}

	compare_with(context, right, left, "__lt")?
		.map(|result| !result)
		.ok_or_else(|| compare_error(context, left, right))
}

/// `left > right`, which is `right < left`.
pub fn greater_than(context: &Context, left: &Value, right: &Value)
		-> Result<bool, RuntimeError> {
	less_than(context, right, left)
}

/// `left >= right`, which is `right <= left`.
pub fn greater_equal(context: &Context, left: &Value, right: &Value)
		-> Result<bool, RuntimeError> {
	less_equal(context, right, left)
}

/// `left == right`. Values of different types are simply unequal, and raw
/// equal values are always equal. Anything else consults an `__eq` both
/// operands share, including one shared by their whole type.
pub fn equal(context: &Context, left: &Value, right: &Value)
		-> Result<bool, RuntimeError> {
	match (left, right) {
		(Value::Nil, Value::Nil) => return Ok(true),
		_ if left.type_name() != right.type_name() => return Ok(false),
		_ if left == right => return Ok(true),
		_ => ()
	}

	match symmetric_metamethod(context, left, right, "__eq") {
		Some(handler) => Ok(call_handler(context, &handler, left, right)?.coerce_to_bool()),
		None => Ok(false)
	}
}

/// `left ~= right`.
pub fn not_equal(context: &Context, left: &Value, right: &Value)
		-> Result<bool, RuntimeError> {
	Ok(!equal(context, left, right)?)
}

/// Applies a unary operator.
pub fn unary(context: &Context, operator: UnaryOp, value: &Value)
		-> Result<Value, RuntimeError> {
	match operator {
		UnaryOp::Negate => negate(context, value),
		UnaryOp::Not => Ok(not(value)),
		UnaryOp::Length => length(context, value)
	}
}

/// Applies a binary operator to operands that have both been evaluated
/// already. `and` and `or` pick an operand rather than short circuiting.
pub fn binary(context: &Context, operator: BinaryOp, left: &Value, right: &Value)
		-> Result<Value, RuntimeError> {
	let arithmetic = |operation| self::arithmetic(context, operation, left, right);

	Ok(match operator {
		BinaryOp::Or => match left.coerce_to_bool() {
			true => left.clone(),
			false => right.clone()
		},
		BinaryOp::And => match left.coerce_to_bool() {
			true => right.clone(),
			false => left.clone()
		},

		BinaryOp::Equal => Value::Boolean(equal(context, left, right)?),
		BinaryOp::NotEqual => Value::Boolean(not_equal(context, left, right)?),
		BinaryOp::Less => Value::Boolean(less_than(context, left, right)?),
		BinaryOp::Greater => Value::Boolean(greater_than(context, left, right)?),
		BinaryOp::LessEqual => Value::Boolean(less_equal(context, left, right)?),
		BinaryOp::GreaterEqual => Value::Boolean(greater_equal(context, left, right)?),

		BinaryOp::Concat => concat(context, left, right)?,

		BinaryOp::Add => arithmetic(Arithmetic::Add)?,
		BinaryOp::Subtract => arithmetic(Arithmetic::Subtract)?,
		BinaryOp::Multiply => arithmetic(Arithmetic::Multiply)?,
		BinaryOp::Divide => arithmetic(Arithmetic::Divide)?,
		BinaryOp::Mod => arithmetic(Arithmetic::Modulo)?,
		BinaryOp::Power => arithmetic(Arithmetic::Power)?
	})
}
