//! The base library: the global functions every Lua program expects, written
//! against the [runtime](crate::vm).
use self::super::{
	varargs,
	vm::{
		ops, Context, RuntimeError, Table, Value, Varargs,
		value::parse_integer
	}
};
use itertools::Itertools;
use std::sync::Arc;

/// The most values a single call may return.
const MAX_RESULTS: usize = 8000;

fn bad_argument(context: &Context, position: usize, function: &str, problem: &str)
		-> RuntimeError {
	RuntimeError::new(context, format!("bad argument #{} to '{}' ({})",
		position + 1, function, problem))
}

/// Describes the argument at `position` for a type mismatch message.
fn got(arguments: &Varargs, position: usize) -> String {
	match position < arguments.len() {
		true => arguments[position].type_name().to_owned(),
		false => "no value".to_owned()
	}
}

fn check_any(context: &Context, arguments: &Varargs, position: usize,
		function: &str) -> Result<Value, RuntimeError> {
	match position < arguments.len() {
		true => Ok(arguments.get(position)),
		false => Err(bad_argument(context, position, function, "value expected"))
	}
}

fn check_table(context: &Context, arguments: &Varargs, position: usize,
		function: &str) -> Result<Arc<Table>, RuntimeError> {
	match &arguments[position] {
		Value::Table(table) => Ok(table.clone()),
		_ => Err(bad_argument(context, position, function,
			&format!("table expected, got {}", got(arguments, position))))
	}
}

fn check_number(context: &Context, arguments: &Varargs, position: usize,
		function: &str) -> Result<f64, RuntimeError> {
	arguments[position].coerce_to_number()
		.ok_or_else(|| bad_argument(context, position, function,
			&format!("number expected, got {}", got(arguments, position))))
}

/// Like [`check_number`], but nil or absent arguments become `default`.
fn optional_number(context: &Context, arguments: &Varargs, position: usize,
		function: &str, default: f64) -> Result<f64, RuntimeError> {
	match arguments[position] {
		Value::Nil => Ok(default),
		_ => check_number(context, arguments, position, function)
	}
}

/// Converts a value to a string, consulting `__tostring`.
pub fn to_string(context: &Context, value: &Value) -> Result<Value, RuntimeError> {
	match ops::get_metamethod(context, value, "__tostring") {
		Some(handler) => Ok(context.cache().call1()(context, &handler,
			varargs![value.clone()])?.first()),
		None => Ok(Value::from(value.to_string()))
	}
}

pub fn assert(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	let value = check_any(context, &arguments, 0, "assert")?;
	match value.coerce_to_bool() {
		true => Ok(arguments),
		false => Err(RuntimeError::raise(context, match arguments.get(1) {
			Value::Nil => Value::new_string("assertion failed!"),
			message => message
		}, 0))
	}
}

pub fn error(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	let level = optional_number(context, &arguments, 1, "error", 1.0)?;
	Err(RuntimeError::raise(context, arguments.first(), level.max(0.0) as usize))
}

pub fn getmetatable(context: &Context, arguments: Varargs)
		-> Result<Varargs, RuntimeError> {
	let value = check_any(context, &arguments, 0, "getmetatable")?;
	Ok(match ops::get_metatable(context, &value) {
		Some(metatable) => match metatable.get(&Value::new_string("__metatable")) {
			Value::Nil => varargs![metatable],
			protected => varargs![protected]
		},
		None => varargs![()]
	})
}

pub fn setmetatable(context: &Context, arguments: Varargs)
		-> Result<Varargs, RuntimeError> {
	let table = check_table(context, &arguments, 0, "setmetatable")?;
	let metatable = match &arguments[1] {
		Value::Nil => None,
		Value::Table(metatable) => Some(metatable.clone()),
		_ => return Err(bad_argument(context, 1, "setmetatable", "nil or table expected"))
	};

	let protected = table.metatable()
		.map_or(false, |old| old.contains(&Value::new_string("__metatable")));
	if protected {
		return Err(RuntimeError::new(context, "cannot change a protected metatable"))
	}

	table.set_metatable(metatable);
	Ok(varargs![table])
}

pub fn next(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	let table = check_table(context, &arguments, 0, "next")?;
	match table.next(&arguments[1]) {
		Ok(Some((key, value))) => Ok(varargs![key, value]),
		Ok(None) => Ok(varargs![()]),
		Err(error) => Err(RuntimeError::new(context, error))
	}
}

pub fn pairs(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	let table = check_table(context, &arguments, 0, "pairs")?;
	Ok(varargs![Value::new_function("next", next), table, ()])
}

fn ipairs_step(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	let table = check_table(context, &arguments, 0, "ipairs")?;
	let index = check_number(context, &arguments, 1, "ipairs")? + 1.0;
	Ok(match table.get(&Value::Number(index)) {
		Value::Nil => varargs![()],
		value => varargs![index, value]
	})
}

pub fn ipairs(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	let table = check_table(context, &arguments, 0, "ipairs")?;
	Ok(varargs![Value::new_function("ipairs_step", ipairs_step), table, 0])
}

/// Calls its first argument, returning `true` and its results, or `false` and
/// the error value if it fails. Frames left over by the failure are dropped.
pub fn pcall(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	let function = check_any(context, &arguments, 0, "pcall")?;
	let depth = context.depth();

	match context.call(&function, arguments.skip(1)) {
		Ok(results) => Ok(results.prepend(Value::Boolean(true))),
		Err(error) => {
			context.truncate_stack(depth);
			Ok(varargs![false, error.value])
		}
	}
}

pub fn print(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	let message = arguments.iter()
		.map(|argument| to_string(context, argument))
		.collect::<Result<Vec<_>, _>>()?
		.into_iter()
		.join("\t");
	println!("{}", message);
	Ok(varargs![])
}

pub fn rawequal(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	let left = check_any(context, &arguments, 0, "rawequal")?;
	let right = check_any(context, &arguments, 1, "rawequal")?;
	Ok(varargs![left == right])
}

pub fn rawget(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	let table = check_table(context, &arguments, 0, "rawget")?;
	Ok(varargs![table.get(&arguments[1])])
}

pub fn rawset(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	let table = check_table(context, &arguments, 0, "rawset")?;
	table.set(arguments.get(1), arguments.get(2))
		.map_err(|error| RuntimeError::new(context, error))?;
	Ok(varargs![table])
}

pub fn select(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	if arguments[0].string() == Some("#") {
		return Ok(varargs![arguments.len().saturating_sub(1)])
	}

	let index = check_number(context, &arguments, 0, "select")? as i64;
	let rest = arguments.skip(1);
	let count = rest.len() as i64;

	match index {
		index if index > 0 => Ok(rest.skip((index - 1) as usize)),
		index if index < 0 && -index <= count => Ok(rest.skip((count + index) as usize)),
		_ => Err(bad_argument(context, 0, "select", "index out of range"))
	}
}

pub fn tonumber(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	let value = check_any(context, &arguments, 0, "tonumber")?;
	let base = optional_number(context, &arguments, 1, "tonumber", 10.0)?;
	if base == 10.0 {
		return Ok(varargs![value.coerce_to_number().map(Value::Number)])
	}

	if !(2.0..=36.0).contains(&base) {
		return Err(bad_argument(context, 1, "tonumber", "base out of range"))
	}

	let text = value.coerce_to_string().ok_or_else(|| bad_argument(context, 0, "tonumber",
		&format!("string expected, got {}", value.type_name())))?;
	let text = text.trim();
	let number = match text.strip_prefix('-') {
		Some(digits) => parse_integer(digits, base as u32).map(|number| -number),
		None => parse_integer(text, base as u32)
	};

	Ok(varargs![number.map(Value::Number)])
}

pub fn tostring(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	let value = check_any(context, &arguments, 0, "tostring")?;
	Ok(varargs![to_string(context, &value)?])
}

pub fn r#type(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	let value = check_any(context, &arguments, 0, "type")?;
	Ok(varargs![value.type_name()])
}

pub fn unpack(context: &Context, arguments: Varargs) -> Result<Varargs, RuntimeError> {
	let table = check_table(context, &arguments, 0, "unpack")?;
	let start = optional_number(context, &arguments, 1, "unpack", 1.0)?;
	let end = optional_number(context, &arguments, 2, "unpack", table.len() as f64)?;
	if end - start >= MAX_RESULTS as f64 {
		return Err(RuntimeError::new(context, "too many results to unpack"))
	}

	Ok(itertools::iterate(start, |index| index + 1.0)
		.take_while(|index| *index <= end)
		.map(|index| table.get(&Value::Number(index)))
		.collect())
}

/// Fills the globals of `context` with the base library, including `_G`.
pub fn standard_globals(context: &Context) {
	let functions: [(&str, fn(&Context, Varargs) -> Result<Varargs, RuntimeError>); 17] = [
		("assert", assert),
		("error", error),
		("getmetatable", getmetatable),
		("setmetatable", setmetatable),
		("ipairs", ipairs),
		("next", next),
		("pairs", pairs),
		("pcall", pcall),
		("print", print),
		("rawequal", rawequal),
		("rawget", rawget),
		("rawset", rawset),
		("select", select),
		("tonumber", tonumber),
		("tostring", tostring),
		("type", r#type),
		("unpack", unpack)
	];

	functions.iter()
		.for_each(|&(name, function)|
			context.set_global(name, Value::new_function(name, function)));
	context.set_global("_G", Value::Table(context.globals.clone()));
	context.set_global("_VERSION", Value::new_string("Lua 5.1"));
}
