pub use self::super::table::Table;
use self::super::{context::Context, error::RuntimeError, varargs::Varargs};
use std::{
	fmt::{Debug, Display, Formatter, Result as FMTResult},
	hash::{Hash, Hasher},
	mem::discriminant,
	sync::Arc
};

macro_rules! value_conversions {
	(
		impl for $convert:ident @ $for:ty $code:block
		$($rest:tt)*
	) => {
		impl From<$for> for Value {
			fn from($convert: $for) -> Value {
				$code
			}
		}

		value_conversions! {$($rest)*}
	};
	() => {}
}

/// Builds a [`Value`]. Literals become the matching scalar, anything else is
/// handed to [`lua_table!`] and becomes a table.
#[macro_export]
macro_rules! lua_value {
	($raw:literal) => {$crate::vm::value::Value::from($raw)};
	($($other:tt)*) => {$crate::vm::value::Value::Table($crate::lua_table! {$($other)*}.arc())}
}

/// Builds a [`Table`] using Lua's table constructor syntax.
///
/// Positional values are numbered from one, and nil values are skipped.
///
/// # Panics
/// Panics when a key is nil or NaN.
#[macro_export]
macro_rules! lua_table {
	($($arm:tt)*) => {{
		#[allow(unused_assignments, unused_mut, unused_variables, unused_imports)]
		{
			use $crate::{vm::value::{Table, Value}, lua_table_inner, lua_value};

			let table = Table::default();
			let mut counter = 1;

			lua_table_inner!(table counter {$($arm)*});
			table
		}
	}}
}

/// Macro implementation detail, do not use.
#[doc(hidden)]
#[macro_export]
macro_rules! lua_table_inner {
	($table:ident $counter:ident {[$key:expr] = $value:expr $(, $($rest:tt)*)?}) => {
		{
			let key = Value::from(lua_table_inner!($key).clone());
			if let Err(error) = $table.set(key, Value::from(lua_table_inner!($value).clone()))
				{panic!("{} in lua_table macro", error)}
		}

		lua_table_inner!($table $counter {$($($rest)*)?});
	};
	($table:ident $counter:ident {$key:ident = $value:expr $(, $($rest:tt)*)?}) => {
		{
			let value = Value::from(lua_table_inner!($value).clone());
			if let Err(error) = $table.set(Value::from(stringify!($key)), value)
				{panic!("{} in lua_table macro", error)}
		}

		lua_table_inner!($table $counter {$($($rest)*)?});
	};
	($table:ident $counter:ident {$value:expr $(, $($rest:tt)*)?}) => {
		{
			let value = Value::from(lua_table_inner!($value).clone());
			if let Err(error) = $table.set(Value::Number($counter as f64), value)
				{panic!("{} in lua_table macro", error)}
			$counter += 1;
		}

		lua_table_inner!($table $counter {$($($rest)*)?});
	};
	($table:ident $counter:ident {$($rest:tt)*}) => {};

	($value:literal) => {lua_value!($value)};
	($value:expr) => {$value}
}

/// The signature of functions implemented in Rust.
pub type NativeFunction = dyn Fn(&Context, Varargs) -> Result<Varargs, RuntimeError>
	+ Send + Sync;

/// A callable value. Compares by identity.
pub struct Function {
	pub name: Box<str>,
	native: Box<NativeFunction>
}

impl Function {
	pub fn new<F>(name: impl Into<Box<str>>, native: F) -> Self
			where F: Fn(&Context, Varargs) -> Result<Varargs, RuntimeError>
				+ Send + Sync + 'static {
		Self {name: name.into(), native: Box::new(native)}
	}

	/// Runs the function directly, without a stack frame. See
	/// [`ops::call`](super::ops::call) for the dispatching variant.
	pub fn invoke(&self, context: &Context, arguments: Varargs)
			-> Result<Varargs, RuntimeError> {
		(self.native)(context, arguments)
	}

	pub fn arc(self) -> Arc<Self> {
		Arc::new(self)
	}
}

impl Debug for Function {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		write!(f, "function: {:p} ({})", self, self.name)
	}
}

/// Represents a lua value.
///
/// Equality and hashing are raw, meaning no metamethods are involved; tables
/// and functions are compared by identity. NaN is never equal to itself, which
/// is why tables refuse it as a key.
#[derive(Clone, Default)]
pub enum Value {
	#[default]
	Nil,
	Boolean(bool),
	Number(f64),
	String(Box<str>),
	Table(Arc<Table>),
	Function(Arc<Function>)
}

impl Value {
	pub fn new_string(string: impl AsRef<str>) -> Self {
		Self::String(string.as_ref().to_owned().into_boxed_str())
	}

	pub fn new_function<F>(name: &str, native: F) -> Self
			where F: Fn(&Context, Varargs) -> Result<Varargs, RuntimeError>
				+ Send + Sync + 'static {
		Self::Function(Function::new(name, native).arc())
	}

	pub fn type_name(&self) -> &'static str {
		match self {
			Self::Nil => "nil",
			Self::Boolean(_) => "boolean",
			Self::Number(_) => "number",
			Self::String(_) => "string",
			Self::Table(_) => "table",
			Self::Function(_) => "function"
		}
	}

	pub fn is_nil(&self) -> bool {
		matches!(self, Self::Nil)
	}

	pub fn is_non_nil(&self) -> bool {
		!self.is_nil()
	}

	/// Coerces this value to a bool. Only nil and false are false.
	pub fn coerce_to_bool(&self) -> bool {
		!matches!(self, Self::Nil | Self::Boolean(false))
	}

	/// Coerces this value to a number. Numbers are returned as is, and strings
	/// are converted if their text is a decimal or hexadecimal number.
	pub fn coerce_to_number(&self) -> Option<f64> {
		match self {
			Self::Number(number) => Some(*number),
			Self::String(string) => parse_number(string),
			_ => None
		}
	}

	/// Coerces this value to a string, for concatenation. Only strings and
	/// numbers are accepted.
	pub fn coerce_to_string(&self) -> Option<String> {
		match self {
			Self::String(string) => Some(string.to_string()),
			Self::Number(number) => Some(format_number(*number)),
			_ => None
		}
	}

	pub fn number(&self) -> Option<f64> {
		match self {
			Self::Number(number) => Some(*number),
			_ => None
		}
	}

	pub fn string(&self) -> Option<&str> {
		match self {
			Self::String(string) => Some(string),
			_ => None
		}
	}

	pub fn table(&self) -> Option<&Arc<Table>> {
		match self {
			Self::Table(table) => Some(table),
			_ => None
		}
	}
}

/// Formats like `tostring`, without consulting `__tostring`.
impl Display for Value {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		match self {
			Self::Nil => write!(f, "nil"),
			Self::Boolean(boolean) => write!(f, "{}", boolean),
			Self::Number(number) => write!(f, "{}", format_number(*number)),
			Self::String(string) => write!(f, "{}", string),
			Self::Table(table) => write!(f, "table: {:p}", Arc::as_ptr(table)),
			Self::Function(function) => write!(f, "function: {:p}", Arc::as_ptr(function))
		}
	}
}

impl Debug for Value {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		match self {
			Self::Nil => write!(f, "nil"),
			Self::Boolean(boolean) => Debug::fmt(boolean, f),
			Self::Number(number) => write!(f, "{}", format_number(*number)),
			Self::String(string) => Debug::fmt(string, f),
			Self::Table(table) => Debug::fmt(table, f),
			Self::Function(function) => Debug::fmt(function, f)
		}
	}
}

impl Eq for Value {}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Nil, Self::Nil) => true,
			(Self::Boolean(a), Self::Boolean(b)) => a == b,
			(Self::Number(a), Self::Number(b)) => a == b,
			(Self::String(a), Self::String(b)) => a == b,
			(Self::Table(a), Self::Table(b)) => Arc::ptr_eq(a, b),
			(Self::Function(a), Self::Function(b)) => Arc::ptr_eq(a, b),
			_ => false
		}
	}
}

impl Hash for Value {
	fn hash<H>(&self, state: &mut H)
			where H: Hasher {
		discriminant(self).hash(state);
		match self {
			Self::Nil => (),
			Self::Boolean(boolean) => boolean.hash(state),
			Self::Number(number) => number_key(*number).hash(state),
			Self::String(string) => string.hash(state),
			Self::Table(table) => Arc::as_ptr(table).hash(state),
			Self::Function(function) => Arc::as_ptr(function).hash(state)
		}
	}
}

value_conversions! {
	impl for value @ f64 {Value::Number(value)}
	impl for value @ i32 {Value::Number(f64::from(value))}
	impl for value @ usize {Value::Number(value as f64)}
	impl for value @ bool {Value::Boolean(value)}
	impl for value @ &str {Value::new_string(value)}
	impl for value @ Box<str> {Value::String(value)}
	impl for value @ String {Value::String(value.into_boxed_str())}
	impl for value @ Table {Value::Table(value.arc())}
	impl for value @ Arc<Table> {Value::Table(value)}
	impl for value @ Function {Value::Function(value.arc())}
	impl for value @ Arc<Function> {Value::Function(value)}
	impl for _value @ () {Value::Nil}
}

impl From<Option<Value>> for Value {
	fn from(value: Option<Value>) -> Self {
		value.unwrap_or_default()
	}
}

/// The bits of a number as a table key; `-0.0` and `0.0` are the same key.
fn number_key(number: f64) -> u64 {
	if number == 0.0 {0} else {number.to_bits()}
}

/// Formats a number the way Lua's `%.14g` does.
pub fn format_number(number: f64) -> String {
	if number.is_nan() {return "nan".to_owned()}
	if number.is_infinite()
		{return if number > 0.0 {"inf"} else {"-inf"}.to_owned()}

	// The exponent after rounding to 14 significant digits picks the notation.
	let scientific = format!("{:.13e}", number);
	let (mantissa, exponent) = match scientific.split_once('e') {
		Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
		None => return scientific
	};

	if (-4..14).contains(&exponent) {
		let fixed = format!("{:.*}", (13 - exponent) as usize, number);
		trim_fraction(&fixed).to_owned()
	} else {
		let sign = if exponent < 0 {'-'} else {'+'};
		format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
	}
}

fn trim_fraction(number: &str) -> &str {
	match number.contains('.') {
		true => number.trim_end_matches('0').trim_end_matches('.'),
		false => number
	}
}

/// Converts the text of a number, as `tonumber` does without a base. Leading
/// and trailing whitespace is allowed.
pub fn parse_number(text: &str) -> Option<f64> {
	let text = text.trim_matches(|character| matches!(character,
		' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C'));

	let (negative, unsigned) = match text.strip_prefix('-') {
		Some(unsigned) => (true, unsigned),
		None => (false, text)
	};

	let hex = unsigned.strip_prefix("0x").or_else(|| unsigned.strip_prefix("0X"));
	if let Some(digits) = hex {
		return parse_integer(digits, 16)
			.map(|number| if negative {-number} else {number})
	}

	let decimal = !text.is_empty() && text.chars().all(|character| matches!(character,
		'0'..='9' | '.' | 'e' | 'E' | '+' | '-'));
	match decimal {
		true => text.parse().ok(),
		false => None
	}
}

/// Converts digits of the given base, without any sign or prefix.
pub fn parse_integer(digits: &str, base: u32) -> Option<f64> {
	if digits.is_empty() {return None}
	digits.chars().try_fold(0.0, |number, digit|
		Some(number * f64::from(base) + f64::from(digit.to_digit(base)?)))
}

#[cfg(test)]
mod tests {
	use self::super::{Value, format_number, parse_number};
	use crate::vm::table::Table;
	use std::{collections::hash_map::DefaultHasher, hash::{Hash, Hasher}};

	fn hash(value: &Value) -> u64 {
		let mut hasher = DefaultHasher::new();
		value.hash(&mut hasher);
		hasher.finish()
	}

	#[test]
	fn lua_value_literal() {
		assert_eq!(lua_value!(12.0), Value::Number(12.0));
		assert_eq!(lua_value!("epic sauce"), Value::String("epic sauce".into()));
		assert_eq!(lua_value!(true), Value::Boolean(true));
	}

	#[test]
	fn lua_table_constructor() {
		let key = Value::new_string("key");
		let table = lua_table! {1, "hello", item = true, [key] = 9, (), 4};

		assert_eq!(table.get(&Value::Number(1.0)), Value::Number(1.0));
		assert_eq!(table.get(&Value::Number(2.0)), Value::new_string("hello"));
		assert_eq!(table.get(&Value::new_string("item")), Value::Boolean(true));
		assert_eq!(table.get(&Value::new_string("key")), Value::Number(9.0));
		assert_eq!(table.get(&Value::Number(3.0)), Value::Nil);
		assert_eq!(table.get(&Value::Number(4.0)), Value::Number(4.0));
	}

	#[test]
	fn zero_is_one_key() {
		assert_eq!(Value::Number(0.0), Value::Number(-0.0));
		assert_eq!(hash(&Value::Number(0.0)), hash(&Value::Number(-0.0)));
		assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
	}

	#[test]
	fn identity() {
		let table = Table::default().arc();
		assert_eq!(Value::Table(table.clone()), Value::Table(table));
		assert_ne!(Value::Table(Table::default().arc()),
			Value::Table(Table::default().arc()));
		assert_ne!(Value::Number(1.0), Value::new_string("1"));
	}

	#[test]
	fn truthiness() {
		assert!(!Value::Nil.coerce_to_bool());
		assert!(!Value::Boolean(false).coerce_to_bool());
		assert!(Value::Number(0.0).coerce_to_bool());
		assert!(Value::new_string("").coerce_to_bool());
	}

	#[test]
	fn number_formatting() {
		assert_eq!(format_number(3.0), "3");
		assert_eq!(format_number(-2.5), "-2.5");
		assert_eq!(format_number(0.1), "0.1");
		assert_eq!(format_number(1e15), "1e+15");
		assert_eq!(format_number(1e100), "1e+100");
		assert_eq!(format_number(123456789012.0), "123456789012");
		assert_eq!(format_number(0.00001), "1e-05");
		assert_eq!(format_number(1.0 / 3.0), "0.33333333333333");
		assert_eq!(format_number(f64::INFINITY), "inf");
		assert_eq!(format_number(f64::NEG_INFINITY), "-inf");
		assert_eq!(format_number(f64::NAN), "nan");
	}

	#[test]
	fn number_coercion() {
		assert_eq!(parse_number("  42  "), Some(42.0));
		assert_eq!(parse_number("0x1F"), Some(31.0));
		assert_eq!(parse_number("-0x10"), Some(-16.0));
		assert_eq!(parse_number("1.5e3"), Some(1500.0));
		assert_eq!(parse_number("-.5"), Some(-0.5));
		assert_eq!(parse_number("inf"), None);
		assert_eq!(parse_number("1 2"), None);
		assert_eq!(parse_number(""), None);
		assert_eq!(Value::new_string("10").coerce_to_number(), Some(10.0));
		assert_eq!(Value::Boolean(true).coerce_to_number(), None);
	}

	#[test]
	fn display() {
		assert_eq!(Value::Number(10.0).to_string(), "10");
		assert_eq!(Value::Nil.to_string(), "nil");
		assert!(Value::Table(Table::default().arc()).to_string().starts_with("table: 0x"));
		assert!(Value::new_function("f", |_, arguments| Ok(arguments)).to_string()
			.starts_with("function: 0x"));
	}
}
