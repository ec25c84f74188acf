use self::super::value::Value;
use std::{iter::FromIterator, ops::Index, vec::IntoIter};

/// Zero or more values in flight, as passed to and returned from functions.
///
/// This is not a value itself; it never ends up inside a table or a variable
/// without being flattened first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Varargs(pub Vec<Value>);

impl Varargs {
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// The value at `index`, counting from zero, or nil past the end.
	pub fn get(&self, index: usize) -> Value {
		self.0.get(index).cloned().unwrap_or_default()
	}

	/// The first value, or nil. This is what a multiple value expression
	/// becomes anywhere but the end of a list.
	pub fn first(&self) -> Value {
		self.get(0)
	}

	/// Inserts `value` in front of every other value.
	pub fn prepend(mut self, value: Value) -> Self {
		self.0.insert(0, value);
		self
	}

	/// Every value from `index` onwards.
	pub fn skip(mut self, index: usize) -> Self {
		self.0.drain(..index.min(self.0.len()));
		self
	}

	pub fn iter(&self) -> std::slice::Iter<Value> {
		self.0.iter()
	}
}

impl Index<usize> for Varargs {
	type Output = Value;

	fn index(&self, index: usize) -> &Value {
		static NIL: Value = Value::Nil;
		self.0.get(index).unwrap_or(&NIL)
	}
}

impl IntoIterator for Varargs {
	type Item = Value;
	type IntoIter = IntoIter<Value>;

	fn into_iter(self) -> IntoIter<Value> {
		self.0.into_iter()
	}
}

impl FromIterator<Value> for Varargs {
	fn from_iter<I>(iter: I) -> Self
			where I: IntoIterator<Item = Value> {
		Self(iter.into_iter().collect())
	}
}

impl From<Vec<Value>> for Varargs {
	fn from(values: Vec<Value>) -> Self {
		Self(values)
	}
}

/// Builds [`Varargs`] from anything convertible into values.
#[macro_export]
macro_rules! varargs {
	($($value:expr),* $(,)?) => {
		$crate::vm::varargs::Varargs(vec![$($crate::vm::value::Value::from($value)),*])
	}
}

/// One entry of an expression list: a plain value, or everything a call or `...`
/// produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Spread {
	Value(Value),
	Varargs(Varargs)
}

impl From<Value> for Spread {
	fn from(value: Value) -> Self {
		Self::Value(value)
	}
}

impl From<Varargs> for Spread {
	fn from(varargs: Varargs) -> Self {
		Self::Varargs(varargs)
	}
}

/// Assigns `values` to `variables`, starting at the slot `start`.
///
/// Multiple values in the last position of `values` spread over every
/// remaining slot; anywhere else only their first value is used. Slots left
/// over keep whatever they held, and values left over are dropped.
pub fn assign_values_to_variables(variables: &mut [Value], values: &[Spread],
		start: usize) {
	let slots = variables.iter_mut().skip(start);

	for ((index, value), slot) in values.iter().enumerate().zip(slots) {
		*slot = match value {
			Spread::Value(value) => value.clone(),
			Spread::Varargs(varargs) if index + 1 == values.len() => {
				let spread = varargs.iter().cloned().map(Spread::Value).collect::<Vec<_>>();
				let slot = start + index;
				return assign_values_to_variables(variables, &spread, slot)
			},
			Spread::Varargs(varargs) => varargs.first()
		}
	}
}

/// Flattens an expression list into exactly `count` values, padding with nil.
pub fn adjust(values: &[Spread], count: usize) -> Vec<Value> {
	let mut variables = vec![Value::Nil; count];
	assign_values_to_variables(&mut variables, values, 0);
	variables
}

/// Flattens an expression list into every value it holds, as for the
/// arguments of a call.
pub fn flatten(values: Vec<Spread>) -> Varargs {
	let count = values.len();
	values.into_iter().enumerate()
		.flat_map(|(index, value)| match value {
			Spread::Value(value) => vec![value],
			Spread::Varargs(varargs) if index + 1 == count => varargs.0,
			Spread::Varargs(varargs) => vec![varargs.first()]
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use self::super::{Spread, Varargs, adjust, assign_values_to_variables, flatten};
	use crate::vm::value::Value;
	use itertools::assert_equal;

	fn number(number: f64) -> Value {
		Value::Number(number)
	}

	fn spread(numbers: &[f64]) -> Spread {
		Spread::Varargs(numbers.iter().copied().map(Value::Number).collect())
	}

	#[test]
	fn tail_varargs_spread() {
		let values = [Spread::Value(number(1.0)), spread(&[2.0, 3.0, 4.0])];
		assert_equal(adjust(&values, 3), vec![number(1.0), number(2.0), number(3.0)]);
	}

	#[test]
	fn inner_varargs_truncate() {
		let values = [spread(&[2.0, 3.0]), Spread::Value(number(9.0))];
		assert_equal(adjust(&values, 3), vec![number(2.0), number(9.0), Value::Nil]);
	}

	#[test]
	fn empty_varargs() {
		let values = [spread(&[]), Spread::Value(number(1.0))];
		assert_equal(adjust(&values, 2), vec![Value::Nil, number(1.0)]);
		assert_equal(adjust(&[spread(&[])], 2), vec![Value::Nil, Value::Nil]);
	}

	#[test]
	fn start_offset() {
		let mut variables = vec![number(0.0); 4];
		assign_values_to_variables(&mut variables,
			&[Spread::Value(number(1.0)), spread(&[2.0, 3.0])], 1);
		assert_equal(variables, vec![number(0.0), number(1.0), number(2.0), number(3.0)]);
	}

	#[test]
	fn excess_values_dropped() {
		let values = [Spread::Value(number(1.0)), Spread::Value(number(2.0))];
		assert_equal(adjust(&values, 1), vec![number(1.0)]);
	}

	#[test]
	fn flattening() {
		let values = vec![spread(&[1.0, 2.0]), Spread::Value(number(3.0)),
			spread(&[4.0, 5.0])];
		assert_eq!(flatten(values), Varargs(vec![number(1.0), number(3.0),
			number(4.0), number(5.0)]));
	}

	#[test]
	fn varargs_helpers() {
		let varargs = varargs![1, "two", true];
		assert_eq!(varargs.len(), 3);
		assert_eq!(varargs[1], Value::new_string("two"));
		assert_eq!(varargs[7], Value::Nil);
		assert_eq!(varargs.clone().skip(2), varargs![true]);
		assert_eq!(varargs.prepend(Value::Nil).first(), Value::Nil);
	}
}
