use self::super::value::Value;
use hashbrown::HashMap;
use std::{
	fmt::{Debug, Formatter, Result as FMTResult},
	sync::{Arc, Mutex, MutexGuard, PoisonError}
};
use thiserror::Error;

/// The ways raw table access can fail.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum TableError {
	#[error("table index is nil")]
	NilIndex,
	#[error("table index is NaN")]
	NaNIndex,
	#[error("invalid key to 'next'")]
	InvalidNext
}

/// A Lua table, mapping non nil keys to non nil values.
///
/// Entries are kept in insertion order, which is the order [`next`](Self::next)
/// walks them in. Assigning nil leaves the key's slot in place, so clearing
/// fields while iterating is fine; adding new keys while iterating is not, and
/// may reorder or repeat keys.
#[derive(Default)]
pub struct Table {
	data: Mutex<TableData>,
	metatable: Mutex<Option<Arc<Table>>>
}

#[derive(Default)]
struct TableData {
	/// Every key ever set since the last compaction, with nil for removed ones.
	entries: Vec<(Value, Value)>,
	indices: HashMap<Value, usize>,
	removed: usize
}

impl TableData {
	/// Drops removed entries once they make up most of the table.
	fn compact(&mut self) {
		if self.removed < 8 || self.removed * 2 < self.entries.len() {return}

		self.entries.retain(|(_, value)| value.is_non_nil());
		self.indices = self.entries.iter().enumerate()
			.map(|(index, (key, _))| (key.clone(), index))
			.collect();
		self.removed = 0;
	}
}

/// Locks a mutex, carrying on if a panicking thread poisoned it. Table
/// operations never leave the data half written, so poisoning carries no
/// meaning here.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Table {
	/// Creates a table from a list, numbered from one.
	pub fn array(values: impl IntoIterator<Item = Value>) -> Self {
		let table = Self::default();
		{
			let mut data = lock(&table.data);
			values.into_iter().zip(1u32..)
				.filter(|(value, _)| value.is_non_nil())
				.for_each(|(value, index)| {
					let key = Value::Number(f64::from(index));
					let slot = data.entries.len();
					data.indices.insert(key.clone(), slot);
					data.entries.push((key, value));
				});
		}
		table
	}

	pub fn arc(self) -> Arc<Self> {
		Arc::new(self)
	}

	/// Gets the value under `key`, or nil. Never fails, even for keys that could
	/// never be set.
	pub fn get(&self, key: &Value) -> Value {
		let data = lock(&self.data);
		match data.indices.get(key) {
			Some(&index) => data.entries[index].1.clone(),
			None => Value::Nil
		}
	}

	/// Whether `key` currently holds a value.
	pub fn contains(&self, key: &Value) -> bool {
		self.get(key).is_non_nil()
	}

	/// Sets the value under `key`, removing it if `value` is nil.
	pub fn set(&self, key: Value, value: Value) -> Result<(), TableError> {
		match &key {
			Value::Nil => return Err(TableError::NilIndex),
			Value::Number(number) if number.is_nan() => return Err(TableError::NaNIndex),
			_ => ()
		}

		let mut data = lock(&self.data);
		match data.indices.get(&key) {
			Some(&index) => {
				match (data.entries[index].1.is_nil(), value.is_nil()) {
					(false, true) => data.removed += 1,
					(true, false) => data.removed -= 1,
					_ => ()
				}
				data.entries[index].1 = value;
			},
			None if value.is_nil() => (),
			None => {
				data.compact();
				let index = data.entries.len();
				data.indices.insert(key.clone(), index);
				data.entries.push((key, value));
			}
		}

		Ok(())
	}

	/// The length of this table, as the `#` operator sees it.
	///
	/// Any border is a valid length, that is, any `n` where `n` is set and
	/// `n + 1` isn't, or zero if `1` isn't set. For sequences there is only one.
	pub fn len(&self) -> usize {
		let present = |index: usize| self.contains(&Value::Number(index as f64));
		if !present(1) {return 0}

		// Find some absent index by doubling, then binary search for the border.
		let (mut low, mut high) = (1, 2);
		while present(high) {
			low = high;
			match high.checked_mul(2) {
				Some(doubled) => high = doubled,
				None => return low
			}
		}

		while high - low > 1 {
			let middle = low + (high - low) / 2;
			if present(middle) {low = middle} else {high = middle}
		}

		low
	}

	pub fn is_empty(&self) -> bool {
		let data = lock(&self.data);
		data.entries.len() == data.removed
	}

	/// The entry following `key` in iteration order, or the first entry when
	/// `key` is nil. `None` marks the end of iteration.
	pub fn next(&self, key: &Value) -> Result<Option<(Value, Value)>, TableError> {
		let data = lock(&self.data);
		let start = match key {
			Value::Nil => 0,
			key => match data.indices.get(key) {
				Some(index) => index + 1,
				None => return Err(TableError::InvalidNext)
			}
		};

		Ok(data.entries[start..].iter()
			.find(|(_, value)| value.is_non_nil())
			.cloned())
	}

	/// Every key value pair in iteration order.
	pub fn pairs(&self) -> Vec<(Value, Value)> {
		lock(&self.data).entries.iter()
			.filter(|(_, value)| value.is_non_nil())
			.cloned()
			.collect()
	}

	pub fn metatable(&self) -> Option<Arc<Table>> {
		lock(&self.metatable).clone()
	}

	pub fn set_metatable(&self, metatable: Option<Arc<Table>>) {
		*lock(&self.metatable) = metatable;
	}
}

impl Debug for Table {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		// A table containing itself would lock forever.
		match self.data.try_lock() {
			Ok(data) => {
				let mut first = true;
				let mut comma = || {
					if first {first = false; ""}
					else {", "}
				};

				write!(f, "{{")?;
				data.entries.iter()
					.filter(|(_, value)| value.is_non_nil())
					.try_for_each(|(key, value)| write!(f, "{}[{:?}] = {:?}", comma(), key, value))?;
				write!(f, "}}")
			},
			Err(_) => write!(f, "{{<table is being accessed>}}")
		}
	}
}

#[cfg(test)]
mod tests {
	use self::super::{Table, TableError};
	use crate::vm::value::Value;
	use itertools::assert_equal;

	fn number(number: f64) -> Value {
		Value::Number(number)
	}

	#[test]
	fn set_and_get() {
		let table = Table::default();
		table.set(Value::new_string("a"), number(1.0)).unwrap();
		table.set(number(2.0), Value::Boolean(true)).unwrap();

		assert_eq!(table.get(&Value::new_string("a")), number(1.0));
		assert_eq!(table.get(&number(2.0)), Value::Boolean(true));
		assert_eq!(table.get(&Value::new_string("missing")), Value::Nil);
		assert_eq!(table.get(&Value::Nil), Value::Nil);
	}

	#[test]
	fn nil_removes() {
		let table = Table::default();
		table.set(number(1.0), number(1.0)).unwrap();
		table.set(number(1.0), Value::Nil).unwrap();

		assert_eq!(table.get(&number(1.0)), Value::Nil);
		assert!(table.is_empty());
		assert_eq!(table.next(&Value::Nil), Ok(None));
	}

	#[test]
	fn invalid_keys() {
		let table = Table::default();
		assert_eq!(table.set(Value::Nil, number(1.0)), Err(TableError::NilIndex));
		assert_eq!(table.set(number(f64::NAN), number(1.0)), Err(TableError::NaNIndex));
	}

	#[test]
	fn negative_zero_key() {
		let table = Table::default();
		table.set(number(-0.0), Value::new_string("zero")).unwrap();
		assert_eq!(table.get(&number(0.0)), Value::new_string("zero"));
	}

	#[test]
	fn length() {
		assert_eq!(Table::default().len(), 0);
		assert_eq!(Table::array(vec![number(1.0), number(2.0), number(3.0)]).len(), 3);

		let table = Table::array((0..100).map(|index| number(index as f64)));
		assert_eq!(table.len(), 100);
		table.set(number(100.0), Value::Nil).unwrap();
		assert_eq!(table.len(), 99);

		let holes = Table::array(vec![number(1.0), Value::Nil, number(3.0)]);
		assert!(matches!(holes.len(), 1 | 3));
	}

	#[test]
	fn iteration_order() {
		let table = Table::default();
		table.set(Value::new_string("x"), number(1.0)).unwrap();
		table.set(number(1.0), number(2.0)).unwrap();
		table.set(Value::new_string("y"), number(3.0)).unwrap();

		let mut keys = Vec::new();
		let mut key = Value::Nil;
		while let Some((next, _)) = table.next(&key).unwrap() {
			keys.push(next.clone());
			key = next;
		}

		assert_equal(keys, vec![Value::new_string("x"), number(1.0), Value::new_string("y")]);
	}

	#[test]
	fn clearing_during_iteration() {
		let table = Table::array((1..=20).map(|index| number(index as f64)));
		let mut key = Value::Nil;
		let mut seen = 0;

		while let Some((next, _)) = table.next(&key).unwrap() {
			table.set(next.clone(), Value::Nil).unwrap();
			seen += 1;
			key = next;
		}

		assert_eq!(seen, 20);
		assert!(table.is_empty());
	}

	#[test]
	fn next_of_unknown_key() {
		let table = Table::array(vec![number(1.0)]);
		assert_eq!(table.next(&Value::new_string("nope")), Err(TableError::InvalidNext));
	}

	#[test]
	fn compaction_keeps_entries() {
		let table = Table::default();
		(0..64).for_each(|index| table.set(number(index as f64), number(1.0)).unwrap());
		(0..60).for_each(|index| table.set(number(index as f64), Value::Nil).unwrap());
		table.set(Value::new_string("new"), number(2.0)).unwrap();

		assert_equal(table.pairs().into_iter().map(|(key, _)| key), vec![
			number(60.0), number(61.0), number(62.0), number(63.0), Value::new_string("new")
		]);
		assert_eq!(table.get(&number(62.0)), number(1.0));
	}

	#[test]
	fn metatables() {
		let table = Table::default();
		assert!(table.metatable().is_none());

		let metatable = Table::default().arc();
		table.set_metatable(Some(metatable.clone()));
		assert!(table.metatable().map_or(false, |found| std::sync::Arc::ptr_eq(&found, &metatable)));
	}
}
