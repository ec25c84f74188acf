use self::super::{
	context::Context, error::RuntimeError, ops, value::Value, varargs::Varargs
};
use log::trace;
use once_cell::unsync::OnceCell;
use std::fmt::{Debug, Formatter, Result as FMTResult};

pub type IndexThunk = dyn Fn(&Context, &Value, &Value) -> Result<Value, RuntimeError>;
pub type NewIndexThunk = dyn Fn(&Context, &Value, Value, Value) -> Result<(), RuntimeError>;
pub type CallThunk = dyn Fn(&Context, &Value, Varargs) -> Result<Varargs, RuntimeError>;

/// Lazily built dispatch routines, shared by every operator applied within one
/// [`Context`].
///
/// Each slot is filled the first time it is asked for and then kept for as long
/// as the context lives. Slots are never invalidated. The cache is not `Sync`,
/// so a context can't be shared between threads while slots may still be
/// filled.
#[derive(Default)]
pub struct CallCache {
	index: OnceCell<Box<IndexThunk>>,
	new_index: OnceCell<Box<NewIndexThunk>>,
	call0: OnceCell<Box<CallThunk>>,
	call1: OnceCell<Box<CallThunk>>,
	call2: OnceCell<Box<CallThunk>>,
	call3: OnceCell<Box<CallThunk>>
}

impl CallCache {
	/// Reads `base[key]`, going through `__index`.
	pub fn index(&self) -> &IndexThunk {
		self.index.get_or_init(|| {
			trace!("populating call cache slot for index");
			Box::new(ops::index) as Box<IndexThunk>
		})
	}

	/// Writes `base[key] = value`, going through `__newindex`.
	pub fn new_index(&self) -> &NewIndexThunk {
		self.new_index.get_or_init(|| {
			trace!("populating call cache slot for new index");
			Box::new(ops::new_index) as Box<NewIndexThunk>
		})
	}

	/// Calls with no arguments.
	pub fn call0(&self) -> &CallThunk {
		fixed_arity(&self.call0, 0)
	}

	/// Calls with exactly one argument.
	pub fn call1(&self) -> &CallThunk {
		fixed_arity(&self.call1, 1)
	}

	/// Calls with exactly two arguments, as binary metamethods are.
	pub fn call2(&self) -> &CallThunk {
		fixed_arity(&self.call2, 2)
	}

	/// Calls with exactly three arguments, as `__newindex` is.
	pub fn call3(&self) -> &CallThunk {
		fixed_arity(&self.call3, 3)
	}

	/// How many slots have been filled so far.
	pub fn populated(&self) -> usize {
		[
			self.index.get().is_some(),
			self.new_index.get().is_some(),
			self.call0.get().is_some(),
			self.call1.get().is_some(),
			self.call2.get().is_some(),
			self.call3.get().is_some()
		].iter().filter(|populated| **populated).count()
	}
}

/// Fills `slot` with a call routine that pads or truncates its arguments to
/// exactly `arity` values.
fn fixed_arity(slot: &OnceCell<Box<CallThunk>>, arity: usize) -> &CallThunk {
	slot.get_or_init(|| {
		trace!("populating call cache slot for {} argument calls", arity);
		Box::new(move |context: &Context, callee: &Value, Varargs(mut arguments): Varargs| {
			arguments.resize(arity, Value::Nil);
			ops::call(context, callee, Varargs(arguments))
		}) as Box<CallThunk>
	})
}

impl Debug for CallCache {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		f.debug_struct("CallCache")
			.field("populated", &self.populated())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use crate::{varargs, vm::{context::Context, value::Value}};

	#[test]
	fn slots_fill_once() {
		let context = Context::new();
		assert_eq!(context.cache().populated(), 0);

		let first = context.cache().call2() as *const _ as *const ();
		let second = context.cache().call2() as *const _ as *const ();
		assert_eq!(first, second);
		assert_eq!(context.cache().populated(), 1);
	}

	#[test]
	fn fixed_arity_adjusts_arguments() {
		let context = Context::new();
		let count = Value::new_function("count", |_, arguments| Ok(varargs![arguments.len()]));

		let result = context.cache().call2()(&context, &count, varargs![1]).unwrap();
		assert_eq!(result.first(), Value::Number(2.0));
		let result = context.cache().call0()(&context, &count, varargs![1, 2, 3]).unwrap();
		assert_eq!(result.first(), Value::Number(0.0));
	}
}
