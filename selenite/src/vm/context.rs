use self::super::{
	cache::CallCache,
	error::{RuntimeError, StackFrame},
	table::Table,
	value::Value,
	varargs::Varargs
};
use crate::lua_lib;
use hashbrown::HashMap;
use std::{
	cell::RefCell,
	fmt::{Debug, Formatter, Result as FMTResult},
	sync::Arc
};

/// The types that share one metatable between all of their values.
const SHARED_METATABLE_TYPES: [&str; 4] = ["boolean", "number", "string", "function"];

/// Knobs for a [`Context`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ContextOptions {
	/// How many frames the call stack may hold before calls fail with a stack
	/// overflow.
	pub max_depth: usize
}

impl Default for ContextOptions {
	fn default() -> Self {
		Self {max_depth: 200}
	}
}

/// Everything operators need while Lua code runs: the global table, the
/// metatables of types that can't carry their own, the call cache, and the
/// call stack.
///
/// A context is meant to live as long as the program it runs. It is neither
/// `Send` nor `Sync`.
pub struct Context {
	pub globals: Arc<Table>,
	type_metatables: HashMap<&'static str, Arc<Table>>,
	cache: CallCache,
	stack: RefCell<Vec<StackFrame>>,
	options: ContextOptions
}

impl Context {
	/// Creates a context with empty globals.
	pub fn new() -> Self {
		Self::with_options(ContextOptions::default())
	}

	pub fn with_options(options: ContextOptions) -> Self {
		let type_metatables = SHARED_METATABLE_TYPES.iter()
			.map(|&name| (name, Table::default().arc()))
			.collect();

		Self {
			globals: Table::default().arc(),
			type_metatables,
			cache: CallCache::default(),
			stack: RefCell::new(Vec::new()),
			options
		}
	}

	/// Creates a context whose globals hold the base library.
	///
	/// `_G` makes the globals table refer to itself, so it outlives the
	/// context unless `_G` is cleared first.
	pub fn with_standard_library() -> Self {
		let context = Self::new();
		lua_lib::standard_globals(&context);
		context
	}

	pub fn options(&self) -> ContextOptions {
		self.options
	}

	pub fn cache(&self) -> &CallCache {
		&self.cache
	}

	/// The metatable shared by every value of the type `name`. Tables and nil
	/// have none.
	pub fn type_metatable(&self, name: &str) -> Option<Arc<Table>> {
		self.type_metatables.get(name).cloned()
	}

	/// Replaces the metatable shared by every value of the type `name`. Does
	/// nothing for types that can't share a metatable.
	pub fn set_type_metatable(&mut self, name: &str, metatable: Option<Arc<Table>>) {
		let name = match SHARED_METATABLE_TYPES.iter().find(|&&shared| shared == name) {
			Some(&name) => name,
			None => return
		};

		match metatable {
			Some(metatable) => {self.type_metatables.insert(name, metatable);},
			None => {self.type_metatables.remove(name);}
		}
	}

	/// Pushes a frame on the call stack, failing if the stack is full.
	pub fn enter(&self, frame: StackFrame) -> Result<(), RuntimeError> {
		if self.depth() >= self.options.max_depth {
			return Err(RuntimeError::new(self, "stack overflow"))
		}

		self.stack.borrow_mut().push(frame);
		Ok(())
	}

	/// Pops the most recent frame off the call stack.
	pub fn leave(&self) {
		self.stack.borrow_mut().pop();
	}

	/// Updates the line the most recent frame is running.
	pub fn set_line(&self, line: usize) {
		if let Some(frame) = self.stack.borrow_mut().last_mut() {
			frame.line = line
		}
	}

	pub fn depth(&self) -> usize {
		self.stack.borrow().len()
	}

	/// Pops frames until only `depth` are left, for recovering after an error.
	pub fn truncate_stack(&self, depth: usize) {
		self.stack.borrow_mut().truncate(depth)
	}

	/// A snapshot of the call stack, most recent frame first.
	pub fn stack(&self) -> Vec<StackFrame> {
		self.stack.borrow().iter().rev().cloned().collect()
	}

	pub fn global(&self, name: &str) -> Value {
		self.globals.get(&Value::new_string(name))
	}

	pub fn set_global(&self, name: &str, value: Value) {
		// String keys are always valid.
		self.globals.set(Value::new_string(name), value).ok();
	}

	/// `base[key]`, with metamethods.
	pub fn index(&self, base: &Value, key: &Value) -> Result<Value, RuntimeError> {
		self.cache.index()(self, base, key)
	}

	/// `base[key] = value`, with metamethods.
	pub fn new_index(&self, base: &Value, key: Value, value: Value)
			-> Result<(), RuntimeError> {
		self.cache.new_index()(self, base, key, value)
	}

	/// Calls `callee`, with metamethods.
	pub fn call(&self, callee: &Value, arguments: Varargs)
			-> Result<Varargs, RuntimeError> {
		match arguments.len() {
			0 => self.cache.call0()(self, callee, arguments),
			1 => self.cache.call1()(self, callee, arguments),
			2 => self.cache.call2()(self, callee, arguments),
			3 => self.cache.call3()(self, callee, arguments),
			_ => super::ops::call(self, callee, arguments)
		}
	}
}

impl Default for Context {
	fn default() -> Self {
		Self::new()
	}
}

impl Debug for Context {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		f.debug_struct("Context")
			.field("globals", &Arc::as_ptr(&self.globals))
			.field("cache", &self.cache)
			.field("stack", &self.stack.borrow())
			.field("options", &self.options)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use self::super::{Context, ContextOptions};
	use crate::{varargs, vm::{error::StackFrame, value::Value}};

	#[test]
	fn stack_depth_is_bounded() {
		let context = Context::with_options(ContextOptions {max_depth: 3});
		for _ in 0..3 {context.enter(StackFrame::native("f")).unwrap()}

		let error = context.enter(StackFrame::native("f")).unwrap_err();
		assert_eq!(error.message, "stack overflow");
		assert_eq!(context.depth(), 3);

		context.truncate_stack(1);
		assert_eq!(context.depth(), 1);
		context.leave();
		context.leave();
		assert_eq!(context.depth(), 0);
	}

	#[test]
	fn stack_snapshot_is_most_recent_first() {
		let context = Context::new();
		context.enter(StackFrame::chunk("main.lua", 1)).unwrap();
		context.enter(StackFrame::lua("f", "main.lua", 2)).unwrap();
		context.set_line(5);

		assert_eq!(context.stack(), vec![
			StackFrame::lua("f", "main.lua", 5),
			StackFrame::chunk("main.lua", 1)
		]);
	}

	#[test]
	fn type_metatables() {
		let mut context = Context::new();
		assert!(context.type_metatable("string").is_some());
		assert!(context.type_metatable("table").is_none());
		assert!(context.type_metatable("nil").is_none());

		context.set_type_metatable("number", None);
		assert!(context.type_metatable("number").is_none());
		context.set_type_metatable("table", Some(crate::vm::table::Table::default().arc()));
		assert!(context.type_metatable("table").is_none());
	}

	#[test]
	fn recursion_overflows() {
		let context = Context::new();
		context.set_global("recurse", Value::new_function("recurse", |context, _|
			context.call(&context.global("recurse"), varargs![])));

		let error = context.call(&context.global("recurse"), varargs![]).unwrap_err();
		assert!(error.message.ends_with("stack overflow"));
		assert_eq!(error.stack.len(), context.options().max_depth);
		assert_eq!(context.depth(), 0);
	}
}
