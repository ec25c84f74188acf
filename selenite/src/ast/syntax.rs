//! The syntax tree produced by the [parser](super::parser).
//!
//! Every node owns its children outright. Printing a node with [`Display`]
//! produces Lua source that parses back into an equal tree.

use itertools::Itertools;
use std::fmt::{Display, Formatter, Result as FMTResult};

/// A sequence of statements, optionally ended by `return` or `break`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
	pub statements: Vec<Statement>,
	pub last: Option<LastStatement>
}

impl Block {
	pub fn is_empty(&self) -> bool {
		self.statements.is_empty() && self.last.is_none()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum LastStatement {
	Return(Vec<Expression>),
	Break
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
	// Control

	/// A `do ... end` block.
	Do(Block),

	While {
		test: Expression,
		body: Block
	},

	/// A `repeat ... until` loop, running the body before the test.
	Repeat {
		body: Block,
		test: Expression
	},

	If {
		test: Expression,
		body: Block,
		elseifs: Vec<Elseif>,
		else_body: Option<Block>
	},

	/// A numeric for loop. A missing step means one, and is kept missing here so
	/// whatever evaluates the loop can tell.
	ForNormal {
		identifier: String,
		start: Expression,
		limit: Expression,
		step: Option<Expression>,
		body: Block
	},

	/// A generic for loop over an iterator triple.
	ForIn {
		identifiers: Vec<String>,
		values: Vec<Expression>,
		body: Block
	},

	// Functions

	Function {
		name: FunctionName,
		body: FunctionBody
	},

	LocalFunction {
		identifier: String,
		body: FunctionBody
	},

	// Assignment

	/// `local a, b = ...`. `values` is `None` when there is no `=` at all.
	LocalAssign {
		identifiers: Vec<String>,
		values: Option<Vec<Expression>>
	},

	Assign {
		variables: Vec<Variable>,
		values: Vec<Expression>
	},

	FunctionCall(FunctionCall)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Elseif {
	pub test: Expression,
	pub body: Block
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
	Nil,
	Boolean(bool),
	Number(f64),
	String(String),

	/// The `...` expression.
	Varargs,

	Function(FunctionBody),
	Prefix(PrefixExpression),
	Table(Vec<Field>),
	UnaryOp(UnaryOp, Box<Expression>),
	BinaryOp(BinaryOp, Box<Expression>, Box<Expression>)
}

impl Expression {
	/// The name of this expression, if it is nothing but a bare identifier.
	pub fn lift_identifier(&self) -> Option<&str> {
		match self {
			Self::Prefix(PrefixExpression::Variable(variable)) => match &**variable {
				Variable::Identifier(identifier) => Some(identifier),
				_ => None
			},
			_ => None
		}
	}
}

/// Something that may be followed by indexing or call suffixes.
#[derive(Clone, Debug, PartialEq)]
pub enum PrefixExpression {
	Variable(Box<Variable>),

	/// An expression in parenthesis. Wherever multiple values could come out of
	/// the inner expression, only the first is kept.
	Expression(Box<Expression>),

	FunctionCall(Box<FunctionCall>)
}

impl PrefixExpression {
	pub fn lift_variable(self) -> Option<Variable> {
		match self {
			Self::Variable(variable) => Some(*variable),
			_ => None
		}
	}

	pub fn lift_function_call(self) -> Option<FunctionCall> {
		match self {
			Self::FunctionCall(call) => Some(*call),
			_ => None
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Variable {
	Identifier(String),

	/// `object[key]`
	MemberExpr(PrefixExpression, Expression),

	/// `object.name`
	MemberId(PrefixExpression, String)
}

#[derive(Clone, Debug, PartialEq)]
pub enum FunctionCall {
	Normal(PrefixExpression, Arguments),

	/// `object:method(...)`, which passes `object` as an extra first argument.
	Table(PrefixExpression, String, Arguments)
}

#[derive(Clone, Debug, PartialEq)]
pub enum Arguments {
	Normal(Vec<Expression>),
	Table(Vec<Field>),
	String(String)
}

/// An entry of a table constructor.
#[derive(Clone, Debug, PartialEq)]
pub enum Field {
	/// A positional value.
	Normal(Expression),

	/// `[key] = value`
	MemberExpr(Expression, Expression),

	/// `name = value`
	MemberId(String, Expression)
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionBody {
	pub parameters: Vec<String>,
	pub varargs: bool,
	pub body: Block
}

/// The name a function statement assigns to, like `a.b.c:method`.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionName {
	pub identifiers: Vec<String>,

	/// Method definitions implicitly receive `self` as their first parameter.
	pub method: Option<String>
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UnaryOp {
	Negate,
	Not,
	Length
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinaryOp {
	// Logical
	Or,
	And,

	// Relational
	Equal,
	NotEqual,
	Less,
	Greater,
	LessEqual,
	GreaterEqual,

	// Other
	Concat,

	// Arithmetic
	Add,
	Subtract,
	Multiply,
	Divide,
	Mod,
	Power
}

/// Prefixes every line of `text` with a tab.
fn indent(text: &impl Display) -> String {
	text.to_string().lines()
		.map(|line| format!("\t{}\n", line))
		.collect()
}

/// Writes a string literal that scans back into the same text.
fn write_string(f: &mut Formatter, string: &str) -> FMTResult {
	write!(f, "\"")?;
	string.chars().try_for_each(|character| match character {
		'"' => write!(f, "\\\""),
		'\\' => write!(f, "\\\\"),
		'\n' => write!(f, "\\n"),
		'\r' => write!(f, "\\r"),
		'\t' => write!(f, "\\t"),
		character if character.is_ascii_control() =>
			write!(f, "\\{:03}", character as u32),
		character => write!(f, "{}", character)
	})?;
	write!(f, "\"")
}

/// Writes a number literal that scans back into the same value.
fn write_number(f: &mut Formatter, number: f64) -> FMTResult {
	if number.is_nan() {
		write!(f, "(0/0)")
	} else if number.is_infinite() {
		write!(f, "{}1e500", if number < 0.0 {"-"} else {""})
	} else if number.fract() == 0.0 && number.abs() < 1e15 {
		write!(f, "{}", number as i64)
	} else {
		write!(f, "{:e}", number)
	}
}

impl Display for Block {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		self.statements.iter().try_for_each(|statement| writeln!(f, "{}", statement))?;
		match &self.last {
			Some(last) => writeln!(f, "{}", last),
			None => Ok(())
		}
	}
}

impl Display for LastStatement {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		match self {
			Self::Return(values) if values.is_empty() => write!(f, "return"),
			Self::Return(values) => write!(f, "return {}", values.iter().join(", ")),
			Self::Break => write!(f, "break")
		}
	}
}

impl Display for Statement {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		match self {
			Self::Do(body) => write!(f, "do\n{}end", indent(body)),
			Self::While {test, body} =>
				write!(f, "while {} do\n{}end", test, indent(body)),
			Self::Repeat {body, test} =>
				write!(f, "repeat\n{}until {}", indent(body), test),
			Self::If {test, body, elseifs, else_body} => {
				write!(f, "if {} then\n{}", test, indent(body))?;
				elseifs.iter().try_for_each(|Elseif {test, body}|
					write!(f, "elseif {} then\n{}", test, indent(body)))?;
				if let Some(else_body) = else_body
					{write!(f, "else\n{}", indent(else_body))?}
				write!(f, "end")
			},
			Self::ForNormal {identifier, start, limit, step, body} => {
				write!(f, "for {} = {}, {}", identifier, start, limit)?;
				if let Some(step) = step {write!(f, ", {}", step)?}
				write!(f, " do\n{}end", indent(body))
			},
			Self::ForIn {identifiers, values, body} =>
				write!(f, "for {} in {} do\n{}end", identifiers.iter().join(", "),
					values.iter().join(", "), indent(body)),

			Self::Function {name, body} => write!(f, "function {}{}", name, body),
			Self::LocalFunction {identifier, body} =>
				write!(f, "local function {}{}", identifier, body),

			Self::LocalAssign {identifiers, values: None} =>
				write!(f, "local {}", identifiers.iter().join(", ")),
			Self::LocalAssign {identifiers, values: Some(values)} =>
				write!(f, "local {} = {}", identifiers.iter().join(", "),
					values.iter().join(", ")),

			// A leading parenthesis would otherwise continue the line before it as
			// a call, so it gets an empty statement in front.
			Self::Assign {variables, values} => {
				let variables = variables.iter().join(", ");
				if variables.starts_with('(') {write!(f, ";")?}
				write!(f, "{} = {}", variables, values.iter().join(", "))
			},
			Self::FunctionCall(call) => {
				let call = call.to_string();
				if call.starts_with('(') {write!(f, ";")?}
				write!(f, "{}", call)
			}
		}
	}
}

impl Display for Expression {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		match self {
			Self::Nil => write!(f, "nil"),
			Self::Boolean(boolean) => write!(f, "{}", boolean),
			Self::Number(number) => write_number(f, *number),
			Self::String(string) => write_string(f, string),
			Self::Varargs => write!(f, "..."),
			Self::Function(body) => write!(f, "function{}", body),
			Self::Prefix(prefix) => write!(f, "{}", prefix),
			Self::Table(fields) => write!(f, "{{{}}}", fields.iter().join(", ")),

			Self::UnaryOp(UnaryOp::Not, operand) => write!(f, "not {}", operand),
			Self::UnaryOp(operator, operand) => {
				let operand = operand.to_string();
				// `- -x` must not turn into a comment.
				let space = if operand.starts_with('-') {" "} else {""};
				write!(f, "{}{}{}", operator, space, operand)
			},
			Self::BinaryOp(operator, left, right) =>
				write!(f, "{} {} {}", left, operator, right)
		}
	}
}

impl Display for PrefixExpression {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		match self {
			Self::Variable(variable) => write!(f, "{}", variable),
			Self::Expression(expression) => write!(f, "({})", expression),
			Self::FunctionCall(call) => write!(f, "{}", call)
		}
	}
}

impl Display for Variable {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		match self {
			Self::Identifier(identifier) => write!(f, "{}", identifier),
			Self::MemberExpr(object, key) => write!(f, "{}[{}]", object, key),
			Self::MemberId(object, name) => write!(f, "{}.{}", object, name)
		}
	}
}

impl Display for FunctionCall {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		match self {
			Self::Normal(callee, arguments) => write!(f, "{}{}", callee, arguments),
			Self::Table(object, method, arguments) =>
				write!(f, "{}:{}{}", object, method, arguments)
		}
	}
}

impl Display for Arguments {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		match self {
			Self::Normal(arguments) => write!(f, "({})", arguments.iter().join(", ")),
			Self::Table(fields) => write!(f, "{{{}}}", fields.iter().join(", ")),
			Self::String(string) => write_string(f, string)
		}
	}
}

impl Display for Field {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		match self {
			Self::Normal(value) => write!(f, "{}", value),
			Self::MemberExpr(key, value) => write!(f, "[{}] = {}", key, value),
			Self::MemberId(name, value) => write!(f, "{} = {}", name, value)
		}
	}
}

impl Display for FunctionBody {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		let varargs = self.varargs.then(|| "...");
		let parameters = self.parameters.iter().map(String::as_str)
			.chain(varargs).join(", ");
		write!(f, "({})\n{}end", parameters, indent(&self.body))
	}
}

impl Display for FunctionName {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		write!(f, "{}", self.identifiers.iter().join("."))?;
		match &self.method {
			Some(method) => write!(f, ":{}", method),
			None => Ok(())
		}
	}
}

impl Display for UnaryOp {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		match self {
			Self::Negate => write!(f, "-"),
			Self::Not => write!(f, "not"),
			Self::Length => write!(f, "#")
		}
	}
}

impl Display for BinaryOp {
	fn fmt(&self, f: &mut Formatter) -> FMTResult {
		match self {
			// Logical
			Self::Or => write!(f, "or"),
			Self::And => write!(f, "and"),

			// Relational
			Self::Equal => write!(f, "=="),
			Self::NotEqual => write!(f, "~="),
			Self::Less => write!(f, "<"),
			Self::Greater => write!(f, ">"),
			Self::LessEqual => write!(f, "<="),
			Self::GreaterEqual => write!(f, ">="),

			// Other
			Self::Concat => write!(f, ".."),

			// Arithmetic
			Self::Add => write!(f, "+"),
			Self::Subtract => write!(f, "-"),
			Self::Multiply => write!(f, "*"),
			Self::Divide => write!(f, "/"),
			Self::Mod => write!(f, "%"),
			Self::Power => write!(f, "^")
		}
	}
}
