use self::super::{
	Result, message,
	grammar::{UNARY_PRIORITY, binary_operator, priority, unary_operator},
	lexer::{Lexer, Symbol, TokenStream},
	syntax::{
		Arguments, Block, Elseif, Expression, Field, FunctionBody, FunctionCall,
		FunctionName, LastStatement, PrefixExpression, Statement, Variable
	}
};
use log::debug;

/// Limits placed on the parser.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParserOptions {
	/// How deeply blocks and expressions may nest before the parser gives up.
	pub max_depth: usize
}

impl Default for ParserOptions {
	fn default() -> Self {
		Self {max_depth: 200}
	}
}

/// Parses a whole chunk of Lua source text.
///
/// Examples
/// --------
/// ```rust
/// # use selenite::ast::{parse, syntax::LastStatement};
/// let block = parse("local x = 1 return x").unwrap();
/// assert_eq!(block.statements.len(), 1);
/// assert!(matches!(block.last, Some(LastStatement::Return(_))));
/// ```
pub fn parse(source: &str) -> Result<Block> {
	Parser::new(TokenStream::from_source(source)?).parse()
}

/// A recursive descent parser over any [`Lexer`].
///
/// Statements are parsed top down, and expressions by precedence climbing over
/// the [operator tables](super::grammar). The first error stops parsing.
pub struct Parser<L>
		where L: Lexer {
	lexer: L,
	options: ParserOptions,
	depth: usize
}

impl<L> Parser<L>
		where L: Lexer {
	pub fn new(lexer: L) -> Self {
		Self {lexer, options: ParserOptions::default(), depth: 0}
	}

	pub fn with_options(mut self, options: ParserOptions) -> Self {
		self.options = options;
		self
	}

	/// Parses a block followed by the end of the source.
	pub fn parse(mut self) -> Result<Block> {
		let block = self.block()?;
		self.lexer.expect(Symbol::Eof)?;

		debug!("parsed chunk with {} top level statements", block.statements.len());
		Ok(block)
	}

	/// Runs `parse` one nesting level deeper.
	fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>)
			-> Result<T> {
		if self.depth >= self.options.max_depth
			{return Err(self.lexer.syntax_error(message::TOO_MANY_LEVELS, &[]))}

		self.depth += 1;
		let result = parse(self);
		self.depth -= 1;
		result
	}

	fn unexpected<T>(&self) -> Result<T> {
		let near = self.lexer.current().near();
		Err(self.lexer.syntax_error(message::UNEXPECTED_SYMBOL, &[&near]))
	}

	/// identifier {',' identifier}
	fn identifier_list(&mut self) -> Result<Vec<String>> {
		let mut identifiers = vec![self.lexer.expect_lexeme(Symbol::Identifier)?];
		while self.lexer.try_consume(Symbol::Comma)?
			{identifiers.push(self.lexer.expect_lexeme(Symbol::Identifier)?)}
		Ok(identifiers)
	}

	/// expression {',' expression}
	fn expression_list(&mut self) -> Result<Vec<Expression>> {
		let mut expressions = vec![self.expression()?];
		while self.lexer.try_consume(Symbol::Comma)?
			{expressions.push(self.expression()?)}
		Ok(expressions)
	}

	/// '{' [field {(',' | ';') field} [',' | ';']] '}'
	fn table(&mut self) -> Result<Vec<Field>> {
		self.lexer.expect(Symbol::LeftBrace)?;
		let mut fields = Vec::new();

		while self.lexer.current_symbol() != Symbol::RightBrace {
			fields.push(self.field()?);

			match self.lexer.current_symbol() {
				Symbol::Comma | Symbol::SemiColon => self.lexer.consume()?,
				Symbol::RightBrace => break,
				_ => return self.unexpected()
			}
		}

		self.lexer.expect(Symbol::RightBrace)?;
		Ok(fields)
	}

	/// '[' expression ']' '=' expression | identifier '=' expression | expression
	fn field(&mut self) -> Result<Field> {
		// [key] = value
		if self.lexer.try_consume(Symbol::LeftBrack)? {
			let key = self.expression()?;
			self.lexer.expect(Symbol::RightBrack)?;
			self.lexer.expect(Symbol::Equal)?;
			return Ok(Field::MemberExpr(key, self.expression()?))
		}

		let expression = self.expression()?;
		if self.lexer.current_symbol() != Symbol::Equal
			{return Ok(Field::Normal(expression))}

		// name = value
		self.lexer.consume()?;
		match expression.lift_identifier() {
			Some(name) => {
				let name = name.to_owned();
				Ok(Field::MemberId(name, self.expression()?))
			},
			None => self.unexpected()
		}
	}

	/// Converts the raw text of a number.
	///
	/// Exponents too large to represent are still accepted when both the
	/// mantissa and exponent are plain integers, evaluating to an infinity with
	/// the sign of the mantissa.
	fn number(&mut self) -> Result<f64> {
		let number = self.lexer.current().lexeme.clone();

		let parsed = match number.strip_prefix("0x").or_else(|| number.strip_prefix("0X")) {
			Some(digits) => parse_hex(digits),
			None => number.parse::<f64>().ok().filter(|number| number.is_finite())
		};

		let parsed = parsed.or_else(|| {
			let (mantissa, exponent) = number
				.split_once(|character| matches!(character, 'e' | 'E'))?;
			let mantissa = mantissa.parse::<i32>().ok()?;
			exponent.parse::<i32>().ok()?;
			Some(if mantissa > 0 {f64::INFINITY} else {f64::NEG_INFINITY})
		});

		match parsed {
			Some(parsed) => {self.lexer.consume()?; Ok(parsed)},
			None => Err(self.lexer.syntax_error(message::MALFORMED_NUMBER, &[&number]))
		}
	}

	/// Any prefix expression that turns out to be a variable.
	fn variable(&mut self) -> Result<Variable> {
		match self.prefix_expression()?.lift_variable() {
			Some(variable) => Ok(variable),
			None => self.unexpected()
		}
	}

	/// '(' [expression_list] ')' | table | string
	fn arguments(&mut self) -> Result<Arguments> {
		match self.lexer.current_symbol() {
			Symbol::LeftParen => {
				if self.lexer.current().line != self.lexer.last().end_line {
					let near = self.lexer.current().near();
					return Err(self.lexer.syntax_error(
						message::AMBIGUOUS_SYNTAX_FUNCTION_CALL, &[&near]))
				}
				self.lexer.consume()?;

				let arguments = match self.lexer.current_symbol() {
					Symbol::RightParen => Vec::new(),
					_ => self.expression_list()?
				};

				self.lexer.expect(Symbol::RightParen)?;
				Ok(Arguments::Normal(arguments))
			},
			Symbol::LeftBrace => Ok(Arguments::Table(self.table()?)),
			Symbol::String => Ok(Arguments::String(self.lexer.consume_lexeme()?)),
			_ => self.unexpected()
		}
	}

	/// '(' [identifier_list [',' '...'] | '...'] ')' block 'end'
	fn function_body(&mut self) -> Result<FunctionBody> {
		self.lexer.expect(Symbol::LeftParen)?;
		let mut parameters = Vec::new();
		let mut varargs = false;

		if self.lexer.current_symbol() != Symbol::RightParen {
			loop {
				match self.lexer.current_symbol() {
					Symbol::DotDotDot => {self.lexer.consume()?; varargs = true; break},
					Symbol::Identifier => parameters.push(self.lexer.consume_lexeme()?),
					_ => {
						let near = self.lexer.current().near();
						return Err(self.lexer.syntax_error(message::EXPECTED_SYMBOL,
							&[&Symbol::Identifier, &near]))
					}
				}

				if !self.lexer.try_consume(Symbol::Comma)? {break}
			}
		}

		self.lexer.expect(Symbol::RightParen)?;
		let body = self.block()?;
		self.lexer.expect(Symbol::End)?;
		Ok(FunctionBody {parameters, varargs, body})
	}

	/// identifier {'.' identifier} [':' identifier]
	fn function_name(&mut self) -> Result<FunctionName> {
		let mut identifiers = vec![self.lexer.expect_lexeme(Symbol::Identifier)?];
		while self.lexer.try_consume(Symbol::Dot)?
			{identifiers.push(self.lexer.expect_lexeme(Symbol::Identifier)?)}

		let method = match self.lexer.try_consume(Symbol::Colon)? {
			true => Some(self.lexer.expect_lexeme(Symbol::Identifier)?),
			false => None
		};

		Ok(FunctionName {identifiers, method})
	}

	/// (identifier | '(' expression ')') {suffix}
	fn prefix_expression(&mut self) -> Result<PrefixExpression> {
		let mut prefix = match self.lexer.current_symbol() {
			// name
			Symbol::Identifier => PrefixExpression::Variable(Box::new(
				Variable::Identifier(self.lexer.consume_lexeme()?))),

			// (expression)
			Symbol::LeftParen => {
				self.lexer.consume()?;
				let expression = self.expression()?;
				self.lexer.expect(Symbol::RightParen)?;
				PrefixExpression::Expression(Box::new(expression))
			},

			_ => return self.unexpected()
		};

		loop {
			prefix = match self.lexer.current_symbol() {
				// prefix[key]
				Symbol::LeftBrack => {
					self.lexer.consume()?;
					let key = self.expression()?;
					self.lexer.expect(Symbol::RightBrack)?;
					PrefixExpression::Variable(Box::new(Variable::MemberExpr(prefix, key)))
				},

				// prefix.name
				Symbol::Dot => {
					self.lexer.consume()?;
					let name = self.lexer.expect_lexeme(Symbol::Identifier)?;
					PrefixExpression::Variable(Box::new(Variable::MemberId(prefix, name)))
				},

				// prefix:method(arguments)
				Symbol::Colon => {
					self.lexer.consume()?;
					let method = self.lexer.expect_lexeme(Symbol::Identifier)?;
					let arguments = self.arguments()?;
					PrefixExpression::FunctionCall(Box::new(
						FunctionCall::Table(prefix, method, arguments)))
				},

				// prefix(arguments)
				Symbol::LeftParen | Symbol::LeftBrace | Symbol::String => {
					let arguments = self.arguments()?;
					PrefixExpression::FunctionCall(Box::new(
						FunctionCall::Normal(prefix, arguments)))
				},

				_ => break Ok(prefix)
			}
		}
	}

	pub fn expression(&mut self) -> Result<Expression> {
		let left = self.simple_expression()?;
		self.binary_expression(left, 0)
	}

	/// A single operand, including any unary operators in front of it.
	fn simple_expression(&mut self) -> Result<Expression> {
		self.nested(|parser| {
			Ok(match parser.lexer.current_symbol() {
				Symbol::Nil => {parser.lexer.consume()?; Expression::Nil},
				Symbol::True => {parser.lexer.consume()?; Expression::Boolean(true)},
				Symbol::False => {parser.lexer.consume()?; Expression::Boolean(false)},
				Symbol::Number => Expression::Number(parser.number()?),
				Symbol::String => Expression::String(parser.lexer.consume_lexeme()?),
				Symbol::DotDotDot => {parser.lexer.consume()?; Expression::Varargs},
				Symbol::Function => {
					parser.lexer.consume()?;
					Expression::Function(parser.function_body()?)
				},
				Symbol::Identifier | Symbol::LeftParen =>
					Expression::Prefix(parser.prefix_expression()?),
				Symbol::LeftBrace => Expression::Table(parser.table()?),

				symbol => match unary_operator(symbol) {
					Some(operator) => {
						parser.lexer.consume()?;
						let operand = parser.simple_expression()?;
						let operand = parser.binary_expression(operand, UNARY_PRIORITY)?;
						Expression::UnaryOp(operator, Box::new(operand))
					},
					None => return parser.unexpected()
				}
			})
		})
	}

	/// Folds in binary operators binding tighter than `limit`.
	fn binary_expression(&mut self, mut left: Expression, limit: u8)
			-> Result<Expression> {
		while let Some(operator) = binary_operator(self.lexer.current_symbol()) {
			let (left_priority, right_priority) = priority(operator);
			if left_priority <= limit {break}

			self.lexer.consume()?;
			// Right associative chains recurse once per operator.
			let right = self.nested(|parser| {
				let right = parser.simple_expression()?;
				parser.binary_expression(right, right_priority)
			})?;
			left = Expression::BinaryOp(operator, Box::new(left), Box::new(right));
		}

		Ok(left)
	}

	/// {statement [';']} [last_statement [';']]
	pub fn block(&mut self) -> Result<Block> {
		self.nested(|parser| {
			let mut statements = Vec::new();

			let last = loop {
				let statement = match parser.lexer.current_symbol() {
					// ;
					Symbol::SemiColon => {parser.lexer.consume()?; continue},

					Symbol::Do => parser.do_statement()?,
					Symbol::While => parser.while_statement()?,
					Symbol::Repeat => parser.repeat_statement()?,
					Symbol::If => parser.if_statement()?,
					Symbol::For => parser.for_statement()?,
					Symbol::Function => parser.function_statement()?,
					Symbol::Local => parser.local_statement()?,
					Symbol::Identifier | Symbol::LeftParen =>
						parser.assign_or_call_statement()?,

					Symbol::Return => break Some(parser.return_statement()?),
					Symbol::Break => {
						parser.lexer.consume()?;
						break Some(LastStatement::Break)
					},

					_ => break None
				};

				statements.push(statement);
			};

			if last.is_some() {parser.lexer.try_consume(Symbol::SemiColon)?;}
			Ok(Block {statements, last})
		})
	}

	/// 'return' [expression_list]
	fn return_statement(&mut self) -> Result<LastStatement> {
		self.lexer.expect(Symbol::Return)?;

		match self.lexer.current_symbol() {
			Symbol::End | Symbol::Else | Symbol::Elseif | Symbol::Until
				| Symbol::Eof | Symbol::SemiColon =>
					Ok(LastStatement::Return(Vec::new())),
			_ => Ok(LastStatement::Return(self.expression_list()?))
		}
	}

	fn assign_or_call_statement(&mut self) -> Result<Statement> {
		let prefix = self.prefix_expression()?;

		match self.lexer.current_symbol() {
			// variable {',' variable} = values
			Symbol::Comma | Symbol::Equal => {
				let mut variables = match prefix.lift_variable() {
					Some(variable) => vec![variable],
					None => return self.unexpected()
				};

				while self.lexer.try_consume(Symbol::Comma)?
					{variables.push(self.variable()?)}

				self.lexer.expect(Symbol::Equal)?;
				let values = self.expression_list()?;
				Ok(Statement::Assign {variables, values})
			},

			// call(arguments)
			_ => match prefix.lift_function_call() {
				Some(call) => Ok(Statement::FunctionCall(call)),
				None => self.unexpected()
			}
		}
	}

	/// 'local' ('function' identifier function_body | identifier_list ['=' expression_list])
	fn local_statement(&mut self) -> Result<Statement> {
		self.lexer.expect(Symbol::Local)?;

		match self.lexer.current_symbol() {
			Symbol::Function => {
				self.lexer.consume()?;
				let identifier = self.lexer.expect_lexeme(Symbol::Identifier)?;
				Ok(Statement::LocalFunction {identifier, body: self.function_body()?})
			},
			Symbol::Identifier => {
				let identifiers = self.identifier_list()?;
				let values = match self.lexer.try_consume(Symbol::Equal)? {
					true => Some(self.expression_list()?),
					false => None
				};
				Ok(Statement::LocalAssign {identifiers, values})
			},
			_ => self.unexpected()
		}
	}

	/// 'function' function_name function_body
	fn function_statement(&mut self) -> Result<Statement> {
		self.lexer.expect(Symbol::Function)?;
		let name = self.function_name()?;
		Ok(Statement::Function {name, body: self.function_body()?})
	}

	/// 'for' (identifier '=' start ',' limit [',' step] | identifier_list 'in'
	/// expression_list) 'do' block 'end'
	fn for_statement(&mut self) -> Result<Statement> {
		self.lexer.expect(Symbol::For)?;

		let statement = match self.lexer.next_symbol() {
			// for k, v in pairs(t)
			Symbol::Comma | Symbol::In => {
				let identifiers = self.identifier_list()?;
				self.lexer.expect(Symbol::In)?;
				let values = self.expression_list()?;
				self.lexer.expect(Symbol::Do)?;
				Statement::ForIn {identifiers, values, body: self.block()?}
			},

			// for i = 1, 10, 2
			_ => {
				let identifier = self.lexer.expect_lexeme(Symbol::Identifier)?;
				self.lexer.expect(Symbol::Equal)?;
				let start = self.expression()?;
				self.lexer.expect(Symbol::Comma)?;
				let limit = self.expression()?;
				let step = match self.lexer.try_consume(Symbol::Comma)? {
					true => Some(self.expression()?),
					false => None
				};
				self.lexer.expect(Symbol::Do)?;
				Statement::ForNormal {identifier, start, limit, step, body: self.block()?}
			}
		};

		self.lexer.expect(Symbol::End)?;
		Ok(statement)
	}

	/// 'if' expression 'then' block {'elseif' expression 'then' block}
	/// ['else' block] 'end'
	fn if_statement(&mut self) -> Result<Statement> {
		self.lexer.expect(Symbol::If)?;
		let test = self.expression()?;
		self.lexer.expect(Symbol::Then)?;
		let body = self.block()?;

		let mut elseifs = Vec::new();
		while self.lexer.try_consume(Symbol::Elseif)? {
			let test = self.expression()?;
			self.lexer.expect(Symbol::Then)?;
			elseifs.push(Elseif {test, body: self.block()?});
		}

		let else_body = match self.lexer.try_consume(Symbol::Else)? {
			true => Some(self.block()?),
			false => None
		};

		self.lexer.expect(Symbol::End)?;
		Ok(Statement::If {test, body, elseifs, else_body})
	}

	/// 'repeat' block 'until' expression
	fn repeat_statement(&mut self) -> Result<Statement> {
		self.lexer.expect(Symbol::Repeat)?;
		let body = self.block()?;
		self.lexer.expect(Symbol::Until)?;
		Ok(Statement::Repeat {body, test: self.expression()?})
	}

	/// 'while' expression 'do' block 'end'
	fn while_statement(&mut self) -> Result<Statement> {
		self.lexer.expect(Symbol::While)?;
		let test = self.expression()?;
		self.lexer.expect(Symbol::Do)?;
		let body = self.block()?;
		self.lexer.expect(Symbol::End)?;
		Ok(Statement::While {test, body})
	}

	/// 'do' block 'end'
	fn do_statement(&mut self) -> Result<Statement> {
		self.lexer.expect(Symbol::Do)?;
		let body = self.block()?;
		self.lexer.expect(Symbol::End)?;
		Ok(Statement::Do(body))
	}
}

/// Converts hexadecimal digits, without the `0x` prefix.
fn parse_hex(digits: &str) -> Option<f64> {
	if digits.is_empty() {return None}
	digits.chars().try_fold(0.0, |number, digit|
		Some(number * 16.0 + f64::from(digit.to_digit(16)?)))
}
