use self::super::{Result, SyntaxError, message};
use std::{
	fmt::{Display, Formatter, Result as FMTResult},
	iter::Peekable,
	mem::replace,
	str::Chars
};

/// The source position and text of a single token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
	pub symbol: Symbol,
	pub lexeme: String,
	pub line: usize,
	pub column: usize,
	/// The line the token's last character is on, which differs from `line`
	/// for long strings and strings with escaped newlines.
	pub end_line: usize
}

impl Token {
	pub fn new(symbol: Symbol, lexeme: impl Into<String>, line: usize,
			column: usize) -> Self {
		Self {symbol, lexeme: lexeme.into(), line, column, end_line: line}
	}

	/// The text used to refer to this token in error messages.
	pub fn near(&self) -> String {
		match self.symbol {
			Symbol::Eof => "<eof>".to_owned(),
			Symbol::Identifier | Symbol::Number | Symbol::String
				| Symbol::Error => self.lexeme.clone(),
			symbol => symbol.to_string()
		}
	}
}

impl Display for Token {
	fn fmt(&self, f: &mut Formatter<'_>) -> FMTResult {
		write!(f, "{}:{} {:?} {:?}", self.line, self.column, self.symbol,
			self.lexeme)
	}
}

/// The capabilities the parser needs from a token source.
///
/// Exactly one token is current at any time, and one more token of lookahead
/// is available through [`next_symbol`](Self::next_symbol). Errors are
/// constructed with [`syntax_error`](Self::syntax_error) and returned by the
/// caller; nothing here recovers from them.
pub trait Lexer {
	/// The token the parser is looking at.
	fn current(&self) -> &Token;

	/// The most recently consumed token.
	fn last(&self) -> &Token;

	/// The symbol of the token following the current one.
	///
	/// If that token could not be scanned, [`Symbol::Error`] is returned and the
	/// scan error is reported once the token is consumed.
	fn next_symbol(&mut self) -> Symbol;

	/// Advances to the next token.
	fn consume(&mut self) -> Result<()>;

	fn current_symbol(&self) -> Symbol {
		self.current().symbol
	}

	/// Advances, returning the text of the token that was current.
	fn consume_lexeme(&mut self) -> Result<String> {
		let lexeme = self.current().lexeme.clone();
		self.consume()?;
		Ok(lexeme)
	}

	/// Advances only if the current token is `symbol`.
	fn try_consume(&mut self, symbol: Symbol) -> Result<bool> {
		if self.current_symbol() == symbol {self.consume()?; Ok(true)}
			else {Ok(false)}
	}

	fn expect(&mut self, symbol: Symbol) -> Result<()> {
		self.expect_lexeme(symbol).map(drop)
	}

	fn expect_lexeme(&mut self, symbol: Symbol) -> Result<String> {
		if self.current_symbol() == symbol {
			self.consume_lexeme()
		} else {
			let near = self.current().near();
			Err(self.syntax_error(message::EXPECTED_SYMBOL, &[&symbol, &near]))
		}
	}

	/// Builds a syntax error positioned at the current token. `template` may
	/// refer to `arguments` with `{0}`, `{1}` and so on.
	fn syntax_error(&self, template: &str, arguments: &[&dyn Display])
			-> SyntaxError {
		let current = self.current();
		SyntaxError::new(message::render(template, arguments), current.line,
			current.column)
	}
}

/// Tokenizes Lua source text, character by character.
///
/// The Scanner wraps some [`Iterator`] of [`char`]s, T, and can be iterated
/// over, producing [`Token`]s. Comments are produced as tokens so tools can see
/// them; [`TokenStream`] drops them before the parser does. The last token is
/// always [`Symbol::Eof`].
///
/// Examples
/// --------
/// ```rust
/// # use selenite::ast::lexer::{Scanner, Symbol};
/// let symbols = Scanner::new("print('hello world!')")
/// 	.map(|token| token.map(|token| token.symbol))
/// 	.collect::<Result<Vec<_>, _>>().unwrap();
///
/// assert_eq!(symbols, vec![Symbol::Identifier, Symbol::LeftParen,
/// 	Symbol::String, Symbol::RightParen, Symbol::Eof]);
/// ```
pub struct Scanner<T>
		where T: Iterator<Item = char> {
	source: Peekable<T>,
	line: usize,
	column: usize,
	finished: bool
}

impl<'s> Scanner<Chars<'s>> {
	pub fn new(source: &'s str) -> Self {
		Self::from_chars(source.chars())
	}
}

// Construction, plus the character level helpers the scanner is built on.
impl<T> Scanner<T>
		where T: Iterator<Item = char> {
	pub fn from_chars(source: T) -> Self {
		Self {source: source.peekable(), line: 1, column: 1, finished: false}
	}

	/// Skips the first line if it starts with `#`, as script files carrying an
	/// interpreter line do.
	pub fn skip_first_line(mut self) -> Self {
		if let Some('#') = self.peek() {
			while !matches!(self.peek(), Some('\n') | None) {self.eat()}
		}
		self
	}

	/// Returns the next character, if any, keeping track of the position.
	fn next_char(&mut self) -> Option<char> {
		let character = self.source.next()?;
		if character == '\n' {self.line += 1; self.column = 1}
			else {self.column += 1}
		Some(character)
	}

	/// Eats a character, disposing of it.
	fn eat(&mut self) {
		self.next_char();
	}

	/// Returns the next character, assuming that the character was already
	/// peeked, and did infact, exist.
	fn peeked_next(&mut self) -> char {
		match self.next_char() {
			Some(next) => next,
			None => unreachable!("called peeked_next when there wasn't anything next")
		}
	}

	fn peek(&mut self) -> Option<char> {
		self.source.peek().copied()
	}

	fn error(&self, message: String, line: usize, column: usize)
			-> SyntaxError {
		SyntaxError::new(message, line, column)
	}

	/// Parses and discards all whitespace, and returns the last peeked non
	/// whitespace character.
	fn parse_whitespace(&mut self) -> Option<char> {
		loop {
			match self.peek()? {
				' ' | '\n' | '\r' | '\t' | '\x0B' | '\x0C' => self.eat(),
				character => break Some(character)
			}
		}
	}

	/// Parses an identifier or keyword.
	fn parse_identifier(&mut self) -> (Symbol, String) {
		let mut identifier = String::new();

		while let Some('a'..='z' | 'A'..='Z' | '0'..='9' | '_') = self.peek()
			{identifier.push(self.peeked_next())}

		let symbol = Symbol::keyword(&identifier).unwrap_or(Symbol::Identifier);
		(symbol, identifier)
	}

	/// Parses the raw text of a number. Conversion is left to the parser, which
	/// decides what a malformed number means.
	fn parse_number(&mut self) -> String {
		let mut number = String::new();

		loop {
			match self.peek() {
				Some(character @ ('e' | 'E')) => {
					self.eat(); number.push(character);
					if let Some(sign @ ('+' | '-')) = self.peek()
						{self.eat(); number.push(sign)}
				},
				Some(character) if character.is_ascii_alphanumeric()
					|| character == '.' || character == '_' =>
						number.push(self.peeked_next()),
				_ => break number
			}
		}
	}

	/// Parses a quoted string. Assumes the first quote character *was not*
	/// consumed.
	fn parse_string(&mut self, line: usize, column: usize) -> Result<String> {
		let delimiter = self.peeked_next();
		let mut string = String::new();
		let unfinished = |scanner: &Self, string: &str| scanner.error(
			message::render(message::UNFINISHED_STRING, &[&string]), line, column);

		loop {
			match self.peek() {
				None | Some('\n') => break Err(unfinished(self, &string)),
				Some('\\') => {
					self.eat();
					match self.peek() {
						None => break Err(unfinished(self, &string)),
						Some('a') => {self.eat(); string.push('\x07')},
						Some('b') => {self.eat(); string.push('\x08')},
						Some('f') => {self.eat(); string.push('\x0C')},
						Some('n') => {self.eat(); string.push('\n')},
						Some('r') => {self.eat(); string.push('\r')},
						Some('t') => {self.eat(); string.push('\t')},
						Some('v') => {self.eat(); string.push('\x0B')},
						Some('\n') => {self.eat(); string.push('\n')},
						Some(character @ ('\\' | '"' | '\'' | '[' | ']')) =>
							{self.eat(); string.push(character)},
						Some('0'..='9') => {
							let mut code = 0u32;
							let mut digits = 0;
							while let (Some(digit @ '0'..='9'), true) = (self.peek(), digits < 3) {
								self.eat(); digits += 1;
								code = code * 10 + digit.to_digit(10).unwrap_or(0);
							}

							match u8::try_from(code) {
								Ok(byte) => string.push(char::from(byte)),
								Err(_) => break Err(self.error(message::render(
									message::ESCAPE_TOO_LARGE, &[&code]), self.line, self.column))
							}
						},
						Some(character) => break Err(self.error(message::render(
							message::INVALID_ESCAPE, &[&character]), self.line, self.column))
					}
				},
				Some(character) if character == delimiter =>
					{self.eat(); break Ok(string)},
				Some(_) => string.push(self.peeked_next())
			}
		}
	}

	/// Counts the `=` signs of a long bracket opener. Assumes the first `[` *was*
	/// consumed. Returns the level, and whether the second `[` was found and
	/// consumed. The consumed text is appended to `consumed`.
	fn parse_bracket_level(&mut self, consumed: &mut String) -> (usize, bool) {
		let mut level = 0;
		loop {
			match self.peek() {
				Some('=') => {self.eat(); consumed.push('='); level += 1},
				Some('[') => {self.eat(); break (level, true)},
				_ => break (level, false)
			}
		}
	}

	/// Parses the body of a long bracket of the given level, up to and including
	/// the matching closer.
	fn parse_bracketed(&mut self, level: usize, line: usize, column: usize)
			-> Result<String> {
		let mut string = String::new();

		// The first newline directly after the opener is not part of the text.
		match self.peek() {
			Some('\r') => {
				self.eat();
				if let Some('\n') = self.peek() {self.eat()}
			},
			Some('\n') => self.eat(),
			_ => ()
		}

		loop {
			match self.peek() {
				None => break Err(self.error(message::UNFINISHED_LONG.to_owned(),
					line, column)),
				Some(']') => {
					self.eat();
					let mut equals = 0;
					while let Some('=') = self.peek() {self.eat(); equals += 1}

					match self.peek() {
						Some(']') if equals == level => {self.eat(); break Ok(string)},
						_ => {
							string.push(']');
							(0..equals).for_each(|_| string.push('='));
						}
					}
				},
				Some(_) => string.push(self.peeked_next())
			}
		}
	}

	/// Parses a comment. Assumes the first characters were `--`, and *were*
	/// consumed.
	fn parse_comment(&mut self, line: usize, column: usize) -> Result<String> {
		let mut comment = String::new();

		if let Some('[') = self.peek() {
			self.eat();
			let mut opener = String::from("[");
			match self.parse_bracket_level(&mut opener) {
				(level, true) => return self.parse_bracketed(level, line, column),
				(_, false) => comment.push_str(&opener)
			}
		}

		loop {
			match self.peek() {
				Some('\n') | None => break Ok(comment),
				Some(_) => comment.push(self.peeked_next())
			}
		}
	}

	fn scan(&mut self) -> Option<Result<Token>> {
		let character = match self.parse_whitespace() {
			Some(character) => character,
			None => {
				self.finished = true;
				return Some(Ok(Token::new(Symbol::Eof, "", self.line, self.column)))
			}
		};
		let (line, column) = (self.line, self.column);
		let token = |symbol, lexeme: &str| Some(Ok(Token::new(symbol, lexeme,
			line, column)));

		match character {
			// Minus (-) or Comment (--)
			'-' => match {self.eat(); self.peek()} {
				Some('-') => {
					self.eat();
					Some(self.parse_comment(line, column)
						.map(|comment| Token::new(Symbol::Comment, comment, line, column)))
				},
				_ => token(Symbol::Minus, "-")
			},

			// LeftBrack ([) or long String ([[]])
			'[' => match {self.eat(); self.peek()} {
				Some('=' | '[') => {
					let mut opener = String::from("[");
					match self.parse_bracket_level(&mut opener) {
						(level, true) => Some(self.parse_bracketed(level, line, column)
							.map(|string| Token::new(Symbol::String, string, line, column))),
						(_, false) => Some(Err(self.error(
							message::INVALID_LONG_DELIMITER.to_owned(), line, column)))
					}
				},
				_ => token(Symbol::LeftBrack, "[")
			},

			// Equal (=) or EqualEqual (==)
			'=' => match {self.eat(); self.peek()} {
				Some('=') => {self.eat(); token(Symbol::EqualEqual, "==")},
				_ => token(Symbol::Equal, "=")
			},

			// Less (<) or LessEqual (<=)
			'<' => match {self.eat(); self.peek()} {
				Some('=') => {self.eat(); token(Symbol::LessEqual, "<=")},
				_ => token(Symbol::Less, "<")
			},

			// Greater (>) or GreaterEqual (>=)
			'>' => match {self.eat(); self.peek()} {
				Some('=') => {self.eat(); token(Symbol::GreaterEqual, ">=")},
				_ => token(Symbol::Greater, ">")
			},

			// Tilde (~) or TildeEqual (~=)
			'~' => match {self.eat(); self.peek()} {
				Some('=') => {self.eat(); token(Symbol::TildeEqual, "~=")},
				_ => token(Symbol::Tilde, "~")
			},

			// Dot (.), DotDot (..), DotDotDot (...) or a Number (.5)
			'.' => match {self.eat(); self.peek()} {
				Some('.') => match {self.eat(); self.peek()} {
					Some('.') => {self.eat(); token(Symbol::DotDotDot, "...")},
					_ => token(Symbol::DotDot, "..")
				},
				Some('0'..='9') => {
					let number = format!(".{}", self.parse_number());
					token(Symbol::Number, &number)
				},
				_ => token(Symbol::Dot, ".")
			},

			'+' => {self.eat(); token(Symbol::Plus, "+")},
			'*' => {self.eat(); token(Symbol::Star, "*")},
			'/' => {self.eat(); token(Symbol::Slash, "/")},
			'%' => {self.eat(); token(Symbol::Percent, "%")},
			'^' => {self.eat(); token(Symbol::Caret, "^")},
			'#' => {self.eat(); token(Symbol::Hash, "#")},
			'(' => {self.eat(); token(Symbol::LeftParen, "(")},
			')' => {self.eat(); token(Symbol::RightParen, ")")},
			'{' => {self.eat(); token(Symbol::LeftBrace, "{")},
			'}' => {self.eat(); token(Symbol::RightBrace, "}")},
			']' => {self.eat(); token(Symbol::RightBrack, "]")},
			';' => {self.eat(); token(Symbol::SemiColon, ";")},
			':' => {self.eat(); token(Symbol::Colon, ":")},
			',' => {self.eat(); token(Symbol::Comma, ",")},

			'"' | '\'' => Some(self.parse_string(line, column)
				.map(|string| Token::new(Symbol::String, string, line, column))),
			'0'..='9' => {
				let number = self.parse_number();
				token(Symbol::Number, &number)
			},
			'a'..='z' | 'A'..='Z' | '_' => {
				let (symbol, identifier) = self.parse_identifier();
				token(symbol, &identifier)
			},

			character => {
				self.eat();
				Some(Err(self.error(message::render(message::UNEXPECTED_SYMBOL,
					&[&character]), line, column)))
			}
		}
	}
}

/// The main interface to the Scanner.
impl<T> Iterator for Scanner<T>
		where T: Iterator<Item = char> {
	type Item = Result<Token>;

	/// Scans a single token and returns it.
	///
	/// After the [`Symbol::Eof`] token was produced, *or* an error occurs, this
	/// will return `None` from thenforth.
	fn next(&mut self) -> Option<Result<Token>> {
		if self.finished {return None}

		let mut token = self.scan();
		match &mut token {
			Some(Ok(token)) => token.end_line = self.line,
			Some(Err(_)) => self.finished = true,
			None => ()
		}
		token
	}
}

/// Adapts any iterator of scanned tokens into a [`Lexer`], holding the current
/// token, the previous one and one token of lookahead.
///
/// Comments and other marker symbols are skipped. If the underlying iterator
/// runs dry without producing [`Symbol::Eof`], one is made up.
pub struct TokenStream<I>
		where I: Iterator<Item = Result<Token>> {
	tokens: I,
	current: Token,
	last: Token,
	lookahead: Option<Result<Token>>
}

impl<'s> TokenStream<Scanner<Chars<'s>>> {
	/// Scans `source` directly.
	pub fn from_source(source: &'s str) -> Result<Self> {
		Self::new(Scanner::new(source))
	}
}

impl<I> TokenStream<I>
		where I: Iterator<Item = Result<Token>> {
	pub fn new(tokens: I) -> Result<Self> {
		let mut stream = Self {
			tokens,
			current: Token::new(Symbol::Eof, "", 1, 1),
			last: Token::new(Symbol::Eof, "", 1, 1),
			lookahead: None
		};

		stream.current = stream.pull()?;
		stream.last = Token::new(Symbol::Eof, "", stream.current.line, 0);
		Ok(stream)
	}

	/// Reads the next meaningful token from the underlying iterator.
	fn pull(&mut self) -> Result<Token> {
		loop {
			match self.tokens.next() {
				Some(Ok(token)) if token.symbol.is_marker() => (),
				Some(token) => break token,
				None => break Ok(Token::new(Symbol::Eof, "",
					self.current.line, self.current.column))
			}
		}
	}
}

impl<I> Lexer for TokenStream<I>
		where I: Iterator<Item = Result<Token>> {
	fn current(&self) -> &Token {
		&self.current
	}

	fn last(&self) -> &Token {
		&self.last
	}

	fn next_symbol(&mut self) -> Symbol {
		if self.current.symbol == Symbol::Eof {return Symbol::Eof}

		let lookahead = match self.lookahead.take() {
			Some(lookahead) => lookahead,
			None => self.pull()
		};
		let symbol = match &lookahead {
			Ok(token) => token.symbol,
			Err(_) => Symbol::Error
		};

		self.lookahead = Some(lookahead);
		symbol
	}

	fn consume(&mut self) -> Result<()> {
		if self.current.symbol == Symbol::Eof {return Ok(())}

		let next = match self.lookahead.take() {
			Some(lookahead) => lookahead?,
			None => self.pull()?
		};
		self.last = replace(&mut self.current, next);
		Ok(())
	}
}

/// A lexical category. See [`Token`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Symbol {
	// Keywords
	And,
	Break,
	Do,
	Else,
	Elseif,
	End,
	False,
	For,
	Function,
	If,
	In,
	Local,
	Nil,
	Not,
	Or,
	Repeat,
	Return,
	Then,
	True,
	Until,
	While,

	// Punctuation
	Plus,
	Minus,
	Star,
	Slash,
	Percent,
	Caret,
	Hash,
	Tilde,
	EqualEqual,
	TildeEqual,
	LessEqual,
	GreaterEqual,
	Less,
	Greater,
	Equal,
	LeftParen,
	RightParen,
	LeftBrace,
	RightBrace,
	LeftBrack,
	RightBrack,
	SemiColon,
	Colon,
	Comma,
	Dot,
	DotDot,
	DotDotDot,

	// Literals
	Number,
	String,
	Identifier,

	// Markers
	Comment,
	Whitespace,
	Error,
	Eol,
	Eof
}

impl Symbol {
	pub fn keyword(word: &str) -> Option<Self> {
		Some(match word {
			"and" => Self::And,
			"break" => Self::Break,
			"do" => Self::Do,
			"else" => Self::Else,
			"elseif" => Self::Elseif,
			"end" => Self::End,
			"false" => Self::False,
			"for" => Self::For,
			"function" => Self::Function,
			"if" => Self::If,
			"in" => Self::In,
			"local" => Self::Local,
			"nil" => Self::Nil,
			"not" => Self::Not,
			"or" => Self::Or,
			"repeat" => Self::Repeat,
			"return" => Self::Return,
			"then" => Self::Then,
			"true" => Self::True,
			"until" => Self::Until,
			"while" => Self::While,
			_ => return None
		})
	}

	/// Whether the parser never wants to see this symbol.
	pub fn is_marker(self) -> bool {
		matches!(self, Self::Comment | Self::Whitespace | Self::Eol)
	}
}

impl Display for Symbol {
	fn fmt(&self, f: &mut Formatter<'_>) -> FMTResult {
		let text = match self {
			Self::And => "and",
			Self::Break => "break",
			Self::Do => "do",
			Self::Else => "else",
			Self::Elseif => "elseif",
			Self::End => "end",
			Self::False => "false",
			Self::For => "for",
			Self::Function => "function",
			Self::If => "if",
			Self::In => "in",
			Self::Local => "local",
			Self::Nil => "nil",
			Self::Not => "not",
			Self::Or => "or",
			Self::Repeat => "repeat",
			Self::Return => "return",
			Self::Then => "then",
			Self::True => "true",
			Self::Until => "until",
			Self::While => "while",

			Self::Plus => "+",
			Self::Minus => "-",
			Self::Star => "*",
			Self::Slash => "/",
			Self::Percent => "%",
			Self::Caret => "^",
			Self::Hash => "#",
			Self::Tilde => "~",
			Self::EqualEqual => "==",
			Self::TildeEqual => "~=",
			Self::LessEqual => "<=",
			Self::GreaterEqual => ">=",
			Self::Less => "<",
			Self::Greater => ">",
			Self::Equal => "=",
			Self::LeftParen => "(",
			Self::RightParen => ")",
			Self::LeftBrace => "{",
			Self::RightBrace => "}",
			Self::LeftBrack => "[",
			Self::RightBrack => "]",
			Self::SemiColon => ";",
			Self::Colon => ":",
			Self::Comma => ",",
			Self::Dot => ".",
			Self::DotDot => "..",
			Self::DotDotDot => "...",

			Self::Number => "<number>",
			Self::String => "<string>",
			Self::Identifier => "<name>",

			Self::Comment => "<comment>",
			Self::Whitespace => "<whitespace>",
			Self::Error => "<error>",
			Self::Eol => "<eol>",
			Self::Eof => "<eof>"
		};

		f.write_str(text)
	}
}

#[cfg(test)]
mod tests {
	use self::super::{Lexer, Scanner, Symbol, Token, TokenStream};
	use itertools::assert_equal;

	fn symbols(source: &str) -> Vec<Symbol> {
		Scanner::new(source).map(|token| token.unwrap().symbol).collect()
	}

	fn lexemes(source: &str) -> Vec<String> {
		Scanner::new(source).map(|token| token.unwrap().lexeme).collect()
	}

	#[test]
	fn punctuation() {
		assert_equal(symbols("a.b..c...d == ~= <= >= < > = ~ #"), vec![
			Symbol::Identifier, Symbol::Dot, Symbol::Identifier, Symbol::DotDot,
			Symbol::Identifier, Symbol::DotDotDot, Symbol::Identifier,
			Symbol::EqualEqual, Symbol::TildeEqual, Symbol::LessEqual,
			Symbol::GreaterEqual, Symbol::Less, Symbol::Greater, Symbol::Equal,
			Symbol::Tilde, Symbol::Hash, Symbol::Eof
		]);
	}

	#[test]
	fn keywords_and_names() {
		assert_equal(symbols("local function elseif whiles"), vec![
			Symbol::Local, Symbol::Function, Symbol::Elseif, Symbol::Identifier,
			Symbol::Eof
		]);
	}

	#[test]
	fn numbers_are_raw() {
		assert_equal(lexemes("3 0xFF 1.5e-3 .5 10e500"), vec![
			"3", "0xFF", "1.5e-3", ".5", "10e500", ""
		].into_iter().map(str::to_owned));
	}

	#[test]
	fn strings_and_escapes() {
		assert_equal(lexemes(r#"'a\tb' "q\"" "\65\066" [[
line]] [==[x]]y]==]"#), vec![
			"a\tb", "q\"", "AB", "line", "x]]y", ""
		].into_iter().map(str::to_owned));
	}

	#[test]
	fn comments_are_tokens() {
		let tokens = Scanner::new("-- one\n--[[ two\n ]] x")
			.collect::<Result<Vec<_>, _>>().unwrap();
		assert_equal(tokens.iter().map(|token| token.symbol), vec![
			Symbol::Comment, Symbol::Comment, Symbol::Identifier, Symbol::Eof
		]);
		assert_eq!(tokens[2].line, 3);
	}

	#[test]
	fn unfinished_string() {
		let error = Scanner::new("x = 'abc\n'").find_map(Result::err).unwrap();
		assert_eq!(error.line, 1);
		assert!(error.message.contains("unfinished string"));
	}

	#[test]
	fn stream_skips_comments_and_looks_ahead() {
		let mut stream = TokenStream::from_source("for -- c\n k, v").unwrap();
		assert_eq!(stream.current_symbol(), Symbol::For);
		assert_eq!(stream.next_symbol(), Symbol::Identifier);
		stream.consume().unwrap();
		assert_eq!(stream.next_symbol(), Symbol::Comma);
		assert_eq!(stream.consume_lexeme().unwrap(), "k");
		assert_eq!(stream.last().line, 2);
		assert!(stream.try_consume(Symbol::Comma).unwrap());
		assert!(!stream.try_consume(Symbol::Comma).unwrap());
		assert_eq!(stream.expect_lexeme(Symbol::Identifier).unwrap(), "v");
		assert_eq!(stream.current_symbol(), Symbol::Eof);
	}

	#[test]
	fn expect_reports_what_was_found() {
		let mut stream = TokenStream::from_source("x").unwrap();
		let error = stream.expect(Symbol::End).unwrap_err();
		assert_eq!(error.message, "'end' expected near 'x'");
	}

	#[test]
	fn made_up_end_of_stream() {
		let tokens = vec![Ok(Token::new(Symbol::Identifier, "x", 4, 2))];
		let mut stream = TokenStream::new(tokens.into_iter()).unwrap();
		stream.consume().unwrap();
		assert_eq!(stream.current_symbol(), Symbol::Eof);
		assert_eq!(stream.current().line, 4);
	}

	#[test]
	fn multiline_tokens_know_their_last_line() {
		let tokens = Scanner::new("x [[a\nb]] 'c\\\nd' y")
			.collect::<Result<Vec<_>, _>>().unwrap();
		let lines = tokens.iter()
			.map(|token| (token.line, token.end_line))
			.collect::<Vec<_>>();
		assert_eq!(lines[..4], [(1, 1), (1, 2), (2, 3), (3, 3)]);
	}
}
