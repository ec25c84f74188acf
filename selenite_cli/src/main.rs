mod arguments;
mod repl;

use self::{
	arguments::{HELP, Arguments, Command, ExecutionType},
	repl::repl
};
use log::{LevelFilter, debug};
use selenite::ast::{
	Parser, ParserOptions, SyntaxError,
	lexer::{Scanner, Symbol, TokenStream},
	syntax::Block
};
use std::{convert::TryFrom, io::Error as IOError, process::exit};

pub static VERSION: &str = "\
Selenite 0.1.0
Targeting Lua 5.1";

fn main() {
	let arguments = match Arguments::from_env() {
		Ok(arguments) => arguments,
		Err(error) => {
			eprintln!("usage error: {}\n\n{}", error, HELP);
			exit(64);
		}
	};

	let level = if arguments.verbose {LevelFilter::Debug} else {LevelFilter::Warn};
	let _guard = match ftlog::Builder::new().max_log_level(level).try_init() {
		Ok(guard) => Some(guard),
		Err(error) => {eprintln!("could not start logging: {}", error); None}
	};

	let options = arguments.options;
	match arguments.command {
		Command::ShowHelp => eprintln!("{}", HELP),
		Command::ShowVersion => eprintln!("{}", VERSION),
		Command::Interactive => repl(options),
		Command::Run {source, execution} => {
			let code = handle_io(String::try_from(source));
			match execution {
				ExecutionType::Check => check(&code, options),
				ExecutionType::ShowSource => print!("{}", handle_syntax(parse(&code, options))),
				ExecutionType::ShowSyntaxTree =>
					println!("{:#?}", handle_syntax(parse(&code, options))),
				ExecutionType::ShowTokens => show_tokens(&code)
			}
		}
	}
}

fn handle_io<T>(result: Result<T, IOError>) -> T {
	match result {
		Ok(value) => value,
		Err(error) => {
			eprintln!("io error: {}", error);
			exit(3);
		}
	}
}

fn handle_syntax<T>(result: Result<T, SyntaxError>) -> T {
	match result {
		Ok(value) => value,
		Err(error) => {
			eprintln!("syntax error: {}", error);
			exit(2);
		}
	}
}

/// Parses a whole chunk, skipping an interpreter line at its start.
pub fn parse(code: &str, options: ParserOptions) -> Result<Block, SyntaxError> {
	let lexer = TokenStream::new(Scanner::new(code).skip_first_line())?;
	Parser::new(lexer).with_options(options).parse()
}

/// Parses `code` as a single expression, by parsing it as a return statement.
pub fn parse_expression(code: &str, options: ParserOptions)
		-> Result<Block, SyntaxError> {
	parse(&format!("return {}", code), options)
}

fn check(code: &str, options: ParserOptions) {
	let block = handle_syntax(parse(code, options));
	debug!("source is valid, with {} top level statements", block.statements.len());
}

fn show_tokens(code: &str) {
	for token in Scanner::new(code).skip_first_line() {
		let token = handle_syntax(token);
		if token.symbol == Symbol::Eof {break}
		println!("{}", token);
	}
}
