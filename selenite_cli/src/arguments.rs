pub use pico_args::Error;
use pico_args::Arguments as Parser;
use selenite::ast::ParserOptions;
use std::{
	convert::TryFrom,
	fs::File,
	io::{Read, Error as IOError},
	path::PathBuf
};

pub static HELP: &str = "\
Selenite, a Lua 5.1 front end

The Lua programming language is owned and copyrighted by PUC-Rio.

SYNOPSIS:
	selenite [OPTIONS] [SOURCE]

DESCRIPTION:
	selenite reads Lua source code and parses it, reporting the first syntax error it finds. It does not run the code.

	SOURCE is either the code itself, if -e is passed, or otherwise the name of a file to load. Without further options, the source is only checked. If SOURCE is not provided, or -i is passed, an interactive prompt starts that prints back everything typed into it in canonical form.

	Passing -v will print verbose information to standard error.

OPTIONS:
	-h, --help          Displays this and quits
	-V, --version       Displays version information
	-v, --verbose       Runs with verbose output
	-e, --evaluate      Treats SOURCE as source code, rather than a file
	-c, --check         Checks SOURCE for syntax errors, the default
	-s, --ast           Prints SOURCE back in canonical form
	-d, --debug-tree    Prints the syntax tree of SOURCE
	-t, --tokens        Prints the tokens of SOURCE
	-i, --interactive   Starts an interactive prompt
	--max-depth DEPTH   Limits how deeply SOURCE may nest";

#[derive(Debug)]
pub struct Arguments {
	pub verbose: bool,
	pub options: ParserOptions,
	pub command: Command
}

#[derive(Debug)]
pub enum Command {
	ShowHelp,
	ShowVersion,
	Interactive,
	Run {
		source: Source,
		execution: ExecutionType
	}
}

#[derive(Debug)]
pub enum Source {
	File(PathBuf),
	Code(String)
}

#[derive(Debug)]
pub enum ExecutionType {
	Check,
	ShowSource,
	ShowSyntaxTree,
	ShowTokens
}

impl Arguments {
	pub fn from_env() -> Result<Self, Error> {
		let mut parser = Parser::from_env();

		let verbose = parser.contains(["-v", "--verbose"]);
		let options = match parser.opt_value_from_str("--max-depth")? {
			Some(max_depth) => ParserOptions {max_depth},
			None => ParserOptions::default()
		};
		let arguments = |command| Ok(Self {verbose, options, command});

		if parser.contains(["-h", "--help"]) {return arguments(Command::ShowHelp)}
		if parser.contains(["-V", "--version"]) {return arguments(Command::ShowVersion)}

		let interactive = parser.contains(["-i", "--interactive"]);
		let check = parser.contains(["-c", "--check"]);
		let source = parser.contains(["-s", "--ast"]);
		let tree = parser.contains(["-d", "--debug-tree"]);
		let tokens = parser.contains(["-t", "--tokens"]);

		let code = if parser.contains(["-e", "--evaluate"])
				{Some(Source::Code(parser.free_from_str()?))}
			else {parser.opt_free_from_str()?.map(Source::File)};

		let remaining = parser.finish();
		if !remaining.is_empty() {
			return Err(Error::ArgumentParsingFailed {
				cause: format!("unexpected arguments {:?}", remaining)
			})
		}

		if check && (source || tree || tokens) {
			return Err(Error::ArgumentParsingFailed {
				cause: "--check can't be combined with other output options".to_owned()
			})
		}

		let execution = match (tokens, tree, source) {
			(true, _, _) => ExecutionType::ShowTokens,
			(_, true, _) => ExecutionType::ShowSyntaxTree,
			(_, _, true) => ExecutionType::ShowSource,
			_ => ExecutionType::Check
		};

		arguments(match code {
			Some(source) if !interactive => Command::Run {source, execution},
			_ => Command::Interactive
		})
	}
}

impl TryFrom<Source> for String {
	type Error = IOError;

	fn try_from(value: Source) -> Result<Self, IOError> {
		Ok(match value {
			Source::Code(code) => code,
			Source::File(file) => {
				let mut file = File::open(&file)?;
				let mut code = String::new();
				file.read_to_string(&mut code)?;
				code
			}
		})
	}
}
