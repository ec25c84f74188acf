use self::super::{handle_io, parse, parse_expression};
use log::debug;
use selenite::ast::ParserOptions;
use std::io::{BufRead, StdoutLock, Write, stdin, stdout};

fn prompt(output: &mut StdoutLock, continuing: bool) {
	handle_io(write!(output, "{}", if continuing {">> "} else {"> "}));
	handle_io(output.flush());
}

/// Reads source from standard input until it parses, or fails to parse for a
/// reason other than ending early, then prints it back in canonical form.
pub fn repl(options: ParserOptions) {
	let (input, output) = (stdin(), stdout());
	let mut lines = input.lock().lines();
	let mut output = output.lock();
	let mut pending = String::new();

	loop {
		prompt(&mut output, !pending.is_empty());

		let line = match lines.next() {
			Some(line) => handle_io(line),
			None => {handle_io(writeln!(output)); return}
		};
		pending.push_str(&line);
		pending.push('\n');

		match parse_expression(&pending, options).or_else(|_| parse(&pending, options)) {
			Err(error) if error.is_incomplete() => {
				debug!("waiting for more input");
				continue
			},
			Ok(block) => handle_io(write!(output, "{}", block)),
			Err(error) => eprintln!("syntax error: {}", error)
		}

		pending.clear();
	}
}
