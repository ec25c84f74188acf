// This file builds integration tests for each file in the lua directory. Each
// test parses a file, prints the tree back as source, and checks that the
// printed source parses to the same tree and prints the same way again. Files
// in the lua folder only need to parse; they are never run.

use std::{
	fs::{File, create_dir_all, read_dir},
	io::{Error, Write},
	path::Path
};

static HEADER: &str = "\
use selenite::ast::parse;
use diff::{Result as Diff, lines};

fn show_difference(left: &str, right: &str) {
	lines(left, right).into_iter()
		.for_each(|result| match result {
			Diff::Left(left) => eprintln!(\"\\x1B[31m-{}\\x1B[0m\", left),
			Diff::Right(right) => eprintln!(\"\\x1B[32m+{}\\x1B[0m\", right),
			Diff::Both(both, _) => eprintln!(\" {}\", both)
		});
}
";

fn manufacture_test(function: &str, path: &Path) -> String {
	let name = path.file_name().unwrap().to_string_lossy();

	format!(
"
#[test]
fn {function}() -> Result<(), ()> {{
	static CODE: &str = include_str!({path:?});

	let parsed = parse(CODE)
		.map_err(|error| eprintln!(\"{{}}:{{}}\", {name:?}, error))?;
	let printed = parsed.to_string();
	let reparsed = parse(&printed)
		.map_err(|error| eprintln!(\"printed {{}}:{{}}\\n{{}}\", {name:?}, error, printed))?;

	if reparsed != parsed {{
		eprintln!(\"The printed source of {{:?}} parses to a different tree.\", {name:?});
		show_difference(CODE, &printed);
		return Err(())
	}}

	let reprinted = reparsed.to_string();
	if reprinted != printed {{
		eprintln!(\"Printing {{:?}} a second time gives different source.\", {name:?});
		show_difference(&printed, &reprinted);
		return Err(())
	}}

	Ok(())
}}
",
		function = function, path = path, name = name
	)
}

fn snake_case(file_stem: &str) -> String {
	file_stem.chars()
		.map(|char| if char.is_alphanumeric() {char.to_ascii_lowercase()} else {'_'})
		.collect()
}

pub fn build(working: &Path, output: &Path) {
	println!("cargo:rerun-if-changed={}", working.join("lua").to_string_lossy());

	let working = working.canonicalize().unwrap();
	let mut files = read_dir(working.join("lua")).unwrap()
		.map(|file| file.map(|file| file.path()))
		.collect::<Result<Vec<_>, Error>>()
		.unwrap();
	files.sort();

	let tests = files.iter()
		.filter(|path| path.is_file())
		.filter(|path| path.extension().map_or(false, |extension| extension == "lua"))
		.map(|path| {
			let function = snake_case(&path.file_stem().unwrap().to_string_lossy());
			manufacture_test(&function, path)
		})
		.collect::<String>();

	let file = format!("{}{}", HEADER, tests);
	create_dir_all(output.join("codegen")).unwrap();
	File::create(output.join("codegen/selenite-tests-round_trip-main")).unwrap()
		.write_all(file.as_bytes()).unwrap();
}
