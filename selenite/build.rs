//! Generates the round trip integration tests, one per Lua file.

#[path = "tests/round_trip/build.rs"]
mod round_trip;

use std::{env::var, path::Path};

fn main() {
	let output = var("OUT_DIR").unwrap();
	round_trip::build(Path::new("tests/round_trip"), output.as_ref());
}
