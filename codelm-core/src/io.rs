use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::io;

use crate::model::Sequence;

/// Reads a corpus file and returns its token sequences.
///
/// - Reads the entire file into memory
/// - One sequence per line, tokens separated by whitespace
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> io::Result<Vec<Sequence>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(parse_corpus(&contents))
}

/// Splits raw corpus text into token sequences.
///
/// Empty lines yield empty sequences; they contribute no n-grams.
pub fn parse_corpus(contents: &str) -> Vec<Sequence> {
	contents
		.lines()
		.map(|line| line.split_whitespace().map(str::to_owned).collect())
		.collect()
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/train.txt` + `"bin"` → `data/train.bin`
pub fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_one_sequence_per_line() {
		let corpus = parse_corpus("public void run ( )\nint x = 0 ;\n");
		assert_eq!(corpus.len(), 2);
		assert_eq!(corpus[0], vec!["public", "void", "run", "(", ")"]);
		assert_eq!(corpus[1], vec!["int", "x", "=", "0", ";"]);
	}

	#[test]
	fn empty_lines_become_empty_sequences() {
		let corpus = parse_corpus("a b\n\nc\n");
		assert_eq!(corpus.len(), 3);
		assert!(corpus[1].is_empty());
	}

	#[test]
	fn cache_path_swaps_extension() {
		let path = build_output_path("data/train.txt", "bin").unwrap();
		assert_eq!(path, PathBuf::from("data/train.bin"));
	}
}
