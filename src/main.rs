use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use clap::Parser;

use cmlex::{CharStream, Tokenizer};

/// Tokenize CMake files, printing one token per line.
///
/// The output format is the same one the `tests/data/*.toks` fixtures store,
/// so redirecting stdout next to a fixture regenerates it:
/// `cmlex tests/data/simple.txt > tests/data/simple.toks`
#[derive(Parser)]
#[command(name = "cmlex", version, about = "A command-line CMake tokenizer")]
struct Args {
    /// Files to tokenize; reads stdin when empty or for "-".
    files: Vec<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let files = if args.files.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        args.files
    };

    let mut exit_code = 0;
    for file in files {
        if let Err(err) = dump_tokens(&file) {
            eprintln!("cmlex: {}: {}", file.display(), err);
            exit_code = 1;
        }
    }
    std::process::exit(exit_code);
}

fn dump_tokens(file: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let input: Box<dyn Read> = if file.as_os_str() == "-" {
        Box::new(io::stdin())
    } else {
        Box::new(BufReader::new(std::fs::File::open(file)?))
    };

    for result in Tokenizer::new(CharStream::new(input)) {
        println!("{}", result?);
    }
    Ok(())
}
