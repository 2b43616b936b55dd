mod logging;

use std::io::{self, Read};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use structtag::{parse, ParseError};

/// Parse struct tag strings from stdin, one per line.
#[derive(Parser, Debug)]
#[command(name = "structtag", version, about)]
struct Cli {
    /// How to print each parsed tag.
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Log parser activity to stderr (repeat for more detail).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// A JSON object per line.
    Json,
    /// The normalized `key:"value"` form.
    Tag,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(err) = logging::init(level) {
        eprintln!("failed to install logger: {}", err);
    }

    let mut input = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut input) {
        eprintln!("failed to read stdin: {}", err);
        return ExitCode::FAILURE;
    }

    let mut failed = false;
    for (index, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse(line) {
            Ok(tag) => match cli.format {
                Format::Json => match serde_json::to_string(&tag) {
                    Ok(json) => println!("{}", json),
                    Err(err) => {
                        log::error!("line {}: cannot encode as JSON: {}", index + 1, err);
                        failed = true;
                    }
                },
                Format::Tag => println!("{}", tag),
            },
            Err(err) => {
                report(index, line, &err);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn report(index: usize, line: &str, err: &ParseError) {
    eprintln!("ERROR AT LINE {}:", index + 1);
    eprintln!("{}", line);

    // Underline from the offending pair to the end of the line.
    let start_col = line[..err.offset].chars().count();
    let end_col = line.chars().count().max(start_col + 1);
    let mut underline = " ".repeat(start_col);
    underline.push('^');
    for _ in (start_col + 1)..end_col {
        underline.push('_');
    }

    eprintln!("{}", underline);
    eprintln!("{} ({})", err.kind, err.kind.code());
    if let Some(cause) = std::error::Error::source(err) {
        eprintln!("caused by: {}", cause);
    }
    eprintln!();
}
