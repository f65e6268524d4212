use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use treelox::error::{Diagnostics, LoxError, Reporter};
use treelox::interpreter::Interpreter;
use treelox::scanner::Scanner;
use treelox::token::Token;

/// sysexits(3) codes.
const EX_USAGE: i32 = 64;
const EX_DATAERR: i32 = 65;
const EX_NOINPUT: i32 = 66;
const EX_SOFTWARE: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Tree-walking Lox interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Enable logging to treelox.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the tokens as a JSON array instead
        #[arg(long)]
        json: bool,
    },

    /// Runs input from a file as a Lox program
    Run { filename: PathBuf },

    /// Starts an interactive session (the default)
    Repl,
}

/// Maps `filename` into memory; the mapping is only read, never written.
fn read_file(filename: &Path) -> Result<Mmap> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;

    // SAFETY: the file is opened read-only and not modified while mapped.
    let map = unsafe { Mmap::map(&file) }.context(format!("Failed to map file {:?}", filename))?;

    info!("Read {} bytes from {:?}", map.len(), filename);

    Ok(map)
}

/// Reads and UTF-8 validates a source file, exiting with `EX_NOINPUT` /
/// `EX_DATAERR` when that is impossible.
fn load_source(filename: &Path) -> Mmap {
    match read_file(filename) {
        Ok(map) => {
            if let Err(e) = std::str::from_utf8(&map) {
                eprintln!("{}", LoxError::from(e));
                std::process::exit(EX_DATAERR);
            }
            map
        }
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(EX_NOINPUT);
        }
    }
}

fn init_logger() -> Result<()> {
    let log_file = File::create("treelox.log").context("Failed to create treelox.log")?;

    // `[module:line] - message`, Debug by default, RUST_LOG overrides.
    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("treelox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to treelox.log");
    Ok(())
}

fn tokenize(filename: &Path, json: bool) -> Result<()> {
    let map = load_source(filename);
    let source = std::str::from_utf8(&map)?;

    let mut diagnostics = Diagnostics::echoing();
    let tokens: Vec<Token> = Scanner::new(source).scan_tokens(&mut diagnostics);

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    if diagnostics.had_error() {
        debug!("Tokenization failed, exiting with code {}", EX_DATAERR);
        std::process::exit(EX_DATAERR);
    }

    info!("Tokenization completed successfully");
    Ok(())
}

fn run_file(filename: &Path) -> Result<()> {
    let map = load_source(filename);
    let source = std::str::from_utf8(&map)?;

    let mut diagnostics = Diagnostics::echoing();
    let mut interpreter = Interpreter::new();

    treelox::run(source, &mut interpreter, &mut diagnostics);

    if diagnostics.had_error() {
        std::process::exit(EX_DATAERR);
    }

    if diagnostics.had_runtime_error() {
        std::process::exit(EX_SOFTWARE);
    }

    info!("Program executed successfully");
    Ok(())
}

fn repl() -> Result<()> {
    info!("Starting REPL");

    let mut diagnostics = Diagnostics::echoing();
    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            break;
        }

        treelox::run_line(&line, &mut interpreter, &mut diagnostics);
        diagnostics.reset();
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(EX_USAGE);
        }
        Err(e) => e.exit(),
    };

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands.unwrap_or(Commands::Repl) {
        Commands::Tokenize { filename, json } => tokenize(&filename, json),
        Commands::Run { filename } => run_file(&filename),
        Commands::Repl => repl(),
    }
}
