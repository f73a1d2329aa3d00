use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::parser::Parser;
use rox::scanner::{self, Scanner};
use rox::{Diagnostics, Lox};

/// Exit code for malformed command lines.
const EXIT_USAGE: i32 = 64;
/// Exit code for lexical, syntax and resolution errors.
const EXIT_STATIC_ERROR: i32 = 65;
/// Exit code for runtime errors.
const EXIT_RUNTIME_ERROR: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the tokens as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a program and prints its AST
    Parse {
        filename: PathBuf,

        /// Print the AST as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs input from a file as a Lox program, or starts a prompt without one
    Run { filename: Option<PathBuf> },
}

/// Reads the contents of a file as UTF-8 text
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf).context(format!("File {:?} is not valid UTF-8", filename))
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
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
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Print every diagnostic to stderr.
fn report(diagnostics: &Diagnostics) {
    for error in diagnostics.iter() {
        eprintln!("{}", error);
    }
}

/// Exit with the code matching the worst kind of error seen, if any.
fn exit_on_errors(diagnostics: &Diagnostics) {
    if diagnostics.has_static_errors() {
        debug!("Static errors, exiting with code {}", EXIT_STATIC_ERROR);
        process::exit(EXIT_STATIC_ERROR);
    }

    if diagnostics.has_runtime_errors() {
        debug!("Runtime error, exiting with code {}", EXIT_RUNTIME_ERROR);
        process::exit(EXIT_RUNTIME_ERROR);
    }
}

fn tokenize(filename: PathBuf, json: bool) -> Result<()> {
    let source = read_file(&filename)?;

    if json {
        let mut diagnostics = Diagnostics::new();
        let tokens = scanner::tokenize(&source, &mut diagnostics);

        report(&diagnostics);
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        exit_on_errors(&diagnostics);

        return Ok(());
    }

    let mut tokenized = true;

    for token in Scanner::new(&source) {
        match token {
            Ok(token) => println!("{}", token),

            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    if !tokenized {
        process::exit(EXIT_STATIC_ERROR);
    }

    Ok(())
}

fn parse(filename: PathBuf, json: bool) -> Result<()> {
    let source = read_file(&filename)?;
    let mut diagnostics = Diagnostics::new();

    let tokens = scanner::tokenize(&source, &mut diagnostics);
    let statements = Parser::new(&tokens, &mut diagnostics).parse();

    report(&diagnostics);
    exit_on_errors(&diagnostics);

    if json {
        println!("{}", serde_json::to_string_pretty(&statements)?);
    } else {
        for stmt in &statements {
            println!("{}", AstPrinter::print_stmt(stmt));
        }
    }

    Ok(())
}

fn evaluate(filename: PathBuf) -> Result<()> {
    let source = read_file(&filename)?;
    let mut lox = Lox::stdout();

    match lox.evaluate(&source) {
        Ok(value) => {
            debug!("Evaluated to: {}", value);
            println!("{}", value);
        }

        Err(diagnostics) => {
            report(&diagnostics);
            exit_on_errors(&diagnostics);
        }
    }

    Ok(())
}

fn run_file(filename: PathBuf) -> Result<()> {
    let source = read_file(&filename)?;
    let mut lox = Lox::stdout();

    let diagnostics = lox.run(&source);

    report(&diagnostics);
    exit_on_errors(&diagnostics);

    info!("Program executed successfully");
    Ok(())
}

fn run_prompt() -> Result<()> {
    info!("Starting interactive prompt");

    let mut lox = Lox::stdout();
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        // Errors are reported but never end the session.
        report(&lox.run_line(&line));
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = match Cli::try_parse() {
        Ok(args) => args,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            e.print()?;
            process::exit(EXIT_USAGE);
        }
    };

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => tokenize(filename, json),
        Commands::Parse { filename, json } => parse(filename, json),
        Commands::Evaluate { filename } => evaluate(filename),
        Commands::Run { filename: Some(filename) } => run_file(filename),
        Commands::Run { filename: None } => run_prompt(),
    }
}
