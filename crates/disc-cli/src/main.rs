use std::path::Path;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use disc_cli::builtins::demo_directory;
use disc_core::{DiscError, Scenario};
use disc_runtime::{Interpreter, StderrSink};

#[derive(Debug, Parser)]
#[command(name = "disc")]
#[command(about = "DISC scenario interpreter CLI")]
struct Cli {
    #[command(subcommand)]
    command: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Run a scenario file against the built-in demo directory.
    Run(RunArgs),
    /// Parse a scenario file and print its canonical or JSON form.
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    #[arg(long = "scenario")]
    scenario: String,
    #[arg(long = "show-heap")]
    show_heap: bool,
}

#[derive(Debug, Args)]
struct ParseArgs {
    #[arg(long = "scenario")]
    scenario: String,
    #[arg(long = "json")]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32, DiscError> {
    match cli.command {
        Mode::Run(args) => run_scenario(args),
        Mode::Parse(args) => parse_scenario(args),
    }
}

fn run_scenario(args: RunArgs) -> Result<i32, DiscError> {
    let scenario = Scenario::from_file(Path::new(&args.scenario))?;
    let mut interpreter =
        Interpreter::with_sink(demo_directory(), scenario, Arc::new(StderrSink));
    let summary = interpreter.run()?;

    println!("RESULT:OK");
    if let Some(name) = interpreter.scenario().name() {
        println!("SCENARIO:{name}");
    }
    println!("EXECUTED:{}", summary.executed);
    println!("FAULTED:{}", summary.faulted);
    println!("SKIPPED:{}", summary.skipped);
    println!("DISCARDED:{}", summary.discarded);

    if args.show_heap {
        let heap = interpreter.heap_snapshot();
        let mut entries: Vec<_> = heap.iter().map(|(k, v)| format!("{k}={v}")).collect();
        entries.sort();
        for entry in entries {
            println!("HEAP:{entry}");
        }
    }

    Ok(if summary.faulted == 0 { 0 } else { 1 })
}

fn parse_scenario(args: ParseArgs) -> Result<i32, DiscError> {
    let scenario = Scenario::from_file(Path::new(&args.scenario))?;
    if args.json {
        let rendered = serde_json::to_string_pretty(&scenario)
            .map_err(|error| DiscError::new("CLI_JSON_RENDER", error.to_string()))?;
        println!("{rendered}");
    } else {
        print!("{scenario}");
    }
    Ok(0)
}

fn emit_error(error: DiscError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
    );
    1
}
