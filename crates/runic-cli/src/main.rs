//! RunicHDL command line.
//!
//! Provides the `runic` binary:
//! - `check`: parse and validate a `.rune` source, printing diagnostics.
//! - `build`: compile one formation to Graph IR JSON.
//! - `run`: simulate a `.rune` source or a Graph IR file for N ticks.
//! - `inspect`: summarize a Graph IR file (nodes, edges, feedback loops).
//!
//! Exit codes: 0 = success, 1 = syntax error or corrupt Graph IR,
//! 2 = validation diagnostics, 3 = I/O error.
//!
//! Library tracing goes to stderr and is controlled by `RUST_LOG`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use runic_compiler::semantics::validate;
use runic_compiler::{compile, parse, CompileError, CompileOptions, CompilerError};
use runic_core::GraphDefinition;
use runic_sim::{GraphConfig, GraphLoader};

const EXIT_SYNTAX: i32 = 1;
const EXIT_DIAGNOSTICS: i32 = 2;
const EXIT_IO: i32 = 3;

/// RunicHDL compiler and simulator.
#[derive(Parser)]
#[command(name = "runic", about = "RunicHDL compiler and simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a source file.
    Check {
        /// Path to the `.rune` source.
        file: PathBuf,

        /// Print diagnostics as JSON.
        #[arg(long)]
        json: bool,

        /// Fail on warnings too.
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Compile a formation to Graph IR JSON.
    Build {
        /// Path to the `.rune` source.
        file: PathBuf,

        /// Formation to compile (default: the first one).
        #[arg(short, long, env = "RUNIC_FORMATION")]
        formation: Option<String>,

        /// Output file (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail on warnings too.
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Simulate a formation and print each tick's log.
    Run {
        /// A `.rune` source, or Graph IR with a `.json` extension.
        file: PathBuf,

        /// Number of ticks to run.
        #[arg(short, long, env = "RUNIC_TICKS", default_value_t = 10)]
        ticks: u64,

        /// Formation to run when compiling a source (default: the first one).
        #[arg(short, long, env = "RUNIC_FORMATION")]
        formation: Option<String>,
    },

    /// Summarize a Graph IR file.
    Inspect {
        /// Path to the Graph IR JSON.
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Check {
            file,
            json,
            deny_warnings,
        } => run_check(&file, json, deny_warnings),
        Commands::Build {
            file,
            formation,
            output,
            deny_warnings,
        } => run_build(&file, formation, output.as_deref(), deny_warnings),
        Commands::Run {
            file,
            ticks,
            formation,
        } => run_simulation(&file, ticks, formation),
        Commands::Inspect { file } => run_inspect(&file),
    };
    process::exit(exit_code);
}

fn read_file(path: &Path) -> Result<String, i32> {
    fs::read_to_string(path).map_err(|e| {
        eprintln!("Error: failed to read '{}': {}", path.display(), e);
        EXIT_IO
    })
}

/// Execute the check subcommand.
fn run_check(path: &Path, json: bool, deny_warnings: bool) -> i32 {
    let source = match read_file(path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let unit = match parse(&source) {
        Ok(unit) => unit,
        Err(e) => {
            if json {
                println!("{}", to_json(&e));
            } else {
                eprintln!("{}", e);
            }
            return EXIT_SYNTAX;
        }
    };

    let diagnostics = validate(&unit);
    if json {
        println!("{}", to_json(&diagnostics));
    } else {
        for diagnostic in &diagnostics {
            println!("{}", diagnostic);
        }
    }

    let failed = diagnostics
        .iter()
        .any(|d| d.is_error() || deny_warnings);
    if failed {
        return EXIT_DIAGNOSTICS;
    }
    if !json {
        println!(
            "ok: {} formation(s), {} warning(s)",
            unit.formations.len(),
            diagnostics.len()
        );
    }
    0
}

/// Execute the build subcommand.
fn run_build(
    path: &Path,
    formation: Option<String>,
    output: Option<&Path>,
    deny_warnings: bool,
) -> i32 {
    let source = match read_file(path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let options = CompileOptions {
        entry_formation: formation,
        deny_warnings,
    };
    let graph = match compile_source(&source, &options) {
        Ok(graph) => graph,
        Err(code) => return code,
    };

    let json = match graph.to_json() {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: failed to serialize Graph IR: {}", e);
            return EXIT_IO;
        }
    };
    match output {
        Some(out) => {
            if let Err(e) = fs::write(out, json + "\n") {
                eprintln!("Error: failed to write '{}': {}", out.display(), e);
                return EXIT_IO;
            }
            eprintln!(
                "wrote {} ({} nodes, {} edges)",
                out.display(),
                graph.nodes.len(),
                graph.edges.len()
            );
        }
        None => println!("{}", json),
    }
    0
}

/// Execute the run subcommand.
fn run_simulation(path: &Path, ticks: u64, formation: Option<String>) -> i32 {
    let text = match read_file(path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let definition = if is_ir(path) {
        match GraphDefinition::from_json(&text) {
            Ok(definition) => definition,
            Err(e) => {
                eprintln!("Error: {}", e);
                return EXIT_SYNTAX;
            }
        }
    } else {
        let options = CompileOptions {
            entry_formation: formation,
            ..CompileOptions::default()
        };
        match compile_source(&text, &options) {
            Ok(graph) => graph,
            Err(code) => return code,
        }
    };

    let loader = GraphLoader::new(GraphConfig::default());
    let mut graph = match loader.load_definition(&definition) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Load error: {}", e);
            return EXIT_SYNTAX;
        }
    };
    debug!(ticks, nodes = graph.len(), "starting simulation");

    for trace in graph.run(ticks) {
        println!("--- Tick {} ---", trace.tick);
        for line in &trace.logs {
            println!("{}", line);
        }
    }

    let outputs: Vec<_> = graph
        .nodes()
        .filter(|n| n.type_name() == runic_core::registry::FORMATION_OUTPUT)
        .collect();
    if !outputs.is_empty() {
        println!("--- Outputs ---");
        for node in outputs {
            let received: Vec<String> = node.history().iter().map(ToString::to_string).collect();
            println!("{}: [{}]", node.id(), received.join(", "));
        }
    }
    0
}

/// Execute the inspect subcommand.
fn run_inspect(path: &Path) -> i32 {
    let text = match read_file(path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let definition = match GraphDefinition::from_json(&text) {
        Ok(definition) => definition,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_SYNTAX;
        }
    };

    println!("nodes: {}", definition.nodes.len());
    for node in &definition.nodes {
        let params: Vec<String> = node
            .params
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect();
        if params.is_empty() {
            println!("  {} {}", node.node_type, node.id);
        } else {
            println!("  {} {} ( {} )", node.node_type, node.id, params.join(", "));
        }
    }

    println!("edges: {}", definition.edges.len());
    for edge in &definition.edges {
        println!("  {} -> {}", edge.from, edge.to);
    }

    let loops = definition.feedback_loops();
    println!("feedback loops: {}", loops.len());
    for group in &loops {
        println!("  {}", group.join(" -> "));
    }
    0
}

/// Compiles `source`, reporting failures on stderr and mapping them to an
/// exit code.
fn compile_source(source: &str, options: &CompileOptions) -> Result<GraphDefinition, i32> {
    match compile(source, options) {
        Ok(compiled) => {
            for warning in &compiled.warnings {
                eprintln!("{}", warning);
            }
            Ok(compiled.graph)
        }
        Err(CompileError::Syntax(e)) => {
            eprintln!("{}", e);
            Err(EXIT_SYNTAX)
        }
        Err(CompileError::Validation(diagnostics)) => {
            report(&diagnostics);
            Err(EXIT_DIAGNOSTICS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(EXIT_DIAGNOSTICS)
        }
    }
}

fn report(diagnostics: &[CompilerError]) {
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    eprintln!(
        "Validation failed with {} error(s), {} warning(s):",
        errors,
        diagnostics.len() - errors
    );
    for diagnostic in diagnostics {
        eprintln!("  {}", diagnostic);
    }
}

fn is_ir(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize: {}\"}}", e))
}
