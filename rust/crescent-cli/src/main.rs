//! Crescent CLI: run Mornington Crescent programs.

use clap::{Parser as ClapParser, Subcommand};
use crescent_cli::colors::{bold, gray, green, red, status_label, yellow};
use crescent_cli::config::CrescentConfig;
use crescent_cli::error::LoadError;
use crescent_cli::languages::{self, MORNINGTON_CRESCENT};
use crescent_cli::runner::{self, TraceSink};
use crescent_cli::{logging, network};
use crescent_core::{Program, Topology, Value};
use crescent_vm::{OperationTable, TraceFormat};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(ClapParser)]
#[command(
    name = "crescent",
    version,
    about = "An interpreter for Mornington Crescent"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script
    Run {
        /// Path to the script
        #[arg()]
        file: PathBuf,

        /// Initial accumulator (default: one line read from stdin)
        #[arg(long)]
        input: Option<String>,

        /// Print every journey to stderr
        #[arg(short, long)]
        verbose: bool,

        /// Trace format when verbose (text or json)
        #[arg(long)]
        trace: Option<TraceFormat>,

        /// Network file to use instead of the London Underground
        #[arg(long)]
        network: Option<PathBuf>,

        /// Interpreter parameter as NAME=VALUE (repeatable)
        #[arg(long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,
    },
    /// Report journeys naming lines or stations that don't exist
    Check {
        /// Path to the script
        #[arg()]
        file: PathBuf,

        /// Network file to use instead of the London Underground
        #[arg(long)]
        network: Option<PathBuf>,
    },
    /// List supported languages and their parameters
    Languages {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a crescent.toml config file in the current directory
    Init,
}

fn main() {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            input,
            verbose,
            trace,
            network,
            params,
        } => cmd_run(&file, input, verbose, trace, network, &params),
        Commands::Check { file, network } => cmd_check(&file, network),
        Commands::Languages { json } => cmd_languages(json),
        Commands::Init => cmd_init(),
    }
}

fn fail(e: impl Display) -> ! {
    eprintln!("{} {}", red("error:"), e);
    std::process::exit(1);
}

fn read_source(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| fail(LoadError::read(path, e)))
}

fn load_config() -> CrescentConfig {
    CrescentConfig::load().unwrap_or_else(|e| fail(e))
}

/// The `--network` flag wins over the config file; otherwise London.
fn load_network(flag: Option<PathBuf>, config: &CrescentConfig) -> Topology {
    let result = match flag.or_else(|| config.run.network.clone()) {
        Some(path) => network::load(&path),
        None => network::london(),
    };
    result.unwrap_or_else(|e| fail(e))
}

fn cmd_run(
    file: &Path,
    input: Option<String>,
    verbose: bool,
    trace: Option<TraceFormat>,
    network_flag: Option<PathBuf>,
    params: &[String],
) {
    let config = load_config();
    let params = MORNINGTON_CRESCENT
        .parse_params(params)
        .unwrap_or_else(|e| fail(e));
    let topology = load_network(network_flag, &config);
    let program = Program::load(&read_source(file));

    let input = match input {
        Some(text) => Value::Text(text),
        None => runner::read_input_line(std::io::stdin().lock())
            .unwrap_or_else(|e| fail(format!("cannot read input: {}", e))),
    };

    let operations = OperationTable::london_with_home(topology.home().clone());

    let trace = (verbose || config.run.verbose || params.flag("verbose")).then(|| TraceSink {
        format: trace.unwrap_or(config.run.trace),
        out: Box::new(std::io::stderr()),
    });

    let report = runner::run_program(
        program,
        Arc::new(topology),
        Arc::new(operations),
        input,
        Some(Box::new(std::io::stdout())),
        trace,
    );
    if let Err(e) = report.result {
        fail(e);
    }
}

fn cmd_check(file: &Path, network_flag: Option<PathBuf>) {
    let config = load_config();
    let topology = load_network(network_flag, &config);
    let program = Program::load(&read_source(file));

    let issues = runner::check(&program, &topology);
    if issues.is_empty() {
        println!(
            "{} {} ({} journeys)",
            status_label("Checked"),
            file.display(),
            program.len()
        );
        return;
    }
    for issue in &issues {
        eprintln!(
            "{} {}\n  {} {}",
            red("error:"),
            issue.error,
            gray(&format!("line {}:", issue.line)),
            issue.source
        );
    }
    eprintln!(
        "{} {} problem(s) in {}",
        red("error:"),
        issues.len(),
        bold(&file.display().to_string())
    );
    std::process::exit(1);
}

fn cmd_languages(json: bool) {
    if json {
        match serde_json::to_string_pretty(languages::languages()) {
            Ok(text) => println!("{}", text),
            Err(e) => fail(e),
        }
        return;
    }
    for lang in languages::languages() {
        println!("{} {}", bold(lang.name), gray(&format!("({}, .{})", lang.id, lang.extension)));
        for param in lang.params {
            println!(
                "  --param {}=<{}>  {} {}",
                green(param.name),
                param.kind,
                param.help,
                yellow(&format!("[default: {}]", param.default))
            );
        }
    }
}

fn cmd_init() {
    let dir = std::env::current_dir().unwrap_or_else(|e| fail(e));
    match CrescentConfig::init(&dir) {
        Ok(path) => println!("{} {}", status_label("Created"), path.display()),
        Err(e) => fail(e),
    }
}
