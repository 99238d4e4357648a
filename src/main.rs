use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, trace};
use tracing_subscriber::EnvFilter;

use solver_codegen::{FailurePolicy, GeneratorConfig};

/// Generate C++ solver functions from an equation file
#[derive(Parser)]
#[command(name = "solver-codegen", version)]
#[command(about = "Generate C++ constraint-solver functions from equation records", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to configuration file (default: ./codegen.toml when present)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Equation file to read
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Where to write the declarations artifact
    #[arg(long)]
    declarations: Option<PathBuf>,

    /// Where to write the definitions artifact
    #[arg(long)]
    definitions: Option<PathBuf>,

    /// Template file replacing the built-in declarations template
    #[arg(long)]
    declarations_template: Option<PathBuf>,

    /// Template file replacing the built-in definitions template
    #[arg(long)]
    definitions_template: Option<PathBuf>,

    /// What to do with records that cannot be split or compiled
    #[arg(long, value_enum)]
    policy: Option<FailurePolicy>,

    /// Resolve and render, but write nothing
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Flags win over the configuration file.
    fn apply(&self, config: &mut GeneratorConfig) {
        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(path) = &self.declarations {
            config.output.declarations = path.clone();
        }
        if let Some(path) = &self.definitions {
            config.output.definitions = path.clone();
        }
        if let Some(path) = &self.declarations_template {
            config.templates.declarations = Some(path.clone());
        }
        if let Some(path) = &self.definitions_template {
            config.templates.definitions = Some(path.clone());
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2)
        .with_thread_ids(cli.verbose >= 3)
        .with_line_number(cli.verbose >= 3)
        .init();

    debug!("solver-codegen started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(&cli) {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = GeneratorConfig::discover(cli.config.as_deref())
        .context("Failed to load configuration")?;
    cli.apply(&mut config);
    debug!("Effective configuration: {:?}", config);

    let outcome = solver_codegen::run(&config, cli.dry_run)
        .with_context(|| format!("Failed to generate from {}", config.input.display()))?;

    for diagnostic in &outcome.report.diagnostics {
        eprintln!("Warning: {diagnostic}");
    }

    if cli.dry_run {
        for equation in &outcome.report.equations {
            println!(
                "{}({}) = {}",
                equation.name,
                equation.parameters.join(", "),
                equation.expression
            );
        }
    } else {
        for path in &outcome.written {
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}
