//! Command line and logging setup

use crate::generator::Inputs;
use crate::instrument::ExecutionLimits;
use crate::registry::ProblemMeta;
use clap::{Args, Parser, Subcommand};
use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "algoscope")]
#[command(about = "Step through algorithm traces in the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every problem in the catalog
    List {
        /// Only show problems whose id or title matches
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Print the built-in trace for a problem
    Trace {
        #[command(flatten)]
        problem: ProblemArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run a solution file through instrumented execution and print its trace
    Run {
        #[command(flatten)]
        problem: ProblemArgs,

        /// Script defining the problem's entry-point function
        #[arg(short, long, value_name = "FILE")]
        code: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Open the interactive viewer
    View {
        #[command(flatten)]
        problem: ProblemArgs,

        /// Script to run with `r` inside the viewer
        #[arg(short, long, value_name = "FILE")]
        code: Option<PathBuf>,
    },
}

/// Problem address plus input overrides
#[derive(Args, Debug, Clone)]
pub struct ProblemArgs {
    /// Topic id, e.g. `arrays`
    pub topic: String,

    /// Pattern id, e.g. `binary-search`
    pub pattern: String,

    /// Problem id, e.g. `binary-search-visualizer`
    pub problem: String,

    /// JSON object overriding default inputs, e.g. '{"target": 7}'
    #[arg(short, long, value_name = "JSON")]
    pub inputs: Option<String>,
}

impl ProblemArgs {
    /// Default inputs of `meta` overlaid with `--inputs`
    pub fn resolve_inputs(&self, meta: &ProblemMeta) -> Result<Inputs, serde_json::Error> {
        let defaults = meta.default_inputs();
        match &self.inputs {
            Some(json) => Ok(defaults.merged(&Inputs::from_json(json)?)),
            None => Ok(defaults),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Print the trace as JSON
    #[arg(long)]
    pub json: bool,

    /// Step budget: printed steps for `trace`, recorded steps for `run`
    #[arg(long, value_name = "N")]
    pub max_steps: Option<usize>,
}

impl OutputArgs {
    pub fn execution_limits(&self) -> ExecutionLimits {
        let mut limits = ExecutionLimits::default();
        if let Some(max_steps) = self.max_steps {
            limits.max_steps = max_steps;
        }
        limits
    }
}

/// Install the global subscriber. `RUST_LOG` wins; otherwise only warnings.
pub fn init_tracing(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| e as Box<dyn Error>)?;
        }
        None => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| e as Box<dyn Error>)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::get_problem;

    #[test]
    fn test_parse_trace_command() {
        let cli = Cli::parse_from([
            "algoscope",
            "trace",
            "arrays",
            "binary-search",
            "binary-search-visualizer",
            "--inputs",
            r#"{"target": 7}"#,
            "--json",
        ]);
        match cli.command {
            Commands::Trace { problem, output } => {
                assert_eq!(problem.pattern, "binary-search");
                assert!(output.json);
                let meta = get_problem("arrays", "binary-search", "binary-search-visualizer").unwrap();
                let inputs = problem.resolve_inputs(meta).unwrap();
                assert_eq!(inputs.int("target").unwrap(), 7);
                assert!(inputs.int_array("nums").is_ok());
            }
            other => panic!("Expected trace command, got {:?}", other),
        }
    }

    #[test]
    fn test_init_tracing_to_file() {
        let path = std::env::temp_dir().join(format!("algoscope-{}.log", std::process::id()));
        init_tracing(Some(&path)).unwrap();
        tracing::warn!("written to the log file");
        assert!(path.exists());
        // Only one global subscriber may be installed
        assert!(init_tracing(None).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_run_requires_code() {
        let result = Cli::try_parse_from(["algoscope", "run", "hashing", "hash-map", "two-sum"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_log_file_and_limits() {
        let cli = Cli::parse_from([
            "algoscope",
            "run",
            "hashing",
            "hash-map",
            "two-sum",
            "--code",
            "sol.js",
            "--max-steps",
            "20",
            "--log-file",
            "out.log",
        ]);
        assert_eq!(cli.log_file.as_deref(), Some(Path::new("out.log")));
        match cli.command {
            Commands::Run { output, .. } => assert_eq!(output.execution_limits().max_steps, 20),
            other => panic!("Expected run command, got {:?}", other),
        }
    }
}
