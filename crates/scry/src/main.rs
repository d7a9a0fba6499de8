use clap::{Parser, Subcommand};
use scry_e::backend::EmbeddedBackend;
use scry_engine::backend::Backend;
use scry_engine::cli::{self, FileOptions, OutputHandlers, ReplOptions};
use scry_engine::config::{ConfigLoader, GetByAiOptions, ScryConfig};
use scry_engine::executor::ScriptExecutor;
use scry_engine::oracle::OllamaClient;
use scry_engine::resolution::ResolutionEngine;
use scry_h::backend::HeadlessBackend;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scry", version, about = "Find page elements by description")]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    /// Configuration file (defaults to ./scry.yaml, then ~/.scry/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Script to execute (non-interactive mode)
    #[arg(long, global = true)]
    file: Option<String>,

    /// Always ask the model, never reuse recorded selectors
    #[arg(long, global = true)]
    no_history: bool,

    /// Model name to request from the oracle
    #[arg(long, global = true)]
    model: Option<String>,

    /// Report every resolution step
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Use headless browser (Chromium) via CDP
    Headless {
        /// Launch browser in visible mode (not headless)
        #[arg(long)]
        visible: bool,
    },
    /// Use an already running WebDriver server
    Embedded {
        /// WebDriver URL (default http://localhost:4444)
        #[arg(long)]
        driver_url: Option<String>,
    },
}

impl Args {
    /// Config defaults overridden by whatever was given on the command line.
    fn resolve_options(&self, config: &ScryConfig) -> GetByAiOptions {
        let mut options = config.defaults.clone();
        if self.no_history {
            options = options.without_history();
        }
        if let Some(model) = &self.model {
            options = options.with_model(model.clone());
        }
        if self.verbose {
            options = options.verbose();
        }
        options
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // stdout carries command results; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => ConfigLoader::load_from(path).await?,
        None => ConfigLoader::load_default().await?,
    };
    let options = args.resolve_options(&config);
    let oracle = OllamaClient::from_config(&config.oracle);
    let engine = ResolutionEngine::new(config, Box::new(oracle));
    let mut executor = ScriptExecutor::with_options(engine, options);

    let mut backend: Box<dyn Backend> = match args.mode {
        Mode::Headless { visible } => Box::new(HeadlessBackend::new_with_visibility(visible)),
        Mode::Embedded { driver_url } => match driver_url {
            Some(url) => Box::new(EmbeddedBackend::with_url(url)),
            None => Box::new(EmbeddedBackend::new()),
        },
    };

    if let Err(e) = backend.launch().await {
        eprintln!("Failed to launch backend: {}", e);
        return Err(e.into());
    }

    let output = OutputHandlers {
        out: |msg| println!("{}", msg),
        err: |msg| eprintln!("{}", msg),
    };

    let result = if let Some(file_path) = &args.file {
        cli::run_file(
            &mut *backend,
            &mut executor,
            output,
            file_path,
            FileOptions {
                stop_on_error: true,
            },
        )
        .await
        .inspect_err(|e| eprintln!("Error executing file {}: {}", file_path, e))
    } else {
        let repl_options = ReplOptions {
            banner_lines: &[
                "Backend launched. Enter commands, e.g.:",
                "  visit http://localhost:8080/app/index.html",
                "  click \"Login button\"",
                "Type 'exit' or 'quit' to close.",
            ],
            prompt: "> ",
            exit_commands: &["exit", "quit"],
        };
        cli::run_repl(&mut *backend, &mut executor, output, repl_options)
            .await
            .inspect_err(|e| eprintln!("Error during session: {}", e))
    };

    backend.close().await?;
    result
}
