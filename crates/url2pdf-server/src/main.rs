// Copyright 2026 url2pdf Contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use url2pdf_server::cli;
use url2pdf_server::config::{self, RenderArgs, ServeArgs, ServerConfig};

#[derive(Parser)]
#[command(
    name = "url2pdf",
    about = "url2pdf: render web pages to PDF over HTTP",
    version,
    after_help = "Run 'url2pdf <command> --help' for details on each command.\nRun 'url2pdf' with no command to start the server."
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve(ServeArgs),
    /// Render one URL to a PDF file and exit
    Render {
        /// URL to render
        url: String,
        /// Output file (defaults to <host>.pdf)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Chrome/Chromium executable
        #[arg(long)]
        chrome_path: Option<PathBuf>,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Check browser and static directory readiness
    Doctor(ServeArgs),
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: Shell,
    },
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    let result = match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => match ServerConfig::resolve(&args) {
            Ok(config) => url2pdf_server::serve(config).await,
            Err(e) => Err(e.into()),
        },
        Commands::Render {
            url,
            output,
            chrome_path,
            render,
        } => match config::resolve_render(&render, &|key: &str| std::env::var(key).ok()) {
            Ok(options) => cli::render_cmd::run(&url, output, chrome_path, options).await,
            Err(e) => Err(e.into()),
        },
        Commands::Doctor(args) => match ServerConfig::resolve(&args) {
            Ok(config) => cli::doctor::run(&config).await,
            Err(e) => Err(e.into()),
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "url2pdf", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
