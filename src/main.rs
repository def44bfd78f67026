//! Web Researcher - supervisor/worker market research agent
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use web_researcher::research::report_from_transcript;
use web_researcher::{Config, WebResearcher};

/// Web Researcher - supervisor/worker market research agent
#[derive(Parser, Debug)]
#[command(name = "web-researcher")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Research question
    question: Option<String>,

    /// Research question (alternative to the positional argument)
    #[arg(long, short = 'p', conflicts_with = "question")]
    prompt: Option<String>,

    /// Write the report to this file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Write the full transcript as JSON
    #[arg(long, short = 't')]
    transcript: Option<PathBuf>,

    /// Supervisor model (routing)
    #[arg(long)]
    supervisor_model: Option<String>,

    /// Researcher model (search and report writing)
    #[arg(long)]
    researcher_model: Option<String>,

    /// Results per web search
    #[arg(long)]
    max_results: Option<u32>,

    /// Give the researcher a Python interpreter
    #[arg(long)]
    code_execution: bool,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Save the effective configuration (without API keys) and exit
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug {
        "web_researcher=debug"
    } else {
        "web_researcher=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(model) = args.supervisor_model {
        config.models.supervisor = model;
    }
    if let Some(model) = args.researcher_model {
        config.models.researcher = model;
    }
    if let Some(max_results) = args.max_results {
        config.search.max_results = max_results;
    }
    if args.code_execution {
        config.agent.code_execution = true;
    }

    if args.save_config {
        let path = config.save()?;
        println!("Configuration saved to {}", path.display());
        return Ok(());
    }

    let Some(question) = args.question.or(args.prompt) else {
        bail!("no research question given; pass it as an argument or with --prompt");
    };

    info!(
        supervisor = %config.models.supervisor,
        researcher = %config.models.researcher,
        "Loaded configuration"
    );

    let researcher = WebResearcher::from_config(&config)?;
    let transcript = researcher.run(&question).await?;

    if let Some(path) = args.transcript {
        let json = serde_json::to_string_pretty(&transcript)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing transcript to {}", path.display()))?;
        info!(path = %path.display(), "Transcript written");
    }

    let report = report_from_transcript(&transcript)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, report)
                .with_context(|| format!("writing report to {}", path.display()))?;
            info!(path = %path.display(), "Report written");
        }
        None => println!("{}", report),
    }

    Ok(())
}
