//! nivesh CLI
//!
//! Runs one company query through the analysis pipeline and prints the
//! structured pros/cons report, or invokes an individual tool directly.
//!
//! # Usage
//!
//! ```bash
//! export GROQ_API_KEY="gsk_..."
//! export NIVESH_MODEL="llama3-groq-8b-8192-tool-use-preview"
//!
//! nivesh analyse "How is Reliance performing?"
//! nivesh tool recent_news RELIANCE
//! nivesh tools
//! ```

use clap::{Parser, Subcommand};
use nivesh_analysis::api::{DuckDuckGoClient, NseListingClient, YahooFinanceClient};
use nivesh_analysis::{AnalysisConfig, AnalysisPipeline, ReportGenerator, build_registry};
use nivesh_llm::LlmProvider;
use nivesh_llm::providers::GroqProvider;
use std::env;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nivesh", about = "Conversational equity analysis for NSE/BSE stocks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyse a company and print the pros/cons report
    Analyse {
        /// Free-text company query, e.g. "How is Reliance performing?"
        query: String,

        /// Print the consolidated corpus instead of the summarized report
        #[arg(long)]
        raw: bool,
    },

    /// Invoke a single tool by name
    Tool {
        /// Tool name, e.g. "recent_news"
        name: String,

        /// The tool's single string argument
        argument: String,
    },

    /// List the available tools
    Tools,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,nivesh_analysis=info")),
        )
        .init();

    let cli = Cli::parse();

    let config = Arc::new(
        AnalysisConfig::builder()
            .model(env::var("NIVESH_MODEL").unwrap_or_else(|_| AnalysisConfig::default().model))
            .build()?,
    );
    let timeout = config.request_timeout;

    let search = Arc::new(DuckDuckGoClient::new(timeout)?);
    let provider = Arc::new(YahooFinanceClient::new(timeout)?);
    let listing = Arc::new(NseListingClient::new(timeout)?);
    let llm: Arc<dyn LlmProvider> = Arc::new(GroqProvider::from_env()?);

    match cli.command {
        Command::Analyse { query, raw } => {
            let pipeline = AnalysisPipeline::new(
                Arc::clone(&search) as _,
                Arc::clone(&provider) as _,
                listing,
                Arc::clone(&llm),
                Arc::clone(&config),
            );

            let corpus = pipeline.analyse_company(&query).await;
            if raw {
                println!("{corpus}");
                return Ok(());
            }

            let generator = ReportGenerator::new(llm, config);
            match generator.summarize(&corpus).await {
                Ok(report) => println!("{report}"),
                Err(e) => {
                    // Still show what the pipeline gathered
                    warn!("report generation failed: {e}");
                    println!("{corpus}");
                }
            }
        }

        Command::Tool { name, argument } => {
            let registry = build_registry(search, provider, listing, llm, config);
            let output = registry.dispatch(&name, &argument).await?;
            println!("{output}");
        }

        Command::Tools => {
            let registry = build_registry(search, provider, listing, llm, config);
            let mut definitions = registry.definitions();
            definitions.sort_by(|a, b| a.name.cmp(&b.name));
            for definition in definitions {
                println!("{:<22} {}", definition.name, definition.description);
            }
        }
    }

    Ok(())
}
