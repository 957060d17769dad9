use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use opptak_rs::opptak::fixture::FixtureLoader;
use opptak_rs::opptak::rules::Language;
use opptak_rs::opptak::server;
use opptak_rs::opptak::{EngineConfig, PathwayEvaluator};

use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Language for operator words (en or nb)
    #[arg(short, long, global = true)]
    language: Option<Language>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate an applicant against a pathway
    Evaluate {
        /// Path to the store seed file
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Applicant identifier
        #[arg(short, long)]
        applicant: String,

        /// Pathway identifier
        #[arg(short, long)]
        pathway: String,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a pathway's rule as an expression
    Explain {
        /// Path to the store seed file
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Pathway identifier
        #[arg(short, long)]
        pathway: String,

        /// Print the preview as JSON
        #[arg(long)]
        json: bool,
    },
    /// Serve the HTTP API
    Serve {
        /// Path to the store seed file
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

fn build_evaluator(
    config: &EngineConfig,
    store: Option<PathBuf>,
) -> anyhow::Result<PathwayEvaluator> {
    let path = store
        .or_else(|| config.store_file.clone())
        .context("No store file given; pass --store or set ADMISSION_STORE_FILE")?;
    let store = FixtureLoader::new()
        .load_store(&path)
        .with_context(|| format!("Failed to load store from {}", path.display()))?;
    Ok(PathwayEvaluator::new(Arc::new(store), config))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let mut config = EngineConfig::from_env()?;
    if let Some(language) = args.language {
        config.language = language;
    }

    match args.command {
        Commands::Evaluate {
            store,
            applicant,
            pathway,
            json,
        } => {
            let evaluator = build_evaluator(&config, store)?;
            let decision = evaluator.evaluate_pathway(&applicant, &pathway).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&decision)?);
            } else {
                let verdict = if decision.satisfied {
                    "QUALIFIED"
                } else {
                    "NOT QUALIFIED"
                };
                println!("{} for {} ({})", verdict, decision.pathway.name, pathway);
                println!("Rule: {}", decision.expression);
                println!();
                print!("{}", decision.explanation.render());
            }
        }
        Commands::Explain {
            store,
            pathway,
            json,
        } => {
            let evaluator = build_evaluator(&config, store)?;
            let preview = evaluator.explain_pathway(&pathway).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else if preview.expression.is_empty() {
                println!("{} has no rule", preview.pathway.name);
            } else {
                println!("{}: {}", preview.pathway.name, preview.expression);
            }
        }
        Commands::Serve { store, port } => {
            let evaluator = build_evaluator(&config, store)?;
            server::serve(Arc::new(evaluator), port).await?;
        }
    }

    Ok(())
}
