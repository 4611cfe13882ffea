//! entigraph CLI
//!
//! Usage:
//!   entigraph extract <path>
//!   entigraph graph <path> --out graph.html --height 600px --width 100%
//!   entigraph annotate <path> --out entities.html

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use entigraph_core::{AppConfig, RenderOptions};
use entigraph_pipeline::PipelineCoordinator;

#[derive(Parser)]
#[command(name = "entigraph")]
#[command(about = "Entity extraction and graph assembly")]
#[command(version)]
struct Cli {
    /// Recognition backend (lexicon or token)
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Model artifact for the token backend
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Gazetteer file for the lexicon backend
    #[arg(long, global = true)]
    gazetteer: Option<PathBuf>,

    /// Enable entity-linking enrichment
    #[arg(long, global = true)]
    link: bool,

    /// Emit the intermediate entity list as diagnostics
    #[arg(long, global = true)]
    dev: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract entities and print them as a JSON array
    Extract {
        /// Path to the input document
        path: PathBuf,
    },
    /// Build the interactive graph document
    Graph {
        /// Path to the input document
        path: PathBuf,
        /// Output file
        #[arg(long, default_value = "graph.html")]
        out: PathBuf,
        /// Canvas height
        #[arg(long, default_value = "400px")]
        height: String,
        /// Canvas width
        #[arg(long, default_value = "100%")]
        width: String,
    },
    /// Render annotated-text markup
    Annotate {
        /// Path to the input document
        path: PathBuf,
        /// Output file
        #[arg(long, default_value = "entities.html")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(backend) = &cli.backend {
        config.backend.kind = backend.parse()?;
    }
    if let Some(model) = &cli.model {
        config.backend.model_path = Some(model.clone());
    }
    if let Some(gazetteer) = &cli.gazetteer {
        config.backend.gazetteer_path = Some(gazetteer.clone());
    }
    if cli.link {
        config.linking.enabled = true;
    }

    match cli.command {
        Commands::Extract { path } => {
            let mut coordinator = coordinator(&config, cli.dev)?;
            coordinator.load_file(&path)?;
            coordinator.run(None).await?;
            println!("{}", coordinator.entities_json()?);
        }
        Commands::Graph {
            path,
            out,
            height,
            width,
        } => {
            config.render = RenderOptions { height, width };
            let mut coordinator = coordinator(&config, cli.dev)?;
            coordinator.load_file(&path)?;
            coordinator.run(None).await?;

            let artifact = coordinator
                .artifact()
                .ok_or_else(|| anyhow::anyhow!("run completed without an artifact"))?;
            std::fs::write(&out, &artifact.graph_html)?;
            tracing::info!(out = %out.display(), "wrote graph document");
        }
        Commands::Annotate { path, out } => {
            let mut coordinator = coordinator(&config, cli.dev)?;
            coordinator.load_file(&path)?;
            coordinator.run(None).await?;

            let artifact = coordinator
                .artifact()
                .ok_or_else(|| anyhow::anyhow!("run completed without an artifact"))?;
            std::fs::write(&out, &artifact.entity_html)?;
            tracing::info!(out = %out.display(), "wrote annotated text");
        }
    }

    Ok(())
}

fn coordinator(config: &AppConfig, dev: bool) -> anyhow::Result<PipelineCoordinator> {
    Ok(PipelineCoordinator::from_config(config)?.with_dev_mode(dev))
}
