//! Aura - Sustainability Copilot
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use aura::{Config, ConversationManager, ImageAttachment, Repl, SubmitOutcome};

/// Aura - Sustainability Copilot
#[derive(Parser, Debug)]
#[command(name = "aura")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Gemini model to use
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GOOGLE_AI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,

    /// Image to attach in single prompt mode
    #[arg(long, short = 'i', requires = "prompt")]
    image: Option<PathBuf>,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    init_config: bool,
}

/// Send tracing output to stderr; RUST_LOG wins over --debug
fn init_logging(debug: bool) {
    let default = if debug { "aura=debug" } else { "aura=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(ref model) = args.model {
        config.set_model(model.clone());
    }

    if let Some(ref key) = args.api_key {
        config.set_api_key(key.clone());
    }

    if args.debug {
        config.ui.debug = true;
    }

    init_logging(config.ui.debug);

    if args.init_config {
        let path = config.save_and_get_path()?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let image = args.image.map(ImageAttachment::from_path).transpose()?;

        let mut manager = ConversationManager::with_gemini(config)?;
        if let SubmitOutcome::Replied(turn) = manager.submit(&prompt, image).await? {
            println!("{}", turn.text);
        }
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::with_config(config)?;
    repl.run().await?;

    Ok(())
}
