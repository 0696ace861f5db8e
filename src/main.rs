use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;

use promptdeck::attachment::ImageAttachment;
use promptdeck::config::Config;
use promptdeck::generation::{GeminiClient, GenerationService};
use promptdeck::logging::init_tracing;
use promptdeck::screen::{create_screen, Prompt, PromptScreen, ScreenKind, ScreenSettings};
use promptdeck::ui::{run_lines, submit_and_render, Renderer};

/// Send text prompts, or images plus a question, to a hosted generative model.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/promptdeck/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Model to use, overriding service.model
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a reply to one prompt, or to each line of stdin
    Text { prompt: Option<String> },
    /// Ask a question about one or more images
    Image {
        /// Image file to attach (repeatable)
        #[arg(short, long = "image", value_name = "PATH", required = true)]
        images: Vec<PathBuf>,
        /// Question to ask; read from stdin lines when omitted
        question: Option<String>,
    },
    /// Hold a conversation over stdin lines
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let service: Arc<dyn GenerationService> =
        Arc::new(GeminiClient::from_config(&config).context("Failed to set up the generation service")?);
    let settings = ScreenSettings::from_config(&config);
    let mut renderer = Renderer::with_labels(io::stdout(), &config.chat);

    let (kind, prompt, images) = match cli.command {
        Some(Command::Text { prompt }) => (ScreenKind::Text, prompt, Vec::new()),
        Some(Command::Image { images, question }) => (ScreenKind::Image, question, images),
        Some(Command::Chat) => (ScreenKind::Chat, None, Vec::new()),
        None => (config.defaults.screen, None, Vec::new()),
    };

    let screen = create_screen(kind, service, &settings);
    for path in &images {
        let image = ImageAttachment::from_path(path)
            .with_context(|| format!("Failed to attach {}", path.display()))?;
        screen.attach(image)?;
    }

    match prompt {
        Some(text) => {
            let prompt = Prompt::new(text)?;
            submit_and_render(screen.as_ref(), prompt, &mut renderer).await?;
        }
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            let submitted = run_lines(screen.as_ref(), stdin, &mut renderer).await?;
            tracing::debug!(screen = %kind, submitted, "Input closed");
        }
    }

    exit_status(screen.as_ref())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(model) = &cli.model {
        config.service.model = model.clone();
        config.validate()?;
    }

    Ok(config)
}

/// A one-shot text or image run that ended in an error exits non-zero.
fn exit_status(screen: &dyn PromptScreen) -> Result<()> {
    if let promptdeck::screen::ScreenView::Request(state) = screen.view() {
        if let Some(message) = state.error_message() {
            anyhow::bail!("generation failed: {message}");
        }
    }
    Ok(())
}
