//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::card::{Align, LayoutOverrides};
use crate::config::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use crate::template::DEFAULT_TEMPLATE;

/// Command-line arguments for card-compiler.
#[derive(Debug, Clone, Parser)]
#[command(name = "card-compiler")]
#[command(about = "Compile an image and an intent into a card config")]
#[command(version)]
pub struct Cli {
    /// Subcommand. Help is printed when absent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Compile an image into a card config and print it as JSON
    Compile(CompileArgs),
}

/// Arguments for `compile`.
#[derive(Debug, Clone, Args)]
pub struct CompileArgs {
    /// Path to the card image
    pub image: PathBuf,

    /// What the card is for, e.g. "fire dragon monster"
    #[arg(long, default_value = "")]
    pub intent: String,

    /// Template name (`default` or `tcg-basic`)
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    /// Override the card width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Override the card height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Override the inner padding in pixels
    #[arg(long)]
    pub padding: Option<u32>,

    /// Override the text alignment (left, center, right)
    #[arg(long)]
    pub align: Option<Align>,

    /// API key for the chat completions service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Chat completions API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    pub openai_base_url: String,

    /// Chat model
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_OPENAI_MODEL)]
    pub openai_model: String,

    /// Object storage access key id
    #[arg(long, env = "COS_SECRET_ID", hide_env_values = true)]
    pub cos_secret_id: Option<String>,

    /// Object storage secret key
    #[arg(long, env = "COS_SECRET_KEY", hide_env_values = true)]
    pub cos_secret_key: Option<String>,

    /// Bucket name
    #[arg(long, env = "COS_BUCKET")]
    pub cos_bucket: Option<String>,

    /// Bucket region
    #[arg(long, env = "COS_REGION")]
    pub cos_region: Option<String>,

    /// Storage endpoint override (path-style)
    #[arg(long, env = "COS_ENDPOINT")]
    pub cos_endpoint: Option<String>,
}

impl CompileArgs {
    /// Layout overrides given on the command line.
    #[must_use]
    pub fn layout_overrides(&self) -> LayoutOverrides {
        LayoutOverrides {
            width: self.width,
            height: self.height,
            padding: self.padding,
            align: self.align,
        }
    }
}
