//! # Card Compiler
//!
//! Turns an image and a short intent into a [`CardConfig`].
//!
//! ```text
//!  image ──► palette ──────────────┐
//!    │                             ├──► CardConfig (JSON)
//!    └────► upload ──► url/key ────┤
//!  intent ─► llm ──► card text ────┘
//! ```
//!
//! Storage and text generation sit behind the [`ObjectStore`] and
//! [`TextGenerator`] traits so the pipeline can run against stubs.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod card;
pub mod cli;
pub mod compile;
pub mod config;
pub mod error;
pub mod llm;
pub mod palette;
pub mod template;
pub mod upload;

pub use card::{
    Align, CardColors, CardConfig, CardImage, CardLayout, CardMeta, CardTextBlock,
    LayoutOverrides,
};
pub use compile::{compile, generate_key, CompileRequest};
pub use config::{CompilerConfig, LlmConfig, StorageConfig};
pub use error::{CompileError, PaletteError, TextGenError, UploadError};
pub use llm::{parse_card_text, CardText, OpenAiClient, TextGenerator};
pub use palette::extract_colors;
pub use template::{normalize_tcg_stats, Rarity, Template};
pub use upload::{CosUploader, ObjectStore, UploadResult};

/// Card compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
