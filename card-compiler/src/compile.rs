//! The compile pipeline: image + intent → [`CardConfig`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::card::{CardConfig, CardImage, CardMeta, CardTextBlock, LayoutOverrides};
use crate::error::CompileError;
use crate::llm::TextGenerator;
use crate::palette::extract_colors;
use crate::template::{normalize_tcg_stats, Template};
use crate::upload::ObjectStore;

/// Prefix for uploaded card images.
pub const KEY_PREFIX: &str = "cards/";

/// Inputs for one compile.
#[derive(Debug, Clone, Default)]
pub struct CompileRequest {
    /// Local image file.
    pub image_path: PathBuf,
    /// What the card is for. May be empty.
    pub intent: String,
    /// Template.
    pub template: Template,
    /// Layout overrides on top of the template's layout.
    pub layout: LayoutOverrides,
}

impl CompileRequest {
    /// Request for `image_path` with the default template and no intent.
    #[must_use]
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            ..Self::default()
        }
    }

    /// Set the intent.
    #[must_use]
    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = intent.into();
        self
    }

    /// Set the template.
    #[must_use]
    pub fn with_template(mut self, template: Template) -> Self {
        self.template = template;
        self
    }

    /// Set layout overrides.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutOverrides) -> Self {
        self.layout = layout;
        self
    }
}

/// Object key for an uploaded image: `cards/<unix-millis>-<12 hex><ext>`.
///
/// The extension is taken from `path` (with its dot) and defaults to `.png`.
#[must_use]
pub fn generate_key(path: &Path, now: DateTime<Utc>) -> String {
    let ext = path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .filter(|e| !e.is_empty())
        .map_or_else(|| ".png".to_string(), |e| format!(".{e}"));
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{KEY_PREFIX}{}-{}{ext}",
        now.timestamp_millis(),
        &suffix[..12]
    )
}

/// Compile a card.
///
/// Stages run in order (palette, upload, text) and the first failure
/// aborts the compile.
///
/// # Errors
///
/// Returns [`CompileError::MissingImagePath`] for an empty path, or the
/// error of the first stage that fails.
#[instrument(skip_all, fields(image = %request.image_path.display(), template = %request.template))]
pub async fn compile(
    request: &CompileRequest,
    store: &dyn ObjectStore,
    text_generator: &dyn TextGenerator,
) -> Result<CardConfig, CompileError> {
    if request.image_path.as_os_str().is_empty() {
        return Err(CompileError::MissingImagePath);
    }

    let template = &request.template;
    let layout = template.base_layout().with_overrides(request.layout);

    let colors = extract_colors(&request.image_path)?;
    info!(primary = %colors.primary, secondary = %colors.secondary, "Extracted palette");

    let key = generate_key(&request.image_path, Utc::now());
    let upload = store.put_file(&request.image_path, &key).await?;
    info!(url = %upload.url, "Uploaded image");

    let text = text_generator
        .generate(&request.intent, &colors, template)
        .await?;
    info!(title = %text.title, "Generated card text");

    let (attack, defense, rarity) = if template.is_tcg() {
        let stats = normalize_tcg_stats(text.attack, text.defense, &text.rarity);
        (stats.attack, stats.defense, stats.rarity.to_string())
    } else {
        (text.attack, text.defense, text.rarity.clone())
    };

    Ok(CardConfig {
        id: key.clone(),
        image: CardImage {
            url: upload.url,
            key,
        },
        colors,
        text: CardTextBlock {
            title: text.title,
            subtitle: text.subtitle,
            body: text.body,
        },
        layout,
        meta: CardMeta {
            intent: request.intent.clone(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            template: template.name().to_string(),
            name: text.name,
            kind: text.kind,
            rarity,
            attack,
            defense,
            effect: text.effect,
            flavor_text: text.flavor_text,
        },
    })
}
