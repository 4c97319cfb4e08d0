//! Card text generation through an `OpenAI`-compatible chat completions API.
//!
//! The model is asked for a single JSON object. Whatever comes back is
//! coerced into a [`CardText`]; output that is not JSON becomes the card
//! body rather than an error.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::card::CardColors;
use crate::config::LlmConfig;
use crate::error::TextGenError;
use crate::template::Template;

/// Title used when the model output is not JSON and no intent was given.
pub const FALLBACK_TITLE: &str = "AI Card";

const SYSTEM_PROMPT: &str =
    "Your reply must be a single valid JSON object. Do not add any explanation.";

/// Text fields produced for a card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardText {
    /// Headline.
    pub title: String,
    /// Second line, possibly empty.
    pub subtitle: String,
    /// Body copy.
    pub body: String,
    /// Card name.
    pub name: String,
    /// Card category.
    pub kind: String,
    /// Rarity code as returned by the model.
    pub rarity: String,
    /// Attack value, 0 when the model gave no number.
    pub attack: i64,
    /// Defense value, 0 when the model gave no number.
    pub defense: i64,
    /// Effect text.
    pub effect: String,
    /// Flavor text.
    pub flavor_text: String,
}

/// Something that writes card text for an intent.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate card text.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or rejects the
    /// request. Malformed model output is not an error.
    async fn generate(
        &self,
        intent: &str,
        colors: &CardColors,
        template: &Template,
    ) -> Result<CardText, TextGenError>;
}

/// Build the user prompt for a card.
#[must_use]
pub fn build_prompt(intent: &str, colors: &CardColors, template: &Template) -> String {
    let intent = if intent.is_empty() { "general-purpose card" } else { intent };
    let mut lines = vec![
        if template.is_tcg() {
            "You are a trading card game designer naming a new card and writing its effect."
        } else {
            "You are a senior visual designer and copywriter writing the text for a card."
        }
        .to_string(),
        format!("Card purpose / setting: {intent}"),
        format!(
            "Colors: primary {}, secondary {}, suggested text color {}",
            colors.primary, colors.secondary, colors.text
        ),
    ];

    if template.is_tcg() {
        lines.push(
            "Design a TCG monster or character card for this setting and provide:\n\
             1. name: card name, 2 to 8 words\n\
             2. type: card category such as \"Fire Monster\", \"Spellcaster\" or \"Trap\"\n\
             3. rarity: one of \"N\", \"R\", \"SR\", \"SSR\", \"UR\"\n\
             4. attack: integer between 0 and 5000\n\
             5. defense: integer between 0 and 5000\n\
             6. effect: 1 to 3 sentences for the card's rules box\n\
             7. flavorText: optional lore, 1 to 2 sentences\n\
             Also provide display text: title (the name or a variation of it), \
             subtitle (may be empty or combine type and rarity) and body \
             (a promotional line)."
                .to_string(),
        );
    } else {
        lines.push(
            "Provide:\n\
             1. a short, memorable title (at most 15 words)\n\
             2. an optional subtitle (may be empty)\n\
             3. body copy of 1 to 3 sentences that fits on the card"
                .to_string(),
        );
    }

    lines.push("Answer in JSON only, shaped like:".to_string());
    lines.push(
        r#"{
  "title": "...",
  "subtitle": "...",
  "body": "...",
  "name": "...",
  "type": "...",
  "rarity": "R",
  "attack": 1800,
  "defense": 1200,
  "effect": "...",
  "flavorText": "..."
}"#
        .to_string(),
    );
    lines.join("\n")
}

/// Coerce raw model output into card text.
///
/// JSON output has missing fields defaulted (`name` falls back to `title`,
/// `effect` to `body`, `rarity` to `"N"`). Anything else becomes the body
/// and effect, titled with the intent.
#[must_use]
pub fn parse_card_text(content: &str, intent: &str) -> CardText {
    match serde_json::from_str::<Value>(content) {
        Ok(parsed) if !parsed.is_null() => from_json(&parsed),
        _ => {
            warn!("model output is not JSON, using it as the card body");
            let title = if intent.is_empty() { FALLBACK_TITLE } else { intent };
            CardText {
                title: title.to_string(),
                body: content.to_string(),
                name: title.to_string(),
                rarity: "N".to_string(),
                effect: content.to_string(),
                ..CardText::default()
            }
        }
    }
}

fn from_json(parsed: &Value) -> CardText {
    let text = |key: &str| {
        parsed
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let title = text("title").unwrap_or_default();
    let body = text("body").unwrap_or_default();
    CardText {
        name: text("name").unwrap_or_else(|| title.clone()),
        effect: text("effect").unwrap_or_else(|| body.clone()),
        subtitle: text("subtitle").unwrap_or_default(),
        kind: text("type").unwrap_or_default(),
        rarity: text("rarity").unwrap_or_else(|| "N".to_string()),
        attack: stat(parsed.get("attack")),
        defense: stat(parsed.get("defense")),
        flavor_text: text("flavorText").unwrap_or_default(),
        title,
        body,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn stat(value: Option<&Value>) -> i64 {
    value
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .map_or(0, |v| v.round() as i64)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    /// First choice's content, or `"{}"` if there is none.
    fn into_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "{}".to_string())
    }
}

/// Chat completions client.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    endpoint: Url,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    /// Create a client from configuration.
    ///
    /// A missing API key is logged here and reported when a request is made.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: &LlmConfig) -> Result<Self, TextGenError> {
        let base = config.base_url.trim_end_matches('/');
        let endpoint = Url::parse(&format!("{base}/chat/completions"))
            .map_err(|e| TextGenError::InvalidUrl(e.to_string()))?;

        let api_key = config.api_key.clone().filter(|k| !k.is_empty());
        if api_key.is_none() {
            warn!("OPENAI_API_KEY is not set");
        }

        let http = Client::builder()
            .user_agent(concat!("card-compiler/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            api_key,
            model: config.model.clone(),
        })
    }

    /// The chat completions URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send one chat completion and return the first choice's content.
    async fn complete(&self, prompt: &str) -> Result<String, TextGenError> {
        let api_key = self.api_key.as_deref().ok_or(TextGenError::MissingApiKey)?;
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        debug!(model = %self.model, endpoint = %self.endpoint, "Requesting chat completion");
        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TextGenError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let envelope: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|e| TextGenError::UnexpectedResponse(e.to_string()))?;
        Ok(envelope.into_content())
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(
        &self,
        intent: &str,
        colors: &CardColors,
        template: &Template,
    ) -> Result<CardText, TextGenError> {
        let prompt = build_prompt(intent, colors, template);
        let content = self.complete(&prompt).await?;
        info!(model = %self.model, bytes = content.len(), "Received card text");
        Ok(parse_card_text(&content, intent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn colors() -> CardColors {
        CardColors {
            primary: "#aa2200".into(),
            secondary: "#ffcc99".into(),
            text: "#ffffff".into(),
        }
    }

    fn config(server: &MockServer) -> LlmConfig {
        LlmConfig {
            api_key: Some("test-key".into()),
            base_url: format!("{}/v1/", server.uri()),
            model: "gpt-test".into(),
        }
    }

    fn completion(content: &str) -> Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
    }

    #[test]
    fn test_parse_full_json() {
        let text = parse_card_text(
            r#"{"title":"Ember","subtitle":"Fire · SR","body":"Burns bright.","name":"Ember Drake",
                "type":"Fire Monster","rarity":"SR","attack":1800.6,"defense":1200,
                "effect":"Deal 500.","flavorText":"Born of ash."}"#,
            "fire dragon",
        );
        assert_eq!(text.title, "Ember");
        assert_eq!(text.name, "Ember Drake");
        assert_eq!(text.kind, "Fire Monster");
        assert_eq!(text.rarity, "SR");
        assert_eq!(text.attack, 1801);
        assert_eq!(text.defense, 1200);
        assert_eq!(text.effect, "Deal 500.");
        assert_eq!(text.flavor_text, "Born of ash.");
    }

    #[test]
    fn test_parse_fills_defaults() {
        let text = parse_card_text(
            r#"{"title":"Hi","body":"There","attack":"9000","name":""}"#,
            "",
        );
        assert_eq!(text.name, "Hi");
        assert_eq!(text.effect, "There");
        assert_eq!(text.rarity, "N");
        assert_eq!(text.attack, 0);
        assert_eq!(text.defense, 0);
        assert_eq!(text.subtitle, "");
    }

    #[test]
    fn test_parse_non_json_falls_back() {
        let text = parse_card_text("hello", "");
        assert_eq!(text.title, FALLBACK_TITLE);
        assert_eq!(text.name, FALLBACK_TITLE);
        assert_eq!(text.body, "hello");
        assert_eq!(text.effect, "hello");
        assert_eq!(text.rarity, "N");
        assert_eq!((text.attack, text.defense), (0, 0));

        let text = parse_card_text("not { json", "birthday card");
        assert_eq!(text.title, "birthday card");
        assert_eq!(text.name, "birthday card");
    }

    #[test]
    fn test_prompt_mentions_template_fields() {
        let tcg = build_prompt("fire dragon", &colors(), &Template::TcgBasic);
        assert!(tcg.contains("trading card game"));
        assert!(tcg.contains("flavorText"));
        assert!(tcg.contains("fire dragon"));
        assert!(tcg.contains("#aa2200"));

        let plain = build_prompt("", &colors(), &Template::Default);
        assert!(plain.contains("copywriter"));
        assert!(plain.contains("general-purpose card"));
    }

    #[test]
    fn test_endpoint_joins_base() {
        let client = OpenAiClient::new(&LlmConfig {
            api_key: None,
            base_url: "https://llm.example.com/v1/".into(),
            model: "m".into(),
        })
        .expect("client");
        assert_eq!(
            client.endpoint().as_str(),
            "https://llm.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = OpenAiClient::new(&LlmConfig {
            base_url: "not a url".into(),
            ..LlmConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, TextGenError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn generate_parses_model_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({ "model": "gpt-test" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                r#"{"title":"Ember","body":"Burns.","rarity":"ur","attack":3000}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&config(&server)).expect("client");
        let text = client
            .generate("fire", &colors(), &Template::TcgBasic)
            .await
            .expect("text");
        assert_eq!(text.title, "Ember");
        assert_eq!(text.name, "Ember");
        assert_eq!(text.rarity, "ur");
        assert_eq!(text.attack, 3000);
    }

    #[tokio::test]
    async fn generate_falls_back_on_plain_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("hello")))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&config(&server)).expect("client");
        let text = client
            .generate("", &colors(), &Template::Default)
            .await
            .expect("text");
        assert_eq!(text.body, "hello");
        assert_eq!(text.effect, "hello");
    }

    #[tokio::test]
    async fn generate_defaults_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&config(&server)).expect("client");
        let text = client
            .generate("x", &colors(), &Template::Default)
            .await
            .expect("text");
        assert_eq!(text, parse_card_text("{}", "x"));
        assert_eq!(text.rarity, "N");
    }

    #[tokio::test]
    async fn generate_reports_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&config(&server)).expect("client");
        let err = client
            .generate("x", &colors(), &Template::Default)
            .await
            .unwrap_err();
        match err {
            TextGenError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn generate_rejects_malformed_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&config(&server)).expect("client");
        let err = client
            .generate("x", &colors(), &Template::Default)
            .await
            .unwrap_err();
        assert!(matches!(err, TextGenError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn generate_requires_api_key() {
        let server = MockServer::start().await;
        let client = OpenAiClient::new(&LlmConfig {
            api_key: None,
            ..config(&server)
        })
        .expect("client");
        let err = client
            .generate("x", &colors(), &Template::Default)
            .await
            .unwrap_err();
        assert!(matches!(err, TextGenError::MissingApiKey));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
