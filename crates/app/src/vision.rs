//! Chat-completion client for vision-capable models

use crate::settings::Settings;
use anyhow::{bail, Context, Result};
use export::ImagePayload;
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
});

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

fn build_request<'a>(settings: &'a Settings, payload: &'a ImagePayload) -> ChatRequest<'a> {
    ChatRequest {
        model: &settings.model,
        messages: vec![Message {
            role: "user",
            content: vec![
                ContentPart::Text {
                    text: &settings.prompt,
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: payload.as_str(),
                    },
                },
            ],
        }],
        max_tokens: settings.max_tokens,
    }
}

fn parse_response(body: &str) -> Result<String> {
    let response: ChatResponse =
        serde_json::from_str(body).context("Unexpected response from the model endpoint")?;

    if let Some(error) = response.error {
        bail!("{}", error.message);
    }

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .context("The model returned an empty response")
}

/// Send the captured region with the configured prompt; returns the reply text.
///
/// Blocking: call it off the UI thread.
pub fn ask(settings: &Settings, payload: &ImagePayload) -> Result<String> {
    if settings.api_key.trim().is_empty() {
        bail!("No API key configured. Add one in Settings.");
    }

    let url = format!("{}/chat/completions", settings.endpoint.trim_end_matches('/'));
    debug!(%url, model = %settings.model, bytes = payload.len(), "sending vision request");

    let response = CLIENT
        .post(&url)
        .bearer_auth(settings.api_key.trim())
        .json(&build_request(settings, payload))
        .send()
        .context("Failed to send request")?;

    let status = response.status();
    let body = response.text().context("Failed to read response body")?;

    match parse_response(&body) {
        Ok(text) => {
            info!(chars = text.len(), "vision request answered");
            Ok(text)
        }
        Err(e) if !status.is_success() => bail!("API request failed with status {status}: {e}"),
        Err(e) => Err(e),
    }
}
