//! A generic HTTP chat-completion provider adapter.
//!
//! Grounded on `infrastructure/src/providers/routing.rs`'s `ProviderAdapter`
//! trait shape and `infrastructure/src/providers/copilot_adapter.rs`'s
//! thin-wrapper-over-an-inner-client pattern in the teacher. Speaks a
//! minimal JSON-in/JSON-out chat protocol rather than any one vendor's real
//! wire format — per spec, concrete model HTTP clients are out of scope;
//! this exists only so the CLI is runnable end to end against a stub.

use std::time::Instant;

use async_trait::async_trait;
use conclave_application::ports::provider_port::{ChatMessage, ChatOptions, ChatResponse, ProviderPort, Role};
use conclave_domain::provider::{ProviderError, ProviderErrorKind};
use conclave_domain::ProviderId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    text: String,
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Speaks a minimal chat-completion protocol over HTTP: `POST base_url`
/// with `{messages, system?, max_tokens?}`, expecting back
/// `{text, input_tokens, output_tokens}`.
pub struct HttpProviderAdapter {
    provider_id: ProviderId,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpProviderAdapter {
    pub fn new(provider_id: ProviderId, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider_id,
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ProviderPort for HttpProviderAdapter {
    fn provider_id(&self) -> ProviderId {
        self.provider_id.clone()
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
        options: ChatOptions,
    ) -> Result<ChatResponse, ProviderError> {
        let wire_messages = messages
            .iter()
            .map(|m| WireMessage {
                role: match m.role {
                    Role::System => "system",
                    Role::User => "user",
                },
                content: &m.content,
            })
            .collect();

        let body = WireRequest {
            messages: wire_messages,
            system: system_prompt,
            max_tokens: options.max_tokens,
        };

        let started = Instant::now();
        let request = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send();

        let response = match options.cancel_token {
            Some(cancel) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(ProviderError::cancelled()),
                    result = request => result,
                }
            }
            None => request.await,
        };

        let response = response.map_err(|e| transport_error(&e, started.elapsed().as_millis() as u64))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ProviderError::new(
                if status.as_u16() == 429 {
                    ProviderErrorKind::RateLimited
                } else if status.as_u16() == 401 || status.as_u16() == 403 {
                    ProviderErrorKind::Auth
                } else {
                    ProviderErrorKind::InvalidResponse
                },
                format!("provider returned HTTP {}", status),
                status.as_u16() == 429 || status.is_server_error(),
            ));
        }

        let parsed: WireResponse = response.json().await.map_err(|e| {
            ProviderError::new(ProviderErrorKind::InvalidResponse, e.to_string(), false)
        })?;

        Ok(ChatResponse {
            text: parsed.text,
            input_tokens: parsed.input_tokens,
            output_tokens: parsed.output_tokens,
        })
    }
}

fn transport_error(e: &reqwest::Error, _elapsed_ms: u64) -> ProviderError {
    if e.is_timeout() {
        ProviderError::new(ProviderErrorKind::Timeout, e.to_string(), true)
    } else {
        ProviderError::new(ProviderErrorKind::Transport, e.to_string(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_roundtrips() {
        let adapter = HttpProviderAdapter::new(ProviderId::new("acme-a"), "https://x.invalid", "key");
        assert_eq!(adapter.provider_id(), ProviderId::new("acme-a"));
    }
}
