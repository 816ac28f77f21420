use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::json;

use super::retry::{
    is_rate_limited, retry_after, wait_with_backoff, RATE_LIMIT_BASE_DELAY, RATE_LIMIT_MAX_RETRIES,
};
use super::{langpair, Direction, ResolveFuture};

const DEFAULT_BASE_URL: &str = "https://libretranslate.com";

#[derive(Debug, Clone)]
pub struct Libre {
    source_lang: String,
    target_lang: String,
    key: Option<String>,
    base_url: Option<String>,
}

impl Libre {
    pub fn new(
        source_lang: String,
        target_lang: String,
        key: Option<String>,
        base_url: Option<String>,
    ) -> Self {
        Self {
            source_lang,
            target_lang,
            key,
            base_url,
        }
    }

    pub fn resolve(&self, phrase: &str, direction: Direction) -> ResolveFuture {
        let provider = self.clone();
        let phrase = phrase.to_string();
        Box::pin(async move { call(provider, &phrase, direction).await })
    }

    fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
    error: Option<String>,
}

async fn call(provider: Libre, phrase: &str, direction: Direction) -> Result<String> {
    let client = reqwest::Client::new();
    let url = format!("{}/translate", provider.base_url());
    let (from, to) = langpair(&provider.source_lang, &provider.target_lang, direction);

    let mut body = json!({
        "q": phrase,
        "source": from,
        "target": to,
        "format": "text",
    });
    if let Some(key) = provider.key.as_deref() {
        body["api_key"] = json!(key);
    }

    let mut delay = RATE_LIMIT_BASE_DELAY;
    let mut attempt = 0;
    loop {
        let response = client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| "libretranslate request failed")?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response
            .text()
            .await
            .with_context(|| "failed to read libretranslate response")?;

        if is_rate_limited(status, &text) && attempt < RATE_LIMIT_MAX_RETRIES {
            attempt += 1;
            delay = wait_with_backoff("libretranslate", attempt, delay, retry_after(&headers)).await;
            continue;
        }
        if !status.is_success() {
            return Err(anyhow!("libretranslate returned {}: {}", status, text));
        }
        return extract_translation(&text);
    }
}

fn extract_translation(body: &str) -> Result<String> {
    let parsed: TranslateResponse =
        serde_json::from_str(body).with_context(|| "failed to parse libretranslate response")?;
    if let Some(error) = parsed.error {
        return Err(anyhow!("libretranslate error: {}", error));
    }
    parsed
        .translated_text
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| anyhow!("libretranslate returned no translation"))
}
