use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use super::retry::{
    is_rate_limited, retry_after, wait_with_backoff, RATE_LIMIT_BASE_DELAY, RATE_LIMIT_MAX_RETRIES,
};
use super::{langpair, Direction, ResolveFuture};

const DEFAULT_BASE_URL: &str = "https://api.mymemory.translated.net";

#[derive(Debug, Clone)]
pub struct MyMemory {
    source_lang: String,
    target_lang: String,
    key: Option<String>,
    base_url: Option<String>,
}

impl MyMemory {
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
struct GetResponse {
    #[serde(rename = "responseData")]
    response_data: Option<ResponseData>,
    #[serde(rename = "responseStatus")]
    response_status: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

async fn call(provider: MyMemory, phrase: &str, direction: Direction) -> Result<String> {
    let client = reqwest::Client::new();
    let url = format!("{}/get", provider.base_url());
    let (from, to) = langpair(&provider.source_lang, &provider.target_lang, direction);
    let pair = format!("{}|{}", from, to);

    let mut delay = RATE_LIMIT_BASE_DELAY;
    let mut attempt = 0;
    loop {
        let mut request = client
            .get(&url)
            .query(&[("q", phrase), ("langpair", pair.as_str())]);
        if let Some(key) = provider.key.as_deref() {
            request = request.query(&[("key", key)]);
        }

        let response = request
            .send()
            .await
            .with_context(|| "mymemory request failed")?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .with_context(|| "failed to read mymemory response")?;

        if is_rate_limited(status, &body) && attempt < RATE_LIMIT_MAX_RETRIES {
            attempt += 1;
            delay = wait_with_backoff("mymemory", attempt, delay, retry_after(&headers)).await;
            continue;
        }
        if !status.is_success() {
            return Err(anyhow!("mymemory returned {}: {}", status, body));
        }
        return extract_translation(&body, &pair);
    }
}

fn extract_translation(body: &str, pair: &str) -> Result<String> {
    let parsed: GetResponse =
        serde_json::from_str(body).with_context(|| "failed to parse mymemory response")?;
    let ok = match &parsed.response_status {
        Some(serde_json::Value::Number(code)) => code.as_i64() == Some(200),
        // The API reports errors as a string status on some paths.
        Some(serde_json::Value::String(code)) => code == "200",
        _ => true,
    };
    if !ok {
        return Err(anyhow!("mymemory rejected the request for pair {}", pair));
    }
    let text = parsed
        .response_data
        .and_then(|data| data.translated_text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| anyhow!("mymemory returned no translation for pair {}", pair))?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_translated_text() {
        let body = r#"{"responseData":{"translatedText":"hello"},"responseStatus":200}"#;
        assert_eq!(extract_translation(body, "zh|en").expect("extract"), "hello");
    }

    #[test]
    fn string_status_error_is_rejected() {
        let body = r#"{"responseData":{"translatedText":"INVALID LANGUAGE PAIR"},"responseStatus":"403"}"#;
        assert!(extract_translation(body, "zh|xx").is_err());
    }

    #[test]
    fn empty_translation_is_a_failure() {
        let body = r#"{"responseData":{"translatedText":""},"responseStatus":200}"#;
        assert!(extract_translation(body, "zh|en").is_err());
    }
}
