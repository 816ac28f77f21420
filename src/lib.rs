use anyhow::{anyhow, Result};
use std::path::Path;

pub mod disambig;
pub mod geometry;
pub mod locator;
pub mod logging;
pub mod normalize;
pub mod resolver;
pub mod settings;
pub mod similarity;
#[cfg(test)]
mod test_util;

pub use locator::{LocateRequest, LocateResponse, Locator, Thresholds};

#[derive(Debug, Clone)]
pub struct Config {
    /// Comma-delimited candidate phrases. Present switches the run into
    /// disambiguation mode; absent means streaming locate mode.
    pub options: Option<String>,
    pub settings_path: Option<String>,
    pub verbose: bool,
}

pub fn build_locator(config: &Config) -> Result<Locator> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;
    let resolver = resolver::build_resolver(&settings)?;
    Ok(Locator::new(resolver, settings))
}

/// One-shot disambiguation: phrase on stdin, options from the CLI, one
/// JSON line out.
pub async fn run(config: Config, input: Option<String>) -> Result<String> {
    let locator = build_locator(&config)?;

    let Some(raw_options) = config.options.as_deref() else {
        return Err(anyhow!(
            "run() requires --options; locate mode streams via respond_line"
        ));
    };
    let options = parse_options_arg(raw_options);
    let phrase = input.unwrap_or_default();
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return Err(anyhow!("stdin is empty"));
    }

    let outcome = locator.disambiguate(phrase, &options).await;
    Ok(serde_json::to_string(&outcome)?)
}

/// Handles one line of the streaming protocol: a `LocateRequest` JSON
/// object in, a `LocateResponse` JSON line out. A malformed line becomes an
/// error-bearing response so the host loop never has to stop.
pub async fn respond_line(locator: &Locator, line: &str) -> String {
    let response = match serde_json::from_str::<LocateRequest>(line) {
        Ok(request) => locator.handle(request).await,
        Err(err) => LocateResponse {
            original_text: String::new(),
            translated_text: String::new(),
            target_language: String::new(),
            matched_position: None,
            error: Some(format!("malformed request: {}", err)),
        },
    };
    serde_json::to_string(&response)
        .unwrap_or_else(|err| format!("{{\"error\":\"failed to serialize response: {}\"}}", err))
}

pub fn parse_options_arg(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
