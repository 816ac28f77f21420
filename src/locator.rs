use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::disambig::{self, DisambiguationOutcome};
use crate::geometry::{BoundingBox, OcrToken, Region};
use crate::normalize::{classify, normalize, Script};
use crate::resolver::{Direction, Resolver, ResolverImpl};
use crate::settings::Settings;
use crate::similarity::lcs_length;

/// One unit of work from the host loop: the recognized text of the query
/// region plus the word fragments of the answer region.
#[derive(Debug, Clone, Deserialize)]
pub struct LocateRequest {
    pub source_text: String,
    pub tokens: Vec<OcrToken>,
    pub target_region: Region,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocateResponse {
    pub original_text: String,
    pub translated_text: String,
    pub target_language: String,
    pub matched_position: Option<BoundingBox>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub min_confidence: i32,
    pub min_token_length: usize,
}

/// The engine: owns the configured resolver and thresholds, handles one
/// request at a time, keeps no state across requests.
pub struct Locator {
    resolver: ResolverImpl,
    settings: Settings,
}

impl Locator {
    pub fn new(resolver: ResolverImpl, settings: Settings) -> Self {
        Self { resolver, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolution and validation failures land in the `error` field; the
    /// host loop logs them and keeps polling. A `matched_position` of
    /// `None` with no error is a valid miss, not a fault.
    pub async fn handle(&self, request: LocateRequest) -> LocateResponse {
        if let Err(message) = validate_region(&request.target_region) {
            return failure_response(&request.source_text, "", message);
        }

        let script = classify(&request.source_text);
        let target_language = match script {
            Script::Cjk => self.settings.target_lang.clone(),
            Script::Latin => self.settings.source_lang.clone(),
        };

        let phrase = normalize(&request.source_text);
        if phrase.is_empty() {
            return failure_response(
                &request.source_text,
                &target_language,
                "query region produced no usable text".to_string(),
            );
        }

        let direction = Direction::from_script(script);
        let translated = match self.resolver.resolve(&phrase, direction).await {
            Ok(text) => text,
            Err(err) => {
                return failure_response(&request.source_text, &target_language, format!("{:#}", err));
            }
        };

        let thresholds = self.thresholds_for(&translated);
        let matched_position = locate_fragment(
            &translated,
            &request.tokens,
            &request.target_region,
            thresholds,
        );
        LocateResponse {
            original_text: request.source_text,
            translated_text: translated,
            target_language,
            matched_position,
            error: None,
        }
    }

    pub async fn disambiguate(&self, phrase: &str, options: &[String]) -> DisambiguationOutcome {
        let query = normalize(phrase);
        if options.is_empty() {
            return disambig::fallback_outcome(&query, options, "no options provided".to_string());
        }
        if query.is_empty() {
            return disambig::fallback_outcome(
                &query,
                options,
                "query is empty after normalization".to_string(),
            );
        }

        let direction = Direction::from_script(classify(phrase));
        match self.resolver.resolve(&query, direction).await {
            Ok(translated) => disambig::rank_options(&query, &translated, options),
            Err(err) => disambig::fallback_outcome(&query, options, format!("{:#}", err)),
        }
    }

    fn thresholds_for(&self, translated: &str) -> Thresholds {
        let min_token_length = match classify(translated) {
            Script::Cjk => self.settings.cjk_min_token_length,
            Script::Latin => self.settings.latin_min_token_length,
        };
        Thresholds {
            min_confidence: self.settings.min_confidence,
            min_token_length,
        }
    }
}

fn validate_region(region: &Region) -> Result<(), String> {
    if region.width == 0 || region.height == 0 {
        return Err(format!(
            "target region is degenerate: {}x{}",
            region.width, region.height
        ));
    }
    Ok(())
}

fn failure_response(original: &str, target_language: &str, error: String) -> LocateResponse {
    LocateResponse {
        original_text: original.to_string(),
        translated_text: String::new(),
        target_language: target_language.to_string(),
        matched_position: None,
        error: Some(error),
    }
}

/// Picks the token whose normalized text shares the longest contiguous run
/// with the translated phrase, returning its box in screen coordinates.
///
/// The running best starts at -1, and only a strictly greater score
/// replaces it. On ties the first-seen token wins, and a zero-scoring token
/// can become the result only when it is the first candidate considered.
pub fn locate_fragment(
    translated: &str,
    tokens: &[OcrToken],
    region: &Region,
    thresholds: Thresholds,
) -> Option<BoundingBox> {
    let target = normalize(translated);
    let mut best_score: i64 = -1;
    let mut best: Option<BoundingBox> = None;

    for token in tokens {
        if token.confidence < thresholds.min_confidence {
            continue;
        }
        let trimmed = token.text.trim();
        if trimmed.chars().count() < thresholds.min_token_length {
            continue;
        }
        let score = lcs_length(&normalize(trimmed), &target) as i64;
        debug!("token '{}' scored {}", trimmed, score);
        if score > best_score {
            best_score = score;
            best = Some(token.bbox.offset_by(region.x, region.y));
        }
    }
    best
}
