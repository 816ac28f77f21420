use serde::Serialize;

use crate::normalize::normalize;

/// Ranking of candidate phrases against a translated reference. Unlike the
/// fragment locator this never returns nothing: when translation itself
/// failed the first option is reported with zero confidence and the error
/// attached, so the caller can still act.
#[derive(Debug, Clone, Serialize)]
pub struct DisambiguationOutcome {
    pub query: String,
    pub translated_query: String,
    pub best_option: Option<String>,
    pub confidence: i32,
    pub all_options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn rank_options(query: &str, translated: &str, options: &[String]) -> DisambiguationOutcome {
    let mut best_option = None;
    let mut best_score = 0;
    for option in options {
        let score = score_option(translated, option);
        if score > best_score {
            best_score = score;
            best_option = Some(option.clone());
        }
    }
    DisambiguationOutcome {
        query: query.to_string(),
        translated_query: translated.to_string(),
        best_option,
        confidence: best_score,
        all_options: options.to_vec(),
        error: None,
    }
}

pub fn fallback_outcome(query: &str, options: &[String], error: String) -> DisambiguationOutcome {
    DisambiguationOutcome {
        query: query.to_string(),
        translated_query: String::new(),
        best_option: options.first().cloned(),
        confidence: 0,
        all_options: options.to_vec(),
        error: Some(error),
    }
}

/// Tiered score, first tier that fires wins: exact normalized match 100,
/// containment either way 80, then word overlap scaled to 60.
fn score_option(translated: &str, option: &str) -> i32 {
    let translated_norm = normalize(translated);
    let option_norm = normalize(option);
    if !translated_norm.is_empty() && translated_norm == option_norm {
        return 100;
    }

    let translated_lower = translated.trim().to_lowercase();
    let option_lower = option.trim().to_lowercase();
    if !translated_lower.is_empty()
        && !option_lower.is_empty()
        && (translated_lower.contains(&option_lower) || option_lower.contains(&translated_lower))
    {
        return 80;
    }

    word_overlap_score(&translated_lower, &option_lower)
}

fn word_overlap_score(translated: &str, option: &str) -> i32 {
    let option_words = option.split_whitespace().collect::<Vec<_>>();
    let qualifying = translated
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .collect::<Vec<_>>();
    if qualifying.is_empty() {
        return 0;
    }

    let matched = qualifying
        .iter()
        .filter(|word| {
            option_words
                .iter()
                .any(|opt| word.contains(opt) || opt.contains(*word))
        })
        .count();
    (matched * 60 / qualifying.len()) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn exact_match_scores_full_confidence() {
        let outcome = rank_options(
            "开始游戏",
            "start game",
            &options(&["Start Game", "Exit", "Settings"]),
        );
        assert_eq!(outcome.best_option.as_deref(), Some("Start Game"));
        assert_eq!(outcome.confidence, 100);
        assert!(outcome.error.is_none());
    }

    #[test]
    fn containment_scores_eighty() {
        let outcome = rank_options("游戏", "game", &options(&["Start Game", "Quit"]));
        assert_eq!(outcome.best_option.as_deref(), Some("Start Game"));
        assert_eq!(outcome.confidence, 80);
    }

    #[test]
    fn word_overlap_prefers_the_shared_word() {
        let outcome = rank_options(
            "现在开始游戏",
            "begin the game now",
            &options(&["Start Game", "Quit"]),
        );
        assert_eq!(outcome.best_option.as_deref(), Some("Start Game"));
        // One of four qualifying words ("game") overlaps an option word.
        assert_eq!(outcome.confidence, 15);
    }

    #[test]
    fn first_seen_wins_ties() {
        let outcome = rank_options("q", "game over", &options(&["game", "over"]));
        // Both options are contained in the translated phrase at 80; the
        // first stays.
        assert_eq!(outcome.best_option.as_deref(), Some("game"));
        assert_eq!(outcome.confidence, 80);
    }

    #[test]
    fn no_overlap_yields_no_best_option() {
        let outcome = rank_options("q", "red", &options(&["blue", "green"]));
        assert_eq!(outcome.best_option, None);
        assert_eq!(outcome.confidence, 0);
    }

    #[test]
    fn fallback_returns_first_option_with_zero_confidence() {
        let outcome = fallback_outcome(
            "你好",
            &options(&["Option A", "Option B"]),
            "no corpus line contains '你好'".to_string(),
        );
        assert_eq!(outcome.best_option.as_deref(), Some("Option A"));
        assert_eq!(outcome.confidence, 0);
        assert!(outcome.error.is_some());
        assert_eq!(outcome.translated_query, "");
    }

    #[test]
    fn short_words_are_ignored_in_overlap() {
        // Every translated word is two chars or shorter; the overlap tier
        // has nothing to score.
        let outcome = rank_options("q", "go up", &options(&["go west"]));
        assert_eq!(outcome.confidence, 0);
    }
}
