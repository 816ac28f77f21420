/// CJK Unified Ideographs block. A single codepoint in this range is enough
/// to classify a capture as CJK; OCR noise biasing toward Latin is the less
/// harmful failure mode.
const CJK_START: char = '\u{4e00}';
const CJK_END: char = '\u{9fff}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Cjk,
    Latin,
}

pub fn classify(text: &str) -> Script {
    if text.chars().any(is_cjk) {
        Script::Cjk
    } else {
        Script::Latin
    }
}

pub(crate) fn is_cjk(ch: char) -> bool {
    (CJK_START..=CJK_END).contains(&ch)
}

/// Canonical comparison form: option prefixes such as "A. " stripped first
/// (general cleanup would eat the period that marks them), then everything
/// that is not alphanumeric or a CJK ideograph dropped, then lowercased.
pub fn normalize(text: &str) -> String {
    strip_option_prefixes(text)
        .chars()
        .filter(|ch| ch.is_alphanumeric() || is_cjk(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}

fn strip_option_prefixes(text: &str) -> String {
    let chars = text.chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(text.len());
    let mut idx = 0;
    while idx < chars.len() {
        if let Some(next) = match_option_prefix(&chars, idx) {
            idx = next;
            continue;
        }
        out.push(chars[idx]);
        idx += 1;
    }
    out
}

// One-or-more ASCII letters, a period, optional trailing whitespace.
// Returns the index just past the run, or None if no prefix starts here.
fn match_option_prefix(chars: &[char], start: usize) -> Option<usize> {
    let mut idx = start;
    while idx < chars.len() && chars[idx].is_ascii_alphabetic() {
        idx += 1;
    }
    if idx == start || chars.get(idx) != Some(&'.') {
        return None;
    }
    idx += 1;
    while idx < chars.len() && chars[idx].is_whitespace() {
        idx += 1;
    }
    Some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_detects_single_ideograph() {
        assert_eq!(classify("开始游戏"), Script::Cjk);
        assert_eq!(classify("noise 好 noise"), Script::Cjk);
        assert_eq!(classify("start game"), Script::Latin);
        assert_eq!(classify(""), Script::Latin);
    }

    #[test]
    fn normalize_strips_punctuation_and_lowercases() {
        assert_eq!(normalize("Hello, World!"), "helloworld");
        assert_eq!(normalize("  你好 世界  "), "你好世界");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn normalize_strips_option_prefixes_first() {
        assert_eq!(normalize("A. Start Game"), "startgame");
        assert_eq!(normalize("opt. settings"), "settings");
        // Digits do not form a prefix run.
        assert_eq!(normalize("3. exit"), "3exit");
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in ["A. Start Game", "你好, world!", "", "abc.def"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }
}
