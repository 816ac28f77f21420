/// Longest common contiguous substring length, counted in chars.
///
/// Classic O(|a|*|b|) dynamic programming; inputs are single OCR words or
/// short phrases, so the quadratic table stays tiny. Contiguous overlap is
/// what makes the locator robust to OCR splitting words into fragments.
pub fn lcs_length(a: &str, b: &str) -> usize {
    let a = a.chars().collect::<Vec<_>>();
    let b = b.chars().collect::<Vec<_>>();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    let mut longest = 0;
    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                table[i + 1][j + 1] = table[i][j] + 1;
                longest = longest.max(table[i + 1][j + 1]);
            }
        }
    }
    longest
}
