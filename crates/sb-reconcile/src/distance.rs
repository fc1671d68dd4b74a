use strsim::levenshtein;

/// Nearest candidate by Levenshtein distance: `(index, distance)`.
///
/// Linear scan in iteration order; a later candidate replaces the current
/// best only when strictly closer, so ties go to the first one seen.
pub fn nearest<'a, I>(text: &str, candidates: I) -> Option<(usize, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(usize, usize)> = None;
    for (index, candidate) in candidates.into_iter().enumerate() {
        let distance = levenshtein(text, candidate);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((index, distance));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_wins() {
        let names = ["Viktor", "ComradeNick", "Ash"];
        assert_eq!(nearest("ComradeNick", names), Some((1, 0)));
    }

    #[test]
    fn test_ties_go_to_first_seen() {
        // "cat" is one edit from both
        assert_eq!(nearest("cat", ["bat", "cot"]), Some((0, 1)));
        assert_eq!(nearest("cat", ["cot", "bat"]), Some((0, 1)));
    }

    #[test]
    fn test_empty_candidates() {
        assert_eq!(nearest("anything", std::iter::empty()), None);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        assert_eq!(nearest("Jöhn", ["John"]), Some((0, 1)));
    }
}
