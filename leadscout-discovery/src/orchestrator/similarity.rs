//! Fuzzy name similarity on a 0–100 scale.
//!
//! The merge engine only depends on [`NameSimilarity`], so the metric can
//! be swapped without touching dedup logic. Implementations must be
//! symmetric and return 100 for names that are equal after normalisation.

/// A symmetric name-similarity metric returning a score in `0..=100`.
pub trait NameSimilarity: Send + Sync {
    fn ratio(&self, a: &str, b: &str) -> u8;
}

/// Normalised Levenshtein ratio (via [`strsim`]), scaled to 0–100.
///
/// Names are lowercased, stripped of punctuation and whitespace-collapsed
/// before comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinRatio;

impl NameSimilarity for LevenshteinRatio {
    fn ratio(&self, a: &str, b: &str) -> u8 {
        let a = canonical_name(a);
        let b = canonical_name(b);
        if a.is_empty() && b.is_empty() {
            return 100;
        }
        let score = strsim::normalized_levenshtein(&a, &b) * 100.0;
        score.round().clamp(0.0, 100.0) as u8
    }
}

/// Lowercase, drop punctuation other than spaces, collapse whitespace.
pub fn canonical_name(name: &str) -> String {
    let lowered: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_names_score_100() {
        assert_eq!(LevenshteinRatio.ratio("Jack Plumber", "Jack Plumber"), 100);
    }

    #[test]
    fn case_and_punctuation_ignored() {
        assert_eq!(LevenshteinRatio.ratio("JACK  PLUMBER", "jack plumber"), 100);
        assert_eq!(LevenshteinRatio.ratio("Mary-Jane O'Neil", "MaryJane ONeil"), 100);
    }

    #[test]
    fn one_letter_typo_scores_high() {
        // 1 edit over 10 characters.
        assert_eq!(LevenshteinRatio.ratio("Jon Smith", "John Smith"), 90);
    }

    #[test]
    fn different_people_score_low() {
        assert!(LevenshteinRatio.ratio("Jane Doe", "Robert Brown") < 50);
    }

    #[test]
    fn symmetric() {
        let a = LevenshteinRatio.ratio("Sarah Jones", "Sara Jonas");
        let b = LevenshteinRatio.ratio("Sara Jonas", "Sarah Jones");
        assert_eq!(a, b);
    }

    #[test]
    fn empty_names() {
        assert_eq!(LevenshteinRatio.ratio("", ""), 100);
        assert_eq!(LevenshteinRatio.ratio("Jack", ""), 0);
    }

    #[test]
    fn canonical_name_collapses() {
        assert_eq!(canonical_name("  Dr.  Jane   SMITH "), "dr jane smith");
    }
}
