/// DataTable Ranking Engine
///
/// Scores a cell value against a query string. Matching is case-insensitive
/// and, unless diacritics are kept, accent-insensitive. The result is a pass
/// flag plus a totally ordered `Ranking` where a higher ranking means a closer
/// match.
///
/// # Ranking Tiers
///
/// | Ranking | Score | Example (query `"app"`) |
/// |---------|-------|-------------------------|
/// | `CaseSensitiveEqual` | 7 | `"app"` |
/// | `Equal` | 6 | `"APP"` |
/// | `StartsWith` | 5 | `"apple"` |
/// | `WordStartsWith` | 4 | `"pine apple"` |
/// | `Contains` | 3 | `"pineapple"` |
/// | `Acronym` | 2 | `"nwa"` in `"North-West Airlines"` |
/// | `Matches(c)` | 1 + c/2 | `"plgnd"` in `"playground"`, c = 1 / spread |
/// | `NoMatch` | 0 | fails |

use crate::column::CellValue;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;

/// Match quality of one value against one query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Ranking {
    CaseSensitiveEqual,
    Equal,
    StartsWith,
    WordStartsWith,
    Contains,
    Acronym,
    /// In-order subsequence match; the payload is the closeness in (0, 1].
    Matches(f64),
    NoMatch,
}

impl Ranking {
    /// The weakest ranking that still counts as a match.
    pub const MIN_MATCH: Ranking = Ranking::Matches(0.0);

    pub fn score(&self) -> f64 {
        match self {
            Ranking::CaseSensitiveEqual => 7.0,
            Ranking::Equal => 6.0,
            Ranking::StartsWith => 5.0,
            Ranking::WordStartsWith => 4.0,
            Ranking::Contains => 3.0,
            Ranking::Acronym => 2.0,
            Ranking::Matches(closeness) => 1.0 + closeness.clamp(0.0, 1.0) * 0.5,
            Ranking::NoMatch => 0.0,
        }
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, Ranking::NoMatch)
    }
}

impl PartialEq for Ranking {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranking {}

impl PartialOrd for Ranking {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranking {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score().total_cmp(&other.score())
    }
}

/// Options controlling how values are ranked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankOptions {
    /// Compare accented characters as-is instead of folding them to ASCII.
    pub keep_diacritics: bool,
    /// Minimum ranking for a value to pass.
    pub threshold: Ranking,
}

impl Default for RankOptions {
    fn default() -> Self {
        RankOptions {
            keep_diacritics: false,
            threshold: Ranking::MIN_MATCH,
        }
    }
}

/// Rank produced for one row/column pair, kept as filter metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRank {
    pub passed: bool,
    pub ranking: Ranking,
    /// The text the query was matched against.
    pub ranked_value: String,
}

/// Rank a cell value against `query`.
///
/// An empty query always passes with the same neutral ranking for every
/// value. An empty or null value fails any non-empty query.
///
/// # Examples
///
/// ```
/// use datatable::{rank_item, CellValue, RankOptions, Ranking};
///
/// let options = RankOptions::default();
/// let rank = rank_item(&CellValue::from("Alice"), "ali", &options);
/// assert!(rank.passed);
/// assert_eq!(rank.ranking, Ranking::StartsWith);
///
/// let miss = rank_item(&CellValue::from("Bob"), "ali", &options);
/// assert!(!miss.passed);
/// assert!(rank.ranking > miss.ranking);
/// ```
pub fn rank_item(value: &CellValue, query: &str, options: &RankOptions) -> ItemRank {
    let ranked_value = value.to_text();

    let ranking = if query.is_empty() {
        Ranking::StartsWith
    } else if ranked_value.is_empty() {
        Ranking::NoMatch
    } else {
        let candidate = prepare(&ranked_value, options.keep_diacritics);
        let query = prepare(query, options.keep_diacritics);
        get_match_ranking(&candidate, &query)
    };

    ItemRank {
        passed: ranking.is_match() && ranking >= options.threshold,
        ranking,
        ranked_value,
    }
}

/// Order two rankings; `Greater` means `a` is the closer match.
pub fn compare(a: &Ranking, b: &Ranking) -> Ordering {
    a.cmp(b)
}

fn prepare(s: &str, keep_diacritics: bool) -> Cow<'_, str> {
    if keep_diacritics || s.is_ascii() {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(deunicode::deunicode(s))
    }
}

/// Classify `candidate` against a non-empty `query` into a ranking tier.
pub fn get_match_ranking(candidate: &str, query: &str) -> Ranking {
    let query_len = query.chars().count();
    if query_len > candidate.chars().count() {
        return Ranking::NoMatch;
    }

    if candidate == query {
        return Ranking::CaseSensitiveEqual;
    }

    let candidate = candidate.to_lowercase();
    let query = query.to_lowercase();

    if candidate == query {
        return Ranking::Equal;
    }

    if candidate.starts_with(&query) {
        return Ranking::StartsWith;
    }

    if candidate.contains(&format!(" {}", query)) {
        return Ranking::WordStartsWith;
    }

    if candidate.contains(&query) {
        return Ranking::Contains;
    }

    // A single character either appears verbatim or not at all
    if query_len == 1 {
        return Ranking::NoMatch;
    }

    if acronym(&candidate).contains(&query) {
        return Ranking::Acronym;
    }

    closeness_ranking(&candidate, &query)
}

/// First character of every space- or hyphen-separated word.
fn acronym(s: &str) -> String {
    s.split(' ')
        .flat_map(|word| word.split('-'))
        .filter_map(|part| part.chars().next())
        .collect()
}

/// Subsequence match scored by how tightly the query characters cluster.
fn closeness_ranking(candidate: &str, query: &str) -> Ranking {
    let haystack: Vec<char> = candidate.chars().collect();
    let mut cursor = 0;
    let mut first = None;
    let mut last = 0;

    for needle in query.chars() {
        match haystack[cursor..].iter().position(|&c| c == needle) {
            Some(offset) => {
                let found = cursor + offset;
                first.get_or_insert(found);
                last = found;
                cursor = found + 1;
            }
            None => return Ranking::NoMatch,
        }
    }

    let spread = match first {
        Some(first) => last - first,
        None => return Ranking::NoMatch,
    };

    if spread == 0 {
        Ranking::Matches(1.0)
    } else {
        Ranking::Matches(1.0 / spread as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank(value: &str, query: &str) -> Ranking {
        rank_item(&CellValue::from(value), query, &RankOptions::default()).ranking
    }

    #[test]
    fn test_ranking_tiers() {
        assert_eq!(rank("app", "app"), Ranking::CaseSensitiveEqual);
        assert_eq!(rank("APP", "app"), Ranking::Equal);
        assert_eq!(rank("Apple", "app"), Ranking::StartsWith);
        assert_eq!(rank("pine apple", "app"), Ranking::WordStartsWith);
        assert_eq!(rank("pineapple", "app"), Ranking::Contains);
        assert_eq!(rank("North-West Airlines", "nwa"), Ranking::Acronym);
        assert!(matches!(rank("playground", "plgnd"), Ranking::Matches(_)));
        assert_eq!(rank("banana", "xyz"), Ranking::NoMatch);
    }

    #[test]
    fn test_tier_order() {
        let ordered = [
            Ranking::NoMatch,
            Ranking::Matches(0.1),
            Ranking::Matches(1.0),
            Ranking::Acronym,
            Ranking::Contains,
            Ranking::WordStartsWith,
            Ranking::StartsWith,
            Ranking::Equal,
            Ranking::CaseSensitiveEqual,
        ];
        for pair in ordered.windows(2) {
            assert_eq!(compare(&pair[0], &pair[1]), Ordering::Less, "{:?} < {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_closeness_prefers_tight_matches() {
        // "a..l" spread 2 vs "a....l" spread 5
        let tight = rank("axle", "al");
        let loose = rank("abcdel", "al");
        assert!(tight > loose);
        assert!(loose.is_match());
    }

    #[test]
    fn test_query_longer_than_value_fails() {
        assert_eq!(rank("bo", "bob"), Ranking::NoMatch);
    }

    #[test]
    fn test_single_char_query_requires_substring() {
        assert_eq!(rank("bob", "o"), Ranking::Contains);
        assert_eq!(rank("bob", "z"), Ranking::NoMatch);
    }

    #[test]
    fn test_empty_query_and_empty_value() {
        let options = RankOptions::default();
        let neutral_a = rank_item(&CellValue::from("Alice"), "", &options);
        let neutral_b = rank_item(&CellValue::Null, "", &options);
        assert!(neutral_a.passed && neutral_b.passed);
        assert_eq!(neutral_a.ranking, neutral_b.ranking);

        let empty = rank_item(&CellValue::Null, "a", &options);
        assert!(!empty.passed);
        assert_eq!(empty.ranking, Ranking::NoMatch);
        assert!(!rank_item(&CellValue::from(""), "a", &options).passed);
    }

    #[test]
    fn test_numbers_rank_by_text() {
        let options = RankOptions::default();
        let hit = rank_item(&CellValue::Number(1234.0), "23", &options);
        assert!(hit.passed);
        assert_eq!(hit.ranking, Ranking::Contains);
        assert_eq!(hit.ranked_value, "1234");
    }

    #[test]
    fn test_diacritics() {
        assert_eq!(rank("café", "cafe"), Ranking::CaseSensitiveEqual);

        let keep = RankOptions {
            keep_diacritics: true,
            ..Default::default()
        };
        let kept = rank_item(&CellValue::from("café"), "cafe", &keep);
        assert!(!kept.passed);
    }

    #[test]
    fn test_threshold() {
        let strict = RankOptions {
            threshold: Ranking::Contains,
            ..Default::default()
        };
        assert!(rank_item(&CellValue::from("pineapple"), "app", &strict).passed);
        assert!(!rank_item(&CellValue::from("playground"), "plgnd", &strict).passed);
    }

    #[test]
    fn test_passed_ranks_beat_failed_ranks() {
        let options = RankOptions::default();
        let pass = rank_item(&CellValue::from("abcdefghijklmnop"), "ap", &options);
        let fail = rank_item(&CellValue::from("zzz"), "ap", &options);
        assert!(pass.passed);
        assert!(!fail.passed);
        assert_eq!(compare(&pass.ranking, &fail.ranking), Ordering::Greater);
    }
}
