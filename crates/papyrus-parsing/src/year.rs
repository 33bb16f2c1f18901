use once_cell::sync::Lazy;
use regex::Regex;

const MIN_YEAR: u16 = 1950;
const MAX_YEAR: u16 = 2030;

/// Pick the publication year by majority vote over every plausible 4-digit
/// year in `text`.
///
/// Candidates are 1900–2030; only 1950–2030 vote. On a tie the year seen
/// first in the text wins. Returns `None` when nothing qualifies.
pub fn extract_year(text: &str) -> Option<u16> {
    static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19\d{2}|20[0-2]\d|2030)\b").unwrap());

    // (year, count) in first-seen order
    let mut tally: Vec<(u16, usize)> = Vec::new();
    for m in YEAR_RE.find_iter(text) {
        let Ok(year) = m.as_str().parse::<u16>() else {
            continue;
        };
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            continue;
        }
        match tally.iter_mut().find(|(y, _)| *y == year) {
            Some((_, count)) => *count += 1,
            None => tally.push((year, 1)),
        }
    }

    let winner = tally
        .iter()
        .fold(None, |best: Option<(u16, usize)>, &(year, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((year, count)),
        })
        .map(|(year, _)| year);

    if let Some(year) = winner {
        tracing::debug!(year, candidates = tally.len(), "year selected");
    }
    winner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_vote() {
        let text = "Published 2020. Revised 2021. Copyright 2020, cited 2020.";
        assert_eq!(extract_year(text), Some(2020));
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        assert_eq!(extract_year("2019 then 2017, again 2017 and 2019"), Some(2019));
        assert_eq!(extract_year("2017 then 2019"), Some(2017));
    }

    #[test]
    fn test_range_filter() {
        // 1900s before 1950 match the pattern but do not vote.
        assert_eq!(extract_year("founded 1912, 1912, 1912; released 1999"), Some(1999));
        assert_eq!(extract_year("in 1900 and 1949"), None);
        assert_eq!(extract_year("through 2030"), Some(2030));
    }

    #[test]
    fn test_requires_word_boundaries() {
        assert_eq!(extract_year("id 120200 and v2021x"), None);
        // Punctuation is a boundary, so arXiv ids do vote.
        assert_eq!(extract_year("arXiv:2005.14165"), Some(2005));
        assert_eq!(extract_year("2031 2099 1850"), None);
    }

    #[test]
    fn test_no_year() {
        assert_eq!(extract_year(""), None);
        assert_eq!(extract_year("no digits here"), None);
    }
}
