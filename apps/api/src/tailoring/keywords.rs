//! Keyword matching against a job description.

use regex::Regex;
use tracing::warn;

/// 1.0 if `keyword` appears in `job_description` as a whole word (case-insensitive),
/// otherwise 0.0. An empty keyword never matches.
pub fn keyword_score(keyword: &str, job_description: &str) -> f64 {
    if matches_whole_word(keyword, job_description) {
        1.0
    } else {
        0.0
    }
}

/// Whole-word, case-insensitive match of the literal `keyword` in `text`.
///
/// The keyword is escaped, so `C++` or `node.js` match literally. A "word" boundary
/// here means start/end of text or a non-word character on each side, which also
/// works for keywords that begin or end with punctuation (where `\b` would not).
pub fn matches_whole_word(keyword: &str, text: &str) -> bool {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return false;
    }

    let pattern = format!(r"(?i)(?:^|\W){}(?:\W|$)", regex::escape(keyword));
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(text),
        Err(e) => {
            warn!("Could not build matcher for keyword '{}': {}", keyword, e);
            false
        }
    }
}
