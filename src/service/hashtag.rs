//! Hashtag extraction and trend ranking

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::data::Trend;

fn hashtag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"#[0-9A-Za-z_]+").expect("Regex should compile"))
}

/// Every `#word` in `content`, left to right
///
/// Matching is case-sensitive and non-overlapping. Duplicates are kept.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    hashtag_regex()
        .find_iter(content)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Count hashtag occurrences and rank them by count, highest first
///
/// Tags with equal counts keep the order in which they were first seen.
pub fn rank_hashtags<I, S>(tags: I) -> Vec<Trend>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut trends: Vec<Trend> = Vec::new();

    for tag in tags {
        let tag = tag.as_ref();
        match positions.get(tag) {
            Some(&index) => trends[index].count += 1,
            None => {
                positions.insert(tag.to_string(), trends.len());
                trends.push(Trend {
                    hashtag: tag.to_string(),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable
    trends.sort_by(|a, b| b.count.cmp(&a.count));
    trends
}
