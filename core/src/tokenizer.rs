use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref SENTENCE_BREAK: Regex = Regex::new(r"[.!?]+").expect("valid regex");
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").expect("valid regex");
}

/// Lowercase whitespace-separated words longer than two characters.
pub fn query_words(text: &str) -> Vec<String> {
    words_longer_than(&text.to_lowercase(), 2)
}

fn words_longer_than(lower: &str, min: usize) -> Vec<String> {
    lower
        .split_whitespace()
        .filter(|w| w.chars().count() > min)
        .map(|w| w.to_string())
        .collect()
}

/// Split on runs of sentence punctuation, keeping trimmed sentences over 20 chars.
pub fn sentences(text: &str) -> Vec<String> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| s.chars().count() > 20)
        .map(|s| s.to_string())
        .collect()
}

/// Most frequent words longer than four characters; ties keep first-seen order.
pub fn trend_words<'a, I>(texts: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for word in words_longer_than(&text.to_lowercase(), 4) {
            let count = counts.entry(word.clone()).or_insert(0);
            if *count == 0 { order.push(word); }
            *count += 1;
        }
    }
    // stable sort keeps first-seen order among equal counts
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(limit);
    order
}

pub fn strip_html(text: &str) -> String {
    HTML_TAG.replace_all(text, "").into_owned()
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Case-insensitive substring test.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Join names as "A", "A and B", or "A, B, and C".
pub fn format_list<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [one] => one.as_ref().to_string(),
        [a, b] => format!("{} and {}", a.as_ref(), b.as_ref()),
        [rest @ .., last] => {
            let head: Vec<&str> = rest.iter().map(|s| s.as_ref()).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_words_drop_short_tokens() {
        assert_eq!(query_words("Gold  mining in Ghana"), vec!["gold", "mining", "ghana"]);
    }

    #[test]
    fn sentences_skip_fragments() {
        let s = sentences("Short one. This sentence is clearly long enough! ok?");
        assert_eq!(s, vec!["This sentence is clearly long enough"]);
    }

    #[test]
    fn trend_ties_keep_first_seen() {
        let t = trend_words(["solar power growth", "growth of solar markets"], 5);
        assert_eq!(t, vec!["solar", "growth", "power", "markets"]);
    }

    #[test]
    fn html_is_stripped() {
        assert_eq!(strip_html("<b>Lagos</b> fintech"), "Lagos fintech");
    }
}
