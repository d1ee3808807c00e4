use once_cell::sync::Lazy;
use regex::Regex;

const NAME_CAPTURE: &str = r"\s+([A-Za-z][A-Za-z'\- ]{0,60})";

/// Introductions tried in order; the first match wins.
static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["my name is", "call me", "i am", "i'm", "this is"]
        .iter()
        .map(|lead| {
            Regex::new(&format!(r"(?i)\b{}{}", regex::escape(lead), NAME_CAPTURE))
                .expect("name pattern is valid")
        })
        .collect()
});

/// Pulls a title-cased name out of phrases like "my name is jane".
pub fn extract_name(text: &str) -> Option<String> {
    NAME_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| {
            let raw = m.as_str().trim();
            let cleaned = raw.strip_suffix(['.', ',', '!', '?']).unwrap_or(raw);
            to_title_case(cleaned)
        })
}

fn to_title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
