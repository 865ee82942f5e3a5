//! Pure text heuristics: token-count approximation and topic classification.
//!
//! Neither is exact. The token estimate approximates cl100k-style BPE counts
//! from character and word density; the classifier is a fixed-priority
//! keyword scan. Both are deterministic and stateless.

use crate::models::Category;

/// Markers that flag text as code-like for the denser tokens-per-char ratio.
const CODE_MARKERS: [&str; 9] = [
    "```", "def ", "function ", "class ", "import ", "const ", "var ", "{", "}",
];

const SECURITY_KEYWORDS: [&str; 6] = [
    "security",
    "threat",
    "attack",
    "vulnerability",
    "xss",
    "sql injection",
];
const CODE_KEYWORDS: [&str; 8] = [
    "code",
    "function",
    "python",
    "javascript",
    "java",
    "sql",
    "react",
    "node",
];
const CLOUD_KEYWORDS: [&str; 6] = ["cloud", "aws", "azure", "gcp", "kubernetes", "docker"];
const AI_ML_KEYWORDS: [&str; 7] = [
    "ai",
    "machine learning",
    "model",
    "neural",
    "nlm",
    "llm",
    "transformer",
];
const DATA_KEYWORDS: [&str; 8] = [
    "data",
    "database",
    "sql",
    "nosql",
    "mongodb",
    "elasticsearch",
    "excel",
    "csv",
];

/// Approximates the token count of `text`.
///
/// Code is token-heavy (symbols, unique identifiers), so code-like text uses
/// a 3.5 chars-per-token divisor against 4 for prose. The word-based estimate
/// (words * 1.33) guards against undercounting short many-word sentences.
/// Returns the max of the two, 0 for empty input.
pub fn estimate_tokens(text: &str) -> u32 {
    if text.is_empty() {
        return 0;
    }

    let chars = text.chars().count();
    let words = text.split_whitespace().count();

    let divisor = if is_code_like(text) { 3.5 } else { 4.0 };
    let char_estimate = (chars as f64 / divisor).ceil() as u32;
    let word_estimate = (words as f64 * 1.33).ceil() as u32;

    char_estimate.max(word_estimate)
}

fn is_code_like(text: &str) -> bool {
    CODE_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Classifies text into a topic category by case-insensitive substring match,
/// evaluated in priority order Security > Code > Cloud > AI/ML > Data.
/// First matching set wins; `General` if nothing matches.
pub fn determine_category(text: &str) -> Category {
    let lowered = text.to_lowercase();
    let matches = |keywords: &[&str]| keywords.iter().any(|kw| lowered.contains(kw));

    if matches(&SECURITY_KEYWORDS) {
        Category::Security
    } else if matches(&CODE_KEYWORDS) {
        Category::Code
    } else if matches(&CLOUD_KEYWORDS) {
        Category::Cloud
    } else if matches(&AI_ML_KEYWORDS) {
        Category::AiMl
    } else if matches(&DATA_KEYWORDS) {
        Category::Data
    } else {
        Category::General
    }
}
