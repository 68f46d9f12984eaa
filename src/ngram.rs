// src/ngram.rs
//! Token n-gram overlap comparison.
//!
//! An independent, deliberately crude alternative to the structural
//! pipeline: no parsing, just comment stripping, whitespace collapsing and
//! shingled token hashes. Scores are percentages of A's n-grams found
//! anywhere in B, so the measure is asymmetric by construction.

/// Default shingle width.
pub const DEFAULT_NGRAM_SIZE: usize = 3;

/// One shingle with its hash.
#[derive(Debug, Clone)]
pub struct Ngram {
    pub text: String,
    pub hash: u64,
}

/// Strips comments and collapses whitespace ahead of tokenization.
#[must_use]
pub fn preprocess(code: &str) -> String {
    collapse_whitespace(&strip_comments(code))
}

/// Removes `//` and `/* */` comments, leaving string literals intact.
fn strip_comments(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let mut out = String::with_capacity(code.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let escaped = i > 0 && chars[i - 1] == '\\';

        if in_string {
            out.push(c);
            if c == '"' && !escaped {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if c == '"' && !escaped {
            in_string = true;
            out.push(c);
            i += 1;
            continue;
        }

        if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        if c == '/' && chars.get(i + 1) == Some(&'*') {
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                i += 1;
            }
            if i < chars.len() {
                i += 2;
            }
            continue;
        }

        out.push(c);
        i += 1;
    }

    out
}

/// Collapses runs of spaces and tabs to one space and runs of newlines to
/// one newline; leading blank space is dropped.
fn collapse_whitespace(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut last_space = false;
    let mut last_newline = false;

    for c in code.chars() {
        match c {
            ' ' | '\t' => {
                if !last_space && !last_newline {
                    out.push(' ');
                    last_space = true;
                }
            }
            '\n' | '\r' => {
                if !last_newline && !out.is_empty() {
                    out.push('\n');
                    last_newline = true;
                    last_space = false;
                }
            }
            _ => {
                out.push(c);
                last_space = false;
                last_newline = false;
            }
        }
    }

    out
}

/// Splits text into words, numbers and single punctuation characters.
#[must_use]
pub fn tokenize(code: &str) -> Vec<String> {
    let chars: Vec<char> = code.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        if chars[i].is_alphabetic() || chars[i] == '_' {
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
        } else if chars[i].is_ascii_digit() {
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
        } else {
            i += 1;
        }

        tokens.push(chars[start..i].iter().collect());
    }

    tokens
}

/// Builds the n-grams of a token stream. Empty when `n` is zero or larger
/// than the stream.
#[must_use]
pub fn generate(tokens: &[String], n: usize) -> Vec<Ngram> {
    if n == 0 || n > tokens.len() {
        return Vec::new();
    }

    tokens
        .windows(n)
        .map(|window| {
            let text = window.join(" ");
            let hash = djb2(&text);
            Ngram { text, hash }
        })
        .collect()
}

/// Full pipeline for one source text: preprocess, tokenize, shingle.
#[must_use]
pub fn fingerprint(code: &str, n: usize) -> Vec<Ngram> {
    generate(&tokenize(&preprocess(code)), n)
}

/// Percentage of `a`'s n-grams whose hash occurs anywhere in `b`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &[Ngram], b: &[Ngram]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let matches = a
        .iter()
        .filter(|n| b.iter().any(|m| m.hash == n.hash))
        .count();
    matches as f64 / a.len() as f64 * 100.0
}

/// Status line for a percentage score.
#[must_use]
pub fn status_label(percentage: f64) -> &'static str {
    if percentage >= 80.0 {
        "HIGH PLAGIARISM DETECTED!"
    } else if percentage >= 50.0 {
        "MODERATE SIMILARITY"
    } else {
        "LOW SIMILARITY"
    }
}

fn djb2(text: &str) -> u64 {
    let mut hash: u64 = 5381;
    for byte in text.bytes() {
        hash = (hash << 5).wrapping_add(hash).wrapping_add(u64::from(byte));
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_are_stripped_but_strings_survive() {
        let code = "a = \"x//y\"; // gone\n/* also gone */ b = 1;";
        let clean = preprocess(code);
        assert!(clean.contains("x//y"));
        assert!(!clean.contains("gone"));
    }

    #[test]
    fn punctuation_tokenizes_one_char_at_a_time() {
        let tokens = tokenize("x = y + 10;");
        assert_eq!(tokens, vec!["x", "=", "y", "+", "10", ";"]);
    }

    #[test]
    fn ngram_count_is_window_count() {
        let tokens = tokenize("a b c d");
        let ngrams = generate(&tokens, 3);
        assert_eq!(ngrams.len(), 2);
        assert_eq!(ngrams[0].text, "a b c");
        assert_eq!(ngrams[1].text, "b c d");
    }

    #[test]
    fn oversized_window_yields_nothing() {
        let tokens = tokenize("a b");
        assert!(generate(&tokens, 3).is_empty());
        assert!(generate(&tokens, 0).is_empty());
    }

    #[test]
    fn identical_sources_score_hundred() {
        let a = fingerprint("int main() { return 0; }", DEFAULT_NGRAM_SIZE);
        let b = fingerprint("int main() { return 0; }", DEFAULT_NGRAM_SIZE);
        let sim = similarity(&a, &b);
        assert!((sim - 100.0).abs() < 1e-9);
    }

    #[test]
    fn similarity_is_asymmetric_by_construction() {
        let a = fingerprint("a b c d e", 2);
        let b = fingerprint("a b c d e f g h i j", 2);
        // Every shingle of a occurs in b, but not vice versa.
        assert!((similarity(&a, &b) - 100.0).abs() < 1e-9);
        assert!(similarity(&b, &a) < 100.0);
    }

    #[test]
    fn status_bands() {
        assert_eq!(status_label(80.0), "HIGH PLAGIARISM DETECTED!");
        assert_eq!(status_label(79.9), "MODERATE SIMILARITY");
        assert_eq!(status_label(50.0), "MODERATE SIMILARITY");
        assert_eq!(status_label(49.9), "LOW SIMILARITY");
    }
}
