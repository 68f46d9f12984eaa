// src/analysis/lexer.rs
//! Tokenizer for the restricted C subset.
//!
//! Total function of the input text: there is no lexical error. Comments,
//! preprocessor lines and any character outside the recognized productions
//! are silently dropped, so malformed input degrades to a shorter token
//! stream instead of failing. The output always ends with exactly one
//! end-of-file token.

/// Token categories produced by [`tokenize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Number,
    Operator,
    Assign,
    Semicolon,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Eof,
}

/// A single token with its text payload and source line (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }
}

/// Reserved words of the subject language. Matched as whole identifiers.
const KEYWORDS: &[&str] = &[
    "if", "else", "while", "for", "do", "switch", "case", "default", "break", "continue", "return",
    "int", "float", "char", "double", "void", "long", "short", "unsigned", "signed", "struct",
    "union", "enum", "typedef", "const", "static", "extern", "auto", "register", "sizeof", "goto",
];

/// Returns true if `word` is a reserved word.
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Splits source text into tokens. Never fails.
#[must_use]
pub fn tokenize(code: &str) -> Vec<Token> {
    let bytes = code.as_bytes();
    let mut tokens = Vec::new();
    let mut line = 1usize;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];

        if c.is_ascii_whitespace() {
            if c == b'\n' {
                line += 1;
            }
            i += 1;
            continue;
        }

        // Line comments run to end of line; the newline is left for the
        // whitespace branch so line counting stays correct.
        if c == b'/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        if c == b'/' && bytes.get(i + 1) == Some(&b'*') {
            i += 2;
            while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                if bytes[i] == b'\n' {
                    line += 1;
                }
                i += 1;
            }
            if i < bytes.len() {
                i += 2;
            }
            continue;
        }

        // Preprocessor lines are discarded unexpanded.
        if c == b'#' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        if c.is_ascii_alphabetic() || c == b'_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            let word = &code[start..i];
            let kind = if is_keyword(word) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            tokens.push(Token::new(kind, word, line));
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            tokens.push(Token::new(TokenKind::Number, &code[start..i], line));
            continue;
        }

        // Two-character compound operators via one byte of lookahead.
        // All of them lex as operators; only a lone '=' is an assignment.
        let compound = matches!(
            (c, bytes.get(i + 1)),
            (b'=', Some(b'='))
                | (b'!', Some(b'='))
                | (b'<', Some(b'='))
                | (b'>', Some(b'='))
                | (b'&', Some(b'&'))
                | (b'|', Some(b'|'))
                | (b'+', Some(b'+'))
                | (b'-', Some(b'-'))
        );
        if compound {
            tokens.push(Token::new(TokenKind::Operator, &code[i..i + 2], line));
            i += 2;
            continue;
        }

        let kind = match c {
            b'+' | b'-' | b'*' | b'/' | b'%' | b'<' | b'>' | b'!' | b'&' | b'|' => {
                Some(TokenKind::Operator)
            }
            b'=' => Some(TokenKind::Assign),
            b';' => Some(TokenKind::Semicolon),
            b',' => Some(TokenKind::Comma),
            b'(' => Some(TokenKind::LParen),
            b')' => Some(TokenKind::RParen),
            b'{' => Some(TokenKind::LBrace),
            b'}' => Some(TokenKind::RBrace),
            b'[' => Some(TokenKind::LBracket),
            b']' => Some(TokenKind::RBracket),
            b':' => Some(TokenKind::Colon),
            _ => None,
        };
        if let Some(kind) = kind {
            tokens.push(Token::new(kind, (c as char).to_string(), line));
        }
        i += 1;
    }

    tokens.push(Token::new(TokenKind::Eof, "", line));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(code: &str) -> Vec<TokenKind> {
        tokenize(code).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn ends_with_exactly_one_eof() {
        let tokens = tokenize("x = 1;");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
        let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        assert_eq!(eofs, 1);
    }

    #[test]
    fn compound_equality_is_an_operator() {
        let tokens = tokenize("a == b");
        assert_eq!(tokens[1].kind, TokenKind::Operator);
        assert_eq!(tokens[1].text, "==");
    }

    #[test]
    fn lone_equals_is_assignment() {
        let tokens = tokenize("a = b");
        assert_eq!(tokens[1].kind, TokenKind::Assign);
    }

    #[test]
    fn keywords_are_distinguished_from_identifiers() {
        let tokens = tokenize("while whilex");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn comments_and_preprocessor_lines_are_dropped() {
        let code = "#include <stdio.h>\n// line\n/* block\nstill block */ x";
        let tokens = tokenize(code);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "x");
        assert_eq!(tokens[0].line, 4);
    }

    #[test]
    fn unknown_characters_are_silently_dropped() {
        assert_eq!(kinds("x @ $ y"), kinds("x y"));
    }

    #[test]
    fn numbers_absorb_dots() {
        let tokens = tokenize("3.14");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].text, "3.14");
    }

    #[test]
    fn empty_input_yields_only_eof() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }
}
