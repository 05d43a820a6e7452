// src/sections.rs
//! Section extractor for the rendered newsletter.
//!
//! The document is split at second-level headings. Two passes:
//! 1. [`tokenize`] turns the text into heading-open / heading-close / text
//!    tokens carrying byte spans into the source.
//! 2. [`extract_sections`] walks the tokens with a small state machine.
//!
//! Boundary rules:
//! - a section starts at a heading and runs until the next heading or EOF;
//! - content before the first heading belongs to no section;
//! - a heading-open that is not closed before the next heading-open (or EOF)
//!   is plain body text, and so is a stray heading-close;
//! - adjacent headings give a section with an empty body.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::ops::Range;

/// Title used when a heading has no text left after stripping markup.
pub const FALLBACK_TITLE: &str = "Section";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Plain text, markup stripped.
    pub title: String,
    /// Raw markup, trimmed.
    pub body: String,
}

impl Section {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    HeadingOpen,
    HeadingClose,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range in the source document.
    pub span: Range<usize>,
}

/// Classify a tag starting at `bytes[0] == b'<'`. Returns the kind and the tag
/// length (through `>`), or None if this is not an `<h2>` / `</h2>` tag.
fn heading_tag_at(bytes: &[u8]) -> Option<(TokenKind, usize)> {
    let (kind, name_end) = if bytes.len() >= 4 && bytes[1] == b'/' {
        (TokenKind::HeadingClose, 4)
    } else {
        (TokenKind::HeadingOpen, 3)
    };
    let name = bytes.get(name_end - 2..name_end)?;
    if !name.eq_ignore_ascii_case(b"h2") {
        return None;
    }
    // `<h2>`, `<h2 class=..>`, but not `<h20>` or `<h2x>`
    match bytes.get(name_end)? {
        b'>' => {}
        c if c.is_ascii_whitespace() => {}
        b'/' if kind == TokenKind::HeadingOpen => {}
        _ => return None,
    }
    let close = bytes[name_end..].iter().position(|&b| b == b'>')?;
    Some((kind, name_end + close + 1))
}

/// Split `html` into heading tags and the text between them.
/// Concatenating every token span reproduces the input.
pub fn tokenize(html: &str) -> Vec<Token> {
    let bytes = html.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'<' {
            if let Some((kind, len)) = heading_tag_at(&bytes[i..]) {
                if text_start < i {
                    tokens.push(Token {
                        kind: TokenKind::Text,
                        span: text_start..i,
                    });
                }
                tokens.push(Token {
                    kind,
                    span: i..i + len,
                });
                i += len;
                text_start = i;
                continue;
            }
        }
        i += 1;
    }

    if text_start < bytes.len() {
        tokens.push(Token {
            kind: TokenKind::Text,
            span: text_start..bytes.len(),
        });
    }
    tokens
}

/// Whether the heading-open at `idx` is closed before any other heading tag.
fn is_closed(tokens: &[Token], idx: usize) -> bool {
    tokens[idx + 1..]
        .iter()
        .find(|t| t.kind != TokenKind::Text)
        .is_some_and(|t| t.kind == TokenKind::HeadingClose)
}

enum State {
    /// Before the first heading.
    Preamble,
    /// Inside `<h2>...`, title text starts at `title_start`.
    Heading { title_start: usize },
    /// After `</h2>`, body starts at `body_start`.
    Body { title: String, body_start: usize },
}

/// Ordered `(title, body)` sections of a rendered document.
pub fn extract_sections(html: &str) -> Vec<Section> {
    let tokens = tokenize(html);
    let mut sections = Vec::new();
    let mut state = State::Preamble;

    for (idx, tok) in tokens.iter().enumerate() {
        state = match (state, tok.kind) {
            (State::Heading { title_start }, TokenKind::HeadingClose) => State::Body {
                title: plain_title(&html[title_start..tok.span.start]),
                body_start: tok.span.end,
            },
            (prev, TokenKind::HeadingOpen) if is_closed(&tokens, idx) => {
                if let State::Body { title, body_start } = prev {
                    sections.push(Section::new(
                        title,
                        html[body_start..tok.span.start].trim(),
                    ));
                }
                State::Heading {
                    title_start: tok.span.end,
                }
            }
            // text, unterminated opens and stray closes don't move the state
            (prev, _) => prev,
        };
    }

    if let State::Body { title, body_start } = state {
        sections.push(Section::new(title, html[body_start..].trim()));
    }
    sections
}

/// Strip markup, decode entities, trim. Empty → [`FALLBACK_TITLE`].
pub fn plain_title(inner: &str) -> String {
    static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex"));
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws regex"));

    let stripped = RE_TAGS.replace_all(inner, "");
    let decoded = html_escape::decode_html_entities(&stripped);
    let title = RE_WS.replace_all(decoded.trim(), " ").to_string();
    if title.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        title
    }
}
