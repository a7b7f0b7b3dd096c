//! Identifiers and doc comments for emitted Rust.

use heck::{ToSnakeCase, ToUpperCamelCase};
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;

/// Emit `#[doc = "..."]` attributes for an optional schema description, one
/// per line.
pub fn doc_comment_tokens(description: Option<&str>) -> TokenStream {
    let Some(desc) = description else {
        return TokenStream::new();
    };
    let lines = sanitize_doc(desc)
        .lines()
        .map(|line| format!(" {}", line))
        .collect::<Vec<_>>();
    quote! { #(#[doc = #lines])* }
}

/// Make a GraphQL description safe for rustdoc.
///
/// `[Tag]` brackets that are not markdown links become `` `Tag` `` so rustdoc
/// does not resolve them as intra-doc links, and bare `http(s)://` URLs are
/// wrapped in angle brackets.
pub fn sanitize_doc(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;

    while i < len {
        if chars[i] == '[' {
            if let Some(offset) = chars[i + 1..].iter().position(|&c| c == ']') {
                let close = i + 1 + offset;
                let is_link = chars.get(close + 1) == Some(&'(');
                if !is_link && close > i + 1 {
                    out.push('`');
                    out.extend(&chars[i + 1..close]);
                    out.push('`');
                    i = close + 1;
                    continue;
                }
            }
            out.push('[');
            i += 1;
        } else if let Some(url_len) = url_at(&chars[i..]) {
            let bracketed = i > 0 && chars[i - 1] == '<';
            if !bracketed {
                out.push('<');
            }
            out.extend(&chars[i..i + url_len]);
            if !bracketed {
                out.push('>');
            }
            i += url_len;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// Length of the URL starting at `chars[0]`, if one does.
fn url_at(chars: &[char]) -> Option<usize> {
    let starts = |prefix: &str| {
        prefix.len() <= chars.len() && prefix.chars().zip(chars).all(|(a, b)| a == *b)
    };
    if !starts("https://") && !starts("http://") {
        return None;
    }
    let end = chars
        .iter()
        .position(|&c| c.is_whitespace() || matches!(c, ')' | ',' | '>' | '\''))
        .unwrap_or(chars.len());
    Some(end)
}

/// Rust keywords that need an `r#` prefix when used as identifiers.
const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "else", "enum", "extern", "false", "fn", "for", "if",
    "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static",
    "struct", "trait", "true", "type", "unsafe", "use", "where", "while", "async", "await", "dyn",
    "abstract", "become", "box", "do", "final", "macro", "override", "priv", "typeof", "unsized",
    "virtual", "yield", "try", "gen",
];

/// Keywords that cannot be raw identifiers either.
const RESERVED: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Make a name safe for use as a Rust identifier.
pub fn safe_ident(name: &str) -> String {
    if RESERVED.contains(&name) {
        format!("{}_", name)
    } else if RUST_KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

/// Identifier token for `name`, escaped with [`safe_ident`].
pub fn ident(name: &str) -> Ident {
    let safe = safe_ident(name);
    match safe.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(&safe, Span::call_site()),
    }
}

/// Struct field name for a response key.
pub fn field_name(key: &str) -> String {
    let snake = key.to_snake_case();
    if snake.is_empty() || snake.starts_with(|c: char| c.is_ascii_digit()) {
        format!("field_{}", snake)
    } else {
        snake
    }
}

/// Type or variant name for a GraphQL name.
pub fn type_name(name: &str) -> String {
    let camel = name.to_upper_camel_case();
    if camel.is_empty() || camel.starts_with(|c: char| c.is_ascii_digit()) {
        format!("T{}", camel)
    } else {
        camel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_ident_keywords() {
        assert_eq!(safe_ident("type"), "r#type");
        assert_eq!(safe_ident("match"), "r#match");
        assert_eq!(safe_ident("async"), "r#async");
        assert_eq!(safe_ident("self"), "self_");
        assert_eq!(safe_ident("Self"), "Self_");
    }

    #[test]
    fn safe_ident_non_keywords() {
        assert_eq!(safe_ident("name"), "name");
        assert_eq!(safe_ident("user_name"), "user_name");
    }

    #[test]
    fn ident_tokens() {
        assert_eq!(ident("type").to_string(), "r#type");
        assert_eq!(ident("crate").to_string(), "crate_");
        assert_eq!(ident("id").to_string(), "id");
    }

    #[test]
    fn field_and_type_names() {
        assert_eq!(field_name("createdAt"), "created_at");
        assert_eq!(field_name("__typename"), "typename");
        assert_eq!(type_name("IN_PROGRESS"), "InProgress");
        assert_eq!(type_name("User2"), "User2");
        assert_eq!(type_name("1st"), "T1st");
    }

    #[test]
    fn sanitize_bracket_tags() {
        assert_eq!(
            sanitize_doc("[DEPRECATED] Use other field."),
            "`DEPRECATED` Use other field."
        );
        assert_eq!(
            sanitize_doc("See [docs](https://example.com)."),
            "See [docs](<https://example.com>)."
        );
    }

    #[test]
    fn sanitize_bare_urls() {
        assert_eq!(
            sanitize_doc("Docs at https://example.com/x, more"),
            "Docs at <https://example.com/x>, more"
        );
        assert_eq!(
            sanitize_doc("Already <https://example.com>"),
            "Already <https://example.com>"
        );
    }

    #[test]
    fn doc_tokens_per_line() {
        let tokens = doc_comment_tokens(Some("First.\nSecond.")).to_string();
        assert!(tokens.contains("\" First.\""));
        assert!(tokens.contains("\" Second.\""));
        assert!(doc_comment_tokens(None).is_empty());
    }
}
