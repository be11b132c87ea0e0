//! Pull the local-storage snapshot out of a legacy HTML export.
//!
//! The old browser app saved its state in a few different ways over time, so
//! three embeddings are recognized, tried in this order:
//!
//! 1. a `<script>` element with any attribute mentioning localStorage, such as
//!    `<script id="localStorage-data" type="application/json">{...}</script>`
//! 2. `const localStorageData = {...};` or `= JSON.parse('...')`
//! 3. a run of `localStorage.setItem('products', '[...]')` calls
//!
//! Every candidate must decode to a JSON object before it is accepted.

use crate::error::AppError;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("valid regex")
});

static ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:[\w$]+\.)*[\w$]*localstorage[\w$]*\s*=\s*").expect("valid regex")
});

static SET_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)localStorage\.setItem\(\s*(?:'([^']*)'|"([^"]*)")\s*,\s*"#)
        .expect("valid regex")
});

/// Return the JSON text of the local-storage snapshot embedded in `html`.
pub fn extract_localstorage_from_html(html: &str) -> Result<String, AppError> {
    if let Some(json) = from_script_tag(html) {
        log::debug!("localStorage payload found in <script> element");
        return Ok(json);
    }
    if let Some(json) = from_assignment(html) {
        log::debug!("localStorage payload found in variable assignment");
        return Ok(json);
    }
    if let Some(json) = from_set_item_calls(html) {
        log::debug!("localStorage payload rebuilt from setItem calls");
        return Ok(json);
    }
    Err(AppError::LocalStorageNotFound)
}

fn from_script_tag(html: &str) -> Option<String> {
    SCRIPT_RE.captures_iter(html).find_map(|caps| {
        let attrs = caps.get(1)?.as_str().to_ascii_lowercase();
        if !attrs.contains("localstorage") {
            return None;
        }
        let body = caps.get(2)?.as_str().trim();
        is_json_object(body).then(|| body.to_string())
    })
}

fn from_assignment(html: &str) -> Option<String> {
    ASSIGNMENT_RE.find_iter(html).find_map(|m| {
        let rest = &html[m.end()..];
        if rest.starts_with('{') {
            let literal = balanced(rest)?;
            return is_json_object(literal).then(|| literal.to_string());
        }
        let arg = rest.strip_prefix("JSON.parse(")?.trim_start();
        let (text, _) = read_js_string(arg)?;
        is_json_object(&text).then_some(text)
    })
}

fn from_set_item_calls(html: &str) -> Option<String> {
    let mut items = Map::new();
    for caps in SET_ITEM_RE.captures_iter(html) {
        let key = caps.get(1).or_else(|| caps.get(2))?.as_str().to_string();
        let rest = &html[caps.get(0)?.end()..];
        let value = if let Some(arg) = rest.strip_prefix("JSON.stringify(") {
            balanced(arg.trim_start()).and_then(|lit| serde_json::from_str::<Value>(lit).ok())
        } else {
            read_js_string(rest).map(|(text, _)| Value::String(text))
        };
        match value {
            Some(v) => {
                items.insert(key, v);
            }
            None => log::debug!("Skipping unreadable setItem value for key '{}'", key),
        }
    }
    if items.is_empty() {
        return None;
    }
    Some(Value::Object(items).to_string())
}

fn is_json_object(text: &str) -> bool {
    matches!(serde_json::from_str::<Value>(text), Ok(Value::Object(_)))
}

/// The balanced `{...}` / `[...]` literal at the start of `s`, skipping string contents.
fn balanced(s: &str) -> Option<&str> {
    if !matches!(s.chars().next(), Some('{') | Some('[')) {
        return None;
    }
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decode the JavaScript string literal at the start of `s`.
/// Returns the decoded text and the remainder after the closing quote.
fn read_js_string(s: &str) -> Option<(String, &str)> {
    let mut chars = s.char_indices();
    let (_, quote) = chars.next()?;
    if !matches!(quote, '"' | '\'' | '`') {
        return None;
    }
    let mut out = String::new();
    while let Some((i, c)) = chars.next() {
        if c == quote {
            return Some((out, &s[i + c.len_utf8()..]));
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        let (_, esc) = chars.next()?;
        match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            '0' => out.push('\0'),
            '\n' => {}
            'x' => {
                let hex: String = chars.by_ref().take(2).map(|(_, h)| h).collect();
                out.push(char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?);
            }
            'u' => {
                let hex: String = chars.by_ref().take(4).map(|(_, h)| h).collect();
                let unit = u32::from_str_radix(&hex, 16).ok()?;
                if (0xD800..0xDC00).contains(&unit) {
                    // High surrogate: expect `\uXXXX` low half right after.
                    let tail: String = chars.by_ref().take(6).map(|(_, h)| h).collect();
                    let low = tail
                        .strip_prefix("\\u")
                        .and_then(|h| u32::from_str_radix(h, 16).ok())?;
                    let code = 0x10000 + ((unit - 0xD800) << 10) + (low.checked_sub(0xDC00)?);
                    out.push(char::from_u32(code)?);
                } else {
                    out.push(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
            }
            other => out.push(other),
        }
    }
    None
}
