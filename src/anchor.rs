//! Style anchors: quoted placeholder literals standing in for a module's style
//! value between transform and final emission.
//!
//! An anchor carries exactly one datum, the origin module id:
//! `"ANCHOR:BEGIN<origin>ANCHOR:END"`.

use lazy_static::lazy_static;
use regex::Regex;
use std::ops::Range;

use crate::error::{HoistError, HoistResult};

pub const ANCHOR_BEGIN: &str = "ANCHOR:BEGIN";
pub const ANCHOR_END: &str = "ANCHOR:END";

lazy_static! {
    /// Double- or single-quoted anchor literal. Minifiers may requote strings.
    static ref ANCHOR_RE: Regex =
        Regex::new(r#""ANCHOR:BEGIN(?:.*?)ANCHOR:END"|'ANCHOR:BEGIN(?:.*?)ANCHOR:END'"#).unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    origin: String,
}

impl Anchor {
    pub fn new(origin: &str) -> Self {
        Anchor {
            origin: origin.to_string(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The anchor as a JSON-quoted string literal, safe to splice into code.
    pub fn literal(&self) -> String {
        json_quote(&format!("{}{}{}", ANCHOR_BEGIN, self.origin, ANCHOR_END))
    }
}

/// An anchor literal located in emitted code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorMatch {
    /// Byte range of the whole quoted literal, quotes included.
    pub range: Range<usize>,
    pub anchor: Anchor,
}

/// Every anchor literal in `code`, in source order.
pub fn find_anchors(code: &str, file: &str) -> HoistResult<Vec<AnchorMatch>> {
    ANCHOR_RE
        .find_iter(code)
        .map(|m| {
            let literal = m.as_str();
            let origin = decode_literal(literal).ok_or_else(|| HoistError::MalformedAnchor {
                file: file.to_string(),
                literal: literal.to_string(),
            })?;
            Ok(AnchorMatch {
                range: m.range(),
                anchor: Anchor { origin },
            })
        })
        .collect()
}

pub fn json_quote(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

/// `text` escaped for the inside of a double-quoted literal, without quotes.
pub fn json_inner(text: &str) -> String {
    let quoted = json_quote(text);
    quoted[1..quoted.len() - 1].to_string()
}

fn decode_literal(literal: &str) -> Option<String> {
    let text = unescape_js(&literal[1..literal.len() - 1])?;
    text.strip_prefix(ANCHOR_BEGIN)?
        .strip_suffix(ANCHOR_END)
        .map(str::to_string)
}

/// Unescape the body of a JS string literal of either quote style.
/// Decodes to UTF-16 first so `\uD83D\uDE00` pairs join up.
fn unescape_js(inner: &str) -> Option<String> {
    let mut units: Vec<u16> = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    let mut buf = [0u16; 2];

    while let Some(c) = chars.next() {
        if c != '\\' {
            units.extend_from_slice(c.encode_utf16(&mut buf));
            continue;
        }
        let decoded = match chars.next()? {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0' => '\0',
            'x' => char::from_u32(take_hex(&mut chars, 2)?)?,
            'u' if chars.peek() == Some(&'{') => {
                chars.next();
                let mut code = 0u32;
                loop {
                    let d = chars.next()?;
                    if d == '}' {
                        break;
                    }
                    code = code.checked_mul(16)?.checked_add(d.to_digit(16)?)?;
                }
                char::from_u32(code)?
            }
            'u' => {
                // May be half of a surrogate pair; keep the raw unit.
                units.push(u16::try_from(take_hex(&mut chars, 4)?).ok()?);
                continue;
            }
            // Line continuation.
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                continue;
            }
            '\n' | '\u{2028}' | '\u{2029}' => continue,
            other => other,
        };
        units.extend_from_slice(decoded.encode_utf16(&mut buf));
    }

    String::from_utf16(&units).ok()
}

fn take_hex(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, digits: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}
