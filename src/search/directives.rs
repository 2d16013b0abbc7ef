//! Search directives - accent removal / equivalence settings / 搜索指令解析
//!
//! Directive syntax (whitespace separated) / 指令语法：
//! - `X>Y`: X and Y are interchangeable (symmetric) / 互换字符
//! - `\uXXXX`: ignore one code point / 忽略单个码点
//! - `\uXXXX-\uYYYY`: ignore an inclusive code point range / 忽略码点区间

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

static SUBSTITUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\S)>(\S)").expect("static regex"));

/// `\u` followed by anything up to the next whitespace, validated by hand
static ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\u[^\s>]*").expect("static regex"));

static RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\\u([0-9A-Fa-f]{4})(?:-\\u([0-9A-Fa-f]{4}))?$").expect("static regex")
});

/// Parsed search directives / 已解析的搜索指令
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDirectives {
    /// Characters to ignore while matching / 匹配时忽略的字符
    pub ignore: String,
    /// Each character with the characters it may be replaced by, in first-seen order
    pub substitute: Vec<(char, String)>,
}

impl SearchDirectives {
    /// Parse a directive string, failing on the first malformed escape / 解析指令
    pub fn parse(text: &str) -> Result<Self> {
        let mut directives = Self::default();

        for caps in SUBSTITUTE.captures_iter(text) {
            let (Some(a), Some(b)) = (caps[1].chars().next(), caps[2].chars().next()) else {
                continue;
            };
            directives.add_substitute(a, b);
            directives.add_substitute(b, a);
        }

        for m in ESCAPE.find_iter(text) {
            directives.add_ignored(m.as_str())?;
        }

        Ok(directives)
    }

    /// Equivalence classes for the pattern builder: each char followed by its partners
    pub fn equivalent(&self) -> Vec<String> {
        self.substitute
            .iter()
            .map(|(c, partners)| {
                let mut class = c.to_string();
                class.push_str(partners);
                class
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ignore.is_empty() && self.substitute.is_empty()
    }

    fn add_substitute(&mut self, from: char, to: char) {
        match self.substitute.iter_mut().find(|(c, _)| *c == from) {
            Some((_, partners)) => {
                if !partners.contains(to) {
                    partners.push(to);
                }
            }
            None => self.substitute.push((from, to.to_string())),
        }
    }

    fn add_ignored(&mut self, directive: &str) -> Result<()> {
        let caps = RANGE
            .captures(directive)
            .ok_or_else(|| SearchError::directive(directive, "expected \\uXXXX or \\uXXXX-\\uYYYY"))?;

        let start = hex_code_point(directive, &caps[1])?;
        let end = match caps.get(2) {
            Some(m) => hex_code_point(directive, m.as_str())?,
            None => start,
        };
        if end < start {
            return Err(SearchError::directive(directive, "range end is before range start"));
        }

        for code in start..=end {
            // Surrogates inside a range are skipped, not fatal
            if let Some(c) = char::from_u32(code) {
                if !self.ignore.contains(c) {
                    self.ignore.push(c);
                }
            }
        }
        Ok(())
    }
}

fn hex_code_point(directive: &str, hex: &str) -> Result<u32> {
    let code = u32::from_str_radix(hex, 16)
        .map_err(|e| SearchError::directive(directive, e.to_string()))?;
    if char::from_u32(code).is_none() {
        return Err(SearchError::directive(directive, format!("U+{:04X} is not a scalar value", code)));
    }
    Ok(code)
}
