//! Pattern builder - compiles a search word into a match pattern / 模式构建器
//!
//! A word becomes an ordered list of groups, one per code point. Each group is an
//! alternation of interchangeable characters. An optional "ignore" group may occur
//! any number of times around and between the mandatory groups. The structure is
//! kept in memory and serialized once, so escaping is applied exactly once.
//!
//! Two dialects are rendered / 输出两种方言：
//! - `Flavor::Ecma`: sent to the document store as a server-side filter
//! - `Flavor::Rust`: compiled locally with the `regex` crate

use std::fmt;

use regex::Regex;

use super::tokenizer::tokenize;
use crate::error::Result;

/// Characters with special meaning in a pattern / 需要转义的元字符
const RESERVED: &[char] = &[
    '$', '*', '.', '?', '+', '[', ']', '^', '&', '{', '}', '!', '<', '>', '|', '-', '\\', '(', ')',
];

/// Whether `c` is escaped in rendered patterns / 是否为保留字符
pub fn is_reserved(c: char) -> bool {
    RESERVED.contains(&c)
}

/// Target regex dialect / 目标正则方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flavor {
    /// Store dialect, every reserved character is backslash-escaped / 存储端方言
    #[default]
    Ecma,
    /// `regex` crate dialect; `\<` and `\>` are word boundaries there, so `<` and `>` stay bare
    Rust,
}

impl Flavor {
    fn escapes(self, c: char) -> bool {
        match self {
            Flavor::Ecma => is_reserved(c),
            Flavor::Rust => is_reserved(c) && !matches!(c, '<' | '>'),
        }
    }
}

/// One literal unit of a pattern / 模式中的单个字面量
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexToken {
    text: String,
}

impl RegexToken {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the token is exactly the character `c`
    pub fn is_char(&self, c: char) -> bool {
        let mut chars = tokenize(&self.text);
        chars.next() == Some(c) && chars.next().is_none()
    }

    pub fn write(&self, out: &mut String, flavor: Flavor) {
        for c in tokenize(&self.text) {
            if flavor.escapes(c) {
                out.push('\\');
            }
            out.push(c);
        }
    }
}

impl From<char> for RegexToken {
    fn from(c: char) -> Self {
        Self { text: c.to_string() }
    }
}

impl fmt::Display for RegexToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(self.text.len() * 2);
        self.write(&mut out, Flavor::Ecma);
        f.write_str(&out)
    }
}

/// Interchangeable tokens at one position / 同一位置可互换的字符组
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegexGroup {
    tokens: Vec<RegexToken>,
}

impl RegexGroup {
    pub fn new(tokens: Vec<RegexToken>) -> Self {
        Self { tokens }
    }

    /// Build a group from characters, dropping duplicates but keeping first-seen order
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Self {
        let mut group = Self::default();
        for c in chars {
            if !group.contains(c) {
                group.tokens.push(RegexToken::from(c));
            }
        }
        group
    }

    pub fn tokens(&self) -> &[RegexToken] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        self.tokens.iter().any(|t| t.is_char(c))
    }

    /// Renders as a non-capturing alternation so a quantifier can follow it
    pub fn write(&self, out: &mut String, flavor: Flavor) {
        out.push_str("(?:");
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                out.push('|');
            }
            token.write(out, flavor);
        }
        out.push(')');
    }

    pub fn render(&self, flavor: Flavor) -> String {
        let mut out = String::new();
        self.write(&mut out, flavor);
        out
    }
}

impl From<char> for RegexGroup {
    fn from(c: char) -> Self {
        Self::new(vec![RegexToken::from(c)])
    }
}

impl fmt::Display for RegexGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Flavor::Ecma))
    }
}

/// Compiled pattern for one search word / 单个搜索词的完整模式
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegexString {
    groups: Vec<RegexGroup>,
    ignore: Option<RegexGroup>,
    capture: bool,
    whole_line: bool,
}

impl RegexString {
    pub fn new(groups: Vec<RegexGroup>) -> Self {
        Self {
            groups,
            ..Self::default()
        }
    }

    /// Characters allowed zero or more times around every mandatory group.
    /// An empty group clears the setting.
    pub fn ignore(mut self, group: RegexGroup) -> Self {
        self.ignore = (!group.is_empty()).then_some(group);
        self
    }

    /// Wrap the whole match in a capture group (group 1 == group 0)
    pub fn capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    /// Anchor to the entire input / 整行匹配
    pub fn whole_line(mut self, whole_line: bool) -> Self {
        self.whole_line = whole_line;
        self
    }

    pub fn groups(&self) -> &[RegexGroup] {
        &self.groups
    }

    pub fn render(&self, flavor: Flavor) -> String {
        let mut out = String::new();
        if self.whole_line {
            out.push('^');
        }
        if self.capture {
            out.push('(');
        }
        self.write_ignore(&mut out, flavor);
        for group in &self.groups {
            group.write(&mut out, flavor);
            self.write_ignore(&mut out, flavor);
        }
        if self.capture {
            out.push(')');
        }
        if self.whole_line {
            out.push('$');
        }
        out
    }

    /// Compile for local matching / 编译为本地正则
    pub fn compile(&self) -> Result<Regex> {
        Ok(Regex::new(&self.render(Flavor::Rust))?)
    }

    fn write_ignore(&self, out: &mut String, flavor: Flavor) {
        if let Some(ignore) = &self.ignore {
            ignore.write(out, flavor);
            out.push('*');
        }
    }
}

impl fmt::Display for RegexString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Flavor::Ecma))
    }
}

/// Options for `make_regex` / 模式构建选项
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegexOptions {
    /// Equivalence classes, characters in one string are interchangeable
    pub equivalent: Vec<String>,
    /// Characters that may appear anywhere without affecting the match
    pub ignore: String,
    pub whole_line: bool,
    pub capture: bool,
}

/// Return the first group containing `c` / 查找包含字符的组
pub fn group_for(c: char, groups: &[RegexGroup]) -> Option<&RegexGroup> {
    groups.iter().find(|g| g.contains(c))
}

/// One group per character of `text`, merged with its equivalence class / 生成字符组
pub fn make_groups(text: &str, equivalent: &[String]) -> Vec<RegexGroup> {
    let classes = class_groups(equivalent);
    groups_of(tokenize(text), &classes)
}

fn class_groups(equivalent: &[String]) -> Vec<RegexGroup> {
    equivalent
        .iter()
        .map(|class| RegexGroup::from_chars(tokenize(class)))
        .filter(|g| !g.is_empty())
        .collect()
}

/// The class led by `c`, falling back to the first class containing it.
/// Directive classes are `char + partners`, so the leading one is the char's own.
fn class_for(c: char, classes: &[RegexGroup]) -> Option<&RegexGroup> {
    classes
        .iter()
        .find(|g| g.tokens().first().is_some_and(|t| t.is_char(c)))
        .or_else(|| group_for(c, classes))
}

fn groups_of(chars: impl Iterator<Item = char>, classes: &[RegexGroup]) -> Vec<RegexGroup> {
    chars
        .map(|c| {
            class_for(c, classes)
                .cloned()
                .unwrap_or_else(|| RegexGroup::from(c))
        })
        .collect()
}

/// Build the pattern structure for `phrase` / 构建模式结构
///
/// Ignored characters are dropped from the phrase unless they belong to an
/// equivalence class, in which case the position stays mandatory and only the
/// ignored character itself becomes skippable elsewhere.
pub fn make_regex_string(phrase: &str, options: &RegexOptions) -> RegexString {
    let classes = class_groups(&options.equivalent);
    let mandatory = tokenize(phrase)
        .filter(|&c| !options.ignore.contains(c) || group_for(c, &classes).is_some());

    RegexString::new(groups_of(mandatory, &classes))
        .ignore(RegexGroup::from_chars(tokenize(&options.ignore)))
        .capture(options.capture)
        .whole_line(options.whole_line)
}

/// Pattern text in the store dialect / 存储端模式文本
pub fn make_regex_pattern(phrase: &str, options: &RegexOptions) -> String {
    make_regex_string(phrase, options).render(Flavor::Ecma)
}

/// Compiled local regex / 本地正则
pub fn make_regex(phrase: &str, options: &RegexOptions) -> Result<Regex> {
    make_regex_string(phrase, options).compile()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(classes: &[&str]) -> Vec<String> {
        classes.iter().map(|s| s.to_string()).collect()
    }

    fn rust_regex(pattern: String) -> Regex {
        Regex::new(&pattern).unwrap()
    }

    fn first_match<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
        re.find(text).map(|m| m.as_str())
    }

    #[test]
    fn test_token_escapes_reserved() {
        for c in "$*.?+[]^&{}!<>|-\\()".chars() {
            assert_eq!(RegexToken::from(c).to_string(), format!("\\{}", c));
        }
    }

    #[test]
    fn test_token_keeps_alphanumeric() {
        let raw = "abcdefghijklmnopqrstuvwxyz1234567890";
        for c in raw.chars().chain(raw.to_uppercase().chars()) {
            assert_eq!(RegexToken::from(c).to_string(), c.to_string());
        }
    }

    #[test]
    fn test_token_keeps_non_latin() {
        for c in "ñçαβγשלוםпривет中文𝟘".chars() {
            assert_eq!(RegexToken::from(c).to_string(), c.to_string());
        }
    }

    #[test]
    fn test_token_rust_flavor_leaves_angle_brackets() {
        let mut out = String::new();
        RegexToken::new("<a>").write(&mut out, Flavor::Rust);
        assert_eq!(out, "<a>");
    }

    #[test]
    fn test_group_matches_single_token() {
        let group = RegexGroup::new(vec![RegexToken::from('w')]);
        let re = rust_regex(group.render(Flavor::Rust));
        assert_eq!(first_match(&re, "Hello world!!"), Some("w"));
    }

    #[test]
    fn test_group_matches_any_token() {
        let group = RegexGroup::from_chars(['h', 'd']);
        let re = rust_regex(group.render(Flavor::Rust));
        assert!(re.is_match("hello"));
        assert!(re.is_match("world"));
    }

    #[test]
    fn test_group_matches_astral_char() {
        let group = RegexGroup::from_chars(['𝟚', 'a']);
        let re = rust_regex(group.render(Flavor::Rust));
        assert_eq!(first_match(&re, "𝟘𝟙𝟚𝟛"), Some("𝟚"));
    }

    #[test]
    fn test_group_multi_character_token() {
        let group = RegexGroup::new(vec![RegexToken::new("world")]);
        let re = rust_regex(group.render(Flavor::Rust));
        assert_eq!(first_match(&re, "Hello world!!!"), Some("world"));
    }

    #[test]
    fn test_group_concatenation() {
        let g1 = RegexGroup::from_chars(['a', 'b']);
        let g2 = RegexGroup::from_chars(['x', 'y']);
        let re = rust_regex(g1.render(Flavor::Rust) + &g2.render(Flavor::Rust));
        assert_eq!(first_match(&re, "Fine by me"), Some("by"));
    }

    #[test]
    fn test_group_star_operator() {
        let group = RegexGroup::from_chars(['a', 'b']);
        let re = rust_regex(format!("x{}*y", group.render(Flavor::Rust)));
        assert_eq!(first_match(&re, "txaabbabaysno"), Some("xaabbabay"));
    }

    fn abc_groups() -> Vec<RegexGroup> {
        vec![
            RegexGroup::from('a'),
            RegexGroup::from('b'),
            RegexGroup::from_chars(['c', 'ç']),
        ]
    }

    #[test]
    fn test_string_matches_groups() {
        let re = RegexString::new(abc_groups()).compile().unwrap();
        assert_eq!(first_match(&re, "Hello abçdef world"), Some("abç"));
    }

    #[test]
    fn test_string_capture() {
        let re = RegexString::new(abc_groups()).capture(true).compile().unwrap();
        let caps = re.captures("Hello abçd world").unwrap();
        assert_eq!(&caps[0], "abç");
        assert_eq!(&caps[1], "abç");
    }

    #[test]
    fn test_string_ignore() {
        let re = RegexString::new(abc_groups())
            .ignore(RegexGroup::from_chars(['x', 'y']))
            .compile()
            .unwrap();
        assert_eq!(first_match(&re, "Hello xyaxyxbçyd world"), Some("xyaxyxbçy"));
    }

    #[test]
    fn test_string_capture_with_ignore() {
        let re = RegexString::new(abc_groups())
            .ignore(RegexGroup::from_chars(['x', 'y']))
            .capture(true)
            .compile()
            .unwrap();
        let caps = re.captures("Hello xyaxyxbçyd world").unwrap();
        assert_eq!(&caps[0], "xyaxyxbçy");
        assert_eq!(&caps[1], "xyaxyxbçy");
    }

    #[test]
    fn test_string_empty_ignore_is_dropped() {
        let plain = RegexString::new(abc_groups());
        let with_empty = RegexString::new(abc_groups()).ignore(RegexGroup::default());
        assert_eq!(plain.to_string(), with_empty.to_string());
    }

    #[test]
    fn test_group_for() {
        let groups = vec![
            RegexGroup::from_chars(['a', 'å']),
            RegexGroup::from('b'),
            RegexGroup::from_chars(['c', 'ç']),
        ];
        assert_eq!(group_for('ç', &groups), Some(&groups[2]));
        assert_eq!(group_for('z', &groups), None);
    }

    #[test]
    fn test_make_groups_default() {
        let expected = vec![RegexGroup::from('a'), RegexGroup::from('b'), RegexGroup::from('ç')];
        assert_eq!(make_groups("abç", &[]), expected);
    }

    #[test]
    fn test_make_groups_with_equivalents() {
        let expected = vec![
            RegexGroup::from_chars(['a', 'å', 'á']),
            RegexGroup::from('b'),
            RegexGroup::from_chars(['c', 'ç']),
        ];
        assert_eq!(make_groups("abç", &owned(&["aåá", "cç"])), expected);
    }

    #[test]
    fn test_make_groups_prefers_own_class() {
        // a>b b>c as emitted by the directive parser
        let classes = owned(&["ab", "bac", "cb"]);
        assert_eq!(make_groups("a", &classes), vec![RegexGroup::from_chars(['a', 'b'])]);
        assert_eq!(make_groups("b", &classes), vec![RegexGroup::from_chars(['b', 'a', 'c'])]);
        assert_eq!(make_groups("c", &classes), vec![RegexGroup::from_chars(['c', 'b'])]);
    }

    #[test]
    fn test_chained_equivalents_stay_pairwise() {
        let options = RegexOptions {
            equivalent: owned(&["ab", "bac", "cb"]),
            ..Default::default()
        };
        let b = make_regex("b", &options).unwrap();
        assert!(b.is_match("a") && b.is_match("c"));
        let c = make_regex("c", &options).unwrap();
        assert!(c.is_match("b"));
        assert!(!c.is_match("a"));
        let a = make_regex("a", &options).unwrap();
        assert!(!a.is_match("c"));
    }

    #[test]
    fn test_make_groups_repeats_positions() {
        assert_eq!(make_groups("hello", &[]).len(), 5);
    }

    #[test]
    fn test_make_regex_basic() {
        let re = make_regex("def", &RegexOptions::default()).unwrap();
        assert_eq!(first_match(&re, "abcdefghij"), Some("def"));
    }

    #[test]
    fn test_make_regex_equivalent_and_ignore() {
        let options = RegexOptions {
            equivalent: owned(&["hy"]),
            ignore: "w".to_string(),
            ..Default::default()
        };
        let re = make_regex("hello", &options).unwrap();
        assert_eq!(first_match(&re, "yellow"), Some("yellow"));
    }

    #[test]
    fn test_make_regex_ignored_chars_in_phrase() {
        let options = RegexOptions {
            ignore: "i".to_string(),
            ..Default::default()
        };
        let re = make_regex("Daviid", &options).unwrap();
        assert_eq!(first_match(&re, "Hello, David"), Some("David"));
    }

    #[test]
    fn test_make_regex_capture() {
        let options = RegexOptions {
            capture: true,
            ..Default::default()
        };
        let re = make_regex("am", &options).unwrap();
        let caps = re.captures("am").unwrap();
        assert_eq!(&caps[0], "am");
        assert_eq!(&caps[1], "am");
    }

    #[test]
    fn test_make_regex_whole_line() {
        let options = RegexOptions {
            whole_line: true,
            ..Default::default()
        };
        let re = make_regex("am", &options).unwrap();
        assert!(re.is_match("am"));
        assert!(!re.is_match("ham"));
    }

    fn ignore_a_equivalent_ab() -> RegexOptions {
        RegexOptions {
            ignore: "a".to_string(),
            equivalent: owned(&["ab"]),
            ..Default::default()
        }
    }

    #[test]
    fn test_ignored_equivalent_matches_atom() {
        let re = make_regex("tom", &ignore_a_equivalent_ab()).unwrap();
        assert_eq!(first_match(&re, "atom"), Some("atom"));
    }

    #[test]
    fn test_ignored_equivalent_does_not_skip_partner() {
        let re = make_regex("tom", &ignore_a_equivalent_ab()).unwrap();
        assert_eq!(first_match(&re, "btom"), Some("tom"));
    }

    #[test]
    fn test_ignored_equivalent_bxy_finds_axy() {
        let re = make_regex("bxy", &ignore_a_equivalent_ab()).unwrap();
        assert_eq!(first_match(&re, "axy"), Some("axy"));
    }

    #[test]
    fn test_ignored_equivalent_axy_finds_bxy() {
        let re = make_regex("axy", &ignore_a_equivalent_ab()).unwrap();
        assert_eq!(first_match(&re, "bxy"), Some("bxy"));
    }

    #[test]
    fn test_make_regex_pattern_escapes_once() {
        let pattern = make_regex_pattern("a.b", &RegexOptions::default());
        assert_eq!(pattern, "(?:a)(?:\\.)(?:b)");
    }

    #[test]
    fn test_make_regex_pattern_layout() {
        let options = RegexOptions {
            ignore: "x".to_string(),
            whole_line: true,
            capture: true,
            ..Default::default()
        };
        assert_eq!(
            make_regex_pattern("ab", &options),
            "^((?:x)*(?:a)(?:x)*(?:b)(?:x)*)$"
        );
    }

    #[test]
    fn test_make_regex_reserved_phrase_is_literal() {
        let phrase = "$*.?+[]^&{}!<>|-\\()";
        let re = make_regex(phrase, &RegexOptions::default()).unwrap();
        assert_eq!(first_match(&re, &format!("xx{}yy", phrase)), Some(phrase));
        assert!(!re.is_match("abc"));
    }

    #[test]
    fn test_make_regex_parentheses_are_literal() {
        let re = make_regex("f(x)", &RegexOptions::default()).unwrap();
        assert!(re.is_match("call f(x) now"));
        assert!(!re.is_match("fx"));
    }

    #[test]
    fn test_ecma_pattern_escapes_angle_brackets() {
        let pattern = make_regex_pattern("<", &RegexOptions::default());
        assert_eq!(pattern, "(?:\\<)");
    }
}
