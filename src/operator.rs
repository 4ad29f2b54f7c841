// Copyright 2016 The Mini Regex Authors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

//! Matching operators.
//!
//! A compiled pattern is a flat sequence of [`Operator`]s. Each one consumes exactly one
//! character per application and carries the bounds on how many times it has to be applied in a
//! row. The backtracking state for an operator lives in the VM, not here, so an operator is plain
//! immutable data once compiled.

use bit_set::BitSet;
use compact_str::CompactString;
use std::fmt;

use crate::utf8util::char_at;

/// The code points stored in the bitmap part of a [`CharSet`].
const ASCII_LIMIT: u32 = 0x80;

/// Predefined character classes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// Any character, newline included (`.`)
    Any,
    /// ASCII digit `0-9` (`\d`)
    Digit,
    /// ASCII word character `[A-Za-z0-9_]` (`\w`)
    Word,
    /// The space character `' '` only (`\s`)
    Space,
}

impl CharClass {
    /// Test a single character against the class.
    #[must_use]
    #[inline]
    pub fn matches(self, c: char) -> bool {
        match self {
            CharClass::Any => true,
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::Word => c.is_ascii_alphanumeric() || c == '_',
            CharClass::Space => c == ' ',
        }
    }

    fn as_pattern(self) -> &'static str {
        match self {
            CharClass::Any => ".",
            CharClass::Digit => "\\d",
            CharClass::Word => "\\w",
            CharClass::Space => "\\s",
        }
    }
}

/// A set of characters, as written between brackets.
///
/// The source text is kept verbatim. Membership is precomputed into a bitmap for ASCII and a
/// list of intervals for everything above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet {
    source: CompactString,
    ascii: BitSet,
    ranges: Vec<(char, char)>,
}

impl CharSet {
    /// Build a set from bracket contents, reading `c1-c2` as every code point from `c1` to `c2`
    /// inclusive. A `-` at either edge is an ordinary member.
    ///
    /// ```
    /// # use mini_regex::CharSet;
    /// let set = CharSet::new("a-cx-");
    /// assert!(set.contains('b'));
    /// assert!(set.contains('-'));
    /// assert!(!set.contains('d'));
    /// ```
    #[must_use]
    pub fn new(source: &str) -> CharSet {
        let mut set = CharSet::empty(source);
        let chars: Vec<char> = source.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if i + 2 < chars.len() && chars[i + 1] == '-' {
                set.insert(chars[i], chars[i + 2]);
                i += 3;
            } else {
                set.insert(chars[i], chars[i]);
                i += 1;
            }
        }
        set
    }

    /// Build a set where every character of `source` stands for itself, `-` included.
    #[must_use]
    pub fn literal(source: &str) -> CharSet {
        let mut set = CharSet::empty(source);
        for c in source.chars() {
            set.insert(c, c);
        }
        set
    }

    fn empty(source: &str) -> CharSet {
        CharSet {
            source: CompactString::from(source),
            ascii: BitSet::with_capacity(ASCII_LIMIT as usize),
            ranges: Vec::new(),
        }
    }

    // an inverted interval contributes nothing
    fn insert(&mut self, lo: char, hi: char) {
        if lo > hi {
            return;
        }
        let (lo, hi) = (u32::from(lo), u32::from(hi));
        for cp in lo..=hi.min(ASCII_LIMIT - 1) {
            self.ascii.insert(cp as usize);
        }
        if hi >= ASCII_LIMIT {
            let lo = char::from_u32(lo.max(ASCII_LIMIT)).unwrap_or('\u{80}');
            let hi = char::from_u32(hi).unwrap_or(char::MAX);
            self.ranges.push((lo, hi));
        }
    }

    /// Check whether `c` is a member of the set.
    #[must_use]
    #[inline]
    pub fn contains(&self, c: char) -> bool {
        let cp = u32::from(c);
        if cp < ASCII_LIMIT {
            self.ascii.contains(cp as usize)
        } else {
            self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi)
        }
    }

    /// The bracket contents this set was built from.
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// What a single application of an [`Operator`] tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpKind {
    /// Match exactly this character
    Literal(char),
    /// Match any character of a predefined class
    Class(CharClass),
    /// Match any character of the set (`[...]`)
    Set(CharSet),
    /// Match any character that is not in the set (`[^...]`)
    NegatedSet(CharSet),
}

impl OpKind {
    /// Test a single character.
    #[must_use]
    #[inline]
    pub fn matches(&self, c: char) -> bool {
        match self {
            OpKind::Literal(lit) => *lit == c,
            OpKind::Class(class) => class.matches(c),
            OpKind::Set(set) => set.contains(c),
            OpKind::NegatedSet(set) => !set.contains(c),
        }
    }
}

/// One compiled unit of a pattern: a single-character test plus repetition bounds.
///
/// A freshly constructed operator has to match exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    kind: OpKind,
    lo: usize,
    // usize::MAX is unbounded
    hi: usize,
}

impl Operator {
    /// Create an operator that matches exactly once.
    #[must_use]
    pub fn new(kind: OpKind) -> Operator {
        Operator { kind, lo: 1, hi: 1 }
    }

    /// Operator for a literal character.
    #[must_use]
    pub fn literal(c: char) -> Operator {
        Operator::new(OpKind::Literal(c))
    }

    /// Operator for a predefined character class.
    #[must_use]
    pub fn class(class: CharClass) -> Operator {
        Operator::new(OpKind::Class(class))
    }

    /// Operator for `[source]`, with range shorthand.
    #[must_use]
    pub fn set(source: &str) -> Operator {
        Operator::new(OpKind::Set(CharSet::new(source)))
    }

    /// Operator for `[^source]`. Range shorthand is not applied here: `[^a-c]` excludes `a`,
    /// `-` and `c`.
    #[must_use]
    pub fn negated_set(source: &str) -> Operator {
        Operator::new(OpKind::NegatedSet(CharSet::literal(source)))
    }

    /// Set both bounds at once, `None` as maximum meaning unbounded.
    #[must_use]
    pub fn with_repeat(mut self, lo: usize, hi: Option<usize>) -> Operator {
        self.set_min_repeat(lo);
        self.set_max_repeat(hi);
        self
    }

    /// The character test of this operator.
    #[must_use]
    #[inline]
    pub fn kind(&self) -> &OpKind {
        &self.kind
    }

    /// Minimum number of consecutive applications.
    #[must_use]
    #[inline]
    pub fn min_repeat(&self) -> usize {
        self.lo
    }

    /// Maximum number of consecutive applications, `None` if unbounded.
    #[must_use]
    #[inline]
    pub fn max_repeat(&self) -> Option<usize> {
        if self.hi == usize::MAX {
            None
        } else {
            Some(self.hi)
        }
    }

    /// Set the minimum number of applications.
    #[inline]
    pub fn set_min_repeat(&mut self, n: usize) {
        self.lo = n;
    }

    /// Set the maximum number of applications, `None` for unbounded.
    #[inline]
    pub fn set_max_repeat(&mut self, n: Option<usize>) {
        self.hi = n.unwrap_or(usize::MAX);
    }

    /// Whether `count` applications already reach the maximum.
    #[inline]
    pub(crate) fn is_saturated(&self, count: usize) -> bool {
        count >= self.hi
    }

    /// Try a single application at byte offset `ix` of `s`. On success, returns the offset just
    /// past the consumed character.
    #[must_use]
    #[inline]
    pub fn match_at(&self, s: &str, ix: usize) -> Option<usize> {
        let c = char_at(s, ix)?;
        if self.kind.matches(c) {
            Some(ix + c.len_utf8())
        } else {
            None
        }
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    match c {
        '.' | '\\' | '[' | '*' | '+' | '?' | '{' => write!(f, "\\{c}"),
        _ => write!(f, "{c}"),
    }
}

impl fmt::Display for Operator {
    /// Renders the operator back as pattern text, quantifier included.
    ///
    /// Operators produced by the compiler render to text that compiles back to them. Hand-built
    /// ones may not: a set whose source starts with `^` reads back as a negated set, and a
    /// minimum above the maximum or an open `{m,}` bound is rejected by the compiler.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OpKind::Literal(c) => write_literal(f, *c)?,
            OpKind::Class(class) => f.write_str(class.as_pattern())?,
            OpKind::Set(set) => write!(f, "[{}]", set.as_str())?,
            OpKind::NegatedSet(set) => write!(f, "[^{}]", set.as_str())?,
        }
        match (self.lo, self.max_repeat()) {
            (1, Some(1)) => Ok(()),
            (0, None) => f.write_str("*"),
            (1, None) => f.write_str("+"),
            (0, Some(1)) => f.write_str("?"),
            (lo, None) => write!(f, "{{{lo},}}"),
            (lo, Some(hi)) if lo == hi => write!(f, "{{{lo}}}"),
            (lo, Some(hi)) => write!(f, "{{{lo},{hi}}}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_repeat_is_exactly_once() {
        let op = Operator::literal('a');
        assert_eq!(op.min_repeat(), 1);
        assert_eq!(op.max_repeat(), Some(1));
        assert!(!op.is_saturated(0));
        assert!(op.is_saturated(1));
    }

    #[test]
    fn unbounded_never_saturates() {
        let op = Operator::literal('a').with_repeat(0, None);
        assert_eq!(op.max_repeat(), None);
        assert!(!op.is_saturated(usize::MAX - 1));
    }

    #[test]
    fn literal_consumes_one_char() {
        let op = Operator::literal('b');
        assert_eq!(op.match_at("abc", 1), Some(2));
        assert_eq!(op.match_at("abc", 0), None);
        assert_eq!(op.match_at("abc", 3), None);
    }

    #[test]
    fn any_consumes_whole_codepoint() {
        let op = Operator::class(CharClass::Any);
        assert_eq!(op.match_at("é!", 0), Some(2));
        assert_eq!(op.match_at("\n", 0), Some(1));
        assert_eq!(op.match_at("", 0), None);
    }

    #[test]
    fn classes() {
        for c in '0'..='9' {
            assert!(CharClass::Digit.matches(c));
        }
        assert!(!CharClass::Digit.matches('a'));

        assert!(CharClass::Word.matches('A'));
        assert!(CharClass::Word.matches('z'));
        assert!(CharClass::Word.matches('7'));
        assert!(CharClass::Word.matches('_'));
        assert!(!CharClass::Word.matches(' '));
        assert!(!CharClass::Word.matches('-'));

        assert!(CharClass::Space.matches(' '));
        assert!(!CharClass::Space.matches('\t'));
        assert!(!CharClass::Space.matches('\n'));
    }

    #[test]
    fn set_ranges() {
        let set = CharSet::new("a-c");
        assert!(set.contains('a'));
        assert!(set.contains('b'));
        assert!(set.contains('c'));
        assert!(!set.contains('d'));
        assert!(!set.contains('-'));
    }

    #[test]
    fn set_mixed_members() {
        let set = CharSet::new("xa-c0-9_");
        for c in "xabc0159_".chars() {
            assert!(set.contains(c), "{c}");
        }
        for c in "dz-A ".chars() {
            assert!(!set.contains(c), "{c}");
        }
    }

    #[test]
    fn set_hyphen_at_edges() {
        let set = CharSet::new("-a");
        assert!(set.contains('-'));
        assert!(set.contains('a'));
        let set = CharSet::new("a-");
        assert!(set.contains('-'));
        assert!(set.contains('a'));
        assert!(!set.contains('b'));
    }

    #[test]
    fn set_inverted_range_is_empty() {
        let set = CharSet::new("z-a");
        assert!(!set.contains('a'));
        assert!(!set.contains('m'));
        assert!(!set.contains('z'));
    }

    #[test]
    fn set_range_above_ascii() {
        let set = CharSet::new("~-é");
        assert!(set.contains('~'));
        assert!(set.contains('\u{7f}'));
        assert!(set.contains('\u{80}'));
        assert!(set.contains('é'));
        assert!(!set.contains('ê'));
        assert!(!set.contains('a'));
    }

    #[test]
    fn negated_set_has_no_ranges() {
        let op = Operator::negated_set("a-c");
        assert!(op.kind().matches('d'));
        assert!(op.kind().matches('b'));
        assert!(!op.kind().matches('a'));
        assert!(!op.kind().matches('-'));
        assert!(!op.kind().matches('c'));
    }

    #[test]
    fn display() {
        assert_eq!(Operator::literal('a').to_string(), "a");
        assert_eq!(Operator::literal('.').to_string(), "\\.");
        assert_eq!(Operator::literal('{').to_string(), "\\{");
        assert_eq!(
            Operator::class(CharClass::Digit)
                .with_repeat(2, Some(3))
                .to_string(),
            "\\d{2,3}"
        );
        assert_eq!(
            Operator::set("a-z").with_repeat(1, None).to_string(),
            "[a-z]+"
        );
        assert_eq!(
            Operator::negated_set("xy").with_repeat(0, Some(1)).to_string(),
            "[^xy]?"
        );
        assert_eq!(
            Operator::class(CharClass::Any)
                .with_repeat(0, None)
                .to_string(),
            ".*"
        );
        assert_eq!(
            Operator::literal('a').with_repeat(4, Some(4)).to_string(),
            "a{4}"
        );
        assert_eq!(
            Operator::literal('a').with_repeat(2, None).to_string(),
            "a{2,}"
        );
    }

    #[test]
    fn display_reparses_compiled_operators() {
        use crate::parse::parse;
        for re in &[r"a\.b*", r"[a-c]+\d{2,3}", "[^^x]?", r"\{x{4}\*"] {
            let ops = parse(re, false).unwrap();
            let rendered: String = ops.iter().map(ToString::to_string).collect();
            assert_eq!(parse(&rendered, false).unwrap(), ops, "{re}");
        }
    }

    #[test]
    fn display_of_hand_built_operators() {
        use crate::parse::parse;
        let caret = Operator::set("^a");
        assert_eq!(caret.to_string(), "[^a]");
        assert_eq!(
            parse(&caret.to_string(), false).unwrap(),
            vec![Operator::negated_set("a")]
        );

        let mut inverted = Operator::literal('a').with_repeat(2, Some(2));
        inverted.set_min_repeat(3);
        assert_eq!(inverted.to_string(), "a{3,2}");
        assert!(parse(&inverted.to_string(), false).is_err());
    }
}
