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

/*!
A small backtracking regex engine.

A pattern compiles to a flat sequence of operators. Each operator matches a single character (a
literal, a class such as `\d`, or a bracketed set) and may be repeated with a quantifier. There is
no grouping, no alternation and no anchors: the engine searches for the leftmost position where
the whole sequence matches, taking as many repetitions of every operator as still allows the rest
of the pattern to match.

Matching uses plain backtracking, which means a regex can take exponential time on unlucky input
because of what is called "catastrophic backtracking". See
[`RegexBuilder::backtrack_limit()`] for a way to bound it.

# Usage

## Example: Finding the position of matches

```rust
use mini_regex::Regex;

let re = Regex::new(r"\d{2,3}").unwrap();
let m = re.find("x999x").unwrap().expect("found a match");

assert_eq!(m.start(), 1);
assert_eq!(m.end(), 4);
assert_eq!(m.as_str(), "999");
```

## Example: Matching the whole text

[`Regex::is_full_match()`] only succeeds when the leftmost match covers the entire input:

```rust
use mini_regex::Regex;

let re = Regex::new("a*ab").unwrap();
assert!(re.is_full_match("aaab").unwrap());
assert!(!re.is_full_match("aaabc").unwrap());
```

# Syntax

`x`
: the literal character `x` \
`.`
: any character, newline included \
`\d`
: digit (`[0-9]`) \
`\w`
: word character (`[A-Za-z0-9_]`) \
`\s`
: the space character (`' '` only) \
`\.`, `\\`, `\[`, `\*`, ...
: the escaped metacharacter itself \
`[abc]`, `[a-z]`
: any character in the set; `a-z` is a code point range \
`[^abc]`
: any character not in the set; no ranges, `-` is a plain member

Quantifiers, directly after an atom:

`x*`
: zero or more \
`x+`
: one or more \
`x?`
: zero or one \
`x{m}`
: exactly *m* \
`x{m,n}`
: at least *m* and at most *n*

Bracket contents are taken verbatim up to the first `]`; there are no escapes inside a set.
*/

#![doc(html_root_url = "https://docs.rs/mini-regex/0.1.0")]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

use regex_automata::util::pool::Pool;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::Range;
use std::panic::{RefUnwindSafe, UnwindSafe};
use std::str::FromStr;
use std::sync::Arc;
use vm::{Machine, Prog, Session, DEFAULT_BACKTRACK_LIMIT};

mod error;
mod operator;
mod parse;
mod utf8util;
mod vm;

use crate::utf8util::next_codepoint_ix;

pub use crate::error::{Error, ParseError, Result, RuntimeError};
pub use crate::operator::{CharClass, CharSet, OpKind, Operator};

type SessionPool =
    Pool<Session, Box<dyn Fn() -> Session + Send + Sync + UnwindSafe + RefUnwindSafe>>;

// the public API

/// A compiled regular expression.
///
/// The compiled operators are shared and never mutated while matching; each search borrows its
/// own scratch state from an internal pool, so a `Regex` can be used from several threads at once.
#[derive(Debug)]
pub struct Regex {
    pattern: Option<Arc<String>>,
    machine: Machine,
    session: SessionPool,
}

impl Regex {
    /// Parse and compile a regex with default options, see [`RegexBuilder`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error::ParseError`] if the pattern could not be parsed.
    #[inline]
    pub fn new(re: impl Into<String>) -> Result<Regex> {
        RegexBuilder::new().build(re)
    }

    fn new_with_source_and_options(source: RegexSource, options: RegexOptions) -> Result<Regex> {
        let (ops, pattern) = match source {
            RegexSource::Pattern(pattern) => (
                parse::parse(&pattern, options.lenient_repeat)?,
                Some(pattern),
            ),
            RegexSource::Operators(ops) => (ops, None),
        };

        let prog = Arc::new(Prog::new(ops));
        let machine = Machine::new(prog, options.backtrack_limit);

        Ok(Regex {
            pattern: pattern.map(Arc::new),
            machine: machine.clone(),
            session: new_session_pool(machine),
        })
    }

    /// Returns the original pattern string used to create this regex.
    ///
    /// # Panics
    ///
    /// Panics if this regex is created by [`RegexBuilder::build_from_operators()`].
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        self.pattern
            .as_ref()
            .expect("cannot get pattern as this regex is built from operators")
            .as_str()
    }

    /// Returns the compiled operators, in pattern order.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use mini_regex::Regex;
    /// let re = Regex::new("a{2,3}").unwrap();
    /// let op = &re.operators()[0];
    /// assert_eq!(op.min_repeat(), 2);
    /// assert_eq!(op.max_repeat(), Some(3));
    /// ```
    #[must_use]
    #[inline]
    pub fn operators(&self) -> &[Operator] {
        &self.machine.prog.body
    }

    /// Check if the regex matches anywhere in the input text.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use mini_regex::Regex;
    /// let re = Regex::new(r"\d+").unwrap();
    /// assert!(re.is_match("route 66").unwrap());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an [`Error::RuntimeError`] if the backtrack limit was exceeded.
    #[inline]
    pub fn is_match(&self, text: &str) -> Result<bool> {
        Ok(self.find(text)?.is_some())
    }

    /// Check if the leftmost match spans the entire input text.
    ///
    /// Note that this is not the same as asking whether *some* way of matching covers the whole
    /// text: the leftmost match is found first, with every operator as greedy as possible, and
    /// only then compared against the length of `text`.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use mini_regex::Regex;
    /// let re = Regex::new("a{2,3}").unwrap();
    /// assert!(re.is_full_match("aaa").unwrap());
    /// assert!(!re.is_full_match("aaaa").unwrap());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an [`Error::RuntimeError`] if the backtrack limit was exceeded.
    #[inline]
    pub fn is_full_match(&self, text: &str) -> Result<bool> {
        Ok(self
            .find(text)?
            .map_or(false, |m| m.start() == 0 && m.end() == text.len()))
    }

    /// Returns an iterator for each successive non-overlapping match in `text`.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use mini_regex::Regex;
    /// let re = Regex::new(r"\w+").unwrap();
    /// let words: Vec<_> = re
    ///     .find_iter("one two  three")
    ///     .map(|m| m.unwrap().as_str())
    ///     .collect();
    /// assert_eq!(words, ["one", "two", "three"]);
    /// ```
    #[must_use]
    #[inline]
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        Matches {
            re: self,
            text,
            last_end: 0,
            last_match: None,
        }
    }

    /// Find the leftmost match in the input text.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use mini_regex::Regex;
    /// let re = Regex::new("b").unwrap();
    /// assert_eq!(re.find("aabaab").unwrap().unwrap().range(), 2..3);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an [`Error::RuntimeError`] if the backtrack limit was exceeded.
    #[inline]
    pub fn find<'t>(&self, text: &'t str) -> Result<Option<Match<'t>>> {
        self.find_from_pos(text, 0)
    }

    /// Returns the leftmost match in `text` that starts at or after byte position `pos`.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use mini_regex::Regex;
    /// let re = Regex::new(r"\d+").unwrap();
    /// let mat = re.find_from_pos("1 test 123", 1).unwrap().unwrap();
    /// assert_eq!(mat.start(), 7);
    /// assert_eq!(mat.end(), 10);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `pos` is larger than the length of `text`, or if it does not lie on a char
    /// boundary of `text`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::RuntimeError`] if the backtrack limit was exceeded.
    pub fn find_from_pos<'t>(&self, text: &'t str, pos: usize) -> Result<Option<Match<'t>>> {
        let result = self.session.get().run(text, pos)?;
        Ok(result.map(|range| Match {
            text,
            start: range.start,
            end: range.end,
        }))
    }
}

fn new_session_pool(machine: Machine) -> SessionPool {
    Pool::new(Box::new(move || {
        let state = Machine::create_state(&machine.prog);

        machine.clone().create_session(state)
    }))
}

impl Clone for Regex {
    fn clone(&self) -> Self {
        let machine = self.machine.clone();
        Regex {
            pattern: self.pattern.clone(),
            machine: machine.clone(),
            session: new_session_pool(machine),
        }
    }
}

impl fmt::Display for Regex {
    /// Shows the original pattern, or the operators rendered as a pattern if built from operators.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pattern {
            Some(pattern) => f.write_str(pattern),
            None => self.operators().iter().try_for_each(|op| write!(f, "{op}")),
        }
    }
}

impl FromStr for Regex {
    type Err = Error;

    /// Attempts to parse a string into a regular expression
    fn from_str(s: &str) -> Result<Regex> {
        Regex::new(s)
    }
}

#[derive(Clone, Debug)]
enum RegexSource {
    Pattern(String),
    Operators(Vec<Operator>),
}

#[derive(Copy, Clone, Debug)]
struct RegexOptions {
    backtrack_limit: usize,
    lenient_repeat: bool,
}

impl Default for RegexOptions {
    fn default() -> Self {
        RegexOptions {
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
            lenient_repeat: false,
        }
    }
}

/// A builder for a `Regex` to allow configuring options.
#[derive(Debug, Copy, Clone, Default)]
pub struct RegexBuilder(RegexOptions);

impl RegexBuilder {
    /// Create a new regex builder with default options.
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the [`Regex`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error::ParseError`] if the pattern could not be parsed.
    #[inline]
    pub fn build(&self, pattern: impl Into<String>) -> Result<Regex> {
        Regex::new_with_source_and_options(RegexSource::Pattern(pattern.into()), self.0)
    }

    /// Build the [`Regex`] from operators constructed by hand.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use mini_regex::{CharClass, Operator, RegexBuilder};
    /// let re = RegexBuilder::new()
    ///     .build_from_operators(vec![
    ///         Operator::literal('x'),
    ///         Operator::class(CharClass::Digit).with_repeat(1, None),
    ///     ])
    ///     .unwrap();
    /// assert_eq!(re.to_string(), r"x\d+");
    /// assert_eq!(re.find("ax12").unwrap().unwrap().as_str(), "x12");
    /// ```
    ///
    /// # Errors
    ///
    /// Currently never fails; the `Result` mirrors [`RegexBuilder::build()`].
    #[inline]
    pub fn build_from_operators(&self, ops: impl Into<Vec<Operator>>) -> Result<Regex> {
        Regex::new_with_source_and_options(RegexSource::Operators(ops.into()), self.0)
    }

    /// Limit for how many backtracking steps one search may take. Giving back a single repetition
    /// and un-applying an operator count as one step each, summed over every starting position
    /// the search tries. If this limit is exceeded, execution returns an
    /// [`Error::RuntimeError`] with [`RuntimeError::BacktrackLimitExceeded`].
    /// This is for preventing a regex with catastrophic backtracking to run for too long.
    ///
    /// Default is no limit.
    #[inline]
    pub fn backtrack_limit(&mut self, limit: usize) -> &mut Self {
        self.0.backtrack_limit = limit;
        self
    }

    /// Accept a `{` in quantifier position that is not a well-formed `{m}` or `{m,n}`. The
    /// preceding atom then stays unquantified and the `{` is read as a literal character.
    ///
    /// By default this is a [`ParseError::InvalidRepeat`].
    ///
    /// ```rust
    /// # use mini_regex::RegexBuilder;
    /// let re = RegexBuilder::new().lenient_repeat(true).build("a{,}").unwrap();
    /// assert!(re.is_full_match("a{,}").unwrap());
    /// ```
    #[inline]
    pub fn lenient_repeat(&mut self, yes: bool) -> &mut Self {
        self.0.lenient_repeat = yes;
        self
    }
}

/// A single match of a regex in an input text
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Match<'t> {
    text: &'t str,
    start: usize,
    end: usize,
}

impl<'t> Match<'t> {
    /// Returns the starting byte offset of the match in the text.
    #[must_use]
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the ending byte offset of the match in the text.
    #[must_use]
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Returns the range over the starting and ending byte offsets of the match in text.
    #[must_use]
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns the matched text.
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &'t str {
        &self.text[self.start..self.end]
    }

    /// Returns the length, in bytes, of this match.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.range().len()
    }

    /// Returns true if and only if this match has a length of zero.
    ///
    /// Note that an empty match can only occur when every operator of the regex accepts zero
    /// repetitions.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range().is_empty()
    }
}

impl<'t> AsRef<str> for Match<'t> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<'t> From<Match<'t>> for Range<usize> {
    fn from(m: Match<'t>) -> Range<usize> {
        m.range()
    }
}

/// An iterator over all non-overlapping matches for a particular string.
///
/// The iterator yields a `Result<Match>`. The iterator stops when no more
/// matches can be found.
///
/// `'r` is the lifetime of the compiled regular expression and `'t` is the
/// lifetime of the matched string.
#[derive(Debug, Clone)]
pub struct Matches<'r, 't> {
    re: &'r Regex,
    text: &'t str,
    last_end: usize,
    last_match: Option<usize>,
}

impl<'r, 't> Matches<'r, 't> {
    /// Return the text being searched.
    #[must_use]
    #[inline]
    pub fn text(&self) -> &'t str {
        self.text
    }

    /// Return the underlying regex.
    #[must_use]
    #[inline]
    pub fn regex(&self) -> &'r Regex {
        self.re
    }
}

impl<'r, 't> Iterator for Matches<'r, 't> {
    type Item = Result<Match<'t>>;

    /// Calls `find_from_pos` repeatedly. Ignores empty matches immediately after a match.
    fn next(&mut self) -> Option<Self::Item> {
        if self.last_end > self.text.len() {
            return None;
        }

        let mat = match self.re.find_from_pos(self.text, self.last_end) {
            Err(error) => {
                // an error ends the iteration
                self.last_end = self.text.len() + 1;
                return Some(Err(error));
            }
            Ok(None) => return None,
            Ok(Some(mat)) => mat,
        };

        if mat.start == mat.end {
            // This is an empty match. To ensure we make progress, start
            // the next search at the smallest possible starting position
            // of the next match following this one.
            self.last_end = if mat.end < self.text.len() {
                next_codepoint_ix(self.text, mat.end)
            } else {
                self.text.len() + 1
            };
            // Don't accept empty matches immediately following a match.
            // Just move on to the next match.
            if Some(mat.end) == self.last_match {
                return self.next();
            }
        } else {
            self.last_end = mat.end;
        }

        self.last_match = Some(mat.end);

        Some(Ok(mat))
    }
}

impl<'r, 't> FusedIterator for Matches<'r, 't> {}

#[cfg(test)]
mod tests {
    use crate::{CharClass, Error, Operator, Regex, RegexBuilder, RuntimeError};

    #[test]
    fn from_str() {
        let s = r"a+[b-d]\d{2}";
        let regex = s.parse::<Regex>().unwrap();
        assert_eq!(regex.as_str(), s);
        assert_eq!(regex.to_string(), s);
    }

    #[test]
    fn display_from_operators() {
        let re = RegexBuilder::new()
            .build_from_operators(vec![
                Operator::set("a-c").with_repeat(0, None),
                Operator::literal('.'),
                Operator::class(CharClass::Word).with_repeat(2, Some(2)),
            ])
            .unwrap();
        assert_eq!(re.to_string(), r"[a-c]*\.\w{2}");
    }

    #[test]
    #[should_panic(expected = "built from operators")]
    fn as_str_from_operators() {
        let re = RegexBuilder::new()
            .build_from_operators(vec![Operator::literal('a')])
            .unwrap();
        let _ = re.as_str();
    }

    #[test]
    fn clone_matches_independently() {
        let re = Regex::new("a+b").unwrap();
        let cloned = re.clone();
        drop(re);
        assert_eq!(cloned.find("xaab").unwrap().unwrap().range(), 1..4);
    }

    #[test]
    fn operators_accessor() {
        let re = Regex::new(r"x\d*").unwrap();
        assert_eq!(
            re.operators(),
            &[
                Operator::literal('x'),
                Operator::class(CharClass::Digit).with_repeat(0, None),
            ]
        );
    }

    #[test]
    fn find_iter_empty_matches() {
        let re = Regex::new("a*").unwrap();
        let ranges: Vec<_> = re
            .find_iter("baab")
            .map(|m| m.unwrap().range())
            .collect();
        assert_eq!(ranges, vec![0..0, 1..3, 4..4]);
    }

    #[test]
    fn find_iter_empty_text() {
        let re = Regex::new("x?").unwrap();
        let ranges: Vec<_> = re.find_iter("").map(|m| m.unwrap().range()).collect();
        assert_eq!(ranges, vec![0..0]);
    }

    #[test]
    fn find_iter_stops_on_error() {
        let re = RegexBuilder::new()
            .backtrack_limit(1)
            .build("a*a*b")
            .unwrap();
        let mut it = re.find_iter("aaaa");
        assert!(it.next().unwrap().is_err());
        assert!(it.next().is_none());
    }

    #[test]
    #[should_panic(expected = "position not on a char boundary")]
    fn find_from_pos_inside_codepoint() {
        let re = Regex::new("a*").unwrap();
        let _ = re.find_from_pos("é", 1);
    }

    #[test]
    fn backtrack_limit_spans_start_positions() {
        // each start position stays within 11 steps, the search as a whole does not
        let re = RegexBuilder::new().backtrack_limit(11).build("a*b").unwrap();
        let text = "a".repeat(10);
        assert_eq!(
            re.find(&text),
            Err(Error::RuntimeError(RuntimeError::BacktrackLimitExceeded))
        );
        assert_eq!(re.find_from_pos(&text, 9).unwrap(), None);
        assert_eq!(re.find("aab").unwrap().unwrap().range(), 0..3);
    }

    #[test]
    fn regex_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Regex>();
    }
}
