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

//! A regex parser yielding a flat sequence of operators.
//!
//! Every position of the pattern starts an atom (a literal, a class or a bracketed set), which
//! may be followed by one quantifier. There is no grouping and no alternation, so the result is
//! just a `Vec<Operator>` in pattern order.

use crate::error::{Error, ParseError, Result};
use crate::operator::{CharClass, Operator};
use crate::utf8util::char_at;

/// Parse `re` into a sequence of operators.
///
/// With `lenient_repeat`, a `{` that does not open a well-formed `{m}` or `{m,n}` quantifier
/// leaves the preceding operator unquantified and is then read as a literal.
pub(crate) fn parse(re: &str, lenient_repeat: bool) -> Result<Vec<Operator>> {
    let parser = Parser { re, lenient_repeat };
    let ops = parser.parse_ops()?;
    tracing::debug!(pattern = re, operators = ops.len(), "compiled pattern");
    Ok(ops)
}

struct Parser<'a> {
    re: &'a str,
    lenient_repeat: bool,
}

impl<'a> Parser<'a> {
    fn parse_ops(&self) -> Result<Vec<Operator>> {
        let mut ops = Vec::new();
        let mut ix = 0;
        while ix < self.re.len() {
            let (next, op) = self.parse_atom(ix)?;
            let (next, op) = self.parse_repeat(next, op)?;
            ops.push(op);
            ix = next;
        }
        Ok(ops)
    }

    fn parse_atom(&self, ix: usize) -> Result<(usize, Operator)> {
        let b = self.re.as_bytes()[ix];
        match b {
            b'[' => self.parse_set(ix),
            b'\\' => self.parse_escape(ix),
            b'.' => Ok((ix + 1, Operator::class(CharClass::Any))),
            _ => {
                // ix always sits on a char boundary
                let c = char_at(self.re, ix).unwrap_or(char::REPLACEMENT_CHARACTER);
                Ok((ix + c.len_utf8(), Operator::literal(c)))
            }
        }
    }

    // The set ends at the first `]` after the opening bracket; its contents are taken verbatim.
    fn parse_set(&self, ix: usize) -> Result<(usize, Operator)> {
        let close = match self.re[ix + 1..].find(']') {
            Some(offset) => ix + 1 + offset,
            None => return Err(Error::parse(ix, ParseError::UnclosedClass)),
        };
        let op = if self.re[ix + 1..close].starts_with('^') {
            Operator::negated_set(&self.re[ix + 2..close])
        } else {
            Operator::set(&self.re[ix + 1..close])
        };
        Ok((close + 1, op))
    }

    fn parse_escape(&self, ix: usize) -> Result<(usize, Operator)> {
        let c = match char_at(self.re, ix + 1) {
            Some(c) => c,
            None => return Err(Error::parse(ix, ParseError::TrailingBackslash)),
        };
        let end = ix + 1 + c.len_utf8();
        let op = match c {
            'd' => Operator::class(CharClass::Digit),
            'w' => Operator::class(CharClass::Word),
            's' => Operator::class(CharClass::Space),
            '.' | '\\' | '[' | ']' | '{' | '}' | '*' | '+' | '?' | '^' | '-' => {
                Operator::literal(c)
            }
            _ => {
                return Err(Error::parse(
                    ix,
                    ParseError::InvalidEscape(self.re[ix..end].to_string()),
                ))
            }
        };
        Ok((end, op))
    }

    fn parse_repeat(&self, ix: usize, op: Operator) -> Result<(usize, Operator)> {
        let (next, lo, hi) = match self.re.as_bytes().get(ix) {
            Some(b'*') => (ix + 1, 0, None),
            Some(b'+') => (ix + 1, 1, None),
            Some(b'?') => (ix + 1, 0, Some(1)),
            Some(b'{') => match self.parse_brace(ix)? {
                Some((next, lo, hi)) => {
                    if hi < lo {
                        return Err(Error::parse(ix, ParseError::InvalidRepeatRange { lo, hi }));
                    }
                    (next, lo, Some(hi))
                }
                None if self.lenient_repeat => return Ok((ix, op)),
                None => return Err(Error::parse(ix, ParseError::InvalidRepeat)),
            },
            _ => return Ok((ix, op)),
        };
        Ok((next, op.with_repeat(lo, hi)))
    }

    // Parses `{m}` or `{m,n}` starting at the `{`. Anything else yields `None`.
    fn parse_brace(&self, ix: usize) -> Result<Option<(usize, usize, usize)>> {
        let bytes = self.re.as_bytes();
        let (ix_lo, lo) = match self.parse_decimal(ix + 1)? {
            Some(parsed) => parsed,
            None => return Ok(None),
        };
        match bytes.get(ix_lo) {
            Some(b'}') => Ok(Some((ix_lo + 1, lo, lo))),
            Some(b',') => match self.parse_decimal(ix_lo + 1)? {
                Some((ix_hi, hi)) if bytes.get(ix_hi) == Some(&b'}') => {
                    Ok(Some((ix_hi + 1, lo, hi)))
                }
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }

    // One or more ASCII digits starting at ix, returning the end offset and the value.
    fn parse_decimal(&self, ix: usize) -> Result<Option<(usize, usize)>> {
        let bytes = self.re.as_bytes();
        let mut end = ix;
        let mut value: usize = 0;
        while let Some(&b) = bytes.get(end) {
            if !b.is_ascii_digit() {
                break;
            }
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(usize::from(b - b'0')))
                .ok_or_else(|| Error::parse(ix, ParseError::RepeatTooLarge))?;
            end += 1;
        }
        Ok(if end == ix { None } else { Some((end, value)) })
    }
}
