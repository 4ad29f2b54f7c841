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

use thiserror::Error;

/// Result type for this crate with specific error enum.
pub type Result<T> = ::std::result::Result<T, Error>;

/// An error as the result of parsing or running a regex.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// An error as a result of parsing a regex pattern, with the byte position where the error
    /// occurred
    #[error("Parsing error at position {0}: {1}")]
    ParseError(usize, ParseError),
    /// An error as a result of running a regex
    #[error("Error executing regex: {0}")]
    RuntimeError(RuntimeError),
}

/// An error for the result of parsing a regex pattern.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A character set was opened with `[` but never closed with `]`
    #[error("Unclosed character set, missing ']'")]
    UnclosedClass,
    /// The pattern ends with a single backslash
    #[error("Backslash without following character")]
    TrailingBackslash,
    /// Escape sequence that is not supported
    #[error("Invalid escape: {0}")]
    InvalidEscape(String),
    /// A `{` in quantifier position that is not `{m}` or `{m,n}`
    #[error("Invalid repeat syntax")]
    InvalidRepeat,
    /// A `{m,n}` quantifier whose maximum is smaller than its minimum
    #[error("Invalid repeat range {lo},{hi}: maximum is smaller than minimum")]
    InvalidRepeatRange {
        /// Minimum repetition count
        lo: usize,
        /// Maximum repetition count
        hi: usize,
    },
    /// A repetition count that does not fit the target's integer width
    #[error("Repeat count too large")]
    RepeatTooLarge,
}

/// An error as the result of executing a regex.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RuntimeError {
    /// The backtracking limit configured with
    /// [`RegexBuilder::backtrack_limit`](crate::RegexBuilder::backtrack_limit) was reached.
    /// This usually means the pattern has catastrophic backtracking against this input.
    #[error("Max limit for backtracking count exceeded")]
    BacktrackLimitExceeded,
}

impl Error {
    /// Shorthand for the parse error constructor used throughout the compiler.
    pub(crate) fn parse(pos: usize, kind: ParseError) -> Error {
        Error::ParseError(pos, kind)
    }
}
