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

//! Backtracking VM over a flat sequence of operators.
//!
//! The program is a list of operators (OP), each of which consumes one character per application
//! and has a minimum and maximum repetition count. The VM keeps an index into the program and a
//! position in the string (IX).
//!
//! Each operator is applied greedily: as many times in a row as it matches, up to its maximum.
//! Every single application is recorded in that operator's match history. If the operator reached
//! its minimum, it is committed and the VM moves on to the next operator at the new IX.
//!
//! If it didn't, the VM backtracks. It looks at the most recently committed operator: if that one
//! has more applications than its minimum, the last application is dropped from its history, IX is
//! rewound to where that application started, and the failed operator is tried again from there.
//! Otherwise the committed operator is un-applied entirely and the one before it is examined. If
//! nothing is left to un-apply, there is no match at this starting position.
//!
//! The program for `a*ab`:
//!
//! ```text
//! 0: a{0,}
//! 1: a
//! 2: b
//! ```
//!
//! Stepping through it with the input `aaab`:
//!
//! 1. OP 0 matches three times, IX 3
//! 2. OP 1 fails on `b`; OP 0 gives up one application, IX 2
//! 3. OP 1 matches at IX 2, IX 3
//! 4. OP 2 matches at IX 3 -> successful match (index 0 to 4)
//!
//! The amount of backtracking can grow exponentially with the number of unbounded operators.

use std::ops::Range;
use std::sync::Arc;

use crate::error::RuntimeError;
use crate::operator::Operator;
use crate::utf8util::next_codepoint_ix;
use crate::Error;
use crate::Result;

/// No limit on backtracking, which is how the plain algorithm behaves.
pub(crate) const DEFAULT_BACKTRACK_LIMIT: usize = usize::MAX;

/// Sequence of operators for the VM to execute.
#[derive(Debug)]
pub struct Prog {
    /// Operators of the program, in pattern order
    pub body: Vec<Operator>,
}

impl Prog {
    pub(crate) fn new(body: Vec<Operator>) -> Prog {
        Prog { body }
    }
}

#[derive(Debug)]
pub(crate) struct State {
    /// Consumed ranges of each operator during the current attempt, indexed like `Prog::body`.
    history: Vec<Vec<Range<usize>>>,
    /// Indexes of the committed operators, oldest first.
    applied: Vec<usize>,
}

impl State {
    fn new(n_ops: usize) -> State {
        State {
            history: vec![Vec::new(); n_ops],
            applied: Vec::new(),
        }
    }

    fn reset(&mut self, n_ops: usize) {
        self.history.resize_with(n_ops, Vec::new);
        for history in &mut self.history {
            history.clear();
        }
        self.applied.clear();
    }

    fn clear_matches(&mut self, op: usize) {
        self.history[op].clear();
    }

    fn push_match(&mut self, op: usize, range: Range<usize>) {
        self.history[op].push(range);
    }

    fn num_matches(&self, op: usize) -> usize {
        self.history[op].len()
    }

    // Only called on an operator with more applications than its minimum.
    fn pop_match(&mut self, op: usize) -> Range<usize> {
        self.history[op]
            .pop()
            .expect("match history underflow")
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Machine {
    pub prog: Arc<Prog>,
    pub backtrack_limit: usize,
}

#[derive(Debug)]
pub(crate) struct Session {
    pub prog: Arc<Prog>,
    pub backtrack_limit: usize,
    state: State,
}

impl Machine {
    pub(crate) fn new(prog: Arc<Prog>, backtrack_limit: usize) -> Machine {
        Machine {
            prog,
            backtrack_limit,
        }
    }

    pub(crate) fn create_state(prog: &Prog) -> State {
        State::new(prog.body.len())
    }

    pub(crate) fn create_session(self, state: State) -> Session {
        Session {
            prog: self.prog,
            backtrack_limit: self.backtrack_limit,
            state,
        }
    }
}

impl Session {
    /// Find the leftmost match starting at or after byte offset `pos`.
    ///
    /// Every char boundary from `pos` up to and including the end of `s` is tried in turn, so a
    /// program that accepts the empty string also matches at the very end. The backtrack limit
    /// covers all of these attempts together.
    pub(crate) fn run(&mut self, s: &str, pos: usize) -> Result<Option<Range<usize>>> {
        assert!(pos <= s.len(), "position out of bound");
        assert!(s.is_char_boundary(pos), "position not on a char boundary");
        let mut backtrack_count = 0;
        let mut start = pos;
        loop {
            if let Some(end) = self.run_at(s, start, &mut backtrack_count)? {
                tracing::trace!(start, end, "match succeeded");
                return Ok(Some(start..end));
            }
            if start >= s.len() {
                tracing::trace!(pos, backtrack_count, "no match");
                return Ok(None);
            }
            start = next_codepoint_ix(s, start);
        }
    }

    /// Try to match the whole program with the first operator anchored at `start`. Returns the end
    /// of the match.
    ///
    /// Each unwinding step (dropping one application or un-applying an operator) adds one to
    /// `backtrack_count`.
    fn run_at(
        &mut self,
        s: &str,
        start: usize,
        backtrack_count: &mut usize,
    ) -> Result<Option<usize>> {
        let ops = &self.prog.body;
        let state = &mut self.state;
        state.reset(ops.len());
        tracing::trace!(start, "attempting match");

        let mut end = start;
        let mut op_ix = 0;
        while op_ix < ops.len() {
            debug_assert_eq!(op_ix, state.applied.len());
            let op = &ops[op_ix];
            state.clear_matches(op_ix);

            let mut ix = end;
            while !op.is_saturated(state.num_matches(op_ix)) {
                match op.match_at(s, ix) {
                    Some(next) => {
                        tracing::trace!(op = op_ix, start = ix, end = next, "matched");
                        state.push_match(op_ix, ix..next);
                        ix = next;
                    }
                    None => break,
                }
            }

            if state.num_matches(op_ix) >= op.min_repeat() {
                tracing::trace!(op = op_ix, count = state.num_matches(op_ix), "applied");
                state.applied.push(op_ix);
                end = ix;
                op_ix += 1;
                continue;
            }

            tracing::trace!(
                op = op_ix,
                count = state.num_matches(op_ix),
                required = op.min_repeat(),
                "backtracking"
            );

            loop {
                let top = match state.applied.last() {
                    Some(&top) => top,
                    None => {
                        tracing::trace!(start, "giving up");
                        return Ok(None);
                    }
                };
                *backtrack_count += 1;
                if *backtrack_count > self.backtrack_limit {
                    return Err(Error::RuntimeError(RuntimeError::BacktrackLimitExceeded));
                }
                if state.num_matches(top) > ops[top].min_repeat() {
                    // drop one application and retry the failed operator from its start
                    let popped = state.pop_match(top);
                    tracing::trace!(op = top, count = state.num_matches(top), "trying one less");
                    end = popped.start;
                    break;
                }
                state.applied.pop();
                op_ix -= 1;
                tracing::trace!(op = op_ix, "un-applied");
            }
        }
        Ok(Some(end))
    }
}
