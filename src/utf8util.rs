//! Byte offset helpers. Every offset handed out by the engine sits on a char boundary, so
//! stepping is always done by whole codepoints.

#[inline]
pub(crate) fn codepoint_len(b: u8) -> usize {
    match b {
        b if b < 0x80 => 1,
        b if b < 0xe0 => 2,
        b if b < 0xf0 => 3,
        _ => 4,
    }
}

// precondition: ix < s.len()
#[inline]
pub(crate) fn next_codepoint_ix(s: impl AsRef<[u8]>, ix: usize) -> usize {
    ix + codepoint_len(s.as_ref()[ix])
}

/// Decode the char starting at byte `ix`, or `None` at (or past) the end of `s`.
#[inline]
pub(crate) fn char_at(s: &str, ix: usize) -> Option<char> {
    s.get(ix..)?.chars().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_over_multibyte() {
        let s = "aé€😀b";
        let mut ix = 0;
        let mut offsets = Vec::new();
        while ix < s.len() {
            offsets.push(ix);
            ix = next_codepoint_ix(s, ix);
        }
        assert_eq!(offsets, vec![0, 1, 3, 6, 10]);
        assert_eq!(ix, s.len());
    }

    #[test]
    fn char_at_end_is_none() {
        assert_eq!(char_at("ab", 1), Some('b'));
        assert_eq!(char_at("ab", 2), None);
        assert_eq!(char_at("ab", 7), None);
    }
}
