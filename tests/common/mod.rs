#![allow(dead_code)]

use mini_regex::Regex;

#[cfg_attr(feature = "track_caller", track_caller)]
pub fn regex(re: &str) -> Regex {
    let parse_result = Regex::new(re);
    assert!(
        parse_result.is_ok(),
        "Expected regex '{}' to be compiled successfully, got {:?}",
        re,
        parse_result.err()
    );
    parse_result.unwrap()
}

#[cfg_attr(feature = "track_caller", track_caller)]
pub fn full_match(re: &str, text: &str) -> bool {
    let regex = regex(re);
    let result = regex.is_full_match(text);
    assert!(
        result.is_ok(),
        "Expected match to succeed, but was {:?}",
        result
    );
    result.unwrap()
}

#[cfg_attr(feature = "track_caller", track_caller)]
pub fn find(re: &str, text: &str) -> Option<(usize, usize)> {
    let regex = regex(re);
    let result = regex.find(text);
    assert!(
        result.is_ok(),
        "Expected find to succeed, but was {:?}",
        result
    );
    result.unwrap().map(|m| (m.start(), m.end()))
}
