//! OSC address pattern matching
//!
//! Patterns are matched one address part at a time. Within a part:
//! - `?` matches any single byte
//! - `*` matches zero or more bytes
//! - `[abc]`, `[a-z]`, `[!abc]` match one byte from (or outside) a set;
//!   `[]` matches any byte
//! - `{foo,bar}` matches any of the comma separated alternatives;
//!   `{}` matches the empty string
//!
//! Alternatives are tried left to right and the first one that prefixes the
//! literal is taken without revisiting the others. Matching never allocates
//! and does not recurse.

use crate::address::OscAddress;

/// Bytes with special meaning inside a pattern part
pub const GLOB_CHARS: &[u8] = b"*?[]{}";

/// Does `pattern` match the concrete address `path`?
///
/// Returns `false` unless `pattern` is a valid pattern, `path` is a valid
/// path and both have the same number of containers.
pub fn matches(pattern: &OscAddress, path: &OscAddress) -> bool {
    if !pattern.is_valid_pattern() || !path.is_valid_path() {
        return false;
    }

    if pattern.containers().len() != path.containers().len() {
        return false;
    }

    if !part_matches(pattern.method(), path.method()) {
        return false;
    }

    pattern
        .containers()
        .iter()
        .zip(path.containers())
        .all(|(p, l)| part_matches(p, l))
}

/// Match a single pattern part against a literal part
pub fn part_matches(pattern: &str, literal: &str) -> bool {
    match_bytes(pattern.as_bytes(), literal.as_bytes())
}

/// Outcome of matching one pattern construct at the current cursors
enum Step {
    /// A `*`: remember where to resume from
    Star,
    /// Construct matched, advance the pattern and literal cursors
    Advance(usize, usize),
    Mismatch,
    /// Unterminated `[` or `{`
    Malformed,
}

/// Two-cursor scan with a single resume point at the most recent `*`.
///
/// On a mismatch the scan returns to the pattern position after that star and
/// lets it absorb one more literal byte, so the work is bounded by
/// `pattern.len() * literal.len()` regardless of how many stars there are.
fn match_bytes(pat: &[u8], lit: &[u8]) -> bool {
    let (mut p, mut l) = (0, 0);
    let mut resume: Option<(usize, usize)> = None;

    while p < pat.len() || l < lit.len() {
        if p < pat.len() {
            match step(&pat[p..], &lit[l..]) {
                Step::Star => {
                    p += 1;
                    resume = Some((p, l));
                    continue;
                }
                Step::Advance(dp, dl) => {
                    p += dp;
                    l += dl;
                    continue;
                }
                Step::Malformed => return false,
                Step::Mismatch => {}
            }
        }

        match resume {
            Some((rp, rl)) if rl < lit.len() => {
                resume = Some((rp, rl + 1));
                p = rp;
                l = rl + 1;
            }
            _ => return false,
        }
    }

    true
}

fn step(pat: &[u8], lit: &[u8]) -> Step {
    let Some(&first) = pat.first() else {
        return Step::Mismatch;
    };

    match first {
        b'*' => Step::Star,
        b'?' => {
            if lit.is_empty() {
                Step::Mismatch
            } else {
                Step::Advance(1, 1)
            }
        }
        b'[' => {
            let Some(close) = find(pat, b']') else {
                return Step::Malformed;
            };
            match lit.first() {
                Some(&c) if class_contains(&pat[1..close], c) => Step::Advance(close + 1, 1),
                _ => Step::Mismatch,
            }
        }
        b'{' => {
            let Some(close) = find(pat, b'}') else {
                return Step::Malformed;
            };
            // First listed alternative that prefixes the literal wins
            match pat[1..close]
                .split(|&b| b == b',')
                .find(|alt| lit.starts_with(alt))
            {
                Some(alt) => Step::Advance(close + 1, alt.len()),
                None => Step::Mismatch,
            }
        }
        c => {
            if lit.first() == Some(&c) {
                Step::Advance(1, 1)
            } else {
                Step::Mismatch
            }
        }
    }
}

#[inline]
fn find(haystack: &[u8], needle: u8) -> Option<usize> {
    haystack.iter().position(|&b| b == needle)
}

/// Test `c` against the body of a `[...]` class
fn class_contains(body: &[u8], c: u8) -> bool {
    if body.is_empty() {
        return true;
    }

    let (negate, set) = match body.split_first() {
        Some((b'!', rest)) => (true, rest),
        _ => (false, body),
    };

    let hit = match set {
        [lo, b'-', hi] => (*lo..=*hi).contains(&c),
        _ => set.contains(&c),
    };

    hit != negate
}

/// Whether a part is usable as a literal path component
pub(crate) fn is_valid_path_part(part: &str) -> bool {
    !part.is_empty() && !part.bytes().any(|b| b == 0 || GLOB_CHARS.contains(&b))
}

/// Whether a part is a well-formed pattern component.
///
/// Brackets and braces must close before another construct opens, and a
/// closing `]` or `}` must have a matching opener.
pub(crate) fn is_valid_pattern_part(part: &str) -> bool {
    if part.is_empty() {
        return false;
    }

    let mut open: Option<u8> = None;
    for b in part.bytes() {
        match (open, b) {
            (_, 0) => return false,
            (None, b'[') | (None, b'{') => open = Some(b),
            (None, b']') | (None, b'}') => return false,
            (Some(b'['), b']') | (Some(b'{'), b'}') => open = None,
            (Some(_), b'[') | (Some(_), b'{') => return false,
            (Some(b'['), b'}') | (Some(b'{'), b']') => return false,
            _ => {}
        }
    }

    open.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal() {
        assert!(part_matches("gain", "gain"));
        assert!(!part_matches("gain", "Gain"));
        assert!(!part_matches("gain", "gains"));
        assert!(!part_matches("gains", "gain"));
    }

    #[test]
    fn test_question_mark() {
        assert!(part_matches("b?r", "bar"));
        assert!(!part_matches("b?r", "br"));
        assert!(!part_matches("b?r", "baar"));
    }

    #[test]
    fn test_star() {
        assert!(part_matches("*", ""));
        assert!(part_matches("*", "anything"));
        assert!(part_matches("***", "x"));
        assert!(part_matches("a*c", "abbbc"));
        assert!(part_matches("a*c", "ac"));
        assert!(!part_matches("a*c", "abbbd"));
        assert!(part_matches("*bar", "foobar"));
        assert!(part_matches("f*b*r", "foobar"));
        // Backtracking past the first candidate
        assert!(part_matches("*ab", "aab"));
        assert!(part_matches("*a?", "aaab"));
    }

    #[test]
    fn test_brackets() {
        assert!(part_matches("[a-c]ar", "bar"));
        assert!(!part_matches("[a-c]ar", "dar"));
        assert!(part_matches("[!a-c]ar", "dar"));
        assert!(!part_matches("[!a-c]ar", "car"));
        assert!(part_matches("[xyz]", "y"));
        assert!(!part_matches("[xyz]", "w"));
        assert!(part_matches("[]", "q"));
        assert!(!part_matches("[]", ""));
        // Longer bodies are membership tests, so '-' is a literal member
        assert!(part_matches("[a-cz]", "-"));
        assert!(!part_matches("[a-cz]", "b"));
    }

    #[test]
    fn test_braces() {
        assert!(part_matches("{cat,dog}", "dog"));
        assert!(!part_matches("{cat,dog}", "bird"));
        assert!(part_matches("x{}y", "xy"));
        // The first alternative that fits is kept, later ones are not retried
        assert!(!part_matches("{a,ab}c", "abc"));
        assert!(part_matches("{ab,a}c", "abc"));
        assert!(part_matches("{a,ab}c", "ac"));
        assert!(part_matches("pre{fix,view}*", "preview-1"));
    }

    #[test]
    fn test_braces_trailing_empty_alternative() {
        assert!(part_matches("{a,}", "a"));
        assert!(part_matches("{a,}", ""));
        assert!(!part_matches("{a,}", "b"));
        assert!(part_matches("x{a,}", "x"));
    }

    #[test]
    fn test_stars_against_long_literal_stay_fast() {
        let literal = "a".repeat(10_000);
        let started = std::time::Instant::now();
        assert!(!part_matches("*a*a*a*a*b", &literal));
        assert!(part_matches("*a*a*a*a*", &literal));
        assert!(!part_matches("*{a,b}*{a,b}*c", &literal));
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_star_then_braces() {
        assert!(part_matches("*{b,c}", "aaac"));
        assert!(part_matches("*.{wav,aif}", "kick.aif"));
        assert!(!part_matches("*.{wav,aif}", "kick.mp3"));
        assert!(part_matches("*[0-9]", "chan7"));
        assert!(part_matches("a*b*c", "aXbYbZc"));
        assert!(!part_matches("a*b*c", "aXbYbZ"));
    }

    #[test]
    fn test_malformed_reaching_matcher() {
        assert!(!part_matches("[abc", "a"));
        assert!(!part_matches("{abc", "abc"));
    }

    #[test]
    fn test_pattern_validity() {
        assert!(is_valid_pattern_part("foo"));
        assert!(is_valid_pattern_part("[a-z]*{x,y}?"));
        assert!(is_valid_pattern_part("[]"));
        assert!(is_valid_pattern_part("{}"));
        assert!(!is_valid_pattern_part(""));
        assert!(!is_valid_pattern_part("[abc"));
        assert!(!is_valid_pattern_part("abc]"));
        assert!(!is_valid_pattern_part("{a,b"));
        assert!(!is_valid_pattern_part("a}"));
        assert!(!is_valid_pattern_part("[a{b}]"));
        assert!(!is_valid_pattern_part("{a[b]}"));
        assert!(!is_valid_pattern_part("[a}"));
        assert!(!is_valid_pattern_part("ga\0in"));
    }

    #[test]
    fn test_path_validity() {
        assert!(is_valid_path_part("synth1"));
        assert!(!is_valid_path_part(""));
        assert!(!is_valid_path_part("ga\0in"));
        for glob in ["a*", "?", "[a]", "{a}", "a]", "b}"] {
            assert!(!is_valid_path_part(glob), "{glob} should not be a valid path part");
        }
    }
}
