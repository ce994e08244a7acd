//! Shell-style wildcard matching for catalog entry names.
//!
//! Implements fnmatch semantics: `*` matches any run of characters, `?`
//! matches exactly one, `[...]` matches a character class with ranges and
//! leading `!` negation. No crate dependency; the matcher is a few dozen
//! lines and filenames keep patterns small.

/// Match `name` against a shell-style wildcard `pattern`.
pub fn fnmatch(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    matches(&pattern, &name)
}

/// Whether a rendered fragment needs catalog resolution at all.
pub fn has_wildcards(fragment: &str) -> bool {
    fragment.chars().any(|c| matches!(c, '*' | '?' | '[' | ']'))
}

fn matches(pattern: &[char], name: &[char]) -> bool {
    match pattern.first().copied() {
        None => name.is_empty(),
        Some('*') => {
            let rest = &pattern[1..];
            (0..=name.len()).any(|skip| matches(rest, &name[skip..]))
        }
        Some('?') => !name.is_empty() && matches(&pattern[1..], &name[1..]),
        Some('[') => match parse_class(pattern) {
            Some(class) => match name.first() {
                Some(&c) => class.contains(c) && matches(&pattern[class.consumed..], &name[1..]),
                None => false,
            },
            // unterminated class: treat '[' as a literal
            None => name.first() == Some(&'[') && matches(&pattern[1..], &name[1..]),
        },
        Some(literal) => name.first() == Some(&literal) && matches(&pattern[1..], &name[1..]),
    }
}

struct CharClass {
    negated: bool,
    singles: Vec<char>,
    ranges: Vec<(char, char)>,
    /// Pattern characters consumed, including both brackets
    consumed: usize,
}

impl CharClass {
    fn contains(&self, c: char) -> bool {
        let hit = self.singles.contains(&c)
            || self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi);
        hit != self.negated
    }
}

/// Parse a `[...]` class starting at `pattern[0] == '['`.
///
/// Returns None when the class never closes. A `]` immediately after the
/// opening bracket (or the negation marker) is a literal member.
fn parse_class(pattern: &[char]) -> Option<CharClass> {
    let mut i = 1;
    let negated = matches!(pattern.get(i).copied(), Some('!') | Some('^'));
    if negated {
        i += 1;
    }

    let mut singles = Vec::new();
    let mut ranges = Vec::new();
    let mut first = true;

    while let Some(&c) = pattern.get(i) {
        if c == ']' && !first {
            return Some(CharClass {
                negated,
                singles,
                ranges,
                consumed: i + 1,
            });
        }
        first = false;

        if pattern.get(i + 1) == Some(&'-') && pattern.get(i + 2).is_some_and(|&n| n != ']') {
            ranges.push((c, pattern[i + 2]));
            i += 3;
        } else {
            singles.push(c);
            i += 1;
        }
    }

    None
}
