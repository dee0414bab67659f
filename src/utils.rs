use std::path::PathBuf;

/// One segment of a natural sort key. Derived ordering puts all numeric
/// segments before text ones, which only matters when two names disagree
/// on segment kind at the same position.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum NaturalSegment {
    Number(u64),
    Text(String),
}

/// Split a filename into alternating text/number segments so rotated logs
/// order numerically: `pas_debug.log.2` before `pas_debug.log.10`. Text
/// segments compare case-insensitively.
pub fn natural_sort_key(name: &str) -> Vec<NaturalSegment> {
    let mut key = Vec::new();
    let mut text = String::new();
    let mut digits = String::new();
    for c in name.chars() {
        if c.is_ascii_digit() {
            if !text.is_empty() {
                key.push(NaturalSegment::Text(std::mem::take(&mut text).to_lowercase()));
            }
            digits.push(c);
        } else {
            if !digits.is_empty() {
                key.push(NaturalSegment::Number(parse_digits(&digits)));
                digits.clear();
            }
            text.push(c);
        }
    }
    if !digits.is_empty() {
        key.push(NaturalSegment::Number(parse_digits(&digits)));
    }
    if !text.is_empty() {
        key.push(NaturalSegment::Text(text.to_lowercase()));
    }
    key
}

fn parse_digits(digits: &str) -> u64 {
    // a digit run too long for u64 still has to order after sane suffixes
    digits.parse().unwrap_or(u64::MAX)
}

/// Sort paths by the natural key of their final component.
pub fn sort_paths_naturally(paths: &mut [PathBuf]) {
    paths.sort_by_key(|path| {
        path.file_name()
            .map(|name| natural_sort_key(&name.to_string_lossy()))
            .unwrap_or_default()
    });
}
