pub(super) fn starts_with_at(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    bytes.get(idx..idx + pattern.len()) == Some(pattern)
}

pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    starts_with_at(bytes, idx, b"--")
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    starts_with_at(bytes, idx, b"/*")
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    starts_with_at(bytes, idx, b"*/")
}

/// Recognise `$tag$` (or `$$`) at `start`; returns the tag and the index of the closing `$`.
pub(super) fn try_start_dollar_quote(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let mut idx = start + 1;
    while idx < bytes.len() && bytes[idx] != b'$' {
        let b = bytes[idx];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        idx += 1;
    }
    // `$1` style positional parameters are not quote openers
    if bytes.get(start + 1).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    if idx < bytes.len() {
        let tag = String::from_utf8(bytes[start + 1..idx].to_vec()).ok()?;
        Some((tag, idx))
    } else {
        None
    }
}

/// True when `$tag$` closes at `idx`.
pub(super) fn closes_dollar_quote(bytes: &[u8], idx: usize, tag: &str) -> bool {
    bytes.get(idx) == Some(&b'$')
        && starts_with_at(bytes, idx + 1, tag.as_bytes())
        && bytes.get(idx + 1 + tag.len()) == Some(&b'$')
}
