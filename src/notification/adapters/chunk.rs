//! Splitting long messages to fit provider limits.

/// Splits `text` into pieces of at most `max_len` bytes.
///
/// Breaks prefer a paragraph boundary, then a line boundary, then the last
/// character boundary that fits. Each piece is non-empty.
pub(crate) fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_owned()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining.to_owned());
            break;
        }

        let mut boundary = max_len;
        while boundary > 0 && !remaining.is_char_boundary(boundary) {
            boundary -= 1;
        }
        let (window, _) = remaining.split_at(boundary);
        let preferred = window
            .rfind("\n\n")
            .map(|pos| pos + 1)
            .or_else(|| window.rfind('\n'))
            .filter(|pos| *pos > 0)
            .unwrap_or(boundary);

        // Zero progress would loop forever; take at least one character.
        let split_at = if preferred == 0 {
            remaining
                .char_indices()
                .nth(1)
                .map_or(remaining.len(), |(index, _)| index)
        } else {
            preferred
        };

        let (head, tail) = remaining.split_at(split_at);
        chunks.push(head.to_owned());
        remaining = tail.strip_prefix('\n').unwrap_or(tail);
    }
    chunks
}
