use memchr::{memchr, memchr2};

use super::Inline;

const CODE_MARKER: u8 = b'`';
const LINK_MARKER: u8 = b'[';

/// Split a line into text, code and link spans.
///
/// Whichever span starts first wins and its contents are never scanned again, so a link
/// label can't contain a code span and vice versa. A marker that doesn't open a complete
/// span is kept as literal text.
pub(super) fn parse(source: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut text = String::new();
    let mut input = source;

    while let Some(start) = memchr2(CODE_MARKER, LINK_MARKER, input.as_bytes()) {
        let (before, candidate) = input.split_at(start);
        text.push_str(before);

        let matched = match candidate.as_bytes()[0] {
            CODE_MARKER => match_code(candidate),
            _ => match_link(candidate),
        };

        match matched {
            Some((span, consumed)) => {
                if !text.is_empty() {
                    spans.push(Inline::Text(std::mem::take(&mut text)));
                }

                spans.push(span);
                input = &candidate[consumed..];
            }
            None => {
                // NOTE: Both markers are ASCII, so slicing one byte off stays on a char boundary.
                text.push_str(&candidate[..1]);
                input = &candidate[1..];
            }
        }
    }

    text.push_str(input);

    if !text.is_empty() {
        spans.push(Inline::Text(text));
    }

    spans
}

/// Matches `` `code` `` with a non-empty body.
fn match_code(candidate: &str) -> Option<(Inline, usize)> {
    let body = &candidate[1..];
    let end = memchr(CODE_MARKER, body.as_bytes())?;

    if end == 0 {
        return None;
    }

    Some((Inline::Code(String::from(&body[..end])), end + 2))
}

/// Matches `[label](url)` with a non-empty label and url.
fn match_link(candidate: &str) -> Option<(Inline, usize)> {
    let body = &candidate[1..];
    let label_end = memchr(b']', body.as_bytes())?;

    if label_end == 0 {
        return None;
    }

    let target = body[label_end + 1..].strip_prefix('(')?;
    let url_end = memchr(b')', target.as_bytes())?;

    if url_end == 0 {
        return None;
    }

    let link = Inline::Link {
        label: String::from(&body[..label_end]),
        url: String::from(&target[..url_end]),
    };

    // Opening bracket, label, `](`, url, closing paren.
    let consumed = 1 + label_end + 2 + url_end + 1;

    Some((link, consumed))
}
