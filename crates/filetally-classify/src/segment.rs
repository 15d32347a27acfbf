//! Splitting descriptions into comma-delimited segments.

use std::iter::FusedIterator;
use std::ops::Range;

use filetally_core::{Fingerprint, FingerprintHasher};

/// One comma-delimited token of a description.
///
/// `span` covers the body plus its delimiter: the comma and every space
/// directly after it. Dropping a segment means dropping the whole span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Text up to, not including, the comma.
    pub body: &'a str,
    /// Body and trailing delimiter, as it appears in the source.
    pub text: &'a str,
    /// Byte range of `text` in the source description.
    pub span: Range<usize>,
    /// Fingerprint of `body`.
    pub fingerprint: Fingerprint,
}

impl<'a> Segment<'a> {
    /// The delimiter part of the span (`", "` and friends, or empty for the
    /// last segment).
    pub fn delimiter(&self) -> &'a str {
        &self.text[self.body.len()..]
    }
}

/// Lazy iterator over the segments of a description.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    source: &'a str,
    pos: usize,
}

/// Split `description` into segments.
pub fn segments(description: &str) -> Segments<'_> {
    Segments {
        source: description,
        pos: 0,
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.source.as_bytes();
        if self.pos >= bytes.len() {
            return None;
        }

        let start = self.pos;
        let mut hasher = FingerprintHasher::new();
        let mut end = start;
        while end < bytes.len() && bytes[end] != b',' {
            hasher.push(bytes[end]);
            end += 1;
        }
        let body_end = end;

        if end < bytes.len() && bytes[end] == b',' {
            end += 1;
        }
        while end < bytes.len() && bytes[end] == b' ' {
            end += 1;
        }
        self.pos = end;

        // Cuts only ever land next to ASCII ',' and ' ', so both slices sit
        // on char boundaries.
        Some(Segment {
            body: &self.source[start..body_end],
            text: &self.source[start..end],
            span: start..end,
            fingerprint: hasher.finish(),
        })
    }
}

impl FusedIterator for Segments<'_> {}
