//! Opaque cursors and page assembly for keyset pagination.
//!
//! A cursor is the standard base64 encoding of the last identifier a caller
//! has seen. It hides the key from casual inspection but carries no
//! integrity protection; a tampered cursor simply resumes somewhere else.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use storefront_domain::error::CursorError;
use storefront_domain::id::ProductId;

/// Encode an identifier into an opaque cursor.
#[must_use]
pub fn encode_cursor(id: &ProductId) -> String {
    STANDARD.encode(id.as_str())
}

/// Decode a cursor produced by [`encode_cursor`].
///
/// # Errors
///
/// Returns [`CursorError::Encoding`] when `cursor` is not base64 and
/// [`CursorError::Identifier`] when the decoded bytes are not UTF-8.
pub fn decode_cursor(cursor: &str) -> Result<ProductId, CursorError> {
    let bytes = STANDARD
        .decode(cursor)
        .map_err(|_| CursorError::Encoding)?;
    let id = String::from_utf8(bytes).map_err(|_| CursorError::Identifier)?;
    Ok(ProductId::from(id))
}

/// Decode an optional `after` argument. Absent and empty both mean
/// "start from the beginning".
///
/// # Errors
///
/// Propagates [`decode_cursor`] failures.
pub fn decode_after(after: Option<&str>) -> Result<Option<ProductId>, CursorError> {
    match after {
        Some(cursor) if !cursor.is_empty() => decode_cursor(cursor).map(Some),
        _ => Ok(None),
    }
}

/// One page of a keyset-paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
    /// Cursor of the last item on this page, `None` when the page is empty.
    pub end_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Build a page from a query that fetched up to `first + 1` rows.
    ///
    /// The extra row only signals that another page exists and is dropped.
    pub fn from_overfetch(mut rows: Vec<T>, first: usize, key: impl Fn(&T) -> &ProductId) -> Self {
        let has_next_page = rows.len() > first;
        if has_next_page {
            rows.truncate(first);
        }
        let end_cursor = rows.last().map(|row| encode_cursor(key(row)));
        Self {
            items: rows,
            has_next_page,
            end_cursor,
        }
    }
}
