//! Image MIME allow-list
//!
//! Only raster and vector images are editable inline. The list is fixed.

/// MIME types eligible for inline editing
pub const ALLOWED_MIME_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

/// Exact, case-sensitive membership test
#[inline]
#[must_use]
pub fn is_editable(mime_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_are_editable() {
        for mime in ALLOWED_MIME_TYPES {
            assert!(is_editable(mime));
        }
    }

    #[test]
    fn everything_else_is_not() {
        assert!(!is_editable("application/pdf"));
        assert!(!is_editable("video/mp4"));
        assert!(!is_editable("image/tiff"));
        assert!(!is_editable("IMAGE/PNG"));
        assert!(!is_editable(""));
    }
}
