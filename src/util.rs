//! Shared utility helpers.

use std::path::Path;

use encoding_rs::WINDOWS_1252;

/// Case-insensitive starts_with check without allocating.
#[inline]
pub fn starts_with_ci(haystack: &str, needle: &str) -> bool {
    haystack.len() >= needle.len()
        && haystack.is_char_boundary(needle.len())
        && haystack.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle.as_bytes())
}

/// Replace a case-insensitive `prefix` of `value` with `replacement`,
/// keeping the rest of `value` (and its case) untouched.
///
/// Returns `None` when `value` does not start with `prefix`.
pub fn replace_prefix_ci(value: &str, prefix: &str, replacement: &str) -> Option<String> {
    if !starts_with_ci(value, prefix) {
        return None;
    }
    let mut result = String::with_capacity(replacement.len() + value.len() - prefix.len());
    result.push_str(replacement);
    result.push_str(&value[prefix.len()..]);
    Some(result)
}

/// Read a file as a string, trying UTF-8 first, then Windows-1252 as fallback.
///
/// A leading UTF-8 BOM is stripped.
pub fn read_text_file(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(err) => {
            // Exports produced on Windows machines are frequently cp1252
            let bytes = err.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                ));
            }
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{FEFF}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}
