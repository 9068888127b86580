// ============================================================
// UPLOAD DECODING
// ============================================================
// Turn uploaded bytes into text before loading

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use tracing::warn;

/// Decode uploaded file bytes.
///
/// A byte order mark selects the encoding (UTF-8 or UTF-16); without one the
/// bytes are read as UTF-8. Invalid sequences are replaced rather than
/// rejected, the same as a lossy read.
pub fn decode_upload<'a>(bytes: &'a [u8], file_name: &str) -> Cow<'a, str> {
    let (encoding, bom_len) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);

    if had_errors {
        warn!(
            file_name,
            encoding = encoding.name(),
            "Upload contained invalid byte sequences; replaced with U+FFFD"
        );
    }

    text
}
