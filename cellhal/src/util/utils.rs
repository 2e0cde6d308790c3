//! Helpers for NUL-terminated byte buffers of the C-callable surface.

use crate::Result;
use crate::api::models::HalError;

/// Copies `value` into `dst` followed by a NUL terminator.
///
/// Fails without writing anything if the string and its terminator do not
/// fit, or if `value` contains a NUL itself.
pub(crate) fn copy_c_string(field: &'static str, value: &str, dst: &mut [u8]) -> Result<()> {
    let bytes = value.as_bytes();
    if bytes.contains(&0) {
        return Err(HalError::InvalidText {
            field,
            reason: "contains a NUL byte".into(),
        });
    }

    let needed = bytes.len() + 1;
    if needed > dst.len() {
        return Err(HalError::BufferTooSmall {
            field,
            needed,
            capacity: dst.len(),
        });
    }

    dst[..bytes.len()].copy_from_slice(bytes);
    dst[bytes.len()] = 0;
    Ok(())
}

/// Reads the NUL-terminated UTF-8 string at the start of `buf`.
///
/// Returns `None` when there is no terminator or the bytes are not UTF-8.
pub fn read_c_string(buf: &[u8]) -> Option<&str> {
    let end = buf.iter().position(|b| *b == 0)?;
    std::str::from_utf8(&buf[..end]).ok()
}
