//! Field-level container disassembly
//!
//! A diagnostic dump of every fixed field of a raw 8xv buffer, for comparing
//! device-written files against this codec's output. Unlike
//! [`decode`](crate::appvar::decode), a checksum mismatch is reported inline
//! rather than failing the whole dump.

use crate::appvar::{
    self, CHECKSUM_LEN, COMMENT_LEN, MIN_CONTAINER_LEN, OFFSET_COMMENT, OFFSET_DATA_SIZE,
    OFFSET_ENTRY_TAG, OFFSET_INNER_SIZE, OFFSET_OUTER_SIZE, OFFSET_OUTER_SIZE_REPEAT,
    OFFSET_PADDING, OFFSET_PAYLOAD, OFFSET_TYPE_ID, OFFSET_VAR_NAME, Payload, SIGNATURE,
    VAR_NAME_LEN, checksum,
};

use super::ConvertError;

/// Hex dump grouped into 2-byte words.
fn hex_words(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2 + bytes.len() / 2);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 && i % 2 == 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

fn quoted(field: &[u8]) -> String {
    let end = field
        .iter()
        .rposition(|&b| b != 0 && b != b' ')
        .map_or(0, |i| i + 1);
    format!("\"{}\"", String::from_utf8_lossy(&field[..end]))
}

fn read_u16(buffer: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buffer[offset], buffer[offset + 1]])
}

/// Render a human-readable dump of every container field.
///
/// # Errors
///
/// Fails only when the buffer is too short to hold the fixed header; every
/// inconsistency past that point is reported in the dump itself.
pub fn disassemble(buffer: &[u8]) -> Result<String, ConvertError> {
    if buffer.len() < MIN_CONTAINER_LEN {
        return Err(appvar::Error::ParseError {
            reason: "buffer shorter than the minimal container",
        }
        .into());
    }

    let mut lines = Vec::new();

    let signature = &buffer[..SIGNATURE.len()];
    let sig_note = if signature == SIGNATURE { "" } else { "  (!) unrecognized" };
    lines.push(format!("signature    {}{sig_note}", hex_words(signature)));
    lines.push(format!(
        "comment      {}",
        quoted(&buffer[OFFSET_COMMENT..OFFSET_COMMENT + COMMENT_LEN])
    ));
    lines.push(format!("data size    {}", read_u16(buffer, OFFSET_DATA_SIZE)));
    lines.push(format!(
        "entry tag    {}",
        hex_words(&buffer[OFFSET_ENTRY_TAG..OFFSET_ENTRY_TAG + 2])
    ));
    lines.push(format!("outer size   {}", read_u16(buffer, OFFSET_OUTER_SIZE)));
    lines.push(format!("type id      {:02x}", buffer[OFFSET_TYPE_ID]));
    lines.push(format!(
        "var name     {}",
        quoted(&buffer[OFFSET_VAR_NAME..OFFSET_VAR_NAME + VAR_NAME_LEN])
    ));
    lines.push(format!(
        "padding      {}",
        hex_words(&buffer[OFFSET_PADDING..OFFSET_PADDING + 2])
    ));
    lines.push(format!(
        "outer size   {} (repeat)",
        read_u16(buffer, OFFSET_OUTER_SIZE_REPEAT)
    ));

    let inner_size = read_u16(buffer, OFFSET_INNER_SIZE) as usize;
    lines.push(format!("inner size   {inner_size}"));

    let payload_end = OFFSET_PAYLOAD + inner_size;
    if buffer.len() < payload_end + CHECKSUM_LEN {
        lines.push("payload      (!) declared size exceeds the buffer".to_string());
        return Ok(lines.join("\n"));
    }

    match Payload::parse(&buffer[OFFSET_PAYLOAD..payload_end]) {
        Ok(payload) => {
            match payload.name() {
                Some(name) => lines.push(format!("long name    {}", quoted(name))),
                None => lines.push("long name    (none)".to_string()),
            }
            let source = payload.source();
            lines.push(format!("source       {} bytes", source.len()));
            if !source.is_empty() {
                lines.push(String::from_utf8_lossy(source).into_owned());
            }
        }
        Err(err) => lines.push(format!("payload      (!) {err}")),
    }

    let stored = read_u16(buffer, payload_end);
    let computed = checksum(buffer, payload_end);
    let verdict = if stored == computed { "ok" } else { "(!) mismatch" };
    lines.push(format!(
        "checksum     {stored:#06x} stored, {computed:#06x} computed  {verdict}"
    ));

    Ok(lines.join("\n"))
}
