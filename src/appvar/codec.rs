//! AppVar container codec (encode/decode)
//!
//! # Format
//!
//! ```text
//! offset  size  field
//! 0x00    11    signature ("**TI83F*" 1A 0A 00)
//! 0x0B    42    comment
//! 0x35    2     data size            (LE, entry tag through payload end)
//! 0x37    2     entry tag            (0D 00; checksum range starts here)
//! 0x39    2     outer payload size   (LE, inner size + 2)
//! 0x3B    1     variable-type id     (0x15)
//! 0x3C    8     variable name
//! 0x44    2     padding              (zero)
//! 0x46    2     outer payload size   (repeated)
//! 0x48    2     inner payload size   (LE)
//! 0x4A    ..    payload block        ("PYCD" ...)
//! end-2   2     checksum             (LE, sum over [0x37, end-2))
//! ```
//!
//! All multi-byte integers are little-endian; offsets are absolute.

use super::{
    APPVAR_TYPE_ID, CHECKSUM_LEN, COMMENT_LEN, ENTRY_TAG, Error, MIN_CONTAINER_LEN, OFFSET_COMMENT,
    OFFSET_ENTRY_TAG, OFFSET_INNER_SIZE, OFFSET_PAYLOAD, OFFSET_TYPE_ID, OFFSET_VAR_NAME, Payload,
    Record, Result, SIGNATURE, VAR_NAME_LEN, checksum,
};

/// Encode a record into a container buffer.
///
/// Never fails: the length invariants were enforced when the record was
/// constructed. The payload block is assembled first because the header's
/// size fields depend on its length; the checksum is computed last, over the
/// already-assembled buffer.
#[must_use]
pub fn encode(record: &Record) -> Vec<u8> {
    let payload = record.payload();
    let payload_len = payload.encoded_len();
    let total = OFFSET_PAYLOAD + payload_len + CHECKSUM_LEN;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&SIGNATURE);
    out.extend_from_slice(record.comment());

    let data_size = (OFFSET_PAYLOAD - OFFSET_ENTRY_TAG + payload_len) as u16;
    out.extend_from_slice(&data_size.to_le_bytes());
    out.extend_from_slice(&ENTRY_TAG);

    let outer_size = (payload_len + 2) as u16;
    out.extend_from_slice(&outer_size.to_le_bytes());
    out.push(APPVAR_TYPE_ID);
    out.extend_from_slice(record.var_name());
    out.extend_from_slice(&[0u8; 2]);
    // The device writes the outer size at 0x39 and again at 0x46.
    out.extend_from_slice(&outer_size.to_le_bytes());
    out.extend_from_slice(&(payload_len as u16).to_le_bytes());

    payload.compose_into(&mut out);

    let sum = checksum(&out, out.len());
    out.extend_from_slice(&sum.to_le_bytes());

    debug_assert_eq!(out.len(), total);
    out
}

/// Decode a container buffer into a record.
///
/// # Errors
///
/// - [`Error::InvalidFormat`] when the signature does not match
/// - [`Error::ParseError`] when the buffer is truncated or its declared
///   lengths are inconsistent
/// - [`Error::ChecksumMismatch`] when the trailing checksum disagrees with
///   the recomputed value; the variant carries the parsed fields for
///   diagnostics, but they must not be trusted
pub fn decode(buffer: &[u8]) -> Result<Record> {
    if buffer.len() < SIGNATURE.len() {
        return Err(Error::ParseError {
            reason: "buffer shorter than the file signature",
        });
    }
    if buffer[..SIGNATURE.len()] != SIGNATURE {
        return Err(Error::InvalidFormat);
    }
    if buffer.len() < MIN_CONTAINER_LEN {
        return Err(Error::ParseError {
            reason: "buffer shorter than the minimal container",
        });
    }
    if buffer[OFFSET_TYPE_ID] != APPVAR_TYPE_ID {
        return Err(Error::ParseError {
            reason: "entry is not a Python AppVar",
        });
    }

    let mut comment = [0u8; COMMENT_LEN];
    comment.copy_from_slice(&buffer[OFFSET_COMMENT..OFFSET_COMMENT + COMMENT_LEN]);
    let mut var_name = [0u8; VAR_NAME_LEN];
    var_name.copy_from_slice(&buffer[OFFSET_VAR_NAME..OFFSET_VAR_NAME + VAR_NAME_LEN]);

    let inner_size = u16::from_le_bytes(
        buffer[OFFSET_INNER_SIZE..OFFSET_INNER_SIZE + 2]
            .try_into()
            .unwrap(),
    ) as usize;
    let payload_end = OFFSET_PAYLOAD + inner_size;
    if buffer.len() < payload_end + CHECKSUM_LEN {
        return Err(Error::ParseError {
            reason: "declared payload size exceeds the buffer",
        });
    }

    let payload = Payload::parse(&buffer[OFFSET_PAYLOAD..payload_end])?;

    let stored = u16::from_le_bytes(
        buffer[payload_end..payload_end + CHECKSUM_LEN]
            .try_into()
            .unwrap(),
    );
    let computed = checksum(buffer, payload_end);

    let (long_name, source) = payload.into_parts();
    let record = Record::from_raw_parts(source, long_name, comment, var_name);

    if stored != computed {
        return Err(Error::ChecksumMismatch {
            computed,
            stored,
            record: Box::new(record),
        });
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appvar::{OFFSET_OUTER_SIZE, OFFSET_OUTER_SIZE_REPEAT};

    #[test]
    fn test_encode_decode_roundtrip() {
        let original = Record::new("from math import *\nprint(pi)\n", Some(b"MATHDEMO")).unwrap();
        let encoded = encode(&original);
        let decoded = decode(&encoded).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_roundtrip_with_long_name_and_comment() {
        let original = Record::new("print('hi')", Some(b"GREET"))
            .unwrap()
            .with_long_name("greeting.py")
            .unwrap()
            .with_comment(b"converted from greeting.py");
        let encoded = encode(&original);
        let decoded = decode(&encoded).unwrap();

        assert_eq!(decoded.source(), original.source());
        assert_eq!(decoded.long_name(), original.long_name());
        assert_eq!(decoded.comment(), original.comment());
        assert_eq!(decoded.var_name(), original.var_name());
    }

    #[test]
    fn test_concrete_layout() {
        let record = Record::new("print(1)", Some(b"DEMO")).unwrap();
        let encoded = encode(&record);

        // 0x4A fixed bytes + "PYCD" + NUL + 8 source bytes + 2 checksum.
        assert_eq!(encoded.len(), 89);
        assert_eq!(&encoded[..11], &SIGNATURE);
        assert_eq!(&encoded[0x35..0x37], &[24 + 8, 0]); // data size
        assert_eq!(&encoded[0x37..0x39], &ENTRY_TAG);
        assert_eq!(encoded[OFFSET_TYPE_ID], APPVAR_TYPE_ID);
        assert_eq!(&encoded[OFFSET_VAR_NAME..OFFSET_VAR_NAME + 8], b"DEMO\0\0\0\0");
        assert_eq!(&encoded[0x44..0x46], &[0, 0]);
        assert_eq!(&encoded[0x4A..0x4E], b"PYCD");
        assert_eq!(encoded[0x4E], 0x00); // NUL directly, no SOH
        assert_eq!(&encoded[0x4F..0x57], b"print(1)");

        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.source().as_ref(), b"print(1)");
        assert_eq!(decoded.var_name(), b"DEMO\0\0\0\0");
        assert_eq!(decoded.long_name(), None);
    }

    #[test]
    fn test_outer_size_written_twice() {
        let record = Record::new("a = 2", None).unwrap();
        let encoded = encode(&record);

        let first = &encoded[OFFSET_OUTER_SIZE..OFFSET_OUTER_SIZE + 2];
        let repeat = &encoded[OFFSET_OUTER_SIZE_REPEAT..OFFSET_OUTER_SIZE_REPEAT + 2];
        assert_eq!(first, repeat);

        let inner =
            u16::from_le_bytes(encoded[OFFSET_INNER_SIZE..OFFSET_INNER_SIZE + 2].try_into().unwrap());
        let outer = u16::from_le_bytes(first.try_into().unwrap());
        assert_eq!(outer, inner + 2);
    }

    #[test]
    fn test_decode_invalid_signature() {
        let record = Record::new("x", None).unwrap();
        let mut encoded = encode(&record);
        encoded[0] = 0x00;

        let result = decode(&encoded);
        assert!(matches!(result, Err(Error::InvalidFormat)));
    }

    #[test]
    fn test_decode_buffer_too_small() {
        let result = decode(&SIGNATURE[..8]);
        assert!(matches!(result, Err(Error::ParseError { .. })));

        // Valid signature but nothing after it.
        let result = decode(&SIGNATURE);
        assert!(matches!(result, Err(Error::ParseError { .. })));
    }

    #[test]
    fn test_decode_truncated_payload() {
        let record = Record::new("print('truncate me')", None).unwrap();
        let encoded = encode(&record);

        let result = decode(&encoded[..encoded.len() - 4]);
        assert!(matches!(result, Err(Error::ParseError { .. })));
    }

    #[test]
    fn test_decode_wrong_type_id() {
        let record = Record::new("x", None).unwrap();
        let mut encoded = encode(&record);
        encoded[OFFSET_TYPE_ID] = 0x05; // a Program entry, not an AppVar

        let result = decode(&encoded);
        assert!(matches!(result, Err(Error::ParseError { .. })));
    }

    #[test]
    fn test_checksum_mismatch_keeps_parsed_fields() {
        let record = Record::new("print(1)", Some(b"DEMO")).unwrap();
        let mut encoded = encode(&record);
        let last = encoded.len() - 1;
        encoded[last] ^= 0xFF;

        match decode(&encoded) {
            Err(Error::ChecksumMismatch {
                computed,
                stored,
                record: parsed,
            }) => {
                assert_ne!(computed, stored);
                assert_eq!(parsed.source().as_ref(), b"print(1)");
                assert_eq!(parsed.var_name(), b"DEMO\0\0\0\0");
            }
            other => panic!("expected ChecksumMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_source_roundtrip() {
        let record = Record::new("", None).unwrap();
        let encoded = encode(&record);
        assert_eq!(encoded.len(), MIN_CONTAINER_LEN);

        let decoded = decode(&encoded).unwrap();
        assert!(decoded.source().is_empty());
    }

    // Property-based tests
    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn source_strategy() -> impl Strategy<Value = Vec<u8>> {
            prop::collection::vec(any::<u8>(), 0..=2048)
        }

        fn name_strategy() -> impl Strategy<Value = Option<Vec<u8>>> {
            prop::option::of(prop::collection::vec(any::<u8>(), 1..=255))
        }

        fn var_name_strategy() -> impl Strategy<Value = Vec<u8>> {
            prop::collection::vec(any::<u8>(), 0..=16)
        }

        fn build(source: &[u8], long_name: Option<&[u8]>, var_name: &[u8]) -> Record {
            let record = Record::new(source.to_vec(), Some(var_name)).unwrap();
            match long_name {
                Some(name) => record.with_long_name(name.to_vec()).unwrap(),
                None => record,
            }
        }

        proptest! {
            /// Any record with valid field lengths roundtrips exactly.
            #[test]
            fn prop_roundtrip_preserves_record(
                source in source_strategy(),
                long_name in name_strategy(),
                var_name in var_name_strategy(),
            ) {
                let original = build(&source, long_name.as_deref(), &var_name);
                let encoded = encode(&original);
                let decoded = decode(&encoded).unwrap();

                prop_assert_eq!(decoded.source(), original.source());
                prop_assert_eq!(decoded.long_name(), original.long_name());
                prop_assert_eq!(decoded.var_name(), original.var_name());
            }

            /// The stored variable name is the input truncated to 8 bytes.
            #[test]
            fn prop_var_name_truncation(var_name in prop::collection::vec(any::<u8>(), 9..=32)) {
                let record = Record::new("x", Some(&var_name)).unwrap();
                prop_assert_eq!(&record.var_name()[..], &var_name[..8]);
            }

            /// Corrupting any checksum byte is detected.
            #[test]
            fn prop_checksum_corruption_detected(
                source in source_strategy(),
                corrupt_last in any::<bool>(),
                corrupt_value in 1u8..=255,
            ) {
                let record = Record::new(source, None).unwrap();
                let mut encoded = encode(&record);
                let len = encoded.len();
                let offset = if corrupt_last { len - 1 } else { len - 2 };
                encoded[offset] ^= corrupt_value;

                let result = decode(&encoded);
                prop_assert!(matches!(result, Err(Error::ChecksumMismatch { .. })), "expected ChecksumMismatch");
            }

            /// Flipping a payload byte fails verification.
            #[test]
            fn prop_payload_corruption_detected(
                source in source_strategy().prop_filter("non-empty", |s| !s.is_empty()),
                offset_ratio in 0.0f64..1.0,
                corrupt_value in 1u8..=255,
            ) {
                let record = Record::new(source.clone(), None).unwrap();
                let mut encoded = encode(&record);

                let start = OFFSET_PAYLOAD + 5;
                let offset = start + (source.len() as f64 * offset_ratio) as usize % source.len();
                encoded[offset] ^= corrupt_value;

                let result = decode(&encoded);
                prop_assert!(result.is_err(), "corrupted source byte must not verify");
            }

            /// Encoding is deterministic and its length is exactly determined
            /// by the source and filename lengths.
            #[test]
            fn prop_encoded_length(
                source in source_strategy(),
                long_name in name_strategy(),
            ) {
                let record = build(&source, long_name.as_deref(), b"LEN");
                let encoded = encode(&record);
                let name_overhead = long_name.as_ref().map_or(0, |n| n.len() + 2);
                prop_assert_eq!(encoded.len(), 81 + source.len() + name_overhead);
                prop_assert_eq!(encode(&record), encoded);
            }
        }
    }
}
