//! Decoded AppVar record

use bytes::Bytes;

use super::{
    COMMENT_LEN, DEFAULT_VAR_NAME, Error, MAX_LONG_NAME_LEN, MAX_SOURCE_LEN, Payload, Result,
    VAR_NAME_LEN,
};

/// One Python AppVar: program text plus container metadata.
///
/// A record is constructed once (from caller-supplied text, or by decoding a
/// container) and never mutated afterwards. The builder-style methods
/// consume the record and return a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Program text. Length fits in 16 bits.
    source: Bytes,
    /// Long filename stored inside the payload. Length fits in 8 bits.
    long_name: Option<Bytes>,
    /// Free-form comment, not null-terminated.
    comment: [u8; COMMENT_LEN],
    /// Name visible on the calculator, not null-terminated.
    var_name: [u8; VAR_NAME_LEN],
}

/// Copy `value` into a fixed-width field: zero-padded when shorter,
/// truncated when longer. Never fails.
fn fixed<const N: usize>(value: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let n = value.len().min(N);
    out[..n].copy_from_slice(&value[..n]);
    out
}

/// Trailing NUL/space padding stripped, remainder decoded lossily.
fn trimmed_lossy(field: &[u8]) -> String {
    let end = field
        .iter()
        .rposition(|&b| b != 0 && b != b' ')
        .map_or(0, |i| i + 1);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

impl Record {
    /// Create a record with minimal metadata.
    ///
    /// `var_name` is truncated to 8 bytes and zero-padded; `None` selects the
    /// default placeholder name. The comment starts out zeroed.
    pub fn new(source: impl Into<Bytes>, var_name: Option<&[u8]>) -> Result<Self> {
        let source = source.into();
        if source.len() > MAX_SOURCE_LEN {
            return Err(Error::InvalidInput {
                field: "source",
                len: source.len(),
                max: MAX_SOURCE_LEN,
            });
        }

        Ok(Self {
            source,
            long_name: None,
            comment: [0; COMMENT_LEN],
            var_name: var_name.map_or(DEFAULT_VAR_NAME, fixed::<VAR_NAME_LEN>),
        })
    }

    /// Attach a long filename to be embedded in the payload.
    ///
    /// The filename spends `len + 2` bytes of the same 16-bit size allowance
    /// the source draws from, on top of its own 8-bit length field.
    pub fn with_long_name(self, name: impl Into<Bytes>) -> Result<Self> {
        let name = name.into();
        let allowance = (MAX_SOURCE_LEN - self.source.len()).saturating_sub(2);
        if name.len() > MAX_LONG_NAME_LEN.min(allowance) {
            return Err(Error::InvalidInput {
                field: "long name",
                len: name.len(),
                max: MAX_LONG_NAME_LEN.min(allowance),
            });
        }

        Ok(Self {
            long_name: Some(name),
            ..self
        })
    }

    /// Set the comment field, truncated or zero-padded to 42 bytes.
    #[must_use]
    pub fn with_comment(self, comment: &[u8]) -> Self {
        Self {
            comment: fixed(comment),
            ..self
        }
    }

    /// Assemble a record from already-validated container fields.
    ///
    /// The decoder's field widths bound every length, so no checks run here.
    pub(crate) fn from_raw_parts(
        source: Bytes,
        long_name: Option<Bytes>,
        comment: [u8; COMMENT_LEN],
        var_name: [u8; VAR_NAME_LEN],
    ) -> Self {
        Self {
            source,
            long_name,
            comment,
            var_name,
        }
    }

    /// The invalid sentinel: every field zero or empty.
    ///
    /// A legal return value signaling a failed construction, not an
    /// initialized record that happens to be empty.
    #[must_use]
    pub fn invalid() -> Self {
        Self {
            source: Bytes::new(),
            long_name: None,
            comment: [0; COMMENT_LEN],
            var_name: [0; VAR_NAME_LEN],
        }
    }

    /// Whether this record is anything other than the invalid sentinel.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        *self != Self::invalid()
    }

    /// Program text.
    #[must_use]
    pub fn source(&self) -> &Bytes {
        &self.source
    }

    /// Embedded long filename, if any.
    #[must_use]
    pub fn long_name(&self) -> Option<&Bytes> {
        self.long_name.as_ref()
    }

    /// Raw 42-byte comment field.
    #[must_use]
    pub const fn comment(&self) -> &[u8; COMMENT_LEN] {
        &self.comment
    }

    /// Raw 8-byte variable name field.
    #[must_use]
    pub const fn var_name(&self) -> &[u8; VAR_NAME_LEN] {
        &self.var_name
    }

    /// Variable name with trailing padding stripped, decoded lossily.
    #[must_use]
    pub fn var_name_lossy(&self) -> String {
        trimmed_lossy(&self.var_name)
    }

    /// Comment with trailing padding stripped, decoded lossily.
    #[must_use]
    pub fn comment_lossy(&self) -> String {
        trimmed_lossy(&self.comment)
    }

    /// The inner payload block for this record.
    #[must_use]
    pub fn payload(&self) -> Payload {
        match &self.long_name {
            Some(name) => Payload::Named {
                name: name.clone(),
                source: self.source.clone(),
            },
            None => Payload::Bare(self.source.clone()),
        }
    }

    /// Encode this record into a container buffer.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        super::encode(self)
    }

    /// Decode a record from a container buffer.
    pub fn decode(buffer: &[u8]) -> Result<Self> {
        super::decode(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_var_name() {
        let record = Record::new("print(1)", None).unwrap();
        assert_eq!(record.var_name(), b"TIPYFILE");
    }

    #[test]
    fn test_var_name_truncated_to_eight_bytes() {
        let record = Record::new("x = 1", Some(b"LONGERNAME")).unwrap();
        assert_eq!(record.var_name(), b"LONGERNA");
    }

    #[test]
    fn test_short_var_name_zero_padded() {
        let record = Record::new("x = 1", Some(b"DEMO")).unwrap();
        assert_eq!(record.var_name(), b"DEMO\0\0\0\0");
        assert_eq!(record.var_name_lossy(), "DEMO");
    }

    #[test]
    fn test_comment_truncated_and_padded() {
        let record = Record::new("x", None).unwrap().with_comment(b"hi");
        assert_eq!(&record.comment()[..2], b"hi");
        assert!(record.comment()[2..].iter().all(|&b| b == 0));

        let long = [b'a'; 60];
        let record = Record::new("x", None).unwrap().with_comment(&long);
        assert_eq!(record.comment(), &[b'a'; 42]);
    }

    #[test]
    fn test_oversized_source_rejected() {
        let source = vec![b'#'; MAX_SOURCE_LEN + 1];
        let result = Record::new(source, None);
        assert!(matches!(
            result,
            Err(Error::InvalidInput { field: "source", .. })
        ));
    }

    #[test]
    fn test_oversized_long_name_rejected() {
        let name = vec![b'n'; MAX_LONG_NAME_LEN + 1];
        let result = Record::new("x", None).unwrap().with_long_name(name);
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_max_lengths_accepted() {
        let record = Record::new(vec![b'#'; MAX_SOURCE_LEN], None).unwrap();
        assert_eq!(record.source().len(), MAX_SOURCE_LEN);

        let record = Record::new("x", None)
            .unwrap()
            .with_long_name(vec![b'n'; MAX_LONG_NAME_LEN])
            .unwrap();
        assert_eq!(record.long_name().unwrap().len(), MAX_LONG_NAME_LEN);
    }

    #[test]
    fn test_long_name_cannot_push_sizes_past_16_bits() {
        // A near-maximal source leaves no allowance for a filename.
        let source = vec![b'#'; MAX_SOURCE_LEN - 4];
        let result = Record::new(source, None).unwrap().with_long_name("ab.py");
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_invalid_sentinel() {
        let sentinel = Record::invalid();
        assert!(!sentinel.is_valid());
        assert!(sentinel.source().is_empty());
        assert!(sentinel.long_name().is_none());

        let record = Record::new("print(1)", None).unwrap();
        assert!(record.is_valid());
    }

    #[test]
    fn test_payload_variant_follows_long_name() {
        let bare = Record::new("src", Some(b"A")).unwrap();
        assert!(matches!(bare.payload(), Payload::Bare(_)));

        let named = bare.with_long_name("a.py").unwrap();
        assert!(matches!(named.payload(), Payload::Named { .. }));
    }
}
