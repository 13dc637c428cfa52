/*!
    Table-driven description of a versioned device file layout.

    A layout is an ordered list of field descriptors. Parsing walks the list
    once with a [`Reader`]; a field may take its byte length from the value
    of an integer field parsed earlier in the same layout. Trailing bytes
    after the last field are never an error.
*/

use drm_core::{DeviceFamily, FieldValue, ReadError, Reader, Record};

use crate::error::FormatError;
use crate::resolver::VersionPolicy;

/**
    Byte length of a [`FieldKind::Bytes`] field.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Fixed(usize),
    /// Length is the value of an earlier integer field with this name.
    Field(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Constant signature; the bytes read must equal one of the accepted tags.
    Tag(&'static [&'static [u8]]),
    /// Single version byte.
    Version,
    Bytes(Length),
    /// Big-endian length of the given width followed by that many bytes.
    Prefixed(usize),
    /// Big-endian unsigned integer of the given width.
    UInt(usize),
    /// Big-endian unsigned integer with named values. Unknown values are kept.
    Enum(usize, &'static [(u64, &'static str)]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }

    /**
        Bytes this field occupies when every variable-length part is empty.
    */
    pub const fn min_size(&self) -> usize {
        match self.kind {
            FieldKind::Tag(tags) => match tags.first() {
                Some(tag) => tag.len(),
                None => 0,
            },
            FieldKind::Version => 1,
            FieldKind::Bytes(Length::Fixed(n)) => n,
            FieldKind::Bytes(Length::Field(_)) => 0,
            FieldKind::Prefixed(width) | FieldKind::UInt(width) | FieldKind::Enum(width, _) => {
                width
            }
        }
    }
}

/**
    One versioned arrangement of fields within a device family.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSpec {
    pub family: DeviceFamily,
    pub version: u8,
    pub fields: &'static [FieldSpec],
}

impl LayoutSpec {
    /**
        Smallest buffer that could possibly satisfy this layout.
    */
    pub const fn min_size(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].min_size();
            i += 1;
        }
        total
    }

    /**
        Parse `data` strictly in field order.

        Fails on the first field that cannot be read within bounds, on a
        signature that is not accepted, and, under [`VersionPolicy::Strict`],
        on a version byte that differs from this layout's version.
    */
    pub fn parse(&self, data: &[u8], policy: VersionPolicy) -> Result<Record, FormatError> {
        let mut reader = Reader::new(data);
        let mut record = Record::new();

        for field in self.fields {
            let oob = |source: ReadError| FormatError::OutOfBounds {
                field: field.name,
                source,
            };

            let value = match field.kind {
                FieldKind::Tag(accepted) => {
                    let width = field.min_size();
                    let found = reader.read_fixed(width).map_err(oob)?;
                    if !accepted.iter().any(|tag| *tag == found) {
                        return Err(FormatError::SignatureMismatch {
                            expected: accepted
                                .iter()
                                .map(|t| String::from_utf8_lossy(t).into_owned())
                                .collect::<Vec<_>>()
                                .join("/"),
                            found: String::from_utf8_lossy(found).into_owned(),
                        });
                    }
                    FieldValue::Bytes(found.to_vec())
                }
                FieldKind::Version => {
                    let found = reader.read_u8().map_err(oob)?;
                    if policy == VersionPolicy::Strict && found != self.version {
                        return Err(FormatError::VersionMismatch {
                            expected: self.version,
                            found,
                        });
                    }
                    FieldValue::UInt(found.into())
                }
                FieldKind::Bytes(Length::Fixed(n)) => {
                    FieldValue::Bytes(reader.read_fixed(n).map_err(oob)?.to_vec())
                }
                FieldKind::Bytes(Length::Field(length_field)) => {
                    let len = record
                        .get(length_field)
                        .and_then(FieldValue::as_uint)
                        .ok_or(FormatError::UnknownLengthField {
                            field: field.name,
                            length_field,
                        })?;
                    // A length that does not fit in usize can never be in bounds.
                    let len = usize::try_from(len).unwrap_or(usize::MAX);
                    FieldValue::Bytes(reader.read_fixed(len).map_err(oob)?.to_vec())
                }
                FieldKind::Prefixed(width) => {
                    FieldValue::Bytes(reader.read_length_prefixed(width).map_err(oob)?.to_vec())
                }
                FieldKind::UInt(width) => FieldValue::UInt(reader.read_uint(width).map_err(oob)?),
                FieldKind::Enum(width, names) => {
                    let value = reader.read_uint(width).map_err(oob)?;
                    let name = names
                        .iter()
                        .find(|(known, _)| *known == value)
                        .map(|(_, name)| *name);
                    FieldValue::Enum { value, name }
                }
            };

            record.push(field.name, value);
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const TAGS: &[&[u8]] = &[b"TST"];
    const COLORS: &[(u64, &str)] = &[(1, "RED"), (2, "GREEN")];

    const SAMPLE: LayoutSpec = LayoutSpec {
        family: DeviceFamily::Widevine,
        version: 1,
        fields: &[
            FieldSpec::new("signature", FieldKind::Tag(TAGS)),
            FieldSpec::new("version", FieldKind::Version),
            FieldSpec::new("color", FieldKind::Enum(1, COLORS)),
            FieldSpec::new("body_len", FieldKind::UInt(2)),
            FieldSpec::new("body", FieldKind::Bytes(Length::Field("body_len"))),
            FieldSpec::new("tail", FieldKind::Prefixed(1)),
            FieldSpec::new("pad", FieldKind::Bytes(Length::Fixed(2))),
        ],
    };

    #[test]
    fn min_size_counts_fixed_parts() {
        // 3 + 1 + 1 + 2 + 0 + 1 + 2
        assert_eq!(SAMPLE.min_size(), 10);
    }

    #[test]
    fn parses_every_kind() {
        let data = hex!("545354 01 02 0003 aabbcc 02 dddd eeff 99");
        let record = SAMPLE.parse(&data, VersionPolicy::Structural).unwrap();
        assert_eq!(
            record.get("color"),
            Some(&FieldValue::Enum {
                value: 2,
                name: Some("GREEN")
            })
        );
        assert_eq!(record.get("body_len").and_then(FieldValue::as_uint), Some(3));
        assert_eq!(
            record.get("body").and_then(FieldValue::as_bytes),
            Some(&hex!("aabbcc")[..])
        );
        assert_eq!(
            record.get("tail").and_then(FieldValue::as_bytes),
            Some(&hex!("dddd")[..])
        );
        assert_eq!(
            record.get("pad").and_then(FieldValue::as_bytes),
            Some(&hex!("eeff")[..])
        );
    }

    #[test]
    fn unknown_enum_value_is_kept() {
        let data = hex!("545354 01 07 0000 00 0000");
        let record = SAMPLE.parse(&data, VersionPolicy::Structural).unwrap();
        assert_eq!(
            record.get("color"),
            Some(&FieldValue::Enum {
                value: 7,
                name: None
            })
        );
    }

    #[test]
    fn dependent_length_past_end() {
        let data = hex!("545354 01 01 0100 aabb");
        let err = SAMPLE.parse(&data, VersionPolicy::Structural).unwrap_err();
        assert!(matches!(
            err,
            FormatError::OutOfBounds { field: "body", .. }
        ));
    }

    #[test]
    fn strict_version_check() {
        let data = hex!("545354 05 01 0000 00 0000");
        assert!(SAMPLE.parse(&data, VersionPolicy::Structural).is_ok());
        let err = SAMPLE.parse(&data, VersionPolicy::Strict).unwrap_err();
        assert_eq!(
            err,
            FormatError::VersionMismatch {
                expected: 1,
                found: 5
            }
        );
    }

    #[test]
    fn dangling_length_reference() {
        const BROKEN: LayoutSpec = LayoutSpec {
            family: DeviceFamily::Widevine,
            version: 1,
            fields: &[FieldSpec::new(
                "body",
                FieldKind::Bytes(Length::Field("missing")),
            )],
        };
        let err = BROKEN.parse(&[0; 8], VersionPolicy::Structural).unwrap_err();
        assert_eq!(
            err,
            FormatError::UnknownLengthField {
                field: "body",
                length_field: "missing"
            }
        );
    }
}
