// Path: crates/drp-codec/src/value.rs
//! A self-describing value tree carried through `Vertex.operation.value`
//! and wire `DRPStateWire` blobs.
//!
//! Unlike a plain `serde_json::Value`, this tree distinguishes `Set` from
//! `List` and preserves arbitrary-keyed `Map`s, so a DRP's state (which
//! may hold actual sets and maps) round-trips through the codec without
//! losing that shape. `F32Array` exists because typed numeric arrays
//! (e.g. embeddings) would otherwise decode back as a `List` of floats.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// A heterogeneous value carried through the wire codec.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// The absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A 64-bit float.
    Float(f64),
    /// A UTF-8 string.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// An ordered list. Order is caller-significant and preserved verbatim.
    List(Vec<Value>),
    /// A map with arbitrary (non-string-only) keys.
    Map(Vec<(Value, Value)>),
    /// A set. Membership, not order, is significant.
    Set(Vec<Value>),
    /// A fixed-width `f32` array (e.g. embeddings, coordinates).
    F32Array(Vec<f32>),
}

const TAG_NULL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_UINT: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_STR: u8 = 5;
const TAG_BYTES: u8 = 6;
const TAG_LIST: u8 = 7;
const TAG_MAP: u8 = 8;
const TAG_SET: u8 = 9;
const TAG_F32ARRAY: u8 = 10;

impl Value {
    /// Convenience constructor for a UTF-8 string value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Encodes this value, preserving the caller's given element/entry
    /// order for `List`, `Map`, and `Set`. This is the encoding used for
    /// `Vertex.dependencies`, which must stay in the author's given
    /// array order rather than any canonical sort.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write(&mut out, false);
        out
    }

    /// Encodes this value deterministically: `Map` entries are sorted by
    /// their encoded key bytes and `Set` elements by their encoded
    /// bytes, recursively. Used for content hashing.
    pub fn encode_canonical(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write(&mut out, true);
        out
    }

    fn write(&self, out: &mut Vec<u8>, canonical: bool) {
        match self {
            Value::Null => out.push(TAG_NULL),
            Value::Bool(b) => {
                out.push(TAG_BOOL);
                out.push(*b as u8);
            }
            Value::Int(i) => {
                out.push(TAG_INT);
                out.extend_from_slice(&i.to_le_bytes());
            }
            Value::UInt(u) => {
                out.push(TAG_UINT);
                out.extend_from_slice(&u.to_le_bytes());
            }
            Value::Float(f) => {
                out.push(TAG_FLOAT);
                out.extend_from_slice(&f.to_le_bytes());
            }
            Value::Str(s) => {
                out.push(TAG_STR);
                write_len_prefixed(out, s.as_bytes());
            }
            Value::Bytes(b) => {
                out.push(TAG_BYTES);
                write_len_prefixed(out, b);
            }
            Value::List(items) => {
                out.push(TAG_LIST);
                write_u32(out, items.len() as u32);
                for item in items {
                    item.write(out, canonical);
                }
            }
            Value::Map(entries) => {
                out.push(TAG_MAP);
                write_u32(out, entries.len() as u32);
                if canonical {
                    let mut encoded: Vec<(Vec<u8>, Vec<u8>)> = entries
                        .iter()
                        .map(|(k, v)| (k.encode_canonical(), v.encode_canonical()))
                        .collect();
                    encoded.sort_by(|a, b| a.0.cmp(&b.0));
                    for (k, v) in encoded {
                        write_len_prefixed(out, &k);
                        write_len_prefixed(out, &v);
                    }
                } else {
                    for (k, v) in entries {
                        k.write(out, canonical);
                        v.write(out, canonical);
                    }
                }
            }
            Value::Set(items) => {
                out.push(TAG_SET);
                write_u32(out, items.len() as u32);
                if canonical {
                    let mut encoded: Vec<Vec<u8>> =
                        items.iter().map(|v| v.encode_canonical()).collect();
                    encoded.sort();
                    for e in encoded {
                        write_len_prefixed(out, &e);
                    }
                } else {
                    for item in items {
                        item.write(out, canonical);
                    }
                }
            }
            Value::F32Array(arr) => {
                out.push(TAG_F32ARRAY);
                write_u32(out, arr.len() as u32);
                for f in arr {
                    out.extend_from_slice(&f.to_le_bytes());
                }
            }
        }
    }

    /// Decodes a value, requiring the entire input to be consumed.
    pub fn decode(bytes: &[u8]) -> Result<Value, CodecError> {
        let mut cursor = Cursor { buf: bytes, pos: 0 };
        let value = cursor.read_value()?;
        if cursor.pos != cursor.buf.len() {
            return Err(CodecError::TrailingBytes);
        }
        Ok(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

fn write_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    write_u32(out, bytes.len() as u32);
    out.extend_from_slice(bytes);
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.pos + n > self.buf.len() {
            return Err(CodecError::Truncated);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        let b = self.take(4)?;
        let arr: [u8; 4] = b.try_into().map_err(|_| CodecError::Truncated)?;
        Ok(u32::from_le_bytes(arr))
    }

    fn read_len_prefixed(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.read_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    fn read_value(&mut self) -> Result<Value, CodecError> {
        let tag = self.read_u8()?;
        match tag {
            TAG_NULL => Ok(Value::Null),
            TAG_BOOL => Ok(Value::Bool(self.read_u8()? != 0)),
            TAG_INT => {
                let b = self.take(8)?;
                let arr: [u8; 8] = b.try_into().map_err(|_| CodecError::Truncated)?;
                Ok(Value::Int(i64::from_le_bytes(arr)))
            }
            TAG_UINT => {
                let b = self.take(8)?;
                let arr: [u8; 8] = b.try_into().map_err(|_| CodecError::Truncated)?;
                Ok(Value::UInt(u64::from_le_bytes(arr)))
            }
            TAG_FLOAT => {
                let b = self.take(8)?;
                let arr: [u8; 8] = b.try_into().map_err(|_| CodecError::Truncated)?;
                Ok(Value::Float(f64::from_le_bytes(arr)))
            }
            TAG_STR => {
                let bytes = self.read_len_prefixed()?;
                String::from_utf8(bytes)
                    .map(Value::Str)
                    .map_err(|_| CodecError::InvalidUtf8)
            }
            TAG_BYTES => Ok(Value::Bytes(self.read_len_prefixed()?)),
            TAG_LIST => {
                let len = self.read_u32()?;
                let mut items = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    items.push(self.read_value()?);
                }
                Ok(Value::List(items))
            }
            TAG_MAP => {
                let len = self.read_u32()?;
                let mut entries = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    let k = self.read_len_prefixed()?;
                    let v = self.read_len_prefixed()?;
                    entries.push((Value::decode(&k)?, Value::decode(&v)?));
                }
                Ok(Value::Map(entries))
            }
            TAG_SET => {
                let len = self.read_u32()?;
                let mut items = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    let e = self.read_len_prefixed()?;
                    items.push(Value::decode(&e)?);
                }
                Ok(Value::Set(items))
            }
            TAG_F32ARRAY => {
                let len = self.read_u32()?;
                let mut arr = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    let b = self.take(4)?;
                    let a: [u8; 4] = b.try_into().map_err(|_| CodecError::Truncated)?;
                    arr.push(f32::from_le_bytes(a));
                }
                Ok(Value::F32Array(arr))
            }
            other => Err(CodecError::UnknownTag(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn primitives_roundtrip() {
        for v in [
            Value::Null,
            Value::Bool(true),
            Value::Bool(false),
            Value::Int(-42),
            Value::UInt(42),
            Value::Float(3.5),
            Value::Str("hello".into()),
            Value::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]),
        ] {
            let encoded = v.encode();
            assert_eq!(Value::decode(&encoded).unwrap(), v);
        }
    }

    #[test]
    fn nested_combination_roundtrips() {
        let value = Value::Map(vec![
            (
                Value::Str("m".into()),
                Value::Map(vec![
                    (Value::UInt(1), Value::Str("a".into())),
                    (Value::UInt(2), Value::Str("b".into())),
                ]),
            ),
            (
                Value::Str("s".into()),
                Value::Set(vec![Value::UInt(1), Value::UInt(2), Value::UInt(3)]),
            ),
            (
                Value::Str("f".into()),
                Value::F32Array(vec![1.1, 2.2, 3.3]),
            ),
            (
                Value::Str("nested".into()),
                Value::Map(vec![(
                    Value::Str("bytes".into()),
                    Value::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]),
                )]),
            ),
        ]);

        let encoded = value.encode();
        let decoded = Value::decode(&encoded).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn canonical_map_order_is_independent_of_insertion_order() {
        let a = Value::Map(vec![
            (Value::Str("b".into()), Value::Int(2)),
            (Value::Str("a".into()), Value::Int(1)),
        ]);
        let b = Value::Map(vec![
            (Value::Str("a".into()), Value::Int(1)),
            (Value::Str("b".into()), Value::Int(2)),
        ]);
        assert_eq!(a.encode_canonical(), b.encode_canonical());
        // But the non-canonical encoding is order-sensitive.
        assert_ne!(a.encode(), b.encode());
    }

    #[test]
    fn canonical_set_order_is_independent_of_insertion_order() {
        let a = Value::Set(vec![Value::UInt(3), Value::UInt(1), Value::UInt(2)]);
        let b = Value::Set(vec![Value::UInt(1), Value::UInt(2), Value::UInt(3)]);
        assert_eq!(a.encode_canonical(), b.encode_canonical());
    }

    #[test]
    fn deps_list_preserves_caller_order_under_plain_encode() {
        let deps_a = Value::List(vec![Value::Str("h1".into()), Value::Str("h2".into())]);
        let deps_b = Value::List(vec![Value::Str("h2".into()), Value::Str("h1".into())]);
        assert_ne!(deps_a.encode(), deps_b.encode());
    }

    #[test]
    fn truncated_input_is_rejected() {
        let encoded = Value::UInt(7).encode();
        let truncated = &encoded[..encoded.len() - 1];
        assert!(matches!(
            Value::decode(truncated),
            Err(CodecError::Truncated)
        ));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut encoded = Value::Bool(true).encode();
        encoded.push(0xFF);
        assert!(matches!(
            Value::decode(&encoded),
            Err(CodecError::TrailingBytes)
        ));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(matches!(
            Value::decode(&[0xFF]),
            Err(CodecError::UnknownTag(0xFF))
        ));
    }

    #[test]
    fn map_with_ordered_btreemap_fixture() {
        let mut expected = BTreeMap::new();
        expected.insert(1u64, "a".to_string());
        expected.insert(2u64, "b".to_string());

        let value = Value::Map(
            expected
                .iter()
                .map(|(k, v)| (Value::UInt(*k), Value::Str(v.clone())))
                .collect(),
        );
        let encoded = value.encode_canonical();
        let decoded = Value::decode(&encoded).unwrap();
        assert_eq!(decoded, value);
    }
}
