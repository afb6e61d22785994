//! Page token codec
//!
//! A page token is the opaque cursor handed to clients between pages. It is
//! serialized into a checksummed binary record and then encoded as URL-safe
//! base64 without padding.
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, whole record)
//! +------------------+
//! | Version          | (u8)
//! +------------------+
//! | Parent           | (length-prefixed string)
//! +------------------+
//! | Filter           | (length-prefixed string)
//! +------------------+
//! | Last Item Flag   | (u8: 0 = absent, 1 = present)
//! +------------------+
//! | Item ID          | (length-prefixed string)       present items only
//! | Order Flag       | (u8)
//! | Field Name       | (length-prefixed string)       present orders only
//! | Seconds          | (i64 LE)
//! | Nanos            | (u32 LE)
//! | Direction        | (u8: 0 = ascending, 1 = descending)
//! +------------------+
//! | Checksum         | (u32 LE, CRC32 over length + body)
//! +------------------+
//! ```

use std::io::{Cursor, Read};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use super::errors::{ListerError, ListerResult};

const VERSION: u8 = 1;

/// Length prefix + checksum
const FRAME_OVERHEAD: usize = 8;

/// Sort direction of the order column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    /// SQL keyword
    pub fn sql(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }

    /// Parses `ASC` or `DESC`, in any case
    pub fn from_sql(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("ASC") {
            Some(Direction::Ascending)
        } else if s.eq_ignore_ascii_case("DESC") {
            Some(Direction::Descending)
        } else {
            None
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Direction::Ascending => 0,
            Direction::Descending => 1,
        }
    }

    fn from_byte(b: u8) -> ListerResult<Self> {
        match b {
            0 => Ok(Direction::Ascending),
            1 => Ok(Direction::Descending),
            other => Err(ListerError::decode(format!("invalid direction byte {}", other))),
        }
    }
}

/// Order column value of the last item on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Field name as the client wrote it in `order_by`
    pub field_name: String,
    pub value: DateTime<Utc>,
    pub direction: Direction,
}

/// Last item returned on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub order_by: Option<Order>,
}

/// Pagination cursor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageToken {
    #[serde(default)]
    pub parent: String,
    #[serde(default)]
    pub filter: String,
    #[serde(default)]
    pub last_item: Option<Item>,
}

impl PageToken {
    fn serialize_body(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.push(VERSION);
        write_string(&mut buf, &self.parent);
        write_string(&mut buf, &self.filter);

        match &self.last_item {
            None => buf.push(0),
            Some(item) => {
                buf.push(1);
                write_string(&mut buf, &item.id);
                match &item.order_by {
                    None => buf.push(0),
                    Some(order) => {
                        buf.push(1);
                        write_string(&mut buf, &order.field_name);
                        buf.extend_from_slice(&order.value.timestamp().to_le_bytes());
                        buf.extend_from_slice(&order.value.timestamp_subsec_nanos().to_le_bytes());
                        buf.push(order.direction.to_byte());
                    }
                }
            }
        }

        buf
    }

    /// Serializes the token into its checksummed binary record
    pub fn to_bytes(&self) -> Vec<u8> {
        let body = self.serialize_body();
        let record_length = (FRAME_OVERHEAD + body.len()) as u32;

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.extend_from_slice(&body);

        let checksum = compute_checksum(&record);
        record.extend_from_slice(&checksum.to_le_bytes());
        record
    }

    /// Parses a binary record, verifying length and checksum
    pub fn from_bytes(data: &[u8]) -> ListerResult<Self> {
        if data.len() < FRAME_OVERHEAD {
            return Err(ListerError::decode("token too short"));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if record_length != data.len() {
            return Err(ListerError::decode(format!(
                "token length mismatch: header says {} bytes, got {}",
                record_length,
                data.len()
            )));
        }

        let checksum_offset = record_length - 4;
        let stored = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);
        let computed = compute_checksum(&data[..checksum_offset]);
        if computed != stored {
            return Err(ListerError::decode(format!(
                "checksum mismatch: computed {:08x}, stored {:08x}",
                computed, stored
            )));
        }

        let body = &data[4..checksum_offset];
        let mut cursor = Cursor::new(body);

        let version = read_u8(&mut cursor)?;
        if version != VERSION {
            return Err(ListerError::decode(format!("unsupported token version {}", version)));
        }

        let parent = read_string(&mut cursor)?;
        let filter = read_string(&mut cursor)?;

        let last_item = if read_flag(&mut cursor)? {
            let id = read_string(&mut cursor)?;
            let order_by = if read_flag(&mut cursor)? {
                let field_name = read_string(&mut cursor)?;
                let seconds = i64::from_le_bytes(read_array(&mut cursor)?);
                let nanos = u32::from_le_bytes(read_array(&mut cursor)?);
                let direction = Direction::from_byte(read_u8(&mut cursor)?)?;
                let value = Utc
                    .timestamp_opt(seconds, nanos)
                    .single()
                    .ok_or_else(|| ListerError::decode("timestamp out of range"))?;
                Some(Order {
                    field_name,
                    value,
                    direction,
                })
            } else {
                None
            };
            Some(Item { id, order_by })
        } else {
            None
        };

        if (cursor.position() as usize) != body.len() {
            return Err(ListerError::decode("trailing bytes after token body"));
        }

        Ok(Self {
            parent,
            filter,
            last_item,
        })
    }
}

/// Encodes a token for transport
pub fn encode(token: &PageToken) -> String {
    URL_SAFE_NO_PAD.encode(token.to_bytes())
}

/// Decodes a token produced by [`encode`]
pub fn decode(token: &str) -> ListerResult<PageToken> {
    let data = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| ListerError::decode(format!("malformed base64: {}", e)))?;
    PageToken::from_bytes(&data)
}

fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

fn read_array<const N: usize>(cursor: &mut Cursor<&[u8]>) -> ListerResult<[u8; N]> {
    let mut buf = [0u8; N];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| ListerError::decode("token truncated"))?;
    Ok(buf)
}

fn read_u8(cursor: &mut Cursor<&[u8]>) -> ListerResult<u8> {
    let [b] = read_array::<1>(cursor)?;
    Ok(b)
}

fn read_flag(cursor: &mut Cursor<&[u8]>) -> ListerResult<bool> {
    match read_u8(cursor)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(ListerError::decode(format!("invalid presence flag {}", other))),
    }
}

fn read_string(cursor: &mut Cursor<&[u8]>) -> ListerResult<String> {
    let len = u32::from_le_bytes(read_array(cursor)?) as usize;
    let remaining = cursor.get_ref().len() - cursor.position() as usize;
    if len > remaining {
        return Err(ListerError::decode("token truncated"));
    }

    let mut buf = vec![0u8; len];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| ListerError::decode("token truncated"))?;
    String::from_utf8(buf).map_err(|e| ListerError::decode(format!("invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PageToken {
        PageToken {
            parent: "foo".into(),
            filter: "summary.status == SUCCESS".into(),
            last_item: Some(Item {
                id: "42".into(),
                order_by: Some(Order {
                    field_name: "create_time".into(),
                    value: Utc.timestamp_opt(1_667_166_300, 123_456_789).unwrap(),
                    direction: Direction::Ascending,
                }),
            }),
        }
    }

    #[test]
    fn test_roundtrip_with_order() {
        let token = sample();
        let encoded = encode(&token);
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert_eq!(decode(&encoded).unwrap(), token);
    }

    #[test]
    fn test_roundtrip_without_last_item() {
        let token = PageToken {
            parent: "-".into(),
            filter: String::new(),
            last_item: None,
        };
        assert_eq!(decode(&encode(&token)).unwrap(), token);
    }

    #[test]
    fn test_deterministic_encoding() {
        assert_eq!(encode(&sample()), encode(&sample()));
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let mut bytes = sample().to_bytes();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;

        let err = PageToken::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"));
    }

    #[test]
    fn test_truncated_token() {
        let bytes = sample().to_bytes();
        let err = PageToken::from_bytes(&bytes[..bytes.len() - 3]).unwrap_err();
        assert_eq!(err.code(), "LIST_TOKEN_DECODE_FAILED");
        assert!(PageToken::from_bytes(&[1, 2]).is_err());
    }

    #[test]
    fn test_bad_flag_byte() {
        let token = PageToken::default();
        let mut body = token.serialize_body();
        let flag = body.len() - 1;
        body[flag] = 7;

        let mut record = ((FRAME_OVERHEAD + body.len()) as u32).to_le_bytes().to_vec();
        record.extend_from_slice(&body);
        let checksum = compute_checksum(&record);
        record.extend_from_slice(&checksum.to_le_bytes());

        let err = PageToken::from_bytes(&record).unwrap_err();
        assert!(err.to_string().contains("presence flag"));
    }

    #[test]
    fn test_malformed_base64() {
        let err = decode("not base64!").unwrap_err();
        assert!(err.to_string().starts_with("invalid page token"));
    }

    #[test]
    fn test_direction_sql() {
        assert_eq!(Direction::from_sql("desc"), Some(Direction::Descending));
        assert_eq!(Direction::from_sql("ASC"), Some(Direction::Ascending));
        assert_eq!(Direction::from_sql("up"), None);
        assert_eq!(Direction::Descending.sql(), "DESC");
    }
}
