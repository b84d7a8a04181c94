// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Clarity value consensus serialization.
//!
//! Read-only calls return their value hex-encoded in this format; contract
//! call arguments are sent the same way.

use std::collections::BTreeMap;
use std::fmt;

use super::c32::StacksAddress;
use super::types::QueryResult;

/// Clarity's own nesting limit.
const MAX_DEPTH: usize = 32;

const TYPE_INT: u8 = 0x00;
const TYPE_UINT: u8 = 0x01;
const TYPE_BUFFER: u8 = 0x02;
const TYPE_TRUE: u8 = 0x03;
const TYPE_FALSE: u8 = 0x04;
const TYPE_STANDARD_PRINCIPAL: u8 = 0x05;
const TYPE_CONTRACT_PRINCIPAL: u8 = 0x06;
const TYPE_RESPONSE_OK: u8 = 0x07;
const TYPE_RESPONSE_ERR: u8 = 0x08;
const TYPE_OPTIONAL_NONE: u8 = 0x09;
const TYPE_OPTIONAL_SOME: u8 = 0x0a;
const TYPE_LIST: u8 = 0x0b;
const TYPE_TUPLE: u8 = 0x0c;
const TYPE_STRING_ASCII: u8 = 0x0d;
const TYPE_STRING_UTF8: u8 = 0x0e;

/// A decoded Clarity value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClarityValue {
    Int(i128),
    UInt(u128),
    Buffer(Vec<u8>),
    Bool(bool),
    StandardPrincipal(StacksAddress),
    ContractPrincipal(StacksAddress, String),
    ResponseOk(Box<ClarityValue>),
    ResponseErr(Box<ClarityValue>),
    OptionalNone,
    OptionalSome(Box<ClarityValue>),
    List(Vec<ClarityValue>),
    Tuple(BTreeMap<String, ClarityValue>),
    StringAscii(String),
    StringUtf8(String),
}

/// Errors produced while decoding a serialized value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid hex: {0}")]
    Hex(String),

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unknown type prefix 0x{0:02x}")]
    UnknownType(u8),

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    #[error("value nested deeper than 32 levels")]
    TooDeep,

    #[error("invalid string: {0}")]
    InvalidString(String),

    #[error("invalid principal: {0}")]
    InvalidPrincipal(String),
}

/// Encode a `uint` argument as `0x`-prefixed hex.
pub fn encode_uint_hex(value: u128) -> String {
    let mut bytes = Vec::with_capacity(17);
    bytes.push(TYPE_UINT);
    bytes.extend_from_slice(&value.to_be_bytes());
    format!("0x{}", hex::encode(bytes))
}

impl ClarityValue {
    /// Decode a `0x`-prefixed (or bare) hex string.
    pub fn from_hex(input: &str) -> Result<Self, DecodeError> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|e| DecodeError::Hex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Decode exactly one value from `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader { bytes, pos: 0 };
        let value = reader.value(0)?;
        let remaining = bytes.len() - reader.pos;
        if remaining != 0 {
            return Err(DecodeError::TrailingBytes(remaining));
        }
        Ok(value)
    }

    /// Flatten into a plain value.
    ///
    /// `ok` and `some` wrappers are unwrapped. An `err` response anywhere in
    /// the value is returned as `Err` with the flattened error payload.
    pub fn normalize(self) -> Result<QueryResult, QueryResult> {
        Ok(match self {
            ClarityValue::Int(v) => QueryResult::Int(v),
            ClarityValue::UInt(v) => QueryResult::UInt(v),
            ClarityValue::Buffer(bytes) => QueryResult::Text(format!("0x{}", hex::encode(bytes))),
            ClarityValue::Bool(v) => QueryResult::Bool(v),
            ClarityValue::StandardPrincipal(address) => QueryResult::Text(address.to_string()),
            ClarityValue::ContractPrincipal(address, name) => {
                QueryResult::Text(format!("{address}.{name}"))
            }
            ClarityValue::ResponseOk(inner) => inner.normalize()?,
            ClarityValue::ResponseErr(inner) => {
                return Err(inner.normalize().unwrap_or_else(|nested| nested));
            }
            ClarityValue::OptionalNone => QueryResult::Null,
            ClarityValue::OptionalSome(inner) => inner.normalize()?,
            ClarityValue::List(items) => QueryResult::List(
                items
                    .into_iter()
                    .map(ClarityValue::normalize)
                    .collect::<Result<_, _>>()?,
            ),
            ClarityValue::Tuple(fields) => QueryResult::Map(
                fields
                    .into_iter()
                    .map(|(name, value)| value.normalize().map(|v| (name, v)))
                    .collect::<Result<_, _>>()?,
            ),
            ClarityValue::StringAscii(s) | ClarityValue::StringUtf8(s) => QueryResult::Text(s),
        })
    }
}

impl fmt::Display for ClarityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClarityValue::Int(v) => write!(f, "{v}"),
            ClarityValue::UInt(v) => write!(f, "u{v}"),
            ClarityValue::Buffer(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            ClarityValue::Bool(v) => write!(f, "{v}"),
            ClarityValue::StandardPrincipal(address) => write!(f, "'{address}"),
            ClarityValue::ContractPrincipal(address, name) => write!(f, "'{address}.{name}"),
            ClarityValue::ResponseOk(inner) => write!(f, "(ok {inner})"),
            ClarityValue::ResponseErr(inner) => write!(f, "(err {inner})"),
            ClarityValue::OptionalNone => write!(f, "none"),
            ClarityValue::OptionalSome(inner) => write!(f, "(some {inner})"),
            ClarityValue::List(items) => {
                write!(f, "(list")?;
                for item in items {
                    write!(f, " {item}")?;
                }
                write!(f, ")")
            }
            ClarityValue::Tuple(fields) => {
                write!(f, "(tuple")?;
                for (name, value) in fields {
                    write!(f, " ({name} {value})")?;
                }
                write!(f, ")")
            }
            ClarityValue::StringAscii(s) => write!(f, "{s:?}"),
            ClarityValue::StringUtf8(s) => write!(f, "u{s:?}"),
        }
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.checked_add(n).ok_or(DecodeError::UnexpectedEnd)?;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(DecodeError::UnexpectedEnd)?;
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(buf))
    }

    fn sixteen(&mut self) -> Result<[u8; 16], DecodeError> {
        let mut buf = [0u8; 16];
        buf.copy_from_slice(self.take(16)?);
        Ok(buf)
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn address(&mut self) -> Result<StacksAddress, DecodeError> {
        let version = self.u8()?;
        let mut hash160 = [0u8; 20];
        hash160.copy_from_slice(self.take(20)?);
        StacksAddress::new(version, hash160)
            .map_err(|e| DecodeError::InvalidPrincipal(e.to_string()))
    }

    fn short_name(&mut self) -> Result<String, DecodeError> {
        let len = usize::from(self.u8()?);
        let raw = self.take(len)?;
        if !raw.is_ascii() {
            return Err(DecodeError::InvalidString("non-ASCII name".to_string()));
        }
        String::from_utf8(raw.to_vec()).map_err(|e| DecodeError::InvalidString(e.to_string()))
    }

    fn value(&mut self, depth: usize) -> Result<ClarityValue, DecodeError> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::TooDeep);
        }
        let prefix = self.u8()?;
        Ok(match prefix {
            TYPE_INT => ClarityValue::Int(i128::from_be_bytes(self.sixteen()?)),
            TYPE_UINT => ClarityValue::UInt(u128::from_be_bytes(self.sixteen()?)),
            TYPE_BUFFER => {
                let len = self.u32()? as usize;
                ClarityValue::Buffer(self.take(len)?.to_vec())
            }
            TYPE_TRUE => ClarityValue::Bool(true),
            TYPE_FALSE => ClarityValue::Bool(false),
            TYPE_STANDARD_PRINCIPAL => ClarityValue::StandardPrincipal(self.address()?),
            TYPE_CONTRACT_PRINCIPAL => {
                let address = self.address()?;
                let name = self.short_name()?;
                ClarityValue::ContractPrincipal(address, name)
            }
            TYPE_RESPONSE_OK => ClarityValue::ResponseOk(Box::new(self.value(depth + 1)?)),
            TYPE_RESPONSE_ERR => ClarityValue::ResponseErr(Box::new(self.value(depth + 1)?)),
            TYPE_OPTIONAL_NONE => ClarityValue::OptionalNone,
            TYPE_OPTIONAL_SOME => ClarityValue::OptionalSome(Box::new(self.value(depth + 1)?)),
            TYPE_LIST => {
                let len = self.u32()? as usize;
                // every element takes at least one byte
                let mut items = Vec::with_capacity(len.min(self.remaining()));
                for _ in 0..len {
                    items.push(self.value(depth + 1)?);
                }
                ClarityValue::List(items)
            }
            TYPE_TUPLE => {
                let len = self.u32()? as usize;
                let mut fields = BTreeMap::new();
                for _ in 0..len {
                    let name = self.short_name()?;
                    let value = self.value(depth + 1)?;
                    fields.insert(name, value);
                }
                ClarityValue::Tuple(fields)
            }
            TYPE_STRING_ASCII => {
                let len = self.u32()? as usize;
                let raw = self.take(len)?;
                if !raw.is_ascii() {
                    return Err(DecodeError::InvalidString(
                        "non-ASCII byte in string-ascii".to_string(),
                    ));
                }
                ClarityValue::StringAscii(
                    String::from_utf8(raw.to_vec())
                        .map_err(|e| DecodeError::InvalidString(e.to_string()))?,
                )
            }
            TYPE_STRING_UTF8 => {
                let len = self.u32()? as usize;
                let raw = self.take(len)?;
                ClarityValue::StringUtf8(
                    String::from_utf8(raw.to_vec())
                        .map_err(|e| DecodeError::InvalidString(e.to_string()))?,
                )
            }
            other => return Err(DecodeError::UnknownType(other)),
        })
    }
}
