//! Typed SQL values as they travel between the gateway and storage nodes.
//!
//! A [`Value`] is a MySQL type tag plus the value's textual or binary
//! encoding. Integers are stored as their decimal text, exactly as they come
//! off the wire, so nothing here performs arithmetic.

use std::fmt;

use vgate_result::{Error, Result};

/// MySQL column type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Null,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Decimal,
    Text,
    Blob,
    VarChar,
    VarBinary,
    Char,
    Binary,
}

impl Type {
    pub fn is_signed(self) -> bool {
        matches!(self, Type::Int8 | Type::Int16 | Type::Int32 | Type::Int64)
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Type::Uint8 | Type::Uint16 | Type::Uint32 | Type::Uint64
        )
    }

    /// True for types whose SQL rendering needs quotes.
    pub fn is_quoted(self) -> bool {
        matches!(
            self,
            Type::Text
                | Type::Blob
                | Type::VarChar
                | Type::VarBinary
                | Type::Char
                | Type::Binary
        )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Null => "NULL_TYPE",
            Type::Int8 => "INT8",
            Type::Int16 => "INT16",
            Type::Int32 => "INT32",
            Type::Int64 => "INT64",
            Type::Uint8 => "UINT8",
            Type::Uint16 => "UINT16",
            Type::Uint32 => "UINT32",
            Type::Uint64 => "UINT64",
            Type::Float32 => "FLOAT32",
            Type::Float64 => "FLOAT64",
            Type::Decimal => "DECIMAL",
            Type::Text => "TEXT",
            Type::Blob => "BLOB",
            Type::VarChar => "VARCHAR",
            Type::VarBinary => "VARBINARY",
            Type::Char => "CHAR",
            Type::Binary => "BINARY",
        };
        f.write_str(name)
    }
}

/// A typed SQL value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Value {
    typ: Type,
    val: Vec<u8>,
}

impl Value {
    pub const NULL: Value = Value {
        typ: Type::Null,
        val: Vec::new(),
    };

    /// Build a value without validating that `val` is a legal encoding of `typ`.
    pub fn trusted(typ: Type, val: impl Into<Vec<u8>>) -> Self {
        let val = if typ == Type::Null { Vec::new() } else { val.into() };
        Self { typ, val }
    }

    pub fn int64(v: i64) -> Self {
        Self::trusted(Type::Int64, v.to_string())
    }

    pub fn uint64(v: u64) -> Self {
        Self::trusted(Type::Uint64, v.to_string())
    }

    pub fn varchar(v: impl Into<String>) -> Self {
        Self::trusted(Type::VarChar, v.into().into_bytes())
    }

    pub fn varbinary(v: impl Into<Vec<u8>>) -> Self {
        Self::trusted(Type::VarBinary, v)
    }

    /// Parse an integer literal, preferring `Int64` and falling back to
    /// `Uint64` for values above `i64::MAX`.
    pub fn integral(text: &str) -> Result<Self> {
        if let Ok(v) = text.parse::<i64>() {
            return Ok(Self::int64(v));
        }
        text.parse::<u64>().map(Self::uint64).map_err(|err| {
            Error::InvalidArgumentError(format!("invalid integer literal '{text}': {err}"))
        })
    }

    pub fn value_type(&self) -> Type {
        self.typ
    }

    pub fn is_null(&self) -> bool {
        self.typ == Type::Null
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.val
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.val.clone()
    }

    /// Interpret the value as an unsigned 64-bit integer.
    ///
    /// Signed types must parse as `i64` and be non-negative; unsigned types must
    /// parse as `u64`. Any other type is parsed best-effort, first as `i64` and
    /// then as `u64`.
    pub fn to_u64(&self) -> Result<u64> {
        let text = std::str::from_utf8(&self.val).map_err(|_| {
            Error::InvalidArgumentError(format!("could not parse value: {self}"))
        })?;
        let signed = |text: &str| -> Result<u64> {
            let v = text.parse::<i64>().map_err(|err| {
                Error::InvalidArgumentError(format!("could not parse value '{text}': {err}"))
            })?;
            u64::try_from(v).map_err(|_| {
                Error::InvalidArgumentError(format!(
                    "negative number cannot be converted to unsigned: {v}"
                ))
            })
        };
        if self.typ.is_signed() {
            return signed(text);
        }
        if self.typ.is_unsigned() {
            return text.parse::<u64>().map_err(|err| {
                Error::InvalidArgumentError(format!("could not parse value '{text}': {err}"))
            });
        }
        if text.parse::<i64>().is_ok() {
            return signed(text);
        }
        text.parse::<u64>().map_err(|err| {
            Error::InvalidArgumentError(format!("could not parse value '{text}': {err}"))
        })
    }
}

impl fmt::Display for Value {
    /// SQL-ish rendering: quoted for string and binary families, bare otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("NULL");
        }
        if self.typ.is_quoted() {
            match std::str::from_utf8(&self.val) {
                Ok(text) => write!(f, "'{}'", text.replace('\'', "''")),
                Err(_) => write!(f, "X'{}'", hex::encode(&self.val)),
            }
        } else {
            f.write_str(&String::from_utf8_lossy(&self.val))
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::int64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::uint64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::varchar(v)
    }
}
