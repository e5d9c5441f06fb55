use std::{fmt, str::FromStr};

use thiserror::Error;

/// Identifies how one argument or return value is laid out on the wire.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TypeCode {
    U64,
    I64,
    F32,
    F64,
    Str,
    Bool,
}

impl TypeCode {
    pub const ALL: [TypeCode; 6] = [
        TypeCode::U64,
        TypeCode::I64,
        TypeCode::F32,
        TypeCode::F64,
        TypeCode::Str,
        TypeCode::Bool,
    ];

    /// The character used for this code in compact signature strings
    pub fn to_char(self) -> char {
        match self {
            TypeCode::U64 => 'u',
            TypeCode::I64 => 'i',
            TypeCode::F32 => 'f',
            TypeCode::F64 => 'd',
            TypeCode::Str => 's',
            TypeCode::Bool => 'b',
        }
    }

    pub fn from_char(code: char) -> Result<Self, SignatureError> {
        match code {
            'u' => Ok(TypeCode::U64),
            'i' => Ok(TypeCode::I64),
            'f' => Ok(TypeCode::F32),
            'd' => Ok(TypeCode::F64),
            's' => Ok(TypeCode::Str),
            'b' => Ok(TypeCode::Bool),
            other => Err(SignatureError::UnknownTypeCode { code: other }),
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeCode::U64 => "u64",
            TypeCode::I64 => "i64",
            TypeCode::F32 => "f32",
            TypeCode::F64 => "f64",
            TypeCode::Str => "string",
            TypeCode::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while parsing a compact signature string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// A character that does not name any TypeCode
    #[error("Unknown type code '{code}' in signature. Valid codes are u, i, f, d, s, b")]
    UnknownTypeCode { code: char },
}

/// An ordered list of TypeCodes, describing either the arguments or the
/// return values of a registered function.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct Signature {
    codes: Vec<TypeCode>,
}

impl Signature {
    pub fn new(codes: Vec<TypeCode>) -> Self {
        Self { codes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<TypeCode> {
        self.codes.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeCode> + '_ {
        self.codes.iter().copied()
    }

    pub fn codes(&self) -> &[TypeCode] {
        &self.codes
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let codes = text
            .chars()
            .map(TypeCode::from_char)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { codes })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for code in &self.codes {
            write!(f, "{}", code.to_char())?;
        }
        Ok(())
    }
}

impl From<Vec<TypeCode>> for Signature {
    fn from(codes: Vec<TypeCode>) -> Self {
        Self { codes }
    }
}

impl From<&[TypeCode]> for Signature {
    fn from(codes: &[TypeCode]) -> Self {
        Self {
            codes: codes.to_vec(),
        }
    }
}

impl<const N: usize> From<[TypeCode; N]> for Signature {
    fn from(codes: [TypeCode; N]) -> Self {
        Self {
            codes: codes.to_vec(),
        }
    }
}

impl<'a> IntoIterator for &'a Signature {
    type Item = &'a TypeCode;
    type IntoIter = std::slice::Iter<'a, TypeCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.codes.iter()
    }
}
