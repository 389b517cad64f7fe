use std::fmt::{Display, Formatter};
use std::str::FromStr;
use crate::header::HeaderMap;
use crate::EnviError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_codes() {
        assert_eq!(DataType::from_str("1").unwrap(), DataType::Byte);
        assert_eq!(DataType::from_str(" 2 ").unwrap(), DataType::Int16);
        assert_eq!(DataType::Byte.size(), 1);
        assert_eq!(DataType::Int16.size(), 2);
        match DataType::from_str("9") {
            Err(EnviError::UnsupportedDataType(code)) => assert_eq!(code, "9"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn interleave_is_case_insensitive() {
        assert_eq!(Interleave::from_str("bip").unwrap(), Interleave::Bip);
        assert_eq!(Interleave::from_str("BIP").unwrap(), Interleave::Bip);
        assert_eq!(Interleave::from_str("Bil").unwrap(), Interleave::Bil);
        assert_eq!(Interleave::from_str("bsq").unwrap(), Interleave::Bsq);
        assert!(Interleave::from_str("tiled").is_err());
    }

    #[test]
    fn byte_order_flags() {
        assert_eq!(ByteOrder::from_str("0").unwrap(), ByteOrder::Little);
        assert_eq!(ByteOrder::from_str("1").unwrap(), ByteOrder::Big);
        assert!(matches!(ByteOrder::from_str("2"), Err(EnviError::UnsupportedByteOrder(v)) if v == "2"));
        assert!(matches!(ByteOrder::from_str("big"), Err(EnviError::InvalidField{..})));
    }

    #[test]
    fn list_values_are_not_type_codes() {
        let mut h = HeaderMap::new();
        h.insert("data type", HeaderValue::List(vec!["2".to_string()]));
        h.insert("interleave", HeaderValue::List(vec!["bil".to_string()]));
        assert!(matches!(DataType::from_header(&h), Err(EnviError::UnsupportedDataType(v)) if v == "{2}"));
        assert!(matches!(Interleave::from_header(&h), Err(EnviError::UnsupportedInterleave(v)) if v == "{bil}"));

        let h = HeaderMap::new();
        assert!(matches!(DataType::from_header(&h), Err(EnviError::MissingField(k)) if k == "data type"));
        assert!(matches!(Interleave::from_header(&h), Err(EnviError::MissingField(k)) if k == "interleave"));
    }

    #[test]
    fn value_display() {
        let list = HeaderValue::List(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(list.to_string(), "{a, b}");
        assert_eq!(HeaderValue::Scalar("bil".to_string()).to_string(), "bil");
    }
}

/// Header Definition
///
/// A typed field stored under a fixed ENVI key
pub trait HeaderDef: FromStr<Err = EnviError> {
    fn key<'a>() -> &'a str;

    /// look the field up in a parsed header and convert it
    fn from_header(header: &HeaderMap) -> Result<Self, EnviError> {
        Self::from_str(header.scalar(Self::key())?)
    }
}

/******************************
 ********** VALUE *************
 ****************************/

/// The right hand side of a `key = value` header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Scalar(String),
    /// comma separated entries of a braced value, each trimmed
    List(Vec<String>),
}

impl HeaderValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            HeaderValue::Scalar(s) => Some(s),
            HeaderValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            HeaderValue::Scalar(_) => None,
            HeaderValue::List(items) => Some(items),
        }
    }
}

impl Display for HeaderValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderValue::Scalar(s) => write!(f, "{s}"),
            HeaderValue::List(items) => write!(f, "{{{}}}", items.join(", ")),
        }
    }
}

/******************************
 ********* DATA TYPE **********
 ****************************/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// code 1, 8 bit
    Byte,
    /// code 2, 16 bit signed
    Int16,
}

impl HeaderDef for DataType {
    fn key<'a>() -> &'a str {
        "data type"
    }

    /// a braced list is never a known type code
    fn from_header(header: &HeaderMap) -> Result<Self, EnviError> {
        match header.get(Self::key()) {
            Some(list @ HeaderValue::List(_)) => Err(EnviError::UnsupportedDataType(list.to_string())),
            _ => Self::from_str(header.scalar(Self::key())?),
        }
    }
}

impl DataType {
    pub fn size(&self) -> usize {
        match self {
            DataType::Byte => size_of::<u8>(),
            DataType::Int16 => size_of::<i16>(),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            DataType::Byte => 1,
            DataType::Int16 => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::Byte => "byte",
            DataType::Int16 => "int16",
        }
    }
}

impl FromStr for DataType {
    type Err = EnviError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(DataType::Byte),
            "2" => Ok(DataType::Int16),
            code => Err(EnviError::UnsupportedDataType(code.to_string())),
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code(), self.name())
    }
}

/******************************
 ********* BYTE ORDER *********
 ****************************/

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ByteOrder {
    Little,
    Big,
}

impl HeaderDef for ByteOrder {
    fn key<'a>() -> &'a str {
        "byte order"
    }
}

impl ByteOrder {
    pub fn flag(&self) -> u8 {
        match self {
            ByteOrder::Little => 0,
            ByteOrder::Big => 1,
        }
    }
}

impl FromStr for ByteOrder {
    type Err = EnviError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let flag = s.trim().parse::<i64>().map_err(|_| EnviError::InvalidField {
            key: Self::key().to_string(),
            value: s.to_string(),
        })?;
        match flag {
            0 => Ok(ByteOrder::Little),
            1 => Ok(ByteOrder::Big),
            _ => Err(EnviError::UnsupportedByteOrder(s.trim().to_string())),
        }
    }
}

impl Display for ByteOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ByteOrder::Little => write!(f, "{} (little endian)", self.flag()),
            ByteOrder::Big => write!(f, "{} (big endian)", self.flag()),
        }
    }
}

/******************************
 ********* INTERLEAVE *********
 ****************************/

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Interleave {
    /// band interleaved by line
    Bil,
    /// band interleaved by pixel
    Bip,
    /// band sequential. Recognized but no reader exists for it
    Bsq,
}

impl HeaderDef for Interleave {
    fn key<'a>() -> &'a str {
        "interleave"
    }

    fn from_header(header: &HeaderMap) -> Result<Self, EnviError> {
        match header.get(Self::key()) {
            Some(list @ HeaderValue::List(_)) => Err(EnviError::UnsupportedInterleave(list.to_string())),
            _ => Self::from_str(header.scalar(Self::key())?),
        }
    }
}

impl FromStr for Interleave {
    type Err = EnviError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "bil" => Ok(Interleave::Bil),
            "bip" => Ok(Interleave::Bip),
            "bsq" => Ok(Interleave::Bsq),
            _ => Err(EnviError::UnsupportedInterleave(s.to_string())),
        }
    }
}

impl Display for Interleave {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Interleave::Bil => write!(f, "bil"),
            Interleave::Bip => write!(f, "bip"),
            Interleave::Bsq => write!(f, "bsq"),
        }
    }
}
