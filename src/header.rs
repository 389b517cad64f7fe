use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use log::{debug, warn};
use thiserror::Error;
use crate::header_defs::HeaderValue;
use crate::{io, EnviError};


/// substring that must appear on the first line of every ENVI header
pub const MAGIC: &str = "ENVI";

/// Cause of a [EnviError::MalformedHeader]. Line numbers are 1-based and count the magic line
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("line {line}: field `{key}` has no value")]
    EmptyValue { line: usize, key: String },
    #[error("line {line}: no closing brace found for field `{key}`")]
    UnclosedBrace { line: usize, key: String },
}

/// Fields of an ENVI header, keyed exactly as written in the file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderMap {
    fields: HashMap<String, HeaderValue>,
}

impl HeaderMap {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.fields.get(key)
    }

    /// returns the previous value if the key was already present
    pub fn insert(&mut self, key: impl Into<String>, value: HeaderValue) -> Option<HeaderValue> {
        self.fields.insert(key.into(), value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// all fields ordered by key
    pub fn sorted(&self) -> Vec<(&str, &HeaderValue)> {
        let mut fields: Vec<_> = self.iter().collect();
        fields.sort_by_key(|(key, _)| *key);
        fields
    }

    /// returns the scalar stored under `key`. Errors if the key is absent or holds a list
    pub fn scalar(&self, key: &str) -> Result<&str, EnviError> {
        match self.fields.get(key) {
            Some(HeaderValue::Scalar(s)) => Ok(s),
            Some(list) => Err(EnviError::InvalidField { key: key.to_string(), value: list.to_string() }),
            None => Err(EnviError::MissingField(key.to_string())),
        }
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        self.fields.get(key).and_then(|v| v.as_list())
    }

    /// parses the scalar stored under `key` as an integer
    pub fn integer<T: FromStr>(&self, key: &str) -> Result<T, EnviError> {
        let s = self.scalar(key)?;
        s.trim().parse::<T>().map_err(|_| EnviError::InvalidField {
            key: key.to_string(),
            value: s.to_string(),
        })
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.get("description").and_then(|v| v.as_scalar())
    }

    pub fn band_names(&self) -> Option<&[String]> {
        self.list("band names")
    }

    /// band center wavelengths in the units named by `wavelength units`
    pub fn wavelengths(&self) -> Result<Option<Vec<f64>>, EnviError> {
        let Some(items) = self.list("wavelength") else {
            return Ok(None);
        };
        items.iter().map(|w| {
            w.parse::<f64>().map_err(|_| EnviError::InvalidField {
                key: "wavelength".to_string(),
                value: w.to_string(),
            })
        }).collect::<Result<Vec<_>, _>>().map(Some)
    }
}

impl FromStr for HeaderMap {
    type Err = EnviError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines();
        let magic = lines.next().unwrap_or_default();
        if !magic.contains(MAGIC) {
            return Err(EnviError::NotEnviHeader);
        }
        read_fields(lines).map_err(EnviError::MalformedHeader)
    }
}

/// Read and parse the ENVI header at `path`. The file is closed before this returns
pub fn parse_header(path: impl AsRef<Path>) -> Result<HeaderMap, EnviError> {
    let path = path.as_ref();
    let mut rdr = BufReader::new(io::open(path)?);

    let mut magic = String::new();
    rdr.read_line(&mut magic).map_err(|e| EnviError::io(path, e))?;
    if !magic.contains(MAGIC) {
        return Err(EnviError::NotEnviHeader);
    }

    let mut body = String::new();
    rdr.read_to_string(&mut body).map_err(|e| EnviError::io(path, e))?;
    drop(rdr);

    let header = read_fields(body.lines()).map_err(EnviError::MalformedHeader)?;
    debug!("parsed {} fields from {}", header.len(), path.display());
    Ok(header)
}

/// parses every line after the magic line
fn read_fields<'a>(lines: impl Iterator<Item = &'a str>) -> Result<HeaderMap, SyntaxError> {
    let mut header = HeaderMap::new();
    let mut lines = lines.enumerate().map(|(i, line)| (i + 2, line));

    while let Some((line_no, raw_line)) = lines.next() {

        let Some((key, val)) = raw_line.split_once('=') else {
            continue
        };
        let key = key.trim();
        let val = val.trim();

        if val.is_empty() {
            return Err(SyntaxError::EmptyValue { line: line_no, key: key.to_string() });
        }

        let value = if val.starts_with('{') {
            let mut block = val.to_string();
            while !block.ends_with('}') {
                let (_, next) = lines.next().ok_or_else(|| SyntaxError::UnclosedBrace {
                    line: line_no,
                    key: key.to_string(),
                })?;
                block.push_str(next.trim());
            }
            read_braced(key, &block)
        } else {
            HeaderValue::Scalar(val.to_string())
        };

        if header.insert(key, value).is_some() {
            warn!("line {line_no}: duplicate header field `{key}` replaces the earlier value");
        }
    }

    Ok(header)
}

/// `block` starts with '{' and ends with '}'
fn read_braced(key: &str, block: &str) -> HeaderValue {
    let inner = block[1..block.len() - 1].trim();
    if key == "description" {
        return HeaderValue::Scalar(inner.to_string());
    }
    if inner.is_empty() {
        return HeaderValue::List(vec![]);
    }
    HeaderValue::List(inner.split(',').map(|item| item.trim().to_string()).collect())
}
