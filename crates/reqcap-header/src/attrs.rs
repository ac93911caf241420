//! Attributes and directives attached to a header clause.
//!
//! An attribute is written `name=value` or, when typed, `name:Type=value`.
//! A directive is written `name:=value`. Both keep their order of
//! appearance so a clause can be reconstructed as it was written.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HeaderError, HeaderResult};

/// Element type of a scalar or list attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    String,
    Long,
    Double,
    Version,
}

impl ScalarType {
    fn as_str(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Long => "Long",
            Self::Double => "Double",
            Self::Version => "Version",
        }
    }

    /// Check that `value` is a valid literal of this type.
    fn accepts(self, value: &str) -> bool {
        let value = value.trim();
        match self {
            Self::String => true,
            Self::Long => value.parse::<i64>().is_ok(),
            Self::Double => value.parse::<f64>().is_ok(),
            Self::Version => is_version(value),
        }
    }
}

impl FromStr for ScalarType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "String" => Ok(Self::String),
            "Long" => Ok(Self::Long),
            "Double" => Ok(Self::Double),
            "Version" => Ok(Self::Version),
            _ => Err(()),
        }
    }
}

/// Declared type of an attribute value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttrType {
    Scalar(ScalarType),
    List(ScalarType),
}

impl AttrType {
    /// The untyped default.
    pub const STRING: AttrType = AttrType::Scalar(ScalarType::String);

    /// Validate `value` against this type. `name` is only used for the error.
    pub fn validate(self, name: &str, value: &str) -> HeaderResult<()> {
        let ok = match self {
            Self::Scalar(scalar) => scalar.accepts(value),
            Self::List(scalar) => value.split(',').all(|element| scalar.accepts(element)),
        };
        if ok {
            Ok(())
        } else {
            Err(HeaderError::InvalidTypedValue {
                name: name.to_string(),
                ty: self.to_string(),
                value: value.to_string(),
            })
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => f.write_str(scalar.as_str()),
            Self::List(scalar) => write!(f, "List<{}>", scalar.as_str()),
        }
    }
}

impl FromStr for AttrType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "List" {
            return Ok(Self::List(ScalarType::String));
        }
        if let Some(inner) = s.strip_prefix("List<").and_then(|rest| rest.strip_suffix('>')) {
            return inner.parse().map(Self::List);
        }
        s.parse().map(Self::Scalar)
    }
}

/// Whether an entry is an attribute or a directive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttrKind {
    Attribute(AttrType),
    Directive,
}

/// A single attribute or directive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attr {
    pub name: String,
    pub kind: AttrKind,
    pub value: String,
}

impl Attr {
    /// An untyped attribute.
    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttrKind::Attribute(AttrType::STRING),
            value: value.into(),
        }
    }

    /// A typed attribute. The value is checked against the type.
    pub fn typed(name: impl Into<String>, ty: AttrType, value: impl Into<String>) -> HeaderResult<Self> {
        let name = name.into();
        let value = value.into();
        ty.validate(&name, &value)?;
        Ok(Self {
            name,
            kind: AttrKind::Attribute(ty),
            value,
        })
    }

    /// A directive.
    pub fn directive(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttrKind::Directive,
            value: value.into(),
        }
    }

    pub fn is_directive(&self) -> bool {
        matches!(self.kind, AttrKind::Directive)
    }

    /// Write `;name…=value` using `quote` when the value needs quoting.
    pub(crate) fn write_to(&self, out: &mut impl fmt::Write, quote: char) -> fmt::Result {
        out.write_char(';')?;
        out.write_str(&self.name)?;
        match self.kind {
            AttrKind::Directive => out.write_str(":=")?,
            AttrKind::Attribute(AttrType::Scalar(ScalarType::String)) => out.write_char('=')?,
            AttrKind::Attribute(ty) => write!(out, ":{ty}=")?,
        }
        write_value(out, &self.value, quote)
    }
}

/// Ordered attributes and directives of one clause.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attrs {
    entries: Vec<Attr>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Returns `false` (and leaves the set unchanged) when
    /// an entry of the same name and kind family already exists.
    pub fn insert(&mut self, attr: Attr) -> bool {
        let duplicate = self
            .entries
            .iter()
            .any(|e| e.name == attr.name && e.is_directive() == attr.is_directive());
        if duplicate {
            return false;
        }
        self.entries.push(attr);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.entries.iter()
    }

    /// Look up an attribute (not a directive) by name.
    pub fn attribute(&self, name: &str) -> Option<&Attr> {
        self.entries.iter().find(|e| !e.is_directive() && e.name == name)
    }

    /// Look up a directive value by name.
    pub fn directive(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.is_directive() && e.name == name)
            .map(|e| e.value.as_str())
    }
}

impl<'a> IntoIterator for &'a Attrs {
    type Item = &'a Attr;
    type IntoIter = std::slice::Iter<'a, Attr>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Attrs {
    /// Double-quoted header form, each entry prefixed with `;`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for attr in &self.entries {
            attr.write_to(f, '"')?;
        }
        Ok(())
    }
}

/// A value can be written bare when it is a non-empty OSGi extended token.
fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn write_value(out: &mut impl fmt::Write, value: &str, quote: char) -> fmt::Result {
    if is_token(value) {
        return out.write_str(value);
    }
    out.write_char(quote)?;
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '\'') {
            out.write_char('\\')?;
        }
        out.write_char(c)?;
    }
    out.write_char(quote)
}

/// `major[.minor[.micro[.qualifier]]]`
fn is_version(value: &str) -> bool {
    let mut parts = value.splitn(4, '.');
    let numeric = |p: &str| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit());
    let Some(major) = parts.next() else {
        return false;
    };
    if !numeric(major) {
        return false;
    }
    for (idx, part) in parts.enumerate() {
        let ok = if idx < 2 {
            numeric(part)
        } else {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        };
        if !ok {
            return false;
        }
    }
    true
}
