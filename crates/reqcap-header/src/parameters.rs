//! Parsed OSGi header: an ordered map from clause key to [`Attrs`].
//!
//! Grammar accepted by [`Parameters::parse`]:
//!
//! ```text
//! header    ::= clause ( ',' clause )*
//! clause    ::= key ( ';' key )* ( ';' parameter )*
//! parameter ::= name ( ':=' | '=' | ':' type '=' ) value
//! value     ::= token | '"' chars '"' | '\'' chars '\''
//! ```
//!
//! Keys that share a clause each receive a copy of its parameters. A key
//! that appears more than once keeps every occurrence: later ones are
//! stored as `key~1`, `key~2`, and so on. The namespace of each clause is
//! kept next to its key, so a `~` written in the header is never confused
//! with that suffix.

use std::fmt;

use tracing::debug;

use crate::attrs::{Attr, AttrKind, AttrType, Attrs};
use crate::error::{HeaderError, HeaderResult};
use crate::names::DUPLICATE_MARKER;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Entry {
    /// Unique lookup key.
    key: String,
    /// Namespace exactly as written in the header.
    namespace: String,
    attrs: Attrs,
}

/// Ordered clause-key to attribute-set mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<Entry>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a header value.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqcap_header::Parameters;
    ///
    /// let params = Parameters::parse(r#"osgi.ee;filter:="(osgi.ee=JavaSE)", a.cap;x=1"#).unwrap();
    /// assert_eq!(params.len(), 2);
    /// assert!(params.contains_key("osgi.ee"));
    /// assert_eq!(params.get("a.cap").unwrap().attribute("x").unwrap().value, "1");
    /// ```
    pub fn parse(header: &str) -> HeaderResult<Self> {
        let mut params = Self::new();
        for clause in split_unquoted(header, ',')? {
            let clause = clause.trim();
            if clause.is_empty() {
                debug!(header, "empty clause, usually caused by repeating a comma");
                continue;
            }
            params.parse_clause(clause)?;
        }
        Ok(params)
    }

    fn parse_clause(&mut self, clause: &str) -> HeaderResult<()> {
        let mut keys: Vec<&str> = Vec::new();
        let mut attrs = Attrs::new();

        for part in split_unquoted(clause, ';')? {
            let part = part.trim();
            let Some(eq) = find_unquoted(part, '=') else {
                if part.is_empty() {
                    return Err(HeaderError::EmptyName(clause.to_string()));
                }
                if !attrs.is_empty() {
                    return Err(HeaderError::KeyAfterAttribute {
                        key: part.to_string(),
                        clause: clause.to_string(),
                    });
                }
                keys.push(part);
                continue;
            };

            if keys.is_empty() {
                return Err(HeaderError::MissingKey(clause.to_string()));
            }
            let attr = parse_parameter(&part[..eq], &part[eq + 1..], clause)?;
            let name = attr.name.clone();
            if !attrs.insert(attr) {
                return Err(HeaderError::DuplicateAttribute {
                    key: keys.join(";"),
                    name,
                });
            }
        }

        for key in keys {
            self.insert(key, attrs.clone());
        }
        Ok(())
    }

    /// Insert a clause under `namespace`, suffixing the lookup key when it
    /// is already taken. Returns the key the clause was stored under.
    pub fn insert(&mut self, namespace: &str, attrs: Attrs) -> String {
        let mut key = namespace.to_string();
        let mut n = 0;
        while self.contains_key(&key) {
            n += 1;
            key = format!("{namespace}{DUPLICATE_MARKER}{n}");
        }
        self.entries.push(Entry {
            key: key.clone(),
            namespace: namespace.to_string(),
            attrs,
        });
        key
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact key lookup (suffixed keys are distinct).
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&Attrs> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.attrs)
    }

    /// The namespace of the clause stored under `key`.
    pub fn namespace(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.namespace.as_str())
    }

    /// Remove one clause by exact key.
    pub fn remove(&mut self, key: &str) -> Option<Attrs> {
        let idx = self.entries.iter().position(|e| e.key == key)?;
        Some(self.entries.remove(idx).attrs)
    }

    /// Whether any clause belongs to `namespace`.
    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.entries.iter().any(|e| e.namespace == namespace)
    }

    /// Remove every clause belonging to `namespace`, returning how many
    /// were removed.
    pub fn remove_namespace(&mut self, namespace: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.namespace != namespace);
        before - self.entries.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attrs)> {
        self.entries.iter().map(|e| (e.key.as_str(), &e.attrs))
    }

    /// Clauses in header order as `(namespace, attrs)`.
    pub fn clauses(&self) -> impl Iterator<Item = (&str, &Attrs)> {
        self.entries.iter().map(|e| (e.namespace.as_str(), &e.attrs))
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (namespace, attrs)) in self.clauses().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{namespace}{attrs}")?;
        }
        Ok(())
    }
}

/// Build one [`Attr`] from the text on either side of the first unquoted `=`.
fn parse_parameter(lhs: &str, rhs: &str, clause: &str) -> HeaderResult<Attr> {
    let lhs = lhs.trim();
    let (name, kind) = if let Some(name) = lhs.strip_suffix(':') {
        (name.trim(), AttrKind::Directive)
    } else if let Some((name, ty)) = lhs.split_once(':') {
        let name = name.trim();
        let parsed: AttrType = ty.parse().map_err(|_| HeaderError::UnknownType {
            name: name.to_string(),
            ty: ty.trim().to_string(),
        })?;
        (name, AttrKind::Attribute(parsed))
    } else {
        (lhs, AttrKind::Attribute(AttrType::STRING))
    };
    if name.is_empty() {
        return Err(HeaderError::EmptyName(clause.to_string()));
    }

    let value = unquote(name, rhs.trim())?;
    match kind {
        AttrKind::Directive => Ok(Attr::directive(name, value)),
        AttrKind::Attribute(ty) => Attr::typed(name, ty, value),
    }
}

/// Strip surrounding quotes and resolve backslash escapes. Bare values are
/// returned as written.
fn unquote(name: &str, raw: &str) -> HeaderResult<String> {
    let mut chars = raw.chars();
    let quote = match chars.next() {
        None => return Err(HeaderError::MissingValue(name.to_string())),
        Some(q @ ('"' | '\'')) => q,
        Some(_) => return Ok(raw.to_string()),
    };

    let mut value = String::with_capacity(raw.len());
    loop {
        match chars.next() {
            // split_unquoted already rejected unbalanced quotes
            None => return Err(HeaderError::UnterminatedQuote(raw.to_string())),
            Some('\\') => {
                if let Some(escaped) = chars.next() {
                    value.push(escaped);
                }
            }
            Some(c) if c == quote => break,
            Some(c) => value.push(c),
        }
    }
    if chars.as_str().trim().is_empty() {
        Ok(value)
    } else {
        Err(HeaderError::TrailingCharacters(name.to_string()))
    }
}

/// Byte offsets of `sep` occurrences that are not inside a quoted string.
fn unquoted_positions(s: &str, sep: char) -> HeaderResult<Vec<usize>> {
    let mut positions = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, c) in s.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == sep => positions.push(idx),
            None => {}
        }
    }
    if quote.is_some() {
        return Err(HeaderError::UnterminatedQuote(s.to_string()));
    }
    Ok(positions)
}

fn split_unquoted(s: &str, sep: char) -> HeaderResult<Vec<&str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    for pos in unquoted_positions(s, sep)? {
        parts.push(&s[start..pos]);
        start = pos + sep.len_utf8();
    }
    parts.push(&s[start..]);
    Ok(parts)
}

fn find_unquoted(s: &str, sep: char) -> Option<usize> {
    unquoted_positions(s, sep)
        .ok()
        .and_then(|positions| positions.first().copied())
}
