//! Capability clauses built from parsed header parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attrs::{Attr, Attrs};
use crate::error::{HeaderError, HeaderResult};
use crate::parameters::Parameters;

/// A namespace together with its ordered attributes and directives.
///
/// The [`Display`](fmt::Display) form is the clause text with single-quoted
/// values, e.g. `osgi.ee;filter:='(osgi.ee=JavaSE)'`. Two capabilities are
/// the same clause when their display forms are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capability {
    namespace: String,
    attrs: Attrs,
}

impl Capability {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            attrs: Attrs::new(),
        }
    }

    /// Builder-style attribute or directive addition. A repeated name of
    /// the same kind is ignored.
    pub fn with(mut self, attr: Attr) -> Self {
        self.attrs.insert(attr);
        self
    }

    /// Convert every clause of `params` into a capability, in header order.
    pub fn from_parameters(params: &Parameters) -> HeaderResult<Vec<Capability>> {
        params
            .clauses()
            .map(|(namespace, attrs)| {
                if namespace.is_empty() {
                    return Err(HeaderError::EmptyNamespace(format!("{namespace}{attrs}")));
                }
                Ok(Capability {
                    namespace: namespace.to_string(),
                    attrs: attrs.clone(),
                })
            })
            .collect()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attr> {
        self.attrs.iter().filter(|a| !a.is_directive())
    }

    pub fn directives(&self) -> impl Iterator<Item = &Attr> {
        self.attrs.iter().filter(|a| a.is_directive())
    }

    /// The `filter` directive, if any.
    pub fn filter(&self) -> Option<&str> {
        self.attrs.directive("filter")
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.namespace)?;
        for attr in &self.attrs {
            attr.write_to(f, '\'')?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::{AttrType, ScalarType};

    #[test]
    fn from_parameters_keeps_order_and_repeated_namespaces() {
        let params = Parameters::parse("b.cap;y=2,a.cap;x=1,b.cap;y=3").unwrap();
        let caps = Capability::from_parameters(&params).unwrap();
        let namespaces: Vec<_> = caps.iter().map(Capability::namespace).collect();
        assert_eq!(namespaces, vec!["b.cap", "a.cap", "b.cap"]);
    }

    #[test]
    fn from_parameters_keeps_tilde_in_namespace() {
        let params = Parameters::parse("a~b;x=1,a~b").unwrap();
        let caps = Capability::from_parameters(&params).unwrap();
        let namespaces: Vec<_> = caps.iter().map(Capability::namespace).collect();
        assert_eq!(namespaces, vec!["a~b", "a~b"]);
        assert_eq!(caps[0].to_string(), "a~b;x=1");
    }

    #[test]
    fn from_parameters_rejects_empty_namespace() {
        let mut params = Parameters::new();
        params.insert("", Attrs::new());
        assert!(matches!(
            Capability::from_parameters(&params),
            Err(HeaderError::EmptyNamespace(_))
        ));
    }

    #[test]
    fn display_single_quotes_non_token_values() {
        let params =
            Parameters::parse(r#"osgi.ee;filter:="(&(osgi.ee=JavaSE)(version=1.8))""#).unwrap();
        let caps = Capability::from_parameters(&params).unwrap();
        assert_eq!(
            caps[0].to_string(),
            "osgi.ee;filter:='(&(osgi.ee=JavaSE)(version=1.8))'"
        );
    }

    #[test]
    fn display_keeps_token_values_bare() {
        let cap = Capability::new("a.cap").with(Attr::attribute("x", "1"));
        assert_eq!(cap.to_string(), "a.cap;x=1");
    }

    #[test]
    fn display_typed_attribute() {
        let cap = Capability::new("osgi.ee")
            .with(Attr::attribute("osgi.ee", "JavaSE"))
            .with(
                Attr::typed("version", AttrType::List(ScalarType::Version), "1.8,11").unwrap(),
            );
        assert_eq!(
            cap.to_string(),
            "osgi.ee;osgi.ee=JavaSE;version:List<Version>='1.8,11'"
        );
    }

    #[test]
    fn accessors_split_attributes_and_directives() {
        let params = Parameters::parse(r#"osgi.service;objectClass=Foo;filter:="(a=b)";effective:=active"#)
            .unwrap();
        let cap = &Capability::from_parameters(&params).unwrap()[0];
        assert_eq!(cap.namespace(), "osgi.service");
        assert_eq!(cap.attributes().count(), 1);
        assert_eq!(cap.directives().count(), 2);
        assert_eq!(cap.filter(), Some("(a=b)"));
    }

    #[test]
    fn equal_clauses_compare_equal() {
        let a = Capability::from_parameters(&Parameters::parse("a.cap;x=1").unwrap()).unwrap();
        let b = Capability::from_parameters(&Parameters::parse("a.cap ; x = \"1\"").unwrap()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].to_string(), b[0].to_string());
    }

    #[test]
    fn serde_roundtrip() {
        let cap = Capability::new("a.cap").with(Attr::directive("filter", "(x=1)"));
        let json = serde_json::to_string(&cap).unwrap();
        let parsed: Capability = serde_json::from_str(&json).unwrap();
        assert_eq!(cap, parsed);
    }
}
