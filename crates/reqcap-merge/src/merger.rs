use std::collections::HashSet;

use reqcap_header::{
    Capability, HeaderResult, Parameters, BUNDLE_REQUIRED_EXECUTION_ENVIRONMENT,
    EXECUTION_ENVIRONMENT_NAMESPACE, REQUIRE_CAPABILITY,
};
use serde::Serialize;
use tracing::debug;

use crate::attributes::Attributes;

// ---------------------------------------------------------------------------
// MergeOutcome
// ---------------------------------------------------------------------------

/// What a merge did to the `Require-Capability` attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MergeOutcome {
    /// No derived header; nothing was touched.
    NothingDerived,
    /// No existing header; the derived value was stored verbatim.
    Inserted,
    /// Nothing left to add after dropping a conflicting `osgi.ee` clause.
    Unchanged,
    /// Both headers were combined.
    Merged {
        /// Clauses in the merged header.
        clauses: usize,
        /// Derived clauses that were not already present.
        added: usize,
    },
}

/// Result of a merge, including the legacy header cleanup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    #[serde(flatten)]
    pub outcome: MergeOutcome,
    /// Whether `Bundle-RequiredExecutionEnvironment` was removed.
    pub legacy_ee_removed: bool,
}

impl MergeReport {
    fn new(outcome: MergeOutcome, legacy_ee_removed: bool) -> Self {
        Self {
            outcome,
            legacy_ee_removed,
        }
    }

    /// Returns `true` if the `Require-Capability` value was written.
    pub fn header_changed(&self) -> bool {
        matches!(
            self.outcome,
            MergeOutcome::Inserted | MergeOutcome::Merged { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Merge a derived `Require-Capability` value into `target`.
///
/// `existing` is the value authored by hand, `derived` the one computed by
/// analysis. When the derived header requires an `osgi.ee` capability the
/// deprecated `Bundle-RequiredExecutionEnvironment` attribute is removed,
/// whatever else happens. An `osgi.ee` clause that is already present in
/// `existing` wins over any derived one.
///
/// On a parse error `target` may already have lost its legacy EE
/// attribute but `Require-Capability` is never partially written.
///
/// # Examples
///
/// ```
/// use reqcap_merge::{merge, Attributes, MergeOutcome};
///
/// let mut attrs = Attributes::new();
/// let report = merge(Some("a.cap;x=1"), Some("a.cap;x=1,b.cap;y=2"), &mut attrs).unwrap();
/// assert_eq!(attrs.get("Require-Capability"), Some("a.cap;x=1,b.cap;y=2"));
/// assert_eq!(report.outcome, MergeOutcome::Merged { clauses: 2, added: 1 });
/// ```
pub fn merge(
    existing: Option<&str>,
    derived: Option<&str>,
    target: &mut Attributes,
) -> HeaderResult<MergeReport> {
    let Some(derived) = derived else {
        return Ok(MergeReport::new(MergeOutcome::NothingDerived, false));
    };

    let mut additional = Parameters::parse(derived)?;
    let legacy_ee_removed = additional.contains_namespace(EXECUTION_ENVIRONMENT_NAMESPACE)
        && target.remove(BUNDLE_REQUIRED_EXECUTION_ENVIRONMENT).is_some();

    let Some(existing) = existing else {
        target.insert(REQUIRE_CAPABILITY, derived);
        return Ok(MergeReport::new(MergeOutcome::Inserted, legacy_ee_removed));
    };

    debug!(existing, "existing Require-Capability");
    debug!(derived, "derived Require-Capability");

    let current = Parameters::parse(existing)?;
    if current.contains_namespace(EXECUTION_ENVIRONMENT_NAMESPACE) {
        let dropped = additional.remove_namespace(EXECUTION_ENVIRONMENT_NAMESPACE);
        if dropped > 0 {
            debug!(dropped, "existing header already declares osgi.ee; dropping derived clauses");
        }
    }

    let initial = Capability::from_parameters(&current)?;
    let new = Capability::from_parameters(&additional)?;
    if new.is_empty() {
        return Ok(MergeReport::new(MergeOutcome::Unchanged, legacy_ee_removed));
    }

    let initial_len = initial.len();
    let clauses = dedup_clauses(initial.iter().chain(new.iter()));
    let added = clauses.len().saturating_sub(dedup_clauses(initial.iter()).len());
    let merged = clauses
        .iter()
        .map(|clause| clause.replace('\'', "\""))
        .collect::<Vec<_>>()
        .join(",");

    debug!(merged = %merged, initial = initial_len, added, "merged Require-Capability");
    target.insert(REQUIRE_CAPABILITY, merged);

    Ok(MergeReport::new(
        MergeOutcome::Merged {
            clauses: clauses.len(),
            added,
        },
        legacy_ee_removed,
    ))
}

/// Merge the `Require-Capability` value of `calculated` into `main`.
pub fn enhance_require_capability(
    main: &mut Attributes,
    calculated: &Attributes,
) -> HeaderResult<MergeReport> {
    let existing = main.get(REQUIRE_CAPABILITY).map(str::to_owned);
    merge(
        existing.as_deref(),
        calculated.get(REQUIRE_CAPABILITY),
        main,
    )
}

/// Stringify clauses, keeping the first occurrence of each distinct form.
fn dedup_clauses<'a>(clauses: impl Iterator<Item = &'a Capability>) -> Vec<String> {
    let mut seen = HashSet::new();
    clauses
        .map(ToString::to_string)
        .filter(|text| seen.insert(text.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EE_8: &str = r#"osgi.ee;filter:="(&(osgi.ee=JavaSE)(version=1.8))""#;
    const EE_11: &str = r#"osgi.ee;filter:="(&(osgi.ee=JavaSE)(version=11))""#;

    fn with_legacy_ee() -> Attributes {
        [
            ("Bundle-SymbolicName", "org.example"),
            (BUNDLE_REQUIRED_EXECUTION_ENVIRONMENT, "JavaSE-1.8"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn absent_derived_leaves_attributes_untouched() {
        let mut attrs = with_legacy_ee();
        attrs.insert(REQUIRE_CAPABILITY, "a.cap;x=1");
        let before = attrs.clone();
        let report = merge(Some("a.cap;x=1"), None, &mut attrs).unwrap();
        assert_eq!(report.outcome, MergeOutcome::NothingDerived);
        assert!(!report.header_changed());
        assert_eq!(attrs, before);
    }

    #[test]
    fn absent_existing_passes_derived_through_verbatim() {
        let derived = r#"osgi.wiring.package;filter:="(osgi.wiring.package=org.foo)""#;
        let mut attrs = Attributes::new();
        let report = merge(None, Some(derived), &mut attrs).unwrap();
        assert_eq!(report.outcome, MergeOutcome::Inserted);
        assert_eq!(attrs.get(REQUIRE_CAPABILITY), Some(derived));
    }

    #[test]
    fn passthrough_preserves_original_formatting() {
        let derived = "a.cap ;  x = '1' ,b.cap";
        let mut attrs = Attributes::new();
        merge(None, Some(derived), &mut attrs).unwrap();
        assert_eq!(attrs.get(REQUIRE_CAPABILITY), Some(derived));
    }

    #[test]
    fn existing_ee_wins_over_derived_ee() {
        let mut attrs = with_legacy_ee();
        attrs.insert(REQUIRE_CAPABILITY, EE_8);
        let report = merge(Some(EE_8), Some(EE_11), &mut attrs).unwrap();
        assert_eq!(report.outcome, MergeOutcome::Unchanged);
        assert!(report.legacy_ee_removed);
        assert_eq!(attrs.get(REQUIRE_CAPABILITY), Some(EE_8));
        assert!(!attrs.contains(BUNDLE_REQUIRED_EXECUTION_ENVIRONMENT));
    }

    #[test]
    fn derived_ee_removes_legacy_header_on_insert() {
        let mut attrs = with_legacy_ee();
        let report = merge(None, Some(EE_11), &mut attrs).unwrap();
        assert!(report.legacy_ee_removed);
        assert!(!attrs.contains(BUNDLE_REQUIRED_EXECUTION_ENVIRONMENT));
        assert_eq!(attrs.get(REQUIRE_CAPABILITY), Some(EE_11));
    }

    #[test]
    fn derived_ee_removes_legacy_header_on_merge() {
        let mut attrs = with_legacy_ee();
        let report = merge(Some("a.cap;x=1"), Some(EE_11), &mut attrs).unwrap();
        assert!(report.legacy_ee_removed);
        assert!(!attrs.contains(BUNDLE_REQUIRED_EXECUTION_ENVIRONMENT));
        assert_eq!(
            attrs.get(REQUIRE_CAPABILITY),
            Some(r#"a.cap;x=1,osgi.ee;filter:="(&(osgi.ee=JavaSE)(version=11))""#)
        );
    }

    #[test]
    fn derived_without_ee_keeps_legacy_header() {
        let mut attrs = with_legacy_ee();
        let report = merge(None, Some("a.cap;x=1"), &mut attrs).unwrap();
        assert!(!report.legacy_ee_removed);
        assert_eq!(
            attrs.get(BUNDLE_REQUIRED_EXECUTION_ENVIRONMENT),
            Some("JavaSE-1.8")
        );
    }

    #[test]
    fn tilde_in_existing_key_survives_merge() {
        let mut attrs = Attributes::new();
        let report = merge(Some("a~b;x=1"), Some("c"), &mut attrs).unwrap();
        assert_eq!(attrs.get(REQUIRE_CAPABILITY), Some("a~b;x=1,c"));
        assert_eq!(report.outcome, MergeOutcome::Merged { clauses: 2, added: 1 });
    }

    #[test]
    fn tilde_lookalike_is_not_an_ee_requirement() {
        let mut attrs = with_legacy_ee();
        let report = merge(Some("osgi.ee~x"), Some("osgi.ee~y"), &mut attrs).unwrap();
        assert!(!report.legacy_ee_removed);
        assert_eq!(
            attrs.get(BUNDLE_REQUIRED_EXECUTION_ENVIRONMENT),
            Some("JavaSE-1.8")
        );

        let mut attrs = Attributes::new();
        merge(Some("osgi.ee~x"), Some(EE_11), &mut attrs).unwrap();
        assert_eq!(
            attrs.get(REQUIRE_CAPABILITY),
            Some(r#"osgi.ee~x,osgi.ee;filter:="(&(osgi.ee=JavaSE)(version=11))""#)
        );
    }

    #[test]
    fn duplicate_clause_collapses() {
        let mut attrs = Attributes::new();
        let report = merge(Some("a.cap;x=1"), Some("a.cap;x=1,b.cap;y=2"), &mut attrs).unwrap();
        assert_eq!(attrs.get(REQUIRE_CAPABILITY), Some("a.cap;x=1,b.cap;y=2"));
        assert_eq!(report.outcome, MergeOutcome::Merged { clauses: 2, added: 1 });
    }

    #[test]
    fn same_namespace_different_attributes_both_kept() {
        let mut attrs = Attributes::new();
        merge(Some("a.cap;x=1"), Some("a.cap;x=2"), &mut attrs).unwrap();
        assert_eq!(attrs.get(REQUIRE_CAPABILITY), Some("a.cap;x=1,a.cap;x=2"));
    }

    #[test]
    fn merged_output_uses_double_quotes() {
        let mut attrs = Attributes::new();
        merge(
            Some("b.cap;filter:='(b=1)'"),
            Some(r#"c.cap;filter:="(c=1)""#),
            &mut attrs,
        )
        .unwrap();
        assert_eq!(
            attrs.get(REQUIRE_CAPABILITY),
            Some(r#"b.cap;filter:="(b=1)",c.cap;filter:="(c=1)""#)
        );
    }

    #[test]
    fn every_derived_ee_clause_is_dropped() {
        let mut attrs = Attributes::new();
        let derived = format!("{EE_11},{EE_8},d.cap");
        merge(Some(EE_8), Some(&derived), &mut attrs).unwrap();
        assert_eq!(
            attrs.get(REQUIRE_CAPABILITY),
            Some(r#"osgi.ee;filter:="(&(osgi.ee=JavaSE)(version=1.8))",d.cap"#)
        );
    }

    #[test]
    fn empty_derived_header_leaves_existing() {
        let mut attrs: Attributes = [(REQUIRE_CAPABILITY, "a.cap")].into_iter().collect();
        let report = merge(Some("a.cap"), Some(""), &mut attrs).unwrap();
        assert_eq!(report.outcome, MergeOutcome::Unchanged);
        assert_eq!(attrs.get(REQUIRE_CAPABILITY), Some("a.cap"));
    }

    #[test]
    fn malformed_existing_is_reported_without_writing() {
        let mut attrs: Attributes = [(REQUIRE_CAPABILITY, "a;x=\"open")].into_iter().collect();
        assert!(merge(Some("a;x=\"open"), Some("b.cap"), &mut attrs).is_err());
        assert_eq!(attrs.get(REQUIRE_CAPABILITY), Some("a;x=\"open"));
    }

    #[test]
    fn malformed_derived_is_reported() {
        let mut attrs = with_legacy_ee();
        let before = attrs.clone();
        assert!(merge(None, Some("x=1"), &mut attrs).is_err());
        assert_eq!(attrs, before);
    }

    #[test]
    fn enhance_reads_both_manifests() {
        let mut main: Attributes = [(REQUIRE_CAPABILITY, "a.cap;x=1")].into_iter().collect();
        let calculated: Attributes = [(REQUIRE_CAPABILITY, "b.cap;y=2")].into_iter().collect();
        enhance_require_capability(&mut main, &calculated).unwrap();
        assert_eq!(main.get(REQUIRE_CAPABILITY), Some("a.cap;x=1,b.cap;y=2"));
    }

    #[test]
    fn enhance_without_calculated_header_is_noop() {
        let mut main: Attributes = [(REQUIRE_CAPABILITY, "a.cap;x=1")].into_iter().collect();
        let report = enhance_require_capability(&mut main, &Attributes::new()).unwrap();
        assert_eq!(report.outcome, MergeOutcome::NothingDerived);
        assert_eq!(main.get(REQUIRE_CAPABILITY), Some("a.cap;x=1"));
    }

    #[test]
    fn report_serializes_flat() {
        let report = MergeReport::new(MergeOutcome::Merged { clauses: 2, added: 1 }, true);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "merged");
        assert_eq!(json["clauses"], 2);
        assert_eq!(json["legacy_ee_removed"], true);
    }

    fn clause() -> impl Strategy<Value = String> {
        ("[a-c]\\.cap", 0u8..3).prop_map(|(ns, x)| format!("{ns};x={x}"))
    }

    fn header() -> impl Strategy<Value = String> {
        prop::collection::vec(clause(), 1..6).prop_map(|clauses| clauses.join(","))
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(existing in header(), derived in header()) {
            let mut attrs = Attributes::new();
            merge(Some(&existing), Some(&derived), &mut attrs).unwrap();
            let merged = attrs.get(REQUIRE_CAPABILITY).unwrap().to_string();

            let mut again = Attributes::new();
            merge(Some(&merged), Some(&merged), &mut again).unwrap();
            prop_assert_eq!(again.get(REQUIRE_CAPABILITY), Some(merged.as_str()));

            let mut absent = Attributes::new();
            absent.insert(REQUIRE_CAPABILITY, merged.clone());
            merge(Some(&merged), None, &mut absent).unwrap();
            prop_assert_eq!(absent.get(REQUIRE_CAPABILITY), Some(merged.as_str()));
        }

        #[test]
        fn merged_clauses_are_unique(existing in header(), derived in header()) {
            let mut attrs = Attributes::new();
            merge(Some(&existing), Some(&derived), &mut attrs).unwrap();
            let merged = attrs.get(REQUIRE_CAPABILITY).unwrap();
            let clauses: Vec<&str> = merged.split(',').collect();
            let unique: HashSet<&str> = clauses.iter().copied().collect();
            prop_assert_eq!(clauses.len(), unique.len());
            for clause in derived.split(',').chain(existing.split(',')) {
                prop_assert!(clauses.contains(&clause));
            }
        }
    }
}
