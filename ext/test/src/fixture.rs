//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the ordo codec.
//!
//! A fixture names a record type, a token stream and either the error code
//! decoding must fail with, or a list of records the decoded predicate is
//! evaluated against:
//!
//! ```yaml
//! name: orc_conjunction
//! description: three-leaf AND over a monster
//! record: monster
//! tokens: ["&&", "&&", "==", "level", 80, "==", "name", "Orc", "==", "hp", 100]
//! cases:
//!   - name: full_health
//!     record: { level: 80, name: Orc, hp: 100 }
//!     expect: true
//! ```

use std::collections::HashMap;

use ordo::prelude::*;
use serde::Deserialize;

use crate::{Monster, RecordFixture, Relic};

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub record: RecordKind,
    pub tokens: TokenStream,
    /// Error code (see [`CodecError::code`]) decoding must fail with.
    #[serde(default)]
    pub expect_error: Option<String>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// Which reference record type the fixture decodes against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Monster,
    Relic,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    /// Field values; unnamed fields keep their defaults.
    #[serde(default)]
    pub record: HashMap<String, Token>,
    pub expect: bool,
}

impl TestCase {
    /// Build a record of type `R` from this case's field map.
    ///
    /// # Errors
    ///
    /// Propagates [`RecordFixture::set_field`] failures.
    pub fn build_record<R: RecordFixture>(&self) -> Result<R, CodecError> {
        R::from_values(
            self.record
                .iter()
                .map(|(field, token)| (field.as_str(), token.to_value())),
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

impl CaseResult {
    fn new(case_name: &str, expected: String, actual: String) -> Self {
        Self {
            case_name: case_name.to_owned(),
            passed: expected == actual,
            expected,
            actual,
        }
    }
}

impl Fixture {
    /// Parse a fixture from YAML
    ///
    /// # Errors
    ///
    /// Returns the YAML error if the document is not a fixture.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    ///
    /// # Errors
    ///
    /// Returns the first document's YAML error.
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all test cases and return results
    #[must_use]
    pub fn run(&self) -> Vec<CaseResult> {
        match self.record {
            RecordKind::Monster => self.run_as::<Monster>(),
            RecordKind::Relic => self.run_as::<Relic>(),
        }
    }

    fn run_as<R: RecordFixture>(&self) -> Vec<CaseResult> {
        let registry = R::registry();
        let decoded = decode(&self.tokens, registry);

        if let Some(code) = &self.expect_error {
            let actual = match &decoded {
                Ok(expr) => format!("decoded {expr}"),
                Err(err) => err.code().to_owned(),
            };
            return vec![CaseResult::new("decode", code.clone(), actual)];
        }

        let expr = match decoded {
            Ok(expr) => expr,
            Err(err) => {
                return vec![CaseResult::new(
                    "decode",
                    "ok".to_owned(),
                    format!("error: {err}"),
                )]
            }
        };

        let mut results = vec![CaseResult::new(
            "round_trip",
            format!("{expr}"),
            round_trip(&expr, registry),
        )];

        let runner = match PredicateRunner::new(expr.clone(), registry) {
            Ok(runner) => runner,
            Err(err) => {
                results.push(CaseResult::new(
                    "validate",
                    "ok".to_owned(),
                    format!("error: {err}"),
                ));
                return results;
            }
        };

        for case in &self.cases {
            let actual = match case.build_record::<R>() {
                Ok(record) => {
                    let matched = runner.matches(&record);
                    let unvalidated = evaluate(&expr, registry, &record);
                    let traced = runner.evaluate_with_trace(&record).matched();
                    if unvalidated == Ok(matched) && traced == matched {
                        matched.to_string()
                    } else {
                        format!("inconsistent: matches={matched} evaluate={unvalidated:?} trace={traced}")
                    }
                }
                Err(err) => format!("bad record: {err}"),
            };
            results.push(CaseResult::new(
                &case.name,
                case.expect.to_string(),
                actual,
            ));
        }
        results
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        let results = self.run();
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {}, got {}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

/// Encode `expr` and decode it again, rendering the result in infix form.
fn round_trip<R>(expr: &Expr, registry: &FieldRegistry<R>) -> String {
    match encode(expr, registry).and_then(|stream| decode(&stream, registry)) {
        Ok(again) => format!("{again}"),
        Err(err) => format!("error: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORC: &str = r#"
name: orc
description: three-leaf conjunction
record: monster
tokens: ["&&", "&&", "==", "level", 80, "==", "name", "Orc", "==", "hp", 100]
cases:
  - name: full_health
    record: { level: 80, name: Orc, hp: 100 }
    expect: true
  - name: wounded
    record: { level: 80, name: Orc, hp: 99 }
    expect: false
"#;

    #[test]
    fn parses_and_runs_single_fixture() {
        let fixture = Fixture::from_yaml(ORC).unwrap();
        assert_eq!(fixture.record, RecordKind::Monster);
        assert_eq!(fixture.tokens.len(), 11);
        assert_eq!(fixture.cases.len(), 2);
        fixture.run_and_assert();
    }

    #[test]
    fn expected_error_is_matched_by_code() {
        let fixture = Fixture::from_yaml(
            r#"
name: ghost
record: monster
tokens: ["==", "ghost", 1]
expect_error: unknown_field
"#,
        )
        .unwrap();
        let results = fixture.run();
        assert_eq!(results.len(), 1);
        assert!(results[0].passed, "{results:?}");
    }

    #[test]
    fn wrong_expectation_fails() {
        let fixture = Fixture::from_yaml(
            r#"
name: wrong
record: relic
tokens: ["==", "cursed", true]
cases:
  - name: clean
    record: { cursed: false }
    expect: true
"#,
        )
        .unwrap();
        let results = fixture.run();
        let clean = results.iter().find(|r| r.case_name == "clean").unwrap();
        assert!(!clean.passed);
        assert_eq!(clean.actual, "false");
    }

    #[test]
    fn multi_document_parsing() {
        let yaml = format!("{ORC}\n---\n{ORC}");
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap();
        assert_eq!(fixtures.len(), 2);
    }
}
