//! Persisted form of record type definitions.
//!
//! Definitions are plain serde data that refer to accessors and predicates by
//! identifier string. Nothing is resolved during deserialization. An unknown
//! identifier or bad regex only surfaces when the definitions are
//! [built](MatcherDef::build), and then as a named [`Error`] rather than
//! a generic parse failure.
//!
//! ```json
//! { "types": [
//!     { "name": "Error", "color": "#ff0000",
//!       "matcher": { "kind": "field", "accessor": "sendSubject",
//!                    "predicate": "contains", "argument": "ERROR" } },
//!     { "name": "Normal", "matcher": { "kind": "any" } }
//! ] }
//! ```

use crate::color::Color;
use crate::error::Result;
use crate::matcher::RecordMatcher;
use crate::record_type::RecordType;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An ordered list of record type definitions, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinitions {
    #[serde(default)]
    pub types: Vec<RecordTypeDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordTypeDef {
    pub name: String,
    #[serde(default)]
    pub color: Color,
    #[serde(default = "selected_by_default")]
    pub selected: bool,
    #[serde(default)]
    pub matcher: MatcherDef,
}

fn selected_by_default() -> bool {
    true
}

/// Serializable mirror of [`RecordMatcher`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MatcherDef {
    #[default]
    Any,
    Field {
        accessor: String,
        predicate: String,
        argument: String,
        #[serde(default)]
        ignoring_case: bool,
    },
    And {
        matchers: Vec<MatcherDef>,
    },
    Or {
        matchers: Vec<MatcherDef>,
    },
    Not {
        matcher: Box<MatcherDef>,
    },
}

impl MatcherDef {
    /// Resolve identifiers and compile predicates.
    ///
    /// # Errors
    ///
    /// The first construction error found, depth first.
    pub fn build(&self) -> Result<RecordMatcher> {
        Ok(match self {
            MatcherDef::Any => RecordMatcher::Any,
            MatcherDef::Field {
                accessor,
                predicate,
                argument,
                ignoring_case,
            } => RecordMatcher::from_identifiers(
                accessor,
                predicate,
                argument.as_str(),
                *ignoring_case,
            )?,
            MatcherDef::And { matchers } => RecordMatcher::And(build_all(matchers)?),
            MatcherDef::Or { matchers } => RecordMatcher::Or(build_all(matchers)?),
            MatcherDef::Not { matcher } => RecordMatcher::not(matcher.build()?),
        })
    }
}

fn build_all(defs: &[MatcherDef]) -> Result<Vec<RecordMatcher>> {
    defs.iter().map(MatcherDef::build).collect()
}

impl From<&RecordMatcher> for MatcherDef {
    fn from(matcher: &RecordMatcher) -> Self {
        match matcher {
            RecordMatcher::Any => MatcherDef::Any,
            RecordMatcher::Field {
                accessor,
                predicate,
            } => MatcherDef::Field {
                accessor: accessor.identifier().to_string(),
                predicate: predicate.identifier().to_string(),
                argument: predicate.argument().to_string(),
                ignoring_case: predicate.is_ignoring_case(),
            },
            RecordMatcher::And(parts) => MatcherDef::And {
                matchers: parts.iter().map(MatcherDef::from).collect(),
            },
            RecordMatcher::Or(parts) => MatcherDef::Or {
                matchers: parts.iter().map(MatcherDef::from).collect(),
            },
            RecordMatcher::Not(inner) => MatcherDef::Not {
                matcher: Box::new(MatcherDef::from(inner.as_ref())),
            },
        }
    }
}

impl From<&RecordType> for RecordTypeDef {
    fn from(record_type: &RecordType) -> Self {
        Self {
            name: record_type.name().to_string(),
            color: record_type.color(),
            selected: record_type.is_selected(),
            matcher: MatcherDef::from(record_type.matcher()),
        }
    }
}

impl TypeDefinitions {
    pub fn from_json(src: &str) -> serde_json::Result<Self> {
        serde_json::from_str(src)
    }

    pub fn to_json_pretty(&self) -> String {
        // Plain strings, bools and nested enums: serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Read definitions from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("reading record types from {}", path.display()))?;
        Self::from_json(&src)
            .with_context(|| format!("parsing record types from {}", path.display()))
    }

    /// Write definitions as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json_pretty())
            .with_context(|| format!("writing record types to {}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_minimal_definition() {
        let defs = TypeDefinitions::from_json(
            r#"{"types":[{"name":"Orders","matcher":{"kind":"field","accessor":"sendSubject","predicate":"startsWith","argument":"ORDERS."}}]}"#,
        )
        .unwrap();
        let def = &defs.types[0];
        assert_eq!(def.color, Color::BLACK);
        assert!(def.selected);
        let matcher = def.matcher.build().unwrap();
        assert!(matcher.matches(&crate::Message::new("ORDERS.NEW")));
    }

    #[test]
    fn matcher_round_trips_through_definition() {
        let matcher = RecordMatcher::or([
            RecordMatcher::from_identifiers("trackingId", "regex", "t-[0-9]+", true).unwrap(),
            RecordMatcher::not(RecordMatcher::send_subject_contains("X").unwrap()),
        ]);
        let def = MatcherDef::from(&matcher);
        let json = serde_json::to_string(&def).unwrap();
        let back: MatcherDef = serde_json::from_str(&json).unwrap();
        assert_eq!(back.build().unwrap(), matcher);
    }

    #[test]
    fn unknown_identifiers_surface_on_build_not_parse() {
        let def: MatcherDef = serde_json::from_str(
            r#"{"kind":"field","accessor":"subject","predicate":"contains","argument":"x"}"#,
        )
        .unwrap();
        assert_eq!(
            def.build().unwrap_err(),
            Error::InvalidIdentifier {
                registry: "accessor identifier",
                value: "subject".into()
            }
        );
    }

    #[test]
    fn nested_errors_are_not_swallowed() {
        let def = MatcherDef::And {
            matchers: vec![
                MatcherDef::Any,
                MatcherDef::Not {
                    matcher: Box::new(MatcherDef::Field {
                        accessor: "sendSubject".into(),
                        predicate: "regex".into(),
                        argument: "(".into(),
                        ignoring_case: false,
                    }),
                },
            ],
        };
        assert!(matches!(def.build(), Err(Error::InvalidPattern { .. })));
    }
}
