//! Protocol (scheme) resolution strategies.
//!
//! # Responsibilities
//! - Map protocol-header values to a URI scheme
//! - Support a fixed lookup table and custom strategy functions through one
//!   interface
//!
//! # Design Decisions
//! - Tables are ordered: the first protocol whose accepted values contain
//!   the header value wins
//! - Header values are matched case-insensitively against lower-cased
//!   accepted values
//! - A custom strategy may decline to decide; an empty scheme from it is a
//!   contract violation reported to the caller

use std::fmt;
use std::sync::Arc;

use crate::trust::error::{TrustError, TrustResult};

/// A custom strategy: receives every value of the matched header and returns
/// a scheme, or `None` for no decision.
pub type ProtocolStrategy = Arc<dyn Fn(&[String]) -> Option<String> + Send + Sync>;

/// Strategy for turning a protocol header's values into a URI scheme.
#[derive(Clone)]
pub enum ProtocolResolution {
    /// Ordered `protocol -> accepted header values` table.
    Table(Vec<(String, Vec<String>)>),
    /// Custom strategy function.
    Custom(ProtocolStrategy),
}

impl ProtocolResolution {
    /// The table used when a header is registered without an explicit
    /// mapping: `{ http: [http], https: [https, on] }`.
    pub fn default_table() -> Self {
        Self::Table(vec![
            ("http".to_string(), vec!["http".to_string()]),
            (
                "https".to_string(),
                vec!["https".to_string(), "on".to_string()],
            ),
        ])
    }

    /// Build a validated table. Accepted values are normalized to
    /// lower-case; the table and every accepted-value list must be
    /// non-empty.
    pub fn table<I, S, V, A>(entries: I) -> TrustResult<Self>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: IntoIterator<Item = A>,
        A: AsRef<str>,
    {
        let mut table = Vec::new();
        for (protocol, accepted) in entries {
            let protocol = protocol.as_ref().trim().to_string();
            if protocol.is_empty() {
                return Err(TrustError::EmptyProtocolName);
            }
            let accepted: Vec<String> = accepted
                .into_iter()
                .map(|value| value.as_ref().trim().to_ascii_lowercase())
                .collect();
            if accepted.is_empty() {
                return Err(TrustError::EmptyAcceptedValues(protocol));
            }
            table.push((protocol, accepted));
        }
        if table.is_empty() {
            return Err(TrustError::EmptyProtocolMapping);
        }
        Ok(Self::Table(table))
    }

    /// Wrap a custom strategy function.
    pub fn custom<F>(strategy: F) -> Self
    where
        F: Fn(&[String]) -> Option<String> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(strategy))
    }

    /// Evaluate this strategy against the matched header's values.
    ///
    /// Tables consult only the first value. `Ok(None)` means no decision;
    /// the caller falls through to the next candidate header.
    pub fn resolve(&self, values: &[String]) -> TrustResult<Option<String>> {
        match self {
            Self::Table(table) => {
                let Some(first) = values.first() else {
                    return Ok(None);
                };
                let needle = first.trim().to_ascii_lowercase();
                for (protocol, accepted) in table {
                    if accepted.iter().any(|value| *value == needle) {
                        return Ok(Some(protocol.clone()));
                    }
                }
                Ok(None)
            }
            Self::Custom(strategy) => match strategy(values) {
                None => Ok(None),
                Some(scheme) if scheme.is_empty() => Err(TrustError::EmptyScheme),
                Some(scheme) => Ok(Some(scheme)),
            },
        }
    }
}

impl fmt::Debug for ProtocolResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(table) => f.debug_tuple("Table").field(table).finish(),
            Self::Custom(_) => f.debug_tuple("Custom").field(&"<strategy>").finish(),
        }
    }
}
