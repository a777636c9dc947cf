use clap::builder::StringValueParser;
use clap::builder::TypedValueParser;
use clap::builder::ValueParserFactory;
use derive_more::{AsRef, Deref, DerefMut, Display, Into};

use crate::change_number::ChangeNumber;

/// An API endpoint, with no leading `/`.
///
/// Endpoints are resolved against the server's authenticated `/a/` namespace.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Display,
    Into,
    AsRef,
    Deref,
    DerefMut,
)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new(endpoint: &str) -> Self {
        Self(endpoint.trim_start_matches('/').to_owned())
    }

    /// A single change with all of its patch sets.
    pub fn change(change: ChangeNumber) -> Self {
        Self(format!("changes/{change}/?o=ALL_REVISIONS"))
    }

    /// A change search, with all patch sets for each result.
    pub fn change_query(query: &str) -> Self {
        Self(format!("changes/?o=ALL_REVISIONS&q={query}"))
    }

    /// All active accounts, with display names.
    pub fn active_accounts() -> Self {
        Self("accounts/?o=DETAILS&q=is:active".to_owned())
    }
}

#[derive(Clone)]
pub struct EndpointParser;

impl ValueParserFactory for Endpoint {
    type Parser = EndpointParser;

    fn value_parser() -> Self::Parser {
        EndpointParser
    }
}

impl TypedValueParser for EndpointParser {
    type Value = Endpoint;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        StringValueParser::new()
            .parse_ref(cmd, arg, value)
            .map(|value| Endpoint::new(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_endpoint_strips_leading_slash() {
        assert_eq!(
            Endpoint::new("/changes/?q=status:open"),
            Endpoint::new("changes/?q=status:open")
        );
    }

    #[test]
    fn test_change_endpoint() {
        assert_eq!(
            Endpoint::change("123".parse().unwrap()).to_string(),
            "changes/123/?o=ALL_REVISIONS"
        );
    }
}
