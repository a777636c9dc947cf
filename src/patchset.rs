use std::str::FromStr;

use clap::builder::StringValueParser;
use clap::builder::TypedValueParser;
use clap::builder::ValueParserFactory;
use derive_more::{AsRef, Constructor, Deref, DerefMut, Display, From, FromStr, Into};

use crate::change_number::ChangeNumber;

/// A patch set number within a change.
///
/// User-facing selection is 1-based; patch set 1 is the oldest.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Display,
    Into,
    From,
    FromStr,
    AsRef,
    Deref,
    DerefMut,
    Constructor,
)]
#[serde(transparent)]
pub struct Patchset(u64);

/// A change number with an optional patch set, as `NUMBER[/PATCHSET]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChangePatchset {
    pub change: ChangeNumber,
    pub patchset: Option<Patchset>,
}

impl std::fmt::Display for ChangePatchset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.patchset {
            Some(patchset) => write!(f, "{}/{}", self.change, patchset),
            None => self.change.fmt(f),
        }
    }
}

/// Error from parsing a `NUMBER[/PATCHSET]` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseChangePatchsetError {
    input: String,
}

impl std::fmt::Display for ParseChangePatchsetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Expected `NUMBER` or `NUMBER/PATCHSET`, got `{}`",
            self.input
        )
    }
}

impl std::error::Error for ParseChangePatchsetError {}

impl FromStr for ChangePatchset {
    type Err = ParseChangePatchsetError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let error = || ParseChangePatchsetError {
            input: input.to_owned(),
        };
        match input.split_once('/') {
            Some((change, patchset)) => Ok(Self {
                change: change.parse().map_err(|_| error())?,
                patchset: Some(patchset.parse().map_err(|_| error())?),
            }),
            None => Ok(Self {
                change: input.parse().map_err(|_| error())?,
                patchset: None,
            }),
        }
    }
}

#[derive(Clone)]
pub struct ChangePatchsetParser;

impl ValueParserFactory for ChangePatchset {
    type Parser = ChangePatchsetParser;

    fn value_parser() -> Self::Parser {
        ChangePatchsetParser
    }
}

impl TypedValueParser for ChangePatchsetParser {
    type Value = ChangePatchset;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let value = StringValueParser::new().parse_ref(cmd, arg, value)?;
        value.parse().map_err(|error: ParseChangePatchsetError| {
            cmd.clone()
                .error(clap::error::ErrorKind::ValueValidation, error.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_change_only() {
        assert_eq!(
            "123".parse::<ChangePatchset>().unwrap(),
            ChangePatchset {
                change: "123".parse().unwrap(),
                patchset: None,
            }
        );
    }

    #[test]
    fn test_parse_change_and_patchset() {
        assert_eq!(
            "123/4".parse::<ChangePatchset>().unwrap(),
            ChangePatchset {
                change: "123".parse().unwrap(),
                patchset: Some(Patchset::new(4)),
            }
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("ouppy".parse::<ChangePatchset>().is_err());
        assert!("123/".parse::<ChangePatchset>().is_err());
        assert!("/4".parse::<ChangePatchset>().is_err());
        assert!("123/4/5".parse::<ChangePatchset>().is_err());
        assert!("".parse::<ChangePatchset>().is_err());
    }
}
