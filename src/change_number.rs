use std::fmt::Display;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::Deserialize;

/// A Gerrit change number.
///
/// Unlike a change ID, this is a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChangeNumber(u64);

impl Display for ChangeNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ChangeNumber {
    type Err = ParseIntError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        u64::from_str(input).map(Self)
    }
}

impl<'de> Deserialize<'de> for ChangeNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Self)
    }
}
