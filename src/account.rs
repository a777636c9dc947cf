use derive_more::{AsRef, Constructor, Deref, DerefMut, Display, From, Into};

/// A Gerrit account ID.
#[derive(
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
    AsRef,
    Deref,
    DerefMut,
    Constructor,
)]
#[serde(transparent)]
pub struct AccountId(u64);

/// A Gerrit account.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct Account {
    #[serde(rename = "_account_id")]
    pub account_id: AccountId,
    /// Full display name. Service accounts may not have one.
    pub name: Option<String>,
}

/// Compute a short display label from a person's full name.
///
/// Hyphenated names count as separate words: `Mary-Jane Watson` is `MJW`.
pub fn initials(name: &str) -> String {
    name.trim()
        .to_uppercase()
        .replace('-', " ")
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_initials() {
        assert_eq!(initials("Jane Anne Doe"), "JAD");
        assert_eq!(initials("mary-jane watson"), "MJW");
        assert_eq!(initials("O"), "O");
    }

    #[test]
    fn test_initials_whitespace() {
        assert_eq!(initials("  Jane   Doe "), "JD");
        assert_eq!(initials(""), "");
    }
}
