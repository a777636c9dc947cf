use std::fmt::Display;

/// The identity of a Gerrit server, as derived from a Git remote URL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GerritHost {
    /// Host, with an optional `:port` suffix.
    pub host: String,
    /// Username from the remote URL's authority, if it names one.
    pub username: Option<String>,
}

impl Display for GerritHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.username {
            Some(username) => write!(f, "{}@{}", username, self.host),
            None => self.host.fmt(f),
        }
    }
}
