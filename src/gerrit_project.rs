use std::sync::OnceLock;

use miette::miette;
use regex::Regex;

use crate::gerrit_host::GerritHost;

/// A [`GerritHost`] with a project name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GerritProject {
    pub host: GerritHost,
    pub project: String,
}

impl GerritProject {
    /// Parse a Gerrit configuration from a Git remote URL.
    ///
    /// Gerrit HTTP remotes place the project under the authenticated `/a/`
    /// namespace; a remote without that prefix is not a Gerrit remote.
    pub fn parse_from_remote_url(url: &str) -> miette::Result<Self> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let captures = RE
            .get_or_init(|| {
                // SCHEME://USER@HOST:PORT/a/PROJECT
                Regex::new(
                    r"(?x)
                    ^
                    https?://
                    (?: (?P<user>[^@/]+) @ )?
                    (?P<host>[^/@]+)
                    (?P<path>/.*)
                    $",
                )
                .expect("Regex parses")
            })
            .captures(url);
        match captures {
            Some(captures) => {
                let path = &captures["path"];
                let project = path.strip_prefix("/a/").ok_or_else(|| {
                    miette!("Unexpected remote URL format (not a Gerrit remote?): {url}")
                })?;
                Ok(Self {
                    host: GerritHost {
                        host: captures["host"].to_owned(),
                        username: captures.name("user").map(|user| user.as_str().to_owned()),
                    },
                    project: project.trim_end_matches('/').to_owned(),
                })
            }
            None => Err(miette!("Could not parse Git remote as Gerrit URL: {url}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_remote_url() {
        assert_eq!(
            GerritProject::parse_from_remote_url("https://user@gerrit.example.com/a/myproject")
                .unwrap(),
            GerritProject {
                host: GerritHost {
                    host: "gerrit.example.com".to_owned(),
                    username: Some("user".to_owned()),
                },
                project: "myproject".to_owned(),
            }
        );
    }

    #[test]
    fn test_parse_remote_url_no_user() {
        assert_eq!(
            GerritProject::parse_from_remote_url(
                "https://gerrit.example.com:8443/a/tools/frobnicator"
            )
            .unwrap(),
            GerritProject {
                host: GerritHost {
                    host: "gerrit.example.com:8443".to_owned(),
                    username: None,
                },
                project: "tools/frobnicator".to_owned(),
            }
        );
    }

    #[test]
    fn test_parse_remote_url_not_gerrit() {
        assert!(
            GerritProject::parse_from_remote_url("https://gerrit.example.com/myproject").is_err()
        );
    }

    #[test]
    fn test_parse_remote_url_not_http() {
        assert!(
            GerritProject::parse_from_remote_url("ssh://user@gerrit.example.com:29418/myproject")
                .is_err()
        );
    }
}
