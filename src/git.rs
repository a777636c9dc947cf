use std::process::Command;

use camino::Utf8PathBuf;
use command_error::CommandExt;
use command_error::OutputContext;
use miette::Context;
use miette::IntoDiagnostic;
use utf8_command::Utf8Output;

use crate::commit_hash::CommitHash;
use crate::gerrit::Gerrit;
use crate::rest::Tls;

/// `git` CLI wrapper.
#[derive(Debug)]
pub struct Git {}

impl Git {
    pub fn new() -> Self {
        Self {}
    }

    /// Get a `git` command.
    pub fn command(&self) -> Command {
        Command::new("git")
    }

    /// Construct a Gerrit client from this repository's `origin` remote.
    pub fn gerrit(&self, tls: Tls) -> miette::Result<Gerrit> {
        Gerrit::from_repository(self, tls)
    }

    /// Root of the enclosing work tree.
    pub fn toplevel(&self) -> miette::Result<Utf8PathBuf> {
        Ok(self
            .command()
            .args(["rev-parse", "--show-toplevel"])
            .output_checked_utf8()
            .into_diagnostic()
            .wrap_err("Not inside a Git work tree?")?
            .stdout
            .trim()
            .into())
    }

    /// Get the (fetch) URL for the given remote.
    pub fn remote_url(&self, remote: &str) -> miette::Result<String> {
        Ok(self
            .command()
            .args(["remote", "get-url", remote])
            .output_checked_utf8()
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to get URL for remote `{remote}`"))?
            .stdout
            .trim()
            .to_owned())
    }

    /// Fetch a ref into `FETCH_HEAD`.
    pub fn fetch(&self, url: &str, ref_name: &str) -> miette::Result<()> {
        self.command()
            .args(["fetch", url, ref_name])
            .status_checked()
            .map(|_| ())
            .into_diagnostic()
    }

    /// Check out a ref into the work tree.
    pub fn checkout(&self, ref_name: &str) -> miette::Result<()> {
        self.command()
            .args(["checkout", ref_name])
            .status_checked()
            .map(|_| ())
            .into_diagnostic()
    }

    /// Cherry-pick a ref onto the current branch.
    pub fn cherry_pick(&self, ref_name: &str) -> miette::Result<()> {
        self.command()
            .args(["cherry-pick", ref_name])
            .status_checked()
            .map(|_| ())
            .into_diagnostic()
    }

    /// Show a ref, with output going straight to the terminal.
    pub fn show(&self, ref_name: &str) -> miette::Result<()> {
        self.command()
            .args(["show", ref_name])
            .status_checked()
            .map(|_| ())
            .into_diagnostic()
    }

    /// The object type of `sha`, or `None` when the object is not present
    /// locally.
    ///
    /// `git cat-file -t` exits non-zero for unknown objects, so a failed
    /// lookup means an absent object rather than an error.
    pub fn object_type(&self, sha: &CommitHash) -> miette::Result<Option<String>> {
        self.command()
            .args(["cat-file", "-t", sha.as_str()])
            .output_checked_as(|context: OutputContext<Utf8Output>| {
                if context.status().success() {
                    Ok(Some(context.output().stdout.trim().to_owned()))
                } else if context.status().code().is_some() {
                    Ok(None)
                } else {
                    // Killed by a signal.
                    Err(context.error())
                }
            })
            .into_diagnostic()
    }

    /// Point a ref at a commit without fetching.
    pub fn update_ref(&self, ref_name: &str, sha: &CommitHash) -> miette::Result<()> {
        self.command()
            .args(["update-ref", ref_name, sha.as_str()])
            .status_checked()
            .map(|_| ())
            .into_diagnostic()
    }

    /// Does the work tree have uncommitted changes?
    pub fn is_dirty(&self) -> miette::Result<bool> {
        Ok(!self
            .command()
            .args(["status", "--porcelain"])
            .output_checked_utf8()
            .into_diagnostic()
            .wrap_err("Failed to get Git status")?
            .stdout
            .trim()
            .is_empty())
    }
}
