use std::cell::OnceCell;
use std::collections::BTreeMap;

use miette::miette;
use miette::Context;
use miette::IntoDiagnostic;
use tap::Tap;

use crate::account::initials;
use crate::account::Account;
use crate::account::AccountId;
use crate::change::Change;
use crate::change_number::ChangeNumber;
use crate::credentials::Credentials;
use crate::endpoint::Endpoint;
use crate::gerrit_project::GerritProject;
use crate::git::Git;
use crate::patchset::ChangePatchset;
use crate::prompt;
use crate::query::Query;
use crate::rest::GerritRest;
use crate::rest::Tls;
use crate::revision::Revision;

/// The Git remote Gerrit changes are fetched from.
const REMOTE_NAME: &str = "origin";

/// A Gerrit client tied to the repository enclosing the working directory.
pub struct Gerrit {
    project: GerritProject,
    /// The configured URL of the `origin` remote.
    remote_url: String,
    rest: GerritRest,
    /// Lazily fetched account id → initials map; at most one request per
    /// invocation.
    account_initials: OnceCell<BTreeMap<AccountId, String>>,
}

impl Gerrit {
    /// Discover the Gerrit server from the `origin` remote and resolve
    /// credentials for it.
    pub fn from_repository(git: &Git, tls: Tls) -> miette::Result<Self> {
        let toplevel = git.toplevel()?;
        tracing::debug!(%toplevel, "Found Git work tree");
        let remote_url = git.remote_url(REMOTE_NAME)?;
        let project = GerritProject::parse_from_remote_url(&remote_url)?;
        let credentials = Credentials::load(&Credentials::default_path()?)?;
        let credential = credentials.resolve(&project.host)?;
        tracing::debug!(
            host = %project.host,
            username = %credential.username,
            "Resolved credentials"
        );
        let rest = GerritRest::new(credential, tls)?;
        Ok(Self {
            project,
            remote_url,
            rest,
            account_initials: OnceCell::new(),
        })
    }

    fn git(&self) -> Git {
        Git::new()
    }

    /// GET an arbitrary REST endpoint.
    pub fn api(&self, endpoint: &Endpoint) -> miette::Result<Option<serde_json::Value>> {
        self.rest.get(endpoint)
    }

    /// Get a change by number, with all of its patch sets.
    ///
    /// `None` means the change does not exist; callers decide whether that is
    /// fatal.
    pub fn get_change(&self, change: ChangeNumber) -> miette::Result<Option<Change>> {
        let change: Option<Change> = self.rest.get(&Endpoint::change(change))?;
        Ok(change.map(|mut change| {
            change.attach_revision_keys();
            change
        }))
    }

    /// Search for changes in this repository's project.
    pub fn get_changes(&self, query: Query) -> miette::Result<Vec<Change>> {
        let changes: Vec<Change> = self
            .rest
            .get(&self.changes_endpoint(query))?
            .unwrap_or_default();
        Ok(attach_revision_keys(changes)
            .tap(|changes| tracing::debug!(count = changes.len(), "Query returned changes")))
    }

    /// Run several change searches concurrently, one result list per query.
    pub fn get_changes_many(&self, queries: Vec<Query>) -> miette::Result<Vec<Vec<Change>>> {
        let endpoints = queries
            .into_iter()
            .map(|query| self.changes_endpoint(query))
            .collect::<Vec<_>>();
        let results: Vec<Option<Vec<Change>>> = self.rest.get_many(&endpoints)?;
        Ok(results
            .into_iter()
            .map(|changes| attach_revision_keys(changes.unwrap_or_default()))
            .collect())
    }

    /// Scope a query to this repository's project and format its endpoint.
    fn changes_endpoint(&self, query: Query) -> Endpoint {
        Endpoint::change_query(&query.repo(&self.project.project).join())
    }

    /// Map account ids to display initials for all active accounts.
    pub fn account_initials(&self) -> miette::Result<&BTreeMap<AccountId, String>> {
        if self.account_initials.get().is_none() {
            let accounts: Vec<Account> = self
                .rest
                .get(&Endpoint::active_accounts())?
                .unwrap_or_default();
            let map = accounts
                .into_iter()
                .filter_map(|account| {
                    let label = initials(account.name.as_deref()?);
                    Some((account.account_id, label))
                })
                .collect();
            let _ = self.account_initials.set(map);
        }
        Ok(self
            .account_initials
            .get()
            .expect("Initials cache was just populated"))
    }

    /// Resolve a change and the requested patch set (latest if unspecified).
    pub fn resolve(&self, requested: ChangePatchset) -> miette::Result<(Change, Revision)> {
        let change = self
            .get_change(requested.change)?
            .ok_or_else(|| miette!("Change {} not found", requested.change))?;
        let revision = match requested.patchset {
            Some(patchset) => change.revision(patchset)?,
            None => change.latest_revision()?,
        }
        .clone();
        Ok((change, revision))
    }

    /// Fetch a patch set into `FETCH_HEAD`.
    ///
    /// When the commit is already present locally the network fetch is
    /// skipped and `FETCH_HEAD` is pointed at it directly.
    pub fn fetch(&self, revision: &Revision) -> miette::Result<()> {
        let fetch = revision.http_fetch()?;
        let fetch_path = url_path(&fetch.url)?;
        let remote_path = url_path(&self.remote_url)?;
        if fetch_path != remote_path {
            return Err(miette!(
                "Patch set fetch URL {} does not match remote {} (wrong repository?)",
                fetch.url,
                self.remote_url
            ));
        }
        let git = self.git();
        if git.object_type(&revision.sha)?.as_deref() == Some("commit") {
            tracing::info!(
                "Commit {} is already present; updating FETCH_HEAD without fetching",
                revision.sha.abbrev()
            );
            return git.update_ref("FETCH_HEAD", &revision.sha);
        }
        git.fetch(&fetch.url, &fetch.ref_name)
            .wrap_err_with(|| format!("Failed to fetch {}", fetch.ref_name))
    }

    /// Fetch a patch set and check out `FETCH_HEAD`.
    ///
    /// A dirty work tree asks for confirmation first; declining is not an
    /// error.
    pub fn fetch_and_checkout(&self, revision: &Revision) -> miette::Result<()> {
        self.fetch(revision)?;
        let git = self.git();
        if git.is_dirty()? && !prompt::confirm("Work tree is dirty, continue?", false)? {
            tracing::info!("Leaving work tree unchanged");
            return Ok(());
        }
        git.checkout("FETCH_HEAD")
    }

    /// Fetch a patch set and cherry-pick it onto the current branch.
    pub fn fetch_and_cherry_pick(&self, revision: &Revision) -> miette::Result<()> {
        self.fetch(revision)?;
        self.git().cherry_pick("FETCH_HEAD")
    }

    /// Fetch a patch set and show its commit.
    pub fn fetch_and_show(&self, revision: &Revision) -> miette::Result<()> {
        self.fetch(revision)?;
        self.git().show("FETCH_HEAD")
    }
}

fn attach_revision_keys(mut changes: Vec<Change>) -> Vec<Change> {
    for change in &mut changes {
        change.attach_revision_keys();
    }
    changes
}

/// The path component of a URL.
fn url_path(url: &str) -> miette::Result<String> {
    Ok(reqwest::Url::parse(url)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to parse URL: {url}"))?
        .path()
        .to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_url_path() {
        assert_eq!(
            url_path("https://user@gerrit.example.com/a/tools/frobnicator").unwrap(),
            "/a/tools/frobnicator"
        );
        assert_eq!(
            url_path("https://gerrit.example.com:8443/a/ouppy").unwrap(),
            "/a/ouppy"
        );
    }

    #[test]
    fn test_url_path_mismatched_repos() {
        let fetch = url_path("https://gerrit.example.com/a/ouppy").unwrap();
        let remote = url_path("https://gerrit.example.com/a/wuppy").unwrap();
        assert_ne!(fetch, remote);
    }
}
