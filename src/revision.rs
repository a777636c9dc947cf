use std::collections::BTreeMap;

use miette::miette;

use crate::commit_hash::CommitHash;
use crate::patchset::Patchset;

/// One patch set of a change.
///
/// The REST API keys revisions by commit hash rather than embedding the hash
/// in the revision; [`crate::change::Change::attach_revision_keys`] copies the
/// key into [`Revision::sha`] after deserialization.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct Revision {
    /// Commit hash, attached from the revision map key.
    #[serde(skip)]
    pub sha: CommitHash,
    /// Patch set number.
    #[serde(rename = "_number")]
    pub number: Patchset,
    /// Fetch instructions, keyed by protocol name.
    #[serde(default)]
    pub fetch: BTreeMap<String, FetchInfo>,
}

impl Revision {
    /// Gerrit's protocol name for HTTP fetch instructions.
    const FETCH_PROTOCOL: &'static str = "http";

    /// Fetch instructions for the HTTP protocol.
    pub fn http_fetch(&self) -> miette::Result<&FetchInfo> {
        self.fetch.get(Self::FETCH_PROTOCOL).ok_or_else(|| {
            miette!(
                "Patch set {} has no `{}` fetch info",
                self.number,
                Self::FETCH_PROTOCOL
            )
        })
    }
}

/// Where to fetch a patch set from.
#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FetchInfo {
    /// Repository URL.
    pub url: String,
    /// The ref holding the patch set's commit.
    #[serde(rename = "ref")]
    pub ref_name: String,
}
