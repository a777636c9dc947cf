use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;

use crate::endpoint::Endpoint;
use crate::patchset::ChangePatchset;
use crate::rest::Tls;

/// A Gerrit checkout CLI.
///
/// Run it inside a clone of a Gerrit-hosted repository; the server, project,
/// and credentials are discovered from the `origin` remote.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
#[command(max_term_width = 100, disable_help_subcommand = true)]
pub struct Opts {
    /// Log filter directives, of the form `target[span{field=value}]=level`, where all components
    /// except the level are optional.
    ///
    /// Try `debug` or `trace`.
    #[arg(long, default_value = "info", env = "FERRIT_LOG")]
    pub log: String,

    /// Verify the Gerrit server's TLS certificate.
    ///
    /// Off by default; Gerrit deployments commonly sit behind internal CAs.
    #[arg(long, env = "FERRIT_VERIFY_TLS")]
    pub verify_tls: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Opts {
    pub fn tls(&self) -> Tls {
        if self.verify_tls {
            Tls::VerifyCertificates
        } else {
            Tls::AcceptInvalidCertificates
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fetch a change into `FETCH_HEAD` and print the fetched ref.
    Fetch {
        /// The change to fetch, as `NUMBER` or `NUMBER/PATCHSET`.
        ///
        /// Defaults to the latest patch set.
        change: ChangePatchset,
    },
    /// Fetch a change and check out `FETCH_HEAD`.
    #[command(visible_alias = "ch")]
    Checkout {
        /// The change to check out, as `NUMBER` or `NUMBER/PATCHSET`.
        change: ChangePatchset,
    },
    /// Fetch a change and cherry-pick it onto the current branch.
    #[command(visible_alias = "cp")]
    CherryPick {
        /// The change to cherry-pick, as `NUMBER` or `NUMBER/PATCHSET`.
        change: ChangePatchset,
    },
    /// Fetch a change and show its commit.
    Show {
        /// The change to show, as `NUMBER` or `NUMBER/PATCHSET`.
        change: ChangePatchset,
    },
    /// Print the commit hash of a patch set.
    #[command(visible_aliases = ["sha", "id"])]
    RevParse {
        /// The change to resolve, as `NUMBER` or `NUMBER/PATCHSET`.
        change: ChangePatchset,
    },
    /// List your open changes and changes waiting on you.
    #[command(visible_aliases = ["da", "li"])]
    Dashboard,
    /// Search open changes and offer to check out the first match.
    #[command(visible_alias = "se")]
    Search {
        /// Gerrit search terms, e.g. `topic:frobnicate` or `owner:self`.
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// GET a REST endpoint and pretty-print the JSON response.
    Api {
        /// Endpoint path below `/a/`, e.g. `changes/?q=status:open`.
        endpoint: Endpoint,
    },
    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
