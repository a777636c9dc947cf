mod account;
mod change;
mod change_number;
mod cli;
mod commit_hash;
mod credentials;
mod endpoint;
mod gerrit;
mod gerrit_host;
mod gerrit_project;
mod git;
mod install_tracing;
mod patchset;
mod prompt;
mod query;
mod rest;
mod revision;

use calm_io::stdoutln;
use clap::CommandFactory;
use clap::Parser;
use cli::Opts;
use git::Git;
use install_tracing::install_tracing;
use miette::miette;
use miette::IntoDiagnostic;
use owo_colors::OwoColorize;

use crate::change::change_table;
use crate::query::DashboardSection;
use crate::query::Query;

fn main() -> miette::Result<()> {
    let opts = Opts::parse();
    install_tracing(&opts.log)?;

    let tls = opts.tls();
    match opts.command {
        cli::Command::Fetch { change } => {
            let git = Git::new();
            let gerrit = git.gerrit(tls)?;
            let (_, revision) = gerrit.resolve(change)?;
            gerrit.fetch(&revision)?;
            let _ = stdoutln!("{}", revision.http_fetch()?.ref_name);
        }
        cli::Command::Checkout { change } => {
            let git = Git::new();
            let gerrit = git.gerrit(tls)?;
            let (change, revision) = gerrit.resolve(change)?;
            let table = change_table(std::slice::from_ref(&change), gerrit.account_initials()?)?;
            let _ = stdoutln!("\n{table}\n");
            gerrit.fetch_and_checkout(&revision)?;
        }
        cli::Command::CherryPick { change } => {
            let git = Git::new();
            let gerrit = git.gerrit(tls)?;
            let (_, revision) = gerrit.resolve(change)?;
            gerrit.fetch_and_cherry_pick(&revision)?;
        }
        cli::Command::Show { change } => {
            let git = Git::new();
            let gerrit = git.gerrit(tls)?;
            let (_, revision) = gerrit.resolve(change)?;
            gerrit.fetch_and_show(&revision)?;
        }
        cli::Command::RevParse { change } => {
            let git = Git::new();
            let gerrit = git.gerrit(tls)?;
            let (_, revision) = gerrit.resolve(change)?;
            let _ = stdoutln!("{}", revision.sha);
        }
        cli::Command::Dashboard => {
            let git = Git::new();
            let gerrit = git.gerrit(tls)?;
            let queries = DashboardSection::ALL
                .iter()
                .map(|section| section.query())
                .collect();
            let results = gerrit.get_changes_many(queries)?;
            let initials = gerrit.account_initials()?;
            let _ = stdoutln!("");
            for (section, changes) in DashboardSection::ALL.iter().zip(results) {
                let _ = stdoutln!("{}:", section.label().bold());
                if changes.is_empty() {
                    let _ = stdoutln!("  {}", "No changes found".dimmed());
                } else {
                    let _ = stdoutln!("{}", change_table(&changes, initials)?);
                }
                let _ = stdoutln!("");
            }
        }
        cli::Command::Search { query } => {
            let git = Git::new();
            let gerrit = git.gerrit(tls)?;
            let changes = gerrit.get_changes(Query::new().term("status:open").terms(query))?;
            if changes.is_empty() {
                let _ = stdoutln!("No changes");
            } else {
                let _ = stdoutln!(
                    "\n{}\n",
                    change_table(&changes, gerrit.account_initials()?)?
                );
                let first = &changes[0];
                let checkout = if changes.len() == 1 {
                    prompt::confirm("Checkout?", true)?
                } else {
                    prompt::confirm(&format!("Checkout change {}?", first.number), false)?
                };
                if checkout {
                    let revision = first.latest_revision()?.clone();
                    gerrit.fetch_and_checkout(&revision)?;
                }
            }
        }
        cli::Command::Api { endpoint } => {
            let git = Git::new();
            let gerrit = git.gerrit(tls)?;
            let value = gerrit
                .api(&endpoint)?
                .ok_or_else(|| miette!("Not found: {endpoint}"))?;
            let _ = stdoutln!("{}", serde_json::to_string_pretty(&value).into_diagnostic()?);
        }
        cli::Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Opts::command(), "ferrit", &mut std::io::stdout());
        }
    }

    Ok(())
}
