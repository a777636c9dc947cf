use std::collections::BTreeMap;

use comfy_table::presets::NOTHING;
use comfy_table::Attribute;
use comfy_table::Cell;
use comfy_table::CellAlignment;
use comfy_table::Color;
use comfy_table::Table;
use miette::miette;
use miette::IntoDiagnostic;
use time::macros::format_description;
use time::OffsetDateTime;
use time::PrimitiveDateTime;

use crate::account::Account;
use crate::account::AccountId;
use crate::change_number::ChangeNumber;
use crate::commit_hash::CommitHash;
use crate::patchset::Patchset;
use crate::revision::Revision;

time::serde::format_description!(
    gerrit_timestamp,
    PrimitiveDateTime,
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"
);

/// Subjects longer than this are truncated in listings.
const SUBJECT_WIDTH: usize = 54;

/// A change, as returned by the REST API with `o=ALL_REVISIONS`.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct Change {
    #[serde(rename = "_number")]
    pub number: ChangeNumber,
    pub subject: String,
    pub owner: Account,
    #[serde(default)]
    pub work_in_progress: bool,
    #[serde(default)]
    pub is_private: bool,
    /// Absent when the server has not computed mergeability.
    #[serde(default)]
    pub mergeable: Option<bool>,
    /// Last update time, in Gerrit's `2024-04-01 12:30:00.000000000` format.
    #[serde(default, with = "gerrit_timestamp::option")]
    pub updated: Option<PrimitiveDateTime>,
    /// Patch sets, keyed by commit hash.
    #[serde(default)]
    pub revisions: BTreeMap<CommitHash, Revision>,
}

impl Change {
    /// Copy each revision's map key into the revision itself.
    ///
    /// The REST schema associates a patch set with its commit hash by map key
    /// only, which makes the hash awkward to get at once a revision has been
    /// picked out. Must be called once after deserialization.
    pub fn attach_revision_keys(&mut self) {
        for (sha, revision) in &mut self.revisions {
            revision.sha = sha.clone();
        }
    }

    /// Patch sets in ascending patch set number order.
    ///
    /// The revision map is keyed by commit hash, so its iteration order says
    /// nothing about patch set order.
    pub fn ordered_revisions(&self) -> Vec<&Revision> {
        let mut revisions = self.revisions.values().collect::<Vec<_>>();
        revisions.sort_by_key(|revision| revision.number);
        revisions
    }

    /// The newest patch set.
    pub fn latest_revision(&self) -> miette::Result<&Revision> {
        self.ordered_revisions()
            .last()
            .copied()
            .ok_or_else(|| miette!("Change {} has no patch sets", self.number))
    }

    /// Select a patch set by 1-based index; patch set 1 is the oldest.
    pub fn revision(&self, patchset: Patchset) -> miette::Result<&Revision> {
        let revisions = self.ordered_revisions();
        usize::try_from(u64::from(patchset))
            .ok()
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| revisions.get(index).copied())
            .ok_or_else(|| {
                miette!(
                    "Change {} has no patch set {} (it has {})",
                    self.number,
                    patchset,
                    revisions.len()
                )
            })
    }

    fn private_cell(&self) -> Cell {
        if self.is_private {
            Cell::new("P").fg(Color::Yellow)
        } else {
            Cell::new("")
        }
    }

    fn wip_cell(&self) -> Cell {
        if self.work_in_progress {
            Cell::new("W").add_attribute(Attribute::Dim)
        } else {
            Cell::new("")
        }
    }

    /// WIP and private changes are never submittable, so the merge marker
    /// would only be noise for them.
    fn merge_cell(&self) -> Cell {
        if self.work_in_progress || self.is_private {
            Cell::new("-")
        } else {
            match self.mergeable {
                Some(true) => Cell::new(""),
                _ => Cell::new("M").fg(Color::Red),
            }
        }
    }

    fn owner_cell(&self, initials: &BTreeMap<AccountId, String>) -> Cell {
        Cell::new(
            initials
                .get(&self.owner.account_id)
                .map(String::as_str)
                .unwrap_or("?"),
        )
        .fg(Color::Cyan)
    }

    fn short_subject(&self) -> String {
        if self.subject.chars().count() > SUBJECT_WIDTH {
            let mut short = self
                .subject
                .chars()
                .take(SUBJECT_WIDTH - 4)
                .collect::<String>();
            short.push_str(" ...");
            short
        } else {
            self.subject.clone()
        }
    }

    fn updated_cell(&self) -> miette::Result<Cell> {
        let updated = match self.updated {
            Some(updated) => updated,
            None => return Ok(Cell::new("")),
        };
        let now = OffsetDateTime::now_utc();
        let formatted = {
            if now.date() == updated.date() {
                updated.format(format_description!(
                    "[hour padding:none repr:24]:[minute]"
                ))
            } else if now.date().year() == updated.date().year() {
                updated.format(format_description!("[month]-[day]"))
            } else {
                updated.format(format_description!("[year]-[month]-[day]"))
            }
        }
        .into_diagnostic()?;
        Ok(Cell::new(formatted).add_attribute(Attribute::Dim))
    }
}

/// Render changes as a dashboard/search listing.
pub fn change_table(
    changes: &[Change],
    initials: &BTreeMap<AccountId, String>,
) -> miette::Result<Table> {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    for change in changes {
        table.add_row(vec![
            Cell::new(change.number).set_alignment(CellAlignment::Right),
            Cell::new(change.revisions.len()).set_alignment(CellAlignment::Right),
            change.private_cell(),
            change.wip_cell(),
            change.merge_cell(),
            change.owner_cell(initials),
            Cell::new(change.short_subject()),
            change.updated_cell()?,
        ]);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn change() -> Change {
        // Revision map keys deliberately sort differently from the patch set
        // numbers they hold.
        let mut change = serde_json::from_str::<Change>(indoc! {r#"
            {
                "_number": 42,
                "subject": "Add a flux capacitor",
                "owner": {"_account_id": 1000096, "name": "Jane Anne Doe"},
                "work_in_progress": true,
                "updated": "2013-02-21 11:16:36.775000000",
                "revisions": {
                    "aaaa": {
                        "_number": 3,
                        "fetch": {
                            "http": {
                                "url": "https://gerrit.example.com/a/tools/frobnicator",
                                "ref": "refs/changes/42/42/3"
                            }
                        }
                    },
                    "cccc": {"_number": 1, "fetch": {}},
                    "bbbb": {"_number": 2, "fetch": {}}
                }
            }
        "#})
        .unwrap();
        change.attach_revision_keys();
        change
    }

    #[test]
    fn test_ordered_revisions() {
        let change = change();
        assert_eq!(
            change
                .ordered_revisions()
                .iter()
                .map(|revision| u64::from(revision.number))
                .collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_latest_revision() {
        let change = change();
        let latest = change.latest_revision().unwrap();
        assert_eq!(latest.sha.as_str(), "aaaa");
        assert_eq!(latest.number, Patchset::new(3));
    }

    #[test]
    fn test_revision_by_index() {
        let change = change();
        assert_eq!(
            change.revision(Patchset::new(2)).unwrap().sha.as_str(),
            "bbbb"
        );
        assert_eq!(
            change.revision(Patchset::new(1)).unwrap().sha.as_str(),
            "cccc"
        );
    }

    #[test]
    fn test_revision_out_of_range() {
        let change = change();
        assert!(change.revision(Patchset::new(4)).is_err());
        assert!(change.revision(Patchset::new(0)).is_err());
    }

    #[test]
    fn test_attach_revision_keys() {
        let change = change();
        for (sha, revision) in &change.revisions {
            assert_eq!(sha, &revision.sha);
        }
    }

    #[test]
    fn test_no_patch_sets() {
        let mut change = change();
        change.revisions.clear();
        assert!(change.latest_revision().is_err());
    }

    #[test]
    fn test_updated_parses() {
        let change = change();
        let updated = change.updated.unwrap();
        assert_eq!(updated.date().year(), 2013);
        assert_eq!(u8::from(updated.date().month()), 2);
    }

    #[test]
    fn test_short_subject() {
        let mut change = change();
        assert_eq!(change.short_subject(), "Add a flux capacitor");

        change.subject = "x".repeat(54);
        assert_eq!(change.short_subject(), "x".repeat(54));

        change.subject = "x".repeat(55);
        assert_eq!(change.short_subject(), format!("{} ...", "x".repeat(50)));
    }

    #[test]
    fn test_http_fetch() {
        let change = change();
        let latest = change.latest_revision().unwrap();
        assert_eq!(
            latest.http_fetch().unwrap().ref_name,
            "refs/changes/42/42/3"
        );
        assert!(change
            .revision(Patchset::new(1))
            .unwrap()
            .http_fetch()
            .is_err());
    }
}
