use std::collections::BTreeSet;

use itertools::Itertools;

/// A set of Gerrit search terms.
///
/// Duplicate terms are redundant and term order does not affect the result
/// set, so terms live in a set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    terms: BTreeSet<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.terms.insert(term.into());
        self
    }

    pub fn terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terms.extend(terms.into_iter().map(Into::into));
        self
    }

    /// Scope the query to a repository.
    pub fn repo(self, project: &str) -> Self {
        self.term(format!("repo:{project}"))
    }

    /// Join terms into a Gerrit search query string.
    pub fn join(&self) -> String {
        self.terms.iter().join("+")
    }

    #[cfg(test)]
    fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }
}

/// The four sections of the dashboard listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardSection {
    /// Own private changes.
    Private,
    /// Own work-in-progress changes.
    Wip,
    /// Own changes ready for review.
    Open,
    /// Changes by others that want your attention.
    Others,
}

impl DashboardSection {
    pub const ALL: [Self; 4] = [Self::Private, Self::Wip, Self::Open, Self::Others];

    pub fn label(&self) -> &'static str {
        match self {
            DashboardSection::Private => "Private",
            DashboardSection::Wip => "WIP",
            DashboardSection::Open => "Open",
            DashboardSection::Others => "Others",
        }
    }

    /// Terms common to every section.
    fn base() -> Query {
        Query::new().term("status:open").term("-is:ignored")
    }

    pub fn query(&self) -> Query {
        let base = Self::base();
        match self {
            DashboardSection::Private => base.term("owner:self").term("is:private"),
            DashboardSection::Wip => base
                .term("owner:self")
                .term("is:wip")
                .term("-is:private"),
            DashboardSection::Open => base
                .term("owner:self")
                .term("-is:wip")
                .term("-is:private"),
            DashboardSection::Others => base
                .term("-owner:self")
                .term("(reviewer:self+OR+assignee:self+OR+cc:self)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_private_section_terms() {
        let query = DashboardSection::Private.query().repo("foo/bar");
        for term in [
            "status:open",
            "-is:ignored",
            "owner:self",
            "is:private",
            "repo:foo/bar",
        ] {
            assert!(query.contains(term), "missing term: {term}");
        }
    }

    #[test]
    fn test_duplicate_terms_collapse() {
        let query = Query::new()
            .term("status:open")
            .term("status:open")
            .terms(["status:open", "repo:foo"])
            .repo("foo");
        assert_eq!(query.join(), "repo:foo+status:open");
    }

    #[test]
    fn test_join_is_deterministic() {
        let forward = Query::new().term("a").term("b").term("c");
        let backward = Query::new().term("c").term("b").term("a");
        assert_eq!(forward.join(), backward.join());
    }

    #[test]
    fn test_wip_section_excludes_private() {
        let query = DashboardSection::Wip.query();
        assert!(query.contains("is:wip"));
        assert!(query.contains("-is:private"));
    }

    #[test]
    fn test_others_section() {
        let query = DashboardSection::Others.query();
        assert!(query.contains("-owner:self"));
        assert!(query.contains("(reviewer:self+OR+assignee:self+OR+cc:self)"));
    }
}
