//! The fixed set of contract clauses a reply may rely on.
//!
//! Drafts are only ever grounded in these four clauses. The set is compiled
//! in: nothing the sender or caller supplies can add, remove, or alter a
//! clause, and clause search is switched off so no unreviewed text can reach
//! a prompt.

use serde::Serialize;

/// A clause label and its wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Clause {
    pub id: &'static str,
    pub text: &'static str,
}

const STANDARD_CLAUSES: [Clause; 4] = [
    Clause {
        id: "9.1",
        text: "Either Party may terminate this Agreement for cause upon thirty (30) days’ \
               written notice if the other Party commits a material breach.",
    },
    Clause {
        id: "9.2",
        text: "Repeated failure to meet delivery timelines constitutes a material breach.",
    },
    Clause {
        id: "10.1",
        text: "All notices shall be given in writing and shall be effective upon receipt",
    },
    Clause {
        id: "10.2",
        text: "For termination, minimum thirty (30) days’ prior written notice is required.",
    },
];

/// An ordered, owned copy of clauses. Changing it never affects the repository.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ClauseSet {
    clauses: Vec<Clause>,
}

impl ClauseSet {
    pub fn get(&self, id: &str) -> Option<&Clause> {
        self.clauses.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.clauses.iter().map(|c| c.id)
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// One `"<id>: <text>"` line per clause, in order.
    pub fn render_block(&self) -> String {
        self.clauses
            .iter()
            .map(|c| format!("{}: {}", c.id, c.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Read-only lookup over the standard clause set.
///
/// Construct with [`ClauseRepository::standard`]; there is nothing to
/// configure. Safe to share across threads without locking.
#[derive(Debug, Clone)]
pub struct ClauseRepository {
    clauses: ClauseSet,
}

impl Default for ClauseRepository {
    fn default() -> Self {
        Self::standard()
    }
}

impl ClauseRepository {
    /// The repository holding clauses 9.1, 9.2, 10.1, and 10.2.
    pub fn standard() -> Self {
        Self {
            clauses: ClauseSet {
                clauses: STANDARD_CLAUSES.to_vec(),
            },
        }
    }

    pub fn get_clause(&self, id: &str) -> Option<&Clause> {
        self.clauses.get(id)
    }

    /// A copy of every clause, in repository order.
    pub fn all_clauses(&self) -> ClauseSet {
        self.clauses.clone()
    }

    /// Always empty: clause search is disabled.
    pub fn search_clauses(&self, _query: &str) -> Vec<Clause> {
        Vec::new()
    }

    /// Human-readable `Clause <id>: <excerpt>` lines, each excerpt at most
    /// `limit` characters (truncated ones end in `...`).
    pub fn format_excerpts(&self, limit: usize) -> String {
        self.clauses
            .iter()
            .map(|c| format!("Clause {}: {}", c.id, excerpt(c.text, limit)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// Never longer than `limit`; below 3 there is no room for the ellipsis.
fn excerpt(text: &str, limit: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= limit {
        return text.to_string();
    }
    if limit < 3 {
        return text.chars().take(limit).collect();
    }
    let keep: String = text.chars().take(limit.saturating_sub(3)).collect();
    format!("{}...", keep.trim_end())
}
