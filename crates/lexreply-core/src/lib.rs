//! Core types and deterministic rules for lexreply: text normalisation, date
//! and urgency resolution, the fixed clause repository, and the analysis shape.

pub mod analysis;
pub mod clauses;
pub mod dates;
pub mod request;
pub mod text;

pub use analysis::{AgreementReference, Analysis, Parties, UrgencyLevel};
pub use clauses::{Clause, ClauseRepository, ClauseSet};
pub use dates::{compute_urgency, compute_urgency_on, parse_date, parse_naive_date};
pub use request::{AnalyzeRequest, DraftRequest, DraftResponse};
pub use text::normalize;
