//! The structured analysis of a legal email.
//!
//! [`Analysis`] is the single shape the extraction model must produce. It is
//! deserialised from whatever JSON the model returned (unknown keys are
//! dropped, optional containers default to empty) and then canonicalised so
//! that every date it carries is `YYYY-MM-DD` or absent.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::dates::parse_date;

/// How soon the sender needs an answer.
///
/// Ordered `Low < Medium < High` so the stricter of two levels is `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "High", alias = "HIGH")]
    High,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two sides of the matter, by name only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parties {
    pub client: Option<String>,
    pub counterparty: Option<String>,
}

/// The agreement the email refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementReference {
    /// Kind of agreement, e.g. "Master Services Agreement".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// ISO 8601 calendar date.
    pub date: Option<String>,
}

/// Validated extraction of a legal email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub intent: String,
    pub primary_topic: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parties: Parties,
    #[serde(default, deserialize_with = "null_as_default")]
    pub agreement_reference: AgreementReference,
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<String>,
    /// ISO 8601 calendar date.
    #[serde(default)]
    pub requested_due_date: Option<String>,
    pub urgency_level: UrgencyLevel,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Analysis {
    /// Validate a parsed JSON value against the analysis shape and canonicalise it.
    ///
    /// Fails if `intent`, `primary_topic`, or `urgency_level` is missing or any
    /// field has the wrong type. The error message names the offending field.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let analysis: Analysis = serde_json::from_value(value)?;
        Ok(analysis.canonicalize())
    }

    /// Trim names and questions, drop empty strings, and rewrite dates as ISO 8601.
    ///
    /// A date that cannot be parsed becomes absent rather than guessed.
    pub fn canonicalize(self) -> Self {
        Self {
            intent: self.intent.trim().to_string(),
            primary_topic: self.primary_topic.trim().to_string(),
            parties: Parties {
                client: non_empty(self.parties.client),
                counterparty: non_empty(self.parties.counterparty),
            },
            agreement_reference: AgreementReference {
                kind: non_empty(self.agreement_reference.kind),
                date: parse_date(self.agreement_reference.date.as_deref()),
            },
            questions: self
                .questions
                .into_iter()
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty())
                .collect(),
            requested_due_date: parse_date(self.requested_due_date.as_deref()),
            urgency_level: self.urgency_level,
        }
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> serde_json::Value {
        json!({
            "intent": "x",
            "primary_topic": "y",
            "parties": {},
            "agreement_reference": {},
            "questions": [],
            "urgency_level": "low"
        })
    }

    #[test]
    fn minimal_object_validates() {
        let a = Analysis::from_value(minimal()).unwrap();
        assert_eq!(a.intent, "x");
        assert_eq!(a.primary_topic, "y");
        assert_eq!(a.parties, Parties::default());
        assert!(a.questions.is_empty());
        assert_eq!(a.requested_due_date, None);
        assert_eq!(a.urgency_level, UrgencyLevel::Low);
    }

    #[test]
    fn missing_urgency_is_rejected_with_field_name() {
        let mut v = minimal();
        v.as_object_mut().unwrap().remove("urgency_level");
        let err = Analysis::from_value(v).unwrap_err();
        assert!(err.to_string().contains("urgency_level"), "{err}");
    }

    #[test]
    fn missing_intent_is_rejected() {
        let mut v = minimal();
        v.as_object_mut().unwrap().remove("intent");
        let err = Analysis::from_value(v).unwrap_err();
        assert!(err.to_string().contains("intent"), "{err}");
    }

    #[test]
    fn wrong_types_are_rejected() {
        let mut v = minimal();
        v["questions"] = json!("not a list");
        assert!(Analysis::from_value(v).is_err());

        let mut v = minimal();
        v["urgency_level"] = json!("critical");
        assert!(Analysis::from_value(v).is_err());

        let mut v = minimal();
        v["intent"] = json!(42);
        assert!(Analysis::from_value(v).is_err());
    }

    #[test]
    fn optional_containers_may_be_absent_or_null() {
        let v = json!({
            "intent": "x",
            "primary_topic": "y",
            "parties": null,
            "questions": null,
            "urgency_level": "medium"
        });
        let a = Analysis::from_value(v).unwrap();
        assert_eq!(a.parties, Parties::default());
        assert_eq!(a.agreement_reference, AgreementReference::default());
        assert!(a.questions.is_empty());
    }

    #[test]
    fn unknown_keys_are_dropped() {
        let mut v = minimal();
        v["confidence"] = json!(0.9);
        v["parties"]["witness"] = json!("Someone");
        let a = Analysis::from_value(v).unwrap();
        let out = serde_json::to_value(&a).unwrap();
        assert!(out.get("confidence").is_none());
        assert!(out["parties"].get("witness").is_none());
    }

    #[test]
    fn dates_are_canonicalised() {
        let mut v = minimal();
        v["agreement_reference"] = json!({"type": "Master Services Agreement", "date": "10 March 2023"});
        v["requested_due_date"] = json!("18 Nov 2025");
        let a = Analysis::from_value(v).unwrap();
        assert_eq!(a.agreement_reference.kind.as_deref(), Some("Master Services Agreement"));
        assert_eq!(a.agreement_reference.date.as_deref(), Some("2023-03-10"));
        assert_eq!(a.requested_due_date.as_deref(), Some("2025-11-18"));
    }

    #[test]
    fn unparseable_dates_become_absent() {
        let mut v = minimal();
        v["requested_due_date"] = json!("end of next sprint");
        let a = Analysis::from_value(v).unwrap();
        assert_eq!(a.requested_due_date, None);
    }

    #[test]
    fn blank_names_and_questions_are_dropped() {
        let mut v = minimal();
        v["parties"] = json!({"client": "  Acme Ltd ", "counterparty": ""});
        v["questions"] = json!(["  Can we terminate?  ", "", "   "]);
        let a = Analysis::from_value(v).unwrap();
        assert_eq!(a.parties.client.as_deref(), Some("Acme Ltd"));
        assert_eq!(a.parties.counterparty, None);
        assert_eq!(a.questions, vec!["Can we terminate?".to_string()]);
    }

    #[test]
    fn capitalised_urgency_accepted() {
        let mut v = minimal();
        v["urgency_level"] = json!("High");
        assert_eq!(Analysis::from_value(v).unwrap().urgency_level, UrgencyLevel::High);
    }

    #[test]
    fn serialises_type_key_and_lowercase_urgency() {
        let a = Analysis::from_value(minimal()).unwrap();
        let out = serde_json::to_value(&a).unwrap();
        assert!(out["agreement_reference"].get("type").is_some());
        assert_eq!(out["urgency_level"], "low");
    }

    #[test]
    fn urgency_ordering() {
        assert!(UrgencyLevel::High > UrgencyLevel::Medium);
        assert!(UrgencyLevel::Medium > UrgencyLevel::Low);
        assert_eq!(UrgencyLevel::Medium.to_string(), "medium");
    }
}
