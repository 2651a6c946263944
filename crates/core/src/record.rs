//! Submission record construction.
//!
//! A [`SubmissionRecord`] is the flat set of string fields posted to the
//! remote endpoint: the decoded scan text plus the auxiliary form fields.
//! Blank auxiliary fields are replaced by the [`NOT_APPLICABLE`] sentinel.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::decoder::DecodedText;

/// Sentinel sent for auxiliary fields left blank by the user.
pub const NOT_APPLICABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// Auxiliary fields
// ---------------------------------------------------------------------------

/// Auxiliary form fields recognised by the record builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AuxField {
    InOut,
    Agent,
    Manager,
    OtherEquip,
}

impl AuxField {
    pub const ALL: [AuxField; 4] = [
        AuxField::InOut,
        AuxField::Agent,
        AuxField::Manager,
        AuxField::OtherEquip,
    ];

    /// Form keys accepted for this field, in lookup order.
    fn form_keys(self) -> &'static [&'static str] {
        match self {
            AuxField::InOut => &["inOut"],
            AuxField::Agent => &["agent"],
            AuxField::Manager => &["manager"],
            AuxField::OtherEquip => &["other", "otherEquip"],
        }
    }

    /// Resolve a form key to its field, if recognised.
    pub fn from_form_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.form_keys().contains(&key))
    }
}

// ---------------------------------------------------------------------------
// SubmissionRecord
// ---------------------------------------------------------------------------

/// Flat record serialized as the outbound JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub decoded_text: String,
    pub in_out: String,
    pub agent: String,
    pub manager: String,
    pub other_equip: String,
}

impl SubmissionRecord {
    /// Build a record from typed form fields.
    ///
    /// Missing, empty and whitespace-only values become [`NOT_APPLICABLE`];
    /// everything else is trimmed. The decoded text is passed through as-is.
    pub fn from_fields(decoded: &DecodedText, fields: &BTreeMap<AuxField, String>) -> Self {
        Self::assemble(decoded, |field| fields.get(&field).map(String::as_str))
    }

    fn assemble<'a>(decoded: &DecodedText, lookup: impl Fn(AuxField) -> Option<&'a str>) -> Self {
        let resolve = |field: AuxField| -> String {
            lookup(field)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .unwrap_or(NOT_APPLICABLE)
                .to_string()
        };

        Self {
            decoded_text: decoded.as_str().to_string(),
            in_out: resolve(AuxField::InOut),
            agent: resolve(AuxField::Agent),
            manager: resolve(AuxField::Manager),
            other_equip: resolve(AuxField::OtherEquip),
        }
    }
}

/// Build a record from decoded text and free-form auxiliary values keyed by
/// form key. Unrecognised keys are ignored.
pub fn build_record(decoded: &DecodedText, auxiliary: &HashMap<String, String>) -> SubmissionRecord {
    SubmissionRecord::assemble(decoded, |field| {
        let candidates: Vec<&str> = field
            .form_keys()
            .iter()
            .filter_map(|key| auxiliary.get(*key).map(String::as_str))
            .collect();
        // Prefer a non-blank value when several aliases are present.
        candidates
            .iter()
            .copied()
            .find(|v| !v.trim().is_empty())
            .or(candidates.first().copied())
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{encode, inspect};

    fn decoded(text: &str) -> DecodedText {
        inspect(&encode(text).unwrap()).into_result().unwrap()
    }

    fn aux(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn blank_fields_become_sentinel_and_values_are_trimmed() {
        let record = build_record(
            &decoded("Hello"),
            &aux(&[("inOut", ""), ("agent", " Bob "), ("manager", ""), ("other", "")]),
        );

        assert_eq!(
            record,
            SubmissionRecord {
                decoded_text: "Hello".into(),
                in_out: "N/A".into(),
                agent: "Bob".into(),
                manager: "N/A".into(),
                other_equip: "N/A".into(),
            }
        );
    }

    #[test]
    fn missing_and_whitespace_only_fields_become_sentinel() {
        let record = build_record(&decoded("X"), &aux(&[("manager", " \t ")]));
        for value in [
            &record.in_out,
            &record.agent,
            &record.manager,
            &record.other_equip,
        ] {
            assert_eq!(value, NOT_APPLICABLE);
        }
    }

    #[test]
    fn decoded_text_is_passed_through_unmodified() {
        let record = build_record(&decoded("  padded  "), &HashMap::new());
        assert_eq!(record.decoded_text, "  padded  ");
    }

    #[test]
    fn other_equip_accepts_both_form_keys() {
        let short = build_record(&decoded("A"), &aux(&[("other", "ladder")]));
        let long = build_record(&decoded("A"), &aux(&[("otherEquip", "ladder")]));
        let both = build_record(&decoded("A"), &aux(&[("other", " "), ("otherEquip", "drill")]));
        assert_eq!(short.other_equip, "ladder");
        assert_eq!(long.other_equip, "ladder");
        assert_eq!(both.other_equip, "drill");
    }

    #[test]
    fn unrecognised_keys_are_ignored() {
        let record = build_record(&decoded("A"), &aux(&[("email", "a@b.c")]));
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("email").is_none());
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn serializes_to_flat_camel_case_object() {
        let record = build_record(&decoded("Hi"), &aux(&[("inOut", "in")]));
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj.len(), 5);
        assert_eq!(json["decodedText"], "Hi");
        assert_eq!(json["inOut"], "in");
        assert_eq!(json["otherEquip"], "N/A");
        assert!(obj.values().all(|v| v.is_string()));
    }

    #[test]
    fn from_fields_matches_build_record() {
        let mut typed = BTreeMap::new();
        typed.insert(AuxField::Agent, " Bob ".to_string());
        let text = decoded("Hello");
        assert_eq!(
            SubmissionRecord::from_fields(&text, &typed),
            build_record(&text, &aux(&[("agent", " Bob ")]))
        );
    }

    #[test]
    fn form_key_lookup() {
        assert_eq!(AuxField::from_form_key("inOut"), Some(AuxField::InOut));
        assert_eq!(AuxField::from_form_key("other"), Some(AuxField::OtherEquip));
        assert_eq!(AuxField::from_form_key("nope"), None);
    }
}
