//! Translation of [`LogFilter`] into a store query
//!
//! Fields are considered in a fixed precedence order:
//! `source, user_id, device, os, is_tablet, is_mobile, is_pc, is_bot, anonymous, created`.
//! The first *non-empty* one (non-blank string, `true`, any timestamp) is the
//! precedence winner.

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::types::LogFilter;

/// How supplied fields become constraints
///
/// Selected with `LOGS_FILTER_MODE` (`conjunctive` or `first-match`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    /// Every supplied field is an equality constraint; the precedence winner is
    /// written again on top, which leaves the conjunction unchanged
    #[default]
    Conjunctive,
    /// Only the precedence winner is applied
    FirstMatch,
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "conjunctive" => Ok(FilterMode::Conjunctive),
            "first-match" | "first_match" => Ok(FilterMode::FirstMatch),
            _ => Err(format!("expected 'conjunctive' or 'first-match', got '{}'", s)),
        }
    }
}

impl LogFilter {
    /// Supplied fields in precedence order
    fn constraints(&self) -> Vec<(&'static str, Bson, bool)> {
        let mut out = Vec::new();

        let strings = [
            ("source", &self.source),
            ("user_id", &self.user_id),
            ("device", &self.device),
            ("os", &self.os),
        ];
        for (key, value) in strings {
            if let Some(v) = value {
                out.push((key, Bson::String(v.clone()), !v.trim().is_empty()));
            }
        }

        let flags = [
            ("is_tablet", self.is_tablet),
            ("is_mobile", self.is_mobile),
            ("is_pc", self.is_pc),
            ("is_bot", self.is_bot),
            ("anonymous", self.anonymous),
        ];
        for (key, value) in flags {
            if let Some(v) = value {
                out.push((key, Bson::Boolean(v), v));
            }
        }

        if let Some(created) = self.created {
            out.push(("created", Bson::DateTime(bson::DateTime::from_chrono(created)), true));
        }

        out
    }

    /// First non-empty field in precedence order
    pub fn precedence_winner(&self) -> Option<(&'static str, Bson)> {
        self.constraints()
            .into_iter()
            .find(|(_, _, non_empty)| *non_empty)
            .map(|(key, value, _)| (key, value))
    }

    /// Build the equality query handed to the store
    pub fn to_document(&self, mode: FilterMode) -> Document {
        let mut query = Document::new();

        if mode == FilterMode::Conjunctive {
            for (key, value, _) in self.constraints() {
                query.insert(key, value);
            }
        }

        if let Some((key, value)) = self.precedence_winner() {
            query.insert(key, value);
        }

        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = LogFilter::default();
        assert_eq!(filter.precedence_winner(), None);
        assert_eq!(filter.to_document(FilterMode::Conjunctive), Document::new());
        assert_eq!(filter.to_document(FilterMode::FirstMatch), Document::new());
    }

    #[test]
    fn test_conjunctive_keeps_every_supplied_field() {
        let filter = LogFilter {
            source: Some("billing".into()),
            os: Some("iOS".into()),
            is_mobile: Some(true),
            anonymous: Some(false),
            ..Default::default()
        };

        assert_eq!(
            filter.to_document(FilterMode::Conjunctive),
            doc! { "source": "billing", "os": "iOS", "is_mobile": true, "anonymous": false }
        );
    }

    #[test]
    fn test_first_match_applies_only_the_winner() {
        let filter = LogFilter {
            user_id: Some("u-1".into()),
            device: Some("iPhone".into()),
            is_bot: Some(true),
            ..Default::default()
        };

        assert_eq!(filter.to_document(FilterMode::FirstMatch), doc! { "user_id": "u-1" });
    }

    #[test]
    fn test_false_flags_never_win_precedence() {
        let filter = LogFilter {
            is_tablet: Some(false),
            is_pc: Some(true),
            ..Default::default()
        };

        assert_eq!(
            filter.precedence_winner(),
            Some(("is_pc", Bson::Boolean(true)))
        );
        assert_eq!(filter.to_document(FilterMode::FirstMatch), doc! { "is_pc": true });
        assert_eq!(
            filter.to_document(FilterMode::Conjunctive),
            doc! { "is_tablet": false, "is_pc": true }
        );
    }

    #[test]
    fn test_only_false_flags_have_no_winner() {
        let filter = LogFilter {
            anonymous: Some(false),
            ..Default::default()
        };

        assert_eq!(filter.precedence_winner(), None);
        assert_eq!(filter.to_document(FilterMode::FirstMatch), Document::new());
        assert_eq!(filter.to_document(FilterMode::Conjunctive), doc! { "anonymous": false });
    }

    #[test]
    fn test_blank_string_is_a_constraint_but_never_wins() {
        let filter = LogFilter {
            user_id: Some(String::new()),
            is_bot: Some(true),
            ..Default::default()
        };

        assert_eq!(filter.precedence_winner(), Some(("is_bot", Bson::Boolean(true))));
        assert_eq!(
            filter.to_document(FilterMode::Conjunctive),
            doc! { "user_id": "", "is_bot": true }
        );
    }

    #[test]
    fn test_filter_mode_from_str() {
        assert_eq!("conjunctive".parse::<FilterMode>(), Ok(FilterMode::Conjunctive));
        assert_eq!("First-Match".parse::<FilterMode>(), Ok(FilterMode::FirstMatch));
        assert!("any".parse::<FilterMode>().is_err());
    }

    #[test]
    fn test_created_is_a_bson_datetime() {
        let at = Utc.with_ymd_and_hms(2024, 12, 9, 13, 45, 0).unwrap();
        let filter = LogFilter {
            created: Some(at),
            ..Default::default()
        };

        assert_eq!(
            filter.to_document(FilterMode::Conjunctive),
            doc! { "created": bson::DateTime::from_chrono(at) }
        );
    }
}
