use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a filing status string matches none of the known codes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown filing status '{0}'")]
pub struct UnknownFilingStatus(pub String);

/// Serializes as the camelCase form key; deserializes through
/// [`FilingStatus::parse`], so every accepted spelling works in request files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "String")]
pub enum FilingStatus {
    Single,
    MarriedJoint,
    HeadOfHousehold,
    MarriedSeparate,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 4] = [
        Self::Single,
        Self::MarriedJoint,
        Self::HeadOfHousehold,
        Self::MarriedSeparate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::MarriedJoint => "MFJ",
            Self::HeadOfHousehold => "HOH",
            Self::MarriedSeparate => "MFS",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::MarriedJoint => "Married Filing Jointly",
            Self::HeadOfHousehold => "Head of Household",
            Self::MarriedSeparate => "Married Filing Separately",
        }
    }

    /// Accepts the short codes (`S`, `MFJ`, `HOH`, `MFS`) as well as the
    /// long form keys (`single`, `married`, `marriedJoint`,
    /// `headOfHousehold`, `marriedSeparate`). Matching ignores case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "single" => Some(Self::Single),
            "mfj" | "married" | "marriedjoint" => Some(Self::MarriedJoint),
            "hoh" | "headofhousehold" => Some(Self::HeadOfHousehold),
            "mfs" | "marriedseparate" => Some(Self::MarriedSeparate),
            _ => None,
        }
    }
}

impl FromStr for FilingStatus {
    type Err = UnknownFilingStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownFilingStatus(s.to_string()))
    }
}

impl TryFrom<String> for FilingStatus {
    type Error = UnknownFilingStatus;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per filing status.
///
/// Used for the per-status tables of a tax year so that a lookup can never
/// miss: every status always has an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerFilingStatus<T> {
    pub single: T,
    pub married_joint: T,
    pub head_of_household: T,
    pub married_separate: T,
}

impl<T> PerFilingStatus<T> {
    pub fn get(
        &self,
        status: FilingStatus,
    ) -> &T {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedJoint => &self.married_joint,
            FilingStatus::HeadOfHousehold => &self.head_of_household,
            FilingStatus::MarriedSeparate => &self.married_separate,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilingStatus, &T)> {
        FilingStatus::ALL
            .into_iter()
            .map(move |status| (status, self.get(status)))
    }

    /// Builds the map by asking `f` for each status in [`FilingStatus::ALL`]
    /// order, stopping at the first error.
    pub fn try_from_fn<E>(mut f: impl FnMut(FilingStatus) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            single: f(FilingStatus::Single)?,
            married_joint: f(FilingStatus::MarriedJoint)?,
            head_of_household: f(FilingStatus::HeadOfHousehold)?,
            married_separate: f(FilingStatus::MarriedSeparate)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_accepts_short_codes() {
        assert_eq!(FilingStatus::parse("S"), Some(FilingStatus::Single));
        assert_eq!(FilingStatus::parse("MFJ"), Some(FilingStatus::MarriedJoint));
        assert_eq!(FilingStatus::parse("HOH"), Some(FilingStatus::HeadOfHousehold));
        assert_eq!(FilingStatus::parse("MFS"), Some(FilingStatus::MarriedSeparate));
    }

    #[test]
    fn parse_accepts_form_keys_ignoring_case() {
        assert_eq!(FilingStatus::parse("married"), Some(FilingStatus::MarriedJoint));
        assert_eq!(FilingStatus::parse("headOfHousehold"), Some(FilingStatus::HeadOfHousehold));
        assert_eq!(FilingStatus::parse("MARRIEDSEPARATE"), Some(FilingStatus::MarriedSeparate));
        assert_eq!(FilingStatus::parse(" single "), Some(FilingStatus::Single));
    }

    #[test]
    fn from_str_reports_unknown_status() {
        let result = "QSS".parse::<FilingStatus>();

        assert_eq!(result, Err(UnknownFilingStatus("QSS".to_string())));
    }

    #[test]
    fn try_from_string_uses_parse() {
        assert_eq!(
            FilingStatus::try_from("Single".to_string()),
            Ok(FilingStatus::Single)
        );
        assert_eq!(
            FilingStatus::try_from("mfj".to_string()),
            Ok(FilingStatus::MarriedJoint)
        );
        assert_eq!(
            FilingStatus::try_from("joint".to_string()),
            Err(UnknownFilingStatus("joint".to_string()))
        );
    }

    #[test]
    fn as_str_round_trips_through_parse() {
        for status in FilingStatus::ALL {
            assert_eq!(FilingStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn per_filing_status_get_selects_matching_field() {
        let map = PerFilingStatus {
            single: 1,
            married_joint: 2,
            head_of_household: 3,
            married_separate: 4,
        };

        assert_eq!(*map.get(FilingStatus::HeadOfHousehold), 3);
        assert_eq!(map.iter().map(|(_, v)| *v).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn per_filing_status_try_from_fn_stops_at_first_error() {
        let result: Result<PerFilingStatus<i32>, FilingStatus> =
            PerFilingStatus::try_from_fn(|status| match status {
                FilingStatus::HeadOfHousehold => Err(status),
                _ => Ok(0),
            });

        assert_eq!(result, Err(FilingStatus::HeadOfHousehold));
    }
}
