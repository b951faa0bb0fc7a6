use serde::{Deserialize, Serialize};

/// Filing status used to select bracket tables, standard deductions and
/// the additional Medicare threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    #[default]
    Single,
    Married,
    HeadOfHousehold,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 3] = [Self::Single, Self::Married, Self::HeadOfHousehold];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Married => "married",
            Self::HeadOfHousehold => "head_of_household",
        }
    }

    /// Parses the snake_case code, plus the short IRS-style aliases
    /// (`S`, `MFJ`, `HOH`) that users tend to type.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "s" => Some(Self::Single),
            "married" | "mfj" => Some(Self::Married),
            "head_of_household" | "hoh" => Some(Self::HeadOfHousehold),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Married => "Married Filing Jointly",
            Self::HeadOfHousehold => "Head of Household",
        }
    }
}

/// One value per [`FilingStatus`].
///
/// Used wherever the reference data varies by filing status: bracket
/// tables, standard deductions and Medicare thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByFilingStatus<T> {
    pub single: T,
    pub married: T,
    pub head_of_household: T,
}

impl<T> ByFilingStatus<T> {
    pub fn get(
        &self,
        status: FilingStatus,
    ) -> &T {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::Married => &self.married,
            FilingStatus::HeadOfHousehold => &self.head_of_household,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilingStatus, &T)> {
        FilingStatus::ALL
            .into_iter()
            .map(move |status| (status, self.get(status)))
    }
}
