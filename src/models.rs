//! Laureate and prize records as held in memory and on disk.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Gender recorded when none is supplied.
pub const DEFAULT_GENDER: &str = "unknown";

/// A person or organization holding one or more prizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Laureate {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default = "default_gender")]
    pub gender: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub birth_city: String,
    #[serde(default)]
    pub birth_country: String,
    #[serde(default, alias = "nobelPrizes")]
    pub prizes: Vec<Prize>,
}

/// A single award, always embedded in exactly one laureate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Prize {
    #[serde(default)]
    pub award_year: AwardYear,
    #[serde(default)]
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "motivation must not be empty"))]
    pub motivation: String,
}

/// Award year as stored. Loaded files are kept as-is, so a year may be a
/// string that never resolves to an integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AwardYear {
    Year(i32),
    Raw(String),
}

impl AwardYear {
    /// Integer value of the year, if it has one.
    pub fn resolve(&self) -> Option<i32> {
        match self {
            AwardYear::Year(year) => Some(*year),
            AwardYear::Raw(raw) => raw.trim().parse().ok(),
        }
    }
}

impl Default for AwardYear {
    fn default() -> Self {
        AwardYear::Raw(String::new())
    }
}

impl From<i32> for AwardYear {
    fn from(year: i32) -> Self {
        AwardYear::Year(year)
    }
}

impl Prize {
    pub fn new(award_year: i32, category: impl Into<String>, motivation: impl Into<String>) -> Self {
        Self {
            award_year: AwardYear::Year(award_year),
            category: category.into(),
            motivation: motivation.into(),
        }
    }

    /// Case-insensitive category comparison.
    pub fn is_category(&self, category: &str) -> bool {
        self.category.to_lowercase() == category.to_lowercase()
    }
}

impl Laureate {
    /// Numeric form of the id, used for id allocation.
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.trim().parse().ok()
    }

    /// Birth (or founding) country, `"Unknown"` when absent.
    pub fn country_or_unknown(&self) -> &str {
        if self.birth_country.trim().is_empty() {
            "Unknown"
        } else {
            &self.birth_country
        }
    }
}

/// Fields of a laureate about to be created; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewLaureate {
    #[validate(length(min = 1, message = "fullName must not be empty"))]
    pub full_name: String,
    pub gender: String,
    pub birth_date: String,
    pub birth_city: String,
    pub birth_country: String,
    #[validate(length(min = 1, message = "prizes must not be empty"))]
    pub prizes: Vec<Prize>,
}

impl NewLaureate {
    pub fn into_laureate(self, id: String) -> Laureate {
        Laureate {
            id,
            full_name: self.full_name,
            gender: self.gender,
            birth_date: self.birth_date,
            birth_city: self.birth_city,
            birth_country: self.birth_country,
            prizes: self.prizes,
        }
    }
}

/// Replace-if-present update. `prizes` replaces the whole list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaureatePatch {
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub birth_city: Option<String>,
    pub birth_country: Option<String>,
    pub prizes: Option<Vec<Prize>>,
}

impl LaureatePatch {
    pub fn apply_to(self, laureate: &mut Laureate) {
        if let Some(full_name) = self.full_name {
            laureate.full_name = full_name;
        }
        if let Some(gender) = self.gender {
            laureate.gender = gender;
        }
        if let Some(birth_date) = self.birth_date {
            laureate.birth_date = birth_date;
        }
        if let Some(birth_city) = self.birth_city {
            laureate.birth_city = birth_city;
        }
        if let Some(birth_country) = self.birth_country {
            laureate.birth_country = birth_country;
        }
        if let Some(prizes) = self.prizes {
            laureate.prizes = prizes;
        }
    }
}

fn default_gender() -> String {
    DEFAULT_GENDER.to_string()
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}
