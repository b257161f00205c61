//! One-time dataset bootstrap from the upstream laureate API, and the
//! projection of its rich, localized records onto the flat stored shape.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{AwardYear, Laureate, Prize, DEFAULT_GENDER};
use crate::store::Collection;

/// Display name used when an upstream record carries no usable name.
pub const UNKNOWN_NAME: &str = "Unknown laureate";

#[async_trait]
pub trait DatasetBootstrapper: Send + Sync {
    /// Raw upstream records.
    async fn fetch(&self) -> Result<Vec<Value>>;
}

/// Fetches `{ "laureates": [...] }` from an HTTP endpoint.
pub struct NobelApiBootstrapper {
    url: String,
    client: reqwest::Client,
}

impl NobelApiBootstrapper {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Bootstrap(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl DatasetBootstrapper for NobelApiBootstrapper {
    async fn fetch(&self) -> Result<Vec<Value>> {
        info!(url = %self.url, "Downloading laureate dataset");

        let body: Value = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match body.get("laureates") {
            Some(Value::Array(records)) => Ok(records.clone()),
            _ => Err(Error::Bootstrap(
                "response has no 'laureates' array".to_string(),
            )),
        }
    }
}

/// Used when bootstrapping is turned off; yields nothing.
pub struct DisabledBootstrapper;

#[async_trait]
impl DatasetBootstrapper for DisabledBootstrapper {
    async fn fetch(&self) -> Result<Vec<Value>> {
        Ok(Vec::new())
    }
}

/// Simplify every usable upstream record. Records without an id receive the
/// next free numeric id.
pub fn simplify_all(raw: &[Value]) -> Result<Collection> {
    let mut collection = Collection::new(raw.iter().filter_map(simplify).collect());

    for index in 0..collection.len() {
        if collection.laureates[index].id.is_empty() {
            collection.laureates[index].id = collection.allocate_id()?;
        }
    }

    debug!(
        upstream = raw.len(),
        kept = collection.len(),
        "Simplified upstream records"
    );
    Ok(collection)
}

/// Project one upstream record. Accepts the person shape (`fullName`,
/// `birth`) and the organization shape (`orgName`, `founded`). Records
/// without any prize are dropped.
pub fn simplify(raw: &Value) -> Option<Laureate> {
    let prizes: Vec<Prize> = raw
        .get("nobelPrizes")
        .or_else(|| raw.get("prizes"))
        .and_then(Value::as_array)
        .map(|prizes| prizes.iter().map(simplify_prize).collect())
        .unwrap_or_default();

    let id = match raw.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    };

    if prizes.is_empty() {
        warn!(id = %id, "Skipping upstream record without prizes");
        return None;
    }

    let full_name = ["fullName", "knownName", "orgName"]
        .iter()
        .find_map(|key| raw.get(*key).and_then(localized))
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());

    // Organizations have a founding event in place of a birth.
    let origin = raw.get("birth").or_else(|| raw.get("founded"));
    let place = origin.and_then(|o| o.get("place"));

    Some(Laureate {
        id,
        full_name,
        gender: raw
            .get("gender")
            .and_then(localized)
            .unwrap_or_else(|| DEFAULT_GENDER.to_string()),
        birth_date: origin
            .and_then(|o| o.get("date"))
            .and_then(localized)
            .unwrap_or_default(),
        birth_city: place
            .and_then(|p| p.get("city"))
            .and_then(localized)
            .unwrap_or_default(),
        birth_country: place
            .and_then(|p| p.get("country"))
            .and_then(localized)
            .unwrap_or_default(),
        prizes,
    })
}

fn simplify_prize(raw: &Value) -> Prize {
    let award_year = match raw.get("awardYear") {
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(AwardYear::Year)
            .unwrap_or_else(|| AwardYear::Raw(n.to_string())),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(AwardYear::Year)
            .unwrap_or_else(|_| AwardYear::Raw(s.clone())),
        _ => AwardYear::default(),
    };

    Prize {
        award_year,
        category: raw.get("category").and_then(localized).unwrap_or_default(),
        motivation: raw.get("motivation").and_then(localized).unwrap_or_default(),
    }
}

/// Flatten a localized field: plain strings pass through, objects yield their
/// `en` entry or else their first string value.
fn localized(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("en")
            .and_then(Value::as_str)
            .or_else(|| map.values().find_map(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simplify_person() {
        let raw = json!({
            "id": "1",
            "knownName": {"en": "Wilhelm Conrad Röntgen"},
            "fullName": {"en": "Wilhelm Conrad Röntgen", "se": "Wilhelm Conrad Röntgen"},
            "gender": "male",
            "birth": {
                "date": "1845-03-27",
                "place": {
                    "city": {"en": "Lennep (Remscheid)"},
                    "country": {"en": "Prussia (Germany)", "no": "Preussen"}
                }
            },
            "nobelPrizes": [{
                "awardYear": "1901",
                "category": {"en": "Physics", "se": "Fysik"},
                "motivation": {"en": "in recognition of the extraordinary services"}
            }]
        });

        let laureate = simplify(&raw).unwrap();
        assert_eq!(laureate.id, "1");
        assert_eq!(laureate.full_name, "Wilhelm Conrad Röntgen");
        assert_eq!(laureate.gender, "male");
        assert_eq!(laureate.birth_date, "1845-03-27");
        assert_eq!(laureate.birth_city, "Lennep (Remscheid)");
        assert_eq!(laureate.birth_country, "Prussia (Germany)");
        assert_eq!(
            laureate.prizes,
            vec![Prize::new(
                1901,
                "Physics",
                "in recognition of the extraordinary services"
            )]
        );
    }

    #[test]
    fn test_simplify_organization() {
        let raw = json!({
            "id": 467,
            "orgName": {"en": "Institute of International Law"},
            "founded": {
                "date": "1873-00-00",
                "place": {"city": {"en": "Ghent"}, "country": {"en": "Belgium"}}
            },
            "nobelPrizes": [{
                "awardYear": "1904",
                "category": {"en": "Peace"},
                "motivation": {"en": "for its striving in public law"}
            }]
        });

        let laureate = simplify(&raw).unwrap();
        assert_eq!(laureate.id, "467");
        assert_eq!(laureate.full_name, "Institute of International Law");
        assert_eq!(laureate.gender, DEFAULT_GENDER);
        assert_eq!(laureate.birth_country, "Belgium");
        assert_eq!(laureate.birth_date, "1873-00-00");
    }

    #[test]
    fn test_simplify_falls_back_to_defaults() {
        let raw = json!({
            "fullName": {"se": "Namn"},
            "nobelPrizes": [{"awardYear": "n/a", "category": {"se": "Fysik"}}]
        });

        let laureate = simplify(&raw).unwrap();
        assert_eq!(laureate.full_name, "Namn");
        assert_eq!(laureate.birth_country, "");
        assert_eq!(laureate.prizes[0].award_year, AwardYear::Raw("n/a".into()));
        assert_eq!(laureate.prizes[0].category, "Fysik");

        let nameless = simplify(&json!({"nobelPrizes": [{"awardYear": 2000}]})).unwrap();
        assert_eq!(nameless.full_name, UNKNOWN_NAME);
    }

    #[test]
    fn test_records_without_prizes_are_dropped() {
        assert!(simplify(&json!({"id": "9", "fullName": {"en": "Nobody"}})).is_none());
        assert!(simplify(&json!({"id": "9", "nobelPrizes": []})).is_none());
    }

    #[test]
    fn test_simplify_all_fills_missing_ids() {
        let raw = vec![
            json!({"id": "4", "nobelPrizes": [{"awardYear": "1950"}]}),
            json!({"nobelPrizes": [{"awardYear": "1951"}]}),
            json!({"id": "8", "nobelPrizes": [{"awardYear": "1952"}]}),
            json!({"id": "5"}),
        ];

        let collection = simplify_all(&raw).unwrap();
        let ids: Vec<_> = collection.laureates.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "9", "8"]);
    }

    #[tokio::test]
    async fn test_disabled_bootstrapper_yields_nothing() {
        assert!(DisabledBootstrapper.fetch().await.unwrap().is_empty());
    }
}
