use serde_json::{Map, Value};
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::{LaureatePatch, NewLaureate, Prize};

/// Validation of untyped mutation bodies into typed laureate data.
pub struct LaureateValidator;

impl LaureateValidator {
    /// Parse a raw request body; it must be a JSON object.
    pub fn parse_body(body: &[u8]) -> Result<Value> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| Error::Validation(format!("Malformed JSON body: {}", e)))?;

        if !value.is_object() {
            return Err(Error::Validation(
                "Request body must be a JSON object".to_string(),
            ));
        }
        Ok(value)
    }

    /// Validates a create body. Every field must be present.
    pub fn validate_create(body: &Value) -> Result<NewLaureate> {
        let fields = Self::as_object(body)?;

        let full_name = Self::required_string(fields, "fullName")?;
        if full_name.trim().is_empty() {
            return Err(Error::Validation(
                "'fullName' cannot be empty".to_string(),
            ));
        }

        let new = NewLaureate {
            full_name,
            gender: Self::required_string(fields, "gender")?,
            birth_date: Self::required_string(fields, "birthDate")?,
            birth_city: Self::required_string(fields, "birthCity")?,
            birth_country: Self::required_string(fields, "birthCountry")?,
            prizes: Self::validate_prizes(Self::prizes_field(fields).ok_or_else(|| {
                Error::Validation("Missing 'prizes' field".to_string())
            })?)?,
        };

        new.validate()
            .map_err(|e| Error::Validation(e.to_string()))?;
        Ok(new)
    }

    /// Validates an update body. Absent or null fields are left alone; the
    /// whole body is rejected if any present field is invalid.
    pub fn validate_update(body: &Value) -> Result<LaureatePatch> {
        let fields = Self::as_object(body)?;

        let full_name = Self::optional_string(fields, "fullName")?;
        if full_name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(Error::Validation(
                "'fullName' cannot be empty".to_string(),
            ));
        }

        let prizes = match Self::prizes_field(fields) {
            Some(value) => Some(Self::validate_prizes(value)?),
            None => None,
        };

        Ok(LaureatePatch {
            full_name,
            gender: Self::optional_string(fields, "gender")?,
            birth_date: Self::optional_string(fields, "birthDate")?,
            birth_city: Self::optional_string(fields, "birthCity")?,
            birth_country: Self::optional_string(fields, "birthCountry")?,
            prizes,
        })
    }

    /// Validates a non-empty prize list.
    pub fn validate_prizes(value: &Value) -> Result<Vec<Prize>> {
        let items = value.as_array().ok_or_else(|| {
            Error::Validation("'prizes' must be an array".to_string())
        })?;

        if items.is_empty() {
            return Err(Error::Validation(
                "'prizes' must contain at least one prize".to_string(),
            ));
        }

        items
            .iter()
            .enumerate()
            .map(|(index, item)| Self::validate_prize(index, item))
            .collect()
    }

    fn validate_prize(index: usize, item: &Value) -> Result<Prize> {
        let fields = item.as_object().ok_or_else(|| {
            Error::Validation(format!("prizes[{}] must be an object", index))
        })?;

        let award_year = fields
            .get("awardYear")
            .and_then(Self::parse_year)
            .ok_or_else(|| Error::Validation(format!(
                "Missing or invalid 'awardYear' in prizes[{}]",
                index
            )))?;

        let text = |key: &str| -> Result<String> {
            fields
                .get(key)
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .ok_or_else(|| Error::Validation(format!(
                    "Missing or invalid '{}' in prizes[{}]",
                    key, index
                )))
        };

        let prize = Prize::new(award_year, text("category")?, text("motivation")?);
        prize
            .validate()
            .map_err(|e| Error::Validation(format!("prizes[{}]: {}", index, e)))?;
        Ok(prize)
    }

    /// Integer, or a string holding one.
    fn parse_year(value: &Value) -> Option<i32> {
        match value {
            Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn as_object(body: &Value) -> Result<&Map<String, Value>> {
        body.as_object().ok_or_else(|| {
            Error::Validation("Request body must be a JSON object".to_string())
        })
    }

    fn prizes_field(fields: &Map<String, Value>) -> Option<&Value> {
        fields
            .get("prizes")
            .or_else(|| fields.get("nobelPrizes"))
            .filter(|value| !value.is_null())
    }

    fn required_string(fields: &Map<String, Value>, key: &str) -> Result<String> {
        Self::optional_string(fields, key)?
            .ok_or_else(|| Error::Validation(format!("Missing '{}' field", key)))
    }

    fn optional_string(fields: &Map<String, Value>, key: &str) -> Result<Option<String>> {
        match fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(Error::Validation(format!(
                "'{}' must be a string",
                key
            ))),
        }
    }
}
