use serde::Serialize;

use crate::aggregation::{CountryCount, YearGroup};
use crate::auth::Identity;
use crate::models::Laureate;

#[derive(Debug, Serialize)]
pub struct LaureatesResponse {
    pub discipline: Option<String>,
    pub year: Option<i32>,
    pub yearto: Option<i32>,
    pub total_count: usize,
    pub results: Vec<YearGroup>,
}

#[derive(Debug, Serialize)]
pub struct CountriesResponse {
    pub discipline: Option<String>,
    pub year: Option<i32>,
    pub yearto: Option<i32>,
    pub total_count: usize,
    pub results: Vec<CountryCount>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub count: usize,
    pub results: Vec<Laureate>,
}

impl SearchResponse {
    pub fn new(query: String, results: Vec<Laureate>) -> Self {
        Self {
            query,
            count: results.len(),
            results,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub message: String,
    pub laureate: Laureate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl MutationResponse {
    pub fn created(laureate: Laureate, actor: &Identity) -> Self {
        Self {
            message: "Laureate created".to_string(),
            laureate,
            created_by: Some(actor.name.clone()),
            updated_by: None,
        }
    }

    pub fn updated(laureate: Laureate, actor: &Identity) -> Self {
        Self {
            message: "Laureate updated".to_string(),
            laureate,
            created_by: None,
            updated_by: Some(actor.name.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub deleted_by: String,
}

impl DeleteResponse {
    pub fn new(laureate: Laureate, actor: &Identity) -> Self {
        Self {
            id: laureate.id,
            full_name: laureate.full_name,
            deleted_by: actor.name.clone(),
        }
    }
}
