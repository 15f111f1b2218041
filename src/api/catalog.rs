//! "City, Country" catalog used to validate the configured location.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use super::ApiError;
use crate::common::constants::CITY_CATALOG_URL;

#[derive(Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    data: Vec<CountryCities>,
}

#[derive(Deserialize)]
struct CountryCities {
    country: String,
    #[serde(default)]
    cities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityCatalog {
    entries: Vec<String>,
}

impl CityCatalog {
    pub fn from_entries(entries: Vec<String>) -> Self {
        Self { entries }
    }

    /// Flatten a countries response into "City, Country" entries.
    pub fn from_body(body: &str) -> Result<Self, ApiError> {
        let response: CatalogResponse =
            serde_json::from_str(body).map_err(|e| ApiError::Format(e.to_string()))?;

        let entries = response
            .data
            .into_iter()
            .flat_map(|country| {
                let name = country.country;
                country
                    .cities
                    .into_iter()
                    .map(move |city| format!("{city}, {name}"))
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> Vec<&str> {
        self.entries.iter().map(String::as_str).collect()
    }

    /// Exact "City, Country" membership.
    pub fn contains(&self, selection: &str) -> bool {
        self.entries.iter().any(|entry| entry == selection.trim())
    }

    /// Case-insensitive matches, prefix matches first.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&str> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<(bool, &str)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let lower = entry.to_lowercase();
                lower
                    .contains(&query)
                    .then(|| (!lower.starts_with(&query), entry.as_str()))
            })
            .collect();
        matches.sort();
        matches.into_iter().take(limit).map(|(_, e)| e).collect()
    }
}

pub fn fetch_catalog(timeout: Duration) -> Result<CityCatalog, ApiError> {
    let client = Client::builder().timeout(timeout).build()?;
    let response = client.get(CITY_CATALOG_URL).send()?;
    if response.status() != StatusCode::OK {
        return Err(ApiError::Status(response.status().as_u16()));
    }
    CityCatalog::from_body(&response.text()?)
}
