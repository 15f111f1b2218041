//! Network sources: daily timings, Hijri dates and the city catalog.

pub mod aladhan;
pub mod catalog;
pub mod retry;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::calendar::HijriDay;
use crate::prayer::RawTimings;

pub use aladhan::AladhanClient;
pub use catalog::{CityCatalog, fetch_catalog};
pub use retry::RetryPolicy;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered with HTTP {0}")]
    Status(u16),

    #[error("unexpected response: {0}")]
    Format(String),

    #[error("cancelled before a response arrived")]
    Cancelled,
}

/// City and country as sent to the timings API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub country: String,
}

impl Location {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
        }
    }

    /// Split "City, Country" at the first ", ". Without a separator the
    /// whole string is the city and the country is empty.
    pub fn parse(selection: &str) -> Self {
        match selection.trim().split_once(", ") {
            Some((city, country)) => Self::new(city.trim(), country.trim()),
            None => Self::new(selection.trim(), ""),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.country.is_empty() {
            f.write_str(&self.city)
        } else {
            write!(f, "{}, {}", self.city, self.country)
        }
    }
}

/// Source of per-day raw timings and Hijri dates.
#[cfg_attr(test, mockall::automock)]
pub trait TimingsProvider {
    fn fetch_timings(&self, location: &Location, date: NaiveDate) -> Result<RawTimings, ApiError>;

    fn fetch_hijri(&self, date: NaiveDate) -> Result<HijriDay, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parse_splits_once() {
        assert_eq!(
            Location::parse("Makkah, Saudi Arabia"),
            Location::new("Makkah", "Saudi Arabia")
        );
        assert_eq!(
            Location::parse("Washington, D.C., United States"),
            Location::new("Washington", "D.C., United States")
        );
        assert_eq!(Location::parse("Dhaka"), Location::new("Dhaka", ""));
    }

    #[test]
    fn test_location_display() {
        assert_eq!(Location::new("Cairo", "Egypt").to_string(), "Cairo, Egypt");
        assert_eq!(Location::new("Cairo", "").to_string(), "Cairo");
    }
}
