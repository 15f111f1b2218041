//! Blocking client for the Aladhan prayer-times API.

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{ApiError, Location, TimingsProvider};
use crate::calendar::HijriDay;
use crate::common::constants::ALADHAN_BASE_URL;
use crate::prayer::RawTimings;

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Deserialize)]
struct TimingsData {
    timings: Option<RawTimings>,
}

#[derive(Deserialize)]
struct HijriData {
    hijri: HijriPayload,
}

#[derive(Deserialize)]
struct HijriPayload {
    day: String,
    month: HijriMonth,
    year: String,
}

#[derive(Deserialize)]
struct HijriMonth {
    en: String,
}

pub struct AladhanClient {
    client: Client,
    base_url: String,
    method: u8,
}

impl AladhanClient {
    pub fn new(timeout: Duration, method: u8) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("waqtbar/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: ALADHAN_BASE_URL.to_string(),
            method,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn get_body(&self, path: &str, query: &[(&str, String)]) -> Result<String, ApiError> {
        let response = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .query(query)
            .send()?;

        if response.status() != StatusCode::OK {
            return Err(ApiError::Status(response.status().as_u16()));
        }
        Ok(response.text()?)
    }
}

fn api_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Extract `data.timings` from a timings response body.
pub fn parse_timings_body(body: &str) -> Result<RawTimings, ApiError> {
    let envelope: Envelope<TimingsData> =
        serde_json::from_str(body).map_err(|e| ApiError::Format(e.to_string()))?;

    envelope
        .data
        .and_then(|data| data.timings)
        .ok_or_else(|| ApiError::Format("response has no data.timings".to_string()))
}

/// Extract day, English month name and year from a `gToH` response body.
pub fn parse_hijri_body(body: &str) -> Result<HijriDay, ApiError> {
    let envelope: Envelope<HijriData> =
        serde_json::from_str(body).map_err(|e| ApiError::Format(e.to_string()))?;
    let hijri = envelope
        .data
        .ok_or_else(|| ApiError::Format("response has no data.hijri".to_string()))?
        .hijri;

    let number = |field: &str, value: &str| {
        value
            .trim()
            .parse::<u32>()
            .map_err(|_| ApiError::Format(format!("hijri {field} {value:?} is not a number")))
    };

    Ok(HijriDay {
        day: number("day", &hijri.day)?,
        month_name: hijri.month.en,
        year: number("year", &hijri.year)?,
    })
}

impl TimingsProvider for AladhanClient {
    fn fetch_timings(&self, location: &Location, date: NaiveDate) -> Result<RawTimings, ApiError> {
        let body = self.get_body(
            &format!("timingsByCity/{}", api_date(date)),
            &[
                ("city", location.city.clone()),
                ("country", location.country.clone()),
                ("method", self.method.to_string()),
            ],
        )?;
        parse_timings_body(&body)
    }

    fn fetch_hijri(&self, date: NaiveDate) -> Result<HijriDay, ApiError> {
        let body = self.get_body(&format!("gToH/{}", api_date(date)), &[])?;
        parse_hijri_body(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timings_body() {
        let body = r#"{
            "code": 200,
            "status": "OK",
            "data": {
                "timings": {
                    "Fajr": "05:00", "Sunrise": "06:30", "Dhuhr": "12:00",
                    "Asr": "15:30", "Sunset": "17:45", "Maghrib": "17:45",
                    "Isha": "21:49", "Imsak": "04:50", "Midnight": "23:22",
                    "Firstthird": "21:38", "Lastthird": "02:30"
                },
                "date": { "readable": "01 Jan 2024" }
            }
        }"#;
        let timings = parse_timings_body(body).unwrap();
        assert_eq!(timings.get("Lastthird"), Some("02:30"));
        assert_eq!(timings.len(), 11);
    }

    #[test]
    fn test_parse_timings_body_without_timings() {
        let err = parse_timings_body(r#"{"code":200,"data":{"date":{}}}"#).unwrap_err();
        assert!(matches!(err, ApiError::Format(_)));

        let err = parse_timings_body(r#"{"code":400,"data":"Unable to locate city"}"#)
            .unwrap_err();
        assert!(matches!(err, ApiError::Format(_)));
    }

    #[test]
    fn test_parse_hijri_body() {
        let body = r#"{"code":200,"data":{"hijri":{
            "date":"09-06-1446","day":"09",
            "month":{"number":6,"en":"Jumādá al-ākhirah","ar":"جُمادى الآخرة"},
            "year":"1446"}}}"#;
        let day = parse_hijri_body(body).unwrap();
        assert_eq!(day.to_string(), "09 Jumādá al-ākhirah 1446");
    }

    #[test]
    fn test_api_date_format() {
        assert_eq!(api_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()), "02-01-2024");
    }
}
