use anyhow::Result;

use super::Config;
use crate::common::constants::*;

/// Reject out-of-range numbers and blank location strings.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(city) = &config.city
        && city.trim().is_empty()
    {
        anyhow::bail!("city must not be empty (remove the line to unset it)");
    }

    if let Some(country) = &config.country
        && config.city.is_none()
        && !country.trim().is_empty()
    {
        anyhow::bail!("country \"{}\" is set but city is missing", country);
    }

    if let Some(method) = config.method
        && method > MAXIMUM_METHOD
    {
        anyhow::bail!(
            "method ({}) must be a calculation method id between 0 and {}",
            method,
            MAXIMUM_METHOD
        );
    }

    if let Some(delay) = config.retry_delay
        && !(MINIMUM_RETRY_DELAY..=MAXIMUM_RETRY_DELAY).contains(&delay)
    {
        anyhow::bail!(
            "retry_delay ({} s) must be between {} and {} seconds",
            delay,
            MINIMUM_RETRY_DELAY,
            MAXIMUM_RETRY_DELAY
        );
    }

    if let Some(timeout) = config.request_timeout
        && !(MINIMUM_REQUEST_TIMEOUT..=MAXIMUM_REQUEST_TIMEOUT).contains(&timeout)
    {
        anyhow::bail!(
            "request_timeout ({} s) must be between {} and {} seconds",
            timeout,
            MINIMUM_REQUEST_TIMEOUT,
            MAXIMUM_REQUEST_TIMEOUT
        );
    }

    Ok(())
}
