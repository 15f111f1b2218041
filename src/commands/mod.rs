//! One-shot CLI commands.
//!
//! Each command lives in its own submodule with a `handle_*_command` entry
//! point and a `display_help` used by `waqtbar help <command>`.

pub mod city;
pub mod help;
pub mod simulate;
pub mod status;

use std::sync::atomic::AtomicBool;

use crate::api::RetryPolicy;
use crate::common::constants::ONE_SHOT_FETCH_ATTEMPTS;
use crate::config::Config;

/// Bounded retry for commands that must finish on their own.
pub(crate) fn one_shot_policy(config: &Config) -> RetryPolicy {
    RetryPolicy::bounded(config.retry_delay(), ONE_SHOT_FETCH_ATTEMPTS)
}

/// A running flag nothing ever clears.
pub(crate) fn always_running() -> AtomicBool {
    AtomicBool::new(true)
}

/// Calculate Levenshtein distance between two strings for similarity matching
pub(crate) fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut previous: Vec<usize> = (0..=len2).collect();
    let mut current = vec![0; len2 + 1];

    for i in 1..=len1 {
        current[0] = i;
        for j in 1..=len2 {
            let cost = usize::from(s1_chars[i - 1] != s2_chars[j - 1]);
            current[j] = (previous[j] + 1)
                .min(current[j - 1] + 1)
                .min(previous[j - 1] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[len2]
}

/// The `max_count` candidates closest to `target`, ignoring case.
pub(crate) fn find_similar<'a>(target: &str, candidates: &[&'a str], max_count: usize) -> Vec<&'a str> {
    let target_lower = target.to_lowercase();
    let mut scored: Vec<(usize, &str)> = candidates
        .iter()
        .map(|candidate| {
            (
                levenshtein_distance(&target_lower, &candidate.to_lowercase()),
                *candidate,
            )
        })
        .collect();

    scored.sort();
    scored
        .into_iter()
        .take(max_count)
        .map(|(_, candidate)| candidate)
        .collect()
}
