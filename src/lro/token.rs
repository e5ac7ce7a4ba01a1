//! Continuation tokens for paging through job results.
//!
//! A token is the `$top`/`$skip`/`showStats` triple taken from the service's
//! next link, printed in query-string form so callers can persist it.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::TextAnalyticsError;

const TOP_KEY: &str = "$top";
const SKIP_KEY: &str = "$skip";
const SHOW_STATS_KEY: &str = "showStats";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationToken {
    pub top: u32,
    pub skip: u32,
    pub show_stats: bool,
}

/// Paging parameters for one job-state request. The first page carries
/// no `$top`/`$skip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRequest {
    pub top: Option<u32>,
    pub skip: Option<u32>,
    pub show_stats: bool,
}

impl PageRequest {
    pub fn first(show_stats: bool) -> Self {
        Self {
            top: None,
            skip: None,
            show_stats,
        }
    }
}

impl From<ContinuationToken> for PageRequest {
    fn from(t: ContinuationToken) -> Self {
        Self {
            top: Some(t.top),
            skip: Some(t.skip),
            show_stats: t.show_stats,
        }
    }
}

impl ContinuationToken {
    /// Decode the token embedded in a next link. `None` means end of results.
    pub fn from_next_link(next_link: Option<&str>) -> Result<Option<Self>, TextAnalyticsError> {
        let Some(link) = next_link.filter(|l| !l.trim().is_empty()) else {
            return Ok(None);
        };
        let url = reqwest::Url::parse(link)
            .map_err(|e| TextAnalyticsError::InvalidContinuationToken(format!("{link}: {e}")))?;
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))).map(Some)
    }

    fn from_pairs<'a>(
        pairs: impl Iterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, TextAnalyticsError> {
        let mut top = None;
        let mut skip = None;
        let mut show_stats = false;
        for (key, value) in pairs {
            match key {
                TOP_KEY => top = Some(parse_number(key, value)?),
                SKIP_KEY => skip = Some(parse_number(key, value)?),
                SHOW_STATS_KEY => {
                    show_stats = value.parse().map_err(|_| {
                        TextAnalyticsError::InvalidContinuationToken(format!(
                            "{key} must be true or false, got '{value}'"
                        ))
                    })?
                }
                _ => {}
            }
        }
        let skip = skip.ok_or_else(|| {
            TextAnalyticsError::InvalidContinuationToken(format!("missing {SKIP_KEY}"))
        })?;
        Ok(Self {
            top: top.unwrap_or(DEFAULT_PAGE_SIZE),
            skip,
            show_stats,
        })
    }
}

fn parse_number(key: &str, value: &str) -> Result<u32, TextAnalyticsError> {
    value.parse().map_err(|_| {
        TextAnalyticsError::InvalidContinuationToken(format!("{key} must be a number, got '{value}'"))
    })
}

impl std::fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{TOP_KEY}={}&{SKIP_KEY}={}&{SHOW_STATS_KEY}={}",
            self.top, self.skip, self.show_stats
        )
    }
}

impl std::str::FromStr for ContinuationToken {
    type Err = TextAnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pairs = s
            .trim_start_matches('?')
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")));
        Self::from_pairs(pairs)
    }
}
