use std::collections::BTreeMap;
use std::str::FromStr;

use time::macros::format_description;
use time::Date;

use crate::error::ParamsError;

/// Filter parameters passed through to the Logs API as a query string.
///
/// The clients treat the map as opaque apart from the date keys used for
/// file naming and quota arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    values: BTreeMap<String, String>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn query_pairs(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Parse a `YYYY-MM-DD` date stored under `key`.
    pub fn date(&self, key: &'static str) -> Result<Date, ParamsError> {
        let value = self.get(key).ok_or(ParamsError::Missing { key })?;
        parse_date(key, value)
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// A single `key=value` pair as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamPair {
    pub key: String,
    pub value: String,
}

impl FromStr for ParamPair {
    type Err = ParamsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok(Self {
                key: key.trim().to_string(),
                value: value.to_string(),
            }),
            _ => Err(ParamsError::InvalidPair {
                value: raw.to_string(),
            }),
        }
    }
}

fn parse_date(key: &'static str, value: &str) -> Result<Date, ParamsError> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|_| {
        ParamsError::InvalidDate {
            key,
            value: value.to_string(),
        }
    })
}

/// Inclusive number of days covered by `date1..=date2`.
pub fn days_requested(params: &RequestParams) -> Result<i64, ParamsError> {
    let since = params.date("date1")?;
    let until = params.date("date2")?;
    Ok((until - since).whole_days() + 1)
}
