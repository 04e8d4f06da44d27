//! Census Directory
//!
//! [`RemoteDirectory`] backed by the US Census Bureau API: state and county
//! FIPS codes from the 2010 decennial census, and broadband coverage from the
//! 2021 ACS 1-year subject tables.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::datasource::{normalize_name, CodeTable, RemoteDirectory};
use crate::error::{AppError, Result};

/// Percentage of households with a broadband subscription.
const BROADBAND_VARIABLE: &str = "S2802_C03_022E";

// == Census Directory ==
pub struct CensusDirectory {
    client: Client,
    base_url: String,
}

impl CensusDirectory {
    /// Builds a client with the given per-request timeout.
    ///
    /// The blocking client owns an internal runtime, so it must be created
    /// and dropped outside of async contexts.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn get_rows(&self, url: &str) -> Result<Vec<Vec<String>>> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::Upstream(format!("Census request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Census API returned {}: {}",
                status, detail
            )));
        }

        response
            .json()
            .map_err(|e| AppError::Upstream(format!("Malformed census response: {}", e)))
    }
}

impl RemoteDirectory for CensusDirectory {
    fn fetch_primary_codes(&self) -> Result<CodeTable> {
        let url = format!("{}/2010/dec/sf1?get=NAME&for=state:*", self.base_url);
        state_table(&self.get_rows(&url)?)
    }

    fn fetch_sub_codes(&self, primary_code: u32) -> Result<CodeTable> {
        let url = format!(
            "{}/2010/dec/sf1?get=NAME&for=county:*&in=state:{:02}",
            self.base_url, primary_code
        );
        county_table(&self.get_rows(&url)?)
    }

    fn fetch_value(&self, primary_code: u32, sub_code: u32) -> Result<String> {
        let url = format!(
            "{}/2021/acs/acs1/subject/variables?get=NAME,{}&for=county:{:03}&in=state:{:02}",
            self.base_url, BROADBAND_VARIABLE, sub_code, primary_code
        );
        value_from_rows(&self.get_rows(&url)?)
    }
}

// == Response Decoding ==
// Census responses are a JSON array of string rows; the first row is the
// column header.

/// `[["NAME","state"],["Alabama","01"],...]`
fn state_table(rows: &[Vec<String>]) -> Result<CodeTable> {
    rows.iter()
        .skip(1)
        .map(|row| match row.as_slice() {
            [name, code, ..] => Ok((normalize_name(name), parse_code(code)?)),
            _ => Err(malformed_row(row)),
        })
        .collect()
}

/// `[["NAME","state","county"],["Kings County, New York","36","047"],...]`
fn county_table(rows: &[Vec<String>]) -> Result<CodeTable> {
    rows.iter()
        .skip(1)
        .map(|row| match row.as_slice() {
            [name, _, code, ..] => Ok((county_name(name), parse_code(code)?)),
            _ => Err(malformed_row(row)),
        })
        .collect()
}

/// `[["NAME","S2802_C03_022E","state","county"],["Kings County, New York","85.1","36","047"]]`
fn value_from_rows(rows: &[Vec<String>]) -> Result<String> {
    rows.get(1)
        .and_then(|row| row.get(1))
        .cloned()
        .ok_or_else(|| AppError::Upstream("Census response has no data row".to_string()))
}

/// "Kings County, New York" -> "kings"
fn county_name(full_name: &str) -> String {
    let name = full_name.split(',').next().unwrap_or_default();
    let words: String = name
        .split_whitespace()
        .take_while(|word| *word != "County")
        .collect();
    normalize_name(&words)
}

fn parse_code(code: &str) -> Result<u32> {
    code.trim()
        .parse()
        .map_err(|_| AppError::Upstream(format!("Invalid region code '{}'", code)))
}

fn malformed_row(row: &[String]) -> AppError {
    AppError::Upstream(format!("Malformed census row: {:?}", row))
}
