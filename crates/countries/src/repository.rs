//! REST Countries API client
//!
//! Read-only access to the four endpoints the application consumes. The
//! response schema belongs to the upstream service.

use crate::prelude::*;
use countries_core::country::Country;
use countries_core::filter::Region;
use futures::future::join_all;

pub const DEFAULT_API_BASE: &str = "https://restcountries.com/v3.1";

/// Fields needed to render country cards
///
/// The service rejects `/all` without a field projection.
pub const LIST_FIELDS: &str = "cca3,name,population,region,capital,flags";

pub fn all_url(base: &str) -> String {
    format!("{}/all?fields={LIST_FIELDS}", base.trim_end_matches('/'))
}

pub fn region_url(base: &str, region: Region) -> String {
    format!(
        "{}/region/{}?fields={LIST_FIELDS}",
        base.trim_end_matches('/'),
        region.as_str().to_lowercase()
    )
}

pub fn name_url(base: &str, name: &str) -> String {
    format!(
        "{}/name/{}?fullText=true",
        base.trim_end_matches('/'),
        urlencoding::encode(name.trim())
    )
}

pub fn alpha_url(base: &str, code: &str) -> String {
    format!(
        "{}/alpha/{}",
        base.trim_end_matches('/'),
        urlencoding::encode(code.trim())
    )
}

#[derive(Debug, Clone)]
pub struct CountryRepository {
    client: reqwest::Client,
    base_url: String,
}

impl CountryRepository {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("countries/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Every country, or the countries of one region
    pub async fn list(&self, region: Option<Region>) -> Result<Vec<Country>, Error> {
        match region {
            Some(region) => self.by_region(region).await,
            None => self.all().await,
        }
    }

    pub async fn all(&self) -> Result<Vec<Country>, Error> {
        self.fetch_list(&all_url(&self.base_url)).await
    }

    pub async fn by_region(&self, region: Region) -> Result<Vec<Country>, Error> {
        self.fetch_list(&region_url(&self.base_url, region)).await
    }

    /// Exact-name lookup
    pub async fn by_name(&self, name: &str) -> Result<Country, Error> {
        self.fetch_one(&name_url(&self.base_url, name), name).await
    }

    pub async fn by_code(&self, code: &str) -> Result<Country, Error> {
        self.fetch_one(&alpha_url(&self.base_url, code), code).await
    }

    /// Resolve border codes concurrently, keeping whatever succeeded
    pub async fn border_countries(&self, codes: &[String]) -> Vec<Country> {
        let lookups = codes.iter().map(|code| self.by_code(code));
        keep_resolved(codes, join_all(lookups).await)
    }

    /// A list endpoint answering 404 is misconfigured, not empty
    async fn fetch_list(&self, url: &str) -> Result<Vec<Country>, Error> {
        self.fetch_countries(url)
            .await?
            .ok_or_else(|| Error::FetchFailure(f!("{url}: HTTP 404 Not Found")))
    }

    async fn fetch_one(&self, url: &str, query: &str) -> Result<Country, Error> {
        self.fetch_countries(url)
            .await?
            .and_then(|countries| countries.into_iter().next())
            .ok_or_else(|| Error::NotFound(query.to_string()))
    }

    /// GET a JSON array of countries; `None` on HTTP 404
    async fn fetch_countries(&self, url: &str) -> Result<Option<Vec<Country>>, Error> {
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::FetchFailure(f!("{url}: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(Error::FetchFailure(f!(
                "{url}: HTTP {}",
                response.status()
            )));
        }

        response
            .json::<Vec<Country>>()
            .await
            .map(Some)
            .map_err(|e| Error::FetchFailure(f!("{url}: invalid response body: {e}")))
    }
}

/// Keep successful lookups in request order; failures are logged and dropped
fn keep_resolved(codes: &[String], results: Vec<Result<Country, Error>>) -> Vec<Country> {
    results
        .into_iter()
        .zip(codes)
        .filter_map(|(result, code)| match result {
            Ok(country) => Some(country),
            Err(err) => {
                log::warn!("Skipping border country {}: {}", code, err);
                None
            }
        })
        .collect()
}
