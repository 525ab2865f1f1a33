//! Country records as served by the REST Countries API (v3.1)
//!
//! The upstream schema is an external contract: these types only describe the
//! subset of fields the application reads. Optional collections default to
//! empty so that projected responses (`?fields=...`) deserialize cleanly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Country record from the API
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Country {
    pub cca3: String,
    pub name: CountryName,
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub subregion: Option<String>,
    #[serde(default)]
    pub capital: Option<Vec<String>>,
    #[serde(default)]
    pub flags: Flags,
    #[serde(default)]
    pub borders: Vec<String>,
    #[serde(default)]
    pub currencies: BTreeMap<String, Currency>,
    #[serde(default)]
    pub languages: BTreeMap<String, String>,
    #[serde(default)]
    pub tld: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct CountryName {
    pub common: String,
    #[serde(default)]
    pub official: String,
    #[serde(default, rename = "nativeName")]
    pub native_name: BTreeMap<String, NativeName>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct NativeName {
    #[serde(default)]
    pub official: String,
    #[serde(default)]
    pub common: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Flags {
    #[serde(default)]
    pub png: String,
    #[serde(default)]
    pub svg: String,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Currency {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

impl Country {
    /// The unique 3-letter code used as the favorite key
    pub fn code(&self) -> &str {
        &self.cca3
    }

    pub fn common_name(&self) -> &str {
        &self.name.common
    }

    /// First listed capital, if any
    pub fn primary_capital(&self) -> Option<&str> {
        self.capital
            .as_ref()
            .and_then(|capitals| capitals.first())
            .map(String::as_str)
    }

    /// Common native name of the first native language entry
    pub fn native_common_name(&self) -> Option<&str> {
        self.name
            .native_name
            .values()
            .next()
            .map(|n| n.common.as_str())
            .filter(|n| !n.is_empty())
    }

    pub fn primary_currency(&self) -> Option<&str> {
        self.currencies
            .values()
            .next()
            .map(|c| c.name.as_str())
            .filter(|n| !n.is_empty())
    }

    pub fn top_level_domain(&self) -> Option<&str> {
        self.tld.first().map(String::as_str)
    }
}

/// Card-sized country output used by list and favorites views
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CountrySummary {
    pub code: String,
    pub name: String,
    pub population: u64,
    pub region: String,
    pub capital: Option<String>,
    pub flag_url: String,
    pub favorite: bool,
}

/// Neighbouring country reference shown on the detail view
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BorderCountry {
    pub code: String,
    pub name: String,
}

/// Full country output for the detail view
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CountryDetail {
    pub code: String,
    pub name: String,
    pub official_name: String,
    pub native_name: Option<String>,
    pub population: u64,
    pub region: String,
    pub subregion: Option<String>,
    pub capital: Option<String>,
    pub top_level_domain: Option<String>,
    pub currency: Option<String>,
    pub languages: Vec<String>,
    pub flag_url: String,
    /// Border codes as reported by the API
    pub border_codes: Vec<String>,
    /// Border countries that could be resolved
    pub borders: Vec<BorderCountry>,
    pub favorite: bool,
}

/// Transform a country into its card representation
pub fn summarize_country(country: &Country, favorite: bool) -> CountrySummary {
    CountrySummary {
        code: country.cca3.clone(),
        name: country.name.common.clone(),
        population: country.population,
        region: country.region.clone(),
        capital: country.primary_capital().map(str::to_string),
        flag_url: country.flags.png.clone(),
        favorite,
    }
}

/// Build the detail output for a country and whichever border lookups succeeded
///
/// Borders are listed in the order of `country.borders`; codes without a
/// resolved country are skipped.
pub fn build_country_detail(
    country: &Country,
    resolved_borders: &[Country],
    favorite: bool,
) -> CountryDetail {
    let borders = country
        .borders
        .iter()
        .filter_map(|code| resolved_borders.iter().find(|b| &b.cca3 == code))
        .map(|b| BorderCountry {
            code: b.cca3.clone(),
            name: b.name.common.clone(),
        })
        .collect();

    CountryDetail {
        code: country.cca3.clone(),
        name: country.name.common.clone(),
        official_name: country.name.official.clone(),
        native_name: country.native_common_name().map(str::to_string),
        population: country.population,
        region: country.region.clone(),
        subregion: country.subregion.clone(),
        capital: country.primary_capital().map(str::to_string),
        top_level_domain: country.top_level_domain().map(str::to_string),
        currency: country.primary_currency().map(str::to_string),
        languages: country.languages.values().cloned().collect(),
        flag_url: country.flags.png.clone(),
        border_codes: country.borders.clone(),
        borders,
        favorite,
    }
}

/// Remove a country from the local working copy
///
/// Only the in-memory list is touched; upstream data is never modified.
/// Returns `true` when a country was removed.
pub fn remove_country(countries: &mut Vec<Country>, code: &str) -> bool {
    let before = countries.len();
    countries.retain(|c| c.cca3 != code);
    countries.len() != before
}

/// Format a population with thousands separators (e.g. `83,240,525`)
pub fn format_population(population: u64) -> String {
    let digits = population.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }

    result
}
