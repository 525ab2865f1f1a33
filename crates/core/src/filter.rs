//! Search and region filtering over an in-memory country list

use crate::country::Country;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geographic facet supported by the `/region/{region}` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Africa,
    Americas,
    Asia,
    Europe,
    Oceania,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Africa,
        Region::Americas,
        Region::Asia,
        Region::Europe,
        Region::Oceania,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Africa => "Africa",
            Region::Americas => "Americas",
            Region::Asia => "Asia",
            Region::Europe => "Europe",
            Region::Oceania => "Oceania",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "africa" => Ok(Region::Africa),
            "america" | "americas" => Ok(Region::Americas),
            "asia" => Ok(Region::Asia),
            "europe" => Ok(Region::Europe),
            "oceania" => Ok(Region::Oceania),
            other => Err(format!(
                "Invalid region: {other}. Valid regions: africa, americas, asia, europe, oceania, all"
            )),
        }
    }
}

/// Parse a region selector value
///
/// `all`, an empty string and the `Filter by region` placeholder select no
/// region at all.
pub fn parse_region_selector(selector: &str) -> Result<Option<Region>, String> {
    let trimmed = selector.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("all")
        || trimmed.eq_ignore_ascii_case("filter by region")
    {
        return Ok(None);
    }

    trimmed.parse().map(Some)
}

/// Ephemeral filter inputs of the list view
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterState {
    pub search_text: String,
    pub region: Option<Region>,
}

impl FilterState {
    /// Switch region; the search text does not survive a region change
    pub fn select_region(&mut self, region: Option<Region>) {
        self.region = region;
        self.search_text.clear();
    }

    pub fn apply<'a>(&self, countries: &'a [Country]) -> Vec<&'a Country> {
        filter_countries(countries, &self.search_text, self.region)
    }
}

/// Case-insensitive substring match against the common name only
pub fn matches_search(country: &Country, search_text: &str) -> bool {
    search_text.is_empty()
        || country
            .name
            .common
            .to_lowercase()
            .contains(&search_text.to_lowercase())
}

/// Filter countries by search text and, optionally, region
///
/// The source slice is left untouched and the relative order of the
/// surviving entries is preserved.
pub fn filter_countries<'a>(
    countries: &'a [Country],
    search_text: &str,
    region: Option<Region>,
) -> Vec<&'a Country> {
    countries
        .iter()
        .filter(|c| region.map_or(true, |r| c.region.eq_ignore_ascii_case(r.as_str())))
        .filter(|c| matches_search(c, search_text))
        .collect()
}
