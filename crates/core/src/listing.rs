//! Output models for the country list and favorites views

use crate::country::{summarize_country, Country, CountrySummary};
use crate::favorites::{derive_favorite_countries, stale_codes, FavoriteCodes};
use crate::filter::{FilterState, Region};
use crate::pagination::Page;
use serde::Serialize;

/// Pagination metadata for list output
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ListPaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
    pub page_window: Vec<usize>,
    pub next_page_command: Option<String>,
    pub prev_page_command: Option<String>,
}

/// Complete list output with items and pagination
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ListOutput {
    pub region: Option<Region>,
    pub search: String,
    pub items: Vec<CountrySummary>,
    pub pagination: ListPaginationInfo,
}

/// Favorites view output
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FavoritesOutput {
    pub items: Vec<CountrySummary>,
    /// Favorite codes that no longer match any country
    pub missing_codes: Vec<String>,
}

/// Quote a value so a POSIX shell reads it back as one argument
pub fn shell_quote(value: &str) -> String {
    let value = value.replace('\0', "");
    match shlex::try_quote(&value) {
        Ok(quoted) => quoted.into_owned(),
        Err(_) => value.clone(),
    }
}

/// Command that re-runs the current listing on another page
pub fn list_command(filter: &FilterState, page: usize) -> String {
    let mut command = format!("countries list --page {page}");
    if let Some(region) = filter.region {
        command.push_str(&format!(" --region {}", region.as_str().to_lowercase()));
    }
    if !filter.search_text.is_empty() {
        command.push_str(&format!(" --search {}", shell_quote(&filter.search_text)));
    }
    command
}

/// Build list output from the visible page
///
/// Each item is flagged with whether its code is in `favorites`.
pub fn build_list_output(
    page: &Page<&Country>,
    filter: &FilterState,
    favorites: &FavoriteCodes,
) -> ListOutput {
    let items = page
        .items
        .iter()
        .map(|c| summarize_country(c, favorites.contains(&c.cca3)))
        .collect();

    let next_page_command = page
        .has_next()
        .then(|| list_command(filter, page.current_page + 1));
    let prev_page_command = page
        .has_previous()
        .then(|| list_command(filter, page.current_page - 1));

    ListOutput {
        region: filter.region,
        search: filter.search_text.clone(),
        items,
        pagination: ListPaginationInfo {
            current_page: page.current_page,
            total_pages: page.total_pages,
            total_items: page.total_items,
            page_size: page.page_size,
            page_window: page.page_window.clone(),
            next_page_command,
            prev_page_command,
        },
    }
}

/// Build the favorites view from the full country list
pub fn build_favorites_output(all_countries: &[Country], favorites: &FavoriteCodes) -> FavoritesOutput {
    FavoritesOutput {
        items: derive_favorite_countries(all_countries, favorites)
            .into_iter()
            .map(|c| summarize_country(c, true))
            .collect(),
        missing_codes: stale_codes(all_countries, favorites)
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}
