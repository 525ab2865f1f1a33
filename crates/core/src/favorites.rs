//! Per-identity favorite country codes
//!
//! Codes are opaque: nothing checks them against the API, so a favorite that
//! no longer matches any country is simply dropped when the view is derived.

use crate::country::Country;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Set of favorited country codes for one identity
pub type FavoriteCodes = BTreeSet<String>;

/// Favorites of every identity that has logged in, keyed by email
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoritesIndex(BTreeMap<String, FavoriteCodes>);

impl FavoritesIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn favorites_for(&self, email: &str) -> Option<&FavoriteCodes> {
        self.0.get(email)
    }

    /// Favorites of `email`, empty when the identity has none recorded
    pub fn codes_for(&self, email: &str) -> FavoriteCodes {
        self.favorites_for(email).cloned().unwrap_or_default()
    }

    pub fn is_favorite(&self, email: &str, code: &str) -> bool {
        self.favorites_for(email)
            .is_some_and(|codes| codes.contains(code))
    }

    /// Create an empty entry for `email` unless one exists
    ///
    /// Returns `true` when a new entry was created.
    pub fn ensure_entry(&mut self, email: &str) -> bool {
        if self.0.contains_key(email) {
            return false;
        }
        self.0.insert(email.to_string(), FavoriteCodes::new());
        true
    }

    /// Flip `code` for `email`; returns `true` if it is now a favorite
    pub fn toggle(&mut self, email: &str, code: &str) -> bool {
        toggle_code(self.0.entry(email.to_string()).or_default(), code)
    }

    pub fn emails(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Flip membership of `code`; returns `true` if it was added
pub fn toggle_code(codes: &mut FavoriteCodes, code: &str) -> bool {
    if codes.remove(code) {
        false
    } else {
        codes.insert(code.to_string());
        true
    }
}

/// Countries whose code is in `favorites`, in the order of `all_countries`
pub fn derive_favorite_countries<'a>(
    all_countries: &'a [Country],
    favorites: &FavoriteCodes,
) -> Vec<&'a Country> {
    all_countries
        .iter()
        .filter(|c| favorites.contains(&c.cca3))
        .collect()
}

/// Favorite codes that match no country in `all_countries`
pub fn stale_codes<'a>(all_countries: &[Country], favorites: &'a FavoriteCodes) -> Vec<&'a str> {
    favorites
        .iter()
        .filter(|code| !all_countries.iter().any(|c| &c.cca3 == *code))
        .map(String::as_str)
        .collect()
}
