//! List view state machine
//!
//! The list view is driven by explicit events. Each event updates the state
//! and may ask the caller to run a fetch; the fetch result comes back as
//! another event carrying the ticket it was issued with.
//!
//! | Event             | State change                                   | Effect |
//! |-------------------|------------------------------------------------|--------|
//! | `Mounted`         | loading                                        | fetch  |
//! | `RegionChanged`   | region set, search cleared, page 1, loading    | fetch  |
//! | `SearchChanged`   | search set, page 1                             |        |
//! | `CountriesLoaded` | list replaced, search cleared, page 1          |        |
//! | `PageRequested`   | page clamped into range                        |        |
//! | `ViewportResized` | page size from width, page re-clamped          |        |
//! | `CountryRemoved`  | country dropped from working copy, page 1      |        |
//!
//! [`DetailLoader`] sequences a detail lookup: a fetch by exact name, then a
//! batch of border lookups. Asking for another country makes both stages of
//! the previous lookup stale.

use crate::country::{remove_country, Country};
use crate::filter::{FilterState, Region};
use crate::pagination::{page_size_for_width, Page, PaginationState};
use crate::requests::{RequestSlot, RequestTicket, RequestTracker};
use std::num::NonZeroUsize;

#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    Mounted,
    RegionChanged(Option<Region>),
    SearchChanged(String),
    CountriesLoaded {
        ticket: RequestTicket,
        result: Result<Vec<Country>, String>,
    },
    PageRequested(usize),
    NextPage,
    PreviousPage,
    ViewportResized(u32),
    CountryRemoved(String),
}

/// Work the caller must perform on behalf of the view
#[derive(Debug, Clone, PartialEq)]
pub enum ListEffect {
    FetchCountries {
        ticket: RequestTicket,
        region: Option<Region>,
    },
}

#[derive(Debug, Default)]
pub struct ListView {
    countries: Vec<Country>,
    filter: FilterState,
    pagination: PaginationState,
    loading: bool,
    last_error: Option<String>,
    requests: RequestTracker,
}

impl ListView {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            pagination: PaginationState::new(page_size),
            ..Self::default()
        }
    }

    pub fn apply(&mut self, event: ListEvent) -> Option<ListEffect> {
        log::debug!("List view event: {}", event_name(&event));

        match event {
            ListEvent::Mounted => return Some(self.start_fetch()),
            ListEvent::RegionChanged(region) => {
                self.filter.select_region(region);
                self.pagination.reset();
                return Some(self.start_fetch());
            }
            ListEvent::SearchChanged(text) => {
                self.filter.search_text = text;
                self.pagination.reset();
            }
            ListEvent::CountriesLoaded { ticket, result } => self.finish_fetch(ticket, result),
            ListEvent::PageRequested(page) => {
                let total = self.filtered_count();
                self.pagination.go_to(page, total);
            }
            ListEvent::NextPage => {
                let total = self.filtered_count();
                self.pagination.next(total);
            }
            ListEvent::PreviousPage => {
                let total = self.filtered_count();
                self.pagination.previous(total);
            }
            ListEvent::ViewportResized(width) => {
                let total = self.filtered_count();
                self.pagination.resize(page_size_for_width(width), total);
            }
            ListEvent::CountryRemoved(code) => {
                if remove_country(&mut self.countries, &code) {
                    self.pagination.reset();
                }
            }
        }

        None
    }

    fn start_fetch(&mut self) -> ListEffect {
        self.loading = true;
        ListEffect::FetchCountries {
            ticket: self.requests.begin(RequestSlot::CountryList),
            region: self.filter.region,
        }
    }

    fn finish_fetch(&mut self, ticket: RequestTicket, result: Result<Vec<Country>, String>) {
        if !self.requests.finish(&ticket) {
            log::warn!(
                "Discarding stale country list response (generation {})",
                ticket.generation
            );
            return;
        }

        self.loading = false;
        match result {
            Ok(countries) => {
                self.countries = countries;
                self.filter.search_text.clear();
                self.pagination.reset();
                self.last_error = None;
            }
            Err(message) => self.last_error = Some(message),
        }
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed fetch, cleared by the next successful one
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn filtered(&self) -> Vec<&Country> {
        self.filter.apply(&self.countries)
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered().len()
    }

    pub fn page(&self) -> Page<&Country> {
        self.pagination.paginate(&self.filtered())
    }
}

/// Fetch the caller must run for a detail lookup
#[derive(Debug, Clone, PartialEq)]
pub enum DetailEffect {
    FetchByName {
        ticket: RequestTicket,
        name: String,
    },
    FetchBorders {
        ticket: RequestTicket,
        codes: Vec<String>,
    },
}

/// Result of a detail lookup stage that was still current
#[derive(Debug, Clone, PartialEq)]
pub enum DetailProgress {
    Fetch(DetailEffect),
    Failed(String),
    Ready {
        country: Country,
        borders: Vec<Country>,
    },
}

#[derive(Debug, Default)]
pub struct DetailLoader {
    requests: RequestTracker,
    pending: Option<Country>,
}

impl DetailLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start looking up `name`, superseding any lookup in progress
    pub fn request(&mut self, name: &str) -> DetailEffect {
        self.pending = None;
        self.requests.cancel(RequestSlot::BorderBatch);
        DetailEffect::FetchByName {
            ticket: self.requests.begin(RequestSlot::CountryByName),
            name: name.to_string(),
        }
    }

    /// `None` when the ticket was superseded
    pub fn country_loaded(
        &mut self,
        ticket: RequestTicket,
        result: Result<Country, String>,
    ) -> Option<DetailProgress> {
        if !self.requests.finish(&ticket) {
            log::warn!(
                "Discarding stale country detail response (generation {})",
                ticket.generation
            );
            return None;
        }

        match result {
            Ok(country) => {
                let codes = country.borders.clone();
                self.pending = Some(country);
                Some(DetailProgress::Fetch(DetailEffect::FetchBorders {
                    ticket: self.requests.begin(RequestSlot::BorderBatch),
                    codes,
                }))
            }
            Err(message) => Some(DetailProgress::Failed(message)),
        }
    }

    /// `None` when the ticket was superseded
    pub fn borders_loaded(
        &mut self,
        ticket: RequestTicket,
        borders: Vec<Country>,
    ) -> Option<DetailProgress> {
        if !self.requests.finish(&ticket) {
            log::warn!(
                "Discarding stale border batch (generation {})",
                ticket.generation
            );
            return None;
        }

        self.pending
            .take()
            .map(|country| DetailProgress::Ready { country, borders })
    }

    pub fn is_loading(&self) -> bool {
        self.requests.is_in_flight(RequestSlot::CountryByName)
            || self.requests.is_in_flight(RequestSlot::BorderBatch)
    }
}

fn event_name(event: &ListEvent) -> &'static str {
    match event {
        ListEvent::Mounted => "mounted",
        ListEvent::RegionChanged(_) => "region-changed",
        ListEvent::SearchChanged(_) => "search-changed",
        ListEvent::CountriesLoaded { .. } => "countries-loaded",
        ListEvent::PageRequested(_) => "page-requested",
        ListEvent::NextPage => "next-page",
        ListEvent::PreviousPage => "previous-page",
        ListEvent::ViewportResized(_) => "viewport-resized",
        ListEvent::CountryRemoved(_) => "country-removed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country::fixtures::{country, numbered};

    fn view(page_size: usize) -> ListView {
        ListView::new(NonZeroUsize::new(page_size).unwrap())
    }

    fn fetch_ticket(effect: Option<ListEffect>) -> (RequestTicket, Option<Region>) {
        match effect {
            Some(ListEffect::FetchCountries { ticket, region }) => (ticket, region),
            None => panic!("expected a fetch effect"),
        }
    }

    fn loaded(view: &mut ListView, countries: Vec<Country>) {
        let (ticket, _) = fetch_ticket(view.apply(ListEvent::Mounted));
        view.apply(ListEvent::CountriesLoaded {
            ticket,
            result: Ok(countries),
        });
    }

    #[test]
    fn test_mount_fetches_all_regions() {
        let mut view = view(12);
        let (_, region) = fetch_ticket(view.apply(ListEvent::Mounted));

        assert_eq!(region, None);
        assert!(view.is_loading());
    }

    #[test]
    fn test_thirteen_countries_page_request_clamps() {
        let mut view = view(12);
        loaded(&mut view, numbered(13));

        view.apply(ListEvent::PageRequested(5));
        let page = view.page();

        assert!(!view.is_loading());
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn test_search_resets_page() {
        let mut view = view(5);
        loaded(&mut view, numbered(20));
        view.apply(ListEvent::PageRequested(3));

        view.apply(ListEvent::SearchChanged("country 1".to_string()));

        assert_eq!(view.pagination().current_page(), 1);
        // "Country 1" and "Country 10".."Country 19"
        assert_eq!(view.filtered_count(), 11);
    }

    #[test]
    fn test_region_change_clears_search_and_refetches() {
        let mut view = view(5);
        loaded(&mut view, numbered(20));
        view.apply(ListEvent::SearchChanged("country".to_string()));
        view.apply(ListEvent::NextPage);

        let (_, region) = fetch_ticket(view.apply(ListEvent::RegionChanged(Some(Region::Asia))));

        assert_eq!(region, Some(Region::Asia));
        assert!(view.filter().search_text.is_empty());
        assert_eq!(view.pagination().current_page(), 1);
        assert!(view.is_loading());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut view = view(12);
        let (slow, _) = fetch_ticket(view.apply(ListEvent::Mounted));
        let (fresh, _) = fetch_ticket(view.apply(ListEvent::RegionChanged(Some(Region::Europe))));

        view.apply(ListEvent::CountriesLoaded {
            ticket: fresh,
            result: Ok(vec![country("FRA", "France", "Europe")]),
        });
        view.apply(ListEvent::CountriesLoaded {
            ticket: slow,
            result: Ok(numbered(40)),
        });

        assert_eq!(view.countries().len(), 1);
        assert_eq!(view.countries()[0].cca3, "FRA");
        assert!(!view.is_loading());
    }

    #[test]
    fn test_stale_response_does_not_end_loading() {
        let mut view = view(12);
        let (slow, _) = fetch_ticket(view.apply(ListEvent::Mounted));
        let _fresh = view.apply(ListEvent::RegionChanged(None));

        view.apply(ListEvent::CountriesLoaded {
            ticket: slow,
            result: Ok(numbered(3)),
        });

        assert!(view.is_loading());
        assert!(view.countries().is_empty());
    }

    #[test]
    fn test_failed_fetch_keeps_previous_list() {
        let mut view = view(12);
        loaded(&mut view, numbered(4));

        let (ticket, _) = fetch_ticket(view.apply(ListEvent::RegionChanged(Some(Region::Africa))));
        view.apply(ListEvent::CountriesLoaded {
            ticket,
            result: Err("connection refused".to_string()),
        });

        assert_eq!(view.countries().len(), 4);
        assert_eq!(view.last_error(), Some("connection refused"));
        assert!(!view.is_loading());
    }

    #[test]
    fn test_remove_country_only_touches_working_copy() {
        let mut view = view(2);
        loaded(&mut view, numbered(5));
        view.apply(ListEvent::PageRequested(3));

        view.apply(ListEvent::CountryRemoved("C00".to_string()));

        assert_eq!(view.countries().len(), 4);
        assert_eq!(view.pagination().current_page(), 1);
        assert!(view.countries().iter().all(|c| c.cca3 != "C00"));
    }

    #[test]
    fn test_viewport_resize_changes_page_size() {
        let mut view = view(6);
        loaded(&mut view, numbered(30));
        view.apply(ListEvent::PageRequested(5));

        view.apply(ListEvent::ViewportResized(1200));

        assert_eq!(view.pagination().page_size().get(), 12);
        assert_eq!(view.pagination().current_page(), 3);
    }

    #[test]
    fn test_previous_page_stops_at_first() {
        let mut view = view(6);
        loaded(&mut view, numbered(30));

        view.apply(ListEvent::PreviousPage);
        assert_eq!(view.page().current_page, 1);
    }

    // ============================================================================
    // DetailLoader tests
    // ============================================================================

    fn with_borders(code: &str, name: &str, borders: &[&str]) -> Country {
        let mut country = country(code, name, "Europe");
        country.borders = borders.iter().map(|b| b.to_string()).collect();
        country
    }

    fn name_ticket(effect: DetailEffect) -> RequestTicket {
        match effect {
            DetailEffect::FetchByName { ticket, .. } => ticket,
            other => panic!("expected a name fetch, got {other:?}"),
        }
    }

    fn border_ticket(progress: Option<DetailProgress>) -> (RequestTicket, Vec<String>) {
        match progress {
            Some(DetailProgress::Fetch(DetailEffect::FetchBorders { ticket, codes })) => {
                (ticket, codes)
            }
            other => panic!("expected a border fetch, got {other:?}"),
        }
    }

    #[test]
    fn test_detail_lookup_runs_name_then_borders() {
        let mut loader = DetailLoader::new();
        let ticket = name_ticket(loader.request("Germany"));

        let (ticket, codes) = border_ticket(
            loader.country_loaded(ticket, Ok(with_borders("DEU", "Germany", &["AUT", "FRA"]))),
        );
        assert_eq!(codes, vec!["AUT", "FRA"]);
        assert!(loader.is_loading());

        let progress = loader.borders_loaded(ticket, vec![country("AUT", "Austria", "Europe")]);

        match progress {
            Some(DetailProgress::Ready { country, borders }) => {
                assert_eq!(country.cca3, "DEU");
                assert_eq!(borders.len(), 1);
            }
            other => panic!("expected a ready detail, got {other:?}"),
        }
        assert!(!loader.is_loading());
    }

    #[test]
    fn test_detail_lookup_superseded_by_name_is_discarded() {
        let mut loader = DetailLoader::new();
        let first = name_ticket(loader.request("Germany"));
        let second = name_ticket(loader.request("France"));

        assert!(loader
            .country_loaded(first, Ok(with_borders("DEU", "Germany", &[])))
            .is_none());
        assert!(loader
            .country_loaded(second, Ok(with_borders("FRA", "France", &[])))
            .is_some());
    }

    #[test]
    fn test_border_batch_of_superseded_lookup_is_discarded() {
        let mut loader = DetailLoader::new();
        let ticket = name_ticket(loader.request("Germany"));
        let (borders, _) = border_ticket(
            loader.country_loaded(ticket, Ok(with_borders("DEU", "Germany", &["AUT"]))),
        );

        let next = name_ticket(loader.request("France"));

        assert!(loader
            .borders_loaded(borders, vec![country("AUT", "Austria", "Europe")])
            .is_none());
        assert!(loader.is_loading());
        assert!(loader
            .country_loaded(next, Ok(with_borders("FRA", "France", &[])))
            .is_some());
    }

    #[test]
    fn test_detail_lookup_failure_is_reported() {
        let mut loader = DetailLoader::new();
        let ticket = name_ticket(loader.request("Atlantis"));

        let progress = loader.country_loaded(ticket, Err("Country not found: Atlantis".to_string()));

        assert_eq!(
            progress,
            Some(DetailProgress::Failed("Country not found: Atlantis".to_string()))
        );
        assert!(!loader.is_loading());
    }
}
