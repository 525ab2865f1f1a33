//! Core library for countries
//!
//! This crate implements the **Functional Core** of the countries application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`countries_core`** (this crate): filtering, pagination, favorites and
//!   session logic over data that has already been fetched
//! - **`countries`**: HTTP access to the REST Countries API, the CLI and the
//!   interactive browser (the Imperative Shell)
//!
//! Everything here is synchronous. The only I/O is the [`storage`] module,
//! which the [`session`] store uses to persist the current identity and the
//! favorites index.
//!
//! # Module Organization
//!
//! - [`country`]: Country records and their summary/detail outputs
//! - [`filter`]: Search text and region filtering
//! - [`pagination`]: Page slicing, page window and page-size policy
//! - [`favorites`]: Per-identity favorite codes
//! - [`listing`]: List and favorites view outputs
//! - [`storage`]: Durable key-value storage
//! - [`session`]: Identity, login/logout and favorite toggling
//! - [`requests`]: Supersession of in-flight requests
//! - [`browser`]: Event-driven list view and detail lookup state machines
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use countries_core::filter::filter_countries;
//! use countries_core::pagination::{page_size_for_width, paginate};
//!
//! let filtered = filter_countries(&countries, "united", None);
//! let page = paginate(&filtered, page_size_for_width(1024), 2);
//!
//! assert_eq!(page.page_size, 12);
//! ```

pub mod browser;
pub mod country;
pub mod favorites;
pub mod filter;
pub mod listing;
pub mod pagination;
pub mod requests;
pub mod session;
pub mod storage;
