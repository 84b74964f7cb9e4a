/// Data layer: catalog fetch, tables, typed records, filtering, aggregation.
///
/// Architecture:
/// ```text
///  CKAN package_show ──► resources ──► datastore/dump/{id} (CSV, per resource)
///                                              │
///                                              ▼
///                                       ┌────────────┐
///                                       │  loader     │  CSV text → Table
///                                       └────────────┘
///                                              │
///                                              ▼
///                                       ┌────────────┐
///                                       │ harmonize   │  rename synonym columns
///                                       └────────────┘
///                                              │
///                                              ▼
///   local LTC CSVs (latin-1) ──►        ┌────────────┐
///                                       │  DataFrame  │  diagonal concat, text columns
///                                       └────────────┘
///                                              │
///                                              ▼
///                                       ┌────────────┐
///                                       │  schema     │  DataFrame → typed records
///                                       └────────────┘
///                                              │
///                                              ▼
///                                  filter ──► aggregate ──► charts / CSV
/// ```

pub mod aggregate;
pub mod catalog;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod harmonize;
pub mod loader;
pub mod model;
pub mod schema;
pub mod sources;
pub mod transport;
