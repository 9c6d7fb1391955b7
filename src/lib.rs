//! Marketplace deal monitor for musical gear.
//!
//! Each watch is scraped, cleaned, extracted into typed listings, filtered
//! against its criteria, and alerted at most once per open issue.

pub mod config;
pub mod error;
pub mod extraction;
pub mod matcher;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod parsers;
pub mod scrapers;
pub mod utils;
