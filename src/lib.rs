//! reelshelf: a cache-fronted catalog service.
//!
//! Paginated listings are served through a lookaside cache keyed by the
//! canonical query parameters; ratings are written straight to the store and
//! recommendations are sampled at random on every call.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
