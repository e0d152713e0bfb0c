//! Common utilities for the Koala inline layout engine.
//!
//! This crate provides shared infrastructure used by the layout crates:
//! - **Warning System** - deduplicated reports of layout fallbacks

pub mod warning;
