//! Subreddit Search library.
//!
//! A service that pulls the newest posts of a fixed list of subreddits into
//! a local SQLite store with a full-text index, and serves a keyword search
//! web UI that fetches top comments for each result on demand.

// Allow raw string hashes for safety - they're harmless and prevent issues if content changes
#![allow(clippy::needless_raw_string_hashes)]

pub mod components;
pub mod config;
pub mod constants;
pub mod db;
pub mod ingest;
pub mod maintenance;
pub mod reddit;
pub mod search;
pub mod web;
