//! # Fedicat
//!
//! Print Mastodon statuses and user timelines as wrapped plain text.
//!
//! ## Architecture
//!
//! ```text
//! Address → Matcher → Request → Fetcher (paginated) → Renderer → Output
//! ```
//!
//! - [`address`]: Turns typed addresses into field descriptors
//! - [`fetcher`]: HTTP access, `Link` header pagination, fetch budget
//! - [`richtext`]: Status HTML to wrapped text with link annotations
//! - [`render`]: Text blocks for whole statuses
//! - [`output`]: Stdout or pager, blank-line squeezing
//!
//! ## Quick Start
//!
//! ```bash
//! # A single status and its replies
//! fedicat https://mastodon.social/@Gargron/1
//!
//! # The latest 10 statuses of an account
//! fedicat --limit 10 @Gargron@mastodon.social
//!
//! # Only statuses with media
//! fedicat https://mastodon.social/@Gargron/media
//! ```

/// Address templates and matching.
///
/// [`Matcher::standard`](address::Matcher::standard) knows status URLs,
/// profile URLs and `@user@domain` handles.
pub mod address;

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together configuration
/// and the fetcher.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/fedicat/config.toml`.
pub mod config;

/// Helpers over raw status records.
pub mod domain;

/// HTTP fetching and pagination.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for GET requests
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`Timeline`](fetcher::Timeline): Budgeted walk over a user's statuses
pub mod fetcher;

/// Output stream handling.
pub mod output;

/// Rendering of whole statuses.
pub mod render;

/// HTML status content to plain text.
pub mod richtext;
