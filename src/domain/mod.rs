pub mod post;

pub use post::{format_timestamp, normalize_language, Post};
