//! Text blocks for single statuses.

use serde_json::Value;

use crate::domain::post::text;
use crate::domain::{format_timestamp, normalize_language, Post};
use crate::richtext::{self, draw_link, LinkStyle};

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub width: usize,
    pub links: LinkStyle,
    /// Instance the status was fetched from. Needed to build reply links.
    pub domain: Option<&'a str>,
}

/// Render one status. Absent fields are skipped.
pub fn render_post(post: &Post, pinned: bool, options: &RenderOptions<'_>) -> String {
    let mut out = String::new();
    let link = |url: &str| draw_link(url, options.links);

    if let Some(url) = text(post, "url").or_else(|| text(post, "uri")) {
        out.push_str(&format!("{}\n", link(url)));
    }

    if let (Some(domain), Some(reply_to)) = (options.domain, text(post, "in_reply_to_id")) {
        let url = format!("https://{domain}/web/statuses/{reply_to}");
        out.push_str(&format!("In reply to: {}\n", link(&url)));
    }

    if pinned {
        out.push_str("Pinned\n");
    }

    if let Some(account) = post.get("account") {
        let name = text(account, "display_name")
            .or_else(|| text(account, "acct"))
            .unwrap_or("(unknown)");
        match text(account, "url") {
            Some(url) => out.push_str(&format!("From: {} {}\n", name, link(url))),
            None => out.push_str(&format!("From: {name}\n")),
        }
    }

    if let Some(created) = text(post, "created_at") {
        out.push_str(&format!("Date: {}\n", format_timestamp(created)));
    }

    let language = normalize_language(text(post, "language"));
    if language != "en" {
        out.push_str(&format!("Language: {language}\n"));
    }

    match post.get("reblog").filter(|r| r.is_object()) {
        Some(original) => {
            out.push_str("Reblog of:\n");
            let nested = RenderOptions {
                domain: None,
                ..*options
            };
            out.push_str(&render_post(original, false, &nested));
        }
        None => {
            out.push('\n');
            if let Some(content) = text(post, "content") {
                out.push_str(&richtext::render(content, options.width, options.links));
            }
        }
    }

    for attachment in post
        .get("media_attachments")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        if let Some(url) = text(attachment, "url") {
            out.push_str(&format!("Media: {}\n", link(url)));
        }
        if let Some(description) = text(attachment, "description") {
            for line in description.lines() {
                for wrapped in richtext::wrap(line, options.width) {
                    out.push_str(&wrapped);
                    out.push('\n');
                }
            }
        }
        out.push('\n');
    }

    out
}
