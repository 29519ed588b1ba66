//! Address matching.
//!
//! Users type addresses in many shapes: full status URLs copied from a
//! browser, profile URLs, `@user@domain` handles. Each accepted shape is
//! declared once as a template and compiled into an anchored regex:
//!
//! ```text
//! https://DOMAIN/@USER/NNNNNN  →  ^https://(?P<domain>[^/]+)(?:/web)?/@(?P<user>[^/]+)/(?P<ident>[0-9]+)$
//! ```
//!
//! Every [`AddressDescriptor`] carries the union of all template fields,
//! so callers only look at which fields are set.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Templates in priority order. The first full match wins.
pub const DEFAULT_TEMPLATES: &[&str] = &[
    "https://DOMAIN/@USER/NNNNNN/embed",
    "https://DOMAIN/@USER/NNNNNN",
    "https://DOMAIN/@USER/with_replies",
    "https://DOMAIN/@USER/media",
    "https://DOMAIN/@USER",
    "https://DOMAIN/users/USER/statuses/NNNNNN",
    "https://DOMAIN/users/USER",
    "https://DOMAIN/statuses/NNNNNN",
    "DOMAIN/@USER/NNNNNN",
    "DOMAIN/@USER",
    "@USER@DOMAIN",
    "USER@DOMAIN",
];

/// Path prefix used by the Mastodon web client, tolerated after the domain.
const CLIENT_PREFIX: &str = "/web";

/// Literal tokens that are captured under their own name. A non-null value
/// means the flag is set.
const FLAGS: &[&str] = &["with_replies", "media", "embed"];

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid word regex"));

static DEFAULT_MATCHER: Lazy<Matcher> = Lazy::new(|| {
    Matcher::compile(DEFAULT_TEMPLATES).expect("default address templates compile")
});

/// Placeholder name to (field name, regex class).
fn placeholder(token: &str) -> Option<(&'static str, &'static str)> {
    match token {
        "DOMAIN" => Some(("domain", "[^/]+")),
        "USER" => Some(("user", "[^/]+")),
        "NNNNNN" => Some(("ident", "[0-9]+")),
        _ => None,
    }
}

#[derive(Debug)]
struct CompiledTemplate {
    source: String,
    regex: Regex,
}

/// An ordered set of compiled address templates.
#[derive(Debug)]
pub struct Matcher {
    templates: Vec<CompiledTemplate>,
    fields: Vec<String>,
}

impl Matcher {
    /// The matcher for [`DEFAULT_TEMPLATES`], compiled on first use.
    pub fn standard() -> &'static Matcher {
        &DEFAULT_MATCHER
    }

    /// Compile `templates` in order. Fails when a template repeats a
    /// placeholder or flag, since each becomes a named capture group.
    pub fn compile<S: AsRef<str>>(templates: &[S]) -> Result<Self, regex::Error> {
        let mut fields: Vec<String> = Vec::new();
        let compiled = templates
            .iter()
            .map(|template| -> Result<CompiledTemplate, regex::Error> {
                let source = template.as_ref();
                let (pattern, names) = translate(source);
                for name in names {
                    if !fields.contains(&name) {
                        fields.push(name);
                    }
                }
                Ok(CompiledTemplate {
                    source: source.to_string(),
                    regex: Regex::new(&pattern)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            templates: compiled,
            fields,
        })
    }

    /// Every field name a descriptor from this matcher carries.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Match `address` against the templates in order.
    ///
    /// Returns `None` when no template matches the whole input.
    pub fn parse(&self, address: &str) -> Option<AddressDescriptor> {
        for template in &self.templates {
            let Some(caps) = template.regex.captures(address) else {
                continue;
            };
            tracing::debug!("address {:?} matched template {}", address, template.source);

            let fields = self
                .fields
                .iter()
                .map(|name| {
                    let value = caps.name(name).map(|m| m.as_str().to_string());
                    (name.clone(), value)
                })
                .collect();
            return Some(AddressDescriptor { fields });
        }
        None
    }
}

/// Translate one template into an anchored regex and the fields it captures.
fn translate(template: &str) -> (String, Vec<String>) {
    let mut pattern = String::from("^");
    let mut names = Vec::new();
    let mut cursor = 0;

    for token in WORD.find_iter(template) {
        pattern.push_str(&regex::escape(&template[cursor..token.start()]));
        cursor = token.end();
        let word = token.as_str();

        if word == "https" && token.start() == 0 {
            pattern.push_str(word);
        } else if let Some((field, class)) = placeholder(word) {
            pattern.push_str(&format!("(?P<{field}>{class})"));
            names.push(field.to_string());
            if field == "domain" && template[cursor..].starts_with('/') {
                pattern.push_str(&format!("(?:{})?", regex::escape(CLIENT_PREFIX)));
            }
        } else if FLAGS.contains(&word) {
            pattern.push_str(&format!("(?P<{word}>{})", regex::escape(word)));
            names.push(word.to_string());
        } else {
            pattern.push_str(&regex::escape(word));
        }
    }
    pattern.push_str(&regex::escape(&template[cursor..]));
    pattern.push('$');

    (pattern, names)
}

/// Result of a successful address match.
///
/// Holds every field known to the matcher; fields the winning template did
/// not capture are present with a `None` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDescriptor {
    fields: BTreeMap<String, Option<String>>,
}

impl AddressDescriptor {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_deref())
    }

    pub fn fields(&self) -> &BTreeMap<String, Option<String>> {
        &self.fields
    }

    pub fn domain(&self) -> Option<&str> {
        self.get("domain")
    }

    pub fn user(&self) -> Option<&str> {
        self.get("user")
    }

    pub fn ident(&self) -> Option<&str> {
        self.get("ident")
    }

    pub fn flag(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}
