//! Status content to wrapped plain text.
//!
//! ```text
//! HTML → tokenize → ParseState (paragraphs + link sentinels) → wrap → resolve links
//! ```
//!
//! Links are carried through wrapping as `STX href ETX` spans so the wrapper
//! never breaks a URL; the spans are replaced with `<href>` only after every
//! line has been wrapped.

pub mod tokenizer;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use textwrap::{Options, WordSeparator, WordSplitter, WrapAlgorithm};

use tokenizer::{tokenize, Token};

const STX: char = '\u{2}';
const ETX: char = '\u{3}';

static SENTINELS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x02\x03]+").expect("valid sentinel regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static LINK_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\x02(.*?)\x03").expect("valid link span regex"));

/// How resolved links are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStyle {
    /// `<url>`
    #[default]
    Plain,
    /// `<url>` with the URL overstruck for underlining, for terminal pagers.
    Underline,
}

/// Convert an HTML fragment into paragraphs wrapped at `width` columns.
pub fn render(html: &str, width: usize, style: LinkStyle) -> String {
    let paragraphs = ParseState::scan(html);

    let mut out = String::new();
    for paragraph in &paragraphs {
        for line in paragraph.split('\n') {
            for wrapped in wrap(line, width) {
                out.push_str(&wrapped);
                out.push('\n');
            }
        }
        out.push('\n');
    }

    resolve_links(&out, style)
}

/// Word-wrap one line without splitting words.
pub fn wrap(line: &str, width: usize) -> Vec<String> {
    let options = Options::new(width.max(1))
        .break_words(false)
        .word_separator(WordSeparator::AsciiSpace)
        .word_splitter(WordSplitter::NoHyphenation)
        .wrap_algorithm(WrapAlgorithm::FirstFit);
    textwrap::wrap(line, options)
        .into_iter()
        .map(|cow| cow.into_owned())
        .collect()
}

/// Replace every sentinel span with its drawn URL. Spans may have been
/// broken across lines by wrapping.
fn resolve_links(text: &str, style: LinkStyle) -> String {
    LINK_SPAN
        .replace_all(text, |caps: &Captures| {
            let url: String = caps[1].chars().filter(|c| *c != '\n').collect();
            draw_link(&url, style)
        })
        .into_owned()
}

/// `<url>`, overstruck per character when `style` asks for underlining.
pub fn draw_link(url: &str, style: LinkStyle) -> String {
    match style {
        LinkStyle::Plain => format!("<{url}>"),
        LinkStyle::Underline => {
            let underlined: String = url.chars().flat_map(|c| [c, '\u{8}', '_']).collect();
            format!("<{underlined}>")
        }
    }
}

/// Scanner state for one document.
#[derive(Debug, Default)]
struct ParseState {
    paragraphs: Vec<String>,
    text: String,
    link_text: String,
    href: String,
    depth: usize,
}

impl ParseState {
    fn scan(html: &str) -> Vec<String> {
        let mut state = Self::default();
        for token in tokenize(html) {
            match &token {
                Token::Start { name, .. } => match name.as_str() {
                    "p" => state.paragraph_start(),
                    "br" => state.line_break(),
                    "a" => state.anchor_start(token.attr("href").unwrap_or("")),
                    _ => {}
                },
                Token::End { name } if name == "a" => state.anchor_end(),
                Token::End { .. } => {}
                Token::Text(data) => state.data(data),
            }
        }
        state.paragraph_start();
        state.paragraphs
    }

    fn paragraph_start(&mut self) {
        if self.depth > 0 {
            self.depth = 1;
            self.anchor_end();
        }
        let paragraph = std::mem::take(&mut self.text);
        let paragraph = paragraph.trim_matches(' ');
        if !paragraph.trim().is_empty() {
            self.paragraphs.push(paragraph.to_string());
        }
    }

    fn line_break(&mut self) {
        if self.depth > 0 {
            self.link_text.push(' ');
        } else {
            self.text.push('\n');
        }
    }

    fn anchor_start(&mut self, href: &str) {
        self.depth += 1;
        if self.depth == 1 {
            self.href = href.to_string();
            self.link_text.clear();
        }
    }

    fn anchor_end(&mut self) {
        if self.depth == 0 {
            return;
        }
        self.depth -= 1;
        if self.depth > 0 {
            return;
        }

        let link_text = std::mem::take(&mut self.link_text);
        let link_text = WHITESPACE.replace_all(link_text.trim(), " ");
        let href = std::mem::take(&mut self.href);
        if link_text != href {
            self.text.push('[');
            self.text.push_str(&link_text);
            self.text.push(']');
        }
        self.text.push(STX);
        self.text.push_str(&href);
        self.text.push(ETX);
    }

    fn data(&mut self, data: &str) {
        let data = SENTINELS.replace_all(data, "\u{FFFD}");
        let data = WHITESPACE.replace_all(&data, " ");
        if self.depth > 0 {
            self.link_text.push_str(&data);
        } else {
            self.text.push_str(&data);
        }
    }
}
