//! Flattens a parsed HTML fragment back into a start/text/end token stream.
//!
//! `tl` builds the tree. The walk emits tokens in document order, so
//! handlers see the same sequence a streaming tokenizer would give them.
//! Comments are skipped. `tl` leaves entities alone, so text and attribute
//! values are decoded here.

use html_escape::decode_html_entities;
use tl::{Node, NodeHandle, ParserOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    Text(String),
}

impl Token {
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Token::Start { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }
}

enum Visit {
    Node(NodeHandle),
    Close(String),
}

/// Tokenize `html`. Tag and attribute names are lowercased.
pub fn tokenize(html: &str) -> Vec<Token> {
    let dom = match tl::parse(html, ParserOptions::default()) {
        Ok(dom) => dom,
        Err(e) => {
            tracing::warn!("unparseable status content: {:?}", e);
            return vec![Token::Text(decode_html_entities(html).into_owned())];
        }
    };
    let parser = dom.parser();

    let mut tokens = Vec::new();
    let mut stack: Vec<Visit> = dom.children().iter().rev().copied().map(Visit::Node).collect();

    while let Some(visit) = stack.pop() {
        let handle = match visit {
            Visit::Close(name) => {
                tokens.push(Token::End { name });
                continue;
            }
            Visit::Node(handle) => handle,
        };

        match handle.get(parser) {
            Some(Node::Tag(tag)) => {
                let name = tag.name().as_utf8_str().to_ascii_lowercase();
                let attrs = tag
                    .attributes()
                    .iter()
                    .map(|(key, value)| {
                        let value = value
                            .map(|v| decode_html_entities(&v).into_owned())
                            .unwrap_or_default();
                        (key.to_ascii_lowercase(), value)
                    })
                    .collect();
                tokens.push(Token::Start {
                    name: name.clone(),
                    attrs,
                });

                stack.push(Visit::Close(name));
                let children: Vec<NodeHandle> = tag.children().top().iter().copied().collect();
                stack.extend(children.into_iter().rev().map(Visit::Node));
            }
            Some(Node::Raw(bytes)) => {
                let text = decode_html_entities(&bytes.as_utf8_str()).into_owned();
                tokens.push(Token::Text(text));
            }
            Some(Node::Comment(_)) | None => {}
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str, attrs: &[(&str, &str)]) -> Token {
        Token::Start {
            name: name.into(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn without_ends(tokens: Vec<Token>) -> Vec<Token> {
        tokens
            .into_iter()
            .filter(|t| !matches!(t, Token::End { .. }))
            .collect()
    }

    #[test]
    fn test_tags_and_text() {
        assert_eq!(
            tokenize(r#"<p>Hi <a href="https://x.test/" class="u-url mention">@bob</a></p>"#),
            vec![
                start("p", &[]),
                Token::Text("Hi ".into()),
                start("a", &[("href", "https://x.test/"), ("class", "u-url mention")]),
                Token::Text("@bob".into()),
                Token::End { name: "a".into() },
                Token::End { name: "p".into() },
            ]
        );
    }

    #[test]
    fn test_line_breaks_and_case() {
        assert_eq!(
            without_ends(tokenize("<P>a<BR/>b<br></P>")),
            vec![
                start("p", &[]),
                Token::Text("a".into()),
                start("br", &[]),
                Token::Text("b".into()),
                start("br", &[]),
            ]
        );
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(
            tokenize(r#"<a href="/?a=1&amp;b=2">1 &lt; 2 &amp;&#32;3</a>"#)[..2],
            [
                start("a", &[("href", "/?a=1&b=2")]),
                Token::Text("1 < 2 & 3".into()),
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            tokenize("<!-- x -->a"),
            vec![Token::Text("a".into())]
        );
    }

    #[test]
    fn test_document_order_through_nesting() {
        let texts: Vec<Token> = tokenize("<p>1<span>2<b>3</b>4</span>5</p>")
            .into_iter()
            .filter(|t| matches!(t, Token::Text(_)))
            .collect();
        let joined: String = texts
            .iter()
            .map(|t| match t {
                Token::Text(s) => s.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(joined, "12345");
    }

    #[test]
    fn test_attr_lookup() {
        let tokens = tokenize(r#"<a title="t" href="u">x</a>"#);
        assert_eq!(tokens[0].attr("href"), Some("u"));
        assert_eq!(tokens[0].attr("rel"), None);
        assert_eq!(tokens[1].attr("href"), None);
    }
}
