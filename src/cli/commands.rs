use crate::address::AddressDescriptor;
use crate::app::{AppContext, FedicatError, Result};
use crate::fetcher::{fetch_status_thread, FetchBudget, Timeline, TimelineRequest};
use crate::output::Output;
use crate::render::{render_post, RenderOptions};
use crate::richtext::LinkStyle;

/// What an address asks for.
#[derive(Debug, Clone)]
pub enum Request {
    Thread {
        domain: String,
        ident: String,
        context: bool,
    },
    Timeline(TimelineRequest),
}

impl Request {
    /// Route a matched address by which fields it carries.
    pub fn from_descriptor(descriptor: &AddressDescriptor, budget: FetchBudget) -> Result<Self> {
        let unsupported = || {
            FedicatError::UnsupportedAddress(format!("{:?}", descriptor.fields()))
        };
        let domain = descriptor.domain().ok_or_else(unsupported)?.to_string();

        if let Some(ident) = descriptor.ident() {
            return Ok(Request::Thread {
                domain,
                ident: ident.to_string(),
                context: !descriptor.flag("embed"),
            });
        }

        let account = descriptor.user().ok_or_else(unsupported)?.to_string();
        Ok(Request::Timeline(TimelineRequest {
            domain,
            account,
            replies: descriptor.flag("with_replies"),
            media: descriptor.flag("media"),
            budget,
        }))
    }
}

pub async fn run(ctx: &AppContext, request: Request, out: &mut Output, links: LinkStyle) -> Result<()> {
    match request {
        Request::Thread {
            domain,
            ident,
            context,
        } => print_thread(ctx, &domain, &ident, context, out, links).await,
        Request::Timeline(request) => print_timeline(ctx, request, out, links).await,
    }
}

async fn print_thread(
    ctx: &AppContext,
    domain: &str,
    ident: &str,
    context: bool,
    out: &mut Output,
    links: LinkStyle,
) -> Result<()> {
    let thread = fetch_status_thread(ctx.fetcher.as_ref(), domain, ident, context).await?;
    let options = RenderOptions {
        width: ctx.config.width,
        links,
        domain: Some(domain),
    };

    out.write_block(&render_post(&thread.status, false, &options))?;
    out.write_block("\n")?;
    for post in thread.descendants.iter().flatten() {
        out.write_block(&render_post(post, false, &options))?;
        out.write_block("\n")?;
    }
    Ok(())
}

async fn print_timeline(
    ctx: &AppContext,
    request: TimelineRequest,
    out: &mut Output,
    links: LinkStyle,
) -> Result<()> {
    let domain = request.domain.clone();
    let options = RenderOptions {
        width: ctx.config.width,
        links,
        domain: Some(&domain),
    };

    let mut timeline = Timeline::open(ctx.fetcher.as_ref(), request).await?;
    while let Some(page) = timeline.next_page().await? {
        for post in &page.posts {
            out.write_block(&render_post(post, page.pinned, &options))?;
            out.write_block("\n")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::address::Matcher;
    use crate::config::Config;
    use crate::fetcher::{FetchResponse, Fetcher};

    struct StaticFetcher(HashMap<String, (Value, Option<String>)>);

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn get(&self, url: &str) -> Result<FetchResponse> {
            let (body, link) = self.0.get(url).cloned().ok_or_else(|| {
                FedicatError::UnexpectedResponse {
                    url: url.to_string(),
                    reason: "not mocked".into(),
                }
            })?;
            let mut headers = HashMap::new();
            if let Some(link) = link {
                headers.insert("link".to_string(), link);
            }
            Ok(FetchResponse {
                url: url.to_string(),
                body: body.to_string().into_bytes(),
                headers,
            })
        }
    }

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn status(id: &str, content: &str) -> Value {
        json!({
            "id": id,
            "url": format!("https://m.test/@bob/{id}"),
            "created_at": "2024-01-02T03:04:05.000Z",
            "content": content,
            "account": {"acct": "bob", "display_name": "Bob", "url": "https://m.test/@bob"},
        })
    }

    fn route(address: &str) -> Result<Request> {
        let descriptor = Matcher::standard().parse(address).unwrap();
        Request::from_descriptor(&descriptor, FetchBudget::limited(40))
    }

    async fn run_with(
        responses: Vec<(&str, Value, Option<&str>)>,
        request: Request,
    ) -> (Result<()>, String) {
        let fetcher = StaticFetcher(
            responses
                .into_iter()
                .map(|(u, b, l)| (u.to_string(), (b, l.map(String::from))))
                .collect(),
        );
        let ctx = AppContext::with_fetcher(Config::default(), Arc::new(fetcher));
        let buffer = Buffer::default();
        let mut out = Output::to_writer(Box::new(buffer.clone()));

        let result = run(&ctx, request, &mut out, LinkStyle::Plain).await;
        out.finish().unwrap();
        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        (result, text)
    }

    #[test]
    fn test_route_status() {
        match route("https://m.test/@bob/5").unwrap() {
            Request::Thread {
                domain,
                ident,
                context,
            } => {
                assert_eq!(domain, "m.test");
                assert_eq!(ident, "5");
                assert!(context);
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            route("https://m.test/@bob/5/embed").unwrap(),
            Request::Thread { context: false, .. }
        ));
    }

    #[test]
    fn test_route_timeline() {
        match route("https://m.test/@bob/media").unwrap() {
            Request::Timeline(request) => {
                assert_eq!(request.account, "bob");
                assert!(request.media);
                assert!(!request.replies);
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            route("@bob@m.test").unwrap(),
            Request::Timeline(TimelineRequest { replies: false, media: false, .. })
        ));
        assert!(matches!(
            route("https://m.test/@bob/with_replies").unwrap(),
            Request::Timeline(TimelineRequest { replies: true, .. })
        ));
    }

    #[test]
    fn test_route_requires_user_or_ident() {
        let descriptor = Matcher::compile(&["DOMAIN"]).unwrap().parse("m.test").unwrap();
        let err = Request::from_descriptor(&descriptor, FetchBudget::limited(1)).unwrap_err();
        assert!(matches!(err, FedicatError::UnsupportedAddress(_)));
    }

    #[tokio::test]
    async fn test_thread_output() {
        let (result, text) = run_with(
            vec![
                (
                    "https://m.test/api/v1/statuses/5",
                    status("5", "<p>first</p>"),
                    None,
                ),
                (
                    "https://m.test/api/v1/statuses/5/context",
                    json!({"ancestors": [], "descendants": [status("6", "<p>reply</p>")]}),
                    None,
                ),
            ],
            route("https://m.test/@bob/5").unwrap(),
        )
        .await;

        result.unwrap();
        assert_eq!(
            text,
            concat!(
                "<https://m.test/@bob/5>\n",
                "From: Bob <https://m.test/@bob>\n",
                "Date: 2024-01-02 03:04:05Z\n",
                "\n",
                "first\n",
                "\n",
                "<https://m.test/@bob/6>\n",
                "From: Bob <https://m.test/@bob>\n",
                "Date: 2024-01-02 03:04:05Z\n",
                "\n",
                "reply\n",
                "\n",
            )
        );
    }

    #[tokio::test]
    async fn test_timeline_output_keeps_pages_before_failure() {
        let statuses = "https://m.test/api/v1/accounts/9/statuses";
        let first = format!("{statuses}?exclude_replies=true&limit=40");
        let pinned = format!("{statuses}?pinned=true");
        let (result, text) = run_with(
            vec![
                (
                    "https://m.test/api/v1/accounts/lookup?acct=bob",
                    json!({"id": "9"}),
                    None,
                ),
                (pinned.as_str(), json!([status("1", "<p>pinned one</p>")]), None),
                (
                    first.as_str(),
                    json!([status("2", "<p>regular</p>")]),
                    Some(r#"<https://elsewhere.test/next>; rel="next""#),
                ),
            ],
            route("@bob@m.test").unwrap(),
        )
        .await;

        assert!(matches!(result, Err(FedicatError::SuspiciousContinuation(_))));
        assert!(text.contains("Pinned\n"));
        assert!(text.contains("pinned one\n"));
        assert!(text.contains("regular\n"));
        assert_eq!(text.matches("Pinned").count(), 1);
    }
}
