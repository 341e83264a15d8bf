use std::time::Duration;

pub use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
pub use reqwest::Client as HttpClient;
pub use reqwest::ClientBuilder as HttpClientBuilder;

/// Renders `name=value` pairs as a single `Cookie` header value.
pub fn cookie_header<'a, I>(cookies: I) -> Result<Option<HeaderValue>, InvalidHeaderValue>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let joined = cookies
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("; ");
    if joined.is_empty() {
        return Ok(None);
    }
    HeaderValue::from_str(&joined).map(Some)
}

pub fn client_builder(headers: HeaderMap, timeout: Option<Duration>) -> HttpClientBuilder {
    let builder = HttpClientBuilder::new().default_headers(headers);
    match timeout {
        Some(t) => builder.timeout(t),
        None => builder,
    }
}
