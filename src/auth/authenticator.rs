//! Authenticator implementation
//!
//! Runs the bootstrap steps of an endpoint and collects the resulting
//! headers. Requests go through the same [`HttpClient`] as the paginated
//! fetch, so cookies set by a landing page carry over.

use super::types::AuthStep;
use crate::error::{Error, Result};
use crate::extract::extract_scalar;
use crate::http::{Deadline, HttpClient, HttpRequest};
use crate::types::StringMap;
use regex::Regex;
use tracing::{info, warn};

/// Shortest token prefix shown in logs
const TOKEN_PREVIEW: usize = 5;

/// Runs bootstrap steps against an HTTP client
#[derive(Debug)]
pub struct Authenticator<'a> {
    client: &'a HttpClient,
    base_headers: &'a StringMap,
}

impl<'a> Authenticator<'a> {
    /// Create an authenticator that sends `base_headers` with every step
    pub fn new(client: &'a HttpClient, base_headers: &'a StringMap) -> Self {
        Self {
            client,
            base_headers,
        }
    }

    /// Run one step, returning the header value it produced (if any)
    pub async fn run(
        &self,
        step: &AuthStep,
        deadline: Option<&Deadline>,
    ) -> Result<Option<String>> {
        match step {
            AuthStep::JsonToken {
                url,
                method,
                headers,
                body,
                token_path,
                prefix,
                ..
            } => {
                let mut request = HttpRequest {
                    method: *method,
                    url: url.clone(),
                    headers: self.base_headers.clone(),
                    body: body.clone(),
                    ..Default::default()
                };
                request.headers.extend(headers.clone());

                let json = self.client.send_json(&request, deadline).await?;
                let token = extract_scalar(&json, token_path)?
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| {
                        Error::token_not_found(url, format!("no value at '{token_path}'"))
                    })?;

                info!("Obtained {} for {}: {}...", step.header(), url, preview(&token));
                Ok(Some(format!("{}{token}", prefix.as_deref().unwrap_or(""))))
            }

            AuthStep::HtmlToken {
                url,
                pattern,
                required,
                ..
            } => {
                let regex = Regex::new(pattern)
                    .map_err(|e| Error::invalid_value("auth.pattern", e.to_string()))?;

                let mut request = HttpRequest::get(url.clone());
                request.headers = self.base_headers.clone();
                let page = self.client.send(&request, deadline).await?;

                match regex
                    .captures(&page.body)
                    .and_then(|cap| cap.get(1))
                    .map(|m| m.as_str().to_string())
                {
                    Some(token) => {
                        info!("Obtained {} from {}: {}...", step.header(), url, preview(&token));
                        Ok(Some(token))
                    }
                    None if *required => Err(Error::token_not_found(
                        url,
                        format!("pattern '{pattern}' did not match"),
                    )),
                    None => {
                        warn!("Could not find {} on {}", step.header(), url);
                        Ok(None)
                    }
                }
            }
        }
    }
}

/// Run all steps in order and collect the harvested headers
pub async fn resolve_headers(
    steps: &[AuthStep],
    client: &HttpClient,
    base_headers: &StringMap,
    deadline: Option<&Deadline>,
) -> Result<StringMap> {
    let mut headers = base_headers.clone();
    let mut harvested = StringMap::new();

    for step in steps {
        let authenticator = Authenticator::new(client, &headers);
        if let Some(value) = authenticator.run(step, deadline).await? {
            harvested.insert(step.header().to_string(), value);
        }
        // Later steps see tokens from earlier ones
        headers.extend(harvested.clone());
    }

    Ok(harvested)
}

fn preview(token: &str) -> &str {
    let mut end = TOKEN_PREVIEW.min(token.len());
    while !token.is_char_boundary(end) {
        end -= 1;
    }
    &token[..end]
}
