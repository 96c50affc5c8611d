//! Per-call query context
//!
//! Extra header values attached to a single request. The CMS controls
//! content shaping through `X-` headers rather than query parameters.

use reqwest::RequestBuilder;

/// Optional per-call request headers.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    flatten: bool,
    unpublished: bool,
    languages: Vec<String>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the service to flatten single-invariant field objects into
    /// plain values.
    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    /// Include unpublished content in results.
    pub fn unpublished(mut self) -> Self {
        self.unpublished = true;
        self
    }

    /// Restrict localized fields to the given languages.
    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Merge the context headers onto a request.
    pub(crate) fn apply(&self, mut builder: RequestBuilder) -> RequestBuilder {
        if self.flatten {
            builder = builder.header("X-Flatten", "true");
        }
        if self.unpublished {
            builder = builder.header("X-Unpublished", "true");
        }
        if !self.languages.is_empty() {
            builder = builder.header("X-Languages", self.languages.join(","));
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_headers(ctx: &QueryContext) -> reqwest::header::HeaderMap {
        let client = reqwest::Client::new();
        let builder = ctx.apply(client.get("http://localhost/"));
        let request = builder.build().unwrap();
        request.headers().clone()
    }

    #[test]
    fn empty_context_adds_no_headers() {
        let headers = rendered_headers(&QueryContext::new());
        assert!(headers.is_empty());
    }

    #[test]
    fn flatten_and_unpublished_render_as_flags() {
        let headers = rendered_headers(&QueryContext::new().flatten().unpublished());
        assert_eq!(headers.get("X-Flatten").unwrap(), "true");
        assert_eq!(headers.get("X-Unpublished").unwrap(), "true");
    }

    #[test]
    fn languages_are_comma_joined() {
        let headers = rendered_headers(&QueryContext::new().languages(["en", "de"]));
        assert_eq!(headers.get("X-Languages").unwrap(), "en,de");
    }
}
