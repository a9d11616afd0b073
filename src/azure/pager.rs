//! Pagination over ARM list endpoints
//!
//! List responses look like `{"value": [...], "nextLink": "..."}`. A pager
//! starts at the first URL and follows `nextLink` until it is absent.

use super::session::Session;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

/// One page of a list response
#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default, rename = "nextLink")]
    pub next_link: Option<String>,
}

impl<T> Page<T> {
    /// Next page URL, if the provider reported one
    pub fn next_url(&self) -> Result<Option<Url>> {
        match self.next_link.as_deref().map(str::trim) {
            Some(link) if !link.is_empty() => Ok(Some(Url::parse(link)?)),
            _ => Ok(None),
        }
    }
}

/// Walks a paginated list endpoint.
///
/// Not restartable: create a new pager to list again from the start.
pub struct Pager<'a, T> {
    session: &'a Session,
    next: Option<Url>,
    current: Vec<T>,
    pages_fetched: usize,
}

impl<'a, T: DeserializeOwned> Pager<'a, T> {
    pub fn new(session: &'a Session, first: Url) -> Self {
        Self {
            session,
            next: Some(first),
            current: Vec::new(),
            pages_fetched: 0,
        }
    }

    /// Whether another page remains to be fetched
    pub fn not_done(&self) -> bool {
        self.next.is_some()
    }

    /// Fetch the next page, making its items available through [`Pager::values`].
    /// Does nothing once every page has been fetched.
    pub async fn next(&mut self) -> Result<()> {
        let Some(url) = self.next.take() else {
            self.current.clear();
            return Ok(());
        };

        let page: Page<T> = self.session.get_json(&url).await?;
        self.pages_fetched += 1;

        let next = page.next_url()?;
        // A nextLink pointing back at the page we just read would never end
        if next.as_ref() == Some(&url) {
            tracing::warn!("nextLink repeats {}, stopping pagination", url.path());
            self.next = None;
        } else {
            self.next = next;
        }

        tracing::debug!(
            "Fetched page {} with {} items (more: {})",
            self.pages_fetched,
            page.value.len(),
            self.next.is_some()
        );

        self.current = page.value;
        Ok(())
    }

    /// Items of the most recently fetched page, moved out
    pub fn values(&mut self) -> Vec<T> {
        std::mem::take(&mut self.current)
    }
}
