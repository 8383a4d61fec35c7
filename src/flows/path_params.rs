//! Registry of URL patterns declaring path parameters.

use crate::urltree::{UrlTree, UrlTreeError};

/// Accepts a pattern only if it agrees structurally with every pattern
/// accepted before it.
#[derive(Debug, Default)]
pub struct PathParamRegistry {
    validation: UrlTree<()>,
    urls: Vec<String>,
}

impl PathParamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, url: &str) -> Result<(), UrlTreeError> {
        self.validation.insert_declared_url(url, ())?;
        self.urls.push(url.to_string());
        Ok(())
    }

    /// Register in order, stopping at the first conflict.
    pub fn register_all<I, S>(&mut self, urls: I) -> Result<(), UrlTreeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        urls.into_iter()
            .try_for_each(|url| self.register(url.as_ref()))
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }
}
