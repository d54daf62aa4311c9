//! Locale-qualified CMS reads: examples, blog articles/threads and the example taxonomy.
//!
//! A non-OK answer surfaces as an `ApiError` for which `is_not_found()` holds;
//! pages map it to a 404. There is no retry.

use crate::api::get_json;
use crate::config::{trim_url, ClientConfig};
use crate::error::ApiError;
use crate::models::{Article, Category, Example, Locale, PageMetadata, TaxonomyEntry, Thread};
use urlencoding::encode;

#[derive(Clone, Debug)]
pub struct ContentClient {
    api_url: String,
}

impl ContentClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: trim_url(api_url.into()),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.api_url, path)
    }

    /// GET /api/examples/{locale}/{category}/{slug}
    pub async fn get_example(&self, locale: Locale, category: &str, slug: &str) -> Result<Example, ApiError> {
        let url = self.url(&format!("/examples/{}/{}/{}", locale, encode(category), encode(slug)));
        get_json(&url, None).await
    }

    /// Metadata for an example page; any failure yields empty metadata.
    pub async fn example_metadata(&self, locale: Locale, category: &str, slug: &str) -> PageMetadata {
        match self.get_example(locale, category, slug).await {
            Ok(example) => PageMetadata::from(&example),
            Err(e) => {
                log::warn!("Metadata fetch failed for {}/{}/{}: {}", locale, category, slug, e);
                PageMetadata::default()
            }
        }
    }

    /// GET /api/examples/{locale}/{category}
    pub async fn get_examples(&self, locale: Locale, category: &str) -> Result<Vec<Example>, ApiError> {
        let url = self.url(&format!("/examples/{}/{}", locale, encode(category)));
        get_json(&url, None).await
    }

    /// GET /api/categories?locale=
    pub async fn get_categories(&self, locale: Locale) -> Result<Vec<Category>, ApiError> {
        let url = self.url(&format!("/categories?locale={}", locale));
        get_json(&url, None).await
    }

    /// GET /api/articles/{locale}/{slug}
    pub async fn get_article(&self, locale: Locale, slug: &str) -> Result<Article, ApiError> {
        let url = self.url(&format!("/articles/{}/{}", locale, encode(slug)));
        get_json(&url, None).await
    }

    /// GET /api/articles?locale=
    pub async fn get_articles(&self, locale: Locale) -> Result<Vec<Article>, ApiError> {
        let url = self.url(&format!("/articles?locale={}", locale));
        get_json(&url, None).await
    }

    /// GET /api/threads?locale=
    pub async fn get_threads(&self, locale: Locale) -> Result<Vec<Thread>, ApiError> {
        let url = self.url(&format!("/threads?locale={}", locale));
        get_json(&url, None).await
    }

    pub async fn get_work_types(&self) -> Result<Vec<TaxonomyEntry>, ApiError> {
        get_json(&self.url("/work-types"), None).await
    }

    pub async fn get_subjects(&self) -> Result<Vec<TaxonomyEntry>, ApiError> {
        get_json(&self.url("/subjects"), None).await
    }

    pub async fn get_levels(&self) -> Result<Vec<TaxonomyEntry>, ApiError> {
        get_json(&self.url("/levels"), None).await
    }

    /// Blog index: both lists in parallel, failing as soon as either fails.
    pub async fn get_threads_and_articles(&self, locale: Locale) -> Result<(Vec<Thread>, Vec<Article>), ApiError> {
        futures::try_join!(self.get_threads(locale), self.get_articles(locale))
    }

    /// Order form dictionaries, fetched in parallel.
    pub async fn get_work_types_and_subjects(&self) -> Result<(Vec<TaxonomyEntry>, Vec<TaxonomyEntry>), ApiError> {
        futures::try_join!(self.get_work_types(), self.get_subjects())
    }
}
