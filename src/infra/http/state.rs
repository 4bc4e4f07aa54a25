use std::sync::Arc;

use crate::application::catalog::CatalogService;
use crate::application::repos::CatalogRepo;
use crate::cache::CacheStore;

#[derive(Clone)]
pub struct HttpState {
    pub catalog: Arc<CatalogService>,
    /// Held for health probes only; reads go through `catalog`.
    pub repo: Arc<dyn CatalogRepo>,
    pub cache: Arc<dyn CacheStore>,
    /// Page size used when `limit` is omitted from `GET /items`.
    pub default_page_size: u32,
}

impl HttpState {
    pub fn max_sample_size(&self) -> u32 {
        self.catalog.policy().max_sample_size
    }
}
