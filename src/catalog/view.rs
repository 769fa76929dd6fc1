// Derived catalog page and its memoized holder

use cached::{Cached, SizedCache};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::facets::{derive_facets, visible_brands, visible_models, FacetCount};
use super::filter::{featured_set, filter_and_sort};
use super::selection::Selection;
use crate::models::Listing;

// Selections remembered per raw collection
const MEMO_SIZE: usize = 16;

// Filter-control data shown next to the results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetPanel {
    pub brands: Vec<FacetCount>,
    pub models: Vec<FacetCount>,
    pub car_types: Vec<String>,
}

// Everything the catalog screen renders for one selection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub listings: Vec<Listing>,
    pub featured_ids: BTreeSet<String>,
    pub total: usize,
    pub facets: FacetPanel,
}

// Pure derivation of a page from (collection, selection)
pub fn derive_page(listings: &[Listing], selection: &Selection) -> CatalogPage {
    let facets = derive_facets(listings, &selection.brand);
    let filtered = filter_and_sort(listings, selection);

    CatalogPage {
        featured_ids: featured_set(&filtered),
        total: filtered.len(),
        listings: filtered,
        facets: FacetPanel {
            brands: visible_brands(&facets, &selection.brand_search),
            models: visible_models(&facets),
            car_types: facets.car_type_options,
        },
    }
}

// Raw collection plus a memo of derived pages. The collection is only ever
// replaced wholesale, which drops every memoized page.
pub struct CatalogView {
    listings: Vec<Listing>,
    memo: SizedCache<Selection, Arc<CatalogPage>>,
}

impl Default for CatalogView {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogView {
    pub fn new() -> Self {
        Self {
            listings: Vec::new(),
            memo: SizedCache::with_size(MEMO_SIZE),
        }
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn replace(&mut self, listings: Vec<Listing>) {
        tracing::debug!(count = listings.len(), "Replacing raw listing collection");
        self.listings = listings;
        self.memo.cache_clear();
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    pub fn page(&mut self, selection: &Selection) -> Arc<CatalogPage> {
        if let Some(page) = self.memo.cache_get(selection) {
            return Arc::clone(page);
        }
        let page = Arc::new(derive_page(&self.listings, selection));
        self.memo.cache_set(selection.clone(), Arc::clone(&page));
        page
    }
}
