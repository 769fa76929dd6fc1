// Catalog view-model: derives the visible, ordered listings and the filter
// facets from the raw collection and the current selection.

mod facets;
mod filter;
mod selection;
mod text;
mod view;

pub use facets::{
    brand_counts, car_type_options, derive_facets, model_counts_for_brand, visible_brands,
    visible_models, FacetCount, Facets,
};
pub use filter::{featured_set, filter_and_sort, FEATURED_COUNT};
pub use selection::{parse_bound, ConditionFilter, MultiSelect, NumericRange, Scope, Selection, SortKey};
pub use text::normalize_text;
pub use view::{derive_page, CatalogPage, CatalogView, FacetPanel};
