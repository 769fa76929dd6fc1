// Filter -> sort over the raw listing collection

use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::selection::{ConditionFilter, NumericRange, Selection, SortKey};
use super::text::normalize_text;
use crate::models::Listing;

// Number of leading results highlighted as featured
pub const FEATURED_COUNT: usize = 3;

// Selection resolved once per derivation: parsed bounds, normalized query
struct Criteria<'a> {
    query: String,
    condition: &'a ConditionFilter,
    city: &'a str,
    brand: &'a str,
    model: &'a str,
    price: NumericRange,
    mileage: NumericRange,
    year: NumericRange,
    fuels: &'a BTreeSet<String>,
    transmissions: &'a BTreeSet<String>,
    car_types: &'a BTreeSet<String>,
    seller_types: &'a BTreeSet<String>,
}

impl<'a> Criteria<'a> {
    fn new(selection: &'a Selection) -> Self {
        Self {
            query: normalize_text(&selection.query),
            condition: &selection.condition,
            city: selection.city.trim(),
            brand: selection.brand.trim(),
            model: selection.model.trim(),
            price: selection.price_range(),
            mileage: selection.mileage_range(),
            year: selection.year_range(),
            fuels: &selection.fuels,
            transmissions: &selection.transmissions,
            car_types: &selection.car_types,
            seller_types: &selection.seller_types,
        }
    }

    fn matches(&self, listing: &Listing) -> bool {
        self.condition.matches(listing.condition.as_deref())
            && (self.city.is_empty() || listing.owner_city() == self.city)
            && (self.brand.is_empty() || listing.brand_key() == self.brand)
            && (self.model.is_empty() || listing.model_key() == self.model)
            && self.price.admits(listing.price)
            && self.mileage.admits(listing.mileage)
            && self.year.admits(listing.year.map(f64::from))
            && member(self.fuels, listing.fuel.as_deref())
            && member(self.transmissions, listing.transmission.as_deref())
            && member(self.car_types, listing.car_type.as_deref())
            && member(self.seller_types, Some(listing.seller_type()))
            && self.matches_query(listing)
    }

    fn matches_query(&self, listing: &Listing) -> bool {
        if self.query.is_empty() {
            return true;
        }
        searchable_text(listing).contains(&self.query)
    }
}

// Empty selection set means no constraint
fn member(selected: &BTreeSet<String>, value: Option<&str>) -> bool {
    selected.is_empty() || selected.contains(value.unwrap_or(""))
}

fn searchable_text(listing: &Listing) -> String {
    let owner = listing.owner.as_ref();
    [
        listing.brand.as_deref(),
        listing.model.as_deref(),
        listing.title.as_deref(),
        listing.description.as_deref(),
        listing.car_type.as_deref(),
        listing.color.as_deref(),
        listing.fuel.as_deref(),
        listing.transmission.as_deref(),
        listing.address.as_deref(),
        owner.and_then(|o| o.city.as_deref()),
        owner.and_then(|o| o.full_name.as_deref()),
    ]
    .iter()
    .map(|field| normalize_text(field.unwrap_or("")))
    .collect::<Vec<_>>()
    .join(" ")
}

fn compare_by_key(a: &Listing, b: &Listing, sort: SortKey) -> Ordering {
    let price = |l: &Listing| l.price.unwrap_or(0.0);
    let year = |l: &Listing| l.year.unwrap_or(0);
    match sort {
        SortKey::Newest => b.recency().cmp(&a.recency()),
        SortKey::Oldest => a.recency().cmp(&b.recency()),
        SortKey::PriceAsc => price(a).total_cmp(&price(b)),
        SortKey::PriceDesc => price(b).total_cmp(&price(a)),
        SortKey::YearAsc => year(a).cmp(&year(b)),
        SortKey::YearDesc => year(b).cmp(&year(a)),
    }
}

// Verified sellers first (when asked), then the selected key
fn compare(a: &Listing, b: &Listing, selection: &Selection) -> Ordering {
    let group = if selection.verified_first {
        b.is_verified_seller().cmp(&a.is_verified_seller())
    } else {
        Ordering::Equal
    };
    group.then_with(|| compare_by_key(a, b, selection.sort))
}

// Listings satisfying every active filter, ordered by the composite key.
// The sort is stable: ties keep their collection order.
pub fn filter_and_sort(listings: &[Listing], selection: &Selection) -> Vec<Listing> {
    let criteria = Criteria::new(selection);
    let mut matched: Vec<Listing> = listings
        .iter()
        .filter(|listing| criteria.matches(listing))
        .cloned()
        .collect();
    matched.sort_by(|a, b| compare(a, b, selection));
    matched
}

pub fn featured_set(filtered: &[Listing]) -> BTreeSet<String> {
    filtered
        .iter()
        .take(FEATURED_COUNT)
        .map(|listing| listing.id.clone())
        .collect()
}
