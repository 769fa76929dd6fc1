// Facet aggregates used to populate the filter controls.
// Counts are taken over the whole raw collection, never the filtered view.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use super::text::normalize_text;
use crate::models::Listing;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    // First-encounter order
    pub brand_counts: Vec<FacetCount>,
    // Empty unless a brand is selected
    pub model_counts: Vec<FacetCount>,
    pub car_type_options: Vec<String>,
}

// Counts non-empty values, keeping the order in which they first appear
fn count_in_encounter_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<FacetCount> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<FacetCount> = Vec::new();

    for value in values.filter(|v| !v.is_empty()) {
        match index.get(value) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(value, counts.len());
                counts.push(FacetCount {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }
    counts
}

pub fn brand_counts(listings: &[Listing]) -> Vec<FacetCount> {
    count_in_encounter_order(listings.iter().map(Listing::brand_key))
}

pub fn model_counts_for_brand(listings: &[Listing], selected_brand: &str) -> Vec<FacetCount> {
    let selected_brand = selected_brand.trim();
    if selected_brand.is_empty() {
        return Vec::new();
    }
    count_in_encounter_order(
        listings
            .iter()
            .filter(|listing| listing.brand_key() == selected_brand)
            .map(Listing::model_key),
    )
}

pub fn car_type_options(listings: &[Listing]) -> Vec<String> {
    listings
        .iter()
        .map(Listing::car_type_key)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn derive_facets(listings: &[Listing], selected_brand: &str) -> Facets {
    Facets {
        brand_counts: brand_counts(listings),
        model_counts: model_counts_for_brand(listings, selected_brand),
        car_type_options: car_type_options(listings),
    }
}

fn by_descending_count(counts: &[FacetCount]) -> Vec<FacetCount> {
    let mut sorted = counts.to_vec();
    // sort_by is stable, so equal counts keep encounter order
    sorted.sort_by(|a, b| b.count.cmp(&a.count));
    sorted
}

// Brand list for display: most common first, narrowed by the brand search box
pub fn visible_brands(facets: &Facets, brand_search: &str) -> Vec<FacetCount> {
    let needle = normalize_text(brand_search);
    let mut brands = by_descending_count(&facets.brand_counts);
    if !needle.is_empty() {
        brands.retain(|brand| normalize_text(&brand.value).contains(&needle));
    }
    brands
}

pub fn visible_models(facets: &Facets) -> Vec<FacetCount> {
    by_descending_count(&facets.model_counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, brand: &str, model: &str, car_type: &str) -> Listing {
        Listing {
            id: id.into(),
            brand: Some(brand.into()),
            model: Some(model.into()),
            car_type: Some(car_type.into()),
            ..Default::default()
        }
    }

    fn sample() -> Vec<Listing> {
        vec![
            listing("1", "Toyota ", "Corolla", "Sedan"),
            listing("2", "Honda", "Civic", "Sedan"),
            listing("3", "Toyota", "RAV4", "SUV"),
            listing("4", "Škoda", "Octavia", ""),
            listing("5", "Toyota", "Corolla", "Hatchback"),
            listing("6", "", "Mystery", "SUV"),
        ]
    }

    #[test]
    fn brand_counts_use_trimmed_non_empty_brands() {
        let counts = brand_counts(&sample());
        assert_eq!(
            counts,
            vec![
                FacetCount { value: "Toyota".into(), count: 3 },
                FacetCount { value: "Honda".into(), count: 1 },
                FacetCount { value: "Škoda".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn model_counts_need_a_selected_brand() {
        let listings = sample();
        assert!(model_counts_for_brand(&listings, "").is_empty());

        let toyota = model_counts_for_brand(&listings, "Toyota");
        assert_eq!(
            toyota,
            vec![
                FacetCount { value: "Corolla".into(), count: 2 },
                FacetCount { value: "RAV4".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn car_types_are_distinct_and_sorted() {
        assert_eq!(car_type_options(&sample()), vec!["Hatchback", "SUV", "Sedan"]);
    }

    #[test]
    fn empty_collection_yields_empty_facets() {
        assert_eq!(derive_facets(&[], "Toyota"), Facets::default());
    }

    #[test]
    fn brand_search_narrows_display_not_counts() {
        let facets = derive_facets(&sample(), "");
        let narrowed = visible_brands(&facets, "SKO");
        assert_eq!(narrowed, vec![FacetCount { value: "Škoda".into(), count: 1 }]);
        assert_eq!(facets.brand_counts.len(), 3);

        let all = visible_brands(&facets, "");
        let order: Vec<&str> = all.iter().map(|b| b.value.as_str()).collect();
        // ties keep encounter order
        assert_eq!(order, vec!["Toyota", "Honda", "Škoda"]);
    }

    #[test]
    fn visible_models_sorted_by_count() {
        let listings = vec![
            listing("1", "Kia", "Rio", ""),
            listing("2", "Kia", "Sportage", ""),
            listing("3", "Kia", "Sportage", ""),
        ];
        let facets = derive_facets(&listings, "Kia");
        let visible = visible_models(&facets);
        let models: Vec<&str> = visible.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(models, vec!["Sportage", "Rio"]);
    }
}
