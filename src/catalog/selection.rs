// The user's filter/sort/search choices as one immutable record.
// Every update returns a new Selection; nothing is mutated in place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::text::normalize_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    YearAsc,
    YearDesc,
}

impl SortKey {
    // Unrecognized keys sort as NEWEST
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "OLDEST" => SortKey::Oldest,
            "PRICE_ASC" => SortKey::PriceAsc,
            "PRICE_DESC" => SortKey::PriceDesc,
            "YEAR_ASC" => SortKey::YearAsc,
            "YEAR_DESC" => SortKey::YearDesc,
            _ => SortKey::Newest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "NEWEST",
            SortKey::Oldest => "OLDEST",
            SortKey::PriceAsc => "PRICE_ASC",
            SortKey::PriceDesc => "PRICE_DESC",
            SortKey::YearAsc => "YEAR_ASC",
            SortKey::YearDesc => "YEAR_DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ConditionFilter {
    #[default]
    All,
    Only(String),
}

impl ConditionFilter {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("ALL") {
            ConditionFilter::All
        } else {
            ConditionFilter::Only(raw.to_string())
        }
    }

    pub fn matches(&self, condition: Option<&str>) -> bool {
        match self {
            ConditionFilter::All => true,
            ConditionFilter::Only(wanted) => {
                normalize_text(condition.unwrap_or("")) == normalize_text(wanted)
            }
        }
    }
}

// Which raw collection the server is asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    All,
    Mine,
}

impl Scope {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("mine") {
            Scope::Mine
        } else {
            Scope::All
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiSelect {
    Fuel,
    Transmission,
    CarType,
    SellerType,
}

// A bound is set when the trimmed input parses to a finite number
pub fn parse_bound(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn parse(min: &str, max: &str) -> Self {
        Self {
            min: parse_bound(min),
            max: parse_bound(max),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    // An absent value never satisfies a set bound
    pub fn admits(&self, value: Option<f64>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        match value {
            Some(v) => self.min.map_or(true, |min| v >= min) && self.max.map_or(true, |max| v <= max),
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    pub query: String,
    pub condition: ConditionFilter,
    pub city: String,
    pub brand: String,
    pub model: String,
    // Narrows the displayed brand list only, never the listings
    pub brand_search: String,
    pub min_price: String,
    pub max_price: String,
    pub min_km: String,
    pub max_km: String,
    pub min_year: String,
    pub max_year: String,
    pub fuels: BTreeSet<String>,
    pub transmissions: BTreeSet<String>,
    pub car_types: BTreeSet<String>,
    pub seller_types: BTreeSet<String>,
    pub verified_first: bool,
    pub sort: SortKey,
}

impl Selection {
    pub fn with_query(self, query: impl Into<String>) -> Self {
        Self { query: query.into(), ..self }
    }

    pub fn with_condition(self, condition: ConditionFilter) -> Self {
        Self { condition, ..self }
    }

    pub fn with_city(self, city: impl Into<String>) -> Self {
        Self { city: city.into(), ..self }
    }

    // A model only makes sense for the brand it was picked under
    pub fn with_brand(self, brand: impl Into<String>) -> Self {
        let brand = brand.into();
        if brand.trim() == self.brand.trim() {
            return Self { brand, ..self };
        }
        Self {
            brand,
            model: String::new(),
            ..self
        }
    }

    pub fn with_model(self, model: impl Into<String>) -> Self {
        Self { model: model.into(), ..self }
    }

    pub fn with_brand_search(self, brand_search: impl Into<String>) -> Self {
        Self {
            brand_search: brand_search.into(),
            ..self
        }
    }

    pub fn with_price(self, min: impl Into<String>, max: impl Into<String>) -> Self {
        Self {
            min_price: min.into(),
            max_price: max.into(),
            ..self
        }
    }

    pub fn with_mileage(self, min: impl Into<String>, max: impl Into<String>) -> Self {
        Self {
            min_km: min.into(),
            max_km: max.into(),
            ..self
        }
    }

    pub fn with_year(self, min: impl Into<String>, max: impl Into<String>) -> Self {
        Self {
            min_year: min.into(),
            max_year: max.into(),
            ..self
        }
    }

    pub fn with_verified_first(self, verified_first: bool) -> Self {
        Self { verified_first, ..self }
    }

    pub fn with_sort(self, sort: SortKey) -> Self {
        Self { sort, ..self }
    }

    pub fn values(&self, facet: MultiSelect) -> &BTreeSet<String> {
        match facet {
            MultiSelect::Fuel => &self.fuels,
            MultiSelect::Transmission => &self.transmissions,
            MultiSelect::CarType => &self.car_types,
            MultiSelect::SellerType => &self.seller_types,
        }
    }

    // Adds the value when absent, removes it when present
    pub fn toggled(self, facet: MultiSelect, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut values = self.values(facet).clone();
        if !values.remove(&value) {
            values.insert(value);
        }
        self.with_values(facet, values)
    }

    pub fn with_values(self, facet: MultiSelect, values: BTreeSet<String>) -> Self {
        match facet {
            MultiSelect::Fuel => Self { fuels: values, ..self },
            MultiSelect::Transmission => Self { transmissions: values, ..self },
            MultiSelect::CarType => Self { car_types: values, ..self },
            MultiSelect::SellerType => Self { seller_types: values, ..self },
        }
    }

    pub fn price_range(&self) -> NumericRange {
        NumericRange::parse(&self.min_price, &self.max_price)
    }

    pub fn mileage_range(&self) -> NumericRange {
        NumericRange::parse(&self.min_km, &self.max_km)
    }

    pub fn year_range(&self) -> NumericRange {
        NumericRange::parse(&self.min_year, &self.max_year)
    }

    pub fn is_cleared(&self) -> bool {
        *self == Selection::default()
    }
}
