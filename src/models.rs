// Data structures exchanged with the marketplace API.
//
// The server is not strict about types: numbers sometimes arrive as strings,
// ids as numbers, and optional fields as null or garbage. Decoding is lenient
// so that one odd field never drops the whole collection.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

// --- Lenient field decoders ---

fn number_from_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() { None } else { s.parse::<f64>().ok() }
        }
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

fn de_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

// Years are whole numbers; fractional input is rounded
fn de_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_from_value)
        .filter(|y| y.abs() < i32::MAX as f64)
        .map(|y| y.round() as i32))
}

fn text_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn de_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(text_from_value))
}

fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

// Accepts RFC 3339 strings or epoch milliseconds; anything else is absent
fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

fn de_images<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

// Falls back to the type's default when the field is null or malformed
fn de_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value::<T>(v).ok())
        .unwrap_or_default())
}

// --- Wire enums ---

// String-backed enums that keep unknown values instead of rejecting them
macro_rules! wire_enum {
    ($name:ident, default = $default:ident, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(raw) => raw.as_str(),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.trim() {
                    $($wire => Self::$variant,)+
                    _ => Self::Other(raw),
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::from(raw.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(ListingStatus, default = Active, {
    Active => "ACTIVE",
    Paused => "PAUSED",
    Sold => "SOLD",
});

wire_enum!(SellerType, default = Private, {
    Private => "PRIVATE",
    Dealer => "DEALER",
});

wire_enum!(VerificationStatus, default = NotSubmitted, {
    NotSubmitted => "NOT_SUBMITTED",
    Pending => "PENDING",
    Verified => "VERIFIED",
    Rejected => "REJECTED",
});

// --- Listings ---

// Owner summary embedded in every listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub whatsapp: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "de_or_default")]
    pub seller_type: Option<SellerType>,
    #[serde(default, deserialize_with = "de_or_default")]
    pub verification_status: Option<VerificationStatus>,
}

impl Owner {
    // WhatsApp contact link, falling back to the phone number
    pub fn whatsapp_link(&self) -> Option<String> {
        [self.whatsapp.as_deref(), self.phone.as_deref()]
            .into_iter()
            .flatten()
            .find_map(crate::phone::whatsapp_link)
    }
}

// One vehicle advertisement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_year")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "de_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "de_number")]
    pub mileage: Option<f64>,
    #[serde(default, deserialize_with = "de_text")]
    pub fuel: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub transmission: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub car_type: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "de_or_default")]
    pub status: ListingStatus,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub sold_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "de_number")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "de_number")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "de_or_default")]
    pub owner: Option<Owner>,
    #[serde(default, deserialize_with = "de_images")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn trimmed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or("")
}

impl Listing {
    pub fn brand_key(&self) -> &str {
        trimmed(&self.brand)
    }

    pub fn model_key(&self) -> &str {
        trimmed(&self.model)
    }

    pub fn car_type_key(&self) -> &str {
        trimmed(&self.car_type)
    }

    pub fn owner_city(&self) -> &str {
        self.owner.as_ref().map(|o| trimmed(&o.city)).unwrap_or("")
    }

    pub fn owner_name(&self) -> Option<&str> {
        self.owner.as_ref().and_then(|o| o.full_name.as_deref())
    }

    pub fn seller_type(&self) -> &str {
        self.owner
            .as_ref()
            .and_then(|o| o.seller_type.as_ref())
            .map(SellerType::as_str)
            .unwrap_or("")
    }

    pub fn is_verified_seller(&self) -> bool {
        matches!(
            self.owner.as_ref().and_then(|o| o.verification_status.as_ref()),
            Some(VerificationStatus::Verified)
        )
    }

    // Recency key: createdAt, then updatedAt, then the epoch
    pub fn recency(&self) -> DateTime<Utc> {
        self.created_at.or(self.updated_at).unwrap_or_default()
    }

    // Only a complete pair counts as a location
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lng)
    }

    pub fn is_sold(&self) -> bool {
        self.status == ListingStatus::Sold
    }

    // Resolves image references against the API base URL
    pub fn image_urls(&self, base_url: &str) -> Vec<String> {
        self.images
            .iter()
            .filter_map(|path| image_url(base_url, path))
            .collect()
    }
}

pub fn image_url(base_url: &str, path: &str) -> Option<String> {
    let normalized = path.trim().replace('\\', "/");
    if normalized.is_empty() {
        return None;
    }
    if normalized.starts_with("http://") || normalized.starts_with("https://") {
        return Some(normalized);
    }
    Some(format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        normalized.trim_start_matches('/')
    ))
}

// --- Accounts ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub role: Option<String>,
}

impl CurrentUser {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().or(self.user_id.as_deref())
    }

    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|role| role.trim().eq_ignore_ascii_case("ADMIN"))
    }
}

// Seller profile as returned by GET /users/me
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerProfile {
    #[serde(default, deserialize_with = "de_or_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "de_or_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "de_or_default")]
    pub whatsapp: String,
    #[serde(default, deserialize_with = "de_or_default")]
    pub city: String,
    #[serde(default, deserialize_with = "de_or_default")]
    pub seller_type: SellerType,
    #[serde(default, deserialize_with = "de_or_default")]
    pub address: String,
    #[serde(default, deserialize_with = "de_number")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "de_number")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "de_or_default")]
    pub verification_status: VerificationStatus,
    #[serde(default, deserialize_with = "de_or_default")]
    pub verification_note: String,
}

impl SellerProfile {
    // Posting a listing needs a name and a phone number to contact
    pub fn is_complete_for_selling(&self) -> bool {
        !self.full_name.trim().is_empty() && !self.phone.trim().is_empty()
    }
}

// Identity verification request, both the seller's own and the admin queue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_or_default")]
    pub status: VerificationStatus,
    #[serde(default, deserialize_with = "de_text")]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub id_type: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub id_image: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub selfie: Option<String>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_or_default")]
    pub user: Option<Owner>,
}

// --- Request / response bodies ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default, deserialize_with = "de_text")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate<'a> {
    pub status: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReview<'a> {
    pub status: &'a str,
    pub note: &'a str,
}
