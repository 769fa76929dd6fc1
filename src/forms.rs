// Form state for selling, profile editing and identity verification,
// with the client-side checks that run before anything is sent.

use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::{
    catalog::parse_bound,
    error::{ApiError, ApiResult},
    models::{SellerProfile, SellerType},
    phone::{build_full_phone, split_dial_code},
};

pub const CURRENT_LOCATION_ADDRESS: &str = "My current location (GPS detected)";
pub const INCOMPLETE_PROFILE_MESSAGE: &str =
    "Please add your name and phone number in Seller Profile and save it before posting.";

// A user-selected file, passed through untouched
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Photo {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    fn part(&self) -> ApiResult<Part> {
        Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.content_type)
            .map_err(|_| {
                ApiError::Validation(format!(
                    "Unsupported file type for {}: {}",
                    self.file_name, self.content_type
                ))
            })
    }
}

// --- Create listing ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationMode {
    #[default]
    Manual,
    Current,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateListingForm {
    pub brand: String,
    pub year: String,
    pub model: String,
    pub fuel: String,
    pub price: String,
    pub mileage: String,
    pub condition: String,
    pub transmission: String,
    pub car_type: String,
    pub color: String,
    pub title: String,
    pub description: String,
    pub location_mode: LocationMode,
    pub address: String,
    pub lat: String,
    pub lng: String,
}

impl Default for CreateListingForm {
    fn default() -> Self {
        Self {
            brand: String::new(),
            year: String::new(),
            model: String::new(),
            fuel: String::new(),
            price: String::new(),
            mileage: String::new(),
            condition: "Used".to_string(),
            transmission: "Automatic".to_string(),
            car_type: String::new(),
            color: String::new(),
            title: String::new(),
            description: String::new(),
            location_mode: LocationMode::Manual,
            address: String::new(),
            lat: String::new(),
            lng: String::new(),
        }
    }
}

impl CreateListingForm {
    // Models belong to a make, so a new brand clears the model
    pub fn set_brand(&mut self, brand: impl Into<String>) {
        self.brand = brand.into();
        self.model.clear();
    }

    pub fn use_current_location(&mut self, lat: f64, lng: f64) {
        self.location_mode = LocationMode::Current;
        self.lat = format!("{:.6}", lat);
        self.lng = format!("{:.6}", lng);
        if self.address.trim().is_empty() {
            self.address = CURRENT_LOCATION_ADDRESS.to_string();
        }
    }

    pub fn use_manual_location(&mut self) {
        self.location_mode = LocationMode::Manual;
        self.lat.clear();
        self.lng.clear();
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("Brand", &self.brand),
            ("Year", &self.year),
            ("Model", &self.model),
            ("Fuel", &self.fuel),
            ("Price", &self.price),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }

    // Blocks submission when required fields or the seller profile are incomplete
    pub fn validate(&self, profile: &SellerProfile) -> ApiResult<()> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ApiError::Validation(format!("Please fill: {}.", missing.join(", "))));
        }
        if !profile.is_complete_for_selling() {
            return Err(ApiError::Validation(INCOMPLETE_PROFILE_MESSAGE.to_string()));
        }
        Ok(())
    }

    pub fn effective_title(&self) -> String {
        if !self.title.trim().is_empty() {
            return self.title.clone();
        }
        if self.brand.is_empty() || self.model.is_empty() {
            return String::new();
        }
        format!("{} {}", self.brand, self.model)
    }

    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("brand", self.brand.clone()),
            ("year", self.year.clone()),
            ("model", self.model.clone()),
            ("fuel", self.fuel.clone()),
            ("price", self.price.clone()),
            ("mileage", self.mileage.clone()),
            ("condition", self.condition.clone()),
            ("transmission", self.transmission.clone()),
            ("carType", self.car_type.clone()),
            ("color", self.color.clone()),
            ("title", self.effective_title()),
            ("description", self.description.clone()),
            ("address", self.address.clone()),
            ("lat", self.lat.clone()),
            ("lng", self.lng.clone()),
        ]
    }

    pub fn to_multipart(&self, photos: &[Photo]) -> ApiResult<Form> {
        let mut form = Form::new();
        for (name, value) in self.text_fields() {
            form = form.text(name, value);
        }
        for photo in photos {
            form = form.part("images", photo.part()?);
        }
        Ok(form)
    }
}

// --- Seller profile ---

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileForm {
    pub full_name: String,
    pub phone: String,
    pub whatsapp: String,
    pub city: String,
    pub seller_type: SellerType,
    pub address: String,
    pub lat: String,
    pub lng: String,
}

// Body of PATCH /users/me
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    pub full_name: String,
    pub phone: String,
    pub whatsapp: String,
    pub city: String,
    pub seller_type: SellerType,
    pub address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl From<&SellerProfile> for ProfileForm {
    fn from(profile: &SellerProfile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            phone: profile.phone.clone(),
            whatsapp: profile.whatsapp.clone(),
            city: profile.city.clone(),
            seller_type: profile.seller_type.clone(),
            address: profile.address.clone(),
            lat: profile.lat.map(|v| v.to_string()).unwrap_or_default(),
            lng: profile.lng.map(|v| v.to_string()).unwrap_or_default(),
        }
    }
}

impl ProfileForm {
    // Phone inputs are edited as a dial code plus local digits
    pub fn set_phone(&mut self, dial_code: &str, local: &str) {
        self.phone = build_full_phone(dial_code, local);
    }

    pub fn set_whatsapp(&mut self, dial_code: &str, local: &str) {
        self.whatsapp = build_full_phone(dial_code, local);
    }

    pub fn phone_parts(&self) -> (String, String) {
        split_dial_code(&self.phone)
    }

    pub fn whatsapp_parts(&self) -> (String, String) {
        split_dial_code(&self.whatsapp)
    }

    pub fn to_payload(&self) -> ProfilePayload {
        ProfilePayload {
            full_name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            whatsapp: self.whatsapp.trim().to_string(),
            city: self.city.trim().to_string(),
            seller_type: self.seller_type.clone(),
            address: self.address.trim().to_string(),
            lat: parse_bound(&self.lat),
            lng: parse_bound(&self.lng),
        }
    }
}

// --- Registration ---

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    // Everything but the password is trimmed before sending
    pub fn normalized(&self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

// --- Identity verification ---

pub const NATIONAL_ID: &str = "NATIONAL_ID";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VerificationUpload {
    pub id_image: Option<Photo>,
    pub selfie: Option<Photo>,
}

impl VerificationUpload {
    pub fn to_multipart(&self) -> ApiResult<Form> {
        let (Some(id_image), Some(selfie)) = (&self.id_image, &self.selfie) else {
            return Err(ApiError::Validation("Please upload both ID and selfie.".to_string()));
        };
        Ok(Form::new()
            .part("idImage", id_image.part()?)
            .part("selfie", selfie.part()?)
            .text("idType", NATIONAL_ID))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_profile() -> SellerProfile {
        SellerProfile {
            full_name: "Awa Koné".into(),
            phone: "+2250708091011".into(),
            ..Default::default()
        }
    }

    fn filled_form() -> CreateListingForm {
        CreateListingForm {
            brand: "Toyota".into(),
            year: "2019".into(),
            model: "Corolla".into(),
            fuel: "Petrol".into(),
            price: "8500000".into(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_match_the_selling_form() {
        let form = CreateListingForm::default();
        assert_eq!(form.condition, "Used");
        assert_eq!(form.transmission, "Automatic");
        assert_eq!(form.location_mode, LocationMode::Manual);
    }

    #[test]
    fn missing_fields_are_listed_in_order() {
        let form = CreateListingForm {
            model: "Corolla".into(),
            price: "  ".into(),
            ..Default::default()
        };
        match form.validate(&complete_profile()) {
            Err(ApiError::Validation(message)) => assert_eq!(message, "Please fill: Brand, Year, Fuel, Price."),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn incomplete_profile_blocks_posting() {
        let profile = SellerProfile {
            full_name: "Awa".into(),
            ..Default::default()
        };
        assert!(matches!(
            filled_form().validate(&profile),
            Err(ApiError::Validation(message)) if message == INCOMPLETE_PROFILE_MESSAGE
        ));
        assert!(filled_form().validate(&complete_profile()).is_ok());
    }

    #[test]
    fn title_falls_back_to_brand_and_model() {
        let mut form = filled_form();
        assert_eq!(form.effective_title(), "Toyota Corolla");
        form.title = "Clean Corolla".into();
        assert_eq!(form.effective_title(), "Clean Corolla");

        let fields = form.text_fields();
        let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(names.first(), Some(&"brand"));
        assert_eq!(names.last(), Some(&"lng"));
        assert_eq!(names.len(), 15);
    }

    #[test]
    fn location_modes() {
        let mut form = filled_form();
        form.use_current_location(5.359951, -4.008256);
        assert_eq!(form.location_mode, LocationMode::Current);
        assert_eq!(form.lat, "5.359951");
        assert_eq!(form.lng, "-4.008256");
        assert_eq!(form.address, CURRENT_LOCATION_ADDRESS);

        form.use_manual_location();
        assert_eq!(form.location_mode, LocationMode::Manual);
        assert!(form.lat.is_empty() && form.lng.is_empty());
        // a typed or detected address is kept
        assert_eq!(form.address, CURRENT_LOCATION_ADDRESS);
    }

    #[test]
    fn brand_change_clears_model() {
        let mut form = filled_form();
        form.set_brand("Honda");
        assert_eq!(form.model, "");
    }

    #[test]
    fn profile_payload_parses_coordinates() {
        let form = ProfileForm {
            full_name: " Awa ".into(),
            lat: "5.35".into(),
            lng: "".into(),
            ..Default::default()
        };
        let payload = form.to_payload();
        assert_eq!(payload.full_name, "Awa");
        assert_eq!(payload.lat, Some(5.35));
        assert_eq!(payload.lng, None);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["lng"], serde_json::Value::Null);
        assert_eq!(json["sellerType"], "PRIVATE");
    }

    #[test]
    fn profile_form_round_trips_profile_values() {
        let profile = SellerProfile {
            lat: Some(5.5),
            seller_type: SellerType::Dealer,
            ..complete_profile()
        };
        let form = ProfileForm::from(&profile);
        assert_eq!(form.lat, "5.5");
        assert_eq!(form.lng, "");
        assert_eq!(form.seller_type, SellerType::Dealer);
    }

    #[test]
    fn phone_inputs_are_split_and_joined() {
        let mut form = ProfileForm::default();
        form.set_phone("+225", "07 08 09 10 11");
        assert_eq!(form.phone, "+2250708091011");
        assert_eq!(form.phone_parts(), ("+225".to_string(), "708091011".to_string()));

        form.set_whatsapp("+33", "");
        assert_eq!(form.whatsapp, "");
        assert_eq!(form.whatsapp_parts().0, "+225");
    }

    #[test]
    fn verification_needs_both_images() {
        let upload = VerificationUpload {
            id_image: Some(Photo::new("id.jpg", "image/jpeg", vec![1, 2, 3])),
            selfie: None,
        };
        assert!(matches!(upload.to_multipart(), Err(ApiError::Validation(_))));

        let complete = VerificationUpload {
            selfie: Some(Photo::new("me.png", "image/png", vec![4])),
            ..upload
        };
        assert!(complete.to_multipart().is_ok());
    }

    #[test]
    fn malformed_content_type_is_a_validation_error() {
        let upload = VerificationUpload {
            id_image: Some(Photo::new("id.jpg", "not a mime type", vec![1, 2, 3])),
            selfie: Some(Photo::new("me.png", "image/png", vec![4])),
        };
        match upload.to_multipart() {
            Err(ApiError::Validation(message)) => assert!(message.contains("id.jpg")),
            other => panic!("expected a validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn registration_is_trimmed() {
        let registration = Registration {
            full_name: " Awa ".into(),
            email: " awa@example.com ".into(),
            password: " secret ".into(),
            ..Default::default()
        };
        let normalized = registration.normalized();
        assert_eq!(normalized.email, "awa@example.com");
        assert_eq!(normalized.password, " secret ");
    }
}
