// Stateful application core: owns the raw listing collection, the user's
// selection and session, and sequences reloads after every mutation.
//
// Errors never escape; each failure ends up as a humanized banner string.

use std::sync::Arc;

use crate::{
    api_client::MarketplaceClient,
    catalog::{CatalogPage, CatalogView, Scope, Selection},
    error::{humanize_api_error, humanize_message, ApiError},
    forms::{CreateListingForm, Photo, ProfileForm, Registration, VerificationUpload},
    models::{CurrentUser, Listing, ListingStatus, SellerProfile, VerificationRecord},
    storage::Favorites,
};

pub const MINE_FALLBACK_BANNER: &str = "Backend lacks /cars/mine. Showing public cars only.";
pub const PROFILE_SAVED_BANNER: &str = "Profile saved";
pub const VERIFICATION_SUBMITTED_BANNER: &str = "Verification submitted successfully!";
pub const LOGGED_OUT_BANNER: &str = "Logged out successfully";
pub const DEFAULT_ADMIN_FILTER: &str = "PENDING";

pub struct Session {
    client: MarketplaceClient,
    favorites: Favorites,
    user: Option<CurrentUser>,
    profile: SellerProfile,
    catalog: CatalogView,
    selection: Selection,
    scope: Scope,
    banner: String,
    cities: Vec<String>,
    makes: Vec<String>,
    models: Vec<String>,
    verification: Option<VerificationRecord>,
    admin_queue: Vec<VerificationRecord>,
    admin_filter: String,
    admin_message: String,
    pub create_form: CreateListingForm,
}

impl Session {
    pub fn new(client: MarketplaceClient) -> Self {
        let favorites = Favorites::load(client.store());
        Self {
            client,
            favorites,
            user: None,
            profile: SellerProfile::default(),
            catalog: CatalogView::new(),
            selection: Selection::default(),
            scope: Scope::All,
            banner: String::new(),
            cities: Vec::new(),
            makes: Vec::new(),
            models: Vec::new(),
            verification: None,
            admin_queue: Vec::new(),
            admin_filter: DEFAULT_ADMIN_FILTER.to_string(),
            admin_message: String::new(),
            create_form: CreateListingForm::default(),
        }
    }

    // --- Read access ---

    pub fn client(&self) -> &MarketplaceClient {
        &self.client
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }

    pub fn profile(&self) -> &SellerProfile {
        &self.profile
    }

    pub fn banner(&self) -> &str {
        &self.banner
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn listings(&self) -> &[Listing] {
        self.catalog.listings()
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn makes(&self) -> &[String] {
        &self.makes
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn verification(&self) -> Option<&VerificationRecord> {
        self.verification.as_ref()
    }

    pub fn admin_queue(&self) -> &[VerificationRecord] {
        &self.admin_queue
    }

    pub fn admin_filter(&self) -> &str {
        &self.admin_filter
    }

    pub fn admin_message(&self) -> &str {
        &self.admin_message
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    // Derived catalog for the current selection, memoized per collection
    pub fn view(&mut self) -> Arc<CatalogPage> {
        self.catalog.page(&self.selection)
    }

    pub fn favorite_listings(&self) -> Vec<Listing> {
        self.favorites.select(self.catalog.listings())
    }

    // --- Selection ---

    // Applies a selection update, e.g. `session.update_selection(|s| s.with_city("Abidjan"))`
    pub fn update_selection(&mut self, update: impl FnOnce(Selection) -> Selection) {
        let current = std::mem::take(&mut self.selection);
        self.selection = update(current);
    }

    pub fn clear_filters(&mut self) {
        self.selection = Selection::default();
    }

    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        match self.favorites.toggle(id) {
            Ok(now_favorite) => now_favorite,
            Err(e) => {
                tracing::warn!("Failed to persist favorites: {:?}", e);
                self.banner = humanize_message(&e.to_string());
                self.favorites.contains(id)
            }
        }
    }

    fn fail(&mut self, error: &ApiError) {
        tracing::warn!("Request failed: {}", error);
        self.banner = humanize_api_error(error);
    }

    // --- Loaders ---

    // Initial load: who am I, catalog lookups, then listings
    pub async fn bootstrap(&mut self) {
        tracing::info!("Bootstrapping session");
        self.load_me().await;

        let (makes, cities) = futures::join!(self.client.makes(), self.client.cities());
        self.makes = makes.unwrap_or_else(|e| {
            tracing::warn!("Failed to load makes: {}", e);
            Vec::new()
        });
        self.cities = cities.unwrap_or_else(|e| {
            tracing::warn!("Failed to load cities: {}", e);
            Vec::new()
        });

        self.load_listings().await;
    }

    // Resolves the current user. A known user pulls in profile,
    // verification and, for admins, the pending review queue.
    pub async fn load_me(&mut self) {
        if self.client.token().is_none() {
            self.user = None;
            return;
        }

        self.user = match self.client.me().await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Failed to load current user: {}", e);
                None
            }
        };

        if self.user.is_some() {
            self.load_profile().await;
            self.load_verification().await;
            if self.is_admin() {
                self.load_admin_queue(DEFAULT_ADMIN_FILTER).await;
            }
        }
    }

    pub async fn load_profile(&mut self) {
        match self.client.profile().await {
            Ok(profile) => self.profile = profile,
            Err(e) => tracing::warn!("Failed to load seller profile: {}", e),
        }
    }

    pub async fn load_verification(&mut self) {
        match self.client.my_verification().await {
            Ok(Some(record)) => {
                self.profile.verification_status = record.status.clone();
                self.profile.verification_note = record.note.clone().unwrap_or_default();
                self.verification = Some(record);
            }
            Ok(None) => self.verification = None,
            Err(e) => {
                tracing::warn!("Failed to load verification: {}", e);
                self.verification = None;
            }
        }
    }

    pub async fn load_makes(&mut self) {
        self.makes = self.client.makes().await.unwrap_or_else(|e| {
            tracing::warn!("Failed to load makes: {}", e);
            Vec::new()
        });
    }

    pub async fn load_models_for_make(&mut self, make: &str) {
        if make.trim().is_empty() {
            self.models.clear();
            return;
        }
        self.models = self.client.models(make).await.unwrap_or_else(|e| {
            tracing::warn!(make, "Failed to load models: {}", e);
            Vec::new()
        });
    }

    // Sets the selling form's brand and refreshes the model list for it
    pub async fn select_make(&mut self, make: &str) {
        self.create_form.set_brand(make);
        self.load_models_for_make(make).await;
    }

    // Fetches the raw collection for the current scope and replaces it wholesale
    pub async fn load_listings(&mut self) {
        self.banner.clear();
        let mine = self.scope == Scope::Mine && self.user.is_some();
        let scope = if mine { Scope::Mine } else { Scope::All };

        match self.client.list_listings(scope).await {
            Ok(listings) => self.catalog.replace(listings),
            Err(e) if mine && e.is_not_found() => {
                tracing::warn!("/cars/mine is not available, falling back to public listings");
                self.banner = MINE_FALLBACK_BANNER.to_string();
                match self.client.list_listings(Scope::All).await {
                    Ok(listings) => self.catalog.replace(listings),
                    Err(e) => {
                        self.fail(&e);
                        self.catalog.clear();
                    }
                }
            }
            Err(e) => {
                self.fail(&e);
                self.catalog.clear();
            }
        }
    }

    pub async fn set_scope(&mut self, scope: Scope) {
        if self.scope != scope {
            tracing::info!(?scope, "Switching listing scope");
        }
        self.scope = scope;
        self.load_listings().await;
    }

    pub async fn reload(&mut self) {
        self.load_listings().await;
    }

    // --- Auth ---

    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        self.banner.clear();
        if let Err(e) = self.client.login(email, password).await {
            self.fail(&e);
            return false;
        }
        self.after_auth().await;
        true
    }

    pub async fn register(&mut self, registration: &Registration) -> bool {
        self.banner.clear();
        if let Err(e) = self.client.register(registration).await {
            self.fail(&e);
            return false;
        }
        self.after_auth().await;
        true
    }

    async fn after_auth(&mut self) {
        self.load_me().await;
        self.load_makes().await;
        self.load_listings().await;
    }

    pub fn logout(&mut self) {
        self.client.logout();
        self.user = None;
        self.profile = SellerProfile::default();
        self.verification = None;
        self.admin_queue.clear();
        self.scope = Scope::All;
        self.banner = LOGGED_OUT_BANNER.to_string();
        tracing::info!("Logged out");
    }

    // --- Listing mutations ---

    pub async fn set_listing_status(&mut self, id: &str, status: ListingStatus) {
        self.banner.clear();
        if let Err(e) = self.client.update_listing_status(id, &status).await {
            self.fail(&e);
            return;
        }
        // A paused listing disappears from the public feed; show the owner's own
        if status == ListingStatus::Paused {
            self.scope = Scope::Mine;
        }
        self.load_listings().await;
    }

    pub async fn delete_listing(&mut self, id: &str) {
        self.banner.clear();
        if let Err(e) = self.client.delete_listing(id).await {
            self.fail(&e);
            return;
        }
        self.load_listings().await;
    }

    // Validates, posts, then resets the form. Nothing is sent when
    // validation fails.
    pub async fn create_listing(&mut self, photos: &[Photo]) -> bool {
        self.banner.clear();
        if let Err(e) = self.create_form.validate(&self.profile) {
            self.fail(&e);
            return false;
        }
        if let Err(e) = self.client.create_listing(&self.create_form, photos).await {
            self.fail(&e);
            return false;
        }
        self.create_form = CreateListingForm::default();
        self.models.clear();
        self.load_listings().await;
        true
    }

    // --- Profile & verification ---

    pub async fn save_profile(&mut self, form: &ProfileForm) {
        self.banner.clear();
        if let Err(e) = self.client.update_profile(&form.to_payload()).await {
            self.fail(&e);
            return;
        }
        self.load_profile().await;
        self.banner = PROFILE_SAVED_BANNER.to_string();
    }

    pub async fn submit_verification(&mut self, upload: &VerificationUpload) {
        self.banner.clear();
        if let Err(e) = self.client.submit_verification(upload).await {
            self.fail(&e);
            return;
        }
        self.load_verification().await;
        self.banner = VERIFICATION_SUBMITTED_BANNER.to_string();
    }

    // --- Admin review queue ---

    pub async fn load_admin_queue(&mut self, status: &str) {
        if !self.is_admin() {
            return;
        }
        self.admin_filter = status.to_string();
        self.admin_message.clear();
        match self.client.admin_verifications(Some(status)).await {
            Ok(queue) => self.admin_queue = queue,
            Err(e) => {
                tracing::warn!(status, "Failed to load verification queue: {}", e);
                self.admin_message = humanize_api_error(&e);
                self.admin_queue.clear();
            }
        }
    }

    pub async fn admin_review(&mut self, id: &str, status: &str, note: &str) {
        self.admin_message.clear();
        if let Err(e) = self.client.admin_review(id, status, note).await {
            self.admin_message = humanize_api_error(&e);
            return;
        }
        let filter = self.admin_filter.clone();
        self.load_admin_queue(&filter).await;
        self.admin_message = format!("Updated: {}", status);
    }
}
