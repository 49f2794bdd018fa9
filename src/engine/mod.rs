mod directions_api;
mod form_api;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    api::API,
    config::{Config, DEFAULT_FORM_TTL_SECS},
    entities::EntryForm,
    error::{invalid_input_error, Error},
    external::{google_maps::GoogleMapsClient, osrm::OsrmRouteClient, AddressResolver, RouteProvider},
};

pub type DynAddressResolver = Arc<dyn AddressResolver + Send + Sync>;
pub type DynRouteProvider = Arc<dyn RouteProvider + Send + Sync>;

pub struct Engine {
    // form service (KV store)
    forms: Mutex<HashMap<Uuid, EntryForm>>,
    form_ttl: Duration,
    resolver: DynAddressResolver,
    routes: DynRouteProvider,
}

impl Engine {
    pub fn new(resolver: DynAddressResolver, routes: DynRouteProvider) -> Self {
        Self {
            forms: Mutex::new(HashMap::new()),
            form_ttl: Duration::seconds(DEFAULT_FORM_TTL_SECS),
            resolver,
            routes,
        }
    }

    #[tracing::instrument(name = "Engine::from_config", skip_all)]
    pub fn from_config(config: &Config) -> Self {
        tracing::info!(
            "geocoding with {}, routing with {}",
            config.google_maps_api_base,
            config.osrm_url
        );

        Self::new(
            Arc::new(GoogleMapsClient::new(config)),
            Arc::new(OsrmRouteClient::new(config)),
        )
        .with_form_ttl(config.form_ttl)
    }

    pub fn with_form_ttl(mut self, form_ttl: Duration) -> Self {
        self.form_ttl = form_ttl;
        self
    }

    /// Runs `f` against the stored form while holding the store lock. Never
    /// await a provider from inside `f`.
    async fn with_form<T, F>(&self, token: Uuid, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut EntryForm) -> Result<T, Error>,
    {
        let mut forms = self.forms.lock().await;
        let form = forms.get_mut(&token).ok_or_else(invalid_input_error)?;

        f(form)
    }

    /// Stores a new form, dropping every form that outlived the TTL.
    async fn insert_form(&self, form: EntryForm) {
        let mut forms = self.forms.lock().await;
        let now = Utc::now();
        let before = forms.len();

        forms.retain(|_, stored| now - stored.created_at < self.form_ttl);

        if forms.len() < before {
            tracing::debug!("evicted {} expired form(s)", before - forms.len());
        }

        forms.insert(form.token, form);
    }

    async fn remove_form(&self, token: Uuid) -> Result<EntryForm, Error> {
        self.forms
            .lock()
            .await
            .remove(&token)
            .ok_or_else(invalid_input_error)
    }
}

impl API for Engine {}
