use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use toxiscope_application::{AdminService, AnalysisFlow, AuthFailurePolicy, HistoryService, SessionStore};
use toxiscope_core::config::ClientConfig;
use toxiscope_infrastructure::{
    ConfigService, HostedAuthClient, HostedRecordStore, HostedService, HttpTransport, RestAdminClient,
    RestInferenceClient, TomlLocalStateStore, ToxiscopePaths,
};

use crate::navigator::TerminalNavigator;

pub struct App {
    pub config: ClientConfig,
    pub local_state: Arc<TomlLocalStateStore>,
    pub session: Arc<SessionStore>,
    pub inference: Arc<RestInferenceClient>,
    pub history: Arc<HistoryService>,
    pub analysis: Arc<AnalysisFlow>,
    pub admin: AdminService,
}

/// Composition root: loads config, builds the HTTP collaborators over one
/// shared transport and restores the persisted session.
pub async fn bootstrap(config_path: Option<&Path>) -> Result<App> {
    let paths = ToxiscopePaths::for_config_file(config_path);
    let config = ConfigService::load(&paths, config_path).context("Failed to load configuration")?;
    tracing::debug!(api_url = %config.api_url, data_url = %config.data_url, "Configuration loaded");

    let local_state = Arc::new(TomlLocalStateStore::new(&paths).context("Failed to open local state")?);
    let transport =
        HttpTransport::new(local_state.clone(), config.request_timeout()).context("Failed to build HTTP client")?;

    let hosted = HostedService::new(transport.clone(), &config.data_url, config.anon_key.clone());
    let auth = Arc::new(HostedAuthClient::new(hosted.clone()));
    let records = Arc::new(HostedRecordStore::new(hosted));
    let inference = Arc::new(RestInferenceClient::new(transport.clone(), &config.api_url));
    let admin_backend = Arc::new(RestAdminClient::new(transport.clone(), &config.api_url));

    let session = Arc::new(SessionStore::new(auth).with_preferences(local_state.clone()));
    transport.install_unauthorized_handler(Arc::new(AuthFailurePolicy::new(
        &session,
        local_state.clone(),
        Arc::new(TerminalNavigator),
    )));

    let state = session.initialize().await;
    tracing::debug!(authenticated = state.is_authenticated(), "Session restored");

    Ok(App {
        history: Arc::new(HistoryService::new(session.clone(), records.clone())),
        analysis: Arc::new(AnalysisFlow::new(inference.clone(), records, session.clone())),
        admin: AdminService::new(session.clone(), admin_backend),
        config,
        local_state,
        session,
        inference,
    })
}
