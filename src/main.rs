// src/main.rs
//
// Demo binary: wires the full client core together against a running
// backend, logs in with credentials from the environment, loads both
// caches, and prints change notices until interrupted.

use agenda_client::auth::models::LoginData;
use agenda_client::google::GoogleCalendarApi;
use agenda_client::{
    ApiConfig, AuthService, CalendarStore, CredentialStore, DateRange, EventService,
    GoogleCalendarService, PusherClient, SessionListener, TaskService,
};
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // COMPOSITION ROOT
    // ========================================================================

    let config = ApiConfig::from_env();
    info!("Using backend at {}", config.base_url);

    let credentials = Arc::new(CredentialStore::with_default_dir());
    let auth = AuthService::new(config.clone(), credentials.clone());

    let events_api = Arc::new(EventService::new(&config, credentials.clone()));
    let tasks_api = Arc::new(TaskService::new(&config, credentials.clone()));
    let google = GoogleCalendarService::new(&config, credentials.clone());
    let push = Arc::new(PusherClient::new(&config, credentials.clone()));

    let store = CalendarStore::new(events_api, tasks_api, push);
    credentials
        .set_session_listener(Arc::new(store.clone()) as Arc<dyn SessionListener>)
        .await;

    // ========================================================================
    // SESSION
    // ========================================================================

    if auth.is_authenticated().await {
        info!("Reusing persisted session");
        store.initialize().await;
    } else {
        let email = env::var("AGENDA_EMAIL")?;
        let password = env::var("AGENDA_PASSWORD")?;
        auth.login(LoginData { email, password }).await?;
        info!("Logged in");
        // Real-time sync is started by the session-established hook.
    }

    store.fetch_events(DateRange::default()).await?;
    store.fetch_tasks(DateRange::default()).await?;
    info!(
        events = store.events().await.len(),
        tasks = store.tasks().await.len(),
        realtime = store.realtime_sync_active(),
        google_connected = google.connection_status().await,
        "Initial load complete"
    );

    // ========================================================================
    // OBSERVE UNTIL INTERRUPTED
    // ========================================================================

    let mut changes = store.subscribe_changes();
    loop {
        tokio::select! {
            change = changes.recv() => match change {
                Ok(change) => info!(?change, "Store changed"),
                Err(_) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    store.cleanup().await;
    if let Err(e) = auth.logout().await {
        warn!(error = %e, "Logout failed");
    }
    Ok(())
}
