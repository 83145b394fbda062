// src/store/calendar.rs
//
// Synchronization store: the single in-memory authority for the cached
// event and task lists. Bridges the REST wrappers, local cache mutation,
// and push-triggered refresh. Owned by the composition root and shared
// by reference; consumers observe mutations through the change channel.

use crate::auth::SessionListener;
use crate::common::{ApiError, DateRange};
use crate::events::models::{CalendarEvent, CreateEventRequest};
use crate::events::EventsApi;
use crate::realtime::{PushChannel, PushError, UpdateCallback};
use crate::tasks::models::{CreateTaskRequest, Priority, Task};
use crate::tasks::TasksApi;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

/// Total connect+subscribe attempts before giving up on real-time sync.
const INIT_ATTEMPTS: u32 = 3;
/// Fixed (non-exponential) delay between attempts.
const INIT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Published on every cache or status mutation so consumers can react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Events,
    Tasks,
    Status,
}

#[derive(Default)]
struct CacheState {
    events: Vec<CalendarEvent>,
    tasks: Vec<Task>,
    error: Option<String>,
    // `loading` is derived from this counter, so overlapping operations
    // cannot clear each other's indicator prematurely.
    in_flight: usize,
}

pub struct CalendarStore {
    state: RwLock<CacheState>,
    changes: broadcast::Sender<StoreChange>,
    events_api: Arc<dyn EventsApi>,
    tasks_api: Arc<dyn TasksApi>,
    push: Arc<dyn PushChannel>,
    realtime_active: AtomicBool,
}

impl CalendarStore {
    pub fn new(
        events_api: Arc<dyn EventsApi>,
        tasks_api: Arc<dyn TasksApi>,
        push: Arc<dyn PushChannel>,
    ) -> Arc<Self> {
        let (changes, _) = broadcast::channel(64);
        Arc::new(Self {
            state: RwLock::new(CacheState::default()),
            changes,
            events_api,
            tasks_api,
            push,
            realtime_active: AtomicBool::new(false),
        })
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Subscribe to cache/status change notices. Slow consumers may miss
    /// notices (the channel is lossy); re-reading the snapshots is always
    /// safe.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    pub async fn events(&self) -> Vec<CalendarEvent> {
        self.state.read().await.events.clone()
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.state.read().await.tasks.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// True while at least one operation is between request and settled
    /// response.
    pub async fn loading(&self) -> bool {
        self.state.read().await.in_flight > 0
    }

    /// False means degraded pull-only mode: data operations still work,
    /// but remote changes only appear after an explicit fetch.
    pub fn realtime_sync_active(&self) -> bool {
        self.realtime_active.load(Ordering::SeqCst)
    }

    fn notify(&self, change: StoreChange) {
        // Send only fails when nobody is subscribed, which is fine.
        let _ = self.changes.send(change);
    }

    // ------------------------------------------------------------------
    // Real-time lifecycle
    // ------------------------------------------------------------------

    /// Bring up the push channel end-to-end (connect, then subscribe with
    /// a refresh callback). Retried with a fixed delay; after the budget
    /// is exhausted the store stays usable in pull-only mode and nothing
    /// propagates to the caller. A missing broker configuration is not
    /// retryable; it degrades immediately.
    pub async fn initialize(self: &Arc<Self>) {
        for attempt in 1..=INIT_ATTEMPTS {
            match self.start_realtime().await {
                Ok(()) => {
                    self.realtime_active.store(true, Ordering::SeqCst);
                    self.notify(StoreChange::Status);
                    info!(attempt, "Real-time sync active");
                    return;
                }
                Err(PushError::NotConfigured) => {
                    warn!("Real-time service not configured, continuing in pull-only mode");
                    self.realtime_active.store(false, Ordering::SeqCst);
                    self.notify(StoreChange::Status);
                    return;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Real-time sync initialization failed");
                    if attempt < INIT_ATTEMPTS {
                        sleep(INIT_RETRY_DELAY).await;
                    }
                }
            }
        }
        error!(
            attempts = INIT_ATTEMPTS,
            "Real-time sync disabled, continuing in pull-only mode"
        );
        self.realtime_active.store(false, Ordering::SeqCst);
        self.notify(StoreChange::Status);
    }

    async fn start_realtime(self: &Arc<Self>) -> Result<(), PushError> {
        self.push.connect().await?;

        let weak = Arc::downgrade(self);
        let callback: UpdateCallback = Arc::new(move || {
            if let Some(store) = weak.upgrade() {
                tokio::spawn(async move {
                    store.refresh().await;
                });
            }
        });
        self.push.subscribe_to_updates(callback).await
    }

    /// Push-triggered reconciliation: unconditionally re-fetch both
    /// lists. The push event carries no delta; it is only a signal that
    /// something changed.
    pub async fn refresh(&self) {
        debug!("Refreshing caches after update signal");
        if let Err(e) = self.fetch_events(DateRange::default()).await {
            warn!(error = %e, "Event refresh failed");
        }
        if let Err(e) = self.fetch_tasks(DateRange::default()).await {
            warn!(error = %e, "Task refresh failed");
        }
    }

    /// Tear down the push channel. Intended for logout.
    pub async fn cleanup(&self) {
        self.push.disconnect().await;
        self.realtime_active.store(false, Ordering::SeqCst);
        self.notify(StoreChange::Status);
    }

    /// Reset all cached state, e.g. after the session ends.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.events.clear();
        state.tasks.clear();
        state.error = None;
        drop(state);
        self.notify(StoreChange::Events);
        self.notify(StoreChange::Tasks);
        self.notify(StoreChange::Status);
    }

    // ------------------------------------------------------------------
    // Operation shape
    // ------------------------------------------------------------------

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.in_flight += 1;
        state.error = None;
        drop(state);
        self.notify(StoreChange::Status);
    }

    async fn settle_ok(&self) {
        let mut state = self.state.write().await;
        state.in_flight = state.in_flight.saturating_sub(1);
        drop(state);
        self.notify(StoreChange::Status);
    }

    async fn settle_err(&self, message: String) {
        let mut state = self.state.write().await;
        state.in_flight = state.in_flight.saturating_sub(1);
        state.error = Some(message);
        drop(state);
        self.notify(StoreChange::Status);
    }

    // ------------------------------------------------------------------
    // Event operations
    // ------------------------------------------------------------------

    pub async fn fetch_events(&self, range: DateRange) -> Result<(), ApiError> {
        self.begin().await;
        match self.events_api.list_events(range).await {
            Ok(events) => {
                self.state.write().await.events = events;
                self.settle_ok().await;
                self.notify(StoreChange::Events);
                Ok(())
            }
            Err(e) => {
                self.settle_err(e.to_string()).await;
                Err(e)
            }
        }
    }

    pub async fn create_event(
        &self,
        request: CreateEventRequest,
    ) -> Result<CalendarEvent, ApiError> {
        self.begin().await;
        match self.events_api.create_event(request).await {
            Ok(event) => {
                self.state.write().await.events.push(event.clone());
                self.settle_ok().await;
                self.notify(StoreChange::Events);
                Ok(event)
            }
            Err(e) => {
                self.settle_err(e.to_string()).await;
                Err(e)
            }
        }
    }

    pub async fn update_event(
        &self,
        id: i64,
        request: CreateEventRequest,
    ) -> Result<CalendarEvent, ApiError> {
        self.begin().await;
        match self.events_api.update_event(id, request).await {
            Ok(event) => {
                let mut state = self.state.write().await;
                if let Some(entry) = state.events.iter_mut().find(|e| e.id == id) {
                    *entry = event.clone();
                }
                drop(state);
                self.settle_ok().await;
                self.notify(StoreChange::Events);
                Ok(event)
            }
            Err(e) => {
                self.settle_err(e.to_string()).await;
                Err(e)
            }
        }
    }

    pub async fn delete_event(&self, id: i64) -> Result<(), ApiError> {
        self.begin().await;
        match self.events_api.delete_event(id).await {
            Ok(()) => {
                self.state.write().await.events.retain(|e| e.id != id);
                self.settle_ok().await;
                self.notify(StoreChange::Events);
                Ok(())
            }
            Err(e) => {
                self.settle_err(e.to_string()).await;
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Task operations
    // ------------------------------------------------------------------

    pub async fn fetch_tasks(&self, range: DateRange) -> Result<(), ApiError> {
        self.begin().await;
        match self.tasks_api.list_tasks(range).await {
            Ok(tasks) => {
                self.state.write().await.tasks = tasks;
                self.settle_ok().await;
                self.notify(StoreChange::Tasks);
                Ok(())
            }
            Err(e) => {
                self.settle_err(e.to_string()).await;
                Err(e)
            }
        }
    }

    pub async fn create_task(&self, request: CreateTaskRequest) -> Result<Task, ApiError> {
        self.begin().await;
        match self.tasks_api.create_task(request).await {
            Ok(task) => {
                self.state.write().await.tasks.push(task.clone());
                self.settle_ok().await;
                self.notify(StoreChange::Tasks);
                Ok(task)
            }
            Err(e) => {
                self.settle_err(e.to_string()).await;
                Err(e)
            }
        }
    }

    pub async fn update_task(
        &self,
        id: i64,
        request: CreateTaskRequest,
    ) -> Result<Task, ApiError> {
        self.begin().await;
        match self.tasks_api.update_task(id, request).await {
            Ok(task) => {
                self.replace_task(id, task.clone()).await;
                self.settle_ok().await;
                self.notify(StoreChange::Tasks);
                Ok(task)
            }
            Err(e) => {
                self.settle_err(e.to_string()).await;
                Err(e)
            }
        }
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        self.begin().await;
        match self.tasks_api.delete_task(id).await {
            Ok(()) => {
                self.state.write().await.tasks.retain(|t| t.id != id);
                self.settle_ok().await;
                self.notify(StoreChange::Tasks);
                Ok(())
            }
            Err(e) => {
                self.settle_err(e.to_string()).await;
                Err(e)
            }
        }
    }

    pub async fn toggle_task_completion(
        &self,
        id: i64,
        is_completed: bool,
    ) -> Result<Task, ApiError> {
        self.begin().await;
        match self.tasks_api.toggle_completion(id, is_completed).await {
            Ok(task) => {
                self.replace_task(id, task.clone()).await;
                self.settle_ok().await;
                self.notify(StoreChange::Tasks);
                Ok(task)
            }
            Err(e) => {
                self.settle_err(e.to_string()).await;
                Err(e)
            }
        }
    }

    pub async fn update_task_priority(
        &self,
        id: i64,
        priority: Priority,
    ) -> Result<Task, ApiError> {
        self.begin().await;
        match self.tasks_api.update_priority(id, priority).await {
            Ok(task) => {
                self.replace_task(id, task.clone()).await;
                self.settle_ok().await;
                self.notify(StoreChange::Tasks);
                Ok(task)
            }
            Err(e) => {
                self.settle_err(e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn replace_task(&self, id: i64, task: Task) {
        let mut state = self.state.write().await;
        if let Some(entry) = state.tasks.iter_mut().find(|t| t.id == id) {
            *entry = task;
        }
    }
}

/// Establishing a session is the single trigger point for starting
/// real-time sync.
#[async_trait]
impl SessionListener for Arc<CalendarStore> {
    async fn session_established(&self) {
        self.initialize().await;
    }
}
