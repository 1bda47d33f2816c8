use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use shelter_pages_core::auth::TokenService;
use shelter_pages_core::homepage::{HomepageEditor, HomepageSession};
use shelter_pages_core::items::{Animal, Campaign, ItemSchema, NewsItem};
use shelter_pages_core::session::EditSession;
use shelter_pages_core::{DocumentStore, PageCollectionEditor};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};

struct Entry<T> {
    session: Arc<Mutex<T>>,
    touched: Instant,
}

/// Open edit sessions of one kind, keyed by session id.
///
/// A session untouched for longer than the idle timeout is discarded, along
/// with any uploads it still holds.
pub struct SessionRegistry<T> {
    sessions: RwLock<HashMap<Uuid, Entry<T>>>,
    idle_timeout: Duration,
}

impl<T> SessionRegistry<T> {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub async fn open(&self, session: T) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        Self::retain_active(&mut sessions, self.idle_timeout);
        sessions.insert(
            id,
            Entry {
                session: Arc::new(Mutex::new(session)),
                touched: Instant::now(),
            },
        );
        id
    }

    /// Look up a session and mark it as used.
    pub async fn get(&self, id: Uuid) -> ApiResult<Arc<Mutex<T>>> {
        let mut sessions = self.sessions.write().await;
        let expired = match sessions.get_mut(&id) {
            Some(entry) if entry.touched.elapsed() <= self.idle_timeout => {
                entry.touched = Instant::now();
                return Ok(entry.session.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.remove(&id);
            tracing::info!(session = %id, "idle edit session discarded");
        }
        Err(ApiError::NotFound(format!("edit session {id}")))
    }

    /// Drop a session. Returns whether it existed.
    pub async fn close(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Discard every idle session and return how many were dropped.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        Self::retain_active(&mut sessions, self.idle_timeout)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn retain_active(sessions: &mut HashMap<Uuid, Entry<T>>, idle_timeout: Duration) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| entry.touched.elapsed() <= idle_timeout);
        before - sessions.len()
    }
}

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    store: Arc<dyn DocumentStore>,
    config: AppConfig,
    tokens: TokenService,
    animals: SessionRegistry<EditSession<Animal>>,
    campaigns: SessionRegistry<EditSession<Campaign>>,
    news: SessionRegistry<EditSession<NewsItem>>,
    homepage: SessionRegistry<HomepageSession>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: AppConfig) -> Self {
        let tokens = TokenService::new(&config.jwt_secret);
        let idle = config.session_idle_timeout();
        Self {
            inner: Arc::new(InnerState {
                store,
                config,
                tokens,
                animals: SessionRegistry::new(idle),
                campaigns: SessionRegistry::new(idle),
                news: SessionRegistry::new(idle),
                homepage: SessionRegistry::new(idle),
            }),
        }
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        self.inner.store.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    pub fn editor<S: ItemSchema>(&self) -> PageCollectionEditor<S> {
        PageCollectionEditor::new(self.store(), self.inner.config.save_concurrency)
    }

    pub fn homepage_editor(&self) -> HomepageEditor {
        HomepageEditor::new(self.store())
    }

    pub fn animal_sessions(&self) -> &SessionRegistry<EditSession<Animal>> {
        &self.inner.animals
    }

    pub fn campaign_sessions(&self) -> &SessionRegistry<EditSession<Campaign>> {
        &self.inner.campaigns
    }

    pub fn news_sessions(&self) -> &SessionRegistry<EditSession<NewsItem>> {
        &self.inner.news
    }

    pub fn homepage_sessions(&self) -> &SessionRegistry<HomepageSession> {
        &self.inner.homepage
    }

    /// Number of edit sessions currently open, across every page.
    pub async fn open_sessions(&self) -> usize {
        self.inner.animals.len().await
            + self.inner.campaigns.len().await
            + self.inner.news.len().await
            + self.inner.homepage.len().await
    }

    /// Sweep idle sessions out of every registry.
    pub async fn evict_idle_sessions(&self) -> usize {
        self.inner.animals.evict_idle().await
            + self.inner.campaigns.evict_idle().await
            + self.inner.news.evict_idle().await
            + self.inner.homepage.evict_idle().await
    }
}
