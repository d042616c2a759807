//! Notification read state.
//!
//! The dropdown shows a cached list fetched from the backend. Marking a
//! notification as read is not applied optimistically: the mutation is sent
//! first, and only on success is the cached entry invalidated so the next
//! refresh picks up the server's view. A failed mutation leaves the cache as
//! it was and reports whether a retry makes sense.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::errors::{ApiError, NotificationError};
use crate::notifications::Notification;

/// Backend calls the notification center depends on.
#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// Fetch the current user's notifications, newest first.
    async fn fetch_notifications(&self) -> Result<Vec<Notification>, ApiError>;

    /// Mark one notification as read on the server.
    async fn mark_read(&self, id: &str) -> Result<(), ApiError>;
}

/// Outcome of a successful [`NotificationCenter::mark_as_read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkReadOutcome {
    /// The server accepted the mutation; the entry is now stale.
    Marked,
    /// The cached entry was already read; nothing was sent.
    AlreadyRead,
}

/// Cached notification list with per-entry invalidation.
#[derive(Debug, Default)]
pub struct ReadStateCache {
    entries: Vec<Notification>,
    stale_ids: HashSet<String>,
    loaded: bool,
}

impl ReadStateCache {
    fn replace(&mut self, entries: Vec<Notification>) {
        self.entries = entries;
        self.stale_ids.clear();
        self.loaded = true;
    }

    fn invalidate(&mut self, id: &str) {
        self.stale_ids.insert(id.to_string());
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.entries.iter().find(|n| n.id == id)
    }

    pub fn is_stale(&self, id: &str) -> bool {
        self.stale_ids.contains(id)
    }

    /// True before the first load or after any entry was invalidated.
    pub fn needs_refresh(&self) -> bool {
        !self.loaded || !self.stale_ids.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Notification dropdown state bound to one backend.
pub struct NotificationCenter<A: NotificationApi> {
    api: Arc<A>,
    cache: ReadStateCache,
}

impl<A: NotificationApi> NotificationCenter<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            cache: ReadStateCache::default(),
        }
    }

    pub fn cache(&self) -> &ReadStateCache {
        &self.cache
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.cache.iter()
    }

    pub fn unread_count(&self) -> usize {
        self.cache.unread_count()
    }

    pub fn needs_refresh(&self) -> bool {
        self.cache.needs_refresh()
    }

    /// Refetch the list. On failure the previous list stays in place.
    pub async fn refresh(&mut self) -> Result<usize, NotificationError> {
        match self.api.fetch_notifications().await {
            Ok(list) => {
                debug!(count = list.len(), "notifications refreshed");
                self.cache.replace(list);
                Ok(self.cache.len())
            }
            Err(source) => {
                warn!(error = %source, "notification fetch failed");
                Err(NotificationError::FetchFailed {
                    retryable: source.is_retryable(),
                    source,
                })
            }
        }
    }

    /// Refetch only if something was invalidated. Returns whether it fetched.
    pub async fn refresh_if_stale(&mut self) -> Result<bool, NotificationError> {
        if !self.cache.needs_refresh() {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    /// Send the mark-as-read mutation for `id`.
    pub async fn mark_as_read(&mut self, id: &str) -> Result<MarkReadOutcome, NotificationError> {
        let already_read = self
            .cache
            .get(id)
            .ok_or_else(|| NotificationError::NotFound(id.to_string()))?
            .read;
        // A stale entry was already accepted by the backend; the cached flag
        // only catches up on the next refresh.
        if already_read || self.cache.is_stale(id) {
            return Ok(MarkReadOutcome::AlreadyRead);
        }

        match self.api.mark_read(id).await {
            Ok(()) => {
                debug!(id, "notification marked read; entry invalidated");
                self.cache.invalidate(id);
                Ok(MarkReadOutcome::Marked)
            }
            Err(source) => {
                warn!(id, error = %source, "mark-as-read failed");
                Err(NotificationError::MutationFailed {
                    id: id.to_string(),
                    retryable: source.is_retryable(),
                    source,
                })
            }
        }
    }
}

/// In-process backend for tests and demos.
#[derive(Default)]
pub struct InMemoryNotificationApi {
    notifications: RwLock<Vec<Notification>>,
    fail_next_mark: RwLock<Option<ApiError>>,
    fail_next_fetch: RwLock<Option<ApiError>>,
    mark_calls: AtomicUsize,
}

impl InMemoryNotificationApi {
    pub fn new(notifications: Vec<Notification>) -> Self {
        Self {
            notifications: RwLock::new(notifications),
            ..Default::default()
        }
    }

    pub fn new_shared(notifications: Vec<Notification>) -> Arc<Self> {
        Arc::new(Self::new(notifications))
    }

    pub async fn push(&self, notification: Notification) {
        self.notifications.write().await.insert(0, notification);
    }

    /// Make the next `mark_read` call fail with `err`.
    pub async fn fail_next_mark(&self, err: ApiError) {
        *self.fail_next_mark.write().await = Some(err);
    }

    /// Make the next `fetch_notifications` call fail with `err`.
    pub async fn fail_next_fetch(&self, err: ApiError) {
        *self.fail_next_fetch.write().await = Some(err);
    }

    pub fn mark_calls(&self) -> usize {
        self.mark_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationApi for InMemoryNotificationApi {
    async fn fetch_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        if let Some(err) = self.fail_next_fetch.write().await.take() {
            return Err(err);
        }
        Ok(self.notifications.read().await.clone())
    }

    async fn mark_read(&self, id: &str) -> Result<(), ApiError> {
        self.mark_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_next_mark.write().await.take() {
            return Err(err);
        }
        let mut list = self.notifications.write().await;
        let entry = list
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        entry.read = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationCategory;
    use chrono::{TimeZone, Utc};

    fn note(id: &str, category: NotificationCategory, read: bool) -> Notification {
        Notification {
            id: id.to_string(),
            category,
            title: format!("title {id}"),
            body: String::new(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap(),
            read,
        }
    }

    fn seeded() -> Arc<InMemoryNotificationApi> {
        InMemoryNotificationApi::new_shared(vec![
            note("n1", NotificationCategory::FeeDue, false),
            note("n2", NotificationCategory::Reminder, false),
            note("n3", NotificationCategory::Announcement, true),
        ])
    }

    #[tokio::test]
    async fn test_needs_refresh_before_first_load() {
        let mut center = NotificationCenter::new(seeded());
        assert!(center.needs_refresh());
        assert!(center.cache().is_empty());
        assert_eq!(center.refresh().await.unwrap(), 3);
        assert!(!center.cache().is_empty());
        assert!(!center.needs_refresh());
        assert_eq!(center.unread_count(), 2);
    }

    #[tokio::test]
    async fn test_mark_read_invalidates_then_refetches() {
        let api = seeded();
        let mut center = NotificationCenter::new(api.clone());
        center.refresh().await.unwrap();

        assert_eq!(center.mark_as_read("n1").await.unwrap(), MarkReadOutcome::Marked);
        assert!(center.cache().is_stale("n1"));
        assert!(center.needs_refresh());
        // Not optimistic: cached entry still unread until refetched.
        assert_eq!(center.unread_count(), 2);

        assert!(center.refresh_if_stale().await.unwrap());
        assert!(!center.cache().is_stale("n1"));
        assert_eq!(center.unread_count(), 1);
        assert!(center.cache().get("n1").unwrap().read);

        assert!(!center.refresh_if_stale().await.unwrap());
    }

    #[tokio::test]
    async fn test_second_mark_before_refresh_skips_backend() {
        let api = seeded();
        let mut center = NotificationCenter::new(api.clone());
        center.refresh().await.unwrap();

        assert_eq!(center.mark_as_read("n1").await.unwrap(), MarkReadOutcome::Marked);
        assert_eq!(center.mark_as_read("n1").await.unwrap(), MarkReadOutcome::AlreadyRead);
        assert_eq!(api.mark_calls(), 1);

        center.refresh().await.unwrap();
        assert_eq!(center.mark_as_read("n1").await.unwrap(), MarkReadOutcome::AlreadyRead);
        assert_eq!(api.mark_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_cache_untouched() {
        let api = seeded();
        let mut center = NotificationCenter::new(api.clone());
        center.refresh().await.unwrap();

        api.fail_next_mark(ApiError::Status(503)).await;
        let err = center.mark_as_read("n2").await.unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(err, NotificationError::MutationFailed { ref id, .. } if id == "n2"));
        assert!(!center.cache().is_stale("n2"));
        assert!(!center.needs_refresh());
        assert_eq!(center.unread_count(), 2);

        // retry succeeds
        assert_eq!(center.mark_as_read("n2").await.unwrap(), MarkReadOutcome::Marked);
        assert_eq!(api.mark_calls(), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_failure() {
        let api = seeded();
        let mut center = NotificationCenter::new(api.clone());
        center.refresh().await.unwrap();

        api.fail_next_mark(ApiError::Status(403)).await;
        let err = center.mark_as_read("n1").await.unwrap_err();
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_unknown_and_already_read_skip_backend() {
        let api = seeded();
        let mut center = NotificationCenter::new(api.clone());
        center.refresh().await.unwrap();

        assert_eq!(
            center.mark_as_read("missing").await.unwrap_err(),
            NotificationError::NotFound("missing".into())
        );
        assert_eq!(center.mark_as_read("n3").await.unwrap(), MarkReadOutcome::AlreadyRead);
        assert_eq!(api.mark_calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_list() {
        let api = seeded();
        let mut center = NotificationCenter::new(api.clone());
        center.refresh().await.unwrap();

        api.push(note("n4", NotificationCategory::Chat, false)).await;
        api.fail_next_fetch(ApiError::Request("timeout".into())).await;

        let err = center.refresh().await.unwrap_err();
        assert!(matches!(err, NotificationError::FetchFailed { retryable: true, .. }));
        assert_eq!(center.notifications().count(), 3);

        center.refresh().await.unwrap();
        assert_eq!(center.notifications().next().unwrap().id, "n4");
    }
}
