use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::enumerator::{ObjectLister, ObjectPage};
use crate::error::{ErrorKind, SweepResult};
use crate::remover::ObjectRemover;
use crate::sweep_error;
use crate::types::ObjectRef;

#[derive(Debug)]
struct Inner {
    /// Listing pages, returned in order with synthetic continuation tokens.
    pages: Vec<Vec<String>>,
    /// Keys whose delete fails with an injected error.
    failing_keys: HashSet<String>,
    /// Keys whose delete panics instead of returning.
    panicking_keys: HashSet<String>,
    /// Page index whose listing call fails.
    failing_page: Option<usize>,
    /// Upper bound for a random delay applied to every delete.
    max_delete_delay: Option<Duration>,
    /// Fixed delay applied to every listing call.
    page_delay: Option<Duration>,
    /// Every delete attempt, in the order the workers made them.
    attempts: Vec<ObjectRef>,
    /// Successfully deleted objects.
    deleted: Vec<ObjectRef>,
}

/// In-memory object store standing in for both pipeline collaborators.
///
/// Listing serves the configured pages with continuation tokens; deleting
/// records the attempt and honors the configured fault and delay injection.
#[derive(Debug, Clone)]
pub struct FakeObjectStore {
    inner: Arc<Mutex<Inner>>,
    list_calls: Arc<AtomicUsize>,
}

impl FakeObjectStore {
    /// Creates a store that lists the given pages.
    pub fn with_pages(pages: Vec<Vec<&str>>) -> Self {
        let inner = Inner {
            pages: pages
                .into_iter()
                .map(|page| page.into_iter().map(str::to_string).collect())
                .collect(),
            failing_keys: HashSet::new(),
            panicking_keys: HashSet::new(),
            failing_page: None,
            max_delete_delay: None,
            page_delay: None,
            attempts: Vec::new(),
            deleted: Vec::new(),
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
            list_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a store listing `count` generated keys split into pages of
    /// `page_size`.
    pub fn with_generated_keys(count: usize, page_size: usize) -> Self {
        let keys: Vec<String> = (0..count).map(|i| format!("key-{i:05}")).collect();
        let pages = keys
            .chunks(page_size)
            .map(|chunk| chunk.iter().map(String::as_str).collect())
            .collect();

        Self::with_pages(pages)
    }

    /// Makes every delete of `key` fail.
    pub async fn fail_delete_of(&self, key: &str) {
        let mut inner = self.inner.lock().await;
        inner.failing_keys.insert(key.to_string());
    }

    /// Makes every delete of `key` panic.
    pub async fn panic_on_delete_of(&self, key: &str) {
        let mut inner = self.inner.lock().await;
        inner.panicking_keys.insert(key.to_string());
    }

    /// Makes the listing call for the page at `index` fail.
    pub async fn fail_listing_of_page(&self, index: usize) {
        let mut inner = self.inner.lock().await;
        inner.failing_page = Some(index);
    }

    /// Delays every delete by a random duration up to `max`.
    pub async fn randomize_delete_delay(&self, max: Duration) {
        let mut inner = self.inner.lock().await;
        inner.max_delete_delay = Some(max);
    }

    /// Delays every listing call by `delay`, simulating a slow enumerator.
    pub async fn delay_pages(&self, delay: Duration) {
        let mut inner = self.inner.lock().await;
        inner.page_delay = Some(delay);
    }

    /// Number of listing calls made so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Every delete attempt made so far, in order.
    pub async fn delete_attempts(&self) -> Vec<ObjectRef> {
        let inner = self.inner.lock().await;
        inner.attempts.clone()
    }

    /// Successfully deleted objects, in order.
    pub async fn deleted_objects(&self) -> Vec<ObjectRef> {
        let inner = self.inner.lock().await;
        inner.deleted.clone()
    }
}

impl ObjectLister for FakeObjectStore {
    async fn list_page(
        &self,
        _bucket: &str,
        _prefix: &str,
        continuation: Option<&str>,
    ) -> SweepResult<ObjectPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let (page, delay) = {
            let inner = self.inner.lock().await;

            let index = continuation
                .map(|token| token.parse::<usize>().expect("malformed test token"))
                .unwrap_or(0);

            if inner.failing_page == Some(index) {
                return Err(sweep_error!(
                    ErrorKind::EnumerationFailed,
                    "Failed to list objects",
                    format!("injected listing failure on page {index}")
                ));
            }

            let keys = inner.pages.get(index).cloned().unwrap_or_default();
            let next_token = if index + 1 < inner.pages.len() {
                Some((index + 1).to_string())
            } else {
                None
            };

            (ObjectPage { keys, next_token }, inner.page_delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(page)
    }
}

impl ObjectRemover for FakeObjectStore {
    async fn delete_object(&self, object: &ObjectRef) -> SweepResult<()> {
        let delay = {
            let mut inner = self.inner.lock().await;
            inner.attempts.push(object.clone());

            inner.max_delete_delay.map(|max| {
                let mut rng = rand::thread_rng();
                rng.gen_range(Duration::ZERO..=max)
            })
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.lock().await;

        if inner.panicking_keys.contains(&object.key) {
            panic!("injected panic while deleting {object}");
        }

        if inner.failing_keys.contains(&object.key) {
            return Err(sweep_error!(
                ErrorKind::DeleteFailed,
                "Failed to delete object",
                format!("injected delete failure for {object}")
            ));
        }

        inner.deleted.push(object.clone());

        Ok(())
    }
}
