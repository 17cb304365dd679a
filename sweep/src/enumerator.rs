use std::collections::VecDeque;
use std::future::Future;

use crate::error::SweepResult;
use crate::types::ObjectRef;

/// One page of a listing call.
#[derive(Debug, Clone)]
pub struct ObjectPage {
    /// Keys listed on this page, in listing order.
    pub keys: Vec<String>,
    /// Continuation token for the next page, absent on the last page.
    pub next_token: Option<String>,
}

/// Paginated listing collaborator.
///
/// Implementations perform one read-only listing call per invocation and
/// surface the service's continuation token untouched.
pub trait ObjectLister {
    fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<&str>,
    ) -> impl Future<Output = SweepResult<ObjectPage>> + Send;
}

/// Lazily yields every object under a prefix, following continuation tokens
/// transparently.
///
/// The sequence reflects a point-in-time listing and is not restartable. A
/// failed listing call is fatal: the error propagates out of
/// [`ObjectEnumerator::next`] and no retry is attempted here.
#[derive(Debug)]
pub struct ObjectEnumerator<'a, L> {
    lister: &'a L,
    bucket: &'a str,
    prefix: &'a str,
    /// Keys from the current page not yet handed out.
    buffered: VecDeque<String>,
    next_token: Option<String>,
    exhausted: bool,
}

impl<'a, L> ObjectEnumerator<'a, L>
where
    L: ObjectLister,
{
    pub fn new(lister: &'a L, bucket: &'a str, prefix: &'a str) -> Self {
        Self {
            lister,
            bucket,
            prefix,
            buffered: VecDeque::new(),
            next_token: None,
            exhausted: false,
        }
    }

    /// Returns the next object, fetching further pages as needed.
    ///
    /// Pages that are empty but still carry a continuation token are skipped
    /// over; [`None`] is returned only when the listing service signals
    /// exhaustion.
    pub async fn next(&mut self) -> SweepResult<Option<ObjectRef>> {
        loop {
            if let Some(key) = self.buffered.pop_front() {
                return Ok(Some(ObjectRef::new(self.bucket, key)));
            }

            if self.exhausted {
                return Ok(None);
            }

            let page = self
                .lister
                .list_page(self.bucket, self.prefix, self.next_token.as_deref())
                .await?;

            self.buffered.extend(page.keys);
            self.next_token = page.next_token;
            if self.next_token.is_none() {
                self.exhausted = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::error::ErrorKind;
    use crate::test_utils::store::FakeObjectStore;

    #[tokio::test]
    async fn follows_continuation_tokens_across_pages() {
        let keys: Vec<String> = (0..25).map(|i| format!("logs/part-{i:02}")).collect();
        let pages = vec![
            keys[0..10].iter().map(String::as_str).collect(),
            keys[10..20].iter().map(String::as_str).collect(),
            keys[20..25].iter().map(String::as_str).collect(),
        ];
        let store = FakeObjectStore::with_pages(pages);

        let mut enumerator = ObjectEnumerator::new(&store, "bucket", "logs/");
        let mut seen = HashSet::new();
        while let Some(object) = enumerator.next().await.unwrap() {
            assert!(seen.insert(object.key.clone()));
        }

        assert_eq!(seen.len(), 25);
        assert_eq!(store.list_calls(), 3);
    }

    #[tokio::test]
    async fn empty_listing_yields_nothing() {
        let store = FakeObjectStore::with_pages(vec![vec![]]);

        let mut enumerator = ObjectEnumerator::new(&store, "bucket", "");
        assert!(enumerator.next().await.unwrap().is_none());
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn skips_empty_pages_that_carry_a_token() {
        let store = FakeObjectStore::with_pages(vec![vec!["a"], vec![], vec!["b"]]);

        let mut enumerator = ObjectEnumerator::new(&store, "bucket", "");
        assert_eq!(enumerator.next().await.unwrap().unwrap().key, "a");
        assert_eq!(enumerator.next().await.unwrap().unwrap().key, "b");
        assert!(enumerator.next().await.unwrap().is_none());
        assert_eq!(store.list_calls(), 3);
    }

    #[tokio::test]
    async fn listing_failure_is_fatal() {
        let store = FakeObjectStore::with_pages(vec![vec!["a", "b"], vec!["c"]]);
        store.fail_listing_of_page(1).await;

        let mut enumerator = ObjectEnumerator::new(&store, "bucket", "");
        assert!(enumerator.next().await.unwrap().is_some());
        assert!(enumerator.next().await.unwrap().is_some());

        let err = enumerator.next().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EnumerationFailed);
    }
}
