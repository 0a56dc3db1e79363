//! Cursor-based pagination protocol shared by every stamp-hub listing RPC.
//!
//! Every listing endpoint returns `{items, nextPaginationToken?}`. An absent
//! token means the stream is exhausted; a present token is fed back verbatim
//! (with the other filter fields unchanged) to fetch the next page.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// One page of a listing response.
///
/// Some hub endpoints name the cursor field `nextPaginationToken`, others
/// `paginationToken`; the alias accepts both so the accumulator does not
/// care which contract a given entity type follows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default, alias = "paginationToken", skip_serializing_if = "Option::is_none")]
    pub next_pagination_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_pagination_token: Option<String>) -> Self {
        Self {
            items,
            next_pagination_token,
        }
    }

    /// A final page: no cursor follows.
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// Follow cursors until the stream is exhausted or `limit` items have been
/// accumulated, fetching pages strictly sequentially (each cursor depends on
/// the previous response, so pages are never fetched concurrently and items
/// keep the store's order).
///
/// `filter` is applied to each raw page *before* the continuation check: a
/// page whose items are all filtered out does not end the accumulation as
/// long as a next-page token exists. `limit: None` drains the whole stream.
/// Truncation to `limit` happens only once, at return, so no intermediate
/// page is ever dropped.
///
/// The first failed page fetch aborts the whole accumulation; no partial
/// result is returned.
pub async fn accumulate<T, E, F, Fut>(
    mut fetch: F,
    limit: Option<usize>,
    filter: Option<&(dyn Fn(&T) -> bool + Send + Sync)>,
) -> Result<Vec<T>, E>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let mut items: Vec<T> = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let page = fetch(token.take()).await?;
        let mut batch = page.items;
        if let Some(keep) = filter {
            batch.retain(|item| keep(item));
        }
        items.extend(batch);

        token = page.next_pagination_token;
        let under_limit = limit.map_or(true, |l| items.len() < l);
        if token.is_none() || !under_limit {
            break;
        }
    }

    if let Some(l) = limit {
        items.truncate(l);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Scripted lister: hands out the given pages in order and records how
    /// many calls were made and which tokens it received.
    struct Script {
        pages: Vec<Page<&'static str>>,
        calls: AtomicUsize,
        tokens_seen: std::sync::Mutex<Vec<Option<String>>>,
    }

    impl Script {
        fn new(pages: Vec<Page<&'static str>>) -> Self {
            Self {
                pages,
                calls: AtomicUsize::new(0),
                tokens_seen: std::sync::Mutex::new(Vec::new()),
            }
        }

        async fn fetch(&self, token: Option<String>) -> Result<Page<&'static str>, String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.tokens_seen.lock().unwrap().push(token);
            self.pages
                .get(n)
                .cloned()
                .ok_or_else(|| "fetched past the last page".to_string())
        }
    }

    #[tokio::test]
    async fn single_page_without_cursor_returns_items_in_one_fetch() {
        let script = Script::new(vec![Page::last(vec!["AAA", "BBB"])]);
        let out = accumulate(|t| script.fetch(t), None, None).await.unwrap();
        assert_eq!(out, vec!["AAA", "BBB"]);
        assert_eq!(script.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn follows_cursor_and_concatenates_in_order() {
        let script = Script::new(vec![
            Page::new(vec!["AAA", "BBB"], Some("tok".into())),
            Page::last(vec!["CCC"]),
        ]);
        let out = accumulate(|t| script.fetch(t), None, None).await.unwrap();
        assert_eq!(out, vec!["AAA", "BBB", "CCC"]);
        assert_eq!(script.calls.load(Ordering::SeqCst), 2);

        let tokens = script.tokens_seen.lock().unwrap();
        assert_eq!(*tokens, vec![None, Some("tok".to_string())]);
    }

    #[tokio::test]
    async fn limit_truncates_to_first_k_items_in_fetch_order() {
        let script = Script::new(vec![
            Page::new(vec!["a", "b", "c"], Some("t1".into())),
            Page::last(vec!["d", "e"]),
        ]);
        let out = accumulate(|t| script.fetch(t), Some(4), None).await.unwrap();
        assert_eq!(out, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn limit_satisfied_by_first_page_stops_fetching() {
        let script = Script::new(vec![
            Page::new(vec!["a", "b", "c"], Some("t1".into())),
            Page::last(vec!["d"]),
        ]);
        let out = accumulate(|t| script.fetch(t), Some(2), None).await.unwrap();
        assert_eq!(out, vec!["a", "b"]);
        assert_eq!(script.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn limit_larger_than_stream_returns_everything() {
        let script = Script::new(vec![
            Page::new(vec!["a"], Some("t1".into())),
            Page::last(vec!["b"]),
        ]);
        let out = accumulate(|t| script.fetch(t), Some(100), None).await.unwrap();
        assert_eq!(out, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn fully_filtered_page_is_not_mistaken_for_end_of_stream() {
        let script = Script::new(vec![
            Page::new(vec!["skip", "skip"], Some("t1".into())),
            Page::last(vec!["keep", "skip"]),
        ]);
        let keep = |item: &&'static str| *item == "keep";
        let out = accumulate(|t| script.fetch(t), Some(10), Some(&keep))
            .await
            .unwrap();
        assert_eq!(out, vec!["keep"]);
        assert_eq!(script.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn page_error_aborts_without_partial_result() {
        // Page 2 is missing from the script, so following the cursor fails.
        let script = Script::new(vec![Page::new(vec!["a"], Some("t1".into()))]);
        let result = accumulate(|t| script.fetch(t), None, None).await;
        assert!(result.is_err());
    }

    #[test]
    fn page_deserializes_both_cursor_field_names() {
        let next: Page<String> =
            serde_json::from_str(r#"{"items":["x"],"nextPaginationToken":"t"}"#).unwrap();
        assert_eq!(next.next_pagination_token.as_deref(), Some("t"));

        let plain: Page<String> =
            serde_json::from_str(r#"{"items":["x"],"paginationToken":"t"}"#).unwrap();
        assert_eq!(plain.next_pagination_token.as_deref(), Some("t"));

        let done: Page<String> = serde_json::from_str(r#"{"items":[]}"#).unwrap();
        assert!(done.next_pagination_token.is_none());
    }
}
