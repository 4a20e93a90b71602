//! List-fetch controller.
//!
//! Adapts a paginated, searchable source into the view state a list screen
//! renders. Search input is debounced before it becomes a query argument, a
//! new effective search term resets the page cursor, and only the newest
//! request may update the state: each request carries a generation number,
//! older in-flight requests are cancelled, and late completions from older
//! generations are discarded.
//!
//! The controller is driven from the render loop: [`ListController::tick`]
//! fires expired debounce timers, reacts to cache invalidations and applies
//! finished requests.

use super::cache::{Invalidation, QueryCache, QueryKey};
use super::params::{Filters, ListParams, DEFAULT_PAGE_SIZE};
use super::tag::Tag;
use crate::api::{ApiError, Page};
use async_trait::async_trait;
use log::*;
use std::{sync::Arc, time::Duration};
use tokio::sync::{
    broadcast::{self, error::TryRecvError},
    mpsc,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Delay between the last keystroke and the search request.
///
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);

/// A paginated, searchable query the controller can issue.
///
#[async_trait]
pub trait ListSource<T>: Send + Sync {
    /// Cache namespace of the query.
    fn endpoint(&self) -> &str;

    /// Tags attached to every cached page.
    fn tags(&self) -> Vec<Tag>;

    async fn fetch(&self, params: &ListParams) -> Result<Page<T>, ApiError>;
}

/// Static configuration of a controller.
///
#[derive(Clone, Debug)]
pub struct ListOptions {
    pub limit: u32,
    pub filters: Filters,
    pub skip: bool,
    pub debounce: Duration,
}

impl Default for ListOptions {
    fn default() -> Self {
        ListOptions {
            limit: DEFAULT_PAGE_SIZE,
            filters: Filters::default(),
            skip: false,
            debounce: SEARCH_DEBOUNCE,
        }
    }
}

/// What a list screen renders.
///
#[derive(Clone, Debug, PartialEq)]
pub struct ListViewState<T> {
    pub search_term: String,
    pub current_page: u32,
    pub page_size: u32,
    pub items: Vec<T>,
    pub total: u64,
    pub total_pages: u32,
    pub is_loading: bool,
    pub is_error: bool,
    pub error: Option<String>,
    pub has_loaded: bool,
}

impl<T> ListViewState<T> {
    fn new(page_size: u32) -> Self {
        ListViewState {
            search_term: String::new(),
            current_page: 1,
            page_size,
            items: Vec::new(),
            total: 0,
            total_pages: 0,
            is_loading: false,
            is_error: false,
            error: None,
            has_loaded: false,
        }
    }

    /// Return true once a response arrived and it held no rows.
    ///
    pub fn is_empty(&self) -> bool {
        self.has_loaded && self.items.is_empty()
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    /// Return the 1-based positions of the first and last visible rows.
    ///
    pub fn visible_range(&self) -> Option<(u64, u64)> {
        if self.items.is_empty() {
            return None;
        }
        let first = u64::from(self.current_page - 1) * u64::from(self.page_size) + 1;
        Some((first, first + self.items.len() as u64 - 1))
    }
}

struct Completion<T> {
    generation: u64,
    result: Result<Arc<Page<T>>, ApiError>,
}

/// Owns the list view state of one mounted list screen.
///
pub struct ListController<T> {
    source: Arc<dyn ListSource<T>>,
    cache: Arc<QueryCache>,
    tags: Vec<Tag>,
    options: ListOptions,
    search_input: String,
    search_deadline: Option<Instant>,
    state: ListViewState<T>,
    generation: u64,
    in_flight: Option<CancellationToken>,
    tx: mpsc::UnboundedSender<Completion<T>>,
    rx: mpsc::UnboundedReceiver<Completion<T>>,
    invalidations: broadcast::Receiver<Invalidation>,
}

impl<T: Clone + Send + Sync + 'static> ListController<T> {
    /// Mount a controller and issue the first request unless skipped. Must
    /// be called within a tokio runtime.
    ///
    pub fn new(source: Arc<dyn ListSource<T>>, cache: Arc<QueryCache>, mut options: ListOptions) -> Self {
        options.limit = options.limit.max(1);
        let (tx, rx) = mpsc::unbounded_channel();
        let invalidations = cache.subscribe();
        let tags = source.tags();
        let mut controller = ListController {
            source,
            cache,
            tags,
            state: ListViewState::new(options.limit),
            options,
            search_input: String::new(),
            search_deadline: None,
            generation: 0,
            in_flight: None,
            tx,
            rx,
            invalidations,
        };
        controller.issue(false);
        controller
    }

    pub fn state(&self) -> &ListViewState<T> {
        &self.state
    }

    /// Raw search text typed so far, which may not be effective yet.
    ///
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// Return true while typed search text waits for the debounce delay.
    ///
    pub fn is_search_pending(&self) -> bool {
        self.search_deadline.is_some()
    }

    pub fn filters(&self) -> &Filters {
        &self.options.filters
    }

    pub fn is_skipped(&self) -> bool {
        self.options.skip
    }

    /// Arguments of the current request.
    ///
    pub fn params(&self) -> ListParams {
        ListParams::new(self.state.current_page, self.options.limit)
            .with_search(&self.state.search_term)
            .with_filters(self.options.filters.clone())
    }

    /// Record search input. The term becomes effective once no further
    /// input arrived for the debounce delay.
    ///
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_input = term.into();
        if self.search_input.trim() == self.state.search_term {
            self.search_deadline = None;
        } else {
            self.search_deadline = Some(Instant::now() + self.options.debounce);
        }
    }

    /// Make pending search input effective without waiting.
    ///
    pub fn flush_search(&mut self) -> bool {
        if self.search_deadline.take().is_some() {
            self.apply_search()
        } else {
            false
        }
    }

    /// Move the page cursor. Page 0 is read as page 1; pages beyond the
    /// known page count are sent to the server as they are.
    ///
    pub fn set_current_page(&mut self, page: u32) {
        let page = page.max(1);
        if page == self.state.current_page {
            return;
        }
        self.state.current_page = page;
        self.issue(false);
    }

    pub fn next_page(&mut self) {
        if self.state.has_next_page() {
            self.set_current_page(self.state.current_page + 1);
        }
    }

    pub fn previous_page(&mut self) {
        if self.state.has_previous_page() {
            self.set_current_page(self.state.current_page - 1);
        }
    }

    /// Replace the static filters and start over from page 1.
    ///
    pub fn set_filters(&mut self, filters: Filters) {
        if filters == self.options.filters {
            return;
        }
        self.options.filters = filters;
        self.state.current_page = 1;
        self.issue(false);
    }

    /// Suspend or resume fetching. A skipped controller is never loading.
    ///
    pub fn set_skip(&mut self, skip: bool) {
        if self.options.skip == skip {
            return;
        }
        self.options.skip = skip;
        if skip {
            self.generation += 1;
            self.cancel_in_flight();
            self.state.is_loading = false;
        } else {
            self.issue(false);
        }
    }

    /// Re-issue the current request, bypassing cached data.
    ///
    pub fn refetch(&mut self) {
        self.issue(true);
    }

    /// Advance timers and apply everything that arrived since the last
    /// tick. Returns true if the view state changed.
    ///
    pub fn tick(&mut self) -> bool {
        let mut changed = false;

        if let Some(deadline) = self.search_deadline {
            if Instant::now() >= deadline {
                self.search_deadline = None;
                changed |= self.apply_search();
            }
        }

        while let Ok(completion) = self.rx.try_recv() {
            changed |= self.apply(completion);
        }

        if self.drain_invalidations() {
            debug!("{} invalidated, refetching", self.source.endpoint());
            self.issue(false);
            changed = true;
        }

        changed
    }

    /// Wait until the current request finished and apply it.
    ///
    pub async fn settle(&mut self) {
        while self.state.is_loading {
            match self.rx.recv().await {
                Some(completion) => {
                    self.apply(completion);
                }
                None => break,
            }
        }
    }

    fn apply_search(&mut self) -> bool {
        let term = self.search_input.trim().to_owned();
        if term == self.state.search_term {
            return false;
        }
        debug!("Searching {} for {:?}", self.source.endpoint(), term);
        self.state.search_term = term;
        self.state.current_page = 1;
        self.issue(false);
        true
    }

    fn drain_invalidations(&mut self) -> bool {
        let mut stale = false;
        loop {
            match self.invalidations.try_recv() {
                Ok(invalidation) => stale |= invalidation.touches(&self.tags),
                Err(TryRecvError::Lagged(missed)) => {
                    warn!("Missed {} invalidations, refetching", missed);
                    stale = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        stale
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }

    fn issue(&mut self, force: bool) {
        self.generation += 1;
        self.cancel_in_flight();
        if self.options.skip {
            self.state.is_loading = false;
            return;
        }

        let generation = self.generation;
        let params = self.params();
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());
        self.state.is_loading = true;
        self.state.is_error = false;
        self.state.error = None;

        debug!(
            "Issuing {} request #{} {:?}",
            self.source.endpoint(),
            generation,
            params
        );

        let source = Arc::clone(&self.source);
        let cache = Arc::clone(&self.cache);
        let tags = self.tags.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let key = QueryKey::new(source.endpoint(), params.clone());
            let fetch = || source.fetch(&params);
            let request = async {
                if force {
                    cache.refresh(key, &tags, fetch).await
                } else {
                    cache.query(key, &tags, fetch).await
                }
            };
            tokio::select! {
                _ = token.cancelled() => {
                    trace!("Request #{} cancelled", generation);
                }
                result = request => {
                    // The receiver is gone once the screen unmounted.
                    let _ = tx.send(Completion { generation, result });
                }
            }
        });
    }

    fn apply(&mut self, completion: Completion<T>) -> bool {
        if completion.generation != self.generation {
            debug!(
                "Discarding stale response #{} (current #{})",
                completion.generation, self.generation
            );
            return false;
        }
        self.in_flight = None;
        self.state.is_loading = false;

        match completion.result {
            Ok(page) => {
                let limit = self.options.limit as usize;
                if page.data.len() > limit {
                    warn!(
                        "{} returned {} rows for a page of {}, truncating",
                        self.source.endpoint(),
                        page.data.len(),
                        limit
                    );
                }
                self.state.items = page.data.iter().take(limit).cloned().collect();
                self.state.total = page.meta.total;
                self.state.total_pages = page.total_pages(self.options.limit);
                self.state.has_loaded = true;
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", self.source.endpoint(), e);
                self.state.is_error = true;
                self.state.error = Some(e.to_string());
            }
        }
        true
    }
}

impl<T> Drop for ListController<T> {
    fn drop(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PageMeta;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    struct NumberSource {
        records: Vec<u32>,
        tags: Vec<Tag>,
        calls: Mutex<Vec<ListParams>>,
        gates: Mutex<HashMap<u32, oneshot::Receiver<()>>>,
        fail: AtomicBool,
        oversize: AtomicBool,
    }

    impl NumberSource {
        fn new(count: u32, tags: Vec<Tag>) -> Arc<Self> {
            Arc::new(NumberSource {
                records: (1..=count).collect(),
                tags,
                calls: Mutex::new(Vec::new()),
                gates: Mutex::new(HashMap::new()),
                fail: AtomicBool::new(false),
                oversize: AtomicBool::new(false),
            })
        }

        /// Hold requests for the page until the returned sender fires.
        fn gate(&self, page: u32) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(page, rx);
            tx
        }

        fn calls(&self) -> Vec<ListParams> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ListSource<u32> for NumberSource {
        fn endpoint(&self) -> &str {
            "numbers"
        }

        fn tags(&self) -> Vec<Tag> {
            self.tags.clone()
        }

        async fn fetch(&self, params: &ListParams) -> Result<Page<u32>, ApiError> {
            self.calls.lock().unwrap().push(params.clone());
            let gate = self.gates.lock().unwrap().remove(&params.page);
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(ApiError::Status {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            let matching: Vec<u32> = self
                .records
                .iter()
                .copied()
                .filter(|n| match params.search_term {
                    Some(ref term) => n.to_string().contains(term.as_str()),
                    None => true,
                })
                .collect();
            let size = if self.oversize.load(Ordering::SeqCst) {
                params.limit as usize * 2
            } else {
                params.limit as usize
            };
            let start = (params.page as usize - 1) * params.limit as usize;
            let data = matching.iter().skip(start).take(size).copied().collect();
            Ok(Page {
                data,
                meta: PageMeta {
                    page: params.page,
                    limit: params.limit,
                    total: matching.len() as u64,
                    total_pages: None,
                },
            })
        }
    }

    fn controller(source: &Arc<NumberSource>, cache: &Arc<QueryCache>, options: ListOptions) -> ListController<u32> {
        ListController::new(source.clone(), cache.clone(), options)
    }

    fn cache() -> Arc<QueryCache> {
        Arc::new(QueryCache::default())
    }

    #[tokio::test]
    async fn test_first_page_of_25() {
        let source = NumberSource::new(25, vec![Tag::Courses]);
        let mut list = controller(&source, &cache(), ListOptions::default());
        assert!(list.state().is_loading);
        assert!(list.state().items.is_empty());

        list.settle().await;
        let state = list.state();
        assert_eq!(state.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(state.total, 25);
        assert_eq!(state.total_pages, 3);
        assert_eq!(state.visible_range(), Some((1, 10)));
        assert!(!state.is_loading);
        assert!(state.has_next_page());
        assert!(!state.has_previous_page());
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_resets_page() {
        let source = NumberSource::new(25, vec![Tag::Courses]);
        let mut list = controller(&source, &cache(), ListOptions::default());
        list.settle().await;

        list.set_search_term("1");
        tokio::time::advance(SEARCH_DEBOUNCE).await;
        assert!(list.tick());
        list.settle().await;

        list.set_current_page(2);
        list.settle().await;
        assert_eq!(list.state().current_page, 2);

        list.set_search_term("2");
        tokio::time::advance(SEARCH_DEBOUNCE).await;
        list.tick();
        assert_eq!(list.state().current_page, 1);
        list.settle().await;

        let last = source.calls().pop().unwrap();
        assert_eq!(last.page, 1);
        assert_eq!(last.search_term.as_deref(), Some("2"));
        assert_eq!(list.state().search_term, "2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_is_debounced() {
        let source = NumberSource::new(25, vec![Tag::Courses]);
        let mut list = controller(&source, &cache(), ListOptions::default());
        list.settle().await;

        list.set_search_term("abc");
        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(!list.tick());
        assert!(list.is_search_pending());

        list.set_search_term("abcd");
        tokio::time::advance(SEARCH_DEBOUNCE - Duration::from_millis(1)).await;
        list.tick();
        assert_eq!(source.calls().len(), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        list.tick();
        list.settle().await;

        let searches: Vec<String> = source
            .calls()
            .into_iter()
            .filter_map(|p| p.search_term)
            .collect();
        assert_eq!(searches, vec!["abcd".to_string()]);
        assert!(list.state().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_back_to_effective_term_cancels_search() {
        let source = NumberSource::new(25, vec![Tag::Courses]);
        let mut list = controller(&source, &cache(), ListOptions::default());
        list.settle().await;

        list.set_search_term("4");
        list.set_search_term("");
        assert!(!list.is_search_pending());
        tokio::time::advance(SEARCH_DEBOUNCE).await;
        assert!(!list.tick());
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_flush_search() {
        let source = NumberSource::new(25, vec![Tag::Courses]);
        let mut list = controller(&source, &cache(), ListOptions::default());
        list.settle().await;

        list.set_search_term("  12 ");
        assert!(list.flush_search());
        list.settle().await;
        assert_eq!(list.state().search_term, "12");
        assert_eq!(list.state().items, vec![12]);
        assert!(!list.flush_search());
    }

    #[tokio::test]
    async fn test_newer_request_wins() {
        let source = NumberSource::new(25, vec![Tag::Courses]);
        let release_first = source.gate(1);
        let mut list = controller(&source, &cache(), ListOptions::default());

        list.set_current_page(2);
        list.settle().await;
        assert_eq!(list.state().items, (11..=20).collect::<Vec<_>>());

        let _ = release_first.send(());
        tokio::task::yield_now().await;
        list.tick();
        assert_eq!(list.state().items, (11..=20).collect::<Vec<_>>());
        assert_eq!(list.state().current_page, 2);
    }

    #[tokio::test]
    async fn test_stale_completion_is_discarded() {
        let source = NumberSource::new(25, vec![Tag::Courses]);
        let mut list = controller(&source, &cache(), ListOptions::default());
        list.settle().await;

        let stale = Completion {
            generation: list.generation - 1,
            result: Ok(Arc::new(Page {
                data: vec![99],
                meta: PageMeta {
                    page: 1,
                    limit: 10,
                    total: 1,
                    total_pages: Some(1),
                },
            })),
        };
        assert!(!list.apply(stale));
        assert_eq!(list.state().items, (1..=10).collect::<Vec<_>>());
        assert_eq!(list.state().total, 25);
    }

    #[tokio::test]
    async fn test_loading_keeps_previous_items() {
        let source = NumberSource::new(25, vec![Tag::Courses]);
        let mut list = controller(&source, &cache(), ListOptions::default());
        list.settle().await;

        let release = source.gate(2);
        list.set_current_page(2);
        tokio::task::yield_now().await;
        list.tick();
        assert!(list.state().is_loading);
        assert_eq!(list.state().items, (1..=10).collect::<Vec<_>>());

        release.send(()).unwrap();
        list.settle().await;
        assert_eq!(list.state().items, (11..=20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_error_keeps_items_and_next_request_clears_it() {
        let source = NumberSource::new(25, vec![Tag::Courses]);
        let mut list = controller(&source, &cache(), ListOptions::default());
        list.settle().await;

        source.fail.store(true, Ordering::SeqCst);
        list.refetch();
        list.settle().await;
        let state = list.state();
        assert!(state.is_error);
        assert!(!state.is_loading);
        assert!(state.error.as_deref().unwrap_or_default().contains("boom"));
        assert_eq!(state.items, (1..=10).collect::<Vec<_>>());

        source.fail.store(false, Ordering::SeqCst);
        list.refetch();
        assert!(list.state().is_loading);
        assert!(!list.state().is_error);
        assert_eq!(list.state().error, None);
        list.settle().await;
        assert!(!list.state().is_error);
    }

    #[tokio::test]
    async fn test_skip_suppresses_fetch() {
        let source = NumberSource::new(25, vec![Tag::Courses]);
        let options = ListOptions {
            skip: true,
            ..ListOptions::default()
        };
        let mut list = controller(&source, &cache(), options);
        assert!(!list.state().is_loading);
        list.tick();
        list.set_current_page(2);
        tokio::task::yield_now().await;
        assert!(source.calls().is_empty());
        assert!(!list.state().is_loading);

        list.set_skip(false);
        assert!(list.state().is_loading);
        list.settle().await;
        assert_eq!(source.calls().len(), 1);
        assert_eq!(list.state().items, (11..=20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_skip_while_loading_stops_loading() {
        let source = NumberSource::new(25, vec![Tag::Courses]);
        let _release = source.gate(1);
        let mut list = controller(&source, &cache(), ListOptions::default());
        assert!(list.state().is_loading);
        list.set_skip(true);
        assert!(!list.state().is_loading);
    }

    #[tokio::test]
    async fn test_out_of_range_page_is_passed_through() {
        let source = NumberSource::new(25, vec![Tag::Courses]);
        let mut list = controller(&source, &cache(), ListOptions::default());
        list.settle().await;

        list.set_current_page(10);
        list.settle().await;
        assert_eq!(source.calls().last().unwrap().page, 10);
        assert_eq!(list.state().current_page, 10);
        assert!(list.state().items.is_empty());
        assert_eq!(list.state().total_pages, 3);
        assert!(!list.state().has_next_page());

        list.set_current_page(0);
        assert_eq!(list.state().current_page, 1);
    }

    #[tokio::test]
    async fn test_rows_beyond_limit_are_dropped() {
        let source = NumberSource::new(25, vec![Tag::Courses]);
        source.oversize.store(true, Ordering::SeqCst);
        let mut list = controller(&source, &cache(), ListOptions::default());
        list.settle().await;
        assert_eq!(list.state().items.len(), 10);
    }

    #[tokio::test]
    async fn test_mounts_share_cached_pages() {
        let source = NumberSource::new(25, vec![Tag::Courses]);
        let cache = cache();
        let mut first = controller(&source, &cache, ListOptions::default());
        first.settle().await;
        let mut second = controller(&source, &cache, ListOptions::default());
        second.settle().await;

        assert_eq!(source.calls().len(), 1);
        assert_eq!(second.state().items, first.state().items);
    }

    #[tokio::test]
    async fn test_invalidation_refetches_only_tagged_lists() {
        let cache = cache();
        let courses = NumberSource::new(25, vec![Tag::Courses]);
        let users = NumberSource::new(5, vec![Tag::Users]);
        let mut course_list = controller(&courses, &cache, ListOptions::default());
        let mut user_list = controller(&users, &cache, ListOptions::default());
        course_list.settle().await;
        user_list.settle().await;

        let failed: Result<(), String> = cache
            .mutate(&[Tag::Courses], async { Err("rejected".to_string()) })
            .await;
        assert!(failed.is_err());
        course_list.tick();
        user_list.tick();
        assert!(!course_list.state().is_loading);
        assert_eq!(courses.calls().len(), 1);

        let succeeded: Result<(), String> = cache.mutate(&[Tag::Courses], async { Ok(()) }).await;
        assert!(succeeded.is_ok());
        assert!(course_list.tick());
        assert!(!user_list.tick());
        course_list.settle().await;

        assert_eq!(courses.calls().len(), 2);
        assert_eq!(users.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_set_filters_resets_page() {
        let source = NumberSource::new(25, vec![Tag::Employees]);
        let mut list = controller(&source, &cache(), ListOptions::default());
        list.settle().await;
        list.set_current_page(3);
        list.settle().await;

        list.set_filters(Filters {
            company_id: Some("c1".to_string()),
            ..Filters::default()
        });
        list.settle().await;
        let last = source.calls().pop().unwrap();
        assert_eq!(last.page, 1);
        assert_eq!(last.filters.company_id.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_drop_cancels_in_flight_request() {
        let source = NumberSource::new(25, vec![Tag::Courses]);
        let release = source.gate(1);
        let cache = cache();
        let list = controller(&source, &cache, ListOptions::default());
        tokio::task::yield_now().await;
        drop(list);

        let _ = release.send(());
        tokio::task::yield_now().await;
        assert!(cache.is_empty());
    }
}
