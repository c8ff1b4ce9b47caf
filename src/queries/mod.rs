//! Widget Query Orchestrator
//!
//! Fetches the data of one dashboard widget. Each fetch cycle issues one
//! request per sub-query concurrently, places results by sub-query index and
//! hands the derived state to a render callback after every change.
//!
//! Requests run as spawned tasks and report back over a channel. The owner of
//! a [`WidgetQueries`] applies completions one at a time, either through
//! [`WidgetQueries::settle`] or by pairing [`WidgetQueries::recv_completion`]
//! with [`WidgetQueries::handle_completion`] inside its own event loop.

pub mod reducer;
pub mod state;

pub use state::{DerivedState, Generation, RenderProps, SeriesSlots};

use crate::api::error::MetricsApiError;
use crate::api::error_handler::ErrorHandler;
use crate::api::{MetricsApi, MetricsRequest};
use crate::consts::cli_consts::COMPLETION_QUEUE_SIZE;
use crate::consts::cli_consts::messages::WORLD_MAP_UNSUPPORTED;
use crate::metrics::{MetricsApiResponse, transform_metrics_response_to_series};
use crate::widget::{PropsChange, Widget, WidgetProps, diff_props};
use log::{Level, debug, log};
use reducer::{Action, reduce};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Receives the current widget and its render props after every state change.
pub type RenderFn = Box<dyn Fn(&Widget, &RenderProps) + Send + Sync>;

/// The outcome of one sub-query request.
#[derive(Debug)]
pub struct Completion {
    generation: Generation,
    index: usize,
    result: Result<MetricsApiResponse, MetricsApiError>,
}

/// Bookkeeping for the cycle whose requests are in flight.
#[derive(Debug, Clone, Copy)]
struct FetchCycle {
    generation: Generation,
    total: usize,
    completed: usize,
}

pub struct WidgetQueries {
    api: Arc<dyn MetricsApi>,
    props: WidgetProps,
    state: DerivedState,
    cycle: Option<FetchCycle>,
    last_generation: Option<Generation>,
    /// Set when queries were renamed while the cycle was loading.
    relabel_pending: bool,
    completion_sender: mpsc::Sender<Completion>,
    completion_receiver: mpsc::Receiver<Completion>,
    error_handler: ErrorHandler,
    render: RenderFn,
    mounted: bool,
}

impl WidgetQueries {
    /// Creates the orchestrator and starts the first fetch cycle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(api: Arc<dyn MetricsApi>, props: WidgetProps, render: RenderFn) -> Self {
        let (completion_sender, completion_receiver) = mpsc::channel(COMPLETION_QUEUE_SIZE);
        let mut queries = Self {
            api,
            props,
            state: DerivedState::default(),
            cycle: None,
            last_generation: None,
            relabel_pending: false,
            completion_sender,
            completion_receiver,
            error_handler: ErrorHandler::new(),
            render,
            mounted: true,
        };
        queries.fetch_data();
        queries
    }

    pub fn props(&self) -> &WidgetProps {
        &self.props
    }

    pub fn state(&self) -> &DerivedState {
        &self.state
    }

    pub fn render_props(&self) -> RenderProps {
        RenderProps::from(&self.state)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Whether the current cycle still has requests outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.cycle.is_some_and(|cycle| cycle.completed < cycle.total)
    }

    /// Starts a new fetch cycle, superseding any cycle still in flight.
    pub fn fetch_data(&mut self) {
        if !self.mounted {
            return;
        }

        let generation = self.mint_generation();
        let display_type = self.props.widget.display_type;
        self.cycle = None;
        self.relabel_pending = false;

        if !display_type.is_supported_by_metrics() {
            debug!("Widget {:?}: {} is not supported", self.props.widget.title, display_type);
            self.dispatch(Action::Unsupported {
                generation,
                message: WORLD_MAP_UNSUPPORTED.to_string(),
            });
            return;
        }

        self.dispatch(Action::BeginCycle { generation });

        if display_type.is_tabular() {
            self.fetch_tabular_data(generation);
        } else {
            self.fetch_time_series_data(generation);
        }
    }

    // TODO: build table rows from response totals once tabular widgets are served by metrics.
    fn fetch_tabular_data(&mut self, generation: Generation) {
        self.dispatch(Action::TabularLoaded { generation });
    }

    fn fetch_time_series_data(&mut self, generation: Generation) {
        let requests = MetricsRequest::for_widget(&self.props);
        let total = requests.len();
        debug!(
            "Fetch {} for widget {:?}: {} queries against {:?}",
            generation,
            self.props.widget.title,
            total,
            self.api.environment()
        );

        self.cycle = Some(FetchCycle {
            generation,
            total,
            completed: 0,
        });
        self.dispatch(Action::TimeSeriesStarted { generation, total });

        for (index, request) in requests.into_iter().enumerate() {
            let api = Arc::clone(&self.api);
            let sender = self.completion_sender.clone();
            tokio::spawn(async move {
                let result = api.fetch_metrics(&request).await;
                // Fails once the widget is torn down; the result is dropped with it.
                let _ = sender
                    .send(Completion {
                        generation,
                        index,
                        result,
                    })
                    .await;
            });
        }
    }

    /// Waits for the next request to finish, from any cycle.
    ///
    /// Returns `None` once the widget is torn down. Cancel safe.
    pub async fn recv_completion(&mut self) -> Option<Completion> {
        if !self.mounted {
            return None;
        }
        self.completion_receiver.recv().await
    }

    /// Applies one finished request to the state.
    pub fn handle_completion(&mut self, completion: Completion) {
        let Completion {
            generation,
            index,
            result,
        } = completion;

        if !self.mounted {
            debug!("Ignoring query {} of fetch {} after teardown", index, generation);
            return;
        }

        let Some(cycle) = self.cycle.as_mut().filter(|c| c.generation == generation) else {
            debug!("Dropping stale result of query {} from fetch {}", index, generation);
            return;
        };
        cycle.completed += 1;
        let (completed, total) = (cycle.completed, cycle.total);

        match result {
            Ok(raw) => {
                let name = self
                    .props
                    .widget
                    .queries
                    .get(index)
                    .map(|q| q.name.as_str())
                    .unwrap_or_default();
                let series = transform_metrics_response_to_series(&raw, name);
                self.dispatch(Action::QuerySucceeded {
                    generation,
                    index,
                    series,
                    raw,
                });
            }
            Err(e) => {
                let level: Level = self.error_handler.classify_error(&e).into();
                log!(level, "Query {} of fetch {} failed: {}", index, generation, e);
                self.dispatch(Action::QueryFailed {
                    generation,
                    message: e.user_message(),
                });
            }
        }

        self.dispatch(Action::QuerySettled {
            generation,
            completed,
            total,
        });

        if self.relabel_pending && !self.state.loading {
            self.relabel_pending = false;
            self.relabel();
        }
    }

    /// Applies completions until the current cycle has settled.
    pub async fn settle(&mut self) {
        while self.is_in_flight() {
            match self.recv_completion().await {
                Some(completion) => self.handle_completion(completion),
                None => break,
            }
        }
    }

    /// Replaces the props, refetching or relabelling as the change requires.
    pub fn set_props(&mut self, props: WidgetProps) {
        if !self.mounted {
            return;
        }

        let prev = std::mem::replace(&mut self.props, props);
        match diff_props(&prev, &self.props) {
            PropsChange::Refetch => self.fetch_data(),
            PropsChange::Relabel if self.state.loading => self.relabel_pending = true,
            PropsChange::Relabel => self.relabel(),
            PropsChange::Unchanged => {}
        }
    }

    /// Stops all further state changes. Requests still in flight complete but
    /// their results are discarded.
    pub fn teardown(&mut self) {
        self.mounted = false;
        self.cycle = None;
        self.completion_receiver.close();
    }

    /// Renames stored series after the current sub-query names.
    fn relabel(&mut self) {
        if !self.state.has_raw_result_slots(self.props.widget.queries.len()) {
            return;
        }
        let names = self
            .props
            .widget
            .queries
            .iter()
            .map(|q| q.name.clone())
            .collect();
        self.dispatch(Action::Relabel { names });
    }

    fn mint_generation(&mut self) -> Generation {
        let generation = self
            .last_generation
            .map_or_else(Generation::first, Generation::next);
        self.last_generation = Some(generation);
        generation
    }

    fn dispatch(&mut self, action: Action) {
        if !self.mounted {
            return;
        }
        let next = reduce(&self.state, action);
        if next != self.state {
            self.state = next;
            (self.render)(&self.props.widget, &RenderProps::from(&self.state));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMetricsApi;
    use crate::environment::Environment;
    use crate::widget::{
        DateTimeSelection, DisplayType, Organization, PageFilters, Widget, WidgetQuery,
    };
    use serde_json::json;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    type Reply = Result<MetricsApiResponse, MetricsApiError>;

    /// Answers each request only when the test releases it. Requests are
    /// matched by their filter conditions.
    #[derive(Default)]
    struct GatedApi {
        gates: Mutex<HashMap<String, VecDeque<oneshot::Receiver<Reply>>>>,
        calls: AtomicUsize,
    }

    impl GatedApi {
        fn gate(&self, conditions: &str) -> oneshot::Sender<Reply> {
            let (sender, receiver) = oneshot::channel();
            self.gates
                .lock()
                .unwrap()
                .entry(conditions.to_string())
                .or_default()
                .push_back(receiver);
            sender
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl MetricsApi for GatedApi {
        fn environment(&self) -> &Environment {
            &Environment::Local
        }

        async fn fetch_metrics(&self, request: &MetricsRequest) -> Reply {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self
                .gates
                .lock()
                .unwrap()
                .get_mut(&request.query)
                .and_then(VecDeque::pop_front);
            match gate {
                Some(receiver) => receiver.await.unwrap_or_else(|_| Err(http_error(499, ""))),
                None => Err(http_error(404, r#"{"detail": "no gate"}"#)),
            }
        }
    }

    fn http_error(status: u16, message: &str) -> MetricsApiError {
        MetricsApiError::Http {
            status,
            message: message.to_string(),
        }
    }

    fn response(value: f64) -> MetricsApiResponse {
        serde_json::from_value(json!({
            "intervals": ["2022-01-10T00:00:00Z"],
            "groups": [{"by": {}, "totals": {"count()": value}, "series": {"count()": [value]}}]
        }))
        .unwrap()
    }

    fn query(name: &str, conditions: &str) -> WidgetQuery {
        WidgetQuery {
            name: name.into(),
            fields: vec!["count()".into()],
            conditions: conditions.into(),
            orderby: None,
            group_by: vec![],
        }
    }

    fn props(display_type: DisplayType, queries: Vec<WidgetQuery>) -> WidgetProps {
        WidgetProps {
            organization: Organization::new("acme"),
            selection: PageFilters {
                projects: vec![1],
                environments: vec![],
                datetime: DateTimeSelection::relative("24h"),
            },
            widget: Widget {
                id: Some("1".into()),
                temp_id: None,
                title: "Errors".into(),
                display_type,
                interval: None,
                queries,
                layout: None,
                widget_type: None,
            },
            limit: None,
        }
    }

    fn recorder() -> (RenderFn, Arc<Mutex<Vec<RenderProps>>>) {
        let renders = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&renders);
        let render: RenderFn = Box::new(move |_: &Widget, props: &RenderProps| {
            sink.lock().unwrap().push(props.clone());
        });
        (render, renders)
    }

    fn series_names(queries: &WidgetQueries) -> Vec<String> {
        queries
            .render_props()
            .time_series_results
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.series_name)
            .collect()
    }

    async fn apply_next(queries: &mut WidgetQueries) {
        let completion = queries.recv_completion().await.expect("completion");
        queries.handle_completion(completion);
    }

    #[tokio::test]
    /// Unsupported display modes never reach the network.
    async fn world_map_sets_fixed_error_without_requests() {
        let mut api = MockMetricsApi::new();
        api.expect_fetch_metrics().never();
        api.expect_environment().return_const(Environment::Local);
        let (render, renders) = recorder();

        let queries = WidgetQueries::mount(
            Arc::new(api),
            props(DisplayType::WorldMap, vec![query("A", "")]),
            render,
        );

        let state = queries.state();
        assert!(!state.loading);
        assert_eq!(state.error_message.as_deref(), Some(WORLD_MAP_UNSUPPORTED));
        assert!(!queries.is_in_flight());
        assert_eq!(renders.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn tabular_widgets_finish_without_requests() {
        let mut api = MockMetricsApi::new();
        api.expect_fetch_metrics().never();
        let (render, _) = recorder();

        let queries = WidgetQueries::mount(
            Arc::new(api),
            props(DisplayType::BigNumber, vec![query("A", "")]),
            render,
        );

        assert!(!queries.state().loading);
        assert_eq!(queries.state().table_results, Some(vec![]));
        assert_eq!(queries.state().error_message, None);
    }

    #[tokio::test]
    /// Two sub-queries each answering with one series render in query order.
    async fn two_queries_render_in_query_order() {
        let mut api = MockMetricsApi::new();
        api.expect_environment().return_const(Environment::Local);
        api.expect_fetch_metrics()
            .times(2)
            .returning(|request| match request.query.as_str() {
                "" => Ok(response(1.0)),
                _ => Ok(response(2.0)),
            });
        let (render, renders) = recorder();

        let mut queries = WidgetQueries::mount(
            Arc::new(api),
            props(
                DisplayType::Line,
                vec![query("A", ""), query("B", "error")],
            ),
            render,
        );
        assert!(queries.state().loading);
        queries.settle().await;

        let props = queries.render_props();
        assert!(!props.loading);
        assert_eq!(props.error_message, None);
        assert_eq!(series_names(&queries), vec!["A", "B"]);
        assert_eq!(renders.lock().unwrap().last(), Some(&props));
    }

    #[tokio::test]
    /// Results are placed by sub-query index, not arrival order.
    async fn results_are_aligned_regardless_of_completion_order() {
        let api = Arc::new(GatedApi::default());
        let first = api.gate("first");
        let second = api.gate("second");
        let third = api.gate("third");
        let (render, _) = recorder();

        let mut queries = WidgetQueries::mount(
            api.clone(),
            props(
                DisplayType::Area,
                vec![
                    query("one", "first"),
                    query("two", "second"),
                    query("three", "third"),
                ],
            ),
            render,
        );

        third.send(Ok(response(3.0))).unwrap();
        apply_next(&mut queries).await;
        assert!(queries.state().loading);
        assert_eq!(series_names(&queries), vec!["three"]);

        first.send(Ok(response(1.0))).unwrap();
        apply_next(&mut queries).await;
        second.send(Ok(response(2.0))).unwrap();
        apply_next(&mut queries).await;

        let state = queries.state();
        assert!(!state.loading);
        let raw = state.raw_results.as_ref().unwrap();
        assert_eq!(raw.len(), 3);
        assert_eq!(raw[0], Some(response(1.0)));
        assert_eq!(raw[1], Some(response(2.0)));
        assert_eq!(raw[2], Some(response(3.0)));
        assert_eq!(series_names(&queries), vec!["one", "two", "three"]);
        assert_eq!(api.calls(), 3);
    }

    #[tokio::test]
    /// One failing sub-query doesn't take its siblings down.
    async fn failure_keeps_sibling_results() {
        let api = Arc::new(GatedApi::default());
        let ok_a = api.gate("a");
        let failing = api.gate("b");
        let ok_c = api.gate("c");
        let (render, _) = recorder();

        let mut queries = WidgetQueries::mount(
            api.clone(),
            props(
                DisplayType::Line,
                vec![query("A", "a"), query("B", "b"), query("C", "c")],
            ),
            render,
        );

        failing
            .send(Err(http_error(400, r#"{"detail": "Invalid metric"}"#)))
            .unwrap();
        ok_a.send(Ok(response(1.0))).unwrap();
        ok_c.send(Ok(response(3.0))).unwrap();
        queries.settle().await;

        let state = queries.state();
        assert!(!state.loading);
        assert_eq!(state.error_message.as_deref(), Some("Invalid metric"));
        let raw = state.raw_results.as_ref().unwrap();
        assert!(raw[0].is_some());
        assert!(raw[1].is_none());
        assert!(raw[2].is_some());
        assert_eq!(series_names(&queries), vec!["A", "C"]);
    }

    #[tokio::test]
    async fn first_error_of_a_cycle_is_kept() {
        let api = Arc::new(GatedApi::default());
        let a = api.gate("a");
        let b = api.gate("b");
        let (render, _) = recorder();

        let mut queries = WidgetQueries::mount(
            api.clone(),
            props(DisplayType::Line, vec![query("A", "a"), query("B", "b")]),
            render,
        );

        b.send(Err(http_error(500, r#"{"detail": "first"}"#))).unwrap();
        apply_next(&mut queries).await;
        a.send(Err(http_error(500, "gateway timeout"))).unwrap();
        apply_next(&mut queries).await;

        assert_eq!(queries.state().error_message.as_deref(), Some("first"));
        assert!(!queries.state().loading);
    }

    #[tokio::test]
    /// Results of a superseded cycle never reach the state.
    async fn superseded_cycle_results_are_discarded() {
        let api = Arc::new(GatedApi::default());
        let old = api.gate("release:1.0");
        let new = api.gate("release:2.0");
        let (render, _) = recorder();

        let initial = props(DisplayType::Line, vec![query("A", "release:1.0")]);
        let mut queries = WidgetQueries::mount(api.clone(), initial.clone(), render);
        let first_generation = queries.state().query_fetch_id;

        let mut updated = initial;
        updated.widget.queries[0].conditions = "release:2.0".into();
        queries.set_props(updated);
        assert_ne!(queries.state().query_fetch_id, first_generation);

        old.send(Err(http_error(500, r#"{"detail": "stale"}"#))).unwrap();
        apply_next(&mut queries).await;
        assert!(queries.state().loading);
        assert_eq!(queries.state().error_message, None);
        assert_eq!(queries.state().raw_results, Some(vec![None]));

        new.send(Ok(response(2.0))).unwrap();
        queries.settle().await;

        let state = queries.state();
        assert!(!state.loading);
        assert_eq!(state.error_message, None);
        assert_eq!(state.raw_results, Some(vec![Some(response(2.0))]));
    }

    #[tokio::test]
    async fn late_results_after_a_settled_cycle_are_discarded() {
        let api = Arc::new(GatedApi::default());
        let old = api.gate("x");
        let new = api.gate("y");
        let (render, renders) = recorder();

        let initial = props(DisplayType::Line, vec![query("A", "x")]);
        let mut queries = WidgetQueries::mount(api.clone(), initial.clone(), render);
        let mut updated = initial;
        updated.widget.queries[0].conditions = "y".into();
        queries.set_props(updated);

        new.send(Ok(response(2.0))).unwrap();
        queries.settle().await;
        let settled = queries.state().clone();
        let render_count = renders.lock().unwrap().len();

        old.send(Ok(response(1.0))).unwrap();
        apply_next(&mut queries).await;

        assert_eq!(queries.state(), &settled);
        assert_eq!(renders.lock().unwrap().len(), render_count);
    }

    #[tokio::test]
    /// Nothing changes once the widget is gone.
    async fn no_mutation_after_teardown() {
        let api = Arc::new(GatedApi::default());
        let pending = api.gate("a");
        let (render, renders) = recorder();

        let mut queries = WidgetQueries::mount(
            api.clone(),
            props(DisplayType::Line, vec![query("A", "a")]),
            render,
        );
        let before = queries.state().clone();
        let render_count = renders.lock().unwrap().len();

        queries.teardown();
        // the request task may still be waiting on its gate
        let _ = pending.send(Ok(response(1.0)));
        tokio::task::yield_now().await;

        assert!(queries.recv_completion().await.is_none());
        queries.handle_completion(Completion {
            generation: before.query_fetch_id.unwrap(),
            index: 0,
            result: Ok(response(1.0)),
        });
        queries.fetch_data();
        queries.set_props(props(DisplayType::Line, vec![query("A", "b")]));

        assert!(!queries.is_mounted());
        assert_eq!(queries.state(), &before);
        assert_eq!(renders.lock().unwrap().len(), render_count);
        assert!(api.calls() <= 1);
    }

    #[tokio::test]
    /// A rename relabels stored results; a filter change goes back to the network.
    async fn rename_relabels_without_refetching() {
        let mut api = MockMetricsApi::new();
        api.expect_environment().return_const(Environment::Local);
        api.expect_fetch_metrics()
            .times(4)
            .returning(|request| match request.query.as_str() {
                "" => Ok(response(1.0)),
                _ => Ok(response(2.0)),
            });
        let (render, _) = recorder();

        let initial = props(
            DisplayType::Line,
            vec![query("A", ""), query("B", "error")],
        );
        let mut queries = WidgetQueries::mount(Arc::new(api), initial.clone(), render);
        queries.settle().await;
        let generation = queries.state().query_fetch_id;

        let mut renamed = initial.clone();
        renamed.widget.queries[0].name = "All".into();
        renamed.widget.title = "Renamed widget".into();
        queries.set_props(renamed.clone());

        assert!(!queries.is_in_flight());
        assert_eq!(queries.state().query_fetch_id, generation);
        assert_eq!(series_names(&queries), vec!["All", "B"]);

        let mut refiltered = renamed;
        refiltered.widget.queries[1].conditions = "fatal".into();
        queries.set_props(refiltered);

        assert!(queries.is_in_flight());
        assert_ne!(queries.state().query_fetch_id, generation);
        queries.settle().await;
        assert_eq!(series_names(&queries), vec!["All", "B"]);
    }

    #[tokio::test]
    /// Series that landed before a rename pick up the new names once the
    /// cycle settles.
    async fn rename_while_loading_relabels_after_settling() {
        let api = Arc::new(GatedApi::default());
        let a = api.gate("a");
        let b = api.gate("b");
        let (render, _) = recorder();

        let initial = props(DisplayType::Line, vec![query("A", "a"), query("B", "b")]);
        let mut queries = WidgetQueries::mount(api.clone(), initial.clone(), render);

        a.send(Ok(response(1.0))).unwrap();
        apply_next(&mut queries).await;
        assert_eq!(series_names(&queries), vec!["A"]);

        let mut renamed = initial;
        renamed.widget.queries[0].name = "Alpha".into();
        renamed.widget.queries[1].name = "Beta".into();
        queries.set_props(renamed);
        assert!(queries.is_in_flight());

        b.send(Ok(response(2.0))).unwrap();
        queries.settle().await;

        assert!(!queries.state().loading);
        assert_eq!(series_names(&queries), vec!["Alpha", "Beta"]);
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    /// A cycle that settled with a failed sub-query still relabels its survivors.
    async fn rename_after_partial_failure_relabels_survivors() {
        let api = Arc::new(GatedApi::default());
        let a = api.gate("a");
        let b = api.gate("b");
        let (render, _) = recorder();

        let initial = props(DisplayType::Line, vec![query("A", "a"), query("B", "b")]);
        let mut queries = WidgetQueries::mount(api.clone(), initial.clone(), render);

        a.send(Ok(response(1.0))).unwrap();
        b.send(Err(http_error(500, r#"{"detail": "Internal error"}"#)))
            .unwrap();
        queries.settle().await;
        let generation = queries.state().query_fetch_id;

        let mut renamed = initial;
        renamed.widget.queries[0].name = "Alpha".into();
        queries.set_props(renamed);

        assert!(!queries.is_in_flight());
        assert_eq!(queries.state().query_fetch_id, generation);
        assert_eq!(series_names(&queries), vec!["Alpha"]);
        assert_eq!(
            queries.state().error_message.as_deref(),
            Some("Internal error")
        );
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    /// The render callback sees the widget as it is when the state changes.
    async fn renders_receive_the_current_widget() {
        let api = Arc::new(GatedApi::default());
        let a = api.gate("a");
        let titles = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&titles);
        let render: RenderFn = Box::new(move |widget: &Widget, _: &RenderProps| {
            sink.lock().unwrap().push(widget.title.clone());
        });

        let initial = props(DisplayType::Line, vec![query("A", "a")]);
        let mut queries = WidgetQueries::mount(api.clone(), initial.clone(), render);
        a.send(Ok(response(1.0))).unwrap();
        queries.settle().await;

        let mut renamed = initial;
        renamed.widget.title = "Crash rate".into();
        renamed.widget.queries[0].name = "crashed".into();
        queries.set_props(renamed);

        let titles = titles.lock().unwrap();
        assert_eq!(titles.first().map(String::as_str), Some("Errors"));
        assert_eq!(titles.last().map(String::as_str), Some("Crash rate"));
    }

    #[tokio::test]
    async fn widget_without_queries_settles_immediately() {
        let mut api = MockMetricsApi::new();
        api.expect_environment().return_const(Environment::Local);
        api.expect_fetch_metrics().never();
        let (render, _) = recorder();

        let mut queries =
            WidgetQueries::mount(Arc::new(api), props(DisplayType::Line, vec![]), render);
        queries.settle().await;

        assert!(!queries.state().loading);
        assert_eq!(queries.render_props().time_series_results, Some(vec![]));
    }

    #[tokio::test]
    async fn unchanged_props_do_nothing() {
        let api = Arc::new(GatedApi::default());
        let gate = api.gate("a");
        let (render, renders) = recorder();

        let initial = props(DisplayType::Line, vec![query("A", "a")]);
        let mut queries = WidgetQueries::mount(api.clone(), initial.clone(), render);
        gate.send(Ok(response(1.0))).unwrap();
        queries.settle().await;
        let render_count = renders.lock().unwrap().len();

        let mut moved = initial;
        moved.selection.projects = vec![1];
        moved.widget.id = Some("99".into());
        queries.set_props(moved);

        assert!(!queries.is_in_flight());
        assert_eq!(renders.lock().unwrap().len(), render_count);
        assert_eq!(api.calls(), 1);
    }
}
