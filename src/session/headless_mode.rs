//! Headless mode execution

use super::{
    SessionData, SessionError,
    messages::{
        print_series_summary, print_session_exit_success, print_session_shutdown,
        print_session_starting,
    },
};
use crate::events::{Event, EventSender};
use crate::queries::{Completion, WidgetQueries};
use crate::widget::{PropsChange, diff_props};
use log::{debug, warn};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Prints displayable events until every sender is gone.
fn spawn_printer(mut event_receiver: mpsc::UnboundedReceiver<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = event_receiver.recv().await {
            if event.should_display() {
                println!("{}", event);
            }
        }
    })
}

/// Tears the widget down and waits for the printer to drain its events.
async fn shutdown(mut queries: WidgetQueries, events: EventSender, printer: JoinHandle<()>) {
    if queries.is_mounted() {
        queries.teardown();
    }
    // the render callback owns the last event sender
    drop(queries);
    drop(events);
    let _ = printer.await;
}

/// Runs a single fetch cycle and prints the outcome.
///
/// Fails if the widget settled with an error message.
pub async fn run_fetch(session: SessionData) -> Result<(), SessionError> {
    let SessionData {
        mut queries,
        event_receiver,
        events,
        ..
    } = session;
    let widget = &queries.props().widget;
    print_session_starting("fetch", &widget.title, widget.queries.len());

    let printer = spawn_printer(event_receiver);
    queries.settle().await;
    let state = queries.state();
    debug!(
        "Fetch {:?} settled with {} stored responses",
        state.query_fetch_id,
        state.raw_results.as_ref().map_or(0, Vec::len)
    );
    let render_props = queries.render_props();
    shutdown(queries, events, printer).await;

    print_series_summary(&render_props);
    match render_props.error_message {
        Some(message) => Err(SessionError::Widget(message)),
        None => {
            print_session_exit_success();
            Ok(())
        }
    }
}

enum WatchStep {
    Completion(Completion),
    Reload,
    Shutdown,
}

/// Keeps the widget live: re-reads the widget file every `poll_interval` and
/// hands the new props to the orchestrator until Ctrl+C.
pub async fn run_watch(session: SessionData, poll_interval: Duration) -> Result<(), SessionError> {
    let SessionData {
        mut queries,
        event_receiver,
        events,
        args,
    } = session;
    let widget = &queries.props().widget;
    print_session_starting("watch", &widget.title, widget.queries.len());

    let printer = spawn_printer(event_receiver);

    let mut ticker = tokio::time::interval(poll_interval);
    // the first tick completes immediately and the widget was just loaded
    ticker.tick().await;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let step = tokio::select! {
            Some(completion) = queries.recv_completion() => WatchStep::Completion(completion),
            _ = ticker.tick() => WatchStep::Reload,
            _ = &mut ctrl_c => WatchStep::Shutdown,
        };

        match step {
            WatchStep::Completion(completion) => queries.handle_completion(completion),
            WatchStep::Reload => match args.props() {
                Ok(props) => {
                    let title = props.widget.title.clone();
                    match diff_props(queries.props(), &props) {
                        PropsChange::Refetch => events
                            .send_event(Event::refresh(&title, "Widget changed, refetching".into())),
                        PropsChange::Relabel => events
                            .send_event(Event::refresh(&title, "Query names changed".into())),
                        PropsChange::Unchanged => {}
                    }
                    queries.set_props(props);
                }
                // keep showing the last good widget while the file is being edited
                Err(e) => warn!("Skipping reload: {}", e),
            },
            WatchStep::Shutdown => break,
        }
    }

    print_session_shutdown();
    shutdown(queries, events, printer).await;
    print_session_exit_success();
    Ok(())
}
