//! Session setup and initialization

use crate::api::MetricsClient;
use crate::api::error::MetricsApiError;
use crate::config::Config;
use crate::consts::cli_consts::widgets::DEFAULT_STATS_PERIOD;
use crate::environment::Environment;
use crate::events::{Event, EventSender};
use crate::queries::{RenderFn, RenderProps, WidgetQueries};
use crate::widget::{
    DateTimeSelection, Organization, PageFilters, SelectionError, Widget, WidgetProps,
};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to read widget file {path:?}: {source}")]
    ReadWidget {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid widget file {path:?}: {source}")]
    ParseWidget {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No organization given. Pass --org or run `configure` first")]
    MissingOrganization,

    #[error("Invalid time window: {0}")]
    Selection(#[from] SelectionError),

    #[error("Failed to create API client: {0}")]
    Client(#[from] MetricsApiError),

    /// The widget finished with an error message in its state.
    #[error("{0}")]
    Widget(String),
}

/// Which widget to fetch and the page filters to scope it to.
#[derive(clap::Args, Debug, Clone)]
pub struct WidgetArgs {
    /// JSON file holding the widget definition
    #[arg(long, value_name = "FILE")]
    pub widget: PathBuf,

    /// Organization slug (defaults to the configured one)
    #[arg(long, value_name = "SLUG")]
    pub org: Option<String>,

    /// Project ID to include; repeat for several
    #[arg(long = "project", value_name = "ID")]
    pub projects: Vec<i64>,

    /// Environment to include; repeat for several
    #[arg(long = "environment", value_name = "ENV")]
    pub environments: Vec<String>,

    /// Relative time window, e.g. 24h or 14d
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub period: Option<String>,

    /// Start of an absolute time window (RFC 3339)
    #[arg(long, requires = "end")]
    pub start: Option<DateTime<Utc>>,

    /// End of an absolute time window (RFC 3339)
    #[arg(long, requires = "start")]
    pub end: Option<DateTime<Utc>>,

    /// Number of groups for top N widgets
    #[arg(long)]
    pub limit: Option<u32>,
}

impl WidgetArgs {
    /// Fills the organization from the config when the flag is absent.
    pub fn with_config(mut self, config: &Config) -> Self {
        if self.org.is_none() && !config.organization.is_empty() {
            self.org = Some(config.organization.clone());
        }
        self
    }

    pub fn selection(&self) -> Result<PageFilters, SessionError> {
        let period = match (&self.period, self.start, self.end) {
            (None, None, None) => Some(DEFAULT_STATS_PERIOD.to_string()),
            (period, _, _) => period.clone(),
        };
        Ok(PageFilters {
            projects: self.projects.clone(),
            environments: self.environments.clone(),
            datetime: DateTimeSelection::from_parts(self.start, self.end, period)?,
        })
    }

    /// Reads the widget file and assembles the props of one orchestrator.
    pub fn props(&self) -> Result<WidgetProps, SessionError> {
        let org = self
            .org
            .as_deref()
            .filter(|slug| !slug.is_empty())
            .ok_or(SessionError::MissingOrganization)?;
        Ok(WidgetProps {
            organization: Organization::new(org),
            selection: self.selection()?,
            widget: load_widget(&self.widget)?,
            limit: self.limit,
        })
    }
}

pub fn load_widget(path: &Path) -> Result<Widget, SessionError> {
    let buf = std::fs::read(path).map_err(|source| SessionError::ReadWidget {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&buf).map_err(|source| SessionError::ParseWidget {
        path: path.to_path_buf(),
        source,
    })
}

/// Session data for both fetch and watch modes
pub struct SessionData {
    pub queries: WidgetQueries,
    /// Render events, in the order the widget produced them
    pub event_receiver: mpsc::UnboundedReceiver<Event>,
    pub events: EventSender,
    pub args: WidgetArgs,
}

/// Builds the API client and mounts the widget, which starts its first fetch.
///
/// Must be called from within a tokio runtime.
pub fn setup_session(
    args: WidgetArgs,
    config: &Config,
    env: Environment,
) -> Result<SessionData, SessionError> {
    let args = args.with_config(config);
    let props = args.props()?;

    let mut client = MetricsClient::new(env)?;
    if let Some(api_url) = &config.api_url {
        client = client.with_base_url(api_url.clone());
    }

    let (event_sender, event_receiver) = mpsc::unbounded_channel();
    let events = EventSender::new(event_sender);
    let render_events = events.clone();
    let render: RenderFn = Box::new(move |widget: &Widget, props: &RenderProps| {
        render_events.send_event(Event::from_render(&widget.title, props));
    });

    let queries = WidgetQueries::mount(Arc::new(client), props, render);

    Ok(SessionData {
        queries,
        event_receiver,
        events,
        args,
    })
}
