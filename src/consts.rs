pub mod cli_consts {
    //! Widget Query Constants
    //!
    //! This module contains all configuration constants for widget fetching,
    //! organized by functional area for clarity and maintainability.

    // =============================================================================
    // QUEUE CONFIGURATION
    // =============================================================================

    /// Maximum number of sub-query completions buffered between the request
    /// tasks and the orchestrator that applies them.
    pub const COMPLETION_QUEUE_SIZE: usize = 100;

    // =============================================================================
    // WIDGET CONFIGURATION
    // =============================================================================

    /// Widget display and sampling configuration
    pub mod widgets {
        /// Number of groups requested by "top N" widgets when no limit is given
        pub const TOP_N: u32 = 5;

        /// Don't fetch more than this many bins, widgets plot on a small area.
        pub const MAX_BIN_COUNT: f64 = 66.0;

        /// Sampling interval used when the widget doesn't set one
        pub const DEFAULT_INTERVAL: &str = "5m";

        /// Bar charts are daily totals
        pub const BAR_CHART_INTERVAL: &str = "1d";

        /// Period used by the CLI when no time window is given
        pub const DEFAULT_STATS_PERIOD: &str = "24h";
    }

    /// User-facing messages surfaced through the derived state
    pub mod messages {
        /// Fixed message for display modes the metrics backend can't serve
        pub const WORLD_MAP_UNSUPPORTED: &str = "World Map is not supported by metrics.";

        /// Fallback when a failed request carries no readable detail
        pub const UNKNOWN_ERROR: &str = "An unknown error occurred.";
    }

    // =============================================================================
    // NETWORK CONFIGURATION
    // =============================================================================

    /// HTTP client timeouts
    pub mod http {
        use std::time::Duration;

        /// Time allowed to establish a connection (seconds)
        pub const CONNECT_TIMEOUT_SECS: u64 = 10;

        /// Time allowed for a whole metrics request (seconds)
        /// Metrics queries over long periods can be slow to aggregate
        pub const REQUEST_TIMEOUT_SECS: u64 = 30;

        pub const fn connect_timeout() -> Duration {
            Duration::from_secs(CONNECT_TIMEOUT_SECS)
        }

        pub const fn request_timeout() -> Duration {
            Duration::from_secs(REQUEST_TIMEOUT_SECS)
        }
    }

    /// Watch mode configuration
    pub mod watch {
        /// How often the widget file is re-read (milliseconds)
        pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
    }
}
