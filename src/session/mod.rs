pub mod headless_mode;
pub mod messages;
pub mod setup;

pub use headless_mode::{run_fetch, run_watch};
pub use setup::{SessionData, SessionError, WidgetArgs, setup_session};
