pub mod client;
pub mod command_line;
pub mod config;
pub mod coordinates;
pub mod environment;
pub mod fetch;
pub mod params;
pub mod query;
pub mod results;
pub mod session;
pub mod url_state;

pub use environment::{Environment, HostProvider, StaticHost};
pub use fetch::FetchOutcome;
pub use params::{SearchMode, SearchParameters};
pub use session::SearchSession;
