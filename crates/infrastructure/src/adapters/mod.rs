//! Adapters implementing the application ports over real I/O.

mod reqwest_refresh;
mod reqwest_transport;
mod system_clock;

pub use reqwest_refresh::{DEFAULT_REFRESH_TIMEOUT, ReqwestRefreshEndpoint};
pub use reqwest_transport::{MAX_REDIRECTS, ReqwestTransport};
pub use system_clock::SystemClock;
