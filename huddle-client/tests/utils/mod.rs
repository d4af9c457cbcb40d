pub mod event_helpers;

pub use event_helpers::*;
pub use mock_session::*;
pub use mock_transport::*;
pub use ws_server::*;
