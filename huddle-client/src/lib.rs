pub mod config;
pub mod connector;
pub mod error;
pub mod link;
pub mod media;
pub mod session;
pub mod timer;
pub mod transport;

pub use config::*;
pub use connector::*;
pub use error::*;
pub use link::*;
pub use media::*;
pub use session::*;
pub use transport::*;
