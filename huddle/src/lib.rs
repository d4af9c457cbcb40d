pub use huddle_core::model::{RoomIdentity, Uid, User, UserUpdate};

pub mod model {
    pub use huddle_core::model::*;
    pub use huddle_core::utils::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use huddle_client::*;
}
