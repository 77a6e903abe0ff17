pub mod config;
pub mod credential;
pub mod models;
pub mod utils;

pub use self::config::*;
pub use credential::*;
pub use models::resources::*;
pub use models::session::*;
pub use utils::*;
