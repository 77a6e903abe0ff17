// dashboard/src/lib.rs
pub mod aggregator;
pub mod fetcher;
pub mod login;
pub mod render;
pub mod session_store;
pub mod shell;
pub mod storage;

pub use aggregator::{PanelOutcome, PanelState, PanelUpdate, ResourceKind};
pub use fetcher::{AuthenticatedFetcher, FetchError};
pub use login::LoginError;
pub use session_store::{SessionError, SessionStore};
pub use shell::{CurrentView, DashboardView, LoginView, Logout, Refresh, Shell, ShellHandle, SubmitLogin, View};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
