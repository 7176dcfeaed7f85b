//! Notification pipeline: classify, locate, build, store, dispatch.

pub mod builder;
pub mod dispatch;
pub mod error;
pub mod kind;
pub mod locator;
pub mod store;
pub mod transcript;
pub mod types;

pub use builder::BuildOptions;
pub use dispatch::{DispatchReport, Dispatcher, TmuxPopup};
pub use error::NotifyError;
pub use store::{NotificationStore, SweepReport};
pub use types::{HookEvent, Notification};
