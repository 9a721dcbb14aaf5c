//! Push notifications for pickup availability.
//!
//! Each configured channel is an independent, best-effort delivery target:
//! [`Notifier::dispatch`] tries every channel in order and never lets one
//! channel's failure stop the others.

pub mod bark;
pub mod dispatch;
pub mod error;
pub mod feishu;
pub mod message;

pub use dispatch::{DispatchSummary, Notifier};
pub use error::NotifyError;
pub use message::{pickup_message, status_line, NOTIFICATION_TITLE};
