//! Real-time distribution: who is connected under which tenant, and how
//! queue events reach them.

pub mod dispatch;
pub mod event;
pub mod registry;

pub use dispatch::{DispatchReport, Dispatcher};
pub use event::{QueueEvent, Role};
pub use registry::{ConnectionId, ConnectionRegistry, Inbox, Registration};
