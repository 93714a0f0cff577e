//! Dispatch Pipeline Module
//!
//! ```text
//! Source ─▶ Window ─▶ Aggregator ─▶ Health Model ─▶ Packet Builders ─▶ Sink
//!   (every sample period, one tokio task)
//! ```
//!
//! Aggregation, scoring and dispatch only run once the window is full.
//! Actuation always goes out together with a cloud report; otherwise the
//! cloud hears from the node at most once per idle report interval.

mod dispatch;
mod dispatch_loop;
mod state;

pub use dispatch::{decide, Dispatch};
pub use dispatch_loop::DispatchLoop;
pub use state::*;
