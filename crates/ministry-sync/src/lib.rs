//! Cloud reconciliation for the ministry record store.
//!
//! [`Reconciler`] pulls full remote snapshots into a local
//! [`RecordStore`](ministry_core::store::RecordStore) and pushes every local
//! mutation as a fire-and-forget [`MutationEvent`](ministry_core::wire::MutationEvent).
//! [`Ministry`] is the facade callers use: it pairs each store write with its
//! push and carries the session gate.

pub mod error;
pub mod event;
pub mod http;
pub mod reconciler;
pub mod remote;
pub mod service;
pub mod settings;
pub mod state;

pub use error::SyncError;
pub use event::SyncEvent;
pub use http::HttpRemote;
pub use reconciler::Reconciler;
pub use remote::Remote;
pub use service::Ministry;
pub use settings::SyncSettings;
pub use state::SyncState;

#[cfg(test)]
mod tests;
