//! Core types for the ministry activity log.
//!
//! Holds the record model, validation, the key-value [`storage::Storage`]
//! abstraction, and the local-first [`store::RecordStore`] with its session
//! and configuration gate. Network reconciliation lives in `ministry-sync`;
//! this crate has no HTTP or database dependencies.

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// returned futures where they matter.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod change_request;
pub mod clock;
pub mod config;
pub mod error;
pub mod insight;
pub mod record;
pub mod session;
pub mod storage;
pub mod store;
pub mod user;
pub mod validate;
pub mod wire;

pub use error::{Error, Result, ValidationError};
