//! # Ember
//!
//! A minimal networked key-value store built on tokio.
//!
//! Ember speaks a line-oriented text protocol (`SET`/`GET`/`EXPIRE`/
//! `PING`), streams accepted writes from a master to any number of
//! slaves, expires keys both lazily and via a background sweep, and
//! records every accepted write in an append-only log that is replayed
//! at startup.

pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod persistence;
pub mod replication;
pub mod resp;
pub mod server;
pub mod store;
