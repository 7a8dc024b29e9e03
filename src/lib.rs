//! Crowdfunding ledger client.
//!
//! Domain model and invariants for a streaming-crowdfunding app:
//! campaign lifecycle, pledge and stream records, and the time-derived
//! accrual arithmetic (percent funded, time remaining, streamed amount),
//! kept consistent whichever backend supplied the raw data.
//!
//! Layering, leaf first:
//!
//! - [`types`] / [`events`] — value definitions and ledger events.
//! - [`accrual`] — pure functions of stored fields plus an explicit `now`.
//! - [`lifecycle`] — the campaign state machine; every mutation is
//!   validated here before it leaves the client.
//! - [`backend`] — the narrow contracts behind which the authoritative
//!   chain ([`rpc`]) and the local mirror ([`mirror`]) are interchangeable.
//! - [`repository`] — guarded mutations with a strict read-after-write
//!   contract: the backend copy is the only canonical one.
//! - [`dispatcher`] — per-entity action serialization and
//!   accrual-consistent snapshots.
//!
//! Persistent state lives entirely in the external backend; this crate
//! holds no authoritative storage of its own.

pub mod accrual;
pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod events;
pub mod lifecycle;
pub mod mirror;
pub mod repository;
pub mod rpc;
pub mod types;

pub use accrual::TimeLeft;
pub use backend::{CampaignBackend, StreamProvider};
pub use config::ClientConfig;
pub use dispatcher::{ActionDispatcher, CampaignView, StreamView};
pub use errors::{LedgerError, Result};
pub use events::LedgerEvent;
pub use lifecycle::{CampaignAction, CampaignPhase};
pub use mirror::MirrorBackend;
pub use repository::{LedgerRepository, StreamLedger};
pub use rpc::{RpcBackend, RpcStreamProvider};
pub use types::{
    Campaign, CreateCampaignParams, CreateStreamParams, Pledge, Stream, StreamStatus,
};
