//! Satori Screen core: fetch balances and network stats, decide whether the
//! panel needs a refresh, render and present the frame.
//!
//! Hardware and platform services sit behind small traits
//! ([`sources::HttpClient`], [`keepalive::KeepAlive`], [`eink::Presenter`],
//! [`gate::GateStore`], [`history::HistoryStore`]) so the whole cycle runs
//! on the host under `cargo test`.

#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::unreachable,
        clippy::unwrap_used
    )
)]

pub mod aggregator;
pub mod clock;
pub mod detector;
pub mod eink;
pub mod gate;
pub mod history;
pub mod keepalive;
pub mod layout;
pub mod orchestrator;
pub mod session;
pub mod settings;
pub mod snapshot;
pub mod sources;
pub mod store;
pub mod thresholds;

pub use orchestrator::{CycleError, CycleOutcome, Orchestrator, OrchestratorConfig};
pub use snapshot::Snapshot;
