//! # season-elo
//!
//! Season-scoped pairwise Elo rating engine with a REST API.
//!
//! Entries are compared two at a time; each vote moves both ratings by one
//! Elo update inside a single store transaction. Ratings, wins, and losses
//! live in a per-season ledger, so a new season starts everyone fresh while
//! past seasons stay queryable.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)                 open-season (operator CLI)
//!     │                                  │
//!     ├── REST Handlers (api/)           │
//!     │                                  │
//!     ├── RatingService (service/) ◄─────┘
//!     │       ├── Matchmaker, EloPolicy (domain/)
//!     │       └── ImportJob (ingest/)
//!     │
//!     └── LedgerStore (persistence/)
//!             ├── PostgresStore
//!             └── MemoryStore
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod persistence;
pub mod service;
