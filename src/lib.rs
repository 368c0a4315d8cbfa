//! Read-only REST API over the Vélib station store.
//!
//! Stations are refreshed by an external ingestion job and the batch
//! collections by a periodic aggregation job; this crate only queries them
//! and wraps the results in a uniform `{success, data | error}` envelope.
//!
//! Layers, leaf first: [`domain`] data and arithmetic, [`application`]
//! services over the [`VelibRepository`] trait, [`infrastructure`]
//! adapters (MongoDB, in-memory, config, logging) and [`presentation`]
//! axum handlers.
//!
//! [`VelibRepository`]: application::velib_repository::VelibRepository

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use presentation::router::build_router;
