// Application layer - use cases over the repository abstraction
pub mod batch_service;
pub mod error;
pub mod station_service;
pub mod velib_repository;
