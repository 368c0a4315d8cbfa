// Domain layer - plain data and the arithmetic on it
pub mod batch;
pub mod pagination;
pub mod station;
pub mod stats;
