//! CLI command implementations.

pub(crate) mod audit;
pub(crate) mod doctor;
pub(crate) mod dump;
pub(crate) mod sync;
