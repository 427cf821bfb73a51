//! HTTP layer: request mapping, conditional-request semantics, envelopes

pub mod documents;
pub mod envelope;
pub mod graphs;
pub mod params;
pub mod revision;
pub mod server;

pub use revision::{check_revision, Preconditions, RevisionCheck};
pub use server::{router, HttpServer};
