//! Upstream provider integrations

pub mod netfilm;

pub use netfilm::NetFilmProvider;
