//! Structured logging vocabulary.
//!
//! Events are emitted through `tracing` with an `event` name from [`events`] and
//! the field keys from [`fields`]. The library never installs a subscriber.

pub mod events;
pub mod fields;
