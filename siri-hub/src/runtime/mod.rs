//! Runtime integration layer.
//!
//! Isolates task-spawn and concurrency-cap boundaries so async behavior
//! remains localized and predictable for the rest of the crate.

pub(crate) mod worker_runtime;
