//! Vigil Runtime - the per-frame pipeline
//!
//! Wires the fusion engine, external detectors and persistence collaborators
//! into the full control flow:
//!
//! fingerprint cache -> (if novel) weapon detector + sequence buffer ->
//! behavior classifier -> fusion -> history -> alert gate -> evidence +
//! incident log -> dispatch

pub mod feed;
pub mod pipeline;

pub use feed::*;
pub use pipeline::*;
