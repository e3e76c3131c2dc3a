//! Port implementations.
//!
//! - `live`: real clock, filesystem, `git` and chat-completions client.
//! - `recording`: wraps live adapters and appends every call to a cassette.
//! - `replaying`: serves calls from a cassette, offline and deterministic.

pub mod live;
pub mod recording;
pub mod replaying;
