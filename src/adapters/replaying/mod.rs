//! Replaying adapters that serve recorded interactions from a cassette.
//!
//! Outputs of fallible methods use the `{"ok": value}` / `{"err": message}`
//! convention written by the recording adapters.

pub mod clock;
pub mod llm;
pub mod source;

use std::sync::Mutex;

use serde::de::DeserializeOwned;

pub use clock::ReplayingClock;
pub use llm::ReplayingLlmClient;
pub use source::ReplayingRepoSource;

use crate::cassette::replayer::CassetteReplayer;
use crate::error::BoxError;

/// Pull the next recorded output for `port::method`.
///
/// # Panics
///
/// Panics when the cassette has no more interactions for the pair.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> serde_json::Value {
    let mut guard = replayer.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    guard.next_output(port, method)
}

/// Decode a recorded `{"ok": ..}` / `{"err": ..}` output into a `Result`.
pub(crate) fn replay_result<T: DeserializeOwned>(output: serde_json::Value) -> Result<T, BoxError> {
    if let Some(message) = output.get("err") {
        let message = message.as_str().map_or_else(|| message.to_string(), str::to_string);
        return Err(message.into());
    }
    match output.get("ok") {
        Some(value) => Ok(serde_json::from_value(value.clone())?),
        None => Err(format!("malformed recorded output (expected ok/err): {output}").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replay_result_decodes_ok_and_err() {
        let ok: Result<u32, _> = replay_result(json!({"ok": 7}));
        assert_eq!(ok.unwrap(), 7);

        let err: Result<u32, _> = replay_result(json!({"err": "boom"}));
        assert_eq!(err.unwrap_err().to_string(), "boom");

        let malformed: Result<u32, _> = replay_result(json!({"value": 1}));
        assert!(malformed.unwrap_err().to_string().contains("malformed"));
    }
}
