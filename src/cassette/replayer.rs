//! Serves recorded outputs back in order, one queue per `port::method`.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;

use super::format::Cassette;

/// Queued outputs of one cassette.
///
/// Each `port::method` pair has its own queue, so the order of calls across
/// ports does not have to match the recording. Outputs left over when the
/// replayer is dropped are ignored.
pub struct CassetteReplayer {
    name: String,
    queues: HashMap<(String, String), VecDeque<Value>>,
}

impl CassetteReplayer {
    /// Queues every interaction of `cassette` under its port and method.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<(String, String), VecDeque<Value>> = HashMap::new();
        for interaction in &cassette.interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction.output.clone());
        }
        Self { name: cassette.name.clone(), queues }
    }

    /// Takes the next recorded output for `port::method`.
    ///
    /// # Panics
    ///
    /// Panics when the pair was never recorded or its queue is used up.
    pub fn next_output(&mut self, port: &str, method: &str) -> Value {
        let key = (port.to_string(), method.to_string());
        let Some(queue) = self.queues.get_mut(&key) else {
            let mut recorded: Vec<String> = self.queues.keys().map(|(p, m)| format!("{p}::{m}")).collect();
            recorded.sort();
            panic!(
                "Cassette exhausted: {:?} has no interactions recorded for {port}::{method} (recorded: {})",
                self.name,
                recorded.join(", ")
            );
        };
        match queue.pop_front() {
            Some(output) => output,
            None => panic!("Cassette exhausted: {:?} has no {port}::{method} interactions left", self.name),
        }
    }

    /// Outputs for `port::method` not yet served.
    #[must_use]
    pub fn remaining(&self, port: &str, method: &str) -> usize {
        self.queues.get(&(port.to_string(), method.to_string())).map_or(0, VecDeque::len)
    }
}
