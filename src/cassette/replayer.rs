//! Serves recorded interactions back in the order they were captured.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use super::format::{Cassette, Interaction};

/// Replays a cassette. Each (port, method) pair has its own queue, so calls through
/// different ports may interleave differently than they did while recording.
#[derive(Debug)]
pub struct CassetteReplayer {
    name: String,
    queues: HashMap<(String, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Build a replayer over a parsed cassette.
    #[must_use]
    pub fn new(cassette: Cassette) -> Self {
        let mut queues: HashMap<(String, String), VecDeque<Interaction>> = HashMap::new();
        let mut interactions = cassette.interactions;
        interactions.sort_by_key(|i| i.seq);
        for interaction in interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction);
        }
        Self { name: cassette.name, queues }
    }

    /// Read and parse a YAML cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette: Cassette = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
        Ok(Self::new(cassette))
    }

    /// The cassette's recorded name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interactions not yet served, across all ports.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// Take the next interaction recorded for `port`/`method`.
    ///
    /// # Errors
    ///
    /// Returns an error once the pair has nothing left to serve.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Result<Interaction, String> {
        let key = (port.to_string(), method.to_string());
        if let Some(interaction) = self.queues.get_mut(&key).and_then(VecDeque::pop_front) {
            return Ok(interaction);
        }

        let mut available: Vec<String> = self
            .queues
            .iter()
            .filter(|(_, queue)| !queue.is_empty())
            .map(|((p, m), queue)| format!("{p}::{m} ({})", queue.len()))
            .collect();
        available.sort();
        Err(format!(
            "Cassette '{}' exhausted for {port}::{method}. Still queued: [{}]",
            self.name,
            available.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn interaction(seq: u64, port: &str, prompt: &str) -> Interaction {
        Interaction {
            seq,
            port: port.into(),
            method: "generate".into(),
            input: json!({ "prompt": prompt }),
            output: json!({ "Ok": { "text": format!("[\"{prompt}\"]") } }),
        }
    }

    fn cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette {
            name: "fixture".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions,
        }
    }

    #[test]
    fn serves_each_pair_in_sequence_order() {
        let mut replayer = CassetteReplayer::new(cassette(vec![
            interaction(1, "text_generator", "second"),
            interaction(0, "text_generator", "first"),
        ]));
        assert_eq!(replayer.remaining(), 2);

        assert_eq!(replayer.next_interaction("text_generator", "generate").unwrap().seq, 0);
        assert_eq!(replayer.next_interaction("text_generator", "generate").unwrap().seq, 1);
        assert_eq!(replayer.remaining(), 0);
    }

    #[test]
    fn exhausted_pair_reports_what_is_left() {
        let mut replayer = CassetteReplayer::new(cassette(vec![
            interaction(0, "text_generator", "only"),
            interaction(1, "other_port", "unused"),
        ]));
        replayer.next_interaction("text_generator", "generate").unwrap();

        let err = replayer.next_interaction("text_generator", "generate").unwrap_err();
        assert!(err.contains("'fixture' exhausted for text_generator::generate"));
        assert!(err.contains("other_port::generate (1)"));
    }

    #[test]
    fn unknown_pair_errors() {
        let mut replayer = CassetteReplayer::new(cassette(vec![]));
        assert!(replayer.next_interaction("unknown", "method").is_err());
    }

    #[test]
    fn load_round_trips_a_recorded_file() {
        let dir = std::env::temp_dir().join("carosello_replayer_load_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("phrases.cassette.yaml");
        let recorded = cassette(vec![interaction(0, "text_generator", "uno")]);
        let yaml = serde_yaml::to_string(&recorded).unwrap();
        std::fs::write(&path, yaml).unwrap();

        let mut replayer = CassetteReplayer::load(&path).unwrap();
        assert_eq!(replayer.name(), "fixture");
        let served = replayer.next_interaction("text_generator", "generate").unwrap();
        assert_eq!(served.output["Ok"]["text"], "[\"uno\"]");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_missing_file_fails() {
        let err = CassetteReplayer::load(Path::new("/nonexistent/cassette.yaml")).unwrap_err();
        assert!(err.starts_with("Failed to read cassette file"));
    }

    #[test]
    fn load_fixture_with_missing_interactions_key() {
        let dir = std::env::temp_dir().join("carosello_replayer_bare_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bare.cassette.yaml");
        std::fs::write(&path, "name: bare\nrecorded_at: \"2026-03-02T00:00:00Z\"\ncommit: x\n")
            .unwrap();

        assert_eq!(CassetteReplayer::load(&path).unwrap().remaining(), 0);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
