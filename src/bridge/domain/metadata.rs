//! Service metadata extraction from container environment and labels.
//!
//! Two keyspaces are honored: global (`SERVICE_<KEY>` environment variables,
//! `service.<key>` labels) and port-scoped (`SERVICE_<PORT>_<KEY>`,
//! `service.<port>.<key>`). Port-scoped values override global values for
//! their port, and the set of port-scoped keys is recorded so that name
//! disambiguation can tell an explicit per-port `name` from a global one.

use std::collections::{HashMap, HashSet};

const ENV_PREFIX: &str = "SERVICE_";
const LABEL_PREFIX: &str = "service.";

/// Reserved keys that drive derivation instead of becoming attributes.
const RESERVED_KEYS: [&str; 5] = ["id", "name", "tags", "proxyport", "ignore"];

/// The key→value metadata bag for one container port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceMetadata {
    values: HashMap<String, String>,
    port_scoped: HashSet<String>,
}

impl ServiceMetadata {
    /// Extracts the metadata bag for `port` from environment entries and
    /// labels.
    ///
    /// Entries are visited in order, environment first; a port-scoped value
    /// shadows any global value for the same key regardless of order.
    #[must_use]
    pub fn extract(env: &[String], labels: &HashMap<String, String>, port: u16) -> Self {
        let mut metadata = Self::default();

        for entry in env {
            let Some((key, value)) = entry.split_once('=') else {
                continue;
            };
            if let Some(key) = key.strip_prefix(ENV_PREFIX) {
                metadata.apply(key, value, '_', port);
            }
        }

        for (key, value) in labels {
            if let Some(key) = key.strip_prefix(LABEL_PREFIX) {
                metadata.apply(key, value, '.', port);
            }
        }

        metadata
    }

    fn apply(&mut self, raw_key: &str, value: &str, separator: char, port: u16) {
        let key = raw_key.to_ascii_lowercase();
        if self.port_scoped.contains(&key) {
            return;
        }
        if let Some((prefix, rest)) = key.split_once(separator)
            && !rest.is_empty()
            && let Ok(scoped_port) = prefix.parse::<u16>()
        {
            if scoped_port == port {
                self.values.insert(rest.to_string(), value.to_string());
                self.port_scoped.insert(rest.to_string());
            }
            return;
        }
        self.values.insert(key, value.to_string());
    }

    /// Returns the value for a key, `None` when absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the value for a key, treating an empty value as absent.
    #[must_use]
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    /// Returns true when the key was set through a port-scoped source.
    #[must_use]
    pub fn is_port_scoped(&self, key: &str) -> bool {
        self.port_scoped.contains(key)
    }

    /// Consumes the bag, yielding the free-form attributes: every entry
    /// except the reserved keys.
    #[must_use]
    pub fn into_attrs(self) -> HashMap<String, String> {
        let mut attrs = self.values;
        for key in RESERVED_KEYS {
            attrs.remove(key);
        }
        attrs
    }
}
