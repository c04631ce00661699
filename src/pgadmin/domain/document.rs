//! The `servers.json` document.

use super::{ServerConnection, ServerKey};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// pgAdmin server registry: `{"Servers": {"<key>": <connection>, ...}}`.
///
/// Entries keep insertion order, which is also the order they are
/// serialized in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerRegistryDocument {
    servers: Vec<(ServerKey, ServerConnection)>,
}

impl ServerRegistryDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing an existing entry with the same key in
    /// place.
    pub fn insert(&mut self, key: ServerKey, connection: ServerConnection) {
        match self.servers.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = connection,
            None => self.servers.push((key, connection)),
        }
    }

    /// Returns the entry stored under `key`.
    #[must_use]
    pub fn get(&self, key: ServerKey) -> Option<&ServerConnection> {
        self.servers
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, connection)| connection)
    }

    /// Returns all entries in order.
    #[must_use]
    pub fn entries(&self) -> &[(ServerKey, ServerConnection)] {
        &self.servers
    }

    /// Returns all keys in order.
    pub fn keys(&self) -> impl Iterator<Item = ServerKey> + '_ {
        self.servers.iter().map(|(key, _)| *key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Returns whether the document lists no servers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Renders the document as pretty-printed UTF-8 JSON with a trailing
    /// newline.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when serialization fails.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

struct ServerEntries<'a>(&'a [(ServerKey, ServerConnection)]);

impl Serialize for ServerEntries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, connection) in self.0 {
            map.serialize_entry(&key.to_string(), connection)?;
        }
        map.end()
    }
}

impl Serialize for ServerRegistryDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut document = serializer.serialize_struct("ServerRegistryDocument", 1)?;
        document.serialize_field("Servers", &ServerEntries(self.entries()))?;
        document.end()
    }
}

struct OrderedEntries(Vec<(ServerKey, ServerConnection)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of positive integer keys to server connections")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(ServerKey, ServerConnection)> = Vec::new();
                while let Some((raw_key, connection)) =
                    access.next_entry::<String, ServerConnection>()?
                {
                    let key: ServerKey = raw_key.parse().map_err(de::Error::custom)?;
                    if entries.iter().any(|(existing, _)| *existing == key) {
                        return Err(de::Error::custom(format!("duplicate server key '{key}'")));
                    }
                    entries.push((key, connection));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "Servers")]
    servers: OrderedEntries,
}

impl<'de> Deserialize<'de> for ServerRegistryDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawDocument::deserialize(deserializer)?;
        Ok(Self {
            servers: raw.servers.0,
        })
    }
}
