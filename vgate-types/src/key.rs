//! Keyspace ids and the destinations a vindex can map a value to.

use std::fmt;

/// The byte-string shard key of a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct KeyspaceId(Vec<u8>);

impl KeyspaceId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Lowercase hex rendering, as shards and logs print keyspace ids.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl From<Vec<u8>> for KeyspaceId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for KeyspaceId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for KeyspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Encode `v` as an 8-byte big-endian keyspace id. Lexicographic order of the
/// result equals numeric order of the input.
#[inline]
pub fn uint64_key(v: u64) -> KeyspaceId {
    let mut dst = Vec::with_capacity(8);
    dst.extend_from_slice(&v.to_be_bytes());
    KeyspaceId(dst)
}

/// Where a vindex says a value lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Exactly one keyspace id.
    KeyspaceId(KeyspaceId),
    /// Several keyspace ids (non-unique lookups).
    KeyspaceIds(Vec<KeyspaceId>),
    /// A named shard.
    Shard(String),
    /// Every shard in the keyspace.
    AllShards,
    /// The value maps nowhere.
    None,
}

impl Destination {
    /// The keyspace id, when this destination resolved to a single non-empty one.
    pub fn as_keyspace_id(&self) -> Option<&KeyspaceId> {
        match self {
            Destination::KeyspaceId(ksid) if !ksid.is_empty() => Some(ksid),
            _ => None,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::KeyspaceId(ksid) => write!(f, "DestinationKeyspaceID({ksid})"),
            Destination::KeyspaceIds(ksids) => {
                f.write_str("DestinationKeyspaceIDs(")?;
                for (i, ksid) in ksids.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{ksid}")?;
                }
                f.write_str(")")
            }
            Destination::Shard(name) => write!(f, "DestinationShard({name})"),
            Destination::AllShards => f.write_str("DestinationAllShards()"),
            Destination::None => f.write_str("DestinationNone()"),
        }
    }
}

/// Render a destination list for error messages.
pub fn destinations_string(destinations: &[Destination]) -> String {
    let rendered: Vec<String> = destinations.iter().map(ToString::to_string).collect();
    format!("Destinations:{}", rendered.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint64_key_is_big_endian_and_ordered() {
        let a = uint64_key(1);
        let b = uint64_key(2);
        let c = uint64_key(300);
        assert!(a < b && b < c);
        assert_eq!(c.as_bytes(), &[0, 0, 0, 0, 0, 0, 0x01, 0x2c]);
    }

    #[test]
    fn only_non_empty_single_ids_count_as_keyspace_ids() {
        let ksid = KeyspaceId::new(vec![0x16, 0x6b]);
        assert_eq!(
            Destination::KeyspaceId(ksid.clone()).as_keyspace_id(),
            Some(&ksid)
        );
        assert_eq!(
            Destination::KeyspaceId(KeyspaceId::default()).as_keyspace_id(),
            None
        );
        assert_eq!(Destination::AllShards.as_keyspace_id(), None);
        assert_eq!(
            Destination::KeyspaceIds(vec![ksid]).as_keyspace_id(),
            None
        );
    }

    #[test]
    fn destinations_render_for_diagnostics() {
        let rendered = destinations_string(&[
            Destination::KeyspaceId(KeyspaceId::new(vec![0xab])),
            Destination::None,
        ]);
        assert_eq!(
            rendered,
            "Destinations:DestinationKeyspaceID(ab),DestinationNone()"
        );
    }
}
