//! Network sync packets.
//!
//! The authoritative side encodes its current definitions of one kind into
//! a CBOR packet; the receiving side decodes it and replaces its own
//! registry, which broadcasts a `NetworkSync` invalidation.

use crate::definition::ItemDefinition;
use crate::error::{DefsError, DefsResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
struct PacketRef<'a, D> {
    kind: &'a str,
    entries: Vec<EntryRef<'a, D>>,
}

#[derive(Serialize)]
struct EntryRef<'a, D> {
    id: &'a str,
    definition: &'a D,
}

#[derive(Deserialize)]
struct Packet<D> {
    kind: String,
    entries: Vec<Entry<D>>,
}

#[derive(Deserialize)]
struct Entry<D> {
    id: String,
    definition: D,
}

/// Encodes definitions, in order, into a sync packet.
pub fn encode_packet<D: ItemDefinition>(definitions: &[Arc<D>]) -> DefsResult<Vec<u8>> {
    let packet = PacketRef {
        kind: D::KIND,
        entries: definitions
            .iter()
            .map(|d| EntryRef {
                id: d.id(),
                definition: d.as_ref(),
            })
            .collect(),
    };
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&packet, &mut bytes)
        .map_err(|e| DefsError::encoding_failed(e.to_string()))?;
    Ok(bytes)
}

/// Decodes a sync packet, restoring ids.
///
/// Fails with [`DefsError::KindMismatch`] if the packet carries another kind.
pub fn decode_packet<D: ItemDefinition>(bytes: &[u8]) -> DefsResult<Vec<D>> {
    let packet: Packet<D> =
        ciborium::de::from_reader(bytes).map_err(|e| DefsError::decoding_failed(e.to_string()))?;
    if packet.kind != D::KIND {
        return Err(DefsError::KindMismatch {
            expected: D::KIND.to_string(),
            actual: packet.kind,
        });
    }
    Ok(packet
        .entries
        .into_iter()
        .map(|entry| {
            let mut definition = entry.definition;
            definition.set_id(entry.id);
            definition
        })
        .collect())
}
