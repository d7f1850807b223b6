//! Opaque envelope transport for [FixBatch]es.
//!
//! A batch must be embeddable in an inter-process message under a well-known
//! key and extractable on the far side. The envelope stands in for that
//! message: a string-keyed map of opaque byte payloads. The delivery
//! collaborator owns any further wire or storage format.

use std::collections::HashMap;

use log::warn;

use crate::batch::FixBatch;
use crate::error::Error;

/// Well-known envelope key under which a [FixBatch] travels.
pub const FIX_BATCH_KEY: &str = "fused_location.fix_batch";

#[derive(Debug, Clone, Default)]
pub struct Envelope {
    extras: HashMap<String, Vec<u8>>,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an arbitrary payload under `key`, replacing any previous one.
    pub fn insert_raw(&mut self, key: &str, payload: Vec<u8>) {
        self.extras.insert(key.to_string(), payload);
    }

    /// Raw payload stored under `key`, if any.
    pub fn get_raw(&self, key: &str) -> Option<&[u8]> {
        self.extras.get(key).map(Vec::as_slice)
    }

    /// Embeds `batch` under [FIX_BATCH_KEY], replacing any previous batch.
    pub fn embed_batch(&mut self, batch: &FixBatch) -> Result<(), Error> {
        let payload = serde_json::to_vec(batch)?;
        self.extras.insert(FIX_BATCH_KEY.to_string(), payload);
        Ok(())
    }

    /// True when this envelope carries a [FixBatch] payload. Idempotent.
    pub fn has_batch(&self) -> bool {
        self.extras.contains_key(FIX_BATCH_KEY)
    }

    /// Extracts the embedded [FixBatch], or None when absent or malformed.
    /// Idempotent: the payload stays in the envelope.
    pub fn extract_batch(&self) -> Option<FixBatch> {
        let payload = self.extras.get(FIX_BATCH_KEY)?;
        match serde_json::from_slice(payload) {
            Ok(batch) => Some(batch),
            Err(e) => {
                warn!("malformed batch payload in envelope: {}", e);
                None
            },
        }
    }
}
