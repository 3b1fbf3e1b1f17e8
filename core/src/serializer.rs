#![deny(unsafe_code)]
//! Batch payload serializer
//!
//! Assembles the JSON document posted for each batch from the three
//! finalized buffers. The buffers already render as JSON arrays, so this is
//! pure structural concatenation; nothing is re-parsed.
//!
//! ```text
//! {"data":{"times":[1000,1020],"ir":[100,200],"r":[5,10]}}
//! ```

use heapless::String;

use crate::buffer::FinalizedBatch;
use crate::error::SamplerError;

const HEAD: &str = "{\"data\":{\"times\":";
const IR_KEY: &str = ",\"ir\":";
const RED_KEY: &str = ",\"r\":";
const TAIL: &str = "}}";

/// Bytes the JSON skeleton adds around the three arrays
pub const PAYLOAD_OVERHEAD: usize = HEAD.len() + IR_KEY.len() + RED_KEY.len() + TAIL.len();

/// Reusable payload buffer
///
/// Kept alive across batches so the payload never lives on the stack.
#[derive(Debug, Clone, Default)]
pub struct BatchSerializer<const OUT: usize> {
    payload: String<OUT>,
}

impl<const OUT: usize> BatchSerializer<OUT> {
    /// Create an empty serializer
    pub fn new() -> Self {
        Self {
            payload: String::new(),
        }
    }

    /// Build the payload for `batch`
    ///
    /// The returned bytes stay valid until the next call.
    ///
    /// # Errors
    ///
    /// Returns `SamplerError::PayloadOverflow` if the document would not fit;
    /// the previous payload is discarded either way.
    pub fn serialize(&mut self, batch: &FinalizedBatch<'_>) -> Result<&[u8], SamplerError> {
        self.payload.clear();

        let needed = PAYLOAD_OVERHEAD
            + batch.times.len()
            + batch.channel_a.len()
            + batch.channel_b.len();
        if needed > OUT {
            return Err(SamplerError::PayloadOverflow {
                needed,
                capacity: OUT,
            });
        }

        for part in [
            HEAD,
            batch.times,
            IR_KEY,
            batch.channel_a,
            RED_KEY,
            batch.channel_b,
            TAIL,
        ] {
            self.payload
                .push_str(part)
                .map_err(|_| SamplerError::PayloadOverflow {
                    needed,
                    capacity: OUT,
                })?;
        }

        Ok(self.payload.as_bytes())
    }

    /// Last payload built, empty after a failed `serialize`
    pub fn as_str(&self) -> &str {
        self.payload.as_str()
    }
}
