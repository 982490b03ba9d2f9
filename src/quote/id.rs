use std::fmt;
use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

/// A 12-byte document identifier assigned by the primary store on insert.
///
/// The first four bytes are the big-endian creation time in seconds, the rest are
/// random, so ids sort roughly by creation time. It renders as 24 lowercase hex digits.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl Default for ObjectId {
    fn default() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or_default();

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..].copy_from_slice(&rand::random::<[u8; 8]>());
        Self(bytes)
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
