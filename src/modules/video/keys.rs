use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

use crate::infrastructure::media::GeometryCategory;

const KEY_ENTROPY_BYTES: usize = 32;
const KEY_EXTENSION: &str = "mp4";

/// Object key for an uploaded video: `{category}/{random-id}.mp4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Draws 256 fresh bits from the thread-local CSPRNG for every call.
    pub fn derive(category: GeometryCategory) -> Self {
        let mut entropy = [0u8; KEY_ENTROPY_BYTES];
        rand::rng().fill_bytes(&mut entropy);

        let id = URL_SAFE_NO_PAD.encode(entropy);
        Self(format!("{category}/{id}.{KEY_EXTENSION}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
