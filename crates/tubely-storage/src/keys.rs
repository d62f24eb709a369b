//! Object key generation.
//!
//! Key format: `{orientation}/{random-id}{extension}` for videos and
//! `{random-id}{extension}` for thumbnails. The random id is 32 bytes of entropy
//! encoded as URL-safe base64 without padding, so keys are never checked for
//! existence before use.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use tubely_core::models::Orientation;

/// Number of random bytes in every key (256 bits).
pub const KEY_ENTROPY_BYTES: usize = 32;

/// Source of random bytes for key generation.
///
/// Injected so tests can supply deterministic sequences.
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]);
}

/// Thread-local CSPRNG from `rand`, reseeded from the OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) {
        rand::rng().fill_bytes(dest);
    }
}

/// Relative object key. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey(String);

impl AssetKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AssetKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonical filename extension for a media type, with the leading dot.
///
/// First entry of the standard MIME table wins (so `image/jpeg` maps to
/// `.jfif`); unmapped types yield an empty string and the key is built without
/// an extension.
pub fn extension_for(media_type: &str) -> String {
    mime_guess::get_mime_extensions_str(media_type)
        .and_then(|exts| exts.first())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// Builds object keys from an entropy source.
#[derive(Clone)]
pub struct KeyBuilder {
    entropy: Arc<dyn EntropySource>,
}

impl Default for KeyBuilder {
    fn default() -> Self {
        Self::new(Arc::new(OsEntropy))
    }
}

impl KeyBuilder {
    pub fn new(entropy: Arc<dyn EntropySource>) -> Self {
        Self { entropy }
    }

    fn random_id(&self) -> String {
        let mut bytes = [0u8; KEY_ENTROPY_BYTES];
        self.entropy.fill(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// `{random-id}{extension}`
    pub fn build_asset_key(&self, media_type: &str) -> AssetKey {
        AssetKey(format!("{}{}", self.random_id(), extension_for(media_type)))
    }

    /// `{orientation}/{random-id}{extension}`
    pub fn build_key(&self, orientation: Orientation, media_type: &str) -> AssetKey {
        AssetKey(format!(
            "{}/{}{}",
            orientation,
            self.random_id(),
            extension_for(media_type)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct SeededEntropy(Mutex<StdRng>);

    impl SeededEntropy {
        fn new(seed: u64) -> Self {
            Self(Mutex::new(StdRng::seed_from_u64(seed)))
        }
    }

    impl EntropySource for SeededEntropy {
        fn fill(&self, dest: &mut [u8]) {
            self.0.lock().unwrap().fill_bytes(dest);
        }
    }

    struct ZeroEntropy;

    impl EntropySource for ZeroEntropy {
        fn fill(&self, dest: &mut [u8]) {
            dest.fill(0);
        }
    }

    #[test]
    fn test_key_is_namespaced_by_orientation() {
        let builder = KeyBuilder::default();
        let key = builder.build_key(Orientation::Landscape, "video/mp4");
        assert!(key.as_str().starts_with("landscape/"));

        let key = builder.build_key(Orientation::Portrait, "video/mp4");
        assert!(key.as_str().starts_with("portrait/"));

        let key = builder.build_key(Orientation::Other, "video/mp4");
        assert!(key.as_str().starts_with("other/"));
    }

    #[test]
    fn test_ten_thousand_keys_are_distinct() {
        let builder = KeyBuilder::default();
        let ext = ".mp4";
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let key = builder.build_key(Orientation::Landscape, "video/mp4");
            assert!(key.as_str().ends_with(ext));
            let id = key
                .as_str()
                .trim_start_matches("landscape/")
                .trim_end_matches(ext)
                .to_string();
            assert!(seen.insert(id), "duplicate random component");
        }
    }

    #[test]
    fn test_random_component_carries_256_bits() {
        let builder = KeyBuilder::new(Arc::new(ZeroEntropy));
        let key = builder.build_asset_key("application/x-tubely-unknown");
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(key.as_str().len(), 43);
        assert_eq!(key.as_str(), "A".repeat(43));
    }

    #[test]
    fn test_seeded_entropy_is_deterministic() {
        let first = KeyBuilder::new(Arc::new(SeededEntropy::new(7)));
        let second = KeyBuilder::new(Arc::new(SeededEntropy::new(7)));
        assert_eq!(
            first.build_key(Orientation::Other, "video/mp4"),
            second.build_key(Orientation::Other, "video/mp4")
        );
    }

    #[test]
    fn test_random_id_is_url_safe() {
        let builder = KeyBuilder::new(Arc::new(SeededEntropy::new(42)));
        for _ in 0..100 {
            let key = builder.build_asset_key("image/png");
            assert!(!key.as_str().contains('+'));
            assert!(!key.as_str().contains('/'));
            assert!(!key.as_str().contains('='));
        }
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_for("video/mp4"), ".mp4");
        assert_eq!(extension_for("image/png"), ".png");
        assert_eq!(extension_for("image/jpeg"), ".jfif");
        assert_eq!(extension_for("text/css"), ".css");
        assert_eq!(extension_for("application/x-tubely-unknown"), "");
        assert_eq!(extension_for(""), "");
    }

    #[test]
    fn test_unmapped_type_keeps_key_without_extension() {
        let builder = KeyBuilder::new(Arc::new(ZeroEntropy));
        let key = builder.build_key(Orientation::Other, "application/x-tubely-unknown");
        assert_eq!(key.to_string(), format!("other/{}", "A".repeat(43)));
    }
}
