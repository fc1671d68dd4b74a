use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sentinel used wherever an entity could not be identified.
pub const UNKNOWN: &str = "Unknown";

/// Fatal input problems. Raised inside `anyhow` chains so callers can
/// `downcast_ref::<InputError>()` to tell a missing file from a bad one.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {}: {reason}", .path.display())]
    Format { path: PathBuf, reason: String },
}

impl InputError {
    pub fn format(path: &Path, reason: impl Into<String>) -> Self {
        InputError::Format {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// 64-bit perceptual hash, hex-encoded in catalog files (16 lowercase digits,
/// first bit of the 8x8 grid is the most significant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PerceptualHash(pub u64);

impl PerceptualHash {
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        if hex.is_empty() || hex.len() > 16 {
            return None;
        }
        u64::from_str_radix(hex, 16).ok().map(PerceptualHash)
    }

    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }

    /// Number of differing bits.
    pub fn distance(&self, other: &PerceptualHash) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

/// One named reference hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub hash: PerceptualHash,
}

/// Reference icon hashes, kept in file order.
///
/// The catalog is produced by an external job; this crate only reads it.
#[derive(Debug, Clone, Default)]
pub struct HashCatalog {
    entries: Vec<CatalogEntry>,
}

impl HashCatalog {
    /// Load `name -> hex hash` pairs from a JSON object.
    /// Entries whose value is not a string are skipped; a string that is not
    /// a valid hash makes the whole file malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let doc = read_json(path)?;
        let object = doc
            .as_object()
            .ok_or_else(|| InputError::format(path, "expected an object of name -> hash"))?;

        let mut entries = Vec::with_capacity(object.len());
        for (name, value) in object {
            let Some(hex) = value.as_str() else {
                tracing::warn!("Skipping catalog entry {} with non-string hash", name);
                continue;
            };
            let hash = PerceptualHash::from_hex(hex).ok_or_else(|| {
                InputError::format(path, format!("invalid hash {:?} for {}", hex, name))
            })?;
            entries.push(CatalogEntry {
                name: name.clone(),
                hash,
            });
        }

        tracing::info!("Loaded {} icon hashes from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, PerceptualHash)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, hash)| CatalogEntry {
                    name: name.into(),
                    hash,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load the ordered candidate player names from `{"players": [...]}`.
pub fn load_player_whitelist(path: &Path) -> Result<Vec<String>> {
    load_name_list(path, "players")
}

/// Load the ordered canonical map names from `{"maps": [...]}`.
pub fn load_map_whitelist(path: &Path) -> Result<Vec<String>> {
    load_name_list(path, "maps")
}

/// Load the ordered canonical server region names from `{"regions": [...]}`.
pub fn load_region_whitelist(path: &Path) -> Result<Vec<String>> {
    load_name_list(path, "regions")
}

/// Read a list of string names stored under `key` of a JSON object.
/// A missing key, a non-array value or a non-string item is a format error.
pub fn load_name_list(path: &Path, key: &str) -> Result<Vec<String>> {
    let doc = read_json(path)?;
    let items = doc
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| InputError::format(path, format!("missing list \"{}\"", key)))?;

    let names = items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| InputError::format(path, format!("non-string entry in \"{}\"", key)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!("Loaded {} {} from {}", names.len(), key, path.display());
    Ok(names)
}

/// Parse an externally supplied player list: one name per line, blank lines ignored.
pub fn parse_player_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&content)
        .map_err(|e| InputError::format(path, e.to_string()))
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn input_error(err: &anyhow::Error) -> &InputError {
        err.chain()
            .find_map(|e| e.downcast_ref::<InputError>())
            .expect("error chain should carry an InputError")
    }

    #[test]
    fn test_hash_hex_is_zero_padded() {
        let hash = PerceptualHash::from_hex("f0").unwrap();
        assert_eq!(hash.0, 0xf0);
        assert_eq!(hash.to_hex(), "00000000000000f0");
        assert!(PerceptualHash::from_hex("not hex").is_none());
        assert!(PerceptualHash::from_hex("0123456789abcdef0").is_none());
    }

    #[test]
    fn test_hash_distance_counts_bits() {
        let a = PerceptualHash(0b1011);
        let b = PerceptualHash(0b0001);
        assert_eq!(a.distance(&b), 2);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_catalog_keeps_file_order_and_skips_non_strings() {
        let file = write_temp(
            r#"{"Zhin": "ffff000000000000", "Ash": 12, "Androxus": "00000000ffffffff"}"#,
        );
        let catalog = HashCatalog::load(file.path()).unwrap();
        let names: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Zhin", "Androxus"]);
        assert_eq!(catalog.entries()[1].hash, PerceptualHash(0xffff_ffff));
    }

    #[test]
    fn test_catalog_bad_hash_is_format_error() {
        let file = write_temp(r#"{"Zhin": "zz"}"#);
        let err = HashCatalog::load(file.path()).unwrap_err();
        assert!(matches!(input_error(&err), InputError::Format { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_player_whitelist(Path::new("/nonexistent/players.json")).unwrap_err();
        assert!(matches!(input_error(&err), InputError::Io { .. }));
    }

    #[test]
    fn test_whitelist_schema_violations() {
        let missing_key = write_temp(r#"{"names": ["a"]}"#);
        let err = load_player_whitelist(missing_key.path()).unwrap_err();
        assert!(matches!(input_error(&err), InputError::Format { .. }));

        let wrong_type = write_temp(r#"{"players": "ComradeNick"}"#);
        let err = load_player_whitelist(wrong_type.path()).unwrap_err();
        assert!(matches!(input_error(&err), InputError::Format { .. }));

        let bad_json = write_temp("{players: ");
        let err = load_map_whitelist(bad_json.path()).unwrap_err();
        assert!(matches!(input_error(&err), InputError::Format { .. }));
    }

    #[test]
    fn test_whitelist_loads_in_order() {
        let file = write_temp(r#"{"maps": ["Frog Isle", "Jaguar Falls", "Serpent Beach"]}"#);
        let maps = load_map_whitelist(file.path()).unwrap();
        assert_eq!(maps, vec!["Frog Isle", "Jaguar Falls", "Serpent Beach"]);
    }

    #[test]
    fn test_parse_player_list() {
        let players = parse_player_list("ComradeNick\n\n  Viktor \r\nBarik\n");
        assert_eq!(players, vec!["ComradeNick", "Viktor", "Barik"]);
    }
}
