pub mod image;
pub mod video;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::error::RetimeError;
use crate::media::MediaKind;

pub use video::{FfprobeProber, StreamDescriptor, StreamProber};

/// Key of a metadata entry: a tag name, or the raw numeric id for EXIF tags
/// the reader has no name for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TagKey {
    Name(String),
    Id(u16),
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKey::Name(name) => f.write_str(name),
            TagKey::Id(id) => write!(f, "0x{:04x}", id),
        }
    }
}

/// Tag mapping extracted from one file. Values are scalars: strings for
/// text tags, numbers for single numeric EXIF values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataMap {
    entries: BTreeMap<TagKey, Value>,
}

impl MetadataMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, keeping the first one if the key is already present.
    pub fn insert(&mut self, key: TagKey, value: Value) {
        self.entries.entry(key).or_insert(value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(&TagKey::Name(name.to_string()))
    }

    pub fn get_id(&self, id: u16) -> Option<&Value> {
        self.entries.get(&TagKey::Id(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TagKey, &Value)> {
        self.entries.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, String)> for MetadataMap {
    fn from_iter<I: IntoIterator<Item = (S, String)>>(iter: I) -> Self {
        let mut map = MetadataMap::new();
        for (k, v) in iter {
            map.insert(TagKey::Name(k.into()), Value::String(v));
        }
        map
    }
}

/// Extract the metadata of `path`, dispatching on its kind.
pub fn extract(
    kind: MediaKind,
    path: &Path,
    prober: &dyn StreamProber,
) -> Result<MetadataMap, RetimeError> {
    match kind {
        MediaKind::Image => image::read_image_metadata(path),
        MediaKind::Video => video::read_video_metadata(path, prober),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insert_wins() {
        let mut map = MetadataMap::new();
        map.insert(TagKey::Name("DateTime".into()), Value::from("2020:01:01 00:00:00"));
        map.insert(TagKey::Name("DateTime".into()), Value::from("1999:01:01 00:00:00"));
        assert_eq!(map.iter().count(), 1);
        assert_eq!(map.get("DateTime"), Some(&Value::from("2020:01:01 00:00:00")));
    }

    #[test]
    fn test_name_and_id_keys_are_distinct() {
        let mut map = MetadataMap::new();
        map.insert(TagKey::Id(0x0132), Value::from(1));
        assert!(map.get("DateTime").is_none());
        assert_eq!(map.get_id(0x0132), Some(&Value::from(1)));
        assert_eq!(TagKey::Id(0x0132).to_string(), "0x0132");
    }
}
