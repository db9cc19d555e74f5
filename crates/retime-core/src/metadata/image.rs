use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{Field, In, Reader, Value as ExifValue};
use serde_json::Value;

use super::{MetadataMap, TagKey};
use crate::error::RetimeError;

/// Read the primary-image EXIF fields of an image file.
/// JPEG, PNG and HEIF (HEIC/AVIF) containers are understood by the reader.
pub fn read_image_metadata(path: &Path) -> Result<MetadataMap, RetimeError> {
    let file = File::open(path).map_err(|e| RetimeError::MetadataRead(e.to_string()))?;
    let exif = Reader::new()
        .read_from_container(&mut BufReader::new(file))
        .map_err(|e| match e {
            exif::Error::NotFound(container) => {
                RetimeError::MetadataRead(format!("no EXIF data in {} container", container))
            }
            other => RetimeError::MetadataRead(other.to_string()),
        })?;

    let mut metadata = MetadataMap::new();
    for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
        metadata.insert(tag_key(field), field_value(field));
    }
    Ok(metadata)
}

fn tag_key(field: &Field) -> TagKey {
    if field.tag.description().is_some() {
        TagKey::Name(field.tag.to_string())
    } else {
        TagKey::Id(field.tag.number())
    }
}

/// ASCII values are kept verbatim: `display_value` rewrites EXIF dates
/// as `YYYY-MM-DD HH:MM:SS`, which would hide the stored format.
fn field_value(field: &Field) -> Value {
    match &field.value {
        ExifValue::Ascii(parts) => Value::String(
            parts
                .first()
                .map(|p| String::from_utf8_lossy(p).into_owned())
                .unwrap_or_default(),
        ),
        ExifValue::Short(v) if v.len() == 1 => Value::from(v[0]),
        ExifValue::Long(v) if v.len() == 1 => Value::from(v[0]),
        _ => Value::String(field.display_value().to_string()),
    }
}
