use std::fmt;

use chrono::{DateTime, Duration, Local, NaiveDateTime, Offset, TimeZone, Utc};
use serde_json::Value;

use crate::error::RetimeError;
use crate::media::MediaKind;
use crate::metadata::MetadataMap;

/// Which clock a capture date was recorded against.
///
/// EXIF `DateTime` carries no zone and is camera-local wall time. The video
/// `creation_time` tag ends in `Z` and is read as UTC. The two are kept
/// apart instead of being folded into one convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureZone {
    Local,
    Utc,
}

/// Fixed field and format used to read the capture date of one media kind.
struct DateField {
    field: &'static str,
    format: &'static str,
    /// Human-readable pattern for diagnostics
    pattern: &'static str,
    zone: CaptureZone,
}

const IMAGE_DATE: DateField = DateField {
    field: "DateTime",
    format: "%Y:%m:%d %H:%M:%S",
    pattern: "YYYY:MM:DD HH:MM:SS",
    zone: CaptureZone::Local,
};

const VIDEO_DATE: DateField = DateField {
    field: "creation_time",
    format: "%Y-%m-%dT%H:%M:%S%.6fZ",
    pattern: "YYYY-MM-DDTHH:MM:SS.ffffffZ",
    zone: CaptureZone::Utc,
};

fn date_field(kind: MediaKind) -> &'static DateField {
    match kind {
        MediaKind::Image => &IMAGE_DATE,
        MediaKind::Video => &VIDEO_DATE,
    }
}

/// The moment a file was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureMoment {
    naive: NaiveDateTime,
    zone: CaptureZone,
}

impl CaptureMoment {
    pub fn local(naive: NaiveDateTime) -> Self {
        Self {
            naive,
            zone: CaptureZone::Local,
        }
    }

    pub fn utc(naive: NaiveDateTime) -> Self {
        Self {
            naive,
            zone: CaptureZone::Utc,
        }
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.naive
    }

    pub fn zone(&self) -> CaptureZone {
        self.zone
    }

    /// Absolute instant of this moment.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self.zone {
            CaptureZone::Utc => self.naive.and_utc(),
            CaptureZone::Local => local_to_utc(self.naive, &Local),
        }
    }
}

/// Interpret a wall-clock time in `tz`. Ambiguous times (DST fall-back) take
/// the earlier instant. Times inside a DST gap take the offset in effect just
/// before the gap, the way `mktime` normalizes them.
pub(crate) fn local_to_utc<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> DateTime<Utc> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt.with_timezone(&Utc);
    }
    let offset = tz
        .offset_from_local_datetime(&(naive - Duration::days(1)))
        .earliest()
        .map(|o| o.fix())
        .unwrap_or_else(|| tz.offset_from_utc_datetime(&naive).fix());
    (naive - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

impl fmt::Display for CaptureMoment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.naive.format("%Y-%m-%d %H:%M:%S%.f"))?;
        if self.zone == CaptureZone::Utc {
            f.write_str(" UTC")?;
        }
        Ok(())
    }
}

/// Read the capture date of a `kind` file from its metadata.
///
/// Exactly one field and one format are tried per kind; a missing field is
/// never replaced by a default.
pub fn resolve(kind: MediaKind, metadata: &MetadataMap) -> Result<CaptureMoment, RetimeError> {
    let date = date_field(kind);
    let value = metadata
        .get(date.field)
        .ok_or(RetimeError::DateFieldMissing { field: date.field })?;

    let text = match value {
        Value::String(s) => s.as_str(),
        other => {
            return Err(RetimeError::DateParse {
                value: other.to_string(),
                reason: format!("{} is not a text value", date.field),
            })
        }
    };

    if text.len() != date.pattern.len() {
        return Err(RetimeError::DateParse {
            value: text.to_string(),
            reason: format!("expected {}", date.pattern),
        });
    }

    let naive = NaiveDateTime::parse_from_str(text, date.format).map_err(|e| {
        RetimeError::DateParse {
            value: text.to_string(),
            reason: format!("expected {}: {}", date.pattern, e),
        }
    })?;

    Ok(CaptureMoment {
        naive,
        zone: date.zone,
    })
}
