//! Minimal EXIF-bearing JPEG files for tests: SOI, one APP1 segment holding a
//! little-endian TIFF structure with a single IFD, EOI. No image data.
//! Also a capturing logger for asserting on log output.

use std::sync::{Mutex, OnceLock};

use log::{LevelFilter, Log, Metadata, Record};

pub(crate) enum TiffValue<'a> {
    Ascii(&'a str),
    Short(u16),
}

pub(crate) fn jpeg_with_datetime(datetime: &str) -> Vec<u8> {
    jpeg_with_fields(&[(0x0132, TiffValue::Ascii(datetime))])
}

pub(crate) fn jpeg_with_fields(fields: &[(u16, TiffValue)]) -> Vec<u8> {
    // header (8) + entry count (2) + entries (12 each) + next IFD offset (4)
    let data_start = 8 + 2 + 12 * fields.len() + 4;

    let mut ifd = Vec::new();
    let mut data = Vec::new();
    ifd.extend_from_slice(&(fields.len() as u16).to_le_bytes());
    for (tag, value) in fields {
        ifd.extend_from_slice(&tag.to_le_bytes());
        match value {
            TiffValue::Ascii(s) => {
                let mut bytes = s.as_bytes().to_vec();
                bytes.push(0);
                ifd.extend_from_slice(&2u16.to_le_bytes());
                ifd.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
                if bytes.len() <= 4 {
                    bytes.resize(4, 0);
                    ifd.extend_from_slice(&bytes);
                } else {
                    ifd.extend_from_slice(&((data_start + data.len()) as u32).to_le_bytes());
                    data.extend_from_slice(&bytes);
                    if data.len() % 2 == 1 {
                        data.push(0);
                    }
                }
            }
            TiffValue::Short(v) => {
                ifd.extend_from_slice(&3u16.to_le_bytes());
                ifd.extend_from_slice(&1u32.to_le_bytes());
                ifd.extend_from_slice(&v.to_le_bytes());
                ifd.extend_from_slice(&[0, 0]);
            }
        }
    }
    ifd.extend_from_slice(&0u32.to_le_bytes());

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II*\0");
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&ifd);
    tiff.extend_from_slice(&data);

    let mut jpeg = vec![0xff, 0xd8, 0xff, 0xe1];
    jpeg.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xff, 0xd9]);
    jpeg
}

/// Log sink that keeps every formatted message. The first call installs it
/// as the process-wide logger; later calls reuse it.
pub(crate) fn captured_logs() -> &'static Mutex<Vec<String>> {
    let logger = LOGGER.get_or_init(|| CaptureLogger {
        lines: Mutex::new(Vec::new()),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
    &logger.lines
}

struct CaptureLogger {
    lines: Mutex<Vec<String>>,
}

static LOGGER: OnceLock<CaptureLogger> = OnceLock::new();

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}
