//! DOS timestamps and the RAR extended-time block.

use std::fmt;

use super::reader::FieldReader;

/// A DOS-packed date and time, fields as stored (no calendar validation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DosDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DosDateTime {
    pub fn from_packed(dos_time: u32) -> Self {
        Self {
            second: ((dos_time & 0x1F) * 2) as u8,
            minute: ((dos_time >> 5) & 0x3F) as u8,
            hour: ((dos_time >> 11) & 0x1F) as u8,
            day: ((dos_time >> 16) & 0x1F) as u8,
            month: ((dos_time >> 21) & 0x0F) as u8,
            year: (((dos_time >> 25) & 0x7F) + 1980) as u16,
        }
    }
}

impl fmt::Display for DosDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// One entry of the extended-time block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeField {
    /// Packed DOS base time.
    pub dos_time: u32,
    /// Sub-second precision bytes, little-endian accumulated.
    pub extra: u32,
    /// How many precision bytes were stored (0-3).
    pub precision_bytes: u8,
}

impl TimeField {
    pub fn datetime(&self) -> DosDateTime {
        DosDateTime::from_packed(self.dos_time)
    }
}

/// Decoded extended-time block of a file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtendedTime {
    pub flags: u16,
    pub mtime: Option<TimeField>,
    pub ctime: Option<TimeField>,
    pub atime: Option<TimeField>,
    pub arctime: Option<TimeField>,
}

impl ExtendedTime {
    /// Decode the block at the reader position.
    ///
    /// `mtime` is the file header's own DOS time, reused as the modification
    /// base. Decoding stops quietly at the first field that runs out of bytes,
    /// keeping whatever fields were complete.
    pub(crate) fn parse(reader: &mut FieldReader<'_>, mtime: u32) -> Option<Self> {
        let flags = reader.u16().ok()?;
        let mut out = Self {
            flags,
            ..Self::default()
        };

        for index in 0..4 {
            let nibble = ((flags >> ((3 - index) * 4)) & 0x0F) as u8;
            if nibble & 0x08 == 0 {
                continue;
            }
            let count = 3 - (nibble & 0x03);

            let base = if index == 0 {
                mtime
            } else {
                match reader.u32() {
                    Ok(v) => v,
                    Err(_) => break,
                }
            };

            let mut extra = 0u32;
            let mut read = 0u8;
            for j in 0..count {
                match reader.u8() {
                    Ok(byte) => {
                        extra |= (byte as u32) << (j * 8);
                        read += 1;
                    }
                    Err(_) => break,
                }
            }

            let field = Some(TimeField {
                dos_time: base,
                extra,
                precision_bytes: read,
            });
            match index {
                0 => out.mtime = field,
                1 => out.ctime = field,
                2 => out.atime = field,
                _ => out.arctime = field,
            }
            if read < count {
                break;
            }
        }

        Some(out)
    }
}
