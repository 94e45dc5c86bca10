//! RAR format detection and signatures.
//!
//! Signature checks are advisory: block parsing proceeds whether or not the
//! buffer starts with a RAR marker, and SRR files carry none at all.

/// RAR file signature detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// RAR 1.5 to 4.x
    Rar15,
    /// RAR 5.0+
    Rar50,
}

impl Signature {
    pub const RAR15: &[u8; 7] = b"Rar!\x1a\x07\x00";
    pub const RAR50: &[u8; 8] = b"Rar!\x1a\x07\x01\x00";

    pub fn size(&self) -> u64 {
        match self {
            Self::Rar15 => 7,
            Self::Rar50 => 8,
        }
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(Self::RAR50) {
            Some(Self::Rar50)
        } else if data.starts_with(Self::RAR15) {
            Some(Self::Rar15)
        } else {
            None
        }
    }

    pub fn bytes(&self) -> &'static [u8] {
        match self {
            Self::Rar15 => Self::RAR15,
            Self::Rar50 => Self::RAR50,
        }
    }
}

/// Every offset at which `signature` occurs in `data`, overlapping matches included.
pub fn find_markers(data: &[u8], signature: Signature) -> Vec<usize> {
    let needle = signature.bytes();
    if data.len() < needle.len() {
        return Vec::new();
    }
    data.windows(needle.len())
        .enumerate()
        .filter(|(_, window)| *window == needle)
        .map(|(offset, _)| offset)
        .collect()
}

/// Which RAR generation an SRR file's embedded headers come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddedVersion {
    /// No stored-RAR-file blocks and no markers.
    NoRarBlocks,
    /// Markers occur but the SRR chain holds no stored-RAR-file blocks.
    MarkersWithoutRarBlocks,
    Rar4,
    Rar5,
    /// Both marker generations occur.
    Mixed,
    /// Stored-RAR-file blocks exist but no marker was found.
    MarkerNotFound,
}

impl EmbeddedVersion {
    /// Classify from marker counts and whether any stored-RAR-file block exists.
    pub fn classify(rar4_markers: usize, rar5_markers: usize, has_rar_blocks: bool) -> Self {
        match (has_rar_blocks, rar4_markers > 0, rar5_markers > 0) {
            (false, false, false) => Self::NoRarBlocks,
            (false, _, _) => Self::MarkersWithoutRarBlocks,
            (true, true, true) => Self::Mixed,
            (true, true, false) => Self::Rar4,
            (true, false, true) => Self::Rar5,
            (true, false, false) => Self::MarkerNotFound,
        }
    }
}
