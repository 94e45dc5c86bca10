//! Service sub-block (`0x7A`) parser.
//!
//! A service block is laid out exactly like a file header; its name field
//! is a short ASCII tag such as `CMT` or `RR` and its packed payload holds
//! the service data.

use super::block_header::BlockHeader;
use super::file_header::{FileHeader, FileHeaderParser};
use crate::error::Result;

/// Service block type constant.
pub const SUB_BLOCK_TYPE: u8 = 0x7A;

/// Known service block tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubBlockKind {
    RecoveryRecord,
    AuthenticityVerification,
    Comment,
    AccessControlList,
    Stream,
    ExtendedAttributes,
    UnixOwner,
    QuickOpen,
    Os2ExtendedAttributes,
    SymbolicLink,
    HardLink,
}

impl SubBlockKind {
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        let kind = match tag {
            b"RR" => Self::RecoveryRecord,
            b"AV" => Self::AuthenticityVerification,
            b"CMT" => Self::Comment,
            b"ACL" => Self::AccessControlList,
            b"STM" => Self::Stream,
            b"EA" => Self::ExtendedAttributes,
            b"UOW" => Self::UnixOwner,
            b"QO" => Self::QuickOpen,
            b"OS2EA" => Self::Os2ExtendedAttributes,
            b"LNKS" => Self::SymbolicLink,
            b"LNKH" => Self::HardLink,
            _ => return None,
        };
        Some(kind)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::RecoveryRecord => "RR",
            Self::AuthenticityVerification => "AV",
            Self::Comment => "CMT",
            Self::AccessControlList => "ACL",
            Self::Stream => "STM",
            Self::ExtendedAttributes => "EA",
            Self::UnixOwner => "UOW",
            Self::QuickOpen => "QO",
            Self::Os2ExtendedAttributes => "OS2EA",
            Self::SymbolicLink => "LNKS",
            Self::HardLink => "LNKH",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::RecoveryRecord => "Recovery record",
            Self::AuthenticityVerification => "Authenticity verification",
            Self::Comment => "Archive comment",
            Self::AccessControlList => "NTFS access control list",
            Self::Stream => "NTFS alternate data stream",
            Self::ExtendedAttributes => "Extended attributes",
            Self::UnixOwner => "Unix owner and group",
            Self::QuickOpen => "Quick open information",
            Self::Os2ExtendedAttributes => "OS/2 extended attributes",
            Self::SymbolicLink => "Symbolic link",
            Self::HardLink => "Hard link",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubBlock {
    /// The file-header shaped record.
    pub record: FileHeader,
    /// Name field read as an ASCII tag.
    pub sub_type: String,
    pub kind: Option<SubBlockKind>,
}

impl SubBlock {
    #[inline]
    pub fn header(&self) -> &BlockHeader {
        &self.record.header
    }

    /// True only for a two-byte `RR` name.
    pub fn is_recovery_record(&self) -> bool {
        self.record.name_bytes == b"RR"
    }

    pub fn is_comment(&self) -> bool {
        self.kind == Some(SubBlockKind::Comment)
    }
}

pub struct SubBlockParser;

impl SubBlockParser {
    pub fn parse(buffer: &[u8], header: BlockHeader) -> Result<SubBlock> {
        let record = FileHeaderParser::parse(buffer, header)?;
        let sub_type = String::from_utf8_lossy(&record.name_bytes).into_owned();
        let kind = SubBlockKind::from_tag(&record.name_bytes);
        Ok(SubBlock {
            record,
            sub_type,
            kind,
        })
    }
}
