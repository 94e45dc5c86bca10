//! RAR 1.5-4.x and SRR header parsing modules.

pub mod archive_header;
pub mod block_header;
pub mod end_header;
pub mod file_header;
pub mod marker_header;
pub(crate) mod reader;
pub mod srr_blocks;
pub mod sub_block;
pub mod text;
pub mod time;
pub mod unicode_name;

pub use archive_header::{ArchiveHeader, ArchiveHeaderParser};
pub use block_header::{BlockHeader, BlockType, TypeSet};
pub use end_header::{EndHeader, EndHeaderParser};
pub use file_header::{CompressionMethod, FileHeader, FileHeaderParser, HostOs};
pub use marker_header::{MarkerHeader, MarkerHeaderParser};
pub use srr_blocks::{
    SrrHeaderBlock, SrrOsoHashBlock, SrrRarFileBlock, SrrRarPaddingBlock, SrrStoredFileBlock,
};
pub use sub_block::{SubBlock, SubBlockKind, SubBlockParser};
pub use text::{DecodedText, TextEncoding};
pub use time::{DosDateTime, ExtendedTime, TimeField};
