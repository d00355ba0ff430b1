//! Top-level ISO-BMFF box walk used to confirm a progressive (faststart) MP4.

use std::io::SeekFrom;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

use super::error::{MediaError, MediaResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHeader {
    pub kind: [u8; 4],
    pub offset: u64,
    pub size: u64,
}

impl BoxHeader {
    pub fn is(&self, kind: &[u8; 4]) -> bool {
        &self.kind == kind
    }
}

/// Lists the top-level boxes of a stream of `len` bytes, rejecting inconsistent sizes.
pub async fn top_level_boxes<R>(reader: &mut R, len: u64) -> MediaResult<Vec<BoxHeader>>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let mut boxes = Vec::new();
    let mut offset = 0u64;

    while offset < len {
        if len - offset < 8 {
            return Err(MediaError::malformed(format!("truncated box header at {offset}")));
        }

        reader.seek(SeekFrom::Start(offset)).await?;
        let mut header = [0u8; 8];
        reader.read_exact(&mut header).await?;

        let declared = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as u64;
        let kind = [header[4], header[5], header[6], header[7]];

        let (size, header_len) = match declared {
            0 => (len - offset, 8),
            1 => {
                if len - offset < 16 {
                    return Err(MediaError::malformed(format!("truncated largesize at {offset}")));
                }
                let mut large = [0u8; 8];
                reader.read_exact(&mut large).await?;
                (u64::from_be_bytes(large), 16)
            }
            n => (n, 8),
        };

        if size < header_len || size > len - offset {
            return Err(MediaError::malformed(format!(
                "box {:?} at {offset} declares {size} bytes",
                String::from_utf8_lossy(&kind)
            )));
        }

        boxes.push(BoxHeader { kind, offset, size });
        offset += size;
    }

    Ok(boxes)
}

/// Requires `ftyp` first and `moov` ahead of any `mdat`.
pub fn check_progressive(boxes: &[BoxHeader]) -> MediaResult<()> {
    match boxes.first() {
        Some(first) if first.is(b"ftyp") => {}
        _ => return Err(MediaError::malformed("file does not start with ftyp")),
    }

    let moov = boxes
        .iter()
        .position(|b| b.is(b"moov"))
        .ok_or_else(|| MediaError::malformed("no moov box"))?;

    if let Some(mdat) = boxes.iter().position(|b| b.is(b"mdat")) {
        if mdat < moov {
            return Err(MediaError::malformed("moov box follows mdat"));
        }
    }

    Ok(())
}

pub async fn verify_progressive_file(path: &Path) -> MediaResult<()> {
    let mut file = File::open(path).await?;
    let len = file.metadata().await?.len();
    let boxes = top_level_boxes(&mut file, len).await?;
    check_progressive(&boxes)
}
