//! Bucket padding codec.
//!
//! Every payload is padded to one of four fixed sizes before outer
//! encryption, so an observer learns only which bucket a message fell into.
//!
//! Layout of a padded buffer:
//! - bytes 0-3: payload length (big-endian u32)
//! - bytes 4..4+len: payload
//! - remainder: zero filler
//!
//! The filler never depends on payload content. Decoders do not inspect it.

use crate::errors::PaddingError;

/// Size of the big-endian length prefix at the start of every padded buffer.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Largest payload that can be padded (1 MiB minus the length prefix).
pub const MAX_PAYLOAD_SIZE: usize = PaddingBucket::Mib1.size() - LENGTH_PREFIX_SIZE;

/// Target size for a padded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PaddingBucket {
    /// 1 KiB
    Kib1,
    /// 16 KiB
    Kib16,
    /// 256 KiB
    Kib256,
    /// 1 MiB
    Mib1,
}

impl PaddingBucket {
    /// All buckets, smallest first.
    pub const ALL: [Self; 4] = [Self::Kib1, Self::Kib16, Self::Kib256, Self::Mib1];

    /// Padded buffer size in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Kib1 => 1024,
            Self::Kib16 => 16 * 1024,
            Self::Kib256 => 256 * 1024,
            Self::Mib1 => 1024 * 1024,
        }
    }

    /// Largest payload this bucket holds after the length prefix.
    #[must_use]
    pub const fn capacity(self) -> usize {
        self.size() - LENGTH_PREFIX_SIZE
    }

    /// Smallest bucket that holds a payload of `payload_len` bytes.
    ///
    /// `None` if the payload exceeds [`MAX_PAYLOAD_SIZE`].
    #[must_use]
    pub fn for_payload(payload_len: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| payload_len <= bucket.capacity())
    }

    /// Bucket whose size is exactly `padded_len`.
    #[must_use]
    pub fn from_padded_len(padded_len: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.size() == padded_len)
    }
}

/// Pad a payload to the smallest bucket that fits it.
///
/// # Errors
///
/// - `PaddingError::PayloadTooLarge` if `plaintext.len() > MAX_PAYLOAD_SIZE`
pub fn pad(plaintext: &[u8]) -> Result<(PaddingBucket, Vec<u8>), PaddingError> {
    let bucket = PaddingBucket::for_payload(plaintext.len()).ok_or(
        PaddingError::PayloadTooLarge { size: plaintext.len(), max: MAX_PAYLOAD_SIZE },
    )?;

    // INVARIANT: capacity() < u32::MAX for every bucket
    let len = plaintext.len() as u32;

    let mut padded = vec![0u8; bucket.size()];
    padded[..LENGTH_PREFIX_SIZE].copy_from_slice(&len.to_be_bytes());
    padded[LENGTH_PREFIX_SIZE..LENGTH_PREFIX_SIZE + plaintext.len()].copy_from_slice(plaintext);

    debug_assert_eq!(padded.len(), bucket.size());

    Ok((bucket, padded))
}

/// Strip padding, returning the original payload.
///
/// # Errors
///
/// - `PaddingError::Corrupt` if the buffer is not exactly bucket-sized, or the
///   length prefix exceeds the bucket capacity
pub fn unpad(padded: &[u8], bucket: PaddingBucket) -> Result<&[u8], PaddingError> {
    if padded.len() != bucket.size() {
        return Err(PaddingError::Corrupt {
            reason: format!("buffer is {} bytes, bucket is {}", padded.len(), bucket.size()),
        });
    }

    let Some((prefix, body)) = padded.split_first_chunk::<LENGTH_PREFIX_SIZE>() else {
        return Err(PaddingError::Corrupt { reason: "missing length prefix".to_string() });
    };

    let len = u32::from_be_bytes(*prefix) as usize;
    if len > bucket.capacity() {
        return Err(PaddingError::Corrupt {
            reason: format!("length prefix {len} exceeds bucket capacity {}", bucket.capacity()),
        });
    }

    body.get(..len).ok_or_else(|| PaddingError::Corrupt {
        reason: format!("length prefix {len} exceeds buffer"),
    })
}
