//! # Compact (Hex-Prefix) Nibble Encoding
//!
//! Packs a nibble sequence, optionally ending in [`TERMINATOR`], into bytes
//! and back. The first nibble of the output carries two flags:
//!
//! - bit 1: the sequence ended in a terminator (the path ends in a value)
//! - bit 0: the sequence length, ignoring the terminator, is odd
//!
//! An odd sequence fills the rest of the first byte with its first nibble.
//! An even sequence pads the first byte with a zero nibble. Every following
//! byte holds two nibbles, high nibble first.
//!
//! ```text
//! [ 1, 2, 3, 4, 5 ]              -> 11 23 45
//! [ 0, 1, 2, 3, 4, 5 ]           -> 00 01 23 45
//! [ 0, f, 1, c, b, 8, T ]        -> 20 0f 1c b8
//! [ f, 1, c, b, 8, T ]           -> 3f 1c b8
//! ```
//!
//! The format is persisted and shared with other implementations, so the
//! decoder only accepts canonical encodings.

use thiserror::Error;

/// Out-of-band nibble marking the end of a path that leads to a value.
/// Never part of stored key material.
pub const TERMINATOR: u8 = 16;

const FLAG_TERMINATOR: u8 = 0b10;
const FLAG_ODD: u8 = 0b01;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Contract violations detected while encoding or decoding nibbles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// There is no flag byte to read.
    #[error("cannot unpack an empty byte string")]
    Empty,

    /// The leading nibble is not one of the four defined flag values.
    #[error("invalid hex-prefix flag nibble: {0:#x}")]
    InvalidFlag(u8),

    /// An even-length encoding whose padding nibble is not zero.
    #[error("non-zero padding nibble {0:#x} after even-length flag")]
    NonZeroPadding(u8),

    /// The terminator appeared somewhere other than the last position.
    #[error("terminator at index {index} is not the final nibble")]
    MisplacedTerminator {
        /// Position of the offending terminator.
        index: usize,
    },

    /// A value that does not fit in four bits reached the packing step.
    #[error("nibble value {value} at index {index} is out of range")]
    InvalidNibble {
        /// Position of the offending value.
        index: usize,
        /// The value itself.
        value: u8,
    },

    /// Plain nibble-to-byte pairing needs an even count.
    #[error("odd nibble count {0} cannot be paired into bytes")]
    OddLength(usize),
}

pub type EncodingResult<T> = Result<T, EncodingError>;

// ---------------------------------------------------------------------------
// Byte <-> Nibble Expansion
// ---------------------------------------------------------------------------

/// Expand bytes into nibbles, high nibble first, and append [`TERMINATOR`].
///
/// The result has length `2 * bytes.len() + 1`.
pub fn bin_to_nibbles(bytes: &[u8]) -> Vec<u8> {
    let mut nibbles = Vec::with_capacity(bytes.len() * 2 + 1);
    push_nibbles(&mut nibbles, bytes);
    nibbles.push(TERMINATOR);
    nibbles
}

/// Expand bytes into nibbles, high nibble first, without a terminator.
pub fn bin_to_nibbles_no_terminator(bytes: &[u8]) -> Vec<u8> {
    let mut nibbles = Vec::with_capacity(bytes.len() * 2);
    push_nibbles(&mut nibbles, bytes);
    nibbles
}

/// Pair nibbles back into bytes. Inverse of [`bin_to_nibbles_no_terminator`].
pub fn nibbles_to_bin(nibbles: &[u8]) -> EncodingResult<Vec<u8>> {
    if nibbles.len() % 2 != 0 {
        return Err(EncodingError::OddLength(nibbles.len()));
    }
    check_data_nibbles(nibbles, 0)?;
    Ok(pair_up(nibbles))
}

fn push_nibbles(out: &mut Vec<u8>, bytes: &[u8]) {
    for &b in bytes {
        out.push(b >> 4);
        out.push(b & 0x0f);
    }
}

fn pair_up(nibbles: &[u8]) -> Vec<u8> {
    nibbles
        .chunks_exact(2)
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect()
}

/// Every value must be a real nibble. `offset` shifts reported indices so
/// errors point into the caller's original sequence.
fn check_data_nibbles(nibbles: &[u8], offset: usize) -> EncodingResult<()> {
    for (i, &value) in nibbles.iter().enumerate() {
        if value == TERMINATOR {
            return Err(EncodingError::MisplacedTerminator { index: offset + i });
        }
        if value > 0x0f {
            return Err(EncodingError::InvalidNibble {
                index: offset + i,
                value,
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Hex-Prefix Pack / Unpack
// ---------------------------------------------------------------------------

/// Pack a nibble sequence into its compact encoding.
///
/// A trailing [`TERMINATOR`] is consumed into the flag nibble. The empty
/// sequence packs to `[0x00]`.
///
/// # Errors
///
/// [`EncodingError::MisplacedTerminator`] if a terminator appears before the
/// end, [`EncodingError::InvalidNibble`] for any value above 16.
pub fn pack_nibbles(nibbles: &[u8]) -> EncodingResult<Vec<u8>> {
    let (data, terminated) = match nibbles.split_last() {
        Some((&TERMINATOR, rest)) => (rest, true),
        _ => (nibbles, false),
    };
    check_data_nibbles(data, 0)?;

    let odd = data.len() % 2 == 1;
    let flag = (if terminated { FLAG_TERMINATOR } else { 0 }) | (if odd { FLAG_ODD } else { 0 });

    let mut packed = Vec::with_capacity(data.len() / 2 + 1);
    let rest = if odd {
        packed.push((flag << 4) | data[0]);
        &data[1..]
    } else {
        packed.push(flag << 4);
        data
    };
    packed.extend(pair_up(rest));

    tracing::trace!(
        nibbles = nibbles.len(),
        bytes = packed.len(),
        terminated,
        "packed nibble path"
    );
    Ok(packed)
}

/// Unpack a compact encoding back into its nibble sequence, re-appending
/// [`TERMINATOR`] when the flag says the original had one.
///
/// # Errors
///
/// [`EncodingError::Empty`] for an empty input, [`EncodingError::InvalidFlag`]
/// for a flag nibble above 3, [`EncodingError::NonZeroPadding`] for a
/// non-canonical even-length prefix.
pub fn unpack_to_nibbles(bytes: &[u8]) -> EncodingResult<Vec<u8>> {
    let (&first, rest) = bytes.split_first().ok_or(EncodingError::Empty)?;

    let flag = first >> 4;
    if flag > (FLAG_TERMINATOR | FLAG_ODD) {
        return Err(EncodingError::InvalidFlag(flag));
    }
    let low = first & 0x0f;

    let mut nibbles = Vec::with_capacity(rest.len() * 2 + 2);
    if flag & FLAG_ODD != 0 {
        nibbles.push(low);
    } else if low != 0 {
        return Err(EncodingError::NonZeroPadding(low));
    }
    push_nibbles(&mut nibbles, rest);
    if flag & FLAG_TERMINATOR != 0 {
        nibbles.push(TERMINATOR);
    }
    Ok(nibbles)
}

/// Render nibbles as `\x0f\x01...`, one escape per nibble.
pub fn nibbles_to_pretty_string(nibbles: &[u8]) -> String {
    nibbles.iter().map(|n| format!("\\x{n:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
