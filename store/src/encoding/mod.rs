//! # Encoding Module
//!
//! How trie paths become bytes on disk.
//!
//! A trie key is walked one nibble (half a byte) at a time, so paths are
//! naturally nibble sequences. Storing them one nibble per byte wastes half
//! the space; packing two per byte loses the distinction between `0f1248`
//! and `f1248`. The hex-prefix encoding in [`compact`] fixes both by spending
//! one leading nibble on two flags: odd length and terminator present.
//!
//! ```text
//! flag nibble = 2 * terminator + odd
//!
//!   0  even, no terminator   -> 0x00 | data...
//!   1  odd,  no terminator   -> 0x1d | data...   (d = first nibble)
//!   2  even, terminator      -> 0x20 | data...
//!   3  odd,  terminator      -> 0x3d | data...
//! ```

pub mod compact;

pub use compact::{
    bin_to_nibbles, bin_to_nibbles_no_terminator, nibbles_to_bin, nibbles_to_pretty_string,
    pack_nibbles, unpack_to_nibbles, EncodingError, EncodingResult, TERMINATOR,
};
