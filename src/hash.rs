//! Ring position hashing.
//!
//! Node names and lookup keys are hashed with the same function so that node
//! positions and key positions share one 32-bit address space. CRC-32 with
//! the ISO-HDLC (IEEE) polynomial is deterministic and evenly distributed,
//! which is all a ring placement needs; no collision resistance is required.

use crc::{Crc, CRC_32_ISO_HDLC};

/// CRC-32 calculator (IEEE polynomial).
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Hash arbitrary bytes to a ring position.
///
/// Total over all byte strings, including the empty string.
pub fn position_of(bytes: &[u8]) -> u32 {
    CRC32.checksum(bytes)
}
