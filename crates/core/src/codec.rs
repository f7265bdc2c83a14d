//! Byte-level primitives for the document container.
//!
//! Every binary record the archive writer emits is composed from the little-endian packers
//! and the CRC-32 routine in this module. The markup escaper lives here too because it is
//! the one text transform both the markup builder and the package parts rely on.

/// Reflected form of the standard CRC-32 polynomial.
const CRC32_POLYNOMIAL: u32 = 0xEDB8_8320;

const CRC32_TABLE: [u32; 256] = build_crc32_table();

const fn build_crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 {
                CRC32_POLYNOMIAL ^ (c >> 1)
            } else {
                c >> 1
            };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// Pack a u16 in little-endian order.
pub fn u16le(n: u16) -> [u8; 2] {
    n.to_le_bytes()
}

/// Pack a u32 in little-endian order.
pub fn u32le(n: u32) -> [u8; 4] {
    n.to_le_bytes()
}

/// Standard CRC-32 of `bytes`.
pub fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &b in bytes {
        crc = CRC32_TABLE[((crc ^ b as u32) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc ^ 0xFFFF_FFFF
}

/// Replace the five reserved markup characters with their named entities.
///
/// Ampersands are substituted first so that the entities introduced for the other
/// characters are not escaped again.
pub fn escape_markup_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
