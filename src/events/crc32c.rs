//! CRC32C (Castagnoli) checksums as used by TFRecord framing.

const POLY: u32 = 0x82f6_3b78;
const MASK_DELTA: u32 = 0xa282_ead8;

const TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ POLY } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

pub fn checksum(data: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &byte in data {
        crc = TABLE[((crc ^ byte as u32) & 0xff) as usize] ^ (crc >> 8);
    }
    !crc
}

/// Checksum rotated and offset the way TFRecord stores it.
pub fn masked(data: &[u8]) -> u32 {
    let crc = checksum(data);
    crc.rotate_right(15).wrapping_add(MASK_DELTA)
}
