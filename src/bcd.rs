//! Packed binary-coded decimal, one decimal digit per nibble

/// Decode a packed BCD byte. The caller masks off any control bits first.
pub const fn to_binary(bcd: u8) -> u8 {
    (bcd & 0x0F) + 10 * (bcd >> 4)
}

/// Encode 0..=99 as packed BCD
pub const fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}
