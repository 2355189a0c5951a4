//! Waveform look-up tables for the Waveshare 2.9" V2 panel
//!
//! Each table is 159 bytes: 153 bytes of waveform timing uploaded with
//! [`WRITE_LUT`](crate::command::WRITE_LUT), followed by the end option,
//! gate voltage, the three source voltages (VSH, VSH2, VSL) and VCOM.

/// Total LUT length in bytes
pub const LUT_LEN: usize = 159;

/// Number of waveform bytes sent with the LUT upload command
pub const WAVEFORM_LEN: usize = 153;

/// Full LUT type alias
pub type Lut = [u8; LUT_LEN];

/// Byte offsets of the voltage parameters that trail the waveform
pub(crate) const END_OPTION_INDEX: usize = 153;
pub(crate) const GATE_VOLTAGE_INDEX: usize = 154;
pub(crate) const SOURCE_VOLTAGE_RANGE: core::ops::Range<usize> = 155..158;
pub(crate) const VCOM_INDEX: usize = 158;

/// Full-update waveform (slow, flashes, clears ghosting)
#[rustfmt::skip]
pub const FULL_UPDATE: Lut = [
    0x80, 0x66, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00,
    0x10, 0x66, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00,
    0x80, 0x66, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00,
    0x10, 0x66, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x14, 0x08, 0x00, 0x00, 0x00, 0x00, 0x02,
    0x0A, 0x0A, 0x00, 0x0A, 0x0A, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x14, 0x08, 0x00, 0x01, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x44, 0x44, 0x44, 0x44, 0x44, 0x44, 0x00, 0x00, 0x00,
    0x22, 0x17, 0x41, 0x00, 0x32, 0x36,
];

/// Partial-update waveform (fast, no flash, accumulates ghosting)
#[rustfmt::skip]
pub const PARTIAL_UPDATE: Lut = [
    0x00, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x80, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x40, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x0A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x00, 0x00, 0x00,
    0x22, 0x17, 0x41, 0xB0, 0x32, 0x36,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voltage_trailer_follows_waveform() {
        assert_eq!(FULL_UPDATE[END_OPTION_INDEX], 0x22);
        assert_eq!(FULL_UPDATE[GATE_VOLTAGE_INDEX], 0x17);
        assert_eq!(&FULL_UPDATE[SOURCE_VOLTAGE_RANGE], &[0x41, 0x00, 0x32]);
        assert_eq!(FULL_UPDATE[VCOM_INDEX], 0x36);

        // Only VSH2 differs between the two tables
        assert_eq!(PARTIAL_UPDATE[156], 0xB0);
        assert_eq!(PARTIAL_UPDATE[VCOM_INDEX], FULL_UPDATE[VCOM_INDEX]);
    }

    #[test]
    fn waveform_sections_differ() {
        assert_ne!(FULL_UPDATE[..WAVEFORM_LEN], PARTIAL_UPDATE[..WAVEFORM_LEN]);
    }
}
