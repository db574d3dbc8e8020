//! Radiotap: the de facto header prefixed to captured 802.11 frames,
//! carrying RF metadata (signal, channel, rate).
//!
//! Field presence is a bitmask; field byte offsets are not stored anywhere
//! and must be computed by walking the fixed field order and applying each
//! field's alignment relative to the start of the header.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::Error;

/// Flags bit: the frame ends with a 4-byte FCS.
pub const FLAG_FCS_AT_END: u8 = 0x10;

/// Channel flags for synthesis.
pub const CHANNEL_2GHZ: u16 = 0x0080;
pub const CHANNEL_5GHZ: u16 = 0x0100;
pub const CHANNEL_CCK: u16 = 0x0020;
pub const CHANNEL_OFDM: u16 = 0x0040;

/// The fields this crate cares about out of a radiotap header.
#[derive(Clone, Copy, Debug, Default)]
pub struct Radiotap {
    pub header_len: u16,
    pub tsft: Option<u64>,
    pub flags: Option<u8>,
    pub rate: Option<u8>,
    pub channel_freq: Option<u16>,
    pub channel_flags: Option<u16>,
    pub dbm_signal: Option<i8>,
    pub dbm_noise: Option<i8>,
    pub lock_quality: Option<u16>,
    pub antenna: Option<u8>,
}

impl Radiotap {
    pub fn has_fcs(&self) -> bool {
        self.flags.is_some_and(|f| f & FLAG_FCS_AT_END != 0)
    }
}

/// Align `offset` (relative to the header start) up to `alignment`.
fn align(offset: usize, alignment: usize) -> usize {
    (offset + alignment - 1) & !(alignment - 1)
}

/// Parse a radiotap header, returning the decoded fields and the frame
/// bytes behind the header.
pub fn parse_radiotap(data: &[u8]) -> Result<(Radiotap, &[u8]), Error> {
    if data.len() < 8 {
        return Err(Error::Incomplete(
            "radiotap header needs at least 8 bytes".to_string(),
        ));
    }
    if data[0] != 0 {
        return Err(Error::UnsupportedCapture(format!(
            "radiotap version {}",
            data[0]
        )));
    }

    let header_len = LittleEndian::read_u16(&data[2..4]) as usize;
    if header_len < 8 || header_len > data.len() {
        return Err(Error::Incomplete(format!(
            "radiotap header claims {header_len} bytes, packet has {}",
            data.len()
        )));
    }

    // Present-flag words chain while bit 31 is set. Only the first word's
    // field bits describe fields we read; extension words are skipped.
    let mut present_end = 4;
    let present = LittleEndian::read_u32(&data[4..8]);
    let mut word = present;
    loop {
        present_end += 4;
        if word & (1 << 31) == 0 {
            break;
        }
        if present_end + 4 > header_len {
            return Err(Error::Incomplete(
                "radiotap present-flag chain runs past the header".to_string(),
            ));
        }
        word = LittleEndian::read_u32(&data[present_end..present_end + 4]);
    }

    let mut radiotap = Radiotap {
        header_len: header_len as u16,
        ..Radiotap::default()
    };
    let mut cursor = present_end;

    // Fixed field order with per-field alignment. A field that would run
    // past the header invalidates the rest of the walk.
    let mut take = |size: usize, alignment: usize| -> Option<usize> {
        let offset = align(cursor, alignment);
        if offset + size > header_len {
            return None;
        }
        cursor = offset + size;
        Some(offset)
    };

    if present & (1 << 0) != 0 {
        if let Some(at) = take(8, 8) {
            radiotap.tsft = Some(LittleEndian::read_u64(&data[at..at + 8]));
        }
    }
    if present & (1 << 1) != 0 {
        if let Some(at) = take(1, 1) {
            radiotap.flags = Some(data[at]);
        }
    }
    if present & (1 << 2) != 0 {
        if let Some(at) = take(1, 1) {
            radiotap.rate = Some(data[at]);
        }
    }
    if present & (1 << 3) != 0 {
        if let Some(at) = take(4, 2) {
            radiotap.channel_freq = Some(LittleEndian::read_u16(&data[at..at + 2]));
            radiotap.channel_flags = Some(LittleEndian::read_u16(&data[at + 2..at + 4]));
        }
    }
    if present & (1 << 4) != 0 {
        take(2, 1); // FHSS, unused
    }
    if present & (1 << 5) != 0 {
        if let Some(at) = take(1, 1) {
            radiotap.dbm_signal = Some(data[at] as i8);
        }
    }
    if present & (1 << 6) != 0 {
        if let Some(at) = take(1, 1) {
            radiotap.dbm_noise = Some(data[at] as i8);
        }
    }
    if present & (1 << 7) != 0 {
        if let Some(at) = take(2, 2) {
            radiotap.lock_quality = Some(LittleEndian::read_u16(&data[at..at + 2]));
        }
    }
    if present & (1 << 8) != 0 {
        take(2, 2); // TX attenuation, unused
    }
    if present & (1 << 9) != 0 {
        take(2, 2); // dB TX attenuation, unused
    }
    if present & (1 << 10) != 0 {
        take(1, 1); // dBm TX power, unused
    }
    if present & (1 << 11) != 0 {
        if let Some(at) = take(1, 1) {
            radiotap.antenna = Some(data[at]);
        }
    }

    Ok((radiotap, &data[header_len..]))
}

/// Synthesize a minimal radiotap header with Flags, Rate, Channel and
/// dBm-signal present: 8-byte preamble, two single bytes, a 2-aligned
/// 4-byte channel field and the signal byte, 15 bytes total.
pub fn synthesize_radiotap(rate: u8, freq_mhz: u16, channel_flags: u16, dbm_signal: i8) -> Vec<u8> {
    let present: u32 = (1 << 1) | (1 << 2) | (1 << 3) | (1 << 5);
    let mut header = vec![
        0x00, // version
        0x00, // pad
        15, 0, // header length
        0, 0, 0, 0, // present flags, patched below
        0x00, // flags: no FCS on synthesized frames
        rate,
    ];
    LittleEndian::write_u32(&mut header[4..8], present);
    header.extend_from_slice(&freq_mhz.to_le_bytes());
    header.extend_from_slice(&channel_flags.to_le_bytes());
    header.push(dbm_signal as u8);
    header
}

/// Channel flags appropriate for the band of a given frequency.
pub fn channel_flags_for(freq_mhz: u16) -> u16 {
    if freq_mhz < 3000 {
        CHANNEL_2GHZ | CHANNEL_CCK
    } else {
        CHANNEL_5GHZ | CHANNEL_OFDM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_header_parses_back() {
        let header = synthesize_radiotap(0x02, 2412, channel_flags_for(2412), -42);
        assert_eq!(header.len(), 15);
        let mut packet = header.clone();
        packet.extend_from_slice(&[0xAA, 0xBB]);

        let (radiotap, rest) = parse_radiotap(&packet).unwrap();
        assert_eq!(radiotap.rate, Some(0x02));
        assert_eq!(radiotap.channel_freq, Some(2412));
        assert_eq!(radiotap.dbm_signal, Some(-42));
        assert!(!radiotap.has_fcs());
        assert_eq!(rest, &[0xAA, 0xBB]);
    }

    #[test]
    fn tsft_forces_eight_byte_alignment() {
        // Present: TSFT + dBm signal. TSFT aligns from offset 8 to 8.
        let mut packet = vec![0u8; 24];
        packet[2] = 17; // header length: 8 + 8 + 1
        LittleEndian::write_u32(&mut packet[4..8], (1 << 0) | (1 << 5));
        LittleEndian::write_u64(&mut packet[8..16], 123_456);
        packet[16] = (-60i8) as u8;

        let (radiotap, rest) = parse_radiotap(&packet).unwrap();
        assert_eq!(radiotap.tsft, Some(123_456));
        assert_eq!(radiotap.dbm_signal, Some(-60));
        assert_eq!(rest.len(), 24 - 17);
    }

    #[test]
    fn extended_present_words_are_skipped() {
        // Two present words; fields start after both.
        let mut packet = vec![0u8; 16];
        packet[2] = 13; // 4 + 8 + flags byte
        LittleEndian::write_u32(&mut packet[4..8], (1 << 31) | (1 << 1));
        LittleEndian::write_u32(&mut packet[8..12], 0);
        packet[12] = FLAG_FCS_AT_END;

        let (radiotap, _) = parse_radiotap(&packet).unwrap();
        assert!(radiotap.has_fcs());
    }

    #[test]
    fn wrong_version_is_rejected() {
        let packet = [1u8, 0, 8, 0, 0, 0, 0, 0];
        assert!(parse_radiotap(&packet).is_err());
    }
}
