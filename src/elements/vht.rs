//! VHT (802.11ac) decoders plus the Tx Power Envelope.

use crate::bss::{ChannelMarking, ChannelWidth, NetworkDescriptor, PhyMode};

/// VHT Capabilities (191).
///
/// Some 2.4 GHz APs include VHT elements anyway, so the "ac" mode is gated
/// on the band the descriptor was seeded with.
pub fn decode_vht_capabilities(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    if sink.is_5ghz() {
        sink.add_mode(PhyMode::Ac);
    }
    if data.len() < 4 {
        return format!("length wrong: expected at least 4 bytes, got {}", data.len());
    }

    let max_mpdu = match data[0] & 0x03 {
        0 => 3895,
        1 => 7991,
        _ => 11454,
    };
    let short_gi_80 = data[0] & 0x20 != 0;
    let su_beamformer = data[1] & 0x08 != 0;
    let mu_beamformer = data[2] & 0x08 != 0;

    format!(
        "max MPDU: {max_mpdu}, short GI 80 MHz: {short_gi_80}, SU beamformer: {su_beamformer}, MU beamformer: {mu_beamformer}"
    )
}

/// VHT Operation (192).
///
/// A nonzero width byte selects 80 MHz, upgraded to 160 MHz when the second
/// center-frequency segment is also populated. Overrides whatever HT
/// Operation set earlier in the walk, and clears the 40 MHz marking.
pub fn decode_vht_operation(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    if sink.is_5ghz() {
        sink.add_mode(PhyMode::Ac);
    }
    if data.len() < 3 {
        return format!("length wrong: expected at least 3 bytes, got {}", data.len());
    }

    let width_byte = data[0];
    let segment0 = data[1];
    let segment1 = data[2];

    if width_byte == 0 {
        return format!("channel width: 20/40 MHz (HT operation governs), center segment: {segment0}");
    }

    let width = if segment1 != 0 {
        ChannelWidth::OneSixty
    } else {
        ChannelWidth::Eighty
    };
    sink.set_channel_width(width, ChannelMarking::None);

    if segment1 != 0 {
        format!("channel width: 160 MHz, center segments: {segment0}/{segment1}")
    } else {
        format!("channel width: 80 MHz, center channel: {segment0}")
    }
}

/// Tx Power Envelope (195).
///
/// The header byte packs a count (bits 0-2, giving count+1 power fields, at
/// most four: 20/40/80/160 MHz) and a unit interpretation (bits 3-5).
/// Each power field is a signed byte in half-dBm steps.
pub fn decode_tx_power_envelope(data: &[u8], _sink: &mut NetworkDescriptor) -> String {
    let Some(&info) = data.first() else {
        return "length wrong: expected at least 2 bytes".to_string();
    };
    let count = ((info & 0x07) as usize + 1).min(4);
    let unit = match (info >> 3) & 0x07 {
        0 => "EIRP",
        1 => "EIRP PSD",
        other => return format!("reserved unit interpretation {other}"),
    };

    const WIDTHS: [&str; 4] = ["20", "40", "80", "160"];
    let mut parts = Vec::new();
    for (i, width) in WIDTHS.iter().enumerate().take(count) {
        match data.get(1 + i) {
            Some(&raw) => {
                let power = raw as i8 as f32 * 0.5;
                parts.push(format!("{width} MHz: {power} dBm"));
            }
            None => {
                parts.push(format!("{width} MHz: missing"));
                break;
            }
        }
    }
    format!("local max transmit power ({unit}) {}", parts.join(", "))
}
