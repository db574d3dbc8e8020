//! Element 255: the extension tag. A second dispatch layer keyed by the
//! first payload byte, covering the HE (802.11ax) and EHT (802.11be)
//! element family.

use crate::bss::{ChannelMarking, ChannelWidth, NetworkDescriptor, PhyMode};

/// Human-readable name for an extension ID.
pub fn extension_name(extension_id: u8) -> &'static str {
    match extension_id {
        35 => "HE Capabilities",
        36 => "HE Operation",
        37 => "UORA Parameter Set",
        38 => "MU EDCA Parameter Set",
        39 => "Spatial Reuse Parameter Set",
        42 => "BSS Color Change Announcement",
        59 => "HE 6 GHz Band Capabilities",
        106 => "EHT Operation",
        107 => "Multi-Link",
        108 => "EHT Capabilities",
        _ => "Undecoded",
    }
}

/// Dispatch on the extension ID. The ID byte is part of the element payload
/// (the length byte already covers it); the decoders below receive the body
/// behind it. `None` falls back to the placeholder form.
pub fn decode_extension(data: &[u8], sink: &mut NetworkDescriptor) -> Option<String> {
    let (&extension_id, body) = data.split_first()?;
    match extension_id {
        35 => Some(decode_he_capabilities(body, sink)),
        36 => Some(decode_he_operation(body, sink)),
        106 => Some(decode_eht_operation(body, sink)),
        _ => None,
    }
}

/// Spatial streams out of an HE MCS map: eight 2-bit fields, value 3 means
/// the stream is unsupported.
fn nss_from_mcs_map(map: u16) -> u8 {
    let mut streams = 0;
    for stream in 0..8 {
        if (map >> (stream * 2)) & 0x03 != 0x03 {
            streams += 1;
        }
    }
    streams
}

/// HE Capabilities (ext 35): 6 bytes MAC caps, 11 bytes PHY caps, then the
/// 80 MHz rx/tx MCS maps. Overwrites the spatial-stream estimate HT
/// Capabilities made earlier in the walk.
fn decode_he_capabilities(body: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_mode(PhyMode::Ax);
    if body.len() < 21 {
        return format!("length wrong: expected at least 21 bytes, got {}", body.len());
    }

    let twt_support = body[0] & 0x02 != 0;
    let rx_mcs_80 = u16::from_le_bytes([body[17], body[18]]);
    let streams = nss_from_mcs_map(rx_mcs_80).max(1);
    sink.spatial_streams = streams;

    let mut text = format!("{streams} spatial streams, TWT responder: {twt_support}");
    if let Some(bytes) = body.get(21..23) {
        let rx_mcs_160 = u16::from_le_bytes([bytes[0], bytes[1]]);
        text.push_str(&format!(
            ", 160 MHz streams: {}",
            nss_from_mcs_map(rx_mcs_160)
        ));
    }
    text
}

/// HE Operation (ext 36). The interesting part is the optional 6 GHz
/// operation block: primary channel, a 2-bit width field, and dual
/// center-frequency segments whose distance separates 160 from 80+80.
fn decode_he_operation(body: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_mode(PhyMode::Ax);
    if body.len() < 6 {
        return format!("length wrong: expected at least 6 bytes, got {}", body.len());
    }

    let params = u32::from_le_bytes([body[0], body[1], body[2], 0]);
    let vht_op_present = params & (1 << 14) != 0;
    let cohosted_present = params & (1 << 15) != 0;
    let six_ghz_present = params & (1 << 17) != 0;
    let bss_color = body[3] & 0x3F;

    let mut text = format!("BSS color: {bss_color}");

    if !six_ghz_present {
        return text;
    }

    // Skip the optional blocks sitting before the 6 GHz operation info.
    let mut offset = 6;
    if vht_op_present {
        offset += 3;
    }
    if cohosted_present {
        offset += 1;
    }
    let Some(info) = body.get(offset..offset + 5) else {
        text.push_str("\nparsing error: truncated 6 GHz operation info");
        return text;
    };

    let primary = info[0];
    let width_bits = info[1] & 0x03;
    let ccfs0 = info[2];
    let ccfs1 = info[3];
    sink.channel_number = primary.to_string();

    let width_text = match width_bits {
        0 => {
            sink.set_channel_width(ChannelWidth::Twenty, ChannelMarking::None);
            "20 MHz".to_string()
        }
        1 => {
            sink.set_channel_width(ChannelWidth::Forty, ChannelMarking::None);
            "40 MHz".to_string()
        }
        2 => {
            sink.set_channel_width(ChannelWidth::Eighty, ChannelMarking::None);
            "80 MHz".to_string()
        }
        _ => {
            sink.set_channel_width(ChannelWidth::OneSixty, ChannelMarking::None);
            // Adjacent segments mean one contiguous 160 MHz channel.
            if ccfs1.abs_diff(ccfs0) == 8 {
                "160 MHz".to_string()
            } else {
                format!("80+80 MHz (segments {ccfs0}/{ccfs1})")
            }
        }
    };
    text.push_str(&format!(
        "\n6 GHz operation: primary channel {primary}, {width_text}"
    ));
    text
}

/// EHT Operation (ext 106): Wi-Fi 7. A 3-bit width field reaching 320 MHz.
fn decode_eht_operation(body: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_mode(PhyMode::Be);
    let Some(&params) = body.first() else {
        return "length wrong: expected at least 5 bytes".to_string();
    };
    let operation_info_present = params & 0x01 != 0;
    if !operation_info_present {
        return "EHT operation info not present".to_string();
    }

    // params + 4 bytes of basic MCS/NSS, then the operation info.
    let Some(info) = body.get(5..8) else {
        return "parsing error: truncated EHT operation info".to_string();
    };
    let (width, width_text) = match info[0] & 0x07 {
        0 => (ChannelWidth::Twenty, "20 MHz"),
        1 => (ChannelWidth::Forty, "40 MHz"),
        2 => (ChannelWidth::Eighty, "80 MHz"),
        3 => (ChannelWidth::OneSixty, "160 MHz"),
        4 => (ChannelWidth::ThreeTwenty, "320 MHz"),
        other => return format!("reserved EHT channel width {other}"),
    };
    sink.set_channel_width(width, ChannelMarking::None);
    format!("channel width: {width_text}, center segments: {}/{}", info[1], info[2])
}
