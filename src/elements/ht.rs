//! HT (802.11n) capability and operation decoders.

use crate::bss::{ChannelMarking, ChannelWidth, NetworkDescriptor, PhyMode};

/// HT Capabilities (45).
///
/// The 40 MHz bit here is capability only; the operating width is decided by
/// HT Operation. Spatial streams are estimated from how many MCS-set bytes
/// are populated (each fully-set byte is one stream).
pub fn decode_ht_capabilities(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_mode(PhyMode::N);
    if data.len() < 7 {
        return format!("length wrong: expected at least 7 bytes, got {}", data.len());
    }

    let forty_mhz_capable = data[0] & 0x02 != 0;
    let short_gi_20 = data[0] & 0x20 != 0;
    let short_gi_40 = data[0] & 0x40 != 0;

    // Rx MCS bitmask occupies bytes 3..7 of the element (one byte per
    // potential stream). Sum of the populated bytes over 255, floored,
    // with a minimum of one stream.
    let mcs_sum: u32 = data[3..7].iter().map(|&b| b as u32).sum();
    let streams = ((mcs_sum / 255) as u8).max(1);
    sink.spatial_streams = streams;

    format!(
        "40 MHz capable: {forty_mhz_capable}, short GI 20/40: {short_gi_20}/{short_gi_40}, {streams} spatial streams"
    )
}

/// Secondary channel for 40 MHz operation: four channels up or down from
/// the primary.
fn secondary_channel(primary: u8, marking: ChannelMarking) -> u8 {
    match marking {
        ChannelMarking::Above => primary.saturating_add(4),
        ChannelMarking::Below => primary.saturating_sub(4),
        ChannelMarking::None => primary,
    }
}

/// HT Operation (61).
///
/// Byte 0 is the primary channel. Byte 1 bits 0-1 give the secondary channel
/// offset: 1 = above (width 40, marking `+`), 3 = below (width 40, marking
/// `-`), 0 = none (width stays 20). Bit 2 is the "any channel width" flag.
pub fn decode_ht_operation(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    if data.len() < 2 {
        return format!("length wrong: expected at least 2 bytes, got {}", data.len());
    }

    let primary = data[0];
    sink.channel_number = primary.to_string();

    let offset = data[1] & 0x03;
    let any_width = data[1] & 0x04 != 0;

    let marking = match offset {
        1 => ChannelMarking::Above,
        3 => ChannelMarking::Below,
        _ => ChannelMarking::None,
    };

    if marking == ChannelMarking::None {
        sink.set_channel_width(ChannelWidth::Twenty, ChannelMarking::None);
        return format!("primary channel: {primary}, no secondary channel (20 MHz)");
    }

    sink.set_channel_width(ChannelWidth::Forty, marking);
    let secondary = secondary_channel(primary, marking);
    format!(
        "primary channel: {primary}{marking}, secondary channel: {secondary} (40 MHz), any channel width: {any_width}"
    )
}
