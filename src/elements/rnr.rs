//! Reduced Neighbor Report (201): neighbor AP advertisements, the backbone
//! of 6 GHz discovery. Contains its own nested TBTT-entry structure.

use crate::bss::{MacAddress, NetworkDescriptor, RnrNeighbor};

/// Decode one TBTT info entry. Optional fields are consumed greedily in
/// fixed order, presence decided purely by the advertised entry length:
/// TBTT offset, BSSID, short SSID, BSS parameters, 20 MHz PSD, MLD
/// parameters.
fn parse_tbtt_entry(entry: &[u8], operating_class: u8, channel: u8) -> RnrNeighbor {
    let mut neighbor = RnrNeighbor {
        operating_class,
        channel,
        ..RnrNeighbor::default()
    };
    let mut cursor = 0;

    if let Some(&offset) = entry.first() {
        neighbor.tbtt_offset = offset;
        cursor += 1;
    }
    if let Some(bytes) = entry.get(cursor..cursor + 6) {
        neighbor.bssid = MacAddress::from_slice(bytes);
        cursor += 6;
    }
    if let Some(bytes) = entry.get(cursor..cursor + 4) {
        neighbor.short_ssid = Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]));
        cursor += 4;
    }
    if let Some(&params) = entry.get(cursor) {
        neighbor.oct_recommended = params & 0x01 != 0;
        neighbor.same_ssid = params & 0x02 != 0;
        neighbor.multiple_bssid = params & 0x04 != 0;
        neighbor.transmitted_bssid = params & 0x08 != 0;
        neighbor.colocated_ess = params & 0x10 != 0;
        neighbor.unsolicited_probe_active = params & 0x20 != 0;
        neighbor.colocated_ap = params & 0x40 != 0;
        cursor += 1;
    }
    if let Some(&psd) = entry.get(cursor) {
        neighbor.psd_20mhz = Some(psd as i8 as f32 * 0.5);
        cursor += 1;
    }
    if let Some(mld) = entry.get(cursor..cursor + 3) {
        neighbor.mld_id = Some(mld[0]);
        neighbor.link_id = Some(mld[1] & 0x0F);
        neighbor.bss_change_count = Some((mld[1] >> 4) | ((mld[2] & 0x0F) << 4));
        neighbor.all_updates_included = mld[2] & 0x10 != 0;
        neighbor.disabled_link = mld[2] & 0x20 != 0;
    }

    neighbor
}

fn describe_neighbor(neighbor: &RnrNeighbor) -> String {
    let mut parts = vec![format!(
        "op class {} channel {}",
        neighbor.operating_class, neighbor.channel
    )];
    if let Some(bssid) = &neighbor.bssid {
        parts.push(format!("BSSID {bssid}"));
    }
    if let Some(short_ssid) = neighbor.short_ssid {
        parts.push(format!("short SSID {short_ssid:#010x}"));
    }
    if neighbor.same_ssid {
        parts.push("same SSID".to_string());
    }
    if neighbor.transmitted_bssid {
        parts.push("transmitted BSSID".to_string());
    }
    if neighbor.colocated_ap {
        parts.push("co-located AP".to_string());
    }
    if neighbor.unsolicited_probe_active {
        parts.push("unsolicited probes".to_string());
    }
    if let Some(psd) = neighbor.psd_20mhz {
        parts.push(format!("20 MHz PSD {psd} dBm"));
    }
    if let Some(mld_id) = neighbor.mld_id {
        parts.push(format!(
            "MLD {mld_id} link {}",
            neighbor.link_id.unwrap_or(0)
        ));
    }
    parts.join(", ")
}

/// Reduced Neighbor Report (201).
///
/// A sequence of neighbor AP info blocks: a 2-byte TBTT info header (field
/// type in bits 0-1, entry count minus one in bits 4-7, entry length in the
/// second byte), operating class, channel, then the packed TBTT entries.
/// Appends one [RnrNeighbor] per entry to the sink. Only field type 0 gets
/// a full decode.
pub fn decode_reduced_neighbor_report(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    let mut lines = Vec::new();
    let mut cursor = 0;

    while cursor < data.len() {
        let Some(header) = data.get(cursor..cursor + 4) else {
            lines.push("parsing error: truncated neighbor AP info header".to_string());
            break;
        };
        let field_type = header[0] & 0x03;
        let entry_count = (header[0] >> 4) as usize + 1;
        let entry_len = header[1] as usize;
        let operating_class = header[2];
        let channel = header[3];
        cursor += 4;

        if entry_len == 0 {
            lines.push("parsing error: zero-length TBTT info field".to_string());
            break;
        }

        if field_type != 0 {
            // Reserved field types: skip the whole block, keep walking.
            lines.push(format!("TBTT info field type {field_type} not supported"));
            cursor = (cursor + entry_count * entry_len).min(data.len());
            continue;
        }

        for _ in 0..entry_count {
            let end = (cursor + entry_len).min(data.len());
            if cursor >= end {
                lines.push("parsing error: truncated TBTT entry".to_string());
                break;
            }
            let neighbor = parse_tbtt_entry(&data[cursor..end], operating_class, channel);
            lines.push(describe_neighbor(&neighbor));
            sink.rnrs.push(neighbor);
            cursor = end;
        }
    }

    if lines.is_empty() {
        "length wrong: empty neighbor report".to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_entry_with_bssid_short_ssid_and_params() {
        // type 0, one entry, length 12: offset + BSSID + short SSID + params.
        let data = [
            0x00, 12, // TBTT header
            131, 37, // op class / channel (6 GHz)
            255, // TBTT offset: unknown
            0xAA, 0xBB, 0xCC, 0x00, 0x11, 0x22, // BSSID
            0x78, 0x56, 0x34, 0x12, // short SSID
            0x4A, // params: same SSID + co-located AP + transmitted BSSID
        ];
        let mut bss = NetworkDescriptor::new();
        decode_reduced_neighbor_report(&data, &mut bss);
        assert_eq!(bss.rnrs.len(), 1);
        let n = &bss.rnrs[0];
        assert_eq!(n.channel, 37);
        assert_eq!(n.bssid.unwrap().to_string(), "aa:bb:cc:00:11:22");
        assert_eq!(n.short_ssid, Some(0x12345678));
        assert!(n.same_ssid && n.transmitted_bssid && n.colocated_ap);
        assert_eq!(n.psd_20mhz, None);
    }

    #[test]
    fn length_thirteen_adds_psd() {
        let data = [
            0x00, 13, 131, 37, //
            0, 1, 2, 3, 4, 5, 6, // offset + BSSID
            0x78, 0x56, 0x34, 0x12, // short SSID
            0x02, // params
            0xEC, // PSD: -20 * 0.5 = -10 dBm
        ];
        let mut bss = NetworkDescriptor::new();
        decode_reduced_neighbor_report(&data, &mut bss);
        assert_eq!(bss.rnrs.len(), 1);
        assert_eq!(bss.rnrs[0].psd_20mhz, Some(-10.0));
    }

    #[test]
    fn two_entries_in_one_block() {
        let data = [
            0x10, 7, 115, 36, // count=2, len=7 (offset + BSSID)
            0, 1, 1, 1, 1, 1, 1, //
            0, 2, 2, 2, 2, 2, 2, //
        ];
        let mut bss = NetworkDescriptor::new();
        decode_reduced_neighbor_report(&data, &mut bss);
        assert_eq!(bss.rnrs.len(), 2);
        assert_eq!(bss.rnrs[1].bssid.unwrap().to_string(), "02:02:02:02:02:02");
    }
}
