//! Vendor Specific (221): OUI-keyed dispatch into per-vendor sub-decoders.
//!
//! The formats behind each OUI are genuinely unrelated, so each arm is an
//! independent small decoder rather than a shared abstraction. Several of
//! them carry an AP name, which lands on `sink.apname` (last writer wins).

use log::debug;

use crate::bss::{Amendment, NetworkDescriptor};
use crate::util::{escape_control_chars, pretty_hex};

const OUI_MICROSOFT: [u8; 3] = [0x00, 0x50, 0xF2];
const OUI_ARUBA: [u8; 3] = [0x00, 0x0B, 0x86];
const OUI_RUCKUS: [u8; 3] = [0x00, 0x13, 0x92];
const OUI_AEROHIVE: [u8; 3] = [0x00, 0x19, 0x77];
const OUI_ZEBRA: [u8; 3] = [0x00, 0xA0, 0xF8];
const OUI_MIST: [u8; 3] = [0x5C, 0x5B, 0x35];
const OUI_ARISTA: [u8; 3] = [0x00, 0x11, 0x74];
const OUI_CISCO_AIRONET: [u8; 3] = [0x00, 0x40, 0x96];

/// Known vendors without a dedicated sub-decoder.
fn static_vendor_name(oui: &[u8; 3]) -> Option<&'static str> {
    match oui {
        [0x00, 0x03, 0x7F] => Some("Atheros"),
        [0x00, 0x10, 0x18] => Some("Broadcom"),
        [0x00, 0x17, 0xF2] => Some("Apple"),
        [0x00, 0x0C, 0x43] => Some("Ralink"),
        [0x00, 0xE0, 0x4C] => Some("Realtek"),
        [0x00, 0x90, 0x4C] => Some("Epigram"),
        [0x00, 0x26, 0x86] => Some("Quantenna"),
        [0x8C, 0xFD, 0xF0] => Some("Qualcomm"),
        _ => None,
    }
}

/// Vendor Specific (221). First 3 bytes are the OUI, usually followed by a
/// vendor type byte; everything behind that is vendor-defined.
pub fn decode_vendor_specific(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    if data.len() < 3 {
        return format!("length wrong: expected at least 3 bytes, got {}", data.len());
    }
    let oui = [data[0], data[1], data[2]];

    match oui {
        OUI_MICROSOFT => decode_microsoft(data, sink),
        OUI_ARUBA => decode_aruba(data, sink),
        OUI_RUCKUS => decode_ruckus(data, sink),
        OUI_AEROHIVE => decode_aerohive(data, sink),
        OUI_ZEBRA => decode_zebra(data, sink),
        OUI_MIST => decode_mist(data, sink),
        OUI_ARISTA => decode_arista(data, sink),
        OUI_CISCO_AIRONET => decode_cisco_aironet(data, sink),
        _ => {
            let oui_string = format!("{:02x}:{:02x}:{:02x}", oui[0], oui[1], oui[2]);
            match static_vendor_name(&oui) {
                Some(name) => format!("{name} (OUI: {oui_string})"),
                None => {
                    debug!("unknown vendor OUI {oui_string}");
                    format!("OUI: {oui_string}")
                }
            }
        }
    }
}

fn decode_microsoft(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    let Some(&oui_type) = data.get(3) else {
        return "Microsoft (missing OUI type)".to_string();
    };
    let vendor_data = &data[4..];
    match oui_type {
        1 => decode_wpa(vendor_data),
        2 => decode_wmm(vendor_data, sink),
        4 => decode_wps(vendor_data, sink),
        other => format!("Microsoft, type {other}"),
    }
}

/// Legacy WPA (Microsoft OUI type 1). Display only: the descriptor's
/// security fields are owned by the RSN element.
fn decode_wpa(data: &[u8]) -> String {
    if data.len() < 2 {
        return "WPA (length wrong)".to_string();
    }
    let version = u16::from_le_bytes([data[0], data[1]]);
    format!("WPA version {version}")
}

const ACCESS_CATEGORIES: [&str; 4] = ["Best Effort", "Background", "Video", "Voice"];

/// WMM/WME (Microsoft OUI type 2). Subtype 0 is the bare information
/// element, subtype 1 the parameter element with four per-access-category
/// records: ACM/AIFSN in the first byte, ECWmin/ECWmax nibbles, TXOP limit.
fn decode_wmm(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_amendment(Amendment::E);
    if data.len() < 3 {
        return "WMM (length wrong)".to_string();
    }
    let subtype = data[0];
    let version = data[1];
    let qos_info = data[2];
    let uapsd = qos_info & 0x80 != 0;

    match subtype {
        0 => format!("WMM information, version {version}, U-APSD: {uapsd}"),
        1 => {
            let mut lines = vec![format!("WMM parameters, version {version}, U-APSD: {uapsd}")];
            // Four fixed AC records of 4 bytes each, after a reserved byte.
            for record in 0..4 {
                let offset = 4 + record * 4;
                let Some(ac) = data.get(offset..offset + 4) else {
                    lines.push("parsing error: truncated AC record".to_string());
                    break;
                };
                let aifsn = ac[0] & 0x0F;
                let acm = ac[0] & 0x10 != 0;
                let aci = (ac[0] >> 5) & 0x03;
                let ecw_min = ac[1] & 0x0F;
                let ecw_max = ac[1] >> 4;
                let txop = u16::from_le_bytes([ac[2], ac[3]]);
                lines.push(format!(
                    "{}: ACM {}, AIFSN {aifsn}, ECWmin/max {ecw_min}/{ecw_max}, TXOP {txop}",
                    ACCESS_CATEGORIES[aci as usize],
                    if acm { "yes" } else { "no" }
                ));
            }
            lines.join("\n")
        }
        other => format!("WME subtype {other}"),
    }
}

/// WPS (Microsoft OUI type 4): a nested attribute-TLV walk. Unlike the
/// outer element format, attribute id and length are each 2 bytes
/// big-endian. The Device Name attribute feeds `apname`.
fn decode_wps(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    let mut parts = Vec::new();
    let mut offset = 0;

    while offset + 4 <= data.len() {
        let attribute = u16::from_be_bytes([data[offset], data[offset + 1]]);
        let length = u16::from_be_bytes([data[offset + 2], data[offset + 3]]) as usize;
        offset += 4;

        let Some(value) = data.get(offset..offset + length) else {
            parts.push("parsing error: truncated WPS attribute".to_string());
            break;
        };
        offset += length;

        match attribute {
            0x1011 => {
                let name = escape_control_chars(value);
                sink.apname = name.clone();
                parts.push(format!("device name: {name}"));
            }
            0x1021 => parts.push(format!("manufacturer: {}", escape_control_chars(value))),
            0x1023 => parts.push(format!("model: {}", escape_control_chars(value))),
            0x1042 => parts.push(format!("serial: {}", escape_control_chars(value))),
            0x1044 => {
                let state = match value.first() {
                    Some(0x01) => "not configured",
                    Some(0x02) => "configured",
                    _ => "unknown",
                };
                parts.push(format!("setup state: {state}"));
            }
            _ => {} // plenty of attributes carry nothing worth showing
        }
    }

    if parts.is_empty() {
        "WPS".to_string()
    } else {
        format!("WPS: {}", parts.join(", "))
    }
}

/// Aruba (00:0b:86), multi-subtype.
fn decode_aruba(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    let Some(&subtype) = data.get(3) else {
        return "Aruba (missing subtype)".to_string();
    };
    match subtype {
        1 if data.len() > 4 => {
            let name = escape_control_chars(&data[4..]);
            sink.apname = name.clone();
            format!("Aruba AP name: {name}")
        }
        3 if data.len() > 4 => {
            format!("Aruba ARM EIRP: {} dBm", data[4] as i8)
        }
        4 if data.len() > 4 => {
            format!("Aruba GPS ellipse: {}", pretty_hex(&data[4..]))
        }
        5 if data.len() > 4 => {
            format!(
                "Aruba AP health: uplink {}, power {}, radio {}",
                if data[4] & 0x01 != 0 { "ok" } else { "degraded" },
                if data[4] & 0x02 != 0 { "ok" } else { "degraded" },
                if data[4] & 0x04 != 0 { "ok" } else { "degraded" }
            )
        }
        other => format!("Aruba subtype {other}"),
    }
}

/// Ruckus (00:13:92): the payload after the OUI is the AP name.
fn decode_ruckus(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    if data.len() <= 3 {
        return "Ruckus".to_string();
    }
    let name = escape_control_chars(&data[3..]);
    sink.apname = name.clone();
    format!("Ruckus AP name: {name}")
}

/// Aerohive (00:19:77): subtype 33 carries the AP hostname behind a
/// version/length pair.
fn decode_aerohive(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    let Some(&subtype) = data.get(3) else {
        return "Aerohive (missing subtype)".to_string();
    };
    if subtype == 33 && data.len() > 6 {
        let name = escape_control_chars(&data[6..]);
        sink.apname = name.clone();
        return format!("Aerohive AP name: {name}");
    }
    format!("Aerohive subtype {subtype}")
}

/// Zebra / Extreme WiNG (00:a0:f8).
fn decode_zebra(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    if data.len() > 4 {
        let name = escape_control_chars(&data[4..]);
        if !name.is_empty() {
            sink.apname = name.clone();
            return format!("Zebra/WiNG AP name: {name}");
        }
    }
    "Zebra/WiNG".to_string()
}

/// Mist (5c:5b:35).
fn decode_mist(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    if data.len() > 4 {
        let name = escape_control_chars(&data[4..]);
        if !name.is_empty() {
            sink.apname = name.clone();
            return format!("Mist AP name: {name}");
        }
    }
    "Mist".to_string()
}

/// Arista / Mojo (00:11:74).
fn decode_arista(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    let Some(&subtype) = data.get(3) else {
        return "Arista (missing subtype)".to_string();
    };
    if data.len() > 6 {
        let name = escape_control_chars(&data[6..]);
        if !name.is_empty() {
            sink.apname = name.clone();
            return format!("Arista AP name: {name}");
        }
    }
    format!("Arista subtype {subtype}")
}

/// Cisco Aironet (00:40:96). Subtype 0 embeds the AP name at a fixed
/// offset inside the CCX device-name block.
fn decode_cisco_aironet(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    let Some(&subtype) = data.get(3) else {
        return "Cisco Aironet (missing subtype)".to_string();
    };
    match subtype {
        0 if data.len() > 10 => {
            let raw = &data[10..];
            let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            let name = escape_control_chars(&raw[..end]);
            if name.is_empty() {
                return "Cisco Aironet device name (empty)".to_string();
            }
            sink.apname = name.clone();
            format!("Cisco AP name: {name}")
        }
        3 => "Cisco Aironet CCX".to_string(),
        other => format!("Cisco Aironet subtype {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_oui_echoes() {
        let mut bss = NetworkDescriptor::new();
        let text = decode_vendor_specific(&[0xDE, 0xAD, 0xBE, 0x01], &mut bss);
        assert_eq!(text, "OUI: de:ad:be");
        assert!(bss.apname.is_empty());
    }

    #[test]
    fn static_table_names_known_vendors() {
        let mut bss = NetworkDescriptor::new();
        let text = decode_vendor_specific(&[0x00, 0x10, 0x18, 0x02], &mut bss);
        assert!(text.starts_with("Broadcom"));
    }

    #[test]
    fn wps_device_name_sets_apname() {
        let mut data = vec![0x00, 0x50, 0xF2, 0x04];
        data.extend_from_slice(&[0x10, 0x11, 0x00, 0x05]); // device name, len 5
        data.extend_from_slice(b"ap-07");
        let mut bss = NetworkDescriptor::new();
        let text = decode_vendor_specific(&data, &mut bss);
        assert_eq!(bss.apname, "ap-07");
        assert!(text.contains("device name: ap-07"));
    }

    #[test]
    fn wmm_parameter_element_decodes_all_four_acs() {
        let mut data = vec![0x00, 0x50, 0xF2, 0x02];
        data.extend_from_slice(&[0x01, 0x01, 0x80, 0x00]); // parameter, v1, U-APSD
        data.extend_from_slice(&[0x03, 0xA4, 0x00, 0x00]); // BE
        data.extend_from_slice(&[0x27, 0xA4, 0x00, 0x00]); // BK
        data.extend_from_slice(&[0x42, 0x43, 0x5E, 0x00]); // VI
        data.extend_from_slice(&[0x62, 0x32, 0x2F, 0x00]); // VO
        let mut bss = NetworkDescriptor::new();
        let text = decode_vendor_specific(&data, &mut bss);
        assert!(text.contains("U-APSD: true"));
        assert!(text.contains("Voice"));
        assert!(bss.amendments_string().contains('e'));
    }

    #[test]
    fn aruba_ap_name() {
        let mut data = vec![0x00, 0x0B, 0x86, 0x01];
        data.extend_from_slice(b"lobby-ap");
        let mut bss = NetworkDescriptor::new();
        decode_vendor_specific(&data, &mut bss);
        assert_eq!(bss.apname, "lobby-ap");
    }
}
