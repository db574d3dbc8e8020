//! RSN (48): the security element. The only element that ever sets the
//! descriptor's security/auth/encryption/pmf fields — a network without an
//! RSN element stays open.

use crate::bss::{Amendment, NetworkDescriptor, Pmf};

fn cipher_suite_name(suite: &[u8]) -> String {
    match suite {
        [0x00, 0x0F, 0xAC, 0x00] => "GROUP".to_string(),
        [0x00, 0x0F, 0xAC, 0x01] => "WEP-40".to_string(),
        [0x00, 0x0F, 0xAC, 0x02] => "TKIP".to_string(),
        [0x00, 0x0F, 0xAC, 0x04] => "AES".to_string(),
        [0x00, 0x0F, 0xAC, 0x05] => "WEP-104".to_string(),
        [0x00, 0x0F, 0xAC, 0x08] => "GCMP".to_string(),
        [0x00, 0x0F, 0xAC, 0x09] => "GCMP-256".to_string(),
        [0x00, 0x0F, 0xAC, 0x0A] => "CCMP-256".to_string(),
        other => format!("unknown ({})", crate::util::slice_to_hex_string(other)),
    }
}

fn akm_suite_name(suite: &[u8]) -> String {
    match suite {
        [0x00, 0x0F, 0xAC, 0x01] => "802.1X".to_string(),
        [0x00, 0x0F, 0xAC, 0x02] => "PSK".to_string(),
        [0x00, 0x0F, 0xAC, 0x03] => "FT-802.1X".to_string(),
        [0x00, 0x0F, 0xAC, 0x04] => "FT-PSK".to_string(),
        [0x00, 0x0F, 0xAC, 0x05] => "802.1X-SHA256".to_string(),
        [0x00, 0x0F, 0xAC, 0x06] => "PSK-SHA256".to_string(),
        [0x00, 0x0F, 0xAC, 0x08] => "SAE".to_string(),
        [0x00, 0x0F, 0xAC, 0x09] => "FT-SAE".to_string(),
        [0x00, 0x0F, 0xAC, 0x0B] => "Suite-B".to_string(),
        [0x00, 0x0F, 0xAC, 0x0C] => "Suite-B-192".to_string(),
        [0x00, 0x0F, 0xAC, 0x12] => "OWE".to_string(),
        [0x00, 0x0F, 0xAC, 0x18] => "SAE-EXT-KEY".to_string(),
        other => format!("unknown ({})", crate::util::slice_to_hex_string(other)),
    }
}

/// RSN Information (48): full cipher/AKM suite table walk.
///
/// Side effects: `auth`, `encryption`, `security`, `pmf`, amendment "i",
/// amendment "w" when management frame protection is at least capable.
pub fn decode_rsn(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_amendment(Amendment::I);

    if data.len() < 8 {
        return format!("length wrong: expected at least 8 bytes, got {}", data.len());
    }

    let version = u16::from_le_bytes([data[0], data[1]]);
    if version != 1 {
        return format!("unsupported RSN version {version}");
    }

    let group_cipher = cipher_suite_name(&data[2..6]);
    let pairwise_count = u16::from_le_bytes([data[6], data[7]]) as usize;
    let mut offset = 8;

    let mut pairwise = Vec::new();
    for _ in 0..pairwise_count {
        let Some(suite) = data.get(offset..offset + 4) else {
            return format!("parsing error: truncated pairwise cipher list at offset {offset}");
        };
        pairwise.push(cipher_suite_name(suite));
        offset += 4;
    }

    let Some(count_bytes) = data.get(offset..offset + 2) else {
        return "parsing error: truncated before AKM suite count".to_string();
    };
    let akm_count = u16::from_le_bytes([count_bytes[0], count_bytes[1]]) as usize;
    offset += 2;

    let mut akms = Vec::new();
    for _ in 0..akm_count {
        let Some(suite) = data.get(offset..offset + 4) else {
            return format!("parsing error: truncated AKM suite list at offset {offset}");
        };
        akms.push(akm_suite_name(suite));
        offset += 4;
    }

    let auth = akms.join("/");
    let encryption = pairwise.join("/");
    let generation = if akms.iter().any(|a| a.contains("SAE") || a.contains("OWE")) {
        "WPA3"
    } else {
        "WPA2"
    };
    sink.auth = auth.clone();
    sink.encryption = encryption.clone();
    sink.security = format!("{generation}-{auth}/{encryption}");

    // RSN capabilities: bit 6 = MFPR, bit 7 = MFPC.
    let mut pmf_text = String::new();
    if let Some(caps) = data.get(offset..offset + 2) {
        let caps = u16::from_le_bytes([caps[0], caps[1]]);
        let mfp_required = caps & (1 << 6) != 0;
        let mfp_capable = caps & (1 << 7) != 0;
        sink.pmf = match (mfp_capable, mfp_required) {
            (true, true) => Pmf::Required,
            (true, false) => Pmf::Capable,
            (false, _) => Pmf::Disabled,
        };
        if mfp_capable {
            sink.add_amendment(Amendment::W);
        }
        pmf_text = format!(", PMF: {}", sink.pmf);
    }

    format!(
        "{}, group: {group_cipher}, pairwise: {encryption}, AKM: {auth}{pmf_text}",
        sink.security
    )
}
