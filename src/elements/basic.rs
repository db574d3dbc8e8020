//! Decoders for the small fixed-layout elements.
//!
//! Every decoder returns display text and may fold side effects into the
//! descriptor (amendments, modes, channel, QBSS stats). Payloads shorter
//! than the nominal structure degrade to a partial decode, never a panic.

use crate::bss::{Amendment, NetworkDescriptor, PhyMode, SupportedRate};
use crate::util::{escape_control_chars, format_rate, get_bit};

/// SSID (0). Raw bytes, 0-32; empty payload is a hidden network.
pub fn decode_ssid(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    if data.is_empty() {
        sink.ssid = String::new();
        return "(hidden)".to_string();
    }
    let ssid = escape_control_chars(data);
    sink.ssid = ssid.clone();
    ssid
}

/// Supported Rates (1). High bit marks a basic (mandatory) rate, low 7 bits
/// are the rate in 500 kbps units.
pub fn decode_rates(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    let rates = parse_rates(data);
    sink.rates.extend_from_slice(&rates);
    update_modes_from_rates(sink);
    format_rates(&sink.rates)
}

/// Extended Supported Rates (50). Appends to the same accumulator as
/// element 1 rather than replacing it.
pub fn decode_extended_rates(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    decode_rates(data, sink)
}

fn parse_rates(input: &[u8]) -> Vec<SupportedRate> {
    input
        .iter()
        .map(|&data| {
            let rate = (data & 0x7F) as f32 / 2.0;
            let mandatory = (data & 0x80) != 0;
            SupportedRate { mandatory, rate }
        })
        .collect()
}

/// Ascending rate list with a `(B)` suffix on basic rates.
fn format_rates(rates: &[SupportedRate]) -> String {
    let mut sorted = rates.to_vec();
    sorted.sort_by(|a, b| a.rate.partial_cmp(&b.rate).unwrap_or(std::cmp::Ordering::Equal));
    sorted
        .iter()
        .map(|r| {
            if r.mandatory {
                format!("{}(B)", format_rate(r.rate))
            } else {
                format_rate(r.rate)
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

const DSSS_RATES: [f32; 4] = [1.0, 2.0, 5.5, 11.0];

fn update_modes_from_rates(sink: &mut NetworkDescriptor) {
    if sink.is_5ghz() {
        sink.add_mode(PhyMode::A);
    }
    if sink.is_2_4ghz() {
        if sink.rates.iter().any(|r| DSSS_RATES.contains(&r.rate)) {
            sink.add_mode(PhyMode::B);
        }
        if sink.rates.iter().any(|r| r.rate >= 6.0) {
            sink.add_mode(PhyMode::G);
        }
    }
}

/// DSSS Parameter Set (3). Single byte, the current channel number.
pub fn decode_dsss_parameter_set(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    let Some(&channel) = data.first() else {
        return "length wrong: expected 1 byte".to_string();
    };
    sink.channel_number = channel.to_string();
    format!("current channel: {channel}")
}

/// Traffic Indication Map (5). The second byte is the DTIM period.
pub fn decode_tim(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    if data.len() < 2 {
        return "length wrong: expected at least 2 bytes".to_string();
    }
    let dtim_count = data[0];
    let dtim_period = data[1];
    sink.dtim = Some(dtim_period);
    format!("DTIM period: {dtim_period} (count {dtim_count})")
}

/// Country Information (7). Three ASCII bytes (two-letter code plus an
/// environment marker) followed by channel triplets.
pub fn decode_country(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_amendment(Amendment::D);
    if data.len() < 3 {
        return format!(
            "length wrong: expected at least 3 bytes, got {}",
            data.len()
        );
    }
    let code = escape_control_chars(&data[0..2]);
    let environment = match data[2] {
        b' ' => "any",
        b'I' => "indoor",
        b'O' => "outdoor",
        _ => "unknown",
    };
    sink.country = Some(code.clone());

    let mut text = format!("{code} ({environment})");
    // First-channel / channel-count / max-power triplets.
    for triplet in data[3..].chunks_exact(3) {
        let first = triplet[0];
        let count = triplet[1];
        let last = first.saturating_add(count.saturating_sub(1));
        text.push_str(&format!(
            "\nchannels {first}-{last}, max transmit power {} dBm",
            triplet[2] as i8
        ));
    }
    text
}

/// BSS Load / QBSS (11). Station count, channel utilization (0-255 scaled),
/// admission capacity.
pub fn decode_bss_load(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_amendment(Amendment::E);
    if data.len() < 5 {
        return format!(
            "length wrong: expected 5 bytes, got {}",
            data.len()
        );
    }
    let stations = u16::from_le_bytes([data[0], data[1]]);
    let utilization_raw = data[2] as u32;
    // ceil(raw / 255 * 100)
    let utilization = ((utilization_raw * 100 + 254) / 255) as u8;
    let admission = u16::from_le_bytes([data[3], data[4]]);
    sink.stations = Some(stations);
    sink.utilization = Some(utilization);
    format!(
        "{stations} stations, {utilization}% utilization, admission capacity {admission}"
    )
}

/// Power Constraint (32).
pub fn decode_power_constraint(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_amendment(Amendment::H);
    let Some(&constraint) = data.first() else {
        return "length wrong: expected 1 byte".to_string();
    };
    format!("local power constraint: {constraint} dB")
}

/// TPC Report (35). First byte is the signed transmit power in dBm.
pub fn decode_tpc_report(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_amendment(Amendment::H);
    let Some(&power) = data.first() else {
        return "length wrong: expected 2 bytes".to_string();
    };
    let power = power as i8;
    sink.transmit_power = Some(power);
    let link_margin = data.get(1).map(|&b| b as i8).unwrap_or(0);
    format!("transmit power: {power} dBm, link margin: {link_margin} dB")
}

/// Quiet (40).
pub fn decode_quiet(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_amendment(Amendment::H);
    if data.len() < 6 {
        return format!("length wrong: expected 6 bytes, got {}", data.len());
    }
    let count = data[0];
    let period = data[1];
    let duration = u16::from_le_bytes([data[2], data[3]]);
    let offset = u16::from_le_bytes([data[4], data[5]]);
    format!("count {count}, period {period}, duration {duration} TU, offset {offset} TU")
}

/// ERP Information (42).
pub fn decode_erp(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_mode(PhyMode::G);
    let Some(&flags) = data.first() else {
        return "length wrong: expected 1 byte".to_string();
    };
    format!(
        "NonERP present: {}, use protection: {}, Barker preamble mode: {}",
        flags & 0x01 != 0,
        flags & 0x02 != 0,
        flags & 0x04 != 0
    )
}

/// AP Channel Report (51). Operating class plus a channel list.
pub fn decode_ap_channel_report(data: &[u8], _sink: &mut NetworkDescriptor) -> String {
    let Some(&operating_class) = data.first() else {
        return "length wrong: expected at least 1 byte".to_string();
    };
    let channels = data[1..]
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<String>>()
        .join(" ");
    format!("operating class {operating_class}, channels: {channels}")
}

/// Mobility Domain (54). Presence alone marks 802.11r fast transition.
pub fn decode_mobility_domain(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_amendment(Amendment::R);
    if data.len() < 3 {
        return "fast BSS transition supported".to_string();
    }
    let mdid = u16::from_le_bytes([data[0], data[1]]);
    format!(
        "MDID: {mdid:#06x}, over-the-DS: {}, resource request capable: {}",
        data[2] & 0x01 != 0,
        data[2] & 0x02 != 0
    )
}

/// RM Enabled Capabilities (70). Marks 802.11k radio measurement.
pub fn decode_rm_enabled_capabilities(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_amendment(Amendment::K);
    if data.is_empty() {
        return "radio measurement capable".to_string();
    }
    format!(
        "link measurement: {}, neighbor report: {}, beacon passive measurement: {}",
        get_bit(data, 0),
        get_bit(data, 1),
        get_bit(data, 4)
    )
}

/// Multiple BSSID (71).
pub fn decode_multiple_bssid(data: &[u8], _sink: &mut NetworkDescriptor) -> String {
    let Some(&indicator) = data.first() else {
        return "length wrong: expected at least 1 byte".to_string();
    };
    format!(
        "max BSSID indicator: {indicator} (up to {} BSSIDs)",
        1u32 << indicator.min(31)
    )
}

/// Overlapping BSS Scan Parameters (74). Seven little-endian u16 timing
/// fields, display only.
pub fn decode_obss_scan_parameters(data: &[u8], _sink: &mut NetworkDescriptor) -> String {
    if data.len() < 14 {
        return format!("length wrong: expected 14 bytes, got {}", data.len());
    }
    let field = |i: usize| u16::from_le_bytes([data[i * 2], data[i * 2 + 1]]);
    format!(
        "passive dwell: {} TU, active dwell: {} TU, trigger scan interval: {} s\n\
         passive total per channel: {} TU, active total per channel: {} TU\n\
         width trigger delay factor: {}, activity threshold: {}%",
        field(0),
        field(1),
        field(2),
        field(3),
        field(4),
        field(5),
        field(6)
    )
}

const NETWORK_TYPES: [&str; 16] = [
    "Private network",
    "Private network with guest access",
    "Chargeable public network",
    "Free public network",
    "Personal device network",
    "Emergency services only network",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Test or experimental",
    "Wildcard",
];

/// Interworking (107). Marks 802.11u.
pub fn decode_interworking(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_amendment(Amendment::U);
    let Some(&options) = data.first() else {
        return "length wrong: expected at least 1 byte".to_string();
    };
    let network_type = NETWORK_TYPES[(options & 0x0F) as usize];
    format!(
        "{network_type}, internet: {}, ASRA: {}, ESR: {}, UESA: {}",
        options & 0x10 != 0,
        options & 0x20 != 0,
        options & 0x40 != 0,
        options & 0x80 != 0
    )
}

/// Mesh Configuration (113). Marks 802.11s.
pub fn decode_mesh_configuration(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    sink.add_amendment(Amendment::S);
    if data.len() < 7 {
        return "mesh STA".to_string();
    }
    format!(
        "path selection protocol: {}, metric: {}, congestion control: {}, peerings: {}",
        data[0],
        data[1],
        data[2],
        data[6] >> 1 & 0x3F
    )
}

/// Extended Capabilities (127). Octet 2 bit 3 is BSS Transition (802.11v).
pub fn decode_extended_capabilities(data: &[u8], sink: &mut NetworkDescriptor) -> String {
    let bss_transition = data.len() > 2 && data[2] & 0x08 != 0;
    if bss_transition {
        sink.add_amendment(Amendment::V);
    }
    format!(
        "BSS transition: {}, proxy ARP: {}, interworking: {}",
        bss_transition,
        data.first().is_some_and(|b| b & 0x10 != 0),
        data.len() > 3 && data[3] & 0x80 != 0
    )
}

/// RSN Extension (244).
pub fn decode_rsn_extension(data: &[u8], _sink: &mut NetworkDescriptor) -> String {
    let Some(&first) = data.first() else {
        return "length wrong: expected at least 1 byte".to_string();
    };
    format!(
        "protected TWT: {}, SAE hash-to-element: {}",
        first & 0x10 != 0,
        first & 0x20 != 0
    )
}
