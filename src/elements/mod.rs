//! The element walk: a cursor over the TLV-encoded IE buffer of a management
//! frame, dispatching each `{id, length, payload}` unit to its decoder.
//!
//! The general structure of the data looks like this:
//!
//! 1 byte: Element id
//! 1 byte: Element length (up to 255 bytes)
//! $element_length bytes: Element data
//!
//! Element id 255 carries a secondary extension id as the first payload byte
//! (already counted in the length). There might be multiple elements with the
//! same element id, which is why the output is an ordered Vec rather than a
//! map.

pub mod basic;
pub mod extension;
pub mod ht;
pub mod rnr;
pub mod rsn;
pub mod vendor;
pub mod vht;

use log::debug;

use crate::bss::NetworkDescriptor;
use crate::util::pretty_hex;

/// Placeholder text for element IDs without a registered decoder.
pub const NOT_IMPLEMENTED: &str = "Parser not implemented";

/// One TLV unit as found on the wire. Constructed transiently per walk step.
#[derive(Clone, Copy, Debug)]
pub struct RawElement<'a> {
    pub id: u8,
    /// Only present when `id == 255`.
    pub extension_id: Option<u8>,
    pub length: u8,
    pub payload: &'a [u8],
}

/// The decoder's display output for one wire element.
#[derive(Clone, Debug)]
pub struct DecodedElement {
    pub id: u8,
    pub extension_id: Option<u8>,
    /// Human-readable element name, "Undecoded" for unknown IDs.
    pub name: String,
    pub length: u8,
    /// Never empty. May hold embedded newlines; row expansion is the
    /// display layer's job.
    pub decoded: String,
    pub raw: Vec<u8>,
    pub pretty_hex: String,
}

impl DecodedElement {
    fn from_raw(element: &RawElement, name: &str, decoded: String) -> Self {
        DecodedElement {
            id: element.id,
            extension_id: element.extension_id,
            name: name.to_string(),
            length: element.length,
            decoded,
            raw: element.payload.to_vec(),
            pretty_hex: pretty_hex(element.payload),
        }
    }
}

/// Human-readable name for an element ID.
pub fn element_name(id: u8) -> &'static str {
    match id {
        0 => "SSID",
        1 => "Supported Rates",
        3 => "DSSS Parameter Set",
        5 => "Traffic Indication Map (TIM)",
        7 => "Country Information",
        11 => "BSS Load",
        32 => "Power Constraint",
        35 => "TPC Report",
        40 => "Quiet",
        42 => "ERP Information",
        45 => "HT Capabilities",
        48 => "RSN Information",
        50 => "Extended Supported Rates",
        51 => "AP Channel Report",
        54 => "Mobility Domain",
        61 => "HT Operation",
        70 => "RM Enabled Capabilities",
        71 => "Multiple BSSID",
        74 => "Overlapping BSS Scan Parameters",
        107 => "Interworking",
        113 => "Mesh Configuration",
        127 => "Extended Capabilities",
        191 => "VHT Capabilities",
        192 => "VHT Operation",
        195 => "Tx Power Envelope",
        201 => "Reduced Neighbor Report",
        221 => "Vendor Specific",
        244 => "RSN Extension",
        255 => "Element Extension",
        _ => "Undecoded",
    }
}

/// Dispatch one element to its decoder. `None` means no decoder is
/// registered for this ID; the caller emits the placeholder form and the
/// sink stays untouched.
fn decode_element(element: &RawElement, sink: &mut NetworkDescriptor) -> Option<String> {
    let data = element.payload;
    match element.id {
        0 => Some(basic::decode_ssid(data, sink)),
        1 => Some(basic::decode_rates(data, sink)),
        3 => Some(basic::decode_dsss_parameter_set(data, sink)),
        5 => Some(basic::decode_tim(data, sink)),
        7 => Some(basic::decode_country(data, sink)),
        11 => Some(basic::decode_bss_load(data, sink)),
        32 => Some(basic::decode_power_constraint(data, sink)),
        35 => Some(basic::decode_tpc_report(data, sink)),
        40 => Some(basic::decode_quiet(data, sink)),
        42 => Some(basic::decode_erp(data, sink)),
        45 => Some(ht::decode_ht_capabilities(data, sink)),
        48 => Some(rsn::decode_rsn(data, sink)),
        50 => Some(basic::decode_extended_rates(data, sink)),
        51 => Some(basic::decode_ap_channel_report(data, sink)),
        54 => Some(basic::decode_mobility_domain(data, sink)),
        61 => Some(ht::decode_ht_operation(data, sink)),
        70 => Some(basic::decode_rm_enabled_capabilities(data, sink)),
        71 => Some(basic::decode_multiple_bssid(data, sink)),
        74 => Some(basic::decode_obss_scan_parameters(data, sink)),
        107 => Some(basic::decode_interworking(data, sink)),
        113 => Some(basic::decode_mesh_configuration(data, sink)),
        127 => Some(basic::decode_extended_capabilities(data, sink)),
        191 => Some(vht::decode_vht_capabilities(data, sink)),
        192 => Some(vht::decode_vht_operation(data, sink)),
        195 => Some(vht::decode_tx_power_envelope(data, sink)),
        201 => Some(rnr::decode_reduced_neighbor_report(data, sink)),
        221 => Some(vendor::decode_vendor_specific(data, sink)),
        244 => Some(basic::decode_rsn_extension(data, sink)),
        255 => extension::decode_extension(data, sink),
        _ => None,
    }
}

/// Walk a flat IE buffer, decoding every element into a display record and
/// folding side effects into `sink`.
///
/// A malformed element degrades its own record and never aborts the rest of
/// the walk. The cursor always terminates at the buffer end.
pub fn parse_elements(buffer: &[u8], sink: &mut NetworkDescriptor) -> Vec<DecodedElement> {
    let mut decoded = Vec::new();
    let mut cursor = 0;

    while cursor < buffer.len() {
        let id = buffer[cursor];
        cursor += 1;

        // An id byte with no length byte behind it: report and stop, there
        // is nothing left to walk.
        if cursor >= buffer.len() {
            debug!("element {id} truncated before its length byte");
            decoded.push(DecodedElement {
                id,
                extension_id: None,
                name: element_name(id).to_string(),
                length: 0,
                decoded: "parsing error: element truncated before its length byte".to_string(),
                raw: Vec::new(),
                pretty_hex: String::new(),
            });
            break;
        }

        let length = buffer[cursor];
        cursor += 1;

        // Validate the declared length against what is actually left. A
        // lying length byte puts the element into malformed mode: the
        // decoder gets the maximal available slice and degrades gracefully.
        let declared = length as usize;
        let available = buffer.len() - cursor;
        let take = declared.min(available);
        if take < declared {
            debug!("element {id} declares {declared} bytes but only {available} remain");
        }
        let payload = &buffer[cursor..cursor + take];
        cursor += take;

        let extension_id = if id == 255 { payload.first().copied() } else { None };
        let element = RawElement {
            id,
            extension_id,
            length,
            payload,
        };

        sink.ie_numbers.push(id);
        if let Some(exid) = extension_id {
            sink.exie_numbers.push(exid);
        }

        let name = match extension_id {
            Some(exid) => extension::extension_name(exid),
            None => element_name(id),
        };

        match decode_element(&element, sink) {
            Some(text) => decoded.push(DecodedElement::from_raw(&element, name, text)),
            None => {
                debug!("no decoder registered for element id {id}");
                decoded.push(DecodedElement::from_raw(
                    &element,
                    name,
                    NOT_IMPLEMENTED.to_string(),
                ));
            }
        }
    }

    decoded
}
