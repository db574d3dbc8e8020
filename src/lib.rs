//! A read-only semantic decoder for IEEE 802.11 Information Elements.
//!
//! Beacon and probe-response frames carry a TLV-encoded buffer of
//! Information Elements. This crate walks that buffer, decodes each element
//! into display text, and folds the cross-cutting semantics (channel width,
//! spatial streams, security, amendments, neighbor reports) into one
//! [NetworkDescriptor](bss::NetworkDescriptor) per network.
//!
//! Input can be a bare IE buffer, a live scan record, a `.ies`/`.bss` dump
//! file, or a frame pulled out of a pcap/pcapng capture; a populated
//! descriptor can be re-synthesized into a radiotap + beacon frame and
//! written back to pcapng with the IE bytes intact.

/// The network descriptor and its supporting types.
pub mod bss;
/// Capture containers (pcap, pcapng) and the radiotap layer.
pub mod capture;
/// The TLV walker and all per-element decoders.
pub mod elements;
/// This crate's own [Error](error::Error) implementation.
pub mod error;
/// Frame locators: scan records, dump files, captured packets.
pub mod locate;
/// Bit/byte and formatting helpers.
pub mod util;

// Re-exports for user convenience
pub use crate::bss::NetworkDescriptor;
pub use crate::elements::{parse_elements, DecodedElement};
pub use crate::error::Error;

/// Decode a bare IE buffer (the content of a `.ies` file) into a finalized
/// descriptor plus the per-element display records.
pub fn decode_ies(buffer: &[u8]) -> (NetworkDescriptor, Vec<DecodedElement>) {
    let mut bss = NetworkDescriptor::new();
    bss.raw_ies = buffer.to_vec();
    let elements = parse_elements(buffer, &mut bss);
    bss.finalize();
    (bss, elements)
}
