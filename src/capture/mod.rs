//! Capture-file containers and the radiotap layer: just enough pcap/pcapng
//! plumbing to hand raw 802.11 frame bytes to and from the decoder.

pub mod pcap;
pub mod pcapng;
pub mod radiotap;

/// Link-layer type for 802.11 frames prefixed with a radiotap header.
pub const LINKTYPE_IEEE802_11_RADIOTAP: u32 = 127;

/// Plain 802.11 frames without a capture header.
pub const LINKTYPE_IEEE802_11: u32 = 105;
