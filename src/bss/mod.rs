//! The network descriptor: one mutable aggregate per discovered BSS,
//! populated as a side effect of the element walk.

mod mac_address;

use std::collections::BTreeSet;

pub use mac_address::{MacAddress, MacParseError};
use strum_macros::Display;

use crate::util::{mhz_to_ghz_string, timestamp_to_uptime};

/// Operating channel width in MHz. Later elements legitimately override
/// earlier ones (HT -> VHT -> HE -> EHT layering), so writes are
/// last-writer-wins in wire order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum ChannelWidth {
    #[default]
    #[strum(serialize = "20")]
    Twenty,
    #[strum(serialize = "40")]
    Forty,
    #[strum(serialize = "80")]
    Eighty,
    #[strum(serialize = "160")]
    OneSixty,
    #[strum(serialize = "320")]
    ThreeTwenty,
}

/// Position of the secondary channel for 40 MHz HT operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum ChannelMarking {
    #[default]
    #[strum(serialize = "")]
    None,
    #[strum(serialize = "+")]
    Above,
    #[strum(serialize = "-")]
    Below,
}

/// 802.11 generation letters. Declaration order is generation order, so a
/// sorted set displays as a/b/g/n/ac/ax/be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum PhyMode {
    #[strum(serialize = "a")]
    A,
    #[strum(serialize = "b")]
    B,
    #[strum(serialize = "g")]
    G,
    #[strum(serialize = "n")]
    N,
    #[strum(serialize = "ac")]
    Ac,
    #[strum(serialize = "ax")]
    Ax,
    #[strum(serialize = "be")]
    Be,
}

/// Single-letter 802.11 amendment codes accumulated during the walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum Amendment {
    #[strum(serialize = "d")]
    D,
    #[strum(serialize = "e")]
    E,
    #[strum(serialize = "h")]
    H,
    #[strum(serialize = "i")]
    I,
    #[strum(serialize = "k")]
    K,
    #[strum(serialize = "r")]
    R,
    #[strum(serialize = "s")]
    S,
    #[strum(serialize = "u")]
    U,
    #[strum(serialize = "v")]
    V,
    #[strum(serialize = "w")]
    W,
}

/// Protected Management Frames state from the RSN capabilities field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum Pmf {
    #[default]
    Disabled,
    Capable,
    Required,
}

/// One rate out of the Supported Rates / Extended Supported Rates elements.
/// The high bit of the wire byte marks a basic (mandatory) rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportedRate {
    pub mandatory: bool,
    pub rate: f32,
}

/// One neighbor AP advertised by a Reduced Neighbor Report TBTT entry.
///
/// Optional fields follow the greedy fixed-order consumption rule: presence
/// is decided by the advertised TBTT info length, not by a bitmap.
#[derive(Clone, Debug, Default)]
pub struct RnrNeighbor {
    pub operating_class: u8,
    pub channel: u8,
    pub tbtt_offset: u8,
    pub bssid: Option<MacAddress>,
    pub short_ssid: Option<u32>,
    // BSS parameters byte, when present.
    pub oct_recommended: bool,
    pub same_ssid: bool,
    pub multiple_bssid: bool,
    pub transmitted_bssid: bool,
    pub colocated_ess: bool,
    pub unsolicited_probe_active: bool,
    pub colocated_ap: bool,
    /// 20 MHz PSD in dBm (raw signed byte times 0.5).
    pub psd_20mhz: Option<f32>,
    // MLD parameters, when present (Wi-Fi 7 multi-link).
    pub mld_id: Option<u8>,
    pub link_id: Option<u8>,
    pub bss_change_count: Option<u8>,
    pub all_updates_included: bool,
    pub disabled_link: bool,
}

/// The central mutable aggregate for one discovered network.
///
/// Created when a decode pass discovers one BSSID record, seeded from the
/// frame's fixed fields, mutated exclusively during the single element walk
/// over that record's IE buffer, then sealed with [finalize](Self::finalize).
#[derive(Clone, Debug)]
pub struct NetworkDescriptor {
    pub ssid: String,
    pub bssid: MacAddress,
    /// Exact match against the interface's currently-associated BSSID.
    pub connected: bool,
    /// Signal in dBm.
    pub rssi: i32,
    pub link_quality: u8,
    /// Center frequency in MHz, as seeded by the frame locator.
    pub frequency_mhz: u32,
    /// GHz rendering with 3 decimals, written once by [finalize](Self::finalize).
    pub channel_frequency: String,
    pub channel_number: String,
    pub channel_width: ChannelWidth,
    pub channel_marking: ChannelMarking,
    pub spatial_streams: u8,
    pub security: String,
    pub auth: String,
    pub encryption: String,
    pub pmf: Pmf,
    pub amendments: BTreeSet<Amendment>,
    pub modes: BTreeSet<PhyMode>,
    /// Every element ID seen on the wire, duplicates included, in order.
    pub ie_numbers: Vec<u8>,
    /// Every extension ID seen under element 255.
    pub exie_numbers: Vec<u8>,
    pub apname: String,
    /// Accumulated across Supported Rates (1) and Extended Supported
    /// Rates (50): element 50 appends, it does not replace.
    pub rates: Vec<SupportedRate>,
    pub rnrs: Vec<RnrNeighbor>,
    pub uptime: String,
    pub dtim: Option<u8>,
    pub stations: Option<u16>,
    /// QBSS channel utilization as a percentage.
    pub utilization: Option<u8>,
    pub transmit_power: Option<i8>,
    pub country: Option<String>,
    pub beacon_interval: u16,
    pub capability: u16,
    /// Beacon timestamp: microseconds since the AP's TSF started.
    pub timestamp: u64,
    /// The raw IE bytes this descriptor was decoded from, kept for
    /// byte-exact re-synthesis into a capture file.
    pub raw_ies: Vec<u8>,
}

impl Default for NetworkDescriptor {
    fn default() -> Self {
        NetworkDescriptor {
            ssid: String::new(),
            bssid: MacAddress::zeroed(),
            connected: false,
            rssi: 0,
            link_quality: 0,
            frequency_mhz: 0,
            channel_frequency: String::new(),
            channel_number: String::new(),
            channel_width: ChannelWidth::Twenty,
            channel_marking: ChannelMarking::None,
            spatial_streams: 1,
            security: "NONE".to_string(),
            auth: "NONE".to_string(),
            encryption: "NONE".to_string(),
            pmf: Pmf::Disabled,
            amendments: BTreeSet::new(),
            modes: BTreeSet::new(),
            ie_numbers: Vec::new(),
            exie_numbers: Vec::new(),
            apname: String::new(),
            rates: Vec::new(),
            rnrs: Vec::new(),
            uptime: String::new(),
            dtim: None,
            stations: None,
            utilization: None,
            transmit_power: None,
            country: None,
            beacon_interval: 0,
            capability: 0,
            timestamp: 0,
            raw_ies: Vec::new(),
        }
    }
}

impl NetworkDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_2_4ghz(&self) -> bool {
        (2400..2500).contains(&self.frequency_mhz)
    }

    pub fn is_5ghz(&self) -> bool {
        (5000..5955).contains(&self.frequency_mhz)
    }

    pub fn is_6ghz(&self) -> bool {
        (5955..7125).contains(&self.frequency_mhz)
    }

    pub fn add_mode(&mut self, mode: PhyMode) {
        self.modes.insert(mode);
    }

    pub fn add_amendment(&mut self, amendment: Amendment) {
        self.amendments.insert(amendment);
    }

    /// Last writer wins, on purpose: HT < VHT < HE < EHT layering means a
    /// later element in wire order legitimately overrides an earlier one.
    /// No priority pass is imposed over the wire order.
    pub fn set_channel_width(&mut self, width: ChannelWidth, marking: ChannelMarking) {
        self.channel_width = width;
        self.channel_marking = marking;
    }

    /// Sorted, de-duplicated amendment letters for display, e.g. `d/h/i/k`.
    pub fn amendments_string(&self) -> String {
        self.amendments
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<String>>()
            .join("/")
    }

    /// Generation letters in generation order, e.g. `b/g/n/ax`.
    pub fn modes_string(&self) -> String {
        self.modes
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<String>>()
            .join("/")
    }

    pub fn mark_if_connected(&mut self, associated: &MacAddress) {
        if self.bssid == *associated {
            self.connected = true;
        }
    }

    /// Seal the descriptor once the element walk is done: render the MHz
    /// frequency as a GHz string and derive the uptime from the beacon
    /// timestamp. Must run exactly once, after the walk, never mid-walk.
    pub fn finalize(&mut self) {
        self.channel_frequency = mhz_to_ghz_string(self.frequency_mhz);
        self.uptime = timestamp_to_uptime(self.timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_classification() {
        let mut bss = NetworkDescriptor::new();
        bss.frequency_mhz = 2412;
        assert!(bss.is_2_4ghz() && !bss.is_5ghz() && !bss.is_6ghz());
        bss.frequency_mhz = 5825;
        assert!(bss.is_5ghz());
        bss.frequency_mhz = 6855;
        assert!(bss.is_6ghz());
    }

    #[test]
    fn modes_display_in_generation_order() {
        let mut bss = NetworkDescriptor::new();
        bss.add_mode(PhyMode::Ax);
        bss.add_mode(PhyMode::B);
        bss.add_mode(PhyMode::N);
        bss.add_mode(PhyMode::G);
        bss.add_mode(PhyMode::N);
        assert_eq!(bss.modes_string(), "b/g/n/ax");
    }

    #[test]
    fn amendments_deduplicate_and_sort() {
        let mut bss = NetworkDescriptor::new();
        bss.add_amendment(Amendment::K);
        bss.add_amendment(Amendment::D);
        bss.add_amendment(Amendment::K);
        bss.add_amendment(Amendment::H);
        assert_eq!(bss.amendments_string(), "d/h/k");
    }

    #[test]
    fn finalize_renders_frequency_and_uptime() {
        let mut bss = NetworkDescriptor::new();
        bss.frequency_mhz = 2412;
        bss.timestamp = 285_837_076;
        bss.finalize();
        assert_eq!(bss.channel_frequency, "2.412");
        assert_eq!(bss.uptime, "00d 0:04:45");
    }

    #[test]
    fn connected_flag_requires_exact_match() {
        let mut bss = NetworkDescriptor::new();
        bss.bssid = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        bss.mark_if_connected(&"aa:bb:cc:dd:ee:00".parse().unwrap());
        assert!(!bss.connected);
        bss.mark_if_connected(&"aa:bb:cc:dd:ee:ff".parse().unwrap());
        assert!(bss.connected);
    }
}
