//! Frame locators: every input shape (live scan record, raw dump file,
//! captured packet) is reduced to the same thing — fixed fields to seed the
//! descriptor with, plus the IE buffer to walk.

use std::io::Write;

use crc::{Crc, CRC_32_ISO_HDLC};
use log::warn;
use nom::bytes::complete::take;
use nom::number::complete::{le_i32, le_u16, le_u32, le_u64};
use nom::sequence::tuple;

use crate::bss::{MacAddress, NetworkDescriptor};
use crate::capture::pcapng::PcapNgWriter;
use crate::capture::radiotap::{self, Radiotap};
use crate::capture::LINKTYPE_IEEE802_11_RADIOTAP;
use crate::elements::{parse_elements, DecodedElement};
use crate::error::Error;

// CRC algorithm for FCS verification on captured frames.
const CRC_32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Management frame header length: frame control, duration, three
/// addresses, sequence control.
const MGMT_HEADER_LEN: usize = 24;

/// A fixed-layout scan-result record, the shape the OS scan API hands back
/// (and the content of a `.bss` dump file, which carries no IE buffer).
///
/// Wire layout, all little-endian:
/// u32 ssid length, 32 bytes SSID, 6 bytes BSSID, u16 reserved,
/// u32 PHY type, i32 RSSI, u32 link quality, u16 beacon period,
/// u16 reserved, u64 timestamp, u64 host timestamp, u16 capability,
/// u16 reserved, u32 channel center frequency in kHz, u32 IE offset,
/// u32 IE size — 92 bytes total.
#[derive(Clone, Debug)]
pub struct ScanRecord {
    pub ssid: Vec<u8>,
    pub bssid: MacAddress,
    pub phy_type: u32,
    pub rssi: i32,
    pub link_quality: u32,
    pub beacon_period: u16,
    pub timestamp: u64,
    pub host_timestamp: u64,
    pub capability: u16,
    /// As reported by the OS, requires /1000 to reach MHz.
    pub frequency_khz: u32,
    pub ie_offset: u32,
    pub ie_size: u32,
}

impl ScanRecord {
    pub const WIRE_SIZE: usize = 92;

    pub fn from_bytes(input: &[u8]) -> Result<ScanRecord, Error> {
        let (input, (ssid_len, ssid_bytes, bssid_bytes, _reserved1)) =
            tuple((le_u32, take(32usize), take(6usize), le_u16))(input)?;
        let (input, (phy_type, rssi, link_quality, beacon_period, _reserved2)) =
            tuple((le_u32, le_i32, le_u32, le_u16, le_u16))(input)?;
        let (input, (timestamp, host_timestamp, capability, _reserved3)) =
            tuple((le_u64, le_u64, le_u16, le_u16))(input)?;
        let (_, (frequency_khz, ie_offset, ie_size)) = tuple((le_u32, le_u32, le_u32))(input)?;

        let ssid_len = (ssid_len as usize).min(32);
        Ok(ScanRecord {
            ssid: ssid_bytes[..ssid_len].to_vec(),
            bssid: MacAddress::from_slice(bssid_bytes).unwrap_or_else(MacAddress::zeroed),
            phy_type,
            rssi,
            link_quality,
            beacon_period,
            timestamp,
            host_timestamp,
            capability,
            frequency_khz,
            ie_offset,
            ie_size,
        })
    }

    /// The IE buffer this record points into, when the offset/size pair
    /// lands inside `raw`.
    pub fn ie_slice<'a>(&self, raw: &'a [u8]) -> Option<&'a [u8]> {
        let start = self.ie_offset as usize;
        let end = start.checked_add(self.ie_size as usize)?;
        raw.get(start..end)
    }

    /// Seed a fresh descriptor from the fixed fields.
    pub fn seed(&self) -> NetworkDescriptor {
        let mut bss = NetworkDescriptor::new();
        bss.ssid = crate::util::escape_control_chars(&self.ssid);
        bss.bssid = self.bssid;
        bss.rssi = self.rssi;
        bss.link_quality = self.link_quality.min(100) as u8;
        bss.beacon_interval = self.beacon_period;
        bss.timestamp = self.timestamp;
        bss.capability = self.capability;
        bss.frequency_mhz = self.frequency_khz / 1000;
        bss
    }
}

/// Decode a live scan record: the record header sits at the start of `raw`
/// and its offset/size pair locates the trailing IE buffer in the same
/// allocation.
pub fn decode_scan_record(raw: &[u8]) -> Result<(NetworkDescriptor, Vec<DecodedElement>), Error> {
    let record = ScanRecord::from_bytes(raw)?;
    let mut bss = record.seed();
    let elements = match record.ie_slice(raw) {
        Some(ies) => {
            bss.raw_ies = ies.to_vec();
            parse_elements(ies, &mut bss)
        }
        None => {
            warn!(
                "scan record IE range {}+{} outside {} bytes",
                record.ie_offset,
                record.ie_size,
                raw.len()
            );
            Vec::new()
        }
    };
    bss.finalize();
    Ok((bss, elements))
}

/// Decode a `.bss` dump: the fixed-layout record alone, no IE buffer,
/// yielding a partially-populated descriptor.
pub fn decode_bss_file(raw: &[u8]) -> Result<NetworkDescriptor, Error> {
    let record = ScanRecord::from_bytes(raw)?;
    let mut bss = record.seed();
    bss.finalize();
    Ok(bss)
}

/// A beacon located inside a captured packet: the descriptor seed values
/// plus the IE buffer.
#[derive(Clone, Debug)]
pub struct BeaconFrame {
    pub bssid: MacAddress,
    pub source: MacAddress,
    pub timestamp: u64,
    pub beacon_interval: u16,
    pub capability: u16,
    pub radiotap: Radiotap,
    pub ies: Vec<u8>,
}

/// Locate the beacon inside a captured packet: skip the radiotap header,
/// verify the 802.11 frame type/subtype, pull the BSSID and fixed beacon
/// fields, and hand back the IE buffer. A trailing FCS (radiotap Flags bit
/// 0x10) is verified and stripped.
pub fn locate_beacon(packet: &[u8]) -> Result<BeaconFrame, Error> {
    let (rtap, frame) = radiotap::parse_radiotap(packet)?;

    let frame = if rtap.has_fcs() {
        if frame.len() < 4 {
            return Err(Error::Incomplete("frame shorter than its FCS".to_string()));
        }
        let (frame_data, fcs_bytes) = frame.split_at(frame.len() - 4);
        let crc = CRC_32.checksum(frame_data);
        let fcs = u32::from_le_bytes([fcs_bytes[0], fcs_bytes[1], fcs_bytes[2], fcs_bytes[3]]);
        if crc != fcs {
            return Err(Error::FcsMismatch(crc, fcs));
        }
        frame_data
    } else {
        frame
    };

    if frame.len() < MGMT_HEADER_LEN + 12 {
        return Err(Error::Incomplete(format!(
            "beacon needs {} bytes of header, got {}",
            MGMT_HEADER_LEN + 12,
            frame.len()
        )));
    }

    let frame_control = u16::from_le_bytes([frame[0], frame[1]]);
    let frame_type = (frame_control >> 2) & 0x03;
    let subtype = (frame_control >> 4) & 0x0F;
    if frame_type != 0 || subtype != 8 {
        return Err(Error::NotABeacon(frame_control));
    }

    let (rest, (_fc, _duration, _addr1, addr2, addr3, _seq)) = tuple((
        le_u16,
        le_u16,
        take(6usize),
        take(6usize),
        take(6usize),
        le_u16,
    ))(frame)?;
    let (rest, (timestamp, beacon_interval, capability)) =
        tuple((le_u64, le_u16, le_u16))(rest)?;

    Ok(BeaconFrame {
        bssid: MacAddress::from_slice(addr3).unwrap_or_else(MacAddress::zeroed),
        source: MacAddress::from_slice(addr2).unwrap_or_else(MacAddress::zeroed),
        timestamp,
        beacon_interval,
        capability,
        radiotap: rtap,
        ies: rest.to_vec(),
    })
}

/// Locate and fully decode a beacon out of one captured packet.
pub fn decode_beacon_packet(
    packet: &[u8],
) -> Result<(NetworkDescriptor, Vec<DecodedElement>), Error> {
    let frame = locate_beacon(packet)?;
    let mut bss = NetworkDescriptor::new();
    bss.bssid = frame.bssid;
    bss.timestamp = frame.timestamp;
    bss.beacon_interval = frame.beacon_interval;
    bss.capability = frame.capability;
    if let Some(signal) = frame.radiotap.dbm_signal {
        bss.rssi = signal as i32;
    }
    if let Some(freq) = frame.radiotap.channel_freq {
        bss.frequency_mhz = freq as u32;
    }
    bss.raw_ies = frame.ies.clone();
    let elements = parse_elements(&frame.ies, &mut bss);
    bss.finalize();
    Ok((bss, elements))
}

/// Synthesize a capture-ready frame from a populated descriptor: a minimal
/// radiotap header, a beacon MAC header (broadcast destination, the BSSID
/// as both source and BSSID), the fixed beacon fields, and the original
/// raw IE bytes unchanged.
pub fn synthesize_beacon(bss: &NetworkDescriptor) -> Vec<u8> {
    let freq = bss.frequency_mhz as u16;
    let rate = bss
        .rates
        .iter()
        .find(|r| r.mandatory)
        .map(|r| (r.rate * 2.0) as u8)
        .unwrap_or(0x02);
    let mut frame = radiotap::synthesize_radiotap(
        rate,
        freq,
        radiotap::channel_flags_for(freq),
        bss.rssi.clamp(i8::MIN as i32, i8::MAX as i32) as i8,
    );

    frame.extend_from_slice(&[0x80, 0x00]); // frame control: beacon
    frame.extend_from_slice(&[0x00, 0x00]); // duration
    frame.extend_from_slice(&MacAddress::broadcast().encode());
    frame.extend_from_slice(&bss.bssid.encode());
    frame.extend_from_slice(&bss.bssid.encode());
    frame.extend_from_slice(&[0x00, 0x00]); // sequence control
    frame.extend_from_slice(&bss.timestamp.to_le_bytes());
    frame.extend_from_slice(&bss.beacon_interval.to_le_bytes());
    frame.extend_from_slice(&bss.capability.to_le_bytes());
    frame.extend_from_slice(&bss.raw_ies);
    frame
}

/// Write one synthesized beacon per descriptor into a pcapng container.
pub fn export_pcapng<W: Write>(
    writer: W,
    networks: &[NetworkDescriptor],
) -> Result<W, Error> {
    let mut writer = PcapNgWriter::new(writer)?;
    let iface = writer.write_interface(LINKTYPE_IEEE802_11_RADIOTAP, None)?;
    for bss in networks {
        writer.write_packet(iface, bss.timestamp, &synthesize_beacon(bss))?;
    }
    Ok(writer.into_inner())
}
