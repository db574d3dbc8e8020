//! PcapNg container: block-structured, little-endian, 4-byte-aligned
//! blocks. Only the three block types this crate needs are handled:
//! Section Header, Interface Description and Enhanced Packet.

use std::io::Write;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::Error;

const BLOCK_SECTION_HEADER: u32 = 0x0A0D_0D0A;
const BLOCK_INTERFACE_DESCRIPTION: u32 = 0x0000_0001;
const BLOCK_ENHANCED_PACKET: u32 = 0x0000_0006;
const BYTE_ORDER_MAGIC: u32 = 0x1A2B_3C4D;

/// Option: interface name on an Interface Description Block.
const OPT_IF_NAME: u16 = 2;
const OPT_END: u16 = 0;

fn pad_to_4(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// One parsed pcapng block.
#[derive(Clone, Debug)]
pub enum Block<'a> {
    SectionHeader,
    InterfaceDescription { linktype: u16, snaplen: u32 },
    EnhancedPacket(EnhancedPacket<'a>),
    /// Any other block type; skipped but reported so callers can count them.
    Other(u32),
}

#[derive(Clone, Copy, Debug)]
pub struct EnhancedPacket<'a> {
    pub interface_id: u32,
    /// 64-bit timestamp split high/low, in interface resolution
    /// (microseconds unless an option says otherwise).
    pub timestamp: u64,
    pub original_len: u32,
    pub data: &'a [u8],
}

/// Slice-based reader over a whole pcapng file.
pub struct PcapNgReader<'a> {
    rest: &'a [u8],
}

impl<'a> PcapNgReader<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, Error> {
        if data.len() < 12 || LittleEndian::read_u32(&data[0..4]) != BLOCK_SECTION_HEADER {
            return Err(Error::UnsupportedCapture(
                "missing pcapng section header".to_string(),
            ));
        }
        if LittleEndian::read_u32(&data[8..12]) != BYTE_ORDER_MAGIC {
            return Err(Error::UnsupportedCapture(
                "big-endian pcapng sections are not supported".to_string(),
            ));
        }
        Ok(PcapNgReader { rest: data })
    }
}

impl<'a> Iterator for PcapNgReader<'a> {
    type Item = Result<Block<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        if self.rest.len() < 12 {
            self.rest = &[];
            return Some(Err(Error::Incomplete(
                "pcapng block header needs 12 bytes".to_string(),
            )));
        }

        let block_type = LittleEndian::read_u32(&self.rest[0..4]);
        let total_len = LittleEndian::read_u32(&self.rest[4..8]) as usize;
        if total_len < 12 || total_len % 4 != 0 || total_len > self.rest.len() {
            self.rest = &[];
            return Some(Err(Error::Incomplete(format!(
                "pcapng block of type {block_type:#010x} claims {total_len} bytes"
            ))));
        }

        let body = &self.rest[8..total_len - 4];
        let trailer = LittleEndian::read_u32(&self.rest[total_len - 4..total_len]);
        self.rest = &self.rest[total_len..];
        if trailer as usize != total_len {
            return Some(Err(Error::Failure(
                "pcapng block length trailer mismatch".to_string(),
                Vec::new(),
            )));
        }

        let block = match block_type {
            BLOCK_SECTION_HEADER => Block::SectionHeader,
            BLOCK_INTERFACE_DESCRIPTION => {
                if body.len() < 8 {
                    return Some(Err(Error::Incomplete(
                        "interface description block too short".to_string(),
                    )));
                }
                Block::InterfaceDescription {
                    linktype: LittleEndian::read_u16(&body[0..2]),
                    snaplen: LittleEndian::read_u32(&body[4..8]),
                }
            }
            BLOCK_ENHANCED_PACKET => {
                if body.len() < 20 {
                    return Some(Err(Error::Incomplete(
                        "enhanced packet block too short".to_string(),
                    )));
                }
                let captured_len = LittleEndian::read_u32(&body[12..16]) as usize;
                if 20 + captured_len > body.len() {
                    return Some(Err(Error::Incomplete(
                        "enhanced packet data runs past its block".to_string(),
                    )));
                }
                let ts_high = LittleEndian::read_u32(&body[4..8]) as u64;
                let ts_low = LittleEndian::read_u32(&body[8..12]) as u64;
                Block::EnhancedPacket(EnhancedPacket {
                    interface_id: LittleEndian::read_u32(&body[0..4]),
                    timestamp: (ts_high << 32) | ts_low,
                    original_len: LittleEndian::read_u32(&body[16..20]),
                    data: &body[20..20 + captured_len],
                })
            }
            other => Block::Other(other),
        };
        Some(Ok(block))
    }
}

/// Writer that emits a Section Header up front, then interfaces and
/// packets as requested.
pub struct PcapNgWriter<W: Write> {
    writer: W,
    interfaces: u32,
}

impl<W: Write> PcapNgWriter<W> {
    pub fn new(mut writer: W) -> Result<Self, Error> {
        // Section Header Block: magic, version 1.0, unspecified length.
        let mut body = Vec::with_capacity(16);
        body.extend_from_slice(&BYTE_ORDER_MAGIC.to_le_bytes());
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes());
        body.extend_from_slice(&(-1i64).to_le_bytes());
        write_block(&mut writer, BLOCK_SECTION_HEADER, &body)?;
        Ok(PcapNgWriter {
            writer,
            interfaces: 0,
        })
    }

    /// Write an Interface Description Block, returning its interface id.
    pub fn write_interface(&mut self, linktype: u32, name: Option<&str>) -> Result<u32, Error> {
        let mut body = Vec::new();
        body.extend_from_slice(&(linktype as u16).to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes()); // reserved
        body.extend_from_slice(&0u32.to_le_bytes()); // snaplen: unlimited
        if let Some(name) = name {
            write_option(&mut body, OPT_IF_NAME, name.as_bytes());
            write_option(&mut body, OPT_END, &[]);
        }
        write_block(&mut self.writer, BLOCK_INTERFACE_DESCRIPTION, &body)?;
        let id = self.interfaces;
        self.interfaces += 1;
        Ok(id)
    }

    /// Write one frame as an Enhanced Packet Block.
    pub fn write_packet(
        &mut self,
        interface_id: u32,
        timestamp_us: u64,
        data: &[u8],
    ) -> Result<(), Error> {
        let mut body = Vec::with_capacity(20 + data.len() + 3);
        body.extend_from_slice(&interface_id.to_le_bytes());
        body.extend_from_slice(&((timestamp_us >> 32) as u32).to_le_bytes());
        body.extend_from_slice(&(timestamp_us as u32).to_le_bytes());
        body.extend_from_slice(&(data.len() as u32).to_le_bytes());
        body.extend_from_slice(&(data.len() as u32).to_le_bytes());
        body.extend_from_slice(data);
        body.extend(std::iter::repeat(0u8).take(pad_to_4(data.len())));
        write_block(&mut self.writer, BLOCK_ENHANCED_PACKET, &body)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Options are `{u16 code, u16 len, data, pad-to-4}`.
fn write_option(body: &mut Vec<u8>, code: u16, data: &[u8]) {
    body.extend_from_slice(&code.to_le_bytes());
    body.extend_from_slice(&(data.len() as u16).to_le_bytes());
    body.extend_from_slice(data);
    body.extend(std::iter::repeat(0u8).take(pad_to_4(data.len())));
}

fn write_block<W: Write>(writer: &mut W, block_type: u32, body: &[u8]) -> Result<(), Error> {
    debug_assert_eq!(body.len() % 4, 0);
    let total_len = (body.len() + 12) as u32;
    writer.write_u32::<LittleEndian>(block_type)?;
    writer.write_u32::<LittleEndian>(total_len)?;
    writer.write_all(body)?;
    writer.write_u32::<LittleEndian>(total_len)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::LINKTYPE_IEEE802_11_RADIOTAP;

    #[test]
    fn write_then_read_back() {
        let mut writer = PcapNgWriter::new(Vec::new()).unwrap();
        let iface = writer
            .write_interface(LINKTYPE_IEEE802_11_RADIOTAP, Some("wlan0"))
            .unwrap();
        writer.write_packet(iface, 1_700_000_000_000_000, &[1, 2, 3, 4, 5]).unwrap();
        let bytes = writer.into_inner();

        let reader = PcapNgReader::new(&bytes).unwrap();
        let blocks: Vec<Block> = reader.map(|b| b.unwrap()).collect();
        assert_eq!(blocks.len(), 3);
        assert!(matches!(blocks[0], Block::SectionHeader));
        assert!(matches!(
            blocks[1],
            Block::InterfaceDescription { linktype, .. } if linktype as u32 == LINKTYPE_IEEE802_11_RADIOTAP
        ));
        match &blocks[2] {
            Block::EnhancedPacket(packet) => {
                assert_eq!(packet.timestamp, 1_700_000_000_000_000);
                assert_eq!(packet.data, &[1, 2, 3, 4, 5]);
            }
            other => panic!("expected an enhanced packet, got {other:?}"),
        }
    }

    #[test]
    fn length_trailer_mismatch_is_detected() {
        let mut writer = PcapNgWriter::new(Vec::new()).unwrap();
        writer.write_interface(LINKTYPE_IEEE802_11_RADIOTAP, None).unwrap();
        let mut bytes = writer.into_inner();
        let end = bytes.len();
        bytes[end - 1] ^= 0xFF;

        let reader = PcapNgReader::new(&bytes).unwrap();
        let results: Vec<_> = reader.collect();
        assert!(results.last().unwrap().is_err());
    }
}
