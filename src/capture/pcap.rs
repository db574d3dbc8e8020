//! Legacy pcap container: a 24-byte global header followed by 16-byte
//! per-record headers. Both endiannesses and both timestamp resolutions
//! are detected from the magic number.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TsResolution {
    MicroSecond,
    NanoSecond,
}

/// Pcap global header.
#[derive(Clone, Copy, Debug)]
pub struct PcapHeader {
    pub version_major: u16,
    pub version_minor: u16,
    pub snaplen: u32,
    pub datalink: u32,
    pub ts_resolution: TsResolution,
    pub endianness: Endianness,
}

/// One captured record: the raw packet bytes plus its timestamp.
#[derive(Clone, Copy, Debug)]
pub struct PcapRecord<'a> {
    pub ts_sec: u32,
    /// Fractional part, in the resolution the file header declares.
    pub ts_frac: u32,
    pub original_len: u32,
    pub data: &'a [u8],
}

/// Slice-based reader over a whole pcap file.
pub struct PcapReader<'a> {
    pub header: PcapHeader,
    rest: &'a [u8],
}

impl<'a> PcapReader<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, Error> {
        if data.len() < 24 {
            return Err(Error::Incomplete(
                "pcap global header needs 24 bytes".to_string(),
            ));
        }

        let magic = BigEndian::read_u32(&data[0..4]);
        let (endianness, ts_resolution) = match magic {
            0xA1B2C3D4 => (Endianness::Big, TsResolution::MicroSecond),
            0xA1B23C4D => (Endianness::Big, TsResolution::NanoSecond),
            0xD4C3B2A1 => (Endianness::Little, TsResolution::MicroSecond),
            0x4D3CB2A1 => (Endianness::Little, TsResolution::NanoSecond),
            _ => {
                return Err(Error::UnsupportedCapture(format!(
                    "pcap magic number {magic:#010x}"
                )))
            }
        };

        let header = match endianness {
            Endianness::Big => read_header::<BigEndian>(data, endianness, ts_resolution),
            Endianness::Little => read_header::<LittleEndian>(data, endianness, ts_resolution),
        };

        Ok(PcapReader {
            header,
            rest: &data[24..],
        })
    }

    fn next_record<B: ByteOrder>(&mut self) -> Option<Result<PcapRecord<'a>, Error>> {
        if self.rest.is_empty() {
            return None;
        }
        if self.rest.len() < 16 {
            self.rest = &[];
            return Some(Err(Error::Incomplete(
                "pcap record header needs 16 bytes".to_string(),
            )));
        }
        let ts_sec = B::read_u32(&self.rest[0..4]);
        let ts_frac = B::read_u32(&self.rest[4..8]);
        let captured_len = B::read_u32(&self.rest[8..12]) as usize;
        let original_len = B::read_u32(&self.rest[12..16]);
        if self.rest.len() < 16 + captured_len {
            self.rest = &[];
            return Some(Err(Error::Incomplete(format!(
                "pcap record claims {captured_len} bytes of data"
            ))));
        }
        let data = &self.rest[16..16 + captured_len];
        self.rest = &self.rest[16 + captured_len..];
        Some(Ok(PcapRecord {
            ts_sec,
            ts_frac,
            original_len,
            data,
        }))
    }
}

fn read_header<B: ByteOrder>(
    data: &[u8],
    endianness: Endianness,
    ts_resolution: TsResolution,
) -> PcapHeader {
    PcapHeader {
        version_major: B::read_u16(&data[4..6]),
        version_minor: B::read_u16(&data[6..8]),
        // ts_correction and ts_accuracy are always zero, skip them.
        snaplen: B::read_u32(&data[16..20]),
        datalink: B::read_u32(&data[20..24]),
        ts_resolution,
        endianness,
    }
}

impl<'a> Iterator for PcapReader<'a> {
    type Item = Result<PcapRecord<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.header.endianness {
            Endianness::Big => self.next_record::<BigEndian>(),
            Endianness::Little => self.next_record::<LittleEndian>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::LINKTYPE_IEEE802_11_RADIOTAP;

    fn little_endian_file(payload: &[u8]) -> Vec<u8> {
        let mut file = Vec::new();
        file.extend_from_slice(&0xA1B2C3D4u32.to_le_bytes());
        file.extend_from_slice(&2u16.to_le_bytes());
        file.extend_from_slice(&4u16.to_le_bytes());
        file.extend_from_slice(&0i32.to_le_bytes());
        file.extend_from_slice(&0u32.to_le_bytes());
        file.extend_from_slice(&65535u32.to_le_bytes());
        file.extend_from_slice(&LINKTYPE_IEEE802_11_RADIOTAP.to_le_bytes());
        file.extend_from_slice(&100u32.to_le_bytes()); // ts_sec
        file.extend_from_slice(&7u32.to_le_bytes()); // ts_usec
        file.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        file.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        file.extend_from_slice(payload);
        file
    }

    #[test]
    fn reads_little_endian_microsecond_file() {
        let file = little_endian_file(&[1, 2, 3, 4]);
        let mut reader = PcapReader::new(&file).unwrap();
        assert_eq!(reader.header.endianness, Endianness::Little);
        assert_eq!(reader.header.ts_resolution, TsResolution::MicroSecond);
        assert_eq!(reader.header.datalink, LINKTYPE_IEEE802_11_RADIOTAP);

        let record = reader.next().unwrap().unwrap();
        assert_eq!(record.ts_sec, 100);
        assert_eq!(record.data, &[1, 2, 3, 4]);
        assert!(reader.next().is_none());
    }

    #[test]
    fn truncated_record_is_an_error_not_a_panic() {
        let mut file = little_endian_file(&[1, 2, 3, 4]);
        file.truncate(file.len() - 2);
        let mut reader = PcapReader::new(&file).unwrap();
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn bad_magic_is_rejected() {
        let file = [0u8; 24];
        assert!(matches!(
            PcapReader::new(&file),
            Err(Error::UnsupportedCapture(_))
        ));
    }
}
