use std::fmt;
use std::str::FromStr;

/// This is our representation of a MAC-address
///
/// ```
/// use bssview::bss::MacAddress;
///
/// let address = MacAddress([255, 255, 255, 255, 255, 255]);
/// println!("{}", address.is_broadcast());
/// // -> true
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Copy, Ord, PartialOrd, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub fn from_slice(bytes: &[u8]) -> Option<MacAddress> {
        if bytes.len() == 6 {
            let mut arr = [0u8; 6];
            arr.copy_from_slice(bytes);
            Some(MacAddress(arr))
        } else {
            None
        }
    }

    pub fn broadcast() -> Self {
        MacAddress([255, 255, 255, 255, 255, 255])
    }

    pub fn zeroed() -> Self {
        MacAddress([0, 0, 0, 0, 0, 0])
    }

    pub fn is_broadcast(&self) -> bool {
        self.0 == [255, 255, 255, 255, 255, 255]
    }

    /// The vendor-assigned prefix, rendered `xx:xx:xx`.
    pub fn oui_string(&self) -> String {
        format!("{:02x}:{:02x}:{:02x}", self.0[0], self.0[1], self.0[2])
    }

    pub fn encode(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5],
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacParseError;

impl fmt::Display for MacParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid MAC address format")
    }
}

impl std::error::Error for MacParseError {}

impl FromStr for MacAddress {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut arr = [0u8; 6];
        let mut count = 0;
        for part in s.split([':', '-']) {
            if count >= 6 {
                return Err(MacParseError);
            }
            arr[count] = u8::from_str_radix(part, 16).map_err(|_| MacParseError)?;
            count += 1;
        }
        if count != 6 {
            return Err(MacParseError);
        }
        Ok(MacAddress(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let mac: MacAddress = "aa:bb:cc:00:11:22".parse().unwrap();
        assert_eq!(mac.to_string(), "aa:bb:cc:00:11:22");
        assert_eq!(mac.oui_string(), "aa:bb:cc");
        assert!("aa:bb:cc:00:11".parse::<MacAddress>().is_err());
        assert!("zz:bb:cc:00:11:22".parse::<MacAddress>().is_err());
    }
}
