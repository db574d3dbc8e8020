//! Small bit/byte and formatting helpers shared by the element decoders.

/// Extract a single bit out of a byte slice, LSB-first within each byte.
/// Out-of-range positions read as zero so truncated payloads stay safe.
pub fn get_bit(data: &[u8], bit_num: usize) -> bool {
    let byte_num = bit_num / 8;
    let bit_num = bit_num % 8;
    if byte_num >= data.len() {
        return false;
    }
    data[byte_num] & (1 << bit_num) > 0
}

/// Extract the bit range `[start_bit, end_bit)` as an integer, LSB-first.
pub fn get_bits(data: &[u8], start_bit: usize, end_bit: usize) -> u8 {
    let mut res = 0;
    for bit_index in start_bit..end_bit {
        if get_bit(data, bit_index) {
            res += 1 << (bit_index - start_bit);
        }
    }
    res
}

pub fn slice_to_hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hex with one space between bytes, the form shown in the element table.
pub fn pretty_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<String>>()
        .join(" ")
}

/// Render a rate in Mbps without a trailing `.0` (`5.5`, but `24` not `24.0`).
pub fn format_rate(rate: f32) -> String {
    if rate.fract() == 0.0 {
        format!("{}", rate as u32)
    } else {
        format!("{}", rate)
    }
}

/// Escape ASCII control characters for single-line display.
/// SSIDs are arbitrary bytes and real networks do embed control codes.
pub fn escape_control_chars(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if b.is_ascii_control() {
            out.push_str(&format!("\\x{:02x}", b));
        } else {
            out.push(b as char);
        }
    }
    out
}

/// Render a frequency given in MHz as a GHz string with 3 decimals.
/// `2412` -> `"2.412"`, `6855` -> `"6.855"`.
pub fn mhz_to_ghz_string(mhz: u32) -> String {
    format!("{}.{:03}", mhz / 1000, mhz % 1000)
}

/// Derive AP uptime from the beacon timestamp (microseconds since the AP's
/// TSF started) as `DDd H:MM:SS` with a zero-padded two-digit day field.
pub fn timestamp_to_uptime(timestamp_us: u64) -> String {
    let total_seconds = timestamp_us / 1_000_000;
    let days = total_seconds / 86_400;
    let rem = total_seconds % 86_400;
    let hours = rem / 3_600;
    let minutes = (rem % 3_600) / 60;
    let seconds = rem % 60;
    format!("{:02}d {}:{:02}:{:02}", days, hours, minutes, seconds)
}
