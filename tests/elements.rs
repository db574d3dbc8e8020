use bssview::bss::{ChannelMarking, ChannelWidth, NetworkDescriptor, Pmf};
use bssview::elements::{parse_elements, NOT_IMPLEMENTED};
use bssview::decode_ies;

#[test]
fn walk_preserves_wire_order_and_count() {
    let buffer = [
        0, 4, b'l', b'a', b'b', b'1', // SSID
        1, 4, 0x82, 0x84, 0x8B, 0x96, // Supported rates
        3, 1, 6, // DSSS parameter set
        5, 4, 0, 3, 1, 0, // TIM
        42, 1, 4, // ERP
    ];
    let mut bss = NetworkDescriptor::new();
    let decoded = parse_elements(&buffer, &mut bss);

    assert_eq!(decoded.len(), 5);
    let ids: Vec<u8> = decoded.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![0, 1, 3, 5, 42]);
    assert_eq!(bss.ie_numbers, vec![0, 1, 3, 5, 42]);
    assert_eq!(bss.ssid, "lab1");
    assert_eq!(bss.channel_number, "6");
    assert_eq!(bss.dtim, Some(3));
    // Every record carries display text.
    assert!(decoded.iter().all(|e| !e.decoded.is_empty()));
}

#[test]
fn unknown_element_gets_placeholder_and_leaves_sink_alone() {
    let buffer = [99, 3, 1, 2, 3];
    let mut bss = NetworkDescriptor::new();
    let decoded = parse_elements(&buffer, &mut bss);

    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].name, "Undecoded");
    assert_eq!(decoded[0].decoded, NOT_IMPLEMENTED);
    assert_eq!(decoded[0].pretty_hex, "01 02 03");
    // Diagnostic ID tracking is the only trace it leaves.
    assert_eq!(bss.ie_numbers, vec![99]);
    assert_eq!(bss.security, "NONE");
    assert_eq!(bss.spatial_streams, 1);
}

#[test]
fn truncated_country_degrades_and_walk_continues() {
    let buffer = [
        7, 1, b'U', // Country, one byte instead of three
        0, 3, b'l', b'a', b'b', // SSID decodes fine afterwards
    ];
    let mut bss = NetworkDescriptor::new();
    let decoded = parse_elements(&buffer, &mut bss);

    assert_eq!(decoded.len(), 2);
    assert!(decoded[0].decoded.contains("length wrong"));
    assert_eq!(bss.ssid, "lab");
    // Presence still counts for the amendment flag.
    assert!(bss.amendments_string().contains('d'));
}

#[test]
fn lying_length_byte_is_reported_not_dropped() {
    let buffer = [
        0, 3, b'l', b'a', b'b', // good element
        5, 200, 0, 1, // TIM claiming 200 bytes with 2 available
    ];
    let mut bss = NetworkDescriptor::new();
    let decoded = parse_elements(&buffer, &mut bss);

    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[1].id, 5);
    assert_eq!(decoded[1].raw, vec![0, 1]);
}

#[test]
fn rates_round_trip_the_input_multiset() {
    // 1/2/5.5/11 basic, 18/24/36/54 supported.
    let wire = [0x82, 0x84, 0x8B, 0x96, 0x24, 0x30, 0x48, 0x6C];
    let mut buffer = vec![1, wire.len() as u8];
    buffer.extend_from_slice(&wire);

    let mut bss = NetworkDescriptor::new();
    bss.frequency_mhz = 2437;
    let decoded = parse_elements(&buffer, &mut bss);

    assert_eq!(decoded[0].decoded, "1(B) 2(B) 5.5(B) 11(B) 18 24 36 54");

    let recovered: Vec<f32> = decoded[0]
        .decoded
        .split_whitespace()
        .map(|token| token.trim_end_matches("(B)").parse().unwrap())
        .collect();
    let mut expected: Vec<f32> = wire.iter().map(|&b| (b & 0x7F) as f32 / 2.0).collect();
    expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(recovered, expected);

    // DSSS rates plus OFDM rates on 2.4 GHz: both b and g.
    assert_eq!(bss.modes_string(), "b/g");
}

#[test]
fn extended_rates_append_to_the_same_accumulator() {
    let buffer = [
        1, 4, 0x82, 0x84, 0x8B, 0x96, // 1/2/5.5/11 basic
        50, 2, 0x24, 0x30, // extended: 18, 24
    ];
    let mut bss = NetworkDescriptor::new();
    let decoded = parse_elements(&buffer, &mut bss);
    assert_eq!(bss.rates.len(), 6);
    // The extended-rates row shows the merged ascending list.
    assert_eq!(decoded[1].decoded, "1(B) 2(B) 5.5(B) 11(B) 18 24");
}

#[test]
fn ht_operation_secondary_offsets() {
    let mut bss = NetworkDescriptor::new();
    let above = [61, 22, 6, 1, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    parse_elements(&above, &mut bss);
    assert_eq!(bss.channel_number, "6");
    assert_eq!(bss.channel_width, ChannelWidth::Forty);
    assert_eq!(bss.channel_marking, ChannelMarking::Above);

    let mut bss = NetworkDescriptor::new();
    let below = [61, 3, 11, 3, 0];
    parse_elements(&below, &mut bss);
    assert_eq!(bss.channel_width, ChannelWidth::Forty);
    assert_eq!(bss.channel_marking, ChannelMarking::Below);

    let mut bss = NetworkDescriptor::new();
    let none = [61, 3, 11, 0, 0];
    parse_elements(&none, &mut bss);
    assert_eq!(bss.channel_width, ChannelWidth::Twenty);
    assert_eq!(bss.channel_marking, ChannelMarking::None);
}

#[test]
fn later_elements_override_channel_width_in_wire_order() {
    // HT operation says 40+, VHT operation upgrades to 80 and clears the
    // marking.
    let buffer = [
        61, 3, 36, 1, 0, // HT operation: 40 MHz above
        192, 5, 1, 42, 0, 0, 0, // VHT operation: 80 MHz
    ];
    let mut bss = NetworkDescriptor::new();
    bss.frequency_mhz = 5180;
    parse_elements(&buffer, &mut bss);
    assert_eq!(bss.channel_width, ChannelWidth::Eighty);
    assert_eq!(bss.channel_marking, ChannelMarking::None);
    assert_eq!(bss.modes_string(), "ac");

    // Reversed wire order: HT operation wins because it came last.
    let reversed = [
        192, 5, 1, 42, 0, 0, 0, //
        61, 3, 36, 1, 0, //
    ];
    let mut bss = NetworkDescriptor::new();
    bss.frequency_mhz = 5180;
    parse_elements(&reversed, &mut bss);
    assert_eq!(bss.channel_width, ChannelWidth::Forty);
    assert_eq!(bss.channel_marking, ChannelMarking::Above);
}

#[test]
fn vht_on_2_4ghz_does_not_claim_ac() {
    let buffer = [192, 5, 1, 42, 0, 0, 0];
    let mut bss = NetworkDescriptor::new();
    bss.frequency_mhz = 2412;
    parse_elements(&buffer, &mut bss);
    assert!(!bss.modes_string().contains("ac"));
    // The width override still applies; the element is on the wire.
    assert_eq!(bss.channel_width, ChannelWidth::Eighty);
}

#[test]
fn qbss_utilization_rounds_up() {
    let buffer = [11, 5, 12, 0, 128, 0, 0];
    let mut bss = NetworkDescriptor::new();
    parse_elements(&buffer, &mut bss);
    assert_eq!(bss.stations, Some(12));
    // ceil(128 / 255 * 100) = 51
    assert_eq!(bss.utilization, Some(51));
}

#[test]
fn rsn_sets_security_and_pmf() {
    let buffer = [
        48, 20, // RSN
        1, 0, // version
        0x00, 0x0F, 0xAC, 0x04, // group: CCMP
        1, 0, 0x00, 0x0F, 0xAC, 0x04, // pairwise: CCMP
        1, 0, 0x00, 0x0F, 0xAC, 0x02, // AKM: PSK
        0x80, 0x00, // MFPC only
    ];
    let mut bss = NetworkDescriptor::new();
    parse_elements(&buffer, &mut bss);
    assert!(bss.security.contains("PSK"));
    assert!(bss.security.contains("AES"));
    assert_eq!(bss.pmf, Pmf::Capable);
}

#[test]
fn he_operation_six_ghz_block() {
    // Extension tag, HE operation with the 6 GHz info present
    // (bit 17 of the parameter field), no optional VHT/co-hosted blocks.
    let buffer = [
        255, 12, 36, // extension, length, HE operation
        0x00, 0x00, 0x02, // params: 6 GHz op info present
        0x05, // BSS color 5
        0x00, 0x00, // basic MCS
        37, 0x02, 39, 0, 0, // 6 GHz: primary 37, 80 MHz
    ];
    let mut bss = NetworkDescriptor::new();
    bss.frequency_mhz = 6135;
    let decoded = parse_elements(&buffer, &mut bss);
    assert_eq!(decoded[0].name, "HE Operation");
    assert_eq!(bss.channel_number, "37");
    assert_eq!(bss.channel_width, ChannelWidth::Eighty);
    assert_eq!(bss.exie_numbers, vec![36]);
    assert!(bss.modes_string().contains("ax"));
}

#[test]
fn zero_length_elements_are_valid() {
    let buffer = [0, 0, 3, 1, 11];
    let mut bss = NetworkDescriptor::new();
    let decoded = parse_elements(&buffer, &mut bss);
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].decoded, "(hidden)");
    assert_eq!(bss.channel_number, "11");
}

#[test]
fn decode_ies_finalizes_once() {
    let buffer = [3, 1, 1];
    let (bss, _) = decode_ies(&buffer);
    // No frequency seeded: still rendered, as 0.000.
    assert_eq!(bss.channel_frequency, "0.000");
    assert_eq!(bss.raw_ies, buffer.to_vec());
}
