use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use bssview::bss::NetworkDescriptor;
use bssview::{decode_ies, parse_elements};

const IE_BUFFER: [u8; 202] = [
    0, 11, 98, 97, 99, 107, 98, 111, 110, 101, 45, 53, 103, // SSID "backbone-5g"
    1, 8, 140, 18, 152, 36, 176, 72, 96, 108, // Supported rates
    3, 1, 36, // DSSS parameter set
    5, 4, 0, 1, 0, 0, // TIM
    7, 6, 68, 69, 32, 36, 4, 23, // Country: DE, channels 36-39
    11, 5, 4, 0, 60, 0, 0, // BSS load
    48, 20, 1, 0, 0, 15, 172, 4, 1, 0, 0, 15, 172, 4, 1, 0, 0, 15, 172, 2, 128,
    0, // RSN: CCMP/PSK, MFPC
    45, 26, 239, 9, 23, 255, 255, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, // HT capabilities
    61, 22, 36, 5, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, // HT operation
    191, 12, 50, 0, 128, 51, 250, 255, 0, 0, 250, 255, 0, 0, // VHT capabilities
    192, 5, 1, 42, 0, 250, 255, // VHT operation: 80 MHz
    127, 8, 4, 0, 8, 2, 0, 0, 0, 64, // Extended capabilities
    221, 24, 0, 80, 242, 2, 1, 1, 132, 0, 3, 164, 0, 0, 39, 164, 0, 0, 66, 67, 94, 0, 98, 50,
    47, 0, // WMM
    255, 22, 35, 13, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 170, 255, 0,
    0, // HE capabilities
];

pub fn decode_buffer(crit: &mut Criterion) {
    let mut group = crit.benchmark_group("decoders");
    group.throughput(Throughput::Bytes(IE_BUFFER.len() as u64));

    group.bench_function("element walk", |bencher| {
        bencher.iter(|| {
            let mut bss = NetworkDescriptor::new();
            bss.frequency_mhz = 5180;
            let elements = parse_elements(black_box(&IE_BUFFER), &mut bss);
            assert_eq!(elements.len(), 14);
        })
    });

    group.bench_function("full decode with finalize", |bencher| {
        bencher.iter(|| {
            let (bss, _) = decode_ies(black_box(&IE_BUFFER));
            assert_eq!(bss.channel_number, "36");
        })
    });

    group.finish()
}

criterion_group!(benches, decode_buffer);
criterion_main!(benches);
