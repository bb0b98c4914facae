use apng_assembler::apng::{
    make_chunk, parse, ApngEncoder, Chunks, EncodedPng, FrameOptions, FrameSource, ImageHeader,
    RgbaFrame, SIGNATURE,
};
use rgb::RGBA8;

fn pixel(color: RGBA8) -> RgbaFrame {
    RgbaFrame::new(1, 1, vec![color]).unwrap()
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

const COLORS: [RGBA8; 3] = [
    RGBA8 { r: 255, g: 0, b: 0, a: 255 },
    RGBA8 { r: 0, g: 255, b: 0, a: 255 },
    RGBA8 { r: 0, g: 0, b: 255, a: 128 },
];

fn three_frames() -> (Vec<u8>, Vec<u8>) {
    let first = pixel(COLORS[0]).encode_png().unwrap();
    let mut encoder = ApngEncoder::new();
    encoder
        .add_encoded(first.clone(), FrameOptions::new(100))
        .unwrap();
    encoder
        .add_frame(&pixel(COLORS[1]), FrameOptions::new(200))
        .unwrap();
    encoder
        .add_frame(&pixel(COLORS[2]), FrameOptions::new(150))
        .unwrap();
    assert_eq!(encoder.len(), 3);
    (encoder.finish(), first)
}

#[test]
fn three_single_pixel_frames() {
    let (apng, first) = three_frames();
    assert!(apng.starts_with(&SIGNATURE));

    let chunks: Vec<_> = Chunks::new(&apng).collect();
    let tags: Vec<[u8; 4]> = chunks.iter().map(|c| c.tag).collect();
    assert_eq!(
        tags,
        vec![
            *b"IHDR", *b"acTL", *b"fcTL", *b"IDAT", *b"fcTL", *b"fdAT", *b"fcTL", *b"fdAT",
            *b"IEND",
        ]
    );

    // IHDR 与第一帧逐字节一致
    assert_eq!(chunks[0].raw, &first[8..33]);
    assert_eq!(be_u32(chunks[1].data), 3);
    assert_eq!(be_u32(&chunks[1].data[4..]), 0);

    let delays: Vec<u16> = chunks
        .iter()
        .filter(|c| &c.tag == b"fcTL")
        .map(|c| u16::from_be_bytes([c.data[20], c.data[21]]))
        .collect();
    assert_eq!(delays, vec![100, 200, 150]);

    let fdat_sequences: Vec<u32> = chunks
        .iter()
        .filter(|c| &c.tag == b"fdAT")
        .map(|c| be_u32(c.data))
        .collect();
    assert_eq!(fdat_sequences, vec![2, 4]);

    let last = chunks.last().unwrap();
    assert_eq!(&last.tag, b"IEND");
    assert!(last.data.is_empty());
    assert_eq!(apng.len(), last.offset + 12);
}

#[test]
fn sequence_numbers_have_no_gaps() {
    let (apng, _) = three_frames();
    let sequences: Vec<u32> = Chunks::new(&apng)
        .filter(|c| &c.tag == b"fcTL" || &c.tag == b"fdAT")
        .map(|c| be_u32(c.data))
        .collect();
    let expected: Vec<u32> = (0..sequences.len() as u32).collect();
    assert_eq!(sequences, expected);
    assert_eq!(parse(&apng).unwrap().sequence_numbers(), &expected[..]);
}

#[test]
fn png_crate_decodes_the_animation() {
    let (apng, _) = three_frames();
    let decoder = png::Decoder::new(&apng[..]);
    let mut reader = decoder.read_info().unwrap();

    let control = reader.info().animation_control.unwrap();
    assert_eq!(control.num_frames, 3);
    assert_eq!(control.num_plays, 0);

    let mut buf = vec![0; reader.output_buffer_size()];
    for (expected, delay) in COLORS.iter().zip([100u16, 200, 150]) {
        let output = reader.next_frame(&mut buf).unwrap();
        assert_eq!(output.buffer_size(), 4);
        assert_eq!(&buf[..4], &[expected.r, expected.g, expected.b, expected.a]);

        let fctl = reader.info().frame_control().unwrap();
        assert_eq!((fctl.width, fctl.height), (1, 1));
        assert_eq!(fctl.delay_num, delay);
        assert_eq!(fctl.delay_den, 1000);
    }
}

#[test]
fn parsed_frames_round_trip_to_pixels() {
    let (apng, _) = three_frames();
    let animation = parse(&apng).unwrap();
    assert_eq!(animation.frames.len(), 3);
    assert_eq!(animation.play_time_ms, 450);

    for (frame, expected) in animation.frames.iter().zip(COLORS) {
        let still = RgbaFrame::decode(&frame.to_png(&animation)).unwrap();
        assert_eq!(still.pixels, vec![expected]);
    }
}

#[test]
fn split_idat_in_first_frame_stays_split() {
    // 把一张真实 PNG 的 IDAT 拆成两块
    let still = RgbaFrame::new(4, 4, vec![RGBA8::new(7, 8, 9, 255); 16])
        .unwrap()
        .encode_png()
        .unwrap();
    let idat = Chunks::new(&still).find(|c| &c.tag == b"IDAT").unwrap();
    let (left, right) = idat.data.split_at(idat.data.len() / 2);

    let mut split = still[..33].to_vec();
    split.extend(make_chunk(b"IDAT", left));
    split.extend(make_chunk(b"IDAT", right));
    split.extend(make_chunk(b"IEND", &[]));

    let mut encoder = ApngEncoder::new();
    encoder
        .add_frame(&EncodedPng(split), FrameOptions::default())
        .unwrap();
    let apng = encoder.finish();

    let idats: Vec<&[u8]> = Chunks::new(&apng)
        .filter(|c| &c.tag == b"IDAT")
        .map(|c| c.data)
        .collect();
    assert_eq!(idats, vec![left, right]);
    assert!(Chunks::new(&apng).all(|c| &c.tag != b"fdAT"));

    let decoded = RgbaFrame::decode(&apng).unwrap();
    assert_eq!(decoded.pixels, vec![RGBA8::new(7, 8, 9, 255); 16]);
}

#[test]
fn frame_dimensions_come_from_the_header() {
    let frame = RgbaFrame::new(5, 3, vec![RGBA8::new(0, 0, 0, 0); 15]).unwrap();
    let mut encoder = ApngEncoder::new();
    encoder.add_frame(&frame, FrameOptions::default()).unwrap();
    encoder.add_frame(&frame, FrameOptions::default()).unwrap();
    let apng = encoder.finish();

    let header = ImageHeader::parse(&apng).unwrap();
    assert_eq!((header.width, header.height), (5, 3));
    for fctl in Chunks::new(&apng).filter(|c| &c.tag == b"fcTL") {
        assert_eq!(be_u32(&fctl.data[4..]), 5);
        assert_eq!(be_u32(&fctl.data[8..]), 3);
    }
}

#[test]
fn mismatched_sizes_are_rejected() {
    let mut encoder = ApngEncoder::new();
    encoder
        .add_frame(&pixel(COLORS[0]), FrameOptions::default())
        .unwrap();
    let bigger = RgbaFrame::new(2, 1, vec![COLORS[1]; 2]).unwrap();
    assert!(encoder.add_frame(&bigger, FrameOptions::default()).is_err());
    assert_eq!(encoder.len(), 1);
}

#[test]
fn zero_frames_yield_empty_output() {
    assert!(ApngEncoder::new().with_plays(5).finish().is_empty());
}
