use cdcbridge::core::decoder::decode;
use cdcbridge::FrameExtractor;
use proptest::prelude::*;

/// Frames with nested objects but no braces inside strings.
fn frame_strategy() -> impl Strategy<Value = String> {
    (
        "[a-z0-9]{0,8}",
        -40.0f64..120.0,
        any::<u32>(),
        0usize..3,
    )
        .prop_map(|(client, temperature, fan, nesting)| {
            let mut extra = String::from("0");
            for _ in 0..nesting {
                extra = format!("{{\"inner\":{}}}", extra);
            }
            format!(
                r#"{{"client_id":"{}","event":"usb_stream","units":"C","data":{{"temperature1":{},"FAN_0":{},"extra":{}}}}}"#,
                client, temperature, fan, extra
            )
        })
}

/// Noise that never contains an opening brace.
fn noise_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 :.\r\n-]{0,12}"
}

fn extract_whole(stream: &[u8]) -> Vec<String> {
    let mut extractor = FrameExtractor::new();
    extractor.feed(stream);
    extractor.drain()
}

fn extract_chunked(stream: &[u8], cuts: &[usize]) -> Vec<String> {
    let mut extractor = FrameExtractor::new();
    let mut frames = Vec::new();
    let mut start = 0;

    for &cut in cuts {
        extractor.feed(&stream[start..cut]);
        frames.extend(extractor.drain());
        start = cut;
    }
    extractor.feed(&stream[start..]);
    frames.extend(extractor.drain());
    frames
}

proptest! {
    #[test]
    fn chunk_boundaries_do_not_change_frames(
        parts in prop::collection::vec((noise_strategy(), frame_strategy()), 1..6),
        raw_cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..12),
    ) {
        let mut stream = String::new();
        let mut expected = Vec::new();
        for (noise, frame) in &parts {
            stream.push_str(noise);
            stream.push_str(frame);
            expected.push(frame.clone());
        }
        let bytes = stream.as_bytes();

        let mut cuts: Vec<usize> = raw_cuts.iter().map(|i| i.index(bytes.len() + 1)).collect();
        cuts.sort_unstable();

        prop_assert_eq!(extract_whole(bytes), expected.clone());
        prop_assert_eq!(extract_chunked(bytes, &cuts), expected);
    }

    #[test]
    fn extracted_frames_decode(frame in frame_strategy()) {
        let frames = extract_whole(frame.as_bytes());
        prop_assert_eq!(frames.len(), 1);

        let record = decode(&frames[0]).unwrap();
        prop_assert_eq!(record.units.as_str(), "C");
        prop_assert_eq!(record, decode(&frame).unwrap());
    }
}

#[test]
fn nested_frame_spans_to_outermost_brace() {
    let frames = extract_whole(br#"xx{"data":{"a":{"b":1}},"c":2}yy{"d":3}"#);
    assert_eq!(frames, vec![r#"{"data":{"a":{"b":1}},"c":2}"#, r#"{"d":3}"#]);
}

#[test]
fn byte_by_byte_feed_matches_whole_feed() {
    let stream = br#"boot{"n":1}{"n":{"m":2}}tail{"n":"#;

    let mut extractor = FrameExtractor::new();
    let mut frames = Vec::new();
    for byte in stream.iter() {
        extractor.feed(std::slice::from_ref(byte));
        frames.extend(extractor.drain());
    }

    assert_eq!(frames, extract_whole(stream));
    assert_eq!(extractor.buffered_len(), r#"{"n":"#.len());
}

#[test]
fn oversized_frame_is_dropped_whatever_the_read_size() {
    let padding = "x".repeat(70 * 1024);
    let oversized = format!(
        r#"{{"client_id":"{}","event":"usb_stream","data":{{"FAN_0":1}}}}"#,
        padding
    );
    let next = r#"{"client_id":"ok","data":{"FAN_0":2}}"#;
    let stream = format!("{}\r\n{}", oversized, next);
    let bytes = stream.as_bytes();

    let cuts: Vec<usize> = (4096..bytes.len()).step_by(4096).collect();
    let chunked = extract_chunked(bytes, &cuts);

    assert_eq!(extract_whole(bytes), vec![next.to_string()]);
    assert_eq!(chunked, vec![next.to_string()]);
    assert_eq!(decode(&chunked[0]).unwrap().data.fan0, 2);
}
