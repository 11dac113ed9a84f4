use super::*;
use crate::encode::output::{OutputEvent, channel_output};

struct Decoded {
    delays: Vec<u16>,
    transparent: Vec<Option<u8>>,
    indices: Vec<Vec<u8>>,
}

fn decode(bytes: &[u8]) -> Decoded {
    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::Indexed);
    let mut dec = opts.read_info(std::io::Cursor::new(bytes)).unwrap();
    let mut out = Decoded {
        delays: Vec::new(),
        transparent: Vec::new(),
        indices: Vec::new(),
    };
    while let Some(frame) = dec.read_next_frame().unwrap() {
        out.delays.push(frame.delay);
        out.transparent.push(frame.transparent);
        out.indices.push(frame.buffer.to_vec());
    }
    out
}

fn solid(w: usize, h: usize, px: [u8; 4]) -> Vec<u8> {
    px.repeat(w * h)
}

#[test]
fn dimensions_are_validated() {
    assert!(matches!(
        GifEncoder::new(0, 4),
        Err(GifError::InvalidDimensions {
            width: 0,
            height: 4
        })
    ));
    assert!(GifEncoder::new(4, 0).is_err());
    assert!(GifEncoder::new(70_000, 1).is_err());
    let enc = GifEncoder::new(3, 5).unwrap();
    assert_eq!((enc.width(), enc.height()), (3, 5));
}

#[test]
fn frames_auto_start_the_stream() {
    let mut enc = GifEncoder::new(2, 2).unwrap();
    assert!(!enc.is_started());
    enc.add_frame(&solid(2, 2, [9, 9, 9, 255])).unwrap();
    assert!(enc.is_started());
    assert_eq!(&enc.bytes()[..6], b"GIF89a");
    assert_eq!(enc.bytes().last(), Some(&0x00));
}

#[test]
fn trailer_only_after_finish() {
    let mut enc = GifEncoder::new(2, 2).unwrap();
    enc.start().unwrap();
    enc.add_frame(&solid(2, 2, [255, 0, 0, 255])).unwrap();
    assert_ne!(enc.bytes().last(), Some(&0x3B));
    enc.finish().unwrap();
    assert!(enc.is_finished());
    assert_eq!(enc.bytes().last(), Some(&0x3B));
    assert_eq!(decode(enc.bytes()).delays.len(), 1);
}

#[test]
fn finished_session_rejects_more_work() {
    let mut enc = GifEncoder::new(2, 2).unwrap();
    enc.finish().unwrap();
    assert_eq!(enc.bytes(), b"GIF89a;");
    assert!(matches!(
        enc.add_frame(&solid(2, 2, [0, 0, 0, 255])),
        Err(GifError::SessionAlreadyFinished)
    ));
    assert!(matches!(enc.finish(), Err(GifError::SessionAlreadyFinished)));
}

#[test]
fn wrong_frame_size_is_reported() {
    let mut enc = GifEncoder::new(2, 2).unwrap();
    assert!(matches!(
        enc.add_frame(&[0; 15]),
        Err(GifError::InvalidFrameSize {
            expected: 16,
            actual: 15
        })
    ));
}

#[test]
fn last_delay_before_a_frame_wins() {
    let mut enc = GifEncoder::new(2, 2).unwrap();
    enc.set_delay(100);
    enc.set_delay(250);
    enc.add_frame(&solid(2, 2, [1, 2, 3, 255])).unwrap();
    enc.set_frame_rate(20.0).unwrap();
    enc.add_frame(&solid(2, 2, [1, 2, 3, 255])).unwrap();
    enc.finish().unwrap();
    assert_eq!(decode(enc.bytes()).delays, vec![25, 5]);
}

#[test]
fn settings_apply_from_the_next_frame() {
    let mut enc = GifEncoder::new(2, 1).unwrap();
    let px = [0xFF, 0, 0, 0xFF, 0xFF, 0, 0, 0x00];
    enc.add_frame(&px).unwrap();
    enc.set_transparent(Some(Rgb::BLACK));
    enc.add_frame(&px).unwrap();
    enc.finish().unwrap();

    let d = decode(enc.bytes());
    assert_eq!(d.transparent[0], None);
    let ti = d.transparent[1].expect("second frame is transparent");
    assert_eq!(d.indices[1][1], ti);
}

#[test]
fn transparent_pixels_take_the_transparent_index() {
    let mut enc = GifEncoder::new(3, 1).unwrap();
    enc.set_transparent(Some(Rgb::BLACK));
    // The hidden pixel is white, nowhere near the black transparent color.
    let px = [
        0xFF, 0, 0, 0xFF, //
        0xFF, 0xFF, 0xFF, 0x00, //
        0, 0, 0xFF, 0xFF,
    ];
    let report = enc.add_frame(&px).unwrap();
    enc.finish().unwrap();

    let ti = report.transparent_index.unwrap();
    let d = decode(enc.bytes());
    assert_eq!(d.transparent[0], Some(ti));
    assert_eq!(d.indices[0][1], ti);
    assert_eq!(enc.find_closest(Rgb::BLACK), Some(ti));
}

#[test]
fn find_closest_before_any_frame_is_none() {
    let enc = GifEncoder::new(2, 2).unwrap();
    assert_eq!(enc.find_closest(Rgb::BLACK), None);
    assert!(enc.palette().is_none());
}

#[test]
fn quality_is_clamped_not_rejected() {
    let mut enc = GifEncoder::new(2, 2).unwrap();
    enc.set_quality(0);
    assert_eq!(enc.settings().sample_factor, 1);
    enc.set_quality(-20);
    assert_eq!(enc.settings().sample_factor, 1);
}

#[test]
fn outputs_receive_every_chunk_in_order() {
    let mut enc = GifEncoder::new(2, 2).unwrap();
    enc.start().unwrap();
    let (out, rx) = channel_output();
    enc.add_output(out).unwrap();
    enc.add_frame(&solid(2, 2, [0, 255, 0, 255])).unwrap();
    enc.add_frame(&solid(2, 2, [0, 0, 255, 255])).unwrap();
    enc.finish().unwrap();

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(events.len(), 5, "header, two frames, trailer, finished");
    assert_eq!(events.last(), Some(&OutputEvent::Finished));
    let mut stream = Vec::new();
    for e in &events {
        if let OutputEvent::Bytes(b) = e {
            stream.extend_from_slice(b);
        }
    }
    assert_eq!(&stream[..6], b"GIF89a");
    assert_eq!(stream.last(), Some(&0x3B));
    assert!(enc.bytes().is_empty());
    assert_eq!(decode(&stream).delays.len(), 2);
}

#[test]
fn options_apply_at_construction() {
    let opts = EncoderOptions {
        delay_ms: 500,
        repeat: Repeat::Infinite,
        quality: 40,
        ..EncoderOptions::default()
    };
    let enc = GifEncoder::with_options(4, 4, &opts).unwrap();
    assert_eq!(enc.settings().delay_cs, 50);
    assert_eq!(enc.settings().repeat, Repeat::Infinite);
    assert_eq!(enc.settings().sample_factor, 30);
}

#[test]
fn failing_output_does_not_corrupt_the_others() {
    use crate::encode::output::CallbackOutput;
    use std::sync::{Arc, Mutex};

    let mut enc = GifEncoder::new(2, 2).unwrap();
    let calls = Arc::new(Mutex::new(0u32));
    let seen = Arc::clone(&calls);
    enc.add_output(CallbackOutput::new(move |_chunk: &[u8]| {
        let mut n = seen.lock().unwrap();
        *n += 1;
        // Header goes through, the first frame is refused, later chunks are accepted.
        if *n == 2 {
            Err(GifError::sink("transient"))
        } else {
            Ok(())
        }
    }))
    .unwrap();
    let collected = Arc::new(Mutex::new(Vec::new()));
    let store = Arc::clone(&collected);
    enc.add_output(CallbackOutput::new(move |chunk: &[u8]| {
        store.lock().unwrap().extend_from_slice(chunk);
        Ok(())
    }))
    .unwrap();

    enc.start().unwrap();
    assert!(matches!(
        enc.add_frame(&solid(2, 2, [255, 0, 0, 255])),
        Err(GifError::Sink(_))
    ));
    enc.add_frame(&solid(2, 2, [0, 255, 0, 255])).unwrap();
    enc.finish().unwrap();

    let bytes = collected.lock().unwrap().clone();
    assert_eq!(decode(&bytes).delays.len(), 2);
    assert_eq!(*calls.lock().unwrap(), 4);
}

#[test]
fn every_output_is_finished_even_when_one_fails() {
    use crate::encode::output::OutputSink;

    struct FailingFinish;
    impl OutputSink for FailingFinish {
        fn write_chunk(&mut self, _chunk: &[u8]) -> GifResult<()> {
            Ok(())
        }
        fn finish(&mut self) -> GifResult<()> {
            Err(GifError::sink("close failed"))
        }
    }

    let mut enc = GifEncoder::new(2, 2).unwrap();
    enc.add_output(FailingFinish).unwrap();
    let (out, rx) = channel_output();
    enc.add_output(out).unwrap();
    enc.add_frame(&solid(2, 2, [1, 1, 1, 255])).unwrap();

    assert!(matches!(enc.finish(), Err(GifError::Sink(_))));
    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(events.last(), Some(&OutputEvent::Finished));
    assert!(enc.is_finished());
}
