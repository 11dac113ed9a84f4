use super::*;

const RED: [u8; 4] = [0xFF, 0, 0, 0xFF];

fn settings() -> FrameSettings {
    FrameSettings {
        delay_cs: 0,
        disposal: None,
        transparent: None,
        sample_factor: 10,
        repeat: Repeat::Never,
    }
}

fn solid(w: usize, h: usize, px: [u8; 4]) -> Vec<u8> {
    px.repeat(w * h)
}

/// Offset just past header, screen descriptor and a 256-entry global table.
const AFTER_GLOBAL_TABLE: usize = 6 + 7 + 256 * 3;

#[test]
fn start_is_allowed_once() {
    let mut w = ContainerWriter::new(2, 2);
    assert_eq!(w.state(), WriterState::NotStarted);
    w.start().unwrap();
    assert_eq!(w.state(), WriterState::Started);
    assert!(matches!(w.start(), Err(GifError::AlreadyStarted)));
    assert_eq!(w.pending(), b"GIF89a");
}

#[test]
fn frames_require_a_started_stream() {
    let mut w = ContainerWriter::new(2, 2);
    let err = w.write_frame(&solid(2, 2, RED), &settings()).unwrap_err();
    assert!(matches!(err, GifError::Validation(_)));
}

#[test]
fn wrong_frame_length_is_rejected() {
    let mut w = ContainerWriter::new(2, 2);
    w.start().unwrap();
    let err = w.write_frame(&[0u8; 12], &settings()).unwrap_err();
    assert!(matches!(
        err,
        GifError::InvalidFrameSize {
            expected: 16,
            actual: 12
        }
    ));
    assert_eq!(w.frames_written(), 0);
}

#[test]
fn first_frame_layout_without_loop() {
    let mut w = ContainerWriter::new(2, 2);
    w.start().unwrap();
    let report = w.write_frame(&solid(2, 2, RED), &settings()).unwrap();
    w.finish().unwrap();
    let out = w.take_output();

    assert_eq!(&out[..6], b"GIF89a");
    assert_eq!(&out[6..13], &[2, 0, 2, 0, 0xF7, 0, 0]);

    let gce = &out[AFTER_GLOBAL_TABLE..AFTER_GLOBAL_TABLE + 8];
    assert_eq!(gce, &[0x21, 0xF9, 0x04, 0x00, 0, 0, 0, 0x00]);

    let desc = &out[AFTER_GLOBAL_TABLE + 8..AFTER_GLOBAL_TABLE + 18];
    assert_eq!(desc, &[0x2C, 0, 0, 0, 0, 2, 0, 2, 0, 0x00]);
    assert_eq!(out[AFTER_GLOBAL_TABLE + 18], 8, "lzw minimum code size");

    assert_eq!(out.last(), Some(&0x3B));
    assert_eq!(report.palette_len, 256);
    assert_eq!(report.used_colors, 1);
    assert_eq!(report.transparent_index, None);
    assert_eq!(w.state(), WriterState::Finished);
}

#[test]
fn loop_extension_follows_global_table() {
    let mut w = ContainerWriter::new(2, 2);
    w.start().unwrap();
    let s = FrameSettings {
        repeat: Repeat::Finite(3),
        delay_cs: 50,
        ..settings()
    };
    w.write_frame(&solid(2, 2, RED), &s).unwrap();
    let out = w.take_output();
    let ext = &out[AFTER_GLOBAL_TABLE..AFTER_GLOBAL_TABLE + 19];
    let mut expected = vec![0x21, 0xFF, 0x0B];
    expected.extend_from_slice(b"NETSCAPE2.0");
    expected.extend_from_slice(&[0x03, 0x01, 3, 0, 0x00]);
    assert_eq!(ext, expected.as_slice());
    let gce = &out[AFTER_GLOBAL_TABLE + 19..AFTER_GLOBAL_TABLE + 27];
    assert_eq!(gce, &[0x21, 0xF9, 0x04, 0x00, 50, 0, 0, 0x00]);
}

#[test]
fn later_frames_carry_local_tables() {
    let mut w = ContainerWriter::new(2, 2);
    w.start().unwrap();
    w.write_frame(&solid(2, 2, RED), &settings()).unwrap();
    assert_eq!(w.state(), WriterState::FirstFrameWritten);
    w.take_output();

    w.write_frame(&solid(2, 2, [0, 0xFF, 0, 0xFF]), &settings())
        .unwrap();
    assert_eq!(w.state(), WriterState::SubsequentFrameWritten);
    let out = w.take_output();
    // GCE, then a descriptor flagging a 256-entry local table, then the table itself.
    assert_eq!(&out[..3], &[0x21, 0xF9, 0x04]);
    assert_eq!(&out[8..18], &[0x2C, 0, 0, 0, 0, 2, 0, 2, 0, 0x87]);
    assert_eq!(out[18 + 768], 8);
}

#[test]
fn transparency_sets_flag_and_default_disposal() {
    let mut w = ContainerWriter::new(2, 1);
    w.start().unwrap();
    let s = FrameSettings {
        transparent: Some(Rgb::BLACK),
        ..settings()
    };
    let rgba = [0xFF, 0, 0, 0xFF, 0xFF, 0, 0, 0x00];
    let report = w.write_frame(&rgba, &s).unwrap();
    let out = w.take_output();
    let gce = &out[AFTER_GLOBAL_TABLE..AFTER_GLOBAL_TABLE + 8];
    let ti = report.transparent_index.unwrap();
    assert_eq!(gce, &[0x21, 0xF9, 0x04, (2 << 2) | 1, 0, 0, ti, 0x00]);
}

#[test]
fn explicit_disposal_overrides_default() {
    let s = FrameSettings {
        transparent: Some(Rgb::BLACK),
        disposal: Some(Disposal::Keep),
        ..settings()
    };
    assert_eq!(s.effective_disposal(), Disposal::Keep);
    assert_eq!(settings().effective_disposal(), Disposal::Unspecified);
    assert_eq!(
        FrameSettings {
            transparent: Some(Rgb::BLACK),
            ..settings()
        }
        .effective_disposal(),
        Disposal::Background
    );
}

#[test]
fn find_closest_needs_a_palette() {
    let mut w = ContainerWriter::new(2, 2);
    assert_eq!(w.find_closest(Rgb::BLACK), None);
    w.start().unwrap();
    w.write_frame(&solid(2, 2, RED), &settings()).unwrap();
    let idx = w.find_closest(Rgb::new(250, 10, 10)).unwrap();
    assert_eq!(w.palette().unwrap().get(idx), Some(Rgb::new(255, 0, 0)));
}

#[test]
fn nothing_is_accepted_after_finish() {
    let mut w = ContainerWriter::new(2, 2);
    w.start().unwrap();
    w.finish().unwrap();
    assert!(matches!(
        w.write_frame(&solid(2, 2, RED), &settings()),
        Err(GifError::SessionAlreadyFinished)
    ));
    assert!(matches!(w.finish(), Err(GifError::SessionAlreadyFinished)));
    assert!(matches!(w.start(), Err(GifError::SessionAlreadyFinished)));
}
