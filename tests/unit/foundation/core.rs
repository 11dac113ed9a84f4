use super::*;

#[test]
fn rgb_packs_and_unpacks() {
    let c = Rgb::from_u32(0x12_34_56);
    assert_eq!(c, Rgb::new(0x12, 0x34, 0x56));
    assert_eq!(c.to_u32(), 0x12_34_56);
    assert_eq!(Rgb::from_u32(0xFF_00_00_00), Rgb::BLACK);
}

#[test]
fn rgb_distance_is_squared_euclidean() {
    assert_eq!(Rgb::new(0, 0, 0).distance_sq(Rgb::new(3, 4, 0)), 25);
    assert_eq!(Rgb::new(255, 0, 0).distance_sq(Rgb::new(255, 0, 0)), 0);
}

#[test]
fn repeat_maps_signed_counts() {
    assert_eq!(Repeat::try_from(-1).unwrap(), Repeat::Never);
    assert_eq!(Repeat::try_from(-7).unwrap(), Repeat::Never);
    assert_eq!(Repeat::try_from(0).unwrap(), Repeat::Infinite);
    assert_eq!(Repeat::try_from(3).unwrap(), Repeat::Finite(3));
    assert!(Repeat::try_from(70_000).is_err());

    assert_eq!(Repeat::Never.loop_count(), None);
    assert_eq!(Repeat::Infinite.loop_count(), Some(0));
    assert_eq!(Repeat::Finite(5).loop_count(), Some(5));
    assert_eq!(i32::from(Repeat::Never), -1);
}

#[test]
fn disposal_rejects_reserved_codes() {
    assert_eq!(Disposal::try_from(2).unwrap(), Disposal::Background);
    assert_eq!(Disposal::Previous.code(), 3);
    assert!(Disposal::try_from(4).is_err());
}

#[test]
fn frame_length_is_checked() {
    assert!(FrameRgba::new(2, 2, vec![0; 16]).is_ok());
    let err = FrameRgba::new(2, 2, vec![0; 12]).unwrap_err();
    assert!(matches!(
        err,
        GifError::InvalidFrameSize {
            expected: 16,
            actual: 12
        }
    ));
}

#[test]
fn solid_frame_is_opaque() {
    let f = FrameRgba::solid(3, 1, Rgb::new(1, 2, 3));
    assert_eq!(f.data, vec![1, 2, 3, 255, 1, 2, 3, 255, 1, 2, 3, 255]);
}

#[test]
fn frame_from_image_copies_pixels() {
    let img = image::RgbaImage::from_pixel(2, 1, image::Rgba([9, 8, 7, 0]));
    let f = FrameRgba::from_rgba_image(&img);
    assert_eq!((f.width, f.height), (2, 1));
    assert_eq!(f.data, vec![9, 8, 7, 0, 9, 8, 7, 0]);
}
