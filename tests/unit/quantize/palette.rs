use super::*;

fn pal(colors: &[u32]) -> Palette {
    Palette::new(colors.iter().copied().map(Rgb::from_u32).collect())
}

#[test]
fn capacity_rounds_up_to_power_of_two() {
    assert_eq!(pal(&[0]).capacity(), 2);
    assert_eq!(pal(&[0, 1]).capacity(), 2);
    assert_eq!(pal(&[0, 1, 2]).capacity(), 4);
    assert_eq!(pal(&[0; 256]).capacity(), 256);
}

#[test]
fn size_bits_is_log2_minus_one() {
    assert_eq!(pal(&[0, 1]).size_bits(), 0);
    assert_eq!(pal(&[0; 5]).size_bits(), 2);
    assert_eq!(pal(&[0; 256]).size_bits(), 7);
}

#[test]
fn table_is_zero_padded() {
    let p = pal(&[0x010203, 0x040506, 0x070809]);
    let mut out = ByteSink::new();
    p.write_table(&mut out);
    assert_eq!(
        out.as_slice(),
        &[1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 0, 0],
        "three colors pad to a four-entry table"
    );
}

#[test]
fn find_closest_ignores_unused_entries() {
    let mut p = pal(&[0x000000, 0xFF0000, 0x00FF00, 0x0000FF]);
    p.mark_used(1);
    p.mark_used(2);
    // Black is an exact match at index 0, but that slot is not referenced by any pixel.
    assert_eq!(p.find_closest(Rgb::BLACK), 1);
    assert_eq!(p.find_closest(Rgb::new(0, 200, 10)), 2);
}

#[test]
fn find_closest_without_used_entries_is_zero() {
    let p = pal(&[0x000000, 0xFFFFFF]);
    assert_eq!(p.find_closest(Rgb::new(255, 255, 255)), 0);
}

#[test]
fn used_mask_tracks_marks() {
    let mut p = pal(&[0, 1, 2, 3]);
    assert_eq!(p.used_count(), 0);
    p.mark_used(3);
    p.mark_used(3);
    p.mark_used(200);
    assert!(p.is_used(3));
    assert!(!p.is_used(200));
    assert_eq!(p.used_count(), 1);
}
