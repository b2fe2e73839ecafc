use super::*;

#[test]
fn test_merge_covers_both() {
    let merged = Span::new(4, 9).merge(Span::new(1, 6));
    assert_eq!(merged, Span::new(1, 9));
}

#[test]
fn test_point_is_empty() {
    let p = Span::point(7);
    assert!(p.is_empty());
    assert_eq!(p.len(), 0);
}

#[test]
fn test_slice_out_of_bounds_is_empty() {
    assert_eq!(Span::new(0, 3).slice("a := 1"), "a :");
    assert_eq!(Span::new(10, 12).slice("a"), "");
}

#[test]
fn test_display_matches_debug() {
    let span = Span::new(3, 8);
    assert_eq!(format!("{span}"), "3..8");
    assert_eq!(format!("{span:?}"), "3..8");
}
