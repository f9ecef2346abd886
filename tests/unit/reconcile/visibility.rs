use super::*;

const VIEW: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

#[test]
fn rect_overlap_and_touching() {
    assert!(rect_visible(VIEW, Rect::new(90.0, 90.0, 120.0, 120.0)));
    assert!(rect_visible(VIEW, Rect::new(100.0, 0.0, 110.0, 10.0)));
    assert!(!rect_visible(VIEW, Rect::new(101.0, 0.0, 110.0, 10.0)));
    assert!(!rect_visible(VIEW, Rect::new(-20.0, -20.0, -1.0, -1.0)));
}

#[test]
fn edge_with_one_visible_endpoint_is_kept() {
    let inside = Point::new(50.0, 50.0);
    let outside = Point::new(500.0, 50.0);
    assert!(edge_visible(VIEW, inside, outside, 2));
    assert!(edge_visible(VIEW, outside, inside, 3));
}

#[test]
fn edge_crossing_view_is_kept_with_midpoint_sample() {
    let left = Point::new(-100.0, 50.0);
    let right = Point::new(200.0, 50.0);
    assert!(!edge_visible(VIEW, left, right, 2));
    assert!(edge_visible(VIEW, left, right, 3));
    assert!(edge_visible(VIEW, left, right, 1));
}

#[test]
fn edge_fully_outside_is_culled() {
    let a = Point::new(200.0, 200.0);
    let b = Point::new(300.0, 250.0);
    assert!(!edge_visible(VIEW, a, b, 5));
}
