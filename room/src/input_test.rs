use uuid::Uuid;

use super::*;

#[test]
fn input_state_default_is_idle() {
    let state = InputState::default();
    assert!(state.is_idle());
    assert!(state.item().is_none());
}

#[test]
fn input_state_reports_bound_item() {
    let id = Uuid::new_v4();
    let cases = [
        InputState::Dragging {
            id,
            source: InputSource::Pointer,
            start: Point::new(0.0, 0.0),
            orig_left: 1.0,
            orig_top: 2.0,
        },
        InputState::Resizing { id, start: Point::new(0.0, 0.0), orig_size: 40.0 },
        InputState::Pinching { id, start_distance: 10.0, orig_size: 40.0 },
    ];
    for state in cases {
        assert!(!state.is_idle());
        assert_eq!(state.item(), Some(id));
    }
}

#[test]
fn hit_part_default_is_body() {
    assert_eq!(HitPart::default(), HitPart::Body);
}

#[test]
fn button_variants_distinct() {
    assert_ne!(Button::Primary, Button::Middle);
    assert_ne!(Button::Primary, Button::Secondary);
    assert_ne!(Button::Middle, Button::Secondary);
}

#[test]
fn delete_zone_cue_debug_format() {
    assert_eq!(format!("{:?}", DeleteZoneCue::Armed), "Armed");
}
