mod common;

use panel_core::pots::LockState;
use panel_core::ModeId;
use panel_display::DisplayCommand;
use panel_types::{ChangeSource, HardwareEvent, ParamValue, RackModel};

use common::{approx, click, encoder, param_mode, ticks, turn, value, RACK};

#[test]
fn test_initial_page_is_drawn() {
    let (display, sink) = panel_display::Display::recording();
    let mut c = panel_core::ModeController::new(
        common::fixture_model(),
        display,
        RACK,
        panel_core::Timing::default(),
    );
    c.init();

    assert_eq!(param_mode(&c).page_id(), Some("p1"));
    let texts = sink.texts();
    assert!(texts.iter().any(|t| t.starts_with('A')));
    assert!(texts.iter().any(|t| t.starts_with('D')));
    assert_eq!(sink.commands().last(), Some(&DisplayCommand::Flip));
}

#[test]
fn test_pot_pickup_from_above() {
    let (mut c, _sink) = common::controller();
    assert_eq!(param_mode(&c).pot_state(0), Some(LockState::Locked));

    turn(&mut c, 0, 0.7);
    assert_eq!(param_mode(&c).pot_state(0), Some(LockState::WaitForLess));
    assert!(approx(value(&c, "m1", "a"), 0.5));

    turn(&mut c, 0, 0.6);
    assert_eq!(param_mode(&c).pot_state(0), Some(LockState::WaitForLess));
    assert!(approx(value(&c, "m1", "a"), 0.5));

    turn(&mut c, 0, 0.4);
    assert_eq!(param_mode(&c).pot_state(0), Some(LockState::Unlocked));
    assert!(approx(value(&c, "m1", "a"), 0.4));

    turn(&mut c, 0, 0.9);
    assert!(approx(value(&c, "m1", "a"), 0.9));
}

#[test]
fn test_pot_beyond_page_params_only_records() {
    let (mut c, _sink) = common::controller();
    encoder(&mut c, 1);
    encoder(&mut c, 1);
    // p3 has a single parameter
    turn(&mut c, 3, 0.2);
    assert_eq!(param_mode(&c).pot_state(3), Some(LockState::Locked));
}

#[test]
fn test_out_of_range_pot_is_ignored() {
    let (mut c, sink) = common::controller();
    c.dispatch(HardwareEvent::Pot { index: 7, raw: 100.0 });
    assert!(sink.commands().is_empty());
}

#[test]
fn test_encoder_right_five_times_stops_at_last_page() {
    let (mut c, _sink) = common::controller();
    for _ in 0..5 {
        encoder(&mut c, 1);
    }
    assert_eq!(param_mode(&c).page_index(), Some(2));
    assert_eq!(param_mode(&c).page_id(), Some("p3"));

    encoder(&mut c, -1);
    assert_eq!(param_mode(&c).page_index(), Some(1));
}

#[test]
fn test_encoder_left_at_first_page_is_noop() {
    let (mut c, sink) = common::controller();
    encoder(&mut c, -1);
    encoder(&mut c, 0);
    assert_eq!(param_mode(&c).page_index(), Some(0));
    assert!(sink.commands().is_empty());
}

#[test]
fn test_page_change_shows_popup_until_timeout() {
    let (mut c, sink) = common::controller();
    encoder(&mut c, 1);
    assert_eq!(param_mode(&c).popup_text(), Some("Page 2"));
    assert!(sink.texts().contains(&"Page 2".to_string()));

    let popup_ticks = c.timing().page_popup_ticks;
    ticks(&mut c, popup_ticks - 1);
    assert!(param_mode(&c).popup_text().is_some());

    sink.take();
    c.tick();
    assert_eq!(param_mode(&c).popup_text(), None);
    let texts = sink.texts();
    assert!(texts.iter().any(|t| t.starts_with('E')));
    assert!(!texts.contains(&"Page 2".to_string()));
}

#[test]
fn test_page_change_relocks_pots() {
    let (mut c, _sink) = common::controller();
    turn(&mut c, 0, 0.5);
    assert_eq!(param_mode(&c).pot_state(0), Some(LockState::Unlocked));

    // e sits at 0.9, the pot at 0.5
    encoder(&mut c, 1);
    assert_eq!(param_mode(&c).pot_state(0), Some(LockState::WaitForGreater));
    assert!(approx(value(&c, "m1", "e"), 0.9));
    // unmoved pots stay locked
    assert_eq!(param_mode(&c).pot_state(1), Some(LockState::Locked));
}

#[test]
fn test_encoder_click_opens_main_menu() {
    let (mut c, _sink) = common::controller();
    click(&mut c);
    assert_eq!(c.active_mode(), ModeId::MainMenu);
}

#[test]
fn test_shortcut_selects_module() {
    let (mut c, sink) = common::controller();
    c.dispatch(HardwareEvent::EncoderButton { down: true });
    c.dispatch(HardwareEvent::Key { key: 2, down: true });
    c.dispatch(HardwareEvent::Key { key: 2, down: false });

    assert_eq!(c.device().module_id.as_deref(), Some("m2"));
    assert_eq!(c.model().rack(RACK).unwrap().active_module.as_deref(), Some("m2"));
    assert_eq!(param_mode(&c).page_id(), Some("main"));
    assert_eq!(param_mode(&c).popup_text(), Some("m2:Lowpass"));
    assert!(sink.commands().contains(&DisplayCommand::Box { x: 2, y: 12, w: 118, h: 38, on: true }));

    c.dispatch(HardwareEvent::EncoderButton { down: false });
    assert_eq!(c.active_mode(), ModeId::Parameter);
}

#[test]
fn test_shortcut_to_current_or_missing_module_is_ignored() {
    let (mut c, sink) = common::controller();
    c.dispatch(HardwareEvent::EncoderButton { down: true });
    c.dispatch(HardwareEvent::Key { key: 1, down: false });
    c.dispatch(HardwareEvent::Key { key: 9, down: false });
    assert_eq!(c.device().module_id.as_deref(), Some("m1"));
    assert!(sink.commands().is_empty());
}

#[test]
fn test_shortcut_zero_opens_module_select() {
    let (mut c, _sink) = common::controller();
    c.dispatch(HardwareEvent::EncoderButton { down: true });
    c.dispatch(HardwareEvent::Key { key: 0, down: false });
    assert_eq!(c.active_mode(), ModeId::ModuleSelectMenu);
}

#[test]
fn test_key_without_encoder_held_does_nothing() {
    let (mut c, _sink) = common::controller();
    c.dispatch(HardwareEvent::Key { key: 2, down: false });
    assert_eq!(c.device().module_id.as_deref(), Some("m1"));
    assert_eq!(c.active_mode(), ModeId::Parameter);
}

#[test]
fn test_remote_change_redraws_line_and_relocks() {
    let (mut c, sink) = common::controller();
    turn(&mut c, 0, 0.5);
    assert_eq!(param_mode(&c).pot_state(0), Some(LockState::Unlocked));
    sink.take();

    c.model_mut()
        .change_param(ChangeSource::Remote, RACK, "m1", "a", ParamValue::Float(0.2))
        .unwrap();
    common::sync(&mut c);

    assert_eq!(param_mode(&c).pot_state(0), Some(LockState::WaitForLess));
    assert!(approx(value(&c, "m1", "a"), 0.2));
    let texts = sink.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with('A') && texts[0].contains("0.20"));
    assert_eq!(sink.commands().last(), Some(&DisplayCommand::Flip));
}

#[test]
fn test_local_change_keeps_pot_unlocked() {
    let (mut c, _sink) = common::controller();
    turn(&mut c, 1, 0.5);
    turn(&mut c, 1, 0.8);
    assert_eq!(param_mode(&c).pot_state(1), Some(LockState::Unlocked));
    assert!(approx(value(&c, "m1", "b"), 0.8));
}

#[test]
fn test_changes_are_not_drawn_under_popup() {
    let (mut c, sink) = common::controller();
    encoder(&mut c, 1);
    sink.take();

    c.model_mut()
        .change_param(ChangeSource::Remote, RACK, "m1", "f", ParamValue::Float(0.3))
        .unwrap();
    common::sync(&mut c);
    assert!(sink.commands().is_empty());
}

#[test]
fn test_other_module_changes_are_ignored() {
    let (mut c, sink) = common::controller();
    c.model_mut()
        .change_param(ChangeSource::Remote, RACK, "m3", "a", ParamValue::Float(0.3))
        .unwrap();
    common::sync(&mut c);
    assert!(sink.commands().is_empty());
}

#[test]
fn test_module_type_change_resolves_first_page() {
    let (mut c, _sink) = common::controller();
    encoder(&mut c, 1);
    assert_eq!(param_mode(&c).page_id(), Some("p2"));

    c.model_mut()
        .load_module(ChangeSource::Remote, RACK, "m1", "Filter")
        .unwrap();
    common::sync(&mut c);
    assert_eq!(param_mode(&c).page_id(), Some("main"));
    assert_eq!(param_mode(&c).page_index(), Some(0));
}
