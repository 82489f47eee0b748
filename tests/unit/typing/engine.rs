use super::*;
use crate::runtime::virtual_host::VirtualHost;

fn hi_config() -> TypewriterConfig {
    TypewriterConfig {
        char_interval_ms: 10,
        natural_variation: false,
        start_delay_ms: 0,
        ..TypewriterConfig::default()
    }
}

#[test]
fn hi_reveals_one_character_per_interval_then_holds() {
    let mut host = VirtualHost::new();
    let mut tw = Typewriter::new(hi_config());
    tw.start("Hi", &mut host);
    assert_eq!(tw.display_text(), "");
    assert_eq!(tw.phase(), TypewriterPhase::Typing);

    host.run_until(Millis(0), &mut tw);
    assert_eq!(tw.display_text(), "H");
    host.run_until(Millis(9), &mut tw);
    assert_eq!(tw.display_text(), "H");

    host.run_until(Millis(10), &mut tw);
    assert_eq!(tw.display_text(), "Hi");
    assert_eq!(tw.phase(), TypewriterPhase::Holding);
    assert!(!tw.is_complete());

    host.run_until(Millis(1009), &mut tw);
    assert!(!tw.is_complete());
    host.run_until(Millis(1010), &mut tw);
    assert!(tw.is_complete());
    assert_eq!(tw.output().display_text, "Hi");
}

#[test]
fn cursor_stays_visible_until_complete_then_blinks() {
    let mut host = VirtualHost::new();
    let mut tw = Typewriter::new(hi_config());
    tw.start("Hi", &mut host);

    // the blink oscillator toggles at 530 while typing, but the cursor is forced on
    host.run_until(Millis(600), &mut tw);
    assert!(tw.cursor_visible());

    host.run_until(Millis(1010), &mut tw);
    assert!(tw.is_complete());
    assert!(!tw.cursor_visible());
    host.run_until(Millis(1060), &mut tw);
    assert!(tw.cursor_visible());
    host.run_until(Millis(1590), &mut tw);
    assert!(!tw.cursor_visible());
}

#[test]
fn target_change_mid_typing_resets_progress() {
    let mut host = VirtualHost::new();
    let mut tw = Typewriter::new(hi_config());
    tw.start("Hello", &mut host);
    host.run_until(Millis(20), &mut tw);
    assert_eq!(tw.display_text(), "Hel");

    tw.set_text("World", &mut host);
    assert_eq!(
        tw.state(),
        TypewriterState {
            revealed_prefix_len: 0,
            is_complete: false,
            cursor_visible: true,
        }
    );
    // blink interval plus the fresh reveal; the old reveal is gone
    assert_eq!(host.pending_timers(), 2);

    host.run_until(Millis(20), &mut tw);
    assert_eq!(tw.display_text(), "W");
    host.run_until(Millis(60), &mut tw);
    assert_eq!(tw.display_text(), "World");
}

#[test]
fn same_text_does_not_reset() {
    let mut host = VirtualHost::new();
    let mut tw = Typewriter::new(hi_config());
    tw.start("Hello", &mut host);
    host.run_until(Millis(20), &mut tw);
    tw.set_text("Hello", &mut host);
    assert_eq!(tw.display_text(), "Hel");
}

#[test]
fn change_after_completion_starts_over() {
    let mut host = VirtualHost::new();
    let mut tw = Typewriter::new(hi_config());
    tw.start("Hi", &mut host);
    host.run_until(Millis(2000), &mut tw);
    assert!(tw.is_complete());

    tw.set_text("Yo", &mut host);
    assert!(!tw.is_complete());
    assert!(tw.cursor_visible());
    assert_eq!(tw.display_text(), "");
    host.run_until(Millis(3010), &mut tw);
    assert!(tw.is_complete());
    assert_eq!(tw.display_text(), "Yo");
}

#[test]
fn complete_always_shows_the_whole_target() {
    let mut host = VirtualHost::new();
    let mut tw = Typewriter::new(TypewriterConfig {
        seed: 11,
        ..TypewriterConfig::default()
    });
    tw.start("natural variation", &mut host);
    for t in (0..5000).step_by(37) {
        host.run_until(Millis(t), &mut tw);
        if tw.is_complete() {
            assert_eq!(tw.display_text(), tw.target());
        }
    }
    assert!(tw.is_complete());
}

#[test]
fn jittered_reveals_stay_within_bounds() {
    let mut host = VirtualHost::new();
    let mut tw = Typewriter::new(TypewriterConfig {
        seed: 99,
        ..TypewriterConfig::default()
    });
    tw.start("abcdefghijklmnopqrstuvwxyz", &mut host);

    let mut reveal_times = Vec::new();
    while let Some(id) = host.pop_due(Millis(10_000)) {
        let before = tw.state().revealed_prefix_len;
        tw.on_timer(id, &mut host);
        if tw.state().revealed_prefix_len > before {
            reveal_times.push(host.now().0);
        }
    }

    assert_eq!(reveal_times.len(), 26);
    assert_eq!(reveal_times[0], 200);
    for pair in reveal_times.windows(2) {
        let gap = pair[1] - pair[0];
        assert!((56..=104).contains(&gap), "gap {gap}");
    }
}

#[test]
fn fixed_cadence_places_character_i_at_interval_times_i_plus_one() {
    let mut host = VirtualHost::new();
    let mut tw = Typewriter::new(TypewriterConfig::fixed(150));
    tw.start("abc", &mut host);

    for (t, expected) in [(149, ""), (150, "a"), (299, "a"), (300, "ab"), (450, "abc")] {
        host.run_until(Millis(t), &mut tw);
        assert_eq!(tw.display_text(), expected, "at {t}ms");
    }
    assert!(tw.is_complete());
    assert!(tw.cursor_visible());
    assert_eq!(host.pending_timers(), 0);
}

#[test]
fn empty_text_holds_then_completes() {
    let mut host = VirtualHost::new();
    let mut tw = Typewriter::new(hi_config());
    tw.start("", &mut host);
    assert_eq!(tw.phase(), TypewriterPhase::Holding);
    host.run_until(Millis(1000), &mut tw);
    assert!(tw.is_complete());
    assert_eq!(tw.display_text(), "");
}

#[test]
fn reveals_whole_characters() {
    let mut host = VirtualHost::new();
    let mut tw = Typewriter::new(hi_config());
    tw.start("héllo", &mut host);
    host.run_until(Millis(10), &mut tw);
    assert_eq!(tw.display_text(), "hé");
    assert_eq!(tw.state().revealed_prefix_len, 2);
}

#[test]
fn stop_cancels_every_timer_and_ignores_stale_callbacks() {
    let mut host = VirtualHost::new();
    let mut tw = Typewriter::new(hi_config());
    tw.start("Hello", &mut host);
    host.run_until(Millis(10), &mut tw);

    tw.stop(&mut host);
    assert!(!tw.is_running());
    assert_eq!(host.pending_timers(), 0);
    assert_eq!(tw.display_text(), "");

    tw.on_timer(TimerId(12345), &mut host);
    assert_eq!(tw.phase(), TypewriterPhase::Idle);
}

#[test]
fn restart_does_not_leak_timers() {
    let mut host = VirtualHost::new();
    let mut tw = Typewriter::new(hi_config());
    tw.start("Hello", &mut host);
    tw.start("Hello", &mut host);
    assert_eq!(host.pending_timers(), 2);
}
