use super::*;

#[test]
fn defaults_match_documented_timings() {
    let cfg = TypewriterConfig::default();
    assert_eq!(cfg.char_interval_ms, 80);
    assert!(cfg.natural_variation);
    assert_eq!(cfg.cursor_blink_interval_ms, Some(530));
    assert_eq!(cfg.completion_hold_ms, 1000);
    assert_eq!(cfg.start_delay_ms, 200);
}

#[test]
fn partial_json_keeps_other_defaults() {
    let cfg = TypewriterConfig::from_json(r#"{"char_interval_ms": 0, "cursor_blink_interval_ms": null}"#)
        .unwrap();
    assert_eq!(cfg.char_interval_ms, 1);
    assert_eq!(cfg.cursor_blink_interval_ms, None);
    assert_eq!(cfg.start_delay_ms, 200);

    assert_eq!(
        TypewriterConfig::from_json(r#"{"char_interval_ms": -5}"#)
            .unwrap()
            .char_interval_ms,
        1
    );
}

#[test]
fn negative_timings_are_clamped_not_rejected() {
    let cfg = TypewriterConfig::from_json(
        r#"{"start_delay_ms": -20, "completion_hold_ms": -1, "cursor_blink_interval_ms": -300}"#,
    )
    .unwrap();
    assert_eq!(cfg.start_delay_ms, 0);
    assert_eq!(cfg.completion_hold_ms, 0);
    assert_eq!(cfg.cursor_blink_interval_ms, Some(1));
    assert_eq!(cfg.char_interval_ms, 80);

    let cfg = TypewriterConfig::from_json(r#"{"char_interval_ms": 12.6}"#).unwrap();
    assert_eq!(cfg.char_interval_ms, 13);

    assert!(TypewriterConfig::from_json(r#"{"char_interval_ms": "fast"}"#).is_err());
}

#[test]
fn jitter_stays_within_thirty_percent_and_above_floor() {
    let cfg = TypewriterConfig::default();
    let mut rng = Rng64::new(3);
    let mut seen = std::collections::BTreeSet::new();
    for _ in 0..500 {
        let d = cfg.next_char_delay(&mut rng).0;
        assert!((56..=104).contains(&d), "delay {d} outside ±30% of 80");
        seen.insert(d);
    }
    assert!(seen.len() > 10);

    let slow = TypewriterConfig {
        char_interval_ms: 10,
        ..TypewriterConfig::default()
    };
    for _ in 0..50 {
        assert_eq!(slow.next_char_delay(&mut rng), Millis(30));
    }
}

#[test]
fn without_variation_delay_is_exact() {
    let cfg = TypewriterConfig {
        natural_variation: false,
        char_interval_ms: 10,
        ..TypewriterConfig::default()
    };
    let mut rng = Rng64::new(0);
    assert_eq!(cfg.next_char_delay(&mut rng), Millis(10));
}

#[test]
fn fixed_variant_is_a_plain_cadence() {
    let cfg = TypewriterConfig::fixed(150);
    assert!(!cfg.natural_variation);
    assert_eq!(cfg.cursor_blink_interval_ms, None);
    assert_eq!(cfg.completion_hold_ms, 0);
    assert_eq!(cfg.start_delay_ms, 150);
}
