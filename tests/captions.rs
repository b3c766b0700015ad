use influencer_media::captions::{
    CaptionEngine, CaptionSegment, CaptionStyle, CaptionStyleOverrides, SegmentationMode,
    find_preset, format_ass_time, format_srt_time, generate_ass, generate_segments, generate_srt,
    presets, resolve_style,
};

const EPS: f64 = 1e-9;

const NARRATION: &str = "Morning routine check! I start with a cold plunge. Then coffee, \
    obviously. Tell me yours in the comments?";

const MODES: [SegmentationMode; 3] = [
    SegmentationMode::Word,
    SegmentationMode::Sentence,
    SegmentationMode::Timed,
];

fn assert_contiguous(segments: &[CaptionSegment], total: f64) {
    assert!(!segments.is_empty());
    assert_eq!(segments[0].start_time, 0.0);
    for pair in segments.windows(2) {
        assert_eq!(pair[0].end_time, pair[1].start_time);
    }
    for seg in segments {
        assert!(seg.start_time < seg.end_time);
    }
    assert!((segments.last().unwrap().end_time - total).abs() < EPS);
}

#[test]
fn empty_text_yields_no_segments() {
    assert!(generate_segments("", 10.0, SegmentationMode::Timed).is_empty());
}

#[test]
fn contiguity_holds_for_every_mode() {
    for total in [0.7, 4.0, 13.37, 61.0] {
        for mode in MODES {
            assert_contiguous(&generate_segments(NARRATION, total, mode), total);
        }
    }
}

#[test]
fn word_mode_has_one_segment_per_token() {
    let tokens = NARRATION.split_whitespace().count();
    let segments = generate_segments(NARRATION, 20.0, SegmentationMode::Word);
    assert_eq!(segments.len(), tokens);
    for (i, seg) in segments.iter().enumerate() {
        assert_eq!(seg.index, i);
    }
}

#[test]
fn hello_world_word_scenario() {
    let segments = generate_segments("Hello world", 4.0, SegmentationMode::Word);
    let texts: Vec<_> = segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, ["Hello", "world"]);
    for seg in &segments {
        assert!((seg.duration() - 2.0).abs() < EPS);
    }
}

#[test]
fn sentence_durations_follow_character_share() {
    let total = 30.0;
    let segments = generate_segments(NARRATION, total, SegmentationMode::Sentence);
    assert_eq!(segments.len(), 4);

    let total_chars: usize = segments.iter().map(|s| s.text.chars().count()).sum();
    for seg in &segments {
        let expected = seg.text.chars().count() as f64 / total_chars as f64;
        assert!((seg.duration() / total - expected).abs() < EPS);
    }
}

#[test]
fn sentence_scenario_ratio() {
    let segments = generate_segments("One. Two words here.", 9.0, SegmentationMode::Sentence);
    assert_eq!(segments.len(), 2);
    let ratio = segments[0].duration() / segments[1].duration();
    assert!((ratio - "One.".len() as f64 / "Two words here.".len() as f64).abs() < EPS);
}

#[test]
fn timed_mode_groups_three_words() {
    let segments = generate_segments("a b c d e f g h", 8.0, SegmentationMode::Timed);
    let texts: Vec<_> = segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, ["a b c", "d e f", "g h"]);
}

#[test]
fn segmentation_is_deterministic() {
    for mode in MODES {
        assert_eq!(
            generate_segments(NARRATION, 17.3, mode),
            generate_segments(NARRATION, 17.3, mode)
        );
    }
}

#[test]
fn time_formatting_is_stable() {
    assert_eq!(format_srt_time(65.5), "00:01:05,500");
    for value in [0.0, 1.234, 65.5, 3599.999, 7322.01] {
        assert_eq!(format_srt_time(value), format_srt_time(value));
        assert_eq!(format_ass_time(value), format_ass_time(value));
    }
}

#[test]
fn ass_for_no_segments_is_header_only() {
    let ass = generate_ass(&[], &CaptionStyle::default());
    assert!(ass.contains("[Script Info]"));
    assert!(ass.contains("Style: Default,"));
    assert!(!ass.contains("Dialogue:"));
}

#[test]
fn ass_has_one_dialogue_per_segment() {
    let segments = generate_segments(NARRATION, 12.0, SegmentationMode::Timed);
    let style = resolve_style(Some("headline-top"), None);
    let ass = generate_ass(&segments, &style);
    assert_eq!(ass.matches("\nDialogue: ").count(), segments.len());
    assert!(ass.contains(",8,40,40,60,1\n"));
    // headline-top renders uppercase
    assert!(ass.contains("MORNING ROUTINE CHECK!"));
}

#[test]
fn srt_numbering_starts_at_one() {
    let segments = generate_segments("one two three four", 4.0, SegmentationMode::Word);
    let srt = generate_srt(&segments);
    let blocks: Vec<_> = srt.split("\n\n").collect();
    assert_eq!(blocks.len(), 4);
    assert!(blocks[0].starts_with("1\n00:00:00,000 --> 00:00:01,000\none"));
    assert!(blocks[3].starts_with("4\n00:00:03,000 --> 00:00:04,000\nfour"));
}

#[test]
fn default_style_resolution() {
    assert_eq!(resolve_style(None, None), CaptionStyle::default());
}

#[test]
fn override_only_touches_named_field() {
    for preset in presets() {
        let overrides = CaptionStyleOverrides {
            font_size: Some(40.0),
            ..Default::default()
        };
        let resolved = resolve_style(Some(preset.id.as_str()), Some(&overrides));
        assert_eq!(resolved.font_size, 40.0);
        assert_eq!(
            resolved,
            CaptionStyle {
                font_size: 40.0,
                ..preset.style.clone()
            }
        );
    }
}

#[test]
fn unknown_preset_uses_default_base() {
    let overrides = CaptionStyleOverrides {
        color: Some("#FF0000".to_string()),
        ..Default::default()
    };
    let resolved = resolve_style(Some("does-not-exist"), Some(&overrides));
    assert_eq!(
        resolved,
        CaptionStyle {
            color: "#FF0000".to_string(),
            ..CaptionStyle::default()
        }
    );
    assert!(find_preset("does-not-exist").is_none());
}

#[test]
fn engine_facade_matches_free_functions() {
    let engine = CaptionEngine::new();
    let segments = engine.generate_segments("Hello world", 4.0, SegmentationMode::Word);
    assert_eq!(segments, generate_segments("Hello world", 4.0, SegmentationMode::Word));
    let style = engine.resolve_style(Some("neon-pop"), None);
    assert_eq!(engine.generate_ass(&segments, &style), generate_ass(&segments, &style));
    assert_eq!(engine.generate_srt(&segments), generate_srt(&segments));
    assert_eq!(engine.format_ass_time(65.5), "0:01:05.50");
}

#[test]
fn segments_serialize_camel_case() {
    let segments = generate_segments("Hello", 1.0, SegmentationMode::Word);
    let json = serde_json::to_value(&segments).unwrap();
    assert_eq!(json[0]["startTime"], 0.0);
    assert_eq!(json[0]["endTime"], 1.0);
    assert_eq!(json[0]["text"], "Hello");
}
