//! Integration tests for inline layout of whole blocks.

use koala_inline::midpoint::MidpointState;
use koala_inline::{
    BidiResolver, BlockGeometry, EdgeSizes, InlineBlock, InlineContent, InlineIterator,
    InlineStyle, ItemId, LayoutSettings, MAX_EMBEDDING_LEVEL, MonospaceFontMetrics,
    TextDirection, TextOverflow, Truncation,
};

const METRICS: MonospaceFontMetrics = MonospaceFontMetrics::new(10.0, 8.0, 2.0);

/// Helper: a block holding one text item, laid out at `width`.
fn layout_text(text: &str, width: f32, block_style: InlineStyle) -> (InlineBlock, ItemId) {
    let mut content = InlineContent::new(block_style.clone());
    let id = content.append_text(text, block_style);
    let geometry = BlockGeometry::new(width, EdgeSizes::default(), EdgeSizes::default());
    let mut block = InlineBlock::new(content, geometry, LayoutSettings::default());
    let _ = block.layout_inline_content(&METRICS, false);
    (block, id)
}

/// Helper: the rendered text of each line, boxes in visual order.
fn rendered_lines(block: &InlineBlock) -> Vec<String> {
    block
        .lines()
        .iter()
        .map(|line| {
            line.text_boxes()
                .iter()
                .map(|text| {
                    block.content().text(text.item)[text.start..text.end()]
                        .iter()
                        .collect::<String>()
                })
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Line breaking
// ---------------------------------------------------------------------------

#[test]
fn test_hello_world_fits_on_one_line() {
    let (block, id) = layout_text("Hello world", f32::MAX, InlineStyle::default());
    assert_eq!(block.lines().len(), 1);
    let line = &block.lines()[0];
    assert!(line.line_break.at_end() || line.line_break.pos == 11);
    let boxes = line.text_boxes();
    assert_eq!(boxes.len(), 1);
    assert_eq!((boxes[0].item, boxes[0].start, boxes[0].len), (id, 0, 11));
}

#[test]
fn test_hello_world_breaks_before_world() {
    // Exactly the width of "Hello ".
    let (block, id) = layout_text("Hello world", 60.0, InlineStyle::default());
    assert_eq!(rendered_lines(&block), vec!["Hello", "world"]);
    let first = &block.lines()[0];
    assert_eq!(first.line_break.item, Some(id));
    // The break is stored on the space that collapses into it; the next
    // line skips that space and starts right before "world".
    assert_eq!(first.line_break.pos, 5);
    assert_eq!(block.lines()[1].text_boxes()[0].start, 6);
    assert!(!first.ends_with_break);
}

#[test]
fn test_whitespace_only_content_creates_no_line() {
    let (block, _) = layout_text(" ", 100.0, InlineStyle::default());
    assert!(block.lines().is_empty());
    assert!(block.height().abs() < f32::EPSILON);
}

#[test]
fn test_forced_breaks_in_pre() {
    let style = InlineStyle {
        white_space: koala_inline::WhiteSpace::Pre,
        ..InlineStyle::default()
    };
    let (block, _) = layout_text("ab\ncd", 1000.0, style);
    assert_eq!(block.lines().len(), 2);
    assert!(block.lines()[0].ends_with_break);
    assert_eq!(rendered_lines(&block)[1], "cd");
}

#[test]
fn test_lines_stack_downwards() {
    let (block, _) = layout_text("aa bb cc dd", 20.0, InlineStyle::default());
    assert_eq!(block.lines().len(), 4);
    for (index, line) in block.lines().iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let expected = index as f32 * 10.0;
        assert!((line.rect.y - expected).abs() < 1e-4);
    }
    assert!((block.height() - 40.0).abs() < 1e-4);
}

// ---------------------------------------------------------------------------
// Bidi
//
// [UAX #9 § 3.4 Reordering Resolved Levels](https://www.unicode.org/reports/tr9/#Reordering_Resolved_Levels)
// ---------------------------------------------------------------------------

#[test]
fn test_rtl_span_between_ltr_text() {
    let (block, _) = layout_text("abc\u{05E9}\u{05DC}\u{05D5}\u{05DD}def", 1000.0, InlineStyle::default());
    assert_eq!(block.lines().len(), 1);
    let boxes = block.lines()[0].text_boxes();
    let runs: Vec<_> = boxes.iter().map(|text| (text.start, text.len, text.level)).collect();
    assert_eq!(runs, vec![(0, 3, 0), (3, 4, 1), (7, 3, 0)]);
    assert!(boxes[0].x < boxes[1].x && boxes[1].x < boxes[2].x);
}

#[test]
fn test_rtl_block_reverses_ltr_words() {
    let style = InlineStyle {
        direction: TextDirection::Rtl,
        ..InlineStyle::default()
    };
    let (block, _) = layout_text("\u{05D0}\u{05D1} abc", 1000.0, style);
    let boxes = block.lines()[0].text_boxes();
    // The Hebrew run is logically first, so it sits at the right.
    let hebrew = boxes.iter().find(|text| text.start == 0).expect("hebrew box");
    let latin = boxes.iter().find(|text| text.level == 2).expect("latin box");
    assert!(latin.x < hebrew.x);
}

#[test]
fn test_embedding_cap() {
    let text: String = std::iter::repeat_n('\u{202A}', 70).chain("abc".chars()).collect();
    let (block, id) = layout_text(&text, 1000.0, InlineStyle::default());
    for line in block.lines() {
        for text in line.text_boxes() {
            assert!(text.level <= 61, "level {} is above the cap", text.level);
        }
    }

    let mut resolver = BidiResolver::for_paragraph(TextDirection::Ltr, false);
    resolver.set_position(InlineIterator::at(id, 0));
    let _ = resolver.create_runs_for_line(
        block.content(),
        InlineIterator::end(),
        &mut MidpointState::new(),
        false,
        false,
    );
    assert_eq!(resolver.context().level(), MAX_EMBEDDING_LEVEL);
}

#[test]
fn test_full_stop_before_soft_hyphen_break_after_rtl_text() {
    // The line breaks at the space after the soft hyphen, so the hyphen
    // renders; the full stop before it must render too.
    let (block, _) = layout_text("\u{05D0}.\u{05D0} .\u{00AD}  ", 50.0, InlineStyle::default());
    let rendered = rendered_lines(&block).concat();
    assert_eq!(rendered.matches('.').count(), 2, "rendered {rendered:?}");
    assert_eq!(rendered.matches('\u{05D0}').count(), 2);
    let boxes = block.lines()[0].text_boxes();
    let spans: Vec<_> = boxes.iter().map(|text| (text.start, text.len, text.level)).collect();
    assert_eq!(spans, vec![(0, 3, 1), (3, 3, 0)]);
}

// ---------------------------------------------------------------------------
// Incremental relayout
// ---------------------------------------------------------------------------

#[test]
fn test_relayout_without_change_reuses_everything() {
    let (mut block, _) = layout_text("aa bb cc dd ee ff gg", 30.0, InlineStyle::default());
    let before = block.lines().to_vec();
    let result = block.layout_inline_content(&METRICS, false);
    assert_eq!(result.lines_created, 0);
    assert_eq!(result.lines_reused, before.len());
    assert_eq!(block.lines(), before.as_slice());
}

#[test]
fn test_edit_in_long_paragraph_reuses_trailing_lines() {
    // One three letter word per line.
    let words: Vec<String> = (0..100).map(|n| format!("w{n:02}")).collect();
    let (mut block, id) = layout_text(&words.join(" "), 40.0, InlineStyle::default());
    assert_eq!(block.lines().len(), 100);
    let old_tail: Vec<_> = block.lines()[52..]
        .iter()
        .map(|line| line.text_boxes()[0].start)
        .collect();

    // Grow "w50" to "wx50"; it still fits its line.
    block.replace_text(id, 50 * 4 + 1, 0, "x").unwrap();
    let result = block.layout_inline_content(&METRICS, false);

    assert_eq!(block.lines().len(), 100);
    assert!(result.lines_created <= 3, "recomputed {} lines", result.lines_created);
    assert_eq!(result.lines_created + result.lines_reused, 100);
    assert_eq!(rendered_lines(&block)[50], "wx50");
    let new_tail: Vec<_> = block.lines()[52..]
        .iter()
        .map(|line| line.text_boxes()[0].start)
        .collect();
    let shifted: Vec<_> = old_tail.iter().map(|start| start + 1).collect();
    assert_eq!(new_tail, shifted);
}

#[test]
fn test_edit_that_adds_a_line_shifts_the_rest() {
    let (mut block, id) = layout_text("aa bb cc dd ee", 20.0, InlineStyle::default());
    assert_eq!(block.lines().len(), 5);
    // "bb" becomes "bb zz": one more line.
    block.replace_text(id, 5, 0, " zz").unwrap();
    let result = block.layout_inline_content(&METRICS, false);
    assert_eq!(rendered_lines(&block), vec!["aa", "bb", "zz", "cc", "dd", "ee"]);
    assert!((block.height() - 60.0).abs() < 1e-4);
    assert!(result.lines_reused >= 1);
    let last = block.lines().last().expect("lines");
    assert!((last.rect.y - 50.0).abs() < 1e-4);
}

#[test]
fn test_edit_result_matches_fresh_layout() {
    let (mut block, id) = layout_text("the quick brown fox jumps over the lazy dog", 60.0, InlineStyle::default());
    block.replace_text(id, 4, 5, "slow").unwrap();
    let _ = block.layout_inline_content(&METRICS, false);
    let (fresh, _) = layout_text("the slow brown fox jumps over the lazy dog", 60.0, InlineStyle::default());
    assert_eq!(rendered_lines(&block), rendered_lines(&fresh));
    for (edited, fresh) in block.lines().iter().zip(fresh.lines()) {
        assert_eq!(edited.rect, fresh.rect);
    }
}

// ---------------------------------------------------------------------------
// Text overflow
// ---------------------------------------------------------------------------

#[test]
fn test_nowrap_line_gets_ellipsis() {
    let style = InlineStyle {
        white_space: koala_inline::WhiteSpace::Nowrap,
        text_overflow: TextOverflow::Ellipsis,
        ..InlineStyle::default()
    };
    let (block, _) = layout_text("abcdefghij", 50.0, style);
    let line = &block.lines()[0];
    let ellipsis = line.ellipsis.expect("ellipsis");
    assert!((ellipsis.x - 40.0).abs() < 1e-4);
    assert_eq!(line.text_boxes()[0].truncation, Truncation::Partial(4));
}
