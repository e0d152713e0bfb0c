//! Property tests for line breaking, bidi resolution and relayout.

use koala_inline::midpoint::MidpointState;
use koala_inline::{
    BidiResolver, BlockGeometry, EdgeSizes, InlineBlock, InlineContent, InlineIterator,
    InlineStyle, ItemId, LayoutSettings, MAX_EMBEDDING_LEVEL, MonospaceFontMetrics,
    TextDirection, WhiteSpace,
};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

const METRICS: MonospaceFontMetrics = MonospaceFontMetrics::new(10.0, 8.0, 2.0);

const WHITE_SPACE_MODES: [WhiteSpace; 5] = [
    WhiteSpace::Normal,
    WhiteSpace::Pre,
    WhiteSpace::PreWrap,
    WhiteSpace::PreLine,
    WhiteSpace::Nowrap,
];

/// Helper: map arbitrary bytes onto a small alphabet that exercises
/// spaces, forced breaks, hyphens and soft hyphens.
fn text_from(bytes: &[u8]) -> String {
    const ALPHABET: [char; 8] = ['a', 'b', 'c', ' ', ' ', '\n', '-', '\u{00AD}'];
    bytes
        .iter()
        .map(|&b| ALPHABET[usize::from(b) % ALPHABET.len()])
        .collect()
}

fn layout(text: &str, width: f32, style: InlineStyle) -> InlineBlock {
    let mut content = InlineContent::new(style.clone());
    let _ = content.append_text(text, style);
    let geometry = BlockGeometry::new(width, EdgeSizes::default(), EdgeSizes::default());
    let mut block = InlineBlock::new(content, geometry, LayoutSettings::default());
    let _ = block.layout_inline_content(&METRICS, false);
    block
}

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

#[quickcheck]
fn prop_every_line_makes_progress(bytes: Vec<u8>, width: u8, mode: u8) -> bool {
    let text = text_from(&bytes);
    let style = InlineStyle {
        white_space: WHITE_SPACE_MODES[usize::from(mode) % WHITE_SPACE_MODES.len()],
        ..InlineStyle::default()
    };
    let block = layout(&text, f32::from(width), style);
    let breaks: Vec<_> = block.lines().iter().map(|line| line.line_break).collect();
    block.lines().len() <= text.chars().count() && breaks.windows(2).all(|pair| pair[0] < pair[1])
}

#[quickcheck]
fn prop_interior_spaces_collapse_to_one(spaces: u8) -> TestResult {
    if spaces == 0 {
        return TestResult::discard();
    }
    let text = format!("a{}b", " ".repeat(usize::from(spaces)));
    let block = layout(&text, 1000.0, InlineStyle::default());
    TestResult::from_bool(rendered_lines(&block) == vec!["a b".to_string()])
}

#[quickcheck]
fn prop_collapsing_is_idempotent(bytes: Vec<u8>, width: u8) -> bool {
    let words: Vec<_> = bytes
        .iter()
        .map(|&b| if b % 3 == 0 { "  " } else if b % 3 == 1 { "ab" } else { " " })
        .collect();
    let text = words.concat();
    let collapsed = text.split(' ').filter(|word| !word.is_empty()).collect::<Vec<_>>().join(" ");
    let width = f32::from(width.max(20));
    let original = layout(&text, width, InlineStyle::default());
    let once = layout(&collapsed, width, InlineStyle::default());
    let squash = |lines: Vec<String>| -> Vec<String> {
        lines
            .into_iter()
            .map(|line| line.split(' ').filter(|w| !w.is_empty()).collect::<Vec<_>>().join(" "))
            .collect()
    };
    squash(rendered_lines(&original)) == squash(rendered_lines(&once))
}

#[quickcheck]
fn prop_embedding_levels_are_capped(extra: u8, rtl: bool) -> bool {
    let control = if rtl { '\u{202B}' } else { '\u{202A}' };
    let text: String = std::iter::repeat_n(control, 61 + usize::from(extra))
        .chain("abc".chars())
        .collect();
    let block = layout(&text, 1000.0, InlineStyle::default());
    block
        .lines()
        .iter()
        .flat_map(|line| line.text_boxes().into_iter().map(|text| text.level).collect::<Vec<_>>())
        .all(|level| level <= 61)
        && (MAX_EMBEDDING_LEVEL - 1..=MAX_EMBEDDING_LEVEL).contains(&resolver_level_after(&block))
}

/// Resolve the whole block as one line and return the embedding level
/// open at its end.
fn resolver_level_after(block: &InlineBlock) -> u8 {
    let mut resolver = BidiResolver::for_paragraph(TextDirection::Ltr, false);
    resolver.set_position(InlineIterator::at(ItemId(1), 0));
    let _ = resolver.create_runs_for_line(
        block.content(),
        InlineIterator::end(),
        &mut MidpointState::new(),
        false,
        false,
    );
    resolver.context().level()
}

#[quickcheck]
fn prop_every_visible_character_renders_once(bytes: Vec<u8>, width: u8) -> bool {
    const ALPHABET: [char; 8] = ['a', '\u{05D0}', '.', ' ', ' ', '-', '\u{00AD}', '1'];
    let text: String = bytes
        .iter()
        .map(|&b| ALPHABET[usize::from(b) % ALPHABET.len()])
        .collect();
    let block = layout(&text, f32::from(width.max(10)), InlineStyle::default());
    let visible = |c: &char| *c != ' ' && *c != '\u{00AD}';
    let mut expected: Vec<char> = text.chars().filter(visible).collect();
    let mut rendered: Vec<char> = rendered_lines(&block).concat().chars().filter(visible).collect();
    expected.sort_unstable();
    rendered.sort_unstable();
    expected == rendered
}

#[quickcheck]
fn prop_unidirectional_text_keeps_logical_order(bytes: Vec<u8>, hebrew: bool) -> bool {
    let (letters, direction) = if hebrew {
        (['\u{05D0}', '\u{05D1}', ' '], TextDirection::Rtl)
    } else {
        (['a', 'b', ' '], TextDirection::Ltr)
    };
    let text: String = bytes.iter().map(|&b| letters[usize::from(b) % 3]).collect();
    let style = InlineStyle {
        direction,
        ..InlineStyle::default()
    };
    let block = layout(&text, 1000.0, style);
    block.lines().iter().all(|line| {
        let boxes = line.text_boxes();
        let starts: Vec<_> = boxes.iter().map(|text| text.start).collect();
        // Visual order equals logical order (reversed for a right to left
        // paragraph, which is read from the right).
        if hebrew {
            starts.windows(2).all(|pair| pair[0] > pair[1])
        } else {
            starts.windows(2).all(|pair| pair[0] < pair[1])
        }
    })
}

#[quickcheck]
fn prop_relayout_without_change_is_identical(bytes: Vec<u8>, width: u8) -> bool {
    let text = text_from(&bytes);
    let mut block = layout(&text, f32::from(width.max(1)), InlineStyle::default());
    let before = block.lines().to_vec();
    let result = block.layout_inline_content(&METRICS, false);
    let forced = block.layout_inline_content(&METRICS, true);
    result.lines_created == 0
        && result.lines_reused == before.len()
        && forced.lines_created == before.len()
        && block.lines() == before.as_slice()
}

#[quickcheck]
fn prop_edit_then_relayout_matches_fresh_layout(
    bytes: Vec<u8>,
    width: u8,
    offset: u8,
    len: u8,
    inserted: Vec<u8>,
) -> bool {
    let text = text_from(&bytes);
    let chars = text.chars().count();
    let offset = usize::from(offset) % (chars + 1);
    let len = usize::from(len) % (chars - offset + 1);
    let inserted = text_from(&inserted[..inserted.len().min(6)]);
    let width = f32::from(width.max(10));

    let mut content = InlineContent::new(InlineStyle::default());
    let id = content.append_text(&text, InlineStyle::default());
    let geometry = BlockGeometry::new(width, EdgeSizes::default(), EdgeSizes::default());
    let mut block = InlineBlock::new(content, geometry, LayoutSettings::default());
    let _ = block.layout_inline_content(&METRICS, false);
    if block.replace_text(id, offset, len, &inserted).is_err() {
        return false;
    }
    let _ = block.layout_inline_content(&METRICS, false);

    let edited: String = block.content().text(id).iter().collect();
    let fresh = layout(&edited, width, InlineStyle::default());
    let summary = |block: &InlineBlock| {
        block
            .lines()
            .iter()
            .map(|line| {
                let spans: Vec<_> = line
                    .text_boxes()
                    .iter()
                    .map(|text| (text.start, text.len, text.x.to_bits()))
                    .collect();
                (line.line_break, spans, line.rect.y.to_bits(), line.rect.height.to_bits())
            })
            .collect::<Vec<_>>()
    };
    summary(&block) == summary(&fresh)
}
