//! Koala inline layout CLI
//!
//! Lays out a string of text into lines at a given width and prints the
//! line boxes. Useful for checking line breaks and bidi reordering
//! without a renderer.
//!
//! Set `RUST_LOG=koala_inline=debug` to see break and reuse decisions.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use koala_common::warning::clear_warnings;
use koala_inline::{
    ApproximateFontMetrics, BlockGeometry, EdgeSizes, InlineBlock, InlineContent,
    InlineLayoutResult, InlineStyle, LayoutSettings, RootLineBox, TextAlign, TextDirection,
    Truncation, WhiteSpace, WordBreak,
};
use owo_colors::OwoColorize;

/// Koala inline layout: break text into lines and show the line boxes
#[derive(Parser, Debug)]
#[command(name = "koala-inline")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r"EXAMPLES:
    # Wrap a sentence at 200px
    koala-inline --width 200 'The quick brown fox jumps over the lazy dog'

    # Right-to-left paragraph with an embedded Latin word
    koala-inline --direction rtl 'שלום world שלום'

    # Preserved white space, machine-readable output
    koala-inline --white-space pre-wrap --json 'a   b   c'
")]
struct Cli {
    /// Text to lay out
    #[arg(value_name = "TEXT")]
    text: String,

    /// Content width of the block in pixels
    #[arg(long, default_value = "300")]
    width: f32,

    /// Base direction: ltr or rtl
    #[arg(long, default_value = "ltr")]
    direction: TextDirection,

    /// white-space: normal, pre, pre-wrap, pre-line or nowrap
    #[arg(long, default_value = "normal")]
    white_space: WhiteSpace,

    /// word-break: normal, break-all or break-word
    #[arg(long, default_value = "normal")]
    word_break: WordBreak,

    /// text-align: start, end, left, right, center or justify
    #[arg(long, default_value = "start")]
    text_align: TextAlign,

    /// Font size in pixels
    #[arg(long, default_value = "16")]
    font_size: f32,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// JSON file with layout settings
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<LayoutSettings> {
    let Some(path) = path else {
        return Ok(LayoutSettings::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing settings in {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    clear_warnings();

    let settings = load_settings(cli.settings.as_ref())?;
    let style = InlineStyle {
        direction: cli.direction,
        white_space: cli.white_space,
        word_break: cli.word_break,
        text_align: cli.text_align,
        font_size: cli.font_size,
        ..InlineStyle::default()
    };

    let mut content = InlineContent::new(style.clone());
    let _ = content.append_text(&cli.text, style);
    let geometry = BlockGeometry::new(cli.width, EdgeSizes::default(), EdgeSizes::default());
    let mut block = InlineBlock::new(content, geometry, settings);
    let result = block.layout_inline_content(&ApproximateFontMetrics, false);
    log::debug!("Laid out {} characters into {} lines", cli.text.chars().count(), block.lines().len());

    if cli.json {
        let output = serde_json::json!({
            "result": result,
            "lines": block.lines(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_block(&block, &result);
    }
    Ok(())
}

/// Print every line with its geometry and its text boxes in visual order.
fn print_block(block: &InlineBlock, result: &InlineLayoutResult) {
    println!(
        "{} width={:.1} height={:.1} lines={}",
        "=== Block ===".bold(),
        block.geometry().content_width,
        result.height,
        block.lines().len()
    );
    for (index, line) in block.lines().iter().enumerate() {
        print_line(block, index, line);
    }
}

fn print_line(block: &InlineBlock, index: usize, line: &RootLineBox) {
    let r = &line.rect;
    println!(
        "{} x={:.1} y={:.1} w={:.1} h={:.1} baseline={:.1}{}",
        format!("[line {index}]").cyan(),
        r.x,
        r.y,
        r.width,
        r.height,
        line.baseline,
        if line.ends_with_break { " (forced break)" } else { "" }
    );
    for text in line.text_boxes() {
        let chars = &block.content().text(text.item)[text.start..text.end()];
        let visible = match text.truncation {
            Truncation::None => chars.len(),
            Truncation::Partial(n) => n,
            Truncation::Full => 0,
        };
        let shown: String = chars[..visible].iter().collect();
        let direction = if text.is_rtl() { "rtl".yellow().to_string() } else { "ltr".green().to_string() };
        println!(
            "  {direction} level={} x={:.1} w={:.1} \"{}\"",
            text.level,
            text.x,
            text.width,
            shown.replace('\n', "\\n")
        );
    }
    if let Some(ellipsis) = &line.ellipsis {
        println!("  {} x={:.1}", "ellipsis".dimmed(), ellipsis.x);
    }
}
