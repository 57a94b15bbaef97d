//! PDF export
//!
//! Lays the record out as Typst markup (cover, contents, body, closing
//! sections, running footer) and compiles it with the embedded Typst engine.
//! Every piece of record text enters the markup as a string literal, so it
//! is typeset verbatim in any script and never parsed as markup.

use super::{ExportError, Exportable, MarkdownStripper};
use crate::models::{ExportOptions, Orientation, PageSize};
use typst_as_lib::TypstEngine;

const PRIMARY: &str = "rgb(99, 102, 241)";
const ACCENT: &str = "rgb(245, 158, 11)";
const TEXT: &str = "rgb(31, 41, 55)";
const RULE: &str = "rgb(200, 200, 200)";
const MUTED: &str = "rgb(100, 100, 100)";

const MARGIN_MM: u32 = 20;
const FONT_SIZE_PT: u32 = 12;
const FOOTER_TITLE_MAX: usize = 50;

/// Cover and contents take the first two pages
const FIRST_BODY_PAGE: usize = 3;

/// A compiled document
#[derive(Debug, Clone)]
pub struct CompiledPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Typst string literal for `text`
pub fn quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            '\t' => out.push(' '),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `text` as a markup fragment
fn literal(text: &str) -> String {
    format!("#{}", quoted(text))
}

fn paper(size: PageSize) -> &'static str {
    match size {
        PageSize::A4 => "a4",
        PageSize::Letter => "us-letter",
        PageSize::Legal => "us-legal",
    }
}

fn footer_title(title: &str) -> String {
    if title.chars().count() > FOOTER_TITLE_MAX {
        format!("{}…", title.chars().take(FOOTER_TITLE_MAX - 3).collect::<String>())
    } else {
        title.to_string()
    }
}

/// Document-wide rules: paper, margins, body text and the running footer
/// (rule, page number, short title from the second page on)
fn preamble(out: &mut String, title: &str, options: &ExportOptions) {
    out.push_str(&format!("#set document(title: {})\n", quoted(title)));
    out.push_str(&format!("#let footer-title = {}\n", quoted(&footer_title(title))));
    out.push_str(&format!(
        "#set page(paper: \"{}\", flipped: {}, margin: {}mm, footer: context {{\n",
        paper(options.page_size),
        options.orientation == Orientation::Landscape,
        MARGIN_MM
    ));
    out.push_str(&format!("  line(length: 100%, stroke: 0.5pt + {})\n", RULE));
    out.push_str(&format!("  set text(size: 10pt, fill: {})\n", MUTED));
    out.push_str("  let n = counter(page).get().first()\n");
    out.push_str("  grid(columns: (1fr, auto, 1fr), if n > 1 [#footer-title] else [], [#n], [])\n");
    out.push_str("})\n");
    out.push_str(&format!("#set text(size: {}pt, fill: {})\n", FONT_SIZE_PT, TEXT));
    out.push_str("#set par(leading: 0.75em)\n");
    out.push_str(&format!(
        "#show heading: set block(above: 10mm, below: 5mm)\n#show heading: set text(size: {}pt, weight: \"bold\")\n",
        FONT_SIZE_PT
    ));
    // later rules win, so the per-level sizes come last
    for (level, size) in [(1, 18), (2, 16), (3, 14)] {
        out.push_str(&format!(
            "#show heading.where(level: {}): set text(size: {}pt)\n",
            level, size
        ));
    }
    out.push('\n');
}

fn cover(out: &mut String, content: &dyn Exportable, price: &str) {
    out.push_str(&format!("#page(fill: {})[\n", PRIMARY));
    out.push_str("  #set align(center + horizon)\n");
    out.push_str("  #set text(fill: white)\n");
    out.push_str(&format!(
        "  #text(size: 28pt, weight: \"bold\")[{}]\n",
        literal(content.title())
    ));
    if let Some(subtitle) = content.subtitle() {
        out.push_str("  #v(20mm)\n");
        out.push_str(&format!("  #text(size: 16pt)[{}]\n", literal(subtitle)));
    }
    out.push_str(&format!(
        "  #place(bottom + center, dy: -20mm, text(size: 14pt, weight: \"bold\", fill: {})[{}])\n",
        ACCENT,
        literal(&format!("Value: {}", price))
    ));
    out.push_str("]\n\n");
}

fn table_of_contents(out: &mut String, items: &[String]) {
    out.push_str("#text(size: 18pt, weight: \"bold\")[Table of Contents]\n");
    out.push_str("#v(8mm)\n");
    out.push_str("#grid(columns: (1fr, auto), row-gutter: 0.75em,\n");
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!(
            "  [{}], [{}],\n",
            literal(&format!("{}. {}", i + 1, item)),
            i + FIRST_BODY_PAGE
        ));
    }
    out.push_str(")\n#pagebreak()\n\n");
}

/// Markdown headings become Typst headings; other lines are stripped of
/// inline markup and kept as forced line breaks inside their paragraph.
fn body(out: &mut String, markdown: &str, stripper: &MarkdownStripper) {
    for block in markdown.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
        let mut lines: Vec<String> = Vec::new();
        for line in block.lines().map(str::trim) {
            let level = line.chars().take_while(|c| *c == '#').count();
            // "#tag" lines are hashtags, not headings
            if level > 0 && (line.len() == level || line[level..].starts_with(' ')) {
                flush_paragraph(out, &mut lines);
                let level = level.min(6);
                let text = stripper.strip(line.trim_start_matches('#').trim());
                out.push_str(&format!(
                    "#heading(level: {}, outlined: false)[{}]\n\n",
                    level,
                    literal(&text)
                ));
            } else if !line.is_empty() {
                lines.push(literal(&stripper.strip(line)));
            }
        }
        flush_paragraph(out, &mut lines);
    }
}

fn flush_paragraph(out: &mut String, lines: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    out.push_str(&lines.join(" \\\n"));
    out.push_str("\n\n");
    lines.clear();
}

fn section(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str("#v(15mm)\n");
    out.push_str(&format!(
        "#block(sticky: true, text(size: 16pt, weight: \"bold\", fill: {})[{}])\n",
        PRIMARY,
        literal(title)
    ));
    out.push_str("#list(marker: [•], indent: 5mm,\n");
    for item in items {
        out.push_str(&format!("  [{}],\n", literal(item)));
    }
    out.push_str(")\n\n");
}

/// The full Typst source for `content`
pub fn markup(
    content: &dyn Exportable,
    options: &ExportOptions,
    stripper: &MarkdownStripper,
    default_price: &str,
) -> String {
    let mut out = String::new();
    preamble(&mut out, content.title(), options);

    if options.include_cover {
        cover(&mut out, content, content.price_range().unwrap_or(default_price));
    }
    let toc = content.table_of_contents();
    if options.include_table_of_contents && !toc.is_empty() {
        table_of_contents(&mut out, toc);
    }

    body(&mut out, content.body(), stripper);

    if options.include_monetization {
        section(&mut out, "Monetization Strategies", content.monetization());
    }
    if options.include_marketing {
        section(&mut out, "Marketing Channels", content.marketing());
    }
    section(&mut out, "Engagement Tips", content.engagement_tips());
    out
}

/// Compile Typst source to PDF bytes
pub fn compile(source: &str) -> Result<CompiledPdf, ExportError> {
    let engine = TypstEngine::builder()
        .main_file(source.to_string())
        .search_fonts_with(Default::default())
        .build();

    let compiled = engine.compile();
    for warning in &compiled.warnings {
        tracing::debug!("Typst warning: {:?}", warning.message);
    }
    let document = compiled
        .output
        .map_err(|e| ExportError::Pdf(format!("{:?}", e)))?;

    let bytes = typst_pdf::pdf(&document, &typst_pdf::PdfOptions::default())
        .map_err(|e| ExportError::Pdf(format!("{:?}", e)))?;

    Ok(CompiledPdf {
        page_count: document.pages.len(),
        bytes,
    })
}

pub(super) fn render(
    content: &dyn Exportable,
    options: &ExportOptions,
    stripper: &MarkdownStripper,
    default_price: &str,
) -> Result<Vec<u8>, ExportError> {
    let source = markup(content, options, stripper, default_price);
    Ok(compile(&source)?.bytes)
}
