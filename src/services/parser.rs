//! Model response parser
//!
//! Turns free text into a [`GeneratedContent`]. A fenced ```json summary
//! (requested by the prompt) is read first; anything it lacks is recovered
//! with line-oriented patterns, and anything still missing takes the
//! catalog default. Parsing never fails.

use crate::catalog::Catalog;
use crate::models::{CoverDesign, GeneratedContent, GenerationRequest};
use anyhow::{Context, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

const MAX_TOC_ITEMS: usize = 12;
const MAX_HEADER_TOC_ITEMS: usize = 10;
const MAX_MONETIZATION_ITEMS: usize = 7;
const MAX_MARKETING_ITEMS: usize = 8;

/// Fields recovered from the structured summary block
#[derive(Debug, Default)]
struct Structured {
    title: Option<String>,
    subtitle: Option<String>,
    table_of_contents: Option<Vec<String>>,
    monetization: Option<Vec<String>>,
    marketing: Option<Vec<String>>,
    price_range: Option<String>,
}

pub struct ContentParser {
    catalog: Arc<Catalog>,
    json_block: Regex,
    title_patterns: Vec<Regex>,
    subtitle_patterns: Vec<Regex>,
    toc_heading: Regex,
    monetization_heading: Regex,
    marketing_heading: Regex,
    section_break: Regex,
    markdown_header: Regex,
    bullet: Regex,
    numbering: Regex,
    bare_number: Regex,
    price: Regex,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("Invalid parser pattern: {}", pattern))
}

impl ContentParser {
    pub fn new(catalog: Arc<Catalog>) -> Result<Self> {
        Ok(Self {
            catalog,
            json_block: compile(r"(?s)```json\s*(.*?)```")?,
            title_patterns: vec![
                compile(r"(?i)\bTitle:\s*(.+)")?,
                compile(r"(?i)Product Title:\s*(.+)")?,
                compile(r"(?im)^\*\*TITLE[^:\n]*:\*\*\s*(.+)")?,
                compile(r"(?m)^#\s+(.+)")?,
            ],
            subtitle_patterns: vec![
                compile(r"(?i)\bSubtitle:\s*(.+)")?,
                compile(r"(?i)Product Subtitle:\s*(.+)")?,
                compile(r"(?im)^\*\*SUBTITLE[^:\n]*:\*\*\s*(.+)")?,
            ],
            toc_heading: compile(r"(?i)(?:table of contents|\btoc\b|\bcontents\b)[^:]*:")?,
            monetization_heading: compile(r"(?i)(?:monetization|revenue|pricing)[^:]*:")?,
            marketing_heading: compile(r"(?i)(?:marketing|promotion|channels)[^:]*:")?,
            section_break: compile(r"^\*\*[A-Z]")?,
            markdown_header: compile(r"(?m)^#{1,3}\s+(.+)")?,
            bullet: compile(r"^[-•*]\s*")?,
            numbering: compile(r"^\d+\.\s*")?,
            bare_number: compile(r"^[0-9]+\.?\s*$")?,
            price: compile(
                r"(?i)(?:price|cost|pricing)[^\n]*?(\$[\d,.]+ ?- ?\$[\d,.]+|\$[\d,.]+)",
            )?,
        })
    }

    pub fn parse(&self, text: &str, request: &GenerationRequest) -> GeneratedContent {
        let (structured, content) = self.take_structured(text);
        let defaults = &self.catalog.defaults;

        let title = structured
            .title
            .or_else(|| self.first_match(&self.title_patterns, &content, true))
            .unwrap_or_else(|| format!("{} for {}", request.product_type, request.niche));

        let subtitle = structured
            .subtitle
            .or_else(|| self.first_match(&self.subtitle_patterns, &content, false))
            .unwrap_or_else(|| format!("A comprehensive guide for {}", request.target_audience));

        let table_of_contents = structured
            .table_of_contents
            .or_else(|| self.table_of_contents(&content))
            .unwrap_or_else(|| self.catalog.default_toc(&request.product_type));

        let monetization_suggestions = structured
            .monetization
            .or_else(|| {
                self.block_after(&self.monetization_heading, &content, 10, MAX_MONETIZATION_ITEMS)
            })
            .unwrap_or_else(|| defaults.monetization.clone());

        let marketing_channels = structured
            .marketing
            .or_else(|| self.block_after(&self.marketing_heading, &content, 10, MAX_MARKETING_ITEMS))
            .unwrap_or_else(|| defaults.marketing.clone());

        let price_range = structured
            .price_range
            .or_else(|| {
                self.price
                    .captures(&content)
                    .map(|caps| caps[1].to_string())
            })
            .unwrap_or_else(|| defaults.price_range.clone());

        GeneratedContent {
            cover_design: CoverDesign {
                title: title.clone(),
                subtitle: subtitle.clone(),
                colors: defaults.cover_colors.clone(),
            },
            title,
            subtitle,
            content,
            table_of_contents,
            monetization_suggestions,
            marketing_channels,
            price_range,
        }
    }

    /// Decode the last ```json block. Returns the recovered fields and the
    /// text with that block removed; a block that is not a JSON object is
    /// left in place.
    fn take_structured(&self, text: &str) -> (Structured, String) {
        let Some(block) = self.json_block.captures_iter(text).last() else {
            return (Structured::default(), text.to_string());
        };
        let (Some(whole), Some(body)) = (block.get(0), block.get(1)) else {
            return (Structured::default(), text.to_string());
        };

        let object = match serde_json::from_str::<Value>(body.as_str()) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                tracing::warn!("Structured block is not a JSON object, using heuristics");
                return (Structured::default(), text.to_string());
            }
            Err(e) => {
                tracing::warn!("Structured block is not valid JSON ({}), using heuristics", e);
                return (Structured::default(), text.to_string());
            }
        };

        let structured = Structured {
            title: json_string(object.get("title")),
            subtitle: json_string(object.get("subtitle")),
            table_of_contents: json_list(object.get("tableOfContents"), MAX_TOC_ITEMS),
            monetization: json_list(object.get("monetizationSuggestions"), MAX_MONETIZATION_ITEMS),
            marketing: json_list(object.get("marketingChannels"), MAX_MARKETING_ITEMS),
            price_range: json_string(object.get("priceRange")),
        };

        let mut content = String::with_capacity(text.len());
        content.push_str(text[..whole.start()].trim_end());
        let rest = text[whole.end()..].trim();
        if !rest.is_empty() {
            content.push_str("\n\n");
            content.push_str(rest);
        }
        (structured, content)
    }

    /// First non-empty capture across `patterns`, with `**` removed and,
    /// for titles, leading `#`s stripped
    fn first_match(&self, patterns: &[Regex], text: &str, strip_hashes: bool) -> Option<String> {
        patterns.iter().find_map(|re| {
            let caps = re.captures(text)?;
            let mut value = caps[1].replace("**", "");
            if strip_hashes {
                value = value.trim_start().trim_start_matches('#').to_string();
            }
            let value = value.trim().to_string();
            (!value.is_empty()).then_some(value)
        })
    }

    fn table_of_contents(&self, text: &str) -> Option<Vec<String>> {
        if let Some(items) = self
            .block_lines(&self.toc_heading, text)
            .map(|lines| {
                lines
                    .into_iter()
                    .filter(|l| !self.bare_number.is_match(l) && l.chars().count() > 3)
                    .take(MAX_TOC_ITEMS)
                    .collect::<Vec<_>>()
            })
            .filter(|items| !items.is_empty())
        {
            return Some(items);
        }

        let headers: Vec<String> = self
            .markdown_header
            .captures_iter(text)
            .map(|caps| caps[1].trim_start_matches('#').trim().to_string())
            .filter(|h| h.chars().count() > 3)
            .take(MAX_HEADER_TOC_ITEMS)
            .collect();
        (!headers.is_empty()).then_some(headers)
    }

    fn block_after(&self, heading: &Regex, text: &str, min_len: usize, max: usize) -> Option<Vec<String>> {
        let items: Vec<String> = self
            .block_lines(heading, text)?
            .into_iter()
            .filter(|l| l.chars().count() > min_len)
            .take(max)
            .collect();
        (!items.is_empty()).then_some(items)
    }

    /// Cleaned lines following the first line that matches `heading`, up to
    /// a blank line or a `**Heading` line
    fn block_lines(&self, heading: &Regex, text: &str) -> Option<Vec<String>> {
        let mut lines = text.lines();
        lines.by_ref().find(|line| heading.is_match(line))?;

        let items = lines
            .map(str::trim)
            .skip_while(|line| line.is_empty())
            .take_while(|line| !line.is_empty() && !self.section_break.is_match(line))
            .map(|line| self.clean_item(line))
            .filter(|line| !line.is_empty())
            .collect();
        Some(items)
    }

    fn clean_item(&self, line: &str) -> String {
        let line = self.bullet.replace(line.trim(), "");
        let line = self.numbering.replace(&line, "");
        line.trim().to_string()
    }
}

fn json_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn json_list(value: Option<&Value>, max: usize) -> Option<Vec<String>> {
    let items: Vec<String> = value?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(max)
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parser() -> ContentParser {
        ContentParser::new(Arc::new(Catalog::embedded().unwrap())).unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            product_type: "Printable Planner".into(),
            niche: "gardening".into(),
            target_audience: "new gardeners".into(),
            tone: "warm".into(),
            requirements: String::new(),
            ai_model: "kimi".into(),
        }
    }

    #[test]
    fn test_explicit_title_line() {
        let parsed = parser().parse("TITLE: The Green Thumb Planner\nSome body", &request());
        assert_eq!(parsed.title, "The Green Thumb Planner");
        assert_eq!(parsed.cover_design.title, "The Green Thumb Planner");
    }

    #[test]
    fn test_subtitle_line_is_not_a_title() {
        let parsed = parser().parse("Subtitle: Grow more\nbody", &request());
        assert_eq!(parsed.title, "Printable Planner for gardening");
        assert_eq!(parsed.subtitle, "Grow more");
    }

    #[test]
    fn test_bold_heading_and_markdown_title() {
        let bold = parser().parse("**TITLE:** Seeds of Joy\n\nText", &request());
        assert_eq!(bold.title, "Seeds of Joy");

        let h1 = parser().parse("# Backyard Harvest\n\nIntro text", &request());
        assert_eq!(h1.title, "Backyard Harvest");
    }

    #[test]
    fn test_defaults_when_nothing_matches() {
        let catalog = Catalog::embedded().unwrap();
        let parsed = parser().parse("just some prose without structure", &request());

        assert_eq!(parsed.title, "Printable Planner for gardening");
        assert_eq!(parsed.subtitle, "A comprehensive guide for new gardeners");
        assert_eq!(parsed.table_of_contents, catalog.default_toc("Printable Planner"));
        assert_eq!(parsed.monetization_suggestions, catalog.defaults.monetization);
        assert_eq!(parsed.monetization_suggestions.len(), 7);
        assert_eq!(parsed.marketing_channels.len(), 8);
        assert_eq!(parsed.price_range, "$19.99 - $97.00");
        assert_eq!(parsed.cover_design.colors, vec!["#6366F1", "#F59E0B", "#FFFFFF"]);
        assert_eq!(parsed.content, "just some prose without structure");
    }

    #[test]
    fn test_sections_by_heading() {
        let text = "\
Title: Garden Planner

Table of Contents:
1. Getting Started
2. Seasonal Calendar
- Seed Tracker
3.
Ok

**MONETIZATION STRATEGIES:**
- Sell on Etsy as a printable download
- Bundle with a seed-starting mini course
- short

Marketing Channels:
* Pinterest boards for garden planning
* Instagram reels of planner walkthroughs

Recommended price: $12.99 - $24.99
";
        let parsed = parser().parse(text, &request());
        assert_eq!(
            parsed.table_of_contents,
            vec!["Getting Started", "Seasonal Calendar", "Seed Tracker"]
        );
        assert_eq!(
            parsed.monetization_suggestions,
            vec![
                "Sell on Etsy as a printable download",
                "Bundle with a seed-starting mini course"
            ]
        );
        assert_eq!(parsed.marketing_channels.len(), 2);
        assert_eq!(parsed.price_range, "$12.99 - $24.99");
    }

    #[test]
    fn test_markdown_headers_as_toc() {
        let text = "# Garden Book\n\n## Soil Basics\ntext\n### Composting\n## Q&A\n";
        let parsed = parser().parse(text, &request());
        assert_eq!(
            parsed.table_of_contents,
            vec!["Garden Book", "Soil Basics", "Composting"]
        );
    }

    #[test]
    fn test_structured_block_wins_and_is_removed() {
        let text = "\
TITLE: Heuristic Title

Body text here.

```json
{\"title\": \"Structured Title\", \"subtitle\": \"From JSON\",
 \"tableOfContents\": [\"One\", \"\", \"Two\"],
 \"monetizationSuggestions\": [],
 \"priceRange\": \"$5 - $10\"}
```";
        let parsed = parser().parse(text, &request());
        assert_eq!(parsed.title, "Structured Title");
        assert_eq!(parsed.subtitle, "From JSON");
        assert_eq!(parsed.table_of_contents, vec!["One", "Two"]);
        // empty list falls through to the defaults
        assert_eq!(parsed.monetization_suggestions.len(), 7);
        assert_eq!(parsed.price_range, "$5 - $10");
        assert_eq!(parsed.content, "TITLE: Heuristic Title\n\nBody text here.");
    }

    #[test]
    fn test_invalid_structured_block_is_kept() {
        let text = "TITLE: Kept\n```json\nnot json\n```";
        let parsed = parser().parse(text, &request());
        assert_eq!(parsed.title, "Kept");
        assert_eq!(parsed.content, text);
    }

    #[test]
    fn test_last_json_block_wins() {
        let text = "```json\n{\"title\": \"First\"}\n```\n\n```json\n{\"title\": \"Second\"}\n```";
        let parsed = parser().parse(text, &request());
        assert_eq!(parsed.title, "Second");
        assert!(parsed.content.contains("First"));
    }

    proptest! {
        #[test]
        fn prop_parse_never_panics_and_fills_fields(text in "\\PC{0,400}") {
            let parsed = parser().parse(&text, &request());
            prop_assert!(!parsed.title.is_empty());
            prop_assert!(!parsed.table_of_contents.is_empty());
            prop_assert!(parsed.table_of_contents.len() <= MAX_TOC_ITEMS);
            prop_assert!(parsed.monetization_suggestions.len() <= MAX_MONETIZATION_ITEMS);
            prop_assert!(parsed.marketing_channels.len() <= MAX_MARKETING_ITEMS);
        }

        #[test]
        fn prop_title_line_is_verbatim(title in "[A-Za-z][A-Za-z0-9 ]{0,40}[A-Za-z0-9]") {
            let text = format!("intro\nTITLE: {}\nmore", title);
            prop_assert_eq!(parser().parse(&text, &request()).title, title);
        }
    }
}
