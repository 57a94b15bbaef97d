//! Plain text export

use super::Exportable;
use crate::models::ExportOptions;
use regex::Regex;

const RULE_WIDTH: usize = 50;

/// Removes markdown markup, keeping the readable text
pub struct MarkdownStripper {
    heading: Regex,
    image: Regex,
    link: Regex,
    bold: Regex,
    italic: Regex,
    code: Regex,
}

impl MarkdownStripper {
    pub fn new() -> anyhow::Result<Self> {
        let re = |p: &str| Regex::new(p).map_err(|e| anyhow::anyhow!("Regex error: {}", e));
        Ok(Self {
            heading: re(r"(?m)^#+\s*")?,
            image: re(r"!\[[^\]]*\]\([^)]*\)")?,
            link: re(r"\[([^\]]+)\]\([^)]*\)")?,
            bold: re(r"\*\*(.+?)\*\*")?,
            italic: re(r"\*(.+?)\*")?,
            code: re(r"`(.+?)`")?,
        })
    }

    pub fn strip(&self, markdown: &str) -> String {
        // images go first, their syntax contains a link
        let text = self.heading.replace_all(markdown, "");
        let text = self.image.replace_all(&text, "");
        let text = self.link.replace_all(&text, "$1");
        let text = self.bold.replace_all(&text, "$1");
        let text = self.italic.replace_all(&text, "$1");
        self.code.replace_all(&text, "$1").into_owned()
    }
}

fn numbered(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(heading);
    out.push_str("\n\n");
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, item));
    }
    out.push('\n');
}

pub(super) fn render(
    content: &dyn Exportable,
    options: &ExportOptions,
    stripper: &MarkdownStripper,
) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    if options.include_cover {
        out.push_str(content.title());
        out.push('\n');
        if let Some(subtitle) = content.subtitle() {
            out.push_str(subtitle);
            out.push('\n');
        }
        if let Some(price) = content.price_range() {
            out.push_str(&format!("\nPrice Range: {}\n", price));
        }
        if let Some(platform) = content.platform() {
            out.push_str(&format!("Platform: {}\n", platform));
        }
        out.push_str(&format!("\n{}\n\n", rule));
    }

    if options.include_table_of_contents && !content.table_of_contents().is_empty() {
        numbered(&mut out, "TABLE OF CONTENTS", content.table_of_contents());
        out.push_str(&format!("{}\n\n", rule));
    }

    out.push_str(&stripper.strip(content.body()));
    out.push_str("\n\n");

    if options.include_monetization {
        numbered(&mut out, "MONETIZATION STRATEGIES", content.monetization());
    }
    if options.include_marketing {
        numbered(&mut out, "MARKETING CHANNELS", content.marketing());
    }
    if !content.hashtags().is_empty() {
        out.push_str(&format!("HASHTAGS\n\n{}\n\n", content.hashtags().join(" ")));
    }
    numbered(&mut out, "ENGAGEMENT TIPS", content.engagement_tips());

    out
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::models::ExportFormat;

    #[test]
    fn test_strip() {
        let stripper = MarkdownStripper::new().unwrap();
        assert_eq!(
            stripper.strip("## Title\n\nSome **bold**, *italic* and `code`."),
            "Title\n\nSome bold, italic and code."
        );
        assert_eq!(
            stripper.strip("See [the docs](https://x.y) ![chart](c.png)here"),
            "See the docs here"
        );
        assert_eq!(stripper.strip("* a list\n* item"), "* a list\n* item");
    }

    #[test]
    fn test_text_layout() {
        let stripper = MarkdownStripper::new().unwrap();
        let out = render(
            &fixtures::product(),
            &ExportOptions::new(ExportFormat::Txt),
            &stripper,
        );

        assert!(out.starts_with(
            "Indoor Herb Garden\nGrow fresh herbs all year\n\nPrice Range: $9.99 - $19.99\n\n=====",
        ));
        assert!(out.contains("TABLE OF CONTENTS\n\n1. Getting Started\n2. Watering\n"));
        assert!(out.contains("Getting Started\n\nPick a sunny window"));
        assert!(out.contains("See the chart."));
        assert!(out.contains("MONETIZATION STRATEGIES\n\n1. Sell a printable planting calendar\n"));
        assert!(out.contains("MARKETING CHANNELS\n\n1. Pinterest boards\n"));
        assert!(!out.contains("HASHTAGS"));
    }

    #[test]
    fn test_text_social_post() {
        let stripper = MarkdownStripper::new().unwrap();
        let mut options = ExportOptions::new(ExportFormat::Txt);
        options.include_cover = false;
        let out = render(&fixtures::post(), &options, &stripper);

        assert!(out.starts_with("Pinch the tops weekly.\n\n"));
        assert!(out.contains("HASHTAGS\n\n#basil #herbs\n"));
        assert!(out.contains("ENGAGEMENT TIPS\n\n1. Reply within an hour\n"));
    }
}
