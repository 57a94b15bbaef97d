//! Markdown and Notion exports

use super::Exportable;
use crate::models::ExportOptions;
use chrono::{DateTime, Utc};

fn bullets(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("## {}\n\n", heading));
    for item in items {
        out.push_str(&format!("- {}\n", item));
    }
    out.push('\n');
}

pub(super) fn render(content: &dyn Exportable, options: &ExportOptions, now: DateTime<Utc>) -> String {
    let mut md = String::new();

    if options.include_cover {
        md.push_str(&format!("# {}\n\n", content.title()));
        if let Some(subtitle) = content.subtitle() {
            md.push_str(&format!("## {}\n\n", subtitle));
        }
        if let Some(price) = content.price_range() {
            md.push_str(&format!("**Price Range:** {}\n\n", price));
        }
        if let Some(platform) = content.platform() {
            md.push_str(&format!("**Platform:** {}\n\n", platform));
        }
        md.push_str("---\n\n");
    }

    let toc = content.table_of_contents();
    if options.include_table_of_contents && !toc.is_empty() {
        md.push_str("## Table of Contents\n\n");
        for (i, item) in toc.iter().enumerate() {
            md.push_str(&format!("{}. {}\n", i + 1, item));
        }
        md.push_str("\n---\n\n");
    }

    md.push_str(content.body());
    md.push_str("\n\n");

    if options.include_monetization {
        bullets(&mut md, "💰 Monetization Strategies", content.monetization());
    }
    if options.include_marketing {
        bullets(&mut md, "📢 Marketing Channels", content.marketing());
    }
    if !content.hashtags().is_empty() {
        md.push_str(&format!("## #️⃣ Hashtags\n\n{}\n\n", content.hashtags().join(" ")));
    }
    bullets(&mut md, "🚀 Engagement Tips", content.engagement_tips());
    bullets(&mut md, "⏰ Best Posting Times", content.posting_times());

    if options.include_metadata {
        md.push_str("## 📊 Metadata\n\n");
        for (label, value) in content.metadata() {
            md.push_str(&format!("**{}:** {}\n", label, value));
        }
        md.push_str(&format!("**Generated:** {}\n\n", now.to_rfc3339()));
    }

    md
}

/// Page layout for Notion's markdown import
pub(super) fn render_notion(content: &dyn Exportable) -> String {
    let mut sections = Vec::new();

    let mut head = format!("# {}\n\n", content.title());
    if let Some(subtitle) = content.subtitle() {
        head.push_str(&format!("## {}\n\n", subtitle));
    }
    sections.push(head);

    let list = |heading: &str, items: &[String], numbered: bool| {
        let lines: Vec<String> = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if numbered {
                    format!("{}. {}", i + 1, item)
                } else {
                    format!("• {}", item)
                }
            })
            .collect();
        format!("## {}\n\n{}\n\n", heading, lines.join("\n"))
    };

    if !content.table_of_contents().is_empty() {
        sections.push(list("Table of Contents", content.table_of_contents(), true));
    }
    sections.push(format!("## Content\n\n{}\n\n", content.body()));
    if !content.monetization().is_empty() {
        sections.push(list("Monetization Strategies", content.monetization(), false));
    }
    if !content.marketing().is_empty() {
        sections.push(list("Marketing Channels", content.marketing(), false));
    }
    if let Some(price) = content.price_range() {
        sections.push(format!("## Price Range\n\n{}\n\n", price));
    }
    sections.push("*Generated by AI Digital Product Creator*".to_string());

    sections.join("---\n\n")
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::models::ExportFormat;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_markdown_layout() {
        let md = render(&fixtures::product(), &ExportOptions::new(ExportFormat::Markdown), now());
        assert!(md.starts_with(
            "# Indoor Herb Garden\n\n## Grow fresh herbs all year\n\n**Price Range:** $9.99 - $19.99\n\n---\n\n## Table of Contents\n\n1. Getting Started\n2. Watering\n\n---\n\n# Getting Started",
        ));
        assert!(md.contains("## 💰 Monetization Strategies\n\n- Sell a printable planting calendar\n"));
        assert!(md.contains("## 📢 Marketing Channels\n\n- Pinterest boards\n"));
        assert!(!md.contains("Metadata"));
    }

    #[test]
    fn test_markdown_flags() {
        let mut options = ExportOptions::new(ExportFormat::Markdown);
        options.include_cover = false;
        options.include_table_of_contents = false;
        options.include_marketing = false;
        options.include_metadata = true;

        let md = render(&fixtures::product(), &options, now());
        assert!(md.starts_with("# Getting Started"));
        assert!(!md.contains("Marketing Channels"));
        assert!(md.contains("## 📊 Metadata\n\n**Generated:** 2024-03-05T12:00:00+00:00\n"));
    }

    #[test]
    fn test_markdown_social_post() {
        let mut options = ExportOptions::new(ExportFormat::Markdown);
        options.include_metadata = true;
        let md = render(&fixtures::post(), &options, now());

        assert!(md.contains("**Platform:** instagram\n"));
        assert!(md.contains("## #️⃣ Hashtags\n\n#basil #herbs\n"));
        assert!(md.contains("## 🚀 Engagement Tips\n\n- Reply within an hour\n"));
        assert!(md.contains("**Estimated Reach:** 1,200+ impressions\n"));
        assert!(!md.contains("Table of Contents"));
    }

    #[test]
    fn test_notion_layout() {
        let notion = render_notion(&fixtures::product());
        assert!(notion.starts_with("# Indoor Herb Garden\n\n## Grow fresh herbs all year\n\n---\n\n## Table of Contents\n\n1. Getting Started\n2. Watering\n\n---\n\n## Content\n\n"));
        assert!(notion.contains("## Monetization Strategies\n\n• Sell a printable planting calendar\n\n---\n\n"));
        assert!(notion.contains("## Price Range\n\n$9.99 - $19.99\n\n---\n\n"));
        assert!(notion.ends_with("*Generated by AI Digital Product Creator*"));
    }
}
