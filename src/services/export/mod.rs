//! Content export
//!
//! Everything that can be exported implements [`Exportable`]; the format
//! modules only see that view. Canva is the one format that answers with a
//! redirect instead of a file.

mod html;
mod json;
mod markdown;
mod pdf;
mod redirect;
mod text;

pub use html::{ContentRenderer, HtmlExporter};
pub use text::MarkdownStripper;

use crate::catalog::{Catalog, Choice};
use crate::models::{
    BlogPost, ExportFormat, ExportOptions, GeneratedContent, Meme, SocialPost,
    DEFAULT_COVER_COLORS,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Read-only view of a record for the exporters
pub trait Exportable {
    fn title(&self) -> &str;

    fn subtitle(&self) -> Option<&str> {
        None
    }

    /// Markdown body
    fn body(&self) -> &str;

    fn table_of_contents(&self) -> &[String] {
        &[]
    }

    fn monetization(&self) -> &[String] {
        &[]
    }

    fn marketing(&self) -> &[String] {
        &[]
    }

    fn price_range(&self) -> Option<&str> {
        None
    }

    fn platform(&self) -> Option<&str> {
        None
    }

    fn hashtags(&self) -> &[String] {
        &[]
    }

    fn engagement_tips(&self) -> &[String] {
        &[]
    }

    fn posting_times(&self) -> &[String] {
        &[]
    }

    /// Labelled figures such as reach or reading time
    fn metadata(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }

    fn cover_colors(&self) -> Vec<String> {
        DEFAULT_COVER_COLORS.iter().map(|c| c.to_string()).collect()
    }

    fn to_json(&self) -> Value;
}

fn non_empty(s: &str) -> Option<&str> {
    Some(s).filter(|s| !s.trim().is_empty())
}

impl Exportable for GeneratedContent {
    fn title(&self) -> &str {
        &self.title
    }
    fn subtitle(&self) -> Option<&str> {
        non_empty(&self.subtitle)
    }
    fn body(&self) -> &str {
        &self.content
    }
    fn table_of_contents(&self) -> &[String] {
        &self.table_of_contents
    }
    fn monetization(&self) -> &[String] {
        &self.monetization_suggestions
    }
    fn marketing(&self) -> &[String] {
        &self.marketing_channels
    }
    fn price_range(&self) -> Option<&str> {
        non_empty(&self.price_range)
    }
    fn cover_colors(&self) -> Vec<String> {
        self.cover_design.colors.clone()
    }
    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Exportable for SocialPost {
    fn title(&self) -> &str {
        &self.title
    }
    fn body(&self) -> &str {
        &self.content
    }
    fn platform(&self) -> Option<&str> {
        non_empty(&self.platform)
    }
    fn hashtags(&self) -> &[String] {
        &self.hashtags
    }
    fn engagement_tips(&self) -> &[String] {
        &self.engagement_tips
    }
    fn posting_times(&self) -> &[String] {
        &self.best_posting_times
    }
    fn metadata(&self) -> Vec<(&'static str, &str)> {
        vec![("Estimated Reach", self.estimated_reach.as_str())]
    }
    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Exportable for BlogPost {
    fn title(&self) -> &str {
        &self.title
    }
    fn subtitle(&self) -> Option<&str> {
        non_empty(&self.meta_description)
    }
    fn body(&self) -> &str {
        &self.content
    }
    fn hashtags(&self) -> &[String] {
        &self.hashtags
    }
    fn engagement_tips(&self) -> &[String] {
        &self.engagement_tips
    }
    fn posting_times(&self) -> &[String] {
        &self.best_posting_times
    }
    fn metadata(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("Reading Time", self.reading_time.as_str()),
            ("SEO Score", self.seo_score.as_str()),
        ]
    }
    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Exportable for Meme {
    fn title(&self) -> &str {
        &self.title
    }
    fn subtitle(&self) -> Option<&str> {
        non_empty(&self.caption)
    }
    fn body(&self) -> &str {
        &self.content
    }
    fn platform(&self) -> Option<&str> {
        non_empty(&self.platform)
    }
    fn hashtags(&self) -> &[String] {
        &self.hashtags
    }
    fn engagement_tips(&self) -> &[String] {
        &self.engagement_tips
    }
    fn posting_times(&self) -> &[String] {
        &self.best_posting_times
    }
    fn metadata(&self) -> Vec<(&'static str, &str)> {
        vec![("Viral Potential", self.viral_potential.as_str())]
    }
    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Any exportable record, as posted to the ad-hoc export endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum ExportContent {
    Product(GeneratedContent),
    Post(SocialPost),
    Blog(BlogPost),
    Meme(Meme),
}

impl ExportContent {
    pub fn as_exportable(&self) -> &dyn Exportable {
        match self {
            ExportContent::Product(c) => c,
            ExportContent::Post(c) => c,
            ExportContent::Blog(c) => c,
            ExportContent::Meme(c) => c,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutput {
    File {
        filename: String,
        mime: &'static str,
        bytes: Vec<u8>,
    },
    Redirect {
        url: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Template error: {0}")]
    Template(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

fn extension(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Pdf => "pdf",
        ExportFormat::Html | ExportFormat::Googledocs => "html",
        ExportFormat::Markdown | ExportFormat::Notion => "md",
        ExportFormat::Txt => "txt",
        ExportFormat::Json => "json",
        ExportFormat::Canva => "",
    }
}

fn mime(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Pdf => "application/pdf",
        ExportFormat::Html | ExportFormat::Googledocs => "text/html; charset=utf-8",
        ExportFormat::Markdown | ExportFormat::Notion => "text/markdown; charset=utf-8",
        ExportFormat::Txt => "text/plain; charset=utf-8",
        ExportFormat::Json => "application/json",
        ExportFormat::Canva => "text/uri-list",
    }
}

/// `{slug}-{YYYY-MM-DD}.{ext}`; the slug keeps ASCII alphanumerics, joins
/// words with `-` and is cut to 50 characters
pub fn export_filename(title: &str, ext: &str, date: NaiveDate) -> String {
    let mut slug = String::new();
    for c in title.chars() {
        if c.is_whitespace() {
            if !slug.ends_with('-') {
                slug.push('-');
            }
        } else if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        }
    }
    let slug: String = slug.chars().take(50).collect();

    format!("{}-{}.{}", slug, date.format("%Y-%m-%d"), ext)
}

pub struct ExportService {
    catalog: Arc<Catalog>,
    html: HtmlExporter,
    stripper: MarkdownStripper,
}

impl ExportService {
    pub fn new(catalog: Arc<Catalog>) -> anyhow::Result<Self> {
        Ok(Self {
            catalog,
            html: HtmlExporter::new()?,
            stripper: MarkdownStripper::new()?,
        })
    }

    pub fn export(
        &self,
        content: &dyn Exportable,
        options: &ExportOptions,
        now: DateTime<Utc>,
    ) -> Result<ExportOutput, ExportError> {
        let format = options.format;
        let bytes = match format {
            ExportFormat::Canva => {
                return Ok(ExportOutput::Redirect {
                    url: redirect::canva_url(content),
                })
            }
            ExportFormat::Pdf => pdf::render(
                content,
                options,
                &self.stripper,
                &self.catalog.defaults.price_range,
            )?,
            ExportFormat::Html => self.html.render(content, options, now)?.into_bytes(),
            ExportFormat::Googledocs => self.html.render_google_docs(content)?.into_bytes(),
            ExportFormat::Markdown => markdown::render(content, options, now).into_bytes(),
            ExportFormat::Notion => markdown::render_notion(content).into_bytes(),
            ExportFormat::Txt => text::render(content, options, &self.stripper).into_bytes(),
            ExportFormat::Json => json::render(content, options, now)?.into_bytes(),
        };

        tracing::debug!("Exported {:?} as {} ({} bytes)", content.title(), format, bytes.len());
        Ok(ExportOutput::File {
            filename: export_filename(content.title(), extension(format), now.date_naive()),
            mime: mime(format),
            bytes,
        })
    }

    pub fn available_formats(&self) -> &[Choice] {
        &self.catalog.export.formats
    }

    pub fn available_templates(&self) -> &[Choice] {
        &self.catalog.export.templates
    }

    /// Usage note for a format; unknown formats get the generic one
    pub fn instructions(&self, format: &str) -> &str {
        self.catalog.export_instructions(format)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{CoverDesign, GeneratedContent, SocialPost};

    pub fn product() -> GeneratedContent {
        GeneratedContent {
            title: "Indoor Herb Garden".into(),
            subtitle: "Grow fresh herbs all year".into(),
            content: "# Getting Started\n\nPick a **sunny** window and a few *small* pots.\n\n## Watering\n\nUse `room temperature` water. See [the chart](https://example.com/chart).".into(),
            table_of_contents: vec!["Getting Started".into(), "Watering".into()],
            monetization_suggestions: vec!["Sell a printable planting calendar".into()],
            marketing_channels: vec!["Pinterest boards".into()],
            price_range: "$9.99 - $19.99".into(),
            cover_design: CoverDesign::new("Indoor Herb Garden", "Grow fresh herbs all year"),
        }
    }

    pub fn post() -> SocialPost {
        SocialPost {
            title: "Basil Tips".into(),
            content: "Pinch the tops weekly.".into(),
            hashtags: vec!["#basil".into(), "#herbs".into()],
            call_to_action: None,
            platform: "instagram".into(),
            estimated_reach: "1,200+ impressions".into(),
            engagement_tips: vec!["Reply within an hour".into()],
            best_posting_times: vec!["6-9 AM".into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExportFormat;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn service() -> ExportService {
        ExportService::new(Arc::new(Catalog::embedded().unwrap())).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename("Indoor Herb Garden: 2024 Edition!", "pdf", date()),
            "indoor-herb-garden-2024-edition-2024-03-05.pdf"
        );
        assert_eq!(export_filename("Café   au lait", "md", date()), "caf-au-lait-2024-03-05.md");
        let long = "word ".repeat(30);
        let name = export_filename(&long, "txt", date());
        assert_eq!(name.len(), 50 + "-2024-03-05.txt".len());
    }

    #[test]
    fn test_every_file_format_names_and_types_output() {
        let svc = service();
        let content = fixtures::product();
        for (format, expected_name, expected_mime) in [
            (ExportFormat::Pdf, "indoor-herb-garden-2024-03-05.pdf", "application/pdf"),
            (ExportFormat::Html, "indoor-herb-garden-2024-03-05.html", "text/html; charset=utf-8"),
            (ExportFormat::Markdown, "indoor-herb-garden-2024-03-05.md", "text/markdown; charset=utf-8"),
            (ExportFormat::Txt, "indoor-herb-garden-2024-03-05.txt", "text/plain; charset=utf-8"),
            (ExportFormat::Json, "indoor-herb-garden-2024-03-05.json", "application/json"),
            (ExportFormat::Notion, "indoor-herb-garden-2024-03-05.md", "text/markdown; charset=utf-8"),
            (ExportFormat::Googledocs, "indoor-herb-garden-2024-03-05.html", "text/html; charset=utf-8"),
        ] {
            match svc.export(&content, &ExportOptions::new(format), now()).unwrap() {
                ExportOutput::File { filename, mime, bytes } => {
                    assert_eq!(filename, expected_name);
                    assert_eq!(mime, expected_mime);
                    assert!(!bytes.is_empty());
                }
                other => panic!("unexpected output for {}: {:?}", format, other),
            }
        }
    }

    #[test]
    fn test_canva_is_a_redirect() {
        let out = service()
            .export(&fixtures::product(), &ExportOptions::new(ExportFormat::Canva), now())
            .unwrap();
        assert!(matches!(out, ExportOutput::Redirect { url } if url.starts_with("https://www.canva.com/design?")));
    }

    #[test]
    fn test_markdown_and_text_preserve_title_and_body() {
        let svc = service();
        let content = fixtures::product();
        let read = |format| match svc.export(&content, &ExportOptions::new(format), now()).unwrap() {
            ExportOutput::File { bytes, .. } => String::from_utf8(bytes).unwrap(),
            ExportOutput::Redirect { .. } => unreachable!(),
        };

        let md = read(ExportFormat::Markdown);
        let txt = read(ExportFormat::Txt);
        assert!(md.contains(&content.content));
        assert!(md.starts_with("# Indoor Herb Garden\n"));
        assert!(txt.starts_with("Indoor Herb Garden\n"));
        assert!(txt.contains(&svc.stripper.strip(&content.content)));
    }

    #[test]
    fn test_catalog_tables() {
        let svc = service();
        assert_eq!(svc.available_formats().len(), 8);
        assert_eq!(svc.available_templates()[0].id, "professional");
        assert!(svc.instructions("PDF").starts_with("The PDF will be generated"));
        assert_eq!(
            svc.instructions("docx"),
            "Download the file and use it according to your needs."
        );
    }

    #[test]
    fn test_export_content_envelope() {
        let json = serde_json::json!({
            "type": "post",
            "content": serde_json::to_value(fixtures::post()).unwrap()
        });
        let parsed: ExportContent = serde_json::from_value(json).unwrap();
        let view = parsed.as_exportable();
        assert_eq!(view.title(), "Basil Tips");
        assert_eq!(view.platform(), Some("instagram"));
        assert_eq!(view.metadata(), vec![("Estimated Reach", "1,200+ impressions")]);
        assert!(view.table_of_contents().is_empty());
    }

    proptest! {
        #[test]
        fn prop_filename_shape(title in "\\PC{0,80}") {
            let name = export_filename(&title, "md", date());
            prop_assert!(name.ends_with("-2024-03-05.md"));
            let slug = &name[..name.len() - "-2024-03-05.md".len()];
            prop_assert!(slug.chars().count() <= 50);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }
    }
}
