//! Export option models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target serialization of a content record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Html,
    Markdown,
    Txt,
    Json,
    Canva,
    Notion,
    Googledocs,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 8] = [
        ExportFormat::Pdf,
        ExportFormat::Html,
        ExportFormat::Markdown,
        ExportFormat::Txt,
        ExportFormat::Json,
        ExportFormat::Canva,
        ExportFormat::Notion,
        ExportFormat::Googledocs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Html => "html",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Txt => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Canva => "canva",
            ExportFormat::Notion => "notion",
            ExportFormat::Googledocs => "googledocs",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ExportFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| anyhow::anyhow!("Unsupported export format: {}", s))
    }
}

/// HTML/PDF styling preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportTemplate {
    #[default]
    Professional,
    Modern,
    Minimal,
    Creative,
}

impl ExportTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportTemplate::Professional => "professional",
            ExportTemplate::Modern => "modern",
            ExportTemplate::Minimal => "minimal",
            ExportTemplate::Creative => "creative",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomBranding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Primary and accent colors, in that order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fonts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl CustomBranding {
    pub fn primary_color(&self) -> Option<&str> {
        self.colors.as_ref().and_then(|c| c.first()).map(String::as_str)
    }

    pub fn accent_color(&self) -> Option<&str> {
        self.colors.as_ref().and_then(|c| c.get(1)).map(String::as_str)
    }

    pub fn font(&self) -> Option<&str> {
        self.fonts.as_ref().and_then(|f| f.first()).map(String::as_str)
    }
}

/// Page size for PDF exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

fn default_true() -> bool {
    true
}

/// What to export and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub format: ExportFormat,
    #[serde(default = "default_true")]
    pub include_table_of_contents: bool,
    #[serde(default = "default_true")]
    pub include_cover: bool,
    #[serde(default = "default_true")]
    pub include_monetization: bool,
    #[serde(default = "default_true")]
    pub include_marketing: bool,
    #[serde(default)]
    pub include_metadata: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_branding: Option<CustomBranding>,
    #[serde(default)]
    pub template: ExportTemplate,
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default)]
    pub orientation: Orientation,
}

impl ExportOptions {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            include_table_of_contents: true,
            include_cover: true,
            include_monetization: true,
            include_marketing: true,
            include_metadata: false,
            custom_branding: None,
            template: ExportTemplate::default(),
            page_size: PageSize::default(),
            orientation: Orientation::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse_is_case_insensitive() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!(
            "googledocs".parse::<ExportFormat>().unwrap(),
            ExportFormat::Googledocs
        );
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_options_defaults_from_minimal_json() {
        let options: ExportOptions =
            serde_json::from_value(serde_json::json!({ "format": "markdown" })).unwrap();
        assert_eq!(options, ExportOptions::new(ExportFormat::Markdown));
        assert_eq!(options.template, ExportTemplate::Professional);
    }

    #[test]
    fn test_branding_accessors() {
        let branding = CustomBranding {
            colors: Some(vec!["#111111".into()]),
            ..Default::default()
        };
        assert_eq!(branding.primary_color(), Some("#111111"));
        assert_eq!(branding.accent_color(), None);
        assert_eq!(branding.font(), None);
    }
}
