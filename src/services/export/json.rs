//! Structured JSON export

use super::{ExportError, Exportable};
use crate::models::ExportOptions;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::json;

const EXPORT_VERSION: &str = "1.0";

pub(super) fn render(
    content: &dyn Exportable,
    options: &ExportOptions,
    now: DateTime<Utc>,
) -> Result<String, ExportError> {
    let mut doc = json!({
        "metadata": {
            "exportedAt": now.to_rfc3339_opts(SecondsFormat::Millis, true),
            "format": "json",
            "version": EXPORT_VERSION,
            "options": options,
        },
        "content": content.to_json(),
    });
    if let Some(branding) = &options.custom_branding {
        doc["branding"] = serde_json::to_value(branding).map_err(anyhow::Error::from)?;
    }

    Ok(serde_json::to_string_pretty(&doc).map_err(anyhow::Error::from)?)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::models::{CustomBranding, ExportFormat};
    use chrono::TimeZone;
    use serde_json::Value;

    #[test]
    fn test_json_envelope() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let mut options = ExportOptions::new(ExportFormat::Json);
        let plain: Value =
            serde_json::from_str(&render(&fixtures::product(), &options, now).unwrap()).unwrap();

        assert_eq!(plain["metadata"]["exportedAt"], "2024-03-05T12:00:00.000Z");
        assert_eq!(plain["metadata"]["format"], "json");
        assert_eq!(plain["metadata"]["version"], "1.0");
        assert_eq!(plain["metadata"]["options"]["includeCover"], true);
        assert_eq!(plain["content"]["title"], "Indoor Herb Garden");
        assert_eq!(plain["content"]["priceRange"], "$9.99 - $19.99");
        assert!(plain.get("branding").is_none());

        options.custom_branding = Some(CustomBranding {
            company_name: Some("Leaf & Co".into()),
            ..Default::default()
        });
        let branded: Value =
            serde_json::from_str(&render(&fixtures::product(), &options, now).unwrap()).unwrap();
        assert_eq!(branded["branding"]["companyName"], "Leaf & Co");
    }
}
