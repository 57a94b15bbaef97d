//! Canva design link

use super::Exportable;

const CANVA_DESIGN_URL: &str = "https://www.canva.com/design";

/// Opens an ebook template in Canva with the title and cover colors filled in
pub(super) fn canva_url(content: &dyn Exportable) -> String {
    format!(
        "{}?template=ebook&title={}&colors={}",
        CANVA_DESIGN_URL,
        urlencoding::encode(content.title()),
        urlencoding::encode(&content.cover_colors().join(","))
    )
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;

    #[test]
    fn test_canva_url() {
        assert_eq!(
            canva_url(&fixtures::product()),
            "https://www.canva.com/design?template=ebook&title=Indoor%20Herb%20Garden&colors=%236366F1%2C%23F59E0B%2C%23FFFFFF"
        );
    }

    #[test]
    fn test_canva_url_for_social_content_uses_default_colors() {
        let url = canva_url(&fixtures::post());
        assert!(url.contains("title=Basil%20Tips"));
        assert!(url.ends_with("colors=%236366F1%2C%23F59E0B%2C%23FFFFFF"));
    }
}
