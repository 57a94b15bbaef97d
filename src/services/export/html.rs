//! HTML and Google Docs exports

use super::{ExportError, Exportable};
use crate::models::{ExportOptions, DEFAULT_COVER_COLORS};
use chrono::{DateTime, Datelike, Utc};
use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;
use std::error::Error as _;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use tera::{Context, Tera};

const EXPORT_TEMPLATE: &str = "export.html";
const GOOGLE_DOCS_TEMPLATE: &str = "googledocs.html";
const DEFAULT_FONT: &str = "Inter, system-ui, sans-serif";
const CODE_THEME: &str = "InspiredGitHub";

/// Markdown to HTML with highlighted code blocks.
///
/// Generated text is untrusted, so raw HTML in the source is emitted as
/// escaped text rather than passed through.
pub struct ContentRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for ContentRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentRenderer {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    pub fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);

        let events = self.process_events(Parser::new_ext(markdown, options));
        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());
        out
    }

    fn process_events<'a>(&self, parser: Parser<'a>) -> Vec<Event<'a>> {
        let mut events = Vec::new();
        let mut code: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    };
                    code = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, body)) = code.take() {
                        let block = match lang {
                            Some(lang) => self.highlight(&body, &lang),
                            None => format!("<pre><code>{}</code></pre>", html_escape(&body)),
                        };
                        events.push(Event::Html(block.into()));
                    }
                }
                Event::Text(text) if code.is_some() => {
                    if let Some((_, body)) = code.as_mut() {
                        body.push_str(&text);
                    }
                }
                Event::Html(raw) | Event::InlineHtml(raw) => events.push(Event::Text(raw)),
                other => events.push(other),
            }
        }

        events
    }

    fn highlight(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang));
        let theme = self.theme_set.themes.get(CODE_THEME);

        match (syntax, theme) {
            (Some(syntax), Some(theme)) => {
                highlighted_html_for_string(code, &self.syntax_set, syntax, theme)
                    .unwrap_or_else(|_| format!("<pre><code>{}</code></pre>", html_escape(code)))
            }
            _ => format!(
                "<pre><code class=\"language-{}\">{}</code></pre>",
                html_escape(lang),
                html_escape(code)
            ),
        }
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Branding values end up inside a `<style>` block unescaped
fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || " #,.-_'\"()%".contains(*c))
        .collect()
}

fn http_url(value: &str) -> Option<&str> {
    let value = value.trim();
    (value.starts_with("https://") || value.starts_with("http://")).then_some(value)
}

#[derive(Serialize)]
struct MetaEntry<'a> {
    label: &'a str,
    value: &'a str,
}

pub struct HtmlExporter {
    tera: Tera,
    renderer: ContentRenderer,
}

impl HtmlExporter {
    pub fn new() -> anyhow::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (EXPORT_TEMPLATE, include_str!("templates/export.html")),
            (GOOGLE_DOCS_TEMPLATE, include_str!("templates/googledocs.html")),
        ])
        .map_err(|e| anyhow::anyhow!("Failed to add export templates: {}", e))?;

        Ok(Self {
            tera,
            renderer: ContentRenderer::new(),
        })
    }

    pub fn render(
        &self,
        content: &dyn Exportable,
        options: &ExportOptions,
        now: DateTime<Utc>,
    ) -> Result<String, ExportError> {
        let branding = options.custom_branding.clone().unwrap_or_default();
        let metadata = content.metadata();
        let metadata: Vec<MetaEntry> = if options.include_metadata {
            metadata
                .iter()
                .map(|(label, value)| MetaEntry { label, value })
                .collect()
        } else {
            Vec::new()
        };
        let empty: &[String] = &[];

        let mut ctx = Context::new();
        ctx.insert("title", content.title());
        ctx.insert("template", options.template.as_str());
        ctx.insert(
            "primary",
            &css_value(branding.primary_color().unwrap_or(DEFAULT_COVER_COLORS[0])),
        );
        ctx.insert(
            "accent",
            &css_value(branding.accent_color().unwrap_or(DEFAULT_COVER_COLORS[1])),
        );
        ctx.insert("font", &css_value(branding.font().unwrap_or(DEFAULT_FONT)));
        ctx.insert("cover", &options.include_cover);
        ctx.insert("logo", &branding.logo.as_deref().and_then(http_url));
        ctx.insert("subtitle", &content.subtitle());
        ctx.insert("price_range", &content.price_range());
        ctx.insert("platform", &content.platform());
        ctx.insert("generated_on", &now.format("%B %-d, %Y").to_string());
        ctx.insert(
            "toc",
            if options.include_table_of_contents {
                content.table_of_contents()
            } else {
                empty
            },
        );
        ctx.insert("body", &self.renderer.render(content.body()));
        ctx.insert(
            "monetization",
            if options.include_monetization {
                content.monetization()
            } else {
                empty
            },
        );
        ctx.insert(
            "marketing",
            if options.include_marketing {
                content.marketing()
            } else {
                empty
            },
        );
        ctx.insert("hashtags", content.hashtags());
        ctx.insert("engagement_tips", content.engagement_tips());
        ctx.insert("posting_times", content.posting_times());
        ctx.insert("metadata", &metadata);
        ctx.insert("generated_at", &now.to_rfc3339());
        ctx.insert("company", &branding.company_name);
        ctx.insert("website", &branding.website.as_deref().and_then(http_url));
        ctx.insert("year", &now.year());

        self.render_template(EXPORT_TEMPLATE, &ctx)
    }

    /// Plain document styling that Google Docs imports cleanly
    pub fn render_google_docs(&self, content: &dyn Exportable) -> Result<String, ExportError> {
        let mut ctx = Context::new();
        ctx.insert("title", content.title());
        ctx.insert("subtitle", &content.subtitle());
        ctx.insert("toc", content.table_of_contents());
        ctx.insert("body", &self.renderer.render(content.body()));
        ctx.insert("monetization", content.monetization());
        ctx.insert("marketing", content.marketing());
        ctx.insert("price_range", &content.price_range());

        self.render_template(GOOGLE_DOCS_TEMPLATE, &ctx)
    }

    fn render_template(&self, name: &str, ctx: &Context) -> Result<String, ExportError> {
        self.tera.render(name, ctx).map_err(|e| {
            let mut msg = format!("Failed to render '{}': {}", name, e);
            let mut source = e.source();
            while let Some(s) = source {
                msg.push_str(&format!("\n  Caused by: {}", s));
                source = s.source();
            }
            ExportError::Template(msg)
        })
    }
}
