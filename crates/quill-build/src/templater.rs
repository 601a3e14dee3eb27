//! Templating sinks.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use minijinja::Environment;
use serde::Serialize;

use crate::page::{OrderedPage, SiteData};

/// The record templates render: site-wide data and the current page,
/// flattened into one namespace (`base_url`, `home_page`, `feed_url`,
/// `feed_type`, `theme_assets`, `content`, `order`, `path`, `url`,
/// `next`, `prev`).
#[derive(Serialize)]
struct TemplateData<'a, T> {
    #[serde(flatten)]
    site: &'a SiteData,
    #[serde(flatten)]
    page: &'a OrderedPage<T>,
}

/// Renders `page` with the named template into `<out_root>/<page.path>`,
/// creating parent directories as needed.
pub fn render_page<T: Serialize>(
    out_root: &Path,
    env: &Environment<'_>,
    template: &str,
    site: &SiteData,
    page: &OrderedPage<T>,
) -> Result<()> {
    let out_path = out_root.join(&page.page.path);
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory for `{}`", page.page.path))?;
    }
    let template = env
        .get_template(template)
        .with_context(|| format!("rendering `{}`", page.page.path))?;
    let file = File::create(&out_path)
        .with_context(|| format!("creating file `{}`", page.page.path))?;
    let mut writer = BufWriter::new(file);
    template
        .render_to_write(
            minijinja::Value::from_serialize(&TemplateData { site, page }),
            &mut writer,
        )
        .with_context(|| format!("rendering `{}`", page.page.path))?;
    writer
        .flush()
        .with_context(|| format!("writing `{}`", page.page.path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use url::Url;

    fn site() -> SiteData {
        let base = Url::parse("https://example.org/").unwrap();
        SiteData {
            home_page: base.join("index.html").unwrap(),
            theme_assets: base.join("static/theme/").unwrap(),
            feed_url: base.join("index.json").unwrap(),
            feed_type: "application/json".to_owned(),
            base_url: base,
        }
    }

    #[test]
    fn renders_site_data_and_page_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = Environment::new();
        env.add_template_owned(
            "page.html".to_owned(),
            "{{ base_url }} {{ content }} next={{ next }}".to_owned(),
        )
        .unwrap();

        let page = OrderedPage {
            page: Page {
                content: "hello".to_owned(),
                order: 1,
                path: "sub/out.html".to_owned(),
                url: Url::parse("https://example.org/sub/out.html").unwrap(),
            },
            next: Some(Url::parse("https://example.org/newer.html").unwrap()),
            prev: None,
        };

        render_page(dir.path(), &env, "page.html", &site(), &page).unwrap();

        let out = fs::read_to_string(dir.path().join("sub/out.html")).unwrap();
        assert!(out.contains("https://example.org/"), "got: {out}");
        assert!(out.contains("hello"), "got: {out}");
        assert!(out.contains("next=https://example.org/newer.html"), "got: {out}");
    }

    #[test]
    fn template_errors_carry_the_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = Environment::new();
        env.add_template_owned("page.html".to_owned(), "{{ missing.field }}".to_owned())
            .unwrap();

        let page = OrderedPage::unlinked(Page {
            content: (),
            order: 0,
            path: "broken.html".to_owned(),
            url: Url::parse("https://example.org/broken.html").unwrap(),
        });

        let err = render_page(dir.path(), &env, "page.html", &site(), &page).unwrap_err();
        assert!(format!("{err:#}").contains("broken.html"));
    }
}
