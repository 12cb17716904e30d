//! Read-only queries: page text, exports, categories, site information

use super::WikiClientGeneric;
use crate::{
    Error, Result,
    error::SubjectProblem,
    session::Transport,
    types::{ApiParams, CategoryPage, ExportedPage, PageEntry, WikiPage, first_page},
};
use serde_json::{Map, Value};
use tracing::debug;

/// Page size used when walking a whole category
const CATEGORY_BATCH: u32 = 500;

impl<T: Transport> WikiClientGeneric<T> {
    /// Latest revision of `title` with its content
    async fn latest_revision(&self, title: &str) -> Result<PageEntry> {
        let reply = self
            .read(
                ApiParams::query()
                    .set("prop", "revisions")
                    .set("rvprop", "content|timestamp")
                    .set("rvlimit", "1")
                    .set("titles", title),
            )
            .await?;
        first_page(&reply)
    }

    /// Wikitext of the latest revision
    pub async fn get_page(&self, title: &str) -> Result<String> {
        let page = self.latest_revision(title).await?;
        page.check(title)?;
        revision_text(&page, title)
    }

    /// Current text for an edit; a missing page reads as empty
    pub(super) async fn current_text(&self, title: &str) -> Result<String> {
        let page = self.latest_revision(title).await?;
        match page.problem() {
            Some(SubjectProblem::Missing) => Ok(String::new()),
            Some(problem) => Err(Error::Page {
                title: title.to_string(),
                problem,
            }),
            None => revision_text(&page, title),
        }
    }

    /// Page text together with its id and namespace
    pub async fn fetch_page(&self, title: &str) -> Result<WikiPage> {
        let page = self.latest_revision(title).await?;
        page.check(title)?;
        let text = revision_text(&page, title)?;
        Ok(WikiPage {
            ns: page.ns,
            nsname: namespace_name(&page.title, page.ns),
            text,
            id: page.pageid.unwrap_or_default(),
            title: page.title,
        })
    }

    /// Export XML of one page
    pub async fn export_page(&self, title: &str) -> Result<ExportedPage> {
        let reply = self
            .read(ApiParams::query().set("titles", title).set("export", "1"))
            .await?;
        let page = first_page(&reply)?;
        page.check(title)?;

        let export = reply
            .pointer("/query/export")
            .ok_or_else(|| Error::unexpected("reply has no query.export"))?;
        let xml = export
            .get("*")
            .unwrap_or(export)
            .as_str()
            .ok_or_else(|| Error::unexpected("query.export is not text"))?
            .to_string();

        Ok(ExportedPage {
            xml,
            id: page.pageid.unwrap_or_default(),
            ns: page.ns,
            title: page.title,
        })
    }

    /// One page of category members, resuming from `cursor`
    pub async fn category_members_page(
        &self,
        category: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<CategoryPage> {
        let reply = self
            .read(
                ApiParams::query()
                    .set("list", "categorymembers")
                    .set("cmtitle", category_title(category))
                    .set("cmlimit", limit.to_string())
                    .opt("cmcontinue", cursor),
            )
            .await?;

        let titles = reply
            .pointer("/query/categorymembers")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::unexpected("reply has no query.categorymembers"))?
            .iter()
            .filter_map(|m| m.get("title").and_then(Value::as_str))
            .map(str::to_string)
            .collect();

        let cursor = reply
            .pointer("/continue/cmcontinue")
            .or_else(|| reply.pointer("/query-continue/categorymembers/cmcontinue"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(CategoryPage { titles, cursor })
    }

    /// Category member titles; a continuation cursor, when present, is the
    /// last element of the list
    pub async fn category_members(
        &self,
        category: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Vec<String>> {
        Ok(self
            .category_members_page(category, cursor, limit)
            .await?
            .into_list())
    }

    /// Every member of a category, following continuation cursors
    pub async fn all_category_members(&self, category: &str) -> Result<Vec<String>> {
        let mut titles = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .category_members_page(category, cursor.as_deref(), CATEGORY_BATCH)
                .await?;
            titles.extend(page.titles);
            match page.cursor {
                Some(next) => {
                    debug!("Continuing {} from {}", category, next);
                    cursor = Some(next);
                }
                None => return Ok(titles),
            }
        }
    }

    /// Categories of a page, `None` when it has none
    pub async fn page_categories(&self, title: &str) -> Result<Option<Vec<String>>> {
        let reply = self
            .read(
                ApiParams::query()
                    .set("prop", "categories")
                    .set("cllimit", "max")
                    .set("titles", title),
            )
            .await?;
        let page = first_page(&reply)?;
        page.check(title)?;

        if page.categories.is_empty() {
            return Ok(None);
        }
        Ok(Some(page.categories.into_iter().map(|c| c.title).collect()))
    }

    /// General site information
    pub async fn site_info(&self) -> Result<Map<String, Value>> {
        let reply = self
            .read(
                ApiParams::query()
                    .set("meta", "siteinfo")
                    .set("siprop", "general"),
            )
            .await?;
        reply
            .pointer("/query/general")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| Error::unexpected("reply has no query.general"))
    }

    /// One field of the general site information
    pub async fn site_info_field(&self, field: &str) -> Result<Value> {
        let mut info = self.site_info().await?;
        info.remove(field)
            .ok_or_else(|| Error::SiteInfoField(field.to_string()))
    }
}

fn revision_text(page: &PageEntry, title: &str) -> Result<String> {
    page.revisions
        .first()
        .and_then(|r| r.content.clone())
        .ok_or_else(|| Error::unexpected(format!("no revision content for {title}")))
}

/// Namespace prefix of a title, empty in the main namespace
fn namespace_name(title: &str, ns: i64) -> String {
    if ns == 0 {
        return String::new();
    }
    title
        .split_once(':')
        .map(|(prefix, _)| prefix.to_string())
        .unwrap_or_default()
}

fn category_title(category: &str) -> String {
    if category.starts_with("Category:") {
        category.to_string()
    } else {
        format!("Category:{category}")
    }
}
