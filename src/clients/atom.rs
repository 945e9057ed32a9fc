//! Atom feed 解析
//!
//! 把 arXiv 检索返回的 feed 转为 `Paper` 列表。按本地名匹配元素，
//! 不关心命名空间前缀（`atom:entry` 与 `entry` 等价）。

use crate::error::SearchError;
use crate::models::Paper;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// 当前正在收集文本的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
    Updated,
    AuthorName,
}

/// 单条 entry 的累积状态
#[derive(Debug, Default)]
struct EntryAccum {
    id: String,
    title: String,
    summary: String,
    published: String,
    updated: String,
    authors: Vec<String>,
    author_name: String,
    pdf_url: Option<String>,
    categories: Vec<String>,
}

impl EntryAccum {
    fn push_text(&mut self, field: Field, text: &str) {
        match field {
            Field::Id => self.id.push_str(text),
            Field::Title => self.title.push_str(text),
            Field::Summary => self.summary.push_str(text),
            Field::Published => self.published.push_str(text),
            Field::Updated => self.updated.push_str(text),
            Field::AuthorName => self.author_name.push_str(text),
        }
    }

    fn into_paper(self) -> Paper {
        Paper {
            id: self.id.trim().to_string(),
            title: normalize_whitespace(&self.title),
            summary: normalize_whitespace(&self.summary),
            authors: self.authors,
            published: non_empty(self.published),
            updated: non_empty(self.updated),
            pdf_url: self.pdf_url,
            categories: self.categories,
            relevance_score: None,
            content: None,
        }
    }
}

/// 解析 Atom feed
///
/// # 返回
/// 返回按 feed 顺序排列的论文；文档不是合法 feed 时返回 `MalformedFeed`
pub fn parse_feed(xml: &str) -> Result<Vec<Paper>, SearchError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut papers = Vec::new();
    let mut saw_feed = false;
    let mut entry: Option<EntryAccum> = None;
    let mut in_author = false;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"feed" => saw_feed = true,
                    b"entry" => {
                        entry = Some(EntryAccum::default());
                        in_author = false;
                        field = None;
                    }
                    _ => {
                        if let Some(acc) = entry.as_mut() {
                            field = open_element(acc, &e, &mut in_author);
                        }
                    }
                }
            }
            Event::Empty(e) => {
                if let Some(acc) = entry.as_mut() {
                    let _ = open_element(acc, &e, &mut in_author);
                }
            }
            Event::Text(t) => {
                if let (Some(acc), Some(f)) = (entry.as_mut(), field) {
                    let text = t
                        .unescape()
                        .map_err(|e| SearchError::MalformedFeed(e.to_string()))?;
                    acc.push_text(f, &text);
                }
            }
            Event::CData(t) => {
                if let (Some(acc), Some(f)) = (entry.as_mut(), field) {
                    acc.push_text(f, &String::from_utf8_lossy(&t));
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"entry" => {
                        if let Some(acc) = entry.take() {
                            papers.push(finish_entry(acc)?);
                        }
                        field = None;
                    }
                    b"author" => {
                        if let Some(acc) = entry.as_mut() {
                            let author = normalize_whitespace(&acc.author_name);
                            if !author.is_empty() {
                                acc.authors.push(author);
                            }
                            acc.author_name.clear();
                        }
                        in_author = false;
                        field = None;
                    }
                    _ => field = None,
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_feed {
        return Err(SearchError::MalformedFeed(
            "response has no <feed> root element".to_string(),
        ));
    }
    Ok(papers)
}

/// 处理 entry 内的开始/空元素，返回需要收集文本的字段
fn open_element(acc: &mut EntryAccum, e: &BytesStart<'_>, in_author: &mut bool) -> Option<Field> {
    match e.local_name().as_ref() {
        b"id" => Some(Field::Id),
        b"title" => Some(Field::Title),
        b"summary" => Some(Field::Summary),
        b"published" => Some(Field::Published),
        b"updated" => Some(Field::Updated),
        b"author" => {
            *in_author = true;
            acc.author_name.clear();
            None
        }
        b"name" if *in_author => Some(Field::AuthorName),
        b"link" => {
            if acc.pdf_url.is_none() {
                acc.pdf_url = pdf_href(e);
            }
            None
        }
        b"category" => {
            if let Some(term) = attribute(e, b"term") {
                if !term.is_empty() && !acc.categories.contains(&term) {
                    acc.categories.push(term);
                }
            }
            None
        }
        _ => None,
    }
}

/// 只认 `title="pdf"` 或 `type` 含 pdf 的链接
fn pdf_href(e: &BytesStart<'_>) -> Option<String> {
    let href = attribute(e, b"href")?;
    let is_pdf = attribute(e, b"title").is_some_and(|t| t.eq_ignore_ascii_case("pdf"))
        || attribute(e, b"type").is_some_and(|t| t.contains("pdf"));
    (is_pdf && !href.is_empty()).then_some(href)
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// arXiv 出错时返回一条 id 指向 `api/errors` 的 entry
fn finish_entry(acc: EntryAccum) -> Result<Paper, SearchError> {
    if acc.id.contains("/api/errors") {
        return Err(SearchError::MalformedFeed(format!(
            "index reported an error: {}",
            normalize_whitespace(&acc.summary)
        )));
    }
    Ok(acc.into_paper())
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
