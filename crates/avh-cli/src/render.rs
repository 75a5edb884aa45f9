//! Plain-text rendering helpers shared by the views

use anyhow::{Context, Result};
use avh_api_contract::{JobStats, JsonMap, Progress};
use chrono::{DateTime, Local, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const MAX_CELL_WIDTH: usize = 40;
pub const BAR_WIDTH: usize = 20;

/// Column-aligned table; widths are measured in terminal cells so CJK text
/// lines up.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows
            .push(cells.into_iter().map(|c| truncate(&c.into(), MAX_CELL_WIDTH)).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let columns = self.headers.len();
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(columns) {
                widths[i] = widths[i].max(cell.width());
            }
        }

        let mut text = String::new();
        let mut line = |cells: &[String]| {
            let mut rendered = String::new();
            for (i, width) in widths.iter().enumerate() {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                rendered.push_str(cell);
                if i + 1 < columns {
                    rendered.push_str(&" ".repeat(width.saturating_sub(cell.width()) + 2));
                }
            }
            text.push_str(rendered.trim_end());
            text.push('\n');
        };

        line(&self.headers);
        for row in &self.rows {
            line(row);
        }
        text
    }
}

/// Cut `text` to at most `max` terminal cells, marking the cut with `…`.
pub fn truncate(text: &str, max: usize) -> String {
    let text = text.replace('\n', " ");
    if text.width() <= max {
        return text;
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// `[#####---------------]  25%`
pub fn progress_cell(progress: Progress) -> String {
    format!("{} {:>4}", progress.render_bar(BAR_WIDTH), progress.to_string())
}

pub fn stats_cell(stats: Option<&JobStats>) -> String {
    let (crawled, stored, failed) = stats.map_or((0, 0, 0), |s| (s.crawled(), s.stored(), s.failed()));
    format!("crawled:{} stored:{} failed:{}", crawled, stored, failed)
}

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn optional_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(timestamp).unwrap_or_else(|| "-".to_string())
}

pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// Parse a JSON object given on the command line.
pub fn parse_json_map(raw: &str) -> Result<JsonMap> {
    serde_json::from_str(raw).with_context(|| format!("expected a JSON object, got '{}'", raw))
}

pub fn json_cell(map: &JsonMap) -> String {
    if map.is_empty() {
        return "-".to_string();
    }
    serde_json::to_string(map).unwrap_or_else(|_| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_aligns_wide_characters() {
        let mut table = Table::new(&["ID", "NAME", "TYPE"]);
        table.row(["1", "通用意图样例", "intent"]);
        table.row(["2", "ner-set", "ner"]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "ID  NAME          TYPE");
        assert_eq!(lines[1], "1   通用意图样例  intent");
        assert_eq!(lines[2], "2   ner-set       ner");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("请前往账户页面查看余额", 7), "请前往…");
    }

    #[test]
    fn test_progress_cell() {
        assert_eq!(progress_cell(Progress::new(25)), "[#####---------------]  25%");
        assert_eq!(progress_cell(Progress::COMPLETE), "[####################] 100%");
    }

    #[test]
    fn test_parse_json_map() {
        let map = parse_json_map(r#"{"type": "rss"}"#).unwrap();
        assert_eq!(map["type"], "rss");
        assert!(parse_json_map("[1, 2]").is_err());
        assert_eq!(json_cell(&map), r#"{"type":"rss"}"#);
    }
}
