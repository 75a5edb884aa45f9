//! Crawler presets and their mapping onto registered spiders

use crate::{Error, Result};
use avh_api_contract::{Spider, StartCrawlRequest};
use avh_rest_client_mock::default_crawl_command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlerPreset {
    pub key: &'static str,
    pub label: &'static str,
}

pub const PRESETS: [CrawlerPreset; 3] = [
    CrawlerPreset {
        key: "xueqiu",
        label: "雪球",
    },
    CrawlerPreset {
        key: "guba",
        label: "股吧",
    },
    CrawlerPreset {
        key: "ttjj",
        label: "天天基金",
    },
];

impl CrawlerPreset {
    pub fn find(key: &str) -> Option<CrawlerPreset> {
        PRESETS
            .into_iter()
            .find(|p| p.key.eq_ignore_ascii_case(key) || p.label == key)
    }

    pub fn default_command(&self) -> String {
        default_crawl_command(self.key)
    }

    /// Spider this preset runs as: exact name match, then a name containing
    /// the label, then the first registered spider.
    pub fn resolve_spider<'a>(&self, spiders: &'a [Spider]) -> Option<&'a Spider> {
        spiders
            .iter()
            .find(|s| s.name == self.label)
            .or_else(|| spiders.iter().find(|s| s.name.contains(self.label)))
            .or_else(|| spiders.first())
    }

    /// Build the start request for this preset.
    pub fn start_request(&self, spiders: &[Spider], command: Option<&str>) -> Result<StartCrawlRequest> {
        let spider = self.resolve_spider(spiders).ok_or_else(|| {
            Error::generic(format!("no spider registered for {}; add one first", self.label))
        })?;
        let command = command
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.default_command());

        Ok(StartCrawlRequest {
            source: self.key.to_string(),
            spider_id: Some(spider.id.clone()),
            command,
        })
    }
}

/// Label shown for a crawl job's source, falling back to the raw key.
pub fn source_label(source: &str) -> &str {
    CrawlerPreset::find(source).map_or(source, |p| p.label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn spider(id: &str, name: &str) -> Spider {
        Spider {
            id: id.into(),
            name: name.into(),
            target: "https://example.com".into(),
            runner: "http_hook".into(),
            config: Default::default(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_find_by_key_or_label() {
        assert_eq!(CrawlerPreset::find("guba").unwrap().label, "股吧");
        assert_eq!(CrawlerPreset::find("天天基金").unwrap().key, "ttjj");
        assert!(CrawlerPreset::find("weibo").is_none());
        assert_eq!(source_label("xueqiu"), "雪球");
        assert_eq!(source_label("custom"), "custom");
    }

    #[test]
    fn test_spider_resolution_order() {
        let preset = CrawlerPreset::find("xueqiu").unwrap();
        let spiders = vec![
            spider("1", "news_rss"),
            spider("2", "雪球热帖"),
            spider("3", "雪球"),
        ];
        assert_eq!(preset.resolve_spider(&spiders).unwrap().id, "3");
        assert_eq!(preset.resolve_spider(&spiders[..2]).unwrap().id, "2");
        assert_eq!(preset.resolve_spider(&spiders[..1]).unwrap().id, "1");
        assert!(preset.resolve_spider(&[]).is_none());
    }

    #[test]
    fn test_start_request() {
        let preset = CrawlerPreset::find("ttjj").unwrap();
        let spiders = vec![spider("301", "news_rss")];

        let request = preset.start_request(&spiders, None).unwrap();
        assert_eq!(request.source, "ttjj");
        assert_eq!(request.spider_id.as_deref(), Some("301"));
        assert_eq!(request.command, "python spider.py run --source ttjj --limit 100");

        let request = preset.start_request(&spiders, Some("python spider.py run --source ttjj --limit 5")).unwrap();
        assert!(request.command.ends_with("--limit 5"));

        assert!(preset.start_request(&[], None).is_err());
    }
}
