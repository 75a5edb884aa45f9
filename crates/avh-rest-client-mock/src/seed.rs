//! Demo rows written into empty slots

use crate::slots;
use avh_api_contract::*;
use avh_local_db::{KeyValueStore, KeyValueStoreExt};
use chrono::{DateTime, Utc};
use serde_json::json;

fn object(value: serde_json::Value) -> JsonMap {
    match value {
        serde_json::Value::Object(map) => map.into_iter().collect(),
        _ => JsonMap::new(),
    }
}

pub fn datasets(now: DateTime<Utc>) -> Vec<Dataset> {
    vec![
        Dataset {
            id: "1".into(),
            name: "通用意图样例".into(),
            task_type: TaskKind::Intent,
            description: Some("用于意图识别示例".into()),
            created_at: now,
        },
        Dataset {
            id: "2".into(),
            name: "金融NER样例".into(),
            task_type: TaskKind::Ner,
            description: Some("金融领域实体识别".into()),
            created_at: now,
        },
    ]
}

pub fn questions(now: DateTime<Utc>) -> Vec<Question> {
    vec![
        Question {
            id: "101".into(),
            dataset_id: "1".into(),
            content: "我想查询账户余额".into(),
            category: Some("bank".into()),
            source_type: Some("seed".into()),
            source_remark: None,
            difficulty: Some(1),
            meta: JsonMap::new(),
            created_at: now,
        },
        Question {
            id: "102".into(),
            dataset_id: "2".into(),
            content: "今天上证指数是多少？".into(),
            category: Some("market".into()),
            source_type: Some("seed".into()),
            source_remark: None,
            difficulty: Some(2),
            meta: JsonMap::new(),
            created_at: now,
        },
    ]
}

pub fn agents(now: DateTime<Utc>) -> Vec<Agent> {
    vec![
        Agent {
            id: "11".into(),
            name: "GPT-4o 模型A".into(),
            module: AgentModule::E2e,
            version: "v1".into(),
            model_name: Some("gpt-4o".into()),
            prompt_hash: None,
            code_commit: None,
            base_url: None,
            api_key: None,
            config: JsonMap::new(),
            created_at: now,
        },
        Agent {
            id: "12".into(),
            name: "意图识别B".into(),
            module: AgentModule::Intent,
            version: "v1".into(),
            model_name: Some("intent-bert".into()),
            prompt_hash: None,
            code_commit: None,
            base_url: None,
            api_key: None,
            config: JsonMap::new(),
            created_at: now,
        },
    ]
}

pub fn endpoints(now: DateTime<Utc>) -> Vec<Endpoint> {
    vec![
        Endpoint {
            id: "201".into(),
            kind: EndpointKind::Openai,
            name: "OpenAI 官方".into(),
            base_url: Some("https://api.openai.com".into()),
            auth: object(json!({ "api_key": "" })),
            default_params: JsonMap::new(),
            created_at: now,
        },
        Endpoint {
            id: "202".into(),
            kind: EndpointKind::Http,
            name: "自研HTTP".into(),
            base_url: Some("https://api.example.com".into()),
            auth: JsonMap::new(),
            default_params: JsonMap::new(),
            created_at: now,
        },
    ]
}

pub fn results(now: DateTime<Utc>) -> Vec<TestResult> {
    vec![TestResult {
        id: "r1".into(),
        run_id: "run_1".into(),
        input: "我想查询账户余额".into(),
        output: "请前往账户页面查看余额。".into(),
        score: None,
        created_at: now,
    }]
}

pub fn spiders(now: DateTime<Utc>) -> Vec<Spider> {
    vec![Spider {
        id: "301".into(),
        name: "news_rss".into(),
        target: "https://news.example/rss".into(),
        runner: "http_hook".into(),
        config: object(json!({ "type": "rss" })),
        created_at: now,
    }]
}

/// Fill every absent slot with its demo rows. Present slots, even empty
/// ones, are left alone. Returns the slots that were written.
pub fn seed_defaults(store: &dyn KeyValueStore) -> avh_local_db::Result<Vec<&'static str>> {
    let now = Utc::now();
    let empty: Vec<serde_json::Value> = Vec::new();
    let mut written = Vec::new();

    let outcomes = [
        (slots::DATASETS, store.seed_json(slots::DATASETS, &datasets(now))?),
        (slots::QUESTIONS, store.seed_json(slots::QUESTIONS, &questions(now))?),
        (slots::AGENTS, store.seed_json(slots::AGENTS, &agents(now))?),
        (slots::ENDPOINTS, store.seed_json(slots::ENDPOINTS, &endpoints(now))?),
        (slots::SIMPLE_RESULTS, store.seed_json(slots::SIMPLE_RESULTS, &results(now))?),
        (slots::SPIDERS, store.seed_json(slots::SPIDERS, &spiders(now))?),
        (slots::TEST_RUNS, store.seed_json(slots::TEST_RUNS, &empty)?),
        (slots::EVALUATIONS, store.seed_json(slots::EVALUATIONS, &empty)?),
        (slots::SPIDER_JOBS, store.seed_json(slots::SPIDER_JOBS, &empty)?),
        (slots::CRAWL_JOBS, store.seed_json(slots::CRAWL_JOBS, &empty)?),
    ];
    for (slot, wrote) in outcomes {
        if wrote {
            written.push(slot);
        }
    }

    Ok(written)
}
