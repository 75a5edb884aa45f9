//! Per-view title and description

use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Crawler,
    Spiders,
    Datasets,
    Questions,
    Agents,
    Endpoints,
    TestRuns,
    Results,
    Settings,
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "Agent Validation Hub – 仪表盘",
            Page::Crawler => "数据爬虫管理",
            Page::Spiders => "爬虫注册",
            Page::Datasets => "测试数据集管理",
            Page::Questions => "测试问题管理",
            Page::Agents => "测试端点接入",
            Page::Endpoints => "模型端点管理",
            Page::TestRuns => "测试进程管理",
            Page::Results => "测试结果集管理",
            Page::Settings => "系统设置",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Page::Dashboard => "管理爬虫、数据集、Agent 接入、测试流程与结果集的统一平台",
            Page::Crawler => "配置目标站点并查看爬取进度，入库状态可视化",
            Page::Spiders => "注册爬虫并跟踪爬虫任务的运行状态",
            Page::Datasets => "对数据表中测试数据进行编辑、分类与维护",
            Page::Questions => "按数据集查看与维护测试问题",
            Page::Agents => "配置 Dify、Google 等 Agent 系统的 API 以接入应用",
            Page::Endpoints => "维护 Agent 调用的 LLM 与 HTTP 端点",
            Page::TestRuns => "选择数据集与 Agent 端点发起测试，实时查看进度并入库结果",
            Page::Results => "查看与筛选测试结果，支持导出与标注对接",
            Page::Settings => "配置 LabelStudio 与其他系统的访问参数",
        }
    }

    /// Write the title line and description that open every view.
    pub fn header(self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "== {} ==", self.title())?;
        writeln!(out, "{}", self.description())?;
        writeln!(out)
    }
}
