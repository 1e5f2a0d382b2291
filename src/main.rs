use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use mcq_extract::models::{AutoPaginator, JobStatus};
use mcq_extract::orchestrator::{BatchOrchestrator, JobRequest, JobRunner};
use mcq_extract::services::{JsonFileStore, LlmService, McqExtractor};
use mcq_extract::utils::logging;
use mcq_extract::Config;
use tracing::info;

const USAGE: &str = "用法: mcq_extract <文档路径>... [--instructions <自定义规则>]";

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load().context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging)?;

    let (documents, instructions) = parse_args(std::env::args().skip(1))?;
    logging::log_startup(&config, documents.len());

    let extractor = McqExtractor::new(LlmService::new(&config));
    let runner = JobRunner::new(
        BatchOrchestrator::from_config(extractor, &config),
        Arc::new(JsonFileStore::new(&config.metadata_path)),
        Arc::new(AutoPaginator),
        &config,
    );

    // 每个文档一个后台任务
    let mut tickets = Vec::new();
    for path in documents {
        let request = JobRequest::new(path).with_instructions(instructions.clone());
        tickets.push(runner.submit(request).await?);
    }

    let ids: Vec<_> = tickets.iter().map(|t| t.id).collect();
    let statuses = futures::future::join_all(tickets.into_iter().map(|t| t.wait())).await;

    let (mut success, mut empty, mut failed) = (0, 0, 0);
    for (id, status) in ids.iter().zip(&statuses) {
        match status {
            JobStatus::Processed => success += 1,
            JobStatus::NoQuestionsFound => empty += 1,
            _ => failed += 1,
        }
        let result_path = runner
            .status(*id)
            .await?
            .map(|m| m.result_path.display().to_string())
            .unwrap_or_default();
        info!("[文档 {}] {} → {}", id, status, result_path);
    }

    logging::print_final_stats(success, empty, failed, statuses.len());

    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<(Vec<PathBuf>, String)> {
    let mut documents = Vec::new();
    let mut instructions = String::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--instructions" | "-i" => {
                instructions = args.next().context("--instructions 缺少参数")?;
            }
            "--help" | "-h" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            _ => documents.push(PathBuf::from(arg)),
        }
    }

    if documents.is_empty() {
        anyhow::bail!("{}", USAGE);
    }

    Ok((documents, instructions))
}
