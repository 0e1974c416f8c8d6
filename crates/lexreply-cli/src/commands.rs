//! Subcommand handlers.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use lexreply_ai::{
    AnalyzeError, Analyzer, Drafter, EmailParser, GeminiClient, LanguageModel, Pipeline,
    PipelineError,
};
use lexreply_core::{
    compute_urgency, parse_date, Analysis, AnalyzeRequest, ClauseRepository, DraftRequest,
    DraftResponse,
};
use serde::Serialize;
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::config::Settings;
use crate::Command;

pub async fn dispatch(command: Command, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Command::Analyze { email, contract } => analyze(settings, &email, contract.as_deref()).await,
        Command::Draft { request } => draft(settings, &request).await,
        Command::Run { email, contract } => run(settings, &email, contract.as_deref()).await,
        Command::Parse { email } => parse(settings, &email).await,
        Command::Clauses { limit } => {
            println!("{}", ClauseRepository::standard().format_excerpts(limit));
            Ok(())
        }
        Command::Urgency { date } => urgency(&date),
    }
}

async fn analyze(settings: &Settings, email: &Path, contract: Option<&Path>) -> anyhow::Result<()> {
    let request = AnalyzeRequest {
        email_text: read_input(email)?,
        contract_text: contract.map(read_input).transpose()?,
    };
    let analyzer = Analyzer::new(model_client(settings)?, &settings.model);

    let analysis = analyzer
        .analyze(&request.email_text)
        .await
        .map_err(log_extraction_failure)?;

    let pending = spawn_audit(
        settings,
        json!({"kind": "analysis", "request": &request, "analysis": &analysis}),
    );
    print_json(&analysis)?;
    settle(pending).await;
    Ok(())
}

async fn draft(settings: &Settings, request_path: &Path) -> anyhow::Result<()> {
    let raw = read_input(request_path)?;
    let request: DraftRequest = serde_json::from_str(&raw)
        .with_context(|| format!("parsing draft request {}", request_path.display()))?;

    let drafter = Drafter::new(model_client(settings)?, &settings.model);
    let clauses = ClauseRepository::standard().all_clauses();
    let draft = drafter
        .draft(&request.analysis, &clauses, &request.email_text)
        .await
        .context("drafting reply")?;

    let response = DraftResponse { draft };
    let pending = spawn_audit(
        settings,
        json!({"kind": "draft", "request": &request, "response": &response}),
    );
    print_json(&response)?;
    settle(pending).await;
    Ok(())
}

#[derive(Serialize)]
struct RunOutput<'a> {
    analysis: &'a Analysis,
    draft: &'a str,
}

async fn run(settings: &Settings, email: &Path, contract: Option<&Path>) -> anyhow::Result<()> {
    let email_text = read_input(email)?;
    let contract_text = contract.map(read_input).transpose()?;
    let pipeline = Pipeline::from_model(model_client(settings)?, &settings.model);

    let run = pipeline
        .run(email_text, contract_text)
        .await
        .map_err(|e| match e {
            PipelineError::Analyze(inner) => PipelineError::Analyze(log_extraction_failure(inner)),
            other => other,
        })?;

    let pending = spawn_audit(settings, json!({"kind": "pipeline", "run": &run}));
    print_json(&RunOutput {
        analysis: &run.analysis,
        draft: &run.draft,
    })?;
    settle(pending).await;
    Ok(())
}

async fn parse(settings: &Settings, email: &Path) -> anyhow::Result<()> {
    let email_text = read_input(email)?;
    let parser = EmailParser::new(model_client(settings)?, &settings.model);
    let parsed = parser.parse(&email_text).await.context("parsing email")?;

    let pending = spawn_audit(settings, json!({"kind": "parse", "parsed": &parsed}));
    print_json(&parsed)?;
    settle(pending).await;
    Ok(())
}

fn urgency(date: &str) -> anyhow::Result<()> {
    print_json(&urgency_report(date)?)
}

fn urgency_report(date: &str) -> anyhow::Result<serde_json::Value> {
    let Some(iso) = parse_date(Some(date)) else {
        bail!("unrecognised date: {date:?}");
    };
    let level = compute_urgency(Some(iso.as_str()));
    Ok(json!({"date": iso, "urgency_level": level}))
}

fn model_client(settings: &Settings) -> anyhow::Result<Arc<dyn LanguageModel>> {
    let client = GeminiClient::new(&settings.model_config()).context("building model client")?;
    Ok(Arc::new(client))
}

/// Read a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> anyhow::Result<String> {
    read_input_from(path, std::io::stdin())
}

fn read_input_from(path: &Path, mut stdin: impl Read) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        stdin.read_to_string(&mut buf).context("reading stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Log the raw model text behind an extraction failure before propagating it.
fn log_extraction_failure(e: AnalyzeError) -> AnalyzeError {
    if let AnalyzeError::Extraction(inner) = &e {
        error!(raw = inner.raw(), "model response could not be used as an analysis");
    }
    e
}

fn spawn_audit(
    settings: &Settings,
    entry: serde_json::Value,
) -> Option<JoinHandle<Option<PathBuf>>> {
    settings.audit_log().map(|log| log.spawn_write(entry))
}

/// Wait for a background audit write so the process does not exit mid-write.
async fn settle(pending: Option<JoinHandle<Option<PathBuf>>>) {
    if let Some(handle) = pending
        && let Err(e) = handle.await
    {
        warn!(error = %e, "audit task did not complete");
    }
}
