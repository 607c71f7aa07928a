//! Test-backends command - posts one document to a running gateway once per
//! backend and prints a summary

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::builder::PossibleValuesParser;
use clap::Args;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::domain::backend::{PipelineOptions, SUPPORTED_BACKENDS};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);
const PARSE_TIMEOUT: Duration = Duration::from_secs(300);
const RULE: &str = "==================================================";

#[derive(Args, Debug, Clone)]
pub struct TestBackendsArgs {
    /// PDF file to parse
    #[arg(short, long)]
    pub file: PathBuf,

    /// Gateway base URL
    #[arg(short = 'u', long, default_value = "http://localhost:8888")]
    pub base_url: String,

    /// sglang server URL, required to exercise vlm-sglang-client
    #[arg(short, long)]
    pub sglang_server: Option<String>,

    /// Backends to exercise
    #[arg(
        short,
        long,
        num_args = 1..,
        value_parser = PossibleValuesParser::new(SUPPORTED_BACKENDS),
        default_values_t = SUPPORTED_BACKENDS.map(String::from)
    )]
    pub backends: Vec<String>,
}

/// Outcome of one backend run
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutcome {
    Succeeded(BackendReport),
    Skipped(String),
    Failed(String),
}

impl BackendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// Figures printed for a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReport {
    pub elapsed: Duration,
    pub payload_size: usize,
    pub md_length: Option<usize>,
    pub content_list_len: Option<usize>,
    pub backend: String,
}

impl BackendReport {
    fn from_response(body: &Value, elapsed: Duration) -> Self {
        Self {
            elapsed,
            payload_size: body.to_string().chars().count(),
            md_length: body
                .get("md_content")
                .and_then(Value::as_str)
                .map(|md| md.chars().count()),
            content_list_len: body
                .get("content_list")
                .and_then(Value::as_array)
                .map(Vec::len),
            backend: body
                .get("backend")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
        }
    }
}

pub async fn run(args: TestBackendsArgs) -> anyhow::Result<()> {
    let metadata = tokio::fs::metadata(&args.file)
        .await
        .with_context(|| format!("File not found: {}", args.file.display()))?;

    let client = reqwest::Client::new();
    check_health(&client, &args.base_url).await?;

    println!("\nTesting file: {}", args.file.display());
    println!(
        "File size: {:.2} MB",
        metadata.len() as f64 / 1024.0 / 1024.0
    );

    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());

    let mut results = Vec::with_capacity(args.backends.len());
    for backend in &args.backends {
        println!("\n{RULE}\nBackend: {backend}\n{RULE}");

        let outcome = test_backend(
            &client,
            &args.base_url,
            &bytes,
            &file_name,
            backend,
            args.sglang_server.as_deref(),
        )
        .await;
        print_outcome(backend, &outcome);
        results.push((backend.clone(), outcome));
    }

    print_summary(&results);

    Ok(())
}

async fn check_health(client: &reqwest::Client, base_url: &str) -> anyhow::Result<()> {
    let response = client
        .get(format!("{}/health", base_url.trim_end_matches('/')))
        .timeout(HEALTH_TIMEOUT)
        .send()
        .await
        .with_context(|| format!("Gateway not reachable at {base_url}"))?;

    if response.status().is_success() {
        println!("Gateway reachable: {base_url}");
    } else {
        println!("Gateway answered {} on /health", response.status());
    }

    Ok(())
}

/// Form fields sent for `backend`; `None` when the backend cannot run
fn form_fields(backend: &str, sglang_server: Option<&str>) -> Option<Vec<(&'static str, String)>> {
    let mut fields = vec![
        ("backend", backend.to_string()),
        ("return_content_list", "true".to_string()),
        ("return_info", "false".to_string()),
        ("return_layout", "false".to_string()),
        ("return_images", "false".to_string()),
    ];

    match backend {
        "vlm-sglang-client" => fields.push(("server_url", sglang_server?.to_string())),
        "pipeline" => {
            let options = PipelineOptions::default();
            fields.push(("parse_method", options.parse_method));
            fields.push(("lang", options.lang));
            fields.push(("formula_enable", options.formula_enable.to_string()));
            fields.push(("table_enable", options.table_enable.to_string()));
        }
        _ => {}
    }

    Some(fields)
}

async fn test_backend(
    client: &reqwest::Client,
    base_url: &str,
    bytes: &[u8],
    file_name: &str,
    backend: &str,
    sglang_server: Option<&str>,
) -> BackendOutcome {
    let Some(fields) = form_fields(backend, sglang_server) else {
        return BackendOutcome::Skipped("--sglang-server is required".to_string());
    };

    let mut form = Form::new().part(
        "file",
        Part::bytes(bytes.to_vec()).file_name(file_name.to_string()),
    );
    for (name, value) in fields {
        form = form.text(name, value);
    }

    let started = Instant::now();
    let response = client
        .post(format!("{}/file_parse", base_url.trim_end_matches('/')))
        .multipart(form)
        .timeout(PARSE_TIMEOUT)
        .send()
        .await;

    let response = match response {
        Ok(response) => response,
        Err(e) if e.is_timeout() => {
            return BackendOutcome::Failed(format!(
                "timed out after {} s",
                PARSE_TIMEOUT.as_secs()
            ));
        }
        Err(e) => return BackendOutcome::Failed(e.to_string()),
    };
    let elapsed = started.elapsed();

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return BackendOutcome::Failed(format!("status {status}: {text}"));
    }

    match response.json::<Value>().await {
        Ok(body) => BackendOutcome::Succeeded(BackendReport::from_response(&body, elapsed)),
        Err(e) => BackendOutcome::Failed(format!("invalid response body: {e}")),
    }
}

fn print_outcome(backend: &str, outcome: &BackendOutcome) {
    match outcome {
        BackendOutcome::Succeeded(report) => {
            println!("OK {backend}");
            println!("   Elapsed: {:.2} s", report.elapsed.as_secs_f64());
            println!("   Response size: {} chars", report.payload_size);
            if let Some(md_length) = report.md_length {
                println!("   Markdown length: {md_length} chars");
            }
            if let Some(items) = report.content_list_len {
                println!("   Content list: {items} items");
            }
            println!("   Backend used: {}", report.backend);
        }
        BackendOutcome::Skipped(reason) => println!("SKIP {backend}: {reason}"),
        BackendOutcome::Failed(reason) => println!("FAIL {backend}: {reason}"),
    }
}

/// Success rate in percent; zero when nothing ran
fn success_rate(results: &[(String, BackendOutcome)]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let succeeded = results.iter().filter(|(_, o)| o.is_success()).count();
    succeeded as f64 / results.len() as f64 * 100.0
}

fn print_summary(results: &[(String, BackendOutcome)]) {
    let (succeeded, failed): (Vec<_>, Vec<_>) =
        results.iter().partition(|(_, outcome)| outcome.is_success());
    let names = |items: &[&(String, BackendOutcome)]| {
        items
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    println!("\n{RULE}\nSummary\n{RULE}");
    println!("Succeeded ({}): {}", succeeded.len(), names(&succeeded));
    if !failed.is_empty() {
        println!("Failed ({}): {}", failed.len(), names(&failed));
    }
    println!(
        "\nSuccess rate: {}/{} = {:.1}%",
        succeeded.len(),
        results.len(),
        success_rate(results)
    );
}
