//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{EmbeddingProvider, Settings};
use crate::ingest::TesseractOcr;
use crate::openai::http_client_with_timeout;
use console::style;
use std::process::Command;
use std::time::Duration;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings, config_path: Option<&std::path::Path>) -> anyhow::Result<()> {
    Output::header("Genaniml Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    let tools = vec![
        check_tool("pdftoppm", "pdftoppm -v", install_hint_poppler()),
        check_tool("tesseract", "tesseract --version", install_hint_tesseract()),
    ];
    print_section("External Tools", &tools);
    checks.extend(tools);

    let ocr = vec![
        check_tessdata(settings),
        check_ocr_languages(settings).await,
    ];
    print_section("OCR", &ocr);
    checks.extend(ocr);

    let services = vec![
        check_openai_api_key(settings),
        check_ollama(settings).await,
    ];
    print_section("Services", &services);
    checks.extend(services);

    let audio = vec![check_microphone()];
    print_section("Audio", &audio);
    checks.extend(audio);

    let dirs = check_directories(settings);
    print_section("Directories", &dirs);
    checks.extend(dirs);

    let config = vec![check_config_file(config_path)];
    print_section("Configuration", &config);
    checks.extend(config);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using genaniml.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! genaniml is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
///
/// Only a missing binary is an error: older poppler builds exit non-zero for `-v`.
fn check_tool(name: &str, version_cmd: &str, hint: &str) -> CheckResult {
    let mut parts = version_cmd.split_whitespace();
    let cmd = parts.next().unwrap_or(name);

    match Command::new(cmd).args(parts).output() {
        Ok(output) => {
            // poppler prints its version on stderr
            let text = if output.stdout.is_empty() {
                String::from_utf8_lossy(&output.stderr).into_owned()
            } else {
                String::from_utf8_lossy(&output.stdout).into_owned()
            };
            let version = text.lines().next().unwrap_or("installed").trim().to_string();
            CheckResult::ok(name, &truncate(&version, 50))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}

fn tessdata_prefix(settings: &Settings) -> Option<std::path::PathBuf> {
    let prefix = settings.ocr.tessdata_prefix.trim();
    (!prefix.is_empty()).then(|| Settings::expand_path(prefix))
}

fn check_tessdata(settings: &Settings) -> CheckResult {
    match tessdata_prefix(settings) {
        None => CheckResult::ok("TESSDATA_PREFIX", "using tesseract's built-in path"),
        Some(path) if path.is_dir() => CheckResult::ok("TESSDATA_PREFIX", &path.display().to_string()),
        Some(path) => CheckResult::warning(
            "TESSDATA_PREFIX",
            &format!("{} does not exist", path.display()),
            "Set ocr.tessdata_prefix in the config file (empty = tesseract default)",
        ),
    }
}

async fn check_ocr_languages(settings: &Settings) -> CheckResult {
    let ocr = TesseractOcr::new(tessdata_prefix(settings));
    match ocr.list_languages().await {
        Ok(langs) if langs.is_empty() => CheckResult::warning(
            "OCR languages",
            "none installed",
            "Install training data, e.g. tesseract-ocr-eng and tesseract-ocr-kan",
        ),
        Ok(langs) => CheckResult::ok("OCR languages", &langs.join(", ")),
        Err(e) => CheckResult::warning(
            "OCR languages",
            &format!("could not list: {}", e),
            "Check that tesseract runs and TESSDATA_PREFIX is correct",
        ),
    }
}

/// Speech recognition (and OpenAI embeddings) need the key; nothing else does.
fn check_openai_api_key(settings: &Settings) -> CheckResult {
    let required = settings.embedding.provider == EmbeddingProvider::OpenAI;
    let hint = "Set with: export OPENAI_API_KEY='sk-...'";

    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Ok(key) if !key.is_empty() => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        _ if required => CheckResult::error("OPENAI_API_KEY", "not set (needed for embeddings)", hint),
        _ => CheckResult::warning("OPENAI_API_KEY", "not set (speech recognition disabled)", hint),
    }
}

async fn check_ollama(settings: &Settings) -> CheckResult {
    let name = format!("Ollama ({})", settings.llm.model);
    let hint = "Start with: ollama serve && ollama pull gemma2:2b";

    let client = match http_client_with_timeout(Duration::from_secs(5)) {
        Ok(client) => client,
        Err(e) => return CheckResult::error(&name, &e.to_string(), hint),
    };

    let url = format!("{}/api/tags", settings.llm.base_url.trim_end_matches('/'));
    let tags: serde_json::Value = match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => match resp.json().await {
            Ok(v) => v,
            Err(e) => return CheckResult::warning(&name, &format!("unexpected reply: {}", e), hint),
        },
        Ok(resp) => {
            return CheckResult::error(&name, &format!("HTTP {}", resp.status()), hint)
        }
        Err(_) => {
            return CheckResult::error(
                &name,
                &format!("not reachable at {}", settings.llm.base_url),
                hint,
            )
        }
    };

    if model_installed(&tags, &settings.llm.model) {
        CheckResult::ok(&name, &format!("reachable at {}", settings.llm.base_url))
    } else {
        CheckResult::warning(
            &name,
            "reachable but model not pulled",
            &format!("Pull with: ollama pull {}", settings.llm.model),
        )
    }
}

fn model_installed(tags: &serde_json::Value, model: &str) -> bool {
    tags["models"]
        .as_array()
        .map(|models| {
            models.iter().any(|m| {
                m["name"]
                    .as_str()
                    .map(|n| n == model || n.strip_suffix(":latest") == Some(model))
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

#[cfg(feature = "microphone")]
fn check_microphone() -> CheckResult {
    if crate::transcription::Microphone::is_available() {
        CheckResult::ok("Microphone", "input device found")
    } else {
        CheckResult::warning("Microphone", "no input device", "Connect a microphone to use 'listen'")
    }
}

#[cfg(not(feature = "microphone"))]
fn check_microphone() -> CheckResult {
    CheckResult::warning(
        "Microphone",
        "support not compiled in",
        "Rebuild with --features microphone, or use 'transcribe <file.wav>'",
    )
}

/// Check data directories.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.exists() {
        results.push(CheckResult::ok("Data directory", &data_dir.display().to_string()));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        ));
    }

    let db_path = settings.sqlite_path();
    if db_path.exists() {
        let size = std::fs::metadata(&db_path)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        results.push(CheckResult::ok(
            "Knowledge base",
            &format!("{} ({})", db_path.display(), size),
        ));
    } else {
        results.push(CheckResult::warning(
            "Knowledge base",
            &format!("{} (not created yet)", db_path.display()),
            "Add documents with: genaniml ingest <file.pdf> --state <state>",
        ));
    }

    results
}

/// Check if config file exists.
fn check_config_file(config_path: Option<&std::path::Path>) -> CheckResult {
    let config_path = config_path
        .map(|p| p.to_path_buf())
        .unwrap_or_else(Settings::default_config_path);
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: genaniml config edit",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn install_hint_poppler() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install poppler"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install poppler-utils (or your package manager)"
    } else {
        "Install from: https://poppler.freedesktop.org"
    }
}

fn install_hint_tesseract() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install tesseract tesseract-lang"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install tesseract-ocr tesseract-ocr-kan"
    } else {
        "Install from: https://github.com/tesseract-ocr/tesseract"
    }
}
