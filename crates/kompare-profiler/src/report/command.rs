use std::io::ErrorKind;
use std::process::{Output, Stdio};

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tracing::debug;

use super::{Document, ReportConfig, ReportEngine, ReportMode};
use crate::error::ProfilingError;
use crate::tabular::{Row, TabularData};

/// What the engine reads from stdin.
#[derive(Serialize)]
struct EngineRequest<'a> {
    title: &'a str,
    mode: ReportMode,
    columns: &'a [String],
    rows: &'a [Row],
}

/// Runs an external program per report: request JSON on stdin, HTML on
/// stdout.
#[derive(Debug, Clone)]
pub struct CommandReportEngine {
    program: String,
    args: Vec<String>,
}

impl CommandReportEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

/// Prefers stderr, then stdout, then the exit code.
fn format_engine_error(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !stdout.is_empty() {
        return stdout;
    }
    match output.status.code() {
        Some(code) => format!("engine exited with code {}", code),
        None => "engine terminated by signal".to_string(),
    }
}

#[async_trait]
impl ReportEngine for CommandReportEngine {
    async fn produce_report(
        &self,
        data: &TabularData,
        config: &ReportConfig,
    ) -> Result<Document, ProfilingError> {
        let request = serde_json::to_vec(&EngineRequest {
            title: &config.title,
            mode: config.mode,
            columns: &data.columns,
            rows: &data.rows,
        })
        .map_err(|e| ProfilingError::new(format!("failed to encode engine input: {}", e)))?;

        let mut child = TokioCommand::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProfilingError::new(format!("failed to start '{}': {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ProfilingError::new("engine stdin was not captured"))?;
        // stdin is fed while stdout drains.
        let writer = tokio::spawn(async move {
            stdin.write_all(&request).await?;
            stdin.shutdown().await
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ProfilingError::new(format!("failed to wait for engine: {}", e)))?;
        let written = writer.await;

        if !output.status.success() {
            return Err(ProfilingError::new(format_engine_error(&output)));
        }
        match written {
            Ok(Ok(())) => {}
            // Exited cleanly without consuming the whole request.
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                debug!(program = %self.program, "Engine closed its input early");
            }
            Ok(Err(e)) => {
                return Err(ProfilingError::new(format!(
                    "failed to write engine input: {}",
                    e
                )))
            }
            Err(e) => {
                return Err(ProfilingError::new(format!(
                    "engine input writer failed: {}",
                    e
                )))
            }
        }

        let html = String::from_utf8(output.stdout)
            .map_err(|_| ProfilingError::new("engine output is not valid UTF-8"))?;
        if html.trim().is_empty() {
            return Err(ProfilingError::new("engine produced an empty document"));
        }

        debug!(program = %self.program, bytes = html.len(), "Engine produced report");
        Ok(Document::new(html))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::tabular::ParserRegistry;

    fn sh(script: &str) -> CommandReportEngine {
        CommandReportEngine::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    fn data() -> TabularData {
        ParserRegistry::new()
            .parse(b"city,visits\nBern,3\nBasel,5\n", "csv")
            .unwrap()
    }

    #[tokio::test]
    async fn test_engine_output_becomes_document() {
        let engine = sh("cat > /dev/null; printf '<html><body>ok</body></html>'");
        let document = engine
            .produce_report(&data(), &ReportConfig::default())
            .await
            .unwrap();
        assert_eq!(document.html, "<html><body>ok</body></html>");
    }

    #[tokio::test]
    async fn test_engine_receives_request_json() {
        let engine = sh("cat");
        let config = ReportConfig {
            title: "Visits".to_string(),
            mode: ReportMode::Explorative,
        };
        let document = engine.produce_report(&data(), &config).await.unwrap();

        let echoed: serde_json::Value = serde_json::from_str(&document.html).unwrap();
        assert_eq!(echoed["title"], "Visits");
        assert_eq!(echoed["mode"], "explorative");
        assert_eq!(echoed["columns"], serde_json::json!(["city", "visits"]));
        assert_eq!(echoed["rows"][1]["city"], "Basel");
    }

    #[tokio::test]
    async fn test_engine_ignoring_large_input_still_succeeds() {
        let rows: Vec<Row> = (0..20_000)
            .map(|i| {
                let mut row = Row::new();
                row.insert("city".to_string(), serde_json::json!(format!("city-{:08}", i)));
                row
            })
            .collect();
        let data = TabularData::new(vec!["city".to_string()], rows);

        let engine = sh("printf '<html>done</html>'");
        let document = engine
            .produce_report(&data, &ReportConfig::default())
            .await
            .unwrap();
        assert_eq!(document.html, "<html>done</html>");
    }

    #[tokio::test]
    async fn test_engine_closing_input_and_failing_reports_stderr() {
        let engine = sh("exec 0<&-; echo 'engine crashed' >&2; exit 1");
        let err = engine
            .produce_report(&data(), &ReportConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.message, "engine crashed");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_error() {
        let engine = sh("echo 'column visits is empty' >&2; exit 3");
        let err = engine
            .produce_report(&data(), &ReportConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.message, "column visits is empty");
    }

    #[tokio::test]
    async fn test_silent_failure_reports_exit_code() {
        let engine = sh("exit 2");
        let err = engine
            .produce_report(&data(), &ReportConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.message, "engine exited with code 2");
    }

    #[tokio::test]
    async fn test_empty_output_is_error() {
        let engine = sh("cat > /dev/null");
        let err = engine
            .produce_report(&data(), &ReportConfig::default())
            .await
            .unwrap_err();
        assert!(err.message.contains("empty"));
    }

    #[tokio::test]
    async fn test_non_utf8_output_is_error() {
        let engine = sh("cat > /dev/null; printf '\\377\\376'");
        let err = engine
            .produce_report(&data(), &ReportConfig::default())
            .await
            .unwrap_err();
        assert!(err.message.contains("UTF-8"));
    }

    #[tokio::test]
    async fn test_missing_program_is_error() {
        let engine = CommandReportEngine::new("/nonexistent/kompare-engine", Vec::new());
        let err = engine
            .produce_report(&data(), &ReportConfig::default())
            .await
            .unwrap_err();
        assert!(err.message.starts_with("failed to start"));
    }
}
