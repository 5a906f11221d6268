// File: src/client/extractor.rs
// Text-understanding backends that turn a prompt into a raw response.
use crate::client::recovery::ExtractError;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Anything that answers an extraction prompt with raw text.
pub trait EventExtractor: Send + Sync {
    fn name(&self) -> String;

    fn extract(&self, prompt: &str) -> impl Future<Output = Result<String, ExtractError>> + Send;
}

/// Runs an external program: prompt on stdin, response on stdout.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
}

impl CommandExtractor {
    /// `argv[0]` is the program. Returns `None` for an empty command line.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl EventExtractor for CommandExtractor {
    fn name(&self) -> String {
        format!("command '{}'", self.program)
    }

    async fn extract(&self, prompt: &str) -> Result<String, ExtractError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ExtractError::Unavailable(self.program.clone()),
                _ => ExtractError::Extractor(format!("failed to start {}: {}", self.program, e)),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| ExtractError::Extractor(format!("failed to send prompt: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExtractError::Extractor(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Extractor(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Replays a response captured earlier; the prompt is ignored.
#[derive(Debug, Clone)]
pub struct ResponseFileExtractor {
    path: PathBuf,
}

impl ResponseFileExtractor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EventExtractor for ResponseFileExtractor {
    fn name(&self) -> String {
        format!("response file {}", self.path.display())
    }

    async fn extract(&self, _prompt: &str) -> Result<String, ExtractError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ExtractError::Extractor(format!("{}: {}", self.path.display(), e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    /// Extra attempts after the first one.
    pub retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            retries: 2,
        }
    }
}

/// Calls the extractor with a per-attempt timeout, retrying failures other
/// than a missing program.
pub async fn extract_with_retry<E: EventExtractor>(
    extractor: &E,
    prompt: &str,
    policy: RetryPolicy,
) -> Result<String, ExtractError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let result = match tokio::time::timeout(policy.timeout, extractor.extract(prompt)).await {
            Ok(res) => res,
            Err(_) => Err(ExtractError::Timeout(policy.timeout.as_secs())),
        };
        match result {
            Ok(text) => {
                log::info!(
                    "Extraction via {} returned {} characters",
                    extractor.name(),
                    text.len()
                );
                return Ok(text);
            }
            // A missing program will not appear on the next attempt.
            Err(e @ ExtractError::Unavailable(_)) => return Err(e),
            Err(e) if attempt <= policy.retries => {
                log::warn!("Extraction attempt {} failed: {}; retrying", attempt, e);
            }
            Err(e) => return Err(e),
        }
    }
}
