use super::{types::*, EngineError, OcrEngine};
use crate::config::Config;
use anyhow::{anyhow, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Spawns the PaddleOCR recognizer script once per call: one JSON request on
/// stdin, one JSON response on stdout.
pub struct PythonEngine {
    cfg: Config,
    script: PathBuf,
    python_exe: PathBuf,
}

impl PythonEngine {
    pub fn new(cfg: &Config) -> Result<Self> {
        let script = PathBuf::from(&cfg.paths.scripts_dir).join(&cfg.engine.recognizer_script);
        if !script.exists() {
            return Err(anyhow!("missing recognizer script: {}", script.display()));
        }
        let python_exe = resolve_python_exe(&cfg.engine.python_exe);
        Ok(Self {
            cfg: cfg.clone(),
            script,
            python_exe,
        })
    }

    fn run_json<I: serde::Serialize, O: for<'de> serde::Deserialize<'de>>(
        &self,
        input: &I,
        timeout_seconds: u64,
    ) -> Result<O, EngineError> {
        debug!(
            "python run {} timeout={}s",
            self.script.display(),
            timeout_seconds
        );
        let mut cmd = Command::new(&self.python_exe);
        cmd.arg(&self.script);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        for (k, v) in &self.cfg.engine.env {
            cmd.env(k, v);
        }

        let mut child = cmd.spawn().map_err(|e| {
            EngineError::permanent(format!("spawning {}: {e}", self.python_exe.display()))
        })?;

        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| EngineError::permanent("no stdin on python child"))?;
            let bytes = serde_json::to_vec(input)
                .map_err(|e| EngineError::permanent(format!("encoding request: {e}")))?;
            use std::io::Write;
            stdin
                .write_all(&bytes)
                .map_err(|e| EngineError::unknown(format!("writing request: {e}")))?;
            stdin.flush().ok();
        }

        let output = if timeout_seconds > 0 {
            wait_with_timeout(&mut child, Duration::from_secs(timeout_seconds))?
        } else {
            child
                .wait_with_output()
                .map_err(|e| EngineError::unknown(format!("waiting for python: {e}")))?
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::unknown(format!(
                "python script failed: {}",
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| EngineError::permanent(format!("parsing python JSON output: {e}")))
    }
}

fn resolve_python_exe(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
        if let Ok(env_val) = std::env::var("OCR_PYTHON") {
            let p = expand_tilde(&env_val);
            if p.exists() {
                return p;
            }
        }
        return PathBuf::from("python3");
    }
    expand_tilde(raw)
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

impl OcrEngine for PythonEngine {
    fn doctor(&self) -> Result<EngineDiag> {
        self.run_json::<_, EngineDiag>(
            &serde_json::json!({"cmd": "doctor"}),
            self.cfg.engine.doctor_timeout_seconds,
        )
        .map_err(|e| anyhow!("doctor failed: {e}"))
    }

    fn recognize(&self, image: &Path) -> Result<Vec<RawLine>, EngineError> {
        let req = RecognizeIn {
            image_path: image.display().to_string(),
            lang: self.cfg.engine.lang.clone(),
            use_angle_cls: self.cfg.engine.use_angle_cls,
        };
        let out: RecognizeOut = self.run_json(
            &serde_json::json!({"cmd": "recognize", "req": req}),
            self.cfg.engine.call_timeout_seconds,
        )?;
        if !out.ok {
            let msg = out.error.unwrap_or_else(|| "recognize failed".to_string());
            return Err(EngineError::unknown(msg));
        }
        Ok(out.lines)
    }
}

fn join_reader(
    handle: std::thread::JoinHandle<std::io::Result<Vec<u8>>>,
    what: &str,
) -> Result<Vec<u8>, EngineError> {
    handle
        .join()
        .map_err(|_| EngineError::unknown(format!("{what} reader thread panicked")))?
        .map_err(|e| EngineError::unknown(format!("reading {what}: {e}")))
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Output, EngineError> {
    // Drain pipes while waiting so a chatty recognizer can't deadlock the
    // child on a full stdout/stderr buffer.
    let stdout_reader = child.stdout.take();
    let stderr_reader = child.stderr.take();

    let stdout_thread = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout_reader {
            out.read_to_end(&mut buf)?;
        }
        Ok(buf)
    });

    let stderr_thread = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr_reader {
            err.read_to_end(&mut buf)?;
        }
        Ok(buf)
    });

    let start = Instant::now();
    loop {
        if let Some(status) = child
            .try_wait()
            .map_err(|e| EngineError::unknown(format!("try_wait: {e}")))?
        {
            let stdout = join_reader(stdout_thread, "stdout")?;
            let stderr = join_reader(stderr_thread, "stderr")?;
            return Ok(Output {
                status,
                stdout,
                stderr,
            });
        }

        if start.elapsed() > timeout {
            warn!("python process timed out after {:?}", timeout);
            let _ = child.kill();
            let _ = child.wait();
            let _ = join_reader(stdout_thread, "stdout");
            let stderr = join_reader(stderr_thread, "stderr").unwrap_or_default();
            return Err(EngineError::transient(format!(
                "python process exceeded timeout ({:?}); stderr: {}",
                timeout,
                String::from_utf8_lossy(&stderr).trim()
            )));
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}
