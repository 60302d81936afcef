//! PDF export — compiles rendered LaTeX with an external engine.
//!
//! The compiler is a trait so the router can be exercised without a TeX toolchain.

use std::process::Stdio;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// File names used inside the per-request build directory.
const SOURCE_FILE: &str = "resume.tex";
const OUTPUT_FILE: &str = "resume.pdf";

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error in build directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to launch '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("LaTeX compilation failed\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    Failed { stdout: String, stderr: String },
}

#[async_trait]
pub trait DocumentCompiler: Send + Sync {
    /// Compiles LaTeX source to PDF bytes.
    async fn compile(&self, markup: &str) -> Result<Bytes, CompileError>;
}

/// Runs `<binary> -X compile resume.tex` in a fresh temporary directory.
pub struct TectonicCompiler {
    binary: String,
}

impl TectonicCompiler {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl DocumentCompiler for TectonicCompiler {
    async fn compile(&self, markup: &str) -> Result<Bytes, CompileError> {
        let dir = tempfile::tempdir()?;
        tokio::fs::write(dir.path().join(SOURCE_FILE), markup).await?;

        let output = Command::new(&self.binary)
            .args(["-X", "compile", SOURCE_FILE])
            .current_dir(dir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| CompileError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            warn!("{} exited with {}", self.binary, output.status);
            return Err(CompileError::Failed {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr,
            });
        }

        let pdf = tokio::fs::read(dir.path().join(OUTPUT_FILE)).await?;
        debug!("Compiled {} bytes of LaTeX into {} bytes of PDF", markup.len(), pdf.len());
        Ok(Bytes::from(pdf))
    }
}
