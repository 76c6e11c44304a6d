//! Scoring capability interface and the external process adapter
//!
//! The pipeline never embeds a vision-language model. It talks to one
//! through [`Scorer`], which answers a single question: how well does this
//! crop match this description. [`ProcessScorer`] adapts a long-running
//! helper process that loads its model once and then answers requests over
//! stdin/stdout:
//!
//! ```text
//! -> (on start)          ready <model-version>\n
//! <- request header      <png-byte-length>\t<prompt>\n
//! <- request body        <png bytes>
//! -> reply               <similarity>\n
//! ```

use crate::io::configuration::{NEGATIVE_PROMPTS, POSITIVE_PROMPTS, SCORER_READY_PREFIX};
use crate::io::error::{PipelineError, Result, invalid_parameter};
use image::{ImageFormat, RgbaImage};
use std::io::{BufRead, BufReader, Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Aborts an in-flight [`Scorer::similarity`] call from another thread
pub type Interrupt = Box<dyn Fn() + Send>;

/// Similarity between an image crop and a text description
pub trait Scorer: Send {
    /// Identifier of the loaded model, recorded with every verdict
    fn model_version(&self) -> String;

    /// Score how well `crop` matches `prompt`; larger means a better match
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot produce a score
    fn similarity(&mut self, crop: &RgbaImage, prompt: &str) -> Result<f64>;

    /// Handle that makes a blocked call return, if the scorer has one
    fn interrupter(&self) -> Option<Interrupt> {
        None
    }

    /// Bring the model back after it became unavailable
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be reloaded
    fn restart(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Descriptions of correctly and wrongly framed cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            positive: POSITIVE_PROMPTS.iter().map(ToString::to_string).collect(),
            negative: NEGATIVE_PROMPTS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl PromptSet {
    /// Build a prompt set from explicit descriptions
    ///
    /// # Errors
    ///
    /// Returns an error if either side is empty
    pub fn new(positive: Vec<String>, negative: Vec<String>) -> Result<Self> {
        if positive.is_empty() {
            return Err(invalid_parameter("positive prompts", &"[]", &"at least one is required"));
        }
        if negative.is_empty() {
            return Err(invalid_parameter("negative prompts", &"[]", &"at least one is required"));
        }
        Ok(Self { positive, negative })
    }

    /// Positive then negative prompts, the order scores come back in
    pub fn all(&self) -> Vec<String> {
        self.positive.iter().chain(&self.negative).cloned().collect()
    }

    /// Frame score from similarities ordered as [`PromptSet::all`]
    ///
    /// `max(positive) - max(negative)`; `None` if the slice is the wrong length.
    pub fn frame_score(&self, similarities: &[f64]) -> Option<f64> {
        if similarities.len() != self.positive.len() + self.negative.len() {
            return None;
        }
        let (positive, negative) = similarities.split_at(self.positive.len());
        let best = |scores: &[f64]| scores.iter().copied().reduce(f64::max);
        Some(best(positive)? - best(negative)?)
    }
}

/// Scorer backed by an external model process
///
/// The child is shared with the interrupt handle so a watchdog can kill a
/// call that never answers; [`Scorer::restart`] then launches a fresh one.
pub struct ProcessScorer {
    program: PathBuf,
    args: Vec<String>,
    child: Arc<Mutex<Child>>,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    version: String,
}

fn unavailable(reason: String) -> PipelineError {
    PipelineError::ScoringUnavailable { reason }
}

fn start_process(
    program: &Path,
    args: &[String],
) -> Result<(Child, ChildStdin, BufReader<ChildStdout>, String)> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| unavailable(format!("cannot start '{}': {e}", program.display())))?;

    let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(unavailable("scorer pipes were not captured".to_string()));
    };
    let mut stdout = BufReader::new(stdout);

    let handshake = read_line(&mut stdout).and_then(|line| {
        line.strip_prefix(SCORER_READY_PREFIX)
            .map(str::trim)
            .filter(|version| !version.is_empty())
            .map(ToString::to_string)
            .ok_or_else(|| unavailable(format!("unexpected handshake '{line}'")))
    });
    match handshake {
        Ok(version) => Ok((child, stdin, stdout, version)),
        Err(error) => {
            let _ = child.kill();
            let _ = child.wait();
            Err(error)
        }
    }
}

fn read_line(stdout: &mut BufReader<ChildStdout>) -> Result<String> {
    let mut line = String::new();
    let read = stdout
        .read_line(&mut line)
        .map_err(|e| unavailable(format!("scorer output unreadable: {e}")))?;
    if read == 0 {
        return Err(unavailable("scorer process closed its output".to_string()));
    }
    Ok(line.trim().to_string())
}

impl ProcessScorer {
    /// Start the scoring process and wait for its ready line
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ScoringUnavailable`] if the program cannot be
    /// started or exits before announcing itself
    pub fn launch(program: &Path, args: &[String]) -> Result<Self> {
        let (child, stdin, stdout, version) = start_process(program, args)?;
        Ok(Self {
            program: program.to_path_buf(),
            args: args.to_vec(),
            child: Arc::new(Mutex::new(child)),
            stdin,
            stdout,
            version,
        })
    }
}

impl Scorer for ProcessScorer {
    fn model_version(&self) -> String {
        self.version.clone()
    }

    fn similarity(&mut self, crop: &RgbaImage, prompt: &str) -> Result<f64> {
        let mut png = Vec::new();
        crop.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| PipelineError::Scoring {
                reason: format!("cannot encode crop: {e}"),
            })?;

        let prompt = prompt.replace(['\t', '\n', '\r'], " ");
        writeln!(self.stdin, "{}\t{prompt}", png.len())
            .and_then(|()| self.stdin.write_all(&png))
            .and_then(|()| self.stdin.flush())
            .map_err(|e| unavailable(format!("scorer input closed: {e}")))?;

        let reply = read_line(&mut self.stdout)?;
        reply
            .parse::<f64>()
            .ok()
            .filter(|score| score.is_finite())
            .ok_or_else(|| PipelineError::Scoring {
                reason: format!("unparseable score '{reply}'"),
            })
    }

    fn interrupter(&self) -> Option<Interrupt> {
        let child = Arc::clone(&self.child);
        Some(Box::new(move || {
            if let Ok(mut child) = child.lock() {
                let _ = child.kill();
            }
        }))
    }

    fn restart(&mut self) -> Result<()> {
        let (child, stdin, stdout, version) = start_process(&self.program, &self.args)?;
        if version != self.version {
            warn!(was = %self.version, now = %version, "scorer came back with another model");
        }
        let mut slot = self
            .child
            .lock()
            .map_err(|e| unavailable(format!("scorer process handle poisoned: {e}")))?;
        let _ = slot.kill();
        let _ = slot.wait();
        *slot = child;
        drop(slot);

        self.stdin = stdin;
        self.stdout = stdout;
        Ok(())
    }
}

impl Drop for ProcessScorer {
    fn drop(&mut self) {
        if let Ok(mut child) = self.child.lock() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
