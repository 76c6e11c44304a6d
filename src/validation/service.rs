//! Single shared scoring worker with per-sheet deadlines
//!
//! The model is the one expensive shared resource of a run. It is loaded
//! once and owned by a dedicated thread; sheet workers queue requests to it
//! and wait no longer than their sheet's deadline. Requests whose deadline
//! has passed are dropped unscored. A call that overruns its deadline is
//! interrupted and the model restarted.

use crate::io::configuration::{SCORER_INTERRUPT_GRACE_MS, SCORER_WATCHDOG_POLL_MS};
use crate::io::error::{PipelineError, Result};
use crate::validation::scorer::{Interrupt, Scorer};
use image::RgbaImage;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

struct ScoreRequest {
    crop: RgbaImage,
    prompts: Vec<String>,
    deadline: Instant,
    budget: Duration,
    reply: Sender<Result<Vec<f64>>>,
}

// Deadline of the similarity call currently running, if any
type InFlight = Mutex<Option<Instant>>;

fn set_in_flight(in_flight: &InFlight, deadline: Option<Instant>) {
    if let Ok(mut slot) = in_flight.lock() {
        *slot = deadline;
    }
}

fn serve(
    scorer: &mut dyn Scorer,
    request: &ScoreRequest,
    in_flight: &InFlight,
) -> Result<Vec<f64>> {
    let mut scores = Vec::with_capacity(request.prompts.len());
    for prompt in &request.prompts {
        if Instant::now() >= request.deadline {
            return Err(PipelineError::ScoringTimeout {
                budget: request.budget,
            });
        }
        set_in_flight(in_flight, Some(request.deadline));
        let score = scorer.similarity(&request.crop, prompt);
        set_in_flight(in_flight, None);
        scores.push(score?);
    }
    Ok(scores)
}

fn spawn_watchdog(in_flight: Weak<InFlight>, interrupt: Interrupt) -> Result<()> {
    let grace = Duration::from_millis(SCORER_INTERRUPT_GRACE_MS);
    let poll = Duration::from_millis(SCORER_WATCHDOG_POLL_MS);

    thread::Builder::new()
        .name("scorer-watchdog".to_string())
        .spawn(move || {
            while let Some(current) = in_flight.upgrade() {
                let overdue = current
                    .lock()
                    .ok()
                    .and_then(|mut slot| {
                        slot.take_if(|deadline| Instant::now() >= *deadline + grace)
                    })
                    .is_some();
                drop(current);
                if overdue {
                    warn!("scoring call overran its deadline, interrupting the model");
                    interrupt();
                }
                thread::sleep(poll);
            }
        })
        .map_err(|e| PipelineError::ScoringUnavailable {
            reason: format!("cannot start scoring watchdog: {e}"),
        })?;
    Ok(())
}

/// Handle to the scoring thread, shareable across sheet workers
pub struct ScoringService {
    requests: Sender<ScoreRequest>,
    model_version: String,
}

impl ScoringService {
    /// Move a loaded scorer onto its own thread
    ///
    /// Scorers that can be interrupted also get a watchdog thread that
    /// kills calls running past their deadline.
    ///
    /// # Errors
    ///
    /// Returns an error if a thread cannot be spawned
    pub fn spawn(mut scorer: Box<dyn Scorer>) -> Result<Self> {
        let model_version = scorer.model_version();
        let (requests, inbox) = mpsc::channel::<ScoreRequest>();
        let in_flight: Arc<InFlight> = Arc::default();

        if let Some(interrupt) = scorer.interrupter() {
            spawn_watchdog(Arc::downgrade(&in_flight), interrupt)?;
        }

        thread::Builder::new()
            .name("scorer".to_string())
            .spawn(move || {
                for request in inbox {
                    let scores = serve(scorer.as_mut(), &request, &in_flight);
                    if matches!(scores, Err(PipelineError::ScoringUnavailable { .. })) {
                        match scorer.restart() {
                            Ok(()) => debug!("scoring model restarted"),
                            Err(error) => warn!(%error, "scoring model restart failed"),
                        }
                    }
                    // The requester may have given up on its deadline already
                    let _ = request.reply.send(scores);
                }
                debug!("scoring thread stopped");
            })
            .map_err(|e| PipelineError::ScoringUnavailable {
                reason: format!("cannot start scoring thread: {e}"),
            })?;

        Ok(Self {
            requests,
            model_version,
        })
    }

    /// Identifier of the loaded model
    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Score a crop against every prompt, giving up at `deadline`
    ///
    /// Similarities come back in prompt order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ScoringTimeout`] when the deadline passes,
    /// [`PipelineError::ScoringUnavailable`] when the scoring thread has
    /// stopped, or the scorer's own error
    pub fn score(
        &self,
        crop: RgbaImage,
        prompts: Vec<String>,
        deadline: Instant,
        budget: Duration,
    ) -> Result<Vec<f64>> {
        let (reply, answer) = mpsc::channel();
        self.requests
            .send(ScoreRequest {
                crop,
                prompts,
                deadline,
                budget,
                reply,
            })
            .map_err(|e| PipelineError::ScoringUnavailable {
                reason: format!("scoring thread stopped: {e}"),
            })?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        match answer.recv_timeout(remaining) {
            Ok(scores) => scores,
            Err(RecvTimeoutError::Timeout) => Err(PipelineError::ScoringTimeout { budget }),
            Err(RecvTimeoutError::Disconnected) => Err(PipelineError::ScoringUnavailable {
                reason: "scoring thread stopped mid-request".to_string(),
            }),
        }
    }
}
