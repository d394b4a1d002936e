//! Progress reporting for the parse and generate stages.
//!
//! Events for a stage arrive in order: one `start` with the total, then zero or
//! more `advance` calls with a strictly increasing `loaded` count, then
//! `finish`. Sinks are called synchronously from the orchestrating task.

use std::fmt;
use std::sync::mpsc::Sender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Parsing,
    Generating,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Parsing => write!(f, "Parsing"),
            Stage::Generating => write!(f, "Generating"),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn start(&self, stage: Stage, total: usize);

    fn advance(&self, stage: Stage, loaded: usize, label: &str);

    fn finish(&self, _stage: Stage) {}
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn start(&self, _stage: Stage, _total: usize) {}

    fn advance(&self, _stage: Stage, _loaded: usize, _label: &str) {}
}

/// Owned form of a progress callback, for channel-based consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started { stage: Stage, total: usize },
    Advanced { stage: Stage, loaded: usize, label: String },
    Finished { stage: Stage },
}

impl ProgressSink for Sender<ProgressEvent> {
    fn start(&self, stage: Stage, total: usize) {
        let _ = self.send(ProgressEvent::Started { stage, total });
    }

    fn advance(&self, stage: Stage, loaded: usize, label: &str) {
        let _ = self.send(ProgressEvent::Advanced {
            stage,
            loaded,
            label: label.to_string(),
        });
    }

    fn finish(&self, stage: Stage) {
        let _ = self.send(ProgressEvent::Finished { stage });
    }
}
