//! Event type definitions for progress reporting.

use crate::core::assembler::RunSummary;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted while building a database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Local image enumeration
    Scan(ScanEvent),
    /// Candidate index construction
    Index(IndexEvent),
    /// Per-image matching
    Match(MatchEvent),
    /// Set-level progress
    Assembly(AssemblyEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    Started { set_dir: PathBuf },
    ImageFound { path: PathBuf },
    Error { path: PathBuf, message: String },
    Completed { total_images: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IndexEvent {
    Built {
        pool: String,
        candidates: usize,
        unavailable: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatchEvent {
    Started { pool: String, total_images: usize },
    Matched {
        path: PathBuf,
        number: String,
        distance: u32,
    },
    /// The image produced no record; `reason` is human-readable
    Skipped { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AssemblyEvent {
    SetStarted { set_name: String },
    PhaseChanged { phase: AssemblyPhase },
    SetCompleted { summary: RunSummary },
    SetAborted { set_name: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssemblyPhase {
    Indexing,
    Matching,
    Merging,
}

impl std::fmt::Display for AssemblyPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssemblyPhase::Indexing => write!(f, "Hashing reference images..."),
            AssemblyPhase::Matching => write!(f, "Matching local images..."),
            AssemblyPhase::Merging => write!(f, "Merging records..."),
        }
    }
}
