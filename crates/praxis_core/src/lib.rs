pub mod domain;
pub mod intake;
pub mod patterns;
pub mod ports;
pub mod recall;
pub mod schedule;

pub use domain::{
    Classification, DetectedPattern, HistoryEntry, Importance, Insight, NewInsight, NewPattern,
    NewThought, Pattern, PatternKind, ReviewUpdate, Thought, ThoughtDraft, User, UserCredentials,
};
pub use ports::{
    AiOutcome, ClassificationService, DatabaseService, EmbeddingService, PatternDetectionService,
    PortError, PortResult, TranscriptionService,
};
pub use schedule::RecallAction;

#[cfg(test)]
mod pipeline_tests;
