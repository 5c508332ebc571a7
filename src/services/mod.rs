//! Business logic behind the REST handlers.
//!
//! - `rma`: RMA submission pipeline
//! - `notification`: webhook and email notices for submissions
//! - `esg`: ESG score computation
//! - `gamification`: achievement progress and milestones
//! - `warranty`: warranty lookup by serial number

pub mod esg;
pub mod gamification;
pub mod notification;
pub mod rma;
pub mod warranty;

pub use esg::{compute_score, EsgScore, PillarScores};
pub use gamification::{refresh_progress, ProgressReport};
pub use notification::{
    EmailMessage, LogMailer, Mailer, NotifyError, NotifyOutcome, RecordingMailer, RmaNotifier,
};
pub use rma::{RmaError, RmaService, RmaSubmission, SubmittedRma};
pub use warranty::WarrantyStatus;
