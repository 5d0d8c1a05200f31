//! 撮影セッションのワークフロー

mod controller;
mod state;

pub use controller::{ClassificationTicket, WorkflowController, WorkflowError};
pub use state::{GuideOrder, SessionError, Step, WorkflowState};
