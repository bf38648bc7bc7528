//! # TaskTrack Worker Library
//!
//! Due-date reminder sweeping for TaskTrack. The worker periodically scans
//! for tasks due within a lookahead window and asks a [`mailer::Mailer`]
//! to send a reminder to each task's creator.
//!
//! ## Modules
//!
//! - `mailer`: Reminder delivery contract plus log and mock implementations
//! - `sweeper`: The periodic sweep loop

pub mod mailer;
pub mod sweeper;
