//! # Recorder Core
//!
//! Segmentation controller for live recording sessions. The media engine
//! (capture, encode, mux, file writes) is an external collaborator; this
//! crate decides what each fragment file is called, tracks the session
//! lifecycle, and serializes the engine's asynchronous notifications.
//!
//! ## Components
//!
//! - [`FragmentNamer`]: pure mapping from fragment index to output path
//! - [`Lifecycle`]/[`SessionState`]: the Idle -> Running -> Stopping ->
//!   Stopped machine
//! - [`EventDispatcher`]: the single serialization point for all session
//!   state, and the completion handle the host process waits on
//! - [`RecordingSession`]: one-time setup (validation, directory resolution)
//! - [`MediaEngine`]: the boundary contract an engine adapter implements

pub mod dispatcher;
pub mod engine;
pub mod lifecycle;
pub mod namer;
pub mod policy;
pub mod session;

pub use dispatcher::EventDispatcher;
pub use engine::MediaEngine;
pub use lifecycle::{Lifecycle, SessionState, ShutdownReason};
pub use namer::FragmentNamer;
pub use policy::{DurationPolicy, FragmentIndex, PolicyError};
pub use session::{EngineSettings, RecordingSession, SessionConfig, SessionError};
