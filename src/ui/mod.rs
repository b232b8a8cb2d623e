//! Client side of the playground: the page served at `/` and a Rust model
//! of its tab state machine that drives the proxy routes.

pub mod api;
pub mod format;
pub mod object_url;
pub mod page;
pub mod state;

pub use api::{ApiCall, ApiFailure, ApiReply, HttpPlaygroundApi, PlaygroundApi};
pub use object_url::{ObjectUrl, ObjectUrlRegistry};
pub use state::{Orchestrator, Outcome, ResultSlot, Submission, Tab, ViewState};
