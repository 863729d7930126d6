//! Relay node configuration: field codecs and the mutation workflow.

pub mod address;
pub mod credential;
pub mod custom_config;
pub(crate) mod form;
pub mod models;
pub mod outcome;
pub mod quantity;
pub mod rate_policy;
pub mod service;

pub use address::{AddressResolver, HostResolver, SystemResolver};
pub use models::{NodeEditView, NodeForm};
pub use outcome::{Degradation, MutationOutcome, MutationResponse};
pub use service::{DnsTarget, NodeEventSettings, NodeMutationService, NodeServiceError};
