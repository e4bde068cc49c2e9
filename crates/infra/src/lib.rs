//! Infrastructure and application layer: storage, collaborators, configuration and the
//! services that drive the donation workflow.

pub mod clock;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod inventory_engine;
pub mod store;
pub mod views;
pub mod workflow;


pub use clock::{Clock, FixedClock, SystemClock};
pub use collaborators::{AppointmentService, AppointmentSummary, Donor, IdentityProvider};
pub use config::HemaflowConfig;
pub use error::{WorkflowError, WorkflowResult};
pub use inventory_engine::InventoryEngine;
pub use store::{
    Commit, HealthCheckStore, InMemoryBloodBank, InventoryStore, ProcessStore, StoreError,
    TransactionalStore,
};
pub use views::{DonationProcessView, DonorSummary};
pub use workflow::DonationWorkflow;
