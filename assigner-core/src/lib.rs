//! Assigner Core - reviewer assignment engine
//!
//! This crate holds the domain model, the reviewer selector, the storage
//! capability traits (with an in-memory backend) and the services that
//! create pull requests, merge them and reassign reviewers.

pub mod config;
pub mod error;
pub mod models;
pub mod random;
pub mod selector;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{EntityKind, Error, ErrorCode, Result};
pub use models::{
    AssignmentStats, NewMember, NewTeam, PrStatus, PullRequest, PullRequestShort, Team, User,
    UserWithTeam,
};
pub use random::{RandomSource, RngSource, SelectionError};
pub use selector::ReviewerSelector;
pub use service::{PullRequestService, Reassignment, Services, TeamService, UserService};
pub use store::{InMemoryStore, PullRequestStore, TeamStore, UserStore};
