//! # Kumu Core
//!
//! Everything the Kumu admin console knows without touching the network.
//!
//! - [`schema`]: wire types of the Kumu REST API
//! - [`money`]: integer fixed-point amounts and currency formatting
//! - [`validation`]: bank-detail and form checks, composite pre-flight checks
//! - [`stats`]: influencer performance, overview and earnings aggregation
//! - [`workflow`]: which review decisions a withdrawal or application accepts
//! - [`session`]: per-role bearer tokens and their on-disk store
//!
//! ## Example
//!
//! ```
//! use kumu_core::money::{format_currency, Amount};
//! use kumu_core::validation::bank;
//!
//! assert!(bank::routing_number("021000021"));
//! assert_eq!(format_currency(Amount::from_units(20)), "$20.00");
//! ```

pub mod money;
pub mod schema;
pub mod session;
pub mod stats;
pub mod validation;
pub mod workflow;

pub use money::{format_currency, Amount, AmountError};
pub use session::{MemoryTokenStore, RedbTokenStore, Role, Session, StoreError, TokenStore};
pub use stats::{InfluencerStats, OverviewStats, PerformanceTier};
pub use validation::{FieldError, ValidationErrors};
pub use workflow::{ApprovalAction, TransitionError, WithdrawalAction};
