//! Application layer orchestrating the settlement pipeline.
//!
//! Services here own the workflows (ingestion, outcome evaluation,
//! settlement, withdrawal, account and wallet rotation) and talk to the
//! outside world exclusively through the ports in `domain::ports`.

pub mod accounts;
pub mod ingestion;
pub mod outcome;
pub mod proxy;
pub mod referral;
pub mod runtime;
pub mod settlement;
pub mod wallet_pool;
pub mod withdrawal;
