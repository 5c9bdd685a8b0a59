pub mod account;
pub mod deposit;
pub mod events;
pub mod gateway;
pub mod jobs;
pub mod money;
pub mod ports;
pub mod referral;
pub mod user;
pub mod variant;
pub mod wallet;
pub mod withdrawal;
