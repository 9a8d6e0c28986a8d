pub mod account;
pub mod backup;
pub mod cards;
pub mod review;
pub mod stats;
