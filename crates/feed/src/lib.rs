//! Client for the BMKG TEWS public earthquake feed.

pub mod bmkg;

pub use bmkg::{BmkgClient, FeedError};
