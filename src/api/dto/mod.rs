//! Data Transfer Objects for REST request/response serialization.

pub mod feed_dto;
pub mod wallet_dto;

pub use feed_dto::*;
pub use wallet_dto::*;
