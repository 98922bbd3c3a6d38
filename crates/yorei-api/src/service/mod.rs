//! Service module

mod yorei_api_service;

pub use yorei_api_service::{YoreiApiService, YoreiApiServiceFull, validate_query};
