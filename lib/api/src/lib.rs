//! # simrec API
//!
//! HTTP surfaces of simrec:
//!
//! - [`RestApi`] - the recommender service, backed by an [`EngineManager`](simrec_runtime::EngineManager)
//! - [`GatewayApi`] - the user-facing gateway that proxies to the recommender

pub mod gateway;
pub mod rest;

pub use gateway::{GatewayApi, GatewayState, DEFAULT_UPSTREAM_TIMEOUT};
pub use rest::{error_response, RestApi};
