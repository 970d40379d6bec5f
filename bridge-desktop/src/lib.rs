//! # Desktop Bridge
//!
//! Desktop implementations of the `bridge-traits` seams. Currently that is
//! the reqwest-backed [`HttpClient`](bridge_traits::http::HttpClient).

pub mod http;

pub use http::ReqwestHttpClient;
