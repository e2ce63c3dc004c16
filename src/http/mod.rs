//! HTTP fetch primitive shared by every collector.

pub mod client;

pub use client::{FetchRequest, FetchResponse, Fetcher, HttpClient, Method};
