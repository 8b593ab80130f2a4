mod client;
mod error;
mod rest;
mod service;
mod wire;

pub use service::Service;
