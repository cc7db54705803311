//! Live provider adapters.

mod microburbs;

pub use microburbs::MicroburbsClient;
