pub mod client;
pub mod error;
pub mod types;

pub use client::ImageClient;
pub use error::ImageApiError;
pub use types::{GeneratedImage, GenerationStatus};
