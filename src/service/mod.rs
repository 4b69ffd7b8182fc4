//! External services reached from feature effects.

mod image_api;

pub use image_api::{ImageApi, ImageApiError, NoopImageApi, UnsplashClient};
