//! Data carried by vote actions and returned by the image service.

mod failure;
mod photo;

pub use failure::Failure;
pub use photo::{Photo, PhotoOrientation, PhotoResults, PhotoUrls};
