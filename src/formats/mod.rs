// File format handlers
pub mod img;
pub mod metadata;

pub use img::{load_img, load_img_sized, save_img, ImgError};
pub use metadata::Metadata;
