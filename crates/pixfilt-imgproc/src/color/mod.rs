mod gray;

pub use gray::{gray_from_image, gray_from_image_with, grayscale, grayscale_with};
