use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};

/// Converts any decoded image to 8-bit grayscale for Tesseract.
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Upscales images shorter than `min_height` pixels.
///
/// Tesseract reads small glyphs poorly; tiny crops are enlarged with
/// the aspect ratio kept. Returns the image and the scale factor applied
/// (1.0 when untouched). A `min_height` of 0 disables scaling.
pub fn upscale_small(img: GrayImage, min_height: u32) -> (GrayImage, f32) {
    let (width, height) = img.dimensions();
    if min_height == 0 || height == 0 || height >= min_height {
        return (img, 1.0);
    }

    let factor = min_height as f32 / height as f32;
    let new_width = ((width as f32 * factor).round() as u32).max(1);
    let resized = image::imageops::resize(&img, new_width, min_height, FilterType::CatmullRom);

    (resized, factor)
}
