use std::borrow::Cow;

use eyre::{eyre, Context, Result};
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use jpeg_encoder::{ColorType, Encoder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// How one derived variant is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantParams {
    pub max_width: u32,
    /// JPEG quality (1-100)
    pub quality: u8,
}

/// Scale `size` down to at most `max_width` wide keeping the aspect ratio.
/// Never scales up. The height is rounded and at least 1.
pub fn fit_width(size: Size, max_width: u32) -> Size {
    if size.width <= max_width {
        return size;
    }
    let height = (size.height as f64 * max_width as f64 / size.width as f64).round() as u32;
    Size {
        width: max_width,
        height: height.max(1),
    }
}

/// Resize and re-encode an already decoded image.
/// The output is always progressive JPEG data, alpha is dropped.
pub fn render_variant(img: &DynamicImage, params: &VariantParams) -> Result<(Vec<u8>, Size)> {
    let (width, height) = img.dimensions();
    let target = fit_width(Size { width, height }, params.max_width);
    let resized = if target.width == width {
        Cow::Borrowed(img)
    } else {
        Cow::Owned(img.resize_exact(target.width, target.height, FilterType::Triangle))
    };
    let rgb = resized.to_rgb8();
    // JPEG frames are limited to 16 bit dimensions
    let (Ok(out_width), Ok(out_height)) = (u16::try_from(rgb.width()), u16::try_from(rgb.height()))
    else {
        return Err(eyre!(
            "{}x{} is too large for JPEG",
            rgb.width(),
            rgb.height()
        ));
    };
    let mut buf = Vec::new();
    let mut encoder = Encoder::new(&mut buf, params.quality);
    encoder.set_progressive(true);
    encoder
        .encode(rgb.as_raw(), out_width, out_height, ColorType::Rgb)
        .wrap_err("error encoding JPEG")?;
    Ok((buf, target))
}
