//! PNG decoding, frame cropping and output.

use std::io::Cursor;
use std::path::Path;

use image::{imageops, ImageFormat, RgbaImage};

use crate::error::{MigrateError, Result};
use crate::types::{Rect, SpriteFrame};

use super::write::write_atomic;

/// Decode an image file to RGBA.
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).map_err(|e| MigrateError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to decode image: {}", e),
    })?;
    Ok(img.to_rgba8())
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut encoded = Vec::new();
    img.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
        .map_err(|e| MigrateError::Build {
            message: format!("Failed to encode PNG: {}", e),
            help: None,
        })?;
    Ok(encoded)
}

/// Write an RGBA image to a PNG file atomically.
pub fn write_png(img: &RgbaImage, path: &Path) -> Result<()> {
    let bytes = encode_png(img)?;
    write_atomic(path, &bytes)
}

/// Crop a frame given in bottom-left raster coordinates.
///
/// Returns `None` if the rect does not fit inside the image.
pub fn crop_frame(img: &RgbaImage, rect: &Rect) -> Option<RgbaImage> {
    let top = rect.top_left_y(img.height())?;
    if rect.w == 0 || rect.h == 0 || rect.x.checked_add(rect.w)? > img.width() {
        return None;
    }
    Some(imageops::crop_imm(img, rect.x, top, rect.w, rect.h).to_image())
}

/// True when every pixel is fully transparent (or the image is empty).
pub fn is_blank(img: &RgbaImage) -> bool {
    img.pixels().all(|p| p.0[3] == 0)
}

/// Frames cut out of a sheet.
#[derive(Debug, Default)]
pub struct CroppedFrames {
    /// Non-blank frames with their pixels, in slice order.
    pub kept: Vec<(SpriteFrame, RgbaImage)>,
    /// Fully transparent frames that were dropped.
    pub blank: usize,
}

impl CroppedFrames {
    pub fn frames(&self) -> Vec<SpriteFrame> {
        self.kept.iter().map(|(frame, _)| frame.clone()).collect()
    }
}

/// Crop every sliced frame out of `sheet`, dropping transparent ones.
/// Frames outside the image are skipped.
pub fn crop_frames(sheet: &RgbaImage, frames: Vec<SpriteFrame>) -> CroppedFrames {
    let mut out = CroppedFrames::default();
    for frame in frames {
        let Some(crop) = crop_frame(sheet, &frame.rect) else {
            continue;
        };
        if is_blank(&crop) {
            out.blank += 1;
        } else {
            out.kept.push((frame, crop));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    /// 4x4 image: top half red, bottom half blue.
    fn two_band_image() -> RgbaImage {
        RgbaImage::from_fn(4, 4, |_, y| {
            if y < 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    #[test]
    fn test_write_png_round_trip() {
        let img = two_band_image();
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/test.png");

        write_png(&img, &path).unwrap();

        let back = load_rgba(&path).unwrap();
        assert_eq!(back.dimensions(), (4, 4));
        assert_eq!(back.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(back.get_pixel(0, 3).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_crop_uses_bottom_left_origin() {
        let img = two_band_image();

        // y = 0 is the bottom band in bottom-left coordinates
        let bottom = crop_frame(&img, &Rect::new(0, 0, 4, 2)).unwrap();
        assert_eq!(bottom.get_pixel(0, 0).0, [0, 0, 255, 255]);

        let top = crop_frame(&img, &Rect::new(0, 2, 4, 2)).unwrap();
        assert_eq!(top.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_crop_out_of_bounds() {
        let img = two_band_image();
        assert!(crop_frame(&img, &Rect::new(2, 0, 4, 2)).is_none());
        assert!(crop_frame(&img, &Rect::new(0, 3, 4, 2)).is_none());
        assert!(crop_frame(&img, &Rect::new(0, 0, 0, 2)).is_none());
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&RgbaImage::new(3, 3)));
        assert!(!is_blank(&two_band_image()));
    }

    #[test]
    fn test_crop_frames_drops_blank() {
        let mut img = two_band_image();
        for x in 2..4 {
            for y in 0..2 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
        let frames = crate::sprite::slice(
            4,
            4,
            &crate::types::GridSpec::new(2, 2, 2, 2),
            crate::sprite::NamingConvention::DirectionFirst,
            "t",
            "idle",
        );

        let cropped = crop_frames(&img, frames);

        // Raster top-right is row 1 (SW), column 1
        assert_eq!(cropped.blank, 1);
        assert_eq!(cropped.kept.len(), 3);
        assert!(cropped.frames().iter().all(|f| f.name != "t_SW_01"));
    }

    #[test]
    fn test_load_rgba_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(load_rgba(&path).is_err());
    }
}
