//! Page image clean-up before OCR.
//!
//! Scanned government circulars are mostly tables. Ruling lines confuse
//! Tesseract, so they are detected with a morphological opening along each axis
//! and faded out before the page is OCR'd.

use image::{DynamicImage, GrayImage, Luma};

/// Neighbourhood size of the adaptive threshold.
pub const THRESHOLD_BLOCK_SIZE: u32 = 15;
/// Constant subtracted from the weighted neighbourhood mean.
pub const THRESHOLD_C: i16 = 5;
/// Length of the line-detecting structuring elements.
pub const LINE_KERNEL_LENGTH: usize = 40;
/// Erosions (then dilations) per opening.
pub const OPEN_ITERATIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Run the full clean-up and return the image handed to OCR.
///
/// The result is the line-faded page blended 50/50 with the original, which
/// keeps faint strokes that thresholding would otherwise lose.
pub fn preprocess_page(page: &DynamicImage) -> GrayImage {
    let gray = page.to_luma8();
    let binary = adaptive_threshold_inv(&gray, THRESHOLD_BLOCK_SIZE, THRESHOLD_C);

    let horizontal = open(&binary, Axis::Horizontal, LINE_KERNEL_LENGTH, OPEN_ITERATIONS);
    let vertical = open(&binary, Axis::Vertical, LINE_KERNEL_LENGTH, OPEN_ITERATIONS);
    let mask = saturating_add(&horizontal, &vertical);

    let cleaned = remove_lines(&gray, &mask);
    blend(&gray, &cleaned)
}

/// Gaussian adaptive threshold, inverted: dark pixels become 255.
///
/// A pixel is set when it is at most `c` below its Gaussian-weighted
/// neighbourhood mean.
pub fn adaptive_threshold_inv(gray: &GrayImage, block_size: u32, c: i16) -> GrayImage {
    let sigma = 0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let mean = image::imageops::blur(gray, sigma);

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let src = gray.get_pixel(x, y)[0] as i16;
        let threshold = mean.get_pixel(x, y)[0] as i16 - c;
        Luma([if src <= threshold { 255 } else { 0 }])
    })
}

/// Morphological opening of a binary mask with a 1-D rectangular kernel.
fn open(mask: &GrayImage, axis: Axis, length: usize, iterations: usize) -> GrayImage {
    let mut out = mask.clone();
    for _ in 0..iterations {
        out = morph_line(&out, axis, length, true);
    }
    for _ in 0..iterations {
        out = morph_line(&out, axis, length, false);
    }
    out
}

/// Erode (`erode = true`) or dilate along one axis. Pixels outside the image
/// never influence the result.
fn morph_line(mask: &GrayImage, axis: Axis, length: usize, erode: bool) -> GrayImage {
    let (width, height) = (mask.width() as usize, mask.height() as usize);
    let (lines, line_len) = match axis {
        Axis::Horizontal => (height, width),
        Axis::Vertical => (width, height),
    };
    let anchor = length / 2;
    let coords = |line: usize, i: usize| -> (u32, u32) {
        match axis {
            Axis::Horizontal => (i as u32, line as u32),
            Axis::Vertical => (line as u32, i as u32),
        }
    };

    let mut out = GrayImage::new(mask.width(), mask.height());
    let mut prefix = vec![0usize; line_len + 1];

    for line in 0..lines {
        for i in 0..line_len {
            let (x, y) = coords(line, i);
            prefix[i + 1] = prefix[i] + usize::from(mask.get_pixel(x, y)[0] > 0);
        }

        for i in 0..line_len {
            // Dilation uses the reflected kernel so an opening restores runs in place.
            let (before, after) = if erode {
                (anchor, length - anchor)
            } else {
                (length - 1 - anchor, anchor + 1)
            };
            let start = i.saturating_sub(before);
            let end = (i + after).min(line_len);
            let set = prefix[end] - prefix[start];
            let on = if erode { set == end - start } else { set > 0 };
            if on {
                let (x, y) = coords(line, i);
                out.put_pixel(x, y, Luma([255]));
            }
        }
    }

    out
}

fn saturating_add(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        Luma([a.get_pixel(x, y)[0].saturating_add(b.get_pixel(x, y)[0])])
    })
}

/// Invert masked pixels so dark rules turn light; leave the rest untouched.
fn remove_lines(gray: &GrayImage, mask: &GrayImage) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = gray.get_pixel(x, y)[0];
        if mask.get_pixel(x, y)[0] > 0 {
            Luma([255 - value])
        } else {
            Luma([value])
        }
    })
}

/// Equal-weight blend of two images.
fn blend(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let sum = a.get_pixel(x, y)[0] as u16 + b.get_pixel(x, y)[0] as u16;
        Luma([((sum + 1) / 2) as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(width: u32, height: u32) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([255]))
    }

    #[test]
    fn test_threshold_uniform_page_is_empty() {
        let binary = adaptive_threshold_inv(&white(40, 40), THRESHOLD_BLOCK_SIZE, THRESHOLD_C);
        assert!(binary.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_threshold_marks_dark_strokes() {
        let mut page = white(60, 60);
        for x in 10..50 {
            page.put_pixel(x, 30, Luma([0]));
        }
        let binary = adaptive_threshold_inv(&page, THRESHOLD_BLOCK_SIZE, THRESHOLD_C);
        assert_eq!(binary.get_pixel(25, 30)[0], 255);
        assert_eq!(binary.get_pixel(25, 10)[0], 0);
    }

    #[test]
    fn test_opening_keeps_long_runs_and_drops_short_ones() {
        let mut mask = GrayImage::new(200, 20);
        for x in 20..140 {
            mask.put_pixel(x, 5, Luma([255]));
        }
        for x in 150..180 {
            mask.put_pixel(x, 15, Luma([255]));
        }

        let opened = open(&mask, Axis::Horizontal, LINE_KERNEL_LENGTH, OPEN_ITERATIONS);
        assert!((20..140).all(|x| opened.get_pixel(x, 5)[0] == 255));
        assert_eq!(opened.get_pixel(19, 5)[0], 0);
        assert_eq!(opened.get_pixel(140, 5)[0], 0);
        assert!((150..180).all(|x| opened.get_pixel(x, 15)[0] == 0));

        let vertical = open(&mask, Axis::Vertical, LINE_KERNEL_LENGTH, OPEN_ITERATIONS);
        assert!(vertical.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_vertical_opening() {
        let mut mask = GrayImage::new(10, 150);
        for y in 0..120 {
            mask.put_pixel(4, y, Luma([255]));
        }
        let opened = open(&mask, Axis::Vertical, LINE_KERNEL_LENGTH, OPEN_ITERATIONS);
        assert!((0..120).all(|y| opened.get_pixel(4, y)[0] == 255));
        assert_eq!(opened.get_pixel(4, 130)[0], 0);
    }

    #[test]
    fn test_preprocess_fades_rules_and_keeps_text() {
        let mut page = white(200, 60);
        for x in 0..200 {
            page.put_pixel(x, 30, Luma([0]));
        }
        for x in 50..55 {
            for y in 10..15 {
                page.put_pixel(x, y, Luma([0]));
            }
        }

        let out = preprocess_page(&DynamicImage::ImageLuma8(page));
        assert_eq!(out.dimensions(), (200, 60));

        let rule = out.get_pixel(100, 30)[0];
        assert!((127..=128).contains(&rule), "rule pixel was {}", rule);
        assert_eq!(out.get_pixel(52, 12)[0], 0);
        assert_eq!(out.get_pixel(150, 50)[0], 255);
    }
}
