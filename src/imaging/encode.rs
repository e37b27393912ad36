//! PNG encoding.
//!
//! Both modes go through the `png` crate directly rather than
//! `image::codecs::png`, so ancillary chunks are under our control:
//!
//! | Mode | Color type | Compression |
//! |---|---|---|
//! | Lossless | RGBA, always | `Balanced`, adaptive filtering |
//! | Palette | Indexed, median-cut `PLTE`, alpha dropped | `High`, adaptive filtering |
//!
//! Unless metadata is stripped, a `Software` text chunk names the producer.

use super::backend::BackendError;
use super::palette::Palette;
use super::params::{PngMode, PngOptions};
use image::{DynamicImage, RgbaImage};
use png::{BitDepth, ColorType, Compression, Encoder, Filter};

const SOFTWARE: &str = concat!("thumbsplit ", env!("CARGO_PKG_VERSION"));

/// Encode a canvas to PNG bytes.
pub fn encode_png(image: &RgbaImage, options: &PngOptions) -> Result<Vec<u8>, BackendError> {
    let (width, height) = image.dimensions();
    let mut out = Vec::new();
    let mut encoder = Encoder::new(&mut out, width, height);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_filter(Filter::Adaptive);

    let data = match options.mode {
        PngMode::Lossless => {
            encoder.set_compression(Compression::Balanced);
            encoder.set_color(ColorType::Rgba);
            image.as_raw().clone()
        }
        PngMode::Palette { max_colors, dither } => {
            encoder.set_compression(Compression::High);
            let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
            let palette = Palette::median_cut(&rgb, max_colors);
            encoder.set_color(ColorType::Indexed);
            encoder.set_palette(palette.to_plte());
            palette.quantize(&rgb, dither)
        }
    };

    if !options.strip_metadata {
        encoder.add_text_chunk("Software".to_string(), SOFTWARE.to_string())?;
    }

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&data)?;
    writer.finish()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn halves(left: [u8; 4], right: [u8; 4]) -> RgbaImage {
        RgbaImage::from_fn(32, 16, |x, _| Rgba(if x < 16 { left } else { right }))
    }

    fn decode(bytes: &[u8]) -> png::Reader<std::io::Cursor<&[u8]>> {
        png::Decoder::new(std::io::Cursor::new(bytes))
            .read_info()
            .unwrap()
    }

    fn has_software_chunk(bytes: &[u8]) -> bool {
        decode(bytes)
            .info()
            .uncompressed_latin1_text
            .iter()
            .any(|t| t.keyword == "Software")
    }

    #[test]
    fn lossless_roundtrip_is_exact() {
        let img = halves([255, 0, 0, 255], [0, 0, 255, 255]);
        let bytes = encode_png(&img, &PngOptions::lossless()).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn opaque_canvas_still_written_as_rgba() {
        let img = halves([1, 2, 3, 255], [4, 5, 6, 255]);
        let bytes = encode_png(&img, &PngOptions::lossless()).unwrap();
        let reader = decode(&bytes);
        assert_eq!(reader.info().color_type, ColorType::Rgba);
        assert_eq!(reader.info().bit_depth, BitDepth::Eight);
    }

    #[test]
    fn translucent_canvas_keeps_alpha() {
        let img = halves([1, 2, 3, 255], [4, 5, 6, 128]);
        let bytes = encode_png(&img, &PngOptions::lossless()).unwrap();
        assert_eq!(decode(&bytes).info().color_type, ColorType::Rgba);
    }

    #[test]
    fn palette_mode_writes_indexed_png() {
        let img = halves([255, 0, 0, 255], [0, 255, 0, 255]);
        let bytes = encode_png(&img, &PngOptions::palette(16, false)).unwrap();

        let reader = decode(&bytes);
        assert_eq!(reader.info().color_type, ColorType::Indexed);
        assert_eq!(reader.info().palette.as_ref().map(|p| p.len()), Some(6));

        // Two colors fit the palette exactly
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn software_chunk_unless_stripped() {
        let img = halves([9, 9, 9, 255], [99, 99, 99, 255]);
        let plain = encode_png(&img, &PngOptions::lossless()).unwrap();
        let stripped = encode_png(&img, &PngOptions::lossless().stripped()).unwrap();

        assert!(has_software_chunk(&plain));
        assert!(!has_software_chunk(&stripped));
        assert!(stripped.len() < plain.len());
    }
}
