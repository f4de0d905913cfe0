use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;

/// A JPEG ready to be embedded as a DCTDecode XObject.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub components: u8,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Bmp,
}

/// Detect format from raw bytes
pub fn detect_image_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 4 {
        return Err(anyhow!("Image data too short"));
    }
    if data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        Ok(ImageFormat::Jpeg)
    } else if data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47 {
        Ok(ImageFormat::Png)
    } else if data[0] == 0x42 && data[1] == 0x4D {
        Ok(ImageFormat::Bmp)
    } else {
        Err(anyhow!("Unsupported image format"))
    }
}

/// Load a letterhead logo. Only JPEG passes straight through to the PDF,
/// other formats are reported so the caller can skip the logo.
pub fn load_logo(path: &Path) -> Result<ImageInfo> {
    let data = fs::read(path).with_context(|| format!("reading logo {}", path.display()))?;
    parse_logo(data)
}

pub fn parse_logo(data: Vec<u8>) -> Result<ImageInfo> {
    match detect_image_format(&data)? {
        ImageFormat::Jpeg => {
            let (width, height, components) = parse_jpeg_header(&data)?;
            Ok(ImageInfo {
                width,
                height,
                components,
                data,
            })
        }
        other => Err(anyhow!(
            "Only JPEG logos can be embedded without decoding. Got {:?}",
            other
        )),
    }
}

/// Parse the JPEG SOF marker for width, height and component count
fn parse_jpeg_header(data: &[u8]) -> Result<(u32, u32, u8)> {
    let mut i = 2; // skip FF D8
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = data[i + 1];
        i += 2;

        // Baseline, extended and progressive frames
        if marker == 0xC0 || marker == 0xC1 || marker == 0xC2 {
            if i + 8 > data.len() {
                return Err(anyhow!("JPEG SOF marker truncated"));
            }
            let height = ((data[i + 3] as u32) << 8) | (data[i + 4] as u32);
            let width = ((data[i + 5] as u32) << 8) | (data[i + 6] as u32);
            let components = data[i + 7];
            if width == 0 || height == 0 {
                return Err(anyhow!("JPEG has zero dimensions"));
            }
            return Ok((width, height, components));
        }

        if i + 1 >= data.len() {
            break;
        }
        let seg_len = ((data[i] as usize) << 8) | (data[i + 1] as usize);
        i += seg_len;
    }
    Err(anyhow!("Could not find JPEG SOF marker"))
}

/// Scale dimensions to fit within max_width x max_height while preserving
/// aspect ratio. Small logos are enlarged to fill the box.
pub fn scale_to_fit(width: u32, height: u32, max_width: f32, max_height: f32) -> (f32, f32) {
    if width == 0 || height == 0 {
        return (0.0, 0.0);
    }
    let w = width as f32;
    let h = height as f32;
    let scale = (max_width / w).min(max_height / h);
    (w * scale, h * scale)
}

/// Create a PDF image XObject stream for JPEG data (DCTDecode)
pub fn create_jpeg_image_object(
    generator: &mut crate::pdf_generator::PdfGenerator,
    info: &ImageInfo,
) -> u32 {
    let color_space = match info.components {
        1 => "/DeviceGray",
        4 => "/DeviceCMYK",
        _ => "/DeviceRGB",
    };
    let image_dict = format!(
        "<< /Type /XObject\n\
         /Subtype /Image\n\
         /Width {}\n\
         /Height {}\n\
         /BitsPerComponent 8\n\
         /ColorSpace {}\n\
         /Filter /DCTDecode\n\
         /Length {}\n\
         >>\n",
        info.width,
        info.height,
        color_space,
        info.data.len()
    );
    generator.add_stream_object(image_dict, info.data.clone())
}

/// Content stream fragment that draws an image XObject
pub fn create_image_content_stream(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    image_name: &str,
) -> Vec<u8> {
    use crate::pdf_generator::num;
    format!(
        "q\n{} 0 0 {} {} {} cm\n/{} Do\nQ\n",
        num(width),
        num(height),
        num(x),
        num(y),
        image_name
    )
    .into_bytes()
}

#[cfg(test)]
pub(crate) fn tiny_jpeg(width: u16, height: u16) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00]);
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data.push(0x03);
    data.extend_from_slice(&[0; 20]);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_jpeg() {
        let data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00];
        assert_eq!(detect_image_format(&data).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_detect_png() {
        let data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D];
        assert_eq!(detect_image_format(&data).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_detect_unknown() {
        let data = vec![0x00, 0x00, 0x00, 0x00];
        assert!(detect_image_format(&data).is_err());
    }

    #[test]
    fn test_scale_to_fit_shrinks() {
        // 400x300 into the 100x75 logo box -> quarter size
        let (w, h) = scale_to_fit(400, 300, 100.0, 75.0);
        assert!((w - 100.0).abs() < 0.01);
        assert!((h - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_scale_to_fit_enlarges() {
        // 50x50 into 100x75 -> height bound
        let (w, h) = scale_to_fit(50, 50, 100.0, 75.0);
        assert!((w - 75.0).abs() < 0.01);
        assert!((h - 75.0).abs() < 0.01);
        assert_eq!(scale_to_fit(0, 10, 100.0, 75.0), (0.0, 0.0));
    }

    #[test]
    fn test_parse_logo() {
        let info = parse_logo(tiny_jpeg(512, 256)).unwrap();
        assert_eq!(info.width, 512);
        assert_eq!(info.height, 256);
        assert_eq!(info.components, 3);
    }

    #[test]
    fn test_png_logo_rejected() {
        let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend_from_slice(&[0; 16]);
        let err = parse_logo(data).unwrap_err();
        assert!(err.to_string().contains("Png"));
    }

    #[test]
    fn test_create_image_content_stream() {
        let cs = create_image_content_stream(100.0, 200.0, 300.0, 400.0, "Logo");
        let s = String::from_utf8(cs).unwrap();
        assert!(s.contains("300 0 0 400 100 200 cm"));
        assert!(s.contains("/Logo Do"));
        assert!(s.starts_with("q\n") && s.ends_with("Q\n"));
    }
}
