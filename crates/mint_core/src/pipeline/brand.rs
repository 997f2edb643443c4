use super::Degradation;

/// A JPEG brand mark ready to be embedded as a `DCTDecode` image.
///
/// Only the frame header is read; the scan data is passed through to the
/// PDF untouched, so no image decoder is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandMark {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    components: u8,
}

impl BrandMark {
    pub fn from_jpeg(bytes: Vec<u8>) -> Result<Self, Degradation> {
        let (width, height, components) =
            read_frame_header(&bytes).map_err(|reason| Degradation::BrandAssetUnreadable(reason.into()))?;
        Ok(Self { bytes, width, height, components })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Height over width.
    pub fn aspect(&self) -> f32 {
        self.height as f32 / self.width as f32
    }

    pub fn color_space(&self) -> &'static str {
        match self.components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        }
    }
}

// =========================================================================
// JPEG marker walk
// SOI, then segments of `FF xx LEN_HI LEN_LO ...` until a SOFn frame header.
// =========================================================================
fn read_frame_header(bytes: &[u8]) -> Result<(u32, u32, u8), &'static str> {
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return Err("not a JPEG (missing SOI marker)");
    }

    let mut i = 2;
    while i + 1 < bytes.len() {
        if bytes[i] != 0xFF {
            return Err("corrupt JPEG marker stream");
        }
        let marker = bytes[i + 1];
        // Fill bytes between segments.
        if marker == 0xFF {
            i += 1;
            continue;
        }
        // Standalone markers carry no length.
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            i += 2;
            continue;
        }
        if marker == 0xDA || marker == 0xD9 {
            return Err("JPEG has no frame header before scan data");
        }
        if i + 4 > bytes.len() {
            break;
        }
        let len = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
        if len < 2 {
            return Err("corrupt JPEG segment length");
        }

        let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            let header = bytes
                .get(i + 4..i + 10)
                .ok_or("truncated JPEG frame header")?;
            let height = u16::from_be_bytes([header[1], header[2]]) as u32;
            let width = u16::from_be_bytes([header[3], header[4]]) as u32;
            let components = header[5];
            if width == 0 || height == 0 {
                return Err("JPEG frame has zero dimensions");
            }
            return Ok((width, height, components));
        }
        i += 2 + len;
    }
    Err("truncated JPEG")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Header-only JPEG: SOI, a JFIF APP0 segment, then a baseline frame header.
    pub(crate) fn tiny_jpeg(width: u16, height: u16) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
        bytes.extend_from_slice(b"JFIF\0");
        bytes.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
        bytes.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        bytes
    }

    #[test]
    fn reads_dimensions_from_frame_header() {
        let mark = BrandMark::from_jpeg(tiny_jpeg(64, 32)).unwrap();
        assert_eq!(mark.width(), 64);
        assert_eq!(mark.height(), 32);
        assert_eq!(mark.color_space(), "DeviceRGB");
        assert!((mark.aspect() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn png_bytes_degrade_instead_of_panicking() {
        let png = b"\x89PNG\r\n\x1a\n0000".to_vec();
        assert!(matches!(
            BrandMark::from_jpeg(png),
            Err(Degradation::BrandAssetUnreadable(_))
        ));
    }

    #[test]
    fn truncated_frame_is_rejected() {
        let mut bytes = tiny_jpeg(10, 10);
        bytes.truncate(24);
        assert!(BrandMark::from_jpeg(bytes).is_err());
    }
}
