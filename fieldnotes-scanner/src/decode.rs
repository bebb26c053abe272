use image::RgbaImage;
use log::trace;

/// Text extracted from a QR code. Opaque to the scanner: it is forwarded to
/// the lookup route without any shape validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecodedPayload(pub String);

impl DecodedPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Finds a QR code in an RGBA decode buffer. `None` is a miss, not an error.
pub trait Decoder: Send + Sync {
    fn decode(&self, buffer: &RgbaImage) -> Option<DecodedPayload>;
}

/// [`Decoder`] backed by `rqrr`. Returns the first grid that decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for QrDecoder {
    fn decode(&self, buffer: &RgbaImage) -> Option<DecodedPayload> {
        let (width, height) = buffer.dimensions();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            width as usize,
            height as usize,
            |x, y| {
                let [r, g, b, _] = buffer.get_pixel(x as u32, y as u32).0;
                luma(r, g, b)
            },
        );

        prepared.detect_grids().into_iter().find_map(|grid| {
            match grid.decode() {
                Ok((_, content)) => Some(DecodedPayload(content)),
                Err(err) => {
                    trace!("QR grid found but not decodable: {err:?}");
                    None
                }
            }
        })
    }
}

// ITU-R BT.601 weights
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000)
        as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use qrcode::{Color, QrCode};

    /// Paint `payload` as a QR code centred on a white 640x480 canvas.
    fn qr_canvas(payload: &str) -> RgbaImage {
        let code = QrCode::new(payload.as_bytes()).unwrap();
        let modules = code.width() as u32;
        let colors = code.to_colors();
        let scale = 8;
        let offset_x = (640 - modules * scale) / 2;
        let offset_y = (480 - modules * scale) / 2;

        let mut canvas = RgbaImage::from_pixel(640, 480, Rgba([255, 255, 255, 255]));
        for my in 0..modules {
            for mx in 0..modules {
                if colors[(my * modules + mx) as usize] != Color::Dark {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        canvas.put_pixel(
                            offset_x + mx * scale + dx,
                            offset_y + my * scale + dy,
                            Rgba([0, 0, 0, 255]),
                        );
                    }
                }
            }
        }
        canvas
    }

    #[test]
    fn decodes_machine_code() {
        let payload = QrDecoder::new().decode(&qr_canvas("MCH-001"));
        assert_eq!(payload, Some(DecodedPayload("MCH-001".into())));
    }

    #[test]
    fn blank_frame_is_a_miss() {
        let blank = RgbaImage::from_pixel(640, 480, Rgba([255, 255, 255, 255]));
        assert_eq!(QrDecoder::new().decode(&blank), None);
    }

    #[test]
    fn luma_weights_sum_to_white() {
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
    }
}
