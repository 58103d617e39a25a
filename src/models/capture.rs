// Data structures for camera frames

/// A frame delivered by the camera
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub timestamp: i64,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub format: PixelFormat,
}

impl CameraFrame {
    /// Solid black frame, used when only the dimensions matter
    pub fn blank(timestamp: i64, width: u32, height: u32) -> Self {
        Self {
            timestamp,
            width,
            height,
            data: vec![0; width as usize * height as usize * 3],
            format: PixelFormat::RGB8,
        }
    }

    /// Number of bytes the pixel data should hold
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

/// Pixel format of camera frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    RGB8,
    BGR8,
    RGBA8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::RGB8 | PixelFormat::BGR8 => 3,
            PixelFormat::RGBA8 => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_frame_size() {
        let frame = CameraFrame::blank(0, 4, 2);
        assert_eq!(frame.data.len(), frame.expected_len());
        assert_eq!(frame.expected_len(), 24);
    }
}
