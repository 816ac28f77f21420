use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle. Region-relative until the locator offsets
/// it by the capture region's origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn offset_by(&self, origin_x: i32, origin_y: i32) -> BoundingBox {
        BoundingBox {
            x: self.x + origin_x,
            y: self.y + origin_y,
            width: self.width,
            height: self.height,
        }
    }
}

/// A screen region submitted for capture. Same shape as a bounding box but
/// absolute; its origin converts token boxes to screen coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// One recognized word fragment from the capture stage. Order of a token
/// sequence is scan order, not guaranteed top-to-bottom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrToken {
    pub text: String,
    pub confidence: i32,
    pub bbox: BoundingBox,
}
