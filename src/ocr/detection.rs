/// Axis-aligned area of the image a detection was read from, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn from_ltwh(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Smallest region covering both `self` and `other`.
    pub fn union(&self, other: &Region) -> Region {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = (self.left + self.width).max(other.left + other.width);
        let bottom = (self.top + self.height).max(other.top + other.height);
        Region::from_ltwh(left, top, right - left, bottom - top)
    }

    /// Polygon form: top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [(u32, u32); 4] {
        let right = self.left + self.width;
        let bottom = self.top + self.height;
        [
            (self.left, self.top),
            (right, self.top),
            (right, bottom),
            (self.left, bottom),
        ]
    }

    /// Maps a region found on a resized image back onto the original.
    pub fn scaled_down(&self, factor: f32) -> Region {
        if factor <= 1.0 {
            return *self;
        }
        let scale = |v: u32| (v as f32 / factor).round() as u32;
        Region::from_ltwh(
            scale(self.left),
            scale(self.top),
            scale(self.width),
            scale(self.height),
        )
    }
}

/// One recognized text line with its region and a confidence in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub region: Region,
    pub text: String,
    pub confidence: f32,
}

impl Detection {
    pub fn new(region: Region, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            region,
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// One-line summary for the log: text, polygon and confidence.
    pub fn describe(&self) -> String {
        let polygon: Vec<String> = self
            .region
            .corners()
            .iter()
            .map(|(x, y)| format!("({},{})", x, y))
            .collect();
        format!(
            "{:?} at [{}] conf {:.2}",
            self.text,
            polygon.join(" "),
            self.confidence
        )
    }
}
