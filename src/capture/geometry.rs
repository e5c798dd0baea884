//! Screen geometry shared by recognizers, actions and the asset catalogue

use image::Rgb;
use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(&self, dx: i64, dy: i64) -> Point {
        Point {
            x: (self.x as i64 + dx).max(0) as u32,
            y: (self.y as i64 + dy).max(0) as u32,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(u32, u32)> for Point {
    fn from((x, y): (u32, u32)) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from `(left, top)` and `(right, bottom)` corners, right/bottom exclusive.
    pub fn from_corners(left_top: (u32, u32), right_bottom: (u32, u32)) -> Self {
        let (l, t) = left_top;
        let (r, b) = right_bottom;
        Self {
            x: l.min(r),
            y: t.min(b),
            width: r.abs_diff(l),
            height: b.abs_diff(t),
        }
    }

    pub fn full_screen(screen_width: u32, screen_height: u32) -> Self {
        Self::new(0, 0, screen_width, screen_height)
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Clip region to screen boundaries
    pub fn clip_to_screen(mut self, screen_width: u32, screen_height: u32) -> Rect {
        self.x = self.x.min(screen_width.saturating_sub(1));
        self.y = self.y.min(screen_height.saturating_sub(1));
        self.width = self.width.min(screen_width.saturating_sub(self.x));
        self.height = self.height.min(screen_height.saturating_sub(self.y));
        self
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Shift the region by a signed offset, saturating at the screen origin.
    pub fn translate(&self, dx: i64, dy: i64) -> Rect {
        let origin = Point::new(self.x, self.y).offset(dx, dy);
        Rect::new(origin.x, origin.y, self.width, self.height)
    }

    /// A uniformly random point inside the region, used for humanized clicks.
    /// Degenerate regions yield their origin.
    pub fn random_point(&self) -> Point {
        if !self.is_valid() {
            return Point::new(self.x, self.y);
        }
        let mut rng = rand::thread_rng();
        Point::new(
            rng.gen_range(self.x..self.right()),
            rng.gen_range(self.y..self.bottom()),
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{},{}]", self.x, self.y, self.width, self.height)
    }
}

/// Build a color from a `0xRRGGBB` literal.
pub fn rgb_from_hex(hex: u32) -> Rgb<u8> {
    Rgb([
        ((hex >> 16) & 0xFF) as u8,
        ((hex >> 8) & 0xFF) as u8,
        (hex & 0xFF) as u8,
    ])
}

/// Largest per-channel absolute difference between two colors.
pub fn color_distance(a: &Rgb<u8>, b: &Rgb<u8>) -> u8 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(x, y)| x.abs_diff(*y))
        .max()
        .unwrap_or(0)
}

/// Pixel fingerprint: the color expected at a screen point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub point: Point,
    pub color: Rgb<u8>,
}

impl Fingerprint {
    pub const fn new(x: u32, y: u32, color: Rgb<u8>) -> Self {
        Self {
            point: Point::new(x, y),
            color,
        }
    }

    pub fn from_hex(x: u32, y: u32, hex: u32) -> Self {
        Self::new(x, y, rgb_from_hex(hex))
    }

    /// True when every channel of `actual` is within `tolerance` of the expected color.
    pub fn matches(&self, actual: &Rgb<u8>, tolerance: u8) -> bool {
        color_distance(&self.color, actual) <= tolerance
    }
}
