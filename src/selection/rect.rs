use glam::Vec2;

/// A pointer position relative to the render surface.
///
/// `x`/`y` are surface pixels (origin top-left, Y down); `nx`/`ny` are the
/// same position normalized to `[0, 1]` with Y flipped (origin bottom-left,
/// Y up), matching the post-projection screen space the kernel tests in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coords {
    /// Horizontal surface pixel.
    pub x: f32,
    /// Vertical surface pixel (down).
    pub y: f32,
    /// Normalized horizontal position.
    pub nx: f32,
    /// Normalized vertical position (up).
    pub ny: f32,
}

impl Coords {
    /// Normalized position as a vector.
    #[must_use]
    pub fn normalized(&self) -> Vec2 {
        Vec2::new(self.nx, self.ny)
    }

    /// Pixel position as a vector.
    #[must_use]
    pub fn pixel(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Bounding rectangle of the render surface in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    /// Left edge in window pixels.
    pub left: f32,
    /// Top edge in window pixels.
    pub top: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl SurfaceRect {
    /// Surface covering the window from its top-left corner.
    #[must_use]
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    /// Convert a window-space pointer position into surface coordinates.
    ///
    /// Positions outside the surface are not clamped; the normalized values
    /// simply fall outside `[0, 1]`. A degenerate surface maps everything to
    /// the normalized origin.
    #[must_use]
    pub fn coords(&self, window_x: f32, window_y: f32) -> Coords {
        let x = window_x - self.left;
        let y = window_y - self.top;
        let (nx, ny) = if self.width > 0.0 && self.height > 0.0 {
            (x / self.width, 1.0 - y / self.height)
        } else {
            (0.0, 0.0)
        };
        Coords { x, y, nx, ny }
    }

    /// Whether a window-space position lies over the surface.
    #[must_use]
    pub fn contains(&self, window_x: f32, window_y: f32) -> bool {
        window_x >= self.left
            && window_x <= self.left + self.width
            && window_y >= self.top
            && window_y <= self.top + self.height
    }
}

/// Axis-aligned rectangle in normalized screen space, inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBounds {
    /// Lower-left corner.
    pub min: Vec2,
    /// Upper-right corner.
    pub max: Vec2,
}

impl NormalizedBounds {
    /// Bounds spanning two unordered corners.
    #[must_use]
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// The whole screen, `[0, 1]` on both axes.
    pub const FULL: Self = Self {
        min: Vec2::ZERO,
        max: Vec2::ONE,
    };

    /// Inclusive containment test.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
    }

    /// Width times height.
    #[must_use]
    pub fn area(&self) -> f32 {
        let size = self.max - self.min;
        size.x * size.y
    }
}

/// On-screen box in surface pixels, used to draw the drag overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelBox {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// Selection rectangle spanned by a drag.
///
/// The corners are stored as dragged; the drag can go in any direction, so
/// min/max are derived on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    /// Corner where the drag started.
    pub start: Coords,
    /// Corner under the pointer now (or at release).
    pub end: Coords,
}

impl SelectionRect {
    /// Zero-area rectangle at a single point.
    #[must_use]
    pub fn at(start: Coords) -> Self {
        Self { start, end: start }
    }

    /// Normalized min/max bounds.
    #[must_use]
    pub fn bounds(&self) -> NormalizedBounds {
        NormalizedBounds::from_corners(
            self.start.normalized(),
            self.end.normalized(),
        )
    }

    /// Pixel box for the drag overlay.
    #[must_use]
    pub fn pixel_box(&self) -> PixelBox {
        let min = self.start.pixel().min(self.end.pixel());
        let size = (self.start.pixel() - self.end.pixel()).abs();
        PixelBox {
            left: min.x,
            top: min.y,
            width: size.x,
            height: size.y,
        }
    }

    /// Whether the rectangle collapses to a line or a point.
    #[must_use]
    pub fn is_empty_area(&self) -> bool {
        self.bounds().area() == 0.0
    }
}
