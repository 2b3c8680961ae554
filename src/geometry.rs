//! Cell-grid geometry: points, sizes and rectangles.
//!
//! Coordinates are 1-based terminal cells, matching what the terminal reports
//! in mouse events and expects in cursor-position sequences.

/// A cell position (column `x`, row `y`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Top-left cell of the screen.
    pub const HOME: Self = Self { x: 1, y: 1 };

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A size in character cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Terminal dimensions, refreshed once per tick.
pub type TerminalSize = Size;

/// A rectangle anchored at `origin`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole screen of the given size.
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self::new(1, 1, size.width, size.height)
    }

    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether `p` lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, p: Point) -> bool {
        let dx = p.x - self.x;
        let dy = p.y - self.y;
        dx >= 0 && dy >= 0 && dx < self.width && dy < self.height
    }

    /// Shrink by `vpad` rows at top and bottom and `hpad` columns at each side.
    #[must_use]
    pub const fn pad(mut self, vpad: i32, hpad: i32) -> Self {
        self.y += vpad;
        self.x += hpad;
        self.width -= hpad + hpad;
        self.height -= vpad + vpad;
        self
    }

    /// Move `point` to the start of the next line within this rectangle.
    pub fn next_line(&self, point: &mut Point) {
        point.y += 1;
        point.x = self.x;
    }

    /// Split off the top `height` rows, shrinking `self`.
    pub fn cut_top(&mut self, height: i32) -> Self {
        let height = height.min(self.height);
        let mut cut = *self;
        cut.height = height;
        self.y += height;
        self.height -= height;
        cut
    }

    /// Split off the bottom `height` rows, shrinking `self`.
    pub fn cut_bottom(&mut self, height: i32) -> Self {
        let height = height.min(self.height);
        let mut cut = *self;
        cut.height = height;
        cut.y += self.height - height;
        self.height -= height;
        cut
    }

    /// Split off the left `width` columns, shrinking `self`.
    pub fn cut_left(&mut self, width: i32) -> Self {
        let width = width.min(self.width);
        let mut cut = *self;
        cut.width = width;
        self.x += width;
        self.width -= width;
        cut
    }

    /// Split off the right `width` columns, shrinking `self`.
    pub fn cut_right(&mut self, width: i32) -> Self {
        let width = width.min(self.width);
        let mut cut = *self;
        cut.width = width;
        cut.x += self.width - width;
        self.width -= width;
        cut
    }
}
