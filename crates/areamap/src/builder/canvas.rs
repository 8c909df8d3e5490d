use crate::geometry::{Point, Rect, Size};
use crate::provider::CollisionBitmap;

/// Area-wide walkability grid that room bitmaps are pasted into.
///
/// Covers the level's full extent; cells no room covers stay blocked. The
/// crop grows with every paste and is kept in area-local coordinates.
#[derive(Debug)]
pub(crate) struct AreaCanvas {
    offset: Point,
    width: usize,
    height: usize,
    walkable: Vec<bool>,
    crop: Rect,
}

impl AreaCanvas {
    pub fn new(offset: Point, size: Size) -> Self {
        let width = size.width.max(0) as usize;
        let height = size.height.max(0) as usize;
        Self {
            offset,
            width,
            height,
            walkable: vec![false; size.area()],
            crop: Rect::INVALID,
        }
    }

    pub fn crop(&self) -> Rect {
        self.crop
    }

    /// Crop in global coordinates
    pub fn global_crop(&self) -> Rect {
        Rect::new(
            self.crop.x0 + self.offset.x,
            self.crop.y0 + self.offset.y,
            self.crop.x1 + self.offset.x,
            self.crop.y1 + self.offset.y,
        )
    }

    /// Copy a room bitmap into the grid and grow the crop around it.
    ///
    /// Returns `true` if part of the bitmap fell outside the level and was
    /// dropped.
    pub fn paste(&mut self, bitmap: &CollisionBitmap) -> bool {
        let rect = bitmap.rect();
        let local = Rect::new(
            rect.x0 - self.offset.x,
            rect.y0 - self.offset.y,
            rect.x1 - self.offset.x,
            rect.y1 - self.offset.y,
        );
        let bounds = Rect::new(0, 0, self.width as i32, self.height as i32);
        let clipped = local.intersect(&bounds);
        if clipped.is_empty() {
            return !local.is_empty();
        }

        for y in clipped.y0..clipped.y1 {
            let row = y as usize * self.width;
            for x in clipped.x0..clipped.x1 {
                let open = bitmap.is_walkable((x - local.x0) as usize, (y - local.y0) as usize);
                self.walkable[row + x as usize] = open;
            }
        }

        self.crop.include(&clipped);
        clipped != local
    }

    /// Walkability at a global position; anything outside the crop is blocked
    pub fn is_walkable(&self, p: Point) -> bool {
        let (x, y) = (p.x - self.offset.x, p.y - self.offset.y);
        if !self.crop.is_valid() || !self.crop.contains(Point::new(x, y)) {
            return false;
        }
        self.walkable[y as usize * self.width + x as usize]
    }

    /// Dense row-major copy of the cropped region
    pub fn crop_walkable(&self) -> Vec<bool> {
        if !self.crop.is_valid() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(self.crop.width() as usize * self.crop.height() as usize);
        for y in self.crop.y0..self.crop.y1 {
            let row = y as usize * self.width;
            out.extend_from_slice(&self.walkable[row + self.crop.x0 as usize..row + self.crop.x1 as usize]);
        }
        out
    }
}
