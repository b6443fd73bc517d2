use nalgebra::{Matrix1x4, Point2};
use num::Float;
use std::fmt::Debug;

/* ------------------------------------------------------------------------------
 * Type aliases
 * ------------------------------------------------------------------------------ */
pub type Tlwh<T> = Matrix1x4<T>;

/* ------------------------------------------------------------------------------
 * Rect struct
 * ------------------------------------------------------------------------------ */
#[derive(Debug, Clone, PartialEq)]
pub struct Rect<T>
where
    T: Debug + Float + 'static,
{
    tlwh: Tlwh<T>,
}

impl<T> Rect<T>
where
    T: Debug + Float + 'static,
{
    pub fn new(x: T, y: T, width: T, height: T) -> Self {
        Self {
            tlwh: Matrix1x4::new(x, y, width, height),
        }
    }

    /// Create Rect from [x1, y1, x2, y2] format
    pub fn from_xyxy(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    #[inline(always)]
    pub fn x(&self) -> T {
        self.tlwh[(0, 0)]
    }

    #[inline(always)]
    pub fn y(&self) -> T {
        self.tlwh[(0, 1)]
    }

    #[inline(always)]
    pub fn width(&self) -> T {
        self.tlwh[(0, 2)]
    }

    #[inline(always)]
    pub fn height(&self) -> T {
        self.tlwh[(0, 3)]
    }

    pub fn area(&self) -> T {
        self.width().max(T::zero()) * self.height().max(T::zero())
    }

    /// Get bounding box as [x1, y1, x2, y2] format
    pub fn get_xyxy(&self) -> [T; 4] {
        [
            self.x(),
            self.y(),
            self.x() + self.width(),
            self.y() + self.height(),
        ]
    }

    /// Center of the box, the position used for matching.
    pub fn center(&self) -> Point2<T> {
        let two = T::one() + T::one();
        Point2::new(
            self.x() + self.width() / two,
            self.y() + self.height() / two,
        )
    }

    /// Integer pixel region `(x, y, width, height)` covered by this box once
    /// clipped to a `frame_width` x `frame_height` raster.
    ///
    /// Coordinates are truncated toward zero before clipping. Returns `None`
    /// when the clipped region is empty or any coordinate is not finite.
    pub fn clip_to_frame(
        &self,
        frame_width: u32,
        frame_height: u32,
    ) -> Option<(u32, u32, u32, u32)> {
        let [x1, y1, x2, y2] = self.get_xyxy();
        let trunc = |v: T| v.trunc().to_i64();
        let (x1, y1, x2, y2) = (trunc(x1)?, trunc(y1)?, trunc(x2)?, trunc(y2)?);

        let x1 = x1.max(0);
        let y1 = y1.max(0);
        let x2 = x2.min(frame_width as i64);
        let y2 = y2.min(frame_height as i64);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        Some((x1 as u32, y1 as u32, (x2 - x1) as u32, (y2 - y1) as u32))
    }
}
