//! 2D affine transforms for compositing.
//!
//! [`Affine2`] maps local drawing coordinates to screen coordinates:
//!
//! ```text
//! x' = a*x + c*y + tx
//! y' = b*x + d*y + ty
//! ```
//!
//! Transforms compose right to left: `translate(250, 140).then(rotate(t))`
//! rotates a local point first, then moves it to the pivot. This is the order
//! in which the renderer applies them to the frame buffer's current matrix.
//!
//! Scoped save/restore of the current matrix lives in
//! [`TransformGuard`](crate::framebuffer::TransformGuard).

#[cfg(not(test))]
use micromath::F32Ext;

/// Determinants smaller than this are treated as singular.
const SINGULAR_EPSILON: f32 = 1.0e-9;

/// 2D affine matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine2 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Affine2 {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Pure translation.
    pub const fn translate(
        x: f32,
        y: f32,
    ) -> Self {
        Self {
            tx: x,
            ty: y,
            ..Self::IDENTITY
        }
    }

    /// Rotation about the origin by `angle` radians.
    ///
    /// `angle` is not wrapped; sin/cos are periodic so any magnitude works.
    pub fn rotate(angle: f32) -> Self {
        let (sin, cos) = (angle.sin(), angle.cos());
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Compose: the result applies `inner` first, then `self`.
    pub fn then(
        &self,
        inner: &Self,
    ) -> Self {
        Self {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            tx: self.a * inner.tx + self.c * inner.ty + self.tx,
            ty: self.b * inner.tx + self.d * inner.ty + self.ty,
        }
    }

    /// Map a point.
    #[inline]
    pub fn apply(
        &self,
        x: f32,
        y: f32,
    ) -> (f32, f32) {
        (self.a * x + self.c * y + self.tx, self.b * x + self.d * y + self.ty)
    }

    /// Inverse transform, or `None` when the matrix collapses the plane.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < SINGULAR_EPSILON {
            return None;
        }
        let a = self.d / det;
        let b = -self.b / det;
        let c = -self.c / det;
        let d = self.a / det;
        Some(Self {
            a,
            b,
            c,
            d,
            tx: -(a * self.tx + c * self.ty),
            ty: -(b * self.tx + d * self.ty),
        })
    }

    /// Whether this is exactly the identity.
    #[inline]
    pub fn is_identity(&self) -> bool { *self == Self::IDENTITY }
}

impl Default for Affine2 {
    fn default() -> Self { Self::IDENTITY }
}
