//! Wireframe boxes spanned by projection intervals, drawn in the normal
//! pass only.

use std::slice;

use glam::Vec3;

use crate::camera::Camera;
use crate::error::MolGeomError;
use crate::geom::{symmetry, VertexArray, VertexLayout};
use crate::gpu::{RenderContext, ShaderHandle};
use crate::util::Interval;

/// Corner pairs of a box whose corner `i` takes the max of axis `k` when
/// bit `k` of `i` is set.
const EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [2, 3],
    [4, 5],
    [6, 7],
    [0, 2],
    [1, 3],
    [4, 6],
    [5, 7],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// Wire box around a set of projection intervals, for eyeballing bounds.
#[derive(Debug)]
pub struct DebugBox {
    segment: VertexArray,
    corners: [Vec3; 8],
    line_width: f32,
}

impl DebugBox {
    /// Box spanned by `intervals[k]` along `axes[k]`. `None` when any
    /// interval is empty.
    pub fn from_intervals(
        axes: &[Vec3; 3],
        intervals: &[Interval; 3],
        color: [f32; 4],
    ) -> Option<Self> {
        let mut lo = [0.0; 3];
        let mut hi = [0.0; 3];
        for (k, interval) in intervals.iter().enumerate() {
            lo[k] = interval.min()?;
            hi[k] = interval.max()?;
        }
        let corners: [Vec3; 8] = std::array::from_fn(|i| {
            (0..3)
                .map(|k| {
                    let end = if (i >> k) & 1 == 1 { hi[k] } else { lo[k] };
                    axes[k] * end
                })
                .sum()
        });

        let mut segment =
            VertexArray::new("debug", VertexLayout::Lines, EDGES.len() * 2, 0);
        for [a, b] in EDGES {
            segment.add_line(corners[a], color, corners[b], color, 0, 0);
        }
        Some(Self {
            segment,
            corners,
            line_width: 1.0,
        })
    }

    /// The eight corners.
    #[must_use]
    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }

    /// Line segment holding the 12 edges.
    #[must_use]
    pub fn segment(&self) -> &VertexArray {
        &self.segment
    }

    /// Set the line width in pixels.
    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    /// Draw the edges once with `shader`.
    ///
    /// # Errors
    ///
    /// Propagates failures of the rendering context.
    pub fn draw(
        &mut self,
        ctx: &mut dyn RenderContext,
        camera: &dyn Camera,
        shader: ShaderHandle,
    ) -> Result<usize, MolGeomError> {
        ctx.set_line_width(self.line_width);
        let drawn = symmetry::draw_segments(
            ctx,
            camera,
            shader,
            slice::from_mut(&mut self.segment),
            None,
        )?;
        Ok(drawn)
    }

    /// Release the GPU buffer.
    pub fn destroy(mut self, ctx: &mut dyn RenderContext) {
        self.segment.destroy(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FixedCamera;
    use crate::gpu::{CommandRecorder, Primitive};

    fn unit_axes() -> [Vec3; 3] {
        [Vec3::X, Vec3::Y, Vec3::Z]
    }

    #[test]
    fn box_spans_intervals() {
        let intervals = [
            Interval::new(-1.0, 2.0),
            Interval::new(0.0, 4.0),
            Interval::new(3.0, 3.5),
        ];
        let b = DebugBox::from_intervals(&unit_axes(), &intervals, [1.0; 4])
            .unwrap();
        assert_eq!(b.corners()[0], Vec3::new(-1.0, 0.0, 3.0));
        assert_eq!(b.corners()[7], Vec3::new(2.0, 4.0, 3.5));
        assert_eq!(b.segment().num_verts(), 24);

        // every edge runs along exactly one axis
        let points: Vec<Vec3> = b.segment().positions().collect();
        for edge in points.chunks_exact(2) {
            let d = edge[1] - edge[0];
            let moving = [d.x, d.y, d.z].iter().filter(|c| **c != 0.0).count();
            assert_eq!(moving, 1);
        }
    }

    #[test]
    fn empty_interval_gives_no_box() {
        let unit = Interval::new(0.0, 1.0);
        let intervals = [unit, Interval::EMPTY, unit];
        let b = DebugBox::from_intervals(&unit_axes(), &intervals, [1.0; 4]);
        assert!(b.is_none());
    }

    #[test]
    fn draws_once_as_lines() {
        let intervals = [Interval::new(0.0, 1.0); 3];
        let mut b = DebugBox::from_intervals(&unit_axes(), &intervals, [1.0; 4])
            .unwrap();
        b.set_line_width(2.0);
        let mut ctx = CommandRecorder::new();
        let drawn = b
            .draw(&mut ctx, &FixedCamera::default(), ShaderHandle(9))
            .unwrap();
        assert_eq!(drawn, 1);
        assert_eq!(ctx.draws()[0].primitive, Primitive::Lines);
        assert_eq!(ctx.draws()[0].element_count(), 24);
        assert_eq!(ctx.line_width(), 2.0);
        assert_eq!(ctx.live_buffers(), 1);
        b.destroy(&mut ctx);
        assert_eq!(ctx.live_buffers(), 0);
    }
}
