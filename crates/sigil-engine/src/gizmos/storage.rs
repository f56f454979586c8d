use glam::Vec3;

use crate::color::LinearRgba;

/// Gizmo vertex data recorded for one configuration group.
///
/// Invariants:
/// - `list_*` hold pairs: element `2i` and `2i + 1` form one segment
/// - every strip in `strip_*` is terminated by a NaN position (and a NaN
///   color) so consecutive strips never connect
/// - positions and colors of each topology always have the same length
#[derive(Debug, Default, Clone)]
pub struct GizmoStorage {
    pub list_positions: Vec<Vec3>,
    pub list_colors: Vec<LinearRgba>,
    pub strip_positions: Vec<Vec3>,
    pub strip_colors: Vec<LinearRgba>,
    pub billboard_positions: Vec<Vec3>,
    pub billboard_colors: Vec<LinearRgba>,
}

impl GizmoStorage {
    /// Clears all recorded data, keeping allocations.
    pub fn clear(&mut self) {
        self.list_positions.clear();
        self.list_colors.clear();
        self.strip_positions.clear();
        self.strip_colors.clear();
        self.billboard_positions.clear();
        self.billboard_colors.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.list_positions.is_empty()
            && self.strip_positions.is_empty()
            && self.billboard_positions.is_empty()
    }

    /// Number of line segments recorded in the list topology.
    pub fn list_segment_count(&self) -> usize {
        self.list_positions.len() / 2
    }

    /// Number of quads a strip draw will emit (separators included).
    pub fn strip_segment_count(&self) -> usize {
        self.strip_positions.len().saturating_sub(1)
    }

    pub(crate) fn push_segment(
        &mut self,
        a: Vec3,
        b: Vec3,
        color_a: LinearRgba,
        color_b: LinearRgba,
    ) {
        self.list_positions.extend([a, b]);
        self.list_colors.extend([color_a, color_b]);
    }

    /// Appends one strip and its separator. Strips with fewer than two points
    /// draw nothing and are dropped.
    pub(crate) fn push_strip(&mut self, points: impl IntoIterator<Item = (Vec3, LinearRgba)>) {
        let start = self.strip_positions.len();
        for (p, c) in points {
            self.strip_positions.push(p);
            self.strip_colors.push(c);
        }

        if self.strip_positions.len() - start < 2 {
            self.strip_positions.truncate(start);
            self.strip_colors.truncate(start);
            return;
        }

        self.strip_positions.push(Vec3::NAN);
        self.strip_colors.push(LinearRgba::NAN);
    }

    pub(crate) fn push_billboard(&mut self, position: Vec3, color: LinearRgba) {
        self.billboard_positions.push(position);
        self.billboard_colors.push(color);
    }
}
