use alloc::vec;

use super::{Layout, LayoutHelper};
use crate::LayoutError;

/// A fixed number of equally wide columns; each item goes into the column that currently
/// ends closest to the anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MasonryLayout {
    pub columns: usize,
    pub gap_x: f32,
    pub gap_y: f32,
}

impl MasonryLayout {
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            gap_x: 0.0,
            gap_y: 0.0,
        }
    }

    pub fn with_gaps(mut self, gap_x: f32, gap_y: f32) -> Self {
        self.gap_x = gap_x;
        self.gap_y = gap_y;
        self
    }
}

impl<P> Layout<P> for MasonryLayout {
    fn layout(&self, helper: &mut LayoutHelper<'_, P>) -> Result<(), LayoutError> {
        let columns = self.columns.max(1);
        let item_width = (helper.width - self.gap_x * (columns + 1) as f32) / columns as f32;
        let left = |column: usize| self.gap_x + column as f32 * (self.gap_x + item_width);
        let start = helper.anchor.index;
        let anchor_top = helper.anchor.offset_y;

        // bottom edge of every column, growing downwards
        let mut capped = false;
        let mut bottoms = vec![anchor_top; columns];
        for index in start..helper.item_count {
            let column = position_of(&bottoms, |a, b| a < b);
            let child = helper.child_with_width(index, item_width)?;
            if !helper.layout_child(child, left(column), bottoms[column]) {
                capped = true;
                break;
            }
            bottoms[column] += child.height + self.gap_y;
            if bottoms.iter().all(|&bottom| bottom > helper.fill_bottom()) {
                break;
            }
        }

        if capped {
            return Ok(());
        }

        // top edge of every column, growing upwards
        let mut tops = vec![anchor_top; columns];
        for index in (0..start).rev() {
            let column = position_of(&tops, |a, b| a > b);
            let child = helper.child_with_width(index, item_width)?;
            let top = tops[column] - self.gap_y - child.height;
            if !helper.layout_child(child, left(column), top) {
                break;
            }
            tops[column] = top;
            if tops.iter().all(|&top| top < helper.fill_top()) {
                break;
            }
        }

        Ok(())
    }
}

// First position whose value beats every other one under `better`.
fn position_of(values: &[f32], better: impl Fn(f32, f32) -> bool) -> usize {
    let mut best = 0;
    for (position, &value) in values.iter().enumerate().skip(1) {
        if better(value, values[best]) {
            best = position;
        }
    }
    best
}
