use alloc::vec::Vec;

use super::{ChildHandle, Layout, LayoutHelper};
use crate::LayoutError;

/// Fixed-width columns; every row is as tall as its tallest child.
///
/// The column count is the smallest one that keeps columns at most `max_column_width` wide.
/// Rows are aligned so the anchor item's row starts at the anchor position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub max_column_width: f32,
    pub gap_x: f32,
    pub gap_y: f32,
}

impl GridLayout {
    pub fn new(max_column_width: f32) -> Self {
        Self {
            max_column_width,
            gap_x: 0.0,
            gap_y: 0.0,
        }
    }

    pub fn with_gaps(mut self, gap_x: f32, gap_y: f32) -> Self {
        self.gap_x = gap_x;
        self.gap_y = gap_y;
        self
    }

    /// `max(1, ceil(width / max_column_width))` for the space between the outer gaps.
    pub fn column_count(&self, width: f32) -> usize {
        let width = width - 2.0 * self.gap_x;
        if !(width > 0.0) || !(self.max_column_width > 0.0) {
            return 1;
        }
        let columns = (width / self.max_column_width) as usize;
        if (columns as f32) * self.max_column_width < width {
            columns + 1
        } else {
            columns.max(1)
        }
    }

    pub fn item_width(&self, width: f32, columns: usize) -> f32 {
        (width - self.gap_x * (columns + 1) as f32) / columns as f32
    }

    fn column_left(&self, column: usize, item_width: f32) -> f32 {
        self.gap_x + column as f32 * (self.gap_x + item_width)
    }
}

impl<P> Layout<P> for GridLayout {
    fn layout(&self, helper: &mut LayoutHelper<'_, P>) -> Result<(), LayoutError> {
        let columns = self.column_count(helper.width);
        let item_width = self.item_width(helper.width, columns);
        let anchor_index = (helper.anchor.index / columns) * columns;
        let count = helper.item_count;

        let mut index = anchor_index;
        let mut next_top = helper.anchor.offset_y;
        let mut capped = false;
        while index < count && !capped {
            if next_top > helper.fill_bottom() {
                break;
            }

            let mut row_height: f32 = 0.0;
            for column in 0..columns {
                if index >= count {
                    break;
                }
                let child = helper.child_with_width(index, item_width)?;
                capped |= !helper.layout_child(child, self.column_left(column, item_width), next_top);
                row_height = row_height.max(child.height);
                index += 1;
            }

            next_top += row_height + self.gap_y;
        }

        let mut index = anchor_index;
        let mut previous_top = helper.anchor.offset_y;
        let mut row: Vec<(ChildHandle, f32)> = Vec::with_capacity(columns);
        while index > 0 && !capped {
            if previous_top < helper.fill_top() {
                break;
            }

            // rows are collected right to left, then placed once their height is known
            row.clear();
            for column in (0..columns).rev() {
                if index == 0 {
                    break;
                }
                index -= 1;
                let child = helper.child_with_width(index, item_width)?;
                row.push((child, self.column_left(column, item_width)));
            }

            let row_height = row
                .iter()
                .map(|(child, _)| child.height)
                .fold(0.0_f32, f32::max);
            let top = previous_top - row_height - self.gap_y;
            for &(child, left) in &row {
                capped |= !helper.layout_child(child, left, top);
            }

            previous_top = top;
        }

        Ok(())
    }
}
