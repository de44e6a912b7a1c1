use super::{Layout, LayoutHelper};
use crate::LayoutError;

/// One item per row, stacked from the anchor downwards and then upwards.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearLayout;

impl<P> Layout<P> for LinearLayout {
    fn layout(&self, helper: &mut LayoutHelper<'_, P>) -> Result<(), LayoutError> {
        let start = helper.anchor.index;
        let anchor_top = helper.anchor.offset_y;

        let mut capped = false;
        let mut next_top = anchor_top;
        for index in start..helper.item_count {
            let child = helper.child(index)?;
            if !helper.layout_child(child, 0.0, next_top) {
                capped = true;
                break;
            }
            next_top += child.height;
            if next_top > helper.fill_bottom() {
                break;
            }
        }

        if capped {
            return Ok(());
        }

        let mut previous_top = anchor_top;
        for index in (0..start).rev() {
            let child = helper.child(index)?;
            if !helper.layout_child(child, 0.0, previous_top - child.height) {
                break;
            }
            previous_top -= child.height;
            if previous_top < helper.fill_top() {
                break;
            }
        }

        Ok(())
    }
}
