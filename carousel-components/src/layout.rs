//! Item placement along the track.
//!
//! A looping carousel renders every item once and moves items that scroll
//! too far out of view around to the other side. With exactly two looping
//! items there would be a visible gap, so the items are rendered twice.
use smallvec::SmallVec;

use crate::args::CarouselArgs;

/// Horizontal placement of one rendered item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemPlacement {
    /// Position in the rendered sequence.
    pub render_index: usize,
    /// Index of the item this slot shows.
    pub data_index: usize,
    /// Left edge of the item relative to the container.
    pub translate_x: f32,
}

/// Track geometry used to place items for a given offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarouselLayout {
    container_width: f32,
    item_width: f32,
    spacing: f32,
    data_length: usize,
    looping: bool,
}

impl CarouselLayout {
    /// Derives the layout from carousel args.
    pub fn from_args(args: &CarouselArgs) -> Self {
        Self {
            container_width: args.container_width,
            item_width: args.item_width,
            spacing: args.spacing,
            data_length: args.data_length,
            looping: args.looping,
        }
    }

    fn page_width(&self) -> f32 {
        self.item_width + self.spacing
    }

    /// Number of rendered slots.
    pub fn render_len(&self) -> usize {
        if self.looping && self.data_length == 2 {
            4
        } else {
            self.data_length
        }
    }

    /// Item index shown by a render slot.
    pub fn data_index(&self, render_index: usize) -> usize {
        if self.data_length == 0 {
            0
        } else {
            render_index % self.data_length
        }
    }

    /// Places every render slot for `offset`.
    pub fn place(&self, offset: f32) -> SmallVec<[ItemPlacement; 8]> {
        let page_width = self.page_width();
        let center = (self.container_width - self.item_width) / 2.0;
        let render_len = self.render_len();
        let total = page_width * render_len as f32;

        (0..render_len)
            .map(|render_index| {
                let mut translate_x = offset + render_index as f32 * page_width + center;
                if self.looping && total > 0.0 {
                    translate_x %= total;
                    if translate_x > total / 2.0 {
                        translate_x -= total;
                    } else if translate_x < -total / 2.0 {
                        translate_x += total;
                    }
                }
                ItemPlacement {
                    render_index,
                    data_index: self.data_index(render_index),
                    translate_x,
                }
            })
            .collect()
    }

    /// Pairs each placement with `render(item, data_index)`.
    ///
    /// Slots pointing past the end of `data` are skipped.
    pub fn map_items<T, R>(
        &self,
        data: &[T],
        offset: f32,
        render: impl Fn(&T, usize) -> R,
    ) -> Vec<(ItemPlacement, R)> {
        self.place(offset)
            .into_iter()
            .filter_map(|placement| {
                let item = data.get(placement.data_index)?;
                Some((placement, render(item, placement.data_index)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(n: usize, looping: bool) -> CarouselLayout {
        CarouselLayout::from_args(
            &CarouselArgs::default()
                .data_length(n)
                .item_width(80.0)
                .spacing(20.0)
                .container_width(120.0)
                .looping(looping),
        )
    }

    fn positions(layout: &CarouselLayout, offset: f32) -> Vec<f32> {
        layout
            .place(offset)
            .iter()
            .map(|placement| placement.translate_x)
            .collect()
    }

    #[test]
    fn two_looping_items_render_twice() {
        let doubled = layout(2, true);
        assert_eq!(doubled.render_len(), 4);
        let indices: Vec<_> = doubled.place(0.0).iter().map(|p| p.data_index).collect();
        assert_eq!(indices, vec![0, 1, 0, 1]);
        assert_eq!(layout(2, false).render_len(), 2);
        assert_eq!(layout(3, true).render_len(), 3);
    }

    #[test]
    fn bounded_items_are_laid_out_in_a_row() {
        assert_eq!(positions(&layout(3, false), -100.0), vec![-80.0, 20.0, 120.0]);
    }

    #[test]
    fn looping_items_wrap_around() {
        // total = 500, center = 20
        assert_eq!(
            positions(&layout(5, true), 0.0),
            vec![20.0, 120.0, 220.0, -180.0, -80.0]
        );
        assert_eq!(
            positions(&layout(5, true), -400.0),
            vec![120.0, 220.0, -180.0, -80.0, 20.0]
        );
    }

    #[test]
    fn map_items_uses_data_index() {
        let data = ["a", "b"];
        let rendered =
            layout(2, true).map_items(&data, 0.0, |item, index| format!("{item}{index}"));
        let labels: Vec<_> = rendered.into_iter().map(|(_, label)| label).collect();
        assert_eq!(labels, vec!["a0", "b1", "a0", "b1"]);
    }

    #[test]
    fn empty_layout_places_nothing() {
        let empty = layout(0, true);
        assert!(empty.place(0.0).is_empty());
        assert_eq!(empty.data_index(3), 0);
    }
}
