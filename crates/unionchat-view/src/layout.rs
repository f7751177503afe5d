//! Content geometry supplied by the rendering layer.
//!
//! A [`ContentLayout`] is a read-only picture of one layout pass: the total
//! content size, the viewport expressed in content coordinates (its `y0` is
//! the current scroll offset) and the frame of every laid-out message in
//! display order. Nothing here measures anything; the renderer fills it in.

use std::collections::HashMap;
use std::hash::Hash;

use kurbo::{Point, Rect, Size};

use crate::position::Edge;

/// One layout pass worth of geometry.
#[derive(Debug, Clone)]
pub struct ContentLayout<Id> {
    content_size: Size,
    viewport: Rect,
    frames: Vec<(Id, Rect)>,
    lookup: HashMap<Id, usize>,
}

impl<Id: Clone + Eq + Hash> ContentLayout<Id> {
    /// An empty layout with the given content size and viewport.
    pub fn new(content_size: Size, viewport: Rect) -> Self {
        Self {
            content_size,
            viewport,
            frames: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Lay out items top to bottom with `spacing` between them, full width.
    ///
    /// The viewport is placed at `scroll_offset` with the given size. Handy
    /// for renderers that only know row heights, and for tests.
    pub fn stacked<I>(items: I, spacing: f64, viewport: Size, scroll_offset: f64) -> Self
    where
        I: IntoIterator<Item = (Id, f64)>,
    {
        let mut frames = Vec::new();
        let mut y = 0.0;
        for (id, height) in items {
            if !frames.is_empty() {
                y += spacing;
            }
            frames.push((id, Rect::new(0.0, y, viewport.width, y + height)));
            y += height;
        }
        let content_size = Size::new(viewport.width, y);
        let viewport = Rect::from_origin_size(Point::new(0.0, scroll_offset), viewport);
        let mut layout = Self::new(content_size, viewport);
        for (id, rect) in frames {
            layout.push_frame(id, rect);
        }
        layout
    }

    /// Record the frame of the next message in display order.
    /// A repeated id replaces its earlier frame.
    pub fn push_frame(&mut self, id: Id, rect: Rect) {
        match self.lookup.get(&id) {
            Some(&pos) => self.frames[pos].1 = rect,
            None => {
                self.lookup.insert(id.clone(), self.frames.len());
                self.frames.push((id, rect));
            }
        }
    }

    pub fn content_size(&self) -> Size {
        self.content_size
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn scroll_offset(&self) -> f64 {
        self.viewport.y0
    }

    /// Largest valid scroll offset; zero when the content fits.
    pub fn max_offset(&self) -> f64 {
        (self.content_size.height - self.viewport.height()).max(0.0)
    }

    pub fn clamp_offset(&self, offset: f64) -> f64 {
        offset.clamp(0.0, self.max_offset())
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<(&Id, Rect)> {
        self.frames.get(index).map(|(id, rect)| (id, *rect))
    }

    pub fn rect_for(&self, id: &Id) -> Option<Rect> {
        self.lookup.get(id).map(|&pos| self.frames[pos].1)
    }

    /// Ids whose frames intersect the viewport, in display order.
    pub fn visible_ids(&self) -> Vec<&Id> {
        self.frames
            .iter()
            .filter(|(_, rect)| overlaps(rect, &self.viewport))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn last_visible_id(&self) -> Option<&Id> {
        self.frames
            .iter()
            .rev()
            .find(|(_, rect)| overlaps(rect, &self.viewport))
            .map(|(id, _)| id)
    }

    /// The message under a point in content coordinates.
    pub fn id_at(&self, point: Point) -> Option<&Id> {
        self.frames
            .iter()
            .find(|(_, rect)| rect.contains(point))
            .map(|(id, _)| id)
    }

    /// Distance between the viewport and a content edge, never negative.
    pub fn distance_to(&self, edge: Edge) -> f64 {
        match edge {
            Edge::Top => self.scroll_offset().max(0.0),
            Edge::Bottom => (self.max_offset() - self.scroll_offset()).max(0.0),
        }
    }

    pub fn near_edge(&self, edge: Edge, threshold: f64) -> bool {
        self.distance_to(edge) <= threshold
    }
}

// Rect::overlaps treats touching edges as overlapping; a frame that merely
// touches the viewport is not on screen.
fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.y0 < b.y1 && a.y1 > b.y0 && a.x0 < b.x1 && a.x1 > b.x0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(offset: f64) -> ContentLayout<&'static str> {
        ContentLayout::stacked(
            [("a", 100.0), ("b", 100.0), ("c", 100.0), ("d", 100.0)],
            0.0,
            Size::new(320.0, 150.0),
            offset,
        )
    }

    #[test]
    fn stacked_geometry() {
        let l = layout(0.0);
        assert_eq!(l.content_size(), Size::new(320.0, 400.0));
        assert_eq!(l.max_offset(), 250.0);
        assert_eq!(l.rect_for(&"c"), Some(Rect::new(0.0, 200.0, 320.0, 300.0)));
    }

    #[test]
    fn visibility_queries() {
        let l = layout(120.0);
        assert_eq!(l.visible_ids(), vec![&"b", &"c"]);
        assert_eq!(l.last_visible_id(), Some(&"c"));
        assert_eq!(l.id_at(Point::new(10.0, 350.0)), Some(&"d"));
        assert_eq!(l.id_at(Point::new(10.0, 999.0)), None);
    }

    #[test]
    fn edge_distances() {
        let l = layout(240.0);
        assert_eq!(l.distance_to(Edge::Bottom), 10.0);
        assert!(l.near_edge(Edge::Bottom, 24.0));
        assert!(!l.near_edge(Edge::Top, 24.0));
    }

    #[test]
    fn content_shorter_than_viewport() {
        let l = ContentLayout::stacked([(1u32, 40.0)], 8.0, Size::new(320.0, 600.0), 0.0);
        assert_eq!(l.max_offset(), 0.0);
        assert!(l.near_edge(Edge::Bottom, 0.0));
        assert!(l.near_edge(Edge::Top, 0.0));
    }
}
