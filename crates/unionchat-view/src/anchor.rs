use std::fmt::Debug;
use std::hash::Hash;

use kurbo::Rect;

use crate::error::ScrollError;
use crate::layout::ContentLayout;
use crate::position::{ChatPosition, UnitPoint};

/// A scroll target ready to hand to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedScroll {
    /// Vertical scroll offset in content space, within `0..=max_offset`.
    pub offset: f64,
    /// Frame of the message the position referred to, if any.
    pub target: Option<Rect>,
    pub animated: bool,
}

/// Turns symbolic [`ChatPosition`]s into concrete offsets.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollAnchor;

impl ScrollAnchor {
    /// Resolve `position` against `layout`.
    ///
    /// `Top`, `Bottom` and `Automatic` always resolve. Message and index
    /// targets fail with [`ScrollError::NotFound`] when the layout has no
    /// frame for them.
    pub fn resolve<Id>(
        position: &ChatPosition<Id>,
        layout: &ContentLayout<Id>,
    ) -> Result<ResolvedScroll, ScrollError>
    where
        Id: Clone + Eq + Hash + Debug,
    {
        let (offset, target) = Self::raw_offset(position, layout)?;
        Ok(ResolvedScroll {
            offset: layout.clamp_offset(offset),
            target,
            animated: position.is_animated(),
        })
    }

    fn raw_offset<Id>(
        position: &ChatPosition<Id>,
        layout: &ContentLayout<Id>,
    ) -> Result<(f64, Option<Rect>), ScrollError>
    where
        Id: Clone + Eq + Hash + Debug,
    {
        match position {
            ChatPosition::Top => Ok((0.0, None)),
            ChatPosition::Bottom { .. } | ChatPosition::Automatic => {
                Ok((layout.max_offset(), None))
            }
            ChatPosition::Message { id, anchor } => {
                let rect = layout
                    .rect_for(id)
                    .ok_or_else(|| ScrollError::NotFound(format!("{id:?}")))?;
                Ok((align(rect, *anchor, layout), Some(rect)))
            }
            ChatPosition::Index(index) => {
                let (_, rect) = layout
                    .frame(*index)
                    .ok_or_else(|| ScrollError::NotFound(format!("index {index}")))?;
                Ok((align(rect, UnitPoint::BOTTOM, layout), Some(rect)))
            }
            ChatPosition::Offset { delta, from } => {
                let (base, target) = Self::raw_offset(from, layout)?;
                Ok((layout.clamp_offset(base) + delta, target))
            }
        }
    }
}

// Offset that puts the anchor point of `rect` at the same relative height
// within the viewport.
fn align<Id: Clone + Eq + Hash>(rect: Rect, anchor: UnitPoint, layout: &ContentLayout<Id>) -> f64 {
    let in_rect = rect.y0 + anchor.y * rect.height();
    in_rect - anchor.y * layout.viewport().height()
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::*;

    fn layout() -> ContentLayout<&'static str> {
        ContentLayout::stacked(
            [("a", 100.0), ("b", 100.0), ("c", 100.0), ("d", 100.0)],
            0.0,
            Size::new(320.0, 150.0),
            0.0,
        )
    }

    #[test]
    fn missing_message_is_not_found() {
        let err = ScrollAnchor::resolve(&ChatPosition::message("zzz"), &layout()).unwrap_err();
        assert!(matches!(err, ScrollError::NotFound(_)));
    }

    #[test]
    fn edges_always_resolve() {
        let empty: ContentLayout<&str> =
            ContentLayout::new(Size::new(320.0, 0.0), Rect::new(0.0, 0.0, 320.0, 150.0));
        assert_eq!(ScrollAnchor::resolve(&ChatPosition::bottom(), &empty).unwrap().offset, 0.0);
        assert_eq!(ScrollAnchor::resolve(&ChatPosition::bottom(), &layout()).unwrap().offset, 250.0);
        assert_eq!(ScrollAnchor::resolve(&ChatPosition::Top, &layout()).unwrap().offset, 0.0);
        assert_eq!(ScrollAnchor::resolve(&ChatPosition::Automatic, &layout()).unwrap().offset, 250.0);
    }

    #[test]
    fn message_anchors() {
        let l = layout();
        let bottom = ScrollAnchor::resolve(&ChatPosition::message("c"), &l).unwrap();
        assert_eq!(bottom.offset, 150.0);
        assert_eq!(bottom.target, Some(Rect::new(0.0, 200.0, 320.0, 300.0)));

        let top = ScrollAnchor::resolve(&ChatPosition::message_at("c", UnitPoint::TOP), &l).unwrap();
        assert_eq!(top.offset, 200.0);

        let center =
            ScrollAnchor::resolve(&ChatPosition::message_at("c", UnitPoint::CENTER), &l).unwrap();
        assert_eq!(center.offset, 175.0);

        // "a" cannot be bottom-aligned without scrolling past the top.
        assert_eq!(ScrollAnchor::resolve(&ChatPosition::message("a"), &l).unwrap().offset, 0.0);
    }

    #[test]
    fn offset_composes_on_base() {
        let l = layout();
        let up = ScrollAnchor::resolve(&ChatPosition::offset(-50.0, ChatPosition::bottom()), &l).unwrap();
        assert_eq!(up.offset, 200.0);

        let past = ScrollAnchor::resolve(&ChatPosition::offset(500.0, ChatPosition::Top), &l).unwrap();
        assert_eq!(past.offset, 250.0);

        let missing = ChatPosition::offset(10.0, ChatPosition::message("zzz"));
        assert!(ScrollAnchor::resolve(&missing, &l).is_err());
    }

    #[test]
    fn index_targets() {
        let l = layout();
        assert_eq!(ScrollAnchor::resolve(&ChatPosition::Index(3), &l).unwrap().offset, 250.0);
        assert!(matches!(
            ScrollAnchor::resolve(&ChatPosition::Index(9), &l),
            Err(ScrollError::NotFound(_))
        ));
    }
}
