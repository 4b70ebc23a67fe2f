//! Pluggable feedback for the item under the pointer.

use serde::{Deserialize, Serialize};

use crate::item::ItemId;

/// How the renderer should decorate an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum HoverStyle {
    #[default]
    Plain,
    Outline,
    Wireframe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoverFeedbackKind {
    None,
    #[default]
    Outline,
    Wireframe,
}

pub trait HoverFeedback {
    fn name(&self) -> &'static str;
    fn hover_changed(&mut self, previous: Option<ItemId>, current: Option<ItemId>);
    fn style_for(&self, item: ItemId) -> HoverStyle;
}

pub fn hover_feedback(kind: HoverFeedbackKind) -> Box<dyn HoverFeedback> {
    match kind {
        HoverFeedbackKind::None => Box::new(NoHoverFeedback),
        HoverFeedbackKind::Outline => Box::new(OutlineHighlight::default()),
        HoverFeedbackKind::Wireframe => Box::new(WireframeToggle::default()),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoHoverFeedback;

impl HoverFeedback for NoHoverFeedback {
    fn name(&self) -> &'static str {
        "none"
    }

    fn hover_changed(&mut self, _previous: Option<ItemId>, _current: Option<ItemId>) {}

    fn style_for(&self, _item: ItemId) -> HoverStyle {
        HoverStyle::Plain
    }
}

/// Draws an edge outline around whatever the pointer rests on.
#[derive(Debug, Default, Clone)]
pub struct OutlineHighlight {
    outlined: Vec<ItemId>,
}

impl OutlineHighlight {
    pub fn outlined(&self) -> &[ItemId] {
        &self.outlined
    }
}

impl HoverFeedback for OutlineHighlight {
    fn name(&self) -> &'static str {
        "outline"
    }

    fn hover_changed(&mut self, _previous: Option<ItemId>, current: Option<ItemId>) {
        self.outlined.clear();
        self.outlined.extend(current);
    }

    fn style_for(&self, item: ItemId) -> HoverStyle {
        if self.outlined.contains(&item) {
            HoverStyle::Outline
        } else {
            HoverStyle::Plain
        }
    }
}

/// Swaps the hovered item to a wireframe look until the pointer leaves it.
#[derive(Debug, Default, Clone, Copy)]
pub struct WireframeToggle {
    wireframed: Option<ItemId>,
}

impl HoverFeedback for WireframeToggle {
    fn name(&self) -> &'static str {
        "wireframe"
    }

    fn hover_changed(&mut self, _previous: Option<ItemId>, current: Option<ItemId>) {
        self.wireframed = current;
    }

    fn style_for(&self, item: ItemId) -> HoverStyle {
        if self.wireframed == Some(item) {
            HoverStyle::Wireframe
        } else {
            HoverStyle::Plain
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_tracks_only_current_hover() {
        let mut feedback = OutlineHighlight::default();
        feedback.hover_changed(None, Some(ItemId(1)));
        feedback.hover_changed(Some(ItemId(1)), Some(ItemId(2)));
        assert_eq!(feedback.outlined(), &[ItemId(2)]);
        assert_eq!(feedback.style_for(ItemId(1)), HoverStyle::Plain);
        assert_eq!(feedback.style_for(ItemId(2)), HoverStyle::Outline);
        feedback.hover_changed(Some(ItemId(2)), None);
        assert!(feedback.outlined().is_empty());
    }

    #[test]
    fn factory_honours_kind() {
        assert_eq!(hover_feedback(HoverFeedbackKind::Wireframe).name(), "wireframe");
        let mut none = hover_feedback(HoverFeedbackKind::None);
        none.hover_changed(None, Some(ItemId(0)));
        assert_eq!(none.style_for(ItemId(0)), HoverStyle::Plain);
    }
}
