//! Scene graph for managing card elements.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Element, ElementId};

/// A scene containing all elements of a card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// All elements in the scene, indexed by ID.
    elements: HashMap<ElementId, Element>,
    /// Element IDs in insertion order.
    order: Vec<ElementId>,
    /// Viewport width in pixels.
    pub viewport_width: f32,
    /// Viewport height in pixels.
    pub viewport_height: f32,
}

impl Scene {
    /// Create a new empty scene with the given viewport size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            elements: HashMap::new(),
            order: Vec::new(),
            viewport_width: width,
            viewport_height: height,
        }
    }

    /// Add an element to the scene, replacing any element with the same ID.
    pub fn add_element(&mut self, element: Element) -> ElementId {
        let id = element.id;
        if self.elements.contains_key(&id) {
            self.order.retain(|&eid| eid != id);
        }
        self.order.push(id);
        self.elements.insert(id, element);
        id
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get_element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Get all elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Drawable elements in paint order: by z-index, ties kept in insertion order.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&Element> {
        let mut elements: Vec<_> = self.elements().filter(|e| !e.is_group()).collect();
        elements.sort_by_key(|e| e.transform.z_index);
        elements
    }

    /// Get the number of elements in the scene.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, ElementKind, Transform};

    fn rect(name: &str, z_index: i32) -> Element {
        Element::named(
            name,
            ElementKind::Rect {
                fill: Color::rgb(0, 0, 0),
                opacity: 1.0,
            },
        )
        .with_transform(Transform::rect(0.0, 0.0, 10.0, 10.0, z_index))
    }

    #[test]
    fn test_scene_add_and_lookup() {
        let mut scene = Scene::new(400.0, 500.0);
        assert!(scene.is_empty());

        let id = scene.add_element(rect("a", 0));
        assert_eq!(scene.element_count(), 1);
        assert!(scene.get_element(id).is_some());
        assert!(scene.get_element(ElementId::named("b")).is_none());
    }

    #[test]
    fn test_paint_order_is_stable_by_z_index() {
        let mut scene = Scene::new(400.0, 500.0);
        let top = scene.add_element(rect("top", 5));
        let first = scene.add_element(rect("first", 0));
        let second = scene.add_element(rect("second", 0));

        let order: Vec<_> = scene.paint_order().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![first, second, top]);
    }

    #[test]
    fn test_paint_order_skips_groups() {
        let mut scene = Scene::new(400.0, 500.0);
        let group = scene.add_element(Element::named(
            "group",
            ElementKind::Group { children: vec![] },
        ));
        let child = scene.add_element(rect("child", 0).with_parent(group));

        let painted: Vec<_> = scene.paint_order().iter().map(|e| e.id).collect();
        assert_eq!(painted, vec![child]);
        assert_eq!(scene.elements().count(), 2);
    }

    #[test]
    fn test_re_adding_keeps_single_entry() {
        let mut scene = Scene::new(400.0, 500.0);
        scene.add_element(rect("same", 0));
        scene.add_element(rect("same", 3));
        assert_eq!(scene.element_count(), 1);
        assert_eq!(scene.elements().count(), 1);
    }
}
