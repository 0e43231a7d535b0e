//! Named scene-tree nodes with visibility, draw order and an optional
//! drawable.

use glam::Vec3;

use super::drawable::Drawable;
use crate::camera::Camera;
use crate::error::MolGeomError;
use crate::gpu::{Pass, RenderContext, ShaderCatalog};
use crate::util::Interval;

/// A named node of the scene tree. Hiding a node hides its subtree.
#[derive(Debug)]
pub struct SceneNode {
    name: String,
    visible: bool,
    order: i32,
    style: Option<String>,
    drawable: Option<Drawable>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    /// Visible, empty group node at order 0.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            order: 0,
            style: None,
            drawable: None,
            children: Vec::new(),
        }
    }

    /// Leaf node carrying `drawable`.
    pub fn leaf(
        name: impl Into<String>,
        drawable: impl Into<Drawable>,
    ) -> Self {
        let mut node = Self::new(name);
        node.drawable = Some(drawable.into());
        node
    }

    /// Node name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this node (and so its subtree) is drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the subtree.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Draw-order value; siblings draw in ascending order.
    #[must_use]
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Set the draw-order value.
    pub fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    /// Style override for this subtree.
    #[must_use]
    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    /// Draw this subtree with `style` instead of the inherited one.
    pub fn set_style(&mut self, style: Option<String>) {
        self.style = style;
    }

    /// Carried drawable.
    #[must_use]
    pub fn drawable(&self) -> Option<&Drawable> {
        self.drawable.as_ref()
    }

    /// Carried drawable, mutably.
    pub fn drawable_mut(&mut self) -> Option<&mut Drawable> {
        self.drawable.as_mut()
    }

    /// Replace the carried drawable, returning the old one. The caller
    /// destroys what it gets back.
    pub fn set_drawable(
        &mut self,
        drawable: Option<Drawable>,
    ) -> Option<Drawable> {
        std::mem::replace(&mut self.drawable, drawable)
    }

    /// Direct children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    /// Append `child` and return it.
    pub fn add_child(&mut self, child: SceneNode) -> &mut SceneNode {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Detach the first direct child called `name`.
    pub fn remove_child(&mut self, name: &str) -> Option<SceneNode> {
        let index = self.children.iter().position(|c| c.name == name)?;
        Some(self.children.remove(index))
    }

    /// Depth-first search for a node called `name`, this node included.
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Mutable [`find`](Self::find).
    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(name))
    }

    /// Draw the visible subtree for `pass`: own drawable first, then
    /// children by ascending order (insertion order on ties). Returns the
    /// number of draws issued.
    ///
    /// # Errors
    ///
    /// Stops at the first failure of the rendering context.
    pub fn draw(
        &mut self,
        ctx: &mut dyn RenderContext,
        camera: &dyn Camera,
        catalog: &ShaderCatalog,
        style: &str,
        pass: Pass,
    ) -> Result<usize, MolGeomError> {
        if !self.visible {
            return Ok(0);
        }
        let style = self.style.as_deref().unwrap_or(style);
        let mut drawn = 0;
        if let Some(drawable) = &mut self.drawable {
            drawn += drawable.draw(ctx, camera, catalog, style, pass)?;
        }
        let mut sequence: Vec<usize> = (0..self.children.len()).collect();
        sequence.sort_by_key(|&i| self.children[i].order);
        for i in sequence {
            drawn += self.children[i].draw(ctx, camera, catalog, style, pass)?;
        }
        Ok(drawn)
    }

    /// Widen `intervals` by every visible drawable of the subtree.
    pub fn update_projection_intervals(
        &self,
        axes: &[Vec3; 3],
        intervals: &mut [Interval; 3],
    ) {
        if !self.visible {
            return;
        }
        if let Some(drawable) = &self.drawable {
            drawable.update_projection_intervals(axes, intervals);
        }
        for child in &self.children {
            child.update_projection_intervals(axes, intervals);
        }
    }

    /// Largest of `radius_sq` and the squared distance from `center` of
    /// every visible vertex in the subtree.
    pub fn update_squared_sphere_radius(
        &self,
        center: Vec3,
        radius_sq: f32,
    ) -> f32 {
        if !self.visible {
            return radius_sq;
        }
        let own = self.drawable.as_ref().map_or(radius_sq, |d| {
            d.update_squared_sphere_radius(center, radius_sq)
        });
        self.children
            .iter()
            .fold(own, |r, child| child.update_squared_sphere_radius(center, r))
    }

    /// Destroy the drawable of every node in the subtree, visible or not.
    pub fn destroy(self, ctx: &mut dyn RenderContext) {
        if let Some(drawable) = self.drawable {
            drawable.destroy(ctx);
        }
        for child in self.children {
            child.destroy(ctx);
        }
    }
}
