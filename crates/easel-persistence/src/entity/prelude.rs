pub use super::canvas_lock::Entity as CanvasLock;
pub use super::graphic::Entity as Graphic;
