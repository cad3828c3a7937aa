//! SeaORM entity definitions

pub mod prelude;

pub mod canvas_lock;
pub mod graphic;
