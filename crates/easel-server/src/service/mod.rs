pub mod graphic;
