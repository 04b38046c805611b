pub mod backend;
pub mod element;
pub mod graph;
