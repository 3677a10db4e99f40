pub mod edge_map;
pub mod extractor;
pub mod frame;
pub mod particle_buffer;
pub mod pixel;
pub mod projector;
pub mod ranker;
