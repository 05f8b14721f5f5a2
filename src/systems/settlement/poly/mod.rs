// polygon helpers shared by street growth and block filling

pub mod point_gen;
pub mod utils;
#[cfg(feature = "viewer")]
pub mod mesh_gen;
