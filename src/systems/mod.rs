pub mod export;
pub mod settlement;
#[cfg(feature = "viewer")]
pub mod view;
