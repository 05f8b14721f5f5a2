pub mod config;
pub mod systems;

#[cfg(test)]
pub mod test;

pub use systems::settlement::SettlementPlugin;
