pub mod chain;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod types;

pub use chain::{normalize, ChainSnapshot, Expiration, RawChain, RawExpiration, RawQuote, RawStrike};
pub use config::{AppConfig, GexConfig, ManagerConfig, RiskConfig, ScreenerConfig};
pub use config_loader::ConfigLoader;
pub use error::ChainError;
pub use types::{ExpiryCycle, OptionContract, OptionRight};
