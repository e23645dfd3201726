// Configuration module - serde-backed settings for every core component
pub mod fleet_config;
pub mod grid_config;

pub use fleet_config::{
    ArrangeConfig, FleetConfig, LayoutConfig, LayoutKind, LifecycleConfig, ScanConfig,
};
pub use grid_config::GridConfig;
