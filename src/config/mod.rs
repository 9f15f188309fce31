//! Migration configuration

mod migration_config;

pub use migration_config::MigrationConfig;
