pub mod rule_config;
