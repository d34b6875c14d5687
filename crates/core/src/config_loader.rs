use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by layering defaults, TOML, JSON and `PREMIUM_` environment variables.
    ///
    /// Missing files are skipped, so an empty environment yields [`AppConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns an error if a present configuration source cannot be parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from("config/Config.toml")
    }

    /// Same as [`ConfigLoader::load`] with an explicit TOML path.
    ///
    /// # Errors
    ///
    /// Returns an error if a present configuration source cannot be parsed.
    pub fn load_from(path: &str) -> Result<AppConfig> {
        let config: AppConfig = Self::base(path).extract()?;

        Ok(config)
    }

    /// Loads configuration with a profile overlay (`config/Config.{profile}.toml`).
    ///
    /// # Errors
    ///
    /// Returns an error if a present configuration source cannot be parsed.
    pub fn load_with_profile(profile: &str) -> Result<AppConfig> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("config/Config.toml"))
            .merge(Toml::file(format!("config/Config.{profile}.toml")))
            .merge(Env::prefixed("PREMIUM_").split("__"))
            .join(Json::file("config/Config.json"))
            .extract()?;

        Ok(config)
    }

    fn base(path: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("PREMIUM_").split("__"))
            .join(Json::file("config/Config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let config = ConfigLoader::load_from("does/not/exist.toml").unwrap();
        assert_eq!(config.screener.target_dte, 45);
        assert_eq!(config.manager.time_stop_dte, 21);
        assert_eq!(config.manager.profit_target_pct, dec!(0.50));
        assert_eq!(config.risk.max_bp_usage_pct, dec!(50));
        assert_eq!(config.risk.theta_low_pct, dec!(0.1));
        assert!((config.gex.pin_band_pct - 0.005).abs() < f64::EPSILON);
    }

    #[test]
    fn toml_overrides_are_merged_over_defaults() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(
            Toml::string(
                r#"
                [screener]
                min_ivr = 30.0

                [gex]
                max_dte = 14
                "#,
            ),
        );
        let config: AppConfig = figment.extract().unwrap();
        assert!((config.screener.min_ivr - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.gex.max_dte, 14);
        // untouched sections keep their defaults
        assert_eq!(config.screener.max_concurrent_symbols, 4);
    }
}
