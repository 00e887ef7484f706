//! Configuration validation logic.

use ruleforge_compiler::Target;

use crate::Config;
use crate::loader::ConfigError;

const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];
const LOG_OUTPUTS: [&str; 2] = ["stderr", "stdout"];

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.source.rules_dir.trim().is_empty() {
        return Err(ConfigError::Validation("source.rules_dir is empty".into()));
    }
    if config.source.extension.trim().is_empty() {
        return Err(ConfigError::Validation("source.extension is empty".into()));
    }
    if config.output.dir.trim().is_empty() {
        return Err(ConfigError::Validation("output.dir is empty".into()));
    }
    if config.compile.default_policy.trim().is_empty() {
        return Err(ConfigError::Validation(
            "compile.default_policy is empty".into(),
        ));
    }
    // Line formats write the catch-all as `FINAL,<policy>`.
    if config.compile.default_policy.contains(',') {
        return Err(ConfigError::Validation(
            "compile.default_policy must not contain a comma".into(),
        ));
    }
    if config.compile.targets.is_empty() {
        return Err(ConfigError::Validation("compile.targets is empty".into()));
    }
    if config.clash.interval == 0 {
        return Err(ConfigError::Validation("clash.interval must be > 0".into()));
    }
    if config.compile.targets.contains(&Target::Clash)
        && config
            .clash
            .base_raw_url
            .as_deref()
            .unwrap_or("")
            .trim()
            .is_empty()
    {
        return Err(ConfigError::Validation(
            "clash.base_raw_url is required when the clash target is enabled".into(),
        ));
    }
    if let Some(format) = &config.logging.format
        && !LOG_FORMATS.contains(&format.as_str())
    {
        return Err(ConfigError::Validation(format!(
            "logging.format must be one of: {:?}",
            LOG_FORMATS
        )));
    }
    if let Some(output) = &config.logging.output
        && !LOG_OUTPUTS.contains(&output.as_str())
    {
        return Err(ConfigError::Validation(format!(
            "logging.output must be one of: {:?}",
            LOG_OUTPUTS
        )));
    }
    for name in config.capabilities.keys() {
        if name.parse::<Target>().is_err() {
            return Err(ConfigError::Validation(format!(
                "capabilities.{name}: unknown target"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn valid() -> Config {
        let mut config = Config::default();
        config.clash.base_raw_url = Some("https://raw.example.com/o/r/main".into());
        config
    }

    fn reason(config: &Config) -> String {
        match validate_config(config).unwrap_err() {
            ConfigError::Validation(msg) => msg,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn defaults_with_base_url_are_valid() {
        validate_config(&valid()).unwrap();
    }

    #[test]
    fn clash_requires_base_url() {
        let config = Config::default();
        assert!(reason(&config).contains("base_raw_url"));

        let mut config = Config::default();
        config.compile.targets = vec![Target::Surge, Target::V2Ray];
        validate_config(&config).unwrap();
    }

    #[test]
    fn rejects_empty_fields() {
        let mut config = valid();
        config.compile.default_policy = "  ".into();
        assert!(reason(&config).contains("default_policy"));

        let mut config = valid();
        config.compile.default_policy = "A,B".into();
        assert!(reason(&config).contains("comma"));

        let mut config = valid();
        config.compile.targets.clear();
        assert!(reason(&config).contains("targets"));

        let mut config = valid();
        config.source.rules_dir.clear();
        assert!(reason(&config).contains("rules_dir"));

        let mut config = valid();
        config.clash.interval = 0;
        assert!(reason(&config).contains("interval"));
    }

    #[test]
    fn rejects_unknown_logging_values() {
        let mut config = valid();
        config.logging.format = Some("xml".into());
        assert!(reason(&config).contains("logging.format"));

        let mut config = valid();
        config.logging.output = Some("file".into());
        assert!(reason(&config).contains("logging.output"));
    }

    #[test]
    fn rejects_unknown_capability_target() {
        let mut config = valid();
        config
            .capabilities
            .insert("loon".into(), BTreeMap::from([("AND".to_string(), true)]));
        assert!(reason(&config).contains("loon"));

        let mut config = valid();
        config.capabilities.insert("sing-box".into(), BTreeMap::new());
        validate_config(&config).unwrap();
    }
}
