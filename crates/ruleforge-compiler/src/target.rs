//! Compilation targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A proxy client whose native rule syntax the compiler can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Clash / mihomo: rule-providers plus `RULE-SET` references.
    #[serde(alias = "mihomo")]
    Clash,
    /// Surge `[Rule]` section, logical rules included.
    Surge,
    /// Quantumult X `[filter]` section.
    #[serde(alias = "qx")]
    QuantumultX,
    /// sing-box `route.rules`.
    #[serde(alias = "sing-box")]
    SingBox,
    /// v2ray / v2rayN `routing.rules` field rules.
    #[serde(alias = "v2rayn")]
    V2Ray,
}

impl Target {
    pub const ALL: [Target; 5] = [
        Target::Clash,
        Target::Surge,
        Target::QuantumultX,
        Target::SingBox,
        Target::V2Ray,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Target::Clash => "clash",
            Target::Surge => "surge",
            Target::QuantumultX => "quantumultx",
            Target::SingBox => "singbox",
            Target::V2Ray => "v2ray",
        }
    }

    /// File name the build writes this target's artifact to.
    pub fn file_name(self) -> &'static str {
        match self {
            Target::Clash => "clash.yaml",
            Target::Surge => "surge.conf",
            Target::QuantumultX => "quantumultx.conf",
            Target::SingBox => "singbox.json",
            Target::V2Ray => "v2ray.json",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown target: {0}")]
pub struct UnknownTarget(pub String);

impl FromStr for Target {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clash" | "mihomo" => Ok(Target::Clash),
            "surge" => Ok(Target::Surge),
            "quantumultx" | "qx" => Ok(Target::QuantumultX),
            "singbox" | "sing-box" => Ok(Target::SingBox),
            "v2ray" | "v2rayn" => Ok(Target::V2Ray),
            _ => Err(UnknownTarget(s.to_string())),
        }
    }
}
