use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How the source node field is populated before mapping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FillType {
    /// `f[n] = n`
    Arange,
    /// Uniform in `[0, 1)`.
    Random,
    Constant(f64),
}

impl FillType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillType::Arange => "arange",
            FillType::Random => "random",
            FillType::Constant(_) => "constant",
        }
    }
}

impl fmt::Display for FillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillType::Constant(v) => write!(f, "constant:{v}"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl FromStr for FillType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "arange" => Ok(FillType::Arange),
            "random" => Ok(FillType::Random),
            _ => {
                let Some(raw) = s.strip_prefix("constant:") else {
                    return Err(format!(
                        "unknown fill '{s}' (expected arange|random|constant:<value>)"
                    ));
                };
                let v: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|e| format!("bad constant '{raw}': {e}"))?;
                Ok(FillType::Constant(v))
            }
        }
    }
}

impl TryFrom<String> for FillType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FillType> for String {
    fn from(fill: FillType) -> String {
        fill.to_string()
    }
}

/// One value per node, `len` of them.
pub fn generate_fill<R: Rng>(rng: &mut R, len: usize, fill: FillType) -> Vec<f64> {
    match fill {
        FillType::Arange => (0..len).map(|n| n as f64).collect(),
        FillType::Random => (0..len).map(|_| rng.gen_range(0.0..1.0)).collect(),
        FillType::Constant(v) => vec![v; len],
    }
}
