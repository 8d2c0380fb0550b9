use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mood {
    VerySad,
    Sad,
    Neutral,
    Happy,
    VeryHappy,
}

impl Mood {
    /// Numeric rating from 1 (very sad) to 5 (very happy), used for averages.
    pub fn score(self) -> u8 {
        match self {
            Mood::VerySad => 1,
            Mood::Sad => 2,
            Mood::Neutral => 3,
            Mood::Happy => 4,
            Mood::VeryHappy => 5,
        }
    }

    pub fn all() -> [Mood; 5] {
        [
            Mood::VerySad,
            Mood::Sad,
            Mood::Neutral,
            Mood::Happy,
            Mood::VeryHappy,
        ]
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mood::VerySad => write!(f, "very-sad"),
            Mood::Sad => write!(f, "sad"),
            Mood::Neutral => write!(f, "neutral"),
            Mood::Happy => write!(f, "happy"),
            Mood::VeryHappy => write!(f, "very-happy"),
        }
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "very-sad" | "verysad" => Ok(Mood::VerySad),
            "sad" => Ok(Mood::Sad),
            "neutral" => Ok(Mood::Neutral),
            "happy" => Ok(Mood::Happy),
            "very-happy" | "veryhappy" => Ok(Mood::VeryHappy),
            _ => Err(format!(
                "Invalid mood '{}'. Valid options: very-sad, sad, neutral, happy, very-happy",
                s
            )),
        }
    }
}
