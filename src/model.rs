//! Core data models for the coin discoverer.
//! Plain values shared by the state machines and the components.

use serde::{Deserialize, Serialize};

/// Placeholder shown for metadata a coin record does not carry.
pub const MISSING: &str = "—";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoinSide {
    Heads,
    Tails,
}

impl CoinSide {
    pub fn flipped(self) -> Self {
        match self {
            CoinSide::Heads => CoinSide::Tails,
            CoinSide::Tails => CoinSide::Heads,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CoinSide::Heads => "Heads",
            CoinSide::Tails => "Tails",
        }
    }
}

/// A museum coin. Image fields are opaque asset handles (relative URLs).
#[derive(Clone, Debug, PartialEq)]
pub struct Coin {
    pub id: String,
    pub title: String,
    pub date: Option<String>,
    pub description: Option<String>,
    /// Millimetres.
    pub diameter: Option<f64>,
    /// Grams.
    pub weight: Option<f64>,
    pub material: Option<String>,
    pub head_description: Option<String>,
    pub tails_description: Option<String>,
    pub head_image: &'static str,
    pub tails_image: &'static str,
}

impl Coin {
    /// Title with its first letter upper-cased, as shown above the coin.
    pub fn display_title(&self) -> String {
        let mut chars = self.title.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn image(&self, side: CoinSide) -> &'static str {
        match side {
            CoinSide::Heads => self.head_image,
            CoinSide::Tails => self.tails_image,
        }
    }

    pub fn side_description(&self, side: CoinSide) -> Option<&str> {
        match side {
            CoinSide::Heads => self.head_description.as_deref(),
            CoinSide::Tails => self.tails_description.as_deref(),
        }
    }

    /// Label/value rows for the info panel; absent values become [`MISSING`].
    pub fn metadata_rows(&self) -> Vec<(&'static str, String)> {
        let or_missing = |v: Option<String>| v.unwrap_or_else(|| MISSING.to_string());
        vec![
            ("Date", or_missing(self.date.clone())),
            ("Diameter", or_missing(self.diameter.map(|d| format!("{d} mm")))),
            ("Weight", or_missing(self.weight.map(|w| format!("{w} g")))),
            ("Material", or_missing(self.material.clone())),
        ]
    }
}

/// Whether the displayed face came from a flip or a manual tap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutcomeSource {
    Flip,
    Manual,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    pub fn text(self) -> &'static str {
        match self {
            Verdict::Correct => "Prediction correct!",
            Verdict::Incorrect => "Prediction incorrect",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Verdict::Correct => "#3fb950",
            Verdict::Incorrect => "#f85149",
        }
    }
}

/// The face a flip settled on, plus the prediction made before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlipOutcome {
    pub side: CoinSide,
    pub prediction: Option<CoinSide>,
    pub source: OutcomeSource,
}

impl FlipOutcome {
    pub fn flipped(side: CoinSide, prediction: Option<CoinSide>) -> Self {
        Self {
            side,
            prediction,
            source: OutcomeSource::Flip,
        }
    }

    pub fn manual(side: CoinSide) -> Self {
        Self {
            side,
            prediction: None,
            source: OutcomeSource::Manual,
        }
    }

    /// `None` for manual toggles and for flips made without a prediction.
    pub fn verdict(&self) -> Option<Verdict> {
        if self.source == OutcomeSource::Manual {
            return None;
        }
        self.prediction.map(|p| {
            if p == self.side {
                Verdict::Correct
            } else {
                Verdict::Incorrect
            }
        })
    }
}

/// A collected coin as persisted in the wallet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletEntry {
    pub id: String,
    pub side: CoinSide,
    pub x: f64,
    pub y: f64,
}
