// Prediction dialog: Hidden -> Visible -> Hidden.

use crate::model::CoinSide;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogChoice {
    Predict(CoinSide),
    FlipWithoutPrediction,
    Dismiss,
}

/// A flip the dialog asks for, with the guess to judge it against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlipRequest {
    pub prediction: Option<CoinSide>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PredictionDialog {
    #[default]
    Hidden,
    Visible,
}

impl PredictionDialog {
    pub fn is_visible(&self) -> bool {
        *self == PredictionDialog::Visible
    }

    pub fn open(&mut self) {
        *self = PredictionDialog::Visible;
    }

    /// Closes the dialog. Exactly one flip for a prediction or a plain flip,
    /// none for a dismissal or when the dialog was not open.
    pub fn resolve(&mut self, choice: DialogChoice) -> Option<FlipRequest> {
        if !self.is_visible() {
            return None;
        }
        *self = PredictionDialog::Hidden;
        match choice {
            DialogChoice::Predict(side) => Some(FlipRequest {
                prediction: Some(side),
            }),
            DialogChoice::FlipWithoutPrediction => Some(FlipRequest { prediction: None }),
            DialogChoice::Dismiss => None,
        }
    }
}
