use serde::{Deserialize, Serialize};

/// Direction of an open exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
    Flat,
}

impl PositionSide {
    /// Classify a signed net quantity.
    pub fn from_quantity(quantity: f64) -> Self {
        if quantity > 0.0 {
            Self::Long
        } else if quantity < 0.0 {
            Self::Short
        } else {
            Self::Flat
        }
    }
}
