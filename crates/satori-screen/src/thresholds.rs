//! Per-field significance thresholds.

use crate::snapshot::Snapshot;

/// How a field's movement is measured
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// `|new - old| / old > value`; from zero, any non-zero value counts
    Relative(f64),
    /// `|new - old| >= value`
    Absolute(f64),
}

impl Threshold {
    pub fn exceeded(self, old: f64, new: f64) -> bool {
        match self {
            Threshold::Relative(limit) => {
                if old == 0.0 {
                    return new != 0.0;
                }
                ((new - old) / old).abs() > limit
            }
            Threshold::Absolute(limit) => (new - old).abs() >= limit,
        }
    }
}

/// Fields that take part in change detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Balance,
    SatoriBalance,
    Price,
    CompetingNeurons,
    StakeRequirement,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Balance,
        Field::SatoriBalance,
        Field::Price,
        Field::CompetingNeurons,
        Field::StakeRequirement,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Balance => "balance",
            Field::SatoriBalance => "SATORI balance",
            Field::Price => "price",
            Field::CompetingNeurons => "competing neurons",
            Field::StakeRequirement => "stake requirement",
        }
    }

    /// Value of this field in `snapshot`, `None` when the source had no data
    pub fn value(self, snapshot: &Snapshot) -> Option<f64> {
        match self {
            Field::Balance => Some(snapshot.balance),
            Field::SatoriBalance => Some(snapshot.asset_balances.satori),
            Field::Price => snapshot.price,
            Field::CompetingNeurons => snapshot.competing_neuron_count.map(|n| n as f64),
            Field::StakeRequirement => snapshot.stake_requirement,
        }
    }
}

/// Threshold table; every compared field has exactly one entry
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeThresholds {
    pub balance: Threshold,
    pub satori_balance: Threshold,
    pub price: Threshold,
    pub competing_neurons: Threshold,
    pub stake_requirement: Threshold,
}

impl Default for ChangeThresholds {
    fn default() -> Self {
        Self {
            balance: Threshold::Relative(0.01),
            satori_balance: Threshold::Relative(0.01),
            price: Threshold::Relative(0.001),
            competing_neurons: Threshold::Absolute(1.0),
            stake_requirement: Threshold::Relative(0.01),
        }
    }
}

impl ChangeThresholds {
    pub fn get(&self, field: Field) -> Threshold {
        match field {
            Field::Balance => self.balance,
            Field::SatoriBalance => self.satori_balance,
            Field::Price => self.price,
            Field::CompetingNeurons => self.competing_neurons,
            Field::StakeRequirement => self.stake_requirement,
        }
    }

    /// First field that moved past its threshold.
    ///
    /// Optional fields only count when both readings carry a value.
    pub fn first_exceeded(&self, old: &Snapshot, new: &Snapshot) -> Option<Field> {
        Field::ALL.into_iter().find(|&field| {
            match (field.value(old), field.value(new)) {
                (Some(a), Some(b)) => self.get(field).exceeded(a, b),
                _ => false,
            }
        })
    }
}
