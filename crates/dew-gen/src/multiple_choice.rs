//! Multiple-choice options with plausible wrong answers.
//!
//! Distractors imitate common calculation mistakes: inverting a ratio,
//! forgetting a unit conversion, slipping on arithmetic or a decimal point,
//! misapplying a formula, being off by an order of magnitude, or rounding
//! too early. The difficulty level weights which mistakes are imitated.

use crate::solver::{AnswerValue, FinalValue, round_to};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strategy attempts before falling back to random variations.
pub const MAX_STRATEGY_ATTEMPTS: usize = 30;

const FALLBACK_ATTEMPTS: usize = 100;

const CONVERSION_FACTORS: [f64; 8] = [10.0, 100.0, 1000.0, 60.0, 3600.0, 2.54, 2.2, 1000.0 / 3600.0];

const MAGNITUDE_EXPONENTS: [i32; 6] = [-3, -2, -1, 1, 2, 3];

// ============================================================================
// Difficulty & strategies
// ============================================================================

/// Problem difficulty as it affects distractor choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parse a template's difficulty label.
    ///
    /// "intermediate" counts as medium; unrecognized labels count as hard.
    ///
    /// ```rust
    /// use dew_gen::multiple_choice::Difficulty;
    ///
    /// assert_eq!(Difficulty::from_label("Intermediate"), Difficulty::Medium);
    /// assert_eq!(Difficulty::from_label("easy"), Difficulty::Easy);
    /// assert_eq!(Difficulty::from_label("expert"), Difficulty::Hard);
    /// ```
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "easy" | "beginner" => Self::Easy,
            "medium" | "intermediate" => Self::Medium,
            _ => Self::Hard,
        }
    }

    /// Weights over [`Strategy::ALL`].
    pub fn weights(&self) -> [f64; 6] {
        match self {
            Self::Easy => [0.1, 0.3, 0.3, 0.1, 0.1, 0.1],
            Self::Medium => [0.2, 0.2, 0.2, 0.2, 0.1, 0.1],
            Self::Hard => [0.1, 0.1, 0.2, 0.3, 0.2, 0.1],
        }
    }
}

/// A kind of calculation mistake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Inverse,
    UnitConversion,
    Arithmetic,
    Formula,
    Magnitude,
    Rounding,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Self::Inverse,
        Self::UnitConversion,
        Self::Arithmetic,
        Self::Formula,
        Self::Magnitude,
        Self::Rounding,
    ];

    /// Apply the mistake to `answer`.
    pub fn apply<R: Rng + ?Sized>(&self, answer: AnswerValue, rng: &mut R) -> f64 {
        let v = answer.as_f64();
        match self {
            Self::Inverse => {
                if v.abs() < 1e-10 {
                    v + rng.gen_range(0.1..=1.0)
                } else {
                    1.0 / v
                }
            }
            Self::UnitConversion => {
                let factor = CONVERSION_FACTORS.choose(rng).copied().unwrap_or(10.0);
                v * factor
            }
            Self::Arithmetic => {
                let magnitude = 10f64.powf((v.abs() + 1e-10).log10().floor());
                match rng.gen_range(0..3) {
                    0 => v + rng.gen_range(0.1..=0.5) * magnitude,
                    1 => (v - rng.gen_range(0.1..=0.5) * magnitude).max(0.0),
                    _ => wrong_decimal(answer, rng),
                }
            }
            Self::Formula => match rng.gen_range(0..3) {
                0 if v >= 0.0 => v + v.sqrt(),
                0 => v - v.abs().sqrt(),
                1 => v * v,
                _ => v * (1.0 + rng.gen_range(-0.3..=0.3)),
            },
            Self::Magnitude => {
                let exp = MAGNITUDE_EXPONENTS.choose(rng).copied().unwrap_or(1);
                v * 10f64.powi(exp)
            }
            Self::Rounding => round_to(v * rng.gen_range(0.9..=1.1), 1),
        }
    }
}

/// Misplace the decimal point by one digit; answers without at least two
/// decimals are multiplied by ten.
fn wrong_decimal<R: Rng + ?Sized>(answer: AnswerValue, rng: &mut R) -> f64 {
    let text = answer.to_string();
    let Some((int_part, frac_part)) = text.split_once('.') else {
        return answer.as_f64() * 10.0;
    };
    if frac_part.len() <= 1 || frac_part.contains(['e', 'E']) {
        return answer.as_f64() * 10.0;
    }
    let Ok(digits) = format!("{int_part}{frac_part}").parse::<f64>() else {
        return answer.as_f64() * 10.0;
    };
    let shift: i32 = if rng.gen_bool(0.5) { 1 } else { -1 };
    digits * 10f64.powi(shift - frac_part.len() as i32)
}

/// Decimals kept for distractors of `answer`: one less than the number of
/// characters of its integer part, but at least two.
fn distractor_precision(answer: f64) -> u32 {
    let int_chars = format!("{}", answer.trunc() as i64).len() as u32;
    int_chars.saturating_sub(1).max(2)
}

// ============================================================================
// Options
// ============================================================================

/// One answer option.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct McOption {
    pub value: AnswerValue,
    pub unit: String,
    pub is_correct: bool,
}

/// The shuffled options for one target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct McQuestion {
    pub options: Vec<McOption>,
    pub correct_index: usize,
}

/// Generates multiple-choice options.
#[derive(Clone, Debug)]
pub struct MultipleChoiceGenerator {
    max_attempts: usize,
}

impl Default for MultipleChoiceGenerator {
    fn default() -> Self {
        Self {
            max_attempts: MAX_STRATEGY_ATTEMPTS,
        }
    }
}

impl MultipleChoiceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Options for every entry of `final_response`: the correct answer and
    /// `num_options - 1` distractors, shuffled.
    pub fn options<R: Rng + ?Sized>(
        &self,
        final_response: &BTreeMap<String, FinalValue>,
        num_options: usize,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> BTreeMap<String, McQuestion> {
        final_response
            .iter()
            .map(|(var, answer)| {
                let distractors =
                    self.distractors(answer.value, num_options.saturating_sub(1), difficulty, rng);
                let precision = distractor_precision(answer.value.as_f64());
                let mut options: Vec<McOption> = std::iter::once(McOption {
                    value: answer.value,
                    unit: answer.unit.clone(),
                    is_correct: true,
                })
                .chain(distractors.into_iter().map(|d| McOption {
                    value: AnswerValue::from_f64(d, precision),
                    unit: answer.unit.clone(),
                    is_correct: false,
                }))
                .collect();
                options.shuffle(rng);
                let correct_index = options.iter().position(|o| o.is_correct).unwrap_or(0);
                (
                    var.clone(),
                    McQuestion {
                        options,
                        correct_index,
                    },
                )
            })
            .collect()
    }

    /// `count` distinct wrong answers for `answer`.
    pub fn distractors<R: Rng + ?Sized>(
        &self,
        answer: AnswerValue,
        count: usize,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Vec<f64> {
        let correct = answer.as_f64();
        let precision = distractor_precision(correct);
        let mut out: Vec<f64> = Vec::with_capacity(count);
        let accept = |d: f64, out: &[f64]| {
            d.is_finite() && !out.contains(&d) && (d - correct).abs() > 1e-6 * correct.abs()
        };

        if let Ok(dist) = WeightedIndex::new(difficulty.weights()) {
            for _ in 0..self.max_attempts {
                if out.len() >= count {
                    break;
                }
                let strategy = Strategy::ALL[dist.sample(rng)];
                let d = round_to(strategy.apply(answer, rng), precision);
                if accept(d, &out) {
                    out.push(d);
                }
            }
        }

        // Random +/-50% variations; zero answers vary around 1.
        let base = if correct.abs() < 1e-10 { 1.0 } else { correct };
        for _ in 0..FALLBACK_ATTEMPTS {
            if out.len() >= count {
                break;
            }
            let d = round_to(base * rng.gen_range(0.5..=1.5), 2);
            if accept(d, &out) {
                out.push(d);
            }
        }

        // Evenly spaced values guarantee termination.
        let step = base.abs().max(1.0) * 0.1;
        let mut k = 1.0;
        while out.len() < count {
            let d = round_to(correct + step * k, 2);
            if accept(d, &out) {
                out.push(d);
            }
            k += 1.0;
        }

        out
    }
}
