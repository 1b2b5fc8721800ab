use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChurnError, Result};

/// A categorical field whose levels expand into one indicator column each.
pub trait Categorical: Copy {
    /// Level spellings, in the order their indicator columns are emitted.
    const LEVELS: &'static [&'static str];

    /// The level this value takes.
    fn level(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Geography {
    France,
    Germany,
    Spain,
}

impl Categorical for Geography {
    const LEVELS: &'static [&'static str] = &["France", "Germany", "Spain"];

    fn level(&self) -> &'static str {
        match self {
            Geography::France => "France",
            Geography::Germany => "Germany",
            Geography::Spain => "Spain",
        }
    }
}

impl FromStr for Geography {
    type Err = ChurnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "france" => Ok(Geography::France),
            "germany" => Ok(Geography::Germany),
            "spain" => Ok(Geography::Spain),
            _ => Err(ChurnError::InvalidCategory {
                field: "Geography",
                value: s.to_string(),
                expected: Self::LEVELS,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
}

impl Categorical for Gender {
    const LEVELS: &'static [&'static str] = &["Female", "Male"];

    fn level(&self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
        }
    }
}

impl FromStr for Gender {
    type Err = ChurnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(ChurnError::InvalidCategory {
                field: "Gender",
                value: s.to_string(),
                expected: Self::LEVELS,
            }),
        }
    }
}

/// Yes/No answer for the boolean-like fields (`HasCrCard`, `IsActiveMember`).
///
/// The training data stores these as `1`/`0`, which is also how the
/// indicator columns are suffixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    const SPELLINGS: &'static [&'static str] = &["Yes", "No"];

    pub fn is_yes(self) -> bool {
        matches!(self, YesNo::Yes)
    }
}

impl Categorical for YesNo {
    const LEVELS: &'static [&'static str] = &["1", "0"];

    fn level(&self) -> &'static str {
        match self {
            YesNo::Yes => "1",
            YesNo::No => "0",
        }
    }
}

impl FromStr for YesNo {
    type Err = ChurnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "y" | "1" | "true" => Ok(YesNo::Yes),
            "no" | "n" | "0" | "false" => Ok(YesNo::No),
            _ => Err(ChurnError::InvalidCategory {
                field: "yes/no flag",
                value: s.to_string(),
                expected: Self::SPELLINGS,
            }),
        }
    }
}

macro_rules! string_conversions {
    ($($ty:ty => |$v:ident| $display:expr),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    let $v = self;
                    f.write_str($display)
                }
            }

            impl TryFrom<String> for $ty {
                type Error = ChurnError;

                fn try_from(value: String) -> Result<Self> {
                    value.parse()
                }
            }

            impl From<$ty> for String {
                fn from(value: $ty) -> String {
                    value.to_string()
                }
            }
        )*
    };
}

string_conversions! {
    Geography => |v| v.level(),
    Gender => |v| v.level(),
    YesNo => |v| YesNo::SPELLINGS[if v.is_yes() { 0 } else { 1 }],
}

/// One customer's raw attributes, as gathered by the form or a batch file.
///
/// Field names on the wire follow the training dataset's column headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    #[serde(rename = "CreditScore")]
    pub credit_score: u32,
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Tenure")]
    pub tenure: u32,
    #[serde(rename = "Balance")]
    pub balance: f64,
    #[serde(rename = "NumOfProducts")]
    pub num_products: u32,
    #[serde(rename = "EstimatedSalary")]
    pub estimated_salary: f64,
    #[serde(rename = "Geography")]
    pub geography: Geography,
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[serde(rename = "HasCrCard")]
    pub has_credit_card: YesNo,
    #[serde(rename = "IsActiveMember")]
    pub is_active_member: YesNo,
}

impl Default for RawInput {
    /// The form's initial values.
    fn default() -> Self {
        RawInput {
            credit_score: 600,
            age: 35,
            tenure: 3,
            balance: 50000.0,
            num_products: 2,
            estimated_salary: 60000.0,
            geography: Geography::France,
            gender: Gender::Male,
            has_credit_card: YesNo::Yes,
            is_active_member: YesNo::Yes,
        }
    }
}

/// Inclusive bounds enforced on the numeric fields before encoding.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InputBounds {
    pub credit_score: (u32, u32),
    pub age: (u32, u32),
    pub tenure: (u32, u32),
    pub balance: (f64, f64),
    pub num_products: (u32, u32),
    pub estimated_salary: (f64, f64),
}

impl Default for InputBounds {
    fn default() -> Self {
        Self {
            credit_score: (300, 900),
            age: (18, 100),
            tenure: (0, 10),
            balance: (0.0, 250000.0),
            num_products: (1, 4),
            estimated_salary: (10000.0, 200000.0),
        }
    }
}

fn check_range(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(ChurnError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn int_range((min, max): (u32, u32)) -> (f64, f64) {
    (f64::from(min), f64::from(max))
}

/// Reject records whose numeric fields fall outside `bounds`.
///
/// Categorical fields are already constrained by their types.
pub fn validate(raw: &RawInput, bounds: &InputBounds) -> Result<()> {
    check_range(
        "CreditScore",
        f64::from(raw.credit_score),
        int_range(bounds.credit_score),
    )?;
    check_range("Age", f64::from(raw.age), int_range(bounds.age))?;
    check_range("Tenure", f64::from(raw.tenure), int_range(bounds.tenure))?;
    check_range("Balance", raw.balance, bounds.balance)?;
    check_range(
        "NumOfProducts",
        f64::from(raw.num_products),
        int_range(bounds.num_products),
    )?;
    check_range("EstimatedSalary", raw.estimated_salary, bounds.estimated_salary)?;
    Ok(())
}
