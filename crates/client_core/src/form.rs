//! In-progress investment record edited through the planner.
//!
//! Numeric inputs are kept as the result of parsing what the user typed, so a
//! half-typed or garbage value is representable (`None`) without losing the
//! rest of the form. Conversion to a wire [`Investment`] happens only on
//! submission.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use shared::{
    domain::{InvestmentId, InvestorId},
    protocol::{parse_start_date, Investment, InvalidDate},
};

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    InvestmentName,
    InitialInvestmentAmount,
    InvestmentStartDate,
    CurrentValue,
    InvestorId,
}

impl FormField {
    pub fn name(self) -> &'static str {
        match self {
            FormField::InvestmentName => "investmentName",
            FormField::InitialInvestmentAmount => "initialInvestmentAmount",
            FormField::InvestmentStartDate => "investmentStartDate",
            FormField::CurrentValue => "currentValue",
            FormField::InvestorId => "investorId",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            FormField::InitialInvestmentAmount | FormField::CurrentValue | FormField::InvestorId
        )
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormField {
    type Err = ClientError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "investmentName" => Ok(FormField::InvestmentName),
            "initialInvestmentAmount" => Ok(FormField::InitialInvestmentAmount),
            "investmentStartDate" => Ok(FormField::InvestmentStartDate),
            "currentValue" => Ok(FormField::CurrentValue),
            "investorId" => Ok(FormField::InvestorId),
            other => Err(ClientError::UnknownField(other.to_string())),
        }
    }
}

/// Start date as either a parsed value or the raw text typed into the form.
#[derive(Debug, Clone, PartialEq)]
pub enum StartDate {
    Date(DateTime<Utc>),
    Text(String),
}

impl StartDate {
    pub fn parse(&self) -> Result<DateTime<Utc>, InvalidDate> {
        match self {
            StartDate::Date(date) => Ok(*date),
            StartDate::Text(raw) => parse_start_date(raw),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.parse().is_ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentForm {
    pub investment_id: InvestmentId,
    pub investment_name: String,
    pub initial_investment_amount: Option<f64>,
    pub investment_start_date: StartDate,
    pub current_value: Option<f64>,
    pub investor_id: Option<f64>,
}

impl InvestmentForm {
    /// The "nothing being edited" form, dated now.
    pub fn empty() -> Self {
        Self {
            investment_id: InvestmentId::UNSET,
            investment_name: String::new(),
            initial_investment_amount: Some(0.0),
            investment_start_date: StartDate::Date(Utc::now()),
            current_value: Some(0.0),
            investor_id: Some(0.0),
        }
    }

    pub fn set_field(&mut self, field: FormField, value: &str) {
        match field {
            FormField::InvestmentName => self.investment_name = value.to_string(),
            FormField::InitialInvestmentAmount => {
                self.initial_investment_amount = parse_number(value)
            }
            FormField::InvestmentStartDate => {
                self.investment_start_date = StartDate::Text(value.to_string())
            }
            FormField::CurrentValue => self.current_value = parse_number(value),
            FormField::InvestorId => self.investor_id = parse_number(value),
        }
    }

    pub fn is_create_button_disabled(&self) -> bool {
        self.investment_name.is_empty()
            || self.initial_investment_amount.is_none()
            || !self.investment_start_date.is_valid()
            || self.current_value.is_none()
            || self.investor_id.is_none()
    }

    pub fn to_record(&self) -> Result<Investment, ClientError> {
        let initial_investment_amount = finite(
            FormField::InitialInvestmentAmount,
            self.initial_investment_amount,
        )?;
        let current_value = finite(FormField::CurrentValue, self.current_value)?;
        let investor_id = finite(FormField::InvestorId, self.investor_id)?;
        if investor_id.fract() != 0.0 {
            return Err(ClientError::InvalidForm(format!(
                "{} must be a whole number, got {investor_id}",
                FormField::InvestorId
            )));
        }
        if !(-I64_BOUND..I64_BOUND).contains(&investor_id) {
            return Err(ClientError::InvalidForm(format!(
                "{} is out of range, got {investor_id}",
                FormField::InvestorId
            )));
        }
        let investment_start_date = self.investment_start_date.parse().map_err(|err| {
            ClientError::InvalidForm(format!("{}: {err}", FormField::InvestmentStartDate))
        })?;

        Ok(Investment {
            investment_id: self.investment_id,
            investment_name: self.investment_name.clone(),
            initial_investment_amount,
            investment_start_date,
            current_value,
            investor_id: InvestorId(investor_id as i64),
        })
    }
}

impl Default for InvestmentForm {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Investment> for InvestmentForm {
    fn from(record: Investment) -> Self {
        Self {
            investment_id: record.investment_id,
            investment_name: record.investment_name,
            initial_investment_amount: Some(record.initial_investment_amount),
            investment_start_date: StartDate::Date(record.investment_start_date),
            current_value: Some(record.current_value),
            investor_id: Some(record.investor_id.0 as f64),
        }
    }
}

/// 2^63, the first magnitude an `i64` cannot hold.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Reads the longest leading decimal literal the way a browser's `parseFloat`
/// does: trailing text is ignored, `Infinity` is accepted, and input without
/// a leading number yields `None`.
fn parse_number(raw: &str) -> Option<f64> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = 0;
    let negative = bytes.first() == Some(&b'-');
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if text[end..].starts_with("Infinity") {
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_digits = digits_from(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = digits_from(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    text[..end].parse::<f64>().ok()
}

fn finite(field: FormField, value: Option<f64>) -> Result<f64, ClientError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(ClientError::InvalidForm(format!(
            "{field} must be finite, got {v}"
        ))),
        None => Err(ClientError::InvalidForm(format!("{field} is not a number"))),
    }
}
