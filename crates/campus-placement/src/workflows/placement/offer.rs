use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::application::ApplicationRecord;
use super::selection::OverallStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

impl OfferStatus {
    pub const fn label(self) -> &'static str {
        match self {
            OfferStatus::Pending => "Pending",
            OfferStatus::Accepted => "Accepted",
            OfferStatus::Rejected => "Rejected",
            OfferStatus::Expired => "Expired",
        }
    }
}

/// Offered compensation. `total` is always `base + variable`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Salary {
    pub base: f64,
    pub variable: f64,
    pub total: f64,
}

/// Salary as sent by staff: either a flat amount or a base/variable split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SalaryInput {
    Flat(f64),
    Breakdown {
        base: f64,
        #[serde(default)]
        variable: f64,
    },
}

impl SalaryInput {
    pub fn resolve(self) -> Result<Salary, OfferError> {
        let (base, variable) = match self {
            SalaryInput::Flat(base) => (base, 0.0),
            SalaryInput::Breakdown { base, variable } => (base, variable),
        };
        if !(base.is_finite() && base > 0.0) || !(variable.is_finite() && variable >= 0.0) {
            return Err(OfferError::InvalidSalary);
        }
        let total = base + variable;
        if !total.is_finite() {
            return Err(OfferError::InvalidSalary);
        }
        Ok(Salary {
            base,
            variable,
            total,
        })
    }
}

/// Body of `POST /placements/applications/:id/offer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferTerms {
    pub salary: SalaryInput,
    pub joining_date: NaiveDate,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub designation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub is_offered: bool,
    pub offer_date: DateTime<Utc>,
    pub joining_date: NaiveDate,
    pub salary: Salary,
    pub location: Option<String>,
    pub designation: String,
    #[serde(rename = "offerStatus")]
    pub status: OfferStatus,
    pub accepted_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OfferError {
    #[error("application is not in selected state (currently {})", .0.label())]
    NotSelected(OverallStatus),
    #[error("an offer is already {} for this application", .0.label())]
    AlreadyIssued(OfferStatus),
    #[error("no offer has been issued for this application")]
    NoOffer,
    #[error("offer is {} and can no longer change", .0.label())]
    NotPending(OfferStatus),
    #[error("designation is required")]
    MissingDesignation,
    #[error("salary base must be a positive amount and variable pay cannot be negative")]
    InvalidSalary,
    #[error("joining date {0} is before the offer date")]
    JoiningBeforeOffer(NaiveDate),
}

impl ApplicationRecord {
    /// Attach a pending offer. Only selected applications qualify, and a
    /// previous offer must have been rejected or expired.
    pub fn issue_offer(
        &mut self,
        terms: OfferTerms,
        now: DateTime<Utc>,
    ) -> Result<&Offer, OfferError> {
        let designation = terms.designation.trim();
        if designation.is_empty() {
            return Err(OfferError::MissingDesignation);
        }
        let salary = terms.salary.resolve()?;
        if terms.joining_date < now.date_naive() {
            return Err(OfferError::JoiningBeforeOffer(terms.joining_date));
        }

        if self.overall_status != OverallStatus::Selected {
            return Err(OfferError::NotSelected(self.overall_status));
        }
        if let Some(existing) = &self.offer {
            if matches!(existing.status, OfferStatus::Pending | OfferStatus::Accepted) {
                return Err(OfferError::AlreadyIssued(existing.status));
            }
        }

        let offer = self.offer.insert(Offer {
            is_offered: true,
            offer_date: now,
            joining_date: terms.joining_date,
            salary,
            location: terms.location,
            designation: designation.to_string(),
            status: OfferStatus::Pending,
            accepted_at: None,
            rejection_reason: None,
        });
        Ok(&*offer)
    }

    pub fn accept_offer(&mut self, now: DateTime<Utc>) -> Result<&Offer, OfferError> {
        let offer = self.pending_offer_mut()?;
        offer.status = OfferStatus::Accepted;
        offer.accepted_at = Some(now);
        Ok(&*offer)
    }

    pub fn reject_offer(&mut self, reason: Option<String>) -> Result<&Offer, OfferError> {
        let offer = self.pending_offer_mut()?;
        offer.status = OfferStatus::Rejected;
        offer.rejection_reason = reason;
        Ok(&*offer)
    }

    pub fn expire_offer(&mut self) -> Result<&Offer, OfferError> {
        let offer = self.pending_offer_mut()?;
        offer.status = OfferStatus::Expired;
        Ok(&*offer)
    }

    fn pending_offer_mut(&mut self) -> Result<&mut Offer, OfferError> {
        match self.offer.as_mut() {
            None => Err(OfferError::NoOffer),
            Some(offer) if offer.status != OfferStatus::Pending => {
                Err(OfferError::NotPending(offer.status))
            }
            Some(offer) => Ok(offer),
        }
    }
}
