//! The registration view model handed out by the API, and how it is derived from what is stored.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::{
    date_helpers,
    sql_interface::{
        types::{BoothDetail, BulkDetail, IndividualDetail, SponsorDetail},
        StoredRegistration,
    },
};

/// A registration along with the details of its kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    #[serde(serialize_with = "date_helpers::serialize_iso")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: RegistrationDetails,
}

/// Serialized as `"type": ..., "data": {...}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum RegistrationDetails {
    Individual(Billed<IndividualDetail>),
    Bulk(Billed<BulkDetail>),
    Booth(Billed<BoothDetail>),
    /// The sponsor detail is only [`None`] for registrations without any detail, which are
    /// reported as sponsor registrations with [`Discrimination::LegacySponsorFallback`].
    Sponsor(Billed<Option<SponsorDetail>>),
}

/// Some detail, merged with the billing fields of the registration it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Billed<T> {
    #[serde(flatten)]
    pub detail: T,
    #[serde(flatten)]
    pub billing: Billing,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Billing {
    pub payment_status: String,
    pub reference: String,
    pub total_price: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationKind {
    Individual,
    Bulk,
    Booth,
    Sponsor,
}

impl RegistrationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Bulk => "bulk",
            Self::Booth => "booth",
            Self::Sponsor => "sponsor",
        }
    }

    /// The tag, capitalized for display.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Bulk => "Bulk",
            Self::Booth => "Booth",
            Self::Sponsor => "Sponsor",
        }
    }
}

impl RegistrationDetails {
    #[must_use]
    pub fn kind(&self) -> RegistrationKind {
        match self {
            Self::Individual(_) => RegistrationKind::Individual,
            Self::Bulk(_) => RegistrationKind::Bulk,
            Self::Booth(_) => RegistrationKind::Booth,
            Self::Sponsor(_) => RegistrationKind::Sponsor,
        }
    }

    #[must_use]
    pub fn billing(&self) -> &Billing {
        match self {
            Self::Individual(billed) => &billed.billing,
            Self::Bulk(billed) => &billed.billing,
            Self::Booth(billed) => &billed.billing,
            Self::Sponsor(billed) => &billed.billing,
        }
    }
}

/// How the kind of a registration is told from the details attached to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Discrimination {
    /// Checks individual, bulk and booth details in that order and takes the first one present.
    /// Everything else is reported as a sponsor registration, even if no sponsor detail exists.
    LegacySponsorFallback,
    /// Requires exactly one detail to be present.
    Strict,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("Registration '{id}' has no details attached")]
    MissingDetail { id: String },
    #[error("Registration '{id}' has {count} details attached instead of one")]
    AmbiguousDetail { id: String, count: usize },
}

/// Turns a stored registration into the view model, picking its kind according to
/// `discrimination`.
pub fn classify(
    stored: StoredRegistration,
    discrimination: Discrimination,
) -> Result<Registration, ClassifyError> {
    if discrimination == Discrimination::Strict {
        match stored.detail_count() {
            1 => (),
            0 => {
                return Err(ClassifyError::MissingDetail {
                    id: stored.base.id,
                })
            }
            count => {
                return Err(ClassifyError::AmbiguousDetail {
                    id: stored.base.id,
                    count,
                })
            }
        }
    }

    let StoredRegistration {
        base,
        individual,
        bulk,
        booth,
        sponsor,
    } = stored;

    let billing = Billing {
        payment_status: base.payment_status,
        reference: base.reference,
        total_price: base.total_price,
    };

    let details = if let Some(detail) = individual {
        RegistrationDetails::Individual(Billed { detail, billing })
    } else if let Some(detail) = bulk {
        RegistrationDetails::Bulk(Billed { detail, billing })
    } else if let Some(detail) = booth {
        RegistrationDetails::Booth(Billed { detail, billing })
    } else {
        RegistrationDetails::Sponsor(Billed {
            detail: sponsor,
            billing,
        })
    };

    Ok(Registration {
        id: base.id,
        created_at: base.created_at,
        details,
    })
}
