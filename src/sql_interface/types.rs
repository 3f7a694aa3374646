use std::fmt;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Serialize, Serializer};
use thiserror::Error;

use super::sql_struct::{next_converted, Join, JoinedSqlStruct, ReconstructResult, SqlStruct};

#[derive(Debug, Error)]
#[error("Unknown {kind} '{value}' in database")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

/// Declares an enum stored as plain text in the database, serialized as that same text.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $( $variant:ident => $text:literal ),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum $name {
            $( $variant, )+
        }

        impl $name {
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                match value.as_str()? {
                    $( $text => Ok(Self::$variant), )+
                    other => Err(FromSqlError::Other(Box::new(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }))),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }
    };
}

text_enum!(
    /// Which price category an individual attendee falls into.
    AttendeeType {
        Student => "student",
        General => "general",
        Scholar => "scholar",
    }
);

text_enum!(
    NumberOfDays {
        One => "one",
        Two => "two",
    }
);

text_enum!(
    /// The kind of organization registering a group.
    OrganizationType {
        Highschool => "highschool",
        Culinary => "culinary",
        Company => "company",
    }
);

text_enum!(
    /// The floor area booked for a booth. The registration form stores an empty string if the
    /// exhibitor didn't pick one, which is kept apart from a missing value.
    ExhibitorSize {
        TwoSqm => "2sqm",
        FourSqm => "4sqm",
        SixSqm => "6sqm",
        Unselected => "",
    }
);

/// The part every registration has, regardless of its kind.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseRegistration {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub payment_status: String,
    pub reference: String,
    /// The authoritative amount to be paid, taxes included.
    pub total_price: f64,
}

impl SqlStruct for BaseRegistration {
    fn required_tables() -> Vec<&'static str> {
        vec!["base_registration"]
    }

    fn select_exprs() -> Vec<&'static str> {
        vec![
            "base_registration.id",
            "base_registration.created_at",
            "base_registration.payment_status",
            "base_registration.reference",
            "base_registration.total_price",
        ]
    }

    fn from_row<'a>(mut row: impl Iterator<Item = ValueRef<'a>>) -> ReconstructResult<Self> {
        Ok(Self {
            id: next_converted(&mut row)?,
            created_at: next_converted(&mut row)?,
            payment_status: next_converted(&mut row)?,
            reference: next_converted(&mut row)?,
            total_price: next_converted(&mut row)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualDetail {
    pub name: String,
    pub id_number: String,
    pub email: String,
    pub contact_number: String,
    pub invoicing_details: String,
    pub attendee_type: AttendeeType,
    pub is_member: bool,
    pub number_of_days: NumberOfDays,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_date: Option<String>,
    pub selected_pricing: String,
}

impl SqlStruct for IndividualDetail {
    fn required_tables() -> Vec<&'static str> {
        vec!["individual_registration"]
    }

    fn select_exprs() -> Vec<&'static str> {
        vec![
            "individual_registration.name",
            "individual_registration.id_number",
            "individual_registration.email",
            "individual_registration.contact_number",
            "individual_registration.invoicing_details",
            "individual_registration.attendee_type",
            "individual_registration.is_member",
            "individual_registration.number_of_days",
            "individual_registration.selected_date",
            "individual_registration.selected_pricing",
        ]
    }

    fn from_row<'a>(mut row: impl Iterator<Item = ValueRef<'a>>) -> ReconstructResult<Self> {
        Ok(Self {
            name: next_converted(&mut row)?,
            id_number: next_converted(&mut row)?,
            email: next_converted(&mut row)?,
            contact_number: next_converted(&mut row)?,
            invoicing_details: next_converted(&mut row)?,
            attendee_type: next_converted(&mut row)?,
            is_member: next_converted(&mut row)?,
            number_of_days: next_converted(&mut row)?,
            selected_date: next_converted(&mut row)?,
            selected_pricing: next_converted(&mut row)?,
        })
    }
}

impl JoinedSqlStruct for IndividualDetail {
    fn join() -> Join {
        Join {
            table: "individual_registration",
            on: "individual_registration.registration_id == base_registration.id",
        }
    }

    fn key_expr() -> &'static str {
        "individual_registration.registration_id"
    }
}

/// A group registration by a school or company.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDetail {
    pub organization_type: OrganizationType,
    /// The name of the organization, not necessarily a school.
    pub school_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    pub contact_person_name: String,
    pub contact_person_email: String,
    pub contact_person_phone: String,
    pub member_students: u32,
    pub non_member_students: u32,
    pub member_teachers: u32,
    pub non_member_teachers: u32,
    pub number_of_days: NumberOfDays,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_date: Option<String>,
}

impl SqlStruct for BulkDetail {
    fn required_tables() -> Vec<&'static str> {
        vec!["bulk_registration"]
    }

    fn select_exprs() -> Vec<&'static str> {
        vec![
            "bulk_registration.organization_type",
            "bulk_registration.school_name",
            "bulk_registration.vat_number",
            "bulk_registration.contact_person_name",
            "bulk_registration.contact_person_email",
            "bulk_registration.contact_person_phone",
            "bulk_registration.member_students",
            "bulk_registration.non_member_students",
            "bulk_registration.member_teachers",
            "bulk_registration.non_member_teachers",
            "bulk_registration.number_of_days",
            "bulk_registration.selected_date",
        ]
    }

    fn from_row<'a>(mut row: impl Iterator<Item = ValueRef<'a>>) -> ReconstructResult<Self> {
        Ok(Self {
            organization_type: next_converted(&mut row)?,
            school_name: next_converted(&mut row)?,
            vat_number: next_converted(&mut row)?,
            contact_person_name: next_converted(&mut row)?,
            contact_person_email: next_converted(&mut row)?,
            contact_person_phone: next_converted(&mut row)?,
            member_students: next_converted(&mut row)?,
            non_member_students: next_converted(&mut row)?,
            member_teachers: next_converted(&mut row)?,
            non_member_teachers: next_converted(&mut row)?,
            number_of_days: next_converted(&mut row)?,
            selected_date: next_converted(&mut row)?,
        })
    }
}

impl JoinedSqlStruct for BulkDetail {
    fn join() -> Join {
        Join {
            table: "bulk_registration",
            on: "bulk_registration.registration_id == base_registration.id",
        }
    }

    fn key_expr() -> &'static str {
        "bulk_registration.registration_id"
    }
}

/// Identity of a company, shared by booth and sponsor registrations. Always read as the first six
/// columns of those.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub company_name: String,
    pub company_address: String,
    pub company_email: String,
    pub company_contact_number: String,
    #[serde(rename = "companyVAT")]
    pub company_vat: String,
    pub company_contact_person: String,
}

impl Company {
    fn from_row<'a>(row: &mut impl Iterator<Item = ValueRef<'a>>) -> ReconstructResult<Self> {
        Ok(Self {
            company_name: next_converted(row)?,
            company_address: next_converted(row)?,
            company_email: next_converted(row)?,
            company_contact_number: next_converted(row)?,
            company_vat: next_converted(row)?,
            company_contact_person: next_converted(row)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoothDetail {
    #[serde(flatten)]
    pub company: Company,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exhibitor_size: Option<ExhibitorSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education_option: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_option: Option<String>,
    #[serde(rename = "priceBeforeVAT")]
    pub price_before_vat: f64,
    pub vat_amount: f64,
}

impl SqlStruct for BoothDetail {
    fn required_tables() -> Vec<&'static str> {
        vec!["booth_registration"]
    }

    fn select_exprs() -> Vec<&'static str> {
        vec![
            "booth_registration.company_name",
            "booth_registration.company_address",
            "booth_registration.company_email",
            "booth_registration.company_contact_number",
            "booth_registration.company_vat",
            "booth_registration.company_contact_person",
            "booth_registration.exhibitor_size",
            "booth_registration.education_option",
            "booth_registration.industry_option",
            "booth_registration.price_before_vat",
            "booth_registration.vat_amount",
        ]
    }

    fn from_row<'a>(mut row: impl Iterator<Item = ValueRef<'a>>) -> ReconstructResult<Self> {
        Ok(Self {
            company: Company::from_row(&mut row)?,
            exhibitor_size: next_converted(&mut row)?,
            education_option: next_converted(&mut row)?,
            industry_option: next_converted(&mut row)?,
            price_before_vat: next_converted(&mut row)?,
            vat_amount: next_converted(&mut row)?,
        })
    }
}

impl JoinedSqlStruct for BoothDetail {
    fn join() -> Join {
        Join {
            table: "booth_registration",
            on: "booth_registration.registration_id == base_registration.id",
        }
    }

    fn key_expr() -> &'static str {
        "booth_registration.registration_id"
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorDetail {
    #[serde(flatten)]
    pub company: Company,
    pub sponsorship_type: String,
    pub competition_pantry_type: String,
    pub partner_tier: String,
    pub base_price: f64,
    pub discount: f64,
    #[serde(rename = "priceBeforeVAT")]
    pub price_before_vat: f64,
    pub vat_amount: f64,
}

impl SqlStruct for SponsorDetail {
    fn required_tables() -> Vec<&'static str> {
        vec!["sponsor_registration"]
    }

    fn select_exprs() -> Vec<&'static str> {
        vec![
            "sponsor_registration.company_name",
            "sponsor_registration.company_address",
            "sponsor_registration.company_email",
            "sponsor_registration.company_contact_number",
            "sponsor_registration.company_vat",
            "sponsor_registration.company_contact_person",
            "sponsor_registration.sponsorship_type",
            "sponsor_registration.competition_pantry_type",
            "sponsor_registration.partner_tier",
            "sponsor_registration.base_price",
            "sponsor_registration.discount",
            "sponsor_registration.price_before_vat",
            "sponsor_registration.vat_amount",
        ]
    }

    fn from_row<'a>(mut row: impl Iterator<Item = ValueRef<'a>>) -> ReconstructResult<Self> {
        Ok(Self {
            company: Company::from_row(&mut row)?,
            sponsorship_type: next_converted(&mut row)?,
            competition_pantry_type: next_converted(&mut row)?,
            partner_tier: next_converted(&mut row)?,
            base_price: next_converted(&mut row)?,
            discount: next_converted(&mut row)?,
            price_before_vat: next_converted(&mut row)?,
            vat_amount: next_converted(&mut row)?,
        })
    }
}

impl JoinedSqlStruct for SponsorDetail {
    fn join() -> Join {
        Join {
            table: "sponsor_registration",
            on: "sponsor_registration.registration_id == base_registration.id",
        }
    }

    fn key_expr() -> &'static str {
        "sponsor_registration.registration_id"
    }
}
