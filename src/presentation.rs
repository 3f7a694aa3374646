//! Everything the dashboard page shows, derived from one fetched list of registrations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    config::Config,
    date_helpers,
    registrations::{Registration, RegistrationDetails},
    routes::api::ApiError,
    sql_interface::types::Company,
};

const NOT_SPECIFIED: &str = "Not specified";
const NOT_AVAILABLE: &str = "N/A";

/// How amounts and dates are shown.
#[derive(Clone, Copy, Debug)]
pub struct Formatting<'a> {
    pub currency_symbol: &'a str,
    pub date_format: &'a str,
}

impl<'a> From<&'a Config> for Formatting<'a> {
    fn from(config: &'a Config) -> Self {
        Self {
            currency_symbol: &config.currency_symbol,
            date_format: &config.date_format,
        }
    }
}

impl Formatting<'_> {
    /// Always two decimals, e.g. `R 1250.00`.
    #[must_use]
    pub fn price(&self, amount: f64) -> String {
        format!("{} {amount:.2}", self.currency_symbol)
    }

    #[must_use]
    pub fn date(&self, timestamp: &DateTime<Utc>) -> String {
        date_helpers::format_date(timestamp, self.date_format)
    }
}

/// Only for fields that are optional. Empty text counts as missing, too.
fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    value
        .filter(|value| !value.is_empty())
        .unwrap_or(placeholder)
        .to_string()
}

/// Why the list couldn't be shown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub status: u16,
    pub message: String,
}

impl From<ApiError> for FetchFailure {
    fn from(err: ApiError) -> Self {
        Self {
            status: err.status().code,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<Registration>),
    Failed(FetchFailure),
}

impl RequestState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Loaded(_) => "loaded",
            Self::Failed(_) => "failed",
        }
    }
}

/// The state of one dashboard page: the request for the list and which registration is opened
/// in the detail dialog.
#[derive(Debug, Default)]
pub struct Dashboard {
    state: RequestState,
    selected: Option<String>,
}

impl Dashboard {
    #[must_use]
    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Marks the list as being fetched. The list is only ever fetched once, so this returns
    /// false and does nothing if it was started before.
    pub fn start_loading(&mut self) -> bool {
        if matches!(self.state, RequestState::Idle) {
            self.state = RequestState::Loading;
            true
        } else {
            log::warn!(
                "Tried to fetch registrations again while being {}",
                self.state.name()
            );
            false
        }
    }

    pub fn finish(&mut self, outcome: Result<Vec<Registration>, FetchFailure>) {
        if !matches!(self.state, RequestState::Loading) {
            log::warn!(
                "Got registrations without fetching them, ignoring (state is {})",
                self.state.name()
            );
            return;
        }

        self.state = match outcome {
            Ok(registrations) => RequestState::Loaded(registrations),
            Err(failure) => {
                log::error!(
                    "Error fetching registrations: {} {}",
                    failure.status,
                    failure.message
                );
                RequestState::Failed(failure)
            }
        };
    }

    #[must_use]
    pub fn registrations(&self) -> &[Registration] {
        match &self.state {
            RequestState::Loaded(registrations) => registrations,
            _ => &[],
        }
    }

    /// Opens the detail dialog for a registration. Unknown IDs are ignored and return false.
    pub fn select(&mut self, id: &str) -> bool {
        if self
            .registrations()
            .iter()
            .any(|registration| registration.id == id)
        {
            self.selected = Some(id.to_string());
            true
        } else {
            log::debug!("Registration '{id}' selected, but it isn't listed");
            false
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Registration> {
        let id = self.selected.as_deref()?;
        self.registrations()
            .iter()
            .find(|registration| registration.id == id)
    }

    #[must_use]
    pub fn rows(&self, formatting: Formatting<'_>) -> Vec<TableRow> {
        self.registrations()
            .iter()
            .map(|registration| TableRow::new(registration, formatting))
            .collect()
    }

    /// Everything the dashboard template needs.
    #[must_use]
    pub fn context(&self, formatting: Formatting<'_>) -> DashboardContext {
        DashboardContext {
            state: self.state.name(),
            failure: match &self.state {
                RequestState::Failed(failure) => Some(failure.clone()),
                _ => None,
            },
            rows: self.rows(formatting),
            detail: self
                .selected()
                .map(|registration| DetailView::new(registration, formatting)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardContext {
    pub state: &'static str,
    pub failure: Option<FetchFailure>,
    pub rows: Vec<TableRow>,
    pub detail: Option<DetailView>,
}

/// A line in the registration table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub id: String,
    /// Opens the detail dialog of this registration.
    pub link: String,
    pub kind: &'static str,
    pub type_label: &'static str,
    pub date: String,
    pub name: String,
    pub email: String,
    pub total_price: String,
}

impl TableRow {
    #[must_use]
    pub fn new(registration: &Registration, formatting: Formatting<'_>) -> Self {
        let kind = registration.details.kind();
        let (name, email) = match &registration.details {
            RegistrationDetails::Individual(billed) => {
                (Some(&billed.detail.name), Some(&billed.detail.email))
            }
            RegistrationDetails::Bulk(billed) => (
                Some(&billed.detail.school_name),
                Some(&billed.detail.contact_person_email),
            ),
            RegistrationDetails::Booth(billed) => (
                Some(&billed.detail.company.company_name),
                Some(&billed.detail.company.company_email),
            ),
            RegistrationDetails::Sponsor(billed) => {
                let company = billed.detail.as_ref().map(|detail| &detail.company);
                (
                    company.map(|company| &company.company_name),
                    company.map(|company| &company.company_email),
                )
            }
        };

        // only sponsor registrations without any details have neither
        let or_missing =
            |value: Option<&String>| value.map_or_else(|| NOT_AVAILABLE.to_string(), Clone::clone);

        Self {
            id: registration.id.clone(),
            link: uri!(crate::routes::dashboard::dashboard(
                selected = Some(registration.id.as_str())
            ))
            .to_string(),
            kind: kind.as_str(),
            type_label: kind.label(),
            date: formatting.date(&registration.created_at),
            name: or_missing(name),
            email: or_missing(email),
            total_price: formatting.price(registration.details.billing().total_price),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

fn field(label: &'static str, value: impl ToString) -> DetailField {
    DetailField {
        label,
        value: value.to_string(),
    }
}

/// All fields of one registration, as shown in the detail dialog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub id: String,
    pub title: String,
    pub fields: Vec<DetailField>,
}

impl DetailView {
    #[must_use]
    pub fn new(registration: &Registration, formatting: Formatting<'_>) -> Self {
        let price = |amount: f64| formatting.price(amount);
        let total_price = field(
            "Total Price",
            price(registration.details.billing().total_price),
        );

        let fields = match &registration.details {
            RegistrationDetails::Individual(billed) => {
                let detail = &billed.detail;
                vec![
                    field("Name", &detail.name),
                    field("ID Number", &detail.id_number),
                    field("Email", &detail.email),
                    field("Contact Number", &detail.contact_number),
                    field("Attendee Type", detail.attendee_type),
                    field(
                        "Member Status",
                        if detail.is_member {
                            "Member"
                        } else {
                            "Non-member"
                        },
                    ),
                    field("Number of Days", detail.number_of_days),
                    field(
                        "Selected Date",
                        or_placeholder(detail.selected_date.as_deref(), NOT_SPECIFIED),
                    ),
                    field("Pricing Type", &detail.selected_pricing),
                    total_price,
                    field("Invoicing Details", &detail.invoicing_details),
                ]
            }
            RegistrationDetails::Bulk(billed) => {
                let detail = &billed.detail;
                vec![
                    field("Organization Type", detail.organization_type),
                    field("School Name", &detail.school_name),
                    field(
                        "VAT Number",
                        or_placeholder(detail.vat_number.as_deref(), NOT_AVAILABLE),
                    ),
                    field("Contact Person", &detail.contact_person_name),
                    field("Contact Email", &detail.contact_person_email),
                    field("Contact Phone", &detail.contact_person_phone),
                    field("Member Students", detail.member_students),
                    field("Non-member Students", detail.non_member_students),
                    field("Member Teachers", detail.member_teachers),
                    field("Non-member Teachers", detail.non_member_teachers),
                    field("Number of Days", detail.number_of_days),
                    field(
                        "Selected Date",
                        or_placeholder(detail.selected_date.as_deref(), NOT_SPECIFIED),
                    ),
                    total_price,
                ]
            }
            RegistrationDetails::Booth(billed) => {
                let detail = &billed.detail;
                let mut fields = company_fields(Some(&detail.company));
                fields.extend([
                    field(
                        "Exhibitor Size",
                        or_placeholder(
                            detail.exhibitor_size.map(|size| size.as_str()),
                            NOT_AVAILABLE,
                        ),
                    ),
                    field(
                        "Education Option",
                        or_placeholder(detail.education_option.as_deref(), NOT_AVAILABLE),
                    ),
                    field(
                        "Industry Option",
                        or_placeholder(detail.industry_option.as_deref(), NOT_AVAILABLE),
                    ),
                    field("Price Before VAT", price(detail.price_before_vat)),
                    field("VAT Amount", price(detail.vat_amount)),
                    total_price,
                ]);
                fields
            }
            RegistrationDetails::Sponsor(billed) => {
                let detail = billed.detail.as_ref();
                let text = |value: Option<&String>| {
                    value.map_or_else(|| NOT_AVAILABLE.to_string(), Clone::clone)
                };
                let amount = |value: Option<f64>| {
                    value.map_or_else(|| NOT_AVAILABLE.to_string(), price)
                };

                let mut fields = company_fields(detail.map(|detail| &detail.company));
                fields.extend([
                    field(
                        "Sponsorship Type",
                        text(detail.map(|detail| &detail.sponsorship_type)),
                    ),
                    field(
                        "Competition Pantry",
                        text(detail.map(|detail| &detail.competition_pantry_type)),
                    ),
                    field(
                        "Partner Tier",
                        text(detail.map(|detail| &detail.partner_tier)),
                    ),
                    field("Base Price", amount(detail.map(|detail| detail.base_price))),
                    field("Discount", amount(detail.map(|detail| detail.discount))),
                    field(
                        "Price Before VAT",
                        amount(detail.map(|detail| detail.price_before_vat)),
                    ),
                    field("VAT Amount", amount(detail.map(|detail| detail.vat_amount))),
                    total_price,
                ]);
                fields
            }
        };

        Self {
            id: registration.id.clone(),
            title: format!(
                "{} Registration Details",
                registration.details.kind().label()
            ),
            fields,
        }
    }
}

/// The company is only missing for sponsor registrations without any details.
fn company_fields(company: Option<&Company>) -> Vec<DetailField> {
    let text =
        |value: Option<&String>| value.map_or_else(|| NOT_AVAILABLE.to_string(), Clone::clone);

    vec![
        field("Company Name", text(company.map(|c| &c.company_name))),
        field("Company Address", text(company.map(|c| &c.company_address))),
        field("Company Email", text(company.map(|c| &c.company_email))),
        field(
            "Contact Number",
            text(company.map(|c| &c.company_contact_number)),
        ),
        field("VAT Number", text(company.map(|c| &c.company_vat))),
        field(
            "Contact Person",
            text(company.map(|c| &c.company_contact_person)),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use rocket::http::{uri::Origin, Status};

    use super::*;
    use crate::{
        registrations::{classify, Discrimination},
        sql_interface::{
            self,
            fixtures::{self, at, init_db},
        },
    };

    const FORMATTING: Formatting<'static> = Formatting {
        currency_symbol: "R",
        date_format: "%Y/%m/%d",
    };

    fn registrations_with(seed: impl FnOnce(&rusqlite::Connection)) -> Vec<Registration> {
        let mut conn = init_db();
        seed(&conn);
        sql_interface::list_registrations(&mut conn)
            .unwrap()
            .into_iter()
            .map(|stored| classify(stored, Discrimination::LegacySponsorFallback).unwrap())
            .collect()
    }

    fn loaded(registrations: Vec<Registration>) -> Dashboard {
        let mut dashboard = Dashboard::default();
        assert!(dashboard.start_loading());
        dashboard.finish(Ok(registrations));
        dashboard
    }

    fn value_of<'a>(view: &'a DetailView, label: &str) -> &'a str {
        &view
            .fields
            .iter()
            .find(|field| field.label == label)
            .unwrap_or_else(|| panic!("no field '{label}' in {view:#?}"))
            .value
    }

    #[test]
    fn request_states() {
        let mut dashboard = Dashboard::default();
        assert!(matches!(dashboard.state(), RequestState::Idle));

        // results without a request are dropped
        dashboard.finish(Ok(Vec::new()));
        assert!(matches!(dashboard.state(), RequestState::Idle));

        assert!(dashboard.start_loading());
        assert!(matches!(dashboard.state(), RequestState::Loading));
        assert!(!dashboard.start_loading());

        dashboard.finish(Err(ApiError::FetchFailed.into()));
        assert_eq!(
            dashboard.context(FORMATTING).failure,
            Some(FetchFailure {
                status: 500,
                message: "Failed to fetch registrations".to_string(),
            })
        );
        assert!(dashboard.registrations().is_empty());

        // no retry
        assert!(!dashboard.start_loading());
    }

    #[test]
    fn not_found_is_a_failure() {
        let failure = FetchFailure::from(ApiError::NoRegistrations);
        assert_eq!(failure.status, Status::NotFound.code);
        assert_eq!(failure.message, "No registrations found");
    }

    #[test]
    fn table_rows() {
        let dashboard = loaded(registrations_with(fixtures::seed_one_of_each));

        let rows = dashboard.rows(FORMATTING);
        let summary: Vec<_> = rows
            .iter()
            .map(|row| {
                (
                    row.type_label,
                    row.name.as_str(),
                    row.email.as_str(),
                    row.total_price.as_str(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Sponsor", "Dave Foods", "dave@non-existent-domain", "R 20700.00"),
                ("Booth", "Carol Kitchens", "carol@non-existent-domain", "R 1150.00"),
                ("Bulk", "Cape Culinary School", "bob@non-existent-domain", "R 3210.50"),
                ("Individual", "Alice Beta", "alice@non-existent-domain", "R 450.00"),
            ]
        );
        assert!(rows.iter().all(|row| row.date == "2024/03/01"));
    }

    #[test]
    fn selection() {
        let mut dashboard = loaded(registrations_with(fixtures::seed_one_of_each));

        assert!(!dashboard.select("does-not-exist"));
        assert!(dashboard.context(FORMATTING).detail.is_none());

        assert!(dashboard.select("bulk-1"));
        let detail = dashboard.context(FORMATTING).detail.unwrap();
        assert_eq!(detail.title, "Bulk Registration Details");
        assert_eq!(value_of(&detail, "VAT Number"), "N/A");
        assert_eq!(value_of(&detail, "Selected Date"), "2024-05-02");
        assert_eq!(value_of(&detail, "Organization Type"), "culinary");
        assert_eq!(value_of(&detail, "Non-member Students"), "3");
        assert_eq!(value_of(&detail, "Total Price"), "R 3210.50");
        assert_eq!(dashboard.rows(FORMATTING).len(), 4);
    }

    #[test]
    fn row_links_survive_any_id() {
        let id = "a+b&c=d#1%";
        let dashboard = loaded(registrations_with(|conn| {
            fixtures::insert_base(conn, id, at(10), 1150.0);
            fixtures::insert_booth(conn, id, None);
        }));

        let rows = dashboard.rows(FORMATTING);
        let origin = Origin::parse(&rows[0].link).unwrap();
        assert_eq!(origin.path().as_str(), "/");
        let query: Vec<_> = origin.query().unwrap().segments().collect();
        assert_eq!(query, vec![("selected", id)]);
    }

    #[test]
    fn empty_company_fields_are_shown_as_they_are() {
        let mut dashboard = loaded(registrations_with(|conn| {
            fixtures::insert_base(conn, "booth-1", at(10), 1150.0);
            fixtures::insert_booth(conn, "booth-1", None);
            conn.execute(
                "UPDATE booth_registration SET company_name = '', company_email = '', company_vat = ''",
                [],
            )
            .unwrap();
        }));

        let rows = dashboard.rows(FORMATTING);
        assert_eq!(rows[0].name, "");
        assert_eq!(rows[0].email, "");

        assert!(dashboard.select("booth-1"));
        let detail = dashboard.context(FORMATTING).detail.unwrap();
        assert_eq!(value_of(&detail, "Company Name"), "");
        assert_eq!(value_of(&detail, "VAT Number"), "");
        // optional ones still get placeholders
        assert_eq!(value_of(&detail, "Education Option"), "N/A");
    }

    #[test]
    fn booth_without_exhibitor_size() {
        for size in [None, Some(sql_interface::types::ExhibitorSize::Unselected)] {
            let mut dashboard = loaded(registrations_with(|conn| {
                fixtures::insert_base(conn, "booth-1", at(10), 1150.0);
                fixtures::insert_booth(conn, "booth-1", size);
            }));
            assert!(dashboard.select("booth-1"));

            let detail = dashboard.context(FORMATTING).detail.unwrap();
            assert_eq!(detail.title, "Booth Registration Details");
            assert_eq!(value_of(&detail, "Exhibitor Size"), "N/A");
            assert_eq!(value_of(&detail, "Education Option"), "N/A");
            assert_eq!(value_of(&detail, "Industry Option"), "equipment");
            assert_eq!(value_of(&detail, "Price Before VAT"), "R 1000.00");
            assert_eq!(value_of(&detail, "VAT Amount"), "R 150.00");
        }
    }

    #[test]
    fn individual_details() {
        let mut dashboard = loaded(registrations_with(|conn| {
            fixtures::insert_base(conn, "individual-1", at(8), 450.0);
            fixtures::insert_individual(conn, "individual-1", None);
        }));
        assert!(dashboard.select("individual-1"));

        let detail = dashboard.context(FORMATTING).detail.unwrap();
        let labels: Vec<_> = detail.fields.iter().map(|field| field.label).collect();
        assert_eq!(
            labels,
            vec![
                "Name",
                "ID Number",
                "Email",
                "Contact Number",
                "Attendee Type",
                "Member Status",
                "Number of Days",
                "Selected Date",
                "Pricing Type",
                "Total Price",
                "Invoicing Details",
            ]
        );
        assert_eq!(value_of(&detail, "Selected Date"), "Not specified");
        assert_eq!(value_of(&detail, "Member Status"), "Member");
        assert_eq!(value_of(&detail, "Attendee Type"), "student");
    }

    #[test]
    fn sponsor_fallback_renders_placeholders() {
        let mut dashboard = loaded(registrations_with(|conn| {
            fixtures::insert_base(conn, "orphan", at(8), 99.5);
        }));

        let rows = dashboard.rows(FORMATTING);
        assert_eq!(rows[0].type_label, "Sponsor");
        assert_eq!(rows[0].name, "N/A");
        assert_eq!(rows[0].email, "N/A");

        assert!(dashboard.select("orphan"));
        let detail = dashboard.context(FORMATTING).detail.unwrap();
        assert_eq!(value_of(&detail, "Company Name"), "N/A");
        assert_eq!(value_of(&detail, "Base Price"), "N/A");
        assert_eq!(value_of(&detail, "Total Price"), "R 99.50");
    }

    #[test]
    fn custom_currency() {
        let formatting = Formatting {
            currency_symbol: "€",
            date_format: "%d.%m.%Y",
        };
        assert_eq!(formatting.price(0.5), "€ 0.50");
        assert_eq!(formatting.date(&at(8)), "01.03.2024");
    }
}
