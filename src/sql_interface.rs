#![allow(clippy::module_name_repetitions)]

pub mod sql_struct;
pub mod statement;
pub mod types;


use rusqlite::Connection;

use self::{
    sql_struct::ReconstructResult,
    statement::{OrderBy, Select},
    types::{BaseRegistration, BoothDetail, BulkDetail, IndividualDetail, SponsorDetail},
};

pub use self::sql_struct::ReconstructError;

pub enum DatabaseStatus {
    AlreadyExistent,
    Created,
}

/// Creates all tables in case the database doesn't contain the registration table yet.
pub fn init_db_if_necessary(conn: &mut Connection) -> rusqlite::Result<DatabaseStatus> {
    let existing: i64 = conn.query_row(
        "SELECT COUNT(*)
        FROM sqlite_master
        WHERE type == 'table' AND name == 'base_registration'",
        [],
        |row| row.get(0),
    )?;

    if existing == 0 {
        conn.execute_batch(include_str!("./sql_interface/init_db.sql"))?;
        Ok(DatabaseStatus::Created)
    } else {
        Ok(DatabaseStatus::AlreadyExistent)
    }
}

/// A registration as found in the database, with all the details which could be attached to it.
///
/// Nothing in the schema prevents several (or zero) details from being present, which is left to
/// [`crate::registrations::classify`] to deal with.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredRegistration {
    pub base: BaseRegistration,
    pub individual: Option<IndividualDetail>,
    pub bulk: Option<BulkDetail>,
    pub booth: Option<BoothDetail>,
    pub sponsor: Option<SponsorDetail>,
}

type StoredRow = (
    BaseRegistration,
    Option<IndividualDetail>,
    Option<BulkDetail>,
    Option<BoothDetail>,
    Option<SponsorDetail>,
);

impl From<StoredRow> for StoredRegistration {
    fn from((base, individual, bulk, booth, sponsor): StoredRow) -> Self {
        Self {
            base,
            individual,
            bulk,
            booth,
            sponsor,
        }
    }
}

impl StoredRegistration {
    /// How many of the details are actually attached.
    #[must_use]
    pub fn detail_count(&self) -> usize {
        [
            self.individual.is_some(),
            self.bulk.is_some(),
            self.booth.is_some(),
            self.sponsor.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

/// Timestamps written by other tools may use `T`/`Z` instead of ` `/`+00:00`, which breaks
/// comparing them as text.
const LIST_ORDER: OrderBy = OrderBy::Descending("julianday(base_registration.created_at)");

/// Lists all registrations together with their details, newest first.
pub fn list_registrations(conn: &mut Connection) -> ReconstructResult<Vec<StoredRegistration>> {
    let mut query = Select {
        conn,
        order: Some(LIST_ORDER),
    };
    let rows: Vec<StoredRow> = query.run()?;

    Ok(rows.into_iter().map(StoredRegistration::from).collect())
}

#[cfg(test)]
pub mod fixtures {
    //! Known registrations to seed test databases with.

    use chrono::{DateTime, TimeZone, Utc};
    use rusqlite::{named_params, Connection};

    use super::types::{AttendeeType, ExhibitorSize, NumberOfDays, OrganizationType};

    pub fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 30, 0).unwrap()
    }

    /// Creates a fresh empty database with tables defined.
    pub fn init_db() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        super::init_db_if_necessary(&mut conn).unwrap();
        conn
    }

    pub fn insert_base(conn: &Connection, id: &str, created_at: DateTime<Utc>, total_price: f64) {
        conn.execute(
            "INSERT INTO base_registration(id, created_at, payment_status, reference, total_price)
            VALUES (:id, :created_at, 'paid', :reference, :total_price)",
            named_params! {
                ":id": id,
                ":created_at": created_at,
                ":reference": format!("REF-{id}"),
                ":total_price": total_price,
            },
        )
        .unwrap();
    }

    pub fn insert_individual(conn: &Connection, id: &str, selected_date: Option<&str>) {
        conn.execute(
            "INSERT INTO individual_registration(
                registration_id, name, id_number, email, contact_number, invoicing_details,
                attendee_type, is_member, number_of_days, selected_date, selected_pricing
            )
            VALUES (
                :id, 'Alice Beta', '9001015009087', 'alice@non-existent-domain', '0821234567',
                'Alice Beta, 1 Long Street', :attendee_type, true, :days, :selected_date, 'early-bird'
            )",
            named_params! {
                ":id": id,
                ":attendee_type": AttendeeType::Student,
                ":days": NumberOfDays::One,
                ":selected_date": selected_date,
            },
        )
        .unwrap();
    }

    pub fn insert_bulk(conn: &Connection, id: &str) {
        conn.execute(
            "INSERT INTO bulk_registration(
                registration_id, organization_type, school_name, vat_number, contact_person_name,
                contact_person_email, contact_person_phone, member_students, non_member_students,
                member_teachers, non_member_teachers, number_of_days, selected_date
            )
            VALUES (
                :id, :organization_type, 'Cape Culinary School', NULL, 'Bob Echo',
                'bob@non-existent-domain', '0217654321', 12, 3, 2, 1, :days, '2024-05-02'
            )",
            named_params! {
                ":id": id,
                ":organization_type": OrganizationType::Culinary,
                ":days": NumberOfDays::Two,
            },
        )
        .unwrap();
    }

    pub fn insert_booth(conn: &Connection, id: &str, exhibitor_size: Option<ExhibitorSize>) {
        conn.execute(
            "INSERT INTO booth_registration(
                registration_id, exhibitor_size, education_option, industry_option, company_name,
                company_address, company_email, company_contact_number, company_vat,
                company_contact_person, price_before_vat, vat_amount
            )
            VALUES (
                :id, :exhibitor_size, NULL, 'equipment', 'Carol Kitchens',
                '2 Short Street', 'carol@non-existent-domain', '0111111111', '4000000001',
                'Carol Delta', 1000.0, 150.0
            )",
            named_params! {
                ":id": id,
                ":exhibitor_size": exhibitor_size,
            },
        )
        .unwrap();
    }

    pub fn insert_sponsor(conn: &Connection, id: &str) {
        conn.execute(
            "INSERT INTO sponsor_registration(
                registration_id, sponsorship_type, competition_pantry_type, partner_tier,
                company_name, company_address, company_email, company_contact_number, company_vat,
                company_contact_person, base_price, discount, price_before_vat, vat_amount
            )
            VALUES (
                :id, 'competition', 'dry goods', 'gold', 'Dave Foods', '3 Middle Road',
                'dave@non-existent-domain', '0122222222', '4000000002', 'Dave Foxtrot',
                20000.0, 2000.0, 18000.0, 2700.0
            )",
            named_params! { ":id": id },
        )
        .unwrap();
    }

    /// Seeds one registration of each kind, the individual one being the oldest and the sponsor
    /// one the newest.
    pub fn seed_one_of_each(conn: &Connection) {
        insert_base(conn, "individual-1", at(8), 450.0);
        insert_individual(conn, "individual-1", None);

        insert_base(conn, "bulk-1", at(9), 3210.5);
        insert_bulk(conn, "bulk-1");

        insert_base(conn, "booth-1", at(10), 1150.0);
        insert_booth(conn, "booth-1", None);

        insert_base(conn, "sponsor-1", at(11), 20700.0);
        insert_sponsor(conn, "sponsor-1");
    }
}
