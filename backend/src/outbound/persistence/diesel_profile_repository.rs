//! PostgreSQL-backed `ProfileRepository`.

use std::ops::RangeInclusive;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{ProfileRepository, ProfileRepositoryError};
use crate::domain::{
    Affiliation, DisplayName, Email, PhoneNumber, Profile, ProfileIdentity, RegNumber, Role,
    StudentDetails, UserId,
};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewProfileRow, ProfileContactUpdate, ProfileRow};
use super::pool::{DbPool, PoolError};
use super::schema::profiles;

#[derive(Clone)]
pub struct DieselProfileRepository {
    pool: DbPool,
}

impl DieselProfileRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProfileRepositoryError {
    map_basic_pool_error(error, ProfileRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProfileRepositoryError {
    if is_unique_violation(&error) {
        return ProfileRepositoryError::duplicate("email or registration number in use");
    }
    map_basic_diesel_error(
        error,
        ProfileRepositoryError::query,
        ProfileRepositoryError::connection,
    )
}

fn corrupt(field: &str, err: impl std::fmt::Display) -> ProfileRepositoryError {
    ProfileRepositoryError::query(format!("stored profile has invalid {field}: {err}"))
}

fn row_to_profile(row: ProfileRow) -> Result<Profile, ProfileRepositoryError> {
    let identity = ProfileIdentity {
        user_id: UserId::from_uuid(row.user_id),
        email: Email::new(&row.email).map_err(|e| corrupt("email", e))?,
        display_name: DisplayName::new(row.display_name).map_err(|e| corrupt("display_name", e))?,
        phone: row
            .phone
            .map(PhoneNumber::new)
            .transpose()
            .map_err(|e| corrupt("phone", e))?,
        affiliation: Affiliation {
            department: row.department,
            faculty: row.faculty,
        },
    };
    let role: Role = row.role.parse().map_err(|e| corrupt("role", e))?;
    match role {
        Role::Student => {
            let (Some(reg_number), Some(year_of_study), Some(semester)) =
                (row.reg_number, row.year_of_study, row.semester)
            else {
                return Err(corrupt("student details", "missing columns"));
            };
            Ok(Profile::student(
                identity,
                StudentDetails {
                    reg_number: RegNumber::new(reg_number).map_err(|e| corrupt("reg_number", e))?,
                    year_of_study,
                    semester: u8::try_from(semester).map_err(|e| corrupt("semester", e))?,
                },
            ))
        }
        Role::Lecturer => Ok(Profile::lecturer(
            identity,
            row.designation.unwrap_or_default(),
        )),
    }
}

fn rows_to_profiles(rows: Vec<ProfileRow>) -> Result<Vec<Profile>, ProfileRepositoryError> {
    rows.into_iter().map(row_to_profile).collect()
}

fn reg_value(reg_number: &RegNumber) -> Result<i64, ProfileRepositoryError> {
    i64::try_from(reg_number.value())
        .map_err(|_| ProfileRepositoryError::query("registration number out of range"))
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn create(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        let details = profile.student_details();
        let row = NewProfileRow {
            user_id: *profile.user_id().as_uuid(),
            email: profile.email().as_ref(),
            display_name: profile.display_name().as_ref(),
            phone: profile.phone().map(AsRef::as_ref),
            role: profile.role().as_str(),
            department: &profile.affiliation().department,
            faculty: &profile.affiliation().faculty,
            reg_number: profile.reg_number().map(AsRef::as_ref),
            reg_value: profile.reg_number().map(reg_value).transpose()?,
            year_of_study: details.map(|d| d.year_of_study),
            semester: details.map(|d| i16::from(d.semester)),
            designation: profile.designation(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(profiles::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        let changes = ProfileContactUpdate {
            display_name: profile.display_name().as_ref(),
            phone: profile.phone().map(AsRef::as_ref),
            updated_at: DefaultClock.utc(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(profiles::table.find(profile.user_id().as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(ProfileRepositoryError::query("record not found"));
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        profiles::table
            .find(user_id.as_uuid())
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_profile)
            .transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        profiles::table
            .filter(profiles::email.eq(email.as_ref()))
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_profile)
            .transpose()
    }

    async fn find_by_reg_number(
        &self,
        reg_number: &RegNumber,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        profiles::table
            .filter(profiles::reg_number.eq(reg_number.as_ref()))
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_profile)
            .transpose()
    }

    async fn find_by_reg_numbers(
        &self,
        reg_numbers: &[RegNumber],
    ) -> Result<Vec<Profile>, ProfileRepositoryError> {
        if reg_numbers.is_empty() {
            return Ok(Vec::new());
        }
        let wanted: Vec<&str> = reg_numbers.iter().map(AsRef::as_ref).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = profiles::table
            .filter(profiles::reg_number.eq_any(wanted))
            .order(profiles::reg_number.asc())
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_profiles(rows)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = profiles::table
            .filter(profiles::role.eq(role.as_str()))
            .order(profiles::display_name.asc())
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_profiles(rows)
    }

    async fn latest_reg_number_in(
        &self,
        bounds: RangeInclusive<u64>,
    ) -> Result<Option<RegNumber>, ProfileRepositoryError> {
        let to_i64 = |value: u64| {
            i64::try_from(value)
                .map_err(|_| ProfileRepositoryError::query("registration range out of bounds"))
        };
        let (low, high) = (to_i64(*bounds.start())?, to_i64(*bounds.end())?);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let latest: Option<Option<String>> = profiles::table
            .filter(profiles::reg_value.between(low, high))
            .order(profiles::reg_value.desc())
            .select(profiles::reg_number)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        latest
            .flatten()
            .map(|raw| RegNumber::new(raw).map_err(|e| corrupt("reg_number", e)))
            .transpose()
    }
}
