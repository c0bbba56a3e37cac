use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;
pub const UPCOMING_BIRTHDAY_DAYS: u64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub birthday: NaiveDate,
    pub additional_info: Option<String>,
    #[serde(skip)]
    pub user_id: i64,
}

/// Mutable contact fields, used for both create and full replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactBody {
    #[validate(length(min = 1, max = 15))]
    pub name: String,
    #[validate(length(min = 1, max = 15))]
    pub surname: String,
    #[validate(length(min = 1, max = 30))]
    pub email: String,
    #[validate(length(min = 1, max = 15))]
    pub phone: String,
    pub birthday: NaiveDate,
    #[serde(default)]
    pub additional_info: Option<String>,
}

/// Columns that support equality search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Surname,
    Email,
}

impl ContactField {
    pub fn column(&self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Surname => "surname",
            ContactField::Email => "email",
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Pagination {
    pub fn normalized(self) -> Self {
        Self {
            skip: self.skip.max(0),
            limit: self.limit.clamp(0, MAX_PAGE_LIMIT),
        }
    }
}

/// Inclusive month/day range `[reference, reference + days]`, year independent.
///
/// Bounds are `MM-DD` strings so they compare the same way SQLite's
/// `strftime('%m-%d', birthday)` does. When the range crosses New Year the
/// end sorts before the start and the range is treated as two pieces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdayWindow {
    pub start: String,
    pub end: String,
}

impl BirthdayWindow {
    pub fn starting(reference: NaiveDate, days: u64) -> Self {
        let end = reference
            .checked_add_days(Days::new(days))
            .unwrap_or(NaiveDate::MAX);
        Self {
            start: month_day(reference),
            end: month_day(end),
        }
    }

    pub fn upcoming_week(reference: NaiveDate) -> Self {
        Self::starting(reference, UPCOMING_BIRTHDAY_DAYS)
    }

    pub fn wraps_year(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, birthday: NaiveDate) -> bool {
        let md = month_day(birthday);
        if self.wraps_year() {
            md >= self.start || md <= self.end
        } else {
            md >= self.start && md <= self.end
        }
    }
}

fn month_day(date: NaiveDate) -> String {
    date.format("%m-%d").to_string()
}
