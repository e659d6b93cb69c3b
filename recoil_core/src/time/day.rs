use chrono::{Datelike, Local, NaiveDate};
use recoil_schema::DayNumber;

/// Current local date as `YYYYMMDD`. Practice days follow the player's wall clock.
pub fn today() -> DayNumber {
    day_number(Local::now().date_naive())
}

pub fn day_number(date: NaiveDate) -> DayNumber {
    (date.year() as u32 * 100 + date.month()) * 100 + date.day()
}

/// `20210430` -> `"2021-04-30"`.
pub fn format_day(day: DayNumber) -> String {
    let m = day / 100;
    format!("{}-{:02}-{:02}", m / 100, m % 100, day % 100)
}
