//! Calendar time-series sections over the full play history.

use crate::aggregate::{hour_series, round1, round2, sum_by, weekday_series};
use crate::events::{self, PlayEvent, DOW_NAMES};
use crate::report::models::{
    DailyListening, DayOfWeek, HeatmapCell, HourOfDay, MonthlyListening, YearlyListening,
};

pub fn daily_listening(plays: &[PlayEvent]) -> Vec<DailyListening> {
    sum_by(plays.iter(), |p| events::day_key(&p.ts), |p| p.hours())
        .into_iter()
        .map(|(date, hours)| DailyListening { date, hours: round2(hours) })
        .collect()
}

pub fn monthly_listening(plays: &[PlayEvent]) -> Vec<MonthlyListening> {
    sum_by(plays.iter(), |p| events::month_key(&p.ts), |p| p.hours())
        .into_iter()
        .map(|(month, hours)| MonthlyListening { month, hours: round1(hours) })
        .collect()
}

pub fn yearly_listening(plays: &[PlayEvent]) -> Vec<YearlyListening> {
    sum_by(plays.iter(), |p| events::year_of(&p.ts), |p| p.hours())
        .into_iter()
        .map(|(year, hours)| YearlyListening { year, hours: round1(hours) })
        .collect()
}

pub fn hour_of_day(plays: &[PlayEvent]) -> Vec<HourOfDay> {
    let sums = sum_by(plays.iter(), |p| events::hour_of(&p.ts), |p| p.hours());
    hour_series(&sums)
        .into_iter()
        .map(|(hour, hours)| HourOfDay { hour, hours: round1(hours) })
        .collect()
}

pub fn day_of_week(plays: &[PlayEvent]) -> Vec<DayOfWeek> {
    let sums = sum_by(plays.iter(), |p| events::weekday_index(&p.ts), |p| p.hours());
    weekday_series(&sums)
        .into_iter()
        .map(|(day, hours)| DayOfWeek {
            day: DOW_NAMES[day].to_string(),
            hours: round1(hours),
        })
        .collect()
}

/// 7x24 day-of-week by hour-of-day grid, fully enumerated.
pub fn heatmap(plays: &[PlayEvent]) -> Vec<HeatmapCell> {
    let sums = sum_by(
        plays.iter(),
        |p| (events::weekday_index(&p.ts), events::hour_of(&p.ts)),
        |p| p.hours(),
    );
    let mut cells = Vec::with_capacity(7 * 24);
    for day in 0..7 {
        for hour in 0..24 {
            cells.push(HeatmapCell {
                day: DOW_NAMES[day].to_string(),
                day_index: day as u32,
                hour,
                hours: round2(sums.get(&(day, hour)).copied().unwrap_or(0.0)),
            });
        }
    }
    cells
}
