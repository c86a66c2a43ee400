//! Text rendering shared by the commands and the menu.

use sfms_core::{Goal, NutritionEntry, Report, Workout};
use std::io::{self, Write};

use crate::chart::{bar_chart, progress_bar};

const CHART_WIDTH: usize = 30;

pub fn write_workouts(out: &mut impl Write, workouts: &[Workout]) -> io::Result<()> {
    for workout in workouts {
        writeln!(out, "{}", workout)?;
    }
    writeln!(out, "\nTotal: {} workout(s)", workouts.len())
}

pub fn write_meals(out: &mut impl Write, meals: &[NutritionEntry]) -> io::Result<()> {
    for meal in meals {
        writeln!(out, "{}", meal)?;
    }
    writeln!(out, "\nTotal: {} meal(s)", meals.len())
}

pub fn write_goals(out: &mut impl Write, goals: &[Goal]) -> io::Result<()> {
    for goal in goals {
        writeln!(out, "{}", goal)?;
        writeln!(out, "  {}", progress_bar(goal.progress_percent(), 20))?;
    }
    writeln!(out, "\nTotal: {} goal(s)", goals.len())
}

/// Writes the summary sections of a report, followed by charts when asked.
pub fn write_report(out: &mut impl Write, report: &Report, charts: bool) -> io::Result<()> {
    writeln!(out, "Report for {} ({})", report.user_id, report.range)?;
    writeln!(out, "{}", "=".repeat(60))?;

    let w = &report.workouts;
    writeln!(out, "\nWorkouts")?;
    writeln!(out, "{}", "-".repeat(60))?;
    writeln!(out, "  Sessions:        {}", w.count)?;
    writeln!(out, "  Total duration:  {} min", w.total_minutes)?;
    writeln!(out, "  Average:         {:.1} min", w.average_minutes)?;
    writeln!(out, "  Calories burned: {:.0} kcal", w.total_calories)?;
    for t in &w.by_type {
        writeln!(
            out,
            "    {:10} {:>3} x {:>5} min {:>7.0} kcal",
            t.workout_type, t.count, t.minutes, t.calories
        )?;
    }

    let n = &report.nutrition;
    writeln!(out, "\nNutrition")?;
    writeln!(out, "{}", "-".repeat(60))?;
    writeln!(out, "  Entries:         {}", n.entries)?;
    writeln!(out, "  {}", n.totals)?;
    writeln!(out, "  Daily average:   {:.0} kcal", n.average_daily_calories)?;

    writeln!(out, "\nGoals")?;
    writeln!(out, "{}", "-".repeat(60))?;
    if report.goals.is_empty() {
        writeln!(out, "  No goals set")?;
    }
    for g in &report.goals {
        let status = if g.completed { "done" } else { "open" };
        writeln!(
            out,
            "  {:18} {:.0}/{:.0} by {} [{}]",
            g.metric, g.progress, g.target_value, g.deadline, status
        )?;
        writeln!(out, "    {}", progress_bar(g.percent, 20))?;
    }

    if charts {
        let minutes: Vec<(String, f64)> = report
            .daily
            .iter()
            .map(|d| (d.date.to_string(), d.minutes as f64))
            .collect();
        let burned: Vec<(String, f64)> = report
            .daily
            .iter()
            .map(|d| (d.date.to_string(), d.calories_burned))
            .collect();
        let consumed: Vec<(String, f64)> = report
            .daily
            .iter()
            .map(|d| (d.date.to_string(), d.calories_consumed))
            .collect();

        writeln!(out)?;
        write!(out, "{}", bar_chart("Minutes exercised per day", &minutes, CHART_WIDTH))?;
        writeln!(out)?;
        write!(out, "{}", bar_chart("Calories burned per day", &burned, CHART_WIDTH))?;
        writeln!(out)?;
        write!(out, "{}", bar_chart("Calories consumed per day", &consumed, CHART_WIDTH))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sfms_core::{DateRange, WorkoutType};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 10, d).unwrap()
    }

    #[test]
    fn test_write_report_with_charts() {
        let workouts = vec![
            Workout::new("tester", WorkoutType::Running, 20, day(1), 229.0),
            Workout::new("tester", WorkoutType::Running, 40, day(2), 457.0),
        ];
        let meals: Vec<NutritionEntry> = Vec::new();
        let goals: Vec<Goal> = Vec::new();
        let range = DateRange::new(day(1), day(7)).unwrap();
        let report = Report::compute("tester", range, &workouts, &meals, &goals);

        let mut out = Vec::new();
        write_report(&mut out, &report, true).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Report for tester (2023-10-01 to 2023-10-07)"));
        assert!(text.contains("Total duration:  60 min"));
        assert!(text.contains("Average:         30.0 min"));
        assert!(text.contains("No goals set"));
        assert!(text.contains("Minutes exercised per day"));
        assert!(text.contains("2023-10-02 | ##############################"));
    }

    #[test]
    fn test_write_workouts_counts() {
        let workouts = vec![Workout::new("tester", WorkoutType::Yoga, 45, day(3), 131.0)];
        let mut out = Vec::new();
        write_workouts(&mut out, &workouts).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("2023-10-03"));
        assert!(text.contains("Total: 1 workout(s)"));
    }
}
