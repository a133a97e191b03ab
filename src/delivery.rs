use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

/// Opening hours and slot rules used to offer delivery windows at checkout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliverySchedule {
    /// Start of the first slot of the day.
    pub opening: NaiveTime,
    /// No slot may end after this time.
    pub closing: NaiveTime,
    pub slot_minutes: u32,
    /// Minimum time between now and the start of a bookable slot.
    pub lead_minutes: u32,
    /// Number of calendar days offered, today included.
    pub days_ahead: u32,
    pub closed_days: Vec<Weekday>,
}

impl Default for DeliverySchedule {
    /// 09:00 to 18:00 in one-hour slots, two hours' notice, a week ahead,
    /// closed on Sundays.
    fn default() -> Self {
        Self {
            opening: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            closing: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            slot_minutes: 60,
            lead_minutes: 120,
            days_ahead: 7,
            closed_days: vec![Weekday::Sun],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliverySlot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DeliverySlot {
    /// Stable identifier sent to the backend, e.g. `2024-10-14T09:00`.
    pub fn id(&self) -> String {
        format!("{}T{}", self.date.format("%Y-%m-%d"), self.start.format("%H:%M"))
    }

    /// Label shown in the slot picker, e.g. `Seg 14/10, 09:00 - 10:00`.
    pub fn label(&self) -> String {
        format!(
            "{} {}, {} - {}",
            weekday_abbr(self.date.weekday()),
            self.date.format("%d/%m"),
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

impl DeliverySchedule {
    /// Lists every bookable slot from `now` on, in chronological order.
    pub fn slots(&self, now: NaiveDateTime) -> Vec<DeliverySlot> {
        let mut slots = Vec::new();
        if self.slot_minutes == 0 {
            return slots;
        }

        let earliest = now + Duration::minutes(i64::from(self.lead_minutes));
        let open = minutes_of(self.opening);
        let close = minutes_of(self.closing);

        for offset in 0..self.days_ahead {
            let Some(date) = now.date().checked_add_days(chrono::Days::new(u64::from(offset)))
            else {
                break;
            };
            if self.closed_days.contains(&date.weekday()) {
                continue;
            }

            let mut start = open;
            while start + self.slot_minutes <= close {
                let end = start + self.slot_minutes;
                if let (Some(start_time), Some(end_time)) = (time_at(start), time_at(end)) {
                    if date.and_time(start_time) >= earliest {
                        slots.push(DeliverySlot {
                            date,
                            start: start_time,
                            end: end_time,
                        });
                    }
                }
                start = end;
            }
        }

        slots
    }
}

fn minutes_of(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

fn time_at(minutes: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

fn weekday_abbr(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Seg",
        Weekday::Tue => "Ter",
        Weekday::Wed => "Qua",
        Weekday::Thu => "Qui",
        Weekday::Fri => "Sex",
        Weekday::Sat => "Sáb",
        Weekday::Sun => "Dom",
    }
}
