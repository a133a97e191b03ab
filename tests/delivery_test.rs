use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use talho::delivery::DeliverySchedule;

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    // October 2024; the 14th is a Monday
    NaiveDate::from_ymd_opt(2024, 10, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

#[test]
fn offers_a_week_of_hourly_slots_after_the_lead_time() {
    let slots = DeliverySchedule::default().slots(at(14, 8, 0));

    // Monday from 10:00 (8 slots), Tuesday to Saturday full days (5 x 9)
    assert_eq!(slots.len(), 8 + 5 * 9);
    assert!(slots.iter().all(|s| s.date.weekday() != Weekday::Sun));

    let first = &slots[0];
    assert_eq!(first.id(), "2024-10-14T10:00");
    assert_eq!(first.label(), "Seg 14/10, 10:00 - 11:00");

    let last = slots.last().unwrap();
    assert_eq!(last.date, NaiveDate::from_ymd_opt(2024, 10, 19).unwrap());
    assert_eq!(last.end, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
    assert_eq!(last.label(), "Sáb 19/10, 17:00 - 18:00");
}

#[test]
fn late_orders_start_the_next_day() {
    let slots = DeliverySchedule::default().slots(at(14, 17, 0));
    assert_eq!(slots[0].label(), "Ter 15/10, 09:00 - 10:00");
}

#[test]
fn slots_are_chronological() {
    let slots = DeliverySchedule::default().slots(at(16, 11, 30));
    let starts: Vec<_> = slots.iter().map(|s| s.date.and_time(s.start)).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
    // 13:30 lead boundary: the 13:00 slot is gone, 14:00 is the first
    assert_eq!(slots[0].id(), "2024-10-16T14:00");
}

#[test]
fn custom_schedule() {
    let schedule = DeliverySchedule {
        slot_minutes: 90,
        lead_minutes: 0,
        days_ahead: 1,
        closed_days: vec![],
        ..DeliverySchedule::default()
    };
    let slots = schedule.slots(at(20, 0, 0));
    // 09:00-10:30 ... 15:00-16:30; 16:30-18:00 also fits
    let ids: Vec<_> = slots.iter().map(|s| s.id()).collect();
    assert_eq!(
        ids,
        vec![
            "2024-10-20T09:00",
            "2024-10-20T10:30",
            "2024-10-20T12:00",
            "2024-10-20T13:30",
            "2024-10-20T15:00",
            "2024-10-20T16:30",
        ]
    );

    let none = DeliverySchedule {
        slot_minutes: 0,
        ..DeliverySchedule::default()
    };
    assert!(none.slots(at(14, 8, 0)).is_empty());
}
