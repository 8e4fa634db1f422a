use chrono::{DateTime, Duration, TimeZone, Utc};
use load_velocity::{
    day_window, run_batch, IngestError, LoadIngestor, LoadRecord, LoadResponse, LoadStore,
    MemoryLoadStore, SqliteLoadStore, VelocityValidator,
};

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, day, hour, 0, 0).unwrap()
}

fn accepted_load(customer_id: i64, transaction_id: i64, amount: i64, time: DateTime<Utc>) -> LoadRecord {
    let mut record = LoadRecord::new(customer_id, transaction_id, amount, time);
    record.accepted = true;
    record
}

fn sqlite_ingestor(history: &[LoadRecord]) -> LoadIngestor<SqliteLoadStore, VelocityValidator> {
    let store = SqliteLoadStore::open_in_memory().unwrap();
    for record in history {
        store.append(record).unwrap();
    }
    LoadIngestor::new(store, VelocityValidator::new())
}

#[test]
fn fourth_load_of_the_day_is_declined() {
    let ingestor = sqlite_ingestor(&[
        accepted_load(1, 1, 250_000, at(1, 0)),
        accepted_load(1, 2, 250_000, at(1, 6)),
        accepted_load(1, 3, 250_000, at(1, 12)),
    ]);

    let record = ingestor
        .ingest(LoadRecord::new(1, 4, 250_000, at(1, 16)))
        .unwrap();

    assert!(!record.accepted);
}

#[test]
fn daily_amount_over_limit_is_declined() {
    let ingestor = sqlite_ingestor(&[accepted_load(2, 1, 500_000, at(1, 0))]);

    let record = ingestor
        .ingest(LoadRecord::new(2, 2, 250_000, at(1, 16)))
        .unwrap();

    assert!(!record.accepted);
}

#[test]
fn weekly_amount_over_limit_is_declined_across_days() {
    // Saturday then Sunday of the week starting Monday 1999-12-27
    let ingestor = sqlite_ingestor(&[accepted_load(3, 1, 2_000_000, at(1, 0))]);

    let record = ingestor
        .ingest(LoadRecord::new(3, 2, 250_000, at(2, 16)))
        .unwrap();

    assert!(!record.accepted);
}

#[test]
fn load_reaching_daily_limit_exactly_is_accepted() {
    let ingestor = sqlite_ingestor(&[accepted_load(4, 1, 250_000, at(1, 0))]);

    let record = ingestor
        .ingest(LoadRecord::new(4, 2, 250_000, at(1, 16)))
        .unwrap();

    assert!(record.accepted);
    assert_eq!(
        LoadResponse::from(&record),
        LoadResponse {
            id: 2,
            customer_id: 4,
            accepted: true
        }
    );
}

#[test]
fn one_cent_over_daily_limit_is_declined() {
    let ingestor = sqlite_ingestor(&[accepted_load(4, 1, 250_000, at(1, 0))]);

    let record = ingestor
        .ingest(LoadRecord::new(4, 2, 250_001, at(1, 16)))
        .unwrap();

    assert!(!record.accepted);
}

#[test]
fn resubmitted_transaction_is_a_duplicate_and_changes_nothing() {
    let ingestor = sqlite_ingestor(&[]);

    let first = ingestor
        .ingest(LoadRecord::new(5, 1, 400_000, at(1, 0)))
        .unwrap();
    assert!(first.accepted);

    let err = ingestor
        .ingest(LoadRecord::new(5, 1, 400_000, at(1, 1)))
        .unwrap_err();
    assert!(matches!(err, IngestError::Duplicate { .. }));
    assert_eq!(ingestor.store().count().unwrap(), 1);

    // The rejected duplicate did not consume budget: $1,000 more still fits
    let next = ingestor
        .ingest(LoadRecord::new(5, 2, 100_000, at(1, 2)))
        .unwrap();
    assert!(next.accepted);
}

#[test]
fn new_week_resets_weekly_budget() {
    // Sunday 2000-01-02 fills the week; Monday 2000-01-03 starts fresh
    let ingestor = sqlite_ingestor(&[accepted_load(6, 1, 2_000_000, at(2, 0))]);

    let record = ingestor
        .ingest(LoadRecord::new(6, 2, 250_000, at(3, 0)))
        .unwrap();

    assert!(record.accepted);
}

fn last_millisecond_loads<S: LoadStore>(ingestor: &LoadIngestor<S, VelocityValidator>) -> usize {
    let last_second = Utc.with_ymd_and_hms(2000, 1, 1, 23, 59, 59).unwrap();
    (1..=4i64)
        .map(|n| {
            let time = last_second + Duration::microseconds(999_000 + 100 * n);
            ingestor.ingest(LoadRecord::new(8, n, 500_000, time)).unwrap()
        })
        .filter(|record| record.accepted)
        .count()
}

#[test]
fn loads_in_final_millisecond_share_the_daily_budget() {
    // 23:59:59.9991Z .. 23:59:59.9994Z all belong to 2000-01-01
    let memory = LoadIngestor::new(MemoryLoadStore::new(), VelocityValidator::new());
    assert_eq!(last_millisecond_loads(&memory), 1);
    assert_eq!(memory.store().len(), 4);

    let sqlite = sqlite_ingestor(&[]);
    assert_eq!(last_millisecond_loads(&sqlite), 1);
    assert_eq!(sqlite.store().count().unwrap(), 4);
}

#[test]
fn sub_microsecond_times_read_back_unchanged() {
    let time = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap() + Duration::nanoseconds(123_456_789);
    let ingestor = sqlite_ingestor(&[]);

    let record = ingestor.ingest(LoadRecord::new(9, 1, 100, time)).unwrap();
    let stored = ingestor.store().get(record.id.unwrap()).unwrap();

    assert_eq!(stored.time, time);
    assert_eq!(
        ingestor
            .store()
            .find_by_customer_in_range(9, time, time)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn accepted_loads_never_break_limits() {
    let ingestor = LoadIngestor::new(MemoryLoadStore::new(), VelocityValidator::new());
    let week_start = Utc.with_ymd_and_hms(2000, 1, 3, 0, 0, 0).unwrap();

    // Three weeks of $1,700 loads every five hours
    for n in 0..100i64 {
        let time = week_start + Duration::hours(5 * n);
        ingestor
            .ingest(LoadRecord::new(7, n, 170_000, time))
            .unwrap();
    }

    let accepted: Vec<LoadRecord> = ingestor
        .store()
        .all()
        .into_iter()
        .filter(|r| r.accepted)
        .collect();
    assert!(!accepted.is_empty());

    for record in &accepted {
        let day = day_window(record.time);
        let same_day: Vec<&LoadRecord> = accepted
            .iter()
            .filter(|r| r.time >= day.start && r.time <= day.end)
            .collect();
        assert!(same_day.len() <= 3);
        assert!(same_day.iter().map(|r| r.amount).sum::<i64>() <= 500_000);

        let week_start = load_velocity::week_to_date_window(record.time).start;
        let week_total: i64 = accepted
            .iter()
            .filter(|r| r.time >= week_start && r.time <= record.time)
            .map(|r| r.amount)
            .sum();
        assert!(week_total <= 2_000_000);
    }
}

#[test]
fn batch_file_round_trip_through_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("loads.db");
    let input = concat!(
        r#"{"id":"1","customer_id":"10","load_amount":"$2500.00","time":"2000-01-01T00:00:00Z"}"#,
        "\n",
        r#"{"id":"2","customer_id":"10","load_amount":"$2500.00","time":"2000-01-01T01:00:00Z"}"#,
        "\n",
        r#"{"id":"3","customer_id":"10","load_amount":"$0.01","time":"2000-01-01T02:00:00Z"}"#,
        "\n",
        r#"{"id":"1","customer_id":"10","load_amount":"$1.00","time":"2000-01-01T03:00:00Z"}"#,
        "\n",
    );

    let ingestor = LoadIngestor::new(SqliteLoadStore::open(&db_path).unwrap(), VelocityValidator::new());
    let mut out = Vec::new();
    let summary = run_batch(&ingestor, input.as_bytes(), &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        concat!(
            r#"{"id":1,"customer_id":10,"accepted":true}"#,
            "\n",
            r#"{"id":2,"customer_id":10,"accepted":true}"#,
            "\n",
            r#"{"id":3,"customer_id":10,"accepted":false}"#,
            "\n",
        )
    );
    assert_eq!(summary.duplicates, 1);
    drop(ingestor);

    // Decisions survive a reopen and still count toward the day
    let reopened = LoadIngestor::new(SqliteLoadStore::open(&db_path).unwrap(), VelocityValidator::new());
    assert_eq!(reopened.store().count().unwrap(), 3);
    let record = reopened
        .ingest(LoadRecord::new(10, 4, 1, at(1, 4)))
        .unwrap();
    assert!(!record.accepted);
}
