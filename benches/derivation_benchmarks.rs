//! Performance benchmarks for the Workforce Scope Engine.
//!
//! Covers the hot paths of a tool call:
//! - Monthly attendance classification
//! - Query scoping
//! - Deduction calculation
//! - A full attendance request through the router
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rust_decimal::Decimal;
use serde_json::json;

use workforce_scope_engine::api::{AppState, create_router};
use workforce_scope_engine::attendance::classify_month;
use workforce_scope_engine::config::ConfigLoader;
use workforce_scope_engine::identity::{MembershipRow, StaticMembershipSource};
use workforce_scope_engine::models::{
    AttendanceFacts, DailyRateBasis, EmployeeProfile, RawHoliday, RawPunch,
};
use workforce_scope_engine::payroll::{DeductionInput, compute_deductions};
use workforce_scope_engine::scoping::{AccessPredicate, ScopeClause, ScopeColumns, scope_query};
use workforce_scope_engine::session::{InMemorySessionStore, SessionStore};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn employee() -> EmployeeProfile {
    EmployeeProfile {
        employee_id: 501,
        company_id: 1,
        branch_id: 10,
        name: "Bench".to_string(),
        date_of_joining: NaiveDate::from_ymd_opt(2026, 3, 3),
    }
}

/// A month of facts with one punch on every day.
fn month_facts(punches_per_day: usize) -> AttendanceFacts {
    let punches = (1..=31)
        .flat_map(|day| {
            (0..punches_per_day).map(move |i| RawPunch {
                employee_id: Some(501),
                date: json!(format!("2026-03-{:02}", day)),
                check_in: json!(format!("2026-03-{:02}T{:02}:00:00", day, 9 + i)),
                check_out: json!(format!("2026-03-{:02}T{:02}:45:00", day, 9 + i)),
                total_minutes: json!(45),
                is_late: json!(day % 7 == 0),
                is_half_day: json!(0),
            })
        })
        .collect();

    AttendanceFacts {
        holidays: vec![RawHoliday {
            branch_id: Some(10),
            date: json!("2026-03-04"),
            name: Some("Holi".to_string()),
        }],
        punches,
        branch_working_days: json!("0,1,2,3,4"),
        ..Default::default()
    }
}

/// Benchmark: classification of one month by punch density.
fn bench_classify_month(c: &mut Criterion) {
    let employee = employee();
    let now = NaiveDate::from_ymd_opt(2026, 4, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let mut group = c.benchmark_group("classify_month");
    for punches_per_day in [1, 4, 8].iter() {
        let facts = month_facts(*punches_per_day);
        group.throughput(Throughput::Elements(facts.punches.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("punches_per_day", punches_per_day),
            &facts,
            |b, facts| {
                b.iter(|| black_box(classify_month(&employee, 2026, 3, facts, now).unwrap()))
            },
        );
    }
    group.finish();
}

/// Benchmark: scoping a query with several memberships.
fn bench_scope_query(c: &mut Criterion) {
    let predicate = AccessPredicate::AnyOf(vec![
        ScopeClause::Company { company_id: 1 },
        ScopeClause::Branch {
            company_id: 2,
            branch_id: 20,
        },
        ScopeClause::Employee { employee_id: 3005 },
    ]);
    let columns = ScopeColumns::default();
    let query = "SELECT p.name, COUNT(*) FROM company_employee p \
                 WHERE p.is_deleted = '0' GROUP BY p.name ORDER BY p.name LIMIT 50";

    c.bench_function("scope_query", |b| {
        b.iter(|| black_box(scope_query(query, &predicate, "p", &columns).unwrap()))
    });
}

/// Benchmark: deduction calculation.
fn bench_compute_deductions(c: &mut Criterion) {
    let input = DeductionInput {
        gross: Decimal::new(3_100_000, 2),
        period_days: 31,
        working_days: 22,
        absent_days: 3,
        half_days: 2,
        late_days: 7,
        allowed_late_before_penalty: 3,
        basis: DailyRateBasis::WorkingDays,
        pre_joining_days: 0,
    };

    c.bench_function("compute_deductions", |b| {
        b.iter(|| black_box(compute_deductions(black_box(&input))))
    });
}

/// Benchmark: a full attendance request through the router.
fn bench_attendance_request(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    let sessions = Arc::new(InMemorySessionStore::new(Duration::from_secs(3600)));
    let memberships = StaticMembershipSource::new().with_rows(
        42,
        vec![MembershipRow {
            company_employee_id: 501,
            company_id: 1,
            company_name: Some("Acme".to_string()),
            company_branch_id: Some(10),
            branch_name: Some("Head Office".to_string()),
            role_id: Some(1),
            designation: None,
            attendance_count: json!(10),
        }],
    );
    let session = sessions.create("9876543210", "prod");
    sessions.authenticate(&session.session_id, Some(42), "Bench");
    let router = create_router(AppState::new(config, sessions, Arc::new(memberships)));

    let body = json!({
        "session_id": session.session_id,
        "employee": employee(),
        "year": 2026,
        "month": 3,
        "facts": month_facts(2),
        "now": "2026-04-01T00:00:00"
    })
    .to_string();

    c.bench_function("attendance_request", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/tools/attendance")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_classify_month,
    bench_scope_query,
    bench_compute_deductions,
    bench_attendance_request,
);
criterion_main!(benches);
