use std::sync::Arc;

use chrono::Duration;
use exam_core::model::{Answer, AnswerKey, ExamConfig, ExamPaper, QuestionSet};
use exam_core::time::fixed_now;
use services::{Clock, JsonFileSink, SessionLoopService, SubmitFlow, TickOutcome};
use storage::repository::{Storage, TimerSnapshotRepository};

fn paper() -> Arc<ExamPaper> {
    let questions = QuestionSet::from_json(
        r#"[
            {"id": 1, "section": "General Aptitude", "type": "MCQ", "marks": 1,
             "question": "Q1", "options": ["a", "b", "c", "d"]},
            {"id": 2, "section": "General Aptitude", "type": "NAT", "marks": 2,
             "question": "Q2"}
        ]"#,
    )
    .unwrap();
    let key = AnswerKey::from_json(r#"{"1":"B","2":["10","11"]}"#, &questions);
    Arc::new(ExamPaper::new(
        ExamConfig::default().with_duration_minutes(2),
        questions,
        key,
    ))
}

#[tokio::test]
async fn session_survives_restart_on_sqlite() {
    let storage = Storage::sqlite("sqlite:file:memdb_session_smoke?mode=memory&cache=shared")
        .await
        .unwrap();
    let now = fixed_now();

    let first = SessionLoopService::new(Clock::fixed(now), storage.timer_snapshots.clone());
    let mut session = first.start_session(paper()).await.unwrap();
    for _ in 0..30 {
        first.tick(&mut session).await;
    }
    assert_eq!(session.countdown().remaining(), 90);
    let stored = storage
        .timer_snapshots
        .load_snapshot(first.policy().session_key())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.remaining_seconds, 90);
    drop(session);

    let mut later = Clock::fixed(now);
    later.advance(Duration::seconds(20));
    let result_path =
        std::env::temp_dir().join(format!("exam-smoke-result-{}.json", std::process::id()));
    let second = SessionLoopService::new(later, storage.timer_snapshots.clone())
        .with_result_sink(Arc::new(JsonFileSink::new(&result_path)));
    let mut session = second.start_session(paper()).await.unwrap();
    assert_eq!(session.countdown().remaining(), 70);

    session.set_answer(Answer::Choice(1)).unwrap();
    session.save_and_next().unwrap();
    session.set_answer(Answer::text("11")).unwrap();

    let SubmitFlow::Finished(result) = second.submit(&mut session, true).await.unwrap() else {
        panic!("forced submit should finish");
    };
    assert_eq!(result.time_taken, 50);
    assert!((result.score - 3.0).abs() < 1e-9);
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&result_path).unwrap()).unwrap();
    assert_eq!(written["timeTaken"], 50);
    let _ = std::fs::remove_file(&result_path);
    assert!(
        storage
            .timer_snapshots
            .load_snapshot(second.policy().session_key())
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(session.tick(), TickOutcome::Idle);
}
