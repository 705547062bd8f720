// ==========================================
// 引擎集成测试
// ==========================================
// 职责: 验证展开 → 调度 → 编排的完整内存流程
// 场景: 空网格全排入 / 约束阻断 / 钉点 / 同时段 / 确定性
// ==========================================

mod helpers;

use helpers::test_data_builder::{
    build_blocked_constraint, build_room, AssignmentBuilder, TemplateBuilder,
};
use institute_timetable::domain::types::{ConstraintType, Weekday};
use institute_timetable::engine::{GenerationInput, GenerationOrchestrator, GenerationOutcome};
use std::collections::HashSet;

fn run_generation(input: &GenerationInput) -> GenerationOutcome {
    GenerationOrchestrator::new()
        .run(input)
        .expect("Generation run failed")
}

#[test]
fn test_empty_grid_assigns_every_session() {
    let input = GenerationInput {
        template: TemplateBuilder::new("PT-1")
            .days(vec![Weekday::Monday, Weekday::Tuesday, Weekday::Wednesday])
            .periods_per_day(4)
            .build(),
        assignments: vec![
            AssignmentBuilder::new("TA-1").teacher("T1").sessions(3).build(),
            AssignmentBuilder::new("TA-2")
                .teacher("T2")
                .sections(&["SEC2"])
                .sessions(2)
                .length(2)
                .created_offset(1)
                .build(),
        ],
        constraints: vec![],
        rooms: vec![build_room("R1", 40), build_room("R2", 40)],
    };

    let outcome = run_generation(&input);
    assert_eq!(outcome.total_sessions, 5);
    assert_eq!(outcome.assigned_sessions, 5);
    assert_eq!(outcome.unassigned_count, 0);
    assert_eq!(outcome.placements.len(), 5);
}

#[test]
fn test_fully_blocked_teacher_produces_diagnosed_unassigned() {
    // 周一仅2节,教师两格全被黑名单阻断
    let constraints = (1..=2)
        .map(|p| build_blocked_constraint(ConstraintType::Teacher, "T1", Weekday::Monday, p))
        .collect();
    let input = GenerationInput {
        template: TemplateBuilder::new("PT-1")
            .days(vec![Weekday::Monday])
            .periods_per_day(2)
            .build(),
        assignments: vec![AssignmentBuilder::new("TA-1").teacher("T1").sessions(3).build()],
        constraints,
        rooms: vec![build_room("R1", 40)],
    };

    let outcome = run_generation(&input);
    assert_eq!(outcome.assigned_sessions, 0);
    assert_eq!(outcome.unassigned_count, 3);
    for unassigned in &outcome.unassigned {
        assert_eq!(unassigned.teaching_assignment_id, "TA-1");
        assert!(unassigned
            .conflict_reasons
            .iter()
            .any(|r| r.starts_with("TEACHER_UNAVAILABLE")));
        assert!(unassigned
            .suggested_fixes
            .iter()
            .any(|f| f == "放宽教师可用性黑名单"));
    }
}

#[test]
fn test_no_entity_double_booked_in_dense_grid() {
    // 三位教师共用两个班级与两间教室,网格供不应求
    let input = GenerationInput {
        template: TemplateBuilder::new("PT-1")
            .days(vec![Weekday::Monday, Weekday::Tuesday])
            .periods_per_day(3)
            .build(),
        assignments: vec![
            AssignmentBuilder::new("TA-1").teacher("T1").sections(&["SEC1"]).sessions(4).build(),
            AssignmentBuilder::new("TA-2")
                .teacher("T2")
                .sections(&["SEC1", "SEC2"])
                .sessions(4)
                .created_offset(1)
                .build(),
            AssignmentBuilder::new("TA-3")
                .teacher("T3")
                .sections(&["SEC2"])
                .sessions(4)
                .created_offset(2)
                .build(),
        ],
        constraints: vec![],
        rooms: vec![build_room("R1", 40), build_room("R2", 40)],
    };

    let outcome = run_generation(&input);
    assert_eq!(
        outcome.assigned_sessions + outcome.unassigned_count,
        outcome.total_sessions
    );

    // 互斥不变式: 任意 (实体, 日, 节次) 至多占用一次
    let mut teacher_cells = HashSet::new();
    let mut room_cells = HashSet::new();
    let mut section_cells = HashSet::new();
    for p in &outcome.placements {
        for period in p.start_period..p.start_period + p.session_length {
            assert!(
                teacher_cells.insert((p.teacher_id.clone(), p.day, period)),
                "教师重复占用: {} {} {}",
                p.teacher_id,
                p.day,
                period
            );
            if let Some(room) = &p.room_id {
                assert!(
                    room_cells.insert((room.clone(), p.day, period)),
                    "教室重复占用: {} {} {}",
                    room,
                    p.day,
                    period
                );
            }
            for section in &p.section_ids {
                assert!(
                    section_cells.insert((section.clone(), p.day, period)),
                    "班级重复占用: {} {} {}",
                    section,
                    p.day,
                    period
                );
            }
        }
    }
}

#[test]
fn test_pinned_session_placed_first_and_exactly() {
    // 钉点任务创建最晚,但仍优先落位于钉点格
    let input = GenerationInput {
        template: TemplateBuilder::new("PT-1")
            .days(vec![Weekday::Monday])
            .periods_per_day(2)
            .build(),
        assignments: vec![
            AssignmentBuilder::new("TA-FLEX").teacher("T1").sections(&["SEC1"]).sessions(2).build(),
            AssignmentBuilder::new("TA-PIN")
                .teacher("T2")
                .sections(&["SEC2"])
                .pinned(Weekday::Monday, 2)
                .created_offset(60)
                .build(),
        ],
        constraints: vec![],
        rooms: vec![build_room("R1", 40), build_room("R2", 40)],
    };

    let outcome = run_generation(&input);
    let pinned = outcome
        .placements
        .iter()
        .find(|p| p.assignment_id == "TA-PIN")
        .expect("Pinned session not placed");
    assert_eq!(pinned.day, Weekday::Monday);
    assert_eq!(pinned.start_period, 2);
}

#[test]
fn test_same_daily_pattern_uses_one_start_across_distinct_days() {
    let input = GenerationInput {
        template: TemplateBuilder::new("PT-1")
            .days(vec![
                Weekday::Monday,
                Weekday::Tuesday,
                Weekday::Wednesday,
                Weekday::Thursday,
            ])
            .periods_per_day(5)
            .breaks(vec![3])
            .build(),
        assignments: vec![AssignmentBuilder::new("TA-1")
            .teacher("T1")
            .sessions(4)
            .same_daily_pattern()
            .build()],
        constraints: vec![],
        rooms: vec![build_room("R1", 40)],
    };

    let outcome = run_generation(&input);
    assert_eq!(outcome.assigned_sessions, 4);

    let starts: HashSet<i32> = outcome.placements.iter().map(|p| p.start_period).collect();
    assert_eq!(starts.len(), 1, "同时段任务起始节次必须一致");
    let days: HashSet<Weekday> = outcome.placements.iter().map(|p| p.day).collect();
    assert_eq!(days.len(), 4, "同时段任务每课次落在不同日");
    // 第3节为休息,不可能是锁定起点
    assert!(!starts.contains(&3));
}

#[test]
fn test_break_periods_never_covered() {
    let input = GenerationInput {
        template: TemplateBuilder::new("PT-1")
            .days(vec![Weekday::Monday])
            .periods_per_day(6)
            .breaks(vec![3])
            .build(),
        assignments: vec![AssignmentBuilder::new("TA-1")
            .teacher("T1")
            .sessions(2)
            .length(2)
            .build()],
        constraints: vec![],
        rooms: vec![build_room("R1", 40)],
    };

    let outcome = run_generation(&input);
    assert_eq!(outcome.assigned_sessions, 2);
    for p in &outcome.placements {
        for period in p.start_period..p.start_period + p.session_length {
            assert_ne!(period, 3, "连排窗口覆盖了休息节次");
        }
    }
}

#[test]
fn test_room_blackout_forces_fallback_room() {
    // R1 周一全天被黑名单阻断,课次应落到 R2
    let constraints = (1..=2)
        .map(|p| build_blocked_constraint(ConstraintType::Room, "R1", Weekday::Monday, p))
        .collect();
    let input = GenerationInput {
        template: TemplateBuilder::new("PT-1")
            .days(vec![Weekday::Monday])
            .periods_per_day(2)
            .build(),
        assignments: vec![AssignmentBuilder::new("TA-1")
            .teacher("T1")
            .preferred_rooms(&["R1"])
            .build()],
        constraints,
        rooms: vec![build_room("R1", 40), build_room("R2", 40)],
    };

    let outcome = run_generation(&input);
    assert_eq!(outcome.assigned_sessions, 1);
    assert_eq!(outcome.placements[0].room_id.as_deref(), Some("R2"));
}

#[test]
fn test_repeat_runs_are_bitwise_identical() {
    let build_input = || GenerationInput {
        template: TemplateBuilder::new("PT-1")
            .days(vec![Weekday::Monday, Weekday::Tuesday, Weekday::Wednesday])
            .periods_per_day(5)
            .breaks(vec![3])
            .build(),
        assignments: vec![
            AssignmentBuilder::new("TA-1").teacher("T1").sessions(3).length(2).build(),
            AssignmentBuilder::new("TA-2")
                .teacher("T2")
                .sections(&["SEC2"])
                .sessions(4)
                .same_daily_pattern()
                .created_offset(1)
                .build(),
            AssignmentBuilder::new("TA-3")
                .teacher("T1")
                .sections(&["SEC2"])
                .sessions(2)
                .created_offset(2)
                .build(),
        ],
        constraints: vec![build_blocked_constraint(
            ConstraintType::Teacher,
            "T1",
            Weekday::Monday,
            1,
        )],
        rooms: vec![build_room("R2", 60), build_room("R1", 30)],
    };

    let first = run_generation(&build_input());
    let second = run_generation(&build_input());

    assert_eq!(first.assigned_sessions, second.assigned_sessions);
    assert_eq!(first.unassigned_count, second.unassigned_count);
    for (a, b) in first.placements.iter().zip(second.placements.iter()) {
        assert_eq!(a.assignment_id, b.assignment_id);
        assert_eq!(a.day, b.day);
        assert_eq!(a.start_period, b.start_period);
        assert_eq!(a.room_id, b.room_id);
    }
    for (a, b) in first.unassigned.iter().zip(second.unassigned.iter()) {
        assert_eq!(a.teaching_assignment_id, b.teaching_assignment_id);
        assert_eq!(a.conflict_reasons, b.conflict_reasons);
    }
}

#[test]
fn test_earlier_created_assignment_wins_contended_slot() {
    // 两个任务争夺同一班级的唯一格子,创建早者得
    let input = GenerationInput {
        template: TemplateBuilder::new("PT-1")
            .days(vec![Weekday::Monday])
            .periods_per_day(1)
            .build(),
        assignments: vec![
            AssignmentBuilder::new("TA-LATE")
                .teacher("T2")
                .created_offset(60)
                .build(),
            AssignmentBuilder::new("TA-EARLY").teacher("T1").build(),
        ],
        constraints: vec![],
        rooms: vec![build_room("R1", 40), build_room("R2", 40)],
    };

    let outcome = run_generation(&input);
    assert_eq!(outcome.assigned_sessions, 1);
    assert_eq!(outcome.placements[0].assignment_id, "TA-EARLY");
    assert_eq!(outcome.unassigned[0].teaching_assignment_id, "TA-LATE");
}
