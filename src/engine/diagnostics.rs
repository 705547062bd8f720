// ==========================================
// 学校排课系统 - 落位失败诊断
// ==========================================
// 职责: 把落位搜索过程中的失败统计转换为
//       冲突原因(CODE: detail)与建议修复措施
// 红线: 原因必须可操作,不得输出空原因列表
// ==========================================

use crate::domain::assignment::TeachingAssignment;

// ==========================================
// FailureTally - 单个请求的失败统计
// ==========================================
// 搜索全部候选 (day, start, room) 窗口时累计
#[derive(Debug, Default, Clone)]
pub struct FailureTally {
    pub windows_tried: u32,      // 尝试过的 (day, start) 窗口数
    pub teacher_blocks: u32,     // 教师占用/黑名单导致的失败
    pub section_blocks: u32,     // 班级组占用导致的失败
    pub room_blocks: u32,        // 全部候选教室不可用的窗口数
    pub room_fixed_missing: bool, // room_fixed 指定教室不存在或未启用
    pub no_candidate_days: bool,  // allowed_days ∩ 活动日为空
    pub pattern_exhausted: bool,  // 每日同时段的锁定节次已无可用日
}

/// 根据失败统计生成冲突原因列表
///
/// 钉点请求失败时额外前置 FIXED_PIN_CONFLICT
pub fn conflict_reasons(
    assignment: &TeachingAssignment,
    tally: &FailureTally,
    pinned: bool,
) -> Vec<String> {
    let mut reasons = Vec::new();

    if pinned {
        reasons.push(format!(
            "FIXED_PIN_CONFLICT: assignment {} pinned slot is infeasible",
            assignment.assignment_id
        ));
    }

    if tally.no_candidate_days {
        reasons.push(format!(
            "NO_ALLOWED_DAY: assignment {} has no allowed day inside the active grid",
            assignment.assignment_id
        ));
    }
    if tally.pattern_exhausted {
        reasons.push(format!(
            "SAME_PATTERN_DAYS_EXHAUSTED: assignment {} locked start period has no remaining day",
            assignment.assignment_id
        ));
    }
    if tally.room_fixed_missing {
        reasons.push(format!(
            "ROOM_FIXED_UNAVAILABLE: assignment {} fixed room is missing or inactive",
            assignment.assignment_id
        ));
    }
    if tally.teacher_blocks > 0 {
        reasons.push(format!(
            "TEACHER_UNAVAILABLE: teacher {} blocked in {} of {} windows",
            assignment.teacher_id, tally.teacher_blocks, tally.windows_tried
        ));
    }
    if tally.section_blocks > 0 {
        reasons.push(format!(
            "SECTION_CONFLICT: section group busy in {} of {} windows",
            tally.section_blocks, tally.windows_tried
        ));
    }
    if tally.room_blocks > 0 {
        reasons.push(format!(
            "NO_ROOM_AVAILABLE: no candidate room free in {} of {} windows",
            tally.room_blocks, tally.windows_tried
        ));
    }

    // 兜底: 统计全空时也必须给出原因
    if reasons.is_empty() {
        reasons.push(format!(
            "NO_FEASIBLE_WINDOW: assignment {} found no feasible (day, period) window",
            assignment.assignment_id
        ));
    }

    reasons
}

/// 根据失败统计生成建议修复措施(去重后保持生成顺序)
pub fn suggested_fixes(assignment: &TeachingAssignment, tally: &FailureTally) -> Vec<String> {
    let mut fixes = Vec::new();

    if tally.no_candidate_days {
        fixes.push("放宽 allowed_days 限制".to_string());
    }
    if tally.pattern_exhausted {
        fixes.push("关闭每日同一时段要求".to_string());
    }
    if tally.room_fixed_missing {
        fixes.push("取消 room_fixed 限制或启用指定教室".to_string());
    }
    if tally.teacher_blocks > 0 {
        fixes.push("放宽教师可用性黑名单".to_string());
        fixes.push("减少每周课次".to_string());
    }
    if tally.section_blocks > 0 {
        fixes.push("减少每周课次".to_string());
        fixes.push("增加每日节次数".to_string());
    }
    if tally.room_blocks > 0 {
        fixes.push("增加可用教室".to_string());
    }
    if assignment.session_length > 1 {
        fixes.push("拆分连排课次".to_string());
    }
    if fixes.is_empty() {
        fixes.push("增加每日节次数或减少每周课次".to_string());
    }

    // 去重,保持首次出现顺序
    let mut seen = std::collections::HashSet::new();
    fixes.retain(|f| seen.insert(f.clone()));
    fixes
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_assignment(length: i32) -> TeachingAssignment {
        TeachingAssignment {
            assignment_id: "TA-1".to_string(),
            teacher_id: "T1".to_string(),
            subject_id: "SUB1".to_string(),
            section_ids: vec!["SEC1".to_string()],
            sessions_per_week: 2,
            session_length: length,
            preferred_room_ids: vec![],
            room_fixed: false,
            allowed_days: None,
            fixed_day: None,
            fixed_period: None,
            same_daily_pattern: false,
            academic_year: "2025".to_string(),
            is_active: true,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_reasons_never_empty() {
        let a = create_test_assignment(1);
        let tally = FailureTally::default();
        let reasons = conflict_reasons(&a, &tally, false);
        assert_eq!(reasons.len(), 1);
        assert!(reasons[0].starts_with("NO_FEASIBLE_WINDOW"));
    }

    #[test]
    fn test_pinned_failure_prepends_pin_reason() {
        let a = create_test_assignment(1);
        let mut tally = FailureTally::default();
        tally.windows_tried = 1;
        tally.teacher_blocks = 1;

        let reasons = conflict_reasons(&a, &tally, true);
        assert!(reasons[0].starts_with("FIXED_PIN_CONFLICT"));
        assert!(reasons.iter().any(|r| r.starts_with("TEACHER_UNAVAILABLE")));
    }

    #[test]
    fn test_fixes_deduplicated() {
        let a = create_test_assignment(2);
        let mut tally = FailureTally::default();
        tally.windows_tried = 10;
        tally.teacher_blocks = 4;
        tally.section_blocks = 6;

        let fixes = suggested_fixes(&a, &tally);
        // "减少每周课次" 同时由教师与班级冲突触发,只出现一次
        assert_eq!(fixes.iter().filter(|f| f.as_str() == "减少每周课次").count(), 1);
        // 连排任务附带拆分建议
        assert!(fixes.iter().any(|f| f == "拆分连排课次"));
    }
}
