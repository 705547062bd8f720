// ==========================================
// 学校排课系统 - 生成课表领域模型
// ==========================================
// 职责: 一次生成运行的结果实体
// 所有权: GeneratedTimetable 拥有其 Slot 与 UnassignedSession
//         (删除课表级联删除两者)
// ==========================================

use crate::domain::types::{GenerationStatus, Weekday};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// GeneratedTimetable - 一次完整生成记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedTimetable {
    pub timetable_id: String,            // 课表ID
    pub name: String,                    // 课表名称
    pub academic_year: String,           // 学年
    pub period_template_id: String,      // 使用的作息模板
    pub generation_status: GenerationStatus, // 生成状态
    pub total_sessions: i32,             // 应排课次总数
    pub assigned_sessions: i32,          // 已排课次数
    pub unassigned_sessions: i32,        // 未排课次数
    pub generation_log: Vec<String>,     // 生成日志(有序)
    pub is_active: bool,                 // 激活标记 (全局至多一个,存储层事务保证)
    pub created_at: NaiveDateTime,       // 创建时间
}

impl GeneratedTimetable {
    /// 判断是否已完成
    pub fn is_completed(&self) -> bool {
        self.generation_status == GenerationStatus::Completed
    }

    /// 判断是否失败
    pub fn is_failed(&self) -> bool {
        self.generation_status == GenerationStatus::Failed
    }

    /// 判断是否完全排入(完成且无未排课次)
    pub fn is_fully_assigned(&self) -> bool {
        self.is_completed() && self.unassigned_sessions == 0
    }
}

// ==========================================
// TimetableSlot - 已落位课次
// ==========================================
// 不变式: 同一课表内,同日且节次区间相交的两个 Slot
//         不得共享教师、教室或任一班级
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableSlot {
    pub slot_id: String,           // 记录ID
    pub timetable_id: String,      // 所属课表
    pub teacher_id: String,        // 教师ID
    pub subject_id: String,        // 科目ID
    pub section_ids: Vec<String>,  // 班级组
    pub day: Weekday,              // 星期
    pub period_number: i32,        // 起始节次
    pub session_length: i32,       // 连排节数
    pub room_id: Option<String>,   // 教室ID (系统无启用教室时为空)
}

impl TimetableSlot {
    /// 判断该课次是否覆盖某节次
    pub fn covers_period(&self, period: i32) -> bool {
        period >= self.period_number && period < self.period_number + self.session_length
    }

    /// 判断与另一课次在同日是否节次区间相交
    pub fn overlaps(&self, other: &TimetableSlot) -> bool {
        self.day == other.day
            && self.period_number < other.period_number + other.session_length
            && other.period_number < self.period_number + self.session_length
    }

    /// 判断与另一课次是否共享任一班级
    pub fn shares_section(&self, other: &TimetableSlot) -> bool {
        self.section_ids.iter().any(|s| other.section_ids.contains(s))
    }
}

// ==========================================
// UnassignedSession - 未排课次
// ==========================================
// 生命周期: 每个未能落位的课次实例生成一条,之后不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnassignedSession {
    pub session_id: String,               // 记录ID
    pub timetable_id: String,             // 所属课表
    pub teaching_assignment_id: String,   // 产生该课次的教学任务
    pub conflict_reasons: Vec<String>,    // 冲突原因 (CODE: detail 格式)
    pub suggested_fixes: Vec<String>,     // 建议修复措施
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_slot(day: Weekday, start: i32, length: i32, sections: &[&str]) -> TimetableSlot {
        TimetableSlot {
            slot_id: "S-1".to_string(),
            timetable_id: "TT-1".to_string(),
            teacher_id: "T1".to_string(),
            subject_id: "SUB1".to_string(),
            section_ids: sections.iter().map(|s| s.to_string()).collect(),
            day,
            period_number: start,
            session_length: length,
            room_id: None,
        }
    }

    #[test]
    fn test_covers_period() {
        let slot = create_test_slot(Weekday::Monday, 2, 2, &["SEC1"]);
        assert!(!slot.covers_period(1));
        assert!(slot.covers_period(2));
        assert!(slot.covers_period(3));
        assert!(!slot.covers_period(4));
    }

    #[test]
    fn test_overlaps_same_day_only() {
        let a = create_test_slot(Weekday::Monday, 2, 2, &["SEC1"]);
        let b = create_test_slot(Weekday::Monday, 3, 1, &["SEC2"]);
        let c = create_test_slot(Weekday::Tuesday, 3, 1, &["SEC2"]);
        let d = create_test_slot(Weekday::Monday, 4, 2, &["SEC2"]);

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // 不同日
        assert!(!a.overlaps(&d)); // 区间相邻不相交
    }

    #[test]
    fn test_shares_section() {
        let a = create_test_slot(Weekday::Monday, 1, 1, &["SEC1", "SEC2"]);
        let b = create_test_slot(Weekday::Monday, 1, 1, &["SEC2"]);
        let c = create_test_slot(Weekday::Monday, 1, 1, &["SEC3"]);

        assert!(a.shares_section(&b));
        assert!(!a.shares_section(&c));
    }
}
