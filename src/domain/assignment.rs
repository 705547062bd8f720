// ==========================================
// 学校排课系统 - 教学任务领域模型
// ==========================================
// 职责: 定义教学任务(教师×科目×班级组)与教室主数据
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

use crate::domain::types::Weekday;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Room - 教室主数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub room_id: String,           // 教室ID
    pub name: String,              // 教室名称
    pub capacity: i32,             // 容纳人数
    pub room_type: String,         // 教室类型 (classroom/lab/...)
    pub is_active: bool,           // 启用标记
    pub created_at: NaiveDateTime, // 创建时间
}

// ==========================================
// TeachingAssignment - 教学任务
// ==========================================
// 一条记录描述一个每周重复的授课义务
// 不变式: 每周共需 sessions_per_week × session_length 个节次格
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeachingAssignment {
    pub assignment_id: String,            // 任务ID
    pub teacher_id: String,               // 教师ID
    pub subject_id: String,               // 科目ID
    pub section_ids: Vec<String>,         // 班级组 (≥1,多班合堂,同一时段全部占用)
    pub sessions_per_week: i32,           // 每周课次 (≥1)
    pub session_length: i32,              // 单次连排节数 (≥1)
    pub preferred_room_ids: Vec<String>,  // 偏好教室,按顺序尝试;空 = 任意启用教室
    pub room_fixed: bool,                 // 仅允许首个偏好教室
    pub allowed_days: Option<Vec<Weekday>>, // 可排日限制;None = 不限
    pub fixed_day: Option<Weekday>,       // 固定日 (与 fixed_period 同时设置才生效)
    pub fixed_period: Option<i32>,        // 固定起始节次
    pub same_daily_pattern: bool,         // 每日同一时段
    pub academic_year: String,            // 学年
    pub is_active: bool,                  // 启用标记
    pub created_at: NaiveDateTime,        // 创建时间 (确定性排序依据)
}

impl TeachingAssignment {
    /// 判断是否带有固定日/节钉点
    ///
    /// fixed_day 与 fixed_period 必须同时设置才构成钉点
    pub fn has_fixed_pin(&self) -> bool {
        self.fixed_day.is_some() && self.fixed_period.is_some()
    }

    /// 每周所需节次格总量
    pub fn total_period_slots(&self) -> i32 {
        self.sessions_per_week * self.session_length
    }

    /// 内部一致性校验,返回首个问题描述
    ///
    /// 违反视为结构性错误(生成运行整体失败)
    pub fn consistency_error(&self, periods_per_day: i32) -> Option<String> {
        if self.section_ids.is_empty() {
            return Some(format!(
                "ASSIGNMENT_INCONSISTENT: assignment {} has empty section_ids",
                self.assignment_id
            ));
        }
        if self.sessions_per_week < 1 {
            return Some(format!(
                "ASSIGNMENT_INCONSISTENT: assignment {} has sessions_per_week {} < 1",
                self.assignment_id, self.sessions_per_week
            ));
        }
        if self.session_length < 1 {
            return Some(format!(
                "ASSIGNMENT_INCONSISTENT: assignment {} has session_length {} < 1",
                self.assignment_id, self.session_length
            ));
        }
        if let Some(p) = self.fixed_period {
            if p < 1 || p + self.session_length - 1 > periods_per_day {
                return Some(format!(
                    "ASSIGNMENT_INCONSISTENT: assignment {} fixed_period {} (length {}) outside [1, {}]",
                    self.assignment_id, p, self.session_length, periods_per_day
                ));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_assignment() -> TeachingAssignment {
        TeachingAssignment {
            assignment_id: "TA-1".to_string(),
            teacher_id: "T1".to_string(),
            subject_id: "SUB1".to_string(),
            section_ids: vec!["SEC1".to_string()],
            sessions_per_week: 3,
            session_length: 2,
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
    fn test_fixed_pin_requires_both_fields() {
        let mut a = create_test_assignment();
        assert!(!a.has_fixed_pin());

        a.fixed_day = Some(Weekday::Monday);
        assert!(!a.has_fixed_pin());

        a.fixed_period = Some(1);
        assert!(a.has_fixed_pin());
    }

    #[test]
    fn test_total_period_slots() {
        let a = create_test_assignment();
        assert_eq!(a.total_period_slots(), 6);
    }

    #[test]
    fn test_consistency_checks() {
        let mut a = create_test_assignment();
        assert!(a.consistency_error(6).is_none());

        a.section_ids.clear();
        assert!(a.consistency_error(6).is_some());

        let mut b = create_test_assignment();
        b.fixed_day = Some(Weekday::Monday);
        b.fixed_period = Some(6);
        // 连排2节,起始第6节超出6节/天
        assert!(b.consistency_error(6).is_some());
        b.fixed_period = Some(5);
        assert!(b.consistency_error(6).is_none());
    }
}
