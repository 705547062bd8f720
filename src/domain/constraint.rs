// ==========================================
// 学校排课系统 - 可用性约束领域模型
// ==========================================
// 职责: 教师/教室的时段黑名单
// 语义: 缺省即可用,仅显式 is_available=false 的记录生效
// ==========================================

use crate::domain::types::{ConstraintType, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// AvailabilityConstraint - 单条可用性记录
// ==========================================
// 唯一性: (constraint_type, entity_id, day, period_number, academic_year)
// 违反时以最后写入为准 (仓储层 upsert 保证)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityConstraint {
    pub constraint_id: String,          // 记录ID
    pub constraint_type: ConstraintType, // 约束主体类型 (teacher/room)
    pub entity_id: String,              // 主体ID
    pub day: Weekday,                   // 星期
    pub period_number: i32,             // 节次编号
    pub is_available: bool,             // false = 黑名单时段
    pub academic_year: String,          // 学年
}

// ==========================================
// ConstraintSet - 黑名单查询索引
// ==========================================
// 生成运行开始时从约束快照构建,O(1) 查询
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    // (类型, 主体ID, 星期, 节次) → is_available
    entries: HashMap<(ConstraintType, String, Weekday, i32), bool>,
}

impl ConstraintSet {
    /// 从约束记录列表构建索引
    ///
    /// 同键多条记录按输入顺序覆盖(最后写入为准)
    pub fn from_constraints(constraints: &[AvailabilityConstraint]) -> Self {
        let mut entries = HashMap::new();
        for c in constraints {
            entries.insert(
                (c.constraint_type, c.entity_id.clone(), c.day, c.period_number),
                c.is_available,
            );
        }
        Self { entries }
    }

    /// 判断主体在 (day, period) 是否被黑名单阻断
    ///
    /// 无记录 ⇒ 可用
    pub fn is_blocked(
        &self,
        constraint_type: ConstraintType,
        entity_id: &str,
        day: Weekday,
        period_number: i32,
    ) -> bool {
        !self
            .entries
            .get(&(constraint_type, entity_id.to_string(), day, period_number))
            .copied()
            .unwrap_or(true)
    }

    /// 黑名单记录条数(仅统计 is_available=false)
    pub fn blocked_count(&self) -> usize {
        self.entries.values().filter(|v| !**v).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocked(entity_id: &str, day: Weekday, period: i32) -> AvailabilityConstraint {
        AvailabilityConstraint {
            constraint_id: format!("AC-{}-{}-{}", entity_id, day, period),
            constraint_type: ConstraintType::Teacher,
            entity_id: entity_id.to_string(),
            day,
            period_number: period,
            is_available: false,
            academic_year: "2025".to_string(),
        }
    }

    #[test]
    fn test_absence_means_available() {
        let set = ConstraintSet::from_constraints(&[]);
        assert!(!set.is_blocked(ConstraintType::Teacher, "T1", Weekday::Monday, 1));
    }

    #[test]
    fn test_blocked_entry_is_looked_up() {
        let set = ConstraintSet::from_constraints(&[blocked("T1", Weekday::Monday, 3)]);
        assert!(set.is_blocked(ConstraintType::Teacher, "T1", Weekday::Monday, 3));
        // 其他维度不受影响
        assert!(!set.is_blocked(ConstraintType::Teacher, "T1", Weekday::Monday, 4));
        assert!(!set.is_blocked(ConstraintType::Teacher, "T2", Weekday::Monday, 3));
        assert!(!set.is_blocked(ConstraintType::Room, "T1", Weekday::Monday, 3));
    }

    #[test]
    fn test_last_write_wins() {
        let mut unblocked = blocked("T1", Weekday::Monday, 3);
        unblocked.is_available = true;

        let set = ConstraintSet::from_constraints(&[blocked("T1", Weekday::Monday, 3), unblocked]);
        assert!(!set.is_blocked(ConstraintType::Teacher, "T1", Weekday::Monday, 3));
    }

    #[test]
    fn test_blocked_count() {
        let set = ConstraintSet::from_constraints(&[
            blocked("T1", Weekday::Monday, 1),
            blocked("T1", Weekday::Monday, 2),
        ]);
        assert_eq!(set.blocked_count(), 2);
    }
}
