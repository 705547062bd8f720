// ==========================================
// 学校排课系统 - 作息模板领域模型
// ==========================================
// 职责: 定义周期网格(活动日 × 每日节次)与课间休息标记
// 红线: 纯值对象,不含数据访问逻辑
// ==========================================

use crate::domain::types::Weekday;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ==========================================
// PeriodTiming - 单节次时刻信息
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTiming {
    pub period_number: i32,         // 节次编号 (1..=periods_per_day)
    pub start_time: Option<String>, // 开始时刻 "HH:MM" (仅展示用)
    pub end_time: Option<String>,   // 结束时刻 "HH:MM" (仅展示用)
    pub is_break: bool,             // 课间休息标记,休息节次不参与排课
}

// ==========================================
// PeriodTemplate - 作息模板 (时间网格)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodTemplate {
    pub template_id: String,         // 模板ID
    pub name: String,                // 模板名称
    pub academic_year: String,       // 学年
    pub days_of_week: Vec<Weekday>,  // 活动日,顺序即展示/遍历顺序
    pub periods_per_day: i32,        // 每日节次数 (≥1)
    pub period_timings: Vec<PeriodTiming>, // 各节次时刻与休息标记
    pub is_active: bool,             // 激活标记 (同一时刻至多一个激活)
    pub created_at: NaiveDateTime,   // 创建时间
}

impl PeriodTemplate {
    /// 判断某节次是否为课间休息
    ///
    /// period_timings 中未出现的节次视为非休息
    pub fn is_break_period(&self, period_number: i32) -> bool {
        self.period_timings
            .iter()
            .any(|t| t.period_number == period_number && t.is_break)
    }

    /// 所有休息节次的集合
    pub fn break_periods(&self) -> HashSet<i32> {
        self.period_timings
            .iter()
            .filter(|t| t.is_break)
            .map(|t| t.period_number)
            .collect()
    }

    /// 给定连续节数,返回全部合法起始节次(升序)
    ///
    /// 合法条件:
    /// - 窗口 [p, p+session_length-1] 完整落在 [1, periods_per_day] 内
    /// - 窗口内不含任何休息节次
    pub fn valid_start_periods(&self, session_length: i32) -> Vec<i32> {
        if session_length < 1 {
            return Vec::new();
        }

        let breaks = self.break_periods();
        let mut starts = Vec::new();
        for p in 1..=(self.periods_per_day - session_length + 1) {
            let window_clear = (p..p + session_length).all(|q| !breaks.contains(&q));
            if window_clear {
                starts.push(p);
            }
        }
        starts
    }

    /// 判断某日是否为活动日
    pub fn contains_day(&self, day: Weekday) -> bool {
        self.days_of_week.contains(&day)
    }

    /// 结构性校验:活动日非空且每日节次数 ≥ 1
    pub fn is_structurally_valid(&self) -> bool {
        !self.days_of_week.is_empty() && self.periods_per_day >= 1
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_template(periods_per_day: i32, break_periods: &[i32]) -> PeriodTemplate {
        let timings = (1..=periods_per_day)
            .map(|p| PeriodTiming {
                period_number: p,
                start_time: None,
                end_time: None,
                is_break: break_periods.contains(&p),
            })
            .collect();

        PeriodTemplate {
            template_id: "PT-TEST".to_string(),
            name: "测试模板".to_string(),
            academic_year: "2025".to_string(),
            days_of_week: vec![
                Weekday::Monday,
                Weekday::Tuesday,
                Weekday::Wednesday,
                Weekday::Thursday,
                Weekday::Friday,
            ],
            periods_per_day,
            period_timings: timings,
            is_active: true,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_break_period_lookup() {
        let template = create_test_template(6, &[3]);
        assert!(template.is_break_period(3));
        assert!(!template.is_break_period(1));
        // 未声明的节次视为非休息
        assert!(!template.is_break_period(99));
    }

    #[test]
    fn test_valid_start_periods_avoid_break_window() {
        // 6节/天,第3节为休息,连排2节 → 合法起始节次只有 {1,4,5}
        let template = create_test_template(6, &[3]);
        assert_eq!(template.valid_start_periods(2), vec![1, 4, 5]);
    }

    #[test]
    fn test_valid_start_periods_single_length() {
        let template = create_test_template(6, &[3]);
        assert_eq!(template.valid_start_periods(1), vec![1, 2, 4, 5, 6]);
    }

    #[test]
    fn test_valid_start_periods_too_long() {
        let template = create_test_template(4, &[]);
        assert_eq!(template.valid_start_periods(5), Vec::<i32>::new());
    }

    #[test]
    fn test_structural_validity() {
        let mut template = create_test_template(6, &[]);
        assert!(template.is_structurally_valid());

        template.days_of_week.clear();
        assert!(!template.is_structurally_valid());
    }
}
