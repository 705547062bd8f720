// ==========================================
// 学校排课系统 - 领域类型定义
// ==========================================
// 序列化格式: 小写字符串 (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 星期 (Weekday)
// ==========================================
// 作息模板的 days_of_week 顺序即展示顺序,排课按该顺序遍历
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Weekday {
    /// 从字符串解析星期
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monday" => Some(Weekday::Monday),
            "tuesday" => Some(Weekday::Tuesday),
            "wednesday" => Some(Weekday::Wednesday),
            "thursday" => Some(Weekday::Thursday),
            "friday" => Some(Weekday::Friday),
            "saturday" => Some(Weekday::Saturday),
            "sunday" => Some(Weekday::Sunday),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }
}

// ==========================================
// 生成状态 (Generation Status)
// ==========================================
// 状态机: pending → generating → {completed | failed}
// 不在已完成的课表上原地重试,失败通过新建生成记录解决
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Pending,    // 待生成
    Generating, // 生成中
    Completed,  // 已完成(允许存在未排课时)
    Failed,     // 结构性失败
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl GenerationStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "generating" => GenerationStatus::Generating,
            "completed" => GenerationStatus::Completed,
            "failed" => GenerationStatus::Failed,
            _ => GenerationStatus::Pending, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            GenerationStatus::Pending => "pending",
            GenerationStatus::Generating => "generating",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Failed => "failed",
        }
    }
}

// ==========================================
// 约束主体类型 (Constraint Type)
// ==========================================
// 可用性黑名单作用于教师或教室
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintType {
    Teacher, // 教师
    Room,    // 教室
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ConstraintType {
    /// 从字符串解析约束主体类型
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "teacher" => Some(ConstraintType::Teacher),
            "room" => Some(ConstraintType::Room),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ConstraintType::Teacher => "teacher",
            ConstraintType::Room => "room",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_roundtrip() {
        for day in [
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
            Weekday::Saturday,
            Weekday::Sunday,
        ] {
            assert_eq!(Weekday::from_str(day.to_db_str()), Some(day));
        }
        assert_eq!(Weekday::from_str("MONDAY"), Some(Weekday::Monday));
        assert_eq!(Weekday::from_str("funday"), None);
    }

    #[test]
    fn test_generation_status_parse() {
        assert_eq!(GenerationStatus::from_str("completed"), GenerationStatus::Completed);
        assert_eq!(GenerationStatus::from_str("FAILED"), GenerationStatus::Failed);
        // 未知字符串回退为 pending
        assert_eq!(GenerationStatus::from_str("???"), GenerationStatus::Pending);
    }

    #[test]
    fn test_constraint_type_parse() {
        assert_eq!(ConstraintType::from_str("teacher"), Some(ConstraintType::Teacher));
        assert_eq!(ConstraintType::from_str("room"), Some(ConstraintType::Room));
        assert_eq!(ConstraintType::from_str("student"), None);
    }
}
