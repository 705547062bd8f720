// ==========================================
// 学校排课系统 - 互斥索引
// ==========================================
// 职责: 落位可行性检查的 O(1) 占用查询
// 三个维度: 教师占用 / 教室占用 / 班级占用
// 红线: 班级组是原子占用单元,组内任一班级忙即整组不可用
// ==========================================

use crate::domain::constraint::ConstraintSet;
use crate::domain::period_template::PeriodTemplate;
use crate::domain::types::{ConstraintType, Weekday};
use std::collections::HashSet;

// ==========================================
// PlacementBlock - 可行性检查失败分类
// ==========================================
// 分类结果驱动未排原因统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementBlock {
    BreakPeriod,    // 窗口含休息节次
    TeacherBusy,    // 教师已有课
    TeacherBlocked, // 教师被可用性黑名单阻断
    SectionBusy,    // 班级组内有班级已有课
    RoomBusy,       // 教室已有课
    RoomBlocked,    // 教室被可用性黑名单阻断
}

// ==========================================
// ExclusivityIndex - 互斥索引
// ==========================================
// 生成运行私有,运行期间无并发读写
#[derive(Debug, Default)]
pub struct ExclusivityIndex {
    teacher_busy: HashSet<(String, Weekday, i32)>,
    room_busy: HashSet<(String, Weekday, i32)>,
    section_busy: HashSet<(String, Weekday, i32)>,
}

impl ExclusivityIndex {
    /// 构造空索引
    pub fn new() -> Self {
        Self::default()
    }

    /// 检查教师与班级组在窗口 [start, start+length) 的可行性
    ///
    /// 检查顺序: 休息节次 → 教师占用 → 教师黑名单 → 班级占用
    /// 返回首个失败分类
    pub fn check_teacher_sections(
        &self,
        template: &PeriodTemplate,
        constraints: &ConstraintSet,
        teacher_id: &str,
        section_ids: &[String],
        day: Weekday,
        start: i32,
        length: i32,
    ) -> Result<(), PlacementBlock> {
        for p in start..start + length {
            if template.is_break_period(p) {
                return Err(PlacementBlock::BreakPeriod);
            }
            if self.teacher_busy.contains(&(teacher_id.to_string(), day, p)) {
                return Err(PlacementBlock::TeacherBusy);
            }
            if constraints.is_blocked(ConstraintType::Teacher, teacher_id, day, p) {
                return Err(PlacementBlock::TeacherBlocked);
            }
            for section_id in section_ids {
                if self.section_busy.contains(&(section_id.clone(), day, p)) {
                    return Err(PlacementBlock::SectionBusy);
                }
            }
        }
        Ok(())
    }

    /// 检查教室在窗口 [start, start+length) 的可行性
    pub fn check_room(
        &self,
        constraints: &ConstraintSet,
        room_id: &str,
        day: Weekday,
        start: i32,
        length: i32,
    ) -> Result<(), PlacementBlock> {
        for p in start..start + length {
            if self.room_busy.contains(&(room_id.to_string(), day, p)) {
                return Err(PlacementBlock::RoomBusy);
            }
            if constraints.is_blocked(ConstraintType::Room, room_id, day, p) {
                return Err(PlacementBlock::RoomBlocked);
            }
        }
        Ok(())
    }

    /// 落位成功后占用窗口内全部格子
    pub fn occupy(
        &mut self,
        teacher_id: &str,
        section_ids: &[String],
        room_id: Option<&str>,
        day: Weekday,
        start: i32,
        length: i32,
    ) {
        for p in start..start + length {
            self.teacher_busy.insert((teacher_id.to_string(), day, p));
            for section_id in section_ids {
                self.section_busy.insert((section_id.clone(), day, p));
            }
            if let Some(room) = room_id {
                self.room_busy.insert((room.to_string(), day, p));
            }
        }
    }
}
