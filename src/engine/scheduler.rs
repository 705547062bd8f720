// ==========================================
// 学校排课系统 - 贪心落位调度器
// ==========================================
// 职责: 按展开后的请求顺序逐个搜索首个可行 (日, 节次, 教室)
// 红线: 单遍贪心,不回溯;已落位课次绝不因后续失败被移动
// 红线: 候选遍历顺序必须确定 (日按模板顺序,节次升序,教室按规则排序)
// ==========================================

use crate::domain::assignment::{Room, TeachingAssignment};
use crate::domain::constraint::ConstraintSet;
use crate::domain::period_template::PeriodTemplate;
use crate::domain::types::Weekday;
use crate::engine::diagnostics::{conflict_reasons, suggested_fixes, FailureTally};
use crate::engine::exclusivity::{ExclusivityIndex, PlacementBlock};
use crate::engine::expansion::{PlacementRequest, RequestKind};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

// ==========================================
// SlotPlacement - 调度器产出的落位结果
// ==========================================
#[derive(Debug, Clone)]
pub struct SlotPlacement {
    pub assignment_id: String,
    pub teacher_id: String,
    pub subject_id: String,
    pub section_ids: Vec<String>,
    pub day: Weekday,
    pub start_period: i32,
    pub session_length: i32,
    pub room_id: Option<String>, // 系统无启用教室时为空
}

// ==========================================
// UnassignedDraft - 未排课次草稿
// ==========================================
#[derive(Debug, Clone)]
pub struct UnassignedDraft {
    pub teaching_assignment_id: String,
    pub conflict_reasons: Vec<String>,
    pub suggested_fixes: Vec<String>,
}

// ==========================================
// ScheduleOutcome - 一次调度运行的完整结果
// ==========================================
#[derive(Debug)]
pub struct ScheduleOutcome {
    pub placements: Vec<SlotPlacement>,
    pub unassigned: Vec<UnassignedDraft>,
    pub log: Vec<String>,
}

// ==========================================
// TimetableScheduler - 贪心调度器
// ==========================================
pub struct TimetableScheduler {
    // 无状态引擎,运行状态在 schedule 内部构建
}

impl TimetableScheduler {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 按请求顺序执行单遍贪心落位
    ///
    /// # 参数
    /// - `template`: 作息模板 (结构有效性由上游保证)
    /// - `constraints`: 可用性黑名单查询集
    /// - `rooms`: 教室主数据快照 (含未启用教室)
    /// - `requests`: 展开后的有序落位请求
    #[instrument(skip_all, fields(requests_count = requests.len()))]
    pub fn schedule(
        &self,
        template: &PeriodTemplate,
        constraints: &ConstraintSet,
        rooms: &[Room],
        requests: &[PlacementRequest],
    ) -> ScheduleOutcome {
        let mut index = ExclusivityIndex::new();
        let mut placements = Vec::new();
        let mut unassigned = Vec::new();
        let mut log = Vec::new();

        // 启用教室,按 (容量升序, 名称, ID) 确定性排序
        let mut active_rooms: Vec<&Room> = rooms.iter().filter(|r| r.is_active).collect();
        active_rooms.sort_by(|a, b| {
            a.capacity
                .cmp(&b.capacity)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.room_id.cmp(&b.room_id))
        });
        let no_rooms_in_system = active_rooms.is_empty();

        // 每日同时段任务的运行状态 (按任务序号)
        let mut pattern_start: HashMap<usize, i32> = HashMap::new();
        let mut pattern_days_used: HashMap<usize, HashSet<Weekday>> = HashMap::new();

        for request in requests {
            let assignment = &request.assignment;
            let mut tally = FailureTally::default();

            // 候选日列表 (按模板活动日顺序)
            let candidate_days =
                self.candidate_days(request, template, &pattern_days_used, &mut tally);

            // 候选起始节次列表 (升序;每日同时段任务锁定后只剩锁定节次)
            let candidate_starts =
                self.candidate_starts(request, template, &pattern_start, &mut tally);

            // 候选教室列表 (钉死教室只含首个偏好;其余为偏好序 + 容量序)
            let candidate_rooms =
                self.candidate_rooms(assignment, &active_rooms, no_rooms_in_system, &mut tally);

            let mut placed = false;

            if !tally.room_fixed_missing {
                'search: for &day in &candidate_days {
                    for &start in &candidate_starts {
                        tally.windows_tried += 1;

                        match index.check_teacher_sections(
                            template,
                            constraints,
                            &assignment.teacher_id,
                            &assignment.section_ids,
                            day,
                            start,
                            assignment.session_length,
                        ) {
                            Err(PlacementBlock::TeacherBusy)
                            | Err(PlacementBlock::TeacherBlocked) => {
                                tally.teacher_blocks += 1;
                                continue;
                            }
                            Err(PlacementBlock::SectionBusy) => {
                                tally.section_blocks += 1;
                                continue;
                            }
                            Err(_) => continue, // 休息节次窗口
                            Ok(()) => {}
                        }

                        // 教师/班级维度可行,搜索教室
                        let room_id = if no_rooms_in_system {
                            Some(None) // 系统无启用教室,落位不占教室
                        } else {
                            candidate_rooms
                                .iter()
                                .find(|r| {
                                    index
                                        .check_room(
                                            constraints,
                                            &r.room_id,
                                            day,
                                            start,
                                            assignment.session_length,
                                        )
                                        .is_ok()
                                })
                                .map(|r| Some(r.room_id.clone()))
                        };

                        let Some(room_id) = room_id else {
                            tally.room_blocks += 1;
                            continue;
                        };

                        index.occupy(
                            &assignment.teacher_id,
                            &assignment.section_ids,
                            room_id.as_deref(),
                            day,
                            start,
                            assignment.session_length,
                        );
                        placements.push(SlotPlacement {
                            assignment_id: assignment.assignment_id.clone(),
                            teacher_id: assignment.teacher_id.clone(),
                            subject_id: assignment.subject_id.clone(),
                            section_ids: assignment.section_ids.clone(),
                            day,
                            start_period: start,
                            session_length: assignment.session_length,
                            room_id,
                        });

                        // 每日同时段任务: 首次落位(含钉点)锁定起始节次
                        if assignment.same_daily_pattern {
                            pattern_start
                                .entry(request.assignment_index)
                                .or_insert(start);
                            pattern_days_used
                                .entry(request.assignment_index)
                                .or_default()
                                .insert(day);
                        }

                        placed = true;
                        break 'search;
                    }
                }
            }

            if !placed {
                let pinned = request.kind == RequestKind::Pinned;
                let reasons = conflict_reasons(assignment, &tally, pinned);
                let fixes = suggested_fixes(assignment, &tally);
                log.push(format!(
                    "课次落位失败: 任务 {} ({})",
                    assignment.assignment_id,
                    reasons.join("; ")
                ));
                unassigned.push(UnassignedDraft {
                    teaching_assignment_id: assignment.assignment_id.clone(),
                    conflict_reasons: reasons,
                    suggested_fixes: fixes,
                });
            }
        }

        debug!(
            placed = placements.len(),
            unassigned = unassigned.len(),
            "贪心落位完成"
        );

        ScheduleOutcome {
            placements,
            unassigned,
            log,
        }
    }

    /// 计算请求的候选日列表
    fn candidate_days(
        &self,
        request: &PlacementRequest,
        template: &PeriodTemplate,
        pattern_days_used: &HashMap<usize, HashSet<Weekday>>,
        tally: &mut FailureTally,
    ) -> Vec<Weekday> {
        // 钉点请求只考虑钉点日,且钉点日必须是活动日
        if let Some((day, _)) = request.pinned_at {
            return if template.contains_day(day) {
                vec![day]
            } else {
                Vec::new()
            };
        }

        let allowed = |d: &Weekday| match &request.assignment.allowed_days {
            Some(days) => days.contains(d),
            None => true,
        };

        let mut days: Vec<Weekday> = template
            .days_of_week
            .iter()
            .filter(|d| allowed(d))
            .copied()
            .collect();

        if days.is_empty() {
            tally.no_candidate_days = true;
            return days;
        }

        // 每日同时段任务: 排除本任务已占用的日
        if request.assignment.same_daily_pattern {
            if let Some(used) = pattern_days_used.get(&request.assignment_index) {
                days.retain(|d| !used.contains(d));
                if days.is_empty() {
                    tally.pattern_exhausted = true;
                }
            }
        }

        days
    }

    /// 计算请求的候选起始节次列表
    fn candidate_starts(
        &self,
        request: &PlacementRequest,
        template: &PeriodTemplate,
        pattern_start: &HashMap<usize, i32>,
        tally: &mut FailureTally,
    ) -> Vec<i32> {
        let valid = template.valid_start_periods(request.assignment.session_length);

        // 钉点请求只考虑钉点节次,且窗口必须合法
        if let Some((_, period)) = request.pinned_at {
            return if valid.contains(&period) {
                vec![period]
            } else {
                Vec::new()
            };
        }

        // 每日同时段任务: 锁定后只剩锁定节次
        if request.assignment.same_daily_pattern {
            if let Some(&locked) = pattern_start.get(&request.assignment_index) {
                if valid.contains(&locked) {
                    return vec![locked];
                }
                tally.pattern_exhausted = true;
                return Vec::new();
            }
        }

        valid
    }

    /// 计算请求的候选教室列表
    ///
    /// - room_fixed: 仅首个偏好教室,缺失或未启用则记入 tally 直接失败
    /// - 非固定: 偏好教室按声明顺序在前,其余启用教室按容量序在后
    fn candidate_rooms<'a>(
        &self,
        assignment: &TeachingAssignment,
        active_rooms: &[&'a Room],
        no_rooms_in_system: bool,
        tally: &mut FailureTally,
    ) -> Vec<&'a Room> {
        if no_rooms_in_system {
            return Vec::new();
        }

        let find_active = |id: &str| active_rooms.iter().find(|r| r.room_id == id).copied();

        if assignment.room_fixed && !assignment.preferred_room_ids.is_empty() {
            return match find_active(&assignment.preferred_room_ids[0]) {
                Some(room) => vec![room],
                None => {
                    tally.room_fixed_missing = true;
                    Vec::new()
                }
            };
        }

        let mut rooms: Vec<&Room> = assignment
            .preferred_room_ids
            .iter()
            .filter_map(|id| find_active(id))
            .collect();
        for room in active_rooms {
            if !rooms.iter().any(|r| r.room_id == room.room_id) {
                rooms.push(room);
            }
        }
        rooms
    }
}

impl Default for TimetableScheduler {
    fn default() -> Self {
        Self::new()
    }
}
