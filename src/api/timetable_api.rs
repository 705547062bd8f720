// ==========================================
// 学校排课系统 - 课表生成 API
// ==========================================
// 职责: 课表生命周期编排 (生成/激活/删除/查询)
// 红线: 生成前一次性快照全部输入,引擎运行期间不回读存储
// 红线: 结构性失败落库为 failed 状态,不在原记录上重试
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::timetable::{GeneratedTimetable, TimetableSlot, UnassignedSession};
use crate::domain::types::{GenerationStatus, Weekday};
use crate::engine::orchestrator::{GenerationInput, GenerationOrchestrator};
use crate::repository::assignment_repo::TeachingAssignmentRepository;
use crate::repository::constraint_repo::AvailabilityConstraintRepository;
use crate::repository::period_template_repo::PeriodTemplateRepository;
use crate::repository::room_repo::RoomRepository;
use crate::repository::timetable_repo::GeneratedTimetableRepository;

// ==========================================
// DTO 定义
// ==========================================

/// 生成课表请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateTimetableRequest {
    pub name: String,
    pub academic_year: String,
    /// 未指定时使用该学年当前激活的作息模板
    pub period_template_id: Option<String>,
}

/// 生成课表响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateTimetableResponse {
    pub success: bool,
    pub timetable_id: Option<String>,
    pub status: String,
    pub total_sessions: i32,
    pub assigned_sessions: i32,
    pub unassigned_sessions: i32,
    pub message: String,
}

/// 格子查询过滤维度 (班级视图/教师视图/教室视图)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellFilter {
    Section(String),
    Teacher(String),
    Room(String),
}

// ==========================================
// TimetableApi
// ==========================================

/// 课表生成 API
///
/// 职责:
/// 1. 触发生成运行 (快照输入 → 引擎 → 结果落库)
/// 2. 课表激活/删除/查询
/// 3. 课表格子视图查询
pub struct TimetableApi {
    template_repo: Arc<PeriodTemplateRepository>,
    room_repo: Arc<RoomRepository>,
    assignment_repo: Arc<TeachingAssignmentRepository>,
    constraint_repo: Arc<AvailabilityConstraintRepository>,
    timetable_repo: Arc<GeneratedTimetableRepository>,
    orchestrator: GenerationOrchestrator,
}

impl TimetableApi {
    /// 创建新的 TimetableApi 实例
    pub fn new(
        template_repo: Arc<PeriodTemplateRepository>,
        room_repo: Arc<RoomRepository>,
        assignment_repo: Arc<TeachingAssignmentRepository>,
        constraint_repo: Arc<AvailabilityConstraintRepository>,
        timetable_repo: Arc<GeneratedTimetableRepository>,
    ) -> Self {
        Self {
            template_repo,
            room_repo,
            assignment_repo,
            constraint_repo,
            timetable_repo,
            orchestrator: GenerationOrchestrator::new(),
        }
    }

    // ==========================================
    // 生成运行
    // ==========================================

    /// 触发一次课表生成运行
    ///
    /// # 流程
    /// 1. 解析作息模板 (显式指定或学年激活模板)
    /// 2. 创建 pending 课表记录,切到 generating
    /// 3. 快照输入 (任务/约束/教室)
    /// 4. 引擎运行;成功落库 completed,结构性失败落库 failed
    #[instrument(skip(self), fields(academic_year = %request.academic_year))]
    pub fn generate_timetable(
        &self,
        request: GenerateTimetableRequest,
    ) -> ApiResult<GenerateTimetableResponse> {
        self.validate_generate_request(&request)?;

        // 解析作息模板
        let template = match &request.period_template_id {
            Some(id) => self.template_repo.find_by_id(id)?,
            None => self.template_repo.find_active_by_year(&request.academic_year)?,
        };
        let Some(template) = template else {
            warn!("生成请求被拒绝: 未找到可用的作息模板");
            return Ok(GenerateTimetableResponse {
                success: false,
                timetable_id: None,
                status: GenerationStatus::Failed.to_db_str().to_string(),
                total_sessions: 0,
                assigned_sessions: 0,
                unassigned_sessions: 0,
                message: "未找到可用的作息模板".to_string(),
            });
        };

        // 创建课表记录
        let timetable_id = Uuid::new_v4().to_string();
        self.timetable_repo.create(&GeneratedTimetable {
            timetable_id: timetable_id.clone(),
            name: request.name.clone(),
            academic_year: request.academic_year.clone(),
            period_template_id: template.template_id.clone(),
            generation_status: GenerationStatus::Pending,
            total_sessions: 0,
            assigned_sessions: 0,
            unassigned_sessions: 0,
            generation_log: vec![],
            is_active: false,
            created_at: chrono::Utc::now().naive_utc(),
        })?;
        self.timetable_repo
            .update_status(&timetable_id, GenerationStatus::Generating)?;

        // 快照输入
        let input = GenerationInput {
            template,
            assignments: self.assignment_repo.list_by_year(&request.academic_year)?,
            constraints: self.constraint_repo.list_by_year(&request.academic_year)?,
            rooms: self.room_repo.list_all()?,
        };

        // 引擎运行
        match self.orchestrator.run(&input) {
            Ok(outcome) => {
                let slots: Vec<TimetableSlot> = outcome
                    .placements
                    .iter()
                    .map(|p| TimetableSlot {
                        slot_id: Uuid::new_v4().to_string(),
                        timetable_id: timetable_id.clone(),
                        teacher_id: p.teacher_id.clone(),
                        subject_id: p.subject_id.clone(),
                        section_ids: p.section_ids.clone(),
                        day: p.day,
                        period_number: p.start_period,
                        session_length: p.session_length,
                        room_id: p.room_id.clone(),
                    })
                    .collect();
                let unassigned: Vec<UnassignedSession> = outcome
                    .unassigned
                    .iter()
                    .map(|u| UnassignedSession {
                        session_id: Uuid::new_v4().to_string(),
                        timetable_id: timetable_id.clone(),
                        teaching_assignment_id: u.teaching_assignment_id.clone(),
                        conflict_reasons: u.conflict_reasons.clone(),
                        suggested_fixes: u.suggested_fixes.clone(),
                    })
                    .collect();

                self.timetable_repo.store_generation_result(
                    &timetable_id,
                    GenerationStatus::Completed,
                    outcome.total_sessions,
                    &slots,
                    &unassigned,
                    &outcome.generation_log,
                )?;

                info!(
                    timetable_id = %timetable_id,
                    total = outcome.total_sessions,
                    assigned = outcome.assigned_sessions,
                    unassigned = outcome.unassigned_count,
                    "课表生成完成"
                );
                Ok(GenerateTimetableResponse {
                    success: true,
                    timetable_id: Some(timetable_id),
                    status: GenerationStatus::Completed.to_db_str().to_string(),
                    total_sessions: outcome.total_sessions,
                    assigned_sessions: outcome.assigned_sessions,
                    unassigned_sessions: outcome.unassigned_count,
                    message: format!(
                        "生成完成: 应排 {} / 已排 {} / 未排 {}",
                        outcome.total_sessions, outcome.assigned_sessions, outcome.unassigned_count
                    ),
                })
            }
            Err(engine_err) => {
                let message = engine_err.to_string();
                error!(timetable_id = %timetable_id, error = %message, "课表生成失败");
                self.timetable_repo
                    .mark_failed(&timetable_id, &[format!("生成失败: {}", message)])?;

                Ok(GenerateTimetableResponse {
                    success: false,
                    timetable_id: Some(timetable_id),
                    status: GenerationStatus::Failed.to_db_str().to_string(),
                    total_sessions: 0,
                    assigned_sessions: 0,
                    unassigned_sessions: 0,
                    message,
                })
            }
        }
    }

    // ==========================================
    // 课表生命周期
    // ==========================================

    /// 激活课表 (同学年独占,仅 completed 可激活)
    pub fn set_active_timetable(&self, timetable_id: &str) -> ApiResult<()> {
        let timetable = self
            .timetable_repo
            .find_by_id(timetable_id)?
            .ok_or_else(|| ApiError::NotFound(format!("课表(id={})不存在", timetable_id)))?;

        if !timetable.is_completed() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "课表 {} 状态为 {},仅 completed 状态可激活",
                timetable_id, timetable.generation_status
            )));
        }

        self.timetable_repo.set_active_exclusive(timetable_id)?;
        info!(timetable_id = %timetable_id, "课表已激活");
        Ok(())
    }

    /// 删除课表 (课次/未排记录级联删除)
    pub fn delete_timetable(&self, timetable_id: &str) -> ApiResult<()> {
        let affected = self.timetable_repo.delete_by_id(timetable_id)?;
        if affected == 0 {
            return Err(ApiError::NotFound(format!("课表(id={})不存在", timetable_id)));
        }
        info!(timetable_id = %timetable_id, "课表已删除");
        Ok(())
    }

    /// 查询课表记录
    pub fn get_timetable(&self, timetable_id: &str) -> ApiResult<Option<GeneratedTimetable>> {
        Ok(self.timetable_repo.find_by_id(timetable_id)?)
    }

    /// 列出某学年全部课表 (最新在前)
    pub fn list_timetables(&self, academic_year: &str) -> ApiResult<Vec<GeneratedTimetable>> {
        Ok(self.timetable_repo.list_by_year(academic_year)?)
    }

    // ==========================================
    // 结果查询
    // ==========================================

    /// 查询课表全部课次
    pub fn get_timetable_slots(&self, timetable_id: &str) -> ApiResult<Vec<TimetableSlot>> {
        Ok(self.timetable_repo.list_slots(timetable_id)?)
    }

    /// 查询课表全部未排记录
    pub fn get_unassigned_sessions(&self, timetable_id: &str) -> ApiResult<Vec<UnassignedSession>> {
        Ok(self.timetable_repo.list_unassigned(timetable_id)?)
    }

    /// 按视图维度查询覆盖某 (日, 节次) 格子的课次
    ///
    /// 班级/教师/教室三种视图;互斥不变式保证每个视图至多命中一条
    pub fn find_slot_for_cell(
        &self,
        timetable_id: &str,
        filter: &CellFilter,
        day: Weekday,
        period_number: i32,
    ) -> ApiResult<Option<TimetableSlot>> {
        let slots = self
            .timetable_repo
            .find_slots_for_cell(timetable_id, day, period_number)?;

        Ok(slots.into_iter().find(|slot| match filter {
            CellFilter::Section(id) => slot.section_ids.iter().any(|s| s == id),
            CellFilter::Teacher(id) => &slot.teacher_id == id,
            CellFilter::Room(id) => slot.room_id.as_deref() == Some(id.as_str()),
        }))
    }

    // ==========================================
    // 私有辅助方法
    // ==========================================

    fn validate_generate_request(&self, request: &GenerateTimetableRequest) -> ApiResult<()> {
        if request.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("name 不能为空".to_string()));
        }
        if request.academic_year.trim().is_empty() {
            return Err(ApiError::InvalidInput("academic_year 不能为空".to_string()));
        }
        Ok(())
    }
}
