// ==========================================
// 学校排课系统 - 生成编排器
// ==========================================
// 职责: 串联一次完整生成运行 (校验 → 约束集 → 展开 → 落位)
// 红线: 输入为调用前一次性取得的快照,运行期间不回读存储
// 红线: 结构性失败返回 Err;单课次落位失败只计入 unassigned
// ==========================================
// 执行流程:
//   步骤1: 结构性校验 (模板/任务一致性)
//   步骤2: 构建可用性约束查询集
//   步骤3: 请求展开 (确定性排序)
//   步骤4: 贪心落位
//   步骤5: 汇总计数与生成日志
// ==========================================

use crate::domain::assignment::{Room, TeachingAssignment};
use crate::domain::constraint::{AvailabilityConstraint, ConstraintSet};
use crate::domain::period_template::PeriodTemplate;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::expansion::RequestExpander;
use crate::engine::scheduler::{SlotPlacement, TimetableScheduler, UnassignedDraft};
use tracing::{info, instrument};

// ==========================================
// GenerationInput - 一次生成运行的输入快照
// ==========================================
#[derive(Debug)]
pub struct GenerationInput {
    pub template: PeriodTemplate,
    pub assignments: Vec<TeachingAssignment>, // 学年内全部任务 (含未启用,引擎内过滤)
    pub constraints: Vec<AvailabilityConstraint>,
    pub rooms: Vec<Room>,
}

// ==========================================
// GenerationOutcome - 一次生成运行的输出
// ==========================================
#[derive(Debug)]
pub struct GenerationOutcome {
    pub placements: Vec<SlotPlacement>,
    pub unassigned: Vec<UnassignedDraft>,
    pub generation_log: Vec<String>,
    pub total_sessions: i32,
    pub assigned_sessions: i32,
    pub unassigned_count: i32,
}

// ==========================================
// GenerationOrchestrator - 生成编排器
// ==========================================
pub struct GenerationOrchestrator {
    expander: RequestExpander,
    scheduler: TimetableScheduler,
}

impl GenerationOrchestrator {
    /// 构造函数
    pub fn new() -> Self {
        Self {
            expander: RequestExpander::new(),
            scheduler: TimetableScheduler::new(),
        }
    }

    /// 执行一次完整生成运行
    #[instrument(skip_all, fields(template_id = %input.template.template_id))]
    pub fn run(&self, input: &GenerationInput) -> EngineResult<GenerationOutcome> {
        let mut generation_log = Vec::new();

        // 步骤1: 结构性校验
        info!("步骤1: 结构性校验");
        self.validate(input)?;
        generation_log.push(format!(
            "生成开始: 模板 {} ({} 日 × {} 节)",
            input.template.template_id,
            input.template.days_of_week.len(),
            input.template.periods_per_day
        ));

        // 启用任务按创建顺序排列 (确定性依据)
        let mut active: Vec<TeachingAssignment> = input
            .assignments
            .iter()
            .filter(|a| a.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.assignment_id.cmp(&b.assignment_id))
        });

        let total_sessions: i32 = active.iter().map(|a| a.sessions_per_week).sum();
        generation_log.push(format!(
            "输入快照: {} 条启用任务, 共 {} 个课次, {} 条约束, {} 间教室",
            active.len(),
            total_sessions,
            input.constraints.len(),
            input.rooms.len()
        ));

        // 步骤2: 构建约束查询集 (同键后写覆盖先写)
        info!("步骤2: 构建可用性约束查询集");
        let constraint_set = ConstraintSet::from_constraints(&input.constraints);

        // 步骤3: 请求展开
        info!("步骤3: 请求展开");
        let (requests, warnings) = self.expander.expand(&active, &input.template);
        for warning in &warnings {
            generation_log.push(format!("配置警告: {}", warning));
        }
        generation_log.push(format!("请求展开完成: {} 个落位请求", requests.len()));

        // 步骤4: 贪心落位
        info!(requests_count = requests.len(), "步骤4: 贪心落位");
        let outcome = self
            .scheduler
            .schedule(&input.template, &constraint_set, &input.rooms, &requests);
        generation_log.extend(outcome.log);

        // 步骤5: 汇总
        let assigned_sessions = outcome.placements.len() as i32;
        let unassigned_count = outcome.unassigned.len() as i32;
        generation_log.push(format!(
            "生成完成: 应排 {} / 已排 {} / 未排 {}",
            total_sessions, assigned_sessions, unassigned_count
        ));
        info!(
            total_sessions,
            assigned_sessions, unassigned_count, "步骤5: 生成运行结束"
        );

        Ok(GenerationOutcome {
            placements: outcome.placements,
            unassigned: outcome.unassigned,
            generation_log,
            total_sessions,
            assigned_sessions,
            unassigned_count,
        })
    }

    /// 结构性校验,任一失败整个运行失败
    fn validate(&self, input: &GenerationInput) -> EngineResult<()> {
        let template = &input.template;

        if !template.is_structurally_valid() {
            return Err(EngineError::InvalidTemplate(format!(
                "模板 {} 活动日为空或每日节次数 < 1",
                template.template_id
            )));
        }
        if template.valid_start_periods(1).is_empty() {
            return Err(EngineError::InvalidTemplate(format!(
                "模板 {} 全部节次均为休息,无可排窗口",
                template.template_id
            )));
        }

        let mut has_active = false;
        for assignment in &input.assignments {
            if !assignment.is_active {
                continue;
            }
            has_active = true;
            if let Some(problem) = assignment.consistency_error(template.periods_per_day) {
                return Err(EngineError::InconsistentAssignment(problem));
            }
        }
        if !has_active {
            return Err(EngineError::NoAssignments);
        }

        Ok(())
    }
}

impl Default for GenerationOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}
