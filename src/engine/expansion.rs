// ==========================================
// 学校排课系统 - 请求展开引擎
// ==========================================
// 职责: 把每条教学任务展开为若干原子落位请求
// 红线: 展开顺序必须确定,保证重复运行输出逐位一致
// ==========================================
// 排序规则: 钉点请求 → 每日同时段请求 → 自由请求
//           自由请求按连排节数降序(长课次先排),同级按任务创建顺序
// ==========================================

use crate::domain::assignment::TeachingAssignment;
use crate::domain::period_template::PeriodTemplate;
use crate::domain::types::Weekday;
use tracing::debug;

// ==========================================
// RequestKind - 落位请求类别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Pinned,      // 固定日/节钉点
    SamePattern, // 每日同一时段
    Flexible,    // 自由落位
}

impl RequestKind {
    /// 排序序号,越小越先尝试
    fn rank(&self) -> u8 {
        match self {
            RequestKind::Pinned => 0,
            RequestKind::SamePattern => 1,
            RequestKind::Flexible => 2,
        }
    }
}

// ==========================================
// PlacementRequest - 原子落位请求
// ==========================================
// 一条请求对应一周内的一个课次实例
#[derive(Debug, Clone)]
pub struct PlacementRequest {
    pub assignment_index: usize,        // 任务创建顺序序号(确定性排序依据)
    pub assignment: TeachingAssignment, // 所属教学任务快照
    pub kind: RequestKind,              // 请求类别
    pub pinned_at: Option<(Weekday, i32)>, // 钉点 (day, 起始节次)
}

// ==========================================
// RequestExpander - 请求展开引擎
// ==========================================
pub struct RequestExpander {
    // 无状态引擎
}

impl RequestExpander {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 展开教学任务列表为有序落位请求
    ///
    /// # 参数
    /// - `assignments`: 按创建顺序排列的启用任务快照
    /// - `template`: 作息模板
    ///
    /// # 返回
    /// (有序请求列表, 配置警告列表)
    pub fn expand(
        &self,
        assignments: &[TeachingAssignment],
        template: &PeriodTemplate,
    ) -> (Vec<PlacementRequest>, Vec<String>) {
        let mut requests = Vec::new();
        let mut warnings = Vec::new();

        for (index, assignment) in assignments.iter().enumerate() {
            if !assignment.is_active {
                continue;
            }

            let mut remaining = assignment.sessions_per_week;

            // 钉点请求: fixed_day + fixed_period 同时设置时恰好消耗一个课次
            if assignment.has_fixed_pin() {
                let day = assignment.fixed_day.unwrap_or(Weekday::Monday);
                let period = assignment.fixed_period.unwrap_or(1);
                requests.push(PlacementRequest {
                    assignment_index: index,
                    assignment: assignment.clone(),
                    kind: RequestKind::Pinned,
                    pinned_at: Some((day, period)),
                });
                remaining -= 1;
            }

            let kind = if assignment.same_daily_pattern {
                RequestKind::SamePattern
            } else {
                RequestKind::Flexible
            };

            for _ in 0..remaining {
                requests.push(PlacementRequest {
                    assignment_index: index,
                    assignment: assignment.clone(),
                    kind,
                    pinned_at: None,
                });
            }

            // 配置警告: 每日同时段任务的可用日不足以容纳全部课次
            if assignment.same_daily_pattern {
                let qualifying_days = qualifying_day_count(assignment, template);
                if (qualifying_days as i32) < assignment.sessions_per_week {
                    warnings.push(format!(
                        "SAME_PATTERN_INSUFFICIENT_DAYS: assignment {} needs {} sessions but only {} qualifying days",
                        assignment.assignment_id, assignment.sessions_per_week, qualifying_days
                    ));
                }
            }

            // 配置警告: room_fixed 但未指定偏好教室,按非固定处理
            if assignment.room_fixed && assignment.preferred_room_ids.is_empty() {
                warnings.push(format!(
                    "ROOM_FIXED_WITHOUT_PREFERENCE: assignment {} has room_fixed but no preferred rooms, treated as not fixed",
                    assignment.assignment_id
                ));
            }
        }

        // 确定性全序: (类别, 连排节数降序, 创建顺序升序)
        requests.sort_by(|a, b| {
            a.kind
                .rank()
                .cmp(&b.kind.rank())
                .then(b.assignment.session_length.cmp(&a.assignment.session_length))
                .then(a.assignment_index.cmp(&b.assignment_index))
        });

        debug!(
            requests_count = requests.len(),
            warnings_count = warnings.len(),
            "请求展开完成"
        );

        (requests, warnings)
    }
}

impl Default for RequestExpander {
    fn default() -> Self {
        Self::new()
    }
}

/// 任务在模板下的合格排课日数量 (allowed_days ∩ 活动日)
fn qualifying_day_count(assignment: &TeachingAssignment, template: &PeriodTemplate) -> usize {
    template
        .days_of_week
        .iter()
        .filter(|d| match &assignment.allowed_days {
            Some(allowed) => allowed.contains(d),
            None => true,
        })
        .count()
}
