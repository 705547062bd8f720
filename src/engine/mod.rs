// ==========================================
// 学校排课系统 - 引擎层
// ==========================================
// 职责: 课表生成的全部计算逻辑 (纯内存,无数据访问)
// 红线: 引擎只消费输入快照,绝不触碰存储层
// ==========================================

pub mod diagnostics;
pub mod error;
pub mod exclusivity;
pub mod expansion;
pub mod orchestrator;
pub mod scheduler;

// 重导出核心类型
pub use error::{EngineError, EngineResult};
pub use exclusivity::{ExclusivityIndex, PlacementBlock};
pub use expansion::{PlacementRequest, RequestExpander, RequestKind};
pub use orchestrator::{GenerationInput, GenerationOrchestrator, GenerationOutcome};
pub use scheduler::{ScheduleOutcome, SlotPlacement, TimetableScheduler, UnassignedDraft};
