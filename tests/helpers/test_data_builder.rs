// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{Duration, NaiveDateTime, Utc};
use institute_timetable::domain::{
    AvailabilityConstraint, PeriodTemplate, PeriodTiming, Room, TeachingAssignment,
};
use institute_timetable::domain::types::{ConstraintType, Weekday};

fn now_plus(secs: i64) -> NaiveDateTime {
    Utc::now().naive_utc() + Duration::seconds(secs)
}

// ==========================================
// PeriodTemplate 构建器
// ==========================================

pub struct TemplateBuilder {
    template_id: String,
    academic_year: String,
    days_of_week: Vec<Weekday>,
    periods_per_day: i32,
    break_periods: Vec<i32>,
    is_active: bool,
}

impl TemplateBuilder {
    pub fn new(template_id: &str) -> Self {
        Self {
            template_id: template_id.to_string(),
            academic_year: "2025".to_string(),
            days_of_week: vec![
                Weekday::Monday,
                Weekday::Tuesday,
                Weekday::Wednesday,
                Weekday::Thursday,
                Weekday::Friday,
            ],
            periods_per_day: 6,
            break_periods: vec![],
            is_active: true,
        }
    }

    pub fn academic_year(mut self, year: &str) -> Self {
        self.academic_year = year.to_string();
        self
    }

    pub fn days(mut self, days: Vec<Weekday>) -> Self {
        self.days_of_week = days;
        self
    }

    pub fn periods_per_day(mut self, periods: i32) -> Self {
        self.periods_per_day = periods;
        self
    }

    pub fn breaks(mut self, periods: Vec<i32>) -> Self {
        self.break_periods = periods;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn build(self) -> PeriodTemplate {
        let timings = (1..=self.periods_per_day)
            .map(|p| PeriodTiming {
                period_number: p,
                start_time: None,
                end_time: None,
                is_break: self.break_periods.contains(&p),
            })
            .collect();

        PeriodTemplate {
            template_id: self.template_id.clone(),
            name: format!("模板{}", self.template_id),
            academic_year: self.academic_year,
            days_of_week: self.days_of_week,
            periods_per_day: self.periods_per_day,
            period_timings: timings,
            is_active: self.is_active,
            created_at: now_plus(0),
        }
    }
}

// ==========================================
// TeachingAssignment 构建器
// ==========================================

pub struct AssignmentBuilder {
    assignment_id: String,
    teacher_id: String,
    subject_id: String,
    section_ids: Vec<String>,
    sessions_per_week: i32,
    session_length: i32,
    preferred_room_ids: Vec<String>,
    room_fixed: bool,
    allowed_days: Option<Vec<Weekday>>,
    fixed_day: Option<Weekday>,
    fixed_period: Option<i32>,
    same_daily_pattern: bool,
    academic_year: String,
    is_active: bool,
    created_offset_secs: i64,
}

impl AssignmentBuilder {
    pub fn new(assignment_id: &str) -> Self {
        Self {
            assignment_id: assignment_id.to_string(),
            teacher_id: "T1".to_string(),
            subject_id: "SUB1".to_string(),
            section_ids: vec!["SEC1".to_string()],
            sessions_per_week: 1,
            session_length: 1,
            preferred_room_ids: vec![],
            room_fixed: false,
            allowed_days: None,
            fixed_day: None,
            fixed_period: None,
            same_daily_pattern: false,
            academic_year: "2025".to_string(),
            is_active: true,
            created_offset_secs: 0,
        }
    }

    pub fn teacher(mut self, teacher_id: &str) -> Self {
        self.teacher_id = teacher_id.to_string();
        self
    }

    pub fn subject(mut self, subject_id: &str) -> Self {
        self.subject_id = subject_id.to_string();
        self
    }

    pub fn sections(mut self, ids: &[&str]) -> Self {
        self.section_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn sessions(mut self, per_week: i32) -> Self {
        self.sessions_per_week = per_week;
        self
    }

    pub fn length(mut self, session_length: i32) -> Self {
        self.session_length = session_length;
        self
    }

    pub fn preferred_rooms(mut self, ids: &[&str]) -> Self {
        self.preferred_room_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn room_fixed(mut self) -> Self {
        self.room_fixed = true;
        self
    }

    pub fn allowed_days(mut self, days: Vec<Weekday>) -> Self {
        self.allowed_days = Some(days);
        self
    }

    pub fn pinned(mut self, day: Weekday, period: i32) -> Self {
        self.fixed_day = Some(day);
        self.fixed_period = Some(period);
        self
    }

    pub fn same_daily_pattern(mut self) -> Self {
        self.same_daily_pattern = true;
        self
    }

    pub fn academic_year(mut self, year: &str) -> Self {
        self.academic_year = year.to_string();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// 创建顺序偏移 (秒),用于控制确定性排序
    pub fn created_offset(mut self, secs: i64) -> Self {
        self.created_offset_secs = secs;
        self
    }

    pub fn build(self) -> TeachingAssignment {
        TeachingAssignment {
            assignment_id: self.assignment_id,
            teacher_id: self.teacher_id,
            subject_id: self.subject_id,
            section_ids: self.section_ids,
            sessions_per_week: self.sessions_per_week,
            session_length: self.session_length,
            preferred_room_ids: self.preferred_room_ids,
            room_fixed: self.room_fixed,
            allowed_days: self.allowed_days,
            fixed_day: self.fixed_day,
            fixed_period: self.fixed_period,
            same_daily_pattern: self.same_daily_pattern,
            academic_year: self.academic_year,
            is_active: self.is_active,
            created_at: now_plus(self.created_offset_secs),
        }
    }
}

// ==========================================
// Room / AvailabilityConstraint 工厂函数
// ==========================================

pub fn build_room(room_id: &str, capacity: i32) -> Room {
    Room {
        room_id: room_id.to_string(),
        name: format!("教室{}", room_id),
        capacity,
        room_type: "classroom".to_string(),
        is_active: true,
        created_at: now_plus(0),
    }
}

pub fn build_blocked_constraint(
    constraint_type: ConstraintType,
    entity_id: &str,
    day: Weekday,
    period_number: i32,
) -> AvailabilityConstraint {
    AvailabilityConstraint {
        constraint_id: format!("AC-{}-{}-{}", entity_id, day, period_number),
        constraint_type,
        entity_id: entity_id.to_string(),
        day,
        period_number,
        is_available: false,
        academic_year: "2025".to_string(),
    }
}
