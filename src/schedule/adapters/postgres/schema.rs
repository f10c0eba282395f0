//! Diesel schema for schedule persistence.

diesel::table! {
    /// Milestones owned by external projects.
    milestones (id) {
        /// Milestone identifier.
        id -> Uuid,
        /// Owning project identifier.
        project_id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// First day of the milestone.
        start_date -> Date,
        /// Last day of the milestone.
        end_date -> Date,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks bounded by their milestone's date range.
    schedule_tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning milestone identifier.
        milestone_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// First day of the task.
        start_date -> Date,
        /// Last day of the task.
        end_date -> Date,
        /// Task status.
        #[max_length = 50]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reviewed requests to change a task's date range.
    change_proposals (id) {
        /// Proposal identifier.
        id -> Uuid,
        /// Target task identifier.
        task_id -> Uuid,
        /// Reason for the change.
        reason -> Text,
        /// Optional reviewer-facing comment.
        comment -> Nullable<Text>,
        /// Requested first day.
        requested_start -> Nullable<Date>,
        /// Requested last day.
        requested_end -> Nullable<Date>,
        /// Review status.
        #[max_length = 50]
        status -> Varchar,
        /// Creator user identifier.
        #[max_length = 255]
        creator_id -> Varchar,
        /// Last modifier user identifier.
        #[max_length = 255]
        last_modifier_id -> Varchar,
        /// Proposal replaced by this one.
        supersedes -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(schedule_tasks -> milestones (milestone_id));
diesel::joinable!(change_proposals -> schedule_tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(milestones, schedule_tasks, change_proposals);
