pub mod attachments;
pub mod issues;
pub mod project_counters;

pub use attachments::{
    ActiveModel as AttachmentActiveModel, Entity as Attachments, Model as Attachment,
};
pub use issues::{ActiveModel as IssueActiveModel, Entity as Issues, Model as Issue};
pub use project_counters::{
    ActiveModel as ProjectCounterActiveModel, Entity as ProjectCounters, Model as ProjectCounter,
};
