pub mod cases;
pub mod projects;
pub mod results;
pub mod run_entries;
pub mod runs;
pub mod sections;

pub use cases::{ActiveModel as CaseActiveModel, Entity as Cases, Model as Case};
pub use projects::{ActiveModel as ProjectActiveModel, Entity as Projects, Model as Project};
pub use results::{ActiveModel as ResultActiveModel, Entity as Results, Model as TestResult};
pub use run_entries::{ActiveModel as RunEntryActiveModel, Entity as RunEntries, Model as RunEntry};
pub use runs::{ActiveModel as RunActiveModel, Entity as Runs, Model as Run};
pub use sections::{ActiveModel as SectionActiveModel, Entity as Sections, Model as Section};
