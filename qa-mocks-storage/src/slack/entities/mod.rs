pub mod channels;
pub mod files;
pub mod messages;

pub use channels::{ActiveModel as ChannelActiveModel, Entity as Channels, Model as Channel};
pub use files::{ActiveModel as FileActiveModel, Entity as Files, Model as File};
pub use messages::{ActiveModel as MessageActiveModel, Entity as Messages, Model as Message};
