pub mod cat;
pub mod patch;
pub mod put;
pub mod stat;
pub mod truncate;

pub use cat::cat_command;
pub use patch::patch_command;
pub use put::put_command;
pub use stat::stat_command;
pub use truncate::truncate_command;
