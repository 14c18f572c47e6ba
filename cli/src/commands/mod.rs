mod convert;
mod helpers;
mod ingredient;
mod recipe;
mod stats;

pub(crate) use convert::{cmd_convert, cmd_hydration};
pub(crate) use helpers::json_error;
pub(crate) use ingredient::{cmd_ingredient_list, cmd_ingredient_remove, cmd_ingredient_set};
pub(crate) use recipe::{AddOptions, cmd_add, cmd_delete, cmd_list, cmd_show, cmd_titles};
pub(crate) use stats::cmd_stats;
